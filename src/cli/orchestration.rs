//! Main workflow orchestration logic
//!
//! Turns parsed command line arguments and the loaded configuration into
//! pipeline options and runs them. This keeps `main.rs` down to argument
//! parsing, logging setup and error reporting.

use std::path::{Path, PathBuf};

use crate::cli::{ImageArgs, StageArgs};
use crate::config::{self, Config};
use crate::error::{ReleaseError, Result};
use crate::release::{BuildMatrixEntry, BuildOptions, ImageBuild, ReleaseState, Stage, StageOptions};

/// Repository path is a required global flag
pub fn require_repo(repo: Option<&Path>) -> Result<PathBuf> {
    repo.map(Path::to_path_buf)
        .filter(|path| !path.as_os_str().is_empty())
        .ok_or_else(|| ReleaseError::config("--repo (or REPO_PATH) is required"))
}

/// Load the configuration for a run against `repo`
pub fn load_run_config(config_path: Option<&Path>, repo: &Path) -> Result<Config> {
    config::load_config(config_path, Some(repo))
}

pub fn stage_options(args: &StageArgs, repo: &Path, config: &Config) -> StageOptions {
    let godoc_version = args.godoc_version.as_ref().map(|version| {
        if version.starts_with('v') {
            version.clone()
        } else {
            format!("v{}", version)
        }
    });

    StageOptions::from_config(repo, args.branch.clone(), config).with_godoc_version(godoc_version)
}

pub fn build_options(args: &ImageArgs, repo: &Path, config: &Config) -> BuildOptions {
    let mut options = BuildOptions::from_config(repo, args.version.clone(), config);

    if let Some(registry) = &args.staging_registry {
        options.staging_registry = registry.clone();
    }
    if !args.distributions.is_empty() {
        options.distributions = args.distributions.clone();
    }
    options.branch = args.branch.clone();

    options
}

/// Stage a release with the production steps
pub fn run_stage(args: &StageArgs, repo: &Path, config: &Config) -> Result<ReleaseState> {
    Stage::new(stage_options(args, repo, config)).run()
}

/// Build one image across the distribution matrix with the production steps
pub fn run_image_build(
    args: &ImageArgs,
    repo: &Path,
    config: &Config,
) -> Result<Vec<BuildMatrixEntry>> {
    ImageBuild::new(build_options(args, repo, config)).image(&args.name)
}
