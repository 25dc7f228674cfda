//! Container image build matrix
//!
//! One image is built and pushed per distribution, strictly one after the
//! other. Each build pushes `<version>-<distribution>` and the bare
//! `<version>` tag, so once the matrix completes the bare tag points at the
//! last distribution built.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::command::{CommandRunner, SystemRunner, ToolCommand};
use crate::config::Config;
use crate::domain::{ReleaseBranch, VersionTag};
use crate::error::{ErrorContext, ReleaseError, Result};
use crate::warning::ReleaseWarning;

/// Options of an image build run
#[derive(Debug, Clone, PartialEq)]
pub struct BuildOptions {
    /// Path to the repository clone
    pub repo_path: PathBuf,

    /// Base version the images are tagged with, ie v12.0.4
    pub version: String,

    /// Distributions to build on, in build order
    pub distributions: Vec<String>,

    /// Registry where images are staged
    pub staging_registry: String,

    /// Directory holding one build context per image, relative to the repository
    pub context_dir: PathBuf,

    /// Release branch the version must belong to, when given
    pub branch: Option<String>,

    pub image_builder_command: Vec<String>,
}

impl BuildOptions {
    pub fn from_config(
        repo_path: impl Into<PathBuf>,
        version: impl Into<String>,
        config: &Config,
    ) -> Self {
        BuildOptions {
            repo_path: repo_path.into(),
            version: version.into(),
            distributions: config.build.distributions.clone(),
            staging_registry: config.build.staging_registry.clone(),
            context_dir: PathBuf::from(&config.build.context_dir),
            branch: None,
            image_builder_command: config.tools.image_builder.clone(),
        }
    }

    /// Validate checks the options are complete and consistent
    pub fn validate(&self) -> Result<()> {
        if self.repo_path.as_os_str().is_empty() {
            return Err(ReleaseError::config("repository path not set"));
        }

        let version = VersionTag::parse(&self.version)
            .map_err(|e| ReleaseError::config(format!("invalid image version: {}", e)))?;

        if self.distributions.is_empty() {
            return Err(ReleaseError::config("no distributions to build on"));
        }
        if self.distributions.iter().any(|d| d.trim().is_empty()) {
            return Err(ReleaseError::config("distribution names must not be empty"));
        }

        if self.staging_registry.is_empty() {
            return Err(ReleaseError::config("staging registry not set"));
        }

        if self.image_builder_command.is_empty() {
            return Err(ReleaseError::config("image builder command line is empty"));
        }

        if let Some(branch) = &self.branch {
            let branch = ReleaseBranch::parse(branch)?;
            if branch.major() != version.major {
                return Err(ReleaseError::config(format!(
                    "version {} does not belong to branch {}",
                    version, branch
                )));
            }
        }

        Ok(())
    }

    /// Directory holding the per-image build contexts
    pub fn context_path(&self) -> PathBuf {
        self.repo_path.join(&self.context_dir)
    }
}

/// One cell of the build matrix
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMatrixEntry {
    pub distribution: String,
    pub version: String,
    pub registry: String,
}

impl BuildMatrixEntry {
    /// `<registry>/<image>:<version>-<distribution>`
    pub fn distribution_tag(&self, image: &str) -> String {
        format!(
            "{}/{}:{}-{}",
            self.registry, image, self.version, self.distribution
        )
    }

    /// `<registry>/<image>:<version>`
    pub fn bare_tag(&self, image: &str) -> String {
        format!("{}/{}:{}", self.registry, image, self.version)
    }

    pub fn image_tags(&self, image: &str) -> [String; 2] {
        [self.distribution_tag(image), self.bare_tag(image)]
    }
}

/// Capability set used by [ImageBuild]
pub trait BuildSteps {
    /// Pre-flight checks for building `image`, before any build starts
    fn validate_image_opts(&mut self, options: &BuildOptions, image: &str) -> Result<()>;

    /// Build and push `image` for one matrix entry
    fn build_image(
        &mut self,
        options: &BuildOptions,
        entry: &BuildMatrixEntry,
        image: &str,
    ) -> Result<()>;
}

/// Builds images with `docker buildx`
pub struct DefaultBuildSteps {
    runner: Box<dyn CommandRunner>,
}

impl DefaultBuildSteps {
    pub fn new() -> Self {
        DefaultBuildSteps {
            runner: Box::new(SystemRunner),
        }
    }

    pub fn with_runner<C: CommandRunner + 'static>(runner: C) -> Self {
        DefaultBuildSteps {
            runner: Box::new(runner),
        }
    }
}

impl Default for DefaultBuildSteps {
    fn default() -> Self {
        Self::new()
    }
}

impl BuildSteps for DefaultBuildSteps {
    fn validate_image_opts(&mut self, options: &BuildOptions, image: &str) -> Result<()> {
        if image.is_empty() || image.contains('/') || image.starts_with('.') {
            return Err(ReleaseError::config(format!("invalid image name '{}'", image)));
        }

        let context = options.context_path().join(image);
        if !context.is_dir() {
            return Err(ReleaseError::config(format!(
                "no build context for image {} in {}",
                image,
                context.display()
            )));
        }

        if let Some(program) = options.image_builder_command.first() {
            self.runner.locate(program)?;
        }

        Ok(())
    }

    fn build_image(
        &mut self,
        options: &BuildOptions,
        entry: &BuildMatrixEntry,
        image: &str,
    ) -> Result<()> {
        let [distribution_tag, bare_tag] = entry.image_tags(image);

        let command =
            ToolCommand::from_command_line(&options.image_builder_command, options.context_path())?
                .args([
                    "--build-arg".to_string(),
                    format!("VT_BASE_VER={}", entry.version),
                    "--build-arg".to_string(),
                    format!("DEBIAN_VER={}-slim", entry.distribution),
                    "--tag".to_string(),
                    distribution_tag,
                    "--tag".to_string(),
                    bare_tag,
                    "--output".to_string(),
                    "type=image,push=true".to_string(),
                    image.to_string(),
                ]);

        self.runner.run(&command)
    }
}

/// Sequences the per-distribution builds of one image
pub struct ImageBuild<S: BuildSteps = DefaultBuildSteps> {
    options: BuildOptions,
    steps: S,
}

impl ImageBuild<DefaultBuildSteps> {
    pub fn new(options: BuildOptions) -> Self {
        Self::with_steps(options, DefaultBuildSteps::new())
    }
}

impl<S: BuildSteps> ImageBuild<S> {
    pub fn with_steps(options: BuildOptions, steps: S) -> Self {
        ImageBuild { options, steps }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn steps(&self) -> &S {
        &self.steps
    }

    /// The matrix entries, in build order
    pub fn matrix(&self) -> Vec<BuildMatrixEntry> {
        self.options
            .distributions
            .iter()
            .map(|distribution| BuildMatrixEntry {
                distribution: distribution.clone(),
                version: self.options.version.clone(),
                registry: self.options.staging_registry.clone(),
            })
            .collect()
    }

    /// Builds `image` for every distribution, stopping at the first failure.
    ///
    /// Returns the entries that were built.
    pub fn image(&mut self, image: &str) -> Result<Vec<BuildMatrixEntry>> {
        self.options
            .validate()
            .context("validating image build options")?;
        self.steps
            .validate_image_opts(&self.options, image)
            .context("validating image build options")?;

        let matrix = self.matrix();
        for (idx, entry) in matrix.iter().enumerate() {
            info!(
                "🐳 Building {} ({}/{}): {}",
                image,
                idx + 1,
                matrix.len(),
                entry.distribution_tag(image)
            );

            self.steps
                .build_image(&self.options, entry, image)
                .with_context(|| format!("building image {} on {}", image, entry.distribution))?;

            if idx > 0 {
                warn!(
                    "{}",
                    ReleaseWarning::BareTagRetargeted {
                        tag: entry.bare_tag(image),
                        distribution: entry.distribution.clone(),
                    }
                );
            }
        }

        Ok(matrix)
    }
}
