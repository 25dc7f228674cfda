use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::{ReleaseError, Result};
use crate::resolver::DEFAULT_DEV_MARKER;

/// Name of the configuration file looked up in the repository and user config dir
pub const CONFIG_FILE_NAME: &str = "vtrelease.toml";

/// Represents the complete configuration for vtrelease.
///
/// Contains where version artifacts live, which external tools to invoke and
/// the image build defaults. Every field has a default matching the vitess
/// repository layout.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub stage: StageConfig,

    #[serde(default)]
    pub tools: ToolsConfig,

    #[serde(default)]
    pub build: BuildConfig,
}

fn default_version_file() -> String {
    "go/vt/servenv/version.go".to_string()
}

fn default_version_package() -> String {
    "servenv".to_string()
}

fn default_release_notes_dir() -> String {
    "doc/releasenotes".to_string()
}

fn default_java_dir() -> String {
    "java".to_string()
}

fn default_dev_marker() -> String {
    DEFAULT_DEV_MARKER.to_string()
}

/// Paths and conventions used while staging a release.
///
/// All paths are relative to the repository root.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StageConfig {
    #[serde(default = "default_version_file")]
    pub version_file: String,

    #[serde(default = "default_version_package")]
    pub version_package: String,

    #[serde(default = "default_release_notes_dir")]
    pub release_notes_dir: String,

    #[serde(default = "default_java_dir")]
    pub java_dir: String,

    #[serde(default = "default_dev_marker")]
    pub dev_marker: String,
}

impl Default for StageConfig {
    fn default() -> Self {
        StageConfig {
            version_file: default_version_file(),
            version_package: default_version_package(),
            release_notes_dir: default_release_notes_dir(),
            java_dir: default_java_dir(),
            dev_marker: default_dev_marker(),
        }
    }
}

fn default_release_notes_command() -> Vec<String> {
    vec![
        "go".to_string(),
        "run".to_string(),
        "./go/tools/release-notes".to_string(),
    ]
}

fn default_version_setter_command() -> Vec<String> {
    vec![
        "mvn".to_string(),
        "versions:set".to_string(),
        "-DgenerateBackupPoms=false".to_string(),
    ]
}

fn default_image_builder_command() -> Vec<String> {
    vec![
        "docker".to_string(),
        "buildx".to_string(),
        "build".to_string(),
    ]
}

/// Command lines of the external tools, program first.
///
/// Flags specific to each invocation are appended by the steps.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ToolsConfig {
    #[serde(default = "default_release_notes_command")]
    pub release_notes: Vec<String>,

    #[serde(default = "default_version_setter_command")]
    pub version_setter: Vec<String>,

    #[serde(default = "default_image_builder_command")]
    pub image_builder: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        ToolsConfig {
            release_notes: default_release_notes_command(),
            version_setter: default_version_setter_command(),
            image_builder: default_image_builder_command(),
        }
    }
}

/// Returns the default list of distributions images are built on.
fn default_distributions() -> Vec<String> {
    vec!["buster".to_string(), "bullseye".to_string()]
}

fn default_staging_registry() -> String {
    "gcr.io/puerco-chainguard/vitess/staging".to_string()
}

fn default_context_dir() -> String {
    "docker/k8s".to_string()
}

/// Defaults for the container image build matrix
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct BuildConfig {
    #[serde(default = "default_distributions")]
    pub distributions: Vec<String>,

    #[serde(default = "default_staging_registry")]
    pub staging_registry: String,

    #[serde(default = "default_context_dir")]
    pub context_dir: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        BuildConfig {
            distributions: default_distributions(),
            staging_registry: default_staging_registry(),
            context_dir: default_context_dir(),
        }
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `vtrelease.toml` in the repository root
/// 3. `vtrelease.toml` in the user config directory
/// 4. Default configuration if no file found
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `repo_path` - Optional repository root to look for a checked-in config
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, repo_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_path {
        return read_config(path);
    }

    if let Some(repo) = repo_path {
        let candidate = repo.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return read_config(&candidate);
        }
    }

    if let Some(config_dir) = dirs::config_dir() {
        let candidate = config_dir.join(CONFIG_FILE_NAME);
        if candidate.exists() {
            return read_config(&candidate);
        }
    }

    Ok(Config::default())
}

fn read_config(path: &Path) -> Result<Config> {
    let config_str = fs::read_to_string(path).map_err(|e| {
        ReleaseError::config(format!("cannot read {}: {}", path.display(), e))
    })?;

    toml::from_str(&config_str)
        .map_err(|e| ReleaseError::config(format!("cannot parse {}: {}", path.display(), e)))
}
