//! Options and run-scoped state of the staging pipeline

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::domain::VersionTag;
use crate::error::{ReleaseError, Result};

/// Options for one staging run
#[derive(Debug, Clone, PartialEq)]
pub struct StageOptions {
    /// Path to the repository clone
    pub repo_path: PathBuf,

    /// Release branch to cut from, ie release-12.0
    pub branch: String,

    /// Optional second tag put on the release commit for godoc/go modules
    pub godoc_version: Option<String>,

    /// Version constant source file, relative to the repository
    pub version_file: PathBuf,

    /// Go package declared in the version file
    pub version_package: String,

    /// Directory receiving the release notes, relative to the repository
    pub release_notes_dir: PathBuf,

    /// Maven project directory, relative to the repository
    pub java_dir: PathBuf,

    /// Pre-release marker of the development version
    pub dev_marker: String,

    pub release_notes_command: Vec<String>,
    pub version_setter_command: Vec<String>,
}

impl StageOptions {
    /// Options with the default configuration
    pub fn new(repo_path: impl Into<PathBuf>, branch: impl Into<String>) -> Self {
        Self::from_config(repo_path, branch, &Config::default())
    }

    pub fn from_config(
        repo_path: impl Into<PathBuf>,
        branch: impl Into<String>,
        config: &Config,
    ) -> Self {
        StageOptions {
            repo_path: repo_path.into(),
            branch: branch.into(),
            godoc_version: None,
            version_file: PathBuf::from(&config.stage.version_file),
            version_package: config.stage.version_package.clone(),
            release_notes_dir: PathBuf::from(&config.stage.release_notes_dir),
            java_dir: PathBuf::from(&config.stage.java_dir),
            dev_marker: config.stage.dev_marker.clone(),
            release_notes_command: config.tools.release_notes.clone(),
            version_setter_command: config.tools.version_setter.clone(),
        }
    }

    pub fn with_godoc_version(mut self, godoc_version: Option<String>) -> Self {
        self.godoc_version = godoc_version;
        self
    }

    /// Validate checks if the options are structurally correct
    pub fn validate(&self) -> Result<()> {
        if self.repo_path.as_os_str().is_empty() {
            return Err(ReleaseError::config("repository path not set"));
        }

        if self.branch.is_empty() {
            return Err(ReleaseError::config("branch not set"));
        }

        if self.version_file.as_os_str().is_empty() {
            return Err(ReleaseError::config("version file not set"));
        }

        if self.release_notes_command.is_empty() || self.version_setter_command.is_empty() {
            return Err(ReleaseError::config("external tool command lines must not be empty"));
        }

        semver::Prerelease::new(&self.dev_marker)
            .ok()
            .filter(|marker| !marker.is_empty())
            .ok_or_else(|| {
                ReleaseError::config(format!("invalid development marker '{}'", self.dev_marker))
            })?;

        if let Some(godoc) = &self.godoc_version {
            VersionTag::parse(godoc).map_err(|e| {
                ReleaseError::config(format!("invalid godoc version: {}", e))
            })?;
        }

        Ok(())
    }

    /// Programs that must be on the execution path before anything is touched
    pub fn required_executables(&self) -> Vec<&str> {
        [&self.release_notes_command, &self.version_setter_command]
            .into_iter()
            .filter_map(|command_line| command_line.first())
            .map(String::as_str)
            .collect()
    }

    /// Where the release notes of `version` are written
    pub fn release_notes_path(&self, version: &VersionTag) -> PathBuf {
        self.repo_path.join(&self.release_notes_dir).join(format!(
            "{}_{}_{}_release_notes.md",
            version.major, version.minor, version.patch
        ))
    }

    pub fn version_file_path(&self) -> PathBuf {
        self.repo_path.join(&self.version_file)
    }

    pub fn java_path(&self) -> PathBuf {
        self.repo_path.join(&self.java_dir)
    }
}

/// Phases of the staging pipeline, in the order they are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StagePhase {
    Init,
    EnvironmentChecked,
    OptionsValidated,
    RepositoryOpened,
    EnvironmentSet,
    NotesGenerated,
    ReleaseTagged,
    DevStamped,
    Done,
}

impl fmt::Display for StagePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StagePhase::Init => "init",
            StagePhase::EnvironmentChecked => "environment checked",
            StagePhase::OptionsValidated => "options validated",
            StagePhase::RepositoryOpened => "repository opened",
            StagePhase::EnvironmentSet => "environment set",
            StagePhase::NotesGenerated => "release notes generated",
            StagePhase::ReleaseTagged => "release tagged",
            StagePhase::DevStamped => "development version stamped",
            StagePhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// Commits bounding the release notes, both inclusive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRange {
    pub from: String,
    pub to: String,
}

/// Everything a staging run learns along the way.
///
/// Created empty when a run starts and filled in by the steps; it is never
/// shared outside the run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReleaseState {
    /// Last release cut from the branch, if any
    pub previous_version: Option<VersionTag>,

    /// Release tag to cut
    pub version: Option<VersionTag>,

    /// Development version stamped after the release
    pub dev_version: Option<VersionTag>,

    pub godoc_version: Option<String>,

    /// Branch head before the release commit
    pub current_commit: Option<String>,

    pub release_notes_path: Option<PathBuf>,
}

impl ReleaseState {
    pub fn release_version(&self) -> Result<&VersionTag> {
        self.version
            .as_ref()
            .ok_or_else(|| unset("release version"))
    }

    pub fn development_version(&self) -> Result<&VersionTag> {
        self.dev_version
            .as_ref()
            .ok_or_else(|| unset("development version"))
    }

    pub fn head_commit(&self) -> Result<&str> {
        self.current_commit
            .as_deref()
            .ok_or_else(|| unset("current commit"))
    }

    pub fn release_notes(&self) -> Option<&Path> {
        self.release_notes_path.as_deref()
    }
}

fn unset(what: &str) -> ReleaseError {
    ReleaseError::config(format!("{} not set, environment has not been set up", what))
}
