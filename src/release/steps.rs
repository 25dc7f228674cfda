//! Side effects of the staging pipeline
//!
//! [StageSteps] is the single seam through which the pipeline touches the
//! outside world: repository access, external tools and file writes. The
//! pipeline keeps the version math and sequencing; implementations only
//! perform what they are asked to.

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::command::{CommandRunner, SystemRunner, ToolCommand};
use crate::domain::VersionTag;
use crate::error::{ErrorContext, ReleaseError, Result};
use crate::git::{Git2Repository, Repository, ALL_CHANGES};
use crate::release::state::{CommitRange, StageOptions};
use crate::warning::ReleaseWarning;

/// Capability set used by [crate::release::Stage]
pub trait StageSteps {
    /// Make sure the external programs the run needs can be found
    fn check_environment(&mut self, options: &StageOptions) -> Result<()>;

    fn check_options(&mut self, options: &StageOptions) -> Result<()> {
        options.validate()
    }

    /// Bind the repository every later step works on
    fn open_repository(&mut self, options: &StageOptions) -> Result<()>;

    fn checkout_branch(&mut self, branch: &str) -> Result<()>;

    fn repository_tags(&mut self) -> Result<Vec<String>>;

    /// Resolve a revision to a commit SHA
    fn rev_parse(&mut self, revision: &str) -> Result<String>;

    /// Whether commit `ancestor` comes strictly before commit `descendant`
    fn is_ancestor(&mut self, ancestor: &str, descendant: &str) -> Result<bool>;

    /// Run the changelog generator over `range`, writing into `path`
    fn generate_release_notes(
        &mut self,
        options: &StageOptions,
        range: &CommitRange,
        version: &VersionTag,
        path: &Path,
    ) -> Result<()>;

    /// Stamp the version constant source file
    fn write_version_file(&mut self, options: &StageOptions, tag: &VersionTag) -> Result<()>;

    /// Stamp the java project descriptors
    fn generate_java_versions(&mut self, options: &StageOptions, tag: &VersionTag) -> Result<()>;

    /// Stage every change in the working tree and commit it
    fn add_and_commit(&mut self, message: &str) -> Result<()>;

    /// Create an annotated tag on the current commit
    fn create_tag(&mut self, name: &str, message: &str) -> Result<()>;
}

/// Production steps: git2 for the repository, subprocesses for the tools
pub struct DefaultStageSteps {
    repository: Option<Box<dyn Repository>>,
    runner: Box<dyn CommandRunner>,
}

impl DefaultStageSteps {
    pub fn new() -> Self {
        DefaultStageSteps {
            repository: None,
            runner: Box::new(SystemRunner),
        }
    }

    /// Use an already opened repository instead of opening `repo_path`
    pub fn with_repository<R: Repository + 'static>(mut self, repository: R) -> Self {
        self.repository = Some(Box::new(repository));
        self
    }

    pub fn with_runner<C: CommandRunner + 'static>(mut self, runner: C) -> Self {
        self.runner = Box::new(runner);
        self
    }

    fn repository(&self) -> Result<&dyn Repository> {
        self.repository
            .as_deref()
            .ok_or_else(|| ReleaseError::repository("repository has not been opened"))
    }
}

impl Default for DefaultStageSteps {
    fn default() -> Self {
        Self::new()
    }
}

impl StageSteps for DefaultStageSteps {
    fn check_environment(&mut self, options: &StageOptions) -> Result<()> {
        info!("🔎 Looking for executables required for the build");
        for program in options.required_executables() {
            let path = self
                .runner
                .locate(program)
                .with_context(|| format!("checking for {} in the system", program))?;
            info!("  > {} executable found in {}", program, path.display());
        }
        Ok(())
    }

    fn open_repository(&mut self, options: &StageOptions) -> Result<()> {
        if self.repository.is_none() {
            let repository = Git2Repository::open(&options.repo_path)?;
            self.repository = Some(Box::new(repository));
        }
        info!("Opened git repository in {}", options.repo_path.display());
        Ok(())
    }

    fn checkout_branch(&mut self, branch: &str) -> Result<()> {
        self.repository()?.checkout(branch)?;
        info!("Checked out branch {}", branch);
        Ok(())
    }

    fn repository_tags(&mut self) -> Result<Vec<String>> {
        self.repository()?.tags()
    }

    fn rev_parse(&mut self, revision: &str) -> Result<String> {
        self.repository()?
            .rev_parse(revision)
            .with_context(|| format!("getting commit for revision {}", revision))
    }

    fn is_ancestor(&mut self, ancestor: &str, descendant: &str) -> Result<bool> {
        self.repository()?
            .is_ancestor(ancestor, descendant)
            .with_context(|| format!("checking whether {} precedes {}", ancestor, descendant))
    }

    fn generate_release_notes(
        &mut self,
        options: &StageOptions,
        range: &CommitRange,
        version: &VersionTag,
        path: &Path,
    ) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating release notes directory {}", dir.display()))?;
        }

        // The generator refuses to run unless the output file exists
        if path.exists() {
            warn!(
                "{}",
                ReleaseWarning::ReleaseNotesExist {
                    path: path.display().to_string()
                }
            );
        } else {
            fs::write(path, b"").context("touching release notes file")?;
        }

        let command = ToolCommand::from_command_line(&options.release_notes_command, &options.repo_path)?
            .args([
                "-from".to_string(),
                range.from.clone(),
                "-to".to_string(),
                range.to.clone(),
                "-version".to_string(),
                version.to_string(),
                "-file".to_string(),
                path.display().to_string(),
            ]);

        self.runner
            .run(&command)
            .context("calling release notes generator")
    }

    fn write_version_file(&mut self, options: &StageOptions, tag: &VersionTag) -> Result<()> {
        let path = options.version_file_path();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let contents = format!(
            "package {}\n\nconst versionName = \"{}\"\n",
            options.version_package,
            tag.version_string()
        );
        fs::write(&path, contents)
            .with_context(|| format!("while writing tag to {}", path.display()))?;

        info!("  > Wrote {} to {}", tag, options.version_file.display());
        Ok(())
    }

    fn generate_java_versions(&mut self, options: &StageOptions, tag: &VersionTag) -> Result<()> {
        let command = ToolCommand::from_command_line(&options.version_setter_command, options.java_path())?
            .arg(format!("-DnewVersion={}", tag.version_string()));

        self.runner
            .run(&command)
            .with_context(|| format!("executing maven to patch sources with tag {}", tag))
    }

    fn add_and_commit(&mut self, message: &str) -> Result<()> {
        let repository = self.repository()?;
        repository
            .add(ALL_CHANGES)
            .context("adding modified files to commit")?;
        repository.user_commit(message).context("creating commit")?;
        info!("  > Committed: {}", message);
        Ok(())
    }

    fn create_tag(&mut self, name: &str, message: &str) -> Result<()> {
        self.repository()?
            .tag(name, message)
            .with_context(|| format!("tagging repo with tag {}", name))?;
        info!("  > Tagged {}", name);
        Ok(())
    }
}
