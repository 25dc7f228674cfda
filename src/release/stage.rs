use tracing::{debug, info};

use crate::domain::{branch_major, ReleaseBranch, VersionTag};
use crate::error::{ErrorContext, ReleaseError, Result};
use crate::release::state::{CommitRange, ReleaseState, StageOptions, StagePhase};
use crate::release::steps::{DefaultStageSteps, StageSteps};
use crate::resolver;

/// Commit message of the commit stamping the development version
pub const DEV_COMMIT_MESSAGE: &str = "Back to dev mode";

/// Commit message of the commit stamping `version`
pub fn release_commit_message(version: &VersionTag) -> String {
    format!("Release commit for {}", version)
}

/// Annotation of the release tag
pub fn release_tag_message(version: &VersionTag) -> String {
    format!("Version {}", version)
}

/// Annotation of the godoc alias tag put on the release commit
pub fn godoc_tag_message(version: &VersionTag, godoc_version: &str) -> String {
    format!(
        "Tagging {} also as {} for godoc/go modules",
        version, godoc_version
    )
}

/// The staging phase of a release.
///
/// Runs its steps strictly in order and stops at the first failure. Nothing is
/// rolled back: whatever earlier steps wrote, committed or tagged stays in the
/// repository, and the only recovery is to reset it and run again.
pub struct Stage<S: StageSteps = DefaultStageSteps> {
    options: StageOptions,
    steps: S,
    phase: StagePhase,
}

impl Stage<DefaultStageSteps> {
    pub fn new(options: StageOptions) -> Self {
        Self::with_steps(options, DefaultStageSteps::new())
    }
}

impl<S: StageSteps> Stage<S> {
    pub fn with_steps(options: StageOptions, steps: S) -> Self {
        Stage {
            options,
            steps,
            phase: StagePhase::Init,
        }
    }

    pub fn options(&self) -> &StageOptions {
        &self.options
    }

    pub fn steps(&self) -> &S {
        &self.steps
    }

    /// Last phase reached. After a failed run this is the last one that succeeded.
    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    fn advance(&mut self, phase: StagePhase) {
        debug!("Stage phase: {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    /// Run executes the release staging and returns what it resolved
    pub fn run(&mut self) -> Result<ReleaseState> {
        self.phase = StagePhase::Init;
        let mut state = ReleaseState::default();

        self.check_environment()
            .context("checking the environment")?;
        self.check_options().context("checking options")?;
        self.open_repository().context("opening repository")?;
        self.set_environment(&mut state)
            .context("setting up environment")?;
        self.generate_release_notes(&mut state)
            .context("generating release notes")?;
        self.tag_repository(&state).context("tagging repo")?;

        self.advance(StagePhase::Done);
        info!("✅ Release {} staged", state.release_version()?);
        Ok(state)
    }

    /// Fails when the branch is not a release branch or a tool is missing.
    /// Runs before anything is modified.
    pub fn check_environment(&mut self) -> Result<()> {
        let branch = ReleaseBranch::parse(&self.options.branch)?;
        debug!("Release branch {} scopes major {}", branch, branch.major());

        self.steps.check_environment(&self.options)?;
        info!("✅ Environment looks good");
        self.advance(StagePhase::EnvironmentChecked);
        Ok(())
    }

    pub fn check_options(&mut self) -> Result<()> {
        self.steps.check_options(&self.options)?;
        self.advance(StagePhase::OptionsValidated);
        Ok(())
    }

    pub fn open_repository(&mut self) -> Result<()> {
        self.steps.open_repository(&self.options)?;
        self.advance(StagePhase::RepositoryOpened);
        Ok(())
    }

    /// Checks out the branch and resolves the versions of this release.
    ///
    /// The current commit is recorded here, before any release commit exists.
    pub fn set_environment(&mut self, state: &mut ReleaseState) -> Result<()> {
        info!("💻 Setting up the environment");
        let branch = self.options.branch.clone();

        info!("  > Checking out branch {}", branch);
        self.steps
            .checkout_branch(&branch)
            .with_context(|| format!("checking out branch {}", branch))?;

        let major = branch_major(&branch);
        if major == 0 {
            return Err(ReleaseError::UnresolvedMajor);
        }

        let tags = self
            .steps
            .repository_tags()
            .context("fetching tags from the repo")?;

        let previous = resolver::last_version(major, &tags)
            .context("fetching the last version tag")?;
        match &previous {
            Some(tag) => info!("  > Previous release tag: {}", tag),
            None => info!("  > No previous release tag"),
        }

        let version = resolver::next_patch(major, previous.as_ref())
            .context("getting next tag in the branch")?;
        info!("  > Next release tag will be: {}", version);

        let dev_version = resolver::next_dev_version(&version, &self.options.dev_marker)
            .context("getting next development version")?;
        info!("  > Next development tag will be: {}", dev_version);

        let current_commit = self
            .steps
            .rev_parse("HEAD")
            .context("trying to get the current repository commit")?;
        info!("  > Current branch position: {}", current_commit);

        state.previous_version = previous;
        state.version = Some(version);
        state.dev_version = Some(dev_version);
        state.godoc_version = self.options.godoc_version.clone();
        state.current_commit = Some(current_commit);

        self.advance(StagePhase::EnvironmentSet);
        Ok(())
    }

    /// Runs the changelog generator from the previous release up to the parent
    /// of the recorded current commit.
    pub fn generate_release_notes(&mut self, state: &mut ReleaseState) -> Result<()> {
        info!("📔 Generating release notes");
        let version = state.release_version()?.clone();
        let previous = state.previous_version.clone().ok_or_else(|| {
            ReleaseError::commit_range(
                "no previous release on the branch to start the release notes from",
            )
        })?;

        let range = self.release_notes_range(&previous, state.head_commit()?)?;
        info!("  > From SHA: {}", range.from);
        info!("  > To SHA:   {}", range.to);

        let path = self.options.release_notes_path(&version);
        self.steps
            .generate_release_notes(&self.options, &range, &version, &path)?;
        info!("  > Release notes written to {}", path.display());

        state.release_notes_path = Some(path);
        self.advance(StagePhase::NotesGenerated);
        Ok(())
    }

    fn release_notes_range(&mut self, previous: &VersionTag, current: &str) -> Result<CommitRange> {
        let from = self.steps.rev_parse(&previous.to_string())?;
        let to = self.steps.rev_parse(&format!("{}~1", current))?;

        if from == to {
            return Err(ReleaseError::commit_range(format!(
                "start and end commits for release notes are the same ({})",
                from
            )));
        }

        if !self.steps.is_ancestor(&from, &to)? {
            return Err(ReleaseError::commit_range(format!(
                "release notes start {} does not precede end {}, no commits since the last release",
                from, to
            )));
        }

        Ok(CommitRange { from, to })
    }

    /// Writes the version files and commits, once for the release and once for
    /// the development version. Only the release commit gets tagged.
    pub fn tag_repository(&mut self, state: &ReleaseState) -> Result<()> {
        info!("🏷  Tagging the repository");
        let version = state.release_version()?;
        let dev_version = state.development_version()?;

        for tag in [version, dev_version] {
            self.stamp(tag)?;

            if tag == dev_version {
                self.steps
                    .add_and_commit(DEV_COMMIT_MESSAGE)
                    .context("creating development commit")?;
                self.advance(StagePhase::DevStamped);
                continue;
            }

            self.steps
                .add_and_commit(&release_commit_message(tag))
                .context("creating tag commit")?;

            self.steps
                .create_tag(&tag.to_string(), &release_tag_message(tag))
                .context("creating tag")?;

            if let Some(godoc) = &state.godoc_version {
                self.steps
                    .create_tag(godoc, &godoc_tag_message(tag, godoc))
                    .context("creating godoc tag")?;
                info!("Tagged release commit with godoc tag {}", godoc);
            }

            self.advance(StagePhase::ReleaseTagged);
        }

        Ok(())
    }

    fn stamp(&mut self, tag: &VersionTag) -> Result<()> {
        self.steps
            .generate_java_versions(&self.options, tag)
            .with_context(|| format!("generating version {} in java", tag))?;
        self.steps
            .write_version_file(&self.options, tag)
            .with_context(|| format!("writing tag {} to code", tag))
    }
}
