use crate::error::{ReleaseError, Result};
use git2::build::CheckoutBuilder;
use git2::{BranchType, ErrorCode, IndexAddOption, ObjectType, Repository as Git2Repo};
use std::path::Path;
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open the repository at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::open(path.as_ref()).map_err(|e| {
            ReleaseError::repository(format!(
                "Cannot open repository in {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Ok(Git2Repository { repo })
    }

    fn find_commit(&self, revision: &str) -> Result<git2::Commit<'_>> {
        self.repo
            .revparse_single(revision)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| {
                ReleaseError::repository(format!("Cannot resolve revision '{}': {}", revision, e))
            })
    }

    fn head_commit(&self) -> Result<git2::Commit<'_>> {
        self.repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| ReleaseError::repository(format!("Cannot resolve HEAD commit: {}", e)))
    }
}

impl super::Repository for Git2Repository {
    fn checkout(&self, branch: &str) -> Result<()> {
        let reference = match self.repo.find_branch(branch, BranchType::Local) {
            Ok(local) => local.into_reference(),
            Err(e) if e.code() == ErrorCode::NotFound => {
                let remote = self
                    .repo
                    .find_branch(&format!("origin/{}", branch), BranchType::Remote)
                    .map_err(|e| {
                        ReleaseError::repository(format!("Cannot find branch '{}': {}", branch, e))
                    })?;
                let commit = remote.get().peel_to_commit()?;
                debug!("Creating local branch {} from origin", branch);
                self.repo.branch(branch, &commit, false)?.into_reference()
            }
            Err(e) => return Err(e.into()),
        };

        let ref_name = reference
            .name()
            .ok_or_else(|| ReleaseError::repository(format!("Branch '{}' has no name", branch)))?
            .to_string();
        let target = reference.peel(ObjectType::Commit)?;

        self.repo
            .checkout_tree(&target, Some(CheckoutBuilder::new().safe()))
            .map_err(|e| {
                ReleaseError::repository(format!("Cannot check out '{}': {}", branch, e))
            })?;
        self.repo.set_head(&ref_name)?;

        Ok(())
    }

    fn tags(&self) -> Result<Vec<String>> {
        let tags = self.repo.tag_names(None)?;

        Ok(tags.iter().flatten().map(|s| s.to_string()).collect())
    }

    fn rev_parse(&self, revision: &str) -> Result<String> {
        Ok(self.find_commit(revision)?.id().to_string())
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        let ancestor = self.find_commit(ancestor)?.id();
        let descendant = self.find_commit(descendant)?.id();

        // graph_descendant_of is false for the commit itself
        Ok(self.repo.graph_descendant_of(descendant, ancestor)?)
    }

    fn tag(&self, name: &str, message: &str) -> Result<()> {
        let head = self.head_commit()?;
        let tagger = self.repo.signature()?;

        self.repo
            .tag(name, head.as_object(), &tagger, message, false)
            .map_err(|e| ReleaseError::repository(format!("Cannot create tag '{}': {}", name, e)))?;

        Ok(())
    }

    fn add(&self, pathspec: &str) -> Result<()> {
        let mut index = self.repo.index()?;

        index.add_all([pathspec], IndexAddOption::DEFAULT, None)?;
        // add_all does not see removed files
        index.update_all([pathspec], None)?;
        index.write()?;

        Ok(())
    }

    fn user_commit(&self, message: &str) -> Result<()> {
        let signature = self.repo.signature().map_err(|e| {
            ReleaseError::repository(format!("Cannot determine commit author: {}", e))
        })?;
        let parent = self.head_commit()?;

        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;

        let full_message = format!(
            "{}\n\nSigned-off-by: {} <{}>\n",
            message,
            signature.name().unwrap_or("unknown"),
            signature.email().unwrap_or("unknown")
        );

        self.repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                &full_message,
                &tree,
                &[&parent],
            )
            .map_err(|e| ReleaseError::repository(format!("Cannot create commit: {}", e)))?;

        Ok(())
    }
}
