use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

/// A tag created through the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockTag {
    pub name: String,
    pub message: String,
    pub target: String,
}

#[derive(Debug, Default)]
struct MockState {
    branches: HashMap<String, String>,
    current_branch: Option<String>,
    head: String,
    revisions: HashMap<String, String>,
    ancestry: HashSet<(String, String)>,
    existing_tags: Vec<String>,
    created_tags: Vec<MockTag>,
    commits: Vec<String>,
    staged: Vec<String>,
    checkouts: Vec<String>,
}

/// Mock repository for testing without actual git operations
///
/// Clones share state, so a test can keep a handle while the pipeline owns
/// another one and inspect what was done afterwards.
#[derive(Debug, Clone, Default)]
pub struct MockRepository {
    state: Arc<Mutex<MockState>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        // A poisoned lock only happens after a test already panicked
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Set a branch head
    pub fn set_branch_head(&self, branch: impl Into<String>, sha: impl Into<String>) {
        self.state().branches.insert(branch.into(), sha.into());
    }

    /// Add a pre-existing tag name (as returned by `tags()`) pointing at `sha`
    pub fn add_tag(&self, name: impl Into<String>, sha: impl Into<String>) {
        let name = name.into();
        let mut state = self.state();
        state.revisions.insert(name.clone(), sha.into());
        state.existing_tags.push(name);
    }

    /// Make `revision` resolve to `sha`
    pub fn set_revision(&self, revision: impl Into<String>, sha: impl Into<String>) {
        self.state().revisions.insert(revision.into(), sha.into());
    }

    /// Record that commit `ancestor` is reachable from commit `descendant`
    pub fn set_ancestor(&self, ancestor: impl Into<String>, descendant: impl Into<String>) {
        self.state()
            .ancestry
            .insert((ancestor.into(), descendant.into()));
    }

    pub fn current_branch(&self) -> Option<String> {
        self.state().current_branch.clone()
    }

    pub fn head(&self) -> String {
        self.state().head.clone()
    }

    /// Tags created through [Repository::tag], in creation order
    pub fn created_tags(&self) -> Vec<MockTag> {
        self.state().created_tags.clone()
    }

    /// Commit messages created through [Repository::user_commit], in order
    pub fn commits(&self) -> Vec<String> {
        self.state().commits.clone()
    }

    pub fn staged(&self) -> Vec<String> {
        self.state().staged.clone()
    }

    pub fn checkouts(&self) -> Vec<String> {
        self.state().checkouts.clone()
    }
}

impl Repository for MockRepository {
    fn checkout(&self, branch: &str) -> Result<()> {
        let mut state = self.state();
        let head = state
            .branches
            .get(branch)
            .cloned()
            .ok_or_else(|| ReleaseError::repository(format!("Branch not found: {}", branch)))?;
        state.head = head;
        state.current_branch = Some(branch.to_string());
        state.checkouts.push(branch.to_string());
        Ok(())
    }

    fn tags(&self) -> Result<Vec<String>> {
        let state = self.state();
        let mut tags = state.existing_tags.clone();
        tags.extend(state.created_tags.iter().map(|t| t.name.clone()));
        Ok(tags)
    }

    fn rev_parse(&self, revision: &str) -> Result<String> {
        let state = self.state();
        if revision == "HEAD" && !state.head.is_empty() {
            return Ok(state.head.clone());
        }
        if let Some(tag) = state.created_tags.iter().find(|t| t.name == revision) {
            return Ok(tag.target.clone());
        }
        state
            .revisions
            .get(revision)
            .cloned()
            .ok_or_else(|| ReleaseError::repository(format!("Unknown revision: {}", revision)))
    }

    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool> {
        // Plain SHAs are taken as they are
        let ancestor = self.rev_parse(ancestor).unwrap_or_else(|_| ancestor.to_string());
        let descendant = self
            .rev_parse(descendant)
            .unwrap_or_else(|_| descendant.to_string());
        Ok(self
            .state()
            .ancestry
            .contains(&(ancestor, descendant)))
    }

    fn tag(&self, name: &str, message: &str) -> Result<()> {
        let mut state = self.state();
        if state.existing_tags.iter().any(|t| t == name)
            || state.created_tags.iter().any(|t| t.name == name)
        {
            return Err(ReleaseError::repository(format!("Tag already exists: {}", name)));
        }
        let target = state.head.clone();
        state.created_tags.push(MockTag {
            name: name.to_string(),
            message: message.to_string(),
            target,
        });
        Ok(())
    }

    fn add(&self, pathspec: &str) -> Result<()> {
        self.state().staged.push(pathspec.to_string());
        Ok(())
    }

    fn user_commit(&self, message: &str) -> Result<()> {
        let mut state = self.state();
        state.commits.push(message.to_string());
        let sha = format!("{:040x}", 0xc0_0000 + state.commits.len());
        if let Some(branch) = state.current_branch.clone() {
            state.branches.insert(branch, sha.clone());
        }
        state.head = sha;
        Ok(())
    }
}
