use std::fmt;

use regex::Regex;

use crate::error::{ReleaseError, Result};

/// Returns the major version scoped by a release branch, ie release-12.0 -> 12.
///
/// Any name that is not exactly `release-<N>.0` yields 0, which callers must
/// read as "unresolved" rather than as a real major version.
pub fn branch_major(branch: &str) -> u64 {
    Regex::new(r"^release-(\d+)\.0$")
        .ok()
        .and_then(|re| re.captures(branch))
        .and_then(|captures| captures.get(1))
        .and_then(|major| major.as_str().parse::<u64>().ok())
        .unwrap_or(0)
}

/// A validated release branch of the form `release-<major>.0`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseBranch {
    name: String,
    major: u64,
}

impl ReleaseBranch {
    /// Parse a branch name, rejecting anything that does not scope a major version
    pub fn parse(name: &str) -> Result<Self> {
        match branch_major(name) {
            0 => Err(ReleaseError::InvalidBranch(name.to_string())),
            major => Ok(ReleaseBranch {
                name: name.to_string(),
                major,
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn major(&self) -> u64 {
        self.major
    }
}

impl fmt::Display for ReleaseBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
