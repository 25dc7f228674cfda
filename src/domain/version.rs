use crate::error::{ReleaseError, Result};
use std::fmt;

/// A version tag as cut in the repository, ie `v12.0.4` or `v12.0.5-SNAPSHOT`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionTag {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre_release: Option<String>,
}

impl VersionTag {
    /// Create a new release version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        VersionTag {
            major,
            minor,
            patch,
            pre_release: None,
        }
    }

    /// Parse a tag of the form `vMAJOR.MINOR.PATCH[-PRE]`.
    ///
    /// The leading `v` is mandatory; the remainder must be a semantic version.
    pub fn parse(tag: &str) -> Result<Self> {
        let version = tag
            .strip_prefix('v')
            .ok_or_else(|| ReleaseError::malformed_tag(tag, "missing leading 'v'"))?;

        let parsed =
            semver::Version::parse(version).map_err(|e| ReleaseError::malformed_tag(tag, e))?;

        let pre_release = if parsed.pre.is_empty() {
            None
        } else {
            Some(parsed.pre.as_str().to_string())
        };

        Ok(VersionTag {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            pre_release,
        })
    }

    /// Attach a pre-release marker, ie `v12.0.5` -> `v12.0.5-SNAPSHOT`
    pub fn with_pre_release(mut self, marker: impl Into<String>) -> Self {
        self.pre_release = Some(marker.into());
        self
    }

    pub fn is_pre_release(&self) -> bool {
        self.pre_release.is_some()
    }

    /// The version without the leading `v`, as stamped into source files
    pub fn version_string(&self) -> String {
        match &self.pre_release {
            Some(pre) => format!("{}.{}.{}-{}", self.major, self.minor, self.patch, pre),
            None => format!("{}.{}.{}", self.major, self.minor, self.patch),
        }
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.version_string())
    }
}
