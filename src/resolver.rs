//! Version resolution over branch-scoped tag history
//!
//! Pure computation: given the major version a release branch scopes and a
//! snapshot of the repository's tag names, work out the last release cut on
//! the branch and the versions that follow it. Nothing here touches git.

use tracing::{debug, warn};

use crate::domain::VersionTag;
use crate::error::{ReleaseError, Result};
use crate::warning::ReleaseWarning;

pub use crate::domain::branch_major;

/// Marker appended to the development version stamped after a release
pub const DEFAULT_DEV_MARKER: &str = "SNAPSHOT";

/// Finds the last release cut for `branch_major` among `tags`.
///
/// Only tags starting with `v<major>.` are considered. Any of those that is
/// not a semantic version aborts the scan. Pre-release tags are never release
/// cuts and are ignored. The winner is the greatest `(minor, patch)` pair,
/// compared numerically.
///
/// # Returns
/// * `Ok(Some(tag))` - The last release on the branch
/// * `Ok(None)` - No release has been cut from the branch yet
/// * `Err` - The major is unresolved or a branch tag is malformed
pub fn last_version<S: AsRef<str>>(branch_major: u64, tags: &[S]) -> Result<Option<VersionTag>> {
    if branch_major == 0 {
        return Err(ReleaseError::UnresolvedMajor);
    }

    let prefix = format!("v{}.", branch_major);
    let mut last: Option<VersionTag> = None;

    for tag in tags.iter().map(AsRef::as_ref) {
        if !tag.starts_with(&prefix) {
            continue;
        }

        let version = VersionTag::parse(tag)?;
        if version.is_pre_release() {
            debug!("Skipping pre-release tag {}", tag);
            continue;
        }

        let newer = last
            .as_ref()
            .map_or(true, |current| (version.minor, version.patch) > (current.minor, current.patch));
        if newer {
            last = Some(version);
        }
    }

    if last.is_none() {
        warn!("{}", ReleaseWarning::NoPreviousVersion { branch_major });
    }

    Ok(last)
}

/// Next patch release: `M.a.b` -> `M.a.(b+1)`, or `M.0.0` for a new branch
pub fn next_patch(branch_major: u64, last: Option<&VersionTag>) -> Result<VersionTag> {
    match last {
        Some(last) => Ok(VersionTag::new(
            last.major,
            last.minor,
            increment(last, "patch", last.patch)?,
        )),
        None => first_version(branch_major),
    }
}

/// Next minor release: `M.a.b` -> `M.(a+1).0`, or `M.0.0` for a new branch
pub fn next_minor(branch_major: u64, last: Option<&VersionTag>) -> Result<VersionTag> {
    match last {
        Some(last) => Ok(VersionTag::new(
            last.major,
            increment(last, "minor", last.minor)?,
            0,
        )),
        None => first_version(branch_major),
    }
}

/// Development version stamped into the sources once `release` is tagged.
///
/// It is the patch following the release, carrying a pre-release marker so
/// that it can never be picked up by [`last_version`], ie
/// `v12.0.4` -> `v12.0.5-SNAPSHOT`.
pub fn next_dev_version(release: &VersionTag, marker: &str) -> Result<VersionTag> {
    let patch = increment(release, "patch", release.patch)?;
    Ok(VersionTag::new(release.major, release.minor, patch).with_pre_release(marker))
}

fn increment(tag: &VersionTag, component: &str, value: u64) -> Result<u64> {
    value.checked_add(1).ok_or_else(|| {
        ReleaseError::malformed_tag(
            tag.to_string(),
            format!("{} number cannot be incremented", component),
        )
    })
}

fn first_version(branch_major: u64) -> Result<VersionTag> {
    if branch_major == 0 {
        return Err(ReleaseError::UnresolvedMajor);
    }
    Ok(VersionTag::new(branch_major, 0, 0))
}
