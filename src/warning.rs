use std::fmt;

/// Non-fatal conditions met while cutting a release.
/// These never stop a run; they are logged so the operator can double check.
#[derive(Debug, Clone, PartialEq)]
pub enum ReleaseWarning {
    /// No release tag exists for the branch major yet
    NoPreviousVersion { branch_major: u64 },
    /// The release notes file was already present and will be regenerated
    ReleaseNotesExist { path: String },
    /// The bare version tag was re-issued and now targets another distribution
    BareTagRetargeted { tag: String, distribution: String },
}

impl fmt::Display for ReleaseWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseWarning::NoPreviousVersion { branch_major } => {
                write!(
                    f,
                    "No v{}.x.y tags found in the branch. Assuming new branch.",
                    branch_major
                )
            }
            ReleaseWarning::ReleaseNotesExist { path } => {
                write!(f, "Release notes file '{}' already exists", path)
            }
            ReleaseWarning::BareTagRetargeted { tag, distribution } => {
                write!(
                    f,
                    "Image tag '{}' now points at the {} build",
                    tag, distribution
                )
            }
        }
    }
}
