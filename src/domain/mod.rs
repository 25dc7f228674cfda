//! Domain types - release branches and version tags, independent of git operations

pub mod branch;
pub mod version;

pub use branch::{branch_major, ReleaseBranch};
pub use version::VersionTag;
