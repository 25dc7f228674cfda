//! Git operations abstraction layer
//!
//! The release pipeline only needs a handful of repository operations. They
//! are captured by the [Repository] trait so the pipeline can run against a
//! real clone or an in-memory double.
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing
//!
//! ```rust
//! # use vtrelease::git::Repository;
//! # fn example(repo: &dyn Repository) -> vtrelease::Result<()> {
//! repo.checkout("release-12.0")?;
//! let head = repo.rev_parse("HEAD")?;
//! println!("release-12.0 is at {}", head);
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;

/// Pathspec that stages every change in the working tree
pub const ALL_CHANGES: &str = "*";

/// Repository operations used while cutting a release
///
/// ## Error Handling
///
/// Implementations map their underlying errors (like `git2::Error`) to
/// [crate::error::ReleaseError] repository variants.
pub trait Repository {
    /// Check out a branch, creating the local branch from `origin` if needed
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Get all tag names in the repository
    fn tags(&self) -> Result<Vec<String>>;

    /// Resolve a revision (SHA, tag, `HEAD~1`, ...) to the full SHA of a commit
    fn rev_parse(&self, revision: &str) -> Result<String>;

    /// Whether `ancestor` is reachable from `descendant`, excluding the commit itself
    fn is_ancestor(&self, ancestor: &str, descendant: &str) -> Result<bool>;

    /// Create an annotated tag on the current HEAD commit
    fn tag(&self, name: &str, message: &str) -> Result<()>;

    /// Stage changes matching the pathspec
    fn add(&self, pathspec: &str) -> Result<()>;

    /// Commit the index on HEAD as the configured user, with a sign-off trailer
    fn user_commit(&self, message: &str) -> Result<()>;
}
