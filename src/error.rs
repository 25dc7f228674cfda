use thiserror::Error;

/// Unified error type for vtrelease operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid release branch '{0}': expected release-<major>.0")]
    InvalidBranch(String),

    #[error("Unable to get major version from branch")]
    UnresolvedMajor,

    #[error("Required executable '{program}' not found: {reason}")]
    MissingExecutable { program: String, reason: String },

    #[error("Malformed version tag '{tag}': {reason}")]
    MalformedTag { tag: String, reason: String },

    #[error("Invalid commit range: {0}")]
    CommitRange(String),

    #[error("External tool failed: {0}")]
    Tool(String),

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Repository error: {0}")]
    Repository(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{operation}: {source}")]
    Context {
        operation: String,
        #[source]
        source: Box<ReleaseError>,
    },
}

/// Convenience type alias for Results in vtrelease
pub type Result<T> = std::result::Result<T, ReleaseError>;

/// Failure classes of a release run.
///
/// Configuration errors happen before the repository is touched. Every other
/// class may leave the working tree or history partially modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Configuration,
    Resolution,
    ExternalTool,
    Repository,
}

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create a commit range error with context
    pub fn commit_range(msg: impl Into<String>) -> Self {
        ReleaseError::CommitRange(msg.into())
    }

    /// Create an external tool error with context
    pub fn tool(msg: impl Into<String>) -> Self {
        ReleaseError::Tool(msg.into())
    }

    /// Create a repository error with context
    pub fn repository(msg: impl Into<String>) -> Self {
        ReleaseError::Repository(msg.into())
    }

    pub fn malformed_tag(tag: impl Into<String>, reason: impl ToString) -> Self {
        ReleaseError::MalformedTag {
            tag: tag.into(),
            reason: reason.to_string(),
        }
    }

    /// Wrap this error with the operation that was being attempted
    pub fn wrap(self, operation: impl Into<String>) -> Self {
        ReleaseError::Context {
            operation: operation.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, below all operation context
    pub fn root(&self) -> &ReleaseError {
        match self {
            ReleaseError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ReleaseError::Context { source, .. } => source.kind(),
            ReleaseError::Config(_)
            | ReleaseError::InvalidBranch(_)
            | ReleaseError::UnresolvedMajor
            | ReleaseError::MissingExecutable { .. } => ErrorKind::Configuration,
            ReleaseError::MalformedTag { .. } | ReleaseError::CommitRange(_) => {
                ErrorKind::Resolution
            }
            ReleaseError::Tool(_) => ErrorKind::ExternalTool,
            ReleaseError::Git(_) | ReleaseError::Repository(_) | ReleaseError::Io(_) => {
                ErrorKind::Repository
            }
        }
    }
}

/// Adds operation context to fallible results
pub trait ErrorContext<T> {
    fn context(self, operation: impl Into<String>) -> Result<T>;

    fn with_context<S, F>(self, operation: F) -> Result<T>
    where
        S: Into<String>,
        F: FnOnce() -> S;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: Into<ReleaseError>,
{
    fn context(self, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().wrap(operation))
    }

    fn with_context<S, F>(self, operation: F) -> Result<T>
    where
        S: Into<String>,
        F: FnOnce() -> S,
    {
        self.map_err(|e| e.into().wrap(operation()))
    }
}
