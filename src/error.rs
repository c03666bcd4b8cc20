//! Error types and exit codes for semfora-search
//!
//! Collaborators translate their native failures into [`SearchError`] at the
//! boundary; the search core only ever looks at [`SearchError::kind`].

use std::process::ExitCode;
use thiserror::Error;

/// Main error type for semfora-search operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Repository not found: {repo}")]
    RepoNotFound { repo: String },

    #[error("Repository is still being cloned: {repo}")]
    RepoCloning { repo: String },

    #[error("Revision not found: {repo}@{rev}")]
    RevisionNotFound { repo: String, rev: String },

    #[error("Search timed out: {message}")]
    Timeout { message: String },

    #[error("Temporary backend failure: {message}")]
    Temporary { message: String },

    #[error("Search cancelled")]
    Cancelled,

    #[error("Backend error: {message}")]
    Backend { message: String },

    #[error("Invalid pattern: {message}")]
    InvalidPattern { message: String },

    #[error("Search task failed: {message}")]
    TaskFailed { message: String },

    #[error("Config error: {message}")]
    ConfigError { message: String },

    #[error("Catalog error: {message}")]
    CatalogError { message: String },

    #[error("IO error: {message}")]
    Io { message: String },
}

/// Closed classification of a [`SearchError`]
///
/// This is what the per-repository invoker switches on when it decides whether
/// a failure is recorded into the aggregate or surfaced to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Repository exists but is still being provisioned
    Cloning,
    /// Repository does not exist
    Missing,
    /// Requested revision does not resolve to a commit
    RevisionNotFound,
    /// Collaborator exceeded its time budget
    Timeout,
    /// Collaborator reported a transient failure
    Temporary,
    /// Work was abandoned because the surrounding context was cancelled
    Cancelled,
    /// Anything else
    Fatal,
}

impl SearchError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RepoCloning { .. } => ErrorKind::Cloning,
            Self::RepoNotFound { .. } => ErrorKind::Missing,
            Self::RevisionNotFound { .. } => ErrorKind::RevisionNotFound,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Temporary { .. } => ErrorKind::Temporary,
            Self::Cancelled => ErrorKind::Cancelled,
            _ => ErrorKind::Fatal,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    pub fn is_temporary(&self) -> bool {
        self.kind() == ErrorKind::Temporary
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    /// Convert error to appropriate exit code:
    /// - 0: Success
    /// - 1: IO / catalog error
    /// - 2: Config or pattern error
    /// - 3: Repository or revision error
    /// - 4: Backend failure (fatal, timeout, temporary, task panic)
    /// - 130: Cancelled
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Io { .. } | Self::CatalogError { .. } => ExitCode::from(1),
            Self::ConfigError { .. } | Self::InvalidPattern { .. } => ExitCode::from(2),
            Self::RepoNotFound { .. }
            | Self::RepoCloning { .. }
            | Self::RevisionNotFound { .. } => ExitCode::from(3),
            Self::Timeout { .. }
            | Self::Temporary { .. }
            | Self::Backend { .. }
            | Self::TaskFailed { .. } => ExitCode::from(4),
            Self::Cancelled => ExitCode::from(130),
        }
    }
}

impl From<std::io::Error> for SearchError {
    fn from(e: std::io::Error) -> Self {
        Self::Io {
            message: e.to_string(),
        }
    }
}

impl From<regex::Error> for SearchError {
    fn from(e: regex::Error) -> Self {
        Self::InvalidPattern {
            message: e.to_string(),
        }
    }
}

/// Result type alias for semfora-search operations
pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        let cloning = SearchError::RepoCloning {
            repo: "github.com/a/b".into(),
        };
        assert_eq!(cloning.kind(), ErrorKind::Cloning);
        assert_eq!(
            SearchError::RepoNotFound { repo: "x".into() }.kind(),
            ErrorKind::Missing
        );
        assert!(SearchError::Timeout {
            message: "slow".into()
        }
        .is_timeout());
        assert!(SearchError::Temporary {
            message: "503".into()
        }
        .is_temporary());
        assert!(SearchError::Cancelled.is_cancelled());
        assert_eq!(
            SearchError::Backend {
                message: "boom".into()
            }
            .kind(),
            ErrorKind::Fatal
        );
    }

    #[test]
    fn test_regex_error_is_invalid_pattern() {
        let err: SearchError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, SearchError::InvalidPattern { .. }));
        assert_eq!(err.kind(), ErrorKind::Fatal);
    }
}
