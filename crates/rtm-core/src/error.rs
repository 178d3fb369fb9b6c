//! Error types for RTM Core
//!
//! Provides error handling for:
//! - Persistence collaborator failures
//! - Revert computation (missing pre-commit snapshots)
//! - Structurally invalid commits
//! - Configuration loading

use rtm_graph::GraphError;
use rtm_model::{ModelError, RevertError, VersionId};
use std::path::PathBuf;

/// Main session error type
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Server rejected a commit or its revert; nothing was changed locally
    #[error("persistence failed: {0}")]
    Persistence(#[from] PersistenceError),

    /// Pre-commit snapshot could not be taken
    #[error("revert computation failed: {0}")]
    Revert(#[from] RevertError),

    /// Commit is structurally invalid
    #[error("invalid commit: {0}")]
    InvalidCommit(#[from] ModelError),

    /// Graph operation failed
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// Commit targets a version other than the active one
    #[error("commit targets version {actual}, active version is {expected}")]
    VersionMismatch {
        expected: VersionId,
        actual: VersionId,
    },
}

impl SessionError {
    /// Check if retrying the same operation could succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Persistence(PersistenceError::Unavailable(_)))
    }

    /// Check if the failure came from the persistence collaborator
    #[inline]
    #[must_use]
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Persistence(_))
    }
}

/// Persistence collaborator failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    /// Server refused the commit
    #[error("commit rejected: {0}")]
    Rejected(String),

    /// Server could not be reached
    #[error("persistence unavailable: {0}")]
    Unavailable(String),

    /// Version does not exist server-side
    #[error("version not found: {0}")]
    VersionNotFound(VersionId),
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::RtmConfig`]
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtm_model::EntityKind;

    #[test]
    fn session_error_display() {
        let err = SessionError::from(PersistenceError::Rejected("conflict".to_string()));
        assert_eq!(err.to_string(), "persistence failed: commit rejected: conflict");
        assert!(err.is_persistence());
    }

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(SessionError::from(PersistenceError::Unavailable("down".into())).is_retryable());
        assert!(!SessionError::from(PersistenceError::Rejected("no".into())).is_retryable());
        let revert = SessionError::from(RevertError::EntityNotFound {
            kind: EntityKind::Artifact,
            id: "A1".into(),
        });
        assert!(!revert.is_retryable());
        assert!(!revert.is_persistence());
    }
}
