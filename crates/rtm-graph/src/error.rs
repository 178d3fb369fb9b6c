//! Error types for graph operations

use rtm_model::ArtifactId;

/// Graph operation failures
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Operation named an artifact the store does not hold
    #[error("artifact not found: {0}")]
    ArtifactNotFound(ArtifactId),
}
