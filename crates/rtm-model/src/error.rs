//! Error types for the model crate

use crate::ids::TraceId;
use std::fmt::{self, Display, Formatter};

/// Structural problems with entities or commits
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// An entity carries an empty id
    #[error("empty id on entity {0:?}")]
    EmptyId(String),

    /// Trace link points at its own source
    #[error("trace {0} references itself")]
    SelfReferencingTrace(TraceId),

    /// Confidence score outside 0.0..=1.0
    #[error("trace {id} confidence {confidence} outside 0..=1")]
    ConfidenceOutOfRange { id: TraceId, confidence: f64 },

    /// Same id listed in more than one bucket of a commit
    #[error("{kind} {id} appears in more than one commit bucket")]
    ConflictingBuckets { kind: EntityKind, id: String },
}

/// Which collection an entity belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Artifact,
    Trace,
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Artifact => f.write_str("artifact"),
            Self::Trace => f.write_str("trace"),
        }
    }
}

/// Failure computing the inverse of a commit
#[derive(Debug, thiserror::Error)]
pub enum RevertError {
    /// Pre-commit snapshot of an entity could not be located
    #[error("cannot snapshot {kind} {id}: not in store")]
    EntityNotFound { kind: EntityKind, id: String },
}
