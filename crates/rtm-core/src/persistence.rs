//! Persistence collaborator seam
//!
//! The server is authoritative. The session only mutates its local state
//! after the collaborator has acknowledged a write.

use crate::error::PersistenceError;
use async_trait::async_trait;
use rtm_model::{Commit, VersionDelta, VersionId};
use serde::{Deserialize, Serialize};

/// Project and version an editor session is bound to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectScope {
    pub project_id: String,
    pub version_id: VersionId,
}

impl ProjectScope {
    #[inline]
    #[must_use]
    pub fn new(project_id: impl Into<String>, version_id: impl Into<VersionId>) -> Self {
        Self {
            project_id: project_id.into(),
            version_id: version_id.into(),
        }
    }
}

/// Server-side store for commits and version deltas
///
/// A commit either applies fully server-side or is rejected; there is no
/// partial success.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitPersistence: Send + Sync {
    /// Persist a commit against `commit.version_ref`
    async fn persist_commit(&self, commit: &Commit) -> Result<(), PersistenceError>;

    /// Differences from `baseline` to `current`, pre-split into buckets
    async fn load_delta(
        &self,
        baseline: &VersionId,
        current: &VersionId,
    ) -> Result<VersionDelta, PersistenceError>;
}
