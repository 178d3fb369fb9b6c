//! RTM Model
//!
//! Entities of the traceability graph and the store that owns them.
//!
//! # Core Concepts
//!
//! - [`Artifact`]: requirement-like node, identified by [`ArtifactId`]
//! - [`TraceLink`]: directed, approval-gated relation between artifacts
//! - [`EntityStore`]: id-keyed collections with O(1) lookup
//! - [`Commit`]: added / modified / removed entities for one user edit
//! - [`VersionDelta`]: differences between two versions of the graph
//!
//! # Example
//!
//! ```rust
//! use rtm_model::{Artifact, Commit, EntityStore};
//!
//! let mut store = EntityStore::new();
//! let commit = Commit::builder("v1")
//!     .add_artifact(Artifact::new("A1", "Login", "requirement"))
//!     .build()
//!     .unwrap();
//!
//! store.apply_commit(&commit);
//! assert!(store.contains_artifact("A1"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod artifact;
mod commit;
mod delta;
mod error;
mod hash;
mod ids;
mod store;
mod trace;

pub use artifact::Artifact;
pub use commit::{ChangeSet, Commit, CommitBuilder};
pub use delta::{EntityDelta, Modification, VersionDelta};
pub use error::{EntityKind, ModelError, RevertError};
pub use hash::{Fingerprint, FingerprintError};
pub use ids::{ArtifactId, TraceId, VersionId};
pub use store::EntityStore;
pub use trace::{ApprovalStatus, TraceLink, TraceType};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn commit_then_delta_reports_changes() {
        let before = EntityStore::from_entities([Artifact::new("A1", "a", "req")], []);
        let mut after = before.clone();
        let commit = Commit::builder("v1")
            .add_artifact(Artifact::new("A2", "b", "req"))
            .add_trace(TraceLink::new("T1", "A1", "A2"))
            .build()
            .unwrap();
        after.apply_commit(&commit);

        let delta = VersionDelta::between(&before, &after).unwrap();
        assert!(delta.artifacts.added.contains_key("A2"));
        assert!(delta.traces.added.contains_key("T1"));
        assert!(delta.artifacts.modified.is_empty());
    }

    proptest! {
        #[test]
        fn upsert_is_idempotent(ids in proptest::collection::vec("[a-z]{1,4}", 0..20)) {
            let artifacts: Vec<Artifact> =
                ids.iter().map(|id| Artifact::new(id.as_str(), id.as_str(), "req")).collect();
            let mut once = EntityStore::new();
            once.upsert_artifacts(artifacts.clone());
            let mut twice = once.clone();
            twice.upsert_artifacts(artifacts);

            prop_assert!(once.same_entities(&twice));
            let distinct: std::collections::HashSet<_> = ids.iter().collect();
            prop_assert_eq!(once.artifact_count(), distinct.len());
        }
    }
}
