//! Revert generation
//!
//! The inverse of a commit can only be computed from the store as it was
//! *before* the commit landed; afterwards the old values of modified
//! entities are gone. [`PreparedCommit`] encodes that ordering: it is built
//! from a shared borrow of the untouched store, and applying it is the only
//! way to mutate the store with its commit.

use crate::log::CommitHistory;
use rtm_model::{Artifact, Commit, EntityKind, EntityStore, RevertError, TraceLink};

/// A commit paired with the revert captured before it was applied
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedCommit {
    commit: Commit,
    revert: Commit,
}

impl PreparedCommit {
    /// Snapshot the store and compute the revert for `commit`
    ///
    /// # Errors
    /// Returns error if an entity the commit modifies or removes is not in
    /// the store
    pub fn prepare(commit: Commit, store: &EntityStore) -> Result<Self, RevertError> {
        let revert = create_revert(&commit, store)?;
        Ok(Self { commit, revert })
    }

    #[inline]
    #[must_use]
    pub fn commit(&self) -> &Commit {
        &self.commit
    }

    #[inline]
    #[must_use]
    pub fn revert(&self) -> &Commit {
        &self.revert
    }

    /// Apply the commit to the store it was prepared from
    pub(crate) fn apply(self, store: &mut EntityStore) -> CommitHistory {
        store.apply_commit(&self.commit);
        CommitHistory::new(self.commit, self.revert)
    }
}

/// Structural inverse of `commit` against the pre-commit `store`
///
/// - added entities are removed by the revert
/// - removed entities are re-added with their stored values
/// - modified entities are reset to their stored values
///
/// An "added" entity whose id already exists is an overwrite, so the revert
/// restores the stored value instead of removing it.
///
/// # Errors
/// Returns error if a modified or removed entity is not in the store
pub fn create_revert(commit: &Commit, store: &EntityStore) -> Result<Commit, RevertError> {
    let mut revert = Commit::new(commit.version_ref.clone());

    for artifact in &commit.artifacts.added {
        match store.get_artifact(artifact.id.as_str()) {
            Some(existing) => revert.artifacts.modified.push(existing.clone()),
            None => revert.artifacts.removed.push(artifact.clone()),
        }
    }
    for artifact in &commit.artifacts.modified {
        revert.artifacts.modified.push(snapshot_artifact(store, artifact)?);
    }
    for artifact in &commit.artifacts.removed {
        revert.artifacts.added.push(snapshot_artifact(store, artifact)?);
    }

    for trace in &commit.traces.added {
        match store.get_trace(trace.id.as_str()) {
            Some(existing) => revert.traces.modified.push(existing.clone()),
            None => revert.traces.removed.push(trace.clone()),
        }
    }
    for trace in &commit.traces.modified {
        revert.traces.modified.push(snapshot_trace(store, trace)?);
    }
    for trace in &commit.traces.removed {
        revert.traces.added.push(snapshot_trace(store, trace)?);
    }

    Ok(revert)
}

fn snapshot_artifact(store: &EntityStore, artifact: &Artifact) -> Result<Artifact, RevertError> {
    store
        .get_artifact(artifact.id.as_str())
        .cloned()
        .ok_or_else(|| RevertError::EntityNotFound {
            kind: EntityKind::Artifact,
            id: artifact.id.to_string(),
        })
}

fn snapshot_trace(store: &EntityStore, trace: &TraceLink) -> Result<TraceLink, RevertError> {
    store
        .get_trace(trace.id.as_str())
        .cloned()
        .ok_or_else(|| RevertError::EntityNotFound {
            kind: EntityKind::Trace,
            id: trace.id.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rtm_model::ApprovalStatus;

    fn base_store() -> EntityStore {
        EntityStore::from_entities(
            [
                Artifact::new("A1", "a", "req").with_body("X"),
                Artifact::new("A2", "b", "req"),
            ],
            [TraceLink::new("T1", "A1", "A2")],
        )
    }

    #[test]
    fn added_becomes_removed() {
        let commit = Commit::builder("v1")
            .add_artifact(Artifact::new("A9", "new", "req"))
            .build()
            .unwrap();
        let revert = create_revert(&commit, &base_store()).unwrap();
        assert_eq!(revert.artifacts.removed, commit.artifacts.added);
        assert!(revert.artifacts.added.is_empty());
    }

    #[test]
    fn removed_becomes_added_with_stored_value() {
        // The commit only carries a stub; the revert must hold the real entity
        let commit = Commit::builder("v1")
            .remove_artifact(Artifact::new("A1", "stub", "req"))
            .build()
            .unwrap();
        let revert = create_revert(&commit, &base_store()).unwrap();
        assert_eq!(revert.artifacts.added[0].body, "X");
        assert_eq!(revert.artifacts.added[0].name, "a");
    }

    #[test]
    fn modified_captures_pre_commit_value() {
        let commit = Commit::builder("v1")
            .modify_artifact(Artifact::new("A1", "a", "req").with_body("Y"))
            .modify_trace(TraceLink::new("T1", "A1", "A2").with_status(ApprovalStatus::Approved))
            .build()
            .unwrap();
        let revert = create_revert(&commit, &base_store()).unwrap();
        assert_eq!(revert.artifacts.modified[0].body, "X");
        assert_eq!(revert.traces.modified[0].approval_status, ApprovalStatus::Unreviewed);
    }

    #[test]
    fn missing_snapshot_aborts() {
        let commit = Commit::builder("v1")
            .modify_artifact(Artifact::new("GONE", "x", "req"))
            .build()
            .unwrap();
        let err = create_revert(&commit, &base_store()).unwrap_err();
        assert!(matches!(
            err,
            RevertError::EntityNotFound {
                kind: EntityKind::Artifact,
                ..
            }
        ));
    }

    #[test]
    fn missing_removed_trace_aborts() {
        let commit = Commit::builder("v1")
            .remove_trace(TraceLink::new("T404", "A1", "A2"))
            .build()
            .unwrap();
        assert!(create_revert(&commit, &base_store()).is_err());
    }

    #[test]
    fn overwrite_add_restores_previous_value() {
        let commit = Commit::builder("v1")
            .add_artifact(Artifact::new("A1", "a", "req").with_body("over"))
            .build()
            .unwrap();
        let revert = create_revert(&commit, &base_store()).unwrap();
        assert!(revert.artifacts.removed.is_empty());
        assert_eq!(revert.artifacts.modified[0].body, "X");
    }

    #[test]
    fn revert_then_commit_round_trips() {
        let before = base_store();
        let commit = Commit::builder("v1")
            .add_artifact(Artifact::new("A3", "c", "req"))
            .modify_artifact(Artifact::new("A1", "a", "req").with_body("Y"))
            .remove_trace(TraceLink::new("T1", "A1", "A2"))
            .add_trace(TraceLink::new("T2", "A2", "A3"))
            .build()
            .unwrap();

        let mut store = before.clone();
        let history = PreparedCommit::prepare(commit.clone(), &store)
            .unwrap()
            .apply(&mut store);
        let after_commit = store.clone();

        store.apply_commit(&history.revert);
        assert!(store.same_entities(&before));

        store.apply_commit(&commit);
        assert!(store.same_entities(&after_commit));
    }
}
