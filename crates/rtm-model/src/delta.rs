//! Version delta payloads
//!
//! A [`VersionDelta`] describes the differences between two versions of the
//! graph, pre-split into added / modified / removed buckets for artifacts
//! and trace links. The server normally produces it; [`VersionDelta::between`]
//! derives one from two local store snapshots.

use crate::artifact::Artifact;
use crate::hash::FingerprintError;
use crate::ids::{ArtifactId, TraceId};
use crate::store::EntityStore;
use crate::trace::TraceLink;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Before/after pair for a modified entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification<T> {
    pub before: T,
    pub after: T,
}

impl<T> Modification<T> {
    #[inline]
    #[must_use]
    pub fn new(before: T, after: T) -> Self {
        Self { before, after }
    }
}

/// Three buckets of changes for one entity kind, keyed by id
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "K: Serialize + Eq + Hash, T: Serialize",
    deserialize = "K: Deserialize<'de> + Eq + Hash, T: Deserialize<'de>"
))]
pub struct EntityDelta<K, T> {
    #[serde(default = "IndexMap::new")]
    pub added: IndexMap<K, T>,
    #[serde(default = "IndexMap::new")]
    pub modified: IndexMap<K, Modification<T>>,
    #[serde(default = "IndexMap::new")]
    pub removed: IndexMap<K, T>,
}

impl<K, T> Default for EntityDelta<K, T> {
    fn default() -> Self {
        Self {
            added: IndexMap::new(),
            modified: IndexMap::new(),
            removed: IndexMap::new(),
        }
    }
}

impl<K: Eq + Hash, T: PartialEq> PartialEq for EntityDelta<K, T> {
    fn eq(&self, other: &Self) -> bool {
        self.added == other.added
            && self.modified == other.modified
            && self.removed == other.removed
    }
}

impl<K: Eq + Hash, T> EntityDelta<K, T> {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }

    /// Every id mentioned in any bucket
    pub fn ids(&self) -> impl Iterator<Item = &K> {
        self.added
            .keys()
            .chain(self.modified.keys())
            .chain(self.removed.keys())
    }

    /// Every entity value the payload carries; modified entries yield `after`
    pub fn entities(&self) -> impl Iterator<Item = &T> {
        self.added
            .values()
            .chain(self.modified.values().map(|m| &m.after))
            .chain(self.removed.values())
    }
}

/// Differences between two versions of the graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VersionDelta {
    #[serde(default)]
    pub artifacts: EntityDelta<ArtifactId, Artifact>,
    #[serde(default)]
    pub traces: EntityDelta<TraceId, TraceLink>,
}

impl VersionDelta {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty() && self.traces.is_empty()
    }

    /// Derive a delta from two store snapshots
    ///
    /// Entities present only in `after` are added, only in `before` are
    /// removed, and present in both with different fingerprints are modified.
    ///
    /// # Errors
    /// Returns error if an entity cannot be fingerprinted
    pub fn between(before: &EntityStore, after: &EntityStore) -> Result<Self, FingerprintError> {
        let mut delta = Self::new();

        for artifact in after.artifacts() {
            match before.get_artifact(artifact.id.as_str()) {
                None => {
                    delta
                        .artifacts
                        .added
                        .insert(artifact.id.clone(), artifact.clone());
                }
                Some(old) if old.fingerprint()? != artifact.fingerprint()? => {
                    delta.artifacts.modified.insert(
                        artifact.id.clone(),
                        Modification::new(old.clone(), artifact.clone()),
                    );
                }
                Some(_) => {}
            }
        }
        for artifact in before.artifacts() {
            if !after.contains_artifact(artifact.id.as_str()) {
                delta
                    .artifacts
                    .removed
                    .insert(artifact.id.clone(), artifact.clone());
            }
        }

        for trace in after.traces() {
            match before.get_trace(trace.id.as_str()) {
                None => {
                    delta.traces.added.insert(trace.id.clone(), trace.clone());
                }
                Some(old) if old.fingerprint()? != trace.fingerprint()? => {
                    delta.traces.modified.insert(
                        trace.id.clone(),
                        Modification::new(old.clone(), trace.clone()),
                    );
                }
                Some(_) => {}
            }
        }
        for trace in before.traces() {
            if !after.contains_trace(trace.id.as_str()) {
                delta.traces.removed.insert(trace.id.clone(), trace.clone());
            }
        }

        Ok(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::ApprovalStatus;
    use pretty_assertions::assert_eq;

    #[test]
    fn between_buckets_changes() {
        let before = EntityStore::from_entities(
            [
                Artifact::new("A1", "a", "req").with_body("X"),
                Artifact::new("A2", "b", "req"),
            ],
            [TraceLink::new("T1", "A1", "A2").with_status(ApprovalStatus::Approved)],
        );
        let after = EntityStore::from_entities(
            [
                Artifact::new("A1", "a", "req").with_body("Y"),
                Artifact::new("A3", "c", "req"),
            ],
            [TraceLink::new("T1", "A1", "A2").with_status(ApprovalStatus::Declined)],
        );

        let delta = VersionDelta::between(&before, &after).unwrap();

        assert_eq!(
            delta.artifacts.added.keys().map(ArtifactId::as_str).collect::<Vec<_>>(),
            vec!["A3"]
        );
        assert_eq!(delta.artifacts.modified["A1"].before.body, "X");
        assert_eq!(delta.artifacts.modified["A1"].after.body, "Y");
        assert!(delta.artifacts.removed.contains_key("A2"));
        assert!(delta.traces.modified["T1"].after.is_declined());
        assert_eq!(delta.artifacts.len(), 3);
    }

    #[test]
    fn identical_stores_produce_empty_delta() {
        let store = EntityStore::from_entities([Artifact::new("A1", "a", "req")], []);
        assert!(VersionDelta::between(&store, &store.clone()).unwrap().is_empty());
    }

    #[test]
    fn payload_deserializes_from_wire_json() {
        let json = r#"{
            "artifacts": {"added": {"A1": {"id": "A1", "name": "a", "type": "req"}}},
            "traces": {"modified": {"T1": {
                "before": {"id": "T1", "sourceId": "A", "targetId": "B", "approvalStatus": "APPROVED"},
                "after": {"id": "T1", "sourceId": "A", "targetId": "B", "approvalStatus": "DECLINED"}
            }}}
        }"#;
        let delta: VersionDelta = serde_json::from_str(json).unwrap();

        assert_eq!(delta.artifacts.added.len(), 1);
        assert!(delta.traces.modified["T1"].after.is_declined());
        assert_eq!(delta.traces.entities().count(), 1);
    }
}
