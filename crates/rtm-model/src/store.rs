//! Canonical in-memory entity collections
//!
//! Provides [`EntityStore`], the id-keyed home of every artifact and trace
//! link the editor knows about. Insertion order is preserved so iteration
//! (and anything derived from it, like root selection) is deterministic.

use crate::artifact::Artifact;
use crate::commit::Commit;
use crate::ids::{ArtifactId, TraceId};
use crate::trace::TraceLink;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Id-keyed artifacts and trace links
///
/// # Invariants
/// - At most one entity per id in each collection
/// - `topology_generation` changes whenever the node set or any edge
///   endpoint changes; content-only edits leave it alone
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EntityStore {
    artifacts: IndexMap<ArtifactId, Artifact>,
    traces: IndexMap<TraceId, TraceLink>,
    topology_generation: u64,
}

impl EntityStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from initial collections
    #[must_use]
    pub fn from_entities(
        artifacts: impl IntoIterator<Item = Artifact>,
        traces: impl IntoIterator<Item = TraceLink>,
    ) -> Self {
        let mut store = Self::new();
        store.upsert_artifacts(artifacts);
        store.upsert_traces(traces);
        store
    }

    // ---- reads ----

    /// Artifact by canonical id, O(1)
    #[inline]
    #[must_use]
    pub fn get_artifact(&self, id: &str) -> Option<&Artifact> {
        self.artifacts.get(id)
    }

    /// Trace link by canonical id, O(1)
    #[inline]
    #[must_use]
    pub fn get_trace(&self, id: &str) -> Option<&TraceLink> {
        self.traces.get(id)
    }

    /// Legacy lookup by display name
    ///
    /// Names are not unique. When several artifacts share a name the
    /// earliest inserted one wins. Prefer [`Self::get_artifact`].
    #[must_use]
    pub fn artifact_by_name(&self, name: &str) -> Option<&Artifact> {
        self.artifacts.values().find(|a| a.name == name)
    }

    #[inline]
    #[must_use]
    pub fn contains_artifact(&self, id: &str) -> bool {
        self.artifacts.contains_key(id)
    }

    #[inline]
    #[must_use]
    pub fn contains_trace(&self, id: &str) -> bool {
        self.traces.contains_key(id)
    }

    /// All artifacts in insertion order
    pub fn artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.artifacts.values()
    }

    /// All trace links in insertion order
    pub fn traces(&self) -> impl Iterator<Item = &TraceLink> {
        self.traces.values()
    }

    /// Artifact ids in insertion order
    pub fn artifact_ids(&self) -> impl Iterator<Item = &ArtifactId> {
        self.artifacts.keys()
    }

    /// Links whose source is `id`
    pub fn outgoing<'a>(&'a self, id: &'a ArtifactId) -> impl Iterator<Item = &'a TraceLink> {
        self.traces.values().filter(move |t| &t.source_id == id)
    }

    /// Links whose target is `id`
    pub fn incoming<'a>(&'a self, id: &'a ArtifactId) -> impl Iterator<Item = &'a TraceLink> {
        self.traces.values().filter(move |t| &t.target_id == id)
    }

    /// Artifacts one link away in either direction
    #[must_use]
    pub fn neighbors(&self, id: &ArtifactId) -> HashSet<ArtifactId> {
        self.traces
            .values()
            .filter_map(|t| {
                if &t.source_id == id {
                    Some(t.target_id.clone())
                } else if &t.target_id == id {
                    Some(t.source_id.clone())
                } else {
                    None
                }
            })
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn artifact_count(&self) -> usize {
        self.artifacts.len()
    }

    #[inline]
    #[must_use]
    pub fn trace_count(&self) -> usize {
        self.traces.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty() && self.traces.is_empty()
    }

    /// Counter bumped on every topology change
    #[inline]
    #[must_use]
    pub fn topology_generation(&self) -> u64 {
        self.topology_generation
    }

    // ---- writes ----

    /// Merge artifacts by id; existing entries are fully replaced
    pub fn upsert_artifacts(&mut self, artifacts: impl IntoIterator<Item = Artifact>) {
        let mut grew = false;
        for artifact in artifacts {
            grew |= self
                .artifacts
                .insert(artifact.id.clone(), artifact)
                .is_none();
        }
        if grew {
            self.bump_topology();
        }
    }

    /// Merge trace links by id; existing entries are fully replaced
    pub fn upsert_traces(&mut self, traces: impl IntoIterator<Item = TraceLink>) {
        let mut rewired = false;
        for trace in traces {
            let (source, target) = (trace.source_id.clone(), trace.target_id.clone());
            match self.traces.insert(trace.id.clone(), trace) {
                Some(old) if old.source_id == source && old.target_id == target => {}
                _ => rewired = true,
            }
        }
        if rewired {
            self.bump_topology();
        }
    }

    /// Drop every artifact whose id is in `ids`
    pub fn remove_artifacts<'a>(&mut self, ids: impl IntoIterator<Item = &'a ArtifactId>) {
        let ids: HashSet<&ArtifactId> = ids.into_iter().collect();
        let before = self.artifacts.len();
        self.artifacts.retain(|id, _| !ids.contains(id));
        if self.artifacts.len() != before {
            self.bump_topology();
        }
    }

    /// Drop every trace link whose id is in `ids`
    pub fn remove_traces<'a>(&mut self, ids: impl IntoIterator<Item = &'a TraceId>) {
        let ids: HashSet<&TraceId> = ids.into_iter().collect();
        let before = self.traces.len();
        self.traces.retain(|id, _| !ids.contains(id));
        if self.traces.len() != before {
            self.bump_topology();
        }
    }

    /// Apply a commit: removals first, then additions and modifications
    pub fn apply_commit(&mut self, commit: &Commit) {
        self.remove_traces(commit.traces.removed.iter().map(|t| &t.id));
        self.remove_artifacts(commit.artifacts.removed.iter().map(|a| &a.id));
        self.upsert_artifacts(
            commit
                .artifacts
                .added
                .iter()
                .chain(&commit.artifacts.modified)
                .cloned(),
        );
        self.upsert_traces(
            commit
                .traces
                .added
                .iter()
                .chain(&commit.traces.modified)
                .cloned(),
        );
        tracing::trace!(
            artifacts = self.artifacts.len(),
            traces = self.traces.len(),
            "commit applied to store"
        );
    }

    /// Drop everything
    pub fn clear(&mut self) {
        if !self.is_empty() {
            self.artifacts.clear();
            self.traces.clear();
            self.bump_topology();
        }
    }

    /// Same entities regardless of generation counter or order
    #[must_use]
    pub fn same_entities(&self, other: &Self) -> bool {
        self.artifacts == other.artifacts && self.traces == other.traces
    }

    fn bump_topology(&mut self) {
        self.topology_generation = self.topology_generation.wrapping_add(1);
    }
}
