//! Delta classification
//!
//! Provides [`DeltaClassifier`] for answering "how did this entity change
//! between the two versions being compared". Classification is a pure
//! lookup into the loaded payload; ingestion is the only step that touches
//! the entity store.

use rtm_model::{ArtifactId, EntityStore, TraceId, VersionDelta};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// How an entity changed between two versions
///
/// Ordered `NoChange < Added < Modified < Removed` so batches collect into a
/// stable [`BTreeSet`].
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeltaState {
    #[default]
    NoChange,
    Added,
    Modified,
    Removed,
}

impl DeltaState {
    #[inline]
    #[must_use]
    pub fn is_change(&self) -> bool {
        !matches!(self, Self::NoChange)
    }
}

/// Per-bucket counts of a loaded payload
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeltaSummary {
    pub artifacts_added: usize,
    pub artifacts_modified: usize,
    pub artifacts_removed: usize,
    pub traces_added: usize,
    pub traces_modified: usize,
    pub traces_removed: usize,
}

impl DeltaSummary {
    #[must_use]
    pub fn of(delta: &VersionDelta) -> Self {
        Self {
            artifacts_added: delta.artifacts.added.len(),
            artifacts_modified: delta.artifacts.modified.len(),
            artifacts_removed: delta.artifacts.removed.len(),
            traces_added: delta.traces.added.len(),
            traces_modified: delta.traces.modified.len(),
            traces_removed: delta.traces.removed.len(),
        }
    }

    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.artifacts_added
            + self.artifacts_modified
            + self.artifacts_removed
            + self.traces_added
            + self.traces_modified
            + self.traces_removed
    }
}

/// Classifier over the active version delta
///
/// # Invariants
/// - No payload loaded means delta mode is inactive and every query answers
///   [`DeltaState::NoChange`]
/// - `current_view` is empty while inactive
#[derive(Debug, Clone)]
pub struct DeltaClassifier {
    payload: Option<VersionDelta>,
    current_view: HashSet<ArtifactId>,
    neighbor_context: bool,
}

impl Default for DeltaClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl DeltaClassifier {
    /// Inactive classifier that widens the view by one hop
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            payload: None,
            current_view: HashSet::new(),
            neighbor_context: true,
        }
    }

    /// Whether immediate neighbors of changed artifacts join the view
    #[inline]
    #[must_use]
    pub fn with_neighbor_context(mut self, enabled: bool) -> Self {
        self.neighbor_context = enabled;
        self
    }

    /// Load a payload and enter delta mode
    ///
    /// Every entity the payload carries is merged into `store` (modified
    /// entries by their `after` value) so off-screen entities stay
    /// queryable. The current view becomes every referenced artifact, both
    /// ends of every referenced trace, and, with neighbor context on, each
    /// of those artifacts' immediate neighbors.
    pub fn set_delta_payload(&mut self, payload: VersionDelta, store: &mut EntityStore) {
        store.upsert_artifacts(payload.artifacts.entities().cloned());
        store.upsert_traces(payload.traces.entities().cloned());

        let mut view: HashSet<ArtifactId> = payload.artifacts.ids().cloned().collect();
        for trace in payload.traces.entities() {
            view.insert(trace.source_id.clone());
            view.insert(trace.target_id.clone());
        }
        if self.neighbor_context {
            let neighbors: Vec<ArtifactId> = view
                .iter()
                .flat_map(|id| store.neighbors(id))
                .collect();
            view.extend(neighbors);
        }

        let summary = DeltaSummary::of(&payload);
        tracing::info!(
            changes = summary.total(),
            view = view.len(),
            "delta payload loaded"
        );

        self.current_view = view;
        self.payload = Some(payload);
    }

    /// Leave delta mode
    pub fn clear(&mut self) {
        self.payload = None;
        self.current_view.clear();
    }

    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.payload.is_some()
    }

    #[inline]
    #[must_use]
    pub fn payload(&self) -> Option<&VersionDelta> {
        self.payload.as_ref()
    }

    #[must_use]
    pub fn summary(&self) -> DeltaSummary {
        self.payload
            .as_ref()
            .map(DeltaSummary::of)
            .unwrap_or_default()
    }

    /// Artifacts scoped into the delta view
    #[inline]
    #[must_use]
    pub fn current_view(&self) -> &HashSet<ArtifactId> {
        &self.current_view
    }

    #[inline]
    #[must_use]
    pub fn is_in_current_view(&self, id: &str) -> bool {
        self.current_view.contains(id)
    }

    /// Added, then modified, then removed
    #[must_use]
    pub fn artifact_delta_type(&self, id: &str) -> DeltaState {
        let Some(payload) = &self.payload else {
            return DeltaState::NoChange;
        };
        let artifacts = &payload.artifacts;
        if artifacts.added.contains_key(id) {
            DeltaState::Added
        } else if artifacts.modified.contains_key(id) {
            DeltaState::Modified
        } else if artifacts.removed.contains_key(id) {
            DeltaState::Removed
        } else {
            DeltaState::NoChange
        }
    }

    /// Same precedence as artifacts, except a modification that leaves the
    /// link declined counts as a removal
    #[must_use]
    pub fn trace_delta_type(&self, id: &str) -> DeltaState {
        let Some(payload) = &self.payload else {
            return DeltaState::NoChange;
        };
        let traces = &payload.traces;
        if traces.added.contains_key(id) {
            DeltaState::Added
        } else if let Some(change) = traces.modified.get(id) {
            if change.after.is_declined() {
                DeltaState::Removed
            } else {
                DeltaState::Modified
            }
        } else if traces.removed.contains_key(id) {
            DeltaState::Removed
        } else {
            DeltaState::NoChange
        }
    }

    /// Distinct states across a batch of artifacts
    pub fn artifact_delta_states<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a ArtifactId>,
    ) -> BTreeSet<DeltaState> {
        ids.into_iter()
            .map(|id| self.artifact_delta_type(id.as_str()))
            .collect()
    }

    /// Distinct states across a batch of trace links
    pub fn trace_delta_states<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a TraceId>,
    ) -> BTreeSet<DeltaState> {
        ids.into_iter()
            .map(|id| self.trace_delta_type(id.as_str()))
            .collect()
    }
}
