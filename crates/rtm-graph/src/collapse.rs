//! Subtree collapse and expand
//!
//! Hiding a subtree keeps its root on screen and hides every descendant.
//! Links that cross the boundary of the hidden set are hidden too and
//! replaced by [`PhantomLink`]s rerouted through the root, so the rest of
//! the graph stays connected.

use crate::error::GraphError;
use crate::subtree::SubtreeCache;
use indexmap::IndexMap;
use rtm_model::{Artifact, ArtifactId, EntityStore, TraceId, TraceLink};
use std::collections::HashSet;

/// Synthetic link standing in for hidden boundary-crossing links
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhantomLink {
    pub id: String,
    pub source_id: ArtifactId,
    pub target_id: ArtifactId,
    /// Collapsed root the link is routed through
    pub root_id: ArtifactId,
    /// Real links this phantom replaces
    pub replaces: Vec<TraceId>,
}

/// Visibility state for collapsed subtrees
///
/// Hidden sets and phantom links are derived from the collapsed roots and
/// the store topology. [`CollapseState::sync`] re-derives them whenever the
/// store's topology generation has moved; roots that left the store are
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct CollapseState {
    generation: Option<u64>,
    roots: IndexMap<ArtifactId, HashSet<ArtifactId>>,
    hidden_artifacts: HashSet<ArtifactId>,
    hidden_traces: HashSet<TraceId>,
    phantoms: Vec<PhantomLink>,
}

impl CollapseState {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Collapse the subtree below `root`
    ///
    /// Collapsing an already collapsed root recomputes it against the
    /// current store. Returns the phantom links routed through `root`.
    ///
    /// # Errors
    /// Returns error if `root` is not an artifact in the store
    pub fn hide_subtree(
        &mut self,
        store: &EntityStore,
        cache: &mut SubtreeCache,
        root: &ArtifactId,
    ) -> Result<Vec<PhantomLink>, GraphError> {
        if !store.contains_artifact(root.as_str()) {
            return Err(GraphError::ArtifactNotFound(root.clone()));
        }
        self.roots.insert(root.clone(), HashSet::new());
        self.rebuild(store, cache);

        tracing::debug!(
            root = %root,
            hidden_artifacts = self.roots.get(root).map_or(0, HashSet::len),
            "subtree collapsed"
        );
        Ok(self
            .phantoms
            .iter()
            .filter(|p| &p.root_id == root)
            .cloned()
            .collect())
    }

    /// Expand a collapsed subtree, dropping its phantom links
    ///
    /// Returns `false` if `root` was not collapsed.
    pub fn show_subtree(
        &mut self,
        store: &EntityStore,
        cache: &mut SubtreeCache,
        root: &ArtifactId,
    ) -> bool {
        if self.roots.shift_remove(root).is_none() {
            return false;
        }
        self.rebuild(store, cache);
        tracing::debug!(root = %root, "subtree expanded");
        true
    }

    /// Re-derive hidden sets and phantoms if the store topology changed
    pub fn sync(&mut self, store: &EntityStore, cache: &mut SubtreeCache) {
        if self.is_fresh(store) {
            return;
        }
        self.rebuild(store, cache);
    }

    /// Whether derived state matches the store's current topology
    #[inline]
    #[must_use]
    pub fn is_fresh(&self, store: &EntityStore) -> bool {
        self.roots.is_empty() || self.generation == Some(store.topology_generation())
    }

    #[inline]
    #[must_use]
    pub fn is_collapsed(&self, root: &ArtifactId) -> bool {
        self.roots.contains_key(root)
    }

    /// Roots currently collapsed, in collapse order
    pub fn collapsed_roots(&self) -> impl Iterator<Item = &ArtifactId> {
        self.roots.keys()
    }

    #[inline]
    #[must_use]
    pub fn is_artifact_hidden(&self, id: &ArtifactId) -> bool {
        self.hidden_artifacts.contains(id)
    }

    #[inline]
    #[must_use]
    pub fn is_trace_hidden(&self, id: &TraceId) -> bool {
        self.hidden_traces.contains(id)
    }

    /// Phantom links; both endpoints are always visible
    pub fn phantom_links(&self) -> impl Iterator<Item = &PhantomLink> {
        self.phantoms.iter()
    }

    /// Artifacts not hidden by any collapse
    pub fn visible_artifacts<'a>(
        &'a self,
        store: &'a EntityStore,
    ) -> impl Iterator<Item = &'a Artifact> {
        store.artifacts().filter(move |a| !self.is_artifact_hidden(&a.id))
    }

    /// Real links not hidden by any collapse
    pub fn visible_traces<'a>(
        &'a self,
        store: &'a EntityStore,
    ) -> impl Iterator<Item = &'a TraceLink> {
        store.traces().filter(move |t| !self.is_trace_hidden(&t.id))
    }

    /// Expand everything
    pub fn clear(&mut self) {
        self.generation = None;
        self.roots.clear();
        self.hidden_artifacts.clear();
        self.hidden_traces.clear();
        self.phantoms.clear();
    }

    fn rebuild(&mut self, store: &EntityStore, cache: &mut SubtreeCache) {
        let before = self.roots.len();
        self.roots.retain(|root, _| store.contains_artifact(root.as_str()));
        if self.roots.len() != before {
            tracing::debug!(dropped = before - self.roots.len(), "collapsed roots left the store");
        }

        for (root, hidden) in &mut self.roots {
            hidden.clone_from(cache.compute_subtree(store, root));
        }
        self.hidden_artifacts = self.roots.values().flatten().cloned().collect();
        self.hidden_traces.clear();

        let mut rerouted: IndexMap<(ArtifactId, ArtifactId), (ArtifactId, Vec<TraceId>)> =
            IndexMap::new();
        for trace in store.traces() {
            let source_hidden = self.hidden_artifacts.contains(&trace.source_id);
            let target_hidden = self.hidden_artifacts.contains(&trace.target_id);
            if !source_hidden && !target_hidden {
                continue;
            }
            self.hidden_traces.insert(trace.id.clone());

            let (Some(source), Some(target)) = (
                self.representative(&trace.source_id),
                self.representative(&trace.target_id),
            ) else {
                continue;
            };
            if source == target {
                continue;
            }
            let via = if target_hidden { target } else { source };
            rerouted
                .entry((source.clone(), target.clone()))
                .or_insert_with(|| (via.clone(), Vec::new()))
                .1
                .push(trace.id.clone());
        }

        self.phantoms = rerouted
            .into_iter()
            .map(|((source_id, target_id), (root_id, replaces))| PhantomLink {
                id: format!("phantom:{root_id}:{source_id}->{target_id}"),
                source_id,
                target_id,
                root_id,
                replaces,
            })
            .collect();
        self.generation = Some(store.topology_generation());
    }

    /// Visible artifact standing in for `id`
    ///
    /// A hidden artifact is represented by the first visible collapsed root
    /// whose subtree contains it. `None` if every such root is hidden too.
    fn representative<'a>(&'a self, id: &'a ArtifactId) -> Option<&'a ArtifactId> {
        if !self.hidden_artifacts.contains(id) {
            return Some(id);
        }
        self.roots
            .iter()
            .find(|(root, hidden)| hidden.contains(id) && !self.hidden_artifacts.contains(*root))
            .map(|(root, _)| root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store(nodes: &[&str], edges: &[(&str, &str, &str)]) -> EntityStore {
        EntityStore::from_entities(
            nodes.iter().map(|id| Artifact::new(*id, *id, "req")),
            edges.iter().map(|(id, s, t)| TraceLink::new(*id, *s, *t)),
        )
    }

    fn phantom_pairs(state: &CollapseState) -> Vec<(&str, &str)> {
        state
            .phantom_links()
            .map(|p| (p.source_id.as_str(), p.target_id.as_str()))
            .collect()
    }

    #[test]
    fn external_incoming_edge_reroutes_through_root() {
        // R -> C, X -> C; collapsing R hides C and routes X through R
        let s = store(&["R", "C", "X"], &[("T1", "R", "C"), ("T2", "X", "C")]);
        let mut cache = SubtreeCache::new();
        let mut state = CollapseState::new();

        let phantoms = state.hide_subtree(&s, &mut cache, &"R".into()).unwrap();

        assert_eq!(phantoms.len(), 1);
        assert_eq!(phantoms[0].source_id.as_str(), "X");
        assert_eq!(phantoms[0].target_id.as_str(), "R");
        assert_eq!(phantoms[0].replaces, vec![TraceId::new("T2")]);
        assert!(state.is_trace_hidden(&"T2".into()));
        assert!(state.is_trace_hidden(&"T1".into()));
        assert!(state.is_artifact_hidden(&"C".into()));
        assert!(!state.is_artifact_hidden(&"R".into()));

        assert!(state.show_subtree(&s, &mut cache, &"R".into()));
        assert_eq!(state.phantom_links().count(), 0);
        assert!(!state.is_trace_hidden(&"T2".into()));
        assert!(!state.is_artifact_hidden(&"C".into()));
    }

    #[test]
    fn descendants_of_hidden_children_are_hidden() {
        let s = store(&["R", "C", "Y"], &[("T1", "R", "C"), ("T2", "C", "Y")]);
        let mut cache = SubtreeCache::new();
        let mut state = CollapseState::new();

        state.hide_subtree(&s, &mut cache, &"R".into()).unwrap();
        // Y is reachable from R, so it is hidden too and no phantom is needed
        assert!(state.is_artifact_hidden(&"Y".into()));
        assert_eq!(state.phantom_links().count(), 0);
    }

    #[test]
    fn cycle_back_to_root_hides_without_self_phantoms() {
        let s = store(
            &["P", "R", "C"],
            &[("T1", "P", "R"), ("T2", "R", "C"), ("T3", "C", "P")],
        );
        let mut cache = SubtreeCache::new();
        let mut state = CollapseState::new();

        // P is reachable from R through C, so only R stays on screen
        state.hide_subtree(&s, &mut cache, &"R".into()).unwrap();
        assert!(state.is_artifact_hidden(&"P".into()));
        assert_eq!(state.visible_artifacts(&s).count(), 1);
        assert_eq!(state.visible_traces(&s).count(), 0);
    }

    #[test]
    fn parallel_edges_share_one_phantom() {
        let s = store(
            &["R", "C1", "C2", "X"],
            &[
                ("T1", "R", "C1"),
                ("T2", "R", "C2"),
                ("T3", "X", "C1"),
                ("T4", "X", "C2"),
            ],
        );
        let mut cache = SubtreeCache::new();
        let mut state = CollapseState::new();

        let phantoms = state.hide_subtree(&s, &mut cache, &"R".into()).unwrap();
        assert_eq!(phantoms.len(), 1);
        assert_eq!(phantoms[0].replaces.len(), 2);
    }

    #[test]
    fn unknown_root_is_an_error() {
        let s = store(&["A"], &[]);
        let mut cache = SubtreeCache::new();
        let mut state = CollapseState::new();
        assert!(matches!(
            state.hide_subtree(&s, &mut cache, &"missing".into()),
            Err(GraphError::ArtifactNotFound(_))
        ));
    }

    #[test]
    fn show_unknown_root_is_noop() {
        let s = store(&["R"], &[]);
        let mut cache = SubtreeCache::new();
        let mut state = CollapseState::new();
        assert!(!state.show_subtree(&s, &mut cache, &"R".into()));
    }

    #[test]
    fn nested_collapse_reroutes_to_outer_root() {
        // Collapse C first (X -> D rerouted to X -> C), then collapse R which hides C
        let s = store(
            &["R", "C", "D", "X"],
            &[("T1", "R", "C"), ("T2", "C", "D"), ("T3", "X", "D")],
        );
        let mut cache = SubtreeCache::new();
        let mut state = CollapseState::new();

        state.hide_subtree(&s, &mut cache, &"C".into()).unwrap();
        assert_eq!(phantom_pairs(&state), vec![("X", "C")]);

        state.hide_subtree(&s, &mut cache, &"R".into()).unwrap();
        assert_eq!(phantom_pairs(&state), vec![("X", "R")]);
        assert_eq!(state.collapsed_roots().count(), 2);

        // Expanding the outer root brings the inner phantom back
        state.show_subtree(&s, &mut cache, &"R".into());
        assert_eq!(phantom_pairs(&state), vec![("X", "C")]);
    }

    #[test]
    fn link_between_sibling_collapses_joins_their_roots() {
        let s = store(
            &["R1", "C1", "R2", "C2"],
            &[("T1", "R1", "C1"), ("T2", "R2", "C2"), ("T3", "C1", "C2")],
        );
        let mut cache = SubtreeCache::new();
        let mut state = CollapseState::new();

        state.hide_subtree(&s, &mut cache, &"R1".into()).unwrap();
        assert_eq!(phantom_pairs(&state), vec![("R1", "C2")]);

        state.hide_subtree(&s, &mut cache, &"R2".into()).unwrap();
        assert_eq!(phantom_pairs(&state), vec![("R1", "R2")]);
        assert!(state.is_trace_hidden(&"T3".into()));
    }

    #[test]
    fn topology_change_rederives_phantoms() {
        let mut s = store(&["R", "C", "X"], &[("T1", "R", "C"), ("T2", "X", "C")]);
        let mut cache = SubtreeCache::new();
        let mut state = CollapseState::new();
        state.hide_subtree(&s, &mut cache, &"R".into()).unwrap();

        s.upsert_artifacts([Artifact::new("Y", "Y", "req")]);
        s.upsert_traces([TraceLink::new("T3", "Y", "C")]);
        assert!(!state.is_fresh(&s));
        state.sync(&s, &mut cache);
        assert_eq!(phantom_pairs(&state), vec![("X", "R"), ("Y", "R")]);
        assert!(state.is_trace_hidden(&"T3".into()));

        s.remove_traces([&TraceId::new("T2")]);
        s.remove_artifacts([&ArtifactId::new("X")]);
        state.sync(&s, &mut cache);
        assert_eq!(phantom_pairs(&state), vec![("Y", "R")]);
    }

    #[test]
    fn removed_root_is_dropped_on_sync() {
        let mut s = store(&["R", "C"], &[("T1", "R", "C")]);
        let mut cache = SubtreeCache::new();
        let mut state = CollapseState::new();
        state.hide_subtree(&s, &mut cache, &"R".into()).unwrap();

        s.remove_artifacts([&ArtifactId::new("R")]);
        state.sync(&s, &mut cache);

        assert!(!state.is_collapsed(&"R".into()));
        assert!(!state.is_artifact_hidden(&"C".into()));
        assert!(!state.is_trace_hidden(&"T1".into()));
    }
}
