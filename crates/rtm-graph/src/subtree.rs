//! Memoized subtree reachability
//!
//! Provides [`SubtreeCache`], which answers "which artifacts can be reached
//! from this one by following trace links source -> target". Results are
//! memoized per root and dropped whenever the store's topology generation
//! moves.

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rtm_model::{ArtifactId, EntityStore, TraceId};
use std::collections::{HashMap, HashSet};

/// Artifact id -> every descendant id
pub type SubtreeMap = HashMap<ArtifactId, HashSet<ArtifactId>>;

/// Reachability cache over the trace-link graph
///
/// # Invariants
/// - `memo` only holds complete descendant sets
/// - A root never appears in its own set, even on a cycle
/// - `graph` and `memo` describe the store generation in `generation`
#[derive(Debug, Default)]
pub struct SubtreeCache {
    generation: Option<u64>,
    graph: DiGraph<ArtifactId, TraceId>,
    index: HashMap<ArtifactId, NodeIndex>,
    memo: SubtreeMap,
    empty: HashSet<ArtifactId>,
}

impl SubtreeCache {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the cache reflects the store's current topology
    #[inline]
    #[must_use]
    pub fn is_fresh(&self, store: &EntityStore) -> bool {
        self.generation == Some(store.topology_generation())
    }

    /// Forget everything; the next query rebuilds
    pub fn invalidate(&mut self) {
        self.generation = None;
        self.graph.clear();
        self.index.clear();
        self.memo.clear();
    }

    /// Number of memoized roots
    #[inline]
    #[must_use]
    pub fn memoized_len(&self) -> usize {
        self.memo.len()
    }

    /// Descendants of `root`, excluding `root` itself
    ///
    /// Walks outgoing links with an explicit stack and a visited set, so
    /// cycles terminate: a node already visited during this call is never
    /// expanded twice. Descendant sets already memoized for a reached node
    /// are merged in without re-walking them. Ids with no node in the graph
    /// get an empty set and are not memoized.
    pub fn compute_subtree(&mut self, store: &EntityStore, root: &ArtifactId) -> &HashSet<ArtifactId> {
        self.refresh(store);

        if !self.index.contains_key(root) {
            return &self.empty;
        }
        if !self.memo.contains_key(root) {
            let descendants = self.walk(root);
            self.memo.insert(root.clone(), descendants);
        }
        &self.memo[root]
    }

    /// Full [`SubtreeMap`] for every artifact in the store
    pub fn subtree_map(&mut self, store: &EntityStore) -> SubtreeMap {
        let ids: Vec<ArtifactId> = store.artifact_ids().cloned().collect();
        for id in &ids {
            self.compute_subtree(store, id);
        }
        ids.into_iter()
            .map(|id| {
                let set = self.memo.get(&id).cloned().unwrap_or_default();
                (id, set)
            })
            .collect()
    }

    fn refresh(&mut self, store: &EntityStore) {
        if self.is_fresh(store) {
            return;
        }
        self.invalidate();

        for id in store.artifact_ids() {
            self.node(id);
        }
        for trace in store.traces() {
            let source = self.node(&trace.source_id);
            let target = self.node(&trace.target_id);
            self.graph.add_edge(source, target, trace.id.clone());
        }
        self.generation = Some(store.topology_generation());
        tracing::debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "subtree graph rebuilt"
        );
    }

    fn node(&mut self, id: &ArtifactId) -> NodeIndex {
        if let Some(idx) = self.index.get(id) {
            return *idx;
        }
        let idx = self.graph.add_node(id.clone());
        self.index.insert(id.clone(), idx);
        idx
    }

    fn walk(&self, root: &ArtifactId) -> HashSet<ArtifactId> {
        let mut descendants = HashSet::new();
        let Some(&start) = self.index.get(root) else {
            return descendants;
        };

        let mut visited = HashSet::from([start]);
        let mut stack = vec![start];

        while let Some(node) = stack.pop() {
            for child in self.graph.neighbors_directed(node, Direction::Outgoing) {
                if !visited.insert(child) {
                    continue;
                }
                let child_id = &self.graph[child];
                descendants.insert(child_id.clone());

                match self.memo.get(child_id) {
                    Some(known) => {
                        for id in known {
                            if let Some(&idx) = self.index.get(id) {
                                visited.insert(idx);
                            }
                            descendants.insert(id.clone());
                        }
                    }
                    None => stack.push(child),
                }
            }
        }

        descendants.remove(root);
        descendants
    }
}

/// Heuristic graph root
///
/// Seeds at the artifact with the highest total degree (earliest inserted
/// wins ties), then repeatedly steps from the current artifact to the source
/// of a link targeting it. Stops when nothing points at the current
/// artifact or when an artifact repeats, so cycles terminate.
#[must_use]
pub fn find_root_node(store: &EntityStore) -> Option<ArtifactId> {
    let mut degree: HashMap<&ArtifactId, usize> = HashMap::new();
    for trace in store.traces() {
        *degree.entry(&trace.source_id).or_default() += 1;
        *degree.entry(&trace.target_id).or_default() += 1;
    }

    let mut seed: Option<(&ArtifactId, usize)> = None;
    for id in store.artifact_ids() {
        let d = degree.get(id).copied().unwrap_or(0);
        if seed.map_or(true, |(_, best)| d > best) {
            seed = Some((id, d));
        }
    }
    let (mut current, _) = seed?;

    let mut visited = HashSet::from([current]);
    while let Some(link) = store.incoming(current).next() {
        if !visited.insert(&link.source_id) {
            break;
        }
        current = &link.source_id;
    }
    Some(current.clone())
}
