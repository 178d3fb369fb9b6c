//! RTM Graph
//!
//! Reachability over the trace-link graph.
//!
//! # Core Concepts
//!
//! - [`SubtreeCache`]: memoized, cycle-safe descendant sets, rebuilt when the
//!   store's topology generation changes
//! - [`find_root_node`]: heuristic entry point for layout and navigation
//! - [`CollapseState`]: hide/show subtrees with [`PhantomLink`]s keeping the
//!   remaining graph connected
//!
//! # Example
//!
//! ```rust
//! use rtm_graph::SubtreeCache;
//! use rtm_model::{Artifact, ArtifactId, EntityStore, TraceLink};
//!
//! let store = EntityStore::from_entities(
//!     [Artifact::new("A", "a", "req"), Artifact::new("B", "b", "req")],
//!     [TraceLink::new("T1", "A", "B"), TraceLink::new("T2", "B", "A")],
//! );
//! let mut cache = SubtreeCache::new();
//! let below_a = cache.compute_subtree(&store, &ArtifactId::new("A"));
//! assert_eq!(below_a.len(), 1);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod collapse;
mod error;
mod subtree;

pub use collapse::{CollapseState, PhantomLink};
pub use error::GraphError;
pub use subtree::{find_root_node, SubtreeCache, SubtreeMap};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
