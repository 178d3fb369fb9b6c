//! RTM Delta
//!
//! Version comparison for the traceability graph.
//!
//! # Core Concepts
//!
//! - [`DeltaClassifier`]: ingests a [`rtm_model::VersionDelta`] and answers
//!   per-entity and per-batch [`DeltaState`] queries
//! - [`DeltaSummary`]: bucket counts for status displays
//!
//! Declined trace links are reported as removed even when the payload lists
//! them as modified.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod classifier;

pub use classifier::{DeltaClassifier, DeltaState, DeltaSummary};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
