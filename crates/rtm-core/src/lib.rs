//! RTM Core - Editor session
//!
//! Ties the entity store, commit log, delta classifier and subtree state
//! together behind one [`EditorSession`] per active project version:
//! - Saves commits through a persistence collaborator, server first
//! - Undoes and redoes through server-persisted reverts
//! - Loads version deltas and classifies entities against them
//! - Collapses and expands subtrees
//!
//! # Example
//!
//! ```rust,ignore
//! use rtm_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(persistence: Arc<dyn CommitPersistence>) -> Result<(), SessionError> {
//! let mut session = EditorSession::new(
//!     RtmConfig::new(),
//!     ProjectScope::new("project-1", "v1"),
//!     persistence,
//! );
//!
//! let commit = Commit::builder("v1")
//!     .add_artifact(Artifact::new("A1", "Login", "requirement"))
//!     .build()?;
//! session.save_commit(commit).await?;
//! session.undo_commit().await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod log;
pub mod persistence;
pub mod revert;
pub mod session;
pub mod telemetry;

pub use config::{LogFormat, RtmConfig};
pub use error::{ConfigError, PersistenceError, SessionError};
pub use log::{CommitHistory, CommitId, CommitLog};
pub use persistence::{CommitPersistence, ProjectScope};
pub use revert::{create_revert, PreparedCommit};
pub use session::{EditorSession, HistoryOutcome};
pub use telemetry::init_tracing;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with an editor session
    pub use crate::{
        CommitPersistence, EditorSession, HistoryOutcome, PersistenceError, ProjectScope,
        RtmConfig, SessionError,
    };
    pub use rtm_delta::DeltaState;
    pub use rtm_model::{
        ApprovalStatus, Artifact, ArtifactId, Commit, TraceId, TraceLink, VersionDelta, VersionId,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use crate::persistence::MockCommitPersistence;
    use proptest::prelude::*;
    use rtm_model::{Artifact, Commit, EntityStore, TraceLink};
    use std::sync::Arc;

    fn accepting() -> Arc<MockCommitPersistence> {
        let mut mock = MockCommitPersistence::new();
        mock.expect_persist_commit().returning(|_| Ok(()));
        Arc::new(mock)
    }

    fn base() -> (Vec<Artifact>, Vec<TraceLink>) {
        (
            vec![
                Artifact::new("A1", "a", "req").with_body("one"),
                Artifact::new("A2", "b", "req").with_body("two"),
                Artifact::new("A3", "c", "req"),
            ],
            vec![TraceLink::new("T1", "A1", "A2"), TraceLink::new("T2", "A2", "A3")],
        )
    }

    fn commit_strategy() -> impl Strategy<Value = Commit> {
        (
            proptest::option::of("[a-z]{1,6}"),
            proptest::option::of("[a-z]{1,6}"),
            any::<bool>(),
            any::<bool>(),
            proptest::option::of(1usize..3),
        )
            .prop_map(|(new_body, edit_body, drop_t1, add_t3, removed)| {
                let mut b = Commit::builder("v1");
                if let Some(body) = new_body {
                    b = b.add_artifact(Artifact::new("N1", "new", "req").with_body(body));
                }
                if let Some(body) = edit_body {
                    b = b.modify_artifact(Artifact::new("A1", "a", "req").with_body(body));
                }
                if drop_t1 {
                    b = b.remove_trace(TraceLink::new("T1", "A1", "A2"));
                }
                if add_t3 {
                    b = b.add_trace(TraceLink::new("T3", "A3", "A1"));
                }
                if let Some(i) = removed {
                    let id = ["A1", "A2", "A3"][i];
                    b = b.remove_artifact(Artifact::new(id, "stub", "req"));
                }
                b.build().unwrap()
            })
    }

    proptest! {
        #[test]
        fn undo_then_redo_round_trips(commit in commit_strategy()) {
            let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
            rt.block_on(async {
                let (artifacts, traces) = base();
                let mut session =
                    EditorSession::new(RtmConfig::new(), ProjectScope::new("p", "v1"), accepting());
                session.seed(artifacts, traces);
                let before: EntityStore = session.store().clone();

                session.save_commit(commit).await.unwrap();
                let after: EntityStore = session.store().clone();

                session.undo_commit().await.unwrap();
                prop_assert!(session.store().same_entities(&before));

                session.redo_commit().await.unwrap();
                prop_assert!(session.store().same_entities(&after));
                Ok(())
            })?;
        }
    }
}
