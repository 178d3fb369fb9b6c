//! Testing utilities for RTM workspace
//!
//! Shared fixtures and an in-memory persistence collaborator.

#![allow(missing_docs)]

use async_trait::async_trait;
use rtm_core::{CommitPersistence, EditorSession, PersistenceError, ProjectScope, RtmConfig};
use rtm_model::{ApprovalStatus, Artifact, Commit, TraceLink, VersionDelta, VersionId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const PROJECT: &str = "project-1";
pub const VERSION_ID: &str = "v1";

pub fn artifact(id: &str) -> Artifact {
    Artifact::new(id, id.to_lowercase(), "requirement")
}

pub fn artifact_with_body(id: &str, body: &str) -> Artifact {
    artifact(id).with_body(body)
}

pub fn trace(id: &str, source: &str, target: &str) -> TraceLink {
    TraceLink::new(id, source, target)
}

pub fn approved(id: &str, source: &str, target: &str) -> TraceLink {
    trace(id, source, target).with_status(ApprovalStatus::Approved)
}

pub fn declined(id: &str, source: &str, target: &str) -> TraceLink {
    trace(id, source, target).with_status(ApprovalStatus::Declined)
}

/// Session bound to [`PROJECT`] / [`VERSION_ID`]
pub fn session(persistence: Arc<InMemoryPersistence>) -> EditorSession {
    session_with(RtmConfig::new(), persistence)
}

pub fn session_with(config: RtmConfig, persistence: Arc<InMemoryPersistence>) -> EditorSession {
    EditorSession::new(config, ProjectScope::new(PROJECT, VERSION_ID), persistence)
}

/// Persistence collaborator that keeps everything in memory
///
/// Records every accepted commit and serves deltas registered with
/// [`InMemoryPersistence::with_delta`]. [`InMemoryPersistence::fail_with`]
/// makes every later call fail until [`InMemoryPersistence::recover`].
#[derive(Debug, Default)]
pub struct InMemoryPersistence {
    persisted: Mutex<Vec<Commit>>,
    failure: Mutex<Option<PersistenceError>>,
    deltas: Mutex<HashMap<(VersionId, VersionId), VersionDelta>>,
}

impl InMemoryPersistence {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_delta(
        self: Arc<Self>,
        baseline: impl Into<VersionId>,
        current: impl Into<VersionId>,
        delta: VersionDelta,
    ) -> Arc<Self> {
        lock(&self.deltas).insert((baseline.into(), current.into()), delta);
        self
    }

    pub fn fail_with(&self, error: PersistenceError) {
        *lock(&self.failure) = Some(error);
    }

    pub fn recover(&self) {
        *lock(&self.failure) = None;
    }

    /// Accepted commits, oldest first
    pub fn persisted(&self) -> Vec<Commit> {
        lock(&self.persisted).clone()
    }

    pub fn persisted_count(&self) -> usize {
        lock(&self.persisted).len()
    }

    fn check(&self) -> Result<(), PersistenceError> {
        match lock(&self.failure).clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CommitPersistence for InMemoryPersistence {
    async fn persist_commit(&self, commit: &Commit) -> Result<(), PersistenceError> {
        self.check()?;
        lock(&self.persisted).push(commit.clone());
        Ok(())
    }

    async fn load_delta(
        &self,
        baseline: &VersionId,
        current: &VersionId,
    ) -> Result<VersionDelta, PersistenceError> {
        self.check()?;
        lock(&self.deltas)
            .get(&(baseline.clone(), current.clone()))
            .cloned()
            .ok_or_else(|| PersistenceError::VersionNotFound(baseline.clone()))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
