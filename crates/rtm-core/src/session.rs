//! Editor session
//!
//! [`EditorSession`] owns every piece of editor state for one active
//! project version: the entity store, the commit log, the delta classifier
//! and the subtree collapse state. Mutating operations take `&mut self`, so
//! a second save/undo/redo cannot start while one is still awaiting the
//! persistence collaborator.

use crate::config::RtmConfig;
use crate::error::SessionError;
use crate::log::{CommitId, CommitLog};
use crate::persistence::{CommitPersistence, ProjectScope};
use crate::revert::PreparedCommit;
use rtm_delta::{DeltaClassifier, DeltaState, DeltaSummary};
use rtm_graph::{find_root_node, CollapseState, PhantomLink, SubtreeCache, SubtreeMap};
use rtm_model::{Artifact, ArtifactId, Commit, EntityStore, TraceId, TraceLink, VersionDelta, VersionId};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

/// Result of an undo or redo request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryOutcome {
    Undone(CommitId),
    Redone(CommitId),
    /// Commit stack was empty; nothing changed
    NothingToUndo,
    /// Reverted stack was empty; nothing changed
    NothingToRedo,
}

impl HistoryOutcome {
    #[inline]
    #[must_use]
    pub fn is_noop(&self) -> bool {
        matches!(self, Self::NothingToUndo | Self::NothingToRedo)
    }
}

/// All editor state for one project version
pub struct EditorSession {
    config: RtmConfig,
    scope: ProjectScope,
    store: EntityStore,
    log: CommitLog,
    subtrees: SubtreeCache,
    collapse: CollapseState,
    delta: DeltaClassifier,
    persistence: Arc<dyn CommitPersistence>,
}

impl fmt::Debug for EditorSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditorSession")
            .field("scope", &self.scope)
            .field("artifacts", &self.store.artifact_count())
            .field("traces", &self.store.trace_count())
            .field("undo_depth", &self.log.undo_depth())
            .field("redo_depth", &self.log.redo_depth())
            .field("delta_active", &self.delta.is_active())
            .finish_non_exhaustive()
    }
}

impl EditorSession {
    /// Create an empty session bound to `scope`
    #[must_use]
    pub fn new(
        config: RtmConfig,
        scope: ProjectScope,
        persistence: Arc<dyn CommitPersistence>,
    ) -> Self {
        Self {
            log: CommitLog::new().with_history_limit(config.history_limit),
            delta: DeltaClassifier::new().with_neighbor_context(config.delta_neighbor_context),
            config,
            scope,
            store: EntityStore::new(),
            subtrees: SubtreeCache::new(),
            collapse: CollapseState::new(),
            persistence,
        }
    }

    /// Load entities fetched from the server without recording history
    pub fn seed(
        &mut self,
        artifacts: impl IntoIterator<Item = Artifact>,
        traces: impl IntoIterator<Item = TraceLink>,
    ) {
        self.store.upsert_artifacts(artifacts);
        self.store.upsert_traces(traces);
        self.store_changed();
        tracing::debug!(
            artifacts = self.store.artifact_count(),
            traces = self.store.trace_count(),
            "session seeded"
        );
    }

    // ---------------------------------------------------------------------
    // History
    // ---------------------------------------------------------------------

    /// Persist `commit`, then apply it and record it for undo
    ///
    /// The revert is computed from the store before anything is written.
    /// If persistence fails, the store and both stacks are left untouched.
    ///
    /// # Errors
    /// Returns error if the commit is invalid, targets another version,
    /// references a missing entity, or the server rejects it
    pub async fn save_commit(&mut self, commit: Commit) -> Result<CommitId, SessionError> {
        commit.validate()?;
        if commit.version_ref != self.scope.version_id {
            return Err(SessionError::VersionMismatch {
                expected: self.scope.version_id.clone(),
                actual: commit.version_ref,
            });
        }

        let id = self.record(commit).await?;
        if self.config.clear_redo_on_commit && self.log.can_redo() {
            tracing::debug!(dropped = self.log.redo_depth(), "clearing redo history");
            self.log.clear_reverted();
        }
        Ok(id)
    }

    /// Persist the most recent revert, then apply it locally
    ///
    /// An empty commit stack is a soft no-op.
    ///
    /// # Errors
    /// Returns error if the server rejects the revert; nothing changes
    pub async fn undo_commit(&mut self) -> Result<HistoryOutcome, SessionError> {
        let Some(top) = self.log.peek_commit() else {
            tracing::warn!("undo requested with no commits to undo");
            return Ok(HistoryOutcome::NothingToUndo);
        };
        let id = top.id;
        self.persistence.persist_commit(&top.revert).await?;

        if let Some(history) = self.log.pop_commit() {
            self.store.apply_commit(&history.revert);
            self.log.push_reverted(history);
        }
        self.store_changed();
        tracing::info!(commit = %id, "commit undone");
        Ok(HistoryOutcome::Undone(id))
    }

    /// Re-save the most recently undone commit
    ///
    /// A fresh revert is computed against the current store. The entry only
    /// leaves the reverted stack once the save succeeds.
    ///
    /// # Errors
    /// Returns error if the save fails; the entry stays available to redo
    pub async fn redo_commit(&mut self) -> Result<HistoryOutcome, SessionError> {
        let Some(top) = self.log.peek_reverted() else {
            tracing::warn!("redo requested with no undone commits");
            return Ok(HistoryOutcome::NothingToRedo);
        };
        let commit = top.commit.clone();

        let id = self.record(commit).await?;
        self.log.pop_reverted();
        tracing::info!(commit = %id, "commit redone");
        Ok(HistoryOutcome::Redone(id))
    }

    async fn record(&mut self, commit: Commit) -> Result<CommitId, SessionError> {
        let prepared = PreparedCommit::prepare(commit, &self.store)?;
        self.persistence.persist_commit(prepared.commit()).await?;

        let history = prepared.apply(&mut self.store);
        self.store_changed();
        let id = history.id;
        tracing::info!(
            commit = %id,
            version = %history.commit.version_ref,
            entities = history.commit.entity_count(),
            "commit saved"
        );
        self.log.push_commit(history);
        Ok(id)
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    /// Rebind the session to another version, discarding all local state
    pub fn switch_version(&mut self, scope: ProjectScope) {
        tracing::info!(
            project = %scope.project_id,
            from = %self.scope.version_id,
            to = %scope.version_id,
            "switching version"
        );
        self.scope = scope;
        self.store.clear();
        self.log.clear();
        self.delta.clear();
        self.collapse.clear();
        self.subtrees.invalidate();
    }

    // ---------------------------------------------------------------------
    // Delta view
    // ---------------------------------------------------------------------

    /// Fetch the delta from `baseline` to the active version and enter delta mode
    ///
    /// # Errors
    /// Returns error if the server cannot produce the delta
    pub async fn load_version_delta(
        &mut self,
        baseline: &VersionId,
    ) -> Result<DeltaSummary, SessionError> {
        let payload = self
            .persistence
            .load_delta(baseline, &self.scope.version_id)
            .await?;
        let summary = DeltaSummary::of(&payload);
        self.set_delta_payload(payload);
        Ok(summary)
    }

    /// Enter delta mode with an already fetched payload
    pub fn set_delta_payload(&mut self, payload: VersionDelta) {
        self.delta.set_delta_payload(payload, &mut self.store);
        self.store_changed();
    }

    /// Leave delta mode
    pub fn clear_delta(&mut self) {
        self.delta.clear();
    }

    #[inline]
    #[must_use]
    pub fn is_delta_active(&self) -> bool {
        self.delta.is_active()
    }

    #[inline]
    #[must_use]
    pub fn artifact_delta_type(&self, id: &str) -> DeltaState {
        self.delta.artifact_delta_type(id)
    }

    #[inline]
    #[must_use]
    pub fn trace_delta_type(&self, id: &str) -> DeltaState {
        self.delta.trace_delta_type(id)
    }

    #[must_use]
    pub fn artifact_delta_states<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a ArtifactId>,
    ) -> BTreeSet<DeltaState> {
        self.delta.artifact_delta_states(ids)
    }

    #[must_use]
    pub fn trace_delta_states<'a>(
        &self,
        ids: impl IntoIterator<Item = &'a TraceId>,
    ) -> BTreeSet<DeltaState> {
        self.delta.trace_delta_states(ids)
    }

    #[inline]
    #[must_use]
    pub fn is_in_current_view(&self, id: &str) -> bool {
        self.delta.is_in_current_view(id)
    }

    // ---------------------------------------------------------------------
    // Subtrees and visibility
    // ---------------------------------------------------------------------

    /// Descendants of `root`, excluding `root`
    pub fn compute_subtree(&mut self, root: &ArtifactId) -> &HashSet<ArtifactId> {
        self.subtrees.compute_subtree(&self.store, root)
    }

    pub fn subtree_map(&mut self) -> SubtreeMap {
        self.subtrees.subtree_map(&self.store)
    }

    #[must_use]
    pub fn find_root_node(&self) -> Option<ArtifactId> {
        find_root_node(&self.store)
    }

    /// Collapse the subtree below `root`
    ///
    /// # Errors
    /// Returns error if `root` is not an artifact in the store
    pub fn hide_subtree(&mut self, root: &ArtifactId) -> Result<Vec<PhantomLink>, SessionError> {
        Ok(self
            .collapse
            .hide_subtree(&self.store, &mut self.subtrees, root)?)
    }

    /// Expand a collapsed subtree; `false` if it was not collapsed
    pub fn show_subtree(&mut self, root: &ArtifactId) -> bool {
        self.collapse
            .show_subtree(&self.store, &mut self.subtrees, root)
    }

    /// Keep collapsed subtrees consistent with the store topology
    fn store_changed(&mut self) {
        self.collapse.sync(&self.store, &mut self.subtrees);
    }

    pub fn phantom_links(&self) -> impl Iterator<Item = &PhantomLink> {
        self.collapse.phantom_links()
    }

    /// Whether `id` should be drawn
    ///
    /// Hidden by a collapse or, in delta mode, outside the current view
    /// means not visible.
    #[must_use]
    pub fn is_artifact_visible(&self, id: &ArtifactId) -> bool {
        self.store.contains_artifact(id.as_str())
            && !self.collapse.is_artifact_hidden(id)
            && (!self.delta.is_active() || self.delta.is_in_current_view(id.as_str()))
    }

    pub fn visible_artifacts(&self) -> impl Iterator<Item = &Artifact> {
        self.store
            .artifacts()
            .filter(move |a| self.is_artifact_visible(&a.id))
    }

    /// Real links drawn between two visible artifacts
    pub fn visible_traces(&self) -> impl Iterator<Item = &TraceLink> {
        self.collapse.visible_traces(&self.store).filter(move |t| {
            self.is_artifact_visible(&t.source_id) && self.is_artifact_visible(&t.target_id)
        })
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    #[inline]
    #[must_use]
    pub fn log(&self) -> &CommitLog {
        &self.log
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &RtmConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn scope(&self) -> &ProjectScope {
        &self.scope
    }
}
