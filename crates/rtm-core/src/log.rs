//! Commit log with undo and redo stacks
//!
//! Two LIFO stacks of [`CommitHistory`] entries: applied commits available
//! to undo, and undone commits available to redo.

use chrono::{DateTime, Utc};
use rtm_model::Commit;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use ulid::Ulid;

/// Time-ordered identifier of a history entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CommitId(Ulid);

impl CommitId {
    #[inline]
    #[must_use]
    pub fn generate() -> Self {
        Self(Ulid::new())
    }

    #[inline]
    #[must_use]
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A commit and the revert that undoes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitHistory {
    pub id: CommitId,
    pub commit: Commit,
    pub revert: Commit,
    pub recorded_at: DateTime<Utc>,
}

impl CommitHistory {
    #[must_use]
    pub fn new(commit: Commit, revert: Commit) -> Self {
        Self {
            id: CommitId::generate(),
            commit,
            revert,
            recorded_at: Utc::now(),
        }
    }
}

/// Undo and redo stacks
///
/// # Invariants
/// - `pop_*` returns the entry most recently pushed onto the same stack
/// - Popping an empty stack yields `None` and changes nothing
#[derive(Debug, Clone, Default)]
pub struct CommitLog {
    commits: VecDeque<CommitHistory>,
    reverted: Vec<CommitHistory>,
    history_limit: Option<usize>,
}

impl CommitLog {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the undo stack; the oldest entries are dropped first
    #[inline]
    #[must_use]
    pub fn with_history_limit(mut self, limit: Option<usize>) -> Self {
        self.history_limit = limit;
        self.trim();
        self
    }

    pub fn push_commit(&mut self, history: CommitHistory) {
        self.commits.push_back(history);
        self.trim();
    }

    #[inline]
    #[must_use]
    pub fn peek_commit(&self) -> Option<&CommitHistory> {
        self.commits.back()
    }

    pub fn pop_commit(&mut self) -> Option<CommitHistory> {
        self.commits.pop_back()
    }

    pub fn push_reverted(&mut self, history: CommitHistory) {
        self.reverted.push(history);
    }

    #[inline]
    #[must_use]
    pub fn peek_reverted(&self) -> Option<&CommitHistory> {
        self.reverted.last()
    }

    pub fn pop_reverted(&mut self) -> Option<CommitHistory> {
        self.reverted.pop()
    }

    pub fn clear_reverted(&mut self) {
        self.reverted.clear();
    }

    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.commits.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.reverted.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn undo_depth(&self) -> usize {
        self.commits.len()
    }

    #[inline]
    #[must_use]
    pub fn redo_depth(&self) -> usize {
        self.reverted.len()
    }

    pub fn clear(&mut self) {
        self.commits.clear();
        self.reverted.clear();
    }

    /// Applied commits, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CommitHistory> {
        self.commits.iter()
    }

    fn trim(&mut self) {
        let Some(limit) = self.history_limit else {
            return;
        };
        while self.commits.len() > limit {
            if let Some(dropped) = self.commits.pop_front() {
                tracing::debug!(commit = %dropped.id, "history limit reached, dropping oldest commit");
            }
        }
    }
}
