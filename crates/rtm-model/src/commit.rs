//! Commits: bundled descriptions of one user edit
//!
//! A [`Commit`] lists added, modified and removed artifacts and trace links.
//! Modified entries carry the *new* value. The inverse of a commit is itself
//! a commit and is computed by the history layer from a store snapshot.

use crate::artifact::Artifact;
use crate::error::{EntityKind, ModelError};
use crate::ids::VersionId;
use crate::trace::TraceLink;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Added / modified / removed entities of one kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeSet<T> {
    #[serde(default = "Vec::new")]
    pub added: Vec<T>,
    #[serde(default = "Vec::new")]
    pub modified: Vec<T>,
    #[serde(default = "Vec::new")]
    pub removed: Vec<T>,
}

impl<T> Default for ChangeSet<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            modified: Vec::new(),
            removed: Vec::new(),
        }
    }
}

impl<T> ChangeSet<T> {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.modified.is_empty() && self.removed.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.added.len() + self.modified.len() + self.removed.len()
    }
}

/// One user action, scoped to a project version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub version_ref: VersionId,
    #[serde(default)]
    pub artifacts: ChangeSet<Artifact>,
    #[serde(default)]
    pub traces: ChangeSet<TraceLink>,
}

impl Commit {
    /// Empty commit for a version
    #[inline]
    #[must_use]
    pub fn new(version_ref: impl Into<VersionId>) -> Self {
        Self {
            version_ref: version_ref.into(),
            artifacts: ChangeSet::default(),
            traces: ChangeSet::default(),
        }
    }

    /// Start describing a commit
    #[inline]
    #[must_use]
    pub fn builder(version_ref: impl Into<VersionId>) -> CommitBuilder {
        CommitBuilder::new(version_ref)
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty() && self.traces.is_empty()
    }

    /// Total entities touched
    #[inline]
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.artifacts.len() + self.traces.len()
    }

    /// Whether the commit adds, removes or rewires any trace link
    #[must_use]
    pub fn touches_topology(&self) -> bool {
        !self.traces.is_empty()
            || !self.artifacts.added.is_empty()
            || !self.artifacts.removed.is_empty()
    }

    /// Reject commits that list one id in two buckets or carry bad links
    ///
    /// # Errors
    /// Returns the first structural problem found
    pub fn validate(&self) -> Result<(), ModelError> {
        check_disjoint(EntityKind::Artifact, &self.artifacts, |a| a.id.as_str())?;
        check_disjoint(EntityKind::Trace, &self.traces, |t| t.id.as_str())?;
        for artifact in self.artifacts.added.iter().chain(&self.artifacts.modified) {
            if artifact.id.is_empty() {
                return Err(ModelError::EmptyId(artifact.name.clone()));
            }
        }
        for trace in self.traces.added.iter().chain(&self.traces.modified) {
            trace.validate()?;
        }
        Ok(())
    }
}

fn check_disjoint<T>(
    kind: EntityKind,
    set: &ChangeSet<T>,
    id: impl Fn(&T) -> &str,
) -> Result<(), ModelError> {
    let mut seen = HashSet::new();
    for entity in set.added.iter().chain(&set.modified).chain(&set.removed) {
        if !seen.insert(id(entity)) {
            return Err(ModelError::ConflictingBuckets {
                kind,
                id: id(entity).to_string(),
            });
        }
    }
    Ok(())
}

/// Fluent builder for [`Commit`]
#[derive(Debug, Clone)]
pub struct CommitBuilder {
    commit: Commit,
}

impl CommitBuilder {
    #[inline]
    #[must_use]
    pub fn new(version_ref: impl Into<VersionId>) -> Self {
        Self {
            commit: Commit::new(version_ref),
        }
    }

    #[inline]
    #[must_use]
    pub fn add_artifact(mut self, artifact: Artifact) -> Self {
        self.commit.artifacts.added.push(artifact);
        self
    }

    /// Record the new value of an existing artifact
    #[inline]
    #[must_use]
    pub fn modify_artifact(mut self, artifact: Artifact) -> Self {
        self.commit.artifacts.modified.push(artifact);
        self
    }

    #[inline]
    #[must_use]
    pub fn remove_artifact(mut self, artifact: Artifact) -> Self {
        self.commit.artifacts.removed.push(artifact);
        self
    }

    #[inline]
    #[must_use]
    pub fn add_trace(mut self, trace: TraceLink) -> Self {
        self.commit.traces.added.push(trace);
        self
    }

    /// Record the new value of an existing trace link
    #[inline]
    #[must_use]
    pub fn modify_trace(mut self, trace: TraceLink) -> Self {
        self.commit.traces.modified.push(trace);
        self
    }

    #[inline]
    #[must_use]
    pub fn remove_trace(mut self, trace: TraceLink) -> Self {
        self.commit.traces.removed.push(trace);
        self
    }

    /// Finish and validate
    ///
    /// # Errors
    /// Returns error if the described commit is structurally invalid
    pub fn build(self) -> Result<Commit, ModelError> {
        self.commit.validate()?;
        Ok(self.commit)
    }
}
