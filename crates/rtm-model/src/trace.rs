//! Trace links: directed, typed, approval-gated relations between artifacts

use crate::error::ModelError;
use crate::hash::{Fingerprint, FingerprintError};
use crate::ids::{ArtifactId, TraceId};
use serde::{Deserialize, Serialize};

/// Review state of a trace link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    #[default]
    Unreviewed,
    Approved,
    Declined,
}

/// How a trace link came to exist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TraceType {
    #[default]
    Manual,
    Generated,
}

/// Directed relation `source_id -> target_id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceLink {
    pub id: TraceId,
    pub source_id: ArtifactId,
    pub target_id: ArtifactId,
    #[serde(default)]
    pub approval_status: ApprovalStatus,
    #[serde(default)]
    pub trace_type: TraceType,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
}

fn default_confidence() -> f64 {
    1.0
}

impl TraceLink {
    /// Manual, unreviewed link with full confidence
    #[must_use]
    pub fn new(
        id: impl Into<TraceId>,
        source_id: impl Into<ArtifactId>,
        target_id: impl Into<ArtifactId>,
    ) -> Self {
        Self {
            id: id.into(),
            source_id: source_id.into(),
            target_id: target_id.into(),
            approval_status: ApprovalStatus::Unreviewed,
            trace_type: TraceType::Manual,
            confidence: 1.0,
        }
    }

    /// Generated link with a confidence score (clamped to 0.0..=1.0)
    #[must_use]
    pub fn generated(
        id: impl Into<TraceId>,
        source_id: impl Into<ArtifactId>,
        target_id: impl Into<ArtifactId>,
        confidence: f64,
    ) -> Self {
        Self {
            trace_type: TraceType::Generated,
            confidence: confidence.clamp(0.0, 1.0),
            ..Self::new(id, source_id, target_id)
        }
    }

    /// With approval status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: ApprovalStatus) -> Self {
        self.approval_status = status;
        self
    }

    #[inline]
    #[must_use]
    pub fn is_declined(&self) -> bool {
        self.approval_status == ApprovalStatus::Declined
    }

    #[inline]
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.trace_type == TraceType::Generated
    }

    /// Check whether the link touches an artifact at either end
    #[inline]
    #[must_use]
    pub fn touches(&self, artifact_id: &ArtifactId) -> bool {
        &self.source_id == artifact_id || &self.target_id == artifact_id
    }

    /// Structural checks applied before a link enters a commit
    ///
    /// # Errors
    /// Returns error on empty ids, self-reference, or a confidence outside 0..=1
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id.is_empty() || self.source_id.is_empty() || self.target_id.is_empty() {
            return Err(ModelError::EmptyId(self.id.to_string()));
        }
        if self.source_id == self.target_id {
            return Err(ModelError::SelfReferencingTrace(self.id.clone()));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ModelError::ConfidenceOutOfRange {
                id: self.id.clone(),
                confidence: self.confidence,
            });
        }
        Ok(())
    }

    /// Content fingerprint over every field
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn fingerprint(&self) -> Result<Fingerprint, FingerprintError> {
        Fingerprint::of_serializable(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_clamps_confidence() {
        let t = TraceLink::generated("T1", "A", "B", 1.7);
        assert!(t.is_generated());
        assert_eq!(t.confidence, 1.0);
    }

    #[test]
    fn validate_rejects_self_reference() {
        let t = TraceLink::new("T1", "A", "A");
        assert!(matches!(
            t.validate(),
            Err(ModelError::SelfReferencingTrace(_))
        ));
    }

    #[test]
    fn validate_rejects_bad_confidence() {
        let mut t = TraceLink::new("T1", "A", "B");
        t.confidence = -0.5;
        assert!(matches!(
            t.validate(),
            Err(ModelError::ConfidenceOutOfRange { .. })
        ));
    }

    #[test]
    fn status_wire_format() {
        let t = TraceLink::new("T1", "A", "B").with_status(ApprovalStatus::Declined);
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["approvalStatus"], "DECLINED");
        assert_eq!(json["traceType"], "MANUAL");
        assert!(t.is_declined());
    }

    #[test]
    fn deserialize_fills_defaults() {
        let t: TraceLink =
            serde_json::from_str(r#"{"id":"T1","sourceId":"A","targetId":"B"}"#).unwrap();
        assert_eq!(t.approval_status, ApprovalStatus::Unreviewed);
        assert_eq!(t.confidence, 1.0);
        assert!(t.touches(&ArtifactId::new("B")));
    }
}
