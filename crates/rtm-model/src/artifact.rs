//! Artifacts: requirement-like graph nodes

use crate::hash::{Fingerprint, FingerprintError};
use crate::ids::ArtifactId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A requirement-like node in the traceability graph
///
/// `id` is the canonical identity. `name` is shown to users and used by a
/// few legacy lookups, but nothing enforces its uniqueness.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: ArtifactId,
    pub name: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub document_ids: Vec<String>,
}

impl Artifact {
    /// Create artifact with empty body
    #[must_use]
    pub fn new(
        id: impl Into<ArtifactId>,
        name: impl Into<String>,
        artifact_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            artifact_type: artifact_type.into(),
            body: String::new(),
            attributes: BTreeMap::new(),
            document_ids: Vec::new(),
        }
    }

    /// Create artifact with a locally generated id
    #[must_use]
    pub fn draft(name: impl Into<String>, artifact_type: impl Into<String>) -> Self {
        Self::new(ArtifactId::generate(), name, artifact_type)
    }

    /// With body
    #[inline]
    #[must_use]
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// With a custom attribute
    #[inline]
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// With membership in a document
    #[inline]
    #[must_use]
    pub fn in_document(mut self, document_id: impl Into<String>) -> Self {
        self.document_ids.push(document_id.into());
        self
    }

    /// Content fingerprint over every field
    ///
    /// # Errors
    /// Returns error if an attribute value cannot be serialized
    pub fn fingerprint(&self) -> Result<Fingerprint, FingerprintError> {
        Fingerprint::of_serializable(self)
    }
}
