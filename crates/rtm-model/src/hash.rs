//! Content fingerprints
//!
//! Provides [`Fingerprint`], a 32-byte Blake3 digest over an entity's
//! serialized content. Used to tell modified entities from unchanged ones
//! when deriving a delta from two store snapshots.

use std::fmt::{self, Display, Formatter};

/// A 32-byte content fingerprint (Blake3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Digest arbitrary bytes
    #[inline]
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Digest the JSON encoding of a value
    ///
    /// # Errors
    /// Returns error if serialization fails
    pub fn of_serializable<T>(value: &T) -> Result<Self, FingerprintError>
    where
        T: serde::Serialize,
    {
        let json = serde_json::to_vec(value)?;
        Ok(Self::compute(&json))
    }
}

impl Display for Fingerprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

/// Errors producing fingerprints
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
