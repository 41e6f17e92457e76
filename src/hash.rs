//! Hashing utilities for canonical features

use blake3::Hasher;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// BLAKE3 digest of a canonical feature encoding
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FeatureDigest([u8; 32]);

impl FeatureDigest {
    pub fn to_hex(&self) -> String {
        blake3::Hash::from(self.0).to_hex().to_string()
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for FeatureDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeatureDigest({})", &self.to_hex()[..16])
    }
}

impl Serialize for FeatureDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Incremental builder for an unambiguous byte encoding
///
/// Every value is prefixed with a one-byte tag and variable-length data with
/// its length, so distinct structures never share an encoding.
pub struct DigestBuilder {
    hasher: Hasher,
}

impl DigestBuilder {
    pub fn new() -> Self {
        Self {
            hasher: Hasher::new(),
        }
    }

    pub fn tag(&mut self, tag: u8) -> &mut Self {
        self.hasher.update(&[tag]);
        self
    }

    pub fn length(&mut self, len: usize) -> &mut Self {
        self.hasher.update(&(len as u64).to_le_bytes());
        self
    }

    pub fn str(&mut self, value: &str) -> &mut Self {
        self.length(value.len());
        self.hasher.update(value.as_bytes());
        self
    }

    pub fn i64(&mut self, value: i64) -> &mut Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    pub fn u64(&mut self, value: u64) -> &mut Self {
        self.hasher.update(&value.to_le_bytes());
        self
    }

    pub fn finish(&self) -> FeatureDigest {
        FeatureDigest(*self.hasher.finalize().as_bytes())
    }
}

impl Default for DigestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Duplicate statistics for one feature sequence
///
/// Repeated identical features are legal but make alignment ambiguous, so
/// the pipeline logs them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestStats {
    pub total: usize,
    pub unique: usize,
    pub duplicates: usize,
}

impl DigestStats {
    pub fn from_digests(digests: impl IntoIterator<Item = FeatureDigest>) -> Self {
        let mut counts: HashMap<FeatureDigest, usize> = HashMap::new();
        let mut total = 0;
        for digest in digests {
            *counts.entry(digest).or_insert(0) += 1;
            total += 1;
        }
        let unique = counts.len();

        Self {
            total,
            unique,
            duplicates: total - unique,
        }
    }

    pub fn has_duplicates(&self) -> bool {
        self.duplicates > 0
    }
}
