//! Config fingerprinting: deterministic identification of analyzer settings.
//!
//! Two scans with the same fingerprint over the same candles produce the same
//! signals, so the fingerprint is logged with every scan cycle.

use crate::config::AnalyzerConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

/// BLAKE3 hex digest of the canonical JSON form of a config.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigHash(pub String);

impl ConfigHash {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(blake3::hash(bytes).to_hex().to_string())
    }

    /// First 12 hex characters, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..self.0.len().min(12)]
    }
}

impl fmt::Display for ConfigHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AnalyzerConfig {
    /// Symbol overrides live in a `BTreeMap`, so key order is canonical.
    pub fn fingerprint(&self) -> ConfigHash {
        // String keys and plain fields only: serialization cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        ConfigHash::from_bytes(&json)
    }
}
