// Content fingerprints for cross-session change detection.
//
// A fingerprint is the SHA-256 of the raw source bytes, rendered as
// `sha256:<lowercase hex>` so the algorithm travels with the value in the
// sidecar file.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

const SHA256_PREFIX: &str = "sha256:";

/// Prefixed, hex-encoded digest of a document's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already-encoded fingerprint (e.g. one read back from disk).
    pub fn from_encoded(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the fingerprint of the given bytes.
pub fn fingerprint(content: &[u8]) -> Fingerprint {
    let digest = Sha256::digest(content);
    Fingerprint(format!("{SHA256_PREFIX}{}", hex_encode(&digest)))
}

fn hex_encode(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        s.push_str(&format!("{b:02x}"));
    }
    s
}
