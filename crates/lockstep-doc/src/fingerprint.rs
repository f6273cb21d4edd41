//! Content fingerprinting for change detection
//!
//! A fingerprint is a short comparable token standing in for a leaf value:
//! scalars fingerprint by their literal textual form, composites by a
//! cryptographic digest (default 160-bit SHA-1, hex) of their canonical
//! serialization. Equality of fingerprints is equality of values for
//! change-detection purposes; digest collisions on composites are a known,
//! accepted trade for O(1) comparison of arbitrarily large values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// A pluggable digest over the canonical bytes of a composite value.
///
/// Must be deterministic across runs: fingerprints are persisted in ledgers
/// and compared between sessions.
pub type DigestFn = fn(&[u8]) -> String;

/// Compute the SHA-1 digest of the given bytes as lowercase hex.
///
/// This is the default fingerprint digest (160 bits).
pub fn sha1_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Compute the SHA-256 digest of the given bytes as lowercase hex.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// A comparable token standing in for a leaf value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Render a value as canonical text: compact JSON with mapping keys sorted
/// recursively, so key order never perturbs a composite fingerprint.
pub fn canonical_text(value: &Value) -> String {
    sort_value(value).to_string()
}

fn sort_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut sorted = Map::new();
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();
            for key in keys {
                if let Some(v) = map.get(key) {
                    sorted.insert(key.clone(), sort_value(v));
                }
            }
            Value::Object(sorted)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        other => other.clone(),
    }
}

/// Computes fingerprints with a configurable digest.
#[derive(Debug, Clone, Copy)]
pub struct Fingerprinter {
    digest: DigestFn,
}

impl Fingerprinter {
    /// Create a fingerprinter with the default SHA-1 digest.
    pub fn new() -> Self {
        Self { digest: sha1_hex }
    }

    /// Create a fingerprinter with a custom digest.
    pub fn with_digest(digest: DigestFn) -> Self {
        Self { digest }
    }

    /// Fingerprint a value.
    ///
    /// Strings fingerprint as themselves, numbers and booleans and `null` as
    /// their literal textual form, mappings and sequences as the digest of
    /// their canonical text.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockstep_doc::fingerprint::{Fingerprint, Fingerprinter};
    /// use serde_json::json;
    ///
    /// let fp = Fingerprinter::new();
    /// assert_eq!(fp.fingerprint(&json!(42)), Fingerprint::new("42"));
    /// assert_eq!(fp.fingerprint(&json!("x")), Fingerprint::new("x"));
    /// assert_eq!(
    ///     fp.fingerprint(&json!({"a": 1, "b": 2})),
    ///     fp.fingerprint(&json!({"b": 2, "a": 1})),
    /// );
    /// ```
    pub fn fingerprint(&self, value: &Value) -> Fingerprint {
        match value {
            Value::String(s) => Fingerprint::new(s.clone()),
            Value::Number(n) => Fingerprint::new(n.to_string()),
            Value::Bool(b) => Fingerprint::new(b.to_string()),
            Value::Null => Fingerprint::new("null"),
            composite => Fingerprint::new((self.digest)(canonical_text(composite).as_bytes())),
        }
    }
}

impl Default for Fingerprinter {
    fn default() -> Self {
        Self::new()
    }
}
