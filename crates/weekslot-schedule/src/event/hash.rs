//! Order-independent digests over named fields.
//!
//! Fields are sorted by key before hashing, so the order in which a caller
//! supplies them never changes the digest. The canonical form is a JSON array
//! of `[key, value]` pairs, hashed with SHA-256 and hex-encoded.

use std::collections::BTreeMap;

use serde_json::Value;
use sha2::{Digest, Sha256};

/// ## Summary
/// Computes the hex SHA-256 digest of the canonical form of `fields`.
///
/// When a key is supplied more than once, the last value wins.
#[must_use]
pub fn digest_fields<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = (&'a str, Value)>,
{
    let canonical: BTreeMap<&str, Value> = fields.into_iter().collect();
    let pairs = canonical
        .into_iter()
        .map(|(key, value)| Value::Array(vec![Value::String(key.to_string()), value]))
        .collect();

    let mut hasher = Sha256::new();
    hasher.update(Value::Array(pairs).to_string().as_bytes());
    hex::encode(hasher.finalize())
}
