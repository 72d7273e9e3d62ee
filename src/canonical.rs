//! Canonical serialization for fingerprints.
//!
//! Values are serialized to compact JSON and hashed with xxh64. Output is
//! stable as long as the input is:
//!
//! - struct fields serialize in declaration order
//! - sequences serialize in index order, so callers sort before hashing
//! - maps must be `BTreeMap`, never `HashMap`

use serde::Serialize;
use xxhash_rust::xxh64::xxh64;

/// Seed shared by every fingerprint in the crate.
const SEED: u64 = 0;

/// Serialize a value to canonical JSON bytes.
///
/// Only fails for types whose `Serialize` impl can fail (maps with
/// non-string keys); the crate's records never do.
pub fn to_canonical_bytes<T: Serialize>(value: &T) -> Vec<u8> {
    serde_json::to_vec(value).expect("Canonical serialization failed")
}

/// Canonical xxh64 hash of a serializable value.
pub fn canonical_hash<T: Serialize>(value: &T) -> u64 {
    xxh64(&to_canonical_bytes(value), SEED)
}

/// Canonical hash as 16 lowercase hex digits.
pub fn canonical_hash_hex<T: Serialize>(value: &T) -> String {
    format!("{:016x}", canonical_hash(value))
}
