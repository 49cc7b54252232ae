//! Digest over ordered primitive values, plus checksum classification.

use crate::types::Primitive;

/// Hex length of a grouping hash (also the length of a pre-hashed checksum).
pub const HASH_LEN: usize = 32;

/// Hash an ordered sequence of primitives.
///
/// Byte forms are concatenated with no separator and hashed with blake3.
/// Only the first 16 bytes (32 hex chars) are kept.
pub fn hash_from_values(values: &[Primitive]) -> String {
  let mut hasher = blake3::Hasher::new();
  for value in values {
    hasher.update(&value.to_bytes());
  }
  let hex = hasher.finalize().to_hex();
  hex[..HASH_LEN].to_string()
}

/// True for exactly 32 lowercase hex characters: a checksum already in final form.
pub fn is_hash(s: &str) -> bool {
  s.len() == HASH_LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}
