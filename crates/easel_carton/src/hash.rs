//! Content fingerprints using xxHash3.
//!
//! Fingerprints key the compiled-output cache, so they must be stable across
//! runs and platforms. Do not swap the algorithm without bumping the cache.

use xxhash_rust::xxh3::{xxh3_64, Xxh3};

/// Compute a 64-bit hash of the given string using xxHash3.
#[inline]
pub fn hash_str(data: &str) -> u64 {
    xxh3_64(data.as_bytes())
}

/// Convert a hash to a hex string (16 characters).
#[inline]
pub fn hash_to_hex(hash: u64) -> String {
    format!("{:016x}", hash)
}

/// Compute hash of a string and return as hex.
#[inline]
pub fn content_hash(content: &str) -> String {
    hash_to_hex(hash_str(content))
}

/// Incremental fingerprint over a sequence of fields.
///
/// Each field is length-prefixed, so `["ab", "c"]` and `["a", "bc"]` hash
/// differently.
pub struct Fingerprint {
    hasher: Xxh3,
}

impl Fingerprint {
    pub fn new() -> Self {
        Self {
            hasher: Xxh3::new(),
        }
    }

    /// Add a string field.
    pub fn field(mut self, value: &str) -> Self {
        self.hasher.update(&(value.len() as u64).to_le_bytes());
        self.hasher.update(value.as_bytes());
        self
    }

    /// Add an optional string field. `None` and `Some("")` differ.
    pub fn optional(mut self, value: Option<&str>) -> Self {
        match value {
            Some(value) => {
                self.hasher.update(&[1]);
                self.field(value)
            }
            None => {
                self.hasher.update(&[0]);
                self
            }
        }
    }

    /// Add a list of string fields, prefixed with its length.
    pub fn list<S: AsRef<str>>(mut self, values: &[S]) -> Self {
        self.hasher.update(&(values.len() as u64).to_le_bytes());
        values
            .iter()
            .fold(self, |fingerprint, value| fingerprint.field(value.as_ref()))
    }

    /// Add a boolean flag.
    pub fn flag(mut self, value: bool) -> Self {
        self.hasher.update(&[value as u8]);
        self
    }

    /// Finish and return the hex digest.
    pub fn finish(self) -> String {
        hash_to_hex(self.hasher.digest())
    }
}

impl Default for Fingerprint {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable_hex() {
        let hash = content_hash("template content");
        assert_eq!(hash.len(), 16);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hash, content_hash("template content"));
        assert_ne!(hash, content_hash("template content "));
    }

    #[test]
    fn test_fingerprint_field_boundaries() {
        let a = Fingerprint::new().field("ab").field("c").finish();
        let b = Fingerprint::new().field("a").field("bc").finish();
        assert_ne!(a, b);
    }

    #[test]
    fn test_fingerprint_optional_distinguishes_none() {
        let none = Fingerprint::new().optional(None).finish();
        let empty = Fingerprint::new().optional(Some("")).finish();
        assert_ne!(none, empty);
    }

    #[test]
    fn test_fingerprint_list_order_matters() {
        let a = Fingerprint::new().list(&["x.js", "y.js"]).finish();
        let b = Fingerprint::new().list(&["y.js", "x.js"]).finish();
        assert_ne!(a, b);
        assert_eq!(a, Fingerprint::new().list(&["x.js", "y.js"]).finish());
    }
}
