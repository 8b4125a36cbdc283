//! Stable percentage hashing
//!
//! Maps strings onto `[0, 100)` with four decimal digits of precision. The
//! mapping depends only on the UTF-8 bytes of the input, so every process
//! buckets a given user into the same slot.

use sha2::{Digest, Sha256};

/// Number of distinct buckets (`100 * 10^4`).
const BUCKETS: u32 = 1_000_000;

/// Buckets per percentage point.
const PRECISION: f64 = 10_000.0;

/// Deterministic string-to-percentage hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct StableHasher;

impl StableHasher {
    /// Hash `input` to a value in `[0, 100)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use armature_targeting::StableHasher;
    ///
    /// let p = StableHasher::percentage("checkout\nalice");
    /// assert!((0.0..100.0).contains(&p));
    /// assert_eq!(p, StableHasher::percentage("checkout\nalice"));
    /// ```
    pub fn percentage(input: &str) -> f64 {
        let digest = Sha256::digest(input.as_bytes());
        let value = u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]]);

        f64::from(value % BUCKETS) / PRECISION
    }

    /// Hash a `prefix`/`id` pair joined by a newline.
    ///
    /// Used for `feature\ngroup`, `feature\nuser` and `seed\nuser` keys.
    pub fn keyed_percentage(prefix: &str, id: &str) -> f64 {
        let mut key = String::with_capacity(prefix.len() + id.len() + 1);
        key.push_str(prefix);
        key.push('\n');
        key.push_str(id);

        Self::percentage(&key)
    }
}
