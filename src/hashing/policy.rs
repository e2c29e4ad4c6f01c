//! Sampling constants and the fingerprint read-size formula.
//!
//! The sampler and the content hasher must agree on how many head bytes the
//! fingerprint consumed, otherwise the content digest covers an undefined
//! byte range. Both take their read size from the same [`SamplingPolicy`].

use serde::{Deserialize, Serialize};

/// Block size for full-hash reads (1 MiB).
pub const IO_BLOCK_SIZE: usize = 1024 * 1024;

/// Number of raw bytes sampled from the middle of a file.
pub const MIDDLE_SAMPLE_LEN: usize = 8;

/// Fingerprints read roughly `sqrt(size / FINGERPRINT_PERCENT)` bytes.
pub const FINGERPRINT_PERCENT: u64 = 10;

/// Upper bound on the head/tail sample size.
pub const FINGERPRINT_MAX_READ: u64 = 8192;

/// How much of a file the fingerprint samples from its head and tail.
///
/// The sample grows sub-linearly with file size so fingerprinting stays cheap
/// for large files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingPolicy {
    /// Divisor applied to the file size before the square root. Zero is
    /// treated as one.
    pub percent: u64,
    /// Optional cap on the computed read size.
    pub max_read_size: Option<u64>,
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        Self {
            percent: FINGERPRINT_PERCENT,
            max_read_size: Some(FINGERPRINT_MAX_READ),
        }
    }
}

impl SamplingPolicy {
    /// A policy without the read-size cap.
    #[must_use]
    pub fn uncapped() -> Self {
        Self {
            max_read_size: None,
            ..Self::default()
        }
    }

    /// Bytes to sample from the head and the tail of a file of `size` bytes.
    ///
    /// Computed as `isqrt(size / percent) + 1`, then capped. Always at least 1.
    ///
    /// ```
    /// use dupeprint::hashing::SamplingPolicy;
    ///
    /// let policy = SamplingPolicy::default();
    /// assert_eq!(policy.read_size(0), 1);
    /// assert_eq!(policy.read_size(1000), 11);
    /// assert_eq!(policy.read_size(1 << 40), 8192);
    /// ```
    #[must_use]
    pub fn read_size(&self, size: u64) -> u64 {
        let raw = (size / self.percent.max(1)).isqrt() + 1;
        match self.max_read_size {
            Some(max) => raw.min(max.max(1)),
            None => raw,
        }
    }
}

/// Whether a file is large enough for a content digest to add anything
/// beyond its fingerprint.
#[must_use]
pub fn needs_content_digest(size: u64, read_size: u64) -> bool {
    size > read_size.saturating_mul(2)
}
