//! MD5 digest engine.
//!
//! # Overview
//!
//! [`DigestContext`] is the incremental init/update/finalize interface used by
//! the fingerprint sampler and the content hasher. The transform itself comes
//! from the RustCrypto `md-5` crate and is byte-for-byte compatible with
//! RFC 1321, so digests produced here match `md5sum` and every other standard
//! implementation.
//!
//! # Example
//!
//! ```
//! use dupeprint::hashing::{Digest, DigestContext};
//!
//! let mut ctx = DigestContext::new();
//! ctx.update(b"a");
//! ctx.update(b"bc");
//! let digest = ctx.finalize();
//!
//! assert_eq!(digest, Digest::compute(b"abc"));
//! assert_eq!(digest.to_hex(), "900150983cd24fb0d6963f7d28e17f72");
//! ```

use std::fmt;
use std::io::{self, Read};
use std::str::FromStr;

use md5::{Digest as _, Md5};
use serde::{Serialize, Serializer};

/// Length of an MD5 digest in bytes.
pub const DIGEST_LEN: usize = 16;

/// Buffer size used when streaming a reader through [`DigestContext::update_reader`].
const READER_CHUNK: usize = 64 * 1024;

/// A 128-bit MD5 digest.
///
/// Absence of a digest is expressed as `Option<Digest>`, never as an
/// all-zero value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Digest([u8; DIGEST_LEN]);

impl Digest {
    /// Wrap raw digest bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Digest a complete byte slice in one call.
    #[must_use]
    pub fn compute(data: &[u8]) -> Self {
        let mut ctx = DigestContext::new();
        ctx.update(data);
        ctx.finalize()
    }

    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Lowercase hexadecimal representation (32 characters).
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Parse a 32-character hexadecimal string.
    ///
    /// # Errors
    ///
    /// Returns [`DigestParseError`] if the string has the wrong length or
    /// contains a non-hex character.
    pub fn from_hex(hex: &str) -> Result<Self, DigestParseError> {
        let hex = hex.trim();
        if hex.len() != DIGEST_LEN * 2 {
            return Err(DigestParseError::Length(hex.len()));
        }

        if let Some(pos) = hex.bytes().position(|b| !b.is_ascii_hexdigit()) {
            return Err(DigestParseError::InvalidHex(pos));
        }

        let mut bytes = [0u8; DIGEST_LEN];
        for (byte, pair) in bytes.iter_mut().zip(hex.as_bytes().chunks_exact(2)) {
            *byte = (hex_value(pair[0]) << 4) | hex_value(pair[1]);
        }
        Ok(Self(bytes))
    }
}

fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        _ => c - b'A' + 10,
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl FromStr for Digest {
    type Err = DigestParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Digest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

/// Errors from parsing a hexadecimal digest.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestParseError {
    /// The input did not have exactly 32 hex characters.
    #[error("expected 32 hex characters, got {0}")]
    Length(usize),

    /// A non-hex character was found at the given offset.
    #[error("invalid hex digit at offset {0}")]
    InvalidHex(usize),
}

/// Running state of one MD5 computation.
///
/// Owned by exactly one call; consumed by [`finalize`](Self::finalize).
#[derive(Clone, Default)]
pub struct DigestContext {
    inner: Md5,
}

impl DigestContext {
    /// Start a new digest.
    #[must_use]
    pub fn new() -> Self {
        Self { inner: Md5::new() }
    }

    /// Append bytes to the stream. Empty slices are a no-op.
    pub fn update(&mut self, data: &[u8]) {
        self.inner.update(data);
    }

    /// Stream a reader to EOF through the digest.
    ///
    /// Returns the number of bytes consumed.
    ///
    /// # Errors
    ///
    /// Propagates any non-`Interrupted` read error.
    pub fn update_reader<R: Read>(&mut self, mut reader: R) -> io::Result<u64> {
        let mut buf = vec![0u8; READER_CHUNK];
        let mut total = 0u64;
        loop {
            match reader.read(&mut buf) {
                Ok(0) => return Ok(total),
                Ok(n) => {
                    self.update(&buf[..n]);
                    total += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// Apply the length padding and produce the digest.
    #[must_use]
    pub fn finalize(self) -> Digest {
        let out = self.inner.finalize();
        let mut bytes = [0u8; DIGEST_LEN];
        bytes.copy_from_slice(&out);
        Digest(bytes)
    }
}

impl fmt::Debug for DigestContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DigestContext").finish_non_exhaustive()
    }
}
