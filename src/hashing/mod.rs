//! Content identification: fingerprints and partial content digests.
//!
//! This module provides functionality for:
//! - MD5 digests with an incremental init/update/finalize interface
//! - Cheap fingerprints (head digest, raw middle bytes, tail digest)
//! - Content digests of everything past the fingerprinted head
//! - Serialized physical reads across worker threads
//!
//! # Architecture
//!
//! The module is divided into submodules:
//! - [`digest`]: MD5 engine and the [`Digest`] value type
//! - [`gate`]: [`IoGate`] phase locks around physical reads
//! - [`policy`]: read-size formula and shared constants
//! - [`sampler`]: [`FingerprintSampler`]
//! - [`content`]: [`ContentHasher`]
//! - [`diagnostics`]: hook for unreadable files
//!
//! [`Hasher`] bundles a sampler and a content hasher that share one gate and
//! one sampling policy, which keeps their byte ranges consistent.
//!
//! # Example
//!
//! ```no_run
//! use dupeprint::hashing::{FileRecord, Hasher, IoGate};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! let gate = Arc::new(IoGate::new());
//! let hasher = Hasher::new(gate);
//!
//! let mut record = FileRecord::new(PathBuf::from("movie.mkv"), 734_003_200);
//! hasher.fingerprint(&mut record);
//! hasher.full_hash(&mut record);
//!
//! if let Some(digest) = record.content_digest {
//!     println!("{}  {}", digest, record.path.display());
//! }
//! ```

pub mod content;
pub mod diagnostics;
pub mod digest;
pub mod gate;
pub mod policy;
pub mod sampler;

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

// Re-export main types
pub use content::ContentHasher;
pub use diagnostics::{Diagnostics, LogDiagnostics};
pub use digest::{Digest, DigestContext, DigestParseError, DIGEST_LEN};
pub use gate::{GateGuard, IoGate, ReadGate, ReadPhase};
pub use policy::{
    needs_content_digest, SamplingPolicy, FINGERPRINT_MAX_READ, FINGERPRINT_PERCENT,
    IO_BLOCK_SIZE, MIDDLE_SAMPLE_LEN,
};
pub use sampler::FingerprintSampler;

/// Cheap partial identifier of a file.
///
/// Two files with different fingerprints cannot be duplicates. Equal
/// fingerprints only make a match possible: content between the sampled
/// windows is not covered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Fingerprint {
    /// Digest of the first `read_size` bytes, `None` if nothing was read.
    pub head: Option<Digest>,
    /// Raw bytes at the middle of the file, zero-padded on a short read.
    #[serde(serialize_with = "serialize_middle")]
    pub middle: [u8; MIDDLE_SAMPLE_LEN],
    /// Digest of the last `read_size` bytes, `None` if nothing was read.
    pub tail: Option<Digest>,
}

fn serialize_middle<S: serde::Serializer>(
    middle: &[u8; MIDDLE_SAMPLE_LEN],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let hex: String = middle.iter().map(|b| format!("{:02x}", b)).collect();
    serializer.serialize_str(&hex)
}

/// A file under consideration and the digests computed for it.
///
/// `path` and `size` come from the scanning layer. The two optional fields
/// are written by the sampler and the content hasher; `None` means "not
/// computed", either because the file was unreadable or (for the content
/// digest) too small to need one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Path to the file
    pub path: PathBuf,
    /// File size in bytes, as seen by the scanner
    pub size: u64,
    /// Head/middle/tail fingerprint
    pub fingerprint: Option<Fingerprint>,
    /// Digest of bytes `[read_size, size)`
    pub content_digest: Option<Digest>,
}

impl FileRecord {
    /// Create a record with no digests.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            fingerprint: None,
            content_digest: None,
        }
    }

    /// Create a record, taking the size from filesystem metadata.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the metadata cannot be read.
    pub fn from_path(path: impl Into<PathBuf>) -> Result<Self, HashError> {
        let path = path.into();
        let meta = std::fs::metadata(&path).map_err(|e| HashError::from_io(&path, e))?;
        Ok(Self::new(path, meta.len()))
    }
}

/// Result of a best-effort operation on a [`FileRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The digest field was written.
    Computed,
    /// The file is too small for a content digest; the field stays `None`.
    Skipped,
    /// The file could not be opened or read; the field stays `None`.
    Unreadable,
}

/// Errors that can occur during file hashing.
#[derive(thiserror::Error, Debug)]
pub enum HashError {
    /// The specified file was not found.
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// Permission was denied when reading the file.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// An I/O error occurred while reading the file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl HashError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: &Path, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source,
            },
        }
    }

    /// The path the error refers to.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(path) | Self::PermissionDenied(path) => path,
            Self::Io { path, .. } => path,
        }
    }
}

/// Fill `buf` from `reader`, stopping early only at end of file.
///
/// Returns the number of bytes read. A short count is not an error.
pub(crate) fn read_up_to<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Fingerprint sampler and content hasher sharing one gate and one policy.
pub struct Hasher<G: ReadGate = IoGate> {
    sampler: FingerprintSampler<G>,
    content: ContentHasher<G>,
    policy: SamplingPolicy,
}

impl<G: ReadGate> Hasher<G> {
    /// Create a hasher around a shared gate, with default policy and block size.
    #[must_use]
    pub fn new(gate: Arc<G>) -> Self {
        Self {
            sampler: FingerprintSampler::new(Arc::clone(&gate)),
            content: ContentHasher::new(gate),
            policy: SamplingPolicy::default(),
        }
    }

    /// Set the sampling policy used by both components.
    #[must_use]
    pub fn with_policy(mut self, policy: SamplingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the full-hash block size.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.content = self.content.with_block_size(block_size);
        self
    }

    /// Set the diagnostics hook used by both components.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.sampler = self.sampler.with_diagnostics(Arc::clone(&diagnostics));
        self.content = self.content.with_diagnostics(diagnostics);
        self
    }

    /// The sampling policy.
    #[must_use]
    pub fn policy(&self) -> SamplingPolicy {
        self.policy
    }

    /// Head/tail sample size for a file of `size` bytes.
    #[must_use]
    pub fn read_size_for(&self, size: u64) -> u64 {
        self.policy.read_size(size)
    }

    /// The fingerprint sampler.
    #[must_use]
    pub fn sampler(&self) -> &FingerprintSampler<G> {
        &self.sampler
    }

    /// The content hasher.
    #[must_use]
    pub fn content_hasher(&self) -> &ContentHasher<G> {
        &self.content
    }

    /// Write the record's fingerprint.
    pub fn fingerprint(&self, record: &mut FileRecord) -> Outcome {
        let read_size = self.read_size_for(record.size);
        self.sampler.fingerprint(record, read_size)
    }

    /// Write the record's content digest, if the file is large enough.
    pub fn full_hash(&self, record: &mut FileRecord) -> Outcome {
        let read_size = self.read_size_for(record.size);
        self.content.hash(record, read_size)
    }

    /// Fingerprint, then content-hash if the fingerprint succeeded.
    pub fn identify(&self, record: &mut FileRecord) -> Outcome {
        match self.fingerprint(record) {
            Outcome::Computed => match self.full_hash(record) {
                Outcome::Unreadable => Outcome::Unreadable,
                _ => Outcome::Computed,
            },
            other => other,
        }
    }
}

impl Default for Hasher<IoGate> {
    fn default() -> Self {
        Self::new(Arc::new(IoGate::new()))
    }
}

impl<G: ReadGate> std::fmt::Debug for Hasher<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Hasher")
            .field("policy", &self.policy)
            .field("block_size", &self.content.block_size())
            .finish_non_exhaustive()
    }
}
