//! Full-content hasher.
//!
//! # Overview
//!
//! The content digest covers bytes `[read_size, size)`: everything after the
//! head window the fingerprint already hashed. The head is skipped to avoid
//! reading it twice, so the result is *not* the MD5 of the whole file and is
//! meant to be compared together with the fingerprint's head digest.
//!
//! Files with `size <= 2 * read_size` get no content digest at all; their
//! fingerprint already covers nearly every byte.
//!
//! The remainder is read in fixed-size blocks (1 MiB by default), each read
//! inside the full-hash phase of the [`ReadGate`]. Digest updates run
//! outside the lock.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use super::diagnostics::{Diagnostics, LogDiagnostics};
use super::digest::{Digest, DigestContext};
use super::gate::{IoGate, ReadGate, ReadPhase};
use super::policy::{needs_content_digest, IO_BLOCK_SIZE};
use super::{read_up_to, FileRecord, HashError, Outcome};

/// Computes content digests.
pub struct ContentHasher<G: ReadGate = IoGate> {
    gate: Arc<G>,
    block_size: usize,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<G: ReadGate> ContentHasher<G> {
    /// Create a hasher that reads through `gate` in [`IO_BLOCK_SIZE`] blocks.
    #[must_use]
    pub fn new(gate: Arc<G>) -> Self {
        Self {
            gate,
            block_size: IO_BLOCK_SIZE,
            diagnostics: Arc::new(LogDiagnostics::default()),
        }
    }

    /// Set the read block size. Clamped to at least one byte.
    #[must_use]
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Set the hook that hears about unreadable files.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// The read block size.
    #[must_use]
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Digest bytes `[read_size, size)` of the file at `path`.
    ///
    /// Returns `Ok(None)` without touching the file when it is too small to
    /// need a content digest.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened, seeked or read.
    pub fn digest_remainder(
        &self,
        path: &Path,
        size: u64,
        read_size: u64,
    ) -> Result<Option<Digest>, HashError> {
        if !needs_content_digest(size, read_size) {
            return Ok(None);
        }

        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.digest_reader(&mut file, size, read_size)
            .map(Some)
            .map_err(|e| HashError::from_io(path, e))
    }

    /// Digest bytes `[read_size, size)` of an already opened reader.
    ///
    /// Stops early if the reader hits end of file.
    ///
    /// # Errors
    ///
    /// Propagates seek and read errors.
    pub fn digest_reader<R: Read + Seek>(
        &self,
        reader: &mut R,
        size: u64,
        read_size: u64,
    ) -> io::Result<Digest> {
        let remaining = size.saturating_sub(read_size);
        reader.seek(SeekFrom::Start(read_size))?;

        let buf_len = usize::try_from(remaining).map_or(self.block_size, |r| r.min(self.block_size));
        let mut buf = vec![0u8; buf_len];
        let mut ctx = DigestContext::new();
        let mut consumed = 0u64;

        while consumed < remaining {
            let want = usize::try_from(remaining - consumed).map_or(buf.len(), |r| r.min(buf.len()));
            let n = self
                .gate
                .read(ReadPhase::FullHash, || read_up_to(&mut *reader, &mut buf[..want]))?;
            if n == 0 {
                break;
            }
            ctx.update(&buf[..n]);
            consumed += n as u64;
        }

        if consumed < remaining {
            log::debug!(
                "Content digest ended early: {} of {} bytes",
                consumed,
                remaining
            );
        }

        Ok(ctx.finalize())
    }

    /// Write `record.content_digest`, best effort.
    ///
    /// Small files are skipped. An unreadable file is reported through the
    /// diagnostics hook and leaves the record untouched.
    pub fn hash(&self, record: &mut FileRecord, read_size: u64) -> Outcome {
        if !needs_content_digest(record.size, read_size) {
            log::trace!(
                "Content digest skipped for small file: {}",
                record.path.display()
            );
            return Outcome::Skipped;
        }

        let mut file = match File::open(&record.path) {
            Ok(file) => file,
            Err(e) => {
                self.diagnostics.open_failed(&record.path, &e);
                return Outcome::Unreadable;
            }
        };

        match self.digest_reader(&mut file, record.size, read_size) {
            Ok(digest) => {
                log::trace!("Content digest computed: {}", record.path.display());
                record.content_digest = Some(digest);
                Outcome::Computed
            }
            Err(e) => {
                self.diagnostics.read_failed(&record.path, &e);
                Outcome::Unreadable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn hasher() -> ContentHasher {
        ContentHasher::new(Arc::new(IoGate::new()))
    }

    fn sample_data(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 31 % 256) as u8).collect()
    }

    #[test]
    fn test_default_block_size() {
        assert_eq!(hasher().block_size(), IO_BLOCK_SIZE);
        assert_eq!(hasher().with_block_size(0).block_size(), 1);
    }

    #[test]
    fn test_digest_covers_remainder_only() {
        let data = sample_data(1000);
        let digest = hasher()
            .digest_reader(&mut Cursor::new(data.clone()), 1000, 11)
            .unwrap();

        assert_eq!(digest, Digest::compute(&data[11..]));
        assert_ne!(digest, Digest::compute(&data));
    }

    #[test]
    fn test_block_size_does_not_change_digest() {
        let data = sample_data(5000);
        let expected = Digest::compute(&data[23..]);

        for block in [1, 7, 64, 1000, 4977, 1 << 20] {
            let digest = hasher()
                .with_block_size(block)
                .digest_reader(&mut Cursor::new(data.clone()), 5000, 23)
                .unwrap();
            assert_eq!(digest, expected, "block size {}", block);
        }
    }

    #[test]
    fn test_extra_bytes_past_recorded_size_are_ignored() {
        let data = sample_data(300);
        let digest = hasher()
            .with_block_size(64)
            .digest_reader(&mut Cursor::new(data.clone()), 200, 10)
            .unwrap();

        assert_eq!(digest, Digest::compute(&data[10..200]));
    }

    #[test]
    fn test_truncated_reader_hashes_what_exists() {
        let data = sample_data(100);
        let digest = hasher()
            .digest_reader(&mut Cursor::new(data.clone()), 500, 10)
            .unwrap();

        assert_eq!(digest, Digest::compute(&data[10..]));
    }

    #[test]
    fn test_small_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("small.bin");
        std::fs::write(&path, sample_data(20)).unwrap();

        let mut record = FileRecord::new(path.clone(), 20);
        assert_eq!(hasher().hash(&mut record, 10), Outcome::Skipped);
        assert!(record.content_digest.is_none());
        assert_eq!(hasher().digest_remainder(&path, 20, 10).unwrap(), None);
    }

    #[test]
    fn test_hash_record_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data.bin");
        let data = sample_data(3 * 1024 + 5);
        std::fs::write(&path, &data).unwrap();

        let mut record = FileRecord::new(path, data.len() as u64);
        let outcome = hasher().with_block_size(1024).hash(&mut record, 18);

        assert_eq!(outcome, Outcome::Computed);
        assert_eq!(record.content_digest, Some(Digest::compute(&data[18..])));
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let mut record = FileRecord::new(PathBuf::from("/nonexistent/dupeprint/full"), 1 << 20);
        assert_eq!(hasher().hash(&mut record, 100), Outcome::Unreadable);
        assert!(record.content_digest.is_none());

        let err = hasher()
            .digest_remainder(Path::new("/nonexistent/dupeprint/full"), 1 << 20, 100)
            .unwrap_err();
        assert!(matches!(err, HashError::NotFound(_)));
    }
}
