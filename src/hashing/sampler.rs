//! Fingerprint sampler: head digest, raw middle bytes, tail digest.
//!
//! # Overview
//!
//! A fingerprint reads `read_size` bytes from the start of a file, a few raw
//! bytes from its midpoint and `read_size` bytes from its end. Head and tail
//! are reduced to MD5 digests; the middle sample is kept as-is since it is
//! only a cheap tie-breaker.
//!
//! Each of the three physical reads happens inside the fingerprint phase of
//! the [`ReadGate`]. Seeks and hashing are outside it.
//!
//! Sample windows are clamped to `[0, size)`. For a file smaller than
//! `read_size` the head and tail windows both cover the whole file.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

use super::diagnostics::{Diagnostics, LogDiagnostics};
use super::digest::Digest;
use super::gate::{IoGate, ReadGate, ReadPhase};
use super::policy::MIDDLE_SAMPLE_LEN;
use super::{read_up_to, FileRecord, Fingerprint, HashError, Outcome};

/// Builds [`Fingerprint`]s.
pub struct FingerprintSampler<G: ReadGate = IoGate> {
    gate: Arc<G>,
    diagnostics: Arc<dyn Diagnostics>,
}

impl<G: ReadGate> FingerprintSampler<G> {
    /// Create a sampler that reads through `gate`.
    #[must_use]
    pub fn new(gate: Arc<G>) -> Self {
        Self {
            gate,
            diagnostics: Arc::new(LogDiagnostics::default()),
        }
    }

    /// Set the hook that hears about unreadable files.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Fingerprint the file at `path`, assumed to be `size` bytes long.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened, seeked or read.
    /// Short reads are not errors.
    pub fn sample(&self, path: &Path, size: u64, read_size: u64) -> Result<Fingerprint, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        self.sample_reader(&mut file, size, read_size)
            .map_err(|e| HashError::from_io(path, e))
    }

    /// Fingerprint an already opened reader.
    ///
    /// # Errors
    ///
    /// Propagates seek and read errors.
    pub fn sample_reader<R: Read + Seek>(
        &self,
        reader: &mut R,
        size: u64,
        read_size: u64,
    ) -> io::Result<Fingerprint> {
        let window = read_size.min(size);
        let mut buf = vec![0u8; usize::try_from(window).unwrap_or(usize::MAX)];

        let n = self
            .gate
            .read(ReadPhase::Fingerprint, || read_up_to(&mut *reader, &mut buf))?;
        let head = (n > 0).then(|| Digest::compute(&buf[..n]));

        let mut middle = [0u8; MIDDLE_SAMPLE_LEN];
        reader.seek(SeekFrom::Start(size / 2))?;
        self.gate
            .read(ReadPhase::Fingerprint, || read_up_to(&mut *reader, &mut middle))?;

        reader.seek(SeekFrom::Start(size.saturating_sub(read_size)))?;
        let n = self
            .gate
            .read(ReadPhase::Fingerprint, || read_up_to(&mut *reader, &mut buf))?;
        let tail = (n > 0).then(|| Digest::compute(&buf[..n]));

        Ok(Fingerprint { head, middle, tail })
    }

    /// Write `record.fingerprint`, best effort.
    ///
    /// An unreadable file is reported through the diagnostics hook and leaves
    /// the record untouched.
    pub fn fingerprint(&self, record: &mut FileRecord, read_size: u64) -> Outcome {
        let mut file = match File::open(&record.path) {
            Ok(file) => file,
            Err(e) => {
                self.diagnostics.open_failed(&record.path, &e);
                return Outcome::Unreadable;
            }
        };

        match self.sample_reader(&mut file, record.size, read_size) {
            Ok(fp) => {
                log::trace!("Fingerprint computed: {}", record.path.display());
                record.fingerprint = Some(fp);
                Outcome::Computed
            }
            Err(e) => {
                self.diagnostics.read_failed(&record.path, &e);
                Outcome::Unreadable
            }
        }
    }
}
