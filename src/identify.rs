//! Parallel identification driver.
//!
//! Turns a list of paths into [`FileRecord`]s and runs the shared [`Hasher`]
//! over them on rayon's global pool. This is a thin stand-in for a real
//! scheduler: every file is processed, no size grouping is done, and pool
//! sizing is left to rayon.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;
use serde::Serialize;

use crate::hashing::{FileRecord, Hasher, Outcome, ReadGate};
use crate::progress::ProgressCallback;

/// What to compute for each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Fingerprint only.
    Fingerprint,
    /// Fingerprint and content digest.
    Hash,
}

impl Mode {
    fn phase_name(self) -> &'static str {
        match self {
            Self::Fingerprint => "fingerprint",
            Self::Hash => "hash",
        }
    }
}

/// One processed file.
#[derive(Debug, Clone, Serialize)]
pub struct IdentifiedFile {
    /// The record with whatever digests could be computed
    #[serde(flatten)]
    pub record: FileRecord,
    /// Head/tail sample size used for this file
    pub read_size: u64,
    /// Whether the file could be read
    pub readable: bool,
}

/// Counts over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IdentifySummary {
    /// Files requested
    pub total_files: usize,
    /// Sum of the sizes of all readable files
    pub total_bytes: u64,
    /// Files that got a fingerprint
    pub fingerprinted: usize,
    /// Files that got a content digest
    pub content_digests: usize,
    /// Files that could not be opened or read
    pub unreadable: usize,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
}

/// Results of one run, in input order.
#[derive(Debug, Clone, Serialize)]
pub struct IdentifyReport {
    /// What was computed
    pub mode: Mode,
    /// Whether reads were serialized through the IO gate
    pub serial_io: bool,
    /// Per-file results
    pub files: Vec<IdentifiedFile>,
    /// Aggregate counts
    pub summary: IdentifySummary,
}

impl IdentifyReport {
    /// Whether any file could not be read.
    #[must_use]
    pub fn has_unreadable(&self) -> bool {
        self.summary.unreadable > 0
    }
}

/// Identify `paths` in parallel.
///
/// Paths that are missing or not regular files are kept in the report as
/// unreadable entries; they never abort the run.
pub fn identify_paths<G: ReadGate>(
    paths: &[PathBuf],
    hasher: &Hasher<G>,
    mode: Mode,
    serial_io: bool,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> IdentifyReport {
    let start = Instant::now();
    log::info!(
        "Identifying {} file(s) ({}, serial IO {})",
        paths.len(),
        mode.phase_name(),
        if serial_io { "on" } else { "off" }
    );

    if let Some(ref callback) = progress {
        callback.on_phase_start(mode.phase_name(), paths.len());
    }

    let files: Vec<IdentifiedFile> = paths
        .par_iter()
        .map(|path| {
            let file = identify_one(path.clone(), hasher, mode);
            if let Some(ref callback) = progress {
                callback.on_item_completed(&file.record.path.to_string_lossy(), file.record.size);
            }
            file
        })
        .collect();

    if let Some(ref callback) = progress {
        callback.on_phase_end(mode.phase_name());
    }

    let summary = summarize(&files, start.elapsed());
    log::info!(
        "Identified {} file(s), {} total, {} unreadable",
        summary.total_files,
        ByteSize::b(summary.total_bytes),
        summary.unreadable
    );

    IdentifyReport {
        mode,
        serial_io,
        files,
        summary,
    }
}

fn identify_one<G: ReadGate>(path: PathBuf, hasher: &Hasher<G>, mode: Mode) -> IdentifiedFile {
    let size = match fs::metadata(&path) {
        Ok(meta) if meta.is_file() => meta.len(),
        Ok(_) => {
            log::warn!("Skipping {}: not a regular file", path.display());
            return unreadable(path);
        }
        Err(e) => {
            log::warn!("Skipping {}: {}", path.display(), e);
            return unreadable(path);
        }
    };

    let mut record = FileRecord::new(path, size);
    let read_size = hasher.read_size_for(size);
    let outcome = match mode {
        Mode::Fingerprint => hasher.fingerprint(&mut record),
        Mode::Hash => hasher.identify(&mut record),
    };

    log::debug!(
        "{} ({}): {:?}",
        record.path.display(),
        ByteSize::b(size),
        outcome
    );

    IdentifiedFile {
        record,
        read_size,
        readable: outcome != Outcome::Unreadable,
    }
}

fn unreadable(path: PathBuf) -> IdentifiedFile {
    IdentifiedFile {
        record: FileRecord::new(path, 0),
        read_size: 0,
        readable: false,
    }
}

fn summarize(files: &[IdentifiedFile], elapsed: Duration) -> IdentifySummary {
    let mut summary = IdentifySummary {
        total_files: files.len(),
        duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        ..Default::default()
    };

    for file in files {
        if !file.readable {
            summary.unreadable += 1;
            continue;
        }
        summary.total_bytes += file.record.size;
        if file.record.fingerprint.is_some() {
            summary.fingerprinted += 1;
        }
        if file.record.content_digest.is_some() {
            summary.content_digests += 1;
        }
    }
    summary
}
