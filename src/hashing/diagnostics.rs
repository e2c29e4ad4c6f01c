//! Diagnostic hook for files that cannot be read.
//!
//! Unreadable files are never fatal: the record is simply left without
//! digests. The hook lets the caller decide whether the user hears about it.

use std::io;
use std::path::Path;

/// Verbosity at which open failures are reported as warnings.
pub const OPEN_FAILURE_VERBOSITY: u8 = 1;

/// Receives non-fatal I/O failures from the sampler and the content hasher.
pub trait Diagnostics: Send + Sync {
    /// A file could not be opened.
    fn open_failed(&self, path: &Path, error: &io::Error);

    /// A file was opened but a seek or read failed.
    fn read_failed(&self, path: &Path, error: &io::Error) {
        log::debug!("Read failed for {}: {}", path.display(), error);
    }
}

/// Reports through the `log` facade, gated by a caller-supplied verbosity.
///
/// Open failures are logged at warn level once `verbosity` reaches
/// [`OPEN_FAILURE_VERBOSITY`], and at debug level below it.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics {
    verbosity: u8,
}

impl LogDiagnostics {
    /// Create a hook for the given verbosity (0 = normal, 1 = `-v`, ...).
    #[must_use]
    pub fn new(verbosity: u8) -> Self {
        Self { verbosity }
    }

    /// The configured verbosity.
    #[must_use]
    pub fn verbosity(&self) -> u8 {
        self.verbosity
    }

    fn warns(&self) -> bool {
        self.verbosity >= OPEN_FAILURE_VERBOSITY
    }
}

impl Diagnostics for LogDiagnostics {
    fn open_failed(&self, path: &Path, error: &io::Error) {
        if self.warns() {
            log::warn!("Cannot open {}: {}", path.display(), error);
        } else {
            log::debug!("Cannot open {}: {}", path.display(), error);
        }
    }

    fn read_failed(&self, path: &Path, error: &io::Error) {
        if self.warns() {
            log::warn!("Cannot read {}: {}", path.display(), error);
        } else {
            log::debug!("Cannot read {}: {}", path.display(), error);
        }
    }
}
