//! JSON output formatter.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "mode": "hash",
//!   "serial_io": true,
//!   "files": [
//!     {
//!       "path": "/data/a.bin",
//!       "size": 4096,
//!       "fingerprint": {
//!         "head": "…32 hex…",
//!         "middle": "0011223344556677",
//!         "tail": "…32 hex…"
//!       },
//!       "content_digest": "…32 hex… or null",
//!       "read_size": 21,
//!       "readable": true
//!     }
//!   ],
//!   "summary": {
//!     "total_files": 1,
//!     "total_bytes": 4096,
//!     "fingerprinted": 1,
//!     "content_digests": 1,
//!     "unreadable": 0,
//!     "duration_ms": 3
//!   }
//! }
//! ```

use std::io::{self, Write};

use crate::identify::IdentifyReport;

/// JSON formatter.
#[derive(Debug)]
pub struct JsonOutput<'a> {
    report: &'a IdentifyReport,
}

impl<'a> JsonOutput<'a> {
    /// Wrap a report.
    #[must_use]
    pub fn new(report: &'a IdentifyReport) -> Self {
        Self { report }
    }

    /// Compact JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self.report)
    }

    /// Pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self.report)
    }

    /// Write pretty JSON followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer or serializer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self.report)?;
        writeln!(writer)?;
        writer.flush()
    }
}
