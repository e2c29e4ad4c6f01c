//! Output formatters for identification results.
//!
//! - [`text`]: one line per file, `md5sum`-like
//! - [`json`]: a single JSON document for scripting
//!
//! # Example
//!
//! ```no_run
//! use dupeprint::hashing::Hasher;
//! use dupeprint::identify::{identify_paths, Mode};
//! use dupeprint::output::json::JsonOutput;
//! use std::path::PathBuf;
//!
//! let hasher = Hasher::default();
//! let report = identify_paths(&[PathBuf::from("a.bin")], &hasher, Mode::Hash, true, None);
//! println!("{}", JsonOutput::new(&report).to_json_pretty().unwrap());
//! ```

pub mod json;
pub mod text;

use std::io::{self, Write};

use crate::cli::OutputFormat;
use crate::identify::IdentifyReport;

pub use json::JsonOutput;
pub use text::TextOutput;

/// Write `report` in the requested format.
///
/// # Errors
///
/// Returns any error from the underlying writer or serializer.
pub fn write_report<W: Write>(
    report: &IdentifyReport,
    format: OutputFormat,
    writer: &mut W,
) -> io::Result<()> {
    match format {
        OutputFormat::Text => TextOutput::new(report).write_to(writer),
        OutputFormat::Json => JsonOutput::new(report).write_to(writer),
    }
}
