//! Plain text output.
//!
//! Fingerprint mode prints `HEAD MIDDLE TAIL SIZE PATH`; hash mode appends
//! the content digest before the size. Missing values are printed as `-`,
//! so every line has the same number of columns.

use std::io::{self, Write};

use crate::hashing::{Digest, Fingerprint};
use crate::identify::{IdentifiedFile, IdentifyReport, Mode};

/// Text formatter.
#[derive(Debug)]
pub struct TextOutput<'a> {
    report: &'a IdentifyReport,
}

impl<'a> TextOutput<'a> {
    /// Wrap a report.
    #[must_use]
    pub fn new(report: &'a IdentifyReport) -> Self {
        Self { report }
    }

    /// Render a single file line.
    #[must_use]
    pub fn format_line(&self, file: &IdentifiedFile) -> String {
        let record = &file.record;
        let (head, middle, tail) = fingerprint_columns(record.fingerprint.as_ref());
        let mut line = format!("{} {} {}", head, middle, tail);

        if self.report.mode == Mode::Hash {
            line.push(' ');
            line.push_str(&digest_column(record.content_digest.as_ref()));
        }

        let size = if file.readable {
            record.size.to_string()
        } else {
            "-".to_string()
        };
        line.push_str(&format!("  {}  {}", size, record.path.display()));
        line
    }

    /// Write all lines.
    ///
    /// # Errors
    ///
    /// Returns any error from the writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for file in &self.report.files {
            writeln!(writer, "{}", self.format_line(file))?;
        }
        writer.flush()
    }
}

fn digest_column(digest: Option<&Digest>) -> String {
    digest.map_or_else(|| "-".to_string(), Digest::to_hex)
}

fn fingerprint_columns(fp: Option<&Fingerprint>) -> (String, String, String) {
    match fp {
        Some(fp) => (
            digest_column(fp.head.as_ref()),
            fp.middle.iter().map(|b| format!("{:02x}", b)).collect(),
            digest_column(fp.tail.as_ref()),
        ),
        None => ("-".to_string(), "-".to_string(), "-".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashing::FileRecord;
    use crate::identify::IdentifySummary;
    use std::path::PathBuf;

    fn report(mode: Mode, files: Vec<IdentifiedFile>) -> IdentifyReport {
        IdentifyReport {
            mode,
            serial_io: true,
            files,
            summary: IdentifySummary::default(),
        }
    }

    fn file(fp: Option<Fingerprint>, content: Option<Digest>, readable: bool) -> IdentifiedFile {
        let mut record = FileRecord::new(PathBuf::from("/data/a.bin"), 100);
        record.fingerprint = fp;
        record.content_digest = content;
        IdentifiedFile {
            record,
            read_size: 4,
            readable,
        }
    }

    #[test]
    fn test_fingerprint_line() {
        let empty = Digest::compute(b"");
        let fp = Fingerprint {
            head: Some(empty),
            middle: [0xde, 0xad, 0xbe, 0xef, 0, 0, 0, 1],
            tail: None,
        };
        let report = report(Mode::Fingerprint, vec![file(Some(fp), None, true)]);
        let line = TextOutput::new(&report).format_line(&report.files[0]);

        assert_eq!(
            line,
            "d41d8cd98f00b204e9800998ecf8427e deadbeef00000001 -  100  /data/a.bin"
        );
    }

    #[test]
    fn test_unreadable_hash_line() {
        let report = report(Mode::Hash, vec![file(None, None, false)]);
        let line = TextOutput::new(&report).format_line(&report.files[0]);

        assert_eq!(line, "- - - -  -  /data/a.bin");
    }

    #[test]
    fn test_write_to() {
        let report = report(
            Mode::Hash,
            vec![file(None, None, false), file(None, None, false)],
        );
        let mut out = Vec::new();
        TextOutput::new(&report).write_to(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap().lines().count(), 2);
    }
}
