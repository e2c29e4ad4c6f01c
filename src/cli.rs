//! Command-line interface definitions for dupeprint.
//!
//! # Example
//!
//! ```bash
//! # Fingerprint some files
//! dupeprint fingerprint a.iso b.iso
//!
//! # Fingerprint and content-digest, JSON output
//! dupeprint hash --output json ~/Downloads/*.zip
//!
//! # Plain whole-file MD5, md5sum style
//! dupeprint digest notes.txt
//!
//! # Solid-state disk: let reads run concurrently
//! dupeprint --no-serial-io hash *.mkv
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Fingerprints and partial content digests for duplicate detection.
#[derive(Debug, Parser)]
#[command(name = "dupeprint")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug and unreadable-file warnings, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "PATH", global = true, env = "DUPEPRINT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Serialize physical reads across threads (best for rotating disks)
    #[arg(long, global = true, overrides_with = "no_serial_io")]
    pub serial_io: bool,

    /// Let reads run concurrently (best for solid-state storage)
    #[arg(long, global = true, overrides_with = "serial_io")]
    pub no_serial_io: bool,

    /// Block size for full-content reads (e.g., 64KiB, 1MiB)
    #[arg(long, value_name = "SIZE", global = true, value_parser = parse_block_size)]
    pub block_size: Option<usize>,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// The serial-IO choice made on the command line, if any.
    #[must_use]
    pub fn serial_io_override(&self) -> Option<bool> {
        if self.no_serial_io {
            Some(false)
        } else if self.serial_io {
            Some(true)
        } else {
            None
        }
    }
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute head/middle/tail fingerprints
    Fingerprint(IdentifyArgs),
    /// Compute fingerprints and content digests
    Hash(IdentifyArgs),
    /// Print the MD5 of whole files (stdin when no path is given)
    Digest(DigestArgs),
}

/// Arguments for `fingerprint` and `hash`.
#[derive(Debug, Args)]
pub struct IdentifyArgs {
    /// Files to identify
    #[arg(value_name = "PATH", required = true)]
    pub paths: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Hide the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for `digest`.
#[derive(Debug, Args)]
pub struct DigestArgs {
    /// Files to digest
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,
}

/// Result output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per file
    #[default]
    Text,
    /// A JSON document
    Json,
}

/// Parse a block size such as `4096`, `64KiB` or `1M`.
///
/// Decimal (`KB`, `MB`) and binary (`KiB`, `MiB`) suffixes are accepted;
/// single-letter suffixes are binary. Zero is rejected.
///
/// # Errors
///
/// Returns a message suitable for clap if the value is malformed.
pub fn parse_block_size(s: &str) -> Result<usize, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit()) {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: usize = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: usize = match suffix.as_str() {
        "" | "B" => 1,
        "KB" => 1_000,
        "K" | "KIB" => 1_024,
        "MB" => 1_000_000,
        "M" | "MIB" => 1_048_576,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    let size = num
        .checked_mul(multiplier)
        .ok_or_else(|| format!("Size too large: '{s}'"))?;
    if size == 0 {
        return Err("Block size must be at least one byte".to_string());
    }
    Ok(size)
}
