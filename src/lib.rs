//! dupeprint - content identification for duplicate file detection
//!
//! Produces two kinds of identifiers for a file of known size:
//!
//! - a cheap **fingerprint** (MD5 of the head, raw middle bytes, MD5 of the
//!   tail) that rules out most non-duplicates after reading a few kilobytes;
//! - a **content digest** (MD5 of everything past the head window) that
//!   confirms duplicates among files whose fingerprints collide.
//!
//! Physical reads from concurrent workers are serialized per phase through
//! an [`IoGate`](hashing::IoGate) so rotating disks are read close to
//! sequentially while hashing still uses every core.

pub mod cli;
pub mod config;
pub mod error;
pub mod hashing;
pub mod identify;
pub mod logging;
pub mod output;
pub mod progress;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{Cli, Commands, DigestArgs, IdentifyArgs};
use crate::config::Config;
use crate::error::ExitCode;
use crate::hashing::{Digest, DigestContext, Hasher, LogDiagnostics};
use crate::identify::{identify_paths, Mode};
use crate::progress::{Progress, ProgressCallback};

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for configuration problems or when results cannot be
/// written. Unreadable input files are not errors; they produce
/// [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let mut config = load_config(cli.config.as_deref())?;
    config.merge_cli(&cli);
    log::debug!("Effective configuration: {:?}", config);

    match &cli.command {
        Commands::Fingerprint(args) => run_identify(&cli, &config, args, Mode::Fingerprint),
        Commands::Hash(args) => run_identify(&cli, &config, args, Mode::Hash),
        Commands::Digest(args) => run_digest(args),
    }
}

fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match explicit {
        Some(path) => {
            if !path.is_file() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            Config::try_load_from_path(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))
        }
        None => Ok(Config::load()),
    }
}

fn run_identify(cli: &Cli, config: &Config, args: &IdentifyArgs, mode: Mode) -> Result<ExitCode> {
    let gate = Arc::new(config.build_gate());
    let hasher = Hasher::new(gate)
        .with_policy(config.sampling_policy())
        .with_block_size(config.effective_block_size())
        .with_diagnostics(Arc::new(LogDiagnostics::new(cli.verbose)));

    let progress: Option<Arc<dyn ProgressCallback>> =
        (config.progress && !args.no_progress && !cli.quiet)
            .then(|| Arc::new(Progress::new(false)) as Arc<dyn ProgressCallback>);

    let report = identify_paths(&args.paths, &hasher, mode, config.serial_io, progress);

    let format = args.output.unwrap_or(config.output);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    output::write_report(&report, format, &mut out).context("Failed to write results")?;

    Ok(if report.has_unreadable() {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    })
}

fn run_digest(args: &DigestArgs) -> Result<ExitCode> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.paths.is_empty() {
        let digest = digest_reader(io::stdin().lock()).context("Failed to read stdin")?;
        writeln!(out, "{}  -", digest)?;
        return Ok(ExitCode::Success);
    }

    let mut failures = 0usize;
    for path in &args.paths {
        match digest_file(path) {
            Ok(digest) => writeln!(out, "{}  {}", digest, path.display())?,
            Err(e) => {
                log::error!("{:#}", e);
                failures += 1;
            }
        }
    }

    Ok(if failures > 0 {
        ExitCode::PartialSuccess
    } else {
        ExitCode::Success
    })
}

/// MD5 of a whole file.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn digest_file(path: &Path) -> Result<Digest> {
    let file = File::open(path).with_context(|| format!("Cannot open {}", path.display()))?;
    digest_reader(file).with_context(|| format!("Cannot read {}", path.display()))
}

fn digest_reader<R: io::Read>(reader: R) -> io::Result<Digest> {
    let mut ctx = DigestContext::new();
    ctx.update_reader(reader)?;
    Ok(ctx.finalize())
}
