//! Layered configuration.
//!
//! Settings are merged in this order, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML config file (platform config dir, or `--config PATH`)
//! 3. `DUPEPRINT_*` environment variables (e.g. `DUPEPRINT_SERIAL_IO=false`)
//! 4. Command-line flags
//!
//! # Example file
//!
//! ```toml
//! serial_io = false          # solid-state storage
//! block_size = 4194304       # 4 MiB full-hash reads
//! fingerprint_percent = 10
//! fingerprint_max_read = 8192  # 0 disables the cap
//! output = "json"
//! progress = false
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, OutputFormat};
use crate::hashing::{
    IoGate, SamplingPolicy, FINGERPRINT_MAX_READ, FINGERPRINT_PERCENT, IO_BLOCK_SIZE,
};

/// Prefix of environment variables read by [`Config`].
pub const ENV_PREFIX: &str = "DUPEPRINT_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serialize physical reads within each phase.
    pub serial_io: bool,
    /// Full-hash read block size in bytes.
    pub block_size: usize,
    /// Divisor in the fingerprint read-size formula.
    pub fingerprint_percent: u64,
    /// Cap on the fingerprint read size; 0 means uncapped.
    pub fingerprint_max_read: u64,
    /// Default output format for `fingerprint` and `hash`.
    pub output: OutputFormat,
    /// Show a progress bar.
    pub progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            serial_io: true,
            block_size: IO_BLOCK_SIZE,
            fingerprint_percent: FINGERPRINT_PERCENT,
            fingerprint_max_read: FINGERPRINT_MAX_READ,
            output: OutputFormat::Text,
            progress: true,
        }
    }
}

impl Config {
    /// Load from the default platform-specific path, falling back to defaults
    /// on any error.
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_from_path(path),
            None => {
                log::debug!("No config directory available, using defaults");
                Self::figment_without_file()
                    .extract()
                    .unwrap_or_else(|_| Self::default())
            }
        }
    }

    /// Load from `path`, falling back to defaults on any error.
    ///
    /// A missing file is not an error.
    pub fn load_from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::try_load_from_path(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!(
                    "Failed to load config from {}, using defaults: {}",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Load from `path`, reporting malformed files and bad values.
    ///
    /// # Errors
    ///
    /// Returns the figment error if the file cannot be parsed or a value has
    /// the wrong type.
    pub fn try_load_from_path(path: impl AsRef<Path>) -> Result<Self, figment::Error> {
        let path = path.as_ref();
        log::debug!("Loading config from {}", path.display());
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(path))
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
    }

    fn figment_without_file() -> Figment {
        Figment::from(Serialized::defaults(Self::default())).merge(Env::prefixed(ENV_PREFIX))
    }

    /// The default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("org", "dupeprint", "dupeprint")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Apply command-line overrides.
    pub fn merge_cli(&mut self, cli: &Cli) {
        if let Some(serial) = cli.serial_io_override() {
            self.serial_io = serial;
        }
        if let Some(block_size) = cli.block_size {
            self.block_size = block_size;
        }
    }

    /// Sampling policy shared by the sampler and the content hasher.
    #[must_use]
    pub fn sampling_policy(&self) -> SamplingPolicy {
        SamplingPolicy {
            percent: self.fingerprint_percent.max(1),
            max_read_size: (self.fingerprint_max_read > 0).then_some(self.fingerprint_max_read),
        }
    }

    /// Build the process-wide IO gate.
    #[must_use]
    pub fn build_gate(&self) -> IoGate {
        IoGate::with_serialization(self.serial_io)
    }

    /// Full-hash block size, never zero.
    #[must_use]
    pub fn effective_block_size(&self) -> usize {
        self.block_size.max(1)
    }
}
