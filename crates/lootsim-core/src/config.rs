//! Configuration loading and typed config structures for the simulation worker.
//!
//! The configuration lives in `lootsim-config.yaml` in the working
//! directory, or at the path named by `LOOTSIM_CONFIG`. Every field has a
//! default, so a missing file or an empty document yields a usable config.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

/// File name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "lootsim-config.yaml";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "LOOTSIM_CONFIG";

/// Environment variable overriding `simulation.shards`.
pub const SHARDS_ENV: &str = "LOOTSIM_SHARDS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level worker configuration.
///
/// Mirrors the structure of `lootsim-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkerConfig {
    /// Engine execution settings.
    #[serde(default)]
    pub simulation: SimulationSettings,

    /// Progress reporting settings.
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Cancellation semantics.
    #[serde(default)]
    pub cancellation: CancellationConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl WorkerConfig {
    /// Load the configuration the worker should run with.
    ///
    /// Reads the file named by `LOOTSIM_CONFIG` if set, otherwise
    /// `lootsim-config.yaml` in the working directory. A missing default
    /// file yields the defaults; a missing explicit file is an error.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Self::from_file(&PathBuf::from(path));
        }
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Load configuration from a YAML file at the given path.
    ///
    /// `LOOTSIM_SHARDS` overrides `simulation.shards`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string. No environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(SHARDS_ENV) {
            self.simulation.apply_shards_override(&val);
        }
    }
}

/// Engine execution settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SimulationSettings {
    /// Number of shards runs are split across. 1 keeps the single-stream,
    /// bit-reproducible behaviour.
    #[serde(default = "default_shards")]
    pub shards: u32,

    /// Seed used when a start request carries none. `None` derives one
    /// from the clock.
    #[serde(default)]
    pub default_seed: Option<i64>,
}

impl SimulationSettings {
    /// Apply a textual shard count, ignoring values that are not a
    /// positive integer.
    pub fn apply_shards_override(&mut self, value: &str) {
        match value.trim().parse::<u32>() {
            Ok(shards) if shards > 0 => self.shards = shards,
            _ => warn!(value, "Ignoring invalid {SHARDS_ENV}"),
        }
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            shards: default_shards(),
            default_seed: None,
        }
    }
}

/// Progress reporting settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressConfig {
    /// Emit a progress message every N completed runs. The final run is
    /// always reported.
    #[serde(default = "default_progress_every")]
    pub every: u64,

    /// Capacity of the bounded channel carrying worker messages.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            every: default_progress_every(),
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// What a cancelled simulation hands back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelMode {
    /// Drop everything computed so far.
    #[default]
    Discard,
    /// Return the result aggregated over the completed runs.
    Partial,
}

/// Cancellation configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct CancellationConfig {
    /// Cancellation semantics.
    #[serde(default)]
    pub mode: CancelMode,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins when set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_shards() -> u32 {
    1
}

const fn default_progress_every() -> u64 {
    1
}

const fn default_channel_capacity() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_owned()
}
