//! Application configuration management.
//!
//! Settings are merged in layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. TOML config file (`--config PATH`, else the platform config dir)
//! 3. `DEDUP_*` environment variables
//! 4. Command-line flags

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::duplicates::FinderConfig;
use crate::scanner::{WalkerConfig, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};

/// Prefix for environment overrides, e.g. `DEDUP_CHUNK_SIZE`.
pub const ENV_PREFIX: &str = "DEDUP_";

/// Errors raised while loading or validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or extracted.
    #[error("Invalid configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// The merged configuration is inconsistent.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Read chunk size used while hashing, in bytes.
    pub chunk_size: usize,
    /// Minimum file size to consider.
    pub min_size: Option<u64>,
    /// Maximum file size to consider.
    pub max_size: Option<u64>,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            min_size: None,
            max_size: None,
            skip_hidden: false,
        }
    }
}

impl Config {
    /// Build the layered figment without the CLI layer.
    ///
    /// With `explicit` unset, the default config file is used if it exists.
    #[must_use]
    pub fn figment(explicit: Option<&Path>) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        let file = explicit.map(Path::to_path_buf).or_else(Self::default_path);
        if let Some(path) = file {
            log::debug!("Loading config from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Load defaults, file and environment layers.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `explicit` names a missing file,
    /// or [`ConfigError::Load`] if any layer fails to parse.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.is_file() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
        }

        Self::figment(explicit).extract().map_err(Box::new).map_err(ConfigError::from)
    }

    /// Load every layer including command-line flags, then validate.
    ///
    /// # Errors
    ///
    /// See [`Config::load`] and [`Config::validate`].
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let config = Self::load(cli.config.as_deref())?.merge_cli(cli)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line overrides on top of this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `--chunk-size` does not fit in
    /// memory addresses on this platform.
    pub fn merge_cli(mut self, cli: &Cli) -> Result<Self, ConfigError> {
        if let Some(chunk) = cli.chunk_size {
            self.chunk_size = usize::try_from(chunk)
                .map_err(|_| ConfigError::Invalid(format!("chunk size {chunk} is too large")))?;
        }
        if cli.min_size.is_some() {
            self.min_size = cli.min_size;
        }
        if cli.max_size.is_some() {
            self.max_size = cli.max_size;
        }
        if cli.skip_hidden {
            self.skip_hidden = true;
        }
        Ok(self)
    }

    /// Check the merged configuration for inconsistencies.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if the chunk size is zero or above
    /// [`MAX_CHUNK_SIZE`], or the minimum size exceeds the maximum size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::Invalid(format!(
                "chunk_size ({}) exceeds the maximum of {MAX_CHUNK_SIZE} bytes",
                self.chunk_size
            )));
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "min_size ({min}) is larger than max_size ({max})"
                )));
            }
        }
        Ok(())
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.skip_hidden, self.min_size, self.max_size)
    }

    /// Finder settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_chunk_size(self.chunk_size)
            .with_walker_config(self.walker_config())
    }

    /// Get the default platform-specific configuration path, if it exists.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        let project_dirs = ProjectDirs::from("", "", "dedup")?;
        let path = project_dirs.config_dir().join("config.toml");
        path.is_file().then_some(path)
    }
}
