//! Parser configuration, read from the `[parser]` table of a TOML file.
//!
//! ```toml
//! [parser]
//! max_depth = 256
//! trace_rules = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

/// Default limit on rule nesting.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Limits and diagnostics of a parse.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParserConfig {
    /// How deeply rules may nest before the parse is aborted.
    pub max_depth: usize,
    /// Emit a `trace` event on every rule entry and exit.
    pub trace_rules: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            trace_rules: false,
        }
    }
}

/// Errors raised while loading a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read parser config at {}", path.display())]
    Io {
        /// The file.
        path: PathBuf,
        /// Why it could not be read.
        #[source]
        source: std::io::Error,
    },
    /// The file is not valid TOML or has unexpected keys.
    #[error("failed to parse parser config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    parser: ParserConfig,
}

impl ParserConfig {
    /// Reads the `[parser]` table of a TOML document. Missing keys and a
    /// missing table take their defaults.
    ///
    /// # Errors
    ///
    /// Fails on invalid TOML and unknown keys.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(contents)?;
        Ok(file.parser)
    }

    /// Reads the configuration file at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Reads the configuration file at `path`, falling back to defaults when
    /// it is absent or invalid.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("{err}; using defaults");
                Self::default()
            }
        }
    }
}
