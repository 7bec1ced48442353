//! TOML-based configuration for tally.
//!
//! Supports a config file (tally.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [database]
//! dialect = "sqlite"
//! path = "${TALLY_DB}"
//!
//! [schema]
//! coding_values = "codings_values"
//! media = "media"
//!
//! [aggregate]
//! flat = true
//!
//! [logging]
//! filter = "tally=debug"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::aggregate::Schema;
use crate::sql::Dialect;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("No database path configured")]
    MissingDatabase,
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Database to aggregate over.
    pub database: DatabaseSettings,

    /// Physical table names.
    pub schema: Schema,

    /// Aggregation defaults.
    pub aggregate: AggregateSettings,

    /// Log filter.
    pub logging: LoggingSettings,
}

/// Database configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Dialect statements are rendered in.
    pub dialect: Dialect,

    /// Database file (supports ${ENV_VAR} expansion).
    pub path: Option<String>,
}

impl DatabaseSettings {
    /// Get the database path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<PathBuf, SettingsError> {
        let path = self.path.as_deref().ok_or(SettingsError::MissingDatabase)?;
        Ok(PathBuf::from(expand_env_vars(path)?))
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AggregateSettings {
    /// Unwrap singleton category/value tuples.
    pub flat: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// `tracing_subscriber::EnvFilter` directive, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `TALLY_CONFIG`
    /// 2. `./tally.toml`
    /// 3. `~/.config/tally/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("TALLY_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("tally.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tally").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            // $VAR ends at the first non-alphanumeric/underscore
            std::iter::from_fn(|| chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_'))
                .collect()
        };

        if var_name.is_empty() {
            // Just a lone $, keep it
            result.push('$');
            continue;
        }
        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
