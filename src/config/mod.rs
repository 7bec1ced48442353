//! Configuration module for tally.
//!
//! Handles the TOML config file, environment variables, and settings.

mod settings;

pub use settings::{
    expand_env_vars, AggregateSettings, DatabaseSettings, LoggingSettings, Settings, SettingsError,
};
