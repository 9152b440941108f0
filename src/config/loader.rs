// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// The built-in Rails/JRuby table, used when no config file is found.
pub const BUILTIN_CONFIG: &str = include_str!("default.toml");

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] to
/// also compile patterns and check the rule table.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// The embedded default configuration, deserialized but not validated.
pub fn builtin_raw_config() -> Result<RawConfigFile> {
    Ok(toml::from_str(BUILTIN_CONFIG)?)
}

/// The embedded default configuration, validated.
pub fn builtin_config() -> Result<ConfigFile> {
    ConfigFile::try_from(builtin_raw_config()?)
}

/// Resolve which configuration to use.
///
/// An explicit path must exist. Without one, `Warmrun.toml` in the working
/// directory is used when present, otherwise the built-in table.
pub fn load_config(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        info!(path = %path.display(), "loading config");
        return load_and_validate(path);
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        info!(path = %default_path.display(), "loading config");
        load_and_validate(&default_path)
    } else {
        debug!("no {} found; using built-in rule table", default_path.display());
        builtin_config()
    }
}

/// Helper to resolve a default config path.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Warmrun.toml")
}
