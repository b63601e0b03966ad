// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization. Use [`load_and_validate`] to also
/// check value ranges.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    load_from_str(&contents)
}

/// Parse configuration from TOML text.
pub fn load_from_str(contents: &str) -> Result<RawConfigFile> {
    let config: RawConfigFile = toml::from_str(contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// `None` yields the built-in defaults; the monitor runs fine without a
/// config file.
pub fn load_and_validate(path: Option<&Path>) -> Result<ConfigFile> {
    match path {
        Some(path) => {
            let raw = load_from_path(path)?;
            ConfigFile::try_from(raw)
        }
        None => Ok(ConfigFile::default()),
    }
}
