//! TOML config file loading.
//!
//! The file layer is optional; when `--config` is not given the updater runs on
//! CLI flags and built-in defaults alone. Reading and parsing failures carry the
//! file path as context:
//!
//! ```text
//! Failed to parse config file: /etc/addon-updater.toml
//! Caused by:
//!     unknown field `wowpath`, expected one of `wow_path`, `download_path`, ...
//! ```

use super::FileConfig;
use anyhow::{Context, Result};
use std::path::Path;

/// Parse a TOML configuration file into the specified type.
///
/// # Errors
///
/// Returns an error if the file cannot be read or its contents do not
/// deserialize into `T`.
pub fn parse_config<T>(path: &Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: T = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(config)
}

/// Loads the optional file layer, returning an empty layer when no path is given.
pub fn load_file_config(path: Option<&Path>) -> Result<FileConfig> {
    match path {
        Some(path) => parse_config(path),
        None => Ok(FileConfig::default()),
    }
}
