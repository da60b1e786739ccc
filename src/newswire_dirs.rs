//! Application directory paths for newswire.
//!
//! | Purpose | macOS | Linux |
//! |---------|-------|-------|
//! | Config | `~/Library/Application Support/newswire/` | `~/.config/newswire/` |
//! | Logs | `~/Library/Application Support/newswire/logs/` | `~/.local/share/newswire/logs/` |
//!
//! # Environment Overrides
//!
//! - `NEWSWIRE_CONFIG_DIR` overrides [`config_dir`]
//! - `NEWSWIRE_DATA_DIR` overrides [`data_dir`]

use std::path::PathBuf;

/// Application config directory.
///
/// Resolves to `dirs::config_dir()/newswire/` by default. Override with
/// the `NEWSWIRE_CONFIG_DIR` environment variable.
#[must_use]
pub fn config_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("NEWSWIRE_CONFIG_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::config_dir()
        .map(|d| d.join("newswire"))
        .unwrap_or_else(|| PathBuf::from("/tmp/newswire-config"))
}

/// Application data directory, used for log files.
#[must_use]
pub fn data_dir() -> PathBuf {
    if let Some(override_dir) = std::env::var_os("NEWSWIRE_DATA_DIR") {
        return PathBuf::from(override_dir);
    }
    dirs::data_dir()
        .map(|d| d.join("newswire"))
        .unwrap_or_else(|| PathBuf::from("/tmp/newswire-data"))
}

/// Main config file (`config_dir()/config.toml`).
#[must_use]
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default log directory (`data_dir()/logs/`).
#[must_use]
pub fn logs_dir() -> PathBuf {
    data_dir().join("logs")
}
