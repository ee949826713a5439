//! Well-known locations

use std::path::PathBuf;

/// Data directory (`~/.localpilot`), or `./.localpilot` without a home directory
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".localpilot"))
        .unwrap_or_else(|| PathBuf::from(".localpilot"))
}

/// Config file location
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}
