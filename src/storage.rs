use std::fs;
use std::path::{Path, PathBuf};

use crate::config::Config;

/// Get the path to the config JSON file.
/// On Linux: ~/.config/steam-taskbar/config.json
/// On other platforms: whatever dirs::config_dir() resolves to.
pub fn config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("steam-taskbar")
        .join("config.json")
}

/// Load config from the default location.
pub fn load() -> Config {
    load_from(&config_path())
}

/// Load config from a JSON file. Returns defaults if the file doesn't exist or is corrupted.
pub fn load_from(path: &Path) -> Config {
    match fs::read_to_string(path) {
        Ok(data) => serde_json::from_str(&data).unwrap_or_else(|e| {
            tracing::warn!("Ignoring corrupt config {}: {e}", path.display());
            Config::default()
        }),
        Err(_) => Config::default(),
    }
}
