use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interval between liveness polls once the window exists.
    pub poll_interval_ms: u64,
    /// Delay before the very first poll after the window is created.
    pub initial_poll_delay_ms: u64,
    /// Window in which repeated restore signals collapse into one relaunch.
    pub debounce_ms: u64,
    pub window_title: String,
    pub window_width: f32,
    pub window_height: f32,
    pub relaunch_command: String,
    pub relaunch_args: Vec<String>,
    /// Icon looked up next to the executable first.
    pub icon_file: String,
    pub icon_fallback: String,
    pub library_candidates: Vec<String>,
}

impl Config {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn initial_poll_delay(&self) -> Duration {
        Duration::from_millis(self.initial_poll_delay_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            initial_poll_delay_ms: 500,
            debounce_ms: 200,
            window_title: "Steam".into(),
            window_width: 50.0,
            window_height: 20.0,
            relaunch_command: "steam".into(),
            relaunch_args: Vec::new(),
            icon_file: "steam.png".into(),
            icon_fallback: "/usr/share/pixmaps/steam.png".into(),
            library_candidates: default_library_candidates(),
        }
    }
}

#[cfg(target_os = "windows")]
fn default_library_candidates() -> Vec<String> {
    vec!["steam_api64.dll".into(), "steam_api.dll".into()]
}

#[cfg(target_os = "macos")]
fn default_library_candidates() -> Vec<String> {
    vec!["libsteam_api.dylib".into()]
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn default_library_candidates() -> Vec<String> {
    vec!["libsteam_api.so".into()]
}
