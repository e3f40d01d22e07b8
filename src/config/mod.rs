pub mod loader;

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub use loader::{load_config, ConfigError};

/// Client settings, read from `door-raid.toml`. Every field is optional in
/// the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub request_timeout_ms: u64,
    /// How long a flipped door card stays on screen before the next scene.
    pub reveal_delay_ms: u64,
    /// Pause between the exit request and the closed notice.
    pub close_delay_ms: u64,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: "http://127.0.0.1:5000".to_string(),
            request_timeout_ms: 5000,
            reveal_delay_ms: 800,
            close_delay_ms: 1000,
            log_file: PathBuf::from("door-raid.log"),
        }
    }
}

impl Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn reveal_delay(&self) -> Duration {
        Duration::from_millis(self.reveal_delay_ms)
    }

    pub fn close_delay(&self) -> Duration {
        Duration::from_millis(self.close_delay_ms)
    }
}
