//! Application configuration with persistence

use crate::ui::colors::ColorScheme;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Refresh rate in milliseconds (one tick)
    pub refresh_rate_ms: u64,
    /// Samples kept per graph
    pub history_len: usize,
    /// Color scheme
    pub color_scheme: ColorScheme,

    // Public IP lookup
    pub ip_lookup_enabled: bool,
    pub ip_endpoint: String,
    /// Seconds between background lookups
    pub ip_refresh_secs: u64,
    pub ip_timeout_secs: u64,

    // Per-core graphs
    pub show_core_graphs: bool,
    pub max_core_graphs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            refresh_rate_ms: 1000,
            history_len: 60,
            color_scheme: ColorScheme::Default,

            ip_lookup_enabled: true,
            ip_endpoint: "https://api.ipify.org".to_string(),
            ip_refresh_secs: 300,
            ip_timeout_secs: 5,

            show_core_graphs: true,
            max_core_graphs: 4,
        }
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "rplex").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from the default location, or return defaults
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load configuration from a file; missing or broken files give defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Config>(&content) {
                Ok(config) => return config.validated(),
                Err(e) => warn!("failed to parse config {}: {}", path.display(), e),
            },
            Err(e) => warn!("failed to read config {}: {}", path.display(), e),
        }
        Self::default()
    }

    /// Clamp values into ranges the loop can work with
    pub fn validated(mut self) -> Self {
        self.refresh_rate_ms = self.refresh_rate_ms.clamp(100, 10_000);
        self.history_len = self.history_len.clamp(1, 512);
        self.ip_refresh_secs = self.ip_refresh_secs.max(10);
        self.ip_timeout_secs = self.ip_timeout_secs.clamp(1, 60);
        self
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.refresh_rate_ms)
    }

    /// Get the theme for the current color scheme
    pub fn theme(&self) -> crate::ui::colors::Theme {
        self.color_scheme.theme()
    }
}
