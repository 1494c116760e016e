//! Configuration types for the presentation layer.

use crate::feed::FeedMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration for the Lumi web UI client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Avatar stream feed settings.
    pub feed: FeedConfig,
    /// Rendering surface settings.
    pub surface: SurfaceConfig,
    /// Backend service status polling settings.
    pub status: StatusConfig,
    /// Theme persistence settings.
    pub theme: ThemeConfig,
}

/// Avatar stream feed configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Image endpoint fetched in pull mode (a cache-busting `t` query
    /// parameter is appended per request).
    pub frame_url: String,
    /// WebSocket endpoint of the avatar channel used in push mode.
    pub socket_url: String,
    /// Feed mode selected at startup.
    pub default_mode: FeedMode,
    /// Minimum interval between two presented frames, in milliseconds.
    ///
    /// The default of 100 ms caps presentation at 10 fps. Frames arriving
    /// faster are deferred (push) or absorbed by the re-poll delay (pull).
    pub frame_budget_ms: u64,
    /// Delay before retrying after a pull-mode fetch failure, in
    /// milliseconds. Independent of the frame budget.
    pub retry_delay_ms: u64,
    /// Grace delay between opening the push channel and requesting the
    /// background stream, in milliseconds. Decouples connection
    /// establishment from upstream readiness.
    pub grace_delay_ms: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            frame_url: "http://127.0.0.1:5000/api/avatar/frame".to_owned(),
            socket_url: "ws://127.0.0.1:5000/live2d".to_owned(),
            default_mode: FeedMode::Pull,
            frame_budget_ms: 100,
            retry_delay_ms: 1000,
            grace_delay_ms: 500,
        }
    }
}

impl FeedConfig {
    /// Minimum inter-frame interval as a [`Duration`].
    #[must_use]
    pub fn frame_budget(&self) -> Duration {
        Duration::from_millis(self.frame_budget_ms)
    }

    /// Pull-mode retry delay as a [`Duration`].
    #[must_use]
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Push-mode start-stream grace delay as a [`Duration`].
    #[must_use]
    pub fn grace_delay(&self) -> Duration {
        Duration::from_millis(self.grace_delay_ms)
    }
}

/// Rendering surface configuration.
///
/// These are initial dimensions only; the surface is resized whenever the
/// surrounding UI reports a new container box.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    /// Initial surface width in pixels.
    pub width: u32,
    /// Initial surface height in pixels.
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        // Matches the backend's placeholder frame dimensions.
        Self {
            width: 400,
            height: 300,
        }
    }
}

/// Backend service status polling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusConfig {
    /// Status endpoint URL.
    pub status_url: String,
    /// Poll interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            status_url: "http://127.0.0.1:5000/api/status".to_owned(),
            poll_interval_ms: 5000,
        }
    }
}

impl StatusConfig {
    /// Poll interval as a [`Duration`].
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Theme persistence configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    /// Path of the themes JSON file. `None` uses the platform default
    /// (`<config dir>/lumi/themes.json`).
    pub themes_path: Option<PathBuf>,
}

impl ThemeConfig {
    /// Resolve the themes file path, falling back to the platform default.
    #[must_use]
    pub fn resolved_themes_path(&self) -> PathBuf {
        self.themes_path
            .clone()
            .unwrap_or_else(|| lumi_config_dir().join("themes.json"))
    }
}

/// Platform configuration directory for Lumi (`<config dir>/lumi`).
#[must_use]
pub fn lumi_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp/lumi-config"))
        .join("lumi")
}

impl UiConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::error::UiError::Config(e.to_string()))
    }

    /// Save configuration to a TOML file, creating parent directories.
    pub fn save_to_file(&self, path: &std::path::Path) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::UiError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file location (`<config dir>/lumi/webui.toml`).
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        lumi_config_dir().join("webui.toml")
    }
}
