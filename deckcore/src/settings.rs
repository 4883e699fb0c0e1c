//! Deck settings: `~/.config/scriptdeck/settings.json`
//!
//! Every field has a default, so a missing file (the usual case) gives the
//! stock deck. A file that exists but does not parse stops startup.

use crate::error::{DeckError, Result};
use crate::script::DEFAULT_SHELL;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Overrides the base directory holding `files/` and `assets/`.
pub const HOME_ENV: &str = "SCRIPTDECK_HOME";

const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub title: String,
    pub window_width: f32,
    pub window_height: f32,
    /// Script files under `files/`, loaded in this order.
    pub scripts: Vec<String>,
    pub shell: String,
    /// Extension of background animation files (without the dot).
    pub animation_extension: String,
    pub icon: String,
    pub swap_interval_ms: u64,
    pub recolor_interval_ms: u64,
    /// Delay before snapping the window back after it was moved.
    pub recenter_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            title: "scriptdeck".to_string(),
            window_width: 720.0,
            window_height: 500.0,
            scripts: vec!["script1.sh".to_string(), "script2.sh".to_string()],
            shell: DEFAULT_SHELL.to_string(),
            animation_extension: "gif".to_string(),
            icon: "icon.png".to_string(),
            swap_interval_ms: 5000,
            recolor_interval_ms: 5000,
            recenter_delay_ms: 100,
        }
    }
}

impl Settings {
    /// Load from the user config directory, or defaults when there is no
    /// settings file.
    pub fn load() -> Result<Self> {
        match config_dir() {
            Some(dir) => Self::load_from(&dir.join(SETTINGS_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(DeckError::SettingsRead { path: path.to_path_buf(), source });
            }
        };
        let settings = serde_json::from_str(&text)
            .map_err(|source| DeckError::SettingsParse { path: path.to_path_buf(), source })?;
        tracing::info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    pub fn swap_interval(&self) -> Duration {
        Duration::from_millis(self.swap_interval_ms)
    }

    pub fn recolor_interval(&self) -> Duration {
        Duration::from_millis(self.recolor_interval_ms)
    }

    pub fn recenter_delay(&self) -> Duration {
        Duration::from_millis(self.recenter_delay_ms)
    }
}

/// `~/.config/scriptdeck` (platform equivalent elsewhere).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "scriptdeck").map(|p| p.config_dir().to_path_buf())
}

/// Where `files/` and `assets/` live: `$SCRIPTDECK_HOME`, else the
/// current directory.
pub fn base_dir() -> PathBuf {
    std::env::var_os(HOME_ENV)
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

pub fn scripts_dir(base: &Path) -> PathBuf {
    base.join("files")
}

pub fn assets_dir(base: &Path) -> PathBuf {
    base.join("assets")
}
