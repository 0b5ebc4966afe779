//! Configuration loading for Quill.
//!
//! Reads `~/.quill/config.toml` into raw, all-optional structs and resolves
//! them into [`quill_types::Settings`]. A missing file is not an error; it
//! simply means defaults.
//!
//! ```toml
//! [panel]
//! auto_open = false
//!
//! [highlight]
//! enabled = true
//! even_color = "#4A9EFF"
//! odd_color = "#1E7CE8"
//! bold = true
//!
//! [debug]
//! enabled = false
//!
//! [timing]
//! startup_delay_ms = 2000
//! guard_throttle_ms = 500
//! guard_release_ms = 100
//! detection_max_attempts = 5
//! detected_badge_ms = 2000
//!
//! [surface]
//! host_editor_classes = ["ProseMirror"]
//! ```

use serde::Deserialize;
use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;
use tracing::warn;

use quill_types::{HighlightStyle, Settings, Timings, Tone};

/// Environment variable that forces debug diagnostics on.
pub const DEBUG_ENV_VAR: &str = "QUILL_DEBUG";

#[derive(Debug, Default, Deserialize)]
pub struct QuillConfig {
    pub panel: Option<PanelConfig>,
    pub highlight: Option<HighlightConfig>,
    pub debug: Option<DebugConfig>,
    pub timing: Option<TimingConfig>,
    pub surface: Option<SurfaceConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PanelConfig {
    /// Open the panel as soon as a surface is detected.
    #[serde(default)]
    pub auto_open: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct HighlightConfig {
    /// Render fragments as styled spans on rich surfaces. Default: true.
    pub enabled: Option<bool>,
    pub even_color: Option<String>,
    pub odd_color: Option<String>,
    pub bold: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DebugConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct TimingConfig {
    pub startup_delay_ms: Option<u64>,
    pub guard_throttle_ms: Option<u64>,
    pub guard_release_ms: Option<u64>,
    pub detection_max_attempts: Option<u32>,
    pub detected_badge_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SurfaceConfig {
    pub host_editor_classes: Option<Vec<String>>,
}

impl QuillConfig {
    /// Load from the default location. `Ok(None)` when there is no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Resolve into concrete settings, filling every gap with defaults.
    #[must_use]
    pub fn resolve(&self) -> Settings {
        let defaults = Settings::default();
        let default_style = HighlightStyle::default();
        let default_timings = Timings::default();

        let highlight = self.highlight.as_ref();
        let highlight_style = HighlightStyle::new(
            non_blank(highlight.and_then(|h| h.even_color.as_deref()))
                .unwrap_or_else(|| default_style.color(Tone::Even).to_string()),
            non_blank(highlight.and_then(|h| h.odd_color.as_deref()))
                .unwrap_or_else(|| default_style.color(Tone::Odd).to_string()),
            highlight
                .and_then(|h| h.bold)
                .unwrap_or(default_style.bold()),
        );

        let timing = self.timing.as_ref();
        let millis = |pick: fn(&TimingConfig) -> Option<u64>, fallback: Duration| {
            timing
                .and_then(pick)
                .map_or(fallback, Duration::from_millis)
        };
        let timings = Timings {
            startup_delay: millis(|t| t.startup_delay_ms, default_timings.startup_delay),
            guard_throttle: millis(|t| t.guard_throttle_ms, default_timings.guard_throttle),
            guard_release: millis(|t| t.guard_release_ms, default_timings.guard_release),
            detection_max_attempts: timing
                .and_then(|t| t.detection_max_attempts)
                .unwrap_or(default_timings.detection_max_attempts),
            detected_badge: millis(|t| t.detected_badge_ms, default_timings.detected_badge),
        };

        Settings {
            auto_open: self.panel.as_ref().is_some_and(|p| p.auto_open),
            highlight_prompts: highlight
                .and_then(|h| h.enabled)
                .unwrap_or(defaults.highlight_prompts),
            debug: self.debug.as_ref().is_some_and(|d| d.enabled) || debug_from_env(),
            highlight_style,
            timings,
            host_editor_classes: self
                .surface
                .as_ref()
                .and_then(|s| s.host_editor_classes.clone())
                .unwrap_or(defaults.host_editor_classes),
        }
    }
}

#[must_use]
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".quill").join("config.toml"))
}

fn debug_from_env() -> bool {
    env::var(DEBUG_ENV_VAR).is_ok_and(|v| matches!(v.trim(), "1" | "true" | "yes"))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}
