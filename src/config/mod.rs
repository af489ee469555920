//! Configuration file management
//!
//! Loads TOML configuration files and provides binding settings.
//! Default config path: ~/.config/plinth/config.toml

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Binding settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Window settings
    pub window: WindowSettings,
    /// Diagnostics settings
    pub diagnostics: DiagnosticsSettings,
}

/// Window settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    /// Adopt the native output resolution instead of a fixed size.
    /// Fixed-size surfaces are not supported on the DRM backend.
    pub fullscreen: bool,
    /// Requested surface width in pixels (ignored when fullscreen)
    pub width: u32,
    /// Requested surface height in pixels (ignored when fullscreen)
    pub height: u32,
    /// Show a hardware cursor plane for pointer devices
    pub show_cursor: bool,
}

/// Diagnostics settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsSettings {
    /// Draw a frame interval meter into every presented frame
    pub frame_meter: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            fullscreen: true,
            width: 1280,
            height: 720,
            show_cursor: true,
        }
    }
}

impl Default for DiagnosticsSettings {
    fn default() -> Self {
        Self { frame_meter: false }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            diagnostics: DiagnosticsSettings::default(),
        }
    }
}

impl Config {
    /// Return the default config file path (~/.config/plinth/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("plinth").join("config.toml"))
    }

    /// Load settings from the default path, falling back to defaults
    /// when the file does not exist.
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            Some(path) => {
                info!("No config file at {}, using defaults", path.display());
                Ok(Self::default())
            }
            None => {
                warn!("Cannot determine config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load settings from a specific TOML file
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config file {}", path.display()))?;
        let config: Config = toml::from_str(&text)
            .with_context(|| format!("Cannot parse config file {}", path.display()))?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_fullscreen_with_cursor() {
        let config = Config::default();
        assert!(config.window.fullscreen);
        assert!(config.window.show_cursor);
        assert!(!config.diagnostics.frame_meter);
    }

    #[test]
    fn partial_toml_keeps_section_defaults() {
        let config: Config = toml::from_str(
            r#"
            [window]
            fullscreen = false
            width = 800
            "#,
        )
        .unwrap();
        assert!(!config.window.fullscreen);
        assert_eq!(config.window.width, 800);
        // untouched fields fall back per-field
        assert_eq!(config.window.height, 720);
        assert!(config.window.show_cursor);
    }

    #[test]
    fn unknown_sections_are_ignored() {
        let config: Config = toml::from_str(
            r#"
            [diagnostics]
            frame_meter = true

            [future]
            key = 1
            "#,
        )
        .unwrap();
        assert!(config.diagnostics.frame_meter);
    }
}
