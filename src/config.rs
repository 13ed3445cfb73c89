// src/config.rs

//! Defines the configuration structures for the display.
//!
//! Settings are read from a JSON file named by `SEGCLOCK_CONFIG`, or
//! `segclock.json` in the working directory. A missing file means defaults;
//! every section and field is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use log::info;
use once_cell::sync::Lazy;

use crate::clock::ClockMode;
use crate::geometry::{Anchor, Orientation, Vec3};

/// Environment variable naming the configuration file.
pub const CONFIG_ENV_VAR: &str = "SEGCLOCK_CONFIG";
const DEFAULT_CONFIG_FILE: &str = "segclock.json";

/// Process-wide configuration, loaded on first use. A file that exists but
/// cannot be read or parsed stays an error; `main` refuses to start on it.
pub static CONFIG: Lazy<anyhow::Result<Config>> = Lazy::new(Config::load);

// --- Top-Level Configuration Structure ---

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub clock: ClockConfig,
    pub appearance: AppearanceConfig,
    pub assets: AssetConfig,
    pub storage: StorageConfig,
    pub console: ConsoleConfig,
}

impl Config {
    /// Loads the file named by `SEGCLOCK_CONFIG` or the default file name.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var_os(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            info!("Config: {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        info!("Config: loaded {}", path.display());
        Ok(config)
    }
}

// --- Clock Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClockConfig {
    pub mode: ClockMode,
    /// Countdown target, seconds since the Unix epoch.
    pub target_unix: i64,
    /// Show a day field in front of the hours.
    pub show_days: bool,
    /// Wrap time of day at twelve hours.
    pub twelve_hour: bool,
    /// Blank the colons half a second after each tick.
    pub colon_blink: bool,
    pub tick_interval_ms: u64,
}

impl ClockConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        ClockConfig {
            mode: ClockMode::Time,
            target_unix: 0,
            show_days: false,
            twelve_hour: false,
            colon_blink: false,
            tick_interval_ms: 1000,
        }
    }
}

// --- Appearance Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppearanceConfig {
    /// RGBA colour every glyph is painted with.
    pub color: [u8; 4],
    /// Material name stamped on every fragment. `None` keeps the template's.
    pub material: Option<String>,
}

impl Default for AppearanceConfig {
    fn default() -> Self {
        AppearanceConfig {
            color: [255, 255, 255, 255],
            material: Some("BMC_Glow".to_string()),
        }
    }
}

// --- Asset Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AssetConfig {
    pub digit_path: PathBuf,
    pub colon_path: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        AssetConfig {
            digit_path: PathBuf::from("assets/digit.json"),
            colon_path: PathBuf::from("assets/colon.json"),
        }
    }
}

// --- Storage Configuration ---

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: PathBuf::from("segclock-store.json"),
        }
    }
}

// --- Console Host Configuration ---

/// Where the console host reports the console operator to be standing.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConsoleConfig {
    pub location: Vec3,
    pub facing: Orientation,
}

impl ConsoleConfig {
    pub fn anchor(&self) -> Anchor {
        Anchor {
            location: self.location,
            orientation: self.facing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn partial_file_keeps_defaults() {
        let config: Config = serde_json::from_str(
            r#"{ "clock": { "mode": "countdown", "target_unix": 1700000000 } }"#,
        )
        .unwrap();
        assert_eq!(config.clock.mode, ClockMode::Countdown);
        assert_eq!(config.clock.target_unix, 1_700_000_000);
        assert_eq!(config.clock.tick_interval_ms, 1000);
        assert_eq!(config.appearance, AppearanceConfig::default());
    }

    #[test]
    fn missing_file_is_default() {
        let config = Config::load_from(Path::new("/nonexistent/segclock.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segclock.json");
        std::fs::write(&path, r#"{ "clock": { "mode": "countdwn" } }"#).unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config"));

        std::fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn existing_file_is_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("segclock.json");
        std::fs::write(&path, r#"{ "clock": { "show_days": true } }"#).unwrap();
        assert!(Config::load_from(&path).unwrap().clock.show_days);
    }

    #[test]
    fn console_facing_parses_lowercase() {
        let config: ConsoleConfig = serde_json::from_str(
            r#"{ "location": { "x": 1, "y": 2, "z": 3 }, "facing": "west" }"#,
        )
        .unwrap();
        assert_eq!(config.anchor().orientation, Orientation::West);
        assert_eq!(config.anchor().location, Vec3::new(1, 2, 3));
    }
}
