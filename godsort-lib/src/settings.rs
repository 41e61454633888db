//! Application settings (tool locations, classifier thresholds).
//!
//! The settings file lives at `~/.config/godsort/settings.toml`. Every field
//! has a built-in default, so a missing file or a partial file is fine.
//! CLI flags override what is loaded here.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use godsort_core::ClassifierThresholds;

use crate::error::SettingsError;
use crate::tools::ToolPaths;

/// Canonical path to the settings file: `~/.config/godsort/settings.toml`.
pub fn settings_path() -> PathBuf {
    let config = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
    config.join("godsort").join("settings.toml")
}

/// All user-tunable settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub tools: ToolSettings,
    pub classifier: ClassifierThresholds,
    pub batch: BatchSettings,
}

/// Where the external tools and the gamelist live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Directory holding the executables and the gamelist.
    pub dir: PathBuf,
    pub extract_xiso: String,
    pub iso2god: String,
    pub xextool: String,
    pub gamelist: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        let exe = std::env::consts::EXE_SUFFIX;
        Self {
            dir: PathBuf::from("lib"),
            extract_xiso: format!("extract-xiso{exe}"),
            iso2god: format!("iso2god{exe}"),
            xextool: format!("xextool{exe}"),
            gamelist: "xbox360_gamelist.csv".to_string(),
        }
    }
}

impl ToolSettings {
    /// Resolve full paths, optionally relative to an overriding directory.
    pub fn paths(&self, dir_override: Option<&Path>) -> ToolPaths {
        let dir = dir_override.unwrap_or(&self.dir);
        ToolPaths {
            extract_xiso: dir.join(&self.extract_xiso),
            iso2god: dir.join(&self.iso2god),
            xextool: dir.join(&self.xextool),
            gamelist: dir.join(&self.gamelist),
        }
    }
}

/// Batch-level settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Extension of image files in the source directory (without the dot).
    pub extension: String,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            extension: "iso".to_string(),
        }
    }
}

impl Settings {
    /// Load from the canonical path; a missing file yields the defaults.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from(&settings_path())
    }

    /// Load from an explicit path; a missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(e.into()),
        };
        Self::from_toml(&contents)
    }

    /// Parse and validate settings from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(contents)?;
        settings.classifier.validate()?;
        Ok(settings)
    }

    /// Pretty-printed TOML for display.
    pub fn to_toml_string(&self) -> Result<String, SettingsError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
#[path = "tests/settings_tests.rs"]
mod tests;
