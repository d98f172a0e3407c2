use bevy::log::{error, info};
use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::SettingsError;
use crate::session::DEFAULT_REPAIR_INTERVAL;

/// Where the shape toggle is shown in the 3D view header.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum IconPosition {
    Left,
    Right,
    #[default]
    None,
}

/// Per-scene choice between lasso (`false`) and box (`true`) drags.
#[derive(Resource, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OcclusionSceneToggle(pub bool);

/// Installation-wide settings that persist to disk
#[derive(Resource, Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OcclusionSettings {
    #[serde(default)]
    pub icon_position: IconPosition,
    /// Seconds between x-ray repairs while a drag runs
    #[serde(default = "default_repair_interval_secs")]
    pub repair_interval_secs: f32,
    /// Cursor travel in pixels before a press counts as a drag
    #[serde(default = "default_drag_threshold_px")]
    pub drag_threshold_px: f32,
}

fn default_repair_interval_secs() -> f32 {
    DEFAULT_REPAIR_INTERVAL.as_secs_f32()
}

fn default_drag_threshold_px() -> f32 {
    3.0
}

impl Default for OcclusionSettings {
    fn default() -> Self {
        Self {
            icon_position: IconPosition::default(),
            repair_interval_secs: default_repair_interval_secs(),
            drag_threshold_px: default_drag_threshold_px(),
        }
    }
}

impl OcclusionSettings {
    /// Get the settings file path
    fn file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("bevy_occlusion_select");
            p.push("settings.ron");
            p
        })
    }

    /// Load settings from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::file_path() else {
            return Self::default();
        };

        match fs::read_to_string(&path) {
            Ok(content) => Self::from_ron(&content),
            Err(_) => Self::default(),
        }
    }

    /// Parse settings, falling back to defaults on malformed input
    pub fn from_ron(content: &str) -> Self {
        match ron::from_str(content) {
            Ok(settings) => settings,
            Err(e) => {
                error!("Ignoring malformed occlusion settings: {}", e);
                Self::default()
            }
        }
    }

    /// Write the settings to the config directory, logging the outcome.
    pub fn save(&self) {
        let result = Self::file_path()
            .ok_or(SettingsError::NoConfigDir)
            .and_then(|path| self.write_to(&path).map(|()| path));
        match result {
            Ok(path) => info!("Occlusion settings saved to {}", path.display()),
            Err(e) => error!("Occlusion settings not saved: {e}"),
        }
    }

    /// Serialize to `path`, creating missing parent directories.
    pub fn write_to(&self, path: &Path) -> Result<(), SettingsError> {
        let content = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Repair timer period. Zero when the configured value is unusable, which
    /// timer hosts refuse.
    pub fn repair_interval(&self) -> Duration {
        Duration::try_from_secs_f32(self.repair_interval_secs).unwrap_or(Duration::ZERO)
    }
}
