//! User configuration and preferences

use crate::error::{BroomError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Limits and timings used by previews.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// How long a still image stays on screen
    pub image_display_ms: u64,
    /// How long each sampled video frame stays on screen
    pub frame_display_ms: u64,
    /// Length of the clip played for audio previews
    pub audio_preview_secs: u64,
    /// Number of frames sampled from a video
    pub video_frames: usize,
    /// Rows shown for spreadsheet-like documents
    pub table_rows: usize,
    /// Characters shown for text-like documents
    pub text_chars: usize,
    /// Terminal cells available for image previews
    pub max_image_width: u32,
    /// Pixel rows; two pixels fit in one terminal row
    pub max_image_height: u32,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            image_display_ms: 1500,
            frame_display_ms: 800,
            audio_preview_secs: 10,
            video_frames: 3,
            table_rows: 6,
            text_chars: 256,
            max_image_width: 80,
            max_image_height: 48,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserConfig {
    pub preview: PreviewSettings,
}

impl UserConfig {
    /// Get the config file path (~/.config/broom/config.json)
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("broom").join("config.json"))
    }

    /// Load config from the default location, or defaults if absent
    pub fn load() -> Result<Self> {
        let path = Self::config_path().ok_or_else(|| {
            BroomError::Config("Could not determine config directory".to_string())
        })?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .map_err(|e| BroomError::Config(format!("Failed to read config file: {}", e)))?;

        serde_json::from_str(&contents)
            .map_err(|e| BroomError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or_else(|| {
            BroomError::Config("Could not determine config directory".to_string())
        })?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                BroomError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| BroomError::Config(format!("Failed to serialize config: {}", e)))?;

        fs::write(path, contents)
            .map_err(|e| BroomError::Config(format!("Failed to write config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = UserConfig::default();
        assert_eq!(config.preview.table_rows, 6);
        assert_eq!(config.preview.text_chars, 256);
        assert_eq!(config.preview.image_display_ms, 1500);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: UserConfig =
            serde_json::from_str(r#"{ "preview": { "video_frames": 5 } }"#).unwrap();
        assert_eq!(config.preview.video_frames, 5);
        assert_eq!(config.preview.table_rows, 6);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = UserConfig::load_from(&temp_dir.path().join("none.json")).unwrap();
        assert_eq!(config, UserConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.json");

        let mut config = UserConfig::default();
        config.preview.text_chars = 64;
        config.save_to(&path).unwrap();

        let loaded = UserConfig::load_from(&path).unwrap();
        assert_eq!(loaded.preview.text_chars, 64);
    }

    #[test]
    fn test_load_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let result = UserConfig::load_from(&path);
        assert!(matches!(result, Err(BroomError::Config(_))));
    }
}
