//! Client settings: which parts of the chat screen are switched on, and where
//! logs go. Read from an optional JSON file and overridden from the command
//! line.

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not read settings from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown feature: {0}")]
    UnknownFeature(String),
}

/// Switches for the optional parts of the chat screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    pub calls: bool,
    pub group_calls: bool,
    pub stickers: bool,
    pub media: bool,
    pub media_filters: bool,
    pub voice_messages: bool,
    pub typing_simulation: bool,
}

impl Default for Features {
    fn default() -> Self {
        Features {
            calls: true,
            group_calls: true,
            stickers: true,
            media: true,
            media_filters: true,
            voice_messages: true,
            typing_simulation: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Calls,
    GroupCalls,
    Stickers,
    Media,
    MediaFilters,
    VoiceMessages,
    TypingSimulation,
}

impl FromStr for Feature {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "calls" => Ok(Feature::Calls),
            "group_calls" => Ok(Feature::GroupCalls),
            "stickers" => Ok(Feature::Stickers),
            "media" => Ok(Feature::Media),
            "media_filters" => Ok(Feature::MediaFilters),
            "voice_messages" => Ok(Feature::VoiceMessages),
            "typing_simulation" => Ok(Feature::TypingSimulation),
            _ => Err(ConfigError::UnknownFeature(s.to_string())),
        }
    }
}

impl Features {
    pub fn set(&mut self, feature: Feature, enabled: bool) {
        let flag = match feature {
            Feature::Calls => &mut self.calls,
            Feature::GroupCalls => &mut self.group_calls,
            Feature::Stickers => &mut self.stickers,
            Feature::Media => &mut self.media,
            Feature::MediaFilters => &mut self.media_filters,
            Feature::VoiceMessages => &mut self.voice_messages,
            Feature::TypingSimulation => &mut self.typing_simulation,
        };
        *flag = enabled;
    }

    // Group calls and filters sit on top of calls and media
    pub fn group_calls_enabled(&self) -> bool {
        self.calls && self.group_calls
    }

    pub fn media_filters_enabled(&self) -> bool {
        self.media && self.media_filters
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub features: Features,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            features: Features::default(),
            log_file: None,
            log_level: "debug".to_string(),
        }
    }
}

/// `<config dir>/chatmock/settings.json`, if the platform has a config dir.
pub fn default_settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("chatmock").join("settings.json"))
}

/// Reads settings from `path`. A missing file yields the defaults; a file
/// that exists but cannot be read or parsed is an error.
pub fn load_settings(path: &Path) -> Result<Settings, ConfigError> {
    if !path.exists() {
        return Ok(Settings::default());
    }

    let mut contents = String::new();
    File::open(path)
        .and_then(|mut file| file.read_to_string(&mut contents))
        .map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let settings: Settings = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Loaded settings from {}", path.display());
    Ok(settings)
}

pub fn save_settings(path: &Path, settings: &Settings) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(io_err)?;
    }
    let file = File::create(path).map_err(io_err)?;
    serde_json::to_writer_pretty(file, settings).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Settings saved to {}", path.display());
    Ok(())
}
