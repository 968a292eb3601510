//! Configuration management (config.toml)
//!
//! Settings are stored in TOML format in the platform-specific config
//! directory. Every field has a default so partial files are accepted.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::movie::InputLayout;

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    /// Controller layout for new recordings
    #[serde(default)]
    pub layout: LayoutConfig,
    /// Recording settings
    #[serde(default)]
    pub recording: RecordingConfig,
    /// Playback settings
    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// Controller layout for new recordings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutConfig {
    /// Number of player slots (default: 1)
    #[serde(default = "default_player_count")]
    pub player_count: u8,
    /// Bytes per player per frame (default: 8)
    #[serde(default = "default_input_size")]
    pub input_size: u8,
}

/// Recording configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingConfig {
    /// Delta + LZ4 compress the input stream on save (default: true)
    #[serde(default = "default_true")]
    pub compress_inputs: bool,
    /// Author written into new movies (default: empty)
    #[serde(default)]
    pub author: String,
}

/// Playback configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PlaybackConfig {
    /// Let live input poke into frames during playback (default: false)
    #[serde(default)]
    pub poke_mode: bool,
}

fn default_player_count() -> u8 {
    1
}
fn default_input_size() -> u8 {
    8
}
fn default_true() -> bool {
    true
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            player_count: default_player_count(),
            input_size: default_input_size(),
        }
    }
}

impl Default for RecordingConfig {
    fn default() -> Self {
        Self {
            compress_inputs: default_true(),
            author: String::new(),
        }
    }
}

impl LayoutConfig {
    pub fn input_layout(&self) -> InputLayout {
        InputLayout::new(self.player_count, self.input_size)
    }
}

/// Returns the platform-specific configuration directory.
///
/// Returns `None` if the home directory cannot be determined.
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("io.tasreel", "", "Tasreel")
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Loads the configuration from the platform config directory.
///
/// Returns default values if the file doesn't exist or cannot be parsed.
pub fn load() -> Config {
    config_dir()
        .and_then(|dir| load_from(&dir.join("config.toml")).ok())
        .unwrap_or_default()
}

/// Loads the configuration from an explicit path.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid TOML.
pub fn load_from(path: &Path) -> std::io::Result<Config> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

/// Saves the configuration to the platform config directory.
///
/// # Errors
///
/// Returns an error if the directory cannot be created or the file
/// cannot be written.
pub fn save(config: &Config) -> std::io::Result<()> {
    if let Some(dir) = config_dir() {
        std::fs::create_dir_all(&dir)?;
        let content = toml::to_string_pretty(config)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(dir.join("config.toml"), content)?;
    }
    Ok(())
}
