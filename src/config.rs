//! Persisted voice preferences
//!
//! Stored as INI in `~/.assistant-voice.cfg`:
//!
//! ```ini
//! [voice]
//! speech_rate = 150
//! prefer_cloud_tts = true
//! voice_index = 1
//! language = en
//! ```

use crate::speech::select::{BackendSettings, DEFAULT_WINDOWS_VOICE_INDEX};
use crate::{Result, VoiceError};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};

const SECTION: &str = "voice";

/// Voice configuration
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default location, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from `path`, creating a default file if missing
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| VoiceError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| VoiceError::Config(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| VoiceError::Config(format!("Failed to save config: {}", e)))
    }

    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".assistant-voice.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_config() -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some(SECTION))
            .set("voice_index", DEFAULT_WINDOWS_VOICE_INDEX.to_string())
            .set("language", "en");
        ini
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.ini
            .get_from(Some(SECTION), key)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.ini.with_section(Some(SECTION)).set(key, value);
    }

    /// Stored speech rate, if any
    ///
    /// Not clamped here; the controller clamps on use.
    pub fn speech_rate(&self) -> Option<i32> {
        self.get("speech_rate").and_then(|v| v.parse().ok())
    }

    pub fn set_speech_rate(&mut self, rate: i32) {
        self.set("speech_rate", &rate.to_string());
    }

    /// Cloud TTS preference: yes, no, or unset
    pub fn prefer_cloud_tts(&self) -> Option<bool> {
        self.get("prefer_cloud_tts").and_then(parse_bool)
    }

    /// Alternate voice for the Windows engine; `none` keeps the OS default
    pub fn voice_index(&self) -> Option<usize> {
        match self.get("voice_index") {
            None => Some(DEFAULT_WINDOWS_VOICE_INDEX),
            Some(v) if v.eq_ignore_ascii_case("none") => None,
            Some(v) => v.parse().ok().or(Some(DEFAULT_WINDOWS_VOICE_INDEX)),
        }
    }

    /// Language requested from cloud speech
    pub fn language(&self) -> String {
        self.get("language").unwrap_or("en").to_string()
    }

    /// Directory for temporary cloud audio
    pub fn artifact_dir(&self) -> PathBuf {
        self.get("artifact_dir")
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir)
    }

    /// Backend settings derived from this configuration
    pub fn settings(&self) -> BackendSettings {
        BackendSettings {
            voice_index: self.voice_index(),
            language: self.language(),
            artifact_dir: self.artifact_dir(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
