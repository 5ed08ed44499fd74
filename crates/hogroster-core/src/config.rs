//! Application configuration management.
//!
//! Holds the two data source URLs and the easter-egg settings. The file lives
//! at `~/.config/hogroster/config.json`; a missing file means defaults, and
//! `HOGROSTER_STUDENTS_URL` / `HOGROSTER_FAMILIES_URL` override the URLs.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::RawStudent;

/// Application name used for config/log directory paths
pub const APP_NAME: &str = "hogroster";

/// Config file name
const CONFIG_FILE: &str = "config.json";

const DEFAULT_STUDENTS_URL: &str = "https://petlatkea.dk/2021/hogwarts/students.json";
const DEFAULT_FAMILIES_URL: &str = "https://petlatkea.dk/2021/hogwarts/families.json";

/// Default delay before the hacked squad is dropped again.
pub const DEFAULT_SQUAD_RESET_SECS: u64 = 5;

const STUDENTS_URL_ENV: &str = "HOGROSTER_STUDENTS_URL";
const FAMILIES_URL_ENV: &str = "HOGROSTER_FAMILIES_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub students_url: String,
    pub families_url: String,
    pub hack: HackConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            students_url: DEFAULT_STUDENTS_URL.to_string(),
            families_url: DEFAULT_FAMILIES_URL.to_string(),
            hack: HackConfig::default(),
        }
    }
}

/// Easter-egg settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HackConfig {
    /// Search keyword that activates the hack.
    pub trigger: String,
    /// The injected student, in roster format.
    pub fullname: String,
    pub house: String,
    pub gender: Option<String>,
    /// Seconds after a squad join before the squad is dropped again.
    pub squad_reset_secs: u64,
}

impl Default for HackConfig {
    fn default() -> Self {
        Self {
            trigger: "1337".to_string(),
            fullname: "Anonymous \"Ghost\" Intruder".to_string(),
            house: "Slytherin".to_string(),
            gender: None,
            squad_reset_secs: DEFAULT_SQUAD_RESET_SECS,
        }
    }
}

impl HackConfig {
    pub fn student(&self) -> RawStudent {
        RawStudent {
            fullname: self.fullname.clone(),
            house: self.house.clone(),
            gender: self.gender.clone(),
        }
    }
}

impl Config {
    /// Load the config file (or defaults) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_env();
        Ok(config)
    }

    fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            let config = serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            debug!(path = %path.display(), "Loaded config");
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;
        Ok(path)
    }

    fn apply_env(&mut self) {
        if let Some(url) = env_override(STUDENTS_URL_ENV) {
            self.students_url = url;
        }
        if let Some(url) = env_override(FAMILIES_URL_ENV) {
            self.families_url = url;
        }
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for log files.
    pub fn log_dir() -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join("logs"))
    }
}

fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.students_url.ends_with("students.json"));
        assert!(config.families_url.ends_with("families.json"));
        assert_eq!(config.hack.trigger, "1337");
        assert_eq!(config.hack.squad_reset_secs, 5);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let json = r#"{"students_url": "http://localhost/students.json", "hack": {"squad_reset_secs": 2}}"#;
        let config: Config = serde_json::from_str(json).expect("Failed to parse config JSON");
        assert_eq!(config.students_url, "http://localhost/students.json");
        assert_eq!(config.families_url, DEFAULT_FAMILIES_URL);
        assert_eq!(config.hack.squad_reset_secs, 2);
        assert_eq!(config.hack.trigger, "1337");
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join("hogroster-no-such-config.json");
        let config = Config::load_from(&path).expect("defaults");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_hack_student() {
        let student = HackConfig::default().student();
        assert_eq!(student.house, "Slytherin");
        assert_eq!(student.gender, None);
    }
}
