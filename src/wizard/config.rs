// Configuration - `.studio.json` in the project or home directory, plus env overrides

use super::progress::{LOADING_MESSAGES, PROGRESS_CEILING, ProgressSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const CONFIG_FILE: &str = ".studio.json";

/// Environment variable holding the API key
pub const API_KEY_VAR: &str = "GEMINI_API_KEY";

/// Environment variable overriding the image model
pub const MODEL_VAR: &str = "STUDIO_MODEL";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudioConfig {
    /// Base URL of the generative API
    #[serde(default = "default_endpoint")]
    pub api_endpoint: String,

    /// API key; usually supplied through GEMINI_API_KEY instead
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Model that writes style prompts
    #[serde(default = "default_prompt_model")]
    pub prompt_model: String,

    /// Model that edits the photo
    #[serde(default = "default_image_model")]
    pub image_model: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Where downloads are written
    #[serde(default = "default_download_dir")]
    pub download_dir: PathBuf,

    #[serde(default = "default_message_interval")]
    pub message_interval_ms: u64,

    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Debounce delay for the drop folder
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,

    /// Drop folder paths to ignore (glob patterns)
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_prompt_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image-preview".to_string()
}

fn default_request_timeout() -> u64 {
    120
}

fn default_download_dir() -> PathBuf {
    dirs::download_dir()
        .map(|d| d.join("studio"))
        .unwrap_or_else(|| PathBuf::from("./downloads"))
}

fn default_message_interval() -> u64 {
    2500
}

fn default_tick_interval() -> u64 {
    500
}

fn default_debounce() -> u64 {
    200
}

fn default_ignore_patterns() -> Vec<String> {
    vec!["**/*.part".to_string(), "**/*.crdownload".to_string(), "**/*.tmp".to_string()]
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            api_endpoint: default_endpoint(),
            api_key: None,
            prompt_model: default_prompt_model(),
            image_model: default_image_model(),
            request_timeout_secs: default_request_timeout(),
            download_dir: default_download_dir(),
            message_interval_ms: default_message_interval(),
            tick_interval_ms: default_tick_interval(),
            debounce_ms: default_debounce(),
            ignore_patterns: default_ignore_patterns(),
        }
    }
}

/// Current directory first, then the home directory
pub fn find_config() -> Option<PathBuf> {
    let local_config = PathBuf::from(CONFIG_FILE);
    if local_config.exists() {
        return Some(local_config);
    }

    dirs::home_dir()
        .map(|home| home.join(CONFIG_FILE))
        .filter(|path| path.exists())
}

impl StudioConfig {
    /// Load the config file if there is one, then apply environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match find_config() {
            Some(path) => {
                info!(path = %path.display(), "loading config");
                Self::from_file(&path)?
            }
            None => {
                debug!("no {} found, using defaults", CONFIG_FILE);
                Self::default()
            }
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Parse(format!("{}: {}", path.display(), e)))
    }

    /// Apply overrides from a variable lookup (the process environment in `load`)
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(API_KEY_VAR).filter(|k| !k.trim().is_empty()) {
            self.api_key = Some(key);
        }
        if let Some(model) = lookup(MODEL_VAR).filter(|m| !m.trim().is_empty()) {
            self.image_model = model;
        }
    }

    /// Write an example config; refuses to overwrite
    pub fn write_example(path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            return Err(ConfigError::AlreadyExists(path.display().to_string()));
        }

        let json = serde_json::to_string_pretty(&Self::default())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, json).map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))
    }

    pub fn progress_settings(&self) -> ProgressSettings {
        ProgressSettings {
            messages: LOADING_MESSAGES.iter().map(|m| m.to_string()).collect(),
            message_interval: Duration::from_millis(self.message_interval_ms.max(1)),
            tick_interval: Duration::from_millis(self.tick_interval_ms.max(1)),
            ceiling: PROGRESS_CEILING,
        }
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Invalid config: {0}")]
    Parse(String),

    #[error("{0} already exists")]
    AlreadyExists(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config: StudioConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.api_endpoint, "https://generativelanguage.googleapis.com");
        assert_eq!(config.api_key, None);
        assert_eq!(config.message_interval_ms, 2500);
        assert_eq!(config.tick_interval_ms, 500);
        assert_eq!(config.ignore_patterns, default_ignore_patterns());
    }

    #[test]
    fn test_partial_json_keeps_other_defaults() {
        let config: StudioConfig =
            serde_json::from_str(r#"{"image_model": "custom-model", "request_timeout_secs": 5}"#).unwrap();
        assert_eq!(config.image_model, "custom-model");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.prompt_model, "gemini-2.5-flash");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = StudioConfig::default();
        config.apply_overrides(|name| match name {
            API_KEY_VAR => Some("secret".to_string()),
            MODEL_VAR => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.image_model, default_image_model());
    }

    #[test]
    fn test_write_example_round_trip() {
        let path = std::env::temp_dir().join(format!("studio-config-{}.json", std::process::id()));
        std::fs::remove_file(&path).ok();

        StudioConfig::write_example(&path).unwrap();
        let loaded = StudioConfig::from_file(&path).unwrap();
        assert_eq!(loaded.prompt_model, default_prompt_model());
        assert!(loaded.api_key.is_none());

        assert!(matches!(
            StudioConfig::write_example(&path),
            Err(ConfigError::AlreadyExists(_))
        ));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_progress_settings_follow_config() {
        let config = StudioConfig {
            message_interval_ms: 1000,
            tick_interval_ms: 0,
            ..StudioConfig::default()
        };
        let settings = config.progress_settings();
        assert_eq!(settings.message_interval, Duration::from_millis(1000));
        assert_eq!(settings.tick_interval, Duration::from_millis(1));
        assert_eq!(settings.messages.len(), LOADING_MESSAGES.len());
    }
}
