//! Configuration file management for the VoiceLab client.
//!
//! Supports reading secrets from `~/.config/voicelab/secret.json` and the
//! backend base URL from the environment.

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::PathBuf;

use voicelab_core::{Result, VoiceLabError};

/// Environment variable overriding the backend base URL.
pub const API_BASE_ENV: &str = "VOICELAB_API_BASE";

const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000";

/// Root configuration structure for secret.json
#[derive(Debug, Clone, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiConfig>,
}

/// Gemini API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Location of the backend hosting auth, predict, and report endpoints.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
}

impl ApiConfig {
    /// Reads the base URL from `VOICELAB_API_BASE`, defaulting to the local
    /// development backend.
    pub fn from_env() -> Self {
        let base_url = env::var(API_BASE_ENV).unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Loads the secret configuration file from ~/.config/voicelab/secret.json
pub fn load_secret_config() -> Result<SecretConfig> {
    let config_path = get_config_path()?;

    if !config_path.exists() {
        return Err(VoiceLabError::config(format!(
            "Configuration file not found at: {}",
            config_path.display()
        )));
    }

    let content = fs::read_to_string(&config_path).map_err(|e| {
        VoiceLabError::config(format!(
            "Failed to read configuration file at {}: {}",
            config_path.display(),
            e
        ))
    })?;

    serde_json::from_str(&content).map_err(|e| {
        VoiceLabError::config(format!(
            "Failed to parse configuration file at {}: {}",
            config_path.display(),
            e
        ))
    })
}

/// Returns the path to the configuration file: ~/.config/voicelab/secret.json
fn get_config_path() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| VoiceLabError::config("Could not determine home directory"))?;
    Ok(home.join(".config").join("voicelab").join("secret.json"))
}
