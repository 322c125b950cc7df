//! Gemini client configuration.
//!
//! Reads the API key from the environment, falling back to
//! `~/.config/angles/secret.json`.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const API_KEY_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];
const MODEL_VAR: &str = "ANGLES_MODEL";
const BASE_URL_VAR: &str = "ANGLES_API_BASE_URL";

/// Root structure of secret.json
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecretConfig {
    #[serde(default)]
    pub gemini: Option<GeminiSecret>,
}

/// Gemini entry in secret.json
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSecret {
    pub api_key: String,
    #[serde(default)]
    pub model_name: Option<String>,
}

/// Resolved settings for the Gemini client.
///
/// A missing API key is not an error here; the first generation call fails instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeminiConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl GeminiConfig {
    /// Loads configuration from process environment and the default secret file.
    pub fn from_env() -> Self {
        let secret_path = default_secret_path();
        Self::load_with(|name| std::env::var(name).ok(), secret_path.as_deref())
    }

    /// Resolves configuration from an arbitrary variable lookup and secret file.
    ///
    /// Priority for the key: `GEMINI_API_KEY`, `API_KEY`, then secret.json.
    /// Priority for the model: `ANGLES_MODEL`, secret.json, then the default.
    pub fn load_with<F>(lookup: F, secret_path: Option<&Path>) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let secret = secret_path.and_then(load_secret_config).and_then(|c| c.gemini);

        let api_key = API_KEY_VARS
            .iter()
            .find_map(|name| non_empty(*name))
            .or_else(|| secret.as_ref().map(|s| s.api_key.clone()));

        let model = non_empty(MODEL_VAR)
            .or_else(|| secret.as_ref().and_then(|s| s.model_name.clone()))
            .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        let base_url = non_empty(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        if api_key.is_none() {
            tracing::warn!("[Config] No Gemini API key found; generation calls will fail");
        }

        Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Reads secret.json, returning None when it is missing or unreadable.
fn load_secret_config(path: &Path) -> Option<SecretConfig> {
    if !path.exists() {
        return None;
    }

    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!("[Config] Failed to read {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            tracing::warn!("[Config] Failed to parse {}: {}", path.display(), e);
            None
        }
    }
}

/// Returns the path to the secret file: ~/.config/angles/secret.json
fn default_secret_path() -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    Some(home.join(".config").join("angles").join("secret.json"))
}
