//! Configuration types and loading.
//!
//! Config is loaded from a JSON file (e.g. `~/.civic/config.json`) and environment.
//! The generation-service credential is resolved from the environment first.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model::{DEFAULT_LANGUAGE, LANGUAGES};

/// Top-level application config.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Generation service (model, endpoint, credential).
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Interface preferences.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    /// Model id (default "gemini-2.5-flash").
    #[serde(default = "default_model")]
    pub model: String,

    /// API root, without the `/models/...` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// API key. Overridden by GEMINI_API_KEY or API_KEY env.
    pub api_key: Option<String>,
}

fn default_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: default_base_url(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    /// Analysis language; one of `model::LANGUAGES`. Currently has no effect on output.
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            language: default_language(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("no generation API key: set GEMINI_API_KEY (or API_KEY) or generation.apiKey in the config file")]
    MissingApiKey,
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|s| {
        let t = s.trim();
        if t.is_empty() {
            None
        } else {
            Some(t.to_string())
        }
    })
}

/// Resolve the API key: env GEMINI_API_KEY, then API_KEY, then config.
pub fn resolve_api_key(config: &Config) -> Option<String> {
    non_empty_env("GEMINI_API_KEY")
        .or_else(|| non_empty_env("API_KEY"))
        .or_else(|| {
            config
                .generation
                .api_key
                .as_ref()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        })
}

/// Configured language when it is a known one, otherwise the default.
pub fn resolve_language(config: &Config) -> &str {
    let wanted = config.ui.language.trim();
    LANGUAGES
        .iter()
        .find(|l| l.eq_ignore_ascii_case(wanted))
        .copied()
        .unwrap_or(DEFAULT_LANGUAGE)
}

/// Resolve config path from env or default.
pub fn default_config_path() -> PathBuf {
    std::env::var("CIVIC_CONFIG_PATH").map(PathBuf::from).unwrap_or_else(|_| {
        dirs::home_dir()
            .map(|h| h.join(".civic").join("config.json"))
            .unwrap_or_else(|| PathBuf::from("config.json"))
    })
}

/// Load config from the given path, or the default path (or CIVIC_CONFIG_PATH). Missing file => default config.
/// Returns the config and the path that was used.
pub fn load_config(path: Option<PathBuf>) -> Result<(Config, PathBuf)> {
    let path = path.unwrap_or_else(default_config_path);
    let config = if !path.exists() {
        log::debug!("config file not found, using defaults: {}", path.display());
        Config::default()
    } else {
        let s = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        serde_json::from_str(&s)
            .with_context(|| format!("parsing config from {}", path.display()))?
    };
    Ok((config, path))
}
