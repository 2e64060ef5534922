//! Environment-based settings for the research agent.
//!
//! Settings are merged from an optional TOML file at
//! `~/.config/scour/config.toml` and the environment variables
//! `LLM_API_KEY`, `LLM_MODEL`, `LLM_BASE_URL`, `BRAVE_API_KEY`,
//! `BRAVE_SEARCH_URL`, and `LOG_LEVEL` (env wins).

use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;
use std::path::PathBuf;

use scour_core::Error;

const ENV_KEYS: &[&str] = &[
    "LLM_API_KEY",
    "LLM_MODEL",
    "LLM_BASE_URL",
    "BRAVE_API_KEY",
    "BRAVE_SEARCH_URL",
    "LOG_LEVEL",
];

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// API key for the LLM provider.
    #[serde(default)]
    pub llm_api_key: String,

    /// Model name to use.
    #[serde(default = "default_llm_model")]
    pub llm_model: String,

    /// Base URL for the LLM API.
    #[serde(default = "default_llm_base_url")]
    pub llm_base_url: String,

    /// Brave Search API key.
    #[serde(default)]
    pub brave_api_key: String,

    /// Brave Search API endpoint.
    #[serde(default = "default_brave_search_url")]
    pub brave_search_url: String,

    /// Logging level.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_llm_model() -> String {
    "gpt-4o".to_string()
}

fn default_llm_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_brave_search_url() -> String {
    scour_tools::BRAVE_SEARCH_URL.to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Environment provider restricted to the recognized variables, with
/// names lowercased to match the field names.
fn env_provider() -> Env {
    Env::raw()
        .filter(|key| {
            ENV_KEYS
                .iter()
                .any(|name| key.as_str().eq_ignore_ascii_case(name))
        })
        .map(|key| key.as_str().to_ascii_lowercase().into())
}

impl Settings {
    /// Load settings from the config file (if present) and the environment.
    pub fn load() -> Result<Self, Error> {
        let mut figment = Figment::new();
        if let Some(path) = Self::config_path() {
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(env_provider());

        Self::from_figment(figment)
    }

    /// Extract and validate settings from an explicit figment.
    pub fn from_figment(figment: Figment) -> Result<Self, Error> {
        let settings: Settings = figment
            .extract()
            .map_err(|e| Error::config(format!("Failed to load settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("scour").join("config.toml"))
    }

    fn validate(&self) -> Result<(), Error> {
        if self.llm_api_key.trim().is_empty() {
            return Err(Error::config(
                "LLM API key cannot be empty. Set LLM_API_KEY in your environment",
            ));
        }
        if self.brave_api_key.trim().is_empty() {
            return Err(Error::config(
                "Brave API key cannot be empty. Set BRAVE_API_KEY in your environment",
            ));
        }
        Ok(())
    }
}
