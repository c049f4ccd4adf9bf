//! CLI Configuration
//!
//! Configuration settings for the shell and the Perplexity API client.
//! Everything is read from the environment once at startup.

use crossterm::style::Color;
use serde::{Deserialize, Serialize};
use std::env;

use crate::error::ConfigError;

pub const API_KEY_VAR: &str = "PPLX_API_KEY";
pub const BASE_URL_VAR: &str = "PPLX_BASE_URL";
pub const MODEL_VAR: &str = "PPLX_MODEL";
pub const TIMEOUT_VAR: &str = "PPLX_TIMEOUT_SECS";
pub const LOG_VAR: &str = "PLEXCODE_LOG";

pub const DEFAULT_BASE_URL: &str = "https://api.perplexity.ai";
pub const DEFAULT_MODEL: &str = "sonar-reasoning-pro";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TREE_DEPTH: usize = 4;

/// Perplexity API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(skip_serializing)]
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Configuration for the interactive shell
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    pub theme_color: String,
    pub tree_depth: usize,
    /// Files referenced in a query that get inlined into the context
    pub context_file_limit: usize,
    pub context_max_chars: usize,
    pub api: ApiConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            theme_color: "Cyan".to_string(),
            tree_depth: DEFAULT_TREE_DEPTH,
            context_file_limit: 2,
            context_max_chars: 1500,
            api: ApiConfig::default(),
        }
    }
}

impl CliConfig {
    /// Build the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Build the configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_VAR)
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey(API_KEY_VAR))?;

        let mut config = Self::default();
        config.api.api_key = api_key;

        if let Some(base_url) = lookup(BASE_URL_VAR).filter(|v| !v.trim().is_empty()) {
            let trimmed = base_url.trim().trim_end_matches('/');
            if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
                return Err(ConfigError::InvalidValue {
                    var: BASE_URL_VAR,
                    value: base_url,
                });
            }
            config.api.base_url = trimmed.to_string();
        }

        if let Some(model) = lookup(MODEL_VAR).filter(|v| !v.trim().is_empty()) {
            config.api.model = model.trim().to_string();
        }

        if let Some(raw) = lookup(TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            config.api.timeout_secs = match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        var: TIMEOUT_VAR,
                        value: raw,
                    })
                }
            };
        }

        Ok(config)
    }

    /// Get theme color as Color
    pub fn get_theme_color(&self) -> Color {
        match self.theme_color.as_str() {
            "Blue" => Color::Blue,
            "Cyan" => Color::Cyan,
            "Green" => Color::Green,
            "Magenta" => Color::Magenta,
            "Yellow" => Color::Yellow,
            "White" => Color::White,
            _ => Color::Cyan,
        }
    }

    /// Get configuration summary for display
    pub fn get_summary(&self) -> Vec<String> {
        vec![
            format!("Endpoint: {}", self.api.base_url),
            format!("Model: {}", self.api.model),
            format!("Timeout: {}s", self.api.timeout_secs),
            format!("Tree depth: {}", self.tree_depth),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_missing_api_key() {
        let result = CliConfig::from_lookup(lookup_from(&[]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey(API_KEY_VAR))));

        let result = CliConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "   ")]));
        assert!(matches!(result, Err(ConfigError::MissingApiKey(_))));
    }

    #[test]
    fn test_defaults_with_key() {
        let config = CliConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "pplx-test")])).unwrap();
        assert_eq!(config.api.api_key, "pplx-test");
        assert_eq!(config.api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.api.model, DEFAULT_MODEL);
        assert_eq!(config.api.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.tree_depth, DEFAULT_TREE_DEPTH);
    }

    #[test]
    fn test_overrides() {
        let config = CliConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "pplx-test"),
            (BASE_URL_VAR, "http://127.0.0.1:9000/"),
            (MODEL_VAR, "sonar"),
            (TIMEOUT_VAR, "5"),
        ]))
        .unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.api.model, "sonar");
        assert_eq!(config.api.timeout_secs, 5);
    }

    #[test]
    fn test_invalid_timeout() {
        let result = CliConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "pplx-test"),
            (TIMEOUT_VAR, "0"),
        ]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { var: TIMEOUT_VAR, .. })
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let result = CliConfig::from_lookup(lookup_from(&[
            (API_KEY_VAR, "pplx-test"),
            (BASE_URL_VAR, "api.perplexity.ai"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_summary_hides_key() {
        let config = CliConfig::from_lookup(lookup_from(&[(API_KEY_VAR, "secret-key")])).unwrap();
        assert!(config.get_summary().iter().all(|line| !line.contains("secret-key")));
        assert!(matches!(config.get_theme_color(), Color::Cyan));
    }
}
