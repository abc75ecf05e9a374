use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::ai::gemini::GeminiSettings;
use crate::error::ConfigError;
use crate::verify::RetryPolicy;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Directory holding config, history and logs
pub fn app_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hadith-verifier"))
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub max_attempts: Option<u32>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub log_level: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the config file (if any), then apply `.env` and environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config_path = Self::get_config_path()?;

        let mut config = if config_path.exists() {
            let config_content = fs::read_to_string(&config_path)?;
            serde_json::from_str(&config_content)?
        } else {
            Self::new()
        };

        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn get_config_path() -> Result<PathBuf, ConfigError> {
        app_dir()
            .map(|dir| dir.join("config.json"))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Environment values win over the file. `API_KEY` is accepted as a
    /// fallback for `GEMINI_API_KEY`.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty("GEMINI_API_KEY").or_else(|| non_empty("API_KEY")) {
            self.api_key = Some(key);
        }
        if let Some(model) = non_empty("HADITH_MODEL") {
            self.model = Some(model);
        }
        if let Some(url) = non_empty("HADITH_BASE_URL") {
            self.base_url = Some(url);
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let defaults = RetryPolicy::default();
        RetryPolicy {
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            base_delay: self
                .base_delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
            max_delay: self.max_delay_ms.map(Duration::from_millis),
        }
    }

    pub fn gemini_settings(&self) -> Result<GeminiSettings, ConfigError> {
        let api_key = self
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey {
                path: Self::get_config_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "config.json".to_string()),
            })?;

        Ok(GeminiSettings {
            api_key,
            model: self.model().to_string(),
            base_url: self
                .base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            timeout_ms: self.timeout_ms.unwrap_or(DEFAULT_TIMEOUT_MS),
        })
    }

    pub fn model(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.retry_policy(), RetryPolicy::default());
        assert_eq!(config.model(), DEFAULT_MODEL);
        assert_eq!(config.log_level(), "info");
        assert!(matches!(
            config.gemini_settings(),
            Err(ConfigError::MissingApiKey { .. })
        ));
    }

    #[test]
    fn test_env_overrides_file() {
        let mut config = Config {
            api_key: Some("from-file".to_string()),
            model: Some("gemini-1.5-pro".to_string()),
            ..Config::default()
        };
        config.apply_overrides(env(&[("GEMINI_API_KEY", "from-env"), ("HADITH_MODEL", "")]));

        assert_eq!(config.api_key.as_deref(), Some("from-env"));
        // Empty values are ignored
        assert_eq!(config.model(), "gemini-1.5-pro");
    }

    #[test]
    fn test_api_key_fallback() {
        let mut config = Config::new();
        config.apply_overrides(env(&[("API_KEY", "legacy")]));
        assert_eq!(config.api_key.as_deref(), Some("legacy"));

        let settings = config.gemini_settings().unwrap();
        assert_eq!(settings.api_key, "legacy");
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert_eq!(settings.timeout_ms, 60_000);
    }

    #[test]
    fn test_retry_policy_from_file() {
        let config: Config = serde_json::from_str(
            r#"{"max_attempts": 5, "base_delay_ms": 250, "max_delay_ms": 2000}"#,
        )
        .unwrap();

        let policy = config.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.base_delay, Duration::from_millis(250));
        assert_eq!(policy.max_delay, Some(Duration::from_millis(2000)));
    }
}
