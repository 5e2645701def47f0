use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_MODEL: &str = "gemini-2.5-pro";
const DEFAULT_USERS_FILE: &str = "usuarios.json";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    MissingEnvVar(String),
    #[error("invalid value for {0}: {1}")]
    InvalidEnvVar(String, String),
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub users_path: PathBuf,
    pub reply_delay: Duration,
    pub request_timeout: Duration,
    pub register_dismiss_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            users_path: PathBuf::from(DEFAULT_USERS_FILE),
            reply_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(120),
            register_dismiss_delay: Duration::from_millis(2000),
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let require_key = match get("CHAT_REQUIRE_API_KEY") {
            Some(raw) => parse_bool("CHAT_REQUIRE_API_KEY", &raw)?,
            None => false,
        };

        let api_key = get("GOOGLE_API_KEY");
        if api_key.is_none() {
            if require_key {
                return Err(ConfigError::MissingEnvVar("GOOGLE_API_KEY".to_string()));
            }
            tracing::error!("GOOGLE_API_KEY not found in environment or .env file");
        }

        Ok(Self {
            api_key,
            model: get("GEMINI_MODEL").unwrap_or(defaults.model),
            users_path: get("CHAT_USERS_FILE")
                .map(PathBuf::from)
                .unwrap_or(defaults.users_path),
            reply_delay: millis(&get, "CHAT_REPLY_DELAY_MS")?.unwrap_or(defaults.reply_delay),
            request_timeout: get("CHAT_REQUEST_TIMEOUT_SECS")
                .map(|raw| parse_u64("CHAT_REQUEST_TIMEOUT_SECS", &raw).map(Duration::from_secs))
                .transpose()?
                .unwrap_or(defaults.request_timeout),
            register_dismiss_delay: millis(&get, "CHAT_REGISTER_DISMISS_MS")?
                .unwrap_or(defaults.register_dismiss_delay),
        })
    }
}

fn millis<G>(get: &G, key: &str) -> Result<Option<Duration>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|raw| parse_u64(key, &raw).map(Duration::from_millis))
        .transpose()
}

fn parse_u64(key: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn parse_bool(key: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("expected a boolean, got {:?}", other),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.api_key, None);
        assert_eq!(config.model, "gemini-2.5-pro");
        assert_eq!(config.users_path, PathBuf::from("usuarios.json"));
        assert_eq!(config.reply_delay, Duration::from_millis(500));
        assert_eq!(config.register_dismiss_delay, Duration::from_secs(2));
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("GOOGLE_API_KEY", "k-123"),
            ("GEMINI_MODEL", "gemini-2.5-flash"),
            ("CHAT_USERS_FILE", "/tmp/users.json"),
            ("CHAT_REPLY_DELAY_MS", "0"),
            ("CHAT_REQUEST_TIMEOUT_SECS", "30"),
        ])
        .unwrap();
        assert_eq!(config.api_key.as_deref(), Some("k-123"));
        assert_eq!(config.model, "gemini-2.5-flash");
        assert_eq!(config.users_path, PathBuf::from("/tmp/users.json"));
        assert_eq!(config.reply_delay, Duration::ZERO);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let config = config_from(&[("GOOGLE_API_KEY", "   ")]).unwrap();
        assert!(config.api_key.is_none());
    }

    #[test]
    fn strict_mode_requires_api_key() {
        let err = config_from(&[("CHAT_REQUIRE_API_KEY", "true")]).unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("GOOGLE_API_KEY".to_string()));

        let config = config_from(&[("CHAT_REQUIRE_API_KEY", "1"), ("GOOGLE_API_KEY", "k")]);
        assert!(config.is_ok());
    }

    #[test]
    fn rejects_malformed_numbers() {
        let err = config_from(&[("CHAT_REPLY_DELAY_MS", "soon")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "CHAT_REPLY_DELAY_MS"));
    }

    #[test]
    fn rejects_malformed_bool() {
        let err = config_from(&[("CHAT_REQUIRE_API_KEY", "maybe")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(..)));
    }
}
