//! Configuration loading from parley.toml.

use runtime::model::backend::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use runtime::tools::crypto::CRYPTOCOMPARE_BASE_URL;
use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. If asked to, you can get the current price of bitcoin. You can also get the price of any cryptocurrency given its name and code.";

/// Environment variables consulted for the API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["OPENAI_API_KEY", "OPENAI_KEY"];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Model endpoint configuration.
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    #[serde(default = "default_model")]
    pub model: String,

    /// Falls back to the environment when unset.
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    pub temperature: Option<f32>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key: None,
            base_url: default_base_url(),
            temperature: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ToolsConfig {
    /// Base URL of the price quote service.
    #[serde(default = "default_quote_base_url")]
    pub quote_base_url: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            quote_base_url: default_quote_base_url(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_quote_base_url() -> String {
    CRYPTOCOMPARE_BASE_URL.to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Load the file if it exists, otherwise use defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Resolve the API key from config, then the process environment.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        self.api_key_from(|name| std::env::var(name).ok())
    }

    fn api_key_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
        let usable = |key: &String| !key.trim().is_empty();
        self.backend
            .api_key
            .clone()
            .filter(usable)
            .or_else(|| {
                API_KEY_VARS
                    .iter()
                    .find_map(|name| lookup(*name).filter(usable))
            })
            .ok_or(ConfigError::MissingApiKey)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("API key not configured: set backend.api_key, OPENAI_API_KEY or OPENAI_KEY")]
    MissingApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.backend.model, DEFAULT_MODEL);
        assert_eq!(config.backend.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.backend.temperature, None);
        assert_eq!(config.session.system_prompt, DEFAULT_SYSTEM_PROMPT);
        assert_eq!(config.tools.quote_base_url, CRYPTOCOMPARE_BASE_URL);
    }

    #[test]
    fn parses_all_sections() {
        let config = Config::parse(
            r#"
            [backend]
            model = "gpt-4o-mini"
            api_key = "sk-file"
            base_url = "http://localhost:8080/v1"
            temperature = 0.2

            [session]
            system_prompt = "Be terse."

            [tools]
            quote_base_url = "http://localhost:9000"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.model, "gpt-4o-mini");
        assert_eq!(config.backend.base_url, "http://localhost:8080/v1");
        assert_eq!(config.backend.temperature, Some(0.2));
        assert_eq!(config.session.system_prompt, "Be terse.");
        assert_eq!(config.tools.quote_base_url, "http://localhost:9000");
        assert_eq!(config.api_key_from(|_| None).unwrap(), "sk-file");
    }

    #[test]
    fn invalid_toml_is_parse_error() {
        let err = Config::parse("[backend\nmodel = 1").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn api_key_falls_back_to_environment_in_order() {
        let config = Config::default();

        let key = config
            .api_key_from(|name| match name {
                "OPENAI_API_KEY" => Some("sk-primary".into()),
                "OPENAI_KEY" => Some("sk-legacy".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(key, "sk-primary");

        let key = config
            .api_key_from(|name| (name == "OPENAI_KEY").then(|| "sk-legacy".to_string()))
            .unwrap();
        assert_eq!(key, "sk-legacy");
    }

    #[test]
    fn missing_or_blank_api_key_is_an_error() {
        let config = Config::default();
        assert!(matches!(
            config.api_key_from(|_| None),
            Err(ConfigError::MissingApiKey)
        ));
        assert!(matches!(
            config.api_key_from(|_| Some("  ".into())),
            Err(ConfigError::MissingApiKey)
        ));
    }

    #[test]
    fn blank_config_key_falls_back_to_environment() {
        let config = Config::parse("[backend]\napi_key = \"\"").unwrap();
        let key = config
            .api_key_from(|name| (name == "OPENAI_API_KEY").then(|| "sk-env".to_string()))
            .unwrap();
        assert_eq!(key, "sk-env");

        // A blank primary variable does not hide the legacy one.
        let key = config
            .api_key_from(|name| match name {
                "OPENAI_API_KEY" => Some(" ".into()),
                "OPENAI_KEY" => Some("sk-legacy".into()),
                _ => None,
            })
            .unwrap();
        assert_eq!(key, "sk-legacy");
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = Config::load_or_default("definitely/not/here/parley.toml").unwrap();
        assert_eq!(config.backend.model, DEFAULT_MODEL);
    }
}
