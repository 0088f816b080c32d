//! Configuration system for the concierge services
//!
//! All four binaries share one TOML file (`concierge.toml`). Every field has
//! a default matching the stock deployment, so the file itself is optional.
//! Credentials are never stored in the file: config names the environment
//! variable that holds each API key and resolution happens at runtime.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Main configuration structure shared by all concierge binaries
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub chat_server: ChatServerSection,
    #[serde(default)]
    pub rates: RatesSection,
}

/// LLM section - Gemini model and sampling settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSection {
    /// Model identifier (with or without the `models/` prefix)
    #[serde(default = "default_model")]
    pub model: String,
    /// Sampling temperature (0.0 to 2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Response length cap in tokens
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
    /// Environment variable containing the API key
    #[serde(default = "default_llm_api_key_env")]
    pub api_key_env: String,
    /// Override for the Gemini API base URL
    pub base_url: Option<String>,
    /// Optional request timeout; unset means requests wait indefinitely
    pub timeout_secs: Option<u64>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
            api_key_env: default_llm_api_key_env(),
            base_url: None,
            timeout_secs: None,
        }
    }
}

fn default_model() -> String {
    "models/gemini-2.5-flash".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_output_tokens() -> u32 {
    2048
}

fn default_llm_api_key_env() -> String {
    "GOOGLE_API_KEY".to_string()
}

/// Search section - Serper credentials and result shaping
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchSection {
    /// Environment variable containing the API key
    #[serde(default = "default_search_api_key_env")]
    pub api_key_env: String,
    /// Location bias for search results (e.g. "India")
    pub location: Option<String>,
    /// Override for the Serper API base URL
    pub base_url: Option<String>,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            api_key_env: default_search_api_key_env(),
            location: None,
            base_url: None,
        }
    }
}

fn default_search_api_key_env() -> String {
    "SERPER_API_KEY".to_string()
}

/// Chat server section - HTTP listener and static page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatServerSection {
    /// Listen port for the menu chat server
    #[serde(default = "default_chat_port")]
    pub port: u16,
    /// Static chat page served on `GET /`
    #[serde(default = "default_static_page")]
    pub static_page: String,
}

impl Default for ChatServerSection {
    fn default() -> Self {
        Self {
            port: default_chat_port(),
            static_page: default_static_page(),
        }
    }
}

fn default_chat_port() -> u16 {
    1105
}

fn default_static_page() -> String {
    "public/chat.html".to_string()
}

/// Rates section - exchange rate lookup endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RatesSection {
    /// Base URL of the public exchange rate API
    #[serde(default = "default_rates_base_url")]
    pub base_url: String,
}

impl Default for RatesSection {
    fn default() -> Self {
        Self {
            base_url: default_rates_base_url(),
        }
    }
}

fn default_rates_base_url() -> String {
    "https://open.er-api.com".to_string()
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Config {
    /// Load configuration from an explicit TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with default-path probing
    ///
    /// An explicit path must load successfully. Without one, the default
    /// locations are tried in order and a missing file falls back to the
    /// built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => {
                let default_paths = ["concierge.toml", "config/concierge.toml"];

                for path_str in default_paths {
                    let path = Path::new(path_str);
                    if path.exists() {
                        return Self::load_from_file(path);
                    }
                }

                Ok(Config::default())
            }
        }
    }

    /// Validate configuration consistency
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidConfig(format!(
                "temperature {} outside supported range 0.0..=2.0",
                self.llm.temperature
            )));
        }

        if self.llm.max_output_tokens == 0 {
            return Err(ConfigError::InvalidConfig(
                "max_output_tokens must be greater than zero".to_string(),
            ));
        }

        if self.chat_server.port == 0 {
            return Err(ConfigError::InvalidConfig(
                "chat_server.port must be greater than zero".to_string(),
            ));
        }

        for (field, value) in [
            ("llm.base_url", self.llm.base_url.as_deref()),
            ("search.base_url", self.search.base_url.as_deref()),
            ("rates.base_url", Some(self.rates.base_url.as_str())),
        ] {
            if let Some(value) = value {
                url::Url::parse(value).map_err(|e| {
                    ConfigError::InvalidConfig(format!("{field} '{value}' is not a valid URL: {e}"))
                })?;
            }
        }

        Ok(())
    }

    /// Helper method to get environment variable with error propagation
    fn get_env_var_required(env_var_name: &str) -> Result<String, ConfigError> {
        std::env::var(env_var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(env_var_name.to_string()))
    }

    /// Get Gemini API key from environment variable
    pub fn get_gemini_api_key(&self) -> Result<String, ConfigError> {
        Self::get_env_var_required(&self.llm.api_key_env)
    }

    /// Get search API key from environment variable
    pub fn get_search_api_key(&self) -> Result<String, ConfigError> {
        Self::get_env_var_required(&self.search.api_key_env)
    }

    /// Create a test configuration for unit testing
    #[cfg(test)]
    pub fn test_config() -> Self {
        let toml_content = r#"
[llm]
model = "models/gemini-2.5-flash"
temperature = 0.7
max_output_tokens = 2048
api_key_env = "GOOGLE_API_KEY"

[search]
api_key_env = "SERPER_API_KEY"

[chat_server]
port = 1105
static_page = "public/chat.html"

[rates]
base_url = "https://open.er-api.com"
"#;
        toml::from_str(toml_content).expect("Test config should parse")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config() {
        let toml_content = r#"
[llm]
model = "models/gemini-2.5-flash"
temperature = 0.4
max_output_tokens = 1024
api_key_env = "MY_GEMINI_KEY"
base_url = "http://localhost:9090/v1beta"
timeout_secs = 30

[search]
api_key_env = "MY_SERPER_KEY"
location = "India"

[chat_server]
port = 8080
static_page = "assets/chat.html"

[rates]
base_url = "http://localhost:9091"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.llm.model, "models/gemini-2.5-flash");
        assert_eq!(config.llm.temperature, 0.4);
        assert_eq!(config.llm.max_output_tokens, 1024);
        assert_eq!(config.llm.api_key_env, "MY_GEMINI_KEY");
        assert_eq!(config.llm.timeout_secs, Some(30));
        assert_eq!(config.search.location, Some("India".to_string()));
        assert_eq!(config.chat_server.port, 8080);
        assert_eq!(config.rates.base_url, "http://localhost:9091");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.llm.model, "models/gemini-2.5-flash");
        assert_eq!(config.llm.temperature, 0.7);
        assert_eq!(config.llm.max_output_tokens, 2048);
        assert_eq!(config.llm.api_key_env, "GOOGLE_API_KEY");
        assert_eq!(config.llm.timeout_secs, None);
        assert_eq!(config.search.api_key_env, "SERPER_API_KEY");
        assert_eq!(config.chat_server.port, 1105);
        assert_eq!(config.chat_server.static_page, "public/chat.html");
        assert_eq!(config.rates.base_url, "https://open.er-api.com");
    }

    #[test]
    fn test_partial_section_fills_remaining_defaults() {
        let toml_content = r#"
[llm]
temperature = 0.2

[chat_server]
port = 3000
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.llm.temperature, 0.2);
        assert_eq!(config.llm.model, "models/gemini-2.5-flash");
        assert_eq!(config.chat_server.port, 3000);
        assert_eq!(config.chat_server.static_page, "public/chat.html");
    }

    #[test]
    fn test_temperature_out_of_range_rejected() {
        let mut config = Config::test_config();
        config.llm.temperature = 2.5;

        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_max_output_tokens_rejected() {
        let mut config = Config::test_config();
        config.llm.max_output_tokens = 0;

        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut config = Config::test_config();
        config.chat_server.port = 0;

        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_base_url_rejected() {
        let mut config = Config::test_config();
        config.rates.base_url = "not a url".to_string();

        let result = config.validate();
        match result {
            Err(ConfigError::InvalidConfig(msg)) => assert!(msg.contains("rates.base_url")),
            other => panic!("Expected InvalidConfig, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_api_key_env_var() {
        let mut config = Config::test_config();
        config.llm.api_key_env = "CONCIERGE_TEST_KEY_THAT_DOES_NOT_EXIST".to_string();

        let result = config.get_gemini_api_key();
        match result {
            Err(ConfigError::EnvVarNotFound(name)) => {
                assert_eq!(name, "CONCIERGE_TEST_KEY_THAT_DOES_NOT_EXIST");
            }
            other => panic!("Expected EnvVarNotFound, got {other:?}"),
        }
    }

    #[test]
    fn test_api_key_resolved_from_named_env_var() {
        let mut config = Config::test_config();
        config.search.api_key_env = "CONCIERGE_TEST_SEARCH_KEY".to_string();
        std::env::set_var("CONCIERGE_TEST_SEARCH_KEY", "serper-secret");

        let result = config.get_search_api_key();
        assert_eq!(result.unwrap(), "serper-secret");

        std::env::remove_var("CONCIERGE_TEST_SEARCH_KEY");
    }
}
