//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables, with `__`
//! separating nested keys (`ANTHROPIC__API_KEY`, `DIALOGUE__MAX_EXCHANGES`).
//!
//! See [`AnthropicConfig`] for the model connection settings.

use serde::Deserialize;
use spa_receptionist_ai::AnthropicConfig;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// PostgreSQL connection URL. History is kept in memory when absent.
    #[serde(default)]
    pub database_url: Option<String>,

    /// Hosted model connection.
    pub anthropic: AnthropicConfig,

    /// Where the service catalog is read from.
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Tool invocation settings.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Dialogue loop limits shared by voice and chat.
    #[serde(default)]
    pub dialogue: DialogueLimits,

    /// Phone surface settings.
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Web chat surface settings.
    #[serde(default)]
    pub chat: ChatConfig,
}

fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

/// Catalog source. A URL takes precedence over a path.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_catalog_path")]
    pub path: String,

    #[serde(default)]
    pub url: Option<String>,
}

fn default_catalog_path() -> String {
    "data/services.json".to_string()
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
            url: None,
        }
    }
}

/// Tool invocation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolsConfig {
    /// Remote tool endpoint. Tools run in-process when absent.
    #[serde(default)]
    pub remote_url: Option<String>,

    /// Timeout for remote tool and catalog requests, in seconds.
    #[serde(default = "default_tools_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_tools_timeout_seconds() -> u64 {
    10
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            remote_url: None,
            timeout_seconds: default_tools_timeout_seconds(),
        }
    }
}

/// Limits applied to every dialogue turn.
#[derive(Debug, Clone, Deserialize)]
pub struct DialogueLimits {
    /// Exchanges retained in stored history.
    #[serde(default = "default_max_exchanges")]
    pub max_exchanges: usize,

    /// Tool rounds allowed before a turn is abandoned.
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
}

fn default_max_exchanges() -> usize {
    5
}

fn default_max_tool_rounds() -> usize {
    8
}

impl Default for DialogueLimits {
    fn default() -> Self {
        Self {
            max_exchanges: default_max_exchanges(),
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

/// Phone surface settings.
#[derive(Debug, Clone, Deserialize)]
pub struct VoiceConfig {
    /// Max tokens per model call; phone replies are kept short.
    #[serde(default = "default_voice_max_tokens")]
    pub max_tokens: u32,

    /// Text-to-speech voice used in `<Say>`.
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Silence, in seconds, that ends a caller's utterance.
    #[serde(default = "default_speech_timeout")]
    pub speech_timeout: String,
}

fn default_voice_max_tokens() -> u32 {
    150
}

fn default_voice() -> String {
    "Polly.Joanna".to_string()
}

fn default_speech_timeout() -> String {
    "2".to_string()
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_voice_max_tokens(),
            voice: default_voice(),
            speech_timeout: default_speech_timeout(),
        }
    }
}

/// Web chat surface settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    #[serde(default = "default_chat_max_tokens")]
    pub max_tokens: u32,
}

fn default_chat_max_tokens() -> u32 {
    1024
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_chat_max_tokens(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn section_defaults() {
        assert_eq!(CatalogConfig::default().path, "data/services.json");
        assert_eq!(ToolsConfig::default().timeout_seconds, 10);

        let limits = DialogueLimits::default();
        assert_eq!(limits.max_exchanges, 5);
        assert_eq!(limits.max_tool_rounds, 8);

        let voice = VoiceConfig::default();
        assert_eq!(voice.max_tokens, 150);
        assert_eq!(voice.voice, "Polly.Joanna");
        assert_eq!(voice.speech_timeout, "2");

        assert_eq!(ChatConfig::default().max_tokens, 1024);
    }

    #[test]
    fn deserializes_with_only_api_key() {
        let config: ServerConfig = config::Config::builder()
            .set_override("anthropic.api_key", "sk-test")
            .expect("override")
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");

        assert_eq!(config.bind_addr, "0.0.0.0:3000");
        assert!(config.database_url.is_none());
        assert!(config.tools.remote_url.is_none());
        assert_eq!(config.anthropic.model, "claude-3-5-haiku-20241022");
        assert_eq!(config.anthropic.timeout_seconds, 30);
    }

    #[test]
    fn nested_overrides_apply() {
        let config: ServerConfig = config::Config::builder()
            .set_override("anthropic.api_key", "sk-test")
            .expect("override")
            .set_override("dialogue.max_exchanges", 3)
            .expect("override")
            .set_override("tools.remote_url", "http://tools.internal/tools")
            .expect("override")
            .build()
            .expect("build")
            .try_deserialize()
            .expect("deserialize");

        assert_eq!(config.dialogue.max_exchanges, 3);
        assert_eq!(config.dialogue.max_tool_rounds, 8);
        assert_eq!(
            config.tools.remote_url.as_deref(),
            Some("http://tools.internal/tools")
        );
    }
}
