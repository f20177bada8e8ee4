use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Default provider to use when not specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Fallback configuration for automatic provider switching
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Content history configuration
    #[serde(default)]
    pub history: HistoryConfig,
    /// Prompt and post-processing configuration
    #[serde(default)]
    pub content: ContentConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
            fallback: FallbackConfig::default(),
            history: HistoryConfig::default(),
            content: ContentConfig::default(),
            timeout: default_timeout(),
        }
    }
}

/// Configuration for a specific generation provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    pub enabled: bool,
    /// Model identifier (e.g., "gemini-2.5-pro", "gpt-4.1-mini")
    pub model: String,
    /// Temperature for generation (0.0-2.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
}

/// Configuration for provider fallback and retry behavior
#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    /// Whether fallback is enabled
    #[serde(default)]
    pub enabled: bool,
    /// Order of providers to try (first to last)
    #[serde(default)]
    pub order: Vec<String>,
    /// Number of retry attempts per provider before fallback
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Initial delay between retries in milliseconds (grows linearly per attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            order: Vec::new(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Content history file settings
#[derive(Debug, Deserialize, Clone)]
pub struct HistoryConfig {
    /// History file location; the per-user data directory when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Entries kept before the oldest are evicted
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Lock attempts before a write is skipped or a read goes unlocked
    #[serde(default = "default_lock_attempts")]
    pub lock_attempts: u32,
    #[serde(default = "default_write_retry_delay_ms")]
    pub write_retry_delay_ms: u64,
    #[serde(default = "default_read_retry_delay_ms")]
    pub read_retry_delay_ms: u64,
    /// Recent entries of the same category consulted for differentiation
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_entries: default_max_entries(),
            lock_attempts: default_lock_attempts(),
            write_retry_delay_ms: default_write_retry_delay_ms(),
            read_retry_delay_ms: default_read_retry_delay_ms(),
            recent_limit: default_recent_limit(),
        }
    }
}

/// Prompt and response post-processing settings
#[derive(Debug, Deserialize, Clone)]
pub struct ContentConfig {
    /// Sentences the model must never reproduce
    #[serde(default = "default_banned_phrases")]
    pub banned_phrases: Vec<String>,
    /// Chance that the first cliché of a group survives substitution
    #[serde(default = "default_keep_probability")]
    pub soft_avoid_keep_probability: f64,
    /// Images sent along with the prompt
    #[serde(default = "default_max_images")]
    pub max_images: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            banned_phrases: default_banned_phrases(),
            soft_avoid_keep_probability: default_keep_probability(),
            max_images: default_max_images(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "google".to_string()
}

fn default_temperature() -> f32 {
    0.95
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_timeout() -> u64 {
    120
}

fn default_max_entries() -> usize {
    50
}

fn default_lock_attempts() -> u32 {
    5
}

fn default_write_retry_delay_ms() -> u64 {
    500
}

fn default_read_retry_delay_ms() -> u64 {
    300
}

fn default_recent_limit() -> usize {
    5
}

fn default_keep_probability() -> f64 {
    0.5
}

fn default_max_images() -> usize {
    6
}

pub fn default_banned_phrases() -> Vec<String> {
    [
        "직접 사용해보니 정말 만족스러웠어요",
        "제 솔직한 경험을 공유하고 싶어서 이렇게 후기를 남깁니다",
        "물론 완벽한 제품은 없듯이, 아쉬운 부분도 있었어요",
        "하지만 전체적으로 봤을 때 큰 단점은 아니었고, 사용하는 데 큰 불편함은 없었습니다",
    ]
    .iter()
    .map(|phrase| phrase.to_string())
    .collect()
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with REVIEW_FORGE__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: REVIEW_FORGE__PROVIDERS__GOOGLE__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the source priority.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: REVIEW_FORGE__HISTORY__MAX_ENTRIES
        .add_source(
            Environment::with_prefix("REVIEW_FORGE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_values() {
        assert_eq!(default_provider(), "google");
        assert_eq!(default_max_entries(), 50);
        assert_eq!(default_lock_attempts(), 5);
        assert_eq!(default_write_retry_delay_ms(), 500);
        assert_eq!(default_read_retry_delay_ms(), 300);
        assert_eq!(default_keep_probability(), 0.5);
    }

    #[test]
    fn test_fallback_config_default() {
        let fallback = FallbackConfig::default();
        assert!(!fallback.enabled);
        assert!(fallback.order.is_empty());
        assert_eq!(fallback.retry_attempts, 3);
        assert_eq!(fallback.retry_delay_ms, 1000);
    }

    #[test]
    fn test_content_config_default_banned_phrases() {
        let content = ContentConfig::default();
        assert_eq!(content.banned_phrases.len(), 4);
        assert_eq!(content.max_images, 6);
    }

    #[test]
    fn test_deserialize_from_toml() {
        let toml = r#"
            default_provider = "openai"

            [providers.openai]
            enabled = true
            model = "gpt-4.1-mini"
            api_key = "test-key"

            [history]
            path = "/tmp/history.json"
            max_entries = 20

            [content]
            banned_phrases = ["그만"]
        "#;

        let config: AppConfig = Config::builder()
            .add_source(config::File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.default_provider, "openai");
        let openai = &config.providers["openai"];
        assert_eq!(openai.temperature, 0.95);
        assert_eq!(openai.max_tokens, 8192);
        assert_eq!(config.history.max_entries, 20);
        assert_eq!(config.history.lock_attempts, 5);
        assert_eq!(config.content.banned_phrases, vec!["그만"]);
        assert_eq!(config.content.soft_avoid_keep_probability, 0.5);
        assert_eq!(config.timeout, 120);
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let config: AppConfig = Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert!(config.providers.is_empty());
        assert!(config.history.path.is_none());
        assert_eq!(config.history.recent_limit, 5);
    }
}
