use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language name (e.g. "English")
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language name (e.g. "Vietnamese")
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            translation: TranslationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Write the configuration to a JSON file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .context("Failed to serialize configuration")?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() {
            return Err(anyhow!("Source language cannot be empty"));
        }
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language cannot be empty"));
        }
        if self.translation.common.max_chunk_size == 0 {
            return Err(anyhow!("Maximum chunk size must be greater than zero"));
        }

        let provider_config = self.translation.provider_config()
            .ok_or_else(|| anyhow!(
                "No provider configuration found for {}",
                self.translation.provider
            ))?;
        Url::parse(&provider_config.endpoint)
            .map_err(|e| anyhow!("Invalid endpoint {}: {}", provider_config.endpoint, e))?;
        if provider_config.model.trim().is_empty() {
            return Err(anyhow!("Model name cannot be empty"));
        }

        Ok(())
    }
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Google Gemini
    #[default]
    Gemini,
    // @provider: OpenAI
    OpenAI,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Gemini => "Gemini",
            Self::OpenAI => "OpenAI",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Gemini => "gemini".to_string(),
            Self::OpenAI => "openai".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "gemini" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    // @field: Max tokens generated per request
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::Gemini => Self {
                provider_type: "gemini".to_string(),
                model: default_gemini_model(),
                endpoint: default_gemini_endpoint(),
                temperature: default_temperature(),
                max_output_tokens: default_max_output_tokens(),
            },
            TranslationProvider::OpenAI => Self {
                provider_type: "openai".to_string(),
                model: default_openai_model(),
                endpoint: default_openai_endpoint(),
                temperature: default_openai_temperature(),
                max_output_tokens: default_openai_max_output_tokens(),
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default = "default_available_providers")]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: default_available_providers(),
            common: TranslationCommonConfig::default(),
        }
    }
}

impl TranslationConfig {
    /// Configuration entry for the selected provider
    pub fn provider_config(&self) -> Option<&ProviderConfig> {
        let wanted = self.provider.to_lowercase_string();
        self.available_providers.iter().find(|p| p.provider_type == wanted)
    }

    /// Per-credential concurrency for a pool of the given size
    ///
    /// A single credential is allowed to run more chunks in parallel than
    /// each member of a multi-credential pool. Both values are configuration.
    pub fn per_credential_concurrency(&self, credential_count: usize) -> usize {
        if credential_count <= 1 {
            self.common.single_credential_concurrency
        } else {
            self.common.multi_credential_concurrency
        }
    }
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// Maximum characters per chunk sent upstream
    #[serde(default = "default_max_chunk_size")]
    pub max_chunk_size: usize,

    /// Retry count for failed chunk requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff time in milliseconds, doubled on each retry
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Ceiling for the exponential backoff in milliseconds
    #[serde(default = "default_retry_backoff_cap_ms")]
    pub retry_backoff_cap_ms: u64,

    /// Backoff ceiling for short ad-hoc translations in milliseconds
    #[serde(default = "default_short_retry_backoff_cap_ms")]
    pub short_retry_backoff_cap_ms: u64,

    /// Concurrent chunks per credential when several credentials are pooled
    #[serde(default = "default_multi_credential_concurrency")]
    pub multi_credential_concurrency: usize,

    /// Concurrent chunks when a single credential carries the whole job
    #[serde(default = "default_single_credential_concurrency")]
    pub single_credential_concurrency: usize,

    /// Request timeout for bulk chunk translations in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Request timeout for short ad-hoc translations in seconds
    #[serde(default = "default_short_text_timeout_secs")]
    pub short_text_timeout_secs: u64,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: default_max_chunk_size(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            retry_backoff_cap_ms: default_retry_backoff_cap_ms(),
            short_retry_backoff_cap_ms: default_short_retry_backoff_cap_ms(),
            multi_credential_concurrency: default_multi_credential_concurrency(),
            single_credential_concurrency: default_single_credential_concurrency(),
            timeout_secs: default_timeout_secs(),
            short_text_timeout_secs: default_short_text_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to a log crate level filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "English".to_string()
}

fn default_target_language() -> String {
    "Vietnamese".to_string()
}

fn default_available_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig::new(TranslationProvider::Gemini),
        ProviderConfig::new(TranslationProvider::OpenAI),
    ]
}

fn default_max_chunk_size() -> usize {
    2500
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_backoff_ms() -> u64 {
    1000 // 1 second base backoff time, doubled on each retry
}

fn default_retry_backoff_cap_ms() -> u64 {
    10_000
}

fn default_short_retry_backoff_cap_ms() -> u64 {
    5_000
}

fn default_multi_credential_concurrency() -> usize {
    2
}

fn default_single_credential_concurrency() -> usize {
    3
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_short_text_timeout_secs() -> u64 {
    30
}

fn default_temperature() -> f32 {
    0.2
}

fn default_openai_temperature() -> f32 {
    0.3
}

fn default_max_output_tokens() -> u32 {
    8192
}

fn default_openai_max_output_tokens() -> u32 {
    4000
}

fn default_gemini_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_openai_model() -> String {
    "gpt-4".to_string()
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}
