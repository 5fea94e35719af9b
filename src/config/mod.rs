//! Configuration handling for the application.
//!
//! Everything the service needs from the process environment is read once,
//! here, by `Config::from_env`. The rest of the crate receives explicit
//! values (see [`CompletionConfig`]) and never touches `std::env` itself.

use std::env;
use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};
use std::time::Duration;

/// Environment variable names. Keeping them public lets tests refer to them.
pub const ENV_BIND_ADDR: &str = "BIND_ADDR";
pub const ENV_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_BASE_URL: &str = "GEMINI_BASE_URL";
pub const ENV_MODELS: &str = "CRITIC_MODELS";
pub const ENV_MODEL_STRATEGY: &str = "CRITIC_MODEL_STRATEGY";

/// Default development values used when environment variables are absent.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Newest / most capable first.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-1.5-flash-latest",
    "gemini-1.5-flash",
];

const DEFAULT_TEMPERATURE: f32 = 0.4;
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 1024;
const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_DISCOVERY_TIMEOUT: Duration = Duration::from_secs(15);

/// How the model to call is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelStrategy {
    /// Walk the priority list, advancing on model-unavailable failures.
    Fallback,
    /// Ask the service which models support generation, then pick one.
    Discover,
}

impl ModelStrategy {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fallback" | "static" => Ok(Self::Fallback),
            "discover" | "discovery" => Ok(Self::Discover),
            other => Err(ConfigError::InvalidValue {
                field: ENV_MODEL_STRATEGY,
                reason: format!("unknown strategy '{other}'"),
            }),
        }
    }
}

/// Everything the completion client and model resolver need.
///
/// Built once at startup and shared; the credential is optional so that a
/// missing key surfaces as a per-request configuration error instead of a
/// startup crash.
#[derive(Clone)]
pub struct CompletionConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub models: Vec<String>,
    pub strategy: ModelStrategy,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub completion_timeout: Duration,
    pub discovery_timeout: Duration,
}

impl CompletionConfig {
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            base_url: base_url.into(),
            models: DEFAULT_MODELS.iter().map(|m| m.to_string()).collect(),
            strategy: ModelStrategy::Fallback,
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            completion_timeout: DEFAULT_COMPLETION_TIMEOUT,
            discovery_timeout: DEFAULT_DISCOVERY_TIMEOUT,
        }
    }

    pub fn with_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.models = models.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strategy(mut self, strategy: ModelStrategy) -> Self {
        self.strategy = strategy;
        self
    }
}

impl Debug for CompletionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("models", &self.models)
            .field("strategy", &self.strategy)
            .field("temperature", &self.temperature)
            .field("max_output_tokens", &self.max_output_tokens)
            .field("completion_timeout", &self.completion_timeout)
            .field("discovery_timeout", &self.discovery_timeout)
            .finish()
    }
}

/// Application runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    bind_addr: String,
    completion: CompletionConfig,
}

impl Config {
    /// Create a new config explicitly.
    pub fn new(bind_addr: impl Into<String>, completion: CompletionConfig) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            completion,
        }
    }

    /// Load from environment variables, falling back to development defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let bind_addr = env::var(ENV_BIND_ADDR).unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let api_key = env::var(ENV_API_KEY)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());
        let base_url = env::var(ENV_BASE_URL).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let mut completion = CompletionConfig::new(api_key, base_url.trim_end_matches('/'));

        if let Ok(raw) = env::var(ENV_MODELS) {
            let models: Vec<String> = raw
                .split(',')
                .map(str::trim)
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect();
            if models.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: ENV_MODELS,
                    reason: "model list is empty".to_string(),
                });
            }
            completion.models = models;
        }

        if let Ok(raw) = env::var(ENV_MODEL_STRATEGY) {
            completion.strategy = ModelStrategy::parse(&raw)?;
        }

        Ok(Self::new(bind_addr, completion))
    }

    /// TCP bind address (host:port) for the HTTP server.
    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// Completion service settings, including the credential.
    pub fn completion(&self) -> &CompletionConfig {
        &self.completion
    }
}

/// Errors that can occur while building a configuration.
#[derive(Debug)]
pub enum ConfigError {
    InvalidValue { field: &'static str, reason: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "invalid value for '{}': {}", field, reason)
            }
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Ensure environment-variable manipulating tests run serially.
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            ENV_BIND_ADDR,
            ENV_API_KEY,
            ENV_BASE_URL,
            ENV_MODELS,
            ENV_MODEL_STRATEGY,
        ] {
            unsafe {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_when_env_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.bind_addr(), super::DEFAULT_BIND_ADDR);
        assert_eq!(cfg.completion().api_key, None);
        assert_eq!(cfg.completion().base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.completion().models[0], "gemini-2.5-flash");
        assert_eq!(cfg.completion().strategy, ModelStrategy::Fallback);
        assert_eq!(cfg.completion().max_output_tokens, 1024);
    }

    #[test]
    fn overrides_when_env_present() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_BIND_ADDR, "0.0.0.0:9000");
            env::set_var(ENV_API_KEY, "  secret-key ");
            env::set_var(ENV_BASE_URL, "http://localhost:1234/v1/");
            env::set_var(ENV_MODELS, "model-a, model-b,,");
            env::set_var(ENV_MODEL_STRATEGY, "discover");
        }
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.bind_addr(), "0.0.0.0:9000");
        assert_eq!(cfg.completion().api_key.as_deref(), Some("secret-key"));
        assert_eq!(cfg.completion().base_url, "http://localhost:1234/v1");
        assert_eq!(cfg.completion().models, vec!["model-a", "model-b"]);
        assert_eq!(cfg.completion().strategy, ModelStrategy::Discover);
        clear_env();
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_API_KEY, "   ");
        }
        let cfg = Config::from_env().unwrap();
        assert!(cfg.completion().api_key.is_none());
        clear_env();
    }

    #[test]
    fn rejects_unknown_strategy() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        unsafe {
            env::set_var(ENV_MODEL_STRATEGY, "random");
        }
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_MODEL_STRATEGY));
        clear_env();
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let cfg = CompletionConfig::new(Some("top-secret".to_string()), DEFAULT_BASE_URL);
        let rendered = format!("{:?}", cfg);
        assert!(!rendered.contains("top-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
