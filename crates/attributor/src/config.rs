//! Configuration types for attribution runs

use std::time::Duration;

use crate::error::{AttributorError, Result};

/// Default CurseForge REST API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.curseforge.com";

/// Environment variable holding the CurseForge API key
pub const API_KEY_ENV: &str = "CURSEFORGE_API_KEY";

/// Configuration for attribution runs
#[derive(Debug, Clone)]
pub struct AttributorConfig {
    /// Maximum number of catalog fetches in flight at once
    pub max_concurrent_fetches: usize,
    /// Timeout for a single catalog request
    pub timeout: Duration,
    pub user_agent: String,
    /// Base URL of the catalog API (no trailing path)
    pub api_base: String,
    /// CurseForge API key, falls back to `CURSEFORGE_API_KEY` when unset
    pub api_key: Option<String>,
    /// Retry attempts for recoverable catalog failures
    pub max_retries: usize,
    /// Initial delay between retries (doubles each retry)
    pub retry_delay: Duration,
    /// Maximum retry delay cap
    pub max_retry_delay: Duration,
    /// How long catalog replies stay cached
    pub cache_ttl: Duration,
}

impl AttributorConfig {
    /// Concurrency limit actually used by the resolver (never zero)
    pub fn fetch_concurrency(&self) -> usize {
        self.max_concurrent_fetches.max(1)
    }

    /// Calculate retry delay for the given attempt using exponential backoff
    pub fn get_retry_delay(&self, attempt: usize) -> Duration {
        let base = u64::try_from(self.retry_delay.as_millis()).unwrap_or(u64::MAX);
        let cap = u64::try_from(self.max_retry_delay.as_millis()).unwrap_or(u64::MAX);
        let delay = u32::try_from(attempt)
            .ok()
            .and_then(|exp| 2_u64.checked_pow(exp))
            .and_then(|factor| base.checked_mul(factor))
            .unwrap_or(u64::MAX);
        Duration::from_millis(delay.min(cap))
    }

    /// Resolve the API key from the config or the environment (.env included)
    pub fn resolve_api_key(&self) -> Result<String> {
        if let Some(key) = self.api_key.as_ref().filter(|k| !k.trim().is_empty()) {
            return Ok(key.clone());
        }

        dotenv::dotenv().ok(); // Ignore error if .env not present
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| AttributorError::Configuration {
                message: format!("{} environment variable not set", API_KEY_ENV),
                field: Some(API_KEY_ENV.to_string()),
                suggestion: Some(
                    "Set CURSEFORGE_API_KEY in your .env file or pass --api-key with a key from console.curseforge.com"
                        .to_string(),
                ),
            })
    }
}

impl Default for AttributorConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 4,
            timeout: Duration::from_secs(30),
            user_agent: concat!("modpack-attributor/", env!("CARGO_PKG_VERSION")).to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: None,
            max_retries: 3,
            retry_delay: Duration::from_millis(500),
            max_retry_delay: Duration::from_secs(30),
            cache_ttl: Duration::from_secs(300),
        }
    }
}

/// Fluent builder for [`AttributorConfig`]
#[derive(Debug, Clone, Default)]
pub struct AttributorConfigBuilder {
    config: AttributorConfig,
}

impl AttributorConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_concurrent_fetches(mut self, max: usize) -> Self {
        self.config.max_concurrent_fetches = max;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn user_agent<S: Into<String>>(mut self, user_agent: S) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    pub fn api_base<S: Into<String>>(mut self, api_base: S) -> Self {
        self.config.api_base = api_base.into();
        self
    }

    pub fn api_key<S: Into<String>>(mut self, api_key: S) -> Self {
        self.config.api_key = Some(api_key.into());
        self
    }

    pub fn max_retries(mut self, retries: usize) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn retry_delay(mut self, delay: Duration) -> Self {
        self.config.retry_delay = delay;
        self
    }

    pub fn max_retry_delay(mut self, delay: Duration) -> Self {
        self.config.max_retry_delay = delay;
        self
    }

    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.config.cache_ttl = ttl;
        self
    }

    pub fn build(self) -> AttributorConfig {
        self.config
    }
}
