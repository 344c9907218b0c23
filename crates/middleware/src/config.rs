//! Middleware config: MemOS credentials, injection limits, prompt language, log level.
//! Loaded from env or built in code.

use anyhow::Result;
use memos_core::MemosError;
use std::env;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://memos.memtensor.cn/api/openmem/v1";
pub const DEFAULT_MEMORY_LIMIT: usize = 5;
pub const DEFAULT_PROMPT_LANGUAGE: &str = "auto";
/// Orphaned pending prompts older than this are dropped.
pub const DEFAULT_PENDING_TTL_SECS: u64 = 600;
pub const DEFAULT_LOG_FILE: &str = "logs/memos.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone)]
pub struct MemosConfig {
    /// MEMOS_API_KEY; `None` puts the middleware in degraded mode
    pub api_key: Option<String>,
    /// MEMOS_BASE_URL
    pub base_url: String,
    /// MEMOS_MEMORY_LIMIT: max memories injected per request
    pub memory_limit: usize,
    /// MEMOS_PROMPT_LANGUAGE: "auto" or a language code used verbatim
    pub prompt_language: String,
    /// MEMOS_PENDING_TTL_SECS
    pub pending_ttl_secs: u64,
    /// LOG_FILE
    pub log_file: String,
    /// MEMOS_LOG_LEVEL: tracing filter used when RUST_LOG is unset
    pub log_level: String,
}

impl Default for MemosConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            memory_limit: DEFAULT_MEMORY_LIMIT,
            prompt_language: DEFAULT_PROMPT_LANGUAGE.to_string(),
            pending_ttl_secs: DEFAULT_PENDING_TTL_SECS,
            log_file: DEFAULT_LOG_FILE.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl MemosConfig {
    /// Config with an API key and defaults for everything else.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Load from environment variables. Unparsable numbers fall back to defaults; an empty
    /// MEMOS_API_KEY counts as unset.
    pub fn load() -> Result<Self> {
        let api_key = env::var("MEMOS_API_KEY")
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        let base_url = env::var("MEMOS_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        let memory_limit = env::var("MEMOS_MEMORY_LIMIT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_MEMORY_LIMIT);
        let prompt_language = env::var("MEMOS_PROMPT_LANGUAGE")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_PROMPT_LANGUAGE.to_string());
        let pending_ttl_secs = env::var("MEMOS_PENDING_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PENDING_TTL_SECS);
        let log_file = env::var("LOG_FILE").unwrap_or_else(|_| DEFAULT_LOG_FILE.to_string());
        let log_level =
            env::var("MEMOS_LOG_LEVEL").unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

        Ok(Self {
            api_key,
            base_url,
            memory_limit,
            prompt_language,
            pending_ttl_secs,
            log_file,
            log_level,
        })
    }

    /// Validate config: memory_limit and pending_ttl_secs must be positive, base_url must be
    /// http(s).
    pub fn validate(&self) -> memos_core::Result<()> {
        if self.memory_limit == 0 {
            return Err(MemosError::Config(
                "MEMOS_MEMORY_LIMIT must be a positive integer".to_string(),
            ));
        }
        if self.pending_ttl_secs == 0 {
            return Err(MemosError::Config(
                "MEMOS_PENDING_TTL_SECS must be a positive integer".to_string(),
            ));
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(MemosError::Config(format!(
                "MEMOS_BASE_URL is not an http(s) URL: {}",
                self.base_url
            )));
        }
        Ok(())
    }

    pub fn pending_ttl(&self) -> Duration {
        Duration::from_secs(self.pending_ttl_secs)
    }
}
