//! Cache configuration
//!
//! Caching is **enabled by default**. It can be switched off per
//! [`Extensions`](crate::Extensions) context by passing a config with
//! `enabled: false`, or for a whole process with the `FONTEXT_CACHE`
//! environment variable:
//!
//! ```bash
//! FONTEXT_CACHE=0 fontext anchors MyFont.ufo
//! ```
//!
//! # Example
//!
//! ```
//! use fontext_core::CacheConfig;
//!
//! let config = CacheConfig::default();
//! assert!(config.enabled);
//!
//! let off = CacheConfig::disabled();
//! assert!(!off.enabled);
//! ```

/// Environment variable that switches caching on or off
pub const CACHE_ENV: &str = "FONTEXT_CACHE";

/// Environment variable that turns on a debug log line for every cache hit
pub const CACHE_LOG_HITS_ENV: &str = "FONTEXT_CACHE_LOG_HITS";

/// How an [`Extensions`](crate::Extensions) context uses its cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// When false, cached extensions recompute on every call and no
    /// subscriptions are made
    pub enabled: bool,
    /// Log every cache hit at debug level
    pub log_hits: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_hits: false,
        }
    }
}

impl CacheConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Read `FONTEXT_CACHE` and `FONTEXT_CACHE_LOG_HITS`
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(value) = lookup(CACHE_ENV) {
            if let Some(enabled) = parse_flag(&value) {
                config.enabled = enabled;
                log::info!(
                    "fontext caching {} via {}",
                    if enabled { "enabled" } else { "disabled" },
                    CACHE_ENV
                );
            } else {
                log::warn!("ignoring unrecognised {}={:?}", CACHE_ENV, value);
            }
        }
        if let Some(value) = lookup(CACHE_LOG_HITS_ENV) {
            config.log_hits = parse_flag(&value).unwrap_or(false);
        }
        config
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_log_hits(mut self, log_hits: bool) -> Self {
        self.log_hits = log_hits;
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
