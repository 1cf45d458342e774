//! Gateway configuration.
//!
//! The only tunable is the per-entry cache TTL. Hosts can embed
//! [`GatewayConfig`] in their own configuration files through `serde`, or
//! read it from the environment with [`GatewayConfig::from_env`].

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the cache TTL in milliseconds.
pub const CACHE_TTL_ENV: &str = "TOOLGATE_CACHE_TTL_MS";

/// Default cache TTL: five minutes.
pub const DEFAULT_CACHE_TTL_MILLIS: u64 = 300_000;

/// Errors raised while loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The TTL value is not a non-negative integer.
    #[error("invalid cache TTL `{value}` in {variable}: {reason}")]
    InvalidCacheTtl {
        /// Variable the value was read from.
        variable: String,
        /// Raw value.
        value: String,
        /// Parse failure.
        reason: String,
    },
}

/// Configuration for the capability gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Per-entry cache TTL in milliseconds.
    pub cache_ttl_millis: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            cache_ttl_millis: DEFAULT_CACHE_TTL_MILLIS,
        }
    }
}

impl GatewayConfig {
    /// Returns the per-entry cache TTL.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_millis(self.cache_ttl_millis)
    }

    /// Sets the per-entry cache TTL, saturating at `u64::MAX` milliseconds.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl_millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Loads configuration from the process environment.
    ///
    /// A missing variable yields the default TTL.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCacheTtl`] when the variable is set but
    /// is not a non-negative integer.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Loads configuration through a variable lookup function.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidCacheTtl`] when the TTL value is not a
    /// non-negative integer.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let Some(raw) = lookup(CACHE_TTL_ENV) else {
            return Ok(Self::default());
        };
        let cache_ttl_millis =
            raw.trim()
                .parse::<u64>()
                .map_err(|err| ConfigError::InvalidCacheTtl {
                    variable: CACHE_TTL_ENV.to_owned(),
                    value: raw.clone(),
                    reason: err.to_string(),
                })?;
        Ok(Self { cache_ttl_millis })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_ttl_is_five_minutes() {
        assert_eq!(GatewayConfig::default().cache_ttl(), Duration::from_secs(300));
    }

    #[rstest]
    fn builder_overrides_ttl() {
        let config = GatewayConfig::default().with_cache_ttl(Duration::from_secs(2));
        assert_eq!(config.cache_ttl_millis, 2000);
    }

    #[rstest]
    #[case(None, Some(DEFAULT_CACHE_TTL_MILLIS))]
    #[case(Some("1500"), Some(1500))]
    #[case(Some(" 0 "), Some(0))]
    #[case(Some("five minutes"), None)]
    #[case(Some("-1"), None)]
    fn lookup_parses_ttl(#[case] raw: Option<&str>, #[case] expected: Option<u64>) {
        let result = GatewayConfig::from_lookup(|_| raw.map(str::to_owned));
        match expected {
            Some(millis) => assert_eq!(
                result.expect("lookup should succeed").cache_ttl_millis,
                millis
            ),
            None => assert!(matches!(result, Err(ConfigError::InvalidCacheTtl { .. }))),
        }
    }

    #[rstest]
    fn deserializes_with_defaults() {
        let empty: GatewayConfig = serde_json::from_str("{}").expect("config should parse");
        assert_eq!(empty, GatewayConfig::default());

        let custom: GatewayConfig =
            serde_json::from_str(r#"{"cache_ttl_millis": 60000}"#).expect("config should parse");
        assert_eq!(custom.cache_ttl(), Duration::from_secs(60));
    }
}
