//! Runtime configuration for the stats ticker
//!
//! The client itself needs no configuration. A ticker is a function of three
//! inputs: chain id, pair id and polling interval, read from the environment
//! or passed in directly.

use crate::{
    constants::{
        DEFAULT_CHAIN_ID, DEFAULT_POLL_INTERVAL_MS, ENV_CHAIN_ID, ENV_PAIR_ID, ENV_POLL_MS,
    },
    error::ConfigError,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What to poll and how often
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickerConfig {
    /// Chain identifier, e.g. `solana`
    pub chain_id: String,
    /// DexScreener pair address
    pub pair_id: String,
    /// Delay between the end of one fetch cycle and the start of the next
    pub poll_interval: Duration,
}

impl TickerConfig {
    /// Creates a validated configuration
    pub fn new(
        chain_id: impl Into<String>,
        pair_id: impl Into<String>,
        poll_interval: Duration,
    ) -> Result<Self, ConfigError> {
        let chain_id = chain_id.into().trim().to_string();
        let pair_id = pair_id.into().trim().to_string();

        if chain_id.is_empty() {
            return Err(ConfigError::invalid("chain_id", "must not be empty"));
        }
        if pair_id.is_empty() {
            return Err(ConfigError::invalid("pair_id", "must not be empty"));
        }
        if poll_interval.is_zero() {
            return Err(ConfigError::invalid("poll_interval", "must be greater than zero"));
        }

        Ok(Self {
            chain_id,
            pair_id,
            poll_interval,
        })
    }

    /// Creates a configuration with the default chain and polling interval
    pub fn for_pair(pair_id: impl Into<String>) -> Result<Self, ConfigError> {
        Self::new(
            DEFAULT_CHAIN_ID,
            pair_id,
            Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        )
    }

    /// Reads `DEXSCREENER_CHAIN_ID` (default `solana`), `DEXSCREENER_PAIR_ID`
    /// (required) and `DEXSCREENER_POLL_MS` (default 15000)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Self::from_env`] but reads values through `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let chain_id = lookup(ENV_CHAIN_ID).unwrap_or_else(|| DEFAULT_CHAIN_ID.to_string());
        let pair_id = lookup(ENV_PAIR_ID).ok_or(ConfigError::Missing(ENV_PAIR_ID))?;

        let poll_ms = match lookup(ENV_POLL_MS) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|e| {
                ConfigError::invalid(
                    ENV_POLL_MS,
                    format!("{:?} is not a number of milliseconds: {}", raw, e),
                )
            })?,
            None => DEFAULT_POLL_INTERVAL_MS,
        };

        Self::new(chain_id, pair_id, Duration::from_millis(poll_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = TickerConfig::from_lookup(lookup_from(&[(ENV_PAIR_ID, "abc123")])).unwrap();
        assert_eq!(config.chain_id, "solana");
        assert_eq!(config.pair_id, "abc123");
        assert_eq!(config.poll_interval, Duration::from_millis(15_000));
    }

    #[test]
    fn test_all_values() {
        let config = TickerConfig::from_lookup(lookup_from(&[
            (ENV_CHAIN_ID, "base"),
            (ENV_PAIR_ID, " 0xpair "),
            (ENV_POLL_MS, "30000"),
        ]))
        .unwrap();
        assert_eq!(config.chain_id, "base");
        assert_eq!(config.pair_id, "0xpair");
        assert_eq!(config.poll_interval, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_pair_id() {
        let err = TickerConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing(ENV_PAIR_ID));
    }

    #[test]
    fn test_invalid_poll_interval() {
        let err = TickerConfig::from_lookup(lookup_from(&[
            (ENV_PAIR_ID, "abc"),
            (ENV_POLL_MS, "fast"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: ENV_POLL_MS, .. }));

        let err = TickerConfig::from_lookup(lookup_from(&[
            (ENV_PAIR_ID, "abc"),
            (ENV_POLL_MS, "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "poll_interval", .. }));
    }

    #[test]
    fn test_empty_ids_rejected() {
        assert!(TickerConfig::new("", "abc", Duration::from_secs(1)).is_err());
        assert!(TickerConfig::new("solana", "   ", Duration::from_secs(1)).is_err());
        assert!(TickerConfig::for_pair("abc").is_ok());
    }
}
