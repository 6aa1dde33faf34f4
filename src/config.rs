//! Environment configuration.

use alloy::primitives::Address;
use std::str::FromStr;
use std::time::Duration;

use crate::engine::EngineSettings;
use crate::error::ConfigError;
use crate::events::SourceKind;

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_RPC_URL: &str = "RPC_URL";
pub const ENV_LAUNCHER_ADDRESS: &str = "LAUNCHER_ADDRESS";
pub const ENV_DEX_ADDRESS: &str = "DEX_ADDRESS";
pub const ENV_PROTECTION_ADDRESS: &str = "PROTECTION_ADDRESS";
pub const ENV_OPUS_ADDRESS: &str = "OPUS_ADDRESS";
pub const ENV_CONFIG_ADDRESS: &str = "CONFIG_ADDRESS";
pub const ENV_START_BLOCK: &str = "START_BLOCK";
pub const ENV_POLL_INTERVAL: &str = "POLL_INTERVAL_SECS";
pub const ENV_BLOCK_RANGE: &str = "BLOCK_RANGE";
pub const ENV_CREATOR_ALLOCATION_BPS: &str = "CREATOR_ALLOCATION_BPS";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 5;
const DEFAULT_BLOCK_RANGE: u64 = 2000;
const MAX_BPS: u16 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    /// `None` runs against the in-memory store
    pub database_url: Option<String>,
    pub rpc_url: Option<String>,
    pub launcher: Option<Address>,
    pub dex: Option<Address>,
    pub protection: Option<Address>,
    pub opus: Option<Address>,
    pub config: Option<Address>,
    pub start_block: u64,
    pub poll_interval: Duration,
    pub block_range: u64,
    pub creator_allocation_bps: u16,
}

impl IndexerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let block_range = parse_or(get(ENV_BLOCK_RANGE), ENV_BLOCK_RANGE, DEFAULT_BLOCK_RANGE)?;
        if block_range == 0 {
            return Err(ConfigError::Invalid {
                name: ENV_BLOCK_RANGE,
                reason: "must be at least 1".to_string(),
            });
        }

        let poll_interval_secs = parse_or(
            get(ENV_POLL_INTERVAL),
            ENV_POLL_INTERVAL,
            DEFAULT_POLL_INTERVAL_SECS,
        )?;
        if poll_interval_secs == 0 {
            return Err(ConfigError::Invalid {
                name: ENV_POLL_INTERVAL,
                reason: "must be at least 1 second".to_string(),
            });
        }

        let creator_allocation_bps =
            parse_or(get(ENV_CREATOR_ALLOCATION_BPS), ENV_CREATOR_ALLOCATION_BPS, 0u16)?;
        if creator_allocation_bps > MAX_BPS {
            return Err(ConfigError::Invalid {
                name: ENV_CREATOR_ALLOCATION_BPS,
                reason: format!("{} exceeds {}", creator_allocation_bps, MAX_BPS),
            });
        }

        Ok(Self {
            database_url: get(ENV_DATABASE_URL),
            rpc_url: get(ENV_RPC_URL),
            launcher: address(get(ENV_LAUNCHER_ADDRESS), ENV_LAUNCHER_ADDRESS)?,
            dex: address(get(ENV_DEX_ADDRESS), ENV_DEX_ADDRESS)?,
            protection: address(get(ENV_PROTECTION_ADDRESS), ENV_PROTECTION_ADDRESS)?,
            opus: address(get(ENV_OPUS_ADDRESS), ENV_OPUS_ADDRESS)?,
            config: address(get(ENV_CONFIG_ADDRESS), ENV_CONFIG_ADDRESS)?,
            start_block: parse_or(get(ENV_START_BLOCK), ENV_START_BLOCK, 0u64)?,
            poll_interval: Duration::from_secs(poll_interval_secs),
            block_range,
            creator_allocation_bps,
        })
    }

    pub fn require_rpc_url(&self) -> Result<&str, ConfigError> {
        self.rpc_url.as_deref().ok_or(ConfigError::Missing(ENV_RPC_URL))
    }

    /// Singleton contracts to track from the start.
    pub fn static_sources(&self) -> Vec<(Address, SourceKind)> {
        [
            (self.launcher, SourceKind::Launcher),
            (self.dex, SourceKind::Dex),
            (self.protection, SourceKind::Protection),
            (self.opus, SourceKind::Opus),
            (self.config, SourceKind::Config),
        ]
        .into_iter()
        .filter_map(|(address, kind)| address.map(|address| (address, kind)))
        .collect()
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            creator_allocation_bps: self.creator_allocation_bps,
        }
    }
}

fn parse_or<T: FromStr>(value: Option<String>, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match value {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|e: T::Err| ConfigError::Invalid {
            name,
            reason: e.to_string(),
        }),
    }
}

fn address(value: Option<String>, name: &'static str) -> Result<Option<Address>, ConfigError> {
    value
        .map(|raw| {
            Address::from_str(&raw).map_err(|e| ConfigError::Invalid {
                name,
                reason: e.to_string(),
            })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Result<IndexerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        IndexerConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.start_block, 0);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.block_range, 2000);
        assert_eq!(config.creator_allocation_bps, 0);
        assert!(config.static_sources().is_empty());
        assert!(matches!(config.require_rpc_url(), Err(ConfigError::Missing(ENV_RPC_URL))));
    }

    #[test]
    fn test_static_sources_follow_configured_addresses() {
        let config = config(&[
            (ENV_LAUNCHER_ADDRESS, "0x1111111111111111111111111111111111111111"),
            (ENV_OPUS_ADDRESS, "0x2222222222222222222222222222222222222222"),
            (ENV_DEX_ADDRESS, "  "),
        ])
        .unwrap();

        assert_eq!(
            config.static_sources(),
            vec![
                (Address::repeat_byte(0x11), SourceKind::Launcher),
                (Address::repeat_byte(0x22), SourceKind::Opus),
            ]
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            config(&[(ENV_LAUNCHER_ADDRESS, "not-an-address")]),
            Err(ConfigError::Invalid { name: ENV_LAUNCHER_ADDRESS, .. })
        ));
        assert!(matches!(
            config(&[(ENV_BLOCK_RANGE, "0")]),
            Err(ConfigError::Invalid { name: ENV_BLOCK_RANGE, .. })
        ));
        assert!(matches!(
            config(&[(ENV_POLL_INTERVAL, "0")]),
            Err(ConfigError::Invalid { name: ENV_POLL_INTERVAL, .. })
        ));
        assert!(matches!(
            config(&[(ENV_CREATOR_ALLOCATION_BPS, "10001")]),
            Err(ConfigError::Invalid { .. })
        ));
    }
}
