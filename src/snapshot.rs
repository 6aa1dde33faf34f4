//! Point-in-time reads of on-chain state.
//!
//! Every query is independently fallible. Callers that only need a value
//! for seeding use [`amount_or_zero`] / [`reserves_or_default`], which log
//! the failure and fall back to zero.

use alloy::{
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use tracing::{info, warn};

use crate::error::SnapshotError;
use crate::events::abi::ICarbonCoin;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnapshotQuery {
    Reserves,
    CurrentPrice,
    MaxSupply,
    GraduationThreshold,
    CreatorReserveSupply,
    BalanceOf(Address),
}

impl fmt::Display for SnapshotQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotQuery::Reserves => f.write_str("getReserves"),
            SnapshotQuery::CurrentPrice => f.write_str("getCurrentPrice"),
            SnapshotQuery::MaxSupply => f.write_str("MAX_SUPPLY"),
            SnapshotQuery::GraduationThreshold => f.write_str("GRADUATION_THRESHOLD"),
            SnapshotQuery::CreatorReserveSupply => f.write_str("CREATOR_RESERVE_SUPPLY"),
            SnapshotQuery::BalanceOf(holder) => write!(f, "balanceOf({:?})", holder),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reserves {
    pub real_usdc: U256,
    pub real_tokens: U256,
    pub virtual_usdc: U256,
    pub virtual_tokens: U256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotValue {
    Reserves(Reserves),
    Amount(U256),
}

#[async_trait]
pub trait SnapshotFetcher: Send + Sync {
    async fn query(
        &self,
        instance: Address,
        query: SnapshotQuery,
    ) -> Result<SnapshotValue, SnapshotError>;
}

/// A scalar query, `None` when unavailable.
pub async fn amount(
    fetcher: &dyn SnapshotFetcher,
    instance: Address,
    query: SnapshotQuery,
) -> Option<U256> {
    match fetcher.query(instance, query).await {
        Ok(SnapshotValue::Amount(value)) => Some(value),
        Ok(SnapshotValue::Reserves(_)) => {
            warn!(instance = ?instance, query = %query, "Snapshot returned reserves for a scalar query");
            None
        }
        Err(e) => {
            warn!(instance = ?instance, query = %query, error = %e, "Snapshot query failed");
            None
        }
    }
}

pub async fn amount_or_zero(
    fetcher: &dyn SnapshotFetcher,
    instance: Address,
    query: SnapshotQuery,
) -> U256 {
    amount(fetcher, instance, query).await.unwrap_or(U256::ZERO)
}

pub async fn reserves_or_default(fetcher: &dyn SnapshotFetcher, instance: Address) -> Reserves {
    match fetcher.query(instance, SnapshotQuery::Reserves).await {
        Ok(SnapshotValue::Reserves(reserves)) => reserves,
        Ok(SnapshotValue::Amount(_)) => {
            warn!(instance = ?instance, "Snapshot returned a scalar for reserves");
            Reserves::default()
        }
        Err(e) => {
            warn!(instance = ?instance, error = %e, "Failed to read reserves, defaulting to zero");
            Reserves::default()
        }
    }
}

/// Reads token state through the coin contract's view functions.
pub struct RpcSnapshotFetcher {
    provider: RootProvider<Http<Client>>,
}

impl RpcSnapshotFetcher {
    pub async fn new(rpc_url: &str) -> Result<Self, SnapshotError> {
        let provider = ProviderBuilder::new().on_http(rpc_url.parse().map_err(|e| {
            SnapshotError::Unavailable(format!("Invalid RPC URL: {}", e))
        })?);

        let chain_id = provider.get_chain_id().await.map_err(|e| {
            SnapshotError::Unavailable(format!("RPC connection failed: {}", e))
        })?;

        info!(chain_id = chain_id, "RpcSnapshotFetcher initialized");

        Ok(Self { provider })
    }
}

fn call_error(query: SnapshotQuery, e: impl fmt::Display) -> SnapshotError {
    SnapshotError::ContractCall {
        query: query.to_string(),
        message: e.to_string(),
    }
}

#[async_trait]
impl SnapshotFetcher for RpcSnapshotFetcher {
    async fn query(
        &self,
        instance: Address,
        query: SnapshotQuery,
    ) -> Result<SnapshotValue, SnapshotError> {
        let coin = ICarbonCoin::new(instance, &self.provider);

        let value = match query {
            SnapshotQuery::Reserves => {
                let r = coin
                    .getReserves()
                    .call()
                    .await
                    .map_err(|e| call_error(query, e))?;
                SnapshotValue::Reserves(Reserves {
                    real_usdc: r.realUsdc,
                    real_tokens: r.realTokens,
                    virtual_usdc: r.virtualUsdc,
                    virtual_tokens: r.virtualTokens,
                })
            }
            SnapshotQuery::CurrentPrice => coin
                .getCurrentPrice()
                .call()
                .await
                .map(|r| SnapshotValue::Amount(r._0))
                .map_err(|e| call_error(query, e))?,
            SnapshotQuery::MaxSupply => coin
                .MAX_SUPPLY()
                .call()
                .await
                .map(|r| SnapshotValue::Amount(r._0))
                .map_err(|e| call_error(query, e))?,
            SnapshotQuery::GraduationThreshold => coin
                .GRADUATION_THRESHOLD()
                .call()
                .await
                .map(|r| SnapshotValue::Amount(r._0))
                .map_err(|e| call_error(query, e))?,
            SnapshotQuery::CreatorReserveSupply => coin
                .CREATOR_RESERVE_SUPPLY()
                .call()
                .await
                .map(|r| SnapshotValue::Amount(r._0))
                .map_err(|e| call_error(query, e))?,
            SnapshotQuery::BalanceOf(holder) => coin
                .balanceOf(holder)
                .call()
                .await
                .map(|r| SnapshotValue::Amount(r._0))
                .map_err(|e| call_error(query, e))?,
        };

        Ok(value)
    }
}

/// Fixed answers keyed by (instance, query); anything unset is unavailable.
///
/// Used for offline replays and tests.
#[derive(Default)]
pub struct StaticSnapshots {
    values: RwLock<HashMap<(Address, SnapshotQuery), SnapshotValue>>,
}

impl StaticSnapshots {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_amount(&self, instance: Address, query: SnapshotQuery, value: U256) {
        self.values
            .write()
            .insert((instance, query), SnapshotValue::Amount(value));
    }

    pub fn set_reserves(&self, instance: Address, reserves: Reserves) {
        self.values
            .write()
            .insert((instance, SnapshotQuery::Reserves), SnapshotValue::Reserves(reserves));
    }

    pub fn set_balance(&self, instance: Address, holder: Address, balance: U256) {
        self.set_amount(instance, SnapshotQuery::BalanceOf(holder), balance);
    }

    /// Make a query unavailable again.
    pub fn unset(&self, instance: Address, query: SnapshotQuery) {
        self.values.write().remove(&(instance, query));
    }
}

#[async_trait]
impl SnapshotFetcher for StaticSnapshots {
    async fn query(
        &self,
        instance: Address,
        query: SnapshotQuery,
    ) -> Result<SnapshotValue, SnapshotError> {
        self.values
            .read()
            .get(&(instance, query))
            .copied()
            .ok_or_else(|| SnapshotError::Unavailable(format!("{} on {:?}", query, instance)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unset_queries_default_to_zero() {
        let snapshots = StaticSnapshots::new();
        let token = Address::repeat_byte(0xaa);

        assert_eq!(amount(&snapshots, token, SnapshotQuery::MaxSupply).await, None);
        assert_eq!(
            amount_or_zero(&snapshots, token, SnapshotQuery::CurrentPrice).await,
            U256::ZERO
        );
        assert_eq!(reserves_or_default(&snapshots, token).await, Reserves::default());
    }

    #[tokio::test]
    async fn test_balance_is_per_holder() {
        let snapshots = StaticSnapshots::new();
        let token = Address::repeat_byte(0xaa);
        let holder = Address::repeat_byte(0x0c);
        snapshots.set_balance(token, holder, U256::from(42u64));

        assert_eq!(
            amount(&snapshots, token, SnapshotQuery::BalanceOf(holder)).await,
            Some(U256::from(42u64))
        );
        assert_eq!(
            amount(&snapshots, token, SnapshotQuery::BalanceOf(Address::ZERO)).await,
            None
        );

        snapshots.unset(token, SnapshotQuery::BalanceOf(holder));
        assert_eq!(
            amount(&snapshots, token, SnapshotQuery::BalanceOf(holder)).await,
            None
        );
    }

    #[tokio::test]
    async fn test_shape_mismatch_is_unavailable() {
        let snapshots = StaticSnapshots::new();
        let token = Address::repeat_byte(0xaa);
        snapshots.set_amount(token, SnapshotQuery::Reserves, U256::from(1u64));

        assert_eq!(reserves_or_default(&snapshots, token).await, Reserves::default());
    }
}
