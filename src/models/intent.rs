use alloy::primitives::U256;
use serde::{Deserialize, Serialize};

/// A declared large trade, keyed by `asset-trader`.
///
/// Registered with both flags false; `executed` and `cancelled` are terminal.
/// A second registration for the same pair replaces the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhaleIntent {
    pub id: String,
    pub asset: String,
    pub trader: String,
    pub amount: U256,
    pub is_buy: bool,
    pub execute_after: U256,
    pub timestamp: u64,
    pub executed: bool,
    pub cancelled: bool,
}

impl WhaleIntent {
    pub fn key_for(asset: &str, trader: &str) -> String {
        format!("{}-{}", asset, trader)
    }

    pub fn is_resolved(&self) -> bool {
        self.executed || self.cancelled
    }
}
