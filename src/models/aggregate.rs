//! Protocol-wide singletons, one row each under [`SINGLETON_KEY`].
//!
//! A singleton is materialized with zero totals the first time any handler
//! loads it (see `HandlerContext::launcher` and friends). Totals only move
//! by deltas that are justified by a newly written record.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

pub const SINGLETON_KEY: &str = "1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Launcher {
    pub id: String,
    pub owner: Address,
    pub controller: Address,
    pub max_tokens_per_creator: U256,
    pub paused: bool,
    pub total_fees_collected: U256,
    pub total_fees_withdrawn: U256,
    pub total_tokens_created: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dex {
    pub id: String,
    pub total_pairs: u64,
    pub total_usdc_locked: U256,
    pub total_tokens_locked: U256,
    pub paused: bool,
    pub config: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Protocol {
    pub id: String,
    pub total_rewards_claimed: U256,
    pub total_rewards_distributed: U256,
    /// Sum of protocol fees taken by reward distributions
    pub total_protocol_fees: U256,
    /// Current fee parameter
    pub protocol_fee: U256,
    pub owner: Address,
    pub controller: Address,
}

impl Default for Launcher {
    fn default() -> Self {
        Self {
            id: SINGLETON_KEY.to_string(),
            owner: Address::ZERO,
            controller: Address::ZERO,
            max_tokens_per_creator: U256::ZERO,
            paused: false,
            total_fees_collected: U256::ZERO,
            total_fees_withdrawn: U256::ZERO,
            total_tokens_created: 0,
        }
    }
}

impl Default for Dex {
    fn default() -> Self {
        Self {
            id: SINGLETON_KEY.to_string(),
            total_pairs: 0,
            total_usdc_locked: U256::ZERO,
            total_tokens_locked: U256::ZERO,
            paused: false,
            config: Address::ZERO,
        }
    }
}

impl Default for Protocol {
    fn default() -> Self {
        Self {
            id: SINGLETON_KEY.to_string(),
            total_rewards_claimed: U256::ZERO,
            total_rewards_distributed: U256::ZERO,
            total_protocol_fees: U256::ZERO,
            protocol_fee: U256::ZERO,
            owner: Address::ZERO,
            controller: Address::ZERO,
        }
    }
}
