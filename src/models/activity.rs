//! Append-only activity records.
//!
//! All records are keyed by `txHash-logIndex` (see [`super::log_key`]) and
//! are never modified after their first write. Participant references are
//! participant keys and the participant is always saved earlier in the same
//! batch.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trade {
    pub id: String,
    pub asset: String,
    pub trader: String,
    pub side: TradeSide,
    pub usdc_amount: U256,
    pub token_amount: U256,
    pub price: U256,
    pub real_usdc_reserves: U256,
    pub real_token_supply: U256,
    pub timestamp: u64,
    pub tx_hash: B256,
    pub block_number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeReceipt {
    pub id: String,
    pub from: Address,
    pub amount: U256,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeWithdrawal {
    pub id: String,
    pub to: Address,
    pub amount: U256,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyWithdrawal {
    pub id: String,
    pub asset: String,
    pub to: Address,
    pub amount: U256,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Approval {
    pub id: String,
    pub asset: String,
    pub owner: String,
    pub spender: Address,
    pub value: U256,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotDetection {
    pub id: String,
    pub asset: String,
    pub participant: String,
    pub reason: String,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessList {
    Blacklist,
    Whitelist,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessListChange {
    pub id: String,
    pub asset: String,
    pub participant: String,
    pub list: AccessList,
    pub listed: bool,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtectionEventType {
    CircuitBreakerTriggered,
    CircuitBreakerReset,
    VolatilityWarning,
    HighPriceImpact,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProtectionEvent {
    pub id: String,
    pub asset: String,
    pub event_type: ProtectionEventType,
    pub reason: Option<String>,
    pub duration: Option<U256>,
    pub move_count: Option<U256>,
    pub trader: Option<Address>,
    pub impact: Option<U256>,
    pub timestamp: u64,
}

impl ProtectionEvent {
    pub fn new(id: String, asset: String, event_type: ProtectionEventType, timestamp: u64) -> Self {
        Self {
            id,
            asset,
            event_type,
            reason: None,
            duration: None,
            move_count: None,
            trader: None,
            impact: None,
            timestamp,
        }
    }
}

/// A reward claim. `artist`/`referrer` are set for each role of the
/// claiming member that was debited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub member: String,
    pub amount: U256,
    pub artist: Option<String>,
    pub referrer: Option<String>,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardDistribution {
    pub id: String,
    pub artist: String,
    pub referrer: Option<String>,
    pub artist_amount: U256,
    pub referrer_amount: U256,
    pub protocol_fee: U256,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongPurchase {
    pub id: String,
    pub song: String,
    pub buyer: String,
    pub referrer: Option<String>,
    pub price: U256,
    pub timestamp: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", content = "asset", rename_all = "lowercase")]
pub enum PauseSubject {
    Launcher,
    Dex,
    Asset(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PauseChange {
    pub id: String,
    pub subject: PauseSubject,
    pub paused: bool,
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfigScope {
    Dex,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigChange {
    pub id: String,
    pub scope: ConfigScope,
    pub new_config: Option<Address>,
    pub config_type: Option<u8>,
    pub timestamp: u64,
}
