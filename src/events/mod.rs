//! Typed chain events.
//!
//! [`ChainEvent`] is the unit the engine consumes: the log identity plus a
//! decoded [`EventPayload`]. Payloads are plain serde data so event streams
//! can be replayed from JSON lines as well as decoded from RPC logs.

use alloy::primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod abi;
pub mod decode;

pub use decode::decode_log;

/// Which contract family a tracked address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Launcher,
    /// Per-token instance, registered when the launcher creates it
    Coin,
    Protection,
    Dex,
    Opus,
    Config,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Launcher => "launcher",
            SourceKind::Coin => "coin",
            SourceKind::Protection => "protection",
            SourceKind::Dex => "dex",
            SourceKind::Opus => "opus",
            SourceKind::Config => "config",
        };
        f.write_str(name)
    }
}

/// Canonical position of a log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub block_number: u64,
    pub log_index: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainEvent {
    pub tx_hash: B256,
    pub log_index: u64,
    pub block_number: u64,
    pub block_timestamp: u64,
    /// Contract that emitted the log
    pub address: Address,
    pub payload: EventPayload,
}

impl ChainEvent {
    pub fn position(&self) -> Position {
        Position {
            block_number: self.block_number,
            log_index: self.log_index,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all_fields = "camelCase")]
pub enum EventPayload {
    // Launcher
    TokenCreated {
        token: Address,
        creator: Address,
        name: String,
        symbol: String,
        creation_fee: U256,
        timestamp: u64,
    },
    TokenGraduated {
        token: Address,
        timestamp: u64,
    },
    FeesWithdrawn {
        to: Address,
        amount: U256,
        timestamp: u64,
    },
    FeeReceived {
        from: Address,
        amount: U256,
        timestamp: u64,
    },
    LauncherPaused {
        timestamp: u64,
    },
    LauncherUnpaused {
        timestamp: u64,
    },
    MaxTokensPerCreatorUpdated {
        new_max: U256,
    },
    LauncherOwnershipTransferred {
        new_owner: Address,
    },
    LauncherControllerUpdated {
        new_controller: Address,
    },

    // Coin instance
    Transfer {
        from: Address,
        to: Address,
        value: U256,
    },
    TokenDeployed {
        token: Address,
        max_supply: U256,
        graduation_threshold: U256,
    },
    TokensPurchased {
        buyer: Address,
        usdc_amount: U256,
        tokens_out: U256,
        new_price: U256,
        real_usdc_reserves: U256,
        real_token_supply: U256,
        timestamp: u64,
    },
    TokensSold {
        seller: Address,
        tokens_in: U256,
        usdc_out: U256,
        new_price: U256,
        real_usdc_reserves: U256,
        real_token_supply: U256,
        timestamp: u64,
    },
    Graduated {
        token: Address,
        liquidity_usdc: U256,
        liquidity_tokens: U256,
        final_price: U256,
        timestamp: u64,
    },
    PriceUpdate {
        price: U256,
        usdc_reserves: U256,
        token_supply: U256,
        timestamp: u64,
    },
    TradingPaused {
        timestamp: u64,
    },
    TradingUnpaused {
        timestamp: u64,
    },
    EmergencyWithdraw {
        to: Address,
        amount: U256,
        timestamp: u64,
    },
    LiquiditySnapshot {
        usdc_supply: U256,
        token_supply: U256,
        liquidity: U256,
        timestamp: u64,
    },
    CreatorReserveMinted {
        creator: Address,
        amount: U256,
    },
    Approval {
        owner: Address,
        spender: Address,
        value: U256,
    },

    // Protection
    BotDetected {
        token: Address,
        user: Address,
        reason: String,
        timestamp: u64,
    },
    AddressBlacklisted {
        token: Address,
        user: Address,
        blacklisted: bool,
        timestamp: u64,
    },
    AddressWhitelisted {
        token: Address,
        user: Address,
        whitelisted: bool,
        timestamp: u64,
    },
    CircuitBreakerTriggered {
        token: Address,
        reason: String,
        duration: U256,
        timestamp: u64,
    },
    CircuitBreakerReset {
        token: Address,
        timestamp: u64,
    },
    VolatilityWarning {
        token: Address,
        move_count: U256,
        timestamp: u64,
    },
    HighPriceImpact {
        token: Address,
        trader: Address,
        impact: U256,
        timestamp: u64,
    },
    WhaleIntentRegistered {
        token: Address,
        trader: Address,
        amount: U256,
        is_buy: bool,
        execute_after: U256,
        timestamp: u64,
    },
    WhaleTradeExecuted {
        token: Address,
        trader: Address,
        amount: U256,
        timestamp: u64,
    },
    WhaleIntentCancelled {
        token: Address,
        trader: Address,
        timestamp: u64,
    },

    // Dex
    LiquidityDeployed {
        token: Address,
        pair: Address,
        creator: Address,
        token_amount: U256,
        usdc_amount: U256,
        liquidity: U256,
        timestamp: u64,
    },
    DexPaused {
        timestamp: u64,
    },
    DexUnpaused {
        timestamp: u64,
    },
    DexConfigUpdated {
        new_config: Address,
        timestamp: u64,
    },

    // Opus
    SongCreated {
        token_id: U256,
        artist: B256,
        price: U256,
        referral_pct: U256,
    },
    SongPurchased {
        token_id: U256,
        buyer: B256,
        referrer: B256,
        price: U256,
    },
    SongPriceUpdated {
        token_id: U256,
        new_price: U256,
    },
    SongPriceScaled {
        token_id: U256,
        new_price: U256,
    },
    SongReferralPctUpdated {
        token_id: U256,
        new_pct: U256,
    },
    RewardsDistributed {
        artist: B256,
        referrer: B256,
        artist_amount: U256,
        referrer_amount: U256,
        protocol_fee: U256,
    },
    RewardsClaimed {
        member_id: B256,
        amount: U256,
    },
    ProtocolOwnershipTransferred {
        new_owner: Address,
    },
    ProtocolFeeUpdated {
        new_fee: U256,
    },
    ProtocolControllerUpdated {
        new_controller: Address,
    },
    MemberAddressUpdated {
        member_id: B256,
        new_address: Address,
    },

    // Config
    DefaultConfigUpdated {
        config_type: u8,
        timestamp: u64,
    },
}

impl EventPayload {
    /// The contract family allowed to emit this payload.
    pub fn source_kind(&self) -> SourceKind {
        use EventPayload::*;
        match self {
            TokenCreated { .. }
            | TokenGraduated { .. }
            | FeesWithdrawn { .. }
            | FeeReceived { .. }
            | LauncherPaused { .. }
            | LauncherUnpaused { .. }
            | MaxTokensPerCreatorUpdated { .. }
            | LauncherOwnershipTransferred { .. }
            | LauncherControllerUpdated { .. } => SourceKind::Launcher,

            Transfer { .. }
            | TokenDeployed { .. }
            | TokensPurchased { .. }
            | TokensSold { .. }
            | Graduated { .. }
            | PriceUpdate { .. }
            | TradingPaused { .. }
            | TradingUnpaused { .. }
            | EmergencyWithdraw { .. }
            | LiquiditySnapshot { .. }
            | CreatorReserveMinted { .. }
            | Approval { .. } => SourceKind::Coin,

            BotDetected { .. }
            | AddressBlacklisted { .. }
            | AddressWhitelisted { .. }
            | CircuitBreakerTriggered { .. }
            | CircuitBreakerReset { .. }
            | VolatilityWarning { .. }
            | HighPriceImpact { .. }
            | WhaleIntentRegistered { .. }
            | WhaleTradeExecuted { .. }
            | WhaleIntentCancelled { .. } => SourceKind::Protection,

            LiquidityDeployed { .. }
            | DexPaused { .. }
            | DexUnpaused { .. }
            | DexConfigUpdated { .. } => SourceKind::Dex,

            SongCreated { .. }
            | SongPurchased { .. }
            | SongPriceUpdated { .. }
            | SongPriceScaled { .. }
            | SongReferralPctUpdated { .. }
            | RewardsDistributed { .. }
            | RewardsClaimed { .. }
            | ProtocolOwnershipTransferred { .. }
            | ProtocolFeeUpdated { .. }
            | ProtocolControllerUpdated { .. }
            | MemberAddressUpdated { .. } => SourceKind::Opus,

            DefaultConfigUpdated { .. } => SourceKind::Config,
        }
    }

    /// Variant name, used in logs.
    pub fn name(&self) -> &'static str {
        use EventPayload::*;
        match self {
            TokenCreated { .. } => "TokenCreated",
            TokenGraduated { .. } => "TokenGraduated",
            FeesWithdrawn { .. } => "FeesWithdrawn",
            FeeReceived { .. } => "FeeReceived",
            LauncherPaused { .. } => "LauncherPaused",
            LauncherUnpaused { .. } => "LauncherUnpaused",
            MaxTokensPerCreatorUpdated { .. } => "MaxTokensPerCreatorUpdated",
            LauncherOwnershipTransferred { .. } => "LauncherOwnershipTransferred",
            LauncherControllerUpdated { .. } => "LauncherControllerUpdated",
            Transfer { .. } => "Transfer",
            TokenDeployed { .. } => "TokenDeployed",
            TokensPurchased { .. } => "TokensPurchased",
            TokensSold { .. } => "TokensSold",
            Graduated { .. } => "Graduated",
            PriceUpdate { .. } => "PriceUpdate",
            TradingPaused { .. } => "TradingPaused",
            TradingUnpaused { .. } => "TradingUnpaused",
            EmergencyWithdraw { .. } => "EmergencyWithdraw",
            LiquiditySnapshot { .. } => "LiquiditySnapshot",
            CreatorReserveMinted { .. } => "CreatorReserveMinted",
            Approval { .. } => "Approval",
            BotDetected { .. } => "BotDetected",
            AddressBlacklisted { .. } => "AddressBlacklisted",
            AddressWhitelisted { .. } => "AddressWhitelisted",
            CircuitBreakerTriggered { .. } => "CircuitBreakerTriggered",
            CircuitBreakerReset { .. } => "CircuitBreakerReset",
            VolatilityWarning { .. } => "VolatilityWarning",
            HighPriceImpact { .. } => "HighPriceImpact",
            WhaleIntentRegistered { .. } => "WhaleIntentRegistered",
            WhaleTradeExecuted { .. } => "WhaleTradeExecuted",
            WhaleIntentCancelled { .. } => "WhaleIntentCancelled",
            LiquidityDeployed { .. } => "LiquidityDeployed",
            DexPaused { .. } => "DexPaused",
            DexUnpaused { .. } => "DexUnpaused",
            DexConfigUpdated { .. } => "DexConfigUpdated",
            SongCreated { .. } => "SongCreated",
            SongPurchased { .. } => "SongPurchased",
            SongPriceUpdated { .. } => "SongPriceUpdated",
            SongPriceScaled { .. } => "SongPriceScaled",
            SongReferralPctUpdated { .. } => "SongReferralPctUpdated",
            RewardsDistributed { .. } => "RewardsDistributed",
            RewardsClaimed { .. } => "RewardsClaimed",
            ProtocolOwnershipTransferred { .. } => "ProtocolOwnershipTransferred",
            ProtocolFeeUpdated { .. } => "ProtocolFeeUpdated",
            ProtocolControllerUpdated { .. } => "ProtocolControllerUpdated",
            MemberAddressUpdated { .. } => "MemberAddressUpdated",
            DefaultConfigUpdated { .. } => "DefaultConfigUpdated",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_order_by_block_then_log_index() {
        let a = Position { block_number: 10, log_index: 5 };
        let b = Position { block_number: 10, log_index: 6 };
        let c = Position { block_number: 11, log_index: 0 };
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_payload_json_uses_kind_tag() {
        let payload = EventPayload::Transfer {
            from: Address::ZERO,
            to: Address::repeat_byte(0x0d),
            value: U256::from(5u64),
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "Transfer");

        let back: EventPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back, payload);
        assert_eq!(back.source_kind(), SourceKind::Coin);
    }

    #[test]
    fn test_creation_belongs_to_launcher() {
        let payload = EventPayload::TokenCreated {
            token: Address::repeat_byte(0xaa),
            creator: Address::repeat_byte(0x0c),
            name: "Carbon".into(),
            symbol: "CRB".into(),
            creation_fee: U256::from(100u64),
            timestamp: 1,
        };
        assert_eq!(payload.source_kind(), SourceKind::Launcher);
        assert_eq!(payload.name(), "TokenCreated");
    }
}
