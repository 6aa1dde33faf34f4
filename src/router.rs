//! Source registry and dispatch.
//!
//! Maps each tracked contract address to its family. Singleton contracts
//! come from configuration; coin instances are added when their creation
//! event has been committed. A payload is only handled when the emitting
//! address is registered for the payload's family.

use alloy::primitives::Address;
use alloy::rpc::types::Log;
use std::collections::HashMap;
use tracing::info;

use crate::error::{SourceError, StoreError};
use crate::events::{self, ChainEvent, EventPayload, SourceKind};
use crate::handlers::{HandlerContext, coin, config, dex, launcher, opus, protection};

#[derive(Debug, Clone, Default)]
pub struct Router {
    sources: HashMap<Address, SourceKind>,
}

impl Router {
    pub fn new(sources: impl IntoIterator<Item = (Address, SourceKind)>) -> Self {
        Self {
            sources: sources.into_iter().collect(),
        }
    }

    /// Begin tracking `address`. Returns false if it was already tracked.
    pub fn track(&mut self, address: Address, kind: SourceKind) -> bool {
        match self.sources.insert(address, kind) {
            Some(previous) if previous == kind => false,
            Some(previous) => {
                info!(address = ?address, from = %previous, to = %kind, "Source kind changed");
                true
            }
            None => {
                info!(address = ?address, kind = %kind, "Tracking new event source");
                true
            }
        }
    }

    pub fn source_kind(&self, address: &Address) -> Option<SourceKind> {
        self.sources.get(address).copied()
    }

    /// All tracked addresses, sorted for stable log filters.
    pub fn addresses(&self) -> Vec<Address> {
        let mut addresses: Vec<Address> = self.sources.keys().copied().collect();
        addresses.sort();
        addresses
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Decode a raw log using the ABI of the emitting address's family.
    pub fn decode(&self, log: &Log) -> Result<Option<ChainEvent>, SourceError> {
        match self.source_kind(&log.inner.address) {
            Some(kind) => events::decode_log(kind, log),
            None => Ok(None),
        }
    }

    pub fn accepts(&self, event: &ChainEvent) -> bool {
        self.source_kind(&event.address) == Some(event.payload.source_kind())
    }
}

/// Run the single handler registered for the event's payload.
pub async fn dispatch(ctx: &mut HandlerContext<'_>) -> Result<(), StoreError> {
    use EventPayload::*;

    let event = ctx.event;

    match &event.payload {
        TokenCreated {
            token,
            creator,
            name,
            symbol,
            creation_fee,
            timestamp,
        } => {
            launcher::token_created(ctx, *token, *creator, name, symbol, *creation_fee, *timestamp)
                .await
        }
        TokenGraduated { token, timestamp } => {
            launcher::token_graduated(ctx, *token, *timestamp).await
        }
        FeesWithdrawn {
            to,
            amount,
            timestamp,
        } => launcher::fees_withdrawn(ctx, *to, *amount, *timestamp).await,
        FeeReceived {
            from,
            amount,
            timestamp,
        } => launcher::fee_received(ctx, *from, *amount, *timestamp).await,
        LauncherPaused { timestamp } => launcher::set_paused(ctx, true, *timestamp).await,
        LauncherUnpaused { timestamp } => launcher::set_paused(ctx, false, *timestamp).await,
        MaxTokensPerCreatorUpdated { new_max } => {
            launcher::max_tokens_per_creator_updated(ctx, *new_max).await
        }
        LauncherOwnershipTransferred { new_owner } => {
            launcher::ownership_transferred(ctx, *new_owner).await
        }
        LauncherControllerUpdated { new_controller } => {
            launcher::controller_updated(ctx, *new_controller).await
        }

        Transfer { from, to, .. } => coin::transfer(ctx, *from, *to).await,
        TokenDeployed {
            token,
            max_supply,
            graduation_threshold,
        } => coin::token_deployed(ctx, *token, *max_supply, *graduation_threshold).await,
        TokensPurchased {
            buyer,
            usdc_amount,
            tokens_out,
            new_price,
            real_usdc_reserves,
            real_token_supply,
            timestamp,
        } => {
            coin::trade(
                ctx,
                coin::TradeFill {
                    trader: *buyer,
                    side: crate::models::TradeSide::Buy,
                    usdc_amount: *usdc_amount,
                    token_amount: *tokens_out,
                    price: *new_price,
                    real_usdc_reserves: *real_usdc_reserves,
                    real_token_supply: *real_token_supply,
                    timestamp: *timestamp,
                },
            )
            .await
        }
        TokensSold {
            seller,
            tokens_in,
            usdc_out,
            new_price,
            real_usdc_reserves,
            real_token_supply,
            timestamp,
        } => {
            coin::trade(
                ctx,
                coin::TradeFill {
                    trader: *seller,
                    side: crate::models::TradeSide::Sell,
                    usdc_amount: *usdc_out,
                    token_amount: *tokens_in,
                    price: *new_price,
                    real_usdc_reserves: *real_usdc_reserves,
                    real_token_supply: *real_token_supply,
                    timestamp: *timestamp,
                },
            )
            .await
        }
        Graduated {
            token,
            liquidity_usdc,
            liquidity_tokens,
            final_price,
            timestamp,
        } => {
            coin::graduated(
                ctx,
                *token,
                *liquidity_usdc,
                *liquidity_tokens,
                *final_price,
                *timestamp,
            )
            .await
        }
        PriceUpdate {
            price,
            usdc_reserves,
            token_supply,
            timestamp,
        } => coin::price_update(ctx, *price, *usdc_reserves, *token_supply, *timestamp).await,
        TradingPaused { timestamp } => coin::set_trading_paused(ctx, true, *timestamp).await,
        TradingUnpaused { timestamp } => coin::set_trading_paused(ctx, false, *timestamp).await,
        EmergencyWithdraw {
            to,
            amount,
            timestamp,
        } => coin::emergency_withdraw(ctx, *to, *amount, *timestamp).await,
        LiquiditySnapshot {
            usdc_supply,
            token_supply,
            liquidity,
            ..
        } => coin::liquidity_snapshot(ctx, *usdc_supply, *token_supply, *liquidity).await,
        CreatorReserveMinted { amount, .. } => coin::creator_reserve_minted(ctx, *amount).await,
        Approval {
            owner,
            spender,
            value,
        } => coin::approval(ctx, *owner, *spender, *value).await,

        BotDetected {
            token,
            user,
            reason,
            timestamp,
        } => protection::bot_detected(ctx, *token, *user, reason, *timestamp).await,
        AddressBlacklisted {
            token,
            user,
            blacklisted,
            timestamp,
        } => {
            protection::access_list_changed(
                ctx,
                *token,
                *user,
                crate::models::AccessList::Blacklist,
                *blacklisted,
                *timestamp,
            )
            .await
        }
        AddressWhitelisted {
            token,
            user,
            whitelisted,
            timestamp,
        } => {
            protection::access_list_changed(
                ctx,
                *token,
                *user,
                crate::models::AccessList::Whitelist,
                *whitelisted,
                *timestamp,
            )
            .await
        }
        CircuitBreakerTriggered {
            token,
            reason,
            duration,
            timestamp,
        } => {
            protection::circuit_breaker_triggered(ctx, *token, reason, *duration, *timestamp).await
        }
        CircuitBreakerReset { token, timestamp } => {
            protection::circuit_breaker_reset(ctx, *token, *timestamp).await
        }
        VolatilityWarning {
            token,
            move_count,
            timestamp,
        } => protection::volatility_warning(ctx, *token, *move_count, *timestamp).await,
        HighPriceImpact {
            token,
            trader,
            impact,
            timestamp,
        } => protection::high_price_impact(ctx, *token, *trader, *impact, *timestamp).await,
        WhaleIntentRegistered {
            token,
            trader,
            amount,
            is_buy,
            execute_after,
            timestamp,
        } => {
            protection::whale_intent_registered(
                ctx,
                *token,
                *trader,
                *amount,
                *is_buy,
                *execute_after,
                *timestamp,
            )
            .await
        }
        WhaleTradeExecuted { token, trader, .. } => {
            protection::whale_intent_resolved(ctx, *token, *trader, protection::Resolution::Executed)
                .await
        }
        WhaleIntentCancelled { token, trader, .. } => {
            protection::whale_intent_resolved(
                ctx,
                *token,
                *trader,
                protection::Resolution::Cancelled,
            )
            .await
        }

        LiquidityDeployed {
            token,
            pair,
            creator,
            token_amount,
            usdc_amount,
            liquidity,
            timestamp,
        } => {
            dex::liquidity_deployed(
                ctx,
                dex::Deployment {
                    token: *token,
                    pair: *pair,
                    creator: *creator,
                    token_amount: *token_amount,
                    usdc_amount: *usdc_amount,
                    liquidity: *liquidity,
                    timestamp: *timestamp,
                },
            )
            .await
        }
        DexPaused { timestamp } => dex::set_paused(ctx, true, *timestamp).await,
        DexUnpaused { timestamp } => dex::set_paused(ctx, false, *timestamp).await,
        DexConfigUpdated {
            new_config,
            timestamp,
        } => dex::config_updated(ctx, *new_config, *timestamp).await,

        SongCreated {
            token_id,
            artist,
            price,
            referral_pct,
        } => opus::song_created(ctx, *token_id, *artist, *price, *referral_pct).await,
        SongPurchased {
            token_id,
            buyer,
            referrer,
            price,
        } => opus::song_purchased(ctx, *token_id, *buyer, *referrer, *price).await,
        SongPriceUpdated {
            token_id,
            new_price,
        }
        | SongPriceScaled {
            token_id,
            new_price,
        } => opus::song_price_changed(ctx, *token_id, *new_price).await,
        SongReferralPctUpdated { token_id, new_pct } => {
            opus::song_referral_pct_updated(ctx, *token_id, *new_pct).await
        }
        RewardsDistributed {
            artist,
            referrer,
            artist_amount,
            referrer_amount,
            protocol_fee,
        } => {
            opus::rewards_distributed(
                ctx,
                *artist,
                *referrer,
                *artist_amount,
                *referrer_amount,
                *protocol_fee,
            )
            .await
        }
        RewardsClaimed { member_id, amount } => {
            opus::rewards_claimed(ctx, *member_id, *amount).await
        }
        ProtocolOwnershipTransferred { new_owner } => {
            opus::ownership_transferred(ctx, *new_owner).await
        }
        ProtocolFeeUpdated { new_fee } => opus::protocol_fee_updated(ctx, *new_fee).await,
        ProtocolControllerUpdated { new_controller } => {
            opus::controller_updated(ctx, *new_controller).await
        }
        MemberAddressUpdated {
            member_id,
            new_address,
        } => opus::member_address_updated(ctx, *member_id, *new_address).await,

        DefaultConfigUpdated {
            config_type,
            timestamp,
        } => config::default_config_updated(ctx, *config_type, *timestamp).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::{B256, U256};

    fn event(address: Address, payload: EventPayload) -> ChainEvent {
        ChainEvent {
            tx_hash: B256::repeat_byte(1),
            log_index: 0,
            block_number: 1,
            block_timestamp: 0,
            address,
            payload,
        }
    }

    #[test]
    fn test_accepts_only_registered_family() {
        let launcher = Address::repeat_byte(0x11);
        let coin = Address::repeat_byte(0xaa);
        let mut router = Router::new([(launcher, SourceKind::Launcher)]);

        let transfer = event(
            coin,
            EventPayload::Transfer {
                from: Address::ZERO,
                to: Address::repeat_byte(0x0d),
                value: U256::from(1u64),
            },
        );
        assert!(!router.accepts(&transfer));

        assert!(router.track(coin, SourceKind::Coin));
        assert!(!router.track(coin, SourceKind::Coin));
        assert!(router.accepts(&transfer));

        // A coin payload claimed by the launcher address is rejected
        let spoofed = event(
            launcher,
            EventPayload::Transfer {
                from: Address::ZERO,
                to: Address::ZERO,
                value: U256::ZERO,
            },
        );
        assert!(!router.accepts(&spoofed));
    }

    #[test]
    fn test_addresses_are_sorted() {
        let router = Router::new([
            (Address::repeat_byte(0x22), SourceKind::Dex),
            (Address::repeat_byte(0x11), SourceKind::Launcher),
        ]);
        assert_eq!(
            router.addresses(),
            vec![Address::repeat_byte(0x11), Address::repeat_byte(0x22)]
        );
        assert_eq!(router.len(), 2);
    }
}
