//! Protection contract: bot and access-list enforcement, circuit breakers
//! and the whale-intent lifecycle.

use alloy::primitives::{Address, U256};
use tracing::{debug, info};

use super::HandlerContext;
use crate::error::StoreError;
use crate::models::{
    self, AccessList, AccessListChange, BotDetection, ProtectionEvent, ProtectionEventType,
    WhaleIntent,
};

pub async fn bot_detected(
    ctx: &mut HandlerContext<'_>,
    token: Address,
    user: Address,
    reason: &str,
    timestamp: u64,
) -> Result<(), StoreError> {
    let Some(asset) = ctx.require_asset(token).await? else {
        return Ok(());
    };

    let participant = models::address_key(&user);
    ctx.ensure_participant(&participant).await?;

    ctx.batch.save(BotDetection {
        id: ctx.record_id(),
        asset: asset.id,
        participant,
        reason: reason.to_string(),
        timestamp,
    });
    Ok(())
}

pub async fn access_list_changed(
    ctx: &mut HandlerContext<'_>,
    token: Address,
    user: Address,
    list: AccessList,
    listed: bool,
    timestamp: u64,
) -> Result<(), StoreError> {
    let Some(asset) = ctx.require_asset(token).await? else {
        return Ok(());
    };

    let participant_key = models::address_key(&user);
    let mut participant = ctx.participant(&participant_key).await?;
    match list {
        AccessList::Blacklist => participant.blacklisted = listed,
        AccessList::Whitelist => participant.whitelisted = listed,
    }
    ctx.batch.save(participant);

    ctx.batch.save(AccessListChange {
        id: ctx.record_id(),
        asset: asset.id,
        participant: participant_key,
        list,
        listed,
        timestamp,
    });
    Ok(())
}

pub async fn circuit_breaker_triggered(
    ctx: &mut HandlerContext<'_>,
    token: Address,
    reason: &str,
    duration: U256,
    timestamp: u64,
) -> Result<(), StoreError> {
    let Some(mut asset) = ctx.require_asset(token).await? else {
        return Ok(());
    };

    info!(token = %asset.id, reason = %reason, duration = %duration, "Circuit breaker triggered");
    asset.circuit_breaker_active = true;
    asset.circuit_breaker_triggered_at = Some(timestamp);
    asset.circuit_breaker_duration = Some(duration);

    let mut record = ProtectionEvent::new(
        ctx.record_id(),
        asset.id.clone(),
        ProtectionEventType::CircuitBreakerTriggered,
        timestamp,
    );
    record.reason = Some(reason.to_string());
    record.duration = Some(duration);

    ctx.batch.save(asset);
    ctx.batch.save(record);
    Ok(())
}

pub async fn circuit_breaker_reset(
    ctx: &mut HandlerContext<'_>,
    token: Address,
    timestamp: u64,
) -> Result<(), StoreError> {
    let Some(mut asset) = ctx.require_asset(token).await? else {
        return Ok(());
    };
    asset.circuit_breaker_active = false;

    let record = ProtectionEvent::new(
        ctx.record_id(),
        asset.id.clone(),
        ProtectionEventType::CircuitBreakerReset,
        timestamp,
    );
    ctx.batch.save(asset);
    ctx.batch.save(record);
    Ok(())
}

pub async fn volatility_warning(
    ctx: &mut HandlerContext<'_>,
    token: Address,
    move_count: U256,
    timestamp: u64,
) -> Result<(), StoreError> {
    let Some(mut asset) = ctx.require_asset(token).await? else {
        return Ok(());
    };
    asset.volatility_move_count = move_count;

    let mut record = ProtectionEvent::new(
        ctx.record_id(),
        asset.id.clone(),
        ProtectionEventType::VolatilityWarning,
        timestamp,
    );
    record.move_count = Some(move_count);

    ctx.batch.save(asset);
    ctx.batch.save(record);
    Ok(())
}

pub async fn high_price_impact(
    ctx: &mut HandlerContext<'_>,
    token: Address,
    trader: Address,
    impact: U256,
    timestamp: u64,
) -> Result<(), StoreError> {
    let Some(asset) = ctx.require_asset(token).await? else {
        return Ok(());
    };

    let mut record = ProtectionEvent::new(
        ctx.record_id(),
        asset.id,
        ProtectionEventType::HighPriceImpact,
        timestamp,
    );
    record.trader = Some(trader);
    record.impact = Some(impact);
    ctx.batch.save(record);
    Ok(())
}

/// Replaces any earlier intent for the same (asset, trader), resolved or not.
pub async fn whale_intent_registered(
    ctx: &mut HandlerContext<'_>,
    token: Address,
    trader: Address,
    amount: U256,
    is_buy: bool,
    execute_after: U256,
    timestamp: u64,
) -> Result<(), StoreError> {
    let Some(asset) = ctx.require_asset(token).await? else {
        return Ok(());
    };

    let trader_key = models::address_key(&trader);
    ctx.ensure_participant(&trader_key).await?;

    let id = WhaleIntent::key_for(&asset.id, &trader_key);
    if let Some(previous) = ctx.batch.load::<WhaleIntent>(&id).await? {
        if !previous.is_resolved() {
            debug!(intent = %id, "Unresolved whale intent replaced by a new registration");
        }
    }

    ctx.batch.save(WhaleIntent {
        id,
        asset: asset.id,
        trader: trader_key,
        amount,
        is_buy,
        execute_after,
        timestamp,
        executed: false,
        cancelled: false,
    });
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Executed,
    Cancelled,
}

/// Set the terminal flag of a registered intent. Unknown intents are ignored.
pub async fn whale_intent_resolved(
    ctx: &mut HandlerContext<'_>,
    token: Address,
    trader: Address,
    resolution: Resolution,
) -> Result<(), StoreError> {
    let Some(asset) = ctx.require_asset(token).await? else {
        return Ok(());
    };

    let trader_key = models::address_key(&trader);
    let id = WhaleIntent::key_for(&asset.id, &trader_key);
    let Some(mut intent) = ctx.batch.load::<WhaleIntent>(&id).await? else {
        debug!(intent = %id, resolution = ?resolution, "No registered intent to resolve");
        return Ok(());
    };

    let flag = match resolution {
        Resolution::Executed => &mut intent.executed,
        Resolution::Cancelled => &mut intent.cancelled,
    };
    if *flag {
        return Ok(());
    }
    *flag = true;
    ctx.batch.save(intent);
    Ok(())
}
