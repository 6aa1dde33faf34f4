//! Per-token coin instance events.
//!
//! Balances are never accumulated from transfer amounts. A transfer
//! re-reads `balanceOf` for each side and compares it with the stored
//! holding; only a zero-crossing moves `totalHolders`. If the read fails
//! the holding and the counter are left as they were.

use alloy::primitives::{Address, U256};
use tracing::{debug, warn};

use super::HandlerContext;
use crate::error::StoreError;
use crate::ledger::{self, Crossing};
use crate::models::{
    self, Approval, Asset, EmergencyWithdrawal, Holding, PauseChange, PauseSubject, Trade,
    TradeSide,
};
use crate::snapshot::{self, SnapshotQuery};

/// Which side of a transfer a holding is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    From,
    To,
}

pub async fn transfer(
    ctx: &mut HandlerContext<'_>,
    from: Address,
    to: Address,
) -> Result<(), StoreError> {
    let instance = ctx.instance();
    let Some(mut asset) = ctx.require_asset(instance).await? else {
        return Ok(());
    };

    if from != Address::ZERO {
        reconcile(ctx, &mut asset, from, Side::From).await?;
    }
    if to != Address::ZERO {
        reconcile(ctx, &mut asset, to, Side::To).await?;
    }

    ctx.batch.save(asset);
    Ok(())
}

async fn reconcile(
    ctx: &mut HandlerContext<'_>,
    asset: &mut Asset,
    holder: Address,
    side: Side,
) -> Result<(), StoreError> {
    let holder_key = models::address_key(&holder);
    ctx.ensure_participant(&holder_key).await?;

    let holding_key = Holding::key_for(&holder_key, &asset.id);
    let mut holding = match ctx.batch.load::<Holding>(&holding_key).await? {
        Some(holding) => holding,
        // A sender without a holding was never observed receiving
        None if side == Side::From => return Ok(()),
        None => Holding::new(&holder_key, &asset.id),
    };

    let Some(balance) =
        snapshot::amount(ctx.snapshots, asset.address, SnapshotQuery::BalanceOf(holder)).await
    else {
        debug!(holding = %holding_key, "Balance unavailable, keeping stored balance");
        return Ok(());
    };

    let crossing = ledger::crossing(holding.balance, balance);
    holding.balance = balance;
    ctx.batch.save(holding);

    if crossing != Crossing::Unchanged {
        debug!(
            holding = %holding_key,
            crossing = ?crossing,
            total_holders = asset.total_holders,
            "Holder zero-crossing"
        );
    }
    if !ledger::apply_holder_crossing(asset, crossing) {
        ctx.invariant_violation();
    }
    Ok(())
}

pub async fn token_deployed(
    ctx: &mut HandlerContext<'_>,
    token: Address,
    max_supply: U256,
    graduation_threshold: U256,
) -> Result<(), StoreError> {
    let Some(mut asset) = ctx.require_asset(token).await? else {
        return Ok(());
    };
    asset.max_supply = max_supply;
    asset.graduation_threshold = graduation_threshold;
    ctx.batch.save(asset);
    Ok(())
}

/// One bonding-curve fill, buy or sell.
#[derive(Debug, Clone, Copy)]
pub struct TradeFill {
    pub trader: Address,
    pub side: TradeSide,
    pub usdc_amount: U256,
    pub token_amount: U256,
    pub price: U256,
    pub real_usdc_reserves: U256,
    pub real_token_supply: U256,
    pub timestamp: u64,
}

pub async fn trade(ctx: &mut HandlerContext<'_>, fill: TradeFill) -> Result<(), StoreError> {
    let instance = ctx.instance();
    let Some(mut asset) = ctx.require_asset(instance).await? else {
        return Ok(());
    };

    let trader_key = models::address_key(&fill.trader);
    ctx.ensure_participant(&trader_key).await?;

    asset.real_usdc_reserves = fill.real_usdc_reserves;
    asset.real_token_supply = fill.real_token_supply;
    asset.price = fill.price;

    let trade = Trade {
        id: ctx.record_id(),
        asset: asset.id.clone(),
        trader: trader_key,
        side: fill.side,
        usdc_amount: fill.usdc_amount,
        token_amount: fill.token_amount,
        price: fill.price,
        real_usdc_reserves: fill.real_usdc_reserves,
        real_token_supply: fill.real_token_supply,
        timestamp: fill.timestamp,
        tx_hash: ctx.event.tx_hash,
        block_number: ctx.event.block_number,
    };

    ctx.batch.save(asset);
    ctx.batch.save(trade);
    Ok(())
}

pub async fn graduated(
    ctx: &mut HandlerContext<'_>,
    token: Address,
    liquidity_usdc: U256,
    liquidity_tokens: U256,
    final_price: U256,
    timestamp: u64,
) -> Result<(), StoreError> {
    let Some(mut asset) = ctx.require_asset(token).await? else {
        return Ok(());
    };
    asset.graduated = true;
    asset.graduated_at = Some(timestamp);
    asset.liquidity_usdc = Some(liquidity_usdc);
    asset.liquidity_tokens = Some(liquidity_tokens);
    asset.price = final_price;
    ctx.batch.save(asset);
    Ok(())
}

pub async fn price_update(
    ctx: &mut HandlerContext<'_>,
    price: U256,
    usdc_reserves: U256,
    token_supply: U256,
    timestamp: u64,
) -> Result<(), StoreError> {
    let instance = ctx.instance();
    let Some(mut asset) = ctx.require_asset(instance).await? else {
        return Ok(());
    };
    asset.price = price;
    asset.real_usdc_reserves = usdc_reserves;
    asset.real_token_supply = token_supply;
    asset.last_price_update = timestamp;
    ctx.batch.save(asset);
    Ok(())
}

pub async fn set_trading_paused(
    ctx: &mut HandlerContext<'_>,
    paused: bool,
    timestamp: u64,
) -> Result<(), StoreError> {
    let instance = ctx.instance();
    let Some(mut asset) = ctx.require_asset(instance).await? else {
        return Ok(());
    };
    asset.trading_paused = paused;

    let change = PauseChange {
        id: ctx.record_id(),
        subject: PauseSubject::Asset(asset.id.clone()),
        paused,
        timestamp,
    };
    ctx.batch.save(asset);
    ctx.batch.save(change);
    Ok(())
}

pub async fn emergency_withdraw(
    ctx: &mut HandlerContext<'_>,
    to: Address,
    amount: U256,
    timestamp: u64,
) -> Result<(), StoreError> {
    let instance = ctx.instance();
    let Some(asset) = ctx.require_asset(instance).await? else {
        return Ok(());
    };

    warn!(token = %asset.id, to = ?to, amount = %amount, "Emergency withdrawal");
    ctx.batch.save(EmergencyWithdrawal {
        id: ctx.record_id(),
        asset: asset.id,
        to,
        amount,
        timestamp,
    });
    Ok(())
}

/// Only a snapshot with nonzero liquidity describes deployed liquidity.
pub async fn liquidity_snapshot(
    ctx: &mut HandlerContext<'_>,
    usdc_supply: U256,
    token_supply: U256,
    liquidity: U256,
) -> Result<(), StoreError> {
    let instance = ctx.instance();
    let Some(mut asset) = ctx.require_asset(instance).await? else {
        return Ok(());
    };
    if liquidity.is_zero() {
        return Ok(());
    }
    asset.liquidity_usdc = Some(usdc_supply);
    asset.liquidity_tokens = Some(token_supply);
    ctx.batch.save(asset);
    Ok(())
}

pub async fn creator_reserve_minted(
    ctx: &mut HandlerContext<'_>,
    amount: U256,
) -> Result<(), StoreError> {
    let instance = ctx.instance();
    let Some(mut asset) = ctx.require_asset(instance).await? else {
        return Ok(());
    };
    asset.creator_allocation = amount;
    ctx.batch.save(asset);
    Ok(())
}

pub async fn approval(
    ctx: &mut HandlerContext<'_>,
    owner: Address,
    spender: Address,
    value: U256,
) -> Result<(), StoreError> {
    let instance = ctx.instance();
    let Some(asset) = ctx.require_asset(instance).await? else {
        return Ok(());
    };

    let owner_key = models::address_key(&owner);
    ctx.ensure_participant(&owner_key).await?;

    ctx.batch.save(Approval {
        id: ctx.record_id(),
        asset: asset.id,
        owner: owner_key,
        spender,
        value,
        timestamp: ctx.event.block_timestamp,
    });
    Ok(())
}
