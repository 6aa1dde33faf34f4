//! Launcher contract: asset creation, fee flows and launcher policy.

use alloy::primitives::{Address, U256};
use tracing::{debug, info};

use super::HandlerContext;
use crate::error::StoreError;
use crate::events::SourceKind;
use crate::ledger;
use crate::models::{
    self, Asset, FeeReceipt, FeeWithdrawal, Holding, PauseChange, PauseSubject,
};
use crate::snapshot::{self, SnapshotQuery};

const BPS_DENOMINATOR: u64 = 10_000;

pub async fn token_created(
    ctx: &mut HandlerContext<'_>,
    token: Address,
    creator: Address,
    name: &str,
    symbol: &str,
    creation_fee: U256,
    timestamp: u64,
) -> Result<(), StoreError> {
    let asset_key = models::address_key(&token);

    // The asset itself gates every delta below
    if ctx.batch.exists::<Asset>(&asset_key).await? {
        debug!(token = %asset_key, "Asset already created");
        ctx.track(token, SourceKind::Coin);
        return Ok(());
    }

    let creator_key = models::address_key(&creator);
    let mut participant = ctx.participant(&creator_key).await?;
    let role = participant.creator_role();
    if role.created_at == 0 {
        role.created_at = timestamp;
    }
    ledger::add(&mut role.total_fees_collected, creation_fee);
    role.tokens_created += 1;

    let mut launcher = ctx.launcher().await?;
    launcher.total_tokens_created += 1;

    let mut asset = Asset::new(
        token,
        creator_key.clone(),
        name.to_string(),
        symbol.to_string(),
        timestamp,
    );
    asset.creation_fee = creation_fee;

    let fetcher = ctx.snapshots;
    let reserves = snapshot::reserves_or_default(fetcher, token).await;
    asset.real_usdc_reserves = reserves.real_usdc;
    asset.real_token_supply = reserves.real_tokens;
    asset.virtual_usdc = reserves.virtual_usdc;
    asset.virtual_tokens = reserves.virtual_tokens;
    asset.max_supply = snapshot::amount_or_zero(fetcher, token, SnapshotQuery::MaxSupply).await;
    asset.graduation_threshold =
        snapshot::amount_or_zero(fetcher, token, SnapshotQuery::GraduationThreshold).await;
    asset.creator_allocation =
        match snapshot::amount(fetcher, token, SnapshotQuery::CreatorReserveSupply).await {
            Some(allocation) => allocation,
            None => fallback_allocation(asset.max_supply, ctx.settings.creator_allocation_bps),
        };
    asset.price = snapshot::amount_or_zero(fetcher, token, SnapshotQuery::CurrentPrice).await;

    ctx.batch.save(participant);
    ctx.batch.save(launcher);

    if !asset.creator_allocation.is_zero() {
        let mut holding = Holding::new(&creator_key, &asset_key);
        holding.balance = asset.creator_allocation;
        ctx.batch.save(holding);
        asset.total_holders = 1;
    }

    info!(
        token = %asset_key,
        creator = %creator_key,
        symbol = %symbol,
        creator_allocation = %asset.creator_allocation,
        "Asset created"
    );

    ctx.batch.save(asset);
    ctx.track(token, SourceKind::Coin);
    Ok(())
}

/// Allocation as basis points of max supply, zero when disabled.
fn fallback_allocation(max_supply: U256, bps: u16) -> U256 {
    if bps == 0 {
        return U256::ZERO;
    }
    max_supply.saturating_mul(U256::from(bps)) / U256::from(BPS_DENOMINATOR)
}

pub async fn token_graduated(
    ctx: &mut HandlerContext<'_>,
    token: Address,
    timestamp: u64,
) -> Result<(), StoreError> {
    let Some(mut asset) = ctx.require_asset(token).await? else {
        return Ok(());
    };
    asset.graduated = true;
    asset.graduated_at = Some(timestamp);
    ctx.batch.save(asset);
    Ok(())
}

pub async fn fees_withdrawn(
    ctx: &mut HandlerContext<'_>,
    to: Address,
    amount: U256,
    timestamp: u64,
) -> Result<(), StoreError> {
    if ctx.already_recorded::<FeeWithdrawal>().await? {
        return Ok(());
    }

    let mut launcher = ctx.launcher().await?;
    ledger::add(&mut launcher.total_fees_withdrawn, amount);
    ctx.batch.save(launcher);

    ctx.batch.save(FeeWithdrawal {
        id: ctx.record_id(),
        to,
        amount,
        timestamp,
    });
    Ok(())
}

pub async fn fee_received(
    ctx: &mut HandlerContext<'_>,
    from: Address,
    amount: U256,
    timestamp: u64,
) -> Result<(), StoreError> {
    if ctx.already_recorded::<FeeReceipt>().await? {
        return Ok(());
    }

    let mut launcher = ctx.launcher().await?;
    ledger::add(&mut launcher.total_fees_collected, amount);
    ctx.batch.save(launcher);

    ctx.batch.save(FeeReceipt {
        id: ctx.record_id(),
        from,
        amount,
        timestamp,
    });
    Ok(())
}

pub async fn set_paused(
    ctx: &mut HandlerContext<'_>,
    paused: bool,
    timestamp: u64,
) -> Result<(), StoreError> {
    let mut launcher = ctx.launcher().await?;
    launcher.paused = paused;
    ctx.batch.save(launcher);

    ctx.batch.save(PauseChange {
        id: ctx.record_id(),
        subject: PauseSubject::Launcher,
        paused,
        timestamp,
    });
    Ok(())
}

pub async fn max_tokens_per_creator_updated(
    ctx: &mut HandlerContext<'_>,
    new_max: U256,
) -> Result<(), StoreError> {
    let mut launcher = ctx.launcher().await?;
    launcher.max_tokens_per_creator = new_max;
    ctx.batch.save(launcher);
    Ok(())
}

pub async fn ownership_transferred(
    ctx: &mut HandlerContext<'_>,
    new_owner: Address,
) -> Result<(), StoreError> {
    let mut launcher = ctx.launcher().await?;
    launcher.owner = new_owner;
    ctx.batch.save(launcher);
    Ok(())
}

pub async fn controller_updated(
    ctx: &mut HandlerContext<'_>,
    new_controller: Address,
) -> Result<(), StoreError> {
    let mut launcher = ctx.launcher().await?;
    launcher.controller = new_controller;
    ctx.batch.save(launcher);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_allocation() {
        let max_supply = U256::from(1_000_000u64);
        assert_eq!(fallback_allocation(max_supply, 0), U256::ZERO);
        assert_eq!(fallback_allocation(max_supply, 500), U256::from(50_000u64));
        assert_eq!(fallback_allocation(max_supply, 10_000), max_supply);
    }
}
