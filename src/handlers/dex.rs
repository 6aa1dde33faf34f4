//! DEX contract: liquidity deployment for graduated assets and DEX policy.

use alloy::primitives::{Address, U256};
use tracing::{debug, info};

use super::HandlerContext;
use crate::error::StoreError;
use crate::ledger;
use crate::models::{self, Asset, ConfigChange, ConfigScope, DexPair, PauseChange, PauseSubject};

#[derive(Debug, Clone, Copy)]
pub struct Deployment {
    pub token: Address,
    pub pair: Address,
    pub creator: Address,
    pub token_amount: U256,
    pub usdc_amount: U256,
    pub liquidity: U256,
    pub timestamp: u64,
}

/// The pair entity gates the DEX totals. A missing asset does not stop the
/// pair from being recorded; only the asset link is skipped.
pub async fn liquidity_deployed(
    ctx: &mut HandlerContext<'_>,
    deployment: Deployment,
) -> Result<(), StoreError> {
    let pair_key = models::address_key(&deployment.pair);
    if ctx.batch.exists::<DexPair>(&pair_key).await? {
        debug!(pair = %pair_key, "Pair already recorded");
        return Ok(());
    }

    let asset_key = models::address_key(&deployment.token);
    let tx_hash = ctx.event.tx_hash;

    let mut dex = ctx.dex().await?;
    dex.total_pairs += 1;
    ledger::add(&mut dex.total_usdc_locked, deployment.usdc_amount);
    ledger::add(&mut dex.total_tokens_locked, deployment.token_amount);
    ctx.batch.save(dex);

    match ctx.batch.load::<Asset>(&asset_key).await? {
        Some(mut asset) => {
            asset.dex_pair = Some(pair_key.clone());
            asset.dex_pair_address = Some(deployment.pair);
            asset.liquidity_deployed = true;
            asset.liquidity_deployment_tx = Some(tx_hash);
            ctx.batch.save(asset);
        }
        None => ctx.referential_miss("Asset", &asset_key),
    }

    info!(
        token = %asset_key,
        pair = %pair_key,
        usdc = %deployment.usdc_amount,
        tokens = %deployment.token_amount,
        "Liquidity deployed"
    );

    ctx.batch.save(DexPair {
        id: pair_key,
        asset: asset_key,
        creator: deployment.creator,
        pair_address: deployment.pair,
        token_amount: deployment.token_amount,
        usdc_amount: deployment.usdc_amount,
        liquidity_tokens: deployment.liquidity,
        deployed_at: deployment.timestamp,
        deployment_tx: tx_hash,
    });
    Ok(())
}

pub async fn set_paused(
    ctx: &mut HandlerContext<'_>,
    paused: bool,
    timestamp: u64,
) -> Result<(), StoreError> {
    let mut dex = ctx.dex().await?;
    dex.paused = paused;
    ctx.batch.save(dex);

    ctx.batch.save(PauseChange {
        id: ctx.record_id(),
        subject: PauseSubject::Dex,
        paused,
        timestamp,
    });
    Ok(())
}

pub async fn config_updated(
    ctx: &mut HandlerContext<'_>,
    new_config: Address,
    timestamp: u64,
) -> Result<(), StoreError> {
    let mut dex = ctx.dex().await?;
    dex.config = new_config;
    ctx.batch.save(dex);

    ctx.batch.save(ConfigChange {
        id: ctx.record_id(),
        scope: ConfigScope::Dex,
        new_config: Some(new_config),
        config_type: None,
        timestamp,
    });
    Ok(())
}
