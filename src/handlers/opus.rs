//! Opus contract: songs, purchases and the member reward ledger.
//!
//! Members are identified by a 32-byte id rather than an address; the
//! zero id means "no referrer".

use alloy::primitives::{Address, B256, U256};
use tracing::{debug, warn};

use super::HandlerContext;
use crate::error::StoreError;
use crate::ledger::{self, ClaimOutcome};
use crate::models::{self, Participant, Reward, RewardDistribution, Song, SongPurchase};

fn song_key(token_id: U256) -> String {
    token_id.to_string()
}

pub async fn song_created(
    ctx: &mut HandlerContext<'_>,
    token_id: U256,
    artist: B256,
    price: U256,
    referral_pct: U256,
) -> Result<(), StoreError> {
    let artist_key = models::member_key(&artist);
    let mut participant = ctx.participant(&artist_key).await?;
    participant.artist_role();
    ctx.batch.save(participant);

    ctx.batch.save(Song {
        id: song_key(token_id),
        artist: artist_key,
        price,
        referral_pct,
        created_at: ctx.event.block_timestamp,
    });
    Ok(())
}

pub async fn song_purchased(
    ctx: &mut HandlerContext<'_>,
    token_id: U256,
    buyer: B256,
    referrer: B256,
    price: U256,
) -> Result<(), StoreError> {
    let key = song_key(token_id);
    let Some(song) = ctx.batch.load::<Song>(&key).await? else {
        ctx.referential_miss("Song", &key);
        return Ok(());
    };

    let buyer_key = models::member_key(&buyer);
    let mut buyer = ctx.participant(&buyer_key).await?;
    buyer.buyer_role();
    ctx.batch.save(buyer);

    let referrer_key = if referrer.is_zero() {
        None
    } else {
        let referrer_key = models::member_key(&referrer);
        let mut participant = ctx.participant(&referrer_key).await?;
        participant.referrer_role();
        ctx.batch.save(participant);
        Some(referrer_key)
    };

    ctx.batch.save(SongPurchase {
        id: ctx.record_id(),
        song: song.id,
        buyer: buyer_key,
        referrer: referrer_key,
        price,
        timestamp: ctx.event.block_timestamp,
    });
    Ok(())
}

pub async fn song_price_changed(
    ctx: &mut HandlerContext<'_>,
    token_id: U256,
    new_price: U256,
) -> Result<(), StoreError> {
    let key = song_key(token_id);
    let Some(mut song) = ctx.batch.load::<Song>(&key).await? else {
        ctx.referential_miss("Song", &key);
        return Ok(());
    };
    song.price = new_price;
    ctx.batch.save(song);
    Ok(())
}

pub async fn song_referral_pct_updated(
    ctx: &mut HandlerContext<'_>,
    token_id: U256,
    new_pct: U256,
) -> Result<(), StoreError> {
    let key = song_key(token_id);
    let Some(mut song) = ctx.batch.load::<Song>(&key).await? else {
        ctx.referential_miss("Song", &key);
        return Ok(());
    };
    song.referral_pct = new_pct;
    ctx.batch.save(song);
    Ok(())
}

/// Credit the artist, and the referrer when there is one. The distributed
/// total counts only amounts actually credited to a member.
pub async fn rewards_distributed(
    ctx: &mut HandlerContext<'_>,
    artist: B256,
    referrer: B256,
    artist_amount: U256,
    referrer_amount: U256,
    protocol_fee: U256,
) -> Result<(), StoreError> {
    if ctx.already_recorded::<RewardDistribution>().await? {
        return Ok(());
    }

    let mut protocol = ctx.protocol().await?;

    let artist_key = models::member_key(&artist);
    let mut participant = ctx.participant(&artist_key).await?;
    ledger::accrue(&mut participant.artist_role().rewards, artist_amount);
    ctx.batch.save(participant);
    ledger::add(&mut protocol.total_rewards_distributed, artist_amount);

    let referrer_key = if referrer.is_zero() {
        None
    } else {
        let referrer_key = models::member_key(&referrer);
        let mut participant = ctx.participant(&referrer_key).await?;
        ledger::accrue(&mut participant.referrer_role().rewards, referrer_amount);
        ctx.batch.save(participant);
        ledger::add(&mut protocol.total_rewards_distributed, referrer_amount);
        Some(referrer_key)
    };

    ledger::add(&mut protocol.total_protocol_fees, protocol_fee);
    ctx.batch.save(protocol);

    ctx.batch.save(RewardDistribution {
        id: ctx.record_id(),
        artist: artist_key,
        referrer: referrer_key,
        artist_amount,
        referrer_amount,
        protocol_fee,
        timestamp: ctx.event.block_timestamp,
    });
    Ok(())
}

/// Debit every reward role the member holds. Balances may go negative; each
/// overdraw is logged and counted.
pub async fn rewards_claimed(
    ctx: &mut HandlerContext<'_>,
    member_id: B256,
    amount: U256,
) -> Result<(), StoreError> {
    if ctx.already_recorded::<Reward>().await? {
        return Ok(());
    }

    let member_key = models::member_key(&member_id);
    let mut participant = ctx.participant(&member_key).await?;

    let mut reward = Reward {
        id: ctx.record_id(),
        member: member_key.clone(),
        amount,
        artist: None,
        referrer: None,
        timestamp: ctx.event.block_timestamp,
    };

    let mut overdrawn = Vec::new();
    if let Some(role) = participant.artist.as_mut() {
        if let ClaimOutcome::Overdrawn { shortfall } = ledger::claim(&mut role.rewards, amount) {
            overdrawn.push(("artist", shortfall));
        }
        reward.artist = Some(member_key.clone());
    }
    if let Some(role) = participant.referrer.as_mut() {
        if let ClaimOutcome::Overdrawn { shortfall } = ledger::claim(&mut role.rewards, amount) {
            overdrawn.push(("referrer", shortfall));
        }
        reward.referrer = Some(member_key.clone());
    }

    if reward.artist.is_none() && reward.referrer.is_none() {
        warn!(member = %member_key, amount = %amount, "Reward claim by a member with no accrued rewards");
        ctx.invariant_violation();
    }
    for (role, shortfall) in overdrawn {
        warn!(
            member = %member_key,
            role = role,
            amount = %amount,
            shortfall = %shortfall,
            "Reward claim exceeds accrued balance"
        );
        ctx.invariant_violation();
    }

    let mut protocol = ctx.protocol().await?;
    ledger::add(&mut protocol.total_rewards_claimed, amount);

    ctx.batch.save(participant);
    ctx.batch.save(protocol);
    ctx.batch.save(reward);
    Ok(())
}

pub async fn ownership_transferred(
    ctx: &mut HandlerContext<'_>,
    new_owner: Address,
) -> Result<(), StoreError> {
    let mut protocol = ctx.protocol().await?;
    protocol.owner = new_owner;
    ctx.batch.save(protocol);
    Ok(())
}

pub async fn protocol_fee_updated(
    ctx: &mut HandlerContext<'_>,
    new_fee: U256,
) -> Result<(), StoreError> {
    let mut protocol = ctx.protocol().await?;
    protocol.protocol_fee = new_fee;
    ctx.batch.save(protocol);
    Ok(())
}

pub async fn controller_updated(
    ctx: &mut HandlerContext<'_>,
    new_controller: Address,
) -> Result<(), StoreError> {
    let mut protocol = ctx.protocol().await?;
    protocol.controller = new_controller;
    ctx.batch.save(protocol);
    Ok(())
}

/// Update the address on whichever member roles already exist.
pub async fn member_address_updated(
    ctx: &mut HandlerContext<'_>,
    member_id: B256,
    new_address: Address,
) -> Result<(), StoreError> {
    let member_key = models::member_key(&member_id);
    let Some(mut participant) = ctx.batch.load::<Participant>(&member_key).await? else {
        debug!(member = %member_key, "Address update for unknown member");
        return Ok(());
    };

    if let Some(role) = participant.artist.as_mut() {
        role.address = new_address;
    }
    if let Some(role) = participant.buyer.as_mut() {
        role.address = new_address;
    }
    if let Some(role) = participant.referrer.as_mut() {
        role.address = new_address;
    }
    ctx.batch.save(participant);
    Ok(())
}
