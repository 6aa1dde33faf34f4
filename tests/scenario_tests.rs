mod common;

use alloy::primitives::{Address, I256, U256};
use pretty_assertions::assert_eq;

use carbon_indexer::engine::EngineSettings;
use carbon_indexer::events::{EventPayload, SourceKind};
use carbon_indexer::models::{
    Asset, DexPair, EntityKind, Holding, Launcher, Participant, Protocol, SINGLETON_KEY,
    WhaleIntent,
};

use crate::common::*;

#[tokio::test]
async fn test_creation_then_full_allocation_transfer_keeps_one_holder() {
    let mut h = Harness::new().await;
    let token = addr(0xaa);
    let creator = addr(0x0c);
    let receiver = addr(0x0d);
    h.seed_coin(token, 1_000_000, 200_000);

    let created = h.create_token(token, creator).await.unwrap();
    assert_eq!(created.registered, vec![(token, SourceKind::Coin)]);
    // The asset gates creation, so it is written last
    assert_eq!(created.changes.last().unwrap().entity_type, EntityKind::Asset);

    let asset = h.memory().get::<Asset>(&key(token)).unwrap();
    assert_eq!(asset.total_holders, 1);
    assert_eq!(asset.creator_allocation, U256::from(200_000u64));
    assert_eq!(asset.creation_fee, U256::from(100u64));
    assert_eq!(asset.max_supply, U256::from(1_000_000u64));
    assert_eq!(asset.price, U256::from(7u64));

    let creator_holding_key = Holding::key_for(&key(creator), &key(token));
    assert_eq!(
        h.memory().get::<Holding>(&creator_holding_key).unwrap().balance,
        U256::from(200_000u64)
    );

    let participant = h.memory().get::<Participant>(&key(creator)).unwrap();
    let role = participant.creator.unwrap();
    assert_eq!(role.total_fees_collected, U256::from(100u64));
    assert_eq!(role.tokens_created, 1);
    assert_eq!(role.created_at, BASE_TIMESTAMP);
    assert_eq!(
        h.memory().get::<Launcher>(SINGLETON_KEY).unwrap().total_tokens_created,
        1
    );

    // Chain state after the transfer
    h.set_balance(token, creator, 0);
    h.set_balance(token, receiver, 200_000);
    let batch = h
        .apply(token, transfer(creator, receiver, 200_000))
        .await
        .unwrap();

    let receiver_holding_key = Holding::key_for(&key(receiver), &key(token));
    let written: Vec<(EntityKind, String)> = batch
        .changes
        .iter()
        .map(|c| (c.entity_type, c.key.clone()))
        .collect();
    assert_eq!(
        written,
        vec![
            (EntityKind::Holding, creator_holding_key.clone()),
            (EntityKind::Participant, key(receiver)),
            (EntityKind::Holding, receiver_holding_key.clone()),
            (EntityKind::Asset, key(token)),
        ]
    );

    assert_eq!(
        h.memory().get::<Holding>(&creator_holding_key).unwrap().balance,
        U256::ZERO
    );
    assert_eq!(
        h.memory().get::<Holding>(&receiver_holding_key).unwrap().balance,
        U256::from(200_000u64)
    );
    assert_eq!(h.memory().get::<Asset>(&key(token)).unwrap().total_holders, 1);
}

#[tokio::test]
async fn test_creation_with_every_snapshot_failing() {
    let mut h = Harness::new().await;
    let token = addr(0xaa);

    h.create_token(token, addr(0x0c)).await.unwrap();

    let asset = h.memory().get::<Asset>(&key(token)).unwrap();
    assert_eq!(asset.id, key(token));
    assert_eq!(asset.name, "Carbon");
    assert_eq!(asset.symbol, "CRB");
    assert_eq!(asset.created_at, BASE_TIMESTAMP);
    assert!(!asset.graduated);
    assert!(!asset.trading_paused);
    assert!(!asset.circuit_breaker_active);
    for value in [
        asset.real_usdc_reserves,
        asset.real_token_supply,
        asset.virtual_usdc,
        asset.virtual_tokens,
        asset.price,
        asset.max_supply,
        asset.graduation_threshold,
        asset.creator_allocation,
    ] {
        assert_eq!(value, U256::ZERO);
    }
    assert_eq!(asset.total_holders, 0);
    assert_eq!(h.memory().count(EntityKind::Holding), 0);
    // The instance is still tracked
    assert_eq!(
        h.engine.router().source_kind(&token),
        Some(SourceKind::Coin)
    );
}

#[tokio::test]
async fn test_creator_allocation_falls_back_to_bps_of_max_supply() {
    let mut h = Harness::with_settings(EngineSettings {
        creator_allocation_bps: 500,
    })
    .await;
    let token = addr(0xaa);
    h.snapshots.set_amount(
        token,
        carbon_indexer::snapshot::SnapshotQuery::MaxSupply,
        U256::from(1_000_000u64),
    );

    h.create_token(token, addr(0x0c)).await.unwrap();

    let asset = h.memory().get::<Asset>(&key(token)).unwrap();
    assert_eq!(asset.creator_allocation, U256::from(50_000u64));
    assert_eq!(asset.total_holders, 1);
}

#[tokio::test]
async fn test_unknown_asset_is_skipped_without_error() {
    let mut h = Harness::new().await;
    let unknown = addr(0xee);

    let batch = h
        .apply(
            protection(),
            EventPayload::BotDetected {
                token: unknown,
                user: addr(0x0b),
                reason: "sandwich".to_string(),
                timestamp: BASE_TIMESTAMP,
            },
        )
        .await
        .unwrap();
    assert!(batch.changes.is_empty());

    h.apply(
        protection(),
        EventPayload::CircuitBreakerTriggered {
            token: unknown,
            reason: "volatility".to_string(),
            duration: U256::from(60u64),
            timestamp: BASE_TIMESTAMP,
        },
    )
    .await
    .unwrap();

    // Only the cursor is stored
    assert_eq!(h.memory().len(), 1);
    assert_eq!(h.engine.stats().referential_misses, 2);
    assert_eq!(h.engine.stats().processed, 2);
}

#[tokio::test]
async fn test_liquidity_for_unknown_asset_still_records_pair() {
    let mut h = Harness::new().await;
    let pair = addr(0x9a);

    h.apply(
        dex(),
        EventPayload::LiquidityDeployed {
            token: addr(0xee),
            pair,
            creator: addr(0x0c),
            token_amount: U256::from(800u64),
            usdc_amount: U256::from(69_000u64),
            liquidity: U256::from(1_000u64),
            timestamp: BASE_TIMESTAMP,
        },
    )
    .await
    .unwrap();

    assert!(h.memory().get::<DexPair>(&key(pair)).is_some());
    assert_eq!(h.memory().count(EntityKind::Asset), 0);
    assert_eq!(h.engine.stats().referential_misses, 1);
}

#[tokio::test]
async fn test_events_before_creation_are_not_routed() {
    let mut h = Harness::new().await;
    let token = addr(0xaa);
    let holder = addr(0x0d);
    h.set_balance(token, holder, 10);

    assert!(h.apply(token, transfer(Address::ZERO, holder, 10)).await.is_none());
    assert_eq!(h.engine.stats().unrouted, 1);

    h.create_token(token, addr(0x0c)).await.unwrap();
    assert!(h.apply(token, transfer(Address::ZERO, holder, 10)).await.is_some());
    assert_eq!(h.memory().get::<Asset>(&key(token)).unwrap().total_holders, 1);

    // A coin payload from a singleton source is rejected
    assert!(h.apply(launcher(), transfer(Address::ZERO, holder, 1)).await.is_none());
    assert_eq!(h.engine.stats().unrouted, 2);
}

#[tokio::test]
async fn test_tracked_coins_survive_restart() {
    let mut h = Harness::new().await;
    let token = addr(0xaa);
    h.create_token(token, addr(0x0c)).await.unwrap();

    h.restart().await;
    assert_eq!(h.engine.router().source_kind(&token), Some(SourceKind::Coin));
    assert_eq!(h.engine.cursor().tracked_coins, vec![token]);
}

fn register_intent(token: Address, trader: Address, amount: u64) -> EventPayload {
    EventPayload::WhaleIntentRegistered {
        token,
        trader,
        amount: U256::from(amount),
        is_buy: true,
        execute_after: U256::from(BASE_TIMESTAMP + 300),
        timestamp: BASE_TIMESTAMP,
    }
}

#[tokio::test]
async fn test_intent_lifecycle() {
    let mut h = Harness::new().await;
    let token = addr(0xaa);
    let trader = addr(0x0f);
    h.create_token(token, addr(0x0c)).await.unwrap();
    let intent_key = WhaleIntent::key_for(&key(token), &key(trader));

    h.apply(protection(), register_intent(token, trader, 5_000)).await;
    h.apply(
        protection(),
        EventPayload::WhaleTradeExecuted {
            token,
            trader,
            amount: U256::from(5_000u64),
            timestamp: BASE_TIMESTAMP + 400,
        },
    )
    .await;
    let intent = h.memory().get::<WhaleIntent>(&intent_key).unwrap();
    assert!(intent.executed);
    assert!(!intent.cancelled);

    // A new registration replaces the resolved one
    h.apply(protection(), register_intent(token, trader, 7_000)).await;
    h.apply(
        protection(),
        EventPayload::WhaleIntentCancelled {
            token,
            trader,
            timestamp: BASE_TIMESTAMP + 500,
        },
    )
    .await;
    let intent = h.memory().get::<WhaleIntent>(&intent_key).unwrap();
    assert_eq!(intent.amount, U256::from(7_000u64));
    assert!(intent.cancelled);
    assert!(!intent.executed);

    // Resolving an intent that was never registered changes nothing
    let before = h.memory().len();
    let batch = h
        .apply(
            protection(),
            EventPayload::WhaleIntentCancelled {
                token,
                trader: addr(0x01),
                timestamp: BASE_TIMESTAMP + 600,
            },
        )
        .await
        .unwrap();
    assert!(batch.changes.is_empty());
    assert_eq!(h.memory().len(), before);
}

fn distribute(artist: u8, amount: u64) -> EventPayload {
    EventPayload::RewardsDistributed {
        artist: member(artist),
        referrer: member(0),
        artist_amount: U256::from(amount),
        referrer_amount: U256::from(3u64),
        protocol_fee: U256::from(5u64),
    }
}

#[tokio::test]
async fn test_rewards_accrue_and_claim() {
    let mut h = Harness::new().await;
    let artist_key = format!("{:?}", member(0x0a));

    h.apply(opus(), distribute(0x0a, 50)).await;
    h.apply(opus(), distribute(0x0a, 50)).await;
    h.apply(
        opus(),
        EventPayload::RewardsClaimed {
            member_id: member(0x0a),
            amount: U256::from(70u64),
        },
    )
    .await;

    let artist = h.memory().get::<Participant>(&artist_key).unwrap();
    assert_eq!(
        artist.artist.unwrap().rewards,
        I256::try_from(30i64).unwrap()
    );
    // No referrer role is materialized for the zero member
    assert!(
        h.memory()
            .get::<Participant>(&format!("{:?}", member(0)))
            .is_none()
    );

    let protocol = h.memory().get::<Protocol>(SINGLETON_KEY).unwrap();
    // Referrer amounts only count when a referrer was credited
    assert_eq!(protocol.total_rewards_distributed, U256::from(100u64));
    assert_eq!(protocol.total_rewards_claimed, U256::from(70u64));
    assert_eq!(protocol.total_protocol_fees, U256::from(10u64));
    assert_eq!(h.engine.stats().invariant_violations, 0);
}

#[tokio::test]
async fn test_overdrawn_claim_goes_negative_and_is_counted() {
    let mut h = Harness::new().await;
    let artist_key = format!("{:?}", member(0x0a));

    h.apply(opus(), distribute(0x0a, 10)).await;
    h.apply(
        opus(),
        EventPayload::RewardsClaimed {
            member_id: member(0x0a),
            amount: U256::from(25u64),
        },
    )
    .await;

    let artist = h.memory().get::<Participant>(&artist_key).unwrap();
    assert_eq!(
        artist.artist.unwrap().rewards,
        I256::try_from(-15i64).unwrap()
    );
    assert_eq!(h.engine.stats().invariant_violations, 1);

    // A member that never accrued anything
    h.apply(
        opus(),
        EventPayload::RewardsClaimed {
            member_id: member(0x0b),
            amount: U256::from(1u64),
        },
    )
    .await;
    assert_eq!(h.engine.stats().invariant_violations, 2);
}

#[tokio::test]
async fn test_song_purchase_with_referrer() {
    let mut h = Harness::new().await;
    let token_id = U256::from(42u64);

    h.apply(
        opus(),
        EventPayload::SongPurchased {
            token_id,
            buyer: member(0x0b),
            referrer: member(0x0e),
            price: U256::from(10u64),
        },
    )
    .await;
    assert_eq!(h.engine.stats().referential_misses, 1);

    h.apply(
        opus(),
        EventPayload::SongCreated {
            token_id,
            artist: member(0x0a),
            price: U256::from(10u64),
            referral_pct: U256::from(5u64),
        },
    )
    .await;
    let batch = h
        .apply(
            opus(),
            EventPayload::SongPurchased {
                token_id,
                buyer: member(0x0b),
                referrer: member(0x0e),
                price: U256::from(10u64),
            },
        )
        .await
        .unwrap();

    let kinds: Vec<EntityKind> = batch.changes.iter().map(|c| c.entity_type).collect();
    assert_eq!(
        kinds,
        vec![
            EntityKind::Participant,
            EntityKind::Participant,
            EntityKind::SongPurchase
        ]
    );
    let referrer = h
        .memory()
        .get::<Participant>(&format!("{:?}", member(0x0e)))
        .unwrap();
    assert!(referrer.referrer.is_some());
    assert!(referrer.buyer.is_none());
}
