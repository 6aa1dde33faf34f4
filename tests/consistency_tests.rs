mod common;

use alloy::primitives::{Address, U256};
use pretty_assertions::assert_eq;
use std::collections::HashMap;
use std::sync::Arc;

use carbon_indexer::engine::{Engine, EngineSettings};
use carbon_indexer::events::{ChainEvent, EventPayload, SourceKind};
use carbon_indexer::models::{
    Asset, Cursor, EntityKind, Holding, Launcher, Participant, Protocol, Record, SINGLETON_KEY,
};
use carbon_indexer::snapshot::StaticSnapshots;
use carbon_indexer::store::{EntityStore, MemoryStore};

use crate::common::*;

fn holders_in_store(h: &Harness, token: Address) -> u64 {
    h.memory()
        .all::<Holding>()
        .into_iter()
        .filter(|holding| holding.asset == key(token) && !holding.balance.is_zero())
        .count() as u64
}

#[tokio::test]
async fn test_duplicate_delivery_is_skipped() {
    let mut h = Harness::new().await;
    let event = h.event(launcher(), token_created(addr(0xaa), addr(0x0c), 100));

    assert!(h.engine.process(&event).await.unwrap().is_some());
    assert!(h.engine.process(&event).await.unwrap().is_none());

    assert_eq!(h.engine.stats().processed, 1);
    assert_eq!(h.engine.stats().duplicates, 1);
    assert_eq!(
        h.memory().get::<Launcher>(SINGLETON_KEY).unwrap().total_tokens_created,
        1
    );
}

/// The events of a short session: creation, transfers, fees and rewards.
fn session(h: &mut Harness) -> Vec<ChainEvent> {
    let token = addr(0xaa);
    let creator = addr(0x0c);
    let holder = addr(0x0d);
    h.seed_coin(token, 1_000_000, 200_000);
    h.set_balance(token, creator, 150_000);
    h.set_balance(token, holder, 50_000);

    vec![
        h.event(launcher(), token_created(token, creator, 100)),
        h.event(token, transfer(creator, holder, 50_000)),
        h.event(
            launcher(),
            EventPayload::FeeReceived {
                from: creator,
                amount: U256::from(25u64),
                timestamp: BASE_TIMESTAMP,
            },
        ),
        h.event(
            opus(),
            EventPayload::RewardsDistributed {
                artist: member(0x0a),
                referrer: member(0x0e),
                artist_amount: U256::from(40u64),
                referrer_amount: U256::from(10u64),
                protocol_fee: U256::from(5u64),
            },
        ),
        h.event(
            opus(),
            EventPayload::RewardsClaimed {
                member_id: member(0x0a),
                amount: U256::from(15u64),
            },
        ),
    ]
}

#[tokio::test]
async fn test_replay_into_fresh_store_is_identical() {
    let mut first = Harness::new().await;
    let events = session(&mut first);
    for event in &events {
        first.engine.process(event).await.unwrap();
    }

    let mut second = Harness::new().await;
    session(&mut second);
    for event in &events {
        second.engine.process(event).await.unwrap();
    }

    assert_eq!(first.memory().snapshot(), second.memory().snapshot());
}

#[tokio::test]
async fn test_reprocessing_after_lost_cursor_does_not_double_count() {
    let mut h = Harness::new().await;
    let events = session(&mut h);
    for event in &events {
        h.engine.process(event).await.unwrap();
    }
    let before = h.memory().snapshot();

    // Forget the position but keep the tracked coins
    let rewound = Cursor {
        position: None,
        ..h.engine.cursor().clone()
    };
    h.store.inner.save(&rewound.into_entity()).await.unwrap();
    h.restart().await;

    for event in &events {
        assert!(h.engine.process(event).await.unwrap().is_some());
    }

    assert_eq!(h.memory().snapshot(), before);

    let launcher_totals = h.memory().get::<Launcher>(SINGLETON_KEY).unwrap();
    assert_eq!(launcher_totals.total_tokens_created, 1);
    assert_eq!(launcher_totals.total_fees_collected, U256::from(25u64));

    let protocol = h.memory().get::<Protocol>(SINGLETON_KEY).unwrap();
    assert_eq!(protocol.total_rewards_distributed, U256::from(50u64));
    assert_eq!(protocol.total_rewards_claimed, U256::from(15u64));
    assert_eq!(h.memory().get::<Asset>(&key(addr(0xaa))).unwrap().total_holders, 2);
}

#[tokio::test]
async fn test_holder_count_matches_nonzero_holdings() {
    let mut h = Harness::new().await;
    let token = addr(0xaa);
    let wallets: Vec<Address> = (1..=5).map(addr).collect();
    let mut balances: HashMap<Address, u64> = HashMap::new();

    h.create_token(token, wallets[0]).await.unwrap();

    let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move |bound: u64| {
        seed = seed
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        (seed >> 33) % bound
    };

    for step in 0..200 {
        let to = wallets[next(5) as usize];
        // Every fourth step mints, the rest move part of a sender's balance
        let from = if step % 4 == 0 {
            Address::ZERO
        } else {
            wallets[next(5) as usize]
        };

        let available = if from == Address::ZERO {
            1_000
        } else {
            balances.get(&from).copied().unwrap_or(0)
        };
        let amount = match next(3) {
            0 => available,
            _ => next(available + 1),
        };

        if from != Address::ZERO {
            *balances.entry(from).or_default() -= amount;
        }
        *balances.entry(to).or_default() += amount;
        for (wallet, balance) in &balances {
            h.set_balance(token, *wallet, *balance);
        }

        h.apply(token, transfer(from, to, amount)).await.unwrap();

        let asset = h.memory().get::<Asset>(&key(token)).unwrap();
        assert_eq!(asset.total_holders, holders_in_store(&h, token), "step {}", step);
        assert_eq!(
            asset.total_holders,
            balances.values().filter(|b| **b > 0).count() as u64,
            "step {}",
            step
        );
    }
    assert_eq!(h.engine.stats().invariant_violations, 0);
}

#[tokio::test]
async fn test_unavailable_balance_leaves_holding_untouched() {
    let mut h = Harness::new().await;
    let token = addr(0xaa);
    let creator = addr(0x0c);
    let holder = addr(0x0d);
    h.seed_coin(token, 1_000_000, 200_000);
    h.create_token(token, creator).await.unwrap();

    // Only the receiver's balance can be read
    h.set_balance(token, holder, 1_000);
    h.apply(token, transfer(creator, holder, 1_000)).await.unwrap();

    let creator_holding = h
        .memory()
        .get::<Holding>(&Holding::key_for(&key(creator), &key(token)))
        .unwrap();
    assert_eq!(creator_holding.balance, U256::from(200_000u64));
    assert_eq!(h.memory().get::<Asset>(&key(token)).unwrap().total_holders, 2);
    assert_eq!(holders_in_store(&h, token), 2);
}

#[tokio::test]
async fn test_store_failure_commits_nothing() {
    let mut h = Harness::new().await;
    let token = addr(0xaa);
    let creator = addr(0x0c);
    let holder = addr(0x0d);
    h.seed_coin(token, 1_000_000, 200_000);
    h.create_token(token, creator).await.unwrap();

    let before = h.memory().snapshot();
    let cursor = h.engine.cursor().clone();

    h.set_balance(token, creator, 0);
    h.set_balance(token, holder, 200_000);
    let event = h.event(token, transfer(creator, holder, 200_000));

    h.store.fail_on(EntityKind::Asset);
    assert!(h.engine.process(&event).await.is_err());
    assert_eq!(h.memory().snapshot(), before);
    assert_eq!(h.engine.cursor(), &cursor);
    assert_eq!(h.engine.stats().processed, 1);

    h.store.heal();
    let batch = h.engine.process(&event).await.unwrap().unwrap();
    assert_eq!(batch.changes.len(), 4);

    let asset = h.memory().get::<Asset>(&key(token)).unwrap();
    assert_eq!(asset.total_holders, 1);
    assert!(h.memory().get::<Participant>(&key(holder)).is_some());
    assert_eq!(h.engine.stats().invariant_violations, 0);
}

#[tokio::test]
async fn test_failed_creation_does_not_track_coin() {
    let mut h = Harness::new().await;
    let token = addr(0xaa);
    let event = h.event(launcher(), token_created(token, addr(0x0c), 100));

    h.store.fail_on(EntityKind::Asset);
    assert!(h.engine.process(&event).await.is_err());
    assert_eq!(h.engine.router().source_kind(&token), None);
    assert!(h.memory().is_empty());

    h.store.heal();
    let batch = h.engine.process(&event).await.unwrap().unwrap();
    assert_eq!(batch.registered, vec![(token, SourceKind::Coin)]);
    assert_eq!(h.engine.router().source_kind(&token), Some(SourceKind::Coin));
}

#[tokio::test]
async fn test_engine_reopens_on_plain_memory_store() {
    let store = Arc::new(MemoryStore::new());
    let snapshots = Arc::new(StaticSnapshots::new());
    let sources = [(launcher(), SourceKind::Launcher)];

    let mut engine = Engine::open(
        store.clone(),
        snapshots.clone(),
        sources,
        EngineSettings::default(),
    )
    .await
    .unwrap();
    let event = ChainEvent {
        tx_hash: Default::default(),
        log_index: 3,
        block_number: 10,
        block_timestamp: BASE_TIMESTAMP,
        address: launcher(),
        payload: token_created(addr(0xaa), addr(0x0c), 1),
    };
    engine.process(&event).await.unwrap();
    drop(engine);

    let mut engine = Engine::open(store, snapshots, sources, EngineSettings::default())
        .await
        .unwrap();
    assert!(engine.process(&event).await.unwrap().is_none());
    assert_eq!(
        engine.router().source_kind(&addr(0xaa)),
        Some(SourceKind::Coin)
    );
}
