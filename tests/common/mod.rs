#![allow(dead_code)]

use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use carbon_indexer::engine::{ChangeBatch, Engine, EngineSettings};
use carbon_indexer::error::StoreError;
use carbon_indexer::events::{ChainEvent, EventPayload, SourceKind};
use carbon_indexer::models::{Entity, EntityKind};
use carbon_indexer::snapshot::{Reserves, SnapshotQuery, StaticSnapshots};
use carbon_indexer::store::{EntityKey, EntityStore, MemoryStore};

pub const BASE_TIMESTAMP: u64 = 1_700_000_000;

pub fn addr(byte: u8) -> Address {
    Address::repeat_byte(byte)
}

pub fn launcher() -> Address {
    addr(0x11)
}

pub fn protection() -> Address {
    addr(0x22)
}

pub fn dex() -> Address {
    addr(0x33)
}

pub fn opus() -> Address {
    addr(0x44)
}

pub fn config() -> Address {
    addr(0x55)
}

pub fn member(byte: u8) -> B256 {
    B256::repeat_byte(byte)
}

pub fn key(address: Address) -> String {
    format!("{:?}", address)
}

/// Memory store whose writes can be made to fail for one entity kind.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_on: Mutex<Option<EntityKind>>,
}

impl FlakyStore {
    pub fn fail_on(&self, kind: EntityKind) {
        *self.fail_on.lock() = Some(kind);
    }

    pub fn heal(&self) {
        *self.fail_on.lock() = None;
    }

    fn check(&self, entity: &Entity) -> Result<(), StoreError> {
        match *self.fail_on.lock() {
            Some(kind) if kind == entity.kind() => Err(StoreError::Unavailable(format!(
                "injected failure writing {}",
                kind
            ))),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl EntityStore for FlakyStore {
    async fn load(&self, key: &EntityKey) -> Result<Option<Entity>, StoreError> {
        self.inner.load(key).await
    }

    async fn save(&self, entity: &Entity) -> Result<(), StoreError> {
        self.check(entity)?;
        self.inner.save(entity).await
    }

    async fn save_all(&self, entities: &[Entity]) -> Result<(), StoreError> {
        for entity in entities {
            self.check(entity)?;
        }
        self.inner.save_all(entities).await
    }
}

pub struct Harness {
    pub store: Arc<FlakyStore>,
    pub snapshots: Arc<StaticSnapshots>,
    pub engine: Engine,
    next_block: u64,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_settings(EngineSettings::default()).await
    }

    pub async fn with_settings(settings: EngineSettings) -> Self {
        let store = Arc::new(FlakyStore::default());
        let snapshots = Arc::new(StaticSnapshots::new());
        let engine = open_engine(store.clone(), snapshots.clone(), settings).await;
        Self {
            store,
            snapshots,
            engine,
            next_block: 1,
        }
    }

    /// Reopen the engine over the same store, as after a restart.
    pub async fn restart(&mut self) {
        self.engine = open_engine(
            self.store.clone(),
            self.snapshots.clone(),
            EngineSettings::default(),
        )
        .await;
    }

    /// A new event at the next block.
    pub fn event(&mut self, address: Address, payload: EventPayload) -> ChainEvent {
        let block = self.next_block;
        self.next_block += 1;
        ChainEvent {
            tx_hash: B256::left_padding_from(&block.to_be_bytes()),
            log_index: 0,
            block_number: block,
            block_timestamp: BASE_TIMESTAMP + block,
            address,
            payload,
        }
    }

    pub async fn apply(&mut self, address: Address, payload: EventPayload) -> Option<ChangeBatch> {
        let event = self.event(address, payload);
        self.engine.process(&event).await.unwrap()
    }

    pub fn memory(&self) -> &MemoryStore {
        &self.store.inner
    }

    /// Seed the snapshot answers a coin contract gives at creation.
    pub fn seed_coin(&self, token: Address, max_supply: u64, creator_reserve: u64) {
        self.snapshots.set_reserves(
            token,
            Reserves {
                real_usdc: U256::from(0u64),
                real_tokens: U256::from(0u64),
                virtual_usdc: U256::from(30_000u64),
                virtual_tokens: U256::from(max_supply),
            },
        );
        self.snapshots
            .set_amount(token, SnapshotQuery::MaxSupply, U256::from(max_supply));
        self.snapshots.set_amount(
            token,
            SnapshotQuery::GraduationThreshold,
            U256::from(69_000u64),
        );
        self.snapshots.set_amount(
            token,
            SnapshotQuery::CreatorReserveSupply,
            U256::from(creator_reserve),
        );
        self.snapshots
            .set_amount(token, SnapshotQuery::CurrentPrice, U256::from(7u64));
    }

    pub async fn create_token(&mut self, token: Address, creator: Address) -> Option<ChangeBatch> {
        self.apply(launcher(), token_created(token, creator, 100)).await
    }

    pub fn set_balance(&self, token: Address, holder: Address, balance: u64) {
        self.snapshots
            .set_balance(token, holder, U256::from(balance));
    }
}

async fn open_engine(
    store: Arc<FlakyStore>,
    snapshots: Arc<StaticSnapshots>,
    settings: EngineSettings,
) -> Engine {
    Engine::open(
        store,
        snapshots,
        [
            (launcher(), SourceKind::Launcher),
            (protection(), SourceKind::Protection),
            (dex(), SourceKind::Dex),
            (opus(), SourceKind::Opus),
            (config(), SourceKind::Config),
        ],
        settings,
    )
    .await
    .unwrap()
}

pub fn token_created(token: Address, creator: Address, creation_fee: u64) -> EventPayload {
    EventPayload::TokenCreated {
        token,
        creator,
        name: "Carbon".to_string(),
        symbol: "CRB".to_string(),
        creation_fee: U256::from(creation_fee),
        timestamp: BASE_TIMESTAMP,
    }
}

pub fn transfer(from: Address, to: Address, value: u64) -> EventPayload {
    EventPayload::Transfer {
        from,
        to,
        value: U256::from(value),
    }
}
