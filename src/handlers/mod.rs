//! State reconstruction handlers, one module per event source family.
//!
//! Every handler reads through and writes into the event's [`Batch`]. A
//! handler that returns early on a missing entity leaves the batch with at
//! most a lazily created participant. Only store errors are returned.

use alloy::primitives::Address;
use tracing::{debug, warn};

use crate::engine::EngineSettings;
use crate::error::StoreError;
use crate::events::{ChainEvent, SourceKind};
use crate::models::{self, Asset, Dex, Launcher, Participant, Protocol, Record, SINGLETON_KEY};
use crate::snapshot::SnapshotFetcher;
use crate::store::Batch;

pub mod coin;
pub mod config;
pub mod dex;
pub mod launcher;
pub mod opus;
pub mod protection;

/// What a handler observed besides its entity writes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Sources to start tracking once the batch is committed
    pub new_sources: Vec<(Address, SourceKind)>,
    pub referential_misses: u64,
    pub invariant_violations: u64,
}

pub struct HandlerContext<'a> {
    pub event: &'a ChainEvent,
    pub batch: Batch<'a>,
    pub snapshots: &'a dyn SnapshotFetcher,
    pub settings: &'a EngineSettings,
    pub outcome: Outcome,
}

impl<'a> HandlerContext<'a> {
    pub fn new(
        event: &'a ChainEvent,
        batch: Batch<'a>,
        snapshots: &'a dyn SnapshotFetcher,
        settings: &'a EngineSettings,
    ) -> Self {
        Self {
            event,
            batch,
            snapshots,
            settings,
            outcome: Outcome::default(),
        }
    }

    /// Key for an activity record written by this event.
    pub fn record_id(&self) -> String {
        models::log_key(&self.event.tx_hash, self.event.log_index)
    }

    /// The contract instance that emitted the event.
    pub fn instance(&self) -> Address {
        self.event.address
    }

    pub fn track(&mut self, address: Address, kind: SourceKind) {
        self.outcome.new_sources.push((address, kind));
    }

    pub fn referential_miss(&mut self, entity: &'static str, key: &str) {
        warn!(
            event = self.event.payload.name(),
            tx = ?self.event.tx_hash,
            entity = entity,
            key = %key,
            "Referenced entity not found, skipping event"
        );
        self.outcome.referential_misses += 1;
    }

    pub fn invariant_violation(&mut self) {
        self.outcome.invariant_violations += 1;
    }

    /// Load the asset at `address`, recording a referential miss if absent.
    pub async fn require_asset(&mut self, address: Address) -> Result<Option<Asset>, StoreError> {
        let key = models::address_key(&address);
        let asset = self.batch.load::<Asset>(&key).await?;
        if asset.is_none() {
            self.referential_miss("Asset", &key);
        }
        Ok(asset)
    }

    /// Load a participant or materialize a fresh one. The caller saves it.
    pub async fn participant(&self, id: &str) -> Result<Participant, StoreError> {
        Ok(self
            .batch
            .load::<Participant>(id)
            .await?
            .unwrap_or_else(|| Participant::new(id, self.event.block_timestamp)))
    }

    /// Make sure a participant exists before a record references it.
    pub async fn ensure_participant(&mut self, id: &str) -> Result<(), StoreError> {
        if !self.batch.exists::<Participant>(id).await? {
            debug!(participant = %id, "Creating participant");
            self.batch.save(Participant::new(id, self.event.block_timestamp));
        }
        Ok(())
    }

    /// True if the record keyed by this event is already stored.
    pub async fn already_recorded<T: Record>(&self) -> Result<bool, StoreError> {
        let id = self.record_id();
        let seen = self.batch.exists::<T>(&id).await?;
        if seen {
            debug!(kind = %T::KIND, key = %id, "Record already written, skipping deltas");
        }
        Ok(seen)
    }

    async fn singleton<T: Record + Default>(&self) -> Result<T, StoreError> {
        Ok(self
            .batch
            .load::<T>(SINGLETON_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn launcher(&self) -> Result<Launcher, StoreError> {
        self.singleton::<Launcher>().await
    }

    pub async fn dex(&self) -> Result<Dex, StoreError> {
        self.singleton::<Dex>().await
    }

    pub async fn protocol(&self) -> Result<Protocol, StoreError> {
        self.singleton::<Protocol>().await
    }
}
