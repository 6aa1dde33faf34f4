//! Sequential event processor.
//!
//! Events are applied one at a time in canonical order. Each event runs in
//! its own [`Batch`]; the cursor is saved last in that batch, so a crash
//! resumes after the last fully committed event. Sources discovered by a
//! handler are only routed to once the batch that created them committed.

use alloy::primitives::{Address, B256};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::error::{IndexerError, StoreError};
use crate::events::{ChainEvent, Position, SourceKind};
use crate::handlers::HandlerContext;
use crate::models::{Cursor, EntityKind, Record, SINGLETON_KEY};
use crate::router::{self, Router};
use crate::snapshot::SnapshotFetcher;
use crate::store::{Batch, EntityChange, EntityKey, EntityStore};

const CHANGE_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineSettings {
    /// Creator allocation in basis points of max supply, used when the
    /// contract's reserve supply cannot be read. Zero disables it.
    pub creator_allocation_bps: u16,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub processed: u64,
    /// At or before the committed cursor
    pub duplicates: u64,
    /// Emitted by an address not registered for the payload's family
    pub unrouted: u64,
    pub referential_misses: u64,
    pub invariant_violations: u64,
}

/// Every entity mutation made by one event, in commit order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeBatch {
    pub position: Position,
    pub tx_hash: B256,
    pub event: &'static str,
    pub changes: Vec<EntityChange>,
    /// Sources that became routable after this event
    pub registered: Vec<(Address, SourceKind)>,
}

pub struct Engine {
    store: Arc<dyn EntityStore>,
    snapshots: Arc<dyn SnapshotFetcher>,
    router: Router,
    cursor: Cursor,
    settings: EngineSettings,
    stats: EngineStats,
    changes: broadcast::Sender<Arc<ChangeBatch>>,
}

impl Engine {
    /// Restore the cursor and dynamically tracked coins from the store.
    pub async fn open(
        store: Arc<dyn EntityStore>,
        snapshots: Arc<dyn SnapshotFetcher>,
        sources: impl IntoIterator<Item = (Address, SourceKind)>,
        settings: EngineSettings,
    ) -> Result<Self, IndexerError> {
        let cursor = match store
            .load(&EntityKey::new(EntityKind::Cursor, SINGLETON_KEY))
            .await?
        {
            Some(entity) => {
                Cursor::from_entity(entity).map_err(|found| StoreError::KindMismatch {
                    key: SINGLETON_KEY.to_string(),
                    expected: EntityKind::Cursor,
                    found: found.kind(),
                })?
            }
            None => Cursor::default(),
        };

        let mut router = Router::new(sources);
        for coin in &cursor.tracked_coins {
            router.track(*coin, SourceKind::Coin);
        }

        info!(
            position = ?cursor.position,
            sources = router.len(),
            tracked_coins = cursor.tracked_coins.len(),
            "Engine opened"
        );

        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        Ok(Self {
            store,
            snapshots,
            router,
            cursor,
            settings,
            stats: EngineStats::default(),
            changes,
        })
    }

    /// Apply one event. Returns `None` when the event was skipped as a
    /// duplicate or unroutable delivery.
    ///
    /// A store error aborts the event: nothing after the failed write is
    /// committed, the cursor does not advance and the router is unchanged.
    pub async fn process(&mut self, event: &ChainEvent) -> Result<Option<ChangeBatch>, IndexerError> {
        let position = event.position();

        if self.cursor.covers(position) {
            debug!(
                block = position.block_number,
                log_index = position.log_index,
                event = event.payload.name(),
                "Skipping already committed event"
            );
            self.stats.duplicates += 1;
            return Ok(None);
        }

        if !self.router.accepts(event) {
            debug!(
                address = ?event.address,
                event = event.payload.name(),
                "No handler registered for event source"
            );
            self.stats.unrouted += 1;
            return Ok(None);
        }

        let mut ctx = HandlerContext::new(
            event,
            Batch::new(self.store.as_ref()),
            self.snapshots.as_ref(),
            &self.settings,
        );
        if let Err(e) = router::dispatch(&mut ctx).await {
            error!(
                block = position.block_number,
                log_index = position.log_index,
                event = event.payload.name(),
                error = %e,
                "Handler failed"
            );
            return Err(e.into());
        }
        let HandlerContext {
            mut batch, outcome, ..
        } = ctx;

        let mut cursor = self.cursor.clone();
        cursor.position = Some(position);
        let mut registered = Vec::new();
        for (address, kind) in outcome.new_sources {
            if self.router.source_kind(&address) != Some(kind) && !registered.contains(&(address, kind)) {
                registered.push((address, kind));
            }
            if kind == SourceKind::Coin && !cursor.tracked_coins.contains(&address) {
                cursor.tracked_coins.push(address);
            }
        }
        batch.save(cursor.clone());

        let changes = match batch.commit().await {
            Ok(changes) => changes,
            Err(e) => {
                error!(
                    block = position.block_number,
                    log_index = position.log_index,
                    event = event.payload.name(),
                    error = %e,
                    "Failed to commit event"
                );
                return Err(e.into());
            }
        };

        self.cursor = cursor;
        for (address, kind) in &registered {
            self.router.track(*address, *kind);
        }

        self.stats.processed += 1;
        self.stats.referential_misses += outcome.referential_misses;
        self.stats.invariant_violations += outcome.invariant_violations;

        let batch = ChangeBatch {
            position,
            tx_hash: event.tx_hash,
            event: event.payload.name(),
            changes: changes
                .into_iter()
                .filter(|change| change.entity_type != EntityKind::Cursor)
                .collect(),
            registered,
        };

        debug!(
            block = position.block_number,
            log_index = position.log_index,
            event = batch.event,
            changes = batch.changes.len(),
            "Event committed"
        );

        // No subscribers is not an error
        let _ = self.changes.send(Arc::new(batch.clone()));

        Ok(Some(batch))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<ChangeBatch>> {
        self.changes.subscribe()
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }
}
