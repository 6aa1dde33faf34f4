//! Live event sync job.
//!
//! Polls the chain for logs of every tracked source in fixed block windows
//! and feeds them through the engine in order. When an event registers a
//! new source, the window is restarted from that event's block so the new
//! address's logs in the same range are fetched too; already committed
//! events are skipped by the engine's cursor.

use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::engine::Engine;
use crate::error::IndexerError;
use crate::source::RpcLogSource;

pub struct EventSyncJob {
    engine: Engine,
    source: RpcLogSource,
    block_range: u64,
    poll_interval: Duration,
    next_block: u64,
}

impl EventSyncJob {
    pub fn new(
        engine: Engine,
        source: RpcLogSource,
        start_block: u64,
        block_range: u64,
        poll_interval: Duration,
    ) -> Self {
        let resume_block = engine
            .cursor()
            .position
            .map(|position| position.block_number)
            .unwrap_or(start_block);

        Self {
            engine,
            source,
            block_range: block_range.max(1),
            // tokio intervals panic on a zero period
            poll_interval: poll_interval.max(Duration::from_millis(1)),
            next_block: resume_block.max(start_block),
        }
    }

    /// Run until a shutdown signal is received.
    pub async fn run(mut self) {
        info!(
            next_block = self.next_block,
            block_range = self.block_range,
            poll_interval_secs = self.poll_interval.as_secs(),
            "Event sync job started"
        );

        let mut interval = interval(self.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received, stopping event sync job");
                    break;
                }
                _ = interval.tick() => {
                    if let Err(e) = self.sync_cycle().await {
                        error!(error = %e, next_block = self.next_block, "Event sync cycle failed");
                    }
                }
            }
        }

        let stats = self.engine.stats();
        info!(
            processed = stats.processed,
            duplicates = stats.duplicates,
            unrouted = stats.unrouted,
            referential_misses = stats.referential_misses,
            invariant_violations = stats.invariant_violations,
            "Event sync job stopped"
        );
    }

    /// Catch up to the current head. Stops at the first failed event; the
    /// next cycle retries from the same window.
    pub async fn sync_cycle(&mut self) -> Result<(), IndexerError> {
        let latest = self.source.latest_block().await?;

        while self.next_block <= latest {
            let from = self.next_block;
            let to = from.saturating_add(self.block_range - 1).min(latest);
            let events = self.source.fetch(self.engine.router(), from, to).await?;

            let mut restart_at = None;
            for event in &events {
                let Some(batch) = self.engine.process(event).await? else {
                    continue;
                };
                if !batch.registered.is_empty() {
                    restart_at = Some(event.block_number);
                    break;
                }
            }

            match restart_at {
                Some(block) => {
                    debug!(block = block, "New sources registered, refetching window");
                    self.next_block = block;
                }
                None => {
                    debug!(from_block = from, to_block = to, events = events.len(), "Window synced");
                    self.next_block = to + 1;
                }
            }
        }

        Ok(())
    }
}
