//! `eth_getLogs` polling source.
//!
//! Fetches the logs of every tracked address for a block window and returns
//! them decoded, in canonical (block, log index) order. Nodes that leave
//! `blockTimestamp` out of log results get it filled from the block header,
//! fetched once per block.

use alloy::{
    eips::BlockNumberOrTag,
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::{BlockTransactionsKind, Filter, Log},
    transports::http::{Client, Http},
};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info, warn};

use crate::error::SourceError;
use crate::events::ChainEvent;
use crate::router::Router;

pub struct RpcLogSource {
    provider: RootProvider<Http<Client>>,
}

impl RpcLogSource {
    pub async fn new(rpc_url: &str) -> Result<Self, SourceError> {
        let provider = ProviderBuilder::new().on_http(
            rpc_url
                .parse()
                .map_err(|e| SourceError::InvalidUrl(format!("{}", e)))?,
        );

        // Verify connection
        let chain_id = provider
            .get_chain_id()
            .await
            .map_err(|e| SourceError::Provider(format!("RPC connection failed: {}", e)))?;

        info!(chain_id = chain_id, "RpcLogSource initialized");

        Ok(Self { provider })
    }

    pub async fn latest_block(&self) -> Result<u64, SourceError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| SourceError::Provider(format!("Failed to get block number: {}", e)))
    }

    /// Logs of all addresses known to `router` in `[from, to]`, decoded and
    /// sorted. Logs with an unknown signature are dropped.
    pub async fn fetch(
        &self,
        router: &Router,
        from: u64,
        to: u64,
    ) -> Result<Vec<ChainEvent>, SourceError> {
        let addresses = router.addresses();
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let filter = Filter::new()
            .address(addresses)
            .from_block(BlockNumberOrTag::Number(from))
            .to_block(BlockNumberOrTag::Number(to));

        let mut logs = self
            .provider
            .get_logs(&filter)
            .await
            .map_err(|e| SourceError::Provider(format!("Failed to get logs: {}", e)))?;

        let missing = blocks_missing_timestamps(&logs);
        if !missing.is_empty() {
            let mut timestamps = HashMap::with_capacity(missing.len());
            for block in missing {
                timestamps.insert(block, self.block_timestamp(block).await?);
            }
            fill_timestamps(&mut logs, &timestamps);
        }

        let mut events = Vec::with_capacity(logs.len());
        for log in &logs {
            if log.removed {
                warn!(block = ?log.block_number, "Skipping removed log");
                continue;
            }
            match router.decode(log) {
                Ok(Some(event)) => events.push(event),
                Ok(None) => debug!(
                    address = ?log.inner.address,
                    topic0 = ?log.inner.data.topics().first(),
                    "Unrecognized log signature"
                ),
                Err(e) => warn!(
                    address = ?log.inner.address,
                    block = ?log.block_number,
                    error = %e,
                    "Skipping undecodable log"
                ),
            }
        }

        events.sort_by_key(|event| event.position());

        debug!(
            from_block = from,
            to_block = to,
            logs = logs.len(),
            events = events.len(),
            "Fetched logs"
        );

        Ok(events)
    }

    async fn block_timestamp(&self, block: u64) -> Result<u64, SourceError> {
        let header = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Number(block), BlockTransactionsKind::Hashes)
            .await
            .map_err(|e| SourceError::Provider(format!("Failed to get block {}: {}", block, e)))?
            .ok_or_else(|| SourceError::Provider(format!("Block {} not found", block)))?;

        Ok(header.header.timestamp)
    }
}

/// Blocks of the logs that arrived without a timestamp.
fn blocks_missing_timestamps(logs: &[Log]) -> BTreeSet<u64> {
    logs.iter()
        .filter(|log| log.block_timestamp.is_none())
        .filter_map(|log| log.block_number)
        .collect()
}

fn fill_timestamps(logs: &mut [Log], timestamps: &HashMap<u64, u64>) {
    for log in logs.iter_mut().filter(|log| log.block_timestamp.is_none()) {
        if let Some(block) = log.block_number {
            log.block_timestamp = timestamps.get(&block).copied();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_at(block: u64, block_timestamp: Option<u64>) -> Log {
        Log {
            block_number: Some(block),
            block_timestamp,
            ..Default::default()
        }
    }

    #[test]
    fn test_missing_timestamps_are_collected_once_per_block() {
        let logs = vec![
            log_at(7, None),
            log_at(7, None),
            log_at(8, Some(1_700_000_008)),
            log_at(9, None),
        ];
        assert_eq!(
            blocks_missing_timestamps(&logs).into_iter().collect::<Vec<_>>(),
            vec![7, 9]
        );
    }

    #[test]
    fn test_fill_timestamps_keeps_node_values() {
        let mut logs = vec![log_at(7, None), log_at(8, Some(5)), log_at(9, None)];
        let timestamps = HashMap::from([(7, 1_700_000_007), (8, 1_700_000_008)]);

        fill_timestamps(&mut logs, &timestamps);

        assert_eq!(logs[0].block_timestamp, Some(1_700_000_007));
        assert_eq!(logs[1].block_timestamp, Some(5));
        // Left unset, so decoding rejects it
        assert_eq!(logs[2].block_timestamp, None);
    }
}
