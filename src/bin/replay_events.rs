// src/bin/replay_events.rs

use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carbon_indexer::config::IndexerConfig;
use carbon_indexer::engine::Engine;
use carbon_indexer::error::IndexerError;
use carbon_indexer::events::ChainEvent;
use carbon_indexer::snapshot::{RpcSnapshotFetcher, SnapshotFetcher, StaticSnapshots};
use carbon_indexer::store::MemoryStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,carbon_indexer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    dotenvy::dotenv().ok();

    // Usage: cargo run --bin replay_events -- events.jsonl
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <events.jsonl>", args[0]);
        eprintln!("Contract addresses are read from the environment; RPC_URL enables live snapshots.");
        std::process::exit(1);
    }

    let config = IndexerConfig::from_env()?;

    // Without an RPC endpoint every snapshot read is unavailable
    let snapshots: Arc<dyn SnapshotFetcher> = match &config.rpc_url {
        Some(rpc_url) => Arc::new(RpcSnapshotFetcher::new(rpc_url).await?),
        None => Arc::new(StaticSnapshots::new()),
    };

    let store = Arc::new(MemoryStore::new());
    let mut engine = Engine::open(
        store.clone(),
        snapshots,
        config.static_sources(),
        config.engine_settings(),
    )
    .await?;

    let reader = BufReader::new(File::open(&args[1])?);
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event: ChainEvent = serde_json::from_str(&line).map_err(|source| {
            IndexerError::EventLine {
                line: index + 1,
                source,
            }
        })?;

        if let Some(batch) = engine.process(&event).await? {
            println!("{}", serde_json::to_string(&batch)?);
        }
    }

    let stats = engine.stats();
    eprintln!("Replay complete: {}", serde_json::to_string(&stats)?);
    eprintln!("Entities in store: {}", store.len());

    Ok(())
}
