use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use carbon_indexer::config::IndexerConfig;
use carbon_indexer::engine::Engine;
use carbon_indexer::error::IndexerError;
use carbon_indexer::jobs::event_sync::EventSyncJob;
use carbon_indexer::snapshot::RpcSnapshotFetcher;
use carbon_indexer::source::RpcLogSource;
use carbon_indexer::store::{EntityStore, MemoryStore, SeaOrmStore};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,carbon_indexer=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "Indexer exited with error");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), IndexerError> {
    let config = IndexerConfig::from_env()?;
    let rpc_url = config.require_rpc_url()?;

    let store: Arc<dyn EntityStore> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let db = Database::connect(database_url)
                .await
                .map_err(carbon_indexer::error::StoreError::from)?;

            tracing::info!("Running migrations...");
            migration::Migrator::up(&db, None)
                .await
                .map_err(|e| IndexerError::Migration(e.to_string()))?;

            Arc::new(SeaOrmStore::new(db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set - using in-memory store, state is lost on exit");
            Arc::new(MemoryStore::new())
        }
    };

    let snapshots = Arc::new(RpcSnapshotFetcher::new(rpc_url).await?);
    let source = RpcLogSource::new(rpc_url).await?;

    let sources = config.static_sources();
    if sources.is_empty() {
        tracing::warn!("No contract addresses configured, nothing will be indexed");
    }

    let engine = Engine::open(store, snapshots, sources, config.engine_settings()).await?;

    EventSyncJob::new(
        engine,
        source,
        config.start_block,
        config.block_range,
        config.poll_interval,
    )
    .run()
    .await;

    Ok(())
}
