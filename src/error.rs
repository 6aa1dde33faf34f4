//! Error taxonomy for the indexer.
//!
//! Only [`StoreError`] is fatal for an event. Referential misses and failed
//! snapshot reads are expected conditions and are reported through logs and
//! engine statistics instead of `Err` values.

use crate::models::EntityKind;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Failed to serialize {kind} {key}: {source}")]
    Serialize {
        kind: EntityKind,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupt {kind} record {key}: {source}")]
    Corrupt {
        kind: EntityKind,
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record {key} was stored as {found}, expected {expected}")]
    KindMismatch {
        key: String,
        expected: EntityKind,
        found: EntityKind,
    },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("Contract call failed for {query}: {message}")]
    ContractCall { query: String, message: String },

    #[error("Snapshot value unavailable: {0}")]
    Unavailable(String),
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    #[error("Invalid RPC URL: {0}")]
    InvalidUrl(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Log at block {block:?} is missing {field}")]
    IncompleteLog {
        block: Option<u64>,
        field: &'static str,
    },

    #[error("Failed to decode {event} log: {message}")]
    Decode { event: &'static str, message: String },
}

#[derive(thiserror::Error, Debug)]
pub enum IndexerError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("Snapshot fetcher initialization failed: {0}")]
    Snapshot(#[from] SnapshotError),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid event line {line}: {source}")]
    EventLine {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}
