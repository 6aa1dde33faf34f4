// src/lib.rs

pub mod config;
pub mod engine;
pub mod entities;
pub mod error;
pub mod events;
pub mod handlers;
pub mod jobs;
pub mod ledger;
pub mod models;
pub mod router;
pub mod snapshot;
pub mod source;
pub mod store;

pub use engine::{ChangeBatch, Engine, EngineSettings, EngineStats};
pub use error::IndexerError;
