//! Multiproxy Indexer Client
//!
//! Read-side client for the indexing service that serves decoded account
//! and transaction trees for nested multisig and pure proxy accounts.
//! [`IndexClient`] implements the engine's [`multiproxy_engine::IndexService`].

pub mod config;
pub mod error;
pub mod models;
pub mod query;

pub use config::*;
pub use error::{IndexerError, IndexerResult};
pub use models::{AccountResponse, PageResponse, PendingQuery, TransactionRecord};
pub use query::IndexClient;

pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

