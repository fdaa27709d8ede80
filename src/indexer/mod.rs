//! Third-party chain indexer access (transaction and balance lookups)

mod client;

pub use client::{IndexerClient, IndexerConfig};
