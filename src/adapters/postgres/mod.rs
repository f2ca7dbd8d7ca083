//! PostgreSQL adapter

pub mod client;
pub mod store;

pub use client::PostgresClient;
pub use store::PostgresHistoryStore;
