//! SurrealDB storage backend for the identity store.
//!
//! This crate provides:
//! - Connection management ([`DbManager`], [`DbConfig`])
//! - Schema initialization and migrations ([`run_migrations`])
//! - Error types ([`DbError`])
//! - [`SurrealStorage`], implementing the `idstore-core` storage traits for
//!   organizations, clients and their child collections

mod connection;
mod error;
mod schema;
pub mod storage;

pub use connection::{DbConfig, DbManager};
pub use error::DbError;
pub use schema::{run_migrations, schema_v1};
pub use storage::SurrealStorage;
