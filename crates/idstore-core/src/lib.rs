//! Core domain of the identity store.
//!
//! Entities are exchanged with callers as wire records and persisted as
//! storage models. Field masks select which parts of a record an operation
//! reads or writes; the per-entity [`field::FieldRegistry`] maps mask paths
//! to storage columns and to the conversion functions between the two
//! representations.

pub mod context;
pub mod entity;
pub mod error;
pub mod field;
pub mod mapper;
pub mod mask;
pub mod models;
pub mod plan;
pub mod reconcile;
pub mod repository;
pub mod store;

pub use context::CallContext;
pub use error::{StoreError, StoreResult};
pub use mask::FieldMask;
pub use store::{ClientStore, OrganizationStore, Store};
