//! Storage capability consumed by the store operations.
//!
//! The relational engine is reached only through these traits: scoped
//! selection by external identifier, counting, insertion, column-scoped
//! updates, soft deletion and child-collection delta application.
//! Implementations report "no row" as `Ok(None)` and every other engine
//! failure as [`StoreError::Storage`](crate::error::StoreError::Storage).

use uuid::Uuid;

use crate::entity::Model;
use crate::error::StoreResult;
use crate::models::common::Owner;
use crate::plan::ProjectionPlan;
use crate::reconcile::{AttributeDelta, ContactInfoDelta};

/// Pagination parameters for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A query restricted to live (not soft-deleted) rows of one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedQuery {
    /// External identifiers to match; empty means unrestricted.
    pub external_ids: Vec<String>,
    pub plan: ProjectionPlan,
}

impl ScopedQuery {
    pub fn new(external_ids: Vec<String>, plan: ProjectionPlan) -> Self {
        Self { external_ids, plan }
    }

    pub fn by_id(external_id: &str, plan: ProjectionPlan) -> Self {
        Self::new(vec![external_id.to_owned()], plan)
    }
}

/// Row-level storage for one entity model.
pub trait EntityStorage<M: Model>: Send + Sync {
    /// Rows matching the query, with the planned child collections loaded.
    fn find(&self, query: &ScopedQuery) -> impl Future<Output = StoreResult<Vec<M>>> + Send;

    /// The first matching row, or `None` when nothing matches.
    fn first(&self, query: &ScopedQuery) -> impl Future<Output = StoreResult<Option<M>>> + Send;

    /// Number of rows matching the query, ignoring pagination.
    fn count(&self, query: &ScopedQuery) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Insert the row columns of `model`, assigning its surrogate key and
    /// timestamps. Child collections are not written.
    fn insert(&self, model: &mut M) -> impl Future<Output = StoreResult<()>> + Send;

    /// Write exactly `columns` of `model` and refresh its `updated_at`.
    fn update_columns(
        &self,
        model: &mut M,
        columns: &[&'static str],
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Mark the row with the given surrogate key as deleted.
    fn soft_delete(&self, id: Uuid) -> impl Future<Output = StoreResult<()>> + Send;
}

/// Storage for child collections attached to an owner.
///
/// Deltas are applied deletes first, then updates, then inserts, and every
/// statement is scoped to the owner.
pub trait ChildStorage: Send + Sync {
    fn apply_attributes(
        &self,
        owner: Owner,
        delta: &AttributeDelta,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    fn apply_contact_info(
        &self,
        owner: Owner,
        delta: &ContactInfoDelta,
    ) -> impl Future<Output = StoreResult<()>> + Send;
}
