//! SurrealDB implementation of the store's storage capability.
//!
//! One [`SurrealStorage`] serves every entity type: row access lives in a
//! file per entity, child collections (attributes and contact info) in
//! `children`.

mod children;
mod client;
mod organization;

use chrono::{DateTime, Utc};
use idstore_core::plan::Selection;
use idstore_core::repository::ScopedQuery;
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

/// Storage backend over a SurrealDB connection.
#[derive(Clone)]
pub struct SurrealStorage<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealStorage<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    pub fn client(&self) -> &Surreal<C> {
        &self.db
    }

    /// Number of live rows in `table` matching `query`.
    async fn count_rows(&self, table: &EntityTable, query: &ScopedQuery) -> Result<u64, DbError> {
        let mut result = self
            .db
            .query(table.count_sql(query))
            .bind(("ids", query.external_ids.clone()))
            .await?;
        let rows: Vec<CountRow> = result.take(0)?;
        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn soft_delete_row(&self, table: &EntityTable, id: Uuid) -> Result<(), DbError> {
        debug!(table = table.name, %id, "Soft-deleting row");
        self.db
            .query(format!(
                "UPDATE type::record('{}', $id) SET deleted_at = time::now() \
                 WHERE deleted_at IS NONE",
                table.name
            ))
            .bind(("id", id.to_string()))
            .await?
            .check()?;
        Ok(())
    }
}

/// Static description of an entity table.
pub(crate) struct EntityTable {
    pub name: &'static str,
    /// Column holding the external identifier.
    pub id_column: &'static str,
    /// Row columns a column-scoped update may write.
    pub writable: &'static [&'static str],
}

impl EntityTable {
    fn projection(selection: &Selection) -> String {
        match selection {
            Selection::All => "meta::id(id) AS record_id, *".to_owned(),
            Selection::Columns(columns) => {
                let mut fields = vec!["meta::id(id) AS record_id"];
                fields.extend(columns.iter().copied().filter(|&c| c != "id"));
                fields.join(", ")
            }
        }
    }

    fn filter(&self, query: &ScopedQuery) -> String {
        let mut filter = String::from("WHERE deleted_at IS NONE");
        if !query.external_ids.is_empty() {
            filter.push_str(&format!(" AND {} IN $ids", self.id_column));
        }
        filter
    }

    /// SELECT for `query`. Binds `$ids`, and `$limit`/`$offset` when
    /// paginated.
    pub(crate) fn select_sql(&self, query: &ScopedQuery) -> String {
        let mut sql = format!(
            "SELECT {} FROM {} {}",
            Self::projection(&query.plan.selection),
            self.name,
            self.filter(query)
        );
        if query.plan.selection.includes("created_at") {
            sql.push_str(" ORDER BY created_at ASC");
        }
        if query.plan.pagination.is_some() {
            sql.push_str(" LIMIT $limit START $offset");
        }
        sql
    }

    pub(crate) fn count_sql(&self, query: &ScopedQuery) -> String {
        format!(
            "SELECT count() AS total FROM {} {} GROUP ALL",
            self.name,
            self.filter(query)
        )
    }

    /// UPDATE writing exactly `columns` (each bound as `$<column>`) and
    /// refreshing `updated_at`.
    pub(crate) fn update_sql(&self, columns: &[&'static str]) -> Result<String, DbError> {
        let mut sets = Vec::with_capacity(columns.len() + 1);
        for &column in columns {
            if !self.writable.contains(&column) {
                return Err(DbError::UnknownColumn {
                    table: self.name,
                    column,
                });
            }
            sets.push(format!("{column} = ${column}"));
        }
        sets.push("updated_at = time::now()".to_owned());
        Ok(format!(
            "UPDATE type::record('{}', $id) SET {} WHERE deleted_at IS NONE",
            self.name,
            sets.join(", ")
        ))
    }
}

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
struct CountRow {
    total: u64,
}

/// Timestamps returned by CREATE and UPDATE.
#[derive(Debug, SurrealValue)]
struct TimestampRow {
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_record_id(entity: &'static str, record_id: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(record_id).map_err(|e| DbError::invalid(entity, format!("invalid UUID: {e}")))
}

#[cfg(test)]
mod tests {
    use idstore_core::plan::ProjectionPlan;
    use idstore_core::repository::Pagination;

    use super::*;

    const TABLE: EntityTable = EntityTable {
        name: "organization",
        id_column: "organization_id",
        writable: &["name", "description"],
    };

    fn query(ids: &[&str], plan: ProjectionPlan) -> ScopedQuery {
        ScopedQuery::new(ids.iter().map(|&s| s.to_owned()).collect(), plan)
    }

    #[test]
    fn full_select_filters_deleted_rows() {
        let sql = TABLE.select_sql(&query(&[], ProjectionPlan::full(None)));
        assert_eq!(
            sql,
            "SELECT meta::id(id) AS record_id, * FROM organization \
             WHERE deleted_at IS NONE ORDER BY created_at ASC"
        );
    }

    #[test]
    fn column_select_restricts_fields_and_pages() {
        let plan = ProjectionPlan {
            selection: Selection::Columns(vec!["id", "created_at", "updated_at", "name"]),
            preload: Vec::new(),
            pagination: Some(Pagination::default()),
        };
        let sql = TABLE.select_sql(&query(&["org-1"], plan));
        assert_eq!(
            sql,
            "SELECT meta::id(id) AS record_id, created_at, updated_at, name \
             FROM organization WHERE deleted_at IS NONE AND organization_id IN $ids \
             ORDER BY created_at ASC LIMIT $limit START $offset"
        );
    }

    #[test]
    fn identity_select_has_no_ordering() {
        let sql = TABLE.select_sql(&query(&["org-1"], ProjectionPlan::identity_only()));
        assert!(sql.starts_with("SELECT meta::id(id) AS record_id FROM organization"));
        assert!(!sql.contains("ORDER BY"));
    }

    #[test]
    fn update_rejects_unwritable_columns() {
        assert_eq!(
            TABLE.update_sql(&["name"]).unwrap(),
            "UPDATE type::record('organization', $id) SET name = $name, \
             updated_at = time::now() WHERE deleted_at IS NONE"
        );
        assert!(matches!(
            TABLE.update_sql(&["organization_id"]),
            Err(DbError::UnknownColumn { column: "organization_id", .. })
        ));
    }
}
