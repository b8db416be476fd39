//! Organization rows.

use chrono::{DateTime, Utc};
use idstore_core::error::StoreResult;
use idstore_core::models::common::ModelBase;
use idstore_core::models::organization::OrganizationModel;
use idstore_core::repository::{EntityStorage, ScopedQuery};
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{EntityTable, SurrealStorage, TimestampRow, parse_record_id};
use crate::error::DbError;

const TABLE: EntityTable = EntityTable {
    name: "organization",
    id_column: "organization_id",
    writable: &["name", "description"],
};

/// Organization row; every column is optional because selections may be
/// partial.
#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    record_id: String,
    organization_id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl OrganizationRow {
    fn try_into_model(self) -> Result<OrganizationModel, DbError> {
        Ok(OrganizationModel {
            base: ModelBase {
                id: Some(parse_record_id(TABLE.name, &self.record_id)?),
                created_at: self.created_at,
                updated_at: self.updated_at,
                deleted_at: None,
            },
            organization_id: self.organization_id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            ..Default::default()
        })
    }
}

impl<C: Connection> EntityStorage<OrganizationModel> for SurrealStorage<C> {
    async fn find(&self, query: &ScopedQuery) -> StoreResult<Vec<OrganizationModel>> {
        let page = query.plan.pagination.unwrap_or_default();
        let mut result = self
            .db
            .query(TABLE.select_sql(query))
            .bind(("ids", query.external_ids.clone()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let mut models = rows
            .into_iter()
            .map(OrganizationRow::try_into_model)
            .collect::<Result<Vec<_>, DbError>>()?;
        self.attach_children(&mut models, &query.plan).await?;
        Ok(models)
    }

    async fn first(&self, query: &ScopedQuery) -> StoreResult<Option<OrganizationModel>> {
        let models = EntityStorage::<OrganizationModel>::find(self, query).await?;
        Ok(models.into_iter().next())
    }

    async fn count(&self, query: &ScopedQuery) -> StoreResult<u64> {
        Ok(self.count_rows(&TABLE, query).await?)
    }

    async fn insert(&self, model: &mut OrganizationModel) -> StoreResult<()> {
        let id = Uuid::new_v4();
        debug!(organization_id = %model.organization_id, %id, "Inserting organization");

        let mut result = self
            .db
            .query(
                "CREATE type::record('organization', $id) SET \
                 organization_id = $organization_id, name = $name, \
                 description = $description",
            )
            .bind(("id", id.to_string()))
            .bind(("organization_id", model.organization_id.clone()))
            .bind(("name", model.name.clone()))
            .bind(("description", model.description.clone()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;

        let rows: Vec<TimestampRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: TABLE.name,
            id: id.to_string(),
        })?;

        model.base.id = Some(id);
        model.base.created_at = Some(row.created_at);
        model.base.updated_at = Some(row.updated_at);
        Ok(())
    }

    async fn update_columns(
        &self,
        model: &mut OrganizationModel,
        columns: &[&'static str],
    ) -> StoreResult<()> {
        let id = model
            .base
            .id
            .ok_or_else(|| DbError::invalid(TABLE.name, "update without record id"))?;

        let mut builder = self
            .db
            .query(TABLE.update_sql(columns)?)
            .bind(("id", id.to_string()));
        for &column in columns {
            builder = match column {
                "name" => builder.bind(("name", model.name.clone())),
                "description" => builder.bind(("description", model.description.clone())),
                _ => {
                    return Err(DbError::UnknownColumn {
                        table: TABLE.name,
                        column,
                    }
                    .into());
                }
            };
        }

        let mut result = builder
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(DbError::from)?;
        let rows: Vec<TimestampRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: TABLE.name,
            id: model.organization_id.clone(),
        })?;

        model.base.updated_at = Some(row.updated_at);
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> StoreResult<()> {
        Ok(self.soft_delete_row(&TABLE, id).await?)
    }
}
