//! OAuth client rows.

use chrono::{DateTime, Utc};
use idstore_core::error::StoreResult;
use idstore_core::models::client::{ClientModel, GrantType, Right, State};
use idstore_core::models::common::ModelBase;
use idstore_core::repository::{EntityStorage, ScopedQuery};
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{EntityTable, SurrealStorage, TimestampRow, parse_record_id};
use crate::error::DbError;

const TABLE: EntityTable = EntityTable {
    name: "client",
    id_column: "client_id",
    writable: &[
        "name",
        "description",
        "client_secret",
        "redirect_uris",
        "state",
        "skip_authorization",
        "endorsed",
        "grants",
        "rights",
    ],
};

#[derive(Debug, SurrealValue)]
struct ClientRow {
    record_id: String,
    client_id: Option<String>,
    name: Option<String>,
    description: Option<String>,
    client_secret: Option<String>,
    redirect_uris: Option<Vec<String>>,
    state: Option<String>,
    skip_authorization: Option<bool>,
    endorsed: Option<bool>,
    grants: Option<Vec<String>>,
    rights: Option<Vec<String>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

fn parse_state(s: &str) -> Result<State, DbError> {
    match s {
        "Requested" => Ok(State::Requested),
        "Approved" => Ok(State::Approved),
        "Rejected" => Ok(State::Rejected),
        "Flagged" => Ok(State::Flagged),
        "Suspended" => Ok(State::Suspended),
        other => Err(DbError::invalid(TABLE.name, format!("unknown state: {other}"))),
    }
}

fn state_to_string(s: State) -> &'static str {
    match s {
        State::Requested => "Requested",
        State::Approved => "Approved",
        State::Rejected => "Rejected",
        State::Flagged => "Flagged",
        State::Suspended => "Suspended",
    }
}

fn parse_grant(s: &str) -> Result<GrantType, DbError> {
    match s {
        "AuthorizationCode" => Ok(GrantType::AuthorizationCode),
        "Password" => Ok(GrantType::Password),
        "RefreshToken" => Ok(GrantType::RefreshToken),
        other => Err(DbError::invalid(TABLE.name, format!("unknown grant: {other}"))),
    }
}

fn grant_to_string(g: GrantType) -> &'static str {
    match g {
        GrantType::AuthorizationCode => "AuthorizationCode",
        GrantType::Password => "Password",
        GrantType::RefreshToken => "RefreshToken",
    }
}

fn parse_right(s: &str) -> Result<Right, DbError> {
    match s {
        "UserInfo" => Ok(Right::UserInfo),
        "UserSettingsBasic" => Ok(Right::UserSettingsBasic),
        "UserApplicationsList" => Ok(Right::UserApplicationsList),
        "ClientAll" => Ok(Right::ClientAll),
        "OrganizationInfo" => Ok(Right::OrganizationInfo),
        "OrganizationSettingsBasic" => Ok(Right::OrganizationSettingsBasic),
        "OrganizationApplicationsList" => Ok(Right::OrganizationApplicationsList),
        "ApplicationInfo" => Ok(Right::ApplicationInfo),
        "ApplicationSettingsBasic" => Ok(Right::ApplicationSettingsBasic),
        other => Err(DbError::invalid(TABLE.name, format!("unknown right: {other}"))),
    }
}

fn right_to_string(r: Right) -> &'static str {
    match r {
        Right::UserInfo => "UserInfo",
        Right::UserSettingsBasic => "UserSettingsBasic",
        Right::UserApplicationsList => "UserApplicationsList",
        Right::ClientAll => "ClientAll",
        Right::OrganizationInfo => "OrganizationInfo",
        Right::OrganizationSettingsBasic => "OrganizationSettingsBasic",
        Right::OrganizationApplicationsList => "OrganizationApplicationsList",
        Right::ApplicationInfo => "ApplicationInfo",
        Right::ApplicationSettingsBasic => "ApplicationSettingsBasic",
    }
}

fn grant_strings(grants: &[GrantType]) -> Vec<String> {
    grants.iter().map(|&g| grant_to_string(g).to_owned()).collect()
}

fn right_strings(rights: &[Right]) -> Vec<String> {
    rights.iter().map(|&r| right_to_string(r).to_owned()).collect()
}

impl ClientRow {
    fn try_into_model(self) -> Result<ClientModel, DbError> {
        Ok(ClientModel {
            base: ModelBase {
                id: Some(parse_record_id(TABLE.name, &self.record_id)?),
                created_at: self.created_at,
                updated_at: self.updated_at,
                deleted_at: None,
            },
            client_id: self.client_id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            client_secret: self.client_secret.unwrap_or_default(),
            redirect_uris: self.redirect_uris.unwrap_or_default(),
            state: self.state.as_deref().map(parse_state).transpose()?.unwrap_or_default(),
            skip_authorization: self.skip_authorization.unwrap_or_default(),
            endorsed: self.endorsed.unwrap_or_default(),
            grants: self
                .grants
                .unwrap_or_default()
                .iter()
                .map(|g| parse_grant(g))
                .collect::<Result<_, _>>()?,
            rights: self
                .rights
                .unwrap_or_default()
                .iter()
                .map(|r| parse_right(r))
                .collect::<Result<_, _>>()?,
            ..Default::default()
        })
    }
}

impl<C: Connection> EntityStorage<ClientModel> for SurrealStorage<C> {
    async fn find(&self, query: &ScopedQuery) -> StoreResult<Vec<ClientModel>> {
        let page = query.plan.pagination.unwrap_or_default();
        let mut result = self
            .db
            .query(TABLE.select_sql(query))
            .bind(("ids", query.external_ids.clone()))
            .bind(("limit", page.limit))
            .bind(("offset", page.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClientRow> = result.take(0).map_err(DbError::from)?;
        let mut models = rows
            .into_iter()
            .map(ClientRow::try_into_model)
            .collect::<Result<Vec<_>, DbError>>()?;
        self.attach_children(&mut models, &query.plan).await?;
        Ok(models)
    }

    async fn first(&self, query: &ScopedQuery) -> StoreResult<Option<ClientModel>> {
        let models = EntityStorage::<ClientModel>::find(self, query).await?;
        Ok(models.into_iter().next())
    }

    async fn count(&self, query: &ScopedQuery) -> StoreResult<u64> {
        Ok(self.count_rows(&TABLE, query).await?)
    }

    async fn insert(&self, model: &mut ClientModel) -> StoreResult<()> {
        let id = Uuid::new_v4();
        debug!(client_id = %model.client_id, %id, "Inserting client");

        let mut result = self
            .db
            .query(
                "CREATE type::record('client', $id) SET \
                 client_id = $client_id, name = $name, description = $description, \
                 client_secret = $client_secret, redirect_uris = $redirect_uris, \
                 state = $state, skip_authorization = $skip_authorization, \
                 endorsed = $endorsed, grants = $grants, rights = $rights",
            )
            .bind(("id", id.to_string()))
            .bind(("client_id", model.client_id.clone()))
            .bind(("name", model.name.clone()))
            .bind(("description", model.description.clone()))
            .bind(("client_secret", model.client_secret.clone()))
            .bind(("redirect_uris", model.redirect_uris.clone()))
            .bind(("state", state_to_string(model.state)))
            .bind(("skip_authorization", model.skip_authorization))
            .bind(("endorsed", model.endorsed))
            .bind(("grants", grant_strings(&model.grants)))
            .bind(("rights", right_strings(&model.rights)))
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
        model: &mut ClientModel,
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
                "client_secret" => builder.bind(("client_secret", model.client_secret.clone())),
                "redirect_uris" => builder.bind(("redirect_uris", model.redirect_uris.clone())),
                "state" => builder.bind(("state", state_to_string(model.state))),
                "skip_authorization" => {
                    builder.bind(("skip_authorization", model.skip_authorization))
                }
                "endorsed" => builder.bind(("endorsed", model.endorsed)),
                "grants" => builder.bind(("grants", grant_strings(&model.grants))),
                "rights" => builder.bind(("rights", right_strings(&model.rights))),
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
            id: model.client_id.clone(),
        })?;

        model.base.updated_at = Some(row.updated_at);
        Ok(())
    }

    async fn soft_delete(&self, id: Uuid) -> StoreResult<()> {
        Ok(self.soft_delete_row(&TABLE, id).await?)
    }
}
