//! Attributes and contact info: loading and delta application.
//!
//! Child rows are keyed by owner (`entity_type`, `entity_id`) plus their
//! identity within the owner. Each delta is applied in one transaction,
//! deletes first, then updates, then inserts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use idstore_core::entity::Model;
use idstore_core::error::StoreResult;
use idstore_core::field::Relation;
use idstore_core::models::common::{Attributes, Owner, OwnerKind};
use idstore_core::models::contact_info::{ContactInfo, ContactType};
use idstore_core::plan::ProjectionPlan;
use idstore_core::reconcile::{AttributeDelta, ContactInfoDelta};
use idstore_core::repository::ChildStorage;
use surrealdb::Connection;
use surrealdb_types::SurrealValue;
use tracing::debug;
use uuid::Uuid;

use super::{SurrealStorage, parse_record_id};
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct AttributeRow {
    entity_id: String,
    key: String,
    value: String,
}

#[derive(Debug, SurrealValue)]
struct ContactInfoRow {
    entity_id: String,
    contact_type: String,
    value: String,
    public: bool,
    validated_at: Option<DateTime<Utc>>,
}

fn parse_contact_type(s: &str) -> Result<ContactType, DbError> {
    match s {
        "Other" => Ok(ContactType::Other),
        "Abuse" => Ok(ContactType::Abuse),
        "Billing" => Ok(ContactType::Billing),
        "Technical" => Ok(ContactType::Technical),
        other => Err(DbError::invalid(
            "contact_info",
            format!("unknown contact type: {other}"),
        )),
    }
}

fn contact_type_to_string(t: ContactType) -> &'static str {
    match t {
        ContactType::Other => "Other",
        ContactType::Abuse => "Abuse",
        ContactType::Billing => "Billing",
        ContactType::Technical => "Technical",
    }
}

impl ContactInfoRow {
    fn into_contact_info(self) -> Result<(Uuid, ContactInfo), DbError> {
        let owner = parse_record_id("contact_info", &self.entity_id)?;
        Ok((
            owner,
            ContactInfo {
                contact_type: parse_contact_type(&self.contact_type)?,
                value: self.value,
                public: self.public,
                validated_at: self.validated_at,
            },
        ))
    }
}

const OWNER_FILTER: &str = "entity_type = $entity_type AND entity_id = $entity_id";

impl<C: Connection> SurrealStorage<C> {
    /// Load the child collections `plan` preloads onto `models`.
    pub(crate) async fn attach_children<M: Model>(
        &self,
        models: &mut [M],
        plan: &ProjectionPlan,
    ) -> Result<(), DbError> {
        let owners: Vec<Uuid> = models.iter().filter_map(|m| m.base().id).collect();
        if owners.is_empty() {
            return Ok(());
        }

        if plan.preloads(Relation::Attributes) {
            let mut loaded = self.load_attributes(M::OWNER, &owners).await?;
            for model in models.iter_mut() {
                if let Some(id) = model.base().id {
                    *model.attributes_mut() = loaded.remove(&id).unwrap_or_default();
                }
            }
        }
        if plan.preloads(Relation::ContactInfo) {
            let mut loaded = self.load_contact_info(M::OWNER, &owners).await?;
            for model in models.iter_mut() {
                if let Some(id) = model.base().id {
                    *model.contact_info_mut() = loaded.remove(&id).unwrap_or_default();
                }
            }
        }
        Ok(())
    }

    async fn load_attributes(
        &self,
        kind: OwnerKind,
        owners: &[Uuid],
    ) -> Result<HashMap<Uuid, Attributes>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT entity_id, key, value FROM attribute \
                 WHERE entity_type = $entity_type AND entity_id IN $owners",
            )
            .bind(("entity_type", kind.as_str()))
            .bind(("owners", owner_strings(owners)))
            .await?;
        let rows: Vec<AttributeRow> = result.take(0)?;

        let mut loaded: HashMap<Uuid, Attributes> = HashMap::new();
        for row in rows {
            let owner = parse_record_id("attribute", &row.entity_id)?;
            loaded.entry(owner).or_default().insert(row.key, row.value);
        }
        Ok(loaded)
    }

    /// Contact info per owner, ordered by identity.
    async fn load_contact_info(
        &self,
        kind: OwnerKind,
        owners: &[Uuid],
    ) -> Result<HashMap<Uuid, Vec<ContactInfo>>, DbError> {
        let mut result = self
            .db
            .query(
                "SELECT entity_id, contact_type, value, public, validated_at \
                 FROM contact_info \
                 WHERE entity_type = $entity_type AND entity_id IN $owners",
            )
            .bind(("entity_type", kind.as_str()))
            .bind(("owners", owner_strings(owners)))
            .await?;
        let rows: Vec<ContactInfoRow> = result.take(0)?;

        let mut loaded: HashMap<Uuid, Vec<ContactInfo>> = HashMap::new();
        for row in rows {
            let (owner, entry) = row.into_contact_info()?;
            loaded.entry(owner).or_default().push(entry);
        }
        for entries in loaded.values_mut() {
            entries.sort_by_key(ContactInfo::key);
        }
        Ok(loaded)
    }
}

fn owner_strings(owners: &[Uuid]) -> Vec<String> {
    owners.iter().map(Uuid::to_string).collect()
}

/// Wraps statements in a single transaction, one per line.
fn transaction(statements: Vec<String>) -> String {
    let mut sql = String::from("BEGIN TRANSACTION;\n");
    for statement in statements {
        sql.push_str(&statement);
        sql.push('\n');
    }
    sql.push_str("COMMIT TRANSACTION;");
    sql
}

/// Transaction script for an attribute delta, binding `$deleted`,
/// `$u{i}_key`/`$u{i}_value` and `$i{i}_key`/`$i{i}_value`.
fn attribute_script(delta: &AttributeDelta) -> String {
    let mut statements = Vec::with_capacity(delta.len());
    if !delta.delete.is_empty() {
        statements.push(format!(
            "DELETE attribute WHERE {OWNER_FILTER} AND key IN $deleted;"
        ));
    }
    statements.extend((0..delta.update.len()).map(|i| {
        format!("UPDATE attribute SET value = $u{i}_value WHERE {OWNER_FILTER} AND key = $u{i}_key;")
    }));
    statements.extend((0..delta.insert.len()).map(|i| {
        format!(
            "CREATE attribute SET entity_type = $entity_type, entity_id = $entity_id, \
             key = $i{i}_key, value = $i{i}_value;"
        )
    }));
    transaction(statements)
}

/// Transaction script for a contact info delta. Every entry binds
/// `$<prefix>{i}_type` and `$<prefix>{i}_value`; updates and inserts also
/// bind `_public` and `_validated_at`.
fn contact_info_script(delta: &ContactInfoDelta) -> String {
    let key_filter = |p: String| format!("contact_type = ${p}_type AND value = ${p}_value");

    let mut statements = Vec::with_capacity(delta.len());
    statements.extend((0..delta.delete.len()).map(|i| {
        format!(
            "DELETE contact_info WHERE {OWNER_FILTER} AND {};",
            key_filter(format!("d{i}"))
        )
    }));
    statements.extend((0..delta.update.len()).map(|i| {
        format!(
            "UPDATE contact_info SET public = $u{i}_public, validated_at = $u{i}_validated_at \
             WHERE {OWNER_FILTER} AND {};",
            key_filter(format!("u{i}"))
        )
    }));
    statements.extend((0..delta.insert.len()).map(|i| {
        format!(
            "CREATE contact_info SET entity_type = $entity_type, entity_id = $entity_id, \
             contact_type = $i{i}_type, value = $i{i}_value, public = $i{i}_public, \
             validated_at = $i{i}_validated_at;"
        )
    }));
    transaction(statements)
}

impl<C: Connection> ChildStorage for SurrealStorage<C> {
    async fn apply_attributes(&self, owner: Owner, delta: &AttributeDelta) -> StoreResult<()> {
        debug!(
            owner = owner.kind.as_str(),
            owner_id = %owner.id,
            mutations = delta.len(),
            "Applying attribute delta"
        );
        let mut builder = self
            .db
            .query(attribute_script(delta))
            .bind(("entity_type", owner.kind.as_str()))
            .bind(("entity_id", owner.id.to_string()))
            .bind(("deleted", delta.delete.clone()));
        for (i, (key, value)) in delta.update.iter().enumerate() {
            builder = builder
                .bind((format!("u{i}_key"), key.clone()))
                .bind((format!("u{i}_value"), value.clone()));
        }
        for (i, (key, value)) in delta.insert.iter().enumerate() {
            builder = builder
                .bind((format!("i{i}_key"), key.clone()))
                .bind((format!("i{i}_value"), value.clone()));
        }

        builder.await.map_err(DbError::from)?.check().map_err(DbError::from)?;
        Ok(())
    }

    async fn apply_contact_info(&self, owner: Owner, delta: &ContactInfoDelta) -> StoreResult<()> {
        debug!(
            owner = owner.kind.as_str(),
            owner_id = %owner.id,
            mutations = delta.len(),
            "Applying contact info delta"
        );
        let mut builder = self
            .db
            .query(contact_info_script(delta))
            .bind(("entity_type", owner.kind.as_str()))
            .bind(("entity_id", owner.id.to_string()));
        for (i, key) in delta.delete.iter().enumerate() {
            builder = builder
                .bind((format!("d{i}_type"), contact_type_to_string(key.contact_type)))
                .bind((format!("d{i}_value"), key.value.clone()));
        }
        for (i, (key, state)) in delta.update.iter().enumerate() {
            builder = builder
                .bind((format!("u{i}_type"), contact_type_to_string(key.contact_type)))
                .bind((format!("u{i}_value"), key.value.clone()))
                .bind((format!("u{i}_public"), state.public))
                .bind((format!("u{i}_validated_at"), state.validated_at));
        }
        for (i, (key, state)) in delta.insert.iter().enumerate() {
            builder = builder
                .bind((format!("i{i}_type"), contact_type_to_string(key.contact_type)))
                .bind((format!("i{i}_value"), key.value.clone()))
                .bind((format!("i{i}_public"), state.public))
                .bind((format!("i{i}_validated_at"), state.validated_at));
        }

        builder.await.map_err(DbError::from)?.check().map_err(DbError::from)?;
        Ok(())
    }
}
