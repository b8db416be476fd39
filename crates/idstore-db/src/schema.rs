//! Schema definitions and migration runner for SurrealDB.
//!
//! All tables are SCHEMAFULL. Record ids are UUID strings; external
//! identifiers live in their own uniquely indexed column. Enumerations are
//! stored as strings with ASSERT constraints; enumeration lists use
//! literal union element types.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "entity_tables",
        sql: SCHEMA_V1,
    },
    Migration {
        version: 2,
        name: "child_collections",
        sql: SCHEMA_V2,
    },
];

// -----------------------------------------------------------------------
// Schema v1: entity tables
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE organization TYPE string;
DEFINE FIELD name ON TABLE organization TYPE string DEFAULT '';
DEFINE FIELD description ON TABLE organization TYPE string DEFAULT '';
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE organization TYPE option<datetime>;
DEFINE INDEX idx_organization_external_id ON TABLE organization \
    COLUMNS organization_id UNIQUE;

-- =======================================================================
-- OAuth clients
-- =======================================================================
DEFINE TABLE client SCHEMAFULL;
DEFINE FIELD client_id ON TABLE client TYPE string;
DEFINE FIELD name ON TABLE client TYPE string DEFAULT '';
DEFINE FIELD description ON TABLE client TYPE string DEFAULT '';
DEFINE FIELD client_secret ON TABLE client TYPE string DEFAULT '';
DEFINE FIELD redirect_uris ON TABLE client TYPE array<string> DEFAULT [];
DEFINE FIELD state ON TABLE client TYPE string DEFAULT 'Requested' \
    ASSERT $value IN ['Requested', 'Approved', 'Rejected', 'Flagged', \
    'Suspended'];
DEFINE FIELD skip_authorization ON TABLE client TYPE bool DEFAULT false;
DEFINE FIELD endorsed ON TABLE client TYPE bool DEFAULT false;
DEFINE FIELD grants ON TABLE client \
    TYPE array<'AuthorizationCode' | 'Password' | 'RefreshToken'> DEFAULT [];
DEFINE FIELD rights ON TABLE client \
    TYPE array<'UserInfo' | 'UserSettingsBasic' | 'UserApplicationsList' \
    | 'ClientAll' | 'OrganizationInfo' | 'OrganizationSettingsBasic' \
    | 'OrganizationApplicationsList' | 'ApplicationInfo' \
    | 'ApplicationSettingsBasic'> DEFAULT [];
DEFINE FIELD created_at ON TABLE client TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE client TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD deleted_at ON TABLE client TYPE option<datetime>;
DEFINE INDEX idx_client_external_id ON TABLE client \
    COLUMNS client_id UNIQUE;
";

// -----------------------------------------------------------------------
// Schema v2: child collections owned by any entity
// -----------------------------------------------------------------------

const SCHEMA_V2: &str = "\
-- =======================================================================
-- Attributes (key/value pairs)
-- =======================================================================
DEFINE TABLE attribute SCHEMAFULL;
DEFINE FIELD entity_type ON TABLE attribute TYPE string \
    ASSERT $value IN ['organization', 'client'];
DEFINE FIELD entity_id ON TABLE attribute TYPE string;
DEFINE FIELD key ON TABLE attribute TYPE string;
DEFINE FIELD value ON TABLE attribute TYPE string;
DEFINE INDEX idx_attribute_owner_key ON TABLE attribute \
    COLUMNS entity_type, entity_id, key UNIQUE;

-- =======================================================================
-- Contact info
-- =======================================================================
DEFINE TABLE contact_info SCHEMAFULL;
DEFINE FIELD entity_type ON TABLE contact_info TYPE string \
    ASSERT $value IN ['organization', 'client'];
DEFINE FIELD entity_id ON TABLE contact_info TYPE string;
DEFINE FIELD contact_type ON TABLE contact_info TYPE string \
    ASSERT $value IN ['Other', 'Abuse', 'Billing', 'Technical'];
DEFINE FIELD value ON TABLE contact_info TYPE string;
DEFINE FIELD public ON TABLE contact_info TYPE bool DEFAULT false;
DEFINE FIELD validated_at ON TABLE contact_info TYPE option<datetime>;
DEFINE INDEX idx_contact_info_owner_key ON TABLE contact_info \
    COLUMNS entity_type, entity_id, contact_type, value UNIQUE;
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum and records
/// it. Running twice is a no-op.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    let mut result = db
        .query("SELECT version FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        info!(
            version = migration.version,
            name = migration.name,
            "Applying migration"
        );
        db.query(migration.sql).await?.check().map_err(|e| {
            DbError::Migration(format!(
                "v{} '{}' failed: {}",
                migration.version, migration.name, e,
            ))
        })?;

        db.query("CREATE _migration SET version = $version, name = $name")
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "could not record v{}: {}",
                    migration.version, e,
                ))
            })?;
    }

    info!(
        version = MIGRATIONS.last().map(|m| m.version).unwrap_or(0),
        "Schema up to date"
    );
    Ok(())
}

/// Returns the raw entity table DDL.
///
/// Exposed for tests that provision in-memory instances by hand.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_ordered() {
        for window in MIGRATIONS.windows(2) {
            assert!(
                window[0].version < window[1].version,
                "Migrations must be in ascending version order"
            );
        }
    }

    #[test]
    fn every_table_is_schemafull() {
        for migration in MIGRATIONS {
            for line in migration.sql.lines().filter(|l| l.starts_with("DEFINE TABLE")) {
                assert!(line.ends_with("SCHEMAFULL;"), "{line}");
            }
        }
    }
}
