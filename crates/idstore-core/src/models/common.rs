//! Storage-side types shared by all entity models.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Free-form key/value attributes attached to an entity.
pub type Attributes = BTreeMap<String, String>;

/// Discriminator for the owner of a polymorphic child collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OwnerKind {
    Organization,
    Client,
}

impl OwnerKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Organization => "organization",
            Self::Client => "client",
        }
    }
}

/// Owner reference of a child row: kind plus surrogate key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Owner {
    pub kind: OwnerKind,
    pub id: Uuid,
}

/// Identity and lifecycle columns present on every entity row.
///
/// All of these are assigned by storage; the mapping layer never writes
/// them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelBase {
    /// Surrogate key, `None` until the row is inserted.
    pub id: Option<Uuid>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ModelBase {
    /// Storage columns selected for every query regardless of field mask.
    pub const COLUMNS: [&'static str; 3] = ["id", "created_at", "updated_at"];
}
