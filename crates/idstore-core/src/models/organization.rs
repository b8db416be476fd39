//! Organization entity.
//!
//! Organizations group users and clients under a single administrative
//! entity. The external identifier (`organization_id`) is chosen by the
//! creator and never changes afterwards.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Model, WireEntity};
use crate::field::{Column, FieldRegistry, Relation, paths};
use crate::models::common::{Attributes, ModelBase, OwnerKind};
use crate::models::contact_info::{ContactInfo, dedup_contact_info};

/// Wire representation of an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub organization_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Human-readable name.
    pub name: String,
    pub description: String,
    pub attributes: Attributes,
    pub contact_info: Vec<ContactInfo>,
}

impl WireEntity for Organization {
    fn external_id(&self) -> &str {
        &self.organization_id
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    fn set_identity(
        &mut self,
        external_id: &str,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    ) {
        external_id.clone_into(&mut self.organization_id);
        self.created_at = created_at;
        self.updated_at = updated_at;
    }
}

/// Storage row of an organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrganizationModel {
    pub base: ModelBase,
    pub organization_id: String,
    pub name: String,
    pub description: String,
    pub attributes: Attributes,
    pub contact_info: Vec<ContactInfo>,
}

static ORGANIZATION_FIELDS: LazyLock<FieldRegistry<OrganizationModel>> = LazyLock::new(|| {
    FieldRegistry::<OrganizationModel>::new(OwnerKind::Organization.as_str())
        .register(
            paths::NAME,
            |m, pb| pb.name.clone_from(&m.name),
            |m, pb| m.name.clone_from(&pb.name),
        )
        .register(
            paths::DESCRIPTION,
            |m, pb| pb.description.clone_from(&m.description),
            |m, pb| m.description.clone_from(&pb.description),
        )
        .register_column(
            paths::ATTRIBUTES,
            Column::Relation(Relation::Attributes),
            |m, pb| pb.attributes.clone_from(&m.attributes),
            |m, pb| m.attributes.clone_from(&pb.attributes),
        )
        .register_column(
            paths::CONTACT_INFO,
            Column::Relation(Relation::ContactInfo),
            |m, pb| pb.contact_info.clone_from(&m.contact_info),
            |m, pb| m.contact_info = dedup_contact_info(&pb.contact_info),
        )
});

impl Model for OrganizationModel {
    type External = Organization;

    const OWNER: OwnerKind = OwnerKind::Organization;
    const ID_PATH: &'static str = "ids.organization_id";
    const ID_COLUMN: &'static str = "organization_id";

    fn fields() -> &'static FieldRegistry<Self> {
        &ORGANIZATION_FIELDS
    }

    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn external_id(&self) -> &str {
        &self.organization_id
    }

    fn set_external_id(&mut self, external_id: String) {
        self.organization_id = external_id;
    }

    fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    fn attributes_mut(&mut self) -> &mut Attributes {
        &mut self.attributes
    }

    fn contact_info(&self) -> &[ContactInfo] {
        &self.contact_info
    }

    fn contact_info_mut(&mut self) -> &mut Vec<ContactInfo> {
        &mut self.contact_info
    }
}
