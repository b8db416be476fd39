//! OAuth client entity.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::{Model, WireEntity};
use crate::field::{Column, FieldRegistry, Relation, paths};
use crate::models::common::{Attributes, ModelBase, OwnerKind};
use crate::models::contact_info::{ContactInfo, dedup_contact_info};

/// Review state of a client.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum State {
    #[default]
    Requested,
    Approved,
    Rejected,
    Flagged,
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantType {
    AuthorizationCode,
    Password,
    RefreshToken,
}

/// Rights a client may be granted on behalf of a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Right {
    UserInfo,
    UserSettingsBasic,
    UserApplicationsList,
    ClientAll,
    OrganizationInfo,
    OrganizationSettingsBasic,
    OrganizationApplicationsList,
    ApplicationInfo,
    ApplicationSettingsBasic,
}

/// Wire representation of a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub client_id: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub name: String,
    pub description: String,
    pub attributes: Attributes,
    pub contact_info: Vec<ContactInfo>,
    pub secret: String,
    pub redirect_uris: Vec<String>,
    pub state: State,
    pub skip_authorization: bool,
    pub endorsed: bool,
    pub grants: Vec<GrantType>,
    pub rights: Vec<Right>,
}

impl WireEntity for Client {
    fn external_id(&self) -> &str {
        &self.client_id
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
        external_id.clone_into(&mut self.client_id);
        self.created_at = created_at;
        self.updated_at = updated_at;
    }
}

/// Storage row of a client.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientModel {
    pub base: ModelBase,
    pub client_id: String,
    pub name: String,
    pub description: String,
    pub attributes: Attributes,
    pub contact_info: Vec<ContactInfo>,
    pub client_secret: String,
    pub redirect_uris: Vec<String>,
    pub state: State,
    pub skip_authorization: bool,
    pub endorsed: bool,
    pub grants: Vec<GrantType>,
    pub rights: Vec<Right>,
}

static CLIENT_FIELDS: LazyLock<FieldRegistry<ClientModel>> = LazyLock::new(|| {
    FieldRegistry::<ClientModel>::new(OwnerKind::Client.as_str())
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
        .register_column(
            paths::SECRET,
            Column::Renamed("client_secret"),
            |m, pb| pb.secret.clone_from(&m.client_secret),
            |m, pb| m.client_secret.clone_from(&pb.secret),
        )
        .register(
            paths::REDIRECT_URIS,
            |m, pb| pb.redirect_uris.clone_from(&m.redirect_uris),
            |m, pb| m.redirect_uris.clone_from(&pb.redirect_uris),
        )
        .register(
            paths::STATE,
            |m, pb| pb.state = m.state,
            |m, pb| m.state = pb.state,
        )
        .register(
            paths::SKIP_AUTHORIZATION,
            |m, pb| pb.skip_authorization = m.skip_authorization,
            |m, pb| m.skip_authorization = pb.skip_authorization,
        )
        .register(
            paths::ENDORSED,
            |m, pb| pb.endorsed = m.endorsed,
            |m, pb| m.endorsed = pb.endorsed,
        )
        .register(
            paths::GRANTS,
            |m, pb| pb.grants.clone_from(&m.grants),
            |m, pb| m.grants.clone_from(&pb.grants),
        )
        .register(
            paths::RIGHTS,
            |m, pb| pb.rights.clone_from(&m.rights),
            |m, pb| {
                let mut rights = pb.rights.clone();
                rights.sort_unstable();
                rights.dedup();
                m.rights = rights;
            },
        )
});

impl Model for ClientModel {
    type External = Client;

    const OWNER: OwnerKind = OwnerKind::Client;
    const ID_PATH: &'static str = "ids.client_id";
    const ID_COLUMN: &'static str = "client_id";

    fn fields() -> &'static FieldRegistry<Self> {
        &CLIENT_FIELDS
    }

    fn base(&self) -> &ModelBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ModelBase {
        &mut self.base
    }

    fn external_id(&self) -> &str {
        &self.client_id
    }

    fn set_external_id(&mut self, external_id: String) {
        self.client_id = external_id;
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
