//! Traits binding a storage model to its wire representation.

use chrono::{DateTime, Utc};

use crate::field::FieldRegistry;
use crate::models::common::{Attributes, ModelBase, OwnerKind};
use crate::models::contact_info::ContactInfo;

/// A wire-level entity record as exchanged with API clients.
///
/// Identity and timestamps are always present on the wire; every other
/// field is populated only when its path is part of the field mask.
pub trait WireEntity: Default + Clone + Send + Sync + 'static {
    fn external_id(&self) -> &str;

    /// The caller's view of the last update time, used for optimistic
    /// concurrency on updates.
    fn updated_at(&self) -> Option<DateTime<Utc>>;

    fn set_identity(
        &mut self,
        external_id: &str,
        created_at: Option<DateTime<Utc>>,
        updated_at: Option<DateTime<Utc>>,
    );
}

/// A storage row for one entity type, including its polymorphic child
/// collections.
pub trait Model: Default + Clone + Send + Sync + 'static {
    type External: WireEntity;

    /// Discriminator used for child collections owned by this entity.
    const OWNER: OwnerKind;
    /// Field mask path of the external identifier.
    const ID_PATH: &'static str;
    /// Storage column holding the external identifier.
    const ID_COLUMN: &'static str;

    /// The process-wide registry for this entity type.
    fn fields() -> &'static FieldRegistry<Self>;

    fn base(&self) -> &ModelBase;
    fn base_mut(&mut self) -> &mut ModelBase;

    fn external_id(&self) -> &str;
    fn set_external_id(&mut self, external_id: String);

    fn attributes(&self) -> &Attributes;
    fn attributes_mut(&mut self) -> &mut Attributes;

    fn contact_info(&self) -> &[ContactInfo];
    fn contact_info_mut(&mut self) -> &mut Vec<ContactInfo>;

    fn entity() -> &'static str {
        Self::OWNER.as_str()
    }
}
