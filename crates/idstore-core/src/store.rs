//! Store operations: create, find, get, update and delete for any entity
//! model, driven by field masks.

use tracing::{debug, warn};

use crate::context::CallContext;
use crate::entity::{Model, WireEntity};
use crate::error::{StoreError, StoreResult};
use crate::field::{FieldRegistry, Relation};
use crate::mapper::{clean_time, from_external, to_external};
use crate::mask::{FieldMask, ResolvedMask};
use crate::models::client::ClientModel;
use crate::models::common::{Attributes, Owner};
use crate::models::contact_info::ContactInfo;
use crate::models::organization::OrganizationModel;
use crate::plan::ProjectionPlan;
use crate::reconcile::{replace_attributes, replace_contact_info};
use crate::repository::{ChildStorage, EntityStorage, ScopedQuery};

/// Raised when storage hands back a row without a surrogate key.
#[derive(Debug, thiserror::Error)]
#[error("{entity} `{id}` has no surrogate key")]
struct MissingSurrogateKey {
    entity: &'static str,
    id: String,
}

/// Mask-driven persistence for one entity type.
///
/// Generic over the storage backend so that the mapping layer has no
/// dependency on the database crate. The field registry is injected at
/// construction.
pub struct Store<S, M: Model> {
    storage: S,
    fields: &'static FieldRegistry<M>,
}

pub type OrganizationStore<S> = Store<S, OrganizationModel>;
pub type ClientStore<S> = Store<S, ClientModel>;

impl<S, M> Store<S, M>
where
    S: EntityStorage<M> + ChildStorage,
    M: Model,
{
    pub fn new(storage: S, fields: &'static FieldRegistry<M>) -> Self {
        Self { storage, fields }
    }

    /// A store using the entity's process-wide registry.
    pub fn with_default_fields(storage: S) -> Self {
        Self::new(storage, M::fields())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn fields(&self) -> &'static FieldRegistry<M> {
        self.fields
    }

    /// Insert a new entity built from every registered field of `entity`.
    ///
    /// Insertion failures (such as a duplicate external identifier) are
    /// returned unchanged. The result carries the storage-assigned
    /// timestamps.
    pub async fn create(&self, entity: &M::External) -> StoreResult<M::External> {
        let mask = ResolvedMask::resolve(self.fields, &FieldMask::all());
        let mut model = M::default();
        model.set_external_id(entity.external_id().to_owned());
        let touched = from_external(self.fields, &mut model, entity, &mask);

        debug!(entity = M::entity(), id = entity.external_id(), "Creating entity");
        self.storage.insert(&mut model).await?;
        let owner = owner_of(&model)?;

        let mut committed = vec![M::ID_COLUMN.to_owned()];
        committed.extend(touched.row_columns().iter().map(|&c| c.to_owned()));
        self.reconcile(
            &model,
            owner,
            &Attributes::new(),
            &[],
            &mut committed,
        )
        .await?;

        Ok(to_external(self.fields, &model, &mask))
    }

    /// Entities matching `ids` (all entities when empty), projected to
    /// `mask`. Missing identifiers are skipped.
    ///
    /// The total number of matches is reported through `ctx`.
    pub async fn find(
        &self,
        ctx: &CallContext,
        ids: &[&str],
        mask: &FieldMask,
    ) -> StoreResult<Vec<M::External>> {
        let resolved = ResolvedMask::resolve(self.fields, mask);
        let plan = ProjectionPlan::for_mask::<M>(&resolved, ctx.pagination());
        let query = ScopedQuery::new(ids.iter().map(|&id| id.to_owned()).collect(), plan);

        if query.plan.pagination.is_some() {
            let total = self.storage.count(&query).await?;
            ctx.set_total(total);
        }
        let models = self.storage.find(&query).await?;
        ctx.set_total(models.len() as u64);

        debug!(
            entity = M::entity(),
            requested = ids.len(),
            found = models.len(),
            "Found entities"
        );
        Ok(models
            .iter()
            .map(|model| to_external(self.fields, model, &resolved))
            .collect())
    }

    pub async fn get(&self, id: &str, mask: &FieldMask) -> StoreResult<M::External> {
        let resolved = ResolvedMask::resolve(self.fields, mask);
        let plan = ProjectionPlan::for_mask::<M>(&resolved, None);
        let model = self.fetch(id, plan).await?;
        Ok(to_external(self.fields, &model, &resolved))
    }

    /// Apply the fields of `entity` selected by `mask` to the stored entity.
    ///
    /// Rejected with [`StoreError::Conflict`] when `entity.updated_at` is
    /// set and differs from the stored value. Cancellation is checked once,
    /// right before the first write.
    pub async fn update(
        &self,
        ctx: &CallContext,
        entity: &M::External,
        mask: &FieldMask,
    ) -> StoreResult<M::External> {
        let id = entity.external_id();
        let resolved = ResolvedMask::resolve(self.fields, mask);
        let mut model = self.fetch(id, ProjectionPlan::full(None)).await?;

        let expected = clean_time(entity.updated_at());
        if expected.is_some() && model.base().updated_at != expected {
            debug!(entity = M::entity(), id, "Rejecting stale update");
            return Err(StoreError::Conflict {
                entity: M::entity(),
                id: id.to_owned(),
            });
        }
        if ctx.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        let old_attributes = model.attributes().clone();
        let old_contact_info = model.contact_info().to_vec();
        let touched = from_external(self.fields, &mut model, entity, &resolved);
        let owner = owner_of(&model)?;

        let mut committed = Vec::new();
        let columns = touched.row_columns();
        if !columns.is_empty() {
            debug!(entity = M::entity(), id, columns = ?columns, "Updating columns");
            self.storage.update_columns(&mut model, &columns).await?;
            committed.extend(columns.iter().map(|&c| c.to_owned()));
        }
        self.reconcile(
            &model,
            owner,
            &old_attributes,
            &old_contact_info,
            &mut committed,
        )
        .await?;

        Ok(to_external(self.fields, &model, &resolved))
    }

    /// Soft-delete the entity.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let model = self.fetch(id, ProjectionPlan::identity_only()).await?;
        let owner = owner_of(&model)?;
        debug!(entity = M::entity(), id, "Deleting entity");
        self.storage.soft_delete(owner.id).await
    }

    async fn fetch(&self, id: &str, plan: ProjectionPlan) -> StoreResult<M> {
        self.storage
            .first(&ScopedQuery::by_id(id, plan))
            .await?
            .ok_or_else(|| StoreError::NotFound {
                entity: M::entity(),
                id: id.to_owned(),
            })
    }

    /// Write the child collection deltas between the given old states and
    /// `model`. Failures after something was committed become
    /// [`StoreError::PartialWrite`].
    async fn reconcile(
        &self,
        model: &M,
        owner: Owner,
        old_attributes: &Attributes,
        old_contact_info: &[ContactInfo],
        committed: &mut Vec<String>,
    ) -> StoreResult<()> {
        let written =
            replace_attributes(&self.storage, owner, old_attributes, model.attributes())
                .await
                .map_err(|err| partial_write::<M>(model, committed, err))?;
        if written > 0 {
            committed.push(Relation::Attributes.as_str().to_owned());
        }
        let written =
            replace_contact_info(&self.storage, owner, old_contact_info, model.contact_info())
                .await
                .map_err(|err| partial_write::<M>(model, committed, err))?;
        if written > 0 {
            committed.push(Relation::ContactInfo.as_str().to_owned());
        }
        Ok(())
    }
}

fn owner_of<M: Model>(model: &M) -> StoreResult<Owner> {
    match model.base().id {
        Some(id) => Ok(Owner { kind: M::OWNER, id }),
        None => Err(StoreError::storage(MissingSurrogateKey {
            entity: M::entity(),
            id: model.external_id().to_owned(),
        })),
    }
}

fn partial_write<M: Model>(model: &M, committed: &[String], err: StoreError) -> StoreError {
    if committed.is_empty() {
        return err;
    }
    warn!(
        entity = M::entity(),
        id = model.external_id(),
        committed = ?committed,
        error = %err,
        "Child collection write failed after partial commit"
    );
    StoreError::PartialWrite {
        entity: M::entity(),
        id: model.external_id().to_owned(),
        committed: committed.to_vec(),
        source: Box::new(err),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use chrono::{DateTime, Duration, TimeZone, Utc};
    use tokio_util::sync::CancellationToken;
    use uuid::Uuid;

    use super::*;
    use crate::field::paths;
    use crate::models::contact_info::ContactType;
    use crate::models::organization::Organization;
    use crate::plan::Selection;
    use crate::reconcile::{AttributeDelta, ContactInfoDelta};
    use crate::repository::Pagination;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct FakeError(&'static str);

    /// In-process organization storage that records every mutation.
    #[derive(Default)]
    struct MemoryStorage {
        rows: Mutex<Vec<OrganizationModel>>,
        attributes: Mutex<HashMap<Uuid, Attributes>>,
        contact_info: Mutex<HashMap<Uuid, Vec<ContactInfo>>>,
        clock: AtomicUsize,
        row_writes: AtomicUsize,
        child_mutations: AtomicUsize,
        fail_contact_info: AtomicBool,
        last_columns: Mutex<Vec<&'static str>>,
    }

    impl MemoryStorage {
        fn tick(&self) -> DateTime<Utc> {
            let n = self.clock.fetch_add(1, Ordering::SeqCst) as i64;
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(n + 1)
        }

        fn matching(&self, query: &ScopedQuery) -> Vec<OrganizationModel> {
            let rows = self.rows.lock().unwrap();
            rows.iter()
                .filter(|r| r.base.deleted_at.is_none())
                .filter(|r| {
                    query.external_ids.is_empty()
                        || query.external_ids.contains(&r.organization_id)
                })
                .cloned()
                .collect()
        }

        fn stored(&self, id: &str) -> OrganizationModel {
            let rows = self.rows.lock().unwrap();
            rows.iter()
                .find(|r| r.organization_id == id)
                .cloned()
                .unwrap()
        }
    }

    impl EntityStorage<OrganizationModel> for MemoryStorage {
        async fn find(&self, query: &ScopedQuery) -> StoreResult<Vec<OrganizationModel>> {
            let mut rows = self.matching(query);
            if let Some(page) = query.plan.pagination {
                rows = rows
                    .into_iter()
                    .skip(page.offset as usize)
                    .take(page.limit as usize)
                    .collect();
            }
            for row in &mut rows {
                let id = row.base.id.unwrap();
                if query.plan.preloads(Relation::Attributes) {
                    row.attributes = self
                        .attributes
                        .lock()
                        .unwrap()
                        .get(&id)
                        .cloned()
                        .unwrap_or_default();
                }
                if query.plan.preloads(Relation::ContactInfo) {
                    row.contact_info = self
                        .contact_info
                        .lock()
                        .unwrap()
                        .get(&id)
                        .cloned()
                        .unwrap_or_default();
                }
                if !query.plan.selection.includes("name") {
                    row.name.clear();
                }
                if !query.plan.selection.includes("description") {
                    row.description.clear();
                }
            }
            Ok(rows)
        }

        async fn first(&self, query: &ScopedQuery) -> StoreResult<Option<OrganizationModel>> {
            Ok(self.find(query).await?.into_iter().next())
        }

        async fn count(&self, query: &ScopedQuery) -> StoreResult<u64> {
            Ok(self.matching(query).len() as u64)
        }

        async fn insert(&self, model: &mut OrganizationModel) -> StoreResult<()> {
            let now = self.tick();
            let mut rows = self.rows.lock().unwrap();
            if rows.iter().any(|r| r.organization_id == model.organization_id) {
                return Err(StoreError::storage(FakeError("duplicate organization_id")));
            }
            model.base.id = Some(Uuid::new_v4());
            model.base.created_at = Some(now);
            model.base.updated_at = Some(now);
            let mut row = model.clone();
            row.attributes.clear();
            row.contact_info.clear();
            rows.push(row);
            Ok(())
        }

        async fn update_columns(
            &self,
            model: &mut OrganizationModel,
            columns: &[&'static str],
        ) -> StoreResult<()> {
            let now = self.tick();
            let mut rows = self.rows.lock().unwrap();
            let row = rows.iter_mut().find(|r| r.base.id == model.base.id).unwrap();
            for column in columns {
                match *column {
                    "name" => row.name.clone_from(&model.name),
                    "description" => row.description.clone_from(&model.description),
                    other => panic!("unexpected column {other}"),
                }
            }
            row.base.updated_at = Some(now);
            model.base.updated_at = Some(now);
            self.row_writes.fetch_add(1, Ordering::SeqCst);
            *self.last_columns.lock().unwrap() = columns.to_vec();
            Ok(())
        }

        async fn soft_delete(&self, id: Uuid) -> StoreResult<()> {
            let now = self.tick();
            let mut rows = self.rows.lock().unwrap();
            if let Some(row) = rows.iter_mut().find(|r| r.base.id == Some(id)) {
                row.base.deleted_at = Some(now);
            }
            Ok(())
        }
    }

    impl ChildStorage for MemoryStorage {
        async fn apply_attributes(&self, owner: Owner, delta: &AttributeDelta) -> StoreResult<()> {
            let mut all = self.attributes.lock().unwrap();
            let attributes = all.entry(owner.id).or_default();
            for key in &delta.delete {
                attributes.remove(key);
            }
            for (key, value) in delta.update.iter().chain(&delta.insert) {
                attributes.insert(key.clone(), value.clone());
            }
            self.child_mutations.fetch_add(delta.len(), Ordering::SeqCst);
            Ok(())
        }

        async fn apply_contact_info(
            &self,
            owner: Owner,
            delta: &ContactInfoDelta,
        ) -> StoreResult<()> {
            if self.fail_contact_info.load(Ordering::SeqCst) {
                return Err(StoreError::storage(FakeError("contact_info unavailable")));
            }
            let mut all = self.contact_info.lock().unwrap();
            let entries = all.entry(owner.id).or_default();
            entries.retain(|e| !delta.delete.contains(&e.key()));
            for (key, state) in &delta.update {
                if let Some(entry) = entries.iter_mut().find(|e| &e.key() == key) {
                    entry.public = state.public;
                    entry.validated_at = state.validated_at;
                }
            }
            for (key, state) in &delta.insert {
                entries.push(ContactInfo::from_parts(key.clone(), *state));
            }
            self.child_mutations.fetch_add(delta.len(), Ordering::SeqCst);
            Ok(())
        }
    }

    fn store() -> OrganizationStore<MemoryStorage> {
        Store::with_default_fields(MemoryStorage::default())
    }

    fn org(id: &str, name: &str) -> Organization {
        Organization {
            organization_id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    async fn seeded() -> OrganizationStore<MemoryStorage> {
        let store = store();
        store.create(&org("org-1", "Alpha")).await.unwrap();
        store
    }

    #[tokio::test]
    async fn create_returns_storage_assigned_fields() {
        let store = store();
        let created = store.create(&org("org-1", "Alpha")).await.unwrap();
        assert_eq!(created.organization_id, "org-1");
        assert_eq!(created.name, "Alpha");
        assert!(created.created_at.is_some());
        assert!(created.updated_at.is_some());
        assert!(created.attributes.is_empty());
        assert_eq!(store.storage().child_mutations.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn create_writes_initial_child_collections() {
        let store = store();
        let mut input = org("org-1", "Alpha");
        input.attributes.insert("env".into(), "prod".into());
        let created = store.create(&input).await.unwrap();
        assert_eq!(created.attributes["env"], "prod");
        assert_eq!(store.storage().child_mutations.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_create_surfaces_storage_error() {
        let store = seeded().await;
        let err = store.create(&org("org-1", "Again")).await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
        assert_eq!(err.to_string(), "storage failure: duplicate organization_id");
    }

    #[tokio::test]
    async fn get_projects_only_masked_fields() {
        let store = store();
        let mut input = org("org-1", "Alpha");
        input.description = "first".into();
        store.create(&input).await.unwrap();

        let got = store.get("org-1", &FieldMask::new([paths::NAME])).await.unwrap();
        assert_eq!(got.name, "Alpha");
        assert_eq!(got.description, "");
        assert!(got.created_at.is_some());
        assert!(got.updated_at.is_some());
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let err = store().get("nope", &FieldMask::all()).await.unwrap_err();
        assert!(err.equivalent(&StoreError::NotFound {
            entity: "organization",
            id: "nope".into()
        }));
    }

    #[tokio::test]
    async fn update_writes_only_masked_columns() {
        let store = seeded().await;
        let mut input = org("org-1", "Beta");
        input.description = "ignored".into();
        let updated = store
            .update(&CallContext::new(), &input, &FieldMask::new([paths::NAME]))
            .await
            .unwrap();
        assert_eq!(updated.name, "Beta");
        assert_eq!(*store.storage().last_columns.lock().unwrap(), vec!["name"]);
        assert_eq!(store.storage().stored("org-1").description, "");
    }

    #[tokio::test]
    async fn repeated_attribute_update_is_idempotent() {
        let store = seeded().await;
        let mut input = org("org-1", "");
        input.attributes.insert("env".into(), "prod".into());
        let mask = FieldMask::new([paths::ATTRIBUTES]);

        let updated = store.update(&CallContext::new(), &input, &mask).await.unwrap();
        assert_eq!(updated.attributes["env"], "prod");
        assert_eq!(store.storage().child_mutations.load(Ordering::SeqCst), 1);
        assert_eq!(store.storage().row_writes.load(Ordering::SeqCst), 0);

        store.update(&CallContext::new(), &input, &mask).await.unwrap();
        assert_eq!(store.storage().child_mutations.load(Ordering::SeqCst), 1);
        assert_eq!(store.storage().row_writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn stale_update_is_rejected_without_mutation() {
        let store = seeded().await;
        let current = store.get("org-1", &FieldMask::all()).await.unwrap();
        let mut input = org("org-1", "Beta");
        input.updated_at = current.updated_at.map(|t| t - Duration::seconds(1));

        let err = store
            .update(&CallContext::new(), &input, &FieldMask::new([paths::NAME]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert_eq!(store.storage().row_writes.load(Ordering::SeqCst), 0);
        assert_eq!(store.storage().stored("org-1").name, "Alpha");
    }

    #[tokio::test]
    async fn matching_timestamp_proceeds() {
        let store = seeded().await;
        let current = store.get("org-1", &FieldMask::all()).await.unwrap();
        let mut input = org("org-1", "Beta");
        input.updated_at = current.updated_at;
        let updated = store
            .update(&CallContext::new(), &input, &FieldMask::new([paths::NAME]))
            .await
            .unwrap();
        assert!(updated.updated_at > current.updated_at);
    }

    #[tokio::test]
    async fn cancelled_update_does_not_write() {
        let store = seeded().await;
        let token = CancellationToken::new();
        token.cancel();
        let ctx = CallContext::new().with_cancellation(token);
        let err = store
            .update(&ctx, &org("org-1", "Beta"), &FieldMask::new([paths::NAME]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Cancelled));
        assert_eq!(store.storage().row_writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn update_of_missing_entity_is_not_found() {
        let err = store()
            .update(&CallContext::new(), &org("nope", "x"), &FieldMask::all())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { ref id, .. } if id == "nope"));
    }

    #[tokio::test]
    async fn child_failure_after_row_write_is_partial_write() {
        let store = seeded().await;
        store.storage().fail_contact_info.store(true, Ordering::SeqCst);
        let mut input = org("org-1", "Beta");
        input.contact_info.push(ContactInfo {
            contact_type: ContactType::Technical,
            value: "ops@example.com".into(),
            public: false,
            validated_at: None,
        });

        let err = store
            .update(
                &CallContext::new(),
                &input,
                &FieldMask::new([paths::NAME, paths::CONTACT_INFO]),
            )
            .await
            .unwrap_err();
        assert_eq!(err.name(), "partial_write");
        assert_eq!(err.details(), vec!["name".to_owned()]);
        assert_eq!(store.storage().stored("org-1").name, "Beta");
    }

    #[tokio::test]
    async fn child_failure_during_create_is_partial_write() {
        let store = store();
        store.storage().fail_contact_info.store(true, Ordering::SeqCst);
        let mut input = org("org-1", "Alpha");
        input.description = "first".into();
        input.contact_info.push(ContactInfo {
            contact_type: ContactType::Billing,
            value: "billing@example.com".into(),
            public: false,
            validated_at: None,
        });

        let err = store.create(&input).await.unwrap_err();
        assert_eq!(err.name(), "partial_write");
        assert_eq!(
            err.details(),
            vec![
                "organization_id".to_owned(),
                "name".to_owned(),
                "description".to_owned()
            ]
        );

        let row = store.storage().stored("org-1");
        assert_eq!(row.name, "Alpha");
        let owner = row.base.id.unwrap();
        assert!(!store.storage().contact_info.lock().unwrap().contains_key(&owner));
    }

    #[tokio::test]
    async fn child_failure_without_prior_write_passes_through() {
        let store = seeded().await;
        store.storage().fail_contact_info.store(true, Ordering::SeqCst);
        let mut input = org("org-1", "");
        input.contact_info.push(ContactInfo {
            contact_type: ContactType::Abuse,
            value: "abuse@example.com".into(),
            public: true,
            validated_at: None,
        });
        let err = store
            .update(&CallContext::new(), &input, &FieldMask::new([paths::CONTACT_INFO]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Storage(_)));
    }

    #[tokio::test]
    async fn unknown_paths_are_ignored() {
        let store = seeded().await;
        let updated = store
            .update(
                &CallContext::new(),
                &org("org-1", "Beta"),
                &FieldMask::new(["not_yet_invented"]),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "");
        assert_eq!(store.storage().row_writes.load(Ordering::SeqCst), 0);
        assert_eq!(store.storage().stored("org-1").name, "Alpha");
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let store = seeded().await;
        store.delete("org-1").await.unwrap();
        let err = store.get("org-1", &FieldMask::all()).await.unwrap_err();
        assert_eq!(err.attributes()["id"], "org-1");
        assert_eq!(err.name(), "not_found");
        assert!(matches!(store.delete("org-1").await, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn find_skips_missing_identifiers() {
        let store = seeded().await;
        let ctx = CallContext::new();
        let found = store
            .find(&ctx, &["org-1", "org-missing"], &FieldMask::all())
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].organization_id, "org-1");
        assert_eq!(ctx.total(), Some(1));
    }

    #[tokio::test]
    async fn paginated_find_reports_total_separately() {
        let store = store();
        for i in 0..5 {
            store.create(&org(&format!("org-{i}"), "x")).await.unwrap();
        }
        let ctx = CallContext::new().with_pagination(Pagination {
            offset: 1,
            limit: 2,
        });
        let page = store.find(&ctx, &[], &FieldMask::new([paths::NAME])).await.unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].organization_id, "org-1");
        assert_eq!(ctx.total(), Some(5));
    }

    #[test]
    fn partial_mask_plans_columns() {
        let mask = ResolvedMask::resolve(OrganizationModel::fields(), &FieldMask::new([paths::NAME]));
        let plan = ProjectionPlan::for_mask::<OrganizationModel>(&mask, None);
        assert!(plan.selection.includes("name"));
        assert!(!plan.selection.includes("description"));
        assert_ne!(plan.selection, Selection::All);
    }
}
