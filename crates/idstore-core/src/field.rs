//! Field registry: per-entity mapping from field mask paths to projectors,
//! hydrators and storage columns.

use std::collections::HashMap;

use crate::entity::Model;

/// Well-known field mask paths.
pub mod paths {
    pub const NAME: &str = "name";
    pub const DESCRIPTION: &str = "description";
    pub const ATTRIBUTES: &str = "attributes";
    pub const CONTACT_INFO: &str = "contact_info";
    pub const SECRET: &str = "secret";
    pub const REDIRECT_URIS: &str = "redirect_uris";
    pub const STATE: &str = "state";
    pub const SKIP_AUTHORIZATION: &str = "skip_authorization";
    pub const ENDORSED: &str = "endorsed";
    pub const GRANTS: &str = "grants";
    pub const RIGHTS: &str = "rights";
}

/// Copies one field from the storage model into the wire record.
pub type Projector<M> = fn(&M, &mut <M as Model>::External);

/// Copies one field from the wire record into the storage model.
pub type Hydrator<M> = fn(&mut M, &<M as Model>::External);

/// A child collection attached to an entity through a polymorphic owner
/// reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Relation {
    Attributes,
    ContactInfo,
}

impl Relation {
    pub const ALL: [Relation; 2] = [Relation::Attributes, Relation::ContactInfo];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Attributes => "attributes",
            Self::ContactInfo => "contact_info",
        }
    }
}

/// Where a path lands in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    /// A row column named like the path.
    Path,
    /// A row column with a different name.
    Renamed(&'static str),
    /// A child collection; reported as a marker in touched columns but
    /// written by the reconciler, never as a row column.
    Relation(Relation),
    /// Hydration mutates state that has no column at all.
    Unmapped,
}

pub struct FieldSpec<M: Model> {
    pub path: &'static str,
    pub column: Column,
    pub project: Projector<M>,
    pub hydrate: Hydrator<M>,
}

impl<M: Model> FieldSpec<M> {
    /// Storage name reported for this path, `None` when unmapped.
    pub fn column_name(&self) -> Option<&'static str> {
        match self.column {
            Column::Path => Some(self.path),
            Column::Renamed(name) => Some(name),
            Column::Relation(relation) => Some(relation.as_str()),
            Column::Unmapped => None,
        }
    }

    /// Row column written for this path, if any.
    pub fn row_column(&self) -> Option<&'static str> {
        match self.column {
            Column::Path => Some(self.path),
            Column::Renamed(name) => Some(name),
            Column::Relation(_) | Column::Unmapped => None,
        }
    }

    pub fn relation(&self) -> Option<Relation> {
        match self.column {
            Column::Relation(relation) => Some(relation),
            _ => None,
        }
    }
}

/// Immutable table of registered fields for one entity type.
///
/// Built once during startup and shared read-only afterwards. The default
/// field mask is the set of registered paths in registration order.
pub struct FieldRegistry<M: Model> {
    entity: &'static str,
    fields: Vec<FieldSpec<M>>,
    index: HashMap<&'static str, usize>,
}

impl<M: Model> FieldRegistry<M> {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            fields: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a path stored in the column of the same name.
    #[must_use]
    pub fn register(self, path: &'static str, project: Projector<M>, hydrate: Hydrator<M>) -> Self {
        self.register_column(path, Column::Path, project, hydrate)
    }

    /// Register a path with an explicit storage target.
    ///
    /// # Panics
    ///
    /// Panics if `path` is already registered.
    #[must_use]
    pub fn register_column(
        mut self,
        path: &'static str,
        column: Column,
        project: Projector<M>,
        hydrate: Hydrator<M>,
    ) -> Self {
        assert!(
            !self.index.contains_key(path),
            "field `{path}` registered twice for {}",
            self.entity
        );
        self.index.insert(path, self.fields.len());
        self.fields.push(FieldSpec {
            path,
            column,
            project,
            hydrate,
        });
        self
    }

    pub fn entity(&self) -> &'static str {
        self.entity
    }

    pub fn get(&self, path: &str) -> Option<&FieldSpec<M>> {
        self.index.get(path).map(|&i| &self.fields[i])
    }

    pub fn contains(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// Paths substituted for an empty or absent field mask.
    pub fn default_paths(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.path)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
