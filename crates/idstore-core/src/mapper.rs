//! Bidirectional translation between storage models and wire records.

use chrono::{DateTime, Utc};

use crate::entity::{Model, WireEntity};
use crate::field::{FieldRegistry, Relation};
use crate::mask::ResolvedMask;

/// A storage column whose value may have changed during hydration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchedColumn {
    pub name: &'static str,
    /// Set for relation markers, which are not row columns.
    pub relation: Option<Relation>,
}

/// Columns touched by [`from_external`], in mask order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TouchedColumns(Vec<TouchedColumn>);

impl TouchedColumns {
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|c| c.name).collect()
    }

    /// Columns to write on the entity row.
    pub fn row_columns(&self) -> Vec<&'static str> {
        self.0
            .iter()
            .filter(|c| c.relation.is_none())
            .map(|c| c.name)
            .collect()
    }

    pub fn touches(&self, relation: Relation) -> bool {
        self.0.iter().any(|c| c.relation == Some(relation))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Normalize unset or zero timestamps to `None`.
pub fn clean_time(time: Option<DateTime<Utc>>) -> Option<DateTime<Utc>> {
    time.filter(|t| t.timestamp() != 0 || t.timestamp_subsec_nanos() != 0)
}

/// Project `model` into a wire record.
///
/// Identity and timestamps are always set; other fields only for paths in
/// `mask` that have a projector.
pub fn to_external<M: Model>(
    registry: &FieldRegistry<M>,
    model: &M,
    mask: &ResolvedMask,
) -> M::External {
    let mut external = M::External::default();
    let base = model.base();
    external.set_identity(
        model.external_id(),
        clean_time(base.created_at),
        clean_time(base.updated_at),
    );
    for path in mask.paths() {
        if let Some(spec) = registry.get(path) {
            (spec.project)(model, &mut external);
        }
    }
    external
}

/// Hydrate `model` from a wire record, returning the touched columns.
///
/// The external identifier is never copied; it is set once at creation.
pub fn from_external<M: Model>(
    registry: &FieldRegistry<M>,
    model: &mut M,
    external: &M::External,
    mask: &ResolvedMask,
) -> TouchedColumns {
    let mut touched = Vec::new();
    for path in mask.paths() {
        let Some(spec) = registry.get(path) else {
            continue;
        };
        (spec.hydrate)(model, external);
        if let Some(name) = spec.column_name() {
            touched.push(TouchedColumn {
                name,
                relation: spec.relation(),
            });
        }
    }
    TouchedColumns(touched)
}
