//! Projection planning: turns a resolved field mask into the shape of a
//! storage query.

use crate::entity::Model;
use crate::field::Relation;
use crate::mask::{PathKind, ResolvedMask};
use crate::models::common::ModelBase;
use crate::repository::Pagination;

/// Which row columns a query returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Every column of the row.
    All,
    /// Only the listed columns, in order.
    Columns(Vec<&'static str>),
}

impl Selection {
    pub fn includes(&self, column: &str) -> bool {
        match self {
            Self::All => true,
            Self::Columns(columns) => columns.contains(&column),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectionPlan {
    pub selection: Selection,
    /// Child collections to load together with the rows.
    pub preload: Vec<Relation>,
    pub pagination: Option<Pagination>,
}

impl ProjectionPlan {
    /// Plan a query for `mask`.
    ///
    /// A default mask takes the full-fetch path: every column plus every
    /// child collection. Otherwise the base identity and timestamp columns
    /// are always selected, followed by the row columns of the mask's
    /// scalar paths; composite paths add preloads and unknown paths are
    /// dropped.
    pub fn for_mask<M: Model>(mask: &ResolvedMask, pagination: Option<Pagination>) -> Self {
        if mask.is_default() {
            return Self::full(pagination);
        }

        let mut columns: Vec<&'static str> = ModelBase::COLUMNS.to_vec();
        columns.push(M::ID_COLUMN);
        let mut preload = Vec::new();
        for path in mask.iter() {
            match path.kind {
                PathKind::Scalar(Some(column)) => {
                    if !columns.contains(&column) {
                        columns.push(column);
                    }
                }
                PathKind::Composite(relation) => {
                    if !preload.contains(&relation) {
                        preload.push(relation);
                    }
                }
                PathKind::Identifier | PathKind::Scalar(None) | PathKind::Unknown => {}
            }
        }

        Self {
            selection: Selection::Columns(columns),
            preload,
            pagination,
        }
    }

    /// Every column and every child collection.
    pub fn full(pagination: Option<Pagination>) -> Self {
        Self {
            selection: Selection::All,
            preload: Relation::ALL.to_vec(),
            pagination,
        }
    }

    /// Only the surrogate key; used to locate a row before deleting it.
    pub fn identity_only() -> Self {
        Self {
            selection: Selection::Columns(vec!["id"]),
            preload: Vec::new(),
            pagination: None,
        }
    }

    pub fn preloads(&self, relation: Relation) -> bool {
        self.preload.contains(&relation)
    }
}
