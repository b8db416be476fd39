//! Field mask resolution.
//!
//! A caller-supplied mask is deduplicated, substituted with the registry
//! default when empty, and each path is classified so the planner and the
//! mapper know what to do with it. Paths the registry does not know are
//! kept as [`PathKind::Unknown`] and ignored downstream.

use crate::entity::Model;
use crate::field::{FieldRegistry, Relation};

/// Sparse selection of field paths. Empty means "all known fields".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMask {
    paths: Vec<String>,
}

impl FieldMask {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// The empty mask, resolved to every registered path.
    pub fn all() -> Self {
        Self::default()
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for FieldMask {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// The entity's external identifier; satisfied by the identity filter.
    Identifier,
    /// A registered path with its row column, if it has one.
    Scalar(Option<&'static str>),
    /// A registered path backed by a child collection.
    Composite(Relation),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: String,
    pub kind: PathKind,
}

/// A field mask after deduplication, defaulting and classification.
///
/// Never empty for a registry with at least one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMask {
    paths: Vec<ResolvedPath>,
    is_default: bool,
}

impl ResolvedMask {
    pub fn resolve<M: Model>(registry: &FieldRegistry<M>, mask: &FieldMask) -> Self {
        if mask.is_empty() {
            let paths = registry
                .default_paths()
                .map(|path| ResolvedPath {
                    path: path.to_owned(),
                    kind: classify(registry, path),
                })
                .collect();
            return Self {
                paths,
                is_default: true,
            };
        }

        let mut paths: Vec<ResolvedPath> = Vec::with_capacity(mask.paths().len());
        for path in mask.paths() {
            if paths.iter().any(|p| &p.path == path) {
                continue;
            }
            paths.push(ResolvedPath {
                path: path.clone(),
                kind: classify(registry, path),
            });
        }
        Self {
            paths,
            is_default: false,
        }
    }

    /// True when the caller supplied no paths and the registry default was
    /// substituted.
    pub fn is_default(&self) -> bool {
        self.is_default
    }

    pub fn iter(&self) -> impl Iterator<Item = &ResolvedPath> {
        self.paths.iter()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(|p| p.path.as_str())
    }

    pub fn relations(&self) -> impl Iterator<Item = Relation> + '_ {
        self.paths.iter().filter_map(|p| match p.kind {
            PathKind::Composite(relation) => Some(relation),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

fn classify<M: Model>(registry: &FieldRegistry<M>, path: &str) -> PathKind {
    if path == M::ID_PATH {
        return PathKind::Identifier;
    }
    match registry.get(path) {
        Some(spec) => match spec.relation() {
            Some(relation) => PathKind::Composite(relation),
            None => PathKind::Scalar(spec.row_column()),
        },
        None => PathKind::Unknown,
    }
}
