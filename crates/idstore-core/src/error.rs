//! Error types for the identity store.
//!
//! Every [`StoreError`] variant is backed by a static [`ErrorDefinition`]
//! so callers can classify failures programmatically (namespace, name,
//! code) instead of matching on rendered messages.

use std::collections::BTreeMap;
use std::error::Error as StdError;

use thiserror::Error;

/// Namespace shared by all errors raised by the store layer.
pub const NAMESPACE: &str = "idstore/store";

/// Static description of a class of errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorDefinition {
    pub namespace: &'static str,
    pub name: &'static str,
    /// Numeric code, aligned with canonical RPC status codes.
    pub code: u32,
    pub message_format: &'static str,
}

pub const ERR_NOT_FOUND: ErrorDefinition = ErrorDefinition {
    namespace: NAMESPACE,
    name: "not_found",
    code: 5,
    message_format: "{entity} `{id}` not found",
};

pub const ERR_CONCURRENT_WRITE: ErrorDefinition = ErrorDefinition {
    namespace: NAMESPACE,
    name: "concurrent_write",
    code: 10,
    message_format: "{entity} `{id}` was modified concurrently",
};

pub const ERR_CANCELLED: ErrorDefinition = ErrorDefinition {
    namespace: NAMESPACE,
    name: "cancelled",
    code: 1,
    message_format: "operation cancelled",
};

pub const ERR_STORAGE: ErrorDefinition = ErrorDefinition {
    namespace: NAMESPACE,
    name: "storage",
    code: 2,
    message_format: "storage failure",
};

pub const ERR_PARTIAL_WRITE: ErrorDefinition = ErrorDefinition {
    namespace: NAMESPACE,
    name: "partial_write",
    code: 15,
    message_format: "{entity} `{id}` was partially written",
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} `{id}` not found")]
    NotFound { entity: &'static str, id: String },

    /// The caller's view of `updated_at` does not match the stored row.
    #[error("{entity} `{id}` was modified concurrently")]
    Conflict { entity: &'static str, id: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("storage failure: {0}")]
    Storage(#[source] Box<dyn StdError + Send + Sync>),

    /// A child collection failed to reconcile after other parts of the
    /// same update were already committed.
    #[error("{entity} `{id}` was partially written (committed: {committed:?})")]
    PartialWrite {
        entity: &'static str,
        id: String,
        committed: Vec<String>,
        #[source]
        source: Box<StoreError>,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// Wrap an opaque storage engine error without reinterpreting it.
    pub fn storage<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::Storage(Box::new(err))
    }

    pub fn definition(&self) -> &'static ErrorDefinition {
        match self {
            Self::NotFound { .. } => &ERR_NOT_FOUND,
            Self::Conflict { .. } => &ERR_CONCURRENT_WRITE,
            Self::Cancelled => &ERR_CANCELLED,
            Self::Storage(_) => &ERR_STORAGE,
            Self::PartialWrite { .. } => &ERR_PARTIAL_WRITE,
        }
    }

    pub fn namespace(&self) -> &'static str {
        self.definition().namespace
    }

    pub fn name(&self) -> &'static str {
        self.definition().name
    }

    pub fn code(&self) -> u32 {
        self.definition().code
    }

    pub fn message_format(&self) -> &'static str {
        self.definition().message_format
    }

    /// Named values substituted into the message format.
    pub fn attributes(&self) -> BTreeMap<&'static str, String> {
        let mut attributes = BTreeMap::new();
        match self {
            Self::NotFound { entity, id }
            | Self::Conflict { entity, id }
            | Self::PartialWrite { entity, id, .. } => {
                attributes.insert("entity", (*entity).to_owned());
                attributes.insert("id", id.clone());
            }
            Self::Cancelled | Self::Storage(_) => {}
        }
        attributes
    }

    pub fn cause(&self) -> Option<&(dyn StdError + 'static)> {
        self.source()
    }

    pub fn details(&self) -> Vec<String> {
        match self {
            Self::PartialWrite { committed, .. } => committed.clone(),
            _ => Vec::new(),
        }
    }

    /// True if both errors come from the same definition.
    pub fn same_definition(&self, other: &StoreError) -> bool {
        self.definition() == other.definition()
    }

    /// True if both errors have the same definition, attributes, details
    /// and an equal cause chain.
    ///
    /// Causes are compared by their rendered messages, so two independently
    /// constructed storage failures with the same text are equivalent.
    pub fn equivalent(&self, other: &StoreError) -> bool {
        self.same_definition(other)
            && self.attributes() == other.attributes()
            && self.details() == other.details()
            && cause_chain(self.cause()) == cause_chain(other.cause())
    }
}

fn cause_chain(mut cause: Option<&(dyn StdError + 'static)>) -> Vec<String> {
    let mut chain = Vec::new();
    while let Some(err) = cause {
        chain.push(err.to_string());
        cause = err.source();
    }
    chain
}
