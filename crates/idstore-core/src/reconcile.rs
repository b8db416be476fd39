//! Child collection reconciliation.
//!
//! Attributes and contact info are replaced as sets: the old and new states
//! are keyed by identity and only the difference is written. Applying the
//! same desired state twice yields an empty delta the second time.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::StoreResult;
use crate::models::common::{Attributes, Owner};
use crate::models::contact_info::{ContactInfo, ContactKey, ContactState};
use crate::repository::ChildStorage;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delta<K, V> {
    pub delete: Vec<K>,
    pub update: Vec<(K, V)>,
    pub insert: Vec<(K, V)>,
}

pub type AttributeDelta = Delta<String, String>;
pub type ContactInfoDelta = Delta<ContactKey, ContactState>;

impl<K, V> Default for Delta<K, V> {
    fn default() -> Self {
        Self {
            delete: Vec::new(),
            update: Vec::new(),
            insert: Vec::new(),
        }
    }
}

impl<K: Ord + Clone, V: PartialEq + Clone> Delta<K, V> {
    /// Compute the mutations turning `old` into `new`.
    pub fn between(old: &BTreeMap<K, V>, new: &BTreeMap<K, V>) -> Self {
        let mut delta = Self::default();
        for (key, old_value) in old {
            match new.get(key) {
                None => delta.delete.push(key.clone()),
                Some(new_value) if new_value != old_value => {
                    delta.update.push((key.clone(), new_value.clone()));
                }
                Some(_) => {}
            }
        }
        for (key, new_value) in new {
            if !old.contains_key(key) {
                delta.insert.push((key.clone(), new_value.clone()));
            }
        }
        delta
    }
}

impl<K, V> Delta<K, V> {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.update.is_empty() && self.insert.is_empty()
    }

    /// Number of storage mutations the delta represents.
    pub fn len(&self) -> usize {
        self.delete.len() + self.update.len() + self.insert.len()
    }
}

/// Key contact entries by identity. Later duplicates win.
pub fn contact_info_map(entries: &[ContactInfo]) -> BTreeMap<ContactKey, ContactState> {
    entries.iter().map(|e| (e.key(), e.state())).collect()
}

/// Replace the owner's attributes `old` with `new`, returning the number
/// of mutations written.
pub async fn replace_attributes<S: ChildStorage>(
    storage: &S,
    owner: Owner,
    old: &Attributes,
    new: &Attributes,
) -> StoreResult<usize> {
    let delta = Delta::between(old, new);
    if delta.is_empty() {
        return Ok(0);
    }
    debug!(
        owner = owner.kind.as_str(),
        owner_id = %owner.id,
        deleted = delta.delete.len(),
        updated = delta.update.len(),
        inserted = delta.insert.len(),
        "Reconciling attributes"
    );
    storage.apply_attributes(owner, &delta).await?;
    Ok(delta.len())
}

/// Replace the owner's contact info `old` with `new`, returning the number
/// of mutations written.
pub async fn replace_contact_info<S: ChildStorage>(
    storage: &S,
    owner: Owner,
    old: &[ContactInfo],
    new: &[ContactInfo],
) -> StoreResult<usize> {
    let delta = Delta::between(&contact_info_map(old), &contact_info_map(new));
    if delta.is_empty() {
        return Ok(0);
    }
    debug!(
        owner = owner.kind.as_str(),
        owner_id = %owner.id,
        deleted = delta.delete.len(),
        updated = delta.update.len(),
        inserted = delta.insert.len(),
        "Reconciling contact info"
    );
    storage.apply_contact_info(owner, &delta).await?;
    Ok(delta.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contact_info::ContactType;

    fn attrs(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn delta_classifies_keys() {
        let old = attrs(&[("a", "1"), ("b", "2"), ("c", "3")]);
        let new = attrs(&[("b", "2"), ("c", "30"), ("d", "4")]);
        let delta = Delta::between(&old, &new);
        assert_eq!(delta.delete, vec!["a".to_owned()]);
        assert_eq!(delta.update, vec![("c".to_owned(), "30".to_owned())]);
        assert_eq!(delta.insert, vec![("d".to_owned(), "4".to_owned())]);
        assert_eq!(delta.len(), 3);
    }

    #[test]
    fn equal_states_produce_empty_delta() {
        let state = attrs(&[("env", "prod")]);
        assert!(Delta::between(&state, &state).is_empty());
    }

    #[test]
    fn contact_identity_is_type_and_value() {
        let old = vec![ContactInfo {
            contact_type: ContactType::Technical,
            value: "ops@example.com".into(),
            public: false,
            validated_at: None,
        }];
        let mut new = old.clone();
        new[0].public = true;
        let delta = Delta::between(&contact_info_map(&old), &contact_info_map(&new));
        assert!(delta.delete.is_empty());
        assert!(delta.insert.is_empty());
        assert_eq!(delta.update.len(), 1);

        new[0].contact_type = ContactType::Abuse;
        let delta = Delta::between(&contact_info_map(&old), &contact_info_map(&new));
        assert_eq!(delta.delete.len(), 1);
        assert_eq!(delta.insert.len(), 1);
    }
}
