//! Contact information entries attached to organizations and clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ContactType {
    #[default]
    Other,
    Abuse,
    Billing,
    Technical,
}

/// A single contact entry. Identified by `(contact_type, value)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub contact_type: ContactType,
    pub value: String,
    pub public: bool,
    pub validated_at: Option<DateTime<Utc>>,
}

/// Identity of a contact entry within its owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContactKey {
    pub contact_type: ContactType,
    pub value: String,
}

/// Mutable part of a contact entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactState {
    pub public: bool,
    pub validated_at: Option<DateTime<Utc>>,
}

impl ContactInfo {
    pub fn key(&self) -> ContactKey {
        ContactKey {
            contact_type: self.contact_type,
            value: self.value.clone(),
        }
    }

    pub fn state(&self) -> ContactState {
        ContactState {
            public: self.public,
            validated_at: self.validated_at,
        }
    }

    pub fn from_parts(key: ContactKey, state: ContactState) -> Self {
        Self {
            contact_type: key.contact_type,
            value: key.value,
            public: state.public,
            validated_at: state.validated_at,
        }
    }
}

/// Deduplicate entries by identity, keeping the last occurrence's state
/// at the position of the first occurrence.
pub fn dedup_contact_info(entries: &[ContactInfo]) -> Vec<ContactInfo> {
    let mut out: Vec<ContactInfo> = Vec::with_capacity(entries.len());
    for entry in entries {
        match out
            .iter_mut()
            .find(|e| e.contact_type == entry.contact_type && e.value == entry.value)
        {
            Some(existing) => {
                existing.public = entry.public;
                existing.validated_at = entry.validated_at;
            }
            None => out.push(entry.clone()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(contact_type: ContactType, value: &str, public: bool) -> ContactInfo {
        ContactInfo {
            contact_type,
            value: value.into(),
            public,
            validated_at: None,
        }
    }

    #[test]
    fn dedup_keeps_first_position_and_last_state() {
        let entries = vec![
            entry(ContactType::Technical, "ops@example.com", false),
            entry(ContactType::Billing, "billing@example.com", false),
            entry(ContactType::Technical, "ops@example.com", true),
        ];
        let deduped = dedup_contact_info(&entries);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].value, "ops@example.com");
        assert!(deduped[0].public);
    }

    #[test]
    fn same_value_with_different_type_is_distinct() {
        let entries = vec![
            entry(ContactType::Technical, "ops@example.com", false),
            entry(ContactType::Abuse, "ops@example.com", false),
        ];
        assert_eq!(dedup_contact_info(&entries).len(), 2);
    }
}
