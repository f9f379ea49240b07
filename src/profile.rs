//! Profile Store
//!
//! Latest known value for each recognized detail, accumulated across turns.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

use crate::extractor::ExtractedDetails;

/// The closed set of fields the profile tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileField {
    Name,
    AccountNumber,
    Goal,
    Contact,
    OtherDetails,
}

impl ProfileField {
    pub const ALL: [ProfileField; 5] = [
        ProfileField::Name,
        ProfileField::AccountNumber,
        ProfileField::Goal,
        ProfileField::Contact,
        ProfileField::OtherDetails,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileField::Name => "name",
            ProfileField::AccountNumber => "account_number",
            ProfileField::Goal => "goal",
            ProfileField::Contact => "contact",
            ProfileField::OtherDetails => "other_details",
        }
    }
}

impl fmt::Display for ProfileField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProfileStore {
    fields: BTreeMap<ProfileField, String>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge freshly extracted details.
    ///
    /// Only non-empty values are written; missing values never erase a stored
    /// one. Returns true iff at least one field changed.
    pub fn merge(&mut self, details: Option<&ExtractedDetails>) -> bool {
        let Some(details) = details else {
            return false;
        };

        let mut changed = false;
        for field in ProfileField::ALL {
            let Some(value) = details.get(field).filter(|v| !v.is_empty()) else {
                continue;
            };
            if self.fields.get(&field).map(String::as_str) != Some(value) {
                debug!(%field, "Profile field updated");
                self.fields.insert(field, value.to_string());
                changed = true;
            }
        }

        changed
    }

    pub fn get(&self, field: ProfileField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProfileField, &str)> {
        self.fields.iter().map(|(field, value)| (*field, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(name: Option<&str>, goal: Option<&str>) -> ExtractedDetails {
        ExtractedDetails {
            name: name.map(str::to_string),
            goal: goal.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_merge_none_is_noop() {
        let mut profile = ProfileStore::new();
        assert!(!profile.merge(None));
        assert!(profile.is_empty());

        profile.merge(Some(&details(Some("Alice"), None)));
        let before = profile.clone();
        assert!(!profile.merge(None));
        assert_eq!(profile, before);
    }

    #[test]
    fn test_merge_sets_only_non_null_fields() {
        let mut profile = ProfileStore::new();
        let alice = ExtractedDetails {
            name: Some("Alice".to_string()),
            account_number: None,
            ..Default::default()
        };

        assert!(profile.merge(Some(&alice)));
        assert_eq!(profile.get(ProfileField::Name), Some("Alice"));
        assert_eq!(profile.get(ProfileField::AccountNumber), None);
        assert_eq!(profile.len(), 1);
    }

    #[test]
    fn test_identical_merge_reports_no_change() {
        let mut profile = ProfileStore::new();
        let d = details(Some("Alice"), Some("buy a house"));

        assert!(profile.merge(Some(&d)));
        assert!(!profile.merge(Some(&d)));
    }

    #[test]
    fn test_newer_values_overwrite_and_null_preserves() {
        let mut profile = ProfileStore::new();
        profile.merge(Some(&details(Some("Alice"), Some("buy a house"))));

        assert!(profile.merge(Some(&details(None, Some("pay off loans")))));
        assert_eq!(profile.get(ProfileField::Name), Some("Alice"));
        assert_eq!(profile.get(ProfileField::Goal), Some("pay off loans"));

        assert!(!profile.merge(Some(&ExtractedDetails::default())));
        assert_eq!(profile.len(), 2);
    }

    #[test]
    fn test_empty_string_never_overwrites() {
        let mut profile = ProfileStore::new();
        profile.merge(Some(&details(Some("Alice"), None)));

        assert!(!profile.merge(Some(&details(Some(""), None))));
        assert_eq!(profile.get(ProfileField::Name), Some("Alice"));
    }

    #[test]
    fn test_iteration_is_field_ordered() {
        let mut profile = ProfileStore::new();
        profile.merge(Some(&ExtractedDetails {
            other_details: Some("prefers email".to_string()),
            name: Some("Bob".to_string()),
            ..Default::default()
        }));

        let keys: Vec<&str> = profile.iter().map(|(f, _)| f.as_str()).collect();
        assert_eq!(keys, vec!["name", "other_details"]);
    }
}
