//! The current set of user-chosen constraints.
//!
//! One snapshot of this state is read per render; mutation happens only
//! through the named transitions below, each of which the caller follows
//! with exactly one render. An unset filter never excludes a record.

use std::collections::HashMap;

use crate::filter::bins::BucketId;
use crate::filter::options::CategoricalField;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilterState {
    categorical: HashMap<CategoricalField, String>,
    trees: Option<BucketId>,
    area: Option<BucketId>,
    dynamic: HashMap<String, String>,
    query: String,
}

impl FilterState {
    pub fn set_categorical(&mut self, field: CategoricalField, value: Option<String>) {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => {
                self.categorical.insert(field, v);
            }
            None => {
                self.categorical.remove(&field);
            }
        }
    }

    pub fn categorical(&self, field: CategoricalField) -> Option<&str> {
        self.categorical.get(&field).map(String::as_str)
    }

    pub fn set_tree_bucket(&mut self, bucket: Option<BucketId>) {
        self.trees = bucket;
    }

    pub fn tree_bucket(&self) -> Option<BucketId> {
        self.trees
    }

    pub fn set_area_bucket(&mut self, bucket: Option<BucketId>) {
        self.area = bucket;
    }

    pub fn area_bucket(&self) -> Option<BucketId> {
        self.area
    }

    pub fn set_dynamic(&mut self, key: &str, value: Option<String>) {
        match value.filter(|v| !v.is_empty()) {
            Some(v) => {
                self.dynamic.insert(key.to_string(), v);
            }
            None => {
                self.dynamic.remove(key);
            }
        }
    }

    pub fn dynamic(&self, key: &str) -> Option<&str> {
        self.dynamic.get(key).map(String::as_str)
    }

    /// All active dynamic selections, in arbitrary order (evaluation is a
    /// pure conjunction, so order cannot matter).
    pub fn dynamic_selections(&self) -> impl Iterator<Item = (&str, &str)> {
        self.dynamic.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn set_query(&mut self, query: String) {
        self.query = query;
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// The "clear all" action: back to the unconstrained state.
    pub fn clear_all(&mut self) {
        *self = FilterState::default();
    }

    pub fn is_unconstrained(&self) -> bool {
        self.categorical.is_empty()
            && self.trees.is_none()
            && self.area.is_none()
            && self.dynamic.is_empty()
            && self.query.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unset_values_are_removed() {
        let mut state = FilterState::default();
        state.set_categorical(CategoricalField::Region, Some("North".into()));
        assert_eq!(state.categorical(CategoricalField::Region), Some("North"));
        state.set_categorical(CategoricalField::Region, None);
        assert_eq!(state.categorical(CategoricalField::Region), None);
        // the empty string is the placeholder, not a constraint
        state.set_categorical(CategoricalField::Region, Some(String::new()));
        assert!(state.is_unconstrained());
    }

    #[test]
    fn test_clear_all_resets_everything() {
        let mut state = FilterState::default();
        state.set_categorical(CategoricalField::CropType, Some("Dates".into()));
        state.set_tree_bucket(Some(BucketId::NonNumeric));
        state.set_area_bucket(Some(BucketId::Range { lo: 0, hi: 10 }));
        state.set_dynamic("soil_type", Some("clay".into()));
        state.set_query("ali".into());
        assert!(!state.is_unconstrained());
        state.clear_all();
        assert!(state.is_unconstrained());
        assert_eq!(state, FilterState::default());
    }
}
