//! Condition catalogs
//!
//! A catalog is an ordered list of `{id, label}` entries that a condition
//! group may select from. Labels are message ids; formatting them is left to
//! whoever renders the catalog.

use crate::{CommonError, CommonResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Device condition meaning "no device restriction"
pub const ANY_DEVICE: &str = "any";

/// A single selectable condition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Condition {
    pub id: String,
    pub label: String,
}

impl Condition {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Ordered set of conditions a group can choose from
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: Vec<Condition>,
}

impl Catalog {
    pub fn new(entries: Vec<Condition>) -> Self {
        Self { entries }
    }

    /// Built-in scope catalog
    pub fn scopes() -> Self {
        Self::from_ids("pages.conditions.scope", &["url", "route", "template", "site"])
    }

    /// Built-in device catalog, `any` first
    pub fn devices() -> Self {
        Self::from_ids("pages.conditions.device", &[ANY_DEVICE, "mobile", "desktop"])
    }

    fn from_ids(prefix: &str, ids: &[&str]) -> Self {
        Self {
            entries: ids
                .iter()
                .map(|id| Condition::new(*id, format!("{}.{}", prefix, id)))
                .collect(),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.iter().any(|c| c.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Condition> {
        self.entries.iter().find(|c| c.id == id)
    }

    pub fn first(&self) -> Option<&Condition> {
        self.entries.first()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Condition> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fail on the first id that appears twice
    pub fn ensure_unique(&self) -> CommonResult<()> {
        let mut seen = HashSet::new();
        for condition in &self.entries {
            if !seen.insert(condition.id.as_str()) {
                return Err(CommonError::InvalidCatalog(format!(
                    "duplicate condition id '{}'",
                    condition.id
                )));
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a Condition;
    type IntoIter = std::slice::Iter<'a, Condition>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<Condition> for Catalog {
    fn from_iter<T: IntoIterator<Item = Condition>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
