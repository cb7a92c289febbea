//! # Targeting Conditions
//!
//! A page variation is targeted by three independent groups:
//!
//! - **scope**: single choice from a fixed catalog (url, route, template, site)
//! - **device**: single choice from a fixed catalog, `any` by default
//! - **custom**: any subset of a catalog supplied per session
//!
//! Single-choice groups only ever change through `set_*`, which replaces the
//! previous value. The custom group changes through `add_custom` and
//! `remove_custom`, both idempotent. `toggle` is the entry point presentation
//! uses and routes each group to the right operation.
//!
//! A [`ConditionSet`] is a value; every transition returns a new set.

use crate::EditorError;
use pageforge_common::{Catalog, Condition, ANY_DEVICE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Which selection group a condition belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionGroup {
    Scope,
    Device,
    Custom,
}

impl ConditionGroup {
    pub const ALL: [ConditionGroup; 3] = [
        ConditionGroup::Scope,
        ConditionGroup::Custom,
        ConditionGroup::Device,
    ];

    /// Whether several conditions of this group can be active at once
    pub fn is_multiple(self) -> bool {
        matches!(self, ConditionGroup::Custom)
    }
}

impl fmt::Display for ConditionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConditionGroup::Scope => "scope",
            ConditionGroup::Device => "device",
            ConditionGroup::Custom => "custom",
        };
        f.write_str(name)
    }
}

/// Catalogs a session validates condition ids against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionCatalogs {
    pub scope: Catalog,
    pub device: Catalog,
    pub custom: Catalog,
}

impl ConditionCatalogs {
    pub fn new(scope: Catalog, device: Catalog, custom: Catalog) -> Result<Self, EditorError> {
        if scope.is_empty() {
            return Err(EditorError::Config("scope catalog is empty".to_string()));
        }
        if !device.contains(ANY_DEVICE) {
            return Err(EditorError::Config(format!(
                "device catalog has no '{}' entry",
                ANY_DEVICE
            )));
        }
        scope.ensure_unique()?;
        device.ensure_unique()?;
        custom.ensure_unique()?;

        Ok(Self {
            scope,
            device,
            custom,
        })
    }

    pub fn group(&self, group: ConditionGroup) -> &Catalog {
        match group {
            ConditionGroup::Scope => &self.scope,
            ConditionGroup::Device => &self.device,
            ConditionGroup::Custom => &self.custom,
        }
    }

    fn check(&self, group: ConditionGroup, id: &str) -> Result<(), EditorError> {
        if self.group(group).contains(id) {
            Ok(())
        } else {
            Err(EditorError::InvalidCondition {
                group,
                id: id.to_string(),
            })
        }
    }
}

/// Active conditions of a page variation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSet {
    scope: String,
    device: String,
    #[serde(default)]
    custom: BTreeSet<String>,
}

impl ConditionSet {
    /// First scope in the catalog, `any` device, no custom conditions
    pub fn initial(catalogs: &ConditionCatalogs) -> Self {
        let scope = catalogs
            .scope
            .first()
            .map(|c| c.id.clone())
            .unwrap_or_default();

        Self {
            scope,
            device: ANY_DEVICE.to_string(),
            custom: BTreeSet::new(),
        }
    }

    /// Rebuild a stored set, checking scope and device against the catalogs.
    ///
    /// Custom ids are kept even when the catalog no longer lists them.
    pub fn restore(
        catalogs: &ConditionCatalogs,
        scope: impl Into<String>,
        device: impl Into<String>,
        custom: impl IntoIterator<Item = String>,
    ) -> Result<Self, EditorError> {
        let scope = scope.into();
        let device = device.into();
        catalogs.check(ConditionGroup::Scope, &scope)?;
        catalogs.check(ConditionGroup::Device, &device)?;

        Ok(Self {
            scope,
            device,
            custom: custom.into_iter().collect(),
        })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn custom(&self) -> &BTreeSet<String> {
        &self.custom
    }

    /// Check a set that arrived from the remote against the catalogs.
    ///
    /// Scope and device must be listed. Custom ids must be listed unless
    /// `known` already held them.
    pub fn validate(&self, catalogs: &ConditionCatalogs, known: &ConditionSet) -> Result<(), EditorError> {
        catalogs.check(ConditionGroup::Scope, &self.scope)?;
        catalogs.check(ConditionGroup::Device, &self.device)?;
        for id in self.custom.difference(&known.custom) {
            catalogs.check(ConditionGroup::Custom, id)?;
        }
        Ok(())
    }

    pub fn is_active(&self, group: ConditionGroup, id: &str) -> bool {
        match group {
            ConditionGroup::Scope => self.scope == id,
            ConditionGroup::Device => self.device == id,
            ConditionGroup::Custom => self.custom.contains(id),
        }
    }

    pub fn set_scope(&self, catalogs: &ConditionCatalogs, id: &str) -> Result<Self, EditorError> {
        catalogs.check(ConditionGroup::Scope, id)?;
        Ok(Self {
            scope: id.to_string(),
            ..self.clone()
        })
    }

    pub fn set_device(&self, catalogs: &ConditionCatalogs, id: &str) -> Result<Self, EditorError> {
        catalogs.check(ConditionGroup::Device, id)?;
        Ok(Self {
            device: id.to_string(),
            ..self.clone()
        })
    }

    pub fn add_custom(&self, catalogs: &ConditionCatalogs, id: &str) -> Result<Self, EditorError> {
        catalogs.check(ConditionGroup::Custom, id)?;
        let mut next = self.clone();
        next.custom.insert(id.to_string());
        Ok(next)
    }

    pub fn remove_custom(&self, id: &str) -> Self {
        let mut next = self.clone();
        next.custom.remove(id);
        next
    }

    /// Presentation intent for clicking a condition.
    ///
    /// Scope and device go through `set_*`; custom flips membership.
    pub fn toggle(
        &self,
        catalogs: &ConditionCatalogs,
        group: ConditionGroup,
        id: &str,
    ) -> Result<Self, EditorError> {
        match group {
            ConditionGroup::Scope => self.set_scope(catalogs, id),
            ConditionGroup::Device => self.set_device(catalogs, id),
            ConditionGroup::Custom if self.custom.contains(id) => Ok(self.remove_custom(id)),
            ConditionGroup::Custom => self.add_custom(catalogs, id),
        }
    }

    /// Custom ids selected but missing from the current catalog
    pub fn stale_custom<'a>(&'a self, catalog: &'a Catalog) -> impl Iterator<Item = &'a str> + 'a {
        self.custom
            .iter()
            .filter(move |id| !catalog.contains(id))
            .map(String::as_str)
    }

    /// One section per group, in display order
    pub fn sections<'a>(&'a self, catalogs: &'a ConditionCatalogs) -> Vec<ConditionSection<'a>> {
        ConditionGroup::ALL
            .iter()
            .map(|&group| {
                let mut options: Vec<ConditionOption<'a>> = catalogs
                    .group(group)
                    .iter()
                    .map(|condition| ConditionOption {
                        id: &condition.id,
                        label: Some(condition),
                        active: self.is_active(group, &condition.id),
                    })
                    .collect();

                if group == ConditionGroup::Custom {
                    options.extend(self.stale_custom(&catalogs.custom).map(|id| ConditionOption {
                        id,
                        label: None,
                        active: true,
                    }));
                }

                ConditionSection {
                    group,
                    multiple: group.is_multiple(),
                    options,
                }
            })
            .collect()
    }
}

/// Read projection of one condition group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionSection<'a> {
    pub group: ConditionGroup,
    pub multiple: bool,
    pub options: Vec<ConditionOption<'a>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConditionOption<'a> {
    pub id: &'a str,

    /// Catalog entry; `None` for a stale custom id
    pub label: Option<&'a Condition>,

    pub active: bool,
}

impl ConditionOption<'_> {
    pub fn is_stale(&self) -> bool {
        self.label.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalogs() -> ConditionCatalogs {
        ConditionCatalogs::new(
            Catalog::scopes(),
            Catalog::devices(),
            Catalog::new(vec![
                Condition::new("x", "Logged in"),
                Condition::new("y", "Black friday"),
            ]),
        )
        .unwrap()
    }

    #[test]
    fn test_initial_set() {
        let set = ConditionSet::initial(&catalogs());
        assert_eq!(set.scope(), "url");
        assert_eq!(set.device(), "any");
        assert!(set.custom().is_empty());
    }

    #[test]
    fn test_validate_rejects_unlisted_ids() {
        let catalogs = catalogs();
        let known = ConditionSet::restore(&catalogs, "url", "any", vec!["stale".to_string()]).unwrap();

        let empty_scope = ConditionSet {
            scope: String::new(),
            ..known.clone()
        };
        assert!(matches!(
            empty_scope.validate(&catalogs, &known),
            Err(EditorError::InvalidCondition { group: ConditionGroup::Scope, .. })
        ));

        let ghost = ConditionSet {
            custom: ["stale", "ghost"].iter().map(|s| s.to_string()).collect(),
            ..known.clone()
        };
        assert_eq!(
            ghost.validate(&catalogs, &known),
            Err(EditorError::InvalidCondition {
                group: ConditionGroup::Custom,
                id: "ghost".to_string()
            })
        );

        // ids the set already carried stay acceptable
        assert_eq!(known.validate(&catalogs, &known), Ok(()));
    }

    #[test]
    fn test_add_custom_then_set_device() {
        let catalogs = catalogs();
        let set = ConditionSet::initial(&catalogs)
            .add_custom(&catalogs, "x")
            .unwrap()
            .set_device(&catalogs, "mobile")
            .unwrap();

        assert_eq!(set.scope(), "url");
        assert_eq!(set.device(), "mobile");
        assert_eq!(set.custom().iter().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_set_replaces_previous_value() {
        let catalogs = catalogs();
        let set = ConditionSet::initial(&catalogs)
            .set_scope(&catalogs, "route")
            .unwrap()
            .set_scope(&catalogs, "site")
            .unwrap();
        assert_eq!(set.scope(), "site");
        assert!(!set.is_active(ConditionGroup::Scope, "route"));
    }

    #[test]
    fn test_unknown_ids_rejected() {
        let catalogs = catalogs();
        let set = ConditionSet::initial(&catalogs);

        assert_eq!(
            set.set_scope(&catalogs, "galaxy"),
            Err(EditorError::InvalidCondition {
                group: ConditionGroup::Scope,
                id: "galaxy".to_string()
            })
        );
        assert!(set.set_device(&catalogs, "tablet").is_err());
        assert!(set.add_custom(&catalogs, "z").is_err());
    }

    #[test]
    fn test_custom_add_remove_idempotent() {
        let catalogs = catalogs();
        let once = ConditionSet::initial(&catalogs).add_custom(&catalogs, "x").unwrap();
        let twice = once.add_custom(&catalogs, "x").unwrap();
        assert_eq!(once, twice);

        let removed = once.remove_custom("y");
        assert_eq!(removed, once);
    }

    #[test]
    fn test_toggle_routes_by_group() {
        let catalogs = catalogs();
        let set = ConditionSet::initial(&catalogs);

        let set = set.toggle(&catalogs, ConditionGroup::Scope, "template").unwrap();
        let set = set.toggle(&catalogs, ConditionGroup::Scope, "template").unwrap();
        assert_eq!(set.scope(), "template");

        let set = set.toggle(&catalogs, ConditionGroup::Custom, "y").unwrap();
        assert!(set.is_active(ConditionGroup::Custom, "y"));
        let set = set.toggle(&catalogs, ConditionGroup::Custom, "y").unwrap();
        assert!(!set.is_active(ConditionGroup::Custom, "y"));
    }

    #[test]
    fn test_stale_custom_ids_survive_catalog_change() {
        let old = catalogs();
        let set = ConditionSet::initial(&old).add_custom(&old, "x").unwrap();

        let new = ConditionCatalogs::new(
            Catalog::scopes(),
            Catalog::devices(),
            Catalog::new(vec![Condition::new("y", "Black friday")]),
        )
        .unwrap();

        assert_eq!(set.stale_custom(&new.custom).collect::<Vec<_>>(), vec!["x"]);

        let sections = set.sections(&new);
        let custom = sections
            .iter()
            .find(|s| s.group == ConditionGroup::Custom)
            .unwrap();
        assert!(custom.multiple);
        let stale: Vec<_> = custom.options.iter().filter(|o| o.is_stale()).collect();
        assert_eq!(stale.len(), 1);
        assert!(stale[0].active);

        // removing a stale id still works
        assert!(set.remove_custom("x").custom().is_empty());
    }

    #[test]
    fn test_sections_mark_active_single_choice() {
        let catalogs = catalogs();
        let set = ConditionSet::initial(&catalogs);
        let sections = set.sections(&catalogs);

        assert_eq!(sections.len(), 3);
        let scope = &sections[0];
        assert_eq!(scope.group, ConditionGroup::Scope);
        assert!(!scope.multiple);
        assert_eq!(scope.options.iter().filter(|o| o.active).count(), 1);
    }

    #[test]
    fn test_restore_validates_single_choice_groups() {
        let catalogs = catalogs();
        assert!(ConditionSet::restore(&catalogs, "site", "desktop", vec!["gone".to_string()]).is_ok());
        assert!(ConditionSet::restore(&catalogs, "nowhere", "any", Vec::new()).is_err());
    }

    #[test]
    fn test_catalogs_require_any_device() {
        let result = ConditionCatalogs::new(
            Catalog::scopes(),
            Catalog::new(vec![Condition::new("mobile", "Mobile")]),
            Catalog::default(),
        );
        assert!(matches!(result, Err(EditorError::Config(_))));
    }
}
