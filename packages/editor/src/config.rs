use crate::{ConditionCatalogs, EditorError};
use chrono::Locale;
use pageforge_common::Catalog;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Settings injected into every editing session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    /// Locale used for dates and labels (e.g. "en-US")
    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "Catalog::scopes")]
    pub scope_conditions: Catalog,

    #[serde(default = "Catalog::devices")]
    pub device_conditions: Catalog,

    #[serde(default)]
    pub messages: Messages,
}

fn default_locale() -> String {
    "en-US".to_string()
}

/// Toast texts shown to the operator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Messages {
    pub save_failed: String,
    pub delete_failed: String,
    pub import_succeeded: String,
    pub import_failed: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            save_failed: "Error: route could not be saved.".to_string(),
            delete_failed: "Error: route could not be deleted.".to_string(),
            import_succeeded: "Success!".to_string(),
            import_failed: "Fail to save :(".to_string(),
        }
    }
}

impl EditorConfig {
    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let config: EditorConfig =
            serde_json::from_str(json).map_err(|e| EditorError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EditorError> {
        self.catalogs(Catalog::default()).map(|_| ())
    }

    /// Locale used for date cells; unknown tags fall back to en-US
    pub fn date_locale(&self) -> Locale {
        let tag = self.locale.replace('-', "_");
        Locale::try_from(tag.as_str()).unwrap_or_else(|_| {
            warn!(locale = %self.locale, "Unknown locale - formatting dates as en-US");
            Locale::en_US
        })
    }

    /// Fixed catalogs plus the custom catalog of one session
    pub fn catalogs(&self, custom: Catalog) -> Result<ConditionCatalogs, EditorError> {
        ConditionCatalogs::new(
            self.scope_conditions.clone(),
            self.device_conditions.clone(),
            custom,
        )
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            scope_conditions: Catalog::scopes(),
            device_conditions: Catalog::devices(),
            messages: Messages::default(),
        }
    }
}
