//! # Redirect Table
//!
//! Read-only listing of redirect rules with a bulk import channel. Rows are
//! created, viewed and deleted in their own form (reached through navigation);
//! the table itself only changes through a file import followed by a refetch.
//!
//! Import runs through the same [`MutationLifecycle`] as the other editors. It
//! has no optimistic change, refetches the collection once the remote accepts
//! the file, and clears the file input whatever the outcome.

use crate::config::Messages;
use crate::lifecycle::{Completion, MutationLifecycle, PendingMutation};
use crate::mutations::{ImportFile, Operation, RemoteRequest};
use crate::services::{NavigationTarget, Notification, Services, NEW_REDIRECT_ID};
use crate::{EditorConfig, EditorError, RemoteError};
use async_trait::async_trait;
use chrono::{DateTime, Locale, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RedirectType {
    Temporary,
    Permanent,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectRecord {
    pub id: String,
    pub from: String,
    pub to: String,

    #[serde(rename = "type", default)]
    pub redirect_type: Option<RedirectType>,

    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub disabled: bool,
}

impl RedirectRecord {
    /// Redirects without an explicit type are permanent
    pub fn effective_type(&self) -> RedirectType {
        self.redirect_type.unwrap_or(RedirectType::Permanent)
    }
}

/// Window of the collection currently shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub from: usize,
    pub to: usize,
}

/// Query side of the remote data layer
#[async_trait]
pub trait RedirectSource: Send + Sync {
    async fn fetch_redirects(&self, page: Page) -> Result<Vec<RedirectRecord>, RemoteError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    String,
    Boolean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub key: &'static str,
    pub title: &'static str,
    pub kind: ColumnKind,
}

pub const COLUMNS: [Column; 5] = [
    Column {
        key: "from",
        title: "pages.admin.redirects.table.from",
        kind: ColumnKind::String,
    },
    Column {
        key: "to",
        title: "pages.admin.redirects.table.to",
        kind: ColumnKind::String,
    },
    Column {
        key: "type",
        title: "pages.admin.redirects.table.type",
        kind: ColumnKind::String,
    },
    Column {
        key: "endDate",
        title: "pages.admin.redirects.table.endDate.title",
        kind: ColumnKind::String,
    },
    Column {
        key: "disabled",
        title: "pages.admin.redirects.table.status.title",
        kind: ColumnKind::Boolean,
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectStatus {
    Active,
    Inactive,
}

impl RedirectStatus {
    pub fn label(self) -> &'static str {
        match self {
            RedirectStatus::Active => "pages.admin.redirects.table.status.active",
            RedirectStatus::Inactive => "pages.admin.redirects.table.status.inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndDateCell {
    Date(String),

    /// No end date; holds the message id of the placeholder
    Default(&'static str),
}

/// One table row as presentation draws it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectRow<'a> {
    pub record: &'a RedirectRecord,
    pub type_label: &'static str,

    /// Type was not set and the permanent default is shown muted
    pub type_is_default: bool,

    pub end_date: EndDateCell,
    pub status: RedirectStatus,
}

impl<'a> RedirectRow<'a> {
    fn new(record: &'a RedirectRecord, locale: Locale) -> Self {
        let type_label = match record.effective_type() {
            RedirectType::Temporary => "pages.admin.redirects.table.type.temporary",
            RedirectType::Permanent => "pages.admin.redirects.table.type.permanent",
        };
        let end_date = match &record.end_date {
            Some(date) => EndDateCell::Date(date.format_localized("%x", locale).to_string()),
            None => EndDateCell::Default("pages.admin.redirects.table.endDate.default"),
        };
        let status = if record.disabled {
            RedirectStatus::Inactive
        } else {
            RedirectStatus::Active
        };

        Self {
            record,
            type_label,
            type_is_default: record.redirect_type.is_none(),
            end_date,
            status,
        }
    }
}

pub struct RedirectTable {
    page: Page,
    locale: Locale,
    lifecycle: MutationLifecycle<Vec<RedirectRecord>>,
    file_input: Option<ImportFile>,
    query_loading: bool,
    messages: Messages,
    services: Services,
    source: Arc<dyn RedirectSource>,
}

impl std::fmt::Debug for RedirectTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedirectTable")
            .field("page", &self.page)
            .field("locale", &self.locale)
            .field("lifecycle", &self.lifecycle)
            .field("file_input", &self.file_input)
            .field("query_loading", &self.query_loading)
            .finish_non_exhaustive()
    }
}

impl RedirectTable {
    pub fn open(
        page: Page,
        items: Vec<RedirectRecord>,
        config: &EditorConfig,
        services: Services,
        source: Arc<dyn RedirectSource>,
    ) -> Self {
        info!(from = page.from, to = page.to, items = items.len(), "Opened redirect table");
        services.runtime.stop_loading();

        Self {
            page,
            locale: config.date_locale(),
            lifecycle: MutationLifecycle::new(items),
            file_input: None,
            query_loading: false,
            messages: config.messages.clone(),
            services,
            source,
        }
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn items(&self) -> &[RedirectRecord] {
        self.lifecycle.draft()
    }

    /// Show the empty state instead of the table
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    pub fn columns(&self) -> &'static [Column] {
        &COLUMNS
    }

    pub fn rows(&self) -> impl Iterator<Item = RedirectRow<'_>> + '_ {
        let locale = self.locale;
        self.items().iter().map(move |record| RedirectRow::new(record, locale))
    }

    pub fn set_query_loading(&mut self, loading: bool) {
        self.query_loading = loading;
    }

    pub fn is_sending_file(&self) -> bool {
        self.lifecycle.is_pending()
    }

    pub fn is_loading(&self) -> bool {
        self.is_sending_file() || self.query_loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.lifecycle.last_error()
    }

    /// New results from the backing query.
    ///
    /// Items are replaced only when the page start moved; returns whether
    /// they were.
    pub fn receive_page(&mut self, page: Page, items: Vec<RedirectRecord>) -> Result<bool, EditorError> {
        let moved = page.from != self.page.from;
        if moved {
            self.lifecycle.reset(items)?;
            debug!(from = page.from, to = page.to, "Redirect page changed");
        }
        self.page = page;
        Ok(moved)
    }

    pub fn select_file(&mut self, file: ImportFile) {
        self.file_input = Some(file);
    }

    pub fn selected_file(&self) -> Option<&ImportFile> {
        self.file_input.as_ref()
    }

    /// Start importing the selected file; `None` when no file is selected
    pub fn begin_import(
        &mut self,
    ) -> Result<Option<(PendingMutation<Vec<RedirectRecord>>, RemoteRequest)>, EditorError> {
        let Some(file) = self.file_input.clone() else {
            return Ok(None);
        };

        let pending = self
            .lifecycle
            .begin(Operation::ImportFile, |items| Ok(items.clone()))?;
        info!(file = %file.name, bytes = file.contents.len(), "Importing redirects");

        Ok(Some((pending, RemoteRequest::import(file))))
    }

    /// Finish an import with the refetched collection, or the first error of
    /// the import/refetch pair
    pub fn complete_import(
        &mut self,
        pending: PendingMutation<Vec<RedirectRecord>>,
        outcome: Result<Vec<RedirectRecord>, RemoteError>,
    ) -> Result<Completion, EditorError> {
        let completion = match outcome {
            Ok(items) => {
                let completion = self.lifecycle.succeed(&pending, items)?;
                self.services
                    .notifier
                    .notify(Notification::success(self.messages.import_succeeded.clone()));
                completion
            }
            Err(err) => {
                let message = self.messages.import_failed.clone();
                let completion = self.lifecycle.fail(&pending, message.clone())?;
                self.services.diagnostics.report(&err, "import redirects");
                self.services.notifier.notify(Notification::error(message));
                completion
            }
        };

        self.file_input = None;
        Ok(completion)
    }

    pub async fn import(&mut self) -> Result<Option<Completion>, EditorError> {
        let Some((pending, request)) = self.begin_import()? else {
            return Ok(None);
        };

        let outcome = match self.services.remote.execute(request).await {
            Ok(_) => self.source.fetch_redirects(self.page).await,
            Err(err) => Err(err),
        };

        self.complete_import(pending, outcome).map(Some)
    }

    pub fn open_new_item(&self) {
        self.services
            .runtime
            .navigate(NavigationTarget::Redirect(NEW_REDIRECT_ID.to_string()));
    }

    pub fn view_item(&self, record: &RedirectRecord) {
        self.services
            .runtime
            .navigate(NavigationTarget::Redirect(record.id.clone()));
    }
}
