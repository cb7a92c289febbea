//! Collaborators handed to editing sessions at construction.
//!
//! Notification and diagnostics are fire-and-forget. The runtime stands in for
//! the host application: it navigates and hides the global loading indicator.

use crate::MutationRemote;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Base path of the redirect admin pages
pub const REDIRECTS_BASE_URL: &str = "/admin/cms/redirects";

/// Id used in the redirect path to open an empty form
pub const NEW_REDIRECT_ID: &str = "new";

/// Page name of the institutional route form
pub const INSTITUTIONAL_ROUTES_FORM: &str = "admin/pages/institutional/form";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Error,
}

/// A transient toast
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Success,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

pub trait Diagnostics: Send + Sync {
    fn report(&self, error: &(dyn std::error::Error + 'static), context: &str);
}

/// Where the host should take the operator next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavigationTarget {
    /// Leave the current editor
    Exit,

    /// Open a redirect by id (`new` for an empty form)
    Redirect(String),

    /// Open the institutional route form for a route id
    RouteForm(String),
}

impl NavigationTarget {
    pub fn path(&self) -> Option<String> {
        match self {
            NavigationTarget::Exit => None,
            NavigationTarget::Redirect(id) => Some(format!("{}/{}", REDIRECTS_BASE_URL, id)),
            NavigationTarget::RouteForm(route_id) => Some(format!(
                "{}?id={}",
                INSTITUTIONAL_ROUTES_FORM,
                urlencoding::encode(route_id)
            )),
        }
    }
}

pub trait RenderRuntime: Send + Sync {
    fn navigate(&self, target: NavigationTarget);

    /// Hide the host's loading indicator
    fn stop_loading(&self) {}
}

/// Diagnostics that go to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn report(&self, err: &(dyn std::error::Error + 'static), context: &str) {
        error!(error = %err, context, "Remote mutation failed");
    }
}

/// Everything a session talks to outside itself
#[derive(Clone)]
pub struct Services {
    pub remote: Arc<dyn MutationRemote>,
    pub notifier: Arc<dyn Notifier>,
    pub diagnostics: Arc<dyn Diagnostics>,
    pub runtime: Arc<dyn RenderRuntime>,
}

impl Services {
    /// Services with diagnostics going to tracing
    pub fn new(
        remote: Arc<dyn MutationRemote>,
        notifier: Arc<dyn Notifier>,
        runtime: Arc<dyn RenderRuntime>,
    ) -> Self {
        Self {
            remote,
            notifier,
            diagnostics: Arc::new(TracingDiagnostics),
            runtime,
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}

impl std::fmt::Debug for Services {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Services").finish_non_exhaustive()
    }
}
