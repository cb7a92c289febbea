//! Route metadata form: edit the details of one route, then save or delete it.

use crate::config::Messages;
use crate::lifecycle::{Completion, LifecycleState, MutationLifecycle, PendingMutation};
use crate::mutations::{Operation, RemoteRequest};
use crate::services::{NavigationTarget, Notification, Services};
use crate::{EditorConfig, EditorError, RemoteError};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub route_id: String,
    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Whether the route requires a logged in shopper
    #[serde(default)]
    pub login: bool,
}

/// Title shown for a route in lists, falling back to its path
pub fn route_title(route: &Route) -> &str {
    route
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or(&route.path)
}

/// Where the edit icon of a route entry leads
pub fn edit_target(route: &Route) -> NavigationTarget {
    NavigationTarget::RouteForm(route.route_id.clone())
}

/// Text fields of a route that the form edits directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDetail {
    Path,
    Title,
}

impl FromStr for RouteDetail {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "path" => Ok(RouteDetail::Path),
            "title" => Ok(RouteDetail::Title),
            other => Err(EditorError::Config(format!("unknown route detail '{}'", other))),
        }
    }
}

#[derive(Debug)]
pub struct RouteFormSession {
    lifecycle: MutationLifecycle<Route>,
    messages: Messages,
    services: Services,
}

impl RouteFormSession {
    pub fn open(route: Route, config: &EditorConfig, services: Services) -> Self {
        info!(route = %route.route_id, "Opened route form");
        services.runtime.stop_loading();

        Self {
            lifecycle: MutationLifecycle::new(route),
            messages: config.messages.clone(),
            services,
        }
    }

    pub fn draft(&self) -> &Route {
        self.lifecycle.draft()
    }

    pub fn committed(&self) -> &Route {
        self.lifecycle.committed()
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn is_loading(&self) -> bool {
        self.lifecycle.is_pending()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.lifecycle.last_error()
    }

    pub fn set_detail(&mut self, detail: RouteDetail, value: impl Into<String>) -> Result<(), EditorError> {
        let value = value.into();
        self.lifecycle.edit(|route| {
            let mut next = route.clone();
            match detail {
                RouteDetail::Path => next.path = value,
                RouteDetail::Title => next.title = Some(value),
            }
            Ok(next)
        })
    }

    pub fn toggle_login(&mut self) -> Result<(), EditorError> {
        self.lifecycle.edit(|route| {
            Ok(Route {
                login: !route.login,
                ..route.clone()
            })
        })
    }

    pub fn begin_save(&mut self) -> Result<(PendingMutation<Route>, RemoteRequest), EditorError> {
        let pending = self.lifecycle.begin(Operation::Save, |route| Ok(route.clone()))?;
        let request = RemoteRequest::new(Operation::Save, json!({ "route": &pending.submitted }));
        Ok((pending, request))
    }

    pub fn begin_delete(&mut self) -> Result<(PendingMutation<Route>, RemoteRequest), EditorError> {
        let pending = self.lifecycle.begin(Operation::Delete, |route| Ok(route.clone()))?;
        let request = RemoteRequest::new(Operation::Delete, json!({ "id": &pending.submitted.id }));
        Ok((pending, request))
    }

    pub fn complete(
        &mut self,
        pending: PendingMutation<Route>,
        outcome: Result<Value, RemoteError>,
    ) -> Result<Completion, EditorError> {
        match outcome {
            Ok(_) => {
                let completion = self.lifecycle.succeed(&pending, pending.submitted.clone())?;
                self.services.runtime.navigate(NavigationTarget::Exit);
                Ok(completion)
            }
            Err(err) => {
                let message = match pending.operation {
                    Operation::Delete => self.messages.delete_failed.clone(),
                    _ => self.messages.save_failed.clone(),
                };
                debug!(route = %pending.submitted.route_id, "Restoring route after failed mutation");
                let completion = self.lifecycle.fail(&pending, message.clone())?;

                let context = format!("{} route {}", pending.operation.name(), pending.submitted.route_id);
                self.services.diagnostics.report(&err, &context);
                self.services.notifier.notify(Notification::error(message));
                Ok(completion)
            }
        }
    }

    pub async fn save(&mut self) -> Result<Completion, EditorError> {
        let (pending, request) = self.begin_save()?;
        let outcome = self.services.remote.execute(request).await;
        self.complete(pending, outcome)
    }

    pub async fn delete(&mut self) -> Result<Completion, EditorError> {
        let (pending, request) = self.begin_delete()?;
        let outcome = self.services.remote.execute(request).await;
        self.complete(pending, outcome)
    }
}
