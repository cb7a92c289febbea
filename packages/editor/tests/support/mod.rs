//! Recording collaborators shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use pageforge_editor::{
    ComponentDescriptor, Diagnostics, MutationRemote, NavigationTarget, Notification, Notifier, OrderedList,
    PageVariation, RedirectRecord, RedirectSource, RemoteError, RemoteRequest, RenderRuntime, Services,
};
use pageforge_editor::{Catalog, Condition, Page};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Remote that answers with queued outcomes, `null` once the queue is empty
#[derive(Default)]
pub struct ScriptedRemote {
    outcomes: Mutex<VecDeque<Result<Value, RemoteError>>>,
    requests: Mutex<Vec<RemoteRequest>>,
}

impl ScriptedRemote {
    pub fn push_ok(&self, payload: Value) {
        self.outcomes.lock().unwrap().push_back(Ok(payload));
    }

    pub fn push_err(&self, message: &str) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(RemoteError::new(message)));
    }

    pub fn requests(&self) -> Vec<RemoteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MutationRemote for ScriptedRemote {
    async fn execute(&self, request: RemoteRequest) -> Result<Value, RemoteError> {
        self.requests.lock().unwrap().push(request);
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(Value::Null))
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    notifications: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.notifications.lock().unwrap().push(notification);
    }
}

#[derive(Default)]
pub struct RecordingDiagnostics {
    reports: Mutex<Vec<(String, String)>>,
}

impl RecordingDiagnostics {
    pub fn reports(&self) -> Vec<(String, String)> {
        self.reports.lock().unwrap().clone()
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn report(&self, error: &(dyn std::error::Error + 'static), context: &str) {
        self.reports
            .lock()
            .unwrap()
            .push((error.to_string(), context.to_string()));
    }
}

#[derive(Default)]
pub struct RecordingRuntime {
    navigations: Mutex<Vec<NavigationTarget>>,
    stop_loading_calls: AtomicUsize,
}

impl RecordingRuntime {
    pub fn navigations(&self) -> Vec<NavigationTarget> {
        self.navigations.lock().unwrap().clone()
    }

    pub fn stop_loading_calls(&self) -> usize {
        self.stop_loading_calls.load(Ordering::SeqCst)
    }
}

impl RenderRuntime for RecordingRuntime {
    fn navigate(&self, target: NavigationTarget) {
        self.navigations.lock().unwrap().push(target);
    }

    fn stop_loading(&self) {
        self.stop_loading_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Query double returning a fixed collection or a fixed error
#[derive(Default)]
pub struct StaticRedirects {
    pub items: Mutex<Vec<RedirectRecord>>,
    pub error: Mutex<Option<String>>,
}

#[async_trait]
impl RedirectSource for StaticRedirects {
    async fn fetch_redirects(&self, _page: Page) -> Result<Vec<RedirectRecord>, RemoteError> {
        if let Some(message) = self.error.lock().unwrap().clone() {
            return Err(RemoteError::new(message));
        }
        Ok(self.items.lock().unwrap().clone())
    }
}

pub struct Harness {
    pub remote: Arc<ScriptedRemote>,
    pub notifier: Arc<RecordingNotifier>,
    pub diagnostics: Arc<RecordingDiagnostics>,
    pub runtime: Arc<RecordingRuntime>,
    pub services: Services,
}

pub fn harness() -> Harness {
    let remote = Arc::new(ScriptedRemote::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let diagnostics = Arc::new(RecordingDiagnostics::default());
    let runtime = Arc::new(RecordingRuntime::default());

    let services = Services::new(remote.clone(), notifier.clone(), runtime.clone())
        .with_diagnostics(diagnostics.clone());

    Harness {
        remote,
        notifier,
        diagnostics,
        runtime,
        services,
    }
}

pub fn components(paths: &[&str]) -> OrderedList {
    OrderedList::new(
        paths
            .iter()
            .map(|p| ComponentDescriptor::new(*p, true))
            .collect(),
    )
    .unwrap()
}

pub fn variation(paths: &[&str]) -> PageVariation {
    PageVariation {
        id: "store.home".to_string(),
        components: components(paths),
        conditions: None,
        custom_conditions: Catalog::new(vec![
            Condition::new("x", "Logged in"),
            Condition::new("y", "Black friday"),
        ]),
    }
}

pub fn redirect(id: &str, from: &str, to: &str) -> RedirectRecord {
    RedirectRecord {
        id: id.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        redirect_type: None,
        end_date: None,
        disabled: false,
    }
}
