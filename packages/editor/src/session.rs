//! # Edit Session Management
//!
//! An [`EditSession`] is one operator editing one page variation: the order
//! of its components and the conditions that target it. It is the only way
//! presentation touches that state.
//!
//! - Reorder and condition intents are pure transitions on the draft.
//! - Save and delete go through the [`MutationLifecycle`], which applies the
//!   draft optimistically and restores the committed snapshot if the remote
//!   rejects the call.
//!
//! Effectful intents come in two flavours. `save()`/`delete()` begin, await
//! the remote and complete in one call. `begin_save()`/`begin_delete()` plus
//! `complete()` split that in two so other intents can be processed while the
//! remote call is outstanding.

use crate::config::Messages;
use crate::lifecycle::{Completion, LifecycleState, MutationLifecycle, PendingMutation};
use crate::mutations::{merge_result, Operation, RemoteRequest};
use crate::ordered_list::{Bindings, OrderedList, RenderOptions};
use crate::services::{NavigationTarget, Notification, Services};
use crate::{ConditionCatalogs, ConditionGroup, ConditionSection, ConditionSet, EditorConfig, EditorError, RemoteError};
use pageforge_common::Catalog;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

/// The editable state of a page variation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub components: OrderedList,
    pub conditions: ConditionSet,
}

/// A page variation as loaded from the remote
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageVariation {
    pub id: String,
    pub components: OrderedList,

    /// Stored conditions; a new variation starts from the catalog defaults
    #[serde(default)]
    pub conditions: Option<ConditionSet>,

    /// Custom conditions selectable in this session
    #[serde(default)]
    pub custom_conditions: Catalog,
}

/// Single edit session over a page variation
#[derive(Debug)]
pub struct EditSession {
    id: String,
    catalogs: ConditionCatalogs,
    messages: Messages,
    lifecycle: MutationLifecycle<Snapshot>,
    services: Services,
}

impl EditSession {
    /// Open a variation for editing
    pub fn open(variation: PageVariation, config: &EditorConfig, services: Services) -> Result<Self, EditorError> {
        let catalogs = config.catalogs(variation.custom_conditions)?;
        let conditions = match variation.conditions {
            Some(stored) => ConditionSet::restore(
                &catalogs,
                stored.scope(),
                stored.device(),
                stored.custom().iter().cloned(),
            )?,
            None => ConditionSet::initial(&catalogs),
        };

        let snapshot = Snapshot {
            components: variation.components,
            conditions,
        };

        info!(
            variation = %variation.id,
            components = snapshot.components.len(),
            "Opened edit session"
        );
        services.runtime.stop_loading();

        Ok(Self {
            id: variation.id,
            catalogs,
            messages: config.messages.clone(),
            lifecycle: MutationLifecycle::new(snapshot),
            services,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn draft(&self) -> &Snapshot {
        self.lifecycle.draft()
    }

    pub fn committed(&self) -> &Snapshot {
        self.lifecycle.committed()
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn last_outcome(&self) -> Option<LifecycleState> {
        self.lifecycle.last_outcome()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.lifecycle.last_error()
    }

    pub fn is_dirty(&self) -> bool {
        self.lifecycle.is_dirty()
    }

    /// Controls should be disabled while this is true
    pub fn is_loading(&self) -> bool {
        self.lifecycle.is_pending()
    }

    pub fn catalogs(&self) -> &ConditionCatalogs {
        &self.catalogs
    }

    pub fn components(&self, options: RenderOptions) -> Bindings<'_> {
        self.draft().components.render(options)
    }

    pub fn condition_sections(&self) -> Vec<ConditionSection<'_>> {
        self.draft().conditions.sections(&self.catalogs)
    }

    pub fn move_component(&mut self, from: usize, to: usize) -> Result<(), EditorError> {
        self.apply("move_component", |snapshot, _| {
            Ok(Snapshot {
                components: snapshot.components.move_item(from, to)?,
                conditions: snapshot.conditions.clone(),
            })
        })
    }

    pub fn set_scope(&mut self, id: &str) -> Result<(), EditorError> {
        self.apply_conditions("set_scope", |set, catalogs| set.set_scope(catalogs, id))
    }

    pub fn set_device(&mut self, id: &str) -> Result<(), EditorError> {
        self.apply_conditions("set_device", |set, catalogs| set.set_device(catalogs, id))
    }

    pub fn add_custom(&mut self, id: &str) -> Result<(), EditorError> {
        self.apply_conditions("add_custom", |set, catalogs| set.add_custom(catalogs, id))
    }

    pub fn remove_custom(&mut self, id: &str) -> Result<(), EditorError> {
        self.apply_conditions("remove_custom", |set, _| Ok(set.remove_custom(id)))
    }

    pub fn toggle_condition(&mut self, group: ConditionGroup, id: &str) -> Result<(), EditorError> {
        self.apply_conditions("toggle_condition", |set, catalogs| set.toggle(catalogs, group, id))
    }

    pub fn begin_save(&mut self) -> Result<(PendingMutation<Snapshot>, RemoteRequest), EditorError> {
        let pending = self.begin(Operation::Save)?;
        let request = RemoteRequest::new(
            Operation::Save,
            json!({
                "id": &self.id,
                "components": &pending.submitted.components,
                "conditions": &pending.submitted.conditions,
            }),
        );
        Ok((pending, request))
    }

    pub fn begin_delete(&mut self) -> Result<(PendingMutation<Snapshot>, RemoteRequest), EditorError> {
        let pending = self.begin(Operation::Delete)?;
        let request = RemoteRequest::new(Operation::Delete, json!({ "id": &self.id }));
        Ok((pending, request))
    }

    /// Reconcile the session with the remote's answer for `pending`
    pub fn complete(
        &mut self,
        pending: PendingMutation<Snapshot>,
        outcome: Result<Value, RemoteError>,
    ) -> Result<Completion, EditorError> {
        match outcome {
            Ok(payload) => {
                let committed = match pending.operation {
                    Operation::Save => self.merge_save_result(&pending, &payload),
                    _ => pending.submitted.clone(),
                };
                let completion = self.lifecycle.succeed(&pending, committed)?;
                if pending.operation.exits_on_success() {
                    self.services.runtime.navigate(NavigationTarget::Exit);
                }
                Ok(completion)
            }
            Err(err) => {
                let message = match pending.operation {
                    Operation::Delete => &self.messages.delete_failed,
                    _ => &self.messages.save_failed,
                };
                let completion = self.lifecycle.fail(&pending, message.clone())?;

                let context = format!("{} page variation {}", pending.operation.name(), self.id);
                self.services.diagnostics.report(&err, &context);
                self.services.notifier.notify(Notification::error(message.clone()));
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

    /// Merged save result, or the submitted snapshot when the result names
    /// conditions the catalogs do not list
    fn merge_save_result(&self, pending: &PendingMutation<Snapshot>, payload: &Value) -> Snapshot {
        let merged = merge_result(&pending.submitted, payload);
        match merged
            .conditions
            .validate(&self.catalogs, &pending.submitted.conditions)
        {
            Ok(()) => merged,
            Err(e) => {
                warn!(variation = %self.id, error = %e, "Result payload carries unknown conditions - keeping submitted value");
                pending.submitted.clone()
            }
        }
    }

    fn begin(&mut self, operation: Operation) -> Result<PendingMutation<Snapshot>, EditorError> {
        debug!(variation = %self.id, operation = operation.name(), "Submitting page variation");
        self.lifecycle.begin(operation, |draft| Ok(draft.clone()))
    }

    fn apply<F>(&mut self, intent: &'static str, f: F) -> Result<(), EditorError>
    where
        F: FnOnce(&Snapshot, &ConditionCatalogs) -> Result<Snapshot, EditorError>,
    {
        let catalogs = &self.catalogs;
        let result = self.lifecycle.edit(|snapshot| f(snapshot, catalogs));
        if let Err(e) = &result {
            warn!(variation = %self.id, intent, error = %e, "Rejected intent");
        }
        result
    }

    fn apply_conditions<F>(&mut self, intent: &'static str, f: F) -> Result<(), EditorError>
    where
        F: FnOnce(&ConditionSet, &ConditionCatalogs) -> Result<ConditionSet, EditorError>,
    {
        self.apply(intent, |snapshot, catalogs| {
            Ok(Snapshot {
                components: snapshot.components.clone(),
                conditions: f(&snapshot.conditions, catalogs)?,
            })
        })
    }
}
