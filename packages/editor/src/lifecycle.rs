//! # Mutation Lifecycle
//!
//! Tracks a draft/committed pair and the one remote mutation that may be in
//! flight against it.
//!
//! ```text
//!          begin            resolved ok
//!   Idle ─────────▶ Pending ─────────────▶ Success ──▶ Idle
//!                      │
//!                      │ rejected
//!                      ▼
//!                   Failed ──▶ Idle
//! ```
//!
//! - `begin` applies the optimistic update to the draft before the remote call
//!   and refuses to start while another mutation is pending.
//! - Success overwrites `committed`. If the draft was not edited while pending
//!   it follows the committed value.
//! - Failure restores the draft from `committed` and records the user-facing
//!   message. `committed` is never touched on failure.

use crate::{EditorError, Operation};
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    Idle,
    Pending,
    Success,
    Failed,
}

/// Ticket for the mutation in flight
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMutation<S> {
    pub id: u64,
    pub operation: Operation,

    /// Draft as it was after the optimistic update
    pub submitted: S,
}

/// How a mutation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Committed {
        id: u64,
        operation: Operation,
    },
    RolledBack {
        id: u64,
        operation: Operation,
        message: String,
    },
}

impl Completion {
    pub fn is_committed(&self) -> bool {
        matches!(self, Completion::Committed { .. })
    }

    pub fn operation(&self) -> Operation {
        match self {
            Completion::Committed { operation, .. } | Completion::RolledBack { operation, .. } => {
                *operation
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct MutationLifecycle<S> {
    state: LifecycleState,
    committed: S,
    draft: S,
    in_flight: Option<(u64, Operation)>,
    next_id: u64,
    last_outcome: Option<LifecycleState>,
    last_error: Option<String>,
}

impl<S: Clone + PartialEq> MutationLifecycle<S> {
    pub fn new(initial: S) -> Self {
        Self {
            state: LifecycleState::Idle,
            draft: initial.clone(),
            committed: initial,
            in_flight: None,
            next_id: 0,
            last_outcome: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == LifecycleState::Pending
    }

    pub fn draft(&self) -> &S {
        &self.draft
    }

    pub fn committed(&self) -> &S {
        &self.committed
    }

    /// Whether the draft has edits the remote has not confirmed
    pub fn is_dirty(&self) -> bool {
        self.draft != self.committed
    }

    /// Success or Failed, whichever the last resolved mutation passed through
    pub fn last_outcome(&self) -> Option<LifecycleState> {
        self.last_outcome
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// Replace the draft with `f(draft)`; a failing `f` leaves it untouched
    pub fn edit<F>(&mut self, f: F) -> Result<(), EditorError>
    where
        F: FnOnce(&S) -> Result<S, EditorError>,
    {
        self.draft = f(&self.draft)?;
        Ok(())
    }

    /// Start a mutation, applying `optimistic` to the draft right away
    pub fn begin<F>(&mut self, operation: Operation, optimistic: F) -> Result<PendingMutation<S>, EditorError>
    where
        F: FnOnce(&S) -> Result<S, EditorError>,
    {
        if let Some((id, in_flight)) = self.in_flight {
            warn!(
                id,
                in_flight = in_flight.name(),
                requested = operation.name(),
                "Refusing to start a mutation while another is pending"
            );
            return Err(EditorError::ConcurrentMutation);
        }

        let submitted = optimistic(&self.draft)?;

        let id = self.next_id;
        self.next_id += 1;
        self.draft = submitted.clone();
        self.in_flight = Some((id, operation));
        self.transition(LifecycleState::Pending);
        debug!(id, operation = operation.name(), "Mutation pending");

        Ok(PendingMutation {
            id,
            operation,
            submitted,
        })
    }

    /// The remote confirmed `pending`; `committed` becomes the new baseline
    pub fn succeed(&mut self, pending: &PendingMutation<S>, committed: S) -> Result<Completion, EditorError> {
        self.take_in_flight(pending)?;

        self.transition(LifecycleState::Success);
        if self.draft == pending.submitted {
            self.draft = committed.clone();
        }
        self.committed = committed;
        self.last_error = None;
        self.last_outcome = Some(LifecycleState::Success);
        self.transition(LifecycleState::Idle);
        info!(id = pending.id, operation = pending.operation.name(), "Mutation committed");

        Ok(Completion::Committed {
            id: pending.id,
            operation: pending.operation,
        })
    }

    /// The remote rejected `pending`; the draft goes back to `committed`
    pub fn fail(&mut self, pending: &PendingMutation<S>, message: impl Into<String>) -> Result<Completion, EditorError> {
        self.take_in_flight(pending)?;

        let message = message.into();
        self.transition(LifecycleState::Failed);
        self.draft = self.committed.clone();
        self.last_error = Some(message.clone());
        self.last_outcome = Some(LifecycleState::Failed);
        self.transition(LifecycleState::Idle);
        warn!(id = pending.id, operation = pending.operation.name(), "Mutation rolled back");

        Ok(Completion::RolledBack {
            id: pending.id,
            operation: pending.operation,
            message,
        })
    }

    /// Start over from a value loaded from elsewhere (e.g. a refetch)
    pub fn reset(&mut self, value: S) -> Result<(), EditorError> {
        if self.is_pending() {
            return Err(EditorError::ConcurrentMutation);
        }
        self.draft = value.clone();
        self.committed = value;
        Ok(())
    }

    fn take_in_flight(&mut self, pending: &PendingMutation<S>) -> Result<(), EditorError> {
        match self.in_flight {
            Some((id, _)) if id == pending.id => {
                self.in_flight = None;
                Ok(())
            }
            _ => Err(EditorError::UnknownMutation(pending.id)),
        }
    }

    fn transition(&mut self, next: LifecycleState) {
        debug!(from = ?self.state, to = ?next, "Lifecycle transition");
        self.state = next;
    }
}
