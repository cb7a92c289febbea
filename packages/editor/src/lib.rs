//! # Pageforge Editor
//!
//! State engine behind the page-layout admin: component order, targeting
//! conditions, route metadata and redirect import.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ presentation: intents + read projections    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ sessions: EditSession / RouteFormSession /  │
//! │           RedirectTable                     │
//! │  - route intents to pure transitions        │
//! │  - route save/delete/import to lifecycle    │
//! └─────────────────────────────────────────────┘
//!          ↓                          ↓
//! ┌──────────────────────┐  ┌───────────────────────┐
//! │ OrderedList          │  │ MutationLifecycle     │
//! │ ConditionSet         │  │  draft / committed    │
//! │ (values)             │  │  idle → pending → ... │
//! └──────────────────────┘  └───────────────────────┘
//!                                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ Services: remote, notifier, diagnostics,    │
//! │           runtime                           │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Values, not mutation**: lists and condition sets are replaced, never
//!    edited in place
//! 2. **One mutation in flight**: a second save/delete/import while one is
//!    pending is refused
//! 3. **Optimistic drafts**: the draft shows the change at once and falls back
//!    to the committed snapshot when the remote rejects it
//! 4. **Committed means confirmed**: only a successful remote call moves the
//!    committed snapshot
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pageforge_editor::{EditSession, EditorConfig, PageVariation};
//!
//! let mut session = EditSession::open(variation, &EditorConfig::default(), services)?;
//!
//! session.move_component(0, 2)?;
//! session.set_device("mobile")?;
//! session.add_custom("logged-in")?;
//!
//! // Optimistic save; rolls back and toasts on failure
//! let completion = session.save().await?;
//! ```

mod conditions;
mod config;
mod errors;
mod lifecycle;
mod mutations;
mod ordered_list;
mod redirects;
mod route_form;
mod services;
mod session;

pub use conditions::{ConditionCatalogs, ConditionGroup, ConditionOption, ConditionSection, ConditionSet};
pub use config::{EditorConfig, Messages};
pub use errors::{EditorError, RemoteError};
pub use lifecycle::{Completion, LifecycleState, MutationLifecycle, PendingMutation};
pub use mutations::{merge_patch, merge_result, ImportFile, MutationRemote, Operation, RemoteRequest};
pub use ordered_list::{Bindings, ComponentBinding, ComponentDescriptor, OrderedList, RenderOptions};
pub use redirects::{
    Column, ColumnKind, EndDateCell, Page, RedirectRecord, RedirectRow, RedirectSource, RedirectStatus,
    RedirectTable, RedirectType, COLUMNS,
};
pub use route_form::{edit_target, route_title, Route, RouteDetail, RouteFormSession};
pub use services::{
    Diagnostics, NavigationTarget, Notification, Notifier, RenderRuntime, Services, Severity, TracingDiagnostics,
    INSTITUTIONAL_ROUTES_FORM, NEW_REDIRECT_ID, REDIRECTS_BASE_URL,
};
pub use session::{EditSession, PageVariation, Snapshot};

// Re-export common types for convenience
pub use pageforge_common::{Catalog, Condition, ANY_DEVICE};
