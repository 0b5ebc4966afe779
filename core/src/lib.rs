//! Live prompt composition for Quill.
//!
//! This crate keeps one editable surface in sync with the prompt panel:
//! selection state, fragment history, content reconciliation, highlight
//! rendering, and the mutation guard that restores highlighting when a host
//! editor strips it.
//!
//! Everything is synchronous except [`PromptSession::bootstrap`], which waits
//! for the host page's editor to mount before enabling reconciliation.

mod guard;
mod highlight;
mod history;
mod panel;
mod reconciler;
mod removal;
mod selection;
mod session;
mod submission;
mod surface;
mod watcher;

pub use guard::{GuardPhase, GuardVerdict, MutationGuard};
pub use highlight::{HighlightRenderer, RenderNode, create_span, is_highlight_span, materialize};
pub use history::PromptHistory;
pub use panel::{InputTemplate, PanelEvent, SlotUpdate};
pub use reconciler::{
    ContentReconciler, FRAGMENT_SEPARATOR, ReconcileOutcome, Reconciliation, SkipReason,
    compose_plain,
};
pub use removal::{RemovalPatterns, strip_fragment};
pub use selection::SelectionStateStore;
pub use session::{DETECTED_CLASS, PromptSession};
pub use submission::compose_submission;
pub use surface::{
    HighlightSink, PlainField, RichRegion, Surface, SurfaceDescriptor, SurfaceError, SurfaceKind,
};
pub use watcher::{ElementById, FirstEditable, SurfaceLocator, SurfaceWatcher, WatchOutcome};
