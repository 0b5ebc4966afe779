//! Merge panel fragments and the user's own text into one surface.
//!
//! One reconciliation:
//!
//! 1. read the raw surface content
//! 2. strip every fragment text ever emitted (longest first), leaving the user text
//! 3. collect active fragments in dropdown, checkbox, input, category order
//!    and register them in the history; prune everything else from `active`
//! 4. compose: user text alone, highlighted spans, or a plain `\n\n` join
//! 5. write the result and announce it with input and change events
//!
//! Reconciling twice without a state change writes identical content.

use tracing::debug;

use quill_types::{HighlightStyle, PromptFragment, normalize_line_endings};

use crate::highlight::HighlightRenderer;
use crate::history::PromptHistory;
use crate::selection::SelectionStateStore;
use crate::surface::{Surface, SurfaceError};

/// Separator between fragments and before the user text.
pub const FRAGMENT_SEPARATOR: &str = "\n\n";

/// Why a reconciliation did not write anything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The bootstrap wait has not finished yet.
    Initializing,
    /// No surface has been detected.
    NoSurface,
    ReadFailed(SurfaceError),
    WriteFailed(SurfaceError),
}

/// What a successful reconciliation wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub fragments: Vec<PromptFragment>,
    pub user_text: String,
    /// The composed content as plain text, whatever form it was written in.
    pub content: String,
    /// Whether the content was written as highlight spans.
    pub highlighted: bool,
}

impl Reconciliation {
    /// Fragment texts in composition order.
    #[must_use]
    pub fn fragment_texts(&self) -> Vec<&str> {
        self.fragments.iter().map(|f| f.text().as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Written(Reconciliation),
    Skipped(SkipReason),
}

impl ReconcileOutcome {
    #[must_use]
    pub fn written(&self) -> Option<&Reconciliation> {
        match self {
            ReconcileOutcome::Written(r) => Some(r),
            ReconcileOutcome::Skipped(_) => None,
        }
    }

    #[must_use]
    pub fn is_written(&self) -> bool {
        self.written().is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ContentReconciler {
    highlight: bool,
    style: HighlightStyle,
}

impl Default for ContentReconciler {
    fn default() -> Self {
        Self::new(true, HighlightStyle::default())
    }
}

impl ContentReconciler {
    #[must_use]
    pub fn new(highlight: bool, style: HighlightStyle) -> Self {
        Self { highlight, style }
    }

    #[must_use]
    pub const fn highlight_enabled(&self) -> bool {
        self.highlight
    }

    pub fn set_highlight(&mut self, enabled: bool) {
        self.highlight = enabled;
    }

    #[must_use]
    pub fn style(&self) -> &HighlightStyle {
        &self.style
    }

    pub fn reconcile(
        &self,
        selections: &SelectionStateStore,
        history: &mut PromptHistory,
        surface: &mut dyn Surface,
    ) -> ReconcileOutcome {
        let raw = match surface.content() {
            Ok(raw) => normalize_line_endings(&raw),
            Err(err) => {
                debug!(surface = %surface.node(), "reconcile skipped, read failed: {err}");
                return ReconcileOutcome::Skipped(SkipReason::ReadFailed(err));
            }
        };
        let user_text = history.strip_known(&raw);

        let fragments = selections.active_fragments();
        for fragment in &fragments {
            history.register(fragment.text());
        }
        history.prune_inactive(fragments.iter().map(|f| f.text().as_str()));

        let texts: Vec<&str> = fragments.iter().map(|f| f.text().as_str()).collect();
        let content = compose_plain(&texts, &user_text);

        let written = if texts.is_empty() {
            surface.set_content(&user_text).map(|()| false)
        } else if self.highlight
            && let Some(sink) = surface.highlighter()
        {
            let nodes = HighlightRenderer::render(texts.iter().copied(), &user_text);
            sink.write_highlighted(&nodes, &self.style).map(|()| true)
        } else {
            surface.set_content(&content).map(|()| false)
        };
        let highlighted = match written {
            Ok(highlighted) => highlighted,
            Err(err) => {
                debug!(surface = %surface.node(), "reconcile skipped, write failed: {err}");
                return ReconcileOutcome::Skipped(SkipReason::WriteFailed(err));
            }
        };

        if let Err(err) = surface.notify_change() {
            debug!(surface = %surface.node(), "change notification failed: {err}");
        }

        debug!(
            surface = %surface.node(),
            fragments = fragments.len(),
            user_chars = user_text.chars().count(),
            highlighted,
            "reconciled"
        );
        ReconcileOutcome::Written(Reconciliation {
            fragments,
            user_text,
            content,
            highlighted,
        })
    }
}

/// Fragment texts joined by a blank line, followed by the user text.
#[must_use]
pub fn compose_plain(fragments: &[&str], user_text: &str) -> String {
    let mut content = fragments.join(FRAGMENT_SEPARATOR);
    if !user_text.is_empty() {
        if !content.is_empty() {
            content.push_str(FRAGMENT_SEPARATOR);
        }
        content.push_str(user_text);
    }
    content
}
