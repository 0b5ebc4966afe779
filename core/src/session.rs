//! One panel attachment: selections, history, guard and watcher for a surface.
//!
//! The session owns every piece of mutable composer state; nothing is global.
//! State is created when a surface is attached, fully reset when a different
//! surface is detected, and released by [`PromptSession::teardown`].
//!
//! Reconciliation is suppressed while the session is initializing. The latch
//! is released by [`PromptSession::bootstrap`] once the host's editor has had
//! `startup_delay` to mount, or explicitly via
//! [`PromptSession::finish_initializing`].

use std::time::Instant;

use tokio::time;
use tracing::debug;

use quill_dom::{Document, NodeId};
use quill_types::{Language, Settings, SourceKind};

use crate::guard::{GuardVerdict, MutationGuard};
use crate::history::PromptHistory;
use crate::panel::PanelEvent;
use crate::reconciler::{ContentReconciler, ReconcileOutcome, SkipReason};
use crate::selection::SelectionStateStore;
use crate::submission::compose_submission;
use crate::surface::SurfaceDescriptor;
use crate::watcher::{SurfaceLocator, SurfaceWatcher, WatchOutcome};

/// Class added to a freshly detected surface for a short while.
pub const DETECTED_CLASS: &str = "quill-detected";

#[derive(Debug)]
pub struct PromptSession {
    settings: Settings,
    selections: SelectionStateStore,
    history: PromptHistory,
    reconciler: ContentReconciler,
    guard: MutationGuard,
    watcher: Option<SurfaceWatcher>,
    surface: Option<SurfaceDescriptor>,
    initializing: bool,
    badge_until: Option<Instant>,
    panel_visible: bool,
    language: Language,
}

impl PromptSession {
    #[must_use]
    pub fn new(settings: Settings) -> Self {
        let reconciler =
            ContentReconciler::new(settings.highlight_prompts, settings.highlight_style.clone());
        let guard = MutationGuard::new(&settings.timings, settings.highlight_style.clone());
        Self {
            panel_visible: settings.auto_open,
            settings,
            selections: SelectionStateStore::new(),
            history: PromptHistory::new(),
            reconciler,
            guard,
            watcher: None,
            surface: None,
            initializing: true,
            badge_until: None,
            language: Language::default(),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Wait for the host editor to mount, start watching for surface changes,
    /// attach to whatever `locator` finds, then allow reconciliation.
    pub async fn bootstrap(
        &mut self,
        doc: &mut Document,
        locator: &dyn SurfaceLocator,
    ) -> Option<SurfaceDescriptor> {
        time::sleep(self.settings.timings.startup_delay).await;
        let now = time::Instant::now().into_std();

        self.watch(doc);
        let attached = locator
            .locate(doc)
            .and_then(|node| self.attach(doc, node, now));
        if attached.is_none() {
            debug!("no surface at startup; waiting for the page to provide one");
        }
        self.finish_initializing();
        attached
    }

    #[must_use]
    pub const fn is_initializing(&self) -> bool {
        self.initializing
    }

    pub fn finish_initializing(&mut self) {
        if self.initializing {
            debug!("initialization complete; reconciliation enabled");
        }
        self.initializing = false;
    }

    /// Bind to `node` as the surface. Attaching to a different surface than
    /// the current one clears selections and history. `None` if `node` is not
    /// an editable element.
    pub fn attach(
        &mut self,
        doc: &mut Document,
        node: NodeId,
        now: Instant,
    ) -> Option<SurfaceDescriptor> {
        let Some(descriptor) =
            SurfaceDescriptor::detect(doc, node, &self.settings.host_editor_classes)
        else {
            debug!(%node, "element is not an editable surface");
            return None;
        };

        if self.surface.map(|s| s.node()) != Some(node) {
            self.reset(doc);
        }
        self.surface = Some(descriptor);

        match doc.add_class(node, DETECTED_CLASS) {
            Ok(()) => self.badge_until = Some(now + self.settings.timings.detected_badge),
            Err(err) => debug!(%node, "could not mark surface: {err}"),
        }
        debug!(%node, kind = ?descriptor.kind(), "surface attached");
        Some(descriptor)
    }

    fn reset(&mut self, doc: &mut Document) {
        self.guard.disarm(doc);
        self.clear_badge(doc);
        self.selections.clear();
        self.history.clear();
    }

    /// (Re)start the bounded surface watcher.
    pub fn watch(&mut self, doc: &mut Document) {
        if let Some(mut old) = self.watcher.take() {
            old.stop(doc);
        }
        self.watcher = Some(SurfaceWatcher::start(
            doc,
            self.settings.timings.detection_max_attempts,
        ));
    }

    /// Disconnect every observer and forget the surface.
    pub fn teardown(&mut self, doc: &mut Document) {
        if let Some(mut watcher) = self.watcher.take() {
            watcher.stop(doc);
        }
        self.reset(doc);
        self.surface = None;
        debug!("session torn down");
    }

    // ========================================================================
    // Selections
    // ========================================================================

    pub fn set_checkbox(
        &mut self,
        doc: &mut Document,
        id: &str,
        text: &str,
        active: bool,
    ) -> ReconcileOutcome {
        self.selections.set_checkbox(id, text, active);
        self.reconcile(doc)
    }

    pub fn set_dropdown(
        &mut self,
        doc: &mut Document,
        id: &str,
        text: Option<&str>,
    ) -> ReconcileOutcome {
        self.selections.set_dropdown(id, text);
        self.reconcile(doc)
    }

    pub fn set_input(
        &mut self,
        doc: &mut Document,
        id: &str,
        text: Option<&str>,
    ) -> ReconcileOutcome {
        self.selections.set_input(id, text);
        self.reconcile(doc)
    }

    pub fn set_category_prompt(
        &mut self,
        doc: &mut Document,
        category: &str,
        text: Option<&str>,
    ) -> ReconcileOutcome {
        self.selections.set_category_prompt(category, text);
        self.reconcile(doc)
    }

    pub fn handle_panel_event(&mut self, doc: &mut Document, event: &PanelEvent) -> ReconcileOutcome {
        let update = event.slot_update();
        self.selections
            .set(update.kind, update.id, update.text.as_deref());
        self.reconcile(doc)
    }

    /// Switch between highlighted spans and plain text, and rewrite the surface.
    pub fn set_highlighting(&mut self, doc: &mut Document, enabled: bool) -> ReconcileOutcome {
        self.reconciler.set_highlight(enabled);
        self.settings.highlight_prompts = enabled;
        self.reconcile(doc)
    }

    // ========================================================================
    // Reconciliation and observers
    // ========================================================================

    pub fn reconcile(&mut self, doc: &mut Document) -> ReconcileOutcome {
        if self.initializing {
            debug!("reconcile skipped during initialization");
            return ReconcileOutcome::Skipped(SkipReason::Initializing);
        }
        let Some(descriptor) = self.surface else {
            debug!("reconcile skipped, no surface detected");
            return ReconcileOutcome::Skipped(SkipReason::NoSurface);
        };

        // The reconciler's own write must not reach the guard.
        self.guard.disarm(doc);
        let outcome = {
            let mut surface = descriptor.bind(doc);
            self.reconciler
                .reconcile(&self.selections, &mut self.history, surface.as_mut())
        };

        if let ReconcileOutcome::Written(written) = &outcome
            && written.highlighted
            && descriptor.kind().is_host_managed()
        {
            let texts = written
                .fragment_texts()
                .into_iter()
                .map(str::to_string)
                .collect();
            self.guard.arm(doc, descriptor.node(), texts);
        }
        outcome
    }

    /// Deliver the guard's pending mutation records.
    pub fn deliver_mutations(&mut self, doc: &mut Document, now: Instant) -> GuardVerdict {
        self.guard.on_mutations(doc, now)
    }

    /// Deliver the watcher's pending records; attaches to a newly found surface.
    pub fn on_page_mutation(
        &mut self,
        doc: &mut Document,
        locator: &dyn SurfaceLocator,
        now: Instant,
    ) -> WatchOutcome {
        let Some(watcher) = self.watcher.as_mut() else {
            return WatchOutcome::Stopped;
        };
        let current = self.surface.map(|s| s.node());
        let outcome = watcher.on_mutations(doc, locator, current);
        match outcome {
            WatchOutcome::Found(node) => {
                self.watcher = None;
                if self.attach(doc, node, now).is_some() {
                    self.watch(doc);
                }
            }
            WatchOutcome::Exhausted => self.watcher = None,
            _ => {}
        }
        outcome
    }

    /// Time-driven housekeeping: drops the detection badge once it expired.
    pub fn tick(&mut self, doc: &mut Document, now: Instant) {
        if self.badge_until.is_some_and(|until| now >= until) {
            self.clear_badge(doc);
        }
    }

    fn clear_badge(&mut self, doc: &mut Document) {
        if self.badge_until.take().is_some()
            && let Some(surface) = self.surface
            && let Err(err) = doc.remove_class(surface.node(), DETECTED_CLASS)
        {
            debug!(node = %surface.node(), "could not unmark surface: {err}");
        }
    }

    // ========================================================================
    // Panel and submission
    // ========================================================================

    pub fn set_panel_visible(&mut self, visible: bool) {
        self.panel_visible = visible;
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Text to send when the user submits, or `None` without a readable surface.
    #[must_use]
    pub fn submission(&self, doc: &mut Document) -> Option<String> {
        let descriptor = self.surface?;
        let content = descriptor.bind(doc).content().ok()?;
        Some(compose_submission(
            &content,
            self.panel_visible,
            &self.language,
        ))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    #[must_use]
    pub const fn surface(&self) -> Option<SurfaceDescriptor> {
        self.surface
    }

    #[must_use]
    pub fn selections(&self) -> &SelectionStateStore {
        &self.selections
    }

    #[must_use]
    pub fn history(&self) -> &PromptHistory {
        &self.history
    }

    #[must_use]
    pub fn guard(&self) -> &MutationGuard {
        &self.guard
    }

    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.watcher.as_ref().is_some_and(SurfaceWatcher::is_watching)
    }

    #[must_use]
    pub const fn panel_visible(&self) -> bool {
        self.panel_visible
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// The active category prompts, one per line.
    #[must_use]
    pub fn category_summary(&self) -> String {
        self.selections.category_summary()
    }

    #[must_use]
    pub fn active_count(&self, kind: SourceKind) -> usize {
        self.selections
            .active_fragments()
            .iter()
            .filter(|f| f.source_kind() == kind)
            .count()
    }
}
