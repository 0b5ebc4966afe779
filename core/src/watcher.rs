//! Bounded re-detection of the surface as the host page changes.
//!
//! Single-page hosts swap their editor out on client-side navigation. The
//! watcher observes child-list changes under `body` and re-runs the locator
//! once per batch, for at most `max_attempts` batches that do not turn up a
//! new surface. It disconnects itself on success or on exhaustion.
//!
//! Changes inside the current surface are edits, not navigation: they are
//! drained without running the locator and never use up an attempt.

use tracing::{debug, trace};

use quill_dom::{Document, Element, NodeId, ObserveOptions, ObserverId};

/// Resolves the element the composer should write into.
pub trait SurfaceLocator {
    fn locate(&self, doc: &Document) -> Option<NodeId>;
}

impl<F> SurfaceLocator for F
where
    F: Fn(&Document) -> Option<NodeId>,
{
    fn locate(&self, doc: &Document) -> Option<NodeId> {
        self(doc)
    }
}

/// The first `textarea` or `contenteditable` element in the page.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstEditable;

impl SurfaceLocator for FirstEditable {
    fn locate(&self, doc: &Document) -> Option<NodeId> {
        doc.find_element(doc.body(), |el: &Element| {
            el.tag() == "textarea" || el.is_content_editable()
        })
        .filter(|node| *node != doc.body())
    }
}

/// The connected element with this `id`.
#[derive(Debug, Clone)]
pub struct ElementById(pub String);

impl SurfaceLocator for ElementById {
    fn locate(&self, doc: &Document) -> Option<NodeId> {
        doc.get_element_by_id(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Stopped,
    NoRecords,
    /// Every record came from inside the current surface.
    InsideSurface,
    /// Nothing new yet; `attempt` of `max` used.
    Searching { attempt: u32, max: u32 },
    Found(NodeId),
    Exhausted,
}

#[derive(Debug)]
pub struct SurfaceWatcher {
    observer: Option<ObserverId>,
    attempts: u32,
    max_attempts: u32,
}

impl SurfaceWatcher {
    /// Start observing `body` for child-list changes.
    pub fn start(doc: &mut Document, max_attempts: u32) -> Self {
        let observer = doc.observe(doc.body(), ObserveOptions::child_list_subtree());
        Self {
            observer: Some(observer),
            attempts: 0,
            max_attempts,
        }
    }

    #[must_use]
    pub fn is_watching(&self) -> bool {
        self.observer.is_some()
    }

    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Drain queued records and look for a surface other than `current`.
    pub fn on_mutations(
        &mut self,
        doc: &mut Document,
        locator: &dyn SurfaceLocator,
        current: Option<NodeId>,
    ) -> WatchOutcome {
        let Some(observer) = self.observer else {
            return WatchOutcome::Stopped;
        };
        let records = doc.take_records(observer);
        if records.is_empty() {
            return WatchOutcome::NoRecords;
        }
        if let Some(surface) = current
            && records.iter().all(|r| doc.contains(surface, r.target))
        {
            trace!(%surface, records = records.len(), "watcher skipping edits inside surface");
            return WatchOutcome::InsideSurface;
        }

        let current = current.filter(|node| doc.is_connected(*node));
        match locator.locate(doc) {
            Some(found) if Some(found) != current => {
                debug!(surface = %found, attempts = self.attempts, "surface detected");
                self.stop(doc);
                WatchOutcome::Found(found)
            }
            _ => {
                self.attempts += 1;
                if self.attempts >= self.max_attempts {
                    debug!(attempts = self.attempts, "surface detection gave up");
                    self.stop(doc);
                    WatchOutcome::Exhausted
                } else {
                    WatchOutcome::Searching {
                        attempt: self.attempts,
                        max: self.max_attempts,
                    }
                }
            }
        }
    }

    pub fn stop(&mut self, doc: &mut Document) {
        if let Some(observer) = self.observer.take() {
            doc.disconnect(observer);
        }
    }
}
