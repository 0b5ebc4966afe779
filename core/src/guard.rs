//! Restores highlighting when a host editing framework strips it.
//!
//! Host frameworks normalize their editable region on their own update cycle
//! and routinely drop foreign inline spans. The guard watches the surface and
//! re-wraps fragment text in highlight spans, without ever reacting to its own
//! writes:
//!
//! - while a pass is `Applying` (for `release` after it started) every batch is
//!   dropped;
//! - a batch that adds any highlight span is treated as self-caused;
//! - two passes are at least `throttle` apart.
//!
//! Time is passed in explicitly so the state machine is driven the same way in
//! tests and in the session.

use std::fmt;
use std::time::{Duration, Instant};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use tracing::{debug, trace};

use quill_dom::{DomError, Document, NodeId, ObserveOptions, ObserverId};
use quill_types::{HighlightStyle, Timings, Tone};

use crate::highlight::{create_span, is_highlight_span};

/// Lifecycle of the guard's own re-styling pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardPhase {
    Idle,
    /// A pass started; mutations are ignored until `until`.
    Applying { until: Instant },
}

/// What the guard did with one delivery of mutation records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    Disarmed,
    NoRecords,
    IgnoredApplying,
    IgnoredOwnSpan,
    NoChildList,
    /// Surface is empty or still carries highlight spans.
    NothingToRestore,
    Throttled,
    Restyled { wrapped: usize },
}

struct Armed {
    surface: NodeId,
    observer: ObserverId,
    fragments: Vec<String>,
    matcher: Option<AhoCorasick>,
}

impl fmt::Debug for Armed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Armed")
            .field("surface", &self.surface)
            .field("observer", &self.observer)
            .field("fragments", &self.fragments.len())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub struct MutationGuard {
    armed: Option<Armed>,
    phase: GuardPhase,
    last_applied_at: Option<Instant>,
    throttle: Duration,
    release: Duration,
    style: HighlightStyle,
    /// Number of spans after which the next wrap fails.
    #[cfg(test)]
    fail_wrap_at: Option<usize>,
}

impl MutationGuard {
    #[must_use]
    pub fn new(timings: &Timings, style: HighlightStyle) -> Self {
        Self {
            armed: None,
            phase: GuardPhase::Idle,
            last_applied_at: None,
            throttle: timings.guard_throttle,
            release: timings.guard_release,
            style,
            #[cfg(test)]
            fail_wrap_at: None,
        }
    }

    /// Watch `surface` and restore highlighting for `fragments` (in
    /// composition order). Replaces any previous arming.
    pub fn arm(&mut self, doc: &mut Document, surface: NodeId, fragments: Vec<String>) {
        self.disarm(doc);
        let fragments: Vec<String> = fragments
            .into_iter()
            .filter(|f| !f.trim().is_empty())
            .collect();
        let matcher = if fragments.is_empty() {
            None
        } else {
            match AhoCorasickBuilder::new()
                .match_kind(MatchKind::LeftmostLongest)
                .build(&fragments)
            {
                Ok(ac) => Some(ac),
                Err(err) => {
                    debug!("guard matcher build failed; restyling disabled ({err})");
                    None
                }
            }
        };
        let observer = doc.observe(surface, ObserveOptions::everything());
        debug!(%surface, fragments = fragments.len(), "guard armed");
        self.armed = Some(Armed {
            surface,
            observer,
            fragments,
            matcher,
        });
    }

    /// Stop watching. Queued records are dropped with the observer.
    pub fn disarm(&mut self, doc: &mut Document) {
        if let Some(armed) = self.armed.take() {
            doc.disconnect(armed.observer);
            trace!(surface = %armed.surface, "guard disarmed");
        }
    }

    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    #[must_use]
    pub fn fragments(&self) -> &[String] {
        self.armed.as_ref().map_or(&[], |a| a.fragments.as_slice())
    }

    /// Phase as of `now`. An expired `Applying` reads as `Idle`.
    #[must_use]
    pub fn phase(&self, now: Instant) -> GuardPhase {
        match self.phase {
            GuardPhase::Applying { until } if now >= until => GuardPhase::Idle,
            phase => phase,
        }
    }

    #[must_use]
    pub const fn last_applied_at(&self) -> Option<Instant> {
        self.last_applied_at
    }

    /// Drain the guard's observer and react to the batch.
    pub fn on_mutations(&mut self, doc: &mut Document, now: Instant) -> GuardVerdict {
        let Some(armed) = self.armed.as_ref() else {
            return GuardVerdict::Disarmed;
        };
        let surface = armed.surface;
        let records = doc.take_records(armed.observer);
        if records.is_empty() {
            return GuardVerdict::NoRecords;
        }

        self.phase = self.phase(now);
        if matches!(self.phase, GuardPhase::Applying { .. }) {
            trace!(records = records.len(), "guard ignoring batch during own pass");
            return GuardVerdict::IgnoredApplying;
        }
        if records
            .iter()
            .flat_map(|r| r.added_nodes())
            .any(|node| is_highlight_span(doc, *node))
        {
            return GuardVerdict::IgnoredOwnSpan;
        }
        if !records.iter().any(|r| r.is_child_list()) {
            return GuardVerdict::NoChildList;
        }
        if doc.text_content(surface).is_empty()
            || !doc
                .elements_with_class(surface, HighlightStyle::CLASS)
                .is_empty()
        {
            return GuardVerdict::NothingToRestore;
        }
        if self
            .last_applied_at
            .is_some_and(|at| now.saturating_duration_since(at) <= self.throttle)
        {
            return GuardVerdict::Throttled;
        }

        self.phase = GuardPhase::Applying {
            until: now + self.release,
        };
        self.last_applied_at = Some(now);

        let wrapped = match self.restyle(doc) {
            Ok(wrapped) => wrapped,
            Err((wrapped, err)) => {
                debug!(%surface, wrapped, "guard restyle stopped early: {err}");
                wrapped
            }
        };
        debug!(%surface, wrapped, "guard restored highlighting");
        GuardVerdict::Restyled { wrapped }
    }

    /// Wrap every fragment occurrence in un-highlighted text nodes. On error,
    /// returns how many spans were placed before it.
    fn restyle(&self, doc: &mut Document) -> Result<usize, (usize, DomError)> {
        let Some(armed) = self.armed.as_ref() else {
            return Ok(0);
        };
        let Some(matcher) = armed.matcher.as_ref() else {
            return Ok(0);
        };

        let candidates: Vec<NodeId> = doc
            .text_nodes(armed.surface)
            .into_iter()
            .filter(|node| !inside_span(doc, armed.surface, *node))
            .collect();

        let mut wrapped = 0;
        for node in candidates {
            let Some(text) = doc.text(node) else {
                continue;
            };
            let matches: Vec<(usize, usize, usize)> = matcher
                .find_iter(text)
                .map(|m| (m.pattern().as_usize(), m.start(), m.end()))
                .collect();

            // Back to front so earlier offsets stay valid in the head node.
            for (pattern, start, end) in matches.into_iter().rev() {
                #[cfg(test)]
                {
                    if self.fail_wrap_at == Some(wrapped) {
                        return Err((wrapped, DomError::NoParent(node)));
                    }
                }
                self.wrap_range(doc, node, start, end, Tone::for_position(pattern))
                    .map_err(|err| (wrapped, err))?;
                wrapped += 1;
            }
        }
        Ok(wrapped)
    }

    fn wrap_range(
        &self,
        doc: &mut Document,
        node: NodeId,
        start: usize,
        end: usize,
        tone: Tone,
    ) -> Result<(), DomError> {
        let len = doc.text(node).map_or(0, str::len);
        if end < len {
            doc.split_text(node, end)?;
        }
        let target = if start > 0 {
            doc.split_text(node, start)?
        } else {
            node
        };
        let Some(text) = doc.text(target).map(str::to_string) else {
            return Err(DomError::NotText(target));
        };
        let span = create_span(doc, &text, tone, &self.style)?;
        let parent = doc.parent(target).ok_or(DomError::NoParent(target))?;
        doc.insert_before(parent, span, target)?;
        doc.remove_child(parent, target)
    }
}

/// Whether `node` already sits in a highlight span below `surface`.
fn inside_span(doc: &Document, surface: NodeId, node: NodeId) -> bool {
    let mut current = doc.parent(node);
    while let Some(id) = current {
        if id == surface {
            return false;
        }
        if is_highlight_span(doc, id) {
            return true;
        }
        current = doc.parent(id);
    }
    false
}
