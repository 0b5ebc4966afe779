//! Record of every fragment text the panel has ever put on the surface.
//!
//! Two sets: `all` grows for the lifetime of a surface attachment and never
//! shrinks; `active` is reset on every reconciliation to exactly the texts
//! currently emitted. `active` is always a subset of `all`.
//!
//! `all` is deliberately unbounded. It is what lets a fragment be stripped even
//! if it was deselected many steps ago without the surface being rewritten in
//! between. Its size is bounded by the template vocabulary, not by user input.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use quill_types::{FragmentText, truncate_with_ellipsis};

use crate::removal::{RemovalPatterns, strip_literal};

#[derive(Debug, Default, Clone)]
pub struct PromptHistory {
    /// Every text ever emitted, with its removal patterns compiled once.
    /// `None` when the patterns could not be compiled; literal removal is used instead.
    all: BTreeMap<String, Option<RemovalPatterns>>,
    active: BTreeSet<String>,
}

impl PromptHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `text` to both `all` and `active`.
    pub fn register(&mut self, text: &FragmentText) {
        let key = text.as_str();
        if !self.all.contains_key(key) {
            let patterns = match RemovalPatterns::new(key) {
                Ok(patterns) => Some(patterns),
                Err(err) => {
                    debug!(
                        fragment = %truncate_with_ellipsis(key, 40),
                        "falling back to literal removal: {err}"
                    );
                    None
                }
            };
            self.all.insert(key.to_string(), patterns);
        }
        self.active.insert(key.to_string());
    }

    /// Drop from `active` every text not in `current`. `all` is untouched.
    pub fn prune_inactive<'a>(&mut self, current: impl IntoIterator<Item = &'a str>) {
        let keep: BTreeSet<&str> = current.into_iter().collect();
        self.active.retain(|text| keep.contains(text.as_str()));
    }

    pub fn all(&self) -> impl Iterator<Item = &str> {
        self.all.keys().map(String::as_str)
    }

    pub fn active(&self) -> impl Iterator<Item = &str> {
        self.active.iter().map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, text: &str) -> bool {
        self.all.contains_key(text)
    }

    #[must_use]
    pub fn is_active(&self, text: &str) -> bool {
        self.active.contains(text)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.all.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    /// Texts of `all` in the order they are stripped: longest first, ties
    /// broken lexicographically. Stable across calls, and a fragment is always
    /// stripped before any shorter fragment it contains.
    #[must_use]
    pub fn removal_order(&self) -> Vec<&str> {
        let mut texts: Vec<&str> = self.all().collect();
        texts.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
        texts
    }

    /// Strip every known fragment out of `raw`, leaving only the user's own text.
    #[must_use]
    pub fn strip_known(&self, raw: &str) -> String {
        let mut content = raw.to_string();
        for text in self.removal_order() {
            content = match self.all.get(text) {
                Some(Some(patterns)) => patterns.strip(&content).into_owned(),
                _ => strip_literal(&content, text),
            };
        }
        content.trim().to_string()
    }

    /// Forget everything. Used when the surface is re-detected.
    pub fn clear(&mut self) {
        self.all.clear();
        self.active.clear();
    }
}
