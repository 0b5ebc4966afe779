//! Core domain types for Quill.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the prompt composer.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory
#![allow(clippy::missing_panics_doc)] // Panics are documented in assertions

mod language;
mod settings;
mod text;

pub use language::Language;
pub use settings::{HighlightStyle, Settings, Timings, Tone};
pub use text::{normalize_line_endings, truncate_with_ellipsis};

use serde::{Deserialize, Serialize};
use std::{fmt, ops::Deref};
use thiserror::Error;

// ============================================================================
// Fragment Text
// ============================================================================

/// Fragment text guaranteed to be non-blank, stored trimmed.
///
/// A panel selection whose text is empty or whitespace-only never becomes a
/// fragment; construction is the only place that rule is checked.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FragmentText(String);

#[derive(Debug, Error)]
#[error("fragment text must not be blank")]
pub struct EmptyFragmentError;

impl FragmentText {
    pub fn new(value: impl AsRef<str>) -> Result<Self, EmptyFragmentError> {
        let trimmed = value.as_ref().trim();
        if trimmed.is_empty() {
            Err(EmptyFragmentError)
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }

    /// Like [`FragmentText::new`], but treats blank input as "no fragment".
    #[must_use]
    pub fn from_optional(value: Option<&str>) -> Option<Self> {
        value.and_then(|v| Self::new(v).ok())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for FragmentText {
    type Error = EmptyFragmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for FragmentText {
    type Error = EmptyFragmentError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<FragmentText> for String {
    fn from(value: FragmentText) -> Self {
        value.0
    }
}

impl Deref for FragmentText {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for FragmentText {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for FragmentText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Sources
// ============================================================================

/// Which kind of panel control produced a fragment.
///
/// The declaration order is the composition order: fragments always appear on
/// the surface as dropdown, checkbox, input, category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Dropdown,
    Checkbox,
    Input,
    Category,
}

impl SourceKind {
    /// All kinds, in composition order.
    pub const ORDERED: [SourceKind; 4] = [
        SourceKind::Dropdown,
        SourceKind::Checkbox,
        SourceKind::Input,
        SourceKind::Category,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            SourceKind::Dropdown => "dropdown",
            SourceKind::Checkbox => "checkbox",
            SourceKind::Input => "input",
            SourceKind::Category => "category",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of one panel control (select id, checkbox value, input id, category name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(String);

impl SourceId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SourceId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SourceId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A unit of text contributed by one active panel selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptFragment {
    source_id: SourceId,
    source_kind: SourceKind,
    text: FragmentText,
}

impl PromptFragment {
    #[must_use]
    pub fn new(source_kind: SourceKind, source_id: SourceId, text: FragmentText) -> Self {
        Self {
            source_id,
            source_kind,
            text,
        }
    }

    #[must_use]
    pub fn source_id(&self) -> &SourceId {
        &self.source_id
    }

    #[must_use]
    pub const fn source_kind(&self) -> SourceKind {
        self.source_kind
    }

    #[must_use]
    pub fn text(&self) -> &FragmentText {
        &self.text
    }
}
