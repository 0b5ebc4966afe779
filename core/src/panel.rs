//! Panel control events and how they map onto selection slots.

use serde::{Deserialize, Serialize};

use quill_types::SourceKind;

/// Text wrapped around a free-text input's value, from the template data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputTemplate {
    #[serde(default)]
    pub before: String,
    #[serde(default)]
    pub after: String,
}

impl InputTemplate {
    #[must_use]
    pub fn new(before: impl Into<String>, after: impl Into<String>) -> Self {
        Self {
            before: before.into(),
            after: after.into(),
        }
    }

    /// The fragment for `value`, or `None` when the trimmed value is blank.
    #[must_use]
    pub fn apply(&self, value: &str) -> Option<String> {
        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(format!("{}{value}{}", self.before, self.after))
        }
    }
}

/// A change coming from one control inside the panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PanelEvent {
    /// Checkboxes are keyed by their value, which is also the fragment text.
    CheckboxToggled { value: String, checked: bool },
    /// `selected` is the chosen option's prompt text; `None` for the empty option.
    DropdownChanged {
        id: String,
        #[serde(default)]
        selected: Option<String>,
    },
    InputChanged {
        id: String,
        value: String,
        #[serde(default)]
        template: InputTemplate,
    },
    CategoryPicked { category: String, prompt: String },
    CategoryCleared { category: String },
}

/// The single selection-slot update a panel event stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotUpdate {
    pub kind: SourceKind,
    pub id: String,
    pub text: Option<String>,
}

impl PanelEvent {
    #[must_use]
    pub fn slot_update(&self) -> SlotUpdate {
        let (kind, id, text) = match self {
            PanelEvent::CheckboxToggled { value, checked } => (
                SourceKind::Checkbox,
                value.clone(),
                checked.then(|| value.clone()),
            ),
            PanelEvent::DropdownChanged { id, selected } => {
                (SourceKind::Dropdown, id.clone(), selected.clone())
            }
            PanelEvent::InputChanged {
                id,
                value,
                template,
            } => (SourceKind::Input, id.clone(), template.apply(value)),
            PanelEvent::CategoryPicked { category, prompt } => {
                (SourceKind::Category, category.clone(), Some(prompt.clone()))
            }
            PanelEvent::CategoryCleared { category } => {
                (SourceKind::Category, category.clone(), None)
            }
        };
        SlotUpdate { kind, id, text }
    }
}
