//! Current panel selections, one ordered slot list per source kind.

use tracing::trace;

use quill_types::{FragmentText, PromptFragment, SourceId, SourceKind};

/// Insertion-ordered `SourceId → FragmentText` slots for one source kind.
///
/// Replacing an existing slot keeps its position; clearing removes it.
#[derive(Debug, Default, Clone)]
struct Slots(Vec<(SourceId, FragmentText)>);

impl Slots {
    /// Returns `true` if the slot list changed.
    fn set(&mut self, id: SourceId, text: Option<FragmentText>) -> bool {
        let existing = self.0.iter().position(|(slot, _)| *slot == id);
        match (existing, text) {
            (Some(index), Some(text)) => {
                if self.0[index].1 == text {
                    return false;
                }
                self.0[index].1 = text;
                true
            }
            (Some(index), None) => {
                self.0.remove(index);
                true
            }
            (None, Some(text)) => {
                self.0.push((id, text));
                true
            }
            (None, None) => false,
        }
    }

    fn get(&self, id: &str) -> Option<&FragmentText> {
        self.0
            .iter()
            .find(|(slot, _)| slot.as_str() == id)
            .map(|(_, text)| text)
    }

    fn iter(&self) -> impl Iterator<Item = &(SourceId, FragmentText)> {
        self.0.iter()
    }

    fn len(&self) -> usize {
        self.0.len()
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

/// What the panel currently has selected.
///
/// At most one fragment exists per `(SourceKind, SourceId)`. Blank text never
/// occupies a slot: setting it is the same as clearing.
#[derive(Debug, Default, Clone)]
pub struct SelectionStateStore {
    dropdowns: Slots,
    checkboxes: Slots,
    inputs: Slots,
    categories: Slots,
}

impl SelectionStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self, kind: SourceKind) -> &Slots {
        match kind {
            SourceKind::Dropdown => &self.dropdowns,
            SourceKind::Checkbox => &self.checkboxes,
            SourceKind::Input => &self.inputs,
            SourceKind::Category => &self.categories,
        }
    }

    fn slots_mut(&mut self, kind: SourceKind) -> &mut Slots {
        match kind {
            SourceKind::Dropdown => &mut self.dropdowns,
            SourceKind::Checkbox => &mut self.checkboxes,
            SourceKind::Input => &mut self.inputs,
            SourceKind::Category => &mut self.categories,
        }
    }

    /// Update one slot. Returns `true` if the selection changed.
    pub fn set(&mut self, kind: SourceKind, id: impl Into<SourceId>, text: Option<&str>) -> bool {
        let id = id.into();
        let text = FragmentText::from_optional(text);
        trace!(%kind, %id, active = text.is_some(), "selection update");
        self.slots_mut(kind).set(id, text)
    }

    pub fn set_checkbox(&mut self, id: impl Into<SourceId>, text: &str, active: bool) -> bool {
        self.set(SourceKind::Checkbox, id, active.then_some(text))
    }

    pub fn set_dropdown(&mut self, id: impl Into<SourceId>, text: Option<&str>) -> bool {
        self.set(SourceKind::Dropdown, id, text)
    }

    pub fn set_input(&mut self, id: impl Into<SourceId>, text: Option<&str>) -> bool {
        self.set(SourceKind::Input, id, text)
    }

    pub fn set_category_prompt(&mut self, category: impl Into<SourceId>, text: Option<&str>) -> bool {
        self.set(SourceKind::Category, category, text)
    }

    #[must_use]
    pub fn get(&self, kind: SourceKind, id: &str) -> Option<&FragmentText> {
        self.slots(kind).get(id)
    }

    /// Every active fragment in composition order: dropdown, checkbox, input,
    /// category; within a kind, in the order the slots were first filled.
    #[must_use]
    pub fn active_fragments(&self) -> Vec<PromptFragment> {
        SourceKind::ORDERED
            .into_iter()
            .flat_map(|kind| {
                self.slots(kind)
                    .iter()
                    .map(move |(id, text)| PromptFragment::new(kind, id.clone(), text.clone()))
            })
            .collect()
    }

    /// The active category prompts, one per line.
    #[must_use]
    pub fn category_summary(&self) -> String {
        self.categories
            .iter()
            .map(|(_, text)| text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[must_use]
    pub fn len(&self) -> usize {
        SourceKind::ORDERED
            .into_iter()
            .map(|kind| self.slots(kind).len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        for kind in SourceKind::ORDERED {
            self.slots_mut(kind).clear();
        }
    }
}
