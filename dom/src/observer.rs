//! Mutation observers.
//!
//! An observer watches one target node. Records are queued only while the
//! observer is connected, so a freshly created observer never sees mutations
//! that happened before it was installed.

use crate::NodeId;

/// Handle returned by [`Document::observe`](crate::Document::observe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) usize);

/// Which mutations an observer wants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub subtree: bool,
    pub character_data: bool,
}

impl ObserveOptions {
    /// Child, subtree, and text mutations.
    #[must_use]
    pub const fn everything() -> Self {
        Self {
            child_list: true,
            subtree: true,
            character_data: true,
        }
    }

    /// Child-list mutations anywhere below the target.
    #[must_use]
    pub const fn child_list_subtree() -> Self {
        Self {
            child_list: true,
            subtree: true,
            character_data: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationKind {
    ChildList {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    CharacterData,
}

/// One observed change. `target` is the parent for child-list changes and
/// the text node for character-data changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub kind: MutationKind,
}

impl MutationRecord {
    #[must_use]
    pub fn is_child_list(&self) -> bool {
        matches!(self.kind, MutationKind::ChildList { .. })
    }

    #[must_use]
    pub fn added_nodes(&self) -> &[NodeId] {
        match &self.kind {
            MutationKind::ChildList { added, .. } => added,
            MutationKind::CharacterData => &[],
        }
    }

    #[must_use]
    pub fn removed_nodes(&self) -> &[NodeId] {
        match &self.kind {
            MutationKind::ChildList { removed, .. } => removed,
            MutationKind::CharacterData => &[],
        }
    }
}

#[derive(Debug)]
pub(crate) struct ObserverSlot {
    pub(crate) target: NodeId,
    pub(crate) options: ObserveOptions,
    pub(crate) records: Vec<MutationRecord>,
    pub(crate) connected: bool,
}

impl ObserverSlot {
    pub(crate) fn wants(&self, record: &MutationRecord) -> bool {
        match record.kind {
            MutationKind::ChildList { .. } => self.options.child_list,
            MutationKind::CharacterData => self.options.character_data,
        }
    }
}
