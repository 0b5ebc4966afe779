//! Host page model for Quill.
//!
//! A small arena-backed node tree that mirrors the parts of a browser document
//! the composer touches: elements with classes, inline styles and form values,
//! text nodes, focus, dispatched events, and mutation observers that queue
//! records only while connected.
//!
//! Nothing here knows about prompts. The composer in `quill-core` talks to a
//! [`Document`] through its surface adapters and mutation guard.

mod document;
mod markup;
mod node;
mod observer;

pub use document::{DispatchedEvent, Document, EventKind};
pub use node::{Element, NodeData};
pub use observer::{MutationKind, MutationRecord, ObserveOptions, ObserverId};

use std::fmt;

use thiserror::Error;

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),
    #[error("node {0} is not an element")]
    NotAnElement(NodeId),
    #[error("node {0} is not a text node")]
    NotText(NodeId),
    #[error("node {0} has no parent")]
    NoParent(NodeId),
    #[error("node {child} is not a child of {parent}")]
    NotAChild { parent: NodeId, child: NodeId },
    #[error("inserting {child} under {parent} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("offset {offset} is not a valid split point in node {node}")]
    InvalidOffset { node: NodeId, offset: usize },
}
