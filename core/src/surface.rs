//! Surface adapters: the one host-page element the composer writes into.
//!
//! The reconciler only ever sees `&mut dyn Surface`. Rich regions additionally
//! expose a [`HighlightSink`] through [`Surface::highlighter`]; plain fields
//! return `None` there and always receive plain text.

use thiserror::Error;
use tracing::debug;

use quill_dom::{DomError, Document, EventKind, NodeId};
use quill_types::HighlightStyle;

use crate::highlight::{RenderNode, materialize};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// The host page removed the surface from the document.
    #[error("surface {0} is no longer attached to the page")]
    Detached(NodeId),
    #[error(transparent)]
    Dom(#[from] DomError),
}

/// The three element kinds a surface can be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    PlainInput,
    TextArea,
    /// A `contenteditable` region. `host_managed` marks regions owned by a
    /// host editing framework that may rewrite their children on its own.
    Rich { host_managed: bool },
}

impl SurfaceKind {
    #[must_use]
    pub const fn is_rich(self) -> bool {
        matches!(self, SurfaceKind::Rich { .. })
    }

    #[must_use]
    pub const fn is_host_managed(self) -> bool {
        matches!(self, SurfaceKind::Rich { host_managed: true })
    }
}

/// Reference to the surface element, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceDescriptor {
    node: NodeId,
    kind: SurfaceKind,
}

impl SurfaceDescriptor {
    #[must_use]
    pub const fn new(node: NodeId, kind: SurfaceKind) -> Self {
        Self { node, kind }
    }

    /// Classify `node` as a surface. `None` for elements that cannot be one.
    #[must_use]
    pub fn detect(doc: &Document, node: NodeId, host_editor_classes: &[String]) -> Option<Self> {
        let el = doc.element(node)?;
        let kind = match el.tag() {
            "textarea" => SurfaceKind::TextArea,
            "input" => SurfaceKind::PlainInput,
            _ if el.is_content_editable() => SurfaceKind::Rich {
                host_managed: host_editor_classes.iter().any(|c| el.has_class(c)),
            },
            _ => return None,
        };
        Some(Self { node, kind })
    }

    #[must_use]
    pub const fn node(&self) -> NodeId {
        self.node
    }

    #[must_use]
    pub const fn kind(&self) -> SurfaceKind {
        self.kind
    }

    /// Borrow the document through the adapter matching this surface's kind.
    pub fn bind<'d>(&self, doc: &'d mut Document) -> Box<dyn Surface + 'd> {
        match self.kind {
            SurfaceKind::PlainInput | SurfaceKind::TextArea => Box::new(PlainField {
                doc,
                node: self.node,
                kind: self.kind,
            }),
            SurfaceKind::Rich { .. } => Box::new(RichRegion {
                doc,
                node: self.node,
                kind: self.kind,
            }),
        }
    }
}

/// Get, set and announce the content of one editable element.
pub trait Surface {
    fn node(&self) -> NodeId;

    fn kind(&self) -> SurfaceKind;

    /// Current content as text.
    fn content(&self) -> Result<String, SurfaceError>;

    /// Replace the whole content with `text`.
    fn set_content(&mut self, text: &str) -> Result<(), SurfaceError>;

    /// Fire bubbling input and change events, then give focus back to the surface.
    fn notify_change(&mut self) -> Result<(), SurfaceError>;

    /// Styled-span writer, for surfaces that can show highlighting.
    fn highlighter(&mut self) -> Option<&mut dyn HighlightSink> {
        None
    }
}

/// Writes pre-rendered highlight nodes into a surface.
pub trait HighlightSink {
    fn write_highlighted(
        &mut self,
        nodes: &[RenderNode],
        style: &HighlightStyle,
    ) -> Result<(), SurfaceError>;
}

fn ensure_connected(doc: &Document, node: NodeId) -> Result<(), SurfaceError> {
    if doc.is_connected(node) {
        Ok(())
    } else {
        Err(SurfaceError::Detached(node))
    }
}

fn announce(doc: &mut Document, node: NodeId) -> Result<(), SurfaceError> {
    ensure_connected(doc, node)?;
    doc.dispatch_event(node, EventKind::Input, true)?;
    doc.dispatch_event(node, EventKind::Change, true)?;
    doc.focus(node)?;
    Ok(())
}

// ============================================================================
// Plain fields
// ============================================================================

/// `textarea` or `input`: content is the form value.
pub struct PlainField<'d> {
    doc: &'d mut Document,
    node: NodeId,
    kind: SurfaceKind,
}

impl Surface for PlainField<'_> {
    fn node(&self) -> NodeId {
        self.node
    }

    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn content(&self) -> Result<String, SurfaceError> {
        ensure_connected(self.doc, self.node)?;
        let el = self
            .doc
            .element(self.node)
            .ok_or(DomError::NotAnElement(self.node))?;
        Ok(el.value().to_string())
    }

    fn set_content(&mut self, text: &str) -> Result<(), SurfaceError> {
        ensure_connected(self.doc, self.node)?;
        self.doc.set_value(self.node, text)?;
        Ok(())
    }

    fn notify_change(&mut self) -> Result<(), SurfaceError> {
        announce(self.doc, self.node)
    }
}

// ============================================================================
// Rich regions
// ============================================================================

/// `contenteditable` region: content is its rendered text, with line-break
/// elements read back as `\n`.
pub struct RichRegion<'d> {
    doc: &'d mut Document,
    node: NodeId,
    kind: SurfaceKind,
}

impl Surface for RichRegion<'_> {
    fn node(&self) -> NodeId {
        self.node
    }

    fn kind(&self) -> SurfaceKind {
        self.kind
    }

    fn content(&self) -> Result<String, SurfaceError> {
        ensure_connected(self.doc, self.node)?;
        Ok(self.doc.rendered_text(self.node))
    }

    /// Text nodes separated by `br` elements. Raw markup is never parsed.
    fn set_content(&mut self, text: &str) -> Result<(), SurfaceError> {
        ensure_connected(self.doc, self.node)?;
        self.doc.clear_children(self.node)?;
        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                let br = self.doc.create_element("br");
                self.doc.append_child(self.node, br)?;
            }
            if !line.is_empty() {
                let text_node = self.doc.create_text(line);
                self.doc.append_child(self.node, text_node)?;
            }
        }
        Ok(())
    }

    fn notify_change(&mut self) -> Result<(), SurfaceError> {
        announce(self.doc, self.node)
    }

    fn highlighter(&mut self) -> Option<&mut dyn HighlightSink> {
        Some(self)
    }
}

impl HighlightSink for RichRegion<'_> {
    fn write_highlighted(
        &mut self,
        nodes: &[RenderNode],
        style: &HighlightStyle,
    ) -> Result<(), SurfaceError> {
        ensure_connected(self.doc, self.node)?;
        self.doc.clear_children(self.node)?;
        materialize(self.doc, self.node, nodes, style)?;
        debug!(surface = %self.node, nodes = nodes.len(), "wrote highlighted content");
        Ok(())
    }
}
