//! Alternating styled spans for active fragments on rich surfaces.
//!
//! [`HighlightRenderer::render`] is pure: it turns fragment texts and user text
//! into a flat list of [`RenderNode`]s. [`materialize`] and [`create_span`]
//! turn those into document nodes; the mutation guard uses [`create_span`] too
//! so restored highlighting looks exactly like the original.

use quill_dom::{DomError, Document, NodeId};
use quill_types::{HighlightStyle, Tone};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderNode {
    Span { text: String, tone: Tone },
    LineBreak,
    Text(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HighlightRenderer;

impl HighlightRenderer {
    /// Spans for each non-blank fragment, two line breaks between them, and
    /// the user's text last as a plain text node.
    ///
    /// Tones alternate by the position of the span actually emitted, so a
    /// skipped blank fragment does not break the alternation.
    #[must_use]
    pub fn render<'a>(
        fragments: impl IntoIterator<Item = &'a str>,
        user_text: &str,
    ) -> Vec<RenderNode> {
        let mut nodes = Vec::new();
        let mut spans = 0usize;
        for text in fragments {
            if text.trim().is_empty() {
                continue;
            }
            if spans > 0 {
                nodes.extend([RenderNode::LineBreak, RenderNode::LineBreak]);
            }
            nodes.push(RenderNode::Span {
                text: text.to_string(),
                tone: Tone::for_position(spans),
            });
            spans += 1;
        }

        if !user_text.is_empty() {
            if !nodes.is_empty() {
                nodes.extend([RenderNode::LineBreak, RenderNode::LineBreak]);
            }
            nodes.push(RenderNode::Text(user_text.to_string()));
        }
        nodes
    }
}

/// Build one detached highlight span holding `text`.
pub fn create_span(
    doc: &mut Document,
    text: &str,
    tone: Tone,
    style: &HighlightStyle,
) -> Result<NodeId, DomError> {
    let span = doc.create_element("span");
    doc.add_class(span, HighlightStyle::CLASS)?;
    doc.add_class(span, tone.class_name())?;
    doc.set_style(span, "color", style.color(tone))?;
    if style.bold() {
        doc.set_style(span, "font-weight", "bold")?;
    }
    let text_node = doc.create_text(text);
    doc.append_child(span, text_node)?;
    Ok(span)
}

/// Whether `node` is an element this composer produced as a highlight span.
#[must_use]
pub fn is_highlight_span(doc: &Document, node: NodeId) -> bool {
    doc.element(node)
        .is_some_and(|el| el.tag() == "span" && el.has_class(HighlightStyle::CLASS))
}

/// Append `nodes` under `parent` in order.
pub fn materialize(
    doc: &mut Document,
    parent: NodeId,
    nodes: &[RenderNode],
    style: &HighlightStyle,
) -> Result<(), DomError> {
    for node in nodes {
        let child = match node {
            RenderNode::Span { text, tone } => create_span(doc, text, *tone, style)?,
            RenderNode::LineBreak => doc.create_element("br"),
            RenderNode::Text(text) => doc.create_text(text),
        };
        doc.append_child(parent, child)?;
    }
    Ok(())
}
