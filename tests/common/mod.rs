//! Shared test utilities and fixtures
//!
//! Page builders and session helpers for the integration suites.

#![allow(dead_code)]

use std::time::Instant;

use quill_core::PromptSession;
use quill_dom::{Document, NodeId};
use quill_types::{HighlightStyle, Settings};

/// Append a `<textarea>` to the body.
pub fn textarea(doc: &mut Document) -> NodeId {
    let area = doc.create_element("textarea");
    doc.append_child(doc.body(), area).unwrap();
    area
}

/// Append a contenteditable region owned by a host editing framework.
pub fn host_editor(doc: &mut Document) -> NodeId {
    let div = doc.create_element("div");
    doc.set_content_editable(div, true).unwrap();
    doc.add_class(div, "ProseMirror").unwrap();
    doc.append_child(doc.body(), div).unwrap();
    div
}

/// Append a plain contenteditable region.
pub fn editable(doc: &mut Document) -> NodeId {
    let div = doc.create_element("div");
    doc.set_content_editable(div, true).unwrap();
    doc.append_child(doc.body(), div).unwrap();
    div
}

/// A session attached to `node` with initialization already finished.
pub fn ready_session(doc: &mut Document, node: NodeId) -> PromptSession {
    ready_session_with(doc, node, Settings::default())
}

pub fn ready_session_with(doc: &mut Document, node: NodeId, settings: Settings) -> PromptSession {
    let mut session = PromptSession::new(settings);
    session
        .attach(doc, node, Instant::now())
        .expect("fixture node should be editable");
    session.finish_initializing();
    session
}

/// Current form value of a textarea or input.
pub fn value(doc: &Document, node: NodeId) -> String {
    doc.element(node).unwrap().value().to_string()
}

/// Text of every highlight span under `root`, in document order.
pub fn span_texts(doc: &Document, root: NodeId) -> Vec<String> {
    doc.elements_with_class(root, HighlightStyle::CLASS)
        .into_iter()
        .map(|span| doc.text_content(span))
        .collect()
}

/// Unwrap every highlight span under `root`, the way a host editor
/// normalizing its document would.
pub fn strip_spans(doc: &mut Document, root: NodeId) -> usize {
    let spans = doc.elements_with_class(root, HighlightStyle::CLASS);
    let count = spans.len();
    for span in spans {
        doc.replace_with_children(span).unwrap();
    }
    count
}
