//! Compact markup serialization, used for logging and snapshot tests.

use std::fmt::Write as _;

use crate::node::NodeData;
use crate::{Document, NodeId};

impl Document {
    /// Serialize `node` and its subtree as HTML-like markup.
    ///
    /// Form controls show their current value as a `value` attribute.
    #[must_use]
    pub fn markup(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_markup(node, &mut out);
        out
    }

    fn write_markup(&self, node: NodeId, out: &mut String) {
        let Some(data) = self.data(node) else {
            return;
        };
        let el = match data {
            NodeData::Text(text) => {
                out.push_str(&escape(text));
                return;
            }
            NodeData::Element(el) => el,
        };

        out.push('<');
        out.push_str(el.tag());
        if let Some(id) = el.id() {
            let _ = write!(out, " id=\"{}\"", escape(id));
        }
        if !el.classes().is_empty() {
            let _ = write!(out, " class=\"{}\"", escape(&el.classes().join(" ")));
        }
        if !el.styles().is_empty() {
            let styles = el
                .styles()
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join("; ");
            let _ = write!(out, " style=\"{}\"", escape(&styles));
        }
        if el.is_content_editable() {
            out.push_str(" contenteditable");
        }
        if el.is_form_control() {
            let _ = write!(out, " value=\"{}\"", escape(el.value()));
        }
        out.push('>');

        if el.is_line_break() {
            return;
        }
        for child in self.children(node) {
            self.write_markup(*child, out);
        }
        let _ = write!(out, "</{}>", el.tag());
    }
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\n', "\\n")
}
