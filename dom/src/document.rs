//! The node arena and every operation that reads or mutates it.

use std::mem;

use tracing::trace;

use crate::node::{Element, Node, NodeData};
use crate::observer::{MutationKind, MutationRecord, ObserveOptions, ObserverId, ObserverSlot};
use crate::{DomError, NodeId};

/// Synthetic events the composer dispatches on a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Input,
    Change,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedEvent {
    pub target: NodeId,
    pub kind: EventKind,
    pub bubbles: bool,
}

/// A host page: a `body` root plus detached nodes created but not yet inserted.
///
/// Nodes are never freed; detaching only unlinks them, so a stale [`NodeId`]
/// stays valid and [`Document::is_connected`] tells whether it still lives in
/// the page.
#[derive(Debug)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    observers: Vec<ObserverSlot>,
    events: Vec<DispatchedEvent>,
    focused: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeData::Element(Element::new("body")))],
            body: NodeId(0),
            observers: Vec::new(),
            events: Vec::new(),
            focused: None,
        }
    }

    #[must_use]
    pub const fn body(&self) -> NodeId {
        self.body
    }

    // ========================================================================
    // Construction
    // ========================================================================

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(NodeData::Element(Element::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeData::Text(text.to_string()))
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node::new(data));
        id
    }

    // ========================================================================
    // Reads
    // ========================================================================

    fn node(&self, id: NodeId) -> Result<&Node, DomError> {
        self.nodes.get(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, DomError> {
        self.nodes.get_mut(id.0).ok_or(DomError::UnknownNode(id))
    }

    fn element_mut(&mut self, id: NodeId) -> Result<&mut Element, DomError> {
        match &mut self.node_mut(id)?.data {
            NodeData::Element(el) => Ok(el),
            NodeData::Text(_) => Err(DomError::NotAnElement(id)),
        }
    }

    #[must_use]
    pub fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.0).map(|n| &n.data)
    }

    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.data(id)? {
            NodeData::Element(el) => Some(el),
            NodeData::Text(_) => None,
        }
    }

    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.data(id)? {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(id.0).map_or(&[], |n| n.children.as_slice())
    }

    /// Whether `node` is `ancestor` or lies below it.
    #[must_use]
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        self.contains(self.body, node)
    }

    /// All nodes below `root` in document order, excluding `root`.
    #[must_use]
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    #[must_use]
    pub fn text_nodes(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.text(*id).is_some())
            .collect()
    }

    #[must_use]
    pub fn elements_with_class(&self, root: NodeId, class: &str) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(|el| el.has_class(class)))
            .collect()
    }

    /// First element at or below `root` (document order) matching `predicate`.
    pub fn find_element(
        &self,
        root: NodeId,
        predicate: impl Fn(&Element) -> bool,
    ) -> Option<NodeId> {
        std::iter::once(root)
            .chain(self.descendants(root))
            .find(|id| self.element(*id).is_some_and(&predicate))
    }

    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_element(self.body, |el| el.id() == Some(id))
    }

    /// Concatenated text of every text node below `node`.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        if let Some(text) = self.text(node) {
            return text.to_string();
        }
        self.text_nodes(node)
            .into_iter()
            .filter_map(|id| self.text(id))
            .collect()
    }

    /// Text as a reader sees it: line-break elements and block boundaries
    /// become `\n`.
    #[must_use]
    pub fn rendered_text(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.render_into(node, &mut out, true);
        out
    }

    fn render_into(&self, id: NodeId, out: &mut String, is_root: bool) {
        match self.data(id) {
            Some(NodeData::Text(text)) => out.push_str(text),
            Some(NodeData::Element(el)) if el.is_line_break() => out.push('\n'),
            Some(NodeData::Element(el)) => {
                if !is_root && el.is_block() && !out.is_empty() && !out.ends_with('\n') {
                    out.push('\n');
                }
                for child in self.children(id) {
                    self.render_into(*child, out, false);
                }
            }
            None => {}
        }
    }

    // ========================================================================
    // Tree mutation
    // ========================================================================

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.insert_at(parent, child, None)
    }

    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotAChild {
                parent,
                child: reference,
            });
        }
        self.insert_at(parent, child, Some(reference))
    }

    /// Insert `child` under `parent`, before `reference` or at the end.
    /// A child that already has a parent is moved.
    fn insert_at(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), DomError> {
        if self.element(parent).is_none() {
            self.node(parent)?;
            return Err(DomError::NotAnElement(parent));
        }
        self.node(child)?;
        if self.contains(child, parent) {
            return Err(DomError::Cycle { parent, child });
        }

        if self.parent(child).is_some() {
            self.detach(child)?;
        }

        let node = self.node_mut(parent)?;
        let index = reference
            .and_then(|r| node.children.iter().position(|c| *c == r))
            .unwrap_or(node.children.len());
        node.children.insert(index, child);
        self.node_mut(child)?.parent = Some(parent);

        self.record(MutationRecord {
            target: parent,
            kind: MutationKind::ChildList {
                added: vec![child],
                removed: Vec::new(),
            },
        });
        Ok(())
    }

    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let node = self.node_mut(parent)?;
        let Some(index) = node.children.iter().position(|c| *c == child) else {
            return Err(DomError::NotAChild { parent, child });
        };
        node.children.remove(index);
        self.node_mut(child)?.parent = None;
        if self.focused.is_some_and(|f| self.contains(child, f)) {
            self.focused = None;
        }

        self.record(MutationRecord {
            target: parent,
            kind: MutationKind::ChildList {
                added: Vec::new(),
                removed: vec![child],
            },
        });
        Ok(())
    }

    /// Unlink `node` from its parent. A node without a parent is left alone.
    pub fn detach(&mut self, node: NodeId) -> Result<(), DomError> {
        match self.node(node)?.parent {
            Some(parent) => self.remove_child(parent, node),
            None => Ok(()),
        }
    }

    /// Remove every child of `node` in a single child-list mutation.
    pub fn clear_children(&mut self, node: NodeId) -> Result<(), DomError> {
        let removed = mem::take(&mut self.node_mut(node)?.children);
        if removed.is_empty() {
            return Ok(());
        }
        for child in &removed {
            self.node_mut(*child)?.parent = None;
        }
        self.record(MutationRecord {
            target: node,
            kind: MutationKind::ChildList {
                added: Vec::new(),
                removed,
            },
        });
        Ok(())
    }

    /// Replace `node` with its own children (unwrap an inline wrapper).
    pub fn replace_with_children(&mut self, node: NodeId) -> Result<Vec<NodeId>, DomError> {
        let parent = self.node(node)?.parent.ok_or(DomError::NoParent(node))?;
        let moved = mem::take(&mut self.node_mut(node)?.children);
        for child in &moved {
            self.node_mut(*child)?.parent = Some(parent);
        }

        let siblings = &mut self.node_mut(parent)?.children;
        let index = siblings
            .iter()
            .position(|c| *c == node)
            .ok_or(DomError::NotAChild {
                parent,
                child: node,
            })?;
        siblings.splice(index..=index, moved.iter().copied());
        self.node_mut(node)?.parent = None;

        self.record(MutationRecord {
            target: parent,
            kind: MutationKind::ChildList {
                added: moved.clone(),
                removed: vec![node],
            },
        });
        Ok(moved)
    }

    /// Move `node` into `wrapper`, placing `wrapper` where `node` was.
    pub fn wrap(&mut self, node: NodeId, wrapper: NodeId) -> Result<(), DomError> {
        let parent = self.node(node)?.parent.ok_or(DomError::NoParent(node))?;
        self.insert_before(parent, wrapper, node)?;
        self.append_child(wrapper, node)
    }

    /// Split a text node at byte `offset`. The node keeps the head; the tail
    /// becomes a new text node inserted right after it.
    pub fn split_text(&mut self, node: NodeId, offset: usize) -> Result<NodeId, DomError> {
        let text = self.text(node).ok_or(DomError::NotText(node))?;
        if offset > text.len() || !text.is_char_boundary(offset) {
            return Err(DomError::InvalidOffset { node, offset });
        }
        let (head, tail) = text.split_at(offset);
        let (head, tail) = (head.to_string(), tail.to_string());

        self.set_text(node, &head)?;
        let tail_node = self.create_text(&tail);
        if let Some(parent) = self.parent(node) {
            let next = self
                .children(parent)
                .iter()
                .position(|c| *c == node)
                .and_then(|i| self.children(parent).get(i + 1).copied());
            self.insert_at(parent, tail_node, next)?;
        }
        Ok(tail_node)
    }

    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        match &mut self.node_mut(node)?.data {
            NodeData::Text(existing) => *existing = text.to_string(),
            NodeData::Element(_) => return Err(DomError::NotText(node)),
        }
        self.record(MutationRecord {
            target: node,
            kind: MutationKind::CharacterData,
        });
        Ok(())
    }

    // ========================================================================
    // Element state (attribute changes are not observed)
    // ========================================================================

    pub fn set_id(&mut self, node: NodeId, id: &str) -> Result<(), DomError> {
        self.element_mut(node)?.set_id(id);
        Ok(())
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) -> Result<(), DomError> {
        self.element_mut(node)?.add_class(class);
        Ok(())
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) -> Result<bool, DomError> {
        Ok(self.element_mut(node)?.remove_class(class))
    }

    pub fn set_style(&mut self, node: NodeId, property: &str, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?.set_style(property, value);
        Ok(())
    }

    pub fn set_content_editable(&mut self, node: NodeId, editable: bool) -> Result<(), DomError> {
        self.element_mut(node)?.set_content_editable(editable);
        Ok(())
    }

    /// Assign a form control's value. Like a browser, this queues no mutation record.
    pub fn set_value(&mut self, node: NodeId, value: &str) -> Result<(), DomError> {
        self.element_mut(node)?.set_value(value);
        Ok(())
    }

    // ========================================================================
    // Events and focus
    // ========================================================================

    pub fn dispatch_event(
        &mut self,
        target: NodeId,
        kind: EventKind,
        bubbles: bool,
    ) -> Result<(), DomError> {
        self.node(target)?;
        trace!(%target, ?kind, "dispatch event");
        self.events.push(DispatchedEvent {
            target,
            kind,
            bubbles,
        });
        Ok(())
    }

    #[must_use]
    pub fn events(&self) -> &[DispatchedEvent] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<DispatchedEvent> {
        mem::take(&mut self.events)
    }

    pub fn focus(&mut self, node: NodeId) -> Result<(), DomError> {
        self.node(node)?;
        if self.is_connected(node) {
            self.focused = Some(node);
        }
        Ok(())
    }

    #[must_use]
    pub const fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    // ========================================================================
    // Observers
    // ========================================================================

    pub fn observe(&mut self, target: NodeId, options: ObserveOptions) -> ObserverId {
        let id = ObserverId(self.observers.len());
        self.observers.push(ObserverSlot {
            target,
            options,
            records: Vec::new(),
            connected: true,
        });
        id
    }

    /// Drain the records queued for `observer` since the last call.
    pub fn take_records(&mut self, observer: ObserverId) -> Vec<MutationRecord> {
        self.observers
            .get_mut(observer.0)
            .map(|slot| mem::take(&mut slot.records))
            .unwrap_or_default()
    }

    /// Stop delivering records to `observer` and drop anything still queued.
    pub fn disconnect(&mut self, observer: ObserverId) {
        if let Some(slot) = self.observers.get_mut(observer.0) {
            slot.connected = false;
            slot.records.clear();
        }
    }

    #[must_use]
    pub fn is_observing(&self, observer: ObserverId) -> bool {
        self.observers.get(observer.0).is_some_and(|s| s.connected)
    }

    fn record(&mut self, record: MutationRecord) {
        let interested: Vec<usize> = self
            .observers
            .iter()
            .enumerate()
            .filter(|(_, slot)| {
                slot.connected
                    && slot.wants(&record)
                    && (slot.target == record.target
                        || (slot.options.subtree && self.contains(slot.target, record.target)))
            })
            .map(|(index, _)| index)
            .collect();
        for index in interested {
            self.observers[index].records.push(record.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Document, EventKind};
    use crate::{DomError, MutationKind, ObserveOptions};

    fn editable(doc: &mut Document) -> crate::NodeId {
        let div = doc.create_element("div");
        doc.set_content_editable(div, true).unwrap();
        doc.append_child(doc.body(), div).unwrap();
        div
    }

    #[test]
    fn append_and_read_text() {
        let mut doc = Document::new();
        let div = editable(&mut doc);
        let a = doc.create_text("hello");
        let br = doc.create_element("br");
        let b = doc.create_text("world");
        for n in [a, br, b] {
            doc.append_child(div, n).unwrap();
        }
        assert_eq!(doc.text_content(div), "helloworld");
        assert_eq!(doc.rendered_text(div), "hello\nworld");
    }

    #[test]
    fn rendered_text_breaks_between_blocks() {
        let mut doc = Document::new();
        let div = editable(&mut doc);
        for line in ["one", "two"] {
            let p = doc.create_element("p");
            let t = doc.create_text(line);
            doc.append_child(p, t).unwrap();
            doc.append_child(div, p).unwrap();
        }
        assert_eq!(doc.rendered_text(div), "one\ntwo");
    }

    #[test]
    fn cycle_is_rejected() {
        let mut doc = Document::new();
        let outer = editable(&mut doc);
        let inner = doc.create_element("span");
        doc.append_child(outer, inner).unwrap();
        assert_eq!(
            doc.append_child(inner, outer),
            Err(DomError::Cycle {
                parent: inner,
                child: outer
            })
        );
    }

    #[test]
    fn detached_nodes_are_not_connected() {
        let mut doc = Document::new();
        let div = editable(&mut doc);
        assert!(doc.is_connected(div));
        doc.detach(div).unwrap();
        assert!(!doc.is_connected(div));
        assert!(doc.parent(div).is_none());
    }

    #[test]
    fn observer_sees_only_mutations_after_observe() {
        let mut doc = Document::new();
        let div = editable(&mut doc);
        let early = doc.create_text("early");
        doc.append_child(div, early).unwrap();

        let obs = doc.observe(div, ObserveOptions::everything());
        let late = doc.create_text("late");
        doc.append_child(div, late).unwrap();

        let records = doc.take_records(obs);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].added_nodes(), [late]);
        assert!(doc.take_records(obs).is_empty());
    }

    #[test]
    fn subtree_flag_controls_nested_records() {
        let mut doc = Document::new();
        let div = editable(&mut doc);
        let span = doc.create_element("span");
        doc.append_child(div, span).unwrap();

        let shallow = doc.observe(
            div,
            ObserveOptions {
                child_list: true,
                subtree: false,
                character_data: false,
            },
        );
        let deep = doc.observe(div, ObserveOptions::child_list_subtree());
        let text = doc.create_text("x");
        doc.append_child(span, text).unwrap();

        assert!(doc.take_records(shallow).is_empty());
        assert_eq!(doc.take_records(deep).len(), 1);
    }

    #[test]
    fn disconnected_observer_gets_nothing() {
        let mut doc = Document::new();
        let div = editable(&mut doc);
        let obs = doc.observe(div, ObserveOptions::everything());
        doc.disconnect(obs);
        let text = doc.create_text("x");
        doc.append_child(div, text).unwrap();
        assert!(!doc.is_observing(obs));
        assert!(doc.take_records(obs).is_empty());
    }

    #[test]
    fn split_text_inserts_tail_after_head() {
        let mut doc = Document::new();
        let div = editable(&mut doc);
        let text = doc.create_text("Be concise. thanks");
        doc.append_child(div, text).unwrap();

        let tail = doc.split_text(text, 11).unwrap();
        assert_eq!(doc.text(text), Some("Be concise."));
        assert_eq!(doc.text(tail), Some(" thanks"));
        assert_eq!(doc.children(div), [text, tail]);
    }

    #[test]
    fn split_text_rejects_non_boundary() {
        let mut doc = Document::new();
        let text = doc.create_text("ä");
        assert!(matches!(
            doc.split_text(text, 1),
            Err(DomError::InvalidOffset { .. })
        ));
    }

    #[test]
    fn wrap_then_unwrap_restores_children() {
        let mut doc = Document::new();
        let div = editable(&mut doc);
        let text = doc.create_text("fragment");
        doc.append_child(div, text).unwrap();

        let span = doc.create_element("span");
        doc.wrap(text, span).unwrap();
        assert_eq!(doc.children(div), [span]);
        assert_eq!(doc.parent(text), Some(span));

        let obs = doc.observe(div, ObserveOptions::everything());
        let moved = doc.replace_with_children(span).unwrap();
        assert_eq!(moved, [text]);
        assert_eq!(doc.children(div), [text]);

        let records = doc.take_records(obs);
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].kind,
            MutationKind::ChildList {
                added: vec![text],
                removed: vec![span],
            }
        );
    }

    #[test]
    fn clear_children_is_one_record() {
        let mut doc = Document::new();
        let div = editable(&mut doc);
        for t in ["a", "b", "c"] {
            let n = doc.create_text(t);
            doc.append_child(div, n).unwrap();
        }
        let obs = doc.observe(div, ObserveOptions::everything());
        doc.clear_children(div).unwrap();
        let records = doc.take_records(obs);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].removed_nodes().len(), 3);
        assert!(doc.children(div).is_empty());
    }

    #[test]
    fn set_value_queues_no_record() {
        let mut doc = Document::new();
        let area = doc.create_element("textarea");
        doc.append_child(doc.body(), area).unwrap();
        let obs = doc.observe(doc.body(), ObserveOptions::everything());
        doc.set_value(area, "typed").unwrap();
        assert_eq!(doc.element(area).map(|e| e.value()), Some("typed"));
        assert!(doc.take_records(obs).is_empty());
    }

    #[test]
    fn events_and_focus_are_recorded() {
        let mut doc = Document::new();
        let div = editable(&mut doc);
        doc.dispatch_event(div, EventKind::Input, true).unwrap();
        doc.focus(div).unwrap();
        assert_eq!(doc.events().len(), 1);
        assert_eq!(doc.focused(), Some(div));

        doc.detach(div).unwrap();
        assert_eq!(doc.focused(), None);
    }
}
