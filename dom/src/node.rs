use crate::NodeId;

/// Element payload: tag, identity, presentation, and editing state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    styles: Vec<(String, String)>,
    content_editable: bool,
    value: String,
}

impl Element {
    pub(crate) fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            id: None,
            classes: Vec::new(),
            styles: Vec::new(),
            content_editable: false,
            value: String::new(),
        }
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    #[must_use]
    pub fn style(&self, property: &str) -> Option<&str> {
        self.styles
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    #[must_use]
    pub fn styles(&self) -> &[(String, String)] {
        &self.styles
    }

    #[must_use]
    pub const fn is_content_editable(&self) -> bool {
        self.content_editable
    }

    /// Current value of a form control; empty for other elements.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub fn is_form_control(&self) -> bool {
        matches!(self.tag.as_str(), "textarea" | "input")
    }

    #[must_use]
    pub fn is_line_break(&self) -> bool {
        self.tag == "br"
    }

    #[must_use]
    pub fn is_block(&self) -> bool {
        matches!(self.tag.as_str(), "p" | "div")
    }

    pub(crate) fn set_id(&mut self, id: &str) {
        self.id = Some(id.to_string());
    }

    pub(crate) fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub(crate) fn remove_class(&mut self, class: &str) -> bool {
        let before = self.classes.len();
        self.classes.retain(|c| c != class);
        self.classes.len() != before
    }

    pub(crate) fn set_style(&mut self, property: &str, value: &str) {
        match self.styles.iter_mut().find(|(name, _)| name == property) {
            Some((_, existing)) => *existing = value.to_string(),
            None => self.styles.push((property.to_string(), value.to_string())),
        }
    }

    pub(crate) fn set_content_editable(&mut self, editable: bool) {
        self.content_editable = editable;
    }

    pub(crate) fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
    }
}

/// What a node holds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
        }
    }
}
