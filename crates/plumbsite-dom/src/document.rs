use std::collections::HashMap;
use std::fmt;

use crate::error::DomError;
use crate::events::{EventKind, Listener};
use crate::layout::Rect;
use crate::selector::{Compound, Selector};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub(crate) enum NodeKind {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) kind: NodeKind,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    /// Attributes in insertion order, excluding `style`.
    pub(crate) attrs: Vec<(String, String)>,
    /// Inline style declarations in insertion order.
    pub(crate) style: Vec<(String, String)>,
}

impl Element {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn has_class(&self, class_name: &str) -> bool {
        self.attr("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }
}

/// Arena-backed document tree.
///
/// Nodes are never freed; removing a node only detaches it, so a stale
/// [`NodeId`] stays valid and [`Document::is_connected`] reports whether it
/// is still part of the page.
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    layout: HashMap<NodeId, Rect>,
    listeners: HashMap<NodeId, Vec<(EventKind, Listener)>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("laid_out", &self.layout.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates a document containing `<html><head></head><body></body></html>`.
    #[must_use]
    pub fn new() -> Self {
        let mut doc = Self::empty();
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.append_child(doc.root, html);
        doc.append_child(html, head);
        doc.append_child(html, body);
        doc
    }

    /// Creates a document with only the document node.
    pub(crate) fn empty() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            root: NodeId(0),
            layout: HashMap::new(),
            listeners: HashMap::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes.get(id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    // ---------------------------------------------------------------------
    // Tree structure
    // ---------------------------------------------------------------------

    /// Creates a detached element.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push_node(NodeKind::Element(Element {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: Vec::new(),
            style: Vec::new(),
        }))
    }

    /// Creates a detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_owned()))
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            kind,
        });
        id
    }

    /// Appends `child` to `parent`, detaching it from any previous parent.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.is_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Creates a text node and appends it to `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let id = self.create_text(text);
        self.append_child(parent, id);
        id
    }

    /// Detaches `node` from its parent. The node and its subtree stay valid.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    /// Detaches every child of `node`.
    pub fn remove_children(&mut self, node: NodeId) {
        let children = std::mem::take(&mut self.nodes[node.0].children);
        for child in children {
            self.nodes[child.0].parent = None;
        }
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    #[must_use]
    pub fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
            .collect()
    }

    fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.parent(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// `true` when `node` is reachable from the document root.
    #[must_use]
    pub fn is_connected(&self, node: NodeId) -> bool {
        node == self.root || self.is_ancestor(self.root, node)
    }

    #[must_use]
    pub fn is_element(&self, node: NodeId) -> bool {
        self.element(node).is_some()
    }

    #[must_use]
    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|e| e.tag_name.as_str())
    }

    /// The `<html>` element.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.element_children(self.root).into_iter().next()
    }

    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.child_by_tag(self.document_element()?, "head")
    }

    #[must_use]
    pub fn body(&self) -> Option<NodeId> {
        self.child_by_tag(self.document_element()?, "body")
    }

    fn child_by_tag(&self, parent: NodeId, tag: &str) -> Option<NodeId> {
        self.element_children(parent)
            .into_iter()
            .find(|child| self.tag_name(*child) == Some(tag))
    }

    // ---------------------------------------------------------------------
    // Text
    // ---------------------------------------------------------------------

    /// Concatenated text of `node` and its descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => out.push_str(text),
            _ => {
                for child in &self.nodes[node.0].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Replaces the children of `node` with a single text node.
    ///
    /// An empty `text` leaves `node` with no children, like the browser's
    /// `textContent` setter.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        if let NodeKind::Text(existing) = &mut self.nodes[node.0].kind {
            text.clone_into(existing);
            return;
        }
        self.remove_children(node);
        if !text.is_empty() {
            self.append_text(node, text);
        }
    }

    /// Text of a text node, `None` for other node kinds.
    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.0].kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Overwrites the text of a text node; other node kinds are left alone.
    pub fn set_text(&mut self, node: NodeId, text: String) {
        if let NodeKind::Text(existing) = &mut self.nodes[node.0].kind {
            *existing = text;
        }
    }

    /// Every text node under `node`, in document order.
    #[must_use]
    pub fn text_nodes(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(node, &mut |id, kind| {
            if matches!(kind, NodeKind::Text(_)) {
                out.push(id);
            }
        });
        out
    }

    fn walk(&self, node: NodeId, visit: &mut impl FnMut(NodeId, &NodeKind)) {
        visit(node, &self.nodes[node.0].kind);
        for child in &self.nodes[node.0].children {
            self.walk(*child, visit);
        }
    }

    // ---------------------------------------------------------------------
    // Attributes, classes, dataset
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        if name.eq_ignore_ascii_case("style") {
            return None;
        }
        self.element(node)?.attr(&name.to_ascii_lowercase())
    }

    #[must_use]
    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// Attribute names and values of an element, in insertion order.
    #[must_use]
    pub fn attrs(&self, node: NodeId) -> &[(String, String)] {
        self.element(node)
            .map(|e| e.attrs.as_slice())
            .unwrap_or_default()
    }

    /// Sets an attribute. `style` is routed to the inline style declarations.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        if name == "style" {
            let declarations = parse_style(value);
            if let Some(element) = self.element_mut(node) {
                element.style = declarations;
            }
            return;
        }
        let Some(element) = self.element_mut(node) else {
            return;
        };
        match element.attrs.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => value.clone_into(existing),
            None => element.attrs.push((name, value.to_owned())),
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        let name = name.to_ascii_lowercase();
        if let Some(element) = self.element_mut(node) {
            element.attrs.retain(|(key, _)| *key != name);
        }
    }

    #[must_use]
    pub fn id(&self, node: NodeId) -> Option<&str> {
        self.attr(node, "id")
    }

    #[must_use]
    pub fn has_class(&self, node: NodeId, class_name: &str) -> bool {
        self.element(node).is_some_and(|e| e.has_class(class_name))
    }

    pub fn add_class(&mut self, node: NodeId, class_name: &str) {
        let mut classes = self.class_list(node);
        if !classes.iter().any(|c| c == class_name) {
            classes.push(class_name.to_owned());
            self.set_attr(node, "class", &classes.join(" "));
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class_name: &str) {
        let mut classes = self.class_list(node);
        let before = classes.len();
        classes.retain(|c| c != class_name);
        if classes.len() != before {
            self.set_attr(node, "class", &classes.join(" "));
        }
    }

    /// Toggles `class_name`; returns whether the class is now present.
    pub fn toggle_class(&mut self, node: NodeId, class_name: &str) -> bool {
        if self.has_class(node, class_name) {
            self.remove_class(node, class_name);
            false
        } else {
            self.add_class(node, class_name);
            true
        }
    }

    fn class_list(&self, node: NodeId) -> Vec<String> {
        self.attr(node, "class")
            .map(|c| c.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    /// Reads `data-*` through its camelCase dataset key (`heroCta` → `data-hero-cta`).
    #[must_use]
    pub fn dataset(&self, node: NodeId, key: &str) -> Option<&str> {
        self.attr(node, &dataset_attr_name(key))
    }

    pub fn set_dataset(&mut self, node: NodeId, key: &str, value: &str) {
        self.set_attr(node, &dataset_attr_name(key), value);
    }

    // ---------------------------------------------------------------------
    // Inline style
    // ---------------------------------------------------------------------

    #[must_use]
    pub fn style_property(&self, node: NodeId, property: &str) -> Option<&str> {
        self.element(node)?
            .style
            .iter()
            .find(|(name, _)| name == property)
            .map(|(_, value)| value.as_str())
    }

    /// Sets one inline declaration (including custom properties like `--accent-color`).
    pub fn set_style_property(&mut self, node: NodeId, property: &str, value: &str) {
        let Some(element) = self.element_mut(node) else {
            return;
        };
        match element.style.iter_mut().find(|(name, _)| name == property) {
            Some((_, existing)) => value.clone_into(existing),
            None => element.style.push((property.to_owned(), value.to_owned())),
        }
    }

    pub fn remove_style_property(&mut self, node: NodeId, property: &str) {
        if let Some(element) = self.element_mut(node) {
            element.style.retain(|(name, _)| name != property);
        }
    }

    /// Serialized inline style, `None` when there are no declarations.
    #[must_use]
    pub fn style_attr(&self, node: NodeId) -> Option<String> {
        let element = self.element(node)?;
        if element.style.is_empty() {
            return None;
        }
        Some(
            element
                .style
                .iter()
                .map(|(name, value)| format!("{name}: {value};"))
                .collect::<Vec<_>>()
                .join(" "),
        )
    }

    // ---------------------------------------------------------------------
    // Title
    // ---------------------------------------------------------------------

    /// Text of the first `<title>` element.
    #[must_use]
    pub fn title(&self) -> String {
        self.all_elements()
            .into_iter()
            .find(|id| self.tag_name(*id) == Some("title"))
            .map(|id| self.text_content(id).trim().to_owned())
            .unwrap_or_default()
    }

    /// Sets the document title, creating `<title>` in `<head>` when missing.
    pub fn set_title(&mut self, title: &str) {
        let existing = self
            .all_elements()
            .into_iter()
            .find(|id| self.tag_name(*id) == Some("title"));
        let node = match existing {
            Some(node) => node,
            None => {
                let Some(head) = self.head() else {
                    return;
                };
                let node = self.create_element("title");
                self.append_child(head, node);
                node
            }
        };
        self.set_text_content(node, title);
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    fn all_elements(&self) -> Vec<NodeId> {
        self.descendant_elements(self.root)
    }

    fn descendant_elements(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for child in &self.nodes[node.0].children {
            self.walk(*child, &mut |id, kind| {
                if matches!(kind, NodeKind::Element(_)) {
                    out.push(id);
                }
            });
        }
        out
    }

    /// All connected elements matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::UnsupportedSelector`] when `selector` does not parse.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let selector = Selector::parse(selector)?;
        Ok(self.select(self.root, &selector))
    }

    /// First connected element matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::UnsupportedSelector`] when `selector` does not parse.
    pub fn query_selector(&self, selector: &str) -> Result<Option<NodeId>, DomError> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    /// Descendants of `scope` matching `selector`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::UnsupportedSelector`] when `selector` does not parse.
    pub fn query_selector_all_within(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>, DomError> {
        let selector = Selector::parse(selector)?;
        Ok(self.select(scope, &selector))
    }

    /// First descendant of `scope` matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`DomError::UnsupportedSelector`] when `selector` does not parse.
    pub fn query_selector_within(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>, DomError> {
        Ok(self
            .query_selector_all_within(scope, selector)?
            .into_iter()
            .next())
    }

    /// First connected element whose `id` attribute equals `id`.
    #[must_use]
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.all_elements()
            .into_iter()
            .find(|node| self.id(*node) == Some(id))
    }

    fn select(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendant_elements(scope)
            .into_iter()
            .filter(|node| {
                selector
                    .groups
                    .iter()
                    .any(|chain| self.matches_chain(*node, chain))
            })
            .collect()
    }

    fn matches_chain(&self, node: NodeId, chain: &[Compound]) -> bool {
        let Some((last, ancestors)) = chain.split_last() else {
            return false;
        };
        if !self.matches_compound(node, last) {
            return false;
        }

        // Descendant combinators only, so greedy right-to-left matching is exact.
        let mut remaining = ancestors;
        let mut current = self.parent(node);
        while let Some((wanted, rest)) = remaining.split_last() {
            let Some(candidate) = current else {
                return false;
            };
            if self.matches_compound(candidate, wanted) {
                remaining = rest;
            }
            current = self.parent(candidate);
        }
        true
    }

    fn matches_compound(&self, node: NodeId, compound: &Compound) -> bool {
        let Some(element) = self.element(node) else {
            return false;
        };
        if compound
            .tag
            .as_deref()
            .is_some_and(|tag| tag != element.tag_name)
        {
            return false;
        }
        if compound
            .id
            .as_deref()
            .is_some_and(|id| element.attr("id") != Some(id))
        {
            return false;
        }
        if !compound.classes.iter().all(|c| element.has_class(c)) {
            return false;
        }
        compound.attrs.iter().all(|cond| {
            let actual = if cond.name == "style" {
                None
            } else {
                element.attr(&cond.name)
            };
            match (&cond.value, actual) {
                (None, actual) => actual.is_some(),
                (Some(expected), Some(actual)) => expected == actual,
                (Some(_), None) => false,
            }
        })
    }

    // ---------------------------------------------------------------------
    // Layout
    // ---------------------------------------------------------------------

    /// Records the laid-out box of `node`, in page coordinates.
    pub fn set_layout(&mut self, node: NodeId, rect: Rect) {
        self.layout.insert(node, rect);
    }

    /// The box recorded for `node`, if the host has laid it out.
    #[must_use]
    pub fn bounding_rect(&self, node: NodeId) -> Option<Rect> {
        self.layout.get(&node).copied()
    }

    // ---------------------------------------------------------------------
    // Events
    // ---------------------------------------------------------------------

    pub fn add_event_listener(&mut self, node: NodeId, kind: EventKind, listener: Listener) {
        self.listeners.entry(node).or_default().push((kind, listener));
    }

    #[must_use]
    pub fn listener_count(&self, node: NodeId, kind: EventKind) -> usize {
        self.listeners
            .get(&node)
            .map_or(0, |entries| entries.iter().filter(|(k, _)| *k == kind).count())
    }

    /// Runs every `kind` listener registered on `node`, in registration order.
    ///
    /// Returns the number of listeners invoked.
    pub fn dispatch(&mut self, node: NodeId, kind: EventKind) -> usize {
        let handlers: Vec<Listener> = self
            .listeners
            .get(&node)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|(k, _)| *k == kind)
                    .map(|(_, listener)| listener.clone())
                    .collect()
            })
            .unwrap_or_default();
        for handler in &handlers {
            handler.call(self, node);
        }
        handlers.len()
    }
}

/// `heroCta` → `data-hero-cta`.
fn dataset_attr_name(key: &str) -> String {
    let mut name = String::from("data-");
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            name.push('-');
            name.push(c.to_ascii_lowercase());
        } else {
            name.push(c);
        }
    }
    name
}

fn parse_style(value: &str) -> Vec<(String, String)> {
    value
        .split(';')
        .filter_map(|decl| decl.split_once(':'))
        .map(|(name, value)| (name.trim().to_owned(), value.trim().to_owned()))
        .filter(|(name, _)| !name.is_empty())
        .collect()
}

#[cfg(test)]
#[path = "document_test.rs"]
mod tests;
