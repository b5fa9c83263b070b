//! In-memory element tree that menus read from and write to.
//!
//! `Document` stands in for the host page: an arena of nodes addressed by
//! `NodeId`, each element carrying ordered attributes, inline style
//! properties and optional layout bounds. Shadow roots hang off their host
//! element and are skipped by regular (non-composed) traversal, the same way
//! a browser keeps them out of `querySelectorAll`.

pub mod parse;
pub mod selector;

use std::collections::BTreeMap;

pub use parse::MarkupError;
pub use selector::{Selector, SelectorError};

const NATIVELY_FOCUSABLE: [&str; 4] = ["button", "input", "select", "textarea"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Layout box in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    ShadowRoot { host: NodeId },
}

#[derive(Debug, Clone, Default)]
struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
    style: BTreeMap<String, String>,
    bounds: Option<Bounds>,
    shadow_root: Option<NodeId>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    focused: Option<NodeId>,
    viewport: Bounds,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                parent: None,
                children: Vec::new(),
                kind: NodeKind::Document,
            }],
            focused: None,
            viewport: Bounds::new(0.0, 0.0, 1024.0, 768.0),
        }
    }

    /// Parse an HTML subset into a new document.
    pub fn parse(markup: &str) -> Result<Self, MarkupError> {
        parse::parse_document(markup)
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn viewport(&self) -> Bounds {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Bounds) {
        self.viewport = viewport;
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(el) => Some(el),
            _ => None,
        }
    }

    fn push_node(&mut self, parent: Option<NodeId>, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent,
            children: Vec::new(),
            kind,
        });
        if let Some(parent) = parent
            && let Some(node) = self.nodes.get_mut(parent.0)
        {
            node.children.push(id);
        }
        id
    }

    /// Create a detached element. Attach it with [`Document::append_child`].
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(
            None,
            NodeKind::Element(Element {
                tag: tag.to_ascii_lowercase(),
                ..Element::default()
            }),
        )
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(None, NodeKind::Text(text.to_string()))
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.contains(child, parent) || self.node(parent).is_none() {
            return;
        }
        if let Some(old) = self.node(child).and_then(|n| n.parent)
            && let Some(node) = self.nodes.get_mut(old.0)
        {
            node.children.retain(|c| *c != child);
        }
        if let Some(node) = self.nodes.get_mut(child.0) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.nodes.get_mut(parent.0) {
            node.children.push(child);
        }
    }

    /// Attach (or return the existing) shadow root of `host`.
    pub fn attach_shadow(&mut self, host: NodeId) -> Option<NodeId> {
        let existing = self.element(host)?.shadow_root;
        if existing.is_some() {
            return existing;
        }
        let shadow = self.push_node(None, NodeKind::ShadowRoot { host });
        if let Some(el) = self.element_mut(host) {
            el.shadow_root = Some(shadow);
        }
        Some(shadow)
    }

    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.element(host)?.shadow_root
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(|el| el.tag.as_str())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    /// Parent in the flattened tree: a shadow root's parent is its host.
    pub fn composed_parent(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id)?;
        match node.kind {
            NodeKind::ShadowRoot { host } => Some(host),
            _ => node.parent,
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Element descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if self.is_element(next) {
                out.push(next);
            }
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Inclusive, non-composed containment.
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

    /// Inclusive containment across shadow boundaries.
    pub fn contains_composed(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.composed_parent(id);
        }
        false
    }

    fn tree_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn attr_is(&self, id: NodeId, name: &str, value: &str) -> bool {
        self.attr(id, name) == Some(value)
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        if let Some(el) = self.element_mut(id) {
            match el.attrs.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value,
                None => el.attrs.push((name.to_string(), value)),
            }
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.attrs.retain(|(k, _)| k != name);
        }
    }

    pub fn attrs(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> {
        self.element(id)
            .into_iter()
            .flat_map(|el| el.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.attr(id, "class")
            .is_some_and(|list| list.split_whitespace().any(|c| c == class))
    }

    pub fn style(&self, id: NodeId, property: &str) -> Option<&str> {
        self.element(id)?.style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, id: NodeId, property: &str, value: impl Into<String>) {
        if let Some(el) = self.element_mut(id) {
            el.style.insert(property.to_string(), value.into());
        }
    }

    pub fn remove_style(&mut self, id: NodeId, property: &str) {
        if let Some(el) = self.element_mut(id) {
            el.style.remove(property);
        }
    }

    /// Numeric value of a style property, e.g. `opacity`.
    pub fn style_number(&self, id: NodeId, property: &str) -> Option<f32> {
        self.style(id, property)?
            .trim()
            .trim_end_matches("px")
            .parse()
            .ok()
    }

    pub fn bounds(&self, id: NodeId) -> Option<Bounds> {
        self.element(id)?.bounds
    }

    pub fn set_bounds(&mut self, id: NodeId, bounds: Bounds) {
        if let Some(el) = self.element_mut(id) {
            el.bounds = Some(bounds);
        }
    }

    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(NodeKind::Text(text)) = self.node(next).map(|n| &n.kind) {
                out.push_str(text);
            }
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn get_element_by_id(&self, value: &str) -> Option<NodeId> {
        (0..self.nodes.len())
            .map(NodeId)
            .find(|id| self.attr(*id, "id") == Some(value))
    }

    pub fn matches(&self, id: NodeId, selector: &Selector) -> bool {
        selector.matches(self, id)
    }

    pub fn query_selector_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| selector.matches(self, *id))
            .collect()
    }

    pub fn query_selector(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| selector.matches(self, *id))
    }

    /// Nearest inclusive ancestor matching `selector`.
    pub fn closest(&self, id: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if selector.matches(self, node) {
                return Some(node);
            }
            current = self.parent(node);
        }
        None
    }

    /// `disabled` attribute or `aria-disabled="true"`.
    pub fn is_disabled(&self, id: NodeId) -> bool {
        self.has_attr(id, "disabled") || self.attr_is(id, "aria-disabled", "true")
    }

    /// Whether the element or any composed ancestor is `display: none`.
    pub fn is_hidden(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.style(node, "display") == Some("none") {
                return true;
            }
            current = self.composed_parent(node);
        }
        false
    }

    pub fn tab_index(&self, id: NodeId) -> Option<i32> {
        self.attr(id, "tabindex")?.trim().parse().ok()
    }

    fn is_tab_stop(&self, id: NodeId) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if self.is_disabled(id) {
            return false;
        }
        match self.tab_index(id) {
            Some(index) => index >= 0,
            None => {
                NATIVELY_FOCUSABLE.contains(&el.tag.as_str())
                    || (el.tag == "a" && self.has_attr(id, "href"))
            }
        }
    }

    /// Tab stops in flattened document order. Shadow hosts contribute their
    /// shadow tree in place of their light children.
    pub fn sequential_focus_order(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(next) = stack.pop() {
            if self.style(next, "display") == Some("none") {
                continue;
            }
            if self.is_tab_stop(next) {
                out.push(next);
            }
            let children = match self.shadow_root(next) {
                Some(shadow) => self.children(shadow),
                None => self.children(next),
            };
            stack.extend(children.iter().rev().copied());
        }
        out
    }

    /// The truly focused node, ignoring shadow retargeting.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    pub fn set_focused(&mut self, node: Option<NodeId>) {
        self.focused = node.filter(|id| self.is_element(*id));
    }

    /// Document-level active element: focus inside a shadow tree is
    /// retargeted to the outermost host.
    pub fn active_element(&self) -> Option<NodeId> {
        let mut node = self.focused?;
        loop {
            match self.node(self.tree_root(node))?.kind {
                NodeKind::ShadowRoot { host } => node = host,
                _ => return Some(node),
            }
        }
    }

    /// Active element as seen from inside `shadow`, if focus lies within it.
    pub fn shadow_active_element(&self, shadow: NodeId) -> Option<NodeId> {
        let mut node = self.focused?;
        loop {
            let root = self.tree_root(node);
            if root == shadow {
                return Some(node);
            }
            match self.node(root)?.kind {
                NodeKind::ShadowRoot { host } => node = host,
                _ => return None,
            }
        }
    }

    /// Resolve the focused element by descending through nested shadow roots.
    pub fn deep_active_element(&self) -> Option<NodeId> {
        let mut current = self.active_element()?;
        while let Some(shadow) = self.shadow_root(current) {
            match self.shadow_active_element(shadow) {
                Some(inner) if inner != current => current = inner,
                _ => break,
            }
        }
        Some(current)
    }
}
