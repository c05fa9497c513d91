//! Arena-backed document tree.
//!
//! Nodes are addressed by [`NodeId`], a slot index plus the slot's generation.
//! Clearing an element frees its whole subtree; freed slots are reused by later
//! nodes under a new generation, so ids held from before the clear resolve to
//! nothing instead of to whatever took their place.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

impl NodeId {
    pub fn index(&self) -> usize { self.index }
    pub fn generation(&self) -> u32 { self.generation }
}

/// `#index` for a slot's first node, `#index.generation` after reuse.
impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.generation {
            0 => f.pad(&format!("#{}", self.index)),
            generation => f.pad(&format!("#{}.{generation}", self.index)),
        }
    }
}

impl FromStr for NodeId {
    type Err = ParseIntError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().trim_start_matches('#');
        let (index, generation) = match s.split_once('.') {
            Some((index, generation)) => (index.parse()?, generation.parse()?),
            None => (s.parse()?, 0),
        };
        Ok(Self { index, generation })
    }
}

#[derive(Debug, Clone)]
enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    node_type: NodeType,
}

#[derive(Debug, Clone)]
struct Element {
    tag_name: String,
    classes: Vec<String>,
    attrs: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

const VOID_ELEMENTS: &[&str] = &["img", "input", "br", "hr", "meta", "link"];

#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Default for Document {
    fn default() -> Self { Self::new() }
}

impl Document {
    pub fn new() -> Self {
        let root = Node { parent: None, children: Vec::new(), node_type: NodeType::Document };
        Self {
            slots: vec![Slot { generation: 0, node: Some(root) }],
            free: Vec::new(),
            root: NodeId { index: 0, generation: 0 },
            id_index: HashMap::new(),
        }
    }

    pub fn root(&self) -> NodeId { self.root }

    /// Arena slots in use or waiting for reuse. Stays flat across re-renders of the same size.
    pub fn slot_count(&self) -> usize { self.slots.len() }

    /// Whether `node` still names a live node, attached or not.
    pub fn contains(&self, node: NodeId) -> bool { self.node(node).is_some() }

    fn node(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index)?;
        if slot.generation != id.generation { return None; }
        slot.node.as_ref()
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index)?;
        if slot.generation != id.generation { return None; }
        slot.node.as_mut()
    }

    fn create_node(&mut self, parent: NodeId, node_type: NodeType) -> NodeId {
        let node = Node { parent: Some(parent), children: Vec::new(), node_type };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.node = Some(node);
                NodeId { index, generation: slot.generation }
            }
            None => {
                self.slots.push(Slot { generation: 0, node: Some(node) });
                NodeId { index: self.slots.len() - 1, generation: 0 }
            }
        };
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(id);
        }
        id
    }

    pub fn create_element(&mut self, parent: NodeId, tag_name: &str) -> NodeId {
        let element = Element { tag_name: tag_name.to_string(), classes: Vec::new(), attrs: BTreeMap::new() };
        self.create_node(parent, NodeType::Element(element))
    }

    /// Element carrying a single class, the common case for widget markup.
    pub fn create_element_with_class(&mut self, parent: NodeId, tag_name: &str, class: &str) -> NodeId {
        let id = self.create_element(parent, tag_name);
        self.add_class(id, class);
        id
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.create_node(parent, NodeType::Text(text.to_string()))
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.node(node)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.node_mut(node)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> { self.element(node).map(|e| e.tag_name.as_str()) }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> { self.node(node)?.parent }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.node(node).map(|n| n.children.as_slice()).unwrap_or_default()
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if current == self.root { return true; }
            match self.parent(current) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(node) else { return };
        element.attrs.insert(name.to_string(), value.to_string());
        if name == "id" {
            self.id_index.insert(value.to_string(), node);
        }
    }

    pub fn remove_attr(&mut self, node: NodeId, name: &str) {
        let Some(element) = self.element_mut(node) else { return };
        if element.attrs.remove(name).is_some() && name == "id" {
            self.id_index.retain(|_, id| *id != node);
        }
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?.attrs.get(name).map(String::as_str)
    }

    pub fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied().filter(|node| self.is_attached(*node))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element_mut(node) {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_string());
            }
        }
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element_mut(node) {
            element.classes.retain(|c| c != class);
        }
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|e| e.classes.iter().any(|c| c == class))
    }

    pub fn text_content(&self, node: NodeId) -> String {
        let Some(n) = self.node(node) else { return String::new() };
        match &n.node_type {
            NodeType::Text(text) => text.clone(),
            _ => n.children.iter().map(|child| self.text_content(*child)).collect(),
        }
    }

    /// Replaces all children with one text node; returns the detached nodes.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Vec<NodeId> {
        let detached = self.clear_children(node);
        self.append_text(node, text);
        detached
    }

    /// Removes every descendant of `node` and frees their slots, returning their ids.
    pub fn clear_children(&mut self, node: NodeId) -> Vec<NodeId> {
        let Some(n) = self.node_mut(node) else { return Vec::new() };
        let mut stack = std::mem::take(&mut n.children);
        let mut detached = Vec::new();
        while let Some(current) = stack.pop() {
            detached.push(current);
            if let Some(n) = self.node(current) {
                stack.extend(n.children.iter().copied());
            }
        }
        detached.sort_unstable();
        for id in &detached {
            if let Some(slot) = self.slots.get_mut(id.index) {
                slot.node = None;
                slot.generation = slot.generation.wrapping_add(1);
            }
        }
        // lowest index is handed out first
        self.free.extend(detached.iter().rev().map(NodeId::index));
        self.id_index.retain(|_, id| detached.binary_search(id).is_err());
        detached
    }

    /// Attached elements carrying `class`, in document order.
    pub fn query_class(&self, class: &str) -> Vec<NodeId> { self.query_class_within(self.root, class) }

    pub fn query_class_within(&self, scope: NodeId, class: &str) -> Vec<NodeId> {
        let mut found = Vec::new();
        self.collect_class(scope, class, &mut found);
        found
    }

    fn collect_class(&self, node: NodeId, class: &str, out: &mut Vec<NodeId>) {
        for child in self.children(node) {
            if self.has_class(*child, class) {
                out.push(*child);
            }
            self.collect_class(*child, class, out);
        }
    }

    /// Serializes everything reachable from the root.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for child in self.children(self.root) {
            self.write_html(*child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.node(node) else { return };
        match &n.node_type {
            NodeType::Document => {
                for child in &n.children {
                    self.write_html(*child, out);
                }
            }
            NodeType::Text(text) => out.push_str(&escape_text(text)),
            NodeType::Element(element) => {
                out.push('<');
                out.push_str(&element.tag_name);
                if !element.classes.is_empty() {
                    out.push_str(&format!(" class=\"{}\"", escape_attr(&element.classes.join(" "))));
                }
                for (name, value) in &element.attrs {
                    out.push_str(&format!(" {name}=\"{}\"", escape_attr(value)));
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&element.tag_name.as_str()) {
                    return;
                }
                for child in &n.children {
                    self.write_html(*child, out);
                }
                out.push_str(&format!("</{}>", element.tag_name));
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}
