//! Event dispatch table: (node, event kind) → widget action.

use std::collections::HashMap;
use std::fmt;

use crate::domain::value_objects::ProductId;
use crate::page::document::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Click,
    Change,
}

/// What a bound control does when its event fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Sort,
    Filter,
    BuyAll,
    AddToCart(ProductId),
    BuyNow(ProductId),
    ViewReviews(ProductId),
    AddReview(ProductId),
    RemoveFromCart(ProductId),
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sort => write!(f, "sort"),
            Self::Filter => write!(f, "filter"),
            Self::BuyAll => write!(f, "buy all"),
            Self::AddToCart(id) => write!(f, "add to cart [{id}]"),
            Self::BuyNow(id) => write!(f, "buy now [{id}]"),
            Self::ViewReviews(id) => write!(f, "view reviews/videos [{id}]"),
            Self::AddReview(id) => write!(f, "add review [{id}]"),
            Self::RemoveFromCart(id) => write!(f, "remove from cart [{id}]"),
        }
    }
}

#[derive(Debug, Default)]
pub struct DispatchTable {
    bindings: HashMap<(NodeId, EventKind), Action>,
}

impl DispatchTable {
    pub fn new() -> Self { Self::default() }

    pub fn bind(&mut self, node: NodeId, kind: EventKind, action: Action) {
        self.bindings.insert((node, kind), action);
    }

    pub fn lookup(&self, node: NodeId, kind: EventKind) -> Option<Action> {
        self.bindings.get(&(node, kind)).copied()
    }

    /// Drops every binding on the given nodes; returns how many were dropped.
    pub fn unbind_nodes(&mut self, nodes: &[NodeId]) -> usize {
        let before = self.bindings.len();
        self.bindings.retain(|(node, _), _| !nodes.contains(node));
        before - self.bindings.len()
    }

    /// Live bindings ordered by node.
    pub fn bindings(&self) -> Vec<(NodeId, EventKind, Action)> {
        let mut all: Vec<_> = self.bindings.iter().map(|((node, kind), action)| (*node, *kind, *action)).collect();
        all.sort_by_key(|(node, kind, _)| (*node, *kind));
        all
    }

    pub fn len(&self) -> usize { self.bindings.len() }
    pub fn is_empty(&self) -> bool { self.bindings.is_empty() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::document::Document;

    #[test]
    fn test_bind_lookup_unbind() {
        let mut doc = Document::new();
        let select = doc.create_element(doc.root(), "select");
        let button = doc.create_element(doc.root(), "button");
        let mut table = DispatchTable::new();
        table.bind(select, EventKind::Change, Action::Sort);
        table.bind(button, EventKind::Click, Action::AddToCart(ProductId::new(3)));

        assert_eq!(table.lookup(select, EventKind::Change), Some(Action::Sort));
        assert_eq!(table.lookup(select, EventKind::Click), None);
        assert_eq!(table.unbind_nodes(&[button]), 1);
        assert_eq!(table.lookup(button, EventKind::Click), None);
        assert_eq!(table.bindings(), [(select, EventKind::Change, Action::Sort)]);
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::RemoveFromCart(ProductId::new(2)).to_string(), "remove from cart [2]");
    }
}
