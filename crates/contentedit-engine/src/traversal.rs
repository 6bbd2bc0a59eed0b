//! # Leaf Traversal
//!
//! Pure walks over the document tree that find meaningful leaf nodes while
//! stepping over nodes that contribute nothing to addressing (comments,
//! line-break-only text between block tags, hidden elements).
//!
//! All functions are total: a missing leaf is `None`, never an error.

use log::trace;

use crate::dom::{Dom, NodeId, NodeKind};

/// Whether `node` should be ignored when looking for content leaves
pub fn should_skip_node(dom: &Dom, node: NodeId) -> bool {
    match dom.kind(node) {
        // Empty text, or text made only of CR/LF characters
        NodeKind::Text(text) if text.chars().all(|c| c == '\r' || c == '\n') => true,
        NodeKind::Comment(_) => true,
        _ => in_hidden_subtree(dom, node),
    }
}

/// Hidden elements hide their whole subtree
fn in_hidden_subtree(dom: &Dom, node: NodeId) -> bool {
    dom.ancestors(node).any(|n| match dom.kind(n) {
        NodeKind::Element(element) => element.is_hidden(),
        _ => false,
    })
}

/// First meaningful leaf under `root`, or `None` for an empty container or
/// one without any meaningful node
pub fn first_leaf(dom: &Dom, root: NodeId) -> Option<NodeId> {
    leaf_node(dom, root, true)
}

/// Last meaningful leaf under `root`, see [`first_leaf`]
pub fn last_leaf(dom: &Dom, root: NodeId) -> Option<NodeId> {
    leaf_node(dom, root, false)
}

/// Descend to the deepest first (or last) child, then walk towards the other
/// end if that node turned out to be one we skip.
pub fn leaf_node(dom: &Dom, root: NodeId, is_first: bool) -> Option<NodeId> {
    let child = |node| {
        if is_first {
            dom.first_child(node)
        } else {
            dom.last_child(node)
        }
    };

    let mut result = child(root)?;
    while let Some(next) = child(result) {
        result = next;
    }

    if should_skip_node(dom, result) {
        trace!("leaf {result} under {root} is skipped, searching siblings");
        return leaf_sibling(dom, root, result, is_first);
    }
    Some(result)
}

/// The next (`forward`) or previous meaningful leaf after `from`, staying
/// inside `root`. `None` when `from` is not strictly inside `root`.
pub fn leaf_sibling(dom: &Dom, root: NodeId, from: NodeId, forward: bool) -> Option<NodeId> {
    if from == root || !dom.contains(root, from) {
        return None;
    }

    let sibling = |node| {
        if forward {
            dom.next_sibling(node)
        } else {
            dom.previous_sibling(node)
        }
    };
    let child = |node| {
        if forward {
            dom.first_child(node)
        } else {
            dom.last_child(node)
        }
    };

    let mut current = from;
    loop {
        // Climb until some ancestor below root has a sibling in this direction
        let mut parent = dom.parent(current);
        let mut next = sibling(current);
        while next.is_none() {
            match parent {
                Some(p) if p != root => {
                    next = sibling(p);
                    parent = dom.parent(p);
                }
                _ => break,
            }
        }

        let mut candidate = next?;
        while let Some(c) = child(candidate) {
            candidate = c;
        }

        if !should_skip_node(dom, candidate) {
            return Some(candidate);
        }
        trace!("skipping leaf {candidate}");
        current = candidate;
    }
}

/// Iterate every meaningful leaf under `root` in document order
pub fn leaves(dom: &Dom, root: NodeId) -> Leaves<'_> {
    Leaves {
        dom,
        root,
        next: first_leaf(dom, root),
    }
}

pub struct Leaves<'a> {
    dom: &'a Dom,
    root: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Leaves<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = leaf_sibling(self.dom, self.root, current, true);
        Some(current)
    }
}
