//! # Position
//!
//! An immutable address inside the document tree: a node plus an [`Anchor`]
//! saying where relative to that node the address sits.
//!
//! Every position can be normalized to a plain `(container, offset)` pair.
//! Ordering and equality always go through normalization, so positions built
//! from different anchors compare as the boundary points they denote.
//!
//! Positions are snapshots. They are not updated when the tree changes, and
//! positions from unrelated trees are ordered by their tree roots, which is
//! arbitrary but consistent.

use std::cmp::Ordering;
use std::fmt;

use crate::dom::{Dom, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Anchor {
    /// Offset 0 inside the node
    Begin,
    /// At the node's length (text length or child count)
    End,
    /// Immediately before the node, as a child position of its parent
    Before,
    /// Immediately after the node, as a child position of its parent
    After,
    /// An explicit offset inside the node
    Offset(usize),
}

/// A boundary point in the tree.
///
/// `==` compares the representation; use [`Position::equal_to`] to ask whether
/// two positions denote the same point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    node: NodeId,
    anchor: Anchor,
}

impl Position {
    pub fn new(node: NodeId, anchor: Anchor) -> Self {
        Self { node, anchor }
    }

    /// Shorthand for an explicit offset inside `node`
    pub fn at(node: NodeId, offset: usize) -> Self {
        Self::new(node, Anchor::Offset(offset))
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// The explicit offset, if this position carries one
    pub fn offset(&self) -> Option<usize> {
        match self.anchor {
            Anchor::Offset(offset) => Some(offset),
            _ => None,
        }
    }

    pub fn is_normalized(&self) -> bool {
        matches!(self.anchor, Anchor::Offset(_))
    }

    /// Canonical `(container, offset)` form of this position.
    ///
    /// `Before`/`After` move up to the parent; a node without a parent has no
    /// such slot, so those fall back to its own `Begin`/`End`. Offsets beyond
    /// the container's length are clamped. Normalizing twice is a no-op.
    pub fn normalize(&self, dom: &Dom) -> Position {
        let length = dom.node_length(self.node);
        match self.anchor {
            Anchor::Offset(offset) => Position::at(self.node, offset.min(length)),
            Anchor::Begin => Position::at(self.node, 0),
            Anchor::End => Position::at(self.node, length),
            Anchor::Before => match dom.index_in_parent(self.node) {
                Some((parent, index)) => Position::at(parent, index),
                None => Position::at(self.node, 0),
            },
            Anchor::After => match dom.index_in_parent(self.node) {
                Some((parent, index)) => Position::at(parent, index + 1),
                None => Position::at(self.node, length),
            },
        }
    }

    /// Document order of the two boundary points
    pub fn compare(&self, other: &Position, dom: &Dom) -> Ordering {
        let a = self.normalize(dom);
        let b = other.normalize(dom);
        compare_boundary_points(
            dom,
            (a.node, a.offset().unwrap_or_default()),
            (b.node, b.offset().unwrap_or_default()),
        )
    }

    pub fn is_after(&self, other: &Position, dom: &Dom) -> bool {
        self.compare(other, dom) == Ordering::Greater
    }

    pub fn equal_to(&self, other: &Position, dom: &Dom) -> bool {
        self.compare(other, dom) == Ordering::Equal
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.anchor {
            Anchor::Offset(offset) => write!(f, "({}, {offset})", self.node),
            anchor => write!(f, "({}, {anchor:?})", self.node),
        }
    }
}

/// Child indices leading from the tree root down to `node`
fn index_path(dom: &Dom, node: NodeId) -> Vec<usize> {
    let mut path: Vec<usize> = dom
        .ancestors(node)
        .filter_map(|n| dom.index_in_parent(n).map(|(_, index)| index))
        .collect();
    path.reverse();
    path
}

/// Boundary point comparison as defined for DOM ranges: pre-order of the
/// containers, with the offset deciding when one container holds the other.
fn compare_boundary_points(dom: &Dom, a: (NodeId, usize), b: (NodeId, usize)) -> Ordering {
    let (a_node, a_offset) = a;
    let (b_node, b_offset) = b;
    if a_node == b_node {
        return a_offset.cmp(&b_offset);
    }

    // Unrelated trees: order by root so the result stays consistent
    let (a_root, b_root) = (dom.tree_root(a_node), dom.tree_root(b_node));
    if a_root != b_root {
        return a_root.cmp(&b_root);
    }

    let a_path = index_path(dom, a_node);
    let b_path = index_path(dom, b_node);
    let common = a_path
        .iter()
        .zip(&b_path)
        .take_while(|(x, y)| x == y)
        .count();

    match (a_path.get(common), b_path.get(common)) {
        // a contains b: b sits inside a's child at this index
        (None, Some(&child_index)) => {
            if child_index < a_offset {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        }
        // b contains a
        (Some(&child_index), None) => {
            if child_index < b_offset {
                Ordering::Less
            } else {
                Ordering::Greater
            }
        }
        (Some(a_index), Some(b_index)) => a_index.cmp(b_index),
        // Same root and same path means the same node
        (None, None) => Ordering::Equal,
    }
}
