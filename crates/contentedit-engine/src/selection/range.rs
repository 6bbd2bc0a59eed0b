use std::cmp::Ordering;

use crate::dom::{Dom, NodeId, slice_text};
use crate::position::{Anchor, Position};

/// An ordered pair of normalized positions, `start <= end` in document order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SelectionRange {
    start: Position,
    end: Position,
}

impl SelectionRange {
    /// Build a range from two positions in either order
    pub fn new(dom: &Dom, start: Position, end: Position) -> Self {
        let start = start.normalize(dom);
        let end = end.normalize(dom);
        if start.is_after(&end, dom) {
            Self {
                start: end,
                end: start,
            }
        } else {
            Self { start, end }
        }
    }

    /// A caret: both ends at `position`
    pub fn collapsed(dom: &Dom, position: Position) -> Self {
        let position = position.normalize(dom);
        Self {
            start: position,
            end: position,
        }
    }

    /// Everything inside `node`
    pub fn select_node(dom: &Dom, node: NodeId) -> Self {
        Self::new(
            dom,
            Position::new(node, Anchor::Begin),
            Position::new(node, Anchor::End),
        )
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn end(&self) -> Position {
        self.end
    }

    pub fn is_collapsed(&self, dom: &Dom) -> bool {
        self.start.equal_to(&self.end, dom)
    }

    /// Both boundary containers sit inside `root` (inclusive)
    pub fn is_within(&self, dom: &Dom, root: NodeId) -> bool {
        dom.contains(root, self.start.node()) && dom.contains(root, self.end.node())
    }

    /// The text the range covers: every text node it touches, clipped to the
    /// boundary offsets, in document order.
    pub fn text_content(&self, dom: &Dom) -> String {
        let (start_node, start_offset) = (self.start.node(), self.start.offset().unwrap_or(0));
        let (end_node, end_offset) = (self.end.node(), self.end.offset().unwrap_or(0));

        let Some(common) = dom.common_ancestor(start_node, end_node) else {
            return String::new();
        };

        let mut out = String::new();
        for node in dom.descendants(common) {
            let Some(text) = dom.text(node) else {
                continue;
            };

            let piece = if node == start_node && node == end_node {
                slice_text(text, start_offset, end_offset)
            } else if node == start_node {
                slice_text(text, start_offset, text.len())
            } else if node == end_node {
                slice_text(text, 0, end_offset)
            } else if self.covers_node(dom, node) {
                text
            } else {
                continue;
            };
            out.push_str(piece);
        }
        out
    }

    fn covers_node(&self, dom: &Dom, node: NodeId) -> bool {
        Position::new(node, Anchor::Begin).compare(&self.start, dom) != Ordering::Less
            && Position::new(node, Anchor::End).compare(&self.end, dom) != Ordering::Greater
    }
}
