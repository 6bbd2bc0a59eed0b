//! # Inline Elements
//!
//! Units of inline content addressed by a `[start, end)` pair of positions.
//! [`NodeInlineElement`] covers one whole leaf node; [`PartialInlineElement`]
//! narrows a node element to a sub-range so formatting can apply to part of a
//! text run. [`InlineElement`] is the tagged union callers pass around.

mod node;
mod partial;

pub use node::NodeInlineElement;
pub use partial::PartialInlineElement;

use crate::dom::{Dom, DomError, NodeId};
use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InlineElement {
    Node(NodeInlineElement),
    Partial(PartialInlineElement),
}

impl From<NodeInlineElement> for InlineElement {
    fn from(element: NodeInlineElement) -> Self {
        InlineElement::Node(element)
    }
}

impl From<PartialInlineElement> for InlineElement {
    fn from(element: PartialInlineElement) -> Self {
        InlineElement::Partial(element)
    }
}

impl InlineElement {
    /// Whole-node inline element for `node`
    pub fn of_node(node: NodeId) -> Self {
        NodeInlineElement::new(node).into()
    }

    pub fn container_node(&self) -> NodeId {
        match self {
            InlineElement::Node(element) => element.container_node(),
            InlineElement::Partial(element) => element.container_node(),
        }
    }

    pub fn start_position(&self) -> Position {
        match self {
            InlineElement::Node(element) => element.start_position(),
            InlineElement::Partial(element) => element.start_position(),
        }
    }

    pub fn end_position(&self) -> Position {
        match self {
            InlineElement::Node(element) => element.end_position(),
            InlineElement::Partial(element) => element.end_position(),
        }
    }

    pub fn text_content(&self, dom: &Dom) -> String {
        match self {
            InlineElement::Node(element) => element.text_content(dom),
            InlineElement::Partial(element) => element.text_content(dom),
        }
    }

    /// Whether `position` lies strictly inside this element's span
    pub fn contains(&self, position: &Position, dom: &Dom) -> bool {
        match self {
            InlineElement::Node(_) => {
                position.is_after(&self.start_position(), dom)
                    && self.end_position().is_after(position, dom)
            }
            InlineElement::Partial(element) => element.contains(position, dom),
        }
    }

    /// Whether this element starts at or after the end of `other`
    pub fn is_after(&self, other: &InlineElement, dom: &Dom) -> bool {
        match self {
            InlineElement::Node(_) => {
                let start = self.start_position();
                let end = other.end_position();
                start.equal_to(&end, dom) || start.is_after(&end, dom)
            }
            InlineElement::Partial(element) => element.is_after(other, dom),
        }
    }

    /// Style the span, splitting text so only the covered part is styled
    pub fn apply_style<F>(
        &self,
        dom: &mut Dom,
        styler: F,
        from: Option<Position>,
        to: Option<Position>,
    ) -> Result<(), DomError>
    where
        F: FnMut(&mut Dom, NodeId),
    {
        match self {
            InlineElement::Node(element) => element.apply_style(dom, styler, from, to),
            InlineElement::Partial(element) => element.apply_style(dom, styler, from, to),
        }
    }
}
