use crate::dom::{Dom, DomError, NodeId};
use crate::inline::{InlineElement, NodeInlineElement};
use crate::position::Position;
use crate::selection::SelectionRange;

/// A section of an inline element.
///
/// Formatting often has to apply to part of a node only, e.g. when the user
/// selects three characters of a ten character word. A partial element
/// decorates the full [`NodeInlineElement`] with its own narrower span rather
/// than copying anything. Decoration never nests: building a partial from a
/// partial re-decorates the underlying node element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartialInlineElement {
    decorated: NodeInlineElement,
    start: Position,
    end: Position,
}

impl PartialInlineElement {
    /// `start`/`end` default to the container's Begin/End and are stored
    /// normalized. A `start` after `end` is a caller error.
    pub fn new(
        dom: &Dom,
        decorated: &InlineElement,
        start: Option<Position>,
        end: Option<Position>,
    ) -> Self {
        let decorated = match decorated {
            InlineElement::Node(node) => *node,
            InlineElement::Partial(partial) => partial.decorated_inline(),
        };

        let start = start.unwrap_or_else(|| decorated.start_position());
        let end = end.unwrap_or_else(|| decorated.end_position());

        Self {
            decorated,
            start: start.normalize(dom),
            end: end.normalize(dom),
        }
    }

    /// The full inline element this one decorates
    pub fn decorated_inline(&self) -> NodeInlineElement {
        self.decorated
    }

    pub fn container_node(&self) -> NodeId {
        self.decorated.container_node()
    }

    pub fn start_position(&self) -> Position {
        self.start
    }

    pub fn end_position(&self) -> Position {
        self.end
    }

    /// Text covered by `[start, end)`
    pub fn text_content(&self, dom: &Dom) -> String {
        SelectionRange::new(dom, self.start, self.end).text_content(dom)
    }

    /// Strictly interior positions only: `start` and `end` are not contained
    pub fn contains(&self, position: &Position, dom: &Dom) -> bool {
        position.is_after(&self.start, dom) && self.end.is_after(position, dom)
    }

    /// True when this span begins at or after the end of `other`.
    /// Touching spans count as "after".
    pub fn is_after(&self, other: &InlineElement, dom: &Dom) -> bool {
        let end = other.end_position();
        self.start.equal_to(&end, dom) || self.start.is_after(&end, dom)
    }

    /// Style the decorated element, defaulting the bounds to this span
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
        self.decorated.apply_style(
            dom,
            styler,
            Some(from.unwrap_or(self.start)),
            Some(to.unwrap_or(self.end)),
        )
    }
}
