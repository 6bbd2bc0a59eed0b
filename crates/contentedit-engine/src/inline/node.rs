use crate::dom::{Dom, DomError, NodeId, slice_text};
use crate::position::{Anchor, Position};

/// A whole leaf node treated as one unit of inline content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeInlineElement {
    node: NodeId,
}

impl NodeInlineElement {
    pub fn new(node: NodeId) -> Self {
        Self { node }
    }

    pub fn container_node(&self) -> NodeId {
        self.node
    }

    pub fn start_position(&self) -> Position {
        Position::new(self.node, Anchor::Begin)
    }

    pub fn end_position(&self) -> Position {
        Position::new(self.node, Anchor::End)
    }

    /// Text of the node, including descendant text for elements
    pub fn text_content(&self, dom: &Dom) -> String {
        dom.text_content(self.node)
    }

    /// Run `styler` on the part of the container between `from` and `to`
    /// (defaulting to Begin/End).
    ///
    /// When both bounds resolve inside a text container and cover only part
    /// of it, the text is split so the styler receives a node holding exactly
    /// that part; the container keeps the text before it. An empty span
    /// styles nothing. Bounds outside the container style the whole node.
    pub fn apply_style<F>(
        &self,
        dom: &mut Dom,
        mut styler: F,
        from: Option<Position>,
        to: Option<Position>,
    ) -> Result<(), DomError>
    where
        F: FnMut(&mut Dom, NodeId),
    {
        let Some((start, end)) = self.text_span(dom, from, to) else {
            styler(dom, self.node);
            return Ok(());
        };

        let length = dom.node_length(self.node);
        if start == 0 && end == length {
            styler(dom, self.node);
        } else if start < end {
            if end < length {
                dom.split_text(self.node, end)?;
            }
            let target = if start > 0 {
                dom.split_text(self.node, start)?
            } else {
                self.node
            };
            styler(dom, target);
        }
        Ok(())
    }

    /// Byte span `[start, end)` of the bounds inside a text container,
    /// snapped to char boundaries
    fn text_span(
        &self,
        dom: &Dom,
        from: Option<Position>,
        to: Option<Position>,
    ) -> Option<(usize, usize)> {
        let text = dom.text(self.node)?;
        let from = from.unwrap_or_else(|| self.start_position()).normalize(dom);
        let to = to.unwrap_or_else(|| self.end_position()).normalize(dom);
        if from.node() != self.node || to.node() != self.node {
            return None;
        }

        let start = slice_text(text, 0, from.offset()?).len();
        let end = slice_text(text, 0, to.offset()?).len();
        Some((start, end))
    }
}
