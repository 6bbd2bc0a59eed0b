//! # Document Tree
//!
//! An arena-backed, mutable tree standing in for the host's live document.
//! Nodes are addressed by copyable [`NodeId`] handles that stay valid for the
//! lifetime of the [`Dom`] that created them, even after a node is detached.
//!
//! The rest of the engine only *reads* this tree: traversal, positions and
//! inline elements are pure queries over it. Mutation happens through the
//! methods here, driven by whoever owns the editing surface.

mod serialize;

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Tags that can never hold children, per the HTML void element list.
const VOID_TAGS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Stable handle to a node inside a [`Dom`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    pub tag: String,
    pub attributes: BTreeMap<String, String>,
}

impl ElementData {
    /// Elements explicitly marked as not contributing content:
    /// the `hidden` attribute or an inline `display: none`.
    pub fn is_hidden(&self) -> bool {
        if self.attributes.contains_key("hidden") {
            return true;
        }

        self.attributes.get("style").is_some_and(|style| {
            style.split(';').any(|declaration| {
                let mut parts = declaration.splitn(2, ':');
                let name = parts.next().unwrap_or_default().trim();
                let value = parts.next().unwrap_or_default().trim();
                let value = value.trim_end_matches("!important").trim();
                name.eq_ignore_ascii_case("display") && value.eq_ignore_ascii_case("none")
            })
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Text(String),
    Element(ElementData),
    Comment(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Structural misuse of the tree. Absence (no parent, no sibling) is never
/// reported through this type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomError {
    #[error("node {0} cannot hold children")]
    NotAContainer(NodeId),
    #[error("void element <{tag}> cannot hold children")]
    VoidElement { tag: String },
    #[error("inserting {child} under {parent} would make a node its own ancestor")]
    HierarchyCycle { parent: NodeId, child: NodeId },
    #[error("{reference} is not a child of {parent}")]
    NotAChild { parent: NodeId, reference: NodeId },
    #[error("node {0} holds no character data")]
    NotCharacterData(NodeId),
}

/// The document tree.
///
/// `NodeId`s are only meaningful for the `Dom` that issued them; passing a
/// foreign id is a caller error and may panic.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<NodeData>,
    void_tags: BTreeSet<String>,
}

impl Default for Dom {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            void_tags: VOID_TAGS.iter().map(|tag| tag.to_string()).collect(),
        }
    }
}

impl Dom {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat an additional tag as void (e.g. a host-specific embed marker)
    pub fn register_void_tag(&mut self, tag: &str) {
        self.void_tags.insert(tag.to_ascii_lowercase());
    }

    // ============ Construction ============

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: BTreeMap::new(),
        }))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    pub fn create_comment(&mut self, data: &str) -> NodeId {
        self.push(NodeKind::Comment(data.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create an element and append it to `parent` in one step
    pub fn append_element(&mut self, parent: NodeId, tag: &str) -> Result<NodeId, DomError> {
        let element = self.create_element(tag);
        self.append_child(parent, element)?;
        Ok(element)
    }

    /// Create a text node and append it to `parent` in one step
    pub fn append_text(&mut self, parent: NodeId, text: &str) -> Result<NodeId, DomError> {
        let node = self.create_text(text);
        self.append_child(parent, node)?;
        Ok(node)
    }

    // ============ Mutation ============

    /// Move `child` to the end of `parent`'s children, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.check_insertion(parent, child)?;
        self.detach(child);
        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Insert `child` immediately before `reference`, which must be a child of `parent`
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: NodeId,
    ) -> Result<(), DomError> {
        if self.parent(reference) != Some(parent) {
            return Err(DomError::NotAChild { parent, reference });
        }
        if child == reference {
            return Ok(());
        }
        self.check_insertion(parent, child)?;
        self.detach(child);

        // Index must be looked up after detaching: child may have preceded reference
        let index = self.nodes[parent.0]
            .children
            .iter()
            .position(|&c| c == reference)
            .ok_or(DomError::NotAChild { parent, reference })?;
        self.nodes[parent.0].children.insert(index, child);
        self.nodes[child.0].parent = Some(parent);
        Ok(())
    }

    /// Remove `node` (and its subtree) from its parent. No-op for detached nodes.
    pub fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Replace the character data of a text or comment node
    pub fn set_text(&mut self, node: NodeId, text: &str) -> Result<(), DomError> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Text(data) | NodeKind::Comment(data) => {
                *data = text.to_string();
                Ok(())
            }
            NodeKind::Element(_) => Err(DomError::NotCharacterData(node)),
        }
    }

    /// Split a text node at byte `offset` (clamped, snapped down to a char
    /// boundary). `node` keeps the text before the split; the returned new
    /// node holds the rest and is inserted right after `node` when it has a
    /// parent.
    pub fn split_text(&mut self, node: NodeId, offset: usize) -> Result<NodeId, DomError> {
        let NodeKind::Text(text) = &self.nodes[node.0].kind else {
            return Err(DomError::NotCharacterData(node));
        };
        let head = slice_text(text, 0, offset).to_string();
        let tail = text[head.len()..].to_string();

        self.set_text(node, &head)?;
        let rest = self.create_text(&tail);
        if let Some(parent) = self.parent(node) {
            match self.next_sibling(node) {
                Some(next) => self.insert_before(parent, rest, next)?,
                None => self.append_child(parent, rest)?,
            }
        }
        Ok(rest)
    }

    /// Set an attribute on an element. Returns `false` for non-elements.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(element) => {
                element
                    .attributes
                    .insert(name.to_ascii_lowercase(), value.to_string());
                true
            }
            _ => false,
        }
    }

    fn check_insertion(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        match &self.nodes[parent.0].kind {
            NodeKind::Element(element) if self.void_tags.contains(&element.tag) => {
                return Err(DomError::VoidElement {
                    tag: element.tag.clone(),
                });
            }
            NodeKind::Element(_) => {}
            _ => return Err(DomError::NotAContainer(parent)),
        }

        if self.contains(child, parent) {
            return Err(DomError::HierarchyCycle { parent, child });
        }
        Ok(())
    }

    // ============ Queries ============

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.0].kind
    }

    pub fn is_text(&self, node: NodeId) -> bool {
        matches!(self.kind(node), NodeKind::Text(_))
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.kind(node), NodeKind::Element(_))
    }

    /// Lower-cased tag name for elements
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            NodeKind::Element(element) => Some(&element.tag),
            _ => None,
        }
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        match self.kind(node) {
            NodeKind::Element(element) => element
                .attributes
                .get(&name.to_ascii_lowercase())
                .map(String::as_str),
            _ => None,
        }
    }

    /// Character data of a text node
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match self.kind(node) {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Whether `node` is an element that structurally cannot hold children
    pub fn is_void(&self, node: NodeId) -> bool {
        self.tag(node).is_some_and(|tag| self.void_tags.contains(tag))
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    pub fn first_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).first().copied()
    }

    pub fn last_child(&self, node: NodeId) -> Option<NodeId> {
        self.children(node).last().copied()
    }

    /// Position of `node` among its parent's children
    pub fn index_in_parent(&self, node: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.parent(node)?;
        let index = self.children(parent).iter().position(|&c| c == node)?;
        Some((parent, index))
    }

    pub fn next_sibling(&self, node: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(node)?;
        self.children(parent).get(index + 1).copied()
    }

    pub fn previous_sibling(&self, node: NodeId) -> Option<NodeId> {
        let (parent, index) = self.index_in_parent(node)?;
        index
            .checked_sub(1)
            .and_then(|i| self.children(parent).get(i).copied())
    }

    /// Inclusive containment: a node contains itself.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|n| n == ancestor)
    }

    /// `node` followed by each of its ancestors, nearest first
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(node), move |&n| self.parent(n))
    }

    /// The topmost ancestor of `node` (itself when detached)
    pub fn tree_root(&self, node: NodeId) -> NodeId {
        self.ancestors(node).last().unwrap_or(node)
    }

    /// Pre-order walk of `node`'s subtree, `node` included
    pub fn descendants(&self, node: NodeId) -> Descendants<'_> {
        Descendants {
            dom: self,
            stack: vec![node],
        }
    }

    /// Nearest node that contains both `a` and `b`, if they share a tree
    pub fn common_ancestor(&self, a: NodeId, b: NodeId) -> Option<NodeId> {
        let a_ancestors: BTreeSet<NodeId> = self.ancestors(a).collect();
        self.ancestors(b).find(|n| a_ancestors.contains(n))
    }

    /// Text of the node and all its descendants, in document order.
    /// Comments contribute only when asked for directly.
    pub fn text_content(&self, node: NodeId) -> String {
        match self.kind(node) {
            NodeKind::Text(text) | NodeKind::Comment(text) => text.clone(),
            NodeKind::Element(_) => self
                .descendants(node)
                .filter_map(|n| self.text(n))
                .collect(),
        }
    }

    /// Length used for offsets: bytes of character data, or number of children
    pub fn node_length(&self, node: NodeId) -> usize {
        match self.kind(node) {
            NodeKind::Text(text) | NodeKind::Comment(text) => text.len(),
            NodeKind::Element(_) => self.children(node).len(),
        }
    }

    /// Serialize `node` and its subtree as HTML
    pub fn to_html(&self, node: NodeId) -> String {
        serialize::to_html(self, node)
    }
}

pub struct Descendants<'a> {
    dom: &'a Dom,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.dom.children(node).iter().rev().copied());
        Some(node)
    }
}

/// Slice `text` by byte offsets, snapping both ends down to char boundaries
pub(crate) fn slice_text(text: &str, start: usize, end: usize) -> &str {
    let floor = |mut i: usize| {
        i = i.min(text.len());
        while !text.is_char_boundary(i) {
            i -= 1;
        }
        i
    };
    let start = floor(start);
    let end = floor(end).max(start);
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paragraph_with_text(dom: &mut Dom) -> (NodeId, NodeId, NodeId) {
        let root = dom.create_element("div");
        let p = dom.append_element(root, "p").unwrap();
        let text = dom.append_text(p, "Hello").unwrap();
        (root, p, text)
    }

    #[test]
    fn test_append_and_navigate() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let a = dom.append_text(root, "a").unwrap();
        let b = dom.append_element(root, "b").unwrap();
        let c = dom.append_text(root, "c").unwrap();

        assert_eq!(dom.children(root), &[a, b, c]);
        assert_eq!(dom.first_child(root), Some(a));
        assert_eq!(dom.last_child(root), Some(c));
        assert_eq!(dom.next_sibling(a), Some(b));
        assert_eq!(dom.previous_sibling(a), None);
        assert_eq!(dom.previous_sibling(c), Some(b));
        assert_eq!(dom.index_in_parent(c), Some((root, 2)));
        assert_eq!(dom.parent(b), Some(root));
    }

    #[test]
    fn test_append_moves_node_between_parents() {
        let mut dom = Dom::new();
        let (root, p, text) = paragraph_with_text(&mut dom);

        dom.append_child(root, text).unwrap();

        assert!(dom.children(p).is_empty());
        assert_eq!(dom.children(root), &[p, text]);
        assert_eq!(dom.parent(text), Some(root));
    }

    #[test]
    fn test_insert_before() {
        let mut dom = Dom::new();
        let (root, p, _) = paragraph_with_text(&mut dom);
        let hr = dom.create_element("hr");

        dom.insert_before(root, hr, p).unwrap();
        assert_eq!(dom.children(root), &[hr, p]);

        // Moving a later sibling in front of an earlier one
        dom.insert_before(root, p, hr).unwrap();
        assert_eq!(dom.children(root), &[p, hr]);
    }

    #[test]
    fn test_insert_before_requires_child_reference() {
        let mut dom = Dom::new();
        let (root, _, text) = paragraph_with_text(&mut dom);
        let span = dom.create_element("span");

        let result = dom.insert_before(root, span, text);
        assert_eq!(
            result,
            Err(DomError::NotAChild {
                parent: root,
                reference: text
            })
        );
    }

    #[test]
    fn test_structural_errors() {
        let mut dom = Dom::new();
        let (root, p, text) = paragraph_with_text(&mut dom);
        let br = dom.create_element("br");
        let span = dom.create_element("span");

        assert_eq!(
            dom.append_child(br, span),
            Err(DomError::VoidElement {
                tag: "br".to_string()
            })
        );
        assert_eq!(
            dom.append_child(text, span),
            Err(DomError::NotAContainer(text))
        );
        assert_eq!(
            dom.append_child(p, root),
            Err(DomError::HierarchyCycle {
                parent: p,
                child: root
            })
        );
        assert_eq!(
            dom.append_child(p, p),
            Err(DomError::HierarchyCycle {
                parent: p,
                child: p
            })
        );
    }

    #[test]
    fn test_detach_keeps_subtree() {
        let mut dom = Dom::new();
        let (root, p, text) = paragraph_with_text(&mut dom);

        dom.detach(p);

        assert!(dom.children(root).is_empty());
        assert_eq!(dom.parent(p), None);
        assert_eq!(dom.parent(text), Some(p));
        assert!(!dom.contains(root, text));
        assert_eq!(dom.tree_root(text), p);

        // Detaching twice is harmless
        dom.detach(p);
    }

    #[test]
    fn test_text_content_and_length() {
        let mut dom = Dom::new();
        let (root, p, text) = paragraph_with_text(&mut dom);
        dom.append_text(root, " world").unwrap();
        let comment = dom.create_comment("ignored");
        dom.append_child(p, comment).unwrap();

        assert_eq!(dom.text_content(root), "Hello world");
        assert_eq!(dom.text_content(comment), "ignored");
        assert_eq!(dom.node_length(text), 5);
        assert_eq!(dom.node_length(root), 2);
        assert_eq!(dom.node_length(p), 2);
    }

    #[test]
    fn test_set_text_rejects_elements() {
        let mut dom = Dom::new();
        let (_, p, text) = paragraph_with_text(&mut dom);

        dom.set_text(text, "Bye").unwrap();
        assert_eq!(dom.text(text), Some("Bye"));
        assert_eq!(dom.set_text(p, "x"), Err(DomError::NotCharacterData(p)));
    }

    #[test]
    fn test_split_text_inserts_rest_after_node() {
        let mut dom = Dom::new();
        let (_, p, text) = paragraph_with_text(&mut dom);
        let tail = dom.append_text(p, "!").unwrap();

        let rest = dom.split_text(text, 2).unwrap();
        assert_eq!(dom.text(text), Some("He"));
        assert_eq!(dom.text(rest), Some("llo"));
        assert_eq!(dom.children(p), &[text, rest, tail]);
        assert_eq!(dom.text_content(p), "Hello!");
    }

    #[test]
    fn test_split_text_clamps_and_snaps_offset() {
        let mut dom = Dom::new();
        let detached = dom.create_text("né");

        // Byte 2 is inside 'é'
        let rest = dom.split_text(detached, 2).unwrap();
        assert_eq!(dom.text(detached), Some("n"));
        assert_eq!(dom.text(rest), Some("é"));
        assert_eq!(dom.parent(rest), None);

        let empty = dom.split_text(rest, 99).unwrap();
        assert_eq!(dom.text(rest), Some("é"));
        assert_eq!(dom.text(empty), Some(""));
    }

    #[test]
    fn test_split_text_rejects_non_text() {
        let mut dom = Dom::new();
        let (_, p, _) = paragraph_with_text(&mut dom);
        let comment = dom.create_comment("c");
        assert_eq!(dom.split_text(p, 1), Err(DomError::NotCharacterData(p)));
        assert_eq!(
            dom.split_text(comment, 1),
            Err(DomError::NotCharacterData(comment))
        );
    }

    #[test]
    fn test_void_tags_are_case_insensitive_and_extensible() {
        let mut dom = Dom::new();
        let br = dom.create_element("BR");
        let embed = dom.create_element("x-embed");

        assert!(dom.is_void(br));
        assert!(!dom.is_void(embed));

        dom.register_void_tag("X-Embed");
        assert!(dom.is_void(embed));
    }

    #[test]
    fn test_hidden_elements() {
        let mut dom = Dom::new();
        let a = dom.create_element("span");
        let b = dom.create_element("span");
        let c = dom.create_element("span");
        let d = dom.create_element("span");
        dom.set_attribute(a, "hidden", "");
        dom.set_attribute(b, "style", "color: red; DISPLAY : None !important");
        dom.set_attribute(c, "style", "display: inline");

        let hidden = |node| match dom.kind(node) {
            NodeKind::Element(element) => element.is_hidden(),
            _ => false,
        };
        assert!(hidden(a));
        assert!(hidden(b));
        assert!(!hidden(c));
        assert!(!hidden(d));
    }

    #[test]
    fn test_descendants_are_pre_order() {
        let mut dom = Dom::new();
        let root = dom.create_element("div");
        let p1 = dom.append_element(root, "p").unwrap();
        let t1 = dom.append_text(p1, "one").unwrap();
        let p2 = dom.append_element(root, "p").unwrap();
        let t2 = dom.append_text(p2, "two").unwrap();

        let order: Vec<_> = dom.descendants(root).collect();
        assert_eq!(order, vec![root, p1, t1, p2, t2]);
        assert_eq!(dom.common_ancestor(t1, t2), Some(root));
        assert_eq!(dom.common_ancestor(t1, p1), Some(p1));
    }

    #[test]
    fn test_slice_text_snaps_to_char_boundaries() {
        let text = "a世b";
        assert_eq!(slice_text(text, 0, 1), "a");
        assert_eq!(slice_text(text, 1, 4), "世");
        // Offset 2 falls inside the 3-byte character
        assert_eq!(slice_text(text, 2, 5), "世b");
        assert_eq!(slice_text(text, 3, 100), "世b");
        assert_eq!(slice_text(text, 4, 2), "");
    }
}
