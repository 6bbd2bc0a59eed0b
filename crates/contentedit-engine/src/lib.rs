//! Content addressing for an editable document tree.
//!
//! - [`dom`]: the arena-backed tree the editor works on
//! - [`traversal`]: first/last/next/previous leaf in document order
//! - [`position`]: a point in the tree, normalized and totally ordered
//! - [`inline`]: whole-node and partial inline content spans
//! - [`selection`]: ranges and the host capability that applies them
//! - [`surface`]: one editing surface, focus reconciliation and deferred tasks
//! - [`markdown`]: tree construction from Markdown

pub mod dom;
pub mod inline;
pub mod markdown;
pub mod position;
pub mod selection;
pub mod surface;
pub mod traversal;

// Re-export key types for easier usage
pub use dom::{Dom, DomError, NodeId, NodeKind};
pub use inline::{InlineElement, NodeInlineElement, PartialInlineElement};
pub use markdown::{MarkdownDocument, dom_from_markdown, dom_from_markdown_with};
pub use position::{Anchor, Position};
pub use selection::{HostSelection, SelectionRange, SimulatedHost};
pub use surface::{
    EditingSurface, FocusOutcome, SelectionSource, TaskContext, begin_of_content_position,
};
pub use traversal::{first_leaf, last_leaf, leaf_sibling, leaves, should_skip_node};
