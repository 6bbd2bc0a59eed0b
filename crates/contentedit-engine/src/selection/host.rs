use std::collections::BTreeSet;

use log::debug;

use crate::dom::{Dom, NodeId};
use crate::selection::SelectionRange;

/// The host's focus and selection state, as seen by the editing surface.
///
/// The surface never touches host state directly; everything goes through
/// this capability so reconciliation can run against a fake host.
pub trait HostSelection {
    /// The host's current selection, if it has a usable one
    fn live_range(&self, dom: &Dom) -> Option<SelectionRange>;

    /// Make `range` the host selection. `false` when the host refuses it.
    fn apply_range(&mut self, dom: &Dom, range: &SelectionRange) -> bool;

    /// Whether input focus is currently inside `root`
    fn has_focus(&self, dom: &Dom, root: NodeId) -> bool;

    /// Ask the host to move input focus to `node`
    fn request_focus(&mut self, dom: &Dom, node: NodeId);
}

/// In-memory host used by tests and the inspector.
///
/// Tracks an active (focused) node and a live range, and reproduces the
/// drift between the two: a selection placed inside a node that is not
/// focusable leaves the active node where it was.
#[derive(Debug, Clone)]
pub struct SimulatedHost {
    document_root: NodeId,
    focusable: BTreeSet<NodeId>,
    active: Option<NodeId>,
    live: Option<SelectionRange>,
    focus_follows_selection: bool,
    applied: usize,
}

impl SimulatedHost {
    /// A host whose document is the tree rooted at `document_root`
    pub fn new(document_root: NodeId) -> Self {
        Self {
            document_root,
            focusable: BTreeSet::new(),
            active: None,
            live: None,
            focus_follows_selection: true,
            applied: 0,
        }
    }

    /// Mark `node` as able to take input focus (e.g. the editable content root)
    pub fn with_focusable(mut self, node: NodeId) -> Self {
        self.focusable.insert(node);
        self
    }

    /// When off, applying a selection never moves focus, as on hosts that
    /// refuse to focus through selection alone
    pub fn set_focus_follows_selection(&mut self, follows: bool) {
        self.focus_follows_selection = follows;
    }

    pub fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    /// Force the active element, e.g. to simulate focus moving elsewhere
    pub fn set_active_element(&mut self, node: Option<NodeId>) {
        self.active = node;
    }

    /// Replace the selection without touching focus, as a programmatic
    /// selection change would
    pub fn set_live_range(&mut self, range: Option<SelectionRange>) {
        self.live = range;
    }

    /// Focus leaves the document; the selection is kept
    pub fn blur(&mut self) {
        self.active = None;
    }

    /// Number of ranges successfully applied so far
    pub fn applied_count(&self) -> usize {
        self.applied
    }

    fn is_attached(&self, dom: &Dom, node: NodeId) -> bool {
        dom.contains(self.document_root, node)
    }
}

impl HostSelection for SimulatedHost {
    fn live_range(&self, dom: &Dom) -> Option<SelectionRange> {
        // A range whose nodes were removed is no longer live
        self.live
            .filter(|range| range.is_within(dom, self.document_root))
    }

    fn apply_range(&mut self, dom: &Dom, range: &SelectionRange) -> bool {
        if !range.is_within(dom, self.document_root) {
            debug!("host refused range {:?}: not attached", range);
            return false;
        }

        self.live = Some(*range);
        self.applied += 1;

        if self.focus_follows_selection
            && let Some(target) = dom
                .ancestors(range.start().node())
                .find(|n| self.focusable.contains(n))
        {
            self.active = Some(target);
        }
        true
    }

    fn has_focus(&self, dom: &Dom, root: NodeId) -> bool {
        self.active
            .is_some_and(|active| self.is_attached(dom, active) && dom.contains(root, active))
    }

    fn request_focus(&mut self, dom: &Dom, node: NodeId) {
        if self.focusable.contains(&node) && self.is_attached(dom, node) {
            self.active = Some(node);
        } else {
            debug!("host ignored focus request for {node}");
        }
    }
}
