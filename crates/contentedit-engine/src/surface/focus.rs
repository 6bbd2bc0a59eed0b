use log::{debug, warn};

use crate::dom::{Dom, NodeId, NodeKind};
use crate::position::{Anchor, Position};
use crate::selection::{HostSelection, SelectionRange};
use crate::surface::EditingSurface;
use crate::traversal::first_leaf;

/// Where the selection came from after [`EditingSurface::focus`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    /// Focus and live selection were already in sync; nothing was selected
    InSync,
    /// The cached range was restored
    CachedRange,
    /// Fell back to the beginning of content. `applied` is false when the
    /// host refused the selection.
    ContentBegin { position: Position, applied: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusOutcome {
    pub selection: SelectionSource,
    /// Focus had to be requested on the content root explicitly
    pub forced_focus: bool,
}

/// Caret position at the very beginning of the content under `root`.
///
/// Text leaf: its Begin. Void element: Before it, since a caret cannot sit
/// inside. Other element: its Begin. No leaf at all: Begin of `root`.
pub fn begin_of_content_position(dom: &Dom, root: NodeId) -> Position {
    let Some(leaf) = first_leaf(dom, root) else {
        return Position::new(root, Anchor::Begin);
    };

    match dom.kind(leaf) {
        NodeKind::Text(_) => Position::new(leaf, Anchor::Begin),
        NodeKind::Element(_) if dom.is_void(leaf) => Position::new(leaf, Anchor::Before),
        NodeKind::Element(_) => Position::new(leaf, Anchor::Begin),
        // Not reachable through first_leaf, which skips comments
        NodeKind::Comment(_) => Position::new(leaf, Anchor::Before),
    }
}

impl<H: HostSelection> EditingSurface<H> {
    /// Make sure the surface has input focus and a selection inside it.
    ///
    /// Host focus and host selection normally agree, but can drift apart,
    /// e.g. after a selection is programmatically moved into a node that
    /// cannot take focus: the host still reports focus but there is no caret
    /// to type at. When that happens the cached range is restored, or failing
    /// that the caret goes to the beginning of content. The cached range is
    /// always cleared, and focus is requested on the content root as a last
    /// resort. Every step is best effort; this never fails.
    pub fn focus(&mut self) -> FocusOutcome {
        let in_sync = self.has_focus() && self.live_range().is_some();

        let selection = if in_sync {
            SelectionSource::InSync
        } else if self.restore_cached_range() {
            SelectionSource::CachedRange
        } else {
            let position = begin_of_content_position(self.dom(), self.content_root());
            let caret = SelectionRange::collapsed(self.dom(), position);
            let applied = self.select_range(&caret);
            SelectionSource::ContentBegin { position, applied }
        };

        self.set_cached_range(None);

        let forced_focus = !self.has_focus();
        if forced_focus {
            let root = self.content_root();
            let dom = &self.dom;
            self.host.request_focus(dom, root);
        }

        debug!("focus reconciled: {selection:?}, forced focus: {forced_focus}");
        FocusOutcome {
            selection,
            forced_focus,
        }
    }

    fn restore_cached_range(&mut self) -> bool {
        let Some(range) = self.cached_range() else {
            return false;
        };
        let restored = self.select_range(&range);
        if !restored {
            warn!("cached range {range:?} could not be restored");
        }
        restored
    }
}
