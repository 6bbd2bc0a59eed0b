//! # Editing Surface
//!
//! One editing surface instance: the document tree, the content root inside
//! it, the host capability, the cached selection slot and the deferred task
//! queue. This is the only layer with side effects on host state, and it
//! only produces them through [`HostSelection`].
//!
//! ## Cached range
//!
//! A single optional [`SelectionRange`] remembered when focus leaves the
//! surface (see [`EditingSurface::cache_selection`]) and consumed by
//! [`EditingSurface::focus`], which always clears it.
//!
//! ## Versions and deferred tasks
//!
//! Every mutation made through [`EditingSurface::mutate`] bumps a version
//! counter. Deferred tasks capture the version at scheduling time so they can
//! tell whether the tree moved under them before they ran.

mod focus;
mod tasks;

pub use focus::{FocusOutcome, SelectionSource, begin_of_content_position};
pub use tasks::TaskContext;

use std::collections::VecDeque;

use log::debug;

use crate::dom::{Dom, NodeId};
use crate::position::{Anchor, Position};
use crate::selection::{HostSelection, SelectionRange};

use tasks::PendingTask;

pub struct EditingSurface<H: HostSelection> {
    dom: Dom,
    content_root: NodeId,
    host: H,
    cached_range: Option<SelectionRange>,
    version: u64,
    pending: VecDeque<PendingTask<H>>,
}

impl<H: HostSelection> EditingSurface<H> {
    /// `content_root` is the container whose subtree is the editable document
    pub fn new(dom: Dom, content_root: NodeId, host: H) -> Self {
        Self {
            dom,
            content_root,
            host,
            cached_range: None,
            version: 0,
            pending: VecDeque::new(),
        }
    }

    pub fn dom(&self) -> &Dom {
        &self.dom
    }

    pub fn content_root(&self) -> NodeId {
        self.content_root
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Incremented on every [`mutate`](Self::mutate)
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Change the tree. Positions and inline elements taken before the call
    /// are not updated.
    pub fn mutate<R>(&mut self, edit: impl FnOnce(&mut Dom, NodeId) -> R) -> R {
        let result = edit(&mut self.dom, self.content_root);
        self.version += 1;
        result
    }

    /// Whether the host's input focus is inside the content root
    pub fn has_focus(&self) -> bool {
        self.host.has_focus(&self.dom, self.content_root)
    }

    /// The host selection, only when it lies inside the content root
    pub fn live_range(&self) -> Option<SelectionRange> {
        self.host
            .live_range(&self.dom)
            .filter(|range| range.is_within(&self.dom, self.content_root))
    }

    /// Apply `range` as the host selection. Ranges reaching outside the
    /// content root are refused.
    pub fn select_range(&mut self, range: &SelectionRange) -> bool {
        if !range.is_within(&self.dom, self.content_root) {
            debug!("not selecting {range:?}: outside content root");
            return false;
        }
        self.host.apply_range(&self.dom, range)
    }

    /// Place a caret at `node` + `anchor`
    pub fn select_position(&mut self, node: NodeId, anchor: Anchor) -> bool {
        let range = SelectionRange::collapsed(&self.dom, Position::new(node, anchor));
        self.select_range(&range)
    }

    pub fn cached_range(&self) -> Option<SelectionRange> {
        self.cached_range
    }

    pub fn set_cached_range(&mut self, range: Option<SelectionRange>) {
        self.cached_range = range;
    }

    /// Remember the live selection so [`focus`](Self::focus) can restore it.
    /// Call when the surface is about to lose focus.
    pub fn cache_selection(&mut self) -> bool {
        self.cached_range = self.live_range();
        self.cached_range.is_some()
    }

    /// Queue `task` to run after the current turn, see [`run_pending`](Self::run_pending)
    pub fn run_async<F>(&mut self, task: F)
    where
        F: FnOnce(&mut EditingSurface<H>, TaskContext) + 'static,
    {
        let context = TaskContext::new(self.version);
        self.pending.push_back(PendingTask::new(context, task));
    }

    /// Run every task queued before this call, oldest first. Tasks queued
    /// while running wait for the next call. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let batch: Vec<_> = self.pending.drain(..).collect();
        let count = batch.len();
        for task in batch {
            task.run(self);
        }
        if count > 0 {
            debug!("ran {count} deferred task(s), version now {}", self.version);
        }
        count
    }

    pub fn pending_tasks(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::SimulatedHost;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// <body><div>"Hello"</div><aside>"outside"</aside></body>
    fn surface() -> (EditingSurface<SimulatedHost>, NodeId, NodeId) {
        let mut dom = Dom::new();
        let body = dom.create_element("body");
        let content = dom.append_element(body, "div").unwrap();
        let hello = dom.append_text(content, "Hello").unwrap();
        let aside = dom.append_element(body, "aside").unwrap();
        let outside = dom.append_text(aside, "outside").unwrap();
        let host = SimulatedHost::new(body).with_focusable(content);
        (EditingSurface::new(dom, content, host), hello, outside)
    }

    #[test]
    fn test_select_range_refuses_outside_content_root() {
        let (mut surface, hello, outside) = surface();

        assert!(!surface.select_position(outside, Anchor::Begin));
        assert_eq!(surface.host().applied_count(), 0);

        assert!(surface.select_position(hello, Anchor::End));
        assert_eq!(
            surface.live_range().map(|r| r.start()),
            Some(Position::at(hello, 5))
        );
    }

    #[test]
    fn test_live_range_outside_content_root_is_ignored() {
        let (mut surface, _, outside) = surface();
        let range = SelectionRange::collapsed(surface.dom(), Position::at(outside, 1));
        surface.host_mut().set_live_range(Some(range));

        assert_eq!(surface.live_range(), None);
        assert!(!surface.cache_selection());
        assert_eq!(surface.cached_range(), None);
    }

    #[test]
    fn test_cache_selection_stores_live_range() {
        let (mut surface, hello, _) = surface();
        surface.select_position(hello, Anchor::Begin);

        assert!(surface.cache_selection());
        assert_eq!(
            surface.cached_range().map(|r| r.start()),
            Some(Position::at(hello, 0))
        );
    }

    #[test]
    fn test_mutate_bumps_version() {
        let (mut surface, hello, _) = surface();
        assert_eq!(surface.version(), 0);

        surface.mutate(|dom, _| dom.set_text(hello, "Howdy")).unwrap();

        assert_eq!(surface.version(), 1);
        assert_eq!(surface.dom().text(hello), Some("Howdy"));
    }

    #[test]
    fn test_deferred_tasks_run_in_order_after_the_turn() {
        let (mut surface, _, _) = surface();
        let log = Rc::new(RefCell::new(Vec::new()));

        for i in 0..3 {
            let log = Rc::clone(&log);
            surface.run_async(move |_, _| log.borrow_mut().push(i));
        }
        assert!(log.borrow().is_empty());
        assert_eq!(surface.pending_tasks(), 3);

        assert_eq!(surface.run_pending(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert_eq!(surface.run_pending(), 0);
    }

    #[test]
    fn test_tasks_queued_while_running_wait_for_next_turn() {
        let (mut surface, _, _) = surface();
        let ran = Rc::new(RefCell::new(0));

        let outer = Rc::clone(&ran);
        surface.run_async(move |surface, _| {
            *outer.borrow_mut() += 1;
            let inner = Rc::clone(&outer);
            surface.run_async(move |_, _| *inner.borrow_mut() += 10);
        });

        assert_eq!(surface.run_pending(), 1);
        assert_eq!(*ran.borrow(), 1);
        assert_eq!(surface.pending_tasks(), 1);
        assert_eq!(surface.run_pending(), 1);
        assert_eq!(*ran.borrow(), 11);
    }

    #[test]
    fn test_stale_task_detects_intervening_mutation() {
        let (mut surface, hello, _) = surface();
        let outcome = Rc::new(RefCell::new(None));

        let seen = Rc::clone(&outcome);
        surface.run_async(move |surface, ctx| {
            if ctx.is_stale(surface) {
                *seen.borrow_mut() = Some("skipped");
                return;
            }
            surface.mutate(|dom, _| dom.set_text(hello, "formatted")).ok();
            *seen.borrow_mut() = Some("applied");
        });

        // The tree changes between scheduling and execution
        surface.mutate(|dom, _| dom.set_text(hello, "edited")).unwrap();
        surface.run_pending();

        assert_eq!(*outcome.borrow(), Some("skipped"));
        assert_eq!(surface.dom().text(hello), Some("edited"));
    }

    #[test]
    fn test_fresh_task_applies() {
        let (mut surface, hello, _) = surface();

        surface.run_async(move |surface, ctx| {
            if !ctx.is_stale(surface) {
                surface.mutate(|dom, _| dom.set_text(hello, "formatted")).ok();
            }
        });
        surface.run_pending();

        assert_eq!(surface.dom().text(hello), Some("formatted"));
        assert_eq!(surface.version(), 1);
    }
}
