use std::cell::Cell;
use std::rc::Rc;

use crate::reactive::{create_signal, ReadSignal, Signal};

/// Scroll offset and viewport size in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportState {
    pub scroll_y: f32,
    pub width: f32,
    pub height: f32,
}

impl ViewportState {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            scroll_y: 0.0,
            width,
            height,
        }
    }
}

/// The one shared scroll/resize observable for a stage.
///
/// Hosts feed raw events through [`scroll_to`](Self::scroll_to) and
/// [`resize`](Self::resize); those only record a pending state. The stage
/// commits at most one state per frame, and every trigger re-evaluates from
/// that single write.
#[derive(Clone)]
pub struct Viewport {
    state: Signal<ViewportState>,
    pending: Rc<Cell<Option<ViewportState>>>,
    subscribers: Rc<Cell<usize>>,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            state: create_signal(ViewportState::new(width, height)),
            pending: Rc::new(Cell::new(None)),
            subscribers: Rc::new(Cell::new(0)),
        }
    }

    /// Last committed state (untracked).
    pub fn state(&self) -> ViewportState {
        self.state.get_untracked()
    }

    pub fn signal(&self) -> ReadSignal<ViewportState> {
        self.state.read_only()
    }

    fn latest(&self) -> ViewportState {
        self.pending.get().unwrap_or_else(|| self.state())
    }

    pub fn scroll_to(&self, scroll_y: f32) {
        if !scroll_y.is_finite() {
            log::warn!("ignoring non-finite scroll offset {}", scroll_y);
            return;
        }
        let mut next = self.latest();
        next.scroll_y = scroll_y.max(0.0);
        self.pending.set(Some(next));
    }

    pub fn resize(&self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log::warn!("ignoring invalid viewport size {}x{}", width, height);
            return;
        }
        let mut next = self.latest();
        next.width = width;
        next.height = height;
        self.pending.set(Some(next));
    }

    pub fn has_pending(&self) -> bool {
        self.pending.get().is_some()
    }

    /// Publish the pending state, running every subscriber synchronously.
    ///
    /// Returns whether anything was pending.
    pub fn commit(&self) -> bool {
        match self.pending.take() {
            Some(next) => {
                self.state.set(next);
                true
            }
            None => false,
        }
    }

    /// Number of live triggers subscribed to this viewport.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.get()
    }

    pub(crate) fn subscribe(&self) -> Subscription {
        self.subscribers.set(self.subscribers.get() + 1);
        Subscription {
            count: self.subscribers.clone(),
        }
    }
}

/// Counts one subscriber for as long as it lives.
pub(crate) struct Subscription {
    count: Rc<Cell<usize>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.count.set(self.count.get().saturating_sub(1));
    }
}
