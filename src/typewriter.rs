//! Progress-driven text reveal.
//!
//! Forward motion types one character per tick of a `calloop` timer; backward
//! motion snaps instantly to the previous word boundary. The visible length is
//! the only state, and [`Typewriter::lines`] renders it.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use calloop::timer::{TimeoutAction, Timer};
use calloop::{LoopHandle, RegistrationToken};

use crate::error::{Result, StoryError};
use crate::reactive::{on_cleanup, ReadSignal, Signal};

#[derive(Clone, Debug)]
pub struct TypewriterConfig {
    /// Time between two typed characters.
    pub interval: Duration,
}

impl Default for TypewriterConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(20),
        }
    }
}

impl TypewriterConfig {
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

/// Number of characters to show for a progress value.
pub fn target_for_progress(progress: f32, len: usize) -> usize {
    if !progress.is_finite() {
        return 0;
    }
    ((progress.clamp(0.0, 1.0) * len as f32).floor() as usize).min(len)
}

/// A sub-range of a larger progress over which typing happens.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProgressWindow {
    start: f32,
    end: f32,
}

impl ProgressWindow {
    pub const FULL: ProgressWindow = ProgressWindow {
        start: 0.0,
        end: 1.0,
    };

    pub fn new(start: f32, end: f32) -> Result<Self> {
        if !(start.is_finite() && end.is_finite()) || start < 0.0 || end > 1.0 || end <= start {
            return Err(StoryError::InvalidRange {
                name: "typing window".to_string(),
                start,
                end,
            });
        }
        Ok(Self { start, end })
    }

    /// Remap a global progress into this window, clamped to [0, 1].
    pub fn local(&self, progress: f32) -> f32 {
        ((progress - self.start) / (self.end - self.start)).clamp(0.0, 1.0)
    }

    pub fn target(&self, progress: f32, len: usize) -> usize {
        target_for_progress(self.local(progress), len)
    }
}

struct TypewriterState {
    text: Vec<char>,
    visible: usize,
    target: usize,
    ticker: Option<RegistrationToken>,
    // Bumped whenever a ticker is replaced so a stale callback can tell.
    generation: u64,
    detached: bool,
}

impl TypewriterState {
    fn word_boundary_before(&self, index: usize) -> usize {
        let mut boundary = index.min(self.text.len());
        while boundary > 0 && !self.text[boundary - 1].is_whitespace() {
            boundary -= 1;
        }
        boundary
    }
}

struct Inner {
    state: RefCell<TypewriterState>,
    visible: Signal<usize>,
    handle: LoopHandle<'static, ()>,
    interval: Duration,
}

impl Inner {
    fn cancel_ticker(&self) {
        let token = {
            let mut state = self.state.borrow_mut();
            state.generation += 1;
            state.ticker.take()
        };
        if let Some(token) = token {
            self.handle.remove(token);
        }
    }

    fn publish(&self) {
        let visible = self.state.borrow().visible;
        self.visible.set(visible);
    }

    /// One tick. Returns whether more characters are due.
    fn step(&self) -> bool {
        let more = {
            let mut state = self.state.borrow_mut();
            if state.detached {
                return false;
            }
            if state.visible < state.target {
                state.visible += 1;
            }
            state.visible < state.target
        };
        self.publish();
        more
    }

    fn detach(&self) {
        self.cancel_ticker();
        self.state.borrow_mut().detached = true;
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(token) = self.state.get_mut().ticker.take() {
            self.handle.remove(token);
        }
    }
}

/// Types a fixed string in and out as progress moves.
///
/// Clones share state. The ticker is removed on [`detach`](Self::detach), when
/// the owning [`Scope`](crate::reactive::Scope) is disposed, or when the last
/// clone is dropped; after that nothing mutates the visible text.
#[derive(Clone)]
pub struct Typewriter {
    inner: Rc<Inner>,
}

impl Typewriter {
    pub fn new(text: &str, handle: &LoopHandle<'static, ()>, config: TypewriterConfig) -> Self {
        let inner = Rc::new(Inner {
            state: RefCell::new(TypewriterState {
                text: text.chars().collect(),
                visible: 0,
                target: 0,
                ticker: None,
                generation: 0,
                detached: false,
            }),
            visible: Signal::new(0),
            handle: handle.clone(),
            interval: config.interval,
        });

        let weak = Rc::downgrade(&inner);
        on_cleanup(move || {
            if let Some(inner) = weak.upgrade() {
                log::debug!("typewriter detached by scope");
                inner.detach();
            }
        });

        Self { inner }
    }

    /// Move towards `target` characters.
    ///
    /// Forward targets start a ticker (replacing any running one); backward
    /// targets snap to the word boundary at or before `target`.
    pub fn advance(&self, target: usize) -> Result<()> {
        let (visible, target) = {
            let mut state = self.inner.state.borrow_mut();
            if state.detached {
                log::debug!("ignoring advance on a detached typewriter");
                return Ok(());
            }
            let target = target.min(state.text.len());
            state.target = target;
            (state.visible, target)
        };

        if target > visible {
            self.inner.cancel_ticker();
            self.start_ticker()
        } else if target < visible {
            self.inner.cancel_ticker();
            {
                let mut state = self.inner.state.borrow_mut();
                state.visible = state.word_boundary_before(target);
                log::trace!("typewriter snapped back to {}", state.visible);
            }
            self.inner.publish();
            Ok(())
        } else {
            Ok(())
        }
    }

    fn start_ticker(&self) -> Result<()> {
        let generation = self.inner.state.borrow().generation;
        let weak: Weak<Inner> = Rc::downgrade(&self.inner);
        let interval = self.inner.interval;

        let token = self
            .inner
            .handle
            .insert_source(Timer::from_duration(interval), move |_, _, _| {
                let Some(inner) = weak.upgrade() else {
                    return TimeoutAction::Drop;
                };
                if inner.state.borrow().generation != generation {
                    return TimeoutAction::Drop;
                }
                let more = inner.step();
                let mut state = inner.state.borrow_mut();
                // A subscriber may have restarted or cancelled the ticker.
                if state.generation != generation {
                    return TimeoutAction::Drop;
                }
                if more {
                    TimeoutAction::ToDuration(interval)
                } else {
                    state.ticker = None;
                    TimeoutAction::Drop
                }
            })
            .map_err(|err| StoryError::EventLoop(err.error))?;

        self.inner.state.borrow_mut().ticker = Some(token);
        Ok(())
    }

    /// Show the whole text now and stop ticking.
    pub fn complete(&self) {
        if self.inner.state.borrow().detached {
            return;
        }
        self.inner.cancel_ticker();
        {
            let mut state = self.inner.state.borrow_mut();
            state.visible = state.text.len();
            state.target = state.visible;
        }
        self.inner.publish();
    }

    /// Stop for good; later calls and pending ticks do nothing.
    pub fn detach(&self) {
        self.inner.detach();
    }

    /// Advance by one character without waiting for the timer.
    ///
    /// Returns whether the target is still ahead.
    pub fn tick(&self) -> bool {
        self.inner.step()
    }

    pub fn is_ticking(&self) -> bool {
        self.inner.state.borrow().ticker.is_some()
    }

    pub fn is_detached(&self) -> bool {
        self.inner.state.borrow().detached
    }

    pub fn len(&self) -> usize {
        self.inner.state.borrow().text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn visible_len(&self) -> usize {
        self.inner.state.borrow().visible
    }

    pub fn target(&self) -> usize {
        self.inner.state.borrow().target
    }

    pub fn visible(&self) -> ReadSignal<usize> {
        self.inner.visible.read_only()
    }

    pub fn visible_text(&self) -> String {
        let state = self.inner.state.borrow();
        state.text[..state.visible].iter().collect()
    }

    /// The visible prefix split into rendered lines.
    pub fn lines(&self) -> Vec<String> {
        self.visible_text().split('\n').map(str::to_string).collect()
    }
}
