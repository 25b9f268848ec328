//! Explicit setup and frame pump for a story.
//!
//! A [`Stage`] is created once by the host. It owns the `calloop` event loop
//! that drives typewriter tickers and the single shared [`Viewport`] every
//! scroll trigger subscribes to.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

use calloop::{EventLoop, LoopHandle};

use crate::error::Result;
use crate::reactive::batch;
use crate::scroll::{Viewport, ViewportState};

pub struct StageConfig {
    pub width: f32,
    pub height: f32,
    /// Target time between two frames in [`Stage::run_for`].
    pub frame_interval: Duration,
}

impl Default for StageConfig {
    fn default() -> Self {
        Self {
            width: 1200.0,
            height: 800.0,
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl StageConfig {
    pub fn width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn frame_interval(mut self, frame_interval: Duration) -> Self {
        self.frame_interval = frame_interval;
        self
    }
}

/// A callback that runs every frame after scroll state is committed.
/// Use it for per-frame work such as projecting the head anchor.
pub type FrameCallback = Box<dyn FnMut(&ViewportState)>;

#[derive(Default)]
struct FrameCallbacks {
    next_id: u64,
    entries: Vec<(u64, FrameCallback)>,
    running: bool,
    // Removed while their list was taken out for a frame.
    removed: Vec<u64>,
}

/// Registration of a frame callback. Dropping it keeps the callback.
pub struct FrameHandle {
    id: u64,
    callbacks: Weak<RefCell<FrameCallbacks>>,
}

impl FrameHandle {
    /// Unregister the callback and drop everything it captured.
    pub fn remove(self) {
        let Some(callbacks) = self.callbacks.upgrade() else {
            return;
        };
        let removed = {
            let mut callbacks = callbacks.borrow_mut();
            match callbacks.entries.iter().position(|(id, _)| *id == self.id) {
                Some(index) => Some(callbacks.entries.remove(index)),
                None => {
                    if callbacks.running {
                        callbacks.removed.push(self.id);
                    }
                    None
                }
            }
        };
        drop(removed);
    }
}

pub struct Stage {
    config: StageConfig,
    event_loop: EventLoop<'static, ()>,
    viewport: Viewport,
    on_frame: Rc<RefCell<FrameCallbacks>>,
    frames: u64,
}

impl Stage {
    pub fn new() -> Result<Self> {
        Self::with_config(StageConfig::default())
    }

    pub fn with_config(config: StageConfig) -> Result<Self> {
        let event_loop = EventLoop::try_new()?;
        let viewport = Viewport::new(config.width, config.height);
        log::debug!("stage created at {}x{}", config.width, config.height);
        Ok(Self {
            config,
            event_loop,
            viewport,
            on_frame: Rc::new(RefCell::new(FrameCallbacks::default())),
            frames: 0,
        })
    }

    pub fn config(&self) -> &StageConfig {
        &self.config
    }

    /// Handle for registering timers on the stage's event loop.
    pub fn handle(&self) -> LoopHandle<'static, ()> {
        self.event_loop.handle()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Run `callback` after every committed frame until the handle is removed.
    pub fn on_frame<F: FnMut(&ViewportState) + 'static>(&self, callback: F) -> FrameHandle {
        let mut callbacks = self.on_frame.borrow_mut();
        let id = callbacks.next_id;
        callbacks.next_id += 1;
        callbacks.entries.push((id, Box::new(callback)));
        FrameHandle {
            id,
            callbacks: Rc::downgrade(&self.on_frame),
        }
    }

    /// Number of registered frame callbacks.
    pub fn frame_callback_count(&self) -> usize {
        self.on_frame.borrow().entries.len()
    }

    /// Number of frames pumped so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run one animation frame.
    ///
    /// Commits the coalesced scroll/resize state; every trigger and timeline
    /// that depends on it has been applied when this returns. Frame callbacks
    /// run afterwards. Returns whether the viewport changed.
    pub fn frame(&mut self) -> bool {
        let changed = batch(|| self.viewport.commit());
        let state = self.viewport.state();
        self.run_frame_callbacks(&state);
        self.frames += 1;
        if changed {
            log::trace!("frame {}: scroll_y {}", self.frames, state.scroll_y);
        }
        changed
    }

    fn run_frame_callbacks(&self, state: &ViewportState) {
        let mut running = {
            let mut callbacks = self.on_frame.borrow_mut();
            callbacks.running = true;
            std::mem::take(&mut callbacks.entries)
        };
        for (_, callback) in &mut running {
            callback(state);
        }
        let dropped: Vec<(u64, FrameCallback)> = {
            let mut callbacks = self.on_frame.borrow_mut();
            callbacks.running = false;
            let removed = std::mem::take(&mut callbacks.removed);
            let (dropped, kept): (Vec<_>, Vec<_>) =
                running.into_iter().partition(|(id, _)| removed.contains(id));
            let added = std::mem::replace(&mut callbacks.entries, kept);
            callbacks.entries.extend(added);
            dropped
        };
        drop(dropped);
    }

    /// Run due timers, waiting at most `timeout` for one.
    pub fn dispatch(&mut self, timeout: Option<Duration>) -> Result<()> {
        self.event_loop.dispatch(timeout, &mut ())?;
        Ok(())
    }

    /// Alternate frames and timer dispatch for `duration`.
    pub fn run_for(&mut self, duration: Duration) -> Result<()> {
        let deadline = Instant::now() + duration;
        loop {
            self.frame();
            let now = Instant::now();
            if now >= deadline {
                return Ok(());
            }
            let wait = self.config.frame_interval.min(deadline - now);
            self.dispatch(Some(wait))?;
        }
    }
}
