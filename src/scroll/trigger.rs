use bitflags::bitflags;

use crate::reactive::{create_effect, create_signal, Effect, ReadSignal, Signal};

use super::viewport::Subscription;
use super::{ElementBox, TriggerRegion, Viewport, ViewportState};

bitflags! {
    /// One-shot callbacks that have already fired.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct Fired: u8 {
        const ENTERED   = 0b01;
        const COMPLETED = 0b10;
    }
}

/// Whether one-shot callbacks may fire again after progress retreats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FirePolicy {
    /// `on_enter` and `on_complete` fire at most once per trigger.
    #[default]
    Once,
    /// `on_enter` re-arms when progress returns to 0, `on_complete` when it
    /// drops below 1.
    EachPass,
}

/// Detects the 0 → >0 and → 1 crossings, even when a single update skips
/// straight from 0 to 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct EdgeTracker {
    fired: Fired,
    policy: FirePolicy,
}

impl EdgeTracker {
    pub fn new(policy: FirePolicy) -> Self {
        Self {
            fired: Fired::empty(),
            policy,
        }
    }

    /// Returns `(entered, completed)` for this update.
    pub fn update(&mut self, progress: f32) -> (bool, bool) {
        if self.policy == FirePolicy::EachPass {
            if progress <= 0.0 {
                self.fired.remove(Fired::ENTERED);
            }
            if progress < 1.0 {
                self.fired.remove(Fired::COMPLETED);
            }
        }

        let entered = progress > 0.0 && !self.fired.contains(Fired::ENTERED);
        if entered {
            self.fired.insert(Fired::ENTERED);
        }
        let completed = progress >= 1.0 && !self.fired.contains(Fired::COMPLETED);
        if completed {
            self.fired.insert(Fired::COMPLETED);
        }
        (entered, completed)
    }

    pub fn fired(&self) -> Fired {
        self.fired
    }
}

/// Supplies the trigger element's box for the current viewport.
///
/// `None` means the element is not present; the trigger then does nothing.
pub trait LayoutSource {
    fn element_box(&self, viewport: &ViewportState) -> Option<ElementBox>;
}

impl LayoutSource for ElementBox {
    fn element_box(&self, _viewport: &ViewportState) -> Option<ElementBox> {
        Some(*self)
    }
}

impl<F> LayoutSource for F
where
    F: Fn(&ViewportState) -> Option<ElementBox>,
{
    fn element_box(&self, viewport: &ViewportState) -> Option<ElementBox> {
        self(viewport)
    }
}

type ProgressCallback = Box<dyn FnMut(f32)>;
type EdgeCallback = Box<dyn FnMut()>;

pub struct TriggerBuilder {
    region: TriggerRegion,
    layout: Box<dyn LayoutSource>,
    policy: FirePolicy,
    on_progress: Option<ProgressCallback>,
    on_enter: Option<EdgeCallback>,
    on_complete: Option<EdgeCallback>,
}

impl TriggerBuilder {
    pub fn on_progress(mut self, f: impl FnMut(f32) + 'static) -> Self {
        self.on_progress = Some(Box::new(f));
        self
    }

    pub fn on_enter(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_enter = Some(Box::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(f));
        self
    }

    pub fn policy(mut self, policy: FirePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Subscribe to the viewport and evaluate once immediately.
    ///
    /// Inside a [`Scope`](crate::reactive::Scope) the subscription lives until
    /// the scope is disposed; otherwise until the returned trigger is dropped.
    pub fn attach(self, viewport: &Viewport) -> ScrollTrigger {
        let progress = create_signal(0.0f32);
        let mut runner = TriggerRunner {
            region: self.region,
            layout: self.layout,
            tracker: EdgeTracker::new(self.policy),
            on_progress: self.on_progress,
            on_enter: self.on_enter,
            on_complete: self.on_complete,
            progress: progress.clone(),
            _subscription: viewport.subscribe(),
        };
        let state = viewport.signal();
        let effect = create_effect(move || {
            let current = state.get();
            runner.evaluate(&current);
        });
        log::debug!(
            "scroll trigger attached ({} subscribers)",
            viewport.subscriber_count()
        );
        ScrollTrigger {
            progress: progress.read_only(),
            _effect: effect,
        }
    }
}

struct TriggerRunner {
    region: TriggerRegion,
    layout: Box<dyn LayoutSource>,
    tracker: EdgeTracker,
    on_progress: Option<ProgressCallback>,
    on_enter: Option<EdgeCallback>,
    on_complete: Option<EdgeCallback>,
    progress: Signal<f32>,
    _subscription: Subscription,
}

impl TriggerRunner {
    fn evaluate(&mut self, viewport: &ViewportState) {
        let Some(element) = self.layout.element_box(viewport) else {
            log::debug!("scroll trigger element missing, skipping update");
            return;
        };
        let progress = self.region.progress(element, viewport);
        self.progress.set(progress);

        let (entered, completed) = self.tracker.update(progress);
        if entered {
            if let Some(f) = self.on_enter.as_mut() {
                f();
            }
        }
        if let Some(f) = self.on_progress.as_mut() {
            f(progress);
        }
        if completed {
            if let Some(f) = self.on_complete.as_mut() {
                f();
            }
        }
    }
}

/// Maps the shared viewport onto progress through one region.
pub struct ScrollTrigger {
    progress: ReadSignal<f32>,
    _effect: Effect,
}

impl ScrollTrigger {
    pub fn builder(region: TriggerRegion, layout: impl LayoutSource + 'static) -> TriggerBuilder {
        TriggerBuilder {
            region,
            layout: Box::new(layout),
            policy: FirePolicy::default(),
            on_progress: None,
            on_enter: None,
            on_complete: None,
        }
    }

    pub fn progress(&self) -> ReadSignal<f32> {
        self.progress.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::Scope;
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn body_region() -> TriggerRegion {
        TriggerRegion::new("top top", "bottom bottom").unwrap()
    }

    // 2400px of scroll in an 800px viewport.
    const BODY: ElementBox = ElementBox::new(0.0, 3200.0);

    #[test]
    fn test_edge_tracker_once() {
        let mut tracker = EdgeTracker::new(FirePolicy::Once);
        assert_eq!(tracker.update(0.0), (false, false));
        assert_eq!(tracker.update(0.1), (true, false));
        assert_eq!(tracker.update(0.0), (false, false));
        assert_eq!(tracker.update(0.2), (false, false));
        assert_eq!(tracker.update(1.0), (false, true));
        assert_eq!(tracker.update(0.5), (false, false));
        assert_eq!(tracker.update(1.0), (false, false));
        assert_eq!(tracker.fired(), Fired::all());
    }

    #[test]
    fn test_edge_tracker_each_pass() {
        let mut tracker = EdgeTracker::new(FirePolicy::EachPass);
        assert_eq!(tracker.update(0.1), (true, false));
        assert_eq!(tracker.update(0.0), (false, false));
        assert_eq!(tracker.update(0.3), (true, false));
        assert_eq!(tracker.update(1.0), (false, true));
        assert_eq!(tracker.update(0.9), (false, false));
        assert_eq!(tracker.update(1.0), (false, true));
    }

    #[test]
    fn test_skipped_frames_fire_both_in_order() {
        let mut tracker = EdgeTracker::new(FirePolicy::Once);
        assert_eq!(tracker.update(1.0), (true, true));
    }

    #[test]
    fn test_trigger_reports_progress_and_edges() {
        let viewport = Viewport::new(1200.0, 800.0);
        let log = Rc::new(RefCell::new(Vec::new()));
        let (l1, l2, l3) = (log.clone(), log.clone(), log.clone());

        let trigger = ScrollTrigger::builder(body_region(), BODY)
            .on_enter(move || l1.borrow_mut().push("enter".to_string()))
            .on_progress(move |p| l2.borrow_mut().push(format!("{:.2}", p)))
            .on_complete(move || l3.borrow_mut().push("complete".to_string()))
            .attach(&viewport);

        viewport.scroll_to(2400.0);
        viewport.commit();

        assert_eq!(trigger.progress().get(), 1.0);
        assert_eq!(*log.borrow(), vec!["0.00", "enter", "1.00", "complete"]);
    }

    #[test]
    fn test_missing_element_is_a_no_op() {
        let viewport = Viewport::new(1200.0, 800.0);
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let trigger = ScrollTrigger::builder(body_region(), |_: &ViewportState| None)
            .on_progress(move |_| c.set(c.get() + 1))
            .attach(&viewport);
        viewport.scroll_to(500.0);
        viewport.commit();
        assert_eq!(calls.get(), 0);
        assert_eq!(trigger.progress().get(), 0.0);
    }

    #[test]
    fn test_resize_recomputes_progress() {
        let viewport = Viewport::new(1200.0, 800.0);
        let trigger = ScrollTrigger::builder(body_region(), BODY).attach(&viewport);
        viewport.scroll_to(1200.0);
        viewport.commit();
        assert_eq!(trigger.progress().get(), 0.5);

        // Taller viewport leaves less to scroll: 3200 - 1600 = 1600.
        viewport.resize(1200.0, 1600.0);
        viewport.commit();
        assert_eq!(trigger.progress().get(), 0.75);
    }

    #[test]
    fn test_scope_dispose_unsubscribes() {
        let viewport = Viewport::new(1200.0, 800.0);
        let calls = Rc::new(Cell::new(0));
        let c = calls.clone();
        let (_trigger, scope) = Scope::new(|| {
            ScrollTrigger::builder(body_region(), BODY)
                .on_progress(move |_| c.set(c.get() + 1))
                .attach(&viewport)
        });
        assert_eq!(viewport.subscriber_count(), 1);
        assert_eq!(calls.get(), 1);

        scope.dispose();
        assert_eq!(viewport.subscriber_count(), 0);
        viewport.scroll_to(100.0);
        viewport.commit();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_dropping_unscoped_trigger_unsubscribes() {
        let viewport = Viewport::new(1200.0, 800.0);
        let trigger = ScrollTrigger::builder(body_region(), BODY).attach(&viewport);
        assert_eq!(viewport.subscriber_count(), 1);
        drop(trigger);
        assert_eq!(viewport.subscriber_count(), 0);
    }
}
