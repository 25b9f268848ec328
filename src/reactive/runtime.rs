use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};

thread_local! {
    static RUNTIME: RefCell<Runtime> = RefCell::new(Runtime::new());
}

pub type SignalId = usize;
pub type EffectId = usize;

/// Storage slot for an effect callback.
///
/// The callback is moved out while it runs so that it can read and write
/// signals (which need the runtime) without a re-entrant borrow.
enum EffectSlot {
    Idle(Box<dyn FnMut()>),
    Running,
    Disposed,
}

#[derive(Default)]
pub struct Runtime {
    current_effect: Option<EffectId>,
    pending_effects: VecDeque<EffectId>,
    pending_set: HashSet<EffectId>,
    effects: Vec<EffectSlot>,
    effect_dependencies: Vec<HashSet<SignalId>>,
    signal_subscribers: Vec<HashSet<EffectId>>,
    batch_depth: usize,
    flushing: bool,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_signal(&mut self) -> SignalId {
        self.signal_subscribers.push(HashSet::new());
        self.signal_subscribers.len() - 1
    }

    fn allocate_effect(&mut self, callback: Box<dyn FnMut()>) -> EffectId {
        self.effects.push(EffectSlot::Idle(callback));
        self.effect_dependencies.push(HashSet::new());
        self.effects.len() - 1
    }

    pub fn track_read(&mut self, signal_id: SignalId) {
        if let Some(effect_id) = self.current_effect {
            self.signal_subscribers[signal_id].insert(effect_id);
            self.effect_dependencies[effect_id].insert(signal_id);
        }
    }

    fn mark_subscribers(&mut self, signal_id: SignalId) {
        for &effect_id in &self.signal_subscribers[signal_id] {
            if self.pending_set.insert(effect_id) {
                self.pending_effects.push_back(effect_id);
            }
        }
    }

    fn clear_dependencies(&mut self, effect_id: EffectId) {
        let deps = std::mem::take(&mut self.effect_dependencies[effect_id]);
        for signal_id in deps {
            self.signal_subscribers[signal_id].remove(&effect_id);
        }
    }

    /// Mark an effect disposed and hand back its callback.
    fn take_effect(&mut self, effect_id: EffectId) -> Option<Box<dyn FnMut()>> {
        if effect_id >= self.effects.len() {
            return None;
        }
        self.clear_dependencies(effect_id);
        self.pending_set.remove(&effect_id);
        match std::mem::replace(&mut self.effects[effect_id], EffectSlot::Disposed) {
            EffectSlot::Idle(callback) => Some(callback),
            _ => None,
        }
    }

    pub fn is_effect_alive(&self, effect_id: EffectId) -> bool {
        !matches!(self.effects.get(effect_id), Some(EffectSlot::Disposed) | None)
    }
}

pub fn with_runtime<F, R>(f: F) -> R
where
    F: FnOnce(&mut Runtime) -> R,
{
    RUNTIME.with(|rt| f(&mut rt.borrow_mut()))
}

/// Register an effect and run it once to collect its dependencies.
pub(crate) fn create_effect_slot(callback: Box<dyn FnMut()>) -> EffectId {
    let id = with_runtime(|rt| rt.allocate_effect(callback));
    run_effect(id);
    id
}

/// Run an effect with dependency tracking.
pub(crate) fn run_effect(effect_id: EffectId) {
    let (callback, previous) = with_runtime(|rt| {
        rt.clear_dependencies(effect_id);
        let slot = std::mem::replace(&mut rt.effects[effect_id], EffectSlot::Running);
        let callback = match slot {
            EffectSlot::Idle(callback) => Some(callback),
            other => {
                rt.effects[effect_id] = other;
                None
            }
        };
        let previous = rt.current_effect;
        if callback.is_some() {
            rt.current_effect = Some(effect_id);
        }
        (callback, previous)
    });

    let Some(mut callback) = callback else {
        return;
    };
    callback();

    let orphaned = with_runtime(|rt| {
        rt.current_effect = previous;
        if matches!(rt.effects[effect_id], EffectSlot::Running) {
            rt.effects[effect_id] = EffectSlot::Idle(callback);
            None
        } else {
            Some(callback)
        }
    });
    // Disposed while running.
    drop(orphaned);
}

/// Stop an effect for good.
///
/// The callback is dropped after the runtime borrow ends, since whatever it
/// captured may own further effects.
pub(crate) fn dispose_effect(effect_id: EffectId) {
    let callback = with_runtime(|rt| rt.take_effect(effect_id));
    drop(callback);
}

/// Queue every subscriber of a signal and flush unless inside a batch.
pub(crate) fn notify_write(signal_id: SignalId) {
    let should_flush = with_runtime(|rt| {
        rt.mark_subscribers(signal_id);
        rt.batch_depth == 0 && !rt.flushing
    });
    if should_flush {
        flush_effects();
    }
}

/// Run queued effects until the queue drains.
///
/// Effects that write signals queue further effects; those run in the same
/// flush, so every dependent update lands before control returns.
pub(crate) fn flush_effects() {
    with_runtime(|rt| rt.flushing = true);
    loop {
        let next = with_runtime(|rt| {
            let next = rt.pending_effects.pop_front();
            if let Some(id) = next {
                rt.pending_set.remove(&id);
            }
            next
        });
        let Some(effect_id) = next else {
            break;
        };
        let alive = with_runtime(|rt| rt.is_effect_alive(effect_id));
        if alive {
            run_effect(effect_id);
        }
    }
    with_runtime(|rt| rt.flushing = false);
}

/// Run `f` with effect notification deferred until it returns.
pub fn batch<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    with_runtime(|rt| rt.batch_depth += 1);
    let result = f();
    let should_flush = with_runtime(|rt| {
        rt.batch_depth -= 1;
        rt.batch_depth == 0 && !rt.flushing
    });
    if should_flush {
        flush_effects();
    }
    result
}
