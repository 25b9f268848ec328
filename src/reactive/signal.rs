use std::cell::RefCell;
use std::rc::Rc;

use super::runtime::{notify_write, with_runtime, SignalId};

struct SignalInner<T> {
    id: SignalId,
    value: RefCell<T>,
}

/// A reactive value owned by the main thread.
///
/// Reading a signal inside an effect subscribes that effect; writing a
/// different value re-runs every subscriber before `set` returns (or at the
/// end of the enclosing [`batch`](super::batch)).
pub struct Signal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Signal<T> {
    pub fn new(value: T) -> Self {
        let id = with_runtime(|rt| rt.allocate_signal());
        Self {
            inner: Rc::new(SignalInner {
                id,
                value: RefCell::new(value),
            }),
        }
    }

    /// Hand out a handle that can only read.
    pub fn read_only(&self) -> ReadSignal<T> {
        ReadSignal {
            inner: self.inner.clone(),
        }
    }

    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        with_runtime(|rt| rt.track_read(self.inner.id));
        f(&self.inner.value.borrow())
    }

    pub fn with_untracked<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.inner.value.borrow())
    }
}

impl<T: Clone> Signal<T> {
    pub fn get(&self) -> T {
        self.with(T::clone)
    }

    pub fn get_untracked(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T: PartialEq> Signal<T> {
    /// Sets the value, notifying subscribers only if it actually changed.
    pub fn set(&self, value: T) {
        {
            let mut guard = self.inner.value.borrow_mut();
            if *guard == value {
                return;
            }
            *guard = value;
        }
        notify_write(self.inner.id);
    }
}

impl<T: PartialEq + Clone> Signal<T> {
    /// Updates the value in place, notifying subscribers only on change.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut T),
    {
        let changed = {
            let mut guard = self.inner.value.borrow_mut();
            let old_value = guard.clone();
            f(&mut *guard);
            *guard != old_value
        };
        if changed {
            notify_write(self.inner.id);
        }
    }
}

/// Read-only handle to a signal.
pub struct ReadSignal<T> {
    inner: Rc<SignalInner<T>>,
}

impl<T> Clone for ReadSignal<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> ReadSignal<T> {
    pub fn get(&self) -> T {
        with_runtime(|rt| rt.track_read(self.inner.id));
        self.inner.value.borrow().clone()
    }

    pub fn get_untracked(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T> ReadSignal<T> {
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        with_runtime(|rt| rt.track_read(self.inner.id));
        f(&self.inner.value.borrow())
    }
}

pub fn create_signal<T>(value: T) -> Signal<T> {
    Signal::new(value)
}
