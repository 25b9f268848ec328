//! Ownership tree for automatic teardown.
//!
//! Effects and cleanup callbacks created while an owner is current belong to
//! it. Disposing an owner disposes its children first, then runs its cleanups
//! in reverse registration order, then stops its effects. Nothing created under
//! a disposed owner can run afterwards.
//!
//! [`Scope`] is the public handle: every mounted story piece returns one, and
//! dropping it (or calling [`Scope::dispose`]) releases every ticker,
//! subscription and effect the piece created.
//!
//! ```ignore
//! let (typewriter, scope) = Scope::new(|| Typewriter::new(text, &handle, config));
//! typewriter.advance(12);
//! scope.dispose(); // ticker removed, no further ticks reach the text
//! ```

use std::cell::RefCell;

use super::runtime::{dispose_effect, EffectId};

pub type OwnerId = usize;

struct Owner {
    effects: Vec<EffectId>,
    cleanups: Vec<Box<dyn FnOnce()>>,
    children: Vec<OwnerId>,
}

impl Owner {
    fn new() -> Self {
        Self {
            effects: Vec::new(),
            cleanups: Vec::new(),
            children: Vec::new(),
        }
    }
}

struct OwnerArena {
    owners: Vec<Option<Owner>>,
}

impl OwnerArena {
    fn allocate(&mut self) -> OwnerId {
        self.owners.push(Some(Owner::new()));
        self.owners.len() - 1
    }

    fn get_mut(&mut self, id: OwnerId) -> Option<&mut Owner> {
        self.owners.get_mut(id).and_then(|o| o.as_mut())
    }

    fn take(&mut self, id: OwnerId) -> Option<Owner> {
        self.owners.get_mut(id).and_then(|o| o.take())
    }
}

thread_local! {
    static CURRENT_OWNER: RefCell<Option<OwnerId>> = const { RefCell::new(None) };
    static OWNERS: RefCell<OwnerArena> = const { RefCell::new(OwnerArena { owners: Vec::new() }) };
}

/// Allocate an owner as a child of the current one.
fn allocate_owner() -> OwnerId {
    let parent = current_owner();
    OWNERS.with(|owners| {
        let mut owners = owners.borrow_mut();
        let id = owners.allocate();
        if let Some(parent_owner) = parent.and_then(|p| owners.get_mut(p)) {
            parent_owner.children.push(id);
        }
        id
    })
}

/// Run `f` with `owner_id` as the current owner.
fn run_in_owner<T>(owner_id: OwnerId, f: impl FnOnce() -> T) -> T {
    let prev_owner = CURRENT_OWNER.with(|current| current.replace(Some(owner_id)));
    let result = f();
    CURRENT_OWNER.with(|current| *current.borrow_mut() = prev_owner);
    result
}

/// Execute a closure within a new owner scope.
pub(crate) fn with_owner<T>(f: impl FnOnce() -> T) -> (T, OwnerId) {
    let owner_id = allocate_owner();
    (run_in_owner(owner_id, f), owner_id)
}

pub(crate) fn current_owner() -> Option<OwnerId> {
    CURRENT_OWNER.with(|current| *current.borrow())
}

/// Dispose an owner and everything it owns. Disposing twice is a no-op.
pub(crate) fn dispose_owner(id: OwnerId) {
    let Some(owner) = OWNERS.with(|owners| owners.borrow_mut().take(id)) else {
        return;
    };

    for child_id in owner.children {
        dispose_owner(child_id);
    }

    for cleanup in owner.cleanups.into_iter().rev() {
        cleanup();
    }

    for effect_id in owner.effects {
        dispose_effect(effect_id);
    }
}

/// Register a cleanup callback to run when the current owner is disposed.
///
/// Outside any owner the callback is dropped without running; callers that
/// must release a resource regardless keep their own `Drop` path as well.
pub fn on_cleanup(f: impl FnOnce() + 'static) {
    if let Some(owner_id) = current_owner() {
        OWNERS.with(|owners| {
            if let Some(owner) = owners.borrow_mut().get_mut(owner_id) {
                owner.cleanups.push(Box::new(f));
            }
        });
    }
}

pub(crate) fn register_effect(id: EffectId) {
    if let Some(owner_id) = current_owner() {
        OWNERS.with(|owners| {
            if let Some(owner) = owners.borrow_mut().get_mut(owner_id) {
                owner.effects.push(id);
            }
        });
    }
}

pub(crate) fn effect_has_owner(id: EffectId) -> bool {
    OWNERS.with(|owners| {
        owners
            .borrow()
            .owners
            .iter()
            .flatten()
            .any(|owner| owner.effects.contains(&id))
    })
}

/// Dispose handle for everything created inside it.
///
/// Dropping the handle disposes the scope.
pub struct Scope {
    id: OwnerId,
}

impl Scope {
    /// Run `f` inside a fresh scope and return its result with the handle.
    pub fn new<T>(f: impl FnOnce() -> T) -> (T, Scope) {
        let (value, id) = with_owner(f);
        (value, Scope { id })
    }

    /// Run more setup inside this scope.
    pub fn run<T>(&self, f: impl FnOnce() -> T) -> T {
        run_in_owner(self.id, f)
    }

    pub fn is_disposed(&self) -> bool {
        OWNERS.with(|owners| {
            owners
                .borrow()
                .owners
                .get(self.id)
                .map_or(true, Option::is_none)
        })
    }

    /// Cancel every ticker, subscription and effect created under this scope.
    pub fn dispose(self) {
        // Drop does the work.
    }
}

impl Drop for Scope {
    fn drop(&mut self) {
        log::debug!("disposing scope {}", self.id);
        dispose_owner(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::{create_effect, create_signal};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_current_owner_outside_scope() {
        assert!(current_owner().is_none());
    }

    #[test]
    fn test_nested_scopes_dispose_children_first() {
        let order = Rc::new(RefCell::new(Vec::new()));

        let outer_order = order.clone();
        let ((), scope) = Scope::new(|| {
            let o = outer_order.clone();
            on_cleanup(move || o.borrow_mut().push("outer"));
            let ((), inner) = Scope::new(|| {
                let o = outer_order.clone();
                on_cleanup(move || o.borrow_mut().push("inner"));
            });
            // Ownership passes to the parent.
            std::mem::forget(inner);
        });

        scope.dispose();
        assert_eq!(*order.borrow(), vec!["inner", "outer"]);
    }

    #[test]
    fn test_cleanups_run_in_reverse_order() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let o = order.clone();
        let ((), scope) = Scope::new(|| {
            for name in ["first", "second", "third"] {
                let o = o.clone();
                on_cleanup(move || o.borrow_mut().push(name));
            }
        });
        drop(scope);
        assert_eq!(*order.borrow(), vec!["third", "second", "first"]);
    }

    #[test]
    fn test_scoped_effect_stops_after_dispose() {
        let signal = create_signal(0);
        let runs = Rc::new(Cell::new(0));
        let (tracked, runs_in) = (signal.clone(), runs.clone());

        let (effect, scope) = Scope::new(|| {
            create_effect(move || {
                tracked.get();
                runs_in.set(runs_in.get() + 1);
            })
        });
        // The scope owns the effect, dropping the handle keeps it alive.
        drop(effect);
        signal.set(1);
        assert_eq!(runs.get(), 2);

        scope.dispose();
        signal.set(2);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_run_registers_into_existing_scope() {
        let fired = Rc::new(Cell::new(false));
        let ((), scope) = Scope::new(|| {});
        let f = fired.clone();
        scope.run(|| on_cleanup(move || f.set(true)));
        assert!(!scope.is_disposed());
        drop(scope);
        assert!(fired.get());
    }
}
