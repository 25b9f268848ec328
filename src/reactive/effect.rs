use super::owner::{effect_has_owner, register_effect};
use super::runtime::{create_effect_slot, dispose_effect, with_runtime, EffectId};

/// A side effect that re-runs whenever a signal it read last time changes.
///
/// Inside a [`Scope`](super::Scope) the effect belongs to the scope and lives
/// until the scope is disposed; outside one it lives as long as this handle.
pub struct Effect {
    id: EffectId,
}

impl Effect {
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut() + 'static,
    {
        let id = create_effect_slot(Box::new(f));
        register_effect(id);
        Self { id }
    }

    /// Stop the effect now, regardless of ownership.
    pub fn dispose(self) {
        dispose_effect(self.id);
    }

    pub fn is_alive(&self) -> bool {
        with_runtime(|rt| rt.is_effect_alive(self.id))
    }
}

impl Drop for Effect {
    fn drop(&mut self) {
        if !effect_has_owner(self.id) {
            dispose_effect(self.id);
        }
    }
}

pub fn create_effect<F>(f: F) -> Effect
where
    F: FnMut() + 'static,
{
    Effect::new(f)
}
