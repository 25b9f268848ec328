//! Single-threaded reactive core.
//!
//! Scroll state, typewriter progress and head anchors are all published as
//! signals; triggers and bindings subscribe through effects, and scopes tie
//! their lifetime to a mounted story piece.

pub mod effect;
pub mod owner;
pub mod runtime;
pub mod signal;

pub use effect::{create_effect, Effect};
pub use owner::{on_cleanup, Scope};
pub use runtime::batch;
pub use signal::{create_signal, ReadSignal, Signal};
