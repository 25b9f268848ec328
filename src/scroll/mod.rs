//! Scroll-progress mapping.
//!
//! A single [`Viewport`] collects scroll and resize events and commits them
//! once per frame. Each [`ScrollTrigger`] turns the committed state into a
//! clamped progress value for its [`TriggerRegion`] and fires its callbacks.

mod anchor;
mod trigger;
mod viewport;

pub use anchor::{Edge, ElementBox, ScrollAnchor, TriggerRegion};
pub use trigger::{EdgeTracker, FirePolicy, Fired, LayoutSource, ScrollTrigger, TriggerBuilder};
pub use viewport::{Viewport, ViewportState};
