//! Scroll-driven storytelling primitives.
//!
//! A [`Stage`] owns the event loop and the shared [`Viewport`](scroll::Viewport).
//! Story pieces subscribe to it through [`ScrollTrigger`](scroll::ScrollTrigger)s,
//! fan progress out through [`SegmentedTimeline`](timeline::SegmentedTimeline)s,
//! type text with a [`Typewriter`](typewriter::Typewriter), anchor overlays to a
//! projected 3D head and fit text into fixed boxes. Everything they create lives
//! in a [`Scope`](reactive::Scope) and stops when the scope is disposed.

pub mod animation;
pub mod error;
pub mod projection;
pub mod reactive;
pub mod render;
pub mod scroll;
pub mod stage;
pub mod story;
pub mod text;
pub mod timeline;
pub mod typewriter;

pub use error::{Result, StoryError};
pub use stage::{Stage, StageConfig};

pub mod prelude {
    pub use crate::animation::TimingFunction;
    pub use crate::projection::{
        HeadProjector, PerspectiveCamera, Projector, ProjectorConfig, SceneGraph, StaticScene,
        Transform, Vec3,
    };
    pub use crate::reactive::{
        batch, create_effect, create_signal, on_cleanup, Effect, ReadSignal, Scope, Signal,
    };
    pub use crate::render::{
        Color, Length, Property, PropertyStore, PropertyValue, Renderer, SharedRenderer, TargetId,
    };
    pub use crate::scroll::{ElementBox, FirePolicy, ScrollTrigger, TriggerRegion, Viewport};
    pub use crate::story::{CombinedStory, DialogSequence, HeadBeam, StoryFrame};
    pub use crate::text::{
        fit_text, Breakpoint, CosmicTextMeasurer, FitBox, FitConfig, StoryTextLayout, TextMeasure,
    };
    pub use crate::timeline::{CrossFade, Segment, SegmentedTimeline};
    pub use crate::typewriter::{target_for_progress, Typewriter, TypewriterConfig};
    pub use crate::{Result, Stage, StageConfig, StoryError};
}
