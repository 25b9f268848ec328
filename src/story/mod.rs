//! The story's concrete choreographies.
//!
//! Each preset is built from the generic pieces (scroll triggers, segmented
//! timelines, the typewriter, head projection and text fitting) and mounts
//! into a [`Scope`](crate::reactive::Scope) so one `dispose()` tears down
//! everything it registered.

mod combined;
mod dialog;
mod frame;
mod robot;

pub use combined::{combined_timeline, CombinedStory, TYPING_WINDOW};
pub use dialog::{DialogSequence, MountedDialog};
pub use frame::{MountedFrame, StoryFrame};
pub use robot::{
    head_beam_timeline, model_transform, robot_descent, HeadBeam, DESCENT_DEPTH, MODEL_FACING,
    MODEL_Y_OFFSET,
};

/// The dialog line typed in as the reader scrolls.
pub const DIALOG_TEXT: &str = "With its last energy,\nEMO sends a beacon across the galaxy...";

/// Renderer-side names of the animated elements.
pub mod targets {
    pub const DIALOG: &str = "dialog";
    pub const DIALOG_TEXT: &str = "dialog-text";
    pub const LASER_BEAM: &str = "laser-beam";
    pub const FIRST_SECTION: &str = "first-section";
    pub const SECOND_SECTION: &str = "second-section";
    pub const FOTOR_LASER: &str = "fotor-laser";
    pub const EARTH_GLOW: &str = "earth-glow";
    pub const MESSAGE_CONTAINER: &str = "message-container";
    pub const MESSAGE_TEXT: &str = "message-text";
    pub const BUTTON: &str = "button";
    pub const ROBOT_MODEL: &str = "robot-model";
    pub const HEAD_BEAM: &str = "head-beam";
    pub const STORY_FRAME: &str = "story-frame";
    pub const STORY_TEXT: &str = "story-text";
}
