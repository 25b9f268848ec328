use thiserror::Error;

/// Errors raised while setting up a story.
///
/// Everything here is a configuration mistake caught before the first frame.
/// Runtime misses (an element that is not laid out, a scene node that is not
/// loaded yet) are not errors: the affected animation simply does nothing.
#[derive(Error, Debug)]
pub enum StoryError {
    #[error("segment `{name}` has an invalid progress range [{start}, {end})")]
    InvalidRange { name: String, start: f32, end: f32 },
    #[error("segment `{segment}` animates `{property}` between incompatible values")]
    MismatchedValues { segment: String, property: String },
    #[error("font size range {min}..={max} is empty")]
    InvalidFontRange { min: u32, max: u32 },
    #[error("unrecognised scroll anchor `{0}`")]
    InvalidAnchor(String),
    #[error("unknown easing `{0}`")]
    InvalidEasing(String),
    #[error("event loop error: {0}")]
    EventLoop(#[from] calloop::Error),
}

pub type Result<T> = std::result::Result<T, StoryError>;
