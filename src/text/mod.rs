//! Font-size fitting for text frames.

mod breakpoint;
mod fit;
mod measurer;

pub use breakpoint::{Breakpoint, StoryTextLayout};
pub use fit::{fit_text, FitBox, FitConfig, FitResult};
pub use measurer::CosmicTextMeasurer;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub const fn zero() -> Self {
        Self {
            width: 0.0,
            height: 0.0,
        }
    }
}

/// Lays out text and reports its rendered extent.
pub trait TextMeasure {
    /// Size of `text` at `font_size` px, wrapped at `max_width` when given.
    fn measure(&mut self, text: &str, font_size: f32, max_width: Option<f32>) -> Size;
}
