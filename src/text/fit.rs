use crate::error::{Result, StoryError};

use super::TextMeasure;

/// A text frame: outer size plus inner padding, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitBox {
    pub width: f32,
    pub height: f32,
    pub padding_x: f32,
    pub padding_y: f32,
}

impl FitBox {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            padding_x: 0.0,
            padding_y: 0.0,
        }
    }

    pub fn with_padding(self, padding: f32) -> Self {
        self.with_padding_xy(padding, padding)
    }

    pub fn with_padding_xy(mut self, padding_x: f32, padding_y: f32) -> Self {
        self.padding_x = padding_x;
        self.padding_y = padding_y;
        self
    }

    pub fn content_width(&self) -> f32 {
        (self.width - 2.0 * self.padding_x).max(0.0)
    }

    pub fn content_height(&self) -> f32 {
        (self.height - 2.0 * self.padding_y).max(0.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitResult {
    pub font_size_px: u32,
    /// False when even the minimum size overflows.
    pub fits: bool,
    /// Number of shrink steps taken.
    pub steps: usize,
}

/// Font-size bounds for one kind of frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitConfig {
    pub min_size: u32,
    pub max_size: u32,
}

impl Default for FitConfig {
    /// The bottom-left dialog's bounds.
    fn default() -> Self {
        Self {
            min_size: 12,
            max_size: 18,
        }
    }
}

impl FitConfig {
    pub fn new(min_size: u32, max_size: u32) -> Self {
        Self { min_size, max_size }
    }

    pub fn fit(
        &self,
        text: &str,
        frame: &FitBox,
        measurer: &mut dyn TextMeasure,
    ) -> Result<FitResult> {
        fit_text(text, frame, self.min_size, self.max_size, measurer)
    }
}

fn shrink(size: u32, min: u32) -> u32 {
    let step = (size as f32 * 0.06).max(1.0);
    ((size as f32 - step).floor() as u32).max(min)
}

/// Largest size from the greedy shrink sequence that fits `frame`.
///
/// Starts at `max` and shrinks by `max(1, 6%)` rounded down, stopping at the
/// first size that fits or at `min`. The sequence is fixed, so results are
/// reproducible for a given measurer even where wrapping makes it
/// non-monotonic.
pub fn fit_text(
    text: &str,
    frame: &FitBox,
    min: u32,
    max: u32,
    measurer: &mut dyn TextMeasure,
) -> Result<FitResult> {
    if min == 0 || min > max {
        return Err(StoryError::InvalidFontRange { min, max });
    }

    let (width, height) = (frame.content_width(), frame.content_height());
    let mut size = max;
    let mut steps = 0;
    loop {
        let measured = measurer.measure(text, size as f32, Some(width));
        let fits = measured.width <= width && measured.height <= height;
        if fits || size <= min {
            log::trace!("fit {:?} at {}px after {} steps (fits: {})", frame, size, steps, fits);
            return Ok(FitResult {
                font_size_px: size,
                fits,
                steps,
            });
        }
        size = shrink(size, min);
        steps += 1;
    }
}
