use super::{FitBox, FitConfig};

/// Viewport width classes used by the story frames.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Breakpoint {
    Mobile,
    Tablet,
    Desktop,
}

impl Breakpoint {
    pub fn for_width(width: f32) -> Self {
        if width <= 768.0 {
            Breakpoint::Mobile
        } else if width <= 1024.0 {
            Breakpoint::Tablet
        } else {
            Breakpoint::Desktop
        }
    }
}

/// Responsive geometry of a centered story text frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StoryTextLayout {
    /// Starting font size; fitting only ever shrinks from here.
    pub font_size_px: u32,
    /// Frame width as a fraction of the viewport width.
    pub width_fraction: f32,
    pub height_px: f32,
    pub padding_x: f32,
    pub padding_y: f32,
}

impl StoryTextLayout {
    pub const MIN_FONT_SIZE: u32 = 10;

    pub fn for_breakpoint(breakpoint: Breakpoint) -> Self {
        match breakpoint {
            Breakpoint::Mobile => Self {
                font_size_px: 12,
                width_fraction: 0.95,
                height_px: 280.0,
                padding_x: 40.0,
                padding_y: 60.0,
            },
            Breakpoint::Tablet => Self {
                font_size_px: 24,
                width_fraction: 0.85,
                height_px: 350.0,
                padding_x: 60.0,
                padding_y: 80.0,
            },
            Breakpoint::Desktop => Self {
                font_size_px: 22,
                width_fraction: 0.8,
                height_px: 400.0,
                padding_x: 80.0,
                padding_y: 100.0,
            },
        }
    }

    pub fn for_width(viewport_width: f32) -> Self {
        Self::for_breakpoint(Breakpoint::for_width(viewport_width))
    }

    /// The box text must fit in. Only the frame height constrains it
    /// vertically; padding narrows the wrap width.
    pub fn fit_box(&self, viewport_width: f32) -> FitBox {
        FitBox::new(viewport_width * self.width_fraction, self.height_px)
            .with_padding_xy(self.padding_x, 0.0)
    }

    pub fn fit_config(&self) -> FitConfig {
        FitConfig::new(
            Self::MIN_FONT_SIZE.min(self.font_size_px),
            self.font_size_px,
        )
    }
}
