use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping};

use super::{Size, TextMeasure};

/// [`TextMeasure`] backed by `cosmic-text` shaping with system fonts.
pub struct CosmicTextMeasurer {
    font_system: FontSystem,
    line_height: f32,
}

impl CosmicTextMeasurer {
    pub fn new() -> Self {
        Self::with_font_system(FontSystem::new())
    }

    /// Measure with an already loaded font database.
    pub fn with_font_system(font_system: FontSystem) -> Self {
        Self {
            font_system,
            line_height: 1.2,
        }
    }

    /// Line height as a multiple of the font size.
    pub fn with_line_height(mut self, line_height: f32) -> Self {
        self.line_height = line_height;
        self
    }
}

impl Default for CosmicTextMeasurer {
    fn default() -> Self {
        Self::new()
    }
}

impl TextMeasure for CosmicTextMeasurer {
    fn measure(&mut self, text: &str, font_size: f32, max_width: Option<f32>) -> Size {
        let metrics = Metrics::new(font_size, font_size * self.line_height);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        buffer.set_size(&mut self.font_system, max_width, None);
        buffer.set_text(
            &mut self.font_system,
            text,
            &Attrs::new().family(Family::SansSerif),
            Shaping::Advanced,
            None,
        );
        buffer.shape_until_scroll(&mut self.font_system, true);

        let mut width = 0.0f32;
        let mut height = 0.0f32;
        for run in buffer.layout_runs() {
            width = width.max(run.line_w);
            height += run.line_height;
        }

        // Empty text still occupies one line.
        if height == 0.0 {
            height = font_size * self.line_height;
        }

        Size::new(width, height)
    }
}
