use std::str::FromStr;

use crate::error::{Result, StoryError};

use super::ViewportState;

/// A position along the vertical extent of an element or of the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Edge {
    Top,
    Center,
    Bottom,
    /// Percentage of the extent, measured from the top.
    Percent(f32),
    /// Pixels from the top.
    Pixels(f32),
}

impl Edge {
    pub fn offset(self, extent: f32) -> f32 {
        match self {
            Edge::Top => 0.0,
            Edge::Center => extent / 2.0,
            Edge::Bottom => extent,
            Edge::Percent(pct) => extent * pct / 100.0,
            Edge::Pixels(px) => px,
        }
    }
}

impl FromStr for Edge {
    type Err = StoryError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || StoryError::InvalidAnchor(s.to_string());
        let number = |text: &str| text.parse::<f32>().ok().filter(|n| n.is_finite());
        match s {
            "top" => Ok(Edge::Top),
            "center" => Ok(Edge::Center),
            "bottom" => Ok(Edge::Bottom),
            _ => {
                if let Some(pct) = s.strip_suffix('%') {
                    number(pct).map(Edge::Percent).ok_or_else(invalid)
                } else {
                    number(s.strip_suffix("px").unwrap_or(s))
                        .map(Edge::Pixels)
                        .ok_or_else(invalid)
                }
            }
        }
    }
}

/// "When this edge of the element meets that edge of the viewport."
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollAnchor {
    pub element: Edge,
    pub viewport: Edge,
}

impl ScrollAnchor {
    pub const fn new(element: Edge, viewport: Edge) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which the two edges line up.
    pub fn scroll_position(&self, element: ElementBox, viewport_height: f32) -> f32 {
        element.top + self.element.offset(element.height) - self.viewport.offset(viewport_height)
    }
}

impl FromStr for ScrollAnchor {
    type Err = StoryError;

    /// Parses `"<element edge> <viewport edge>"`, e.g. `"top top"`,
    /// `"center center"`, `"bottom 80%"`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next(), parts.next()) {
            (Some(element), Some(viewport), None) => Ok(Self {
                element: element.parse()?,
                viewport: viewport.parse()?,
            }),
            _ => Err(StoryError::InvalidAnchor(s.to_string())),
        }
    }
}

/// Page-absolute vertical extent of a trigger element.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementBox {
    pub top: f32,
    pub height: f32,
}

impl ElementBox {
    pub const fn new(top: f32, height: f32) -> Self {
        Self { top, height }
    }
}

/// The scroll range between a start and an end anchor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerRegion {
    pub start: ScrollAnchor,
    pub end: ScrollAnchor,
}

impl TriggerRegion {
    pub fn new(start: &str, end: &str) -> Result<Self> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
        })
    }

    /// Scroll offsets where the region starts and ends.
    pub fn bounds(&self, element: ElementBox, viewport_height: f32) -> (f32, f32) {
        (
            self.start.scroll_position(element, viewport_height),
            self.end.scroll_position(element, viewport_height),
        )
    }

    /// Normalized progress through the region.
    ///
    /// An empty or inverted region behaves as a step at its start.
    pub fn progress(&self, element: ElementBox, viewport: &ViewportState) -> f32 {
        let (start, end) = self.bounds(element, viewport.height);
        if end <= start {
            return if viewport.scroll_y >= start { 1.0 } else { 0.0 };
        }
        ((viewport.scroll_y - start) / (end - start)).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(scroll_y: f32) -> ViewportState {
        ViewportState {
            scroll_y,
            width: 1200.0,
            height: 800.0,
        }
    }

    #[test]
    fn test_parse_anchors() {
        let anchor: ScrollAnchor = "top top".parse().unwrap();
        assert_eq!(anchor, ScrollAnchor::new(Edge::Top, Edge::Top));
        let anchor: ScrollAnchor = "center 80%".parse().unwrap();
        assert_eq!(anchor, ScrollAnchor::new(Edge::Center, Edge::Percent(80.0)));
        let anchor: ScrollAnchor = "bottom 100px".parse().unwrap();
        assert_eq!(anchor, ScrollAnchor::new(Edge::Bottom, Edge::Pixels(100.0)));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "middle top".parse::<ScrollAnchor>(),
            Err(StoryError::InvalidAnchor(_))
        ));
        assert!("top".parse::<ScrollAnchor>().is_err());
        assert!("top top top".parse::<ScrollAnchor>().is_err());
        assert!("top abc%".parse::<ScrollAnchor>().is_err());
    }

    #[test]
    fn test_body_top_top_to_bottom_bottom() {
        // 3200px page in an 800px viewport scrolls 2400px.
        let region = TriggerRegion::new("top top", "bottom bottom").unwrap();
        let body = ElementBox::new(0.0, 3200.0);
        assert_eq!(region.progress(body, &viewport(0.0)), 0.0);
        assert_eq!(region.progress(body, &viewport(1200.0)), 0.5);
        assert_eq!(region.progress(body, &viewport(2400.0)), 1.0);
        assert_eq!(region.progress(body, &viewport(5000.0)), 1.0);
    }

    #[test]
    fn test_center_center_end() {
        let region = TriggerRegion::new("top top", "center center").unwrap();
        let body = ElementBox::new(0.0, 3200.0);
        // Ends when body center (1600) meets viewport center (400).
        assert_eq!(region.bounds(body, 800.0), (0.0, 1200.0));
        assert_eq!(region.progress(body, &viewport(600.0)), 0.5);
    }

    #[test]
    fn test_degenerate_region_is_a_step() {
        let region = TriggerRegion::new("top top", "bottom bottom").unwrap();
        let short = ElementBox::new(0.0, 600.0);
        assert_eq!(region.progress(short, &viewport(0.0)), 1.0);
        let later = ElementBox::new(100.0, 600.0);
        assert_eq!(region.progress(later, &viewport(50.0)), 0.0);
        assert_eq!(region.progress(later, &viewport(100.0)), 1.0);
    }
}
