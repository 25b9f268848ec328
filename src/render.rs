//! Render boundary.
//!
//! The crate never paints. Every visual change is a declarative
//! `set_property(target, property, value)` call on a [`Renderer`], which must
//! make the change visible by the next paint. Targets that do not exist on the
//! renderer side are ignored there.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);
}

/// A length in one of the units the story uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Length {
    /// CSS pixels
    Px(f32),
    /// Percent of viewport height
    Vh(f32),
}

impl Length {
    /// Resolve to pixels against a viewport height.
    pub fn to_px(self, viewport_height: f32) -> f32 {
        match self {
            Length::Px(px) => px,
            Length::Vh(vh) => vh / 100.0 * viewport_height,
        }
    }

    pub(crate) fn same_unit(&self, other: &Length) -> bool {
        matches!(
            (self, other),
            (Length::Px(_), Length::Px(_)) | (Length::Vh(_), Length::Vh(_))
        )
    }
}

/// A value pushed to the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f32),
    Integer(i32),
    Length(Length),
    Color(Color),
    Text(String),
}

impl PropertyValue {
    /// Whether two values can be interpolated into each other.
    pub fn is_compatible(&self, other: &PropertyValue) -> bool {
        match (self, other) {
            (PropertyValue::Number(_), PropertyValue::Number(_))
            | (PropertyValue::Integer(_), PropertyValue::Integer(_))
            | (PropertyValue::Color(_), PropertyValue::Color(_))
            | (PropertyValue::Text(_), PropertyValue::Text(_)) => true,
            (PropertyValue::Length(a), PropertyValue::Length(b)) => a.same_unit(b),
            _ => false,
        }
    }

    pub fn as_number(&self) -> Option<f32> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        PropertyValue::Number(value)
    }
}

/// Unsuffixed float literals default to `f64`.
impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Number(value as f32)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        PropertyValue::Integer(value)
    }
}

impl From<Length> for PropertyValue {
    fn from(value: Length) -> Self {
        PropertyValue::Length(value)
    }
}

impl From<Color> for PropertyValue {
    fn from(value: Color) -> Self {
        PropertyValue::Color(value)
    }
}

/// A named visual property of a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Property {
    Opacity,
    Width,
    Height,
    TranslateY,
    ZIndex,
    Left,
    Bottom,
    FontSize,
    Text,
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Opacity => write!(f, "opacity"),
            Property::Width => write!(f, "width"),
            Property::Height => write!(f, "height"),
            Property::TranslateY => write!(f, "y"),
            Property::ZIndex => write!(f, "z-index"),
            Property::Left => write!(f, "left"),
            Property::Bottom => write!(f, "bottom"),
            Property::FontSize => write!(f, "font-size"),
            Property::Text => write!(f, "text"),
        }
    }
}

/// Identifies an element on the renderer side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(String);

impl TargetId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TargetId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Accepts declarative property updates; each is visible by the next paint.
pub trait Renderer {
    fn set_property(&mut self, target: &TargetId, property: &Property, value: &PropertyValue);
}

/// A renderer shared between the callbacks of one story.
pub type SharedRenderer = Rc<RefCell<dyn Renderer>>;

/// In-memory renderer that keeps the latest value per property and counts
/// writes. Hosts that retain state between frames can render from it; tests
/// inspect it directly.
#[derive(Debug, Default)]
pub struct PropertyStore {
    values: HashMap<(TargetId, Property), PropertyValue>,
    writes: usize,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, target: &str, property: &Property) -> Option<&PropertyValue> {
        self.values.get(&(TargetId::new(target), property.clone()))
    }

    pub fn number(&self, target: &str, property: &Property) -> Option<f32> {
        self.get(target, property).and_then(PropertyValue::as_number)
    }

    pub fn text(&self, target: &str) -> Option<&str> {
        match self.get(target, &Property::Text) {
            Some(PropertyValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    /// Total number of `set_property` calls received.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Renderer for PropertyStore {
    fn set_property(&mut self, target: &TargetId, property: &Property, value: &PropertyValue) {
        self.writes += 1;
        self.values
            .insert((target.clone(), property.clone()), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_resolution() {
        assert_eq!(Length::Vh(50.0).to_px(800.0), 400.0);
        assert_eq!(Length::Px(12.0).to_px(800.0), 12.0);
    }

    #[test]
    fn test_compatibility_requires_same_unit() {
        let px = PropertyValue::Length(Length::Px(0.0));
        let vh = PropertyValue::Length(Length::Vh(50.0));
        assert!(px.is_compatible(&PropertyValue::Length(Length::Px(3.0))));
        assert!(!px.is_compatible(&vh));
        assert!(!PropertyValue::Number(0.0).is_compatible(&PropertyValue::Integer(1)));
    }

    #[test]
    fn test_store_keeps_latest_value() {
        let mut store = PropertyStore::new();
        let target = TargetId::new("beam");
        store.set_property(&target, &Property::Opacity, &PropertyValue::Number(0.2));
        store.set_property(&target, &Property::Opacity, &PropertyValue::Number(0.7));
        assert_eq!(store.number("beam", &Property::Opacity), Some(0.7));
        assert_eq!(store.writes(), 2);
        assert!(store.get("missing", &Property::Opacity).is_none());
    }
}
