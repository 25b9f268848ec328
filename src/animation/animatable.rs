use crate::render::{Color, Length, PropertyValue};

/// Trait for types that can be animated by interpolating between values
pub trait Animatable: Clone + PartialEq + 'static {
    /// Linear interpolation between two values
    /// t = 0.0 returns `from`, t = 1.0 returns `to`
    fn lerp(from: &Self, to: &Self, t: f32) -> Self;
}

impl Animatable for f32 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Animatable for i32 {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        (*from as f32 + (*to - *from) as f32 * t).round() as i32
    }
}

impl Animatable for Color {
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        Color {
            r: f32::lerp(&from.r, &to.r, t),
            g: f32::lerp(&from.g, &to.g, t),
            b: f32::lerp(&from.b, &to.b, t),
            a: f32::lerp(&from.a, &to.a, t),
        }
    }
}

impl Animatable for Length {
    /// Mixed units cannot be interpolated; `from` is kept until `t` reaches 1.
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        match (from, to) {
            (Length::Px(a), Length::Px(b)) => Length::Px(f32::lerp(a, b, t)),
            (Length::Vh(a), Length::Vh(b)) => Length::Vh(f32::lerp(a, b, t)),
            _ if t >= 1.0 => *to,
            _ => *from,
        }
    }
}

impl Animatable for PropertyValue {
    /// Text and mismatched kinds switch discretely at `t >= 1`.
    fn lerp(from: &Self, to: &Self, t: f32) -> Self {
        match (from, to) {
            (PropertyValue::Number(a), PropertyValue::Number(b)) => {
                PropertyValue::Number(f32::lerp(a, b, t))
            }
            (PropertyValue::Integer(a), PropertyValue::Integer(b)) => {
                PropertyValue::Integer(i32::lerp(a, b, t))
            }
            (PropertyValue::Length(a), PropertyValue::Length(b)) => {
                PropertyValue::Length(Length::lerp(a, b, t))
            }
            (PropertyValue::Color(a), PropertyValue::Color(b)) => {
                PropertyValue::Color(Color::lerp(a, b, t))
            }
            _ if t >= 1.0 => to.clone(),
            _ => from.clone(),
        }
    }
}
