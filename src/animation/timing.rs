//! Timing functions (easing curves) for scroll-driven tweens.
//!
//! A segment hands its local progress `t` in [0, 1] to a timing function and
//! interpolates with the result.
//!
//! ## Curves
//!
//! - [`TimingFunction::Linear`] - constant rate (`"none"`)
//! - [`TimingFunction::PowerIn`] / [`TimingFunction::PowerOut`] /
//!   [`TimingFunction::PowerInOut`] - polynomial curves of degree `n + 1`, so
//!   `PowerOut(2)` is the cubic ease-out named `"power2.out"`
//! - [`TimingFunction::EaseIn`] / [`TimingFunction::EaseOut`] /
//!   [`TimingFunction::EaseInOut`] - quadratic shorthands
//! - [`TimingFunction::CubicBezier`] - CSS-style cubic bezier curve
//!
//! ```ignore
//! let ease: TimingFunction = "power2.out".parse()?;
//! assert!(ease.evaluate(0.5) > 0.5);
//! ```

use std::str::FromStr;

use crate::error::StoryError;

/// Timing function that controls the animation curve
#[derive(Clone)]
pub enum TimingFunction {
    /// Linear interpolation (constant speed)
    Linear,
    /// Starts slow, ends fast (quadratic)
    EaseIn,
    /// Starts fast, ends slow (quadratic)
    EaseOut,
    /// Slow at both ends (quadratic)
    EaseInOut,
    /// `t^(n+1)`
    PowerIn(u8),
    /// `1 - (1-t)^(n+1)`
    PowerOut(u8),
    /// Symmetric combination of the two
    PowerInOut(u8),
    /// CSS cubic-bezier curve (x1, y1, x2, y2)
    CubicBezier(f32, f32, f32, f32),
}

impl TimingFunction {
    /// Evaluate the curve at `t`, clamped to [0, 1].
    pub fn evaluate(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            TimingFunction::Linear => t,
            TimingFunction::EaseIn => power_in(t, 1),
            TimingFunction::EaseOut => power_out(t, 1),
            TimingFunction::EaseInOut => power_in_out(t, 1),
            TimingFunction::PowerIn(n) => power_in(t, *n),
            TimingFunction::PowerOut(n) => power_out(t, *n),
            TimingFunction::PowerInOut(n) => power_in_out(t, *n),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => cubic_bezier(t, *x1, *y1, *x2, *y2),
        }
    }
}

impl Default for TimingFunction {
    fn default() -> Self {
        TimingFunction::PowerOut(1)
    }
}

impl FromStr for TimingFunction {
    type Err = StoryError;

    /// Parses GSAP-style names: `none`, `linear`, `power2.out`, `power1.inOut`.
    /// A bare `powerN` means `powerN.out`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s {
            "none" | "linear" => return Ok(TimingFunction::Linear),
            "ease-in" => return Ok(TimingFunction::EaseIn),
            "ease-out" => return Ok(TimingFunction::EaseOut),
            "ease-in-out" => return Ok(TimingFunction::EaseInOut),
            _ => {}
        }

        let Some(rest) = s.strip_prefix("power") else {
            return Err(StoryError::InvalidEasing(s.to_string()));
        };
        let (degree, direction) = rest.split_once('.').unwrap_or((rest, "out"));
        let degree: u8 = degree
            .parse()
            .ok()
            .filter(|d| (1..=4).contains(d))
            .ok_or_else(|| StoryError::InvalidEasing(s.to_string()))?;
        match direction {
            "in" => Ok(TimingFunction::PowerIn(degree)),
            "out" => Ok(TimingFunction::PowerOut(degree)),
            "inOut" => Ok(TimingFunction::PowerInOut(degree)),
            _ => Err(StoryError::InvalidEasing(s.to_string())),
        }
    }
}

impl std::fmt::Debug for TimingFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimingFunction::Linear => write!(f, "Linear"),
            TimingFunction::EaseIn => write!(f, "EaseIn"),
            TimingFunction::EaseOut => write!(f, "EaseOut"),
            TimingFunction::EaseInOut => write!(f, "EaseInOut"),
            TimingFunction::PowerIn(n) => write!(f, "power{}.in", n),
            TimingFunction::PowerOut(n) => write!(f, "power{}.out", n),
            TimingFunction::PowerInOut(n) => write!(f, "power{}.inOut", n),
            TimingFunction::CubicBezier(x1, y1, x2, y2) => {
                write!(f, "CubicBezier({}, {}, {}, {})", x1, y1, x2, y2)
            }
        }
    }
}

fn power_in(t: f32, n: u8) -> f32 {
    t.powi(i32::from(n) + 1)
}

fn power_out(t: f32, n: u8) -> f32 {
    1.0 - (1.0 - t).powi(i32::from(n) + 1)
}

fn power_in_out(t: f32, n: u8) -> f32 {
    if t < 0.5 {
        power_in(t * 2.0, n) / 2.0
    } else {
        1.0 - power_in((1.0 - t) * 2.0, n) / 2.0
    }
}

/// Cubic bezier curve evaluation
/// Simplified implementation assuming x1, x2 are in [0, 1]
fn cubic_bezier(t: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // Newton-Raphson on x(s) = t
    let mut s = t;
    for _ in 0..8 {
        let x = bezier_component(s, x1, x2) - t;
        let slope = bezier_slope(s, x1, x2);
        if slope.abs() < 1e-6 {
            break;
        }
        s -= x / slope;
    }
    bezier_component(s, y1, y2)
}

fn bezier_component(s: f32, p1: f32, p2: f32) -> f32 {
    let ms = 1.0 - s;
    3.0 * ms * ms * s * p1 + 3.0 * ms * s * s * p2 + s * s * s
}

fn bezier_slope(s: f32, p1: f32, p2: f32) -> f32 {
    let ms = 1.0 - s;
    3.0 * ms * ms * p1 + 6.0 * ms * s * (p2 - p1) + 3.0 * s * s * (1.0 - p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_endpoints_are_fixed() {
        let curves = [
            TimingFunction::Linear,
            TimingFunction::EaseInOut,
            TimingFunction::PowerIn(3),
            TimingFunction::PowerOut(2),
            TimingFunction::PowerInOut(1),
            TimingFunction::CubicBezier(0.25, 0.1, 0.25, 1.0),
        ];
        for curve in &curves {
            assert!(approx_eq(curve.evaluate(0.0), 0.0), "{:?}", curve);
            assert!(approx_eq(curve.evaluate(1.0), 1.0), "{:?}", curve);
        }
    }

    #[test]
    fn test_power2_out_is_cubic() {
        let v = TimingFunction::PowerOut(2).evaluate(0.5);
        assert!(approx_eq(v, 0.875));
    }

    #[test]
    fn test_in_out_is_symmetric() {
        let ease = TimingFunction::PowerInOut(1);
        assert!(approx_eq(ease.evaluate(0.5), 0.5));
        assert!(approx_eq(ease.evaluate(0.25) + ease.evaluate(0.75), 1.0));
    }

    #[test]
    fn test_input_is_clamped() {
        assert_eq!(TimingFunction::Linear.evaluate(-1.0), 0.0);
        assert_eq!(TimingFunction::Linear.evaluate(2.0), 1.0);
    }

    #[test]
    fn test_parse_gsap_names() {
        assert!(matches!("none".parse::<TimingFunction>(), Ok(TimingFunction::Linear)));
        assert!(matches!("power2.out".parse::<TimingFunction>(), Ok(TimingFunction::PowerOut(2))));
        assert!(matches!("power1.inOut".parse::<TimingFunction>(), Ok(TimingFunction::PowerInOut(1))));
        assert!(matches!("power3".parse::<TimingFunction>(), Ok(TimingFunction::PowerOut(3))));
        assert!("power9.out".parse::<TimingFunction>().is_err());
        assert!("bounce".parse::<TimingFunction>().is_err());
    }

    #[test]
    fn test_unknown_easing_names_the_input() {
        let err = " power2.sideways ".parse::<TimingFunction>().unwrap_err();
        assert!(matches!(&err, StoryError::InvalidEasing(name) if name == "power2.sideways"));
        assert_eq!(err.to_string(), "unknown easing `power2.sideways`");
        assert!(matches!(
            "elastic".parse::<TimingFunction>(),
            Err(StoryError::InvalidEasing(_))
        ));
    }

    #[test]
    fn test_linear_bezier_matches_linear() {
        let v = TimingFunction::CubicBezier(0.0, 0.0, 1.0, 1.0).evaluate(0.3);
        assert!(approx_eq(v, 0.3));
    }
}
