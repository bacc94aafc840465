// SPDX-License-Identifier: MIT OR Apache-2.0
//! Easing curves for keyframe interpolation.
//!
//! Easings are referenced by name from keyframe properties. The supported
//! descriptors are:
//! - `linear`
//! - `easeIn*`, `easeOut*`, `easeInOut*` for `Quad`, `Cubic`, `Quart`,
//!   `Quint`, `Sine`, `Expo`, `Circ`, `Back`, `Elastic` and `Bounce`
//! - the aliases `bounce`, `easeFrom`, `easeTo`, `easeFromTo`, `swingFrom`,
//!   `swingTo` and `swingFromTo`
//! - the CSS keywords `ease`, `ease-in`, `ease-out`, `ease-in-out`
//! - `cubic-bezier(x1, y1, x2, y2)`
//!
//! A descriptor may list several curves separated by whitespace. Each curve
//! then shapes one numeric token of a string value (see [`crate::value`]).

use std::f64::consts::PI;

/// Name of the easing used when none is given
pub const DEFAULT_EASING: &str = "linear";

const BACK_OVERSHOOT: f64 = 1.70158;

/// A single easing curve
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Easing {
    /// Constant rate
    #[default]
    Linear,
    /// Quadratic ease in
    EaseInQuad,
    /// Quadratic ease out
    EaseOutQuad,
    /// Quadratic ease in-out
    EaseInOutQuad,
    /// Cubic ease in
    EaseInCubic,
    /// Cubic ease out
    EaseOutCubic,
    /// Cubic ease in-out
    EaseInOutCubic,
    /// Quartic ease in
    EaseInQuart,
    /// Quartic ease out
    EaseOutQuart,
    /// Quartic ease in-out
    EaseInOutQuart,
    /// Quintic ease in
    EaseInQuint,
    /// Quintic ease out
    EaseOutQuint,
    /// Quintic ease in-out
    EaseInOutQuint,
    /// Sinusoidal ease in
    EaseInSine,
    /// Sinusoidal ease out
    EaseOutSine,
    /// Sinusoidal ease in-out
    EaseInOutSine,
    /// Exponential ease in
    EaseInExpo,
    /// Exponential ease out
    EaseOutExpo,
    /// Exponential ease in-out
    EaseInOutExpo,
    /// Circular ease in
    EaseInCirc,
    /// Circular ease out
    EaseOutCirc,
    /// Circular ease in-out
    EaseInOutCirc,
    /// Overshooting ease in
    EaseInBack,
    /// Overshooting ease out
    EaseOutBack,
    /// Overshooting ease in-out
    EaseInOutBack,
    /// Elastic ease in
    EaseInElastic,
    /// Elastic ease out
    EaseOutElastic,
    /// Elastic ease in-out
    EaseInOutElastic,
    /// Bouncing ease in
    EaseInBounce,
    /// Bouncing ease out
    EaseOutBounce,
    /// Bouncing ease in-out
    EaseInOutBounce,
    /// Steep start (`p^4`)
    EaseFrom,
    /// Steep finish (`p^0.25`)
    EaseTo,
    /// Custom cubic bezier with control points `(x1, y1)` and `(x2, y2)`
    CubicBezier {
        /// First control point x, clamped to `[0, 1]`
        x1: f64,
        /// First control point y
        y1: f64,
        /// Second control point x, clamped to `[0, 1]`
        x2: f64,
        /// Second control point y
        y2: f64,
    },
}

impl Easing {
    /// Look up a curve by descriptor name
    pub fn from_name(name: &str) -> Option<Self> {
        let easing = match name {
            "linear" => Self::Linear,
            "easeInQuad" => Self::EaseInQuad,
            "easeOutQuad" => Self::EaseOutQuad,
            "easeInOutQuad" => Self::EaseInOutQuad,
            "easeInCubic" => Self::EaseInCubic,
            "easeOutCubic" => Self::EaseOutCubic,
            "easeInOutCubic" => Self::EaseInOutCubic,
            "easeInQuart" => Self::EaseInQuart,
            "easeOutQuart" => Self::EaseOutQuart,
            "easeInOutQuart" | "easeFromTo" => Self::EaseInOutQuart,
            "easeInQuint" => Self::EaseInQuint,
            "easeOutQuint" => Self::EaseOutQuint,
            "easeInOutQuint" => Self::EaseInOutQuint,
            "easeInSine" => Self::EaseInSine,
            "easeOutSine" => Self::EaseOutSine,
            "easeInOutSine" => Self::EaseInOutSine,
            "easeInExpo" => Self::EaseInExpo,
            "easeOutExpo" => Self::EaseOutExpo,
            "easeInOutExpo" => Self::EaseInOutExpo,
            "easeInCirc" => Self::EaseInCirc,
            "easeOutCirc" => Self::EaseOutCirc,
            "easeInOutCirc" => Self::EaseInOutCirc,
            "easeInBack" | "swingFrom" => Self::EaseInBack,
            "easeOutBack" | "swingTo" => Self::EaseOutBack,
            "easeInOutBack" | "swingFromTo" => Self::EaseInOutBack,
            "easeInElastic" => Self::EaseInElastic,
            "easeOutElastic" => Self::EaseOutElastic,
            "easeInOutElastic" => Self::EaseInOutElastic,
            "easeInBounce" => Self::EaseInBounce,
            "easeOutBounce" | "bounce" => Self::EaseOutBounce,
            "easeInOutBounce" => Self::EaseInOutBounce,
            "easeFrom" => Self::EaseFrom,
            "easeTo" => Self::EaseTo,
            "ease" => Self::cubic_bezier(0.25, 0.1, 0.25, 1.0),
            "ease-in" => Self::cubic_bezier(0.42, 0.0, 1.0, 1.0),
            "ease-out" => Self::cubic_bezier(0.0, 0.0, 0.58, 1.0),
            "ease-in-out" => Self::cubic_bezier(0.42, 0.0, 0.58, 1.0),
            other => return parse_cubic_bezier(other),
        };
        Some(easing)
    }

    /// Create a cubic bezier curve. The x coordinates are clamped to `[0, 1]`
    /// so that the curve stays a function of time.
    pub fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self::CubicBezier {
            x1: x1.clamp(0.0, 1.0),
            y1,
            x2: x2.clamp(0.0, 1.0),
            y2,
        }
    }

    /// Map linear progress `p` in `[0, 1]` to eased progress.
    ///
    /// Back, elastic and some bezier curves overshoot, so the output may lie
    /// outside `[0, 1]`.
    pub fn ease(&self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);

        match self {
            Self::Linear => p,
            Self::EaseInQuad => ease_in_pow(p, 2),
            Self::EaseOutQuad => ease_out_pow(p, 2),
            Self::EaseInOutQuad => ease_in_out_pow(p, 2),
            Self::EaseInCubic => ease_in_pow(p, 3),
            Self::EaseOutCubic => ease_out_pow(p, 3),
            Self::EaseInOutCubic => ease_in_out_pow(p, 3),
            Self::EaseInQuart => ease_in_pow(p, 4),
            Self::EaseOutQuart => ease_out_pow(p, 4),
            Self::EaseInOutQuart => ease_in_out_pow(p, 4),
            Self::EaseInQuint => ease_in_pow(p, 5),
            Self::EaseOutQuint => ease_out_pow(p, 5),
            Self::EaseInOutQuint => ease_in_out_pow(p, 5),
            Self::EaseInSine => 1.0 - (p * PI / 2.0).cos(),
            Self::EaseOutSine => (p * PI / 2.0).sin(),
            Self::EaseInOutSine => -((PI * p).cos() - 1.0) / 2.0,
            Self::EaseInExpo => {
                if p == 0.0 {
                    0.0
                } else {
                    2f64.powf(10.0 * p - 10.0)
                }
            }
            Self::EaseOutExpo => {
                if p == 1.0 {
                    1.0
                } else {
                    1.0 - 2f64.powf(-10.0 * p)
                }
            }
            Self::EaseInOutExpo => {
                if p == 0.0 || p == 1.0 {
                    p
                } else if p < 0.5 {
                    2f64.powf(20.0 * p - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * p + 10.0)) / 2.0
                }
            }
            Self::EaseInCirc => 1.0 - (1.0 - p * p).sqrt(),
            Self::EaseOutCirc => (1.0 - (p - 1.0).powi(2)).sqrt(),
            Self::EaseInOutCirc => {
                if p < 0.5 {
                    (1.0 - (1.0 - (2.0 * p).powi(2)).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * p + 2.0).powi(2)).sqrt() + 1.0) / 2.0
                }
            }
            Self::EaseInBack => {
                let c3 = BACK_OVERSHOOT + 1.0;
                c3 * p * p * p - BACK_OVERSHOOT * p * p
            }
            Self::EaseOutBack => {
                let c3 = BACK_OVERSHOOT + 1.0;
                1.0 + c3 * (p - 1.0).powi(3) + BACK_OVERSHOOT * (p - 1.0).powi(2)
            }
            Self::EaseInOutBack => {
                let c2 = BACK_OVERSHOOT * 1.525;
                if p < 0.5 {
                    ((2.0 * p).powi(2) * ((c2 + 1.0) * 2.0 * p - c2)) / 2.0
                } else {
                    ((2.0 * p - 2.0).powi(2) * ((c2 + 1.0) * (p * 2.0 - 2.0) + c2) + 2.0) / 2.0
                }
            }
            Self::EaseInElastic => {
                let c4 = (2.0 * PI) / 3.0;
                if p == 0.0 || p == 1.0 {
                    p
                } else {
                    -(2f64.powf(10.0 * p - 10.0)) * ((p * 10.0 - 10.75) * c4).sin()
                }
            }
            Self::EaseOutElastic => {
                let c4 = (2.0 * PI) / 3.0;
                if p == 0.0 || p == 1.0 {
                    p
                } else {
                    2f64.powf(-10.0 * p) * ((p * 10.0 - 0.75) * c4).sin() + 1.0
                }
            }
            Self::EaseInOutElastic => {
                let c5 = (2.0 * PI) / 4.5;
                if p == 0.0 || p == 1.0 {
                    p
                } else if p < 0.5 {
                    -(2f64.powf(20.0 * p - 10.0) * ((20.0 * p - 11.125) * c5).sin()) / 2.0
                } else {
                    (2f64.powf(-20.0 * p + 10.0) * ((20.0 * p - 11.125) * c5).sin()) / 2.0 + 1.0
                }
            }
            Self::EaseInBounce => 1.0 - bounce_out(1.0 - p),
            Self::EaseOutBounce => bounce_out(p),
            Self::EaseInOutBounce => {
                if p < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * p)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * p - 1.0)) / 2.0
                }
            }
            Self::EaseFrom => p.powi(4),
            Self::EaseTo => p.powf(0.25),
            Self::CubicBezier { x1, y1, x2, y2 } => cubic_bezier(*x1, *y1, *x2, *y2, p),
        }
    }
}

/// The parsed form of an easing descriptor: one curve per whitespace
/// separated name. Never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct EasingChain(Vec<Easing>);

impl Default for EasingChain {
    fn default() -> Self {
        Self(vec![Easing::Linear])
    }
}

impl EasingChain {
    /// Parse a descriptor. Unknown names become linear.
    pub fn parse(descriptor: &str) -> Self {
        let curves: Vec<Easing> = split_descriptor(descriptor)
            .into_iter()
            .map(|name| {
                Easing::from_name(name).unwrap_or_else(|| {
                    tracing::warn!("Unknown easing '{}', falling back to linear", name);
                    Easing::Linear
                })
            })
            .collect();

        if curves.is_empty() {
            Self::default()
        } else {
            Self(curves)
        }
    }

    /// The first curve, used for plain numeric values
    pub fn primary(&self) -> Easing {
        self.0.first().copied().unwrap_or_default()
    }

    /// Curve for the `index`-th numeric token; the last curve repeats
    pub fn curve(&self, index: usize) -> Easing {
        self.0
            .get(index)
            .or_else(|| self.0.last())
            .copied()
            .unwrap_or_default()
    }

    /// Number of curves in the chain
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the chain has no curves
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Split on whitespace that is not inside parentheses
fn split_descriptor(descriptor: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start: Option<usize> = None;

    for (i, c) in descriptor.char_indices() {
        match c {
            '(' => {
                depth += 1;
                start.get_or_insert(i);
            }
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                if let Some(s) = start.take() {
                    parts.push(&descriptor[s..i]);
                }
            }
            _ => {
                start.get_or_insert(i);
            }
        }
    }
    if let Some(s) = start {
        parts.push(&descriptor[s..]);
    }

    parts
}

fn parse_cubic_bezier(name: &str) -> Option<Easing> {
    let args = name
        .trim()
        .strip_prefix("cubic-bezier(")?
        .strip_suffix(')')?;

    let values: Vec<f64> = args
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;

    match values.as_slice() {
        [x1, y1, x2, y2] => Some(Easing::cubic_bezier(*x1, *y1, *x2, *y2)),
        _ => None,
    }
}

fn ease_in_pow(p: f64, n: i32) -> f64 {
    p.powi(n)
}

fn ease_out_pow(p: f64, n: i32) -> f64 {
    1.0 - (1.0 - p).powi(n)
}

fn ease_in_out_pow(p: f64, n: i32) -> f64 {
    if p < 0.5 {
        2f64.powi(n - 1) * p.powi(n)
    } else {
        1.0 - (-2.0 * p + 2.0).powi(n) / 2.0
    }
}

fn bounce_out(p: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;

    if p < 1.0 / D1 {
        N1 * p * p
    } else if p < 2.0 / D1 {
        let p = p - 1.5 / D1;
        N1 * p * p + 0.75
    } else if p < 2.5 / D1 {
        let p = p - 2.25 / D1;
        N1 * p * p + 0.9375
    } else {
        let p = p - 2.625 / D1;
        N1 * p * p + 0.984375
    }
}

/// Evaluate a cubic bezier timing curve: solve x(t) = progress with
/// Newton-Raphson, falling back to bisection, then evaluate y(t).
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, progress: f64) -> f64 {
    if progress <= 0.0 {
        return 0.0;
    }
    if progress >= 1.0 {
        return 1.0;
    }

    let t = solve_bezier_x(x1, x2, progress);
    bezier_component(y1, y2, t)
}

fn solve_bezier_x(x1: f64, x2: f64, target_x: f64) -> f64 {
    let mut t = target_x;

    for _ in 0..8 {
        let x = bezier_component(x1, x2, t) - target_x;
        if x.abs() < 1e-7 {
            return t;
        }
        let dx = bezier_derivative(x1, x2, t);
        if dx.abs() < 1e-7 {
            break;
        }
        t = (t - x / dx).clamp(0.0, 1.0);
    }

    let mut lo = 0.0;
    let mut hi = 1.0;
    t = target_x;
    for _ in 0..32 {
        let x = bezier_component(x1, x2, t);
        if (x - target_x).abs() < 1e-7 {
            break;
        }
        if x < target_x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) * 0.5;
    }

    t
}

/// One coordinate of a bezier with end points 0 and 1:
/// `3(1-t)²t·p1 + 3(1-t)t²·p2 + t³`
#[inline]
fn bezier_component(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * t * p1 + 3.0 * mt * t * t * p2 + t * t * t
}

#[inline]
fn bezier_derivative(p1: f64, p2: f64, t: f64) -> f64 {
    let mt = 1.0 - t;
    3.0 * mt * mt * p1 + 6.0 * mt * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_named_curves_hit_endpoints() {
        let names = [
            "linear", "easeInQuad", "easeOutCubic", "easeInOutQuart", "easeInQuint",
            "easeInOutSine", "easeInExpo", "easeOutCirc", "easeInOutBack",
            "easeOutElastic", "easeInOutBounce", "bounce", "easeFrom", "easeTo",
            "ease", "ease-in-out",
        ];
        for name in names {
            let easing = Easing::from_name(name).unwrap();
            assert!(approx(easing.ease(0.0), 0.0), "{name} at 0");
            assert!(approx(easing.ease(1.0), 1.0), "{name} at 1");
        }
    }

    #[test]
    fn test_linear_and_quad_midpoints() {
        assert!(approx(Easing::Linear.ease(0.5), 0.5));
        assert!(approx(Easing::EaseInQuad.ease(0.5), 0.25));
        assert!(approx(Easing::EaseOutQuad.ease(0.5), 0.75));
        assert!(approx(Easing::EaseInOutQuad.ease(0.25), 0.125));
    }

    #[test]
    fn test_aliases() {
        assert_eq!(Easing::from_name("swingTo"), Some(Easing::EaseOutBack));
        assert_eq!(Easing::from_name("easeFromTo"), Some(Easing::EaseInOutQuart));
        assert_eq!(Easing::from_name("bounce"), Some(Easing::EaseOutBounce));
    }

    #[test]
    fn test_cubic_bezier_parsing() {
        let easing = Easing::from_name("cubic-bezier(0.25, 0.25, 0.75, 0.75)").unwrap();
        // Control points on the diagonal make a linear curve
        assert!((easing.ease(0.3) - 0.3).abs() < 1e-4);
        assert!(Easing::from_name("cubic-bezier(1, 2)").is_none());
        assert!(Easing::from_name("cubic-bezier(a,b,c,d)").is_none());
    }

    #[test]
    fn test_unknown_name() {
        assert!(Easing::from_name("wobble").is_none());
        assert_eq!(
            EasingChain::parse("linear wobble"),
            EasingChain(vec![Easing::Linear, Easing::Linear])
        );
        assert_eq!(EasingChain::parse("wobble").primary(), Easing::Linear);
    }

    #[test]
    fn test_chain_splitting() {
        let chain = EasingChain::parse("easeInQuad cubic-bezier(0, 0, 1, 1) easeOutQuad");
        assert_eq!(chain.len(), 3);
        assert_eq!(chain.curve(0), Easing::EaseInQuad);
        assert!(matches!(chain.curve(1), Easing::CubicBezier { .. }));
        assert_eq!(chain.curve(2), Easing::EaseOutQuad);
        // Last curve repeats for extra tokens
        assert_eq!(chain.curve(7), Easing::EaseOutQuad);
    }

    #[test]
    fn test_empty_descriptor_is_linear() {
        let chain = EasingChain::parse("   ");
        assert_eq!(chain.len(), 1);
        assert_eq!(chain.primary(), Easing::Linear);
    }
}
