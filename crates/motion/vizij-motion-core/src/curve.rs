//! Cubic-bezier easing curves.
//!
//! - endpoints fixed at (0,0) and (1,1); x = time, y = progress
//! - evaluation inverts x(s) with a closed-form cubic root, then reads y(s)
//! - De Casteljau subdivision with renormalization into the unit square
//! - control-point blending between two curves

use std::f64::consts::PI;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

const EPSILON: f64 = 1e-9;
const COEFF_EPSILON: f64 = 1e-12;
const DISCRIMINANT_EPSILON: f64 = 1e-14;
const ROOT_SLACK: f64 = 1e-7;

/// Control point in curve space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    fn lerp(self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Cubic bezier timing curve with implicit endpoints (0,0) and (1,1).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EasingCurve {
    pub p1: Point,
    pub p2: Point,
}

impl Default for EasingCurve {
    fn default() -> Self {
        Self::LINEAR
    }
}

impl EasingCurve {
    pub const LINEAR: EasingCurve = EasingCurve::new(0.0, 0.0, 1.0, 1.0);
    pub const EASE: EasingCurve = EasingCurve::new(0.25, 0.1, 0.25, 1.0);
    pub const EASE_IN: EasingCurve = EasingCurve::new(0.42, 0.0, 1.0, 1.0);
    pub const EASE_OUT: EasingCurve = EasingCurve::new(0.0, 0.0, 0.58, 1.0);
    pub const EASE_IN_OUT: EasingCurve = EasingCurve::new(0.42, 0.0, 0.58, 1.0);

    /// Control points (x1, y1, x2, y2), CSS order.
    #[inline]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self {
            p1: Point::new(x1, y1),
            p2: Point::new(x2, y2),
        }
    }

    /// True when both control points sit on the diagonal, i.e. y(x) == x.
    #[inline]
    pub fn is_linear(&self) -> bool {
        (self.p1.x - self.p1.y).abs() < EPSILON && (self.p2.x - self.p2.y).abs() < EPSILON
    }

    /// Eased progress for normalized time `t`. Defined on [0,1]; inputs
    /// outside are clamped to the endpoints.
    pub fn evaluate(&self, t: f64) -> f64 {
        if t.is_nan() {
            return t;
        }
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        if self.is_linear() {
            return t;
        }
        let s = self.parameter_at_time(t);
        let y = cubic_bezier(self.p1.y, self.p2.y, s);
        if y.is_finite() {
            y
        } else {
            t
        }
    }

    /// Like [`evaluate`](Self::evaluate) inside [0,1], identity outside so that
    /// callers extrapolate linearly.
    #[inline]
    pub fn ease(&self, t: f64) -> f64 {
        if (0.0..=1.0).contains(&t) {
            self.evaluate(t)
        } else {
            t
        }
    }

    /// Point on the curve at bezier parameter `s`.
    pub fn point_at(&self, s: f64) -> Point {
        Point::new(
            cubic_bezier(self.p1.x, self.p2.x, s),
            cubic_bezier(self.p1.y, self.p2.y, s),
        )
    }

    /// Bezier parameter whose x equals `x`.
    #[inline]
    pub fn parameter_at_time(&self, x: f64) -> f64 {
        solve_parameter(self.p1.x, self.p2.x, x)
    }

    /// Smallest bezier parameter whose y equals `y`.
    #[inline]
    pub fn parameter_at_progress(&self, y: f64) -> f64 {
        solve_parameter(self.p1.y, self.p2.y, y)
    }

    /// De Casteljau subdivision at parameter `k`, each half renormalized into
    /// the unit square. `k <= 0` yields `(linear, self)` and `k >= 1` yields
    /// `(self, linear)`.
    pub fn split_at(&self, k: f64) -> (EasingCurve, EasingCurve) {
        if k.is_nan() || k <= 0.0 {
            return (Self::LINEAR, *self);
        }
        if k >= 1.0 {
            return (*self, Self::LINEAR);
        }
        let p0 = Point::new(0.0, 0.0);
        let p3 = Point::new(1.0, 1.0);
        let p01 = p0.lerp(self.p1, k);
        let p12 = self.p1.lerp(self.p2, k);
        let p23 = self.p2.lerp(p3, k);
        let p012 = p01.lerp(p12, k);
        let p123 = p12.lerp(p23, k);
        let mid = p012.lerp(p123, k);
        (
            Self::renormalized(p0, p01, p012, mid),
            Self::renormalized(mid, p123, p23, p3),
        )
    }

    /// Piece of the curve between parameters `a` and `b`, as a standalone
    /// curve, plus the share of the whole curve's time that piece spans.
    ///
    /// The piece maps local time `(x - x(a)) / width` to local progress
    /// `(y - y(a)) / (y(b) - y(a))`.
    pub fn split(&self, range: RangeInclusive<f64>) -> (EasingCurve, f64) {
        let a = range.start().clamp(0.0, 1.0);
        let b = range.end().clamp(0.0, 1.0);
        if a.is_nan() || b.is_nan() || b <= a {
            return (Self::LINEAR, 0.0);
        }
        let width = self.point_at(b).x - self.point_at(a).x;
        let (_, tail) = self.split_at(a);
        let k = if a < 1.0 { (b - a) / (1.0 - a) } else { 1.0 };
        let (piece, _) = tail.split_at(k);
        (piece, width)
    }

    /// Control points blended towards `other` by `factor`.
    pub fn between(&self, other: &EasingCurve, factor: f64) -> EasingCurve {
        EasingCurve {
            p1: self.p1.lerp(other.p1, factor),
            p2: self.p2.lerp(other.p2, factor),
        }
    }

    #[inline]
    pub fn midpoint(&self, other: &EasingCurve) -> EasingCurve {
        self.between(other, 0.5)
    }

    fn renormalized(start: Point, c1: Point, c2: Point, end: Point) -> EasingCurve {
        let width = end.x - start.x;
        let height = end.y - start.y;
        if width.abs() < EPSILON || height.abs() < EPSILON {
            return Self::LINEAR;
        }
        let map = |p: Point| Point::new((p.x - start.x) / width, (p.y - start.y) / height);
        let curve = EasingCurve {
            p1: map(c1),
            p2: map(c2),
        };
        if [curve.p1.x, curve.p1.y, curve.p2.x, curve.p2.y]
            .iter()
            .all(|v| v.is_finite())
        {
            curve
        } else {
            Self::LINEAR
        }
    }
}

impl fmt::Display for EasingCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cubic-bezier({}, {}, {}, {})",
            self.p1.x, self.p1.y, self.p2.x, self.p2.y
        )
    }
}

impl FromStr for EasingCurve {
    type Err = MotionError;

    /// Accepts preset names and `cubic-bezier(x1, y1, x2, y2)`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim().to_ascii_lowercase();
        match text.as_str() {
            "linear" => return Ok(Self::LINEAR),
            "ease" => return Ok(Self::EASE),
            "ease-in" => return Ok(Self::EASE_IN),
            "ease-out" => return Ok(Self::EASE_OUT),
            "ease-in-out" => return Ok(Self::EASE_IN_OUT),
            _ => {}
        }
        let body = text
            .strip_prefix("cubic-bezier(")
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| MotionError::curve(s, "expected a preset or cubic-bezier(...)"))?;
        let numbers = body
            .split(',')
            .map(|part| part.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| MotionError::curve(s, "control points must be numbers"))?;
        let [x1, y1, x2, y2] = numbers[..] else {
            return Err(MotionError::curve(s, "expected 4 numbers"));
        };
        if ![x1, y1, x2, y2].iter().all(|v| v.is_finite()) {
            return Err(MotionError::curve(s, "control points must be finite"));
        }
        if !(0.0..=1.0).contains(&x1) || !(0.0..=1.0).contains(&x2) {
            return Err(MotionError::curve(s, "x coordinates must lie in [0, 1]"));
        }
        Ok(Self::new(x1, y1, x2, y2))
    }
}

/// One coordinate of the bezier with endpoints 0 and 1.
#[inline]
fn cubic_bezier(c1: f64, c2: f64, s: f64) -> f64 {
    let u = 1.0 - s;
    3.0 * u * u * s * c1 + 3.0 * u * s * s * c2 + s * s * s
}

#[inline]
fn cubic_bezier_slope(c1: f64, c2: f64, s: f64) -> f64 {
    let u = 1.0 - s;
    3.0 * u * u * c1 + 6.0 * u * s * (c2 - c1) + 3.0 * s * s * (1.0 - c2)
}

/// Parameter `s` in [0,1] with `cubic_bezier(c1, c2, s) == target`.
fn solve_parameter(c1: f64, c2: f64, target: f64) -> f64 {
    if target.is_nan() || target <= 0.0 {
        return 0.0;
    }
    if target >= 1.0 {
        return 1.0;
    }
    // s^3 (1 + 3c1 - 3c2) + s^2 (3c2 - 6c1) + s (3c1) - target = 0
    let a = 1.0 + 3.0 * c1 - 3.0 * c2;
    let b = 3.0 * c2 - 6.0 * c1;
    let c = 3.0 * c1;
    let best = cubic_roots(a, b, c, -target)
        .as_slice()
        .iter()
        .filter(|s| s.is_finite() && (-ROOT_SLACK..=1.0 + ROOT_SLACK).contains(*s))
        .map(|s| polish(c1, c2, target, s.clamp(0.0, 1.0)))
        .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.min(s))));
    match best {
        Some(s) if (cubic_bezier(c1, c2, s) - target).abs() < ROOT_SLACK => s,
        _ => bisect(c1, c2, target),
    }
}

fn polish(c1: f64, c2: f64, target: f64, mut s: f64) -> f64 {
    for _ in 0..4 {
        let slope = cubic_bezier_slope(c1, c2, s);
        if slope.abs() < COEFF_EPSILON {
            break;
        }
        let next = s - (cubic_bezier(c1, c2, s) - target) / slope;
        if !next.is_finite() {
            break;
        }
        s = next.clamp(0.0, 1.0);
    }
    s
}

// Endpoints are 0 and 1, so a crossing exists for any target in (0,1).
fn bisect(c1: f64, c2: f64, target: f64) -> f64 {
    let mut lo = 0.0f64;
    let mut hi = 1.0f64;
    for _ in 0..64 {
        let mid = 0.5 * (lo + hi);
        if cubic_bezier(c1, c2, mid) < target {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    0.5 * (lo + hi)
}

#[derive(Default)]
struct Roots {
    values: [f64; 3],
    len: usize,
}

impl Roots {
    fn push(&mut self, v: f64) {
        if self.len < self.values.len() {
            self.values[self.len] = v;
            self.len += 1;
        }
    }

    fn as_slice(&self) -> &[f64] {
        &self.values[..self.len]
    }
}

/// Real roots of `a s^3 + b s^2 + c s + d` (Cardano / trigonometric form).
fn cubic_roots(a: f64, b: f64, c: f64, d: f64) -> Roots {
    let mut roots = Roots::default();
    if a.abs() < COEFF_EPSILON {
        quadratic_roots(b, c, d, &mut roots);
        return roots;
    }
    let (b, c, d) = (b / a, c / a, d / a);
    // depressed cubic u^3 + p u + q with s = u - b/3
    let p = (3.0 * c - b * b) / 3.0;
    let q = (2.0 * b * b * b - 9.0 * b * c + 27.0 * d) / 27.0;
    let shift = -b / 3.0;
    let discriminant = q * q / 4.0 + p * p * p / 27.0;

    if discriminant.abs() < DISCRIMINANT_EPSILON {
        let u = (-q / 2.0).cbrt();
        roots.push(2.0 * u + shift);
        roots.push(-u + shift);
    } else if discriminant > 0.0 {
        let root = discriminant.sqrt();
        let u = (-q / 2.0 + root).cbrt() + (-q / 2.0 - root).cbrt();
        roots.push(u + shift);
    } else {
        let r = (-p / 3.0).sqrt();
        let phi = (-q / (2.0 * r * r * r)).clamp(-1.0, 1.0).acos();
        for k in 0..3 {
            roots.push(2.0 * r * ((phi + 2.0 * PI * k as f64) / 3.0).cos() + shift);
        }
    }
    roots
}

fn quadratic_roots(a: f64, b: f64, c: f64, roots: &mut Roots) {
    if a.abs() < COEFF_EPSILON {
        if b.abs() >= COEFF_EPSILON {
            roots.push(-c / b);
        }
        return;
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant.abs() < DISCRIMINANT_EPSILON {
        roots.push(-b / (2.0 * a));
    } else if discriminant > 0.0 {
        let root = discriminant.sqrt();
        roots.push((-b + root) / (2.0 * a));
        roots.push((-b - root) / (2.0 * a));
    }
}
