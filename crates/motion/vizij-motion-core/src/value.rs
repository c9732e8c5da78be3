//! Interpolatable values.
//!
//! [`Animatable`] is the one capability motions need from a value type:
//! `mix(a, b, t)` with `t` possibly outside [0,1] for extrapolation. Numeric
//! types mix component-wise; discrete types (bool, text, mismatched kinds)
//! hold the left value until `t >= 1`, so a transition always lands on its
//! target.

use std::hash::Hash;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// Values that can be blended along a motion.
pub trait Animatable: Clone + Send + Sync + 'static {
    /// Blend from `self` (t = 0) to `other` (t = 1).
    fn mix(&self, other: &Self, t: f64) -> Self;
}

#[inline]
fn hold<T: Clone>(a: &T, b: &T, t: f64) -> T {
    if t >= 1.0 {
        b.clone()
    } else {
        a.clone()
    }
}

impl Animatable for f64 {
    #[inline]
    fn mix(&self, other: &Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

impl Animatable for f32 {
    #[inline]
    fn mix(&self, other: &Self, t: f64) -> Self {
        lerp_f32(*self, *other, t as f32)
    }
}

impl Animatable for i32 {
    #[inline]
    fn mix(&self, other: &Self, t: f64) -> Self {
        (*self as f64).mix(&(*other as f64), t).round() as i32
    }
}

impl Animatable for i64 {
    #[inline]
    fn mix(&self, other: &Self, t: f64) -> Self {
        (*self as f64).mix(&(*other as f64), t).round() as i64
    }
}

impl Animatable for bool {
    #[inline]
    fn mix(&self, other: &Self, t: f64) -> Self {
        hold(self, other, t)
    }
}

impl Animatable for String {
    #[inline]
    fn mix(&self, other: &Self, t: f64) -> Self {
        hold(self, other, t)
    }
}

impl<T: Animatable, const N: usize> Animatable for [T; N] {
    fn mix(&self, other: &Self, t: f64) -> Self {
        std::array::from_fn(|i| self[i].mix(&other[i], t))
    }
}

impl<T: Animatable> Animatable for Vec<T> {
    /// Element-wise over the common prefix; the unmatched tail comes from
    /// whichever side is current (`other` once `t >= 1`).
    fn mix(&self, other: &Self, t: f64) -> Self {
        let len = if t >= 1.0 { other.len() } else { self.len() };
        (0..len)
            .filter_map(|i| match (self.get(i), other.get(i)) {
                (Some(a), Some(b)) => Some(a.mix(b, t)),
                (Some(a), None) => Some(a.clone()),
                (None, Some(b)) => Some(b.clone()),
                (None, None) => None,
            })
            .collect()
    }
}

impl<T: Animatable> Animatable for Option<T> {
    fn mix(&self, other: &Self, t: f64) -> Self {
        match (self, other) {
            (Some(a), Some(b)) => Some(a.mix(b, t)),
            _ => hold(self, other, t),
        }
    }
}

impl<A: Animatable, B: Animatable> Animatable for (A, B) {
    fn mix(&self, other: &Self, t: f64) -> Self {
        (self.0.mix(&other.0, t), self.1.mix(&other.1, t))
    }
}

impl<A: Animatable, B: Animatable, C: Animatable> Animatable for (A, B, C) {
    fn mix(&self, other: &Self, t: f64) -> Self {
        (
            self.0.mix(&other.0, t),
            self.1.mix(&other.1, t),
            self.2.mix(&other.2, t),
        )
    }
}

impl<K, T> Animatable for HashMap<K, T>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    T: Animatable,
{
    /// Shared keys mix; keys only present in `other` appear once `t >= 1`.
    fn mix(&self, other: &Self, t: f64) -> Self {
        let mut out: HashMap<K, T> = self
            .iter()
            .map(|(k, a)| {
                let v = match other.get(k) {
                    Some(b) => a.mix(b, t),
                    None => a.clone(),
                };
                (k.clone(), v)
            })
            .collect();
        if t >= 1.0 {
            for (k, b) in other {
                out.entry(k.clone()).or_insert_with(|| b.clone());
            }
        }
        out
    }
}

/// Coarse kind of a [`Value`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValueKind {
    Float,
    Bool,
    Vec2,
    Vec3,
    Vec4,
    Quat,
    ColorRgba,
    Transform,
    Vector,
    Text,
}

/// Dynamically typed animatable value. Numeric payloads are f32.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum Value {
    Float(f32),
    /// Held until the end of a transition.
    Bool(bool),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    /// Quaternion (x, y, z, w)
    Quat([f32; 4]),
    /// RGBA color (linear by convention)
    ColorRgba([f32; 4]),
    Transform {
        pos: [f32; 3],
        rot: [f32; 4],
        scale: [f32; 3],
    },
    /// Variable-length numeric vector
    Vector(Vec<f32>),
    /// Held until the end of a transition.
    Text(String),
}

impl Value {
    #[inline]
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Float(_) => ValueKind::Float,
            Value::Bool(_) => ValueKind::Bool,
            Value::Vec2(_) => ValueKind::Vec2,
            Value::Vec3(_) => ValueKind::Vec3,
            Value::Vec4(_) => ValueKind::Vec4,
            Value::Quat(_) => ValueKind::Quat,
            Value::ColorRgba(_) => ValueKind::ColorRgba,
            Value::Transform { .. } => ValueKind::Transform,
            Value::Vector(_) => ValueKind::Vector,
            Value::Text(_) => ValueKind::Text,
        }
    }

    pub fn vec3(x: f32, y: f32, z: f32) -> Self {
        Value::Vec3([x, y, z])
    }

    pub fn quat(x: f32, y: f32, z: f32, w: f32) -> Self {
        Value::Quat([x, y, z, w])
    }

    pub fn transform(pos: [f32; 3], rot: [f32; 4], scale: [f32; 3]) -> Self {
        Value::Transform { pos, rot, scale }
    }

    /// Scalar payload, if this is a float.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl Animatable for Value {
    fn mix(&self, other: &Self, t: f64) -> Self {
        let tf = t as f32;
        match (self, other) {
            (Value::Float(a), Value::Float(b)) => Value::Float(lerp_f32(*a, *b, tf)),
            (Value::Vec2(a), Value::Vec2(b)) => Value::Vec2(lerp_array(a, b, tf)),
            (Value::Vec3(a), Value::Vec3(b)) => Value::Vec3(lerp_array(a, b, tf)),
            (Value::Vec4(a), Value::Vec4(b)) => Value::Vec4(lerp_array(a, b, tf)),
            (Value::Quat(a), Value::Quat(b)) => Value::Quat(nlerp_quat(*a, *b, tf)),
            (Value::ColorRgba(a), Value::ColorRgba(b)) => Value::ColorRgba(lerp_array(a, b, tf)),
            (
                Value::Transform {
                    pos: pa,
                    rot: ra,
                    scale: sa,
                },
                Value::Transform {
                    pos: pb,
                    rot: rb,
                    scale: sb,
                },
            ) => Value::Transform {
                pos: lerp_array(pa, pb, tf),
                rot: nlerp_quat(*ra, *rb, tf),
                scale: lerp_array(sa, sb, tf),
            },
            (Value::Vector(a), Value::Vector(b)) => Value::Vector(a.mix(b, t)),
            // Bool, Text and mismatched kinds.
            _ => hold(self, other, t),
        }
    }
}

#[inline]
fn lerp_f32(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[inline]
fn lerp_array<const N: usize>(a: &[f32; N], b: &[f32; N], t: f32) -> [f32; N] {
    std::array::from_fn(|i| lerp_f32(a[i], b[i], t))
}

#[inline]
fn normalize4(q: [f32; 4]) -> [f32; 4] {
    let len2 = q[0] * q[0] + q[1] * q[1] + q[2] * q[2] + q[3] * q[3];
    if len2 > 0.0 {
        let inv_len = len2.sqrt().recip();
        [q[0] * inv_len, q[1] * inv_len, q[2] * inv_len, q[3] * inv_len]
    } else {
        [0.0, 0.0, 0.0, 1.0]
    }
}

/// Quaternion NLERP with shortest-arc correction; result is normalized.
#[inline]
pub fn nlerp_quat(a: [f32; 4], mut b: [f32; 4], t: f32) -> [f32; 4] {
    let d = a[0] * b[0] + a[1] * b[1] + a[2] * b[2] + a[3] * b[3];
    if d < 0.0 {
        b = [-b[0], -b[1], -b[2], -b[3]];
    }
    normalize4(lerp_array(&a, &b, t))
}
