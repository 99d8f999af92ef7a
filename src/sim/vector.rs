//! 2D vector algebra
//!
//! Vectors are `glam::Vec2` values: `+`, `-` and scalar `*` come from glam's
//! operator impls and always return a new value. The helpers here pin down the
//! exact semantics the optics and input code rely on (zero-safe normalize,
//! `atan2` angle convention).

use glam::Vec2;

/// 2D vector type used throughout the simulation
pub type Vector2 = Vec2;

/// Length of `v`
#[inline]
pub fn magnitude(v: Vec2) -> f32 {
    v.length()
}

/// Unit vector in the direction of `v`, or the zero vector when `v` has zero length
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    let len = v.length();
    if len == 0.0 { Vec2::ZERO } else { v / len }
}

#[inline]
pub fn dot(a: Vec2, b: Vec2) -> f32 {
    a.dot(b)
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (b - a).length()
}

/// Direction of `v` as `atan2(y, x)`, in (-π, π]
#[inline]
pub fn angle(v: Vec2) -> f32 {
    v.y.atan2(v.x)
}

/// Unit vector pointing along `theta`
#[inline]
pub fn from_angle(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
