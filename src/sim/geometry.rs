//! Geometric primitives for the optics pass
//!
//! Specular reflection, segment/circle intersection and the angle conventions
//! that tie a mirror's rotation to its reflecting face.

use glam::Vec2;
use std::f32::consts::FRAC_PI_2;

use super::vector::{angle, dot, from_angle};

/// Reflect a direction off a surface with the given normal
///
/// Standard reflection: r = i - 2(i·n)n
///
/// Both arguments are expected to be unit vectors. A non-unit normal still gives
/// a well-defined result but not a physical reflection, and is left as-is.
#[inline]
pub fn reflect(incident: Vec2, normal: Vec2) -> Vec2 {
    incident - 2.0 * dot(incident, normal) * normal
}

/// Check whether the segment `p1 -> p2` touches a circle
///
/// Solves |p1 + t(p2 - p1) - center|² = radius² for t and reports a hit when a
/// real root lies in [0, 1]. A zero-length segment never intersects.
pub fn line_intersects_circle(p1: Vec2, p2: Vec2, center: Vec2, radius: f32) -> bool {
    let d = p2 - p1;
    let f = p1 - center;

    let a = dot(d, d);
    if a == 0.0 {
        return false; // Degenerate segment
    }
    let b = 2.0 * dot(f, d);
    let c = dot(f, f) - radius * radius;

    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return false;
    }

    let sqrt_disc = discriminant.sqrt();
    let t1 = (-b - sqrt_disc) / (2.0 * a);
    let t2 = (-b + sqrt_disc) / (2.0 * a);

    (0.0..=1.0).contains(&t1) || (0.0..=1.0).contains(&t2)
}

/// Surface normal of a mirror plate rotated to `mirror_angle`
///
/// The plate is a zero-thickness line; its reflecting face points a quarter
/// turn behind the plate angle.
#[inline]
pub fn mirror_normal(mirror_angle: f32) -> Vec2 {
    from_angle(mirror_angle - FRAC_PI_2)
}

/// Angle of the direction from `anchor` toward `target`
#[inline]
pub fn facing_angle(anchor: Vec2, target: Vec2) -> f32 {
    angle(target - anchor)
}

#[inline]
pub fn deg_to_rad(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}

#[inline]
pub fn rad_to_deg(radians: f32) -> f32 {
    radians * 180.0 / std::f32::consts::PI
}
