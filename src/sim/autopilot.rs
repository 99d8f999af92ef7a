//! Demo mode - steer every mirror onto the receiver
//!
//! A plate reflects `i` into `d` (both unit) when its normal is parallel to
//! `i - d`. Used by the headless demo and by tests that need a perfect hit on
//! every frame.

use glam::Vec2;
use std::f32::consts::FRAC_PI_2;

use super::state::Mirror;
use super::vector::{angle, normalize};
use crate::normalize_angle;

/// Plate angle that reflects light from `sun` at `position` onto `target`
///
/// Returns `None` when the target lies straight along the incoming light, where
/// no plate orientation can send the light onward to it.
pub fn aim_angle(position: Vec2, sun: Vec2, target: Vec2) -> Option<f32> {
    let incident = normalize(position - sun);
    let desired = normalize(target - position);
    let normal = incident - desired;

    if normal.length_squared() < 1e-10 {
        return None;
    }
    Some(normalize_angle(angle(normal) + FRAC_PI_2))
}

/// Copy of `mirrors` with every plate aimed at `target`
///
/// Mirrors with no valid aim keep their current angle.
pub fn aim_mirrors(mirrors: &[Mirror], sun: Vec2, target: Vec2) -> Vec<Mirror> {
    mirrors
        .iter()
        .map(|m| {
            let mut aimed = m.clone();
            if let Some(angle) = aim_angle(m.position, sun, target) {
                aimed.angle = angle;
            }
            aimed
        })
        .collect()
}
