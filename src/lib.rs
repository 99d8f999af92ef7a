//! Heliostat - steer mirrors to focus sunlight on a solar tower
//!
//! Core modules:
//! - `sim`: Deterministic simulation (vector math, optics, day cycle, input)
//! - `tuning`: Data-driven level balance

pub mod sim;
pub mod tuning;

pub use tuning::{LevelConfig, Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Length of one in-game day at time scale 1.0 (seconds)
    pub const DAY_DURATION_SECONDS: f32 = 30.0;
    /// Largest frame delta the browser loop passes to `step`
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Nominal frame delta (60 fps), used for the first frame and the headless demo
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// Pointer must land within this distance of a mirror anchor to select it
    pub const INTERACTION_RADIUS: f32 = 40.0;

    /// Length of the reflected ray cast from each mirror
    pub const RAY_LENGTH: f32 = 1000.0;
    /// Receiver hit test uses a radius this much larger than the drawn receiver
    pub const HIT_RADIUS_MARGIN: f32 = 1.5;

    /// Alignment above this is a perfect hit
    pub const PERFECT_ALIGNMENT: f32 = 0.99;
    /// Alignment above this (and not perfect) is a partial hit
    pub const PARTIAL_ALIGNMENT: f32 = 0.95;
    /// Energy per frame for a perfect hit
    pub const PERFECT_ENERGY: f32 = 2.0;
    /// Energy per frame for a partial hit
    pub const PARTIAL_ENERGY: f32 = 0.5;

    /// Energy may overshoot the level target up to this factor
    pub const ENERGY_HEADROOM: f32 = 1.1;

    /// Drawn length of a mirror plate
    pub const MIRROR_WIDTH: f32 = 40.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}
