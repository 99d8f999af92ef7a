//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied frame delta only, no clocks
//! - Stable iteration order (mirrors in id order)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod geometry;
pub mod interaction;
pub mod optics;
pub mod state;
pub mod tick;
pub mod vector;

pub use autopilot::{aim_angle, aim_mirrors};
pub use geometry::{
    deg_to_rad, facing_angle, line_intersects_circle, mirror_normal, rad_to_deg, reflect,
};
pub use interaction::{PointerEvent, handle_pointer, pick_mirror};
pub use optics::{FieldReport, HitTier, MirrorRay, Receiver, evaluate, evaluate_mirror};
pub use state::{GamePhase, GameState, Mirror, Selection, Tower, Viewport, layout_mirrors};
pub use tick::{Frame, TickInput, advance_level, receiver, restart_level, step, sun_position};
pub use vector::Vector2;
