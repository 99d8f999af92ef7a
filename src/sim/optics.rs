//! Optical field evaluation
//!
//! Each frame, every mirror reflects the sun once. The reflected ray is tested
//! against the receiver and graded by how squarely it points at the receiver
//! center. Mirrors never shadow or feed each other, so the frame's energy is a
//! plain sum over mirrors.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::{line_intersects_circle, mirror_normal, reflect};
use super::state::Mirror;
use super::vector::{dot, normalize};
use crate::consts::*;

/// Receiver geometry needed for hit testing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Receiver {
    pub center: Vec2,
    /// Drawn radius (hit testing applies `HIT_RADIUS_MARGIN`)
    pub radius: f32,
}

/// How well a reflected ray landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HitTier {
    /// Ray misses the receiver
    Miss,
    /// Ray clips the receiver margin at a poor angle
    Misaligned,
    /// Alignment above `PARTIAL_ALIGNMENT`
    Partial,
    /// Alignment above `PERFECT_ALIGNMENT`
    Perfect,
}

impl HitTier {
    /// Grade a hit by alignment
    pub fn from_alignment(alignment: f32) -> Self {
        if alignment > PERFECT_ALIGNMENT {
            HitTier::Perfect
        } else if alignment > PARTIAL_ALIGNMENT {
            HitTier::Partial
        } else {
            HitTier::Misaligned
        }
    }

    /// Energy this tier contributes per frame
    pub fn energy(&self) -> f32 {
        match self {
            HitTier::Perfect => PERFECT_ENERGY,
            HitTier::Partial => PARTIAL_ENERGY,
            HitTier::Miss | HitTier::Misaligned => 0.0,
        }
    }

    pub fn is_hit(&self) -> bool {
        *self != HitTier::Miss
    }
}

/// Ray and hit data for one mirror
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MirrorRay {
    pub mirror_id: u32,
    /// Mirror anchor (start of the reflected ray, end of the incident ray)
    pub origin: Vec2,
    /// Unit direction sun -> mirror
    pub incident: Vec2,
    /// Unit reflected direction
    pub reflected: Vec2,
    /// Far end of the cast ray
    pub ray_end: Vec2,
    /// Reflected direction · direction to receiver center (0 when missed)
    pub alignment: f32,
    pub tier: HitTier,
    /// Energy contributed this frame
    pub energy: f32,
}

impl MirrorRay {
    pub fn hit(&self) -> bool {
        self.tier.is_hit()
    }

    /// Efficiency shown on the mirror: alignment on a hit, clamped to [0, 1]
    pub fn efficiency(&self) -> f32 {
        if self.hit() {
            self.alignment.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Result of evaluating the whole field for one frame
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldReport {
    /// Sum of all mirror contributions
    pub total_energy: f32,
    /// One entry per mirror, in mirror order
    pub rays: Vec<MirrorRay>,
}

impl FieldReport {
    pub fn hits(&self) -> usize {
        self.rays.iter().filter(|r| r.hit()).count()
    }
}

/// Trace one mirror's reflection
pub fn evaluate_mirror(sun: Vec2, receiver: &Receiver, mirror: &Mirror) -> MirrorRay {
    let incident = normalize(mirror.position - sun);
    let normal = mirror_normal(mirror.angle);
    let reflected = reflect(incident, normal);

    let ray_end = mirror.position + reflected * RAY_LENGTH;
    let hit = line_intersects_circle(
        mirror.position,
        ray_end,
        receiver.center,
        receiver.radius * HIT_RADIUS_MARGIN,
    );

    let (alignment, tier) = if hit {
        let to_receiver = normalize(receiver.center - mirror.position);
        let alignment = dot(reflected, to_receiver);
        (alignment, HitTier::from_alignment(alignment))
    } else {
        (0.0, HitTier::Miss)
    };

    MirrorRay {
        mirror_id: mirror.id,
        origin: mirror.position,
        incident,
        reflected,
        ray_end,
        alignment,
        tier,
        energy: tier.energy(),
    }
}

/// Trace every mirror and total the frame's energy
pub fn evaluate(sun: Vec2, receiver: &Receiver, mirrors: &[Mirror]) -> FieldReport {
    let rays: Vec<MirrorRay> = mirrors
        .iter()
        .map(|m| evaluate_mirror(sun, receiver, m))
        .collect();
    let total_energy = rays.iter().map(|r| r.energy).sum();

    FieldReport { total_energy, rays }
}
