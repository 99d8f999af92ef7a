//! Game state and core simulation types
//!
//! A level owns its tower, its mirrors and the day-cycle progress. Everything
//! here is rebuilt wholesale when a level starts.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::tuning::{Layout, Tuning};

/// Current phase of a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Level laid out, waiting for the player to start the day
    Idle,
    /// Day cycle advancing, mirrors steerable
    Running,
    /// Energy target reached before sunset
    Victory,
    /// Sun set before the target was reached
    Defeat,
}

impl GamePhase {
    /// Victory and Defeat end the level
    pub fn is_terminal(&self) -> bool {
        matches!(self, GamePhase::Victory | GamePhase::Defeat)
    }
}

/// Canvas size the field is laid out in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// A steerable mirror plate anchored on the ground
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mirror {
    pub id: u32,
    /// Ground anchor (never moves during a level)
    pub position: Vec2,
    /// Plate rotation (radians)
    pub angle: f32,
    /// Drawn plate length
    pub width: f32,
    /// Highlighted by the interaction controller
    pub is_selected: bool,
    /// Alignment quality from the last evaluated frame (0 = no hit, 1 = perfect)
    pub efficiency: f32,
}

impl Mirror {
    pub fn new(id: u32, position: Vec2) -> Self {
        Self {
            id,
            position,
            angle: 0.0,
            width: MIRROR_WIDTH,
            is_selected: false,
            efficiency: 0.0,
        }
    }
}

/// The solar tower and its receiver
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    /// Ground anchor
    pub position: Vec2,
    pub height: f32,
    pub receiver_radius: f32,
    /// Distance from the ground anchor up to the receiver center
    pub receiver_offset: f32,
}

impl Tower {
    /// Place the tower for a viewport
    pub fn for_viewport(viewport: Viewport, layout: &Layout) -> Self {
        let height = viewport.height * layout.tower_height;
        Self {
            position: Vec2::new(
                viewport.width * layout.tower_x,
                viewport.height * layout.ground,
            ),
            height,
            receiver_radius: viewport.width.min(viewport.height) * layout.receiver_radius,
            receiver_offset: height,
        }
    }

    /// Center of the receiver (screen y grows downward)
    #[inline]
    pub fn receiver_center(&self) -> Vec2 {
        self.position - Vec2::new(0.0, self.receiver_offset)
    }
}

/// Mirror currently picked by the pointer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    /// Index into `GameState::mirrors`
    pub index: Option<usize>,
    /// Pointer is held down on the selected mirror
    pub dragging: bool,
}

/// Lay out `count` mirrors evenly across the mirror field
pub fn layout_mirrors(count: u32, viewport: Viewport, layout: &Layout) -> Vec<Mirror> {
    let start = viewport.width * layout.field_start;
    let span = viewport.width * (layout.field_end - layout.field_start);
    let ground = viewport.height * layout.ground;

    (0..count)
        .map(|i| {
            let t = (i as f32 + 0.5) / count as f32;
            Mirror::new(i + 1, Vec2::new(start + span * t, ground))
        })
        .collect()
}

/// Complete level state (deterministic, serializable)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    /// Current level (1-based)
    pub level: u32,
    pub phase: GamePhase,
    /// Energy collected over the whole run
    pub score: f32,
    /// Energy collected this level
    pub energy: f32,
    /// Energy needed to win this level
    pub max_energy: f32,
    /// Day progress in [0, 1]
    pub time_of_day: f32,
    /// Day-cycle speed multiplier for this level
    pub time_scale: f32,
    pub viewport: Viewport,
    pub layout: Layout,
    pub tower: Tower,
    /// Sun position derived from `time_of_day`
    pub sun: Vec2,
    /// Mirrors, in id order
    pub mirrors: Vec<Mirror>,
    pub selection: Selection,
    /// Frames simulated while running
    pub frames: u64,
}

impl GameState {
    /// Start a new run at level 1
    pub fn new(viewport: Viewport, tuning: &Tuning) -> Self {
        Self::for_level(1, 0.0, viewport, tuning)
    }

    /// Lay out a fresh level, carrying over the run score
    pub fn for_level(level: u32, score: f32, viewport: Viewport, tuning: &Tuning) -> Self {
        let config = tuning.level(level);
        let layout = tuning.layout();
        let mirrors = layout_mirrors(config.mirror_count, viewport, &layout);

        log::info!(
            "Level {} ready: {} mirrors, target {:.0}, time scale {:.2}",
            level,
            mirrors.len(),
            config.energy_target,
            config.time_scale
        );

        Self {
            level,
            phase: GamePhase::Idle,
            score,
            energy: 0.0,
            max_energy: config.energy_target,
            time_of_day: 0.0,
            time_scale: config.time_scale,
            viewport,
            layout,
            tower: Tower::for_viewport(viewport, &layout),
            sun: super::tick::sun_position(0.0, viewport, &layout),
            mirrors,
            selection: Selection::default(),
            frames: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn game_over(&self) -> bool {
        self.phase == GamePhase::Defeat
    }

    pub fn victory(&self) -> bool {
        self.phase == GamePhase::Victory
    }

    /// Energy progress toward the target (may exceed 1.0 slightly)
    pub fn energy_fraction(&self) -> f32 {
        self.energy / self.max_energy
    }

    /// Wall-clock seconds left before sunset at this level's time scale
    pub fn remaining_seconds(&self) -> f32 {
        (1.0 - self.time_of_day) * DAY_DURATION_SECONDS / self.time_scale
    }

    /// Selected mirror, if any
    pub fn selected_mirror(&self) -> Option<&Mirror> {
        self.selection.index.and_then(|i| self.mirrors.get(i))
    }
}
