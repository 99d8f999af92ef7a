//! Data-driven game balance
//!
//! The level table and field layout ship with built-in defaults and can be
//! replaced from JSON, e.g.
//!
//! ```json
//! { "levels": [ { "mirror_count": 1, "energy_target": 500.0, "time_scale": 1.0 } ] }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Balance for one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelConfig {
    /// Number of mirrors placed on the field
    pub mirror_count: u32,
    /// Energy needed to win the level
    pub energy_target: f32,
    /// Day-cycle speed multiplier (1.0 = one day per `DAY_DURATION_SECONDS`)
    pub time_scale: f32,
}

impl LevelConfig {
    pub const fn new(mirror_count: u32, energy_target: f32, time_scale: f32) -> Self {
        Self {
            mirror_count,
            energy_target,
            time_scale,
        }
    }
}

/// Built-in level progression
pub const DEFAULT_LEVELS: [LevelConfig; 6] = [
    LevelConfig::new(1, 500.0, 1.0),
    LevelConfig::new(2, 1000.0, 1.2),
    LevelConfig::new(3, 1800.0, 1.4),
    LevelConfig::new(4, 2800.0, 1.6),
    LevelConfig::new(5, 4000.0, 1.8),
    LevelConfig::new(6, 5500.0, 2.0),
];

/// Placement of the field inside the viewport, as fractions of its size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layout {
    /// Ground line (fraction of height from the top)
    pub ground: f32,
    /// Tower anchor (fraction of width)
    pub tower_x: f32,
    /// Tower height (fraction of height)
    pub tower_height: f32,
    /// Receiver radius (fraction of the smaller viewport side)
    pub receiver_radius: f32,
    /// Left edge of the mirror field (fraction of width)
    pub field_start: f32,
    /// Right edge of the mirror field (fraction of width)
    pub field_end: f32,
    /// Peak rise of the sun arc above the bottom edge (fraction of height)
    pub sun_amplitude: f32,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            ground: 0.85,
            tower_x: 0.85,
            tower_height: 0.45,
            receiver_radius: 0.03,
            field_start: 0.08,
            field_end: 0.7,
            sun_amplitude: 0.8,
        }
    }
}

/// Errors that can occur while loading tuning data.
#[derive(Debug)]
pub enum TuningError {
    /// The document was not valid tuning JSON.
    Parse(serde_json::Error),
    /// The level table has no entries.
    NoLevels,
    /// A level entry has unusable values.
    InvalidLevel { index: usize, reason: &'static str },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(e) => write!(f, "Failed to parse tuning data: {}", e),
            TuningError::NoLevels => write!(f, "Tuning data must define at least one level"),
            TuningError::InvalidLevel { index, reason } => {
                write!(f, "Level entry {} is invalid: {}", index, reason)
            }
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}

/// Level table plus layout
///
/// Always holds at least one valid level; deserializing goes through the same
/// validation as `Tuning::new`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTuning")]
pub struct Tuning {
    levels: Vec<LevelConfig>,
    layout: Layout,
}

/// Unvalidated on-disk form of `Tuning`
#[derive(Deserialize)]
struct RawTuning {
    levels: Vec<LevelConfig>,
    #[serde(default)]
    layout: Layout,
}

impl TryFrom<RawTuning> for Tuning {
    type Error = TuningError;

    fn try_from(raw: RawTuning) -> Result<Self, Self::Error> {
        Tuning::new(raw.levels, raw.layout)
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            levels: DEFAULT_LEVELS.to_vec(),
            layout: Layout::default(),
        }
    }
}

impl Tuning {
    /// Build tuning from an explicit level table
    pub fn new(levels: Vec<LevelConfig>, layout: Layout) -> Result<Self, TuningError> {
        let tuning = Self { levels, layout };
        tuning.validate()?;
        Ok(tuning)
    }

    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let raw: RawTuning = serde_json::from_str(json)?;
        let tuning = Tuning::try_from(raw)?;
        log::info!("Loaded tuning with {} levels", tuning.levels.len());
        Ok(tuning)
    }

    fn validate(&self) -> Result<(), TuningError> {
        if self.levels.is_empty() {
            return Err(TuningError::NoLevels);
        }
        for (index, level) in self.levels.iter().enumerate() {
            if level.mirror_count == 0 {
                return Err(TuningError::InvalidLevel {
                    index,
                    reason: "mirror_count must be at least 1",
                });
            }
            if !(level.energy_target.is_finite() && level.energy_target > 0.0) {
                return Err(TuningError::InvalidLevel {
                    index,
                    reason: "energy_target must be positive",
                });
            }
            if !(level.time_scale.is_finite() && level.time_scale > 0.0) {
                return Err(TuningError::InvalidLevel {
                    index,
                    reason: "time_scale must be positive",
                });
            }
        }
        Ok(())
    }

    /// Config for a 1-based level number, clamped to the table
    pub fn level(&self, level: u32) -> LevelConfig {
        let last = self.levels.len() - 1;
        let index = (level.saturating_sub(1) as usize).min(last);
        if level == 0 || level as usize > self.levels.len() {
            log::debug!("Level {} clamped to table entry {}", level, index + 1);
        }
        self.levels[index]
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }
}
