//! Game simulation modules

pub mod combat;
pub mod enemy;
pub mod input;
pub mod orientation;
pub mod physics;
pub mod sim;
pub mod snapshot;
pub mod wave;

pub use input::{InputState, Key};
pub use sim::{PlayerState, SimEvent, SimState, Simulation};
pub use snapshot::{EntityView, Presenter, RenderFrame, SnapshotBuilder};

use combat::WeaponStats;
use enemy::DEFAULT_PURSUIT_STEP;
use orientation::DEFAULT_SENSITIVITY;
use physics::MovementStats;
use wave::{ArenaBounds, DEFAULT_MAX_WAVE_ENEMIES};

/// Tunable simulation constants
#[derive(Debug, Clone)]
pub struct SimConfig {
    pub movement: MovementStats,
    pub weapon: WeaponStats,
    pub arena: ArenaBounds,
    /// Radians of turn per pointer unit
    pub mouse_sensitivity: f32,
    /// Distance each enemy closes per tick
    pub pursuit_step: f32,
    /// Cap on a single wave's enemy count
    pub max_wave_enemies: usize,
    /// Announce locally spawned wave enemies to other clients
    pub share_wave_spawns: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            movement: MovementStats::default(),
            weapon: WeaponStats::default(),
            arena: ArenaBounds::default(),
            mouse_sensitivity: DEFAULT_SENSITIVITY,
            pursuit_step: DEFAULT_PURSUIT_STEP,
            max_wave_enemies: DEFAULT_MAX_WAVE_ENEMIES,
            share_wave_spawns: false,
        }
    }
}
