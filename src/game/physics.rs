//! Player physics: gravity, jumping, ground clamping and damped movement

use glam::Vec3;

use super::input::TickInput;
use super::orientation::movement_basis;
use super::PlayerState;

/// Height of the arena floor the player stands on
pub const DEFAULT_GROUND_HEIGHT: f32 = 0.5;

/// Horizontal speeds below this snap to zero
const REST_SPEED: f32 = 1e-3;

/// Movement constants, in units and seconds
#[derive(Debug, Clone, Copy)]
pub struct MovementStats {
    /// Vertical acceleration (negative = down)
    pub gravity: f32,
    /// Vertical velocity set by a jump
    pub jump_impulse: f32,
    /// Lowest height the player can occupy
    pub ground_height: f32,
    /// Horizontal acceleration from held movement keys
    pub move_accel: f32,
    /// Acceleration multiplier while sprinting
    pub sprint_multiplier: f32,
    /// Exponential decay rate of horizontal velocity (per second)
    pub damping: f32,
}

impl Default for MovementStats {
    fn default() -> Self {
        Self {
            gravity: -36.0,
            jump_impulse: 12.0,
            ground_height: DEFAULT_GROUND_HEIGHT,
            move_accel: 60.0,
            sprint_multiplier: 2.0,
            damping: 10.0,
        }
    }
}

/// Vertical motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MotionState {
    Airborne,
    #[default]
    Grounded,
}

/// Physics system for advancing the player
pub struct PhysicsSystem;

impl PhysicsSystem {
    /// Advance the player by `dt` seconds
    pub fn step(player: &mut PlayerState, input: &TickInput, dt: f32, stats: &MovementStats) {
        debug_assert!(dt > 0.0, "non-positive frame delta {dt}");
        let dt = dt.max(0.0);

        if input.jump && player.grounded() {
            player.velocity.y = stats.jump_impulse;
            player.motion = MotionState::Airborne;
        }

        // Horizontal acceleration from held keys
        player.sprinting = input.sprint;
        let (forward, right) = movement_basis(player.yaw);
        let wish = (forward * input.forward + right * input.strafe).normalize_or_zero();
        let accel = if player.sprinting {
            stats.move_accel * stats.sprint_multiplier
        } else {
            stats.move_accel
        };
        player.velocity.x += wish.x * accel * dt;
        player.velocity.z += wish.z * accel * dt;

        // Damping
        let decay = (-stats.damping * dt).exp() - 1.0;
        player.velocity.x += player.velocity.x * decay;
        player.velocity.z += player.velocity.z * decay;
        if Vec3::new(player.velocity.x, 0.0, player.velocity.z).length() < REST_SPEED {
            player.velocity.x = 0.0;
            player.velocity.z = 0.0;
        }

        player.velocity.y += stats.gravity * dt;
        player.position += player.velocity * dt;

        if player.position.y <= stats.ground_height {
            player.position.y = stats.ground_height;
            player.velocity.y = 0.0;
            player.motion = MotionState::Grounded;
        } else {
            player.motion = MotionState::Airborne;
        }
    }
}
