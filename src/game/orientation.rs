//! First-person orientation - pointer deltas to yaw/pitch

use std::f32::consts::FRAC_PI_2;

use glam::{EulerRot, Quat, Vec3};

use super::PlayerState;

/// Vertical look limit in radians
pub const MAX_PITCH: f32 = FRAC_PI_2;

/// Radians per pointer pixel
pub const DEFAULT_SENSITIVITY: f32 = 0.002;

/// Applies pointer movement to the player's facing
#[derive(Debug, Clone, Copy)]
pub struct OrientationController {
    sensitivity: f32,
}

impl OrientationController {
    pub fn new(sensitivity: f32) -> Self {
        Self { sensitivity }
    }

    /// Yaw is unbounded; pitch is clamped to `[-MAX_PITCH, MAX_PITCH]`
    pub fn apply(&self, player: &mut PlayerState, dx: f32, dy: f32) {
        player.yaw -= dx * self.sensitivity;
        player.pitch = (player.pitch + dy * self.sensitivity).clamp(-MAX_PITCH, MAX_PITCH);
    }
}

impl Default for OrientationController {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVITY)
    }
}

/// Camera rotation for a yaw/pitch pair (yaw about +Y, then pitch about local X)
pub fn look_rotation(yaw: f32, pitch: f32) -> Quat {
    Quat::from_euler(EulerRot::YXZ, yaw, pitch, 0.0)
}

/// Unit vector the camera looks along. Yaw 0, pitch 0 looks down -Z.
pub fn look_direction(yaw: f32, pitch: f32) -> Vec3 {
    look_rotation(yaw, pitch) * Vec3::NEG_Z
}

/// Horizontal (forward, right) unit vectors for movement
pub fn movement_basis(yaw: f32) -> (Vec3, Vec3) {
    let (sin, cos) = yaw.sin_cos();
    let forward = Vec3::new(-sin, 0.0, -cos);
    let right = Vec3::new(cos, 0.0, -sin);
    (forward, right)
}

/// Yaw that faces from `from` toward `to` on the horizontal plane
pub fn yaw_towards(from: Vec3, to: Vec3) -> f32 {
    let d = to - from;
    (-d.x).atan2(-d.z)
}

/// Pitch that faces from `from` toward `to`
pub fn pitch_towards(from: Vec3, to: Vec3) -> f32 {
    let d = to - from;
    let horizontal = (d.x * d.x + d.z * d.z).sqrt();
    d.y.atan2(horizontal).clamp(-MAX_PITCH, MAX_PITCH)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn horizontal_pointer_delta_turns_yaw_only() {
        let mut player = PlayerState::default();
        let controller = OrientationController::new(0.002);
        controller.apply(&mut player, 100.0, 0.0);
        assert!((player.yaw - -0.2).abs() < EPS, "yaw = {}", player.yaw);
        assert_eq!(player.pitch, 0.0);
    }

    #[test]
    fn pitch_is_clamped_in_both_directions() {
        let mut player = PlayerState::default();
        let controller = OrientationController::default();
        controller.apply(&mut player, 0.0, 10_000.0);
        assert_eq!(player.pitch, MAX_PITCH);
        controller.apply(&mut player, 0.0, -50_000.0);
        assert_eq!(player.pitch, -MAX_PITCH);
    }

    #[test]
    fn yaw_is_unbounded() {
        let mut player = PlayerState::default();
        let controller = OrientationController::default();
        for _ in 0..100 {
            controller.apply(&mut player, -1_000.0, 0.0);
        }
        assert!((player.yaw - 200.0).abs() < 1e-2);
    }

    #[test]
    fn look_direction_matches_movement_basis_when_level() {
        for yaw in [0.0_f32, 0.7, -2.3, 3.1] {
            let look = look_direction(yaw, 0.0);
            let (forward, right) = movement_basis(yaw);
            assert!((look - forward).length() < EPS);
            assert!(forward.dot(right).abs() < EPS);
            assert!((look.length() - 1.0).abs() < EPS);
        }
        assert!((look_direction(0.0, 0.0) - Vec3::NEG_Z).length() < EPS);
    }

    #[test]
    fn positive_pitch_looks_up() {
        let dir = look_direction(0.0, 0.5);
        assert!(dir.y > 0.0);
    }

    #[test]
    fn aim_helpers_point_at_target() {
        let from = Vec3::new(1.0, 0.5, 2.0);
        let to = Vec3::new(-4.0, 3.0, 9.0);
        let dir = look_direction(yaw_towards(from, to), pitch_towards(from, to));
        let expected = (to - from).normalize();
        assert!((dir - expected).length() < 1e-4);
    }
}
