//! Scripted input for headless clients

use std::f32::consts::{PI, TAU};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::game::orientation::{pitch_towards, yaw_towards};
use crate::game::{InputState, Key, SimState};

/// Ticks between shots while a target is visible
pub const DEFAULT_FIRE_INTERVAL: u64 = 20;

/// Ticks a strafe direction is held before re-rolling
const STRAFE_HOLD_TICKS: u32 = 45;

/// Chance per tick of a jump request
const JUMP_CHANCE: f64 = 0.01;

/// Beyond this distance the pilot sprints toward its target
const CHASE_DISTANCE: f32 = 12.0;

/// Inside this distance the pilot backs away
const RETREAT_DISTANCE: f32 = 4.0;

/// Something that feeds the input aggregator before each tick
pub trait InputSource {
    fn drive(&mut self, state: &SimState, input: &mut InputState);
}

/// Turns toward the nearest enemy, fires on an interval, strafes and hops
#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: ChaCha8Rng,
    sensitivity: f32,
    fire_interval: u64,
    ticks: u64,
    strafe: Option<Key>,
    strafe_left: u32,
}

impl Autopilot {
    pub fn new(seed: u64, sensitivity: f32) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            sensitivity,
            fire_interval: DEFAULT_FIRE_INTERVAL,
            ticks: 0,
            strafe: None,
            strafe_left: 0,
        }
    }

    fn roll_strafe(&mut self, input: &mut InputState) {
        if self.strafe_left > 0 {
            self.strafe_left -= 1;
            return;
        }
        if let Some(key) = self.strafe.take() {
            input.key_up(key);
        }
        self.strafe = match self.rng.gen_range(0..3) {
            0 => Some(Key::Left),
            1 => Some(Key::Right),
            _ => None,
        };
        if let Some(key) = self.strafe {
            input.key_down(key);
        }
        self.strafe_left = STRAFE_HOLD_TICKS;
    }
}

impl InputSource for Autopilot {
    fn drive(&mut self, state: &SimState, input: &mut InputState) {
        self.ticks += 1;
        if !input.pointer_captured() {
            input.set_pointer_captured(true);
        }

        self.roll_strafe(input);
        let player = &state.player;
        if player.grounded() && self.rng.gen_bool(JUMP_CHANCE) {
            input.key_down(Key::Jump);
        }

        let nearest = state
            .enemies
            .iter()
            .map(|e| e.position)
            .min_by(|a, b| {
                a.distance_squared(player.position)
                    .total_cmp(&b.distance_squared(player.position))
            });
        let Some(target) = nearest else {
            hold(input, Key::Forward, false);
            hold(input, Key::Sprint, false);
            hold(input, Key::Back, false);
            return;
        };

        let distance = player.position.distance(target);
        hold(input, Key::Forward, distance > RETREAT_DISTANCE);
        hold(input, Key::Sprint, distance > CHASE_DISTANCE);
        hold(input, Key::Back, distance < RETREAT_DISTANCE);

        // pointer deltas that land exactly on the target angles
        let yaw = yaw_towards(player.position, target);
        let pitch = pitch_towards(player.position, target);
        let dx = wrap_angle(player.yaw - yaw) / self.sensitivity;
        let dy = (pitch - player.pitch) / self.sensitivity;
        input.pointer_moved(dx, dy);

        if self.ticks % self.fire_interval == 0 {
            input.request_fire();
        }
    }
}

/// Press or release `key` so its held state matches `want`
fn hold(input: &mut InputState, key: Key, want: bool) {
    match (input.is_held(key), want) {
        (false, true) => input.key_down(key),
        (true, false) => input.key_up(key),
        _ => {}
    }
}

/// Map an angle into `[-PI, PI)`
fn wrap_angle(a: f32) -> f32 {
    (a + PI).rem_euclid(TAU) - PI
}
