//! Wave progression - spawns enemy batches and advances on clearance

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info, warn};

use super::enemy::{Enemy, EnemySet};
use super::physics::DEFAULT_GROUND_HEIGHT;

/// Enemies in wave 0 before growth
pub const BASE_WAVE_ENEMIES: f64 = 3.0;
/// Per-wave growth factor
pub const WAVE_GROWTH: f64 = 1.1;
/// Upper bound on a single wave's size
pub const DEFAULT_MAX_WAVE_ENEMIES: usize = 256;

/// Spawn area on the arena floor
#[derive(Debug, Clone, Copy)]
pub struct ArenaBounds {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
    /// Height enemies spawn at
    pub spawn_height: f32,
}

impl Default for ArenaBounds {
    fn default() -> Self {
        Self {
            min_x: -30.0,
            max_x: 30.0,
            min_z: -30.0,
            max_z: 30.0,
            spawn_height: DEFAULT_GROUND_HEIGHT,
        }
    }
}

impl ArenaBounds {
    pub fn contains(&self, point: Vec3) -> bool {
        (self.min_x..=self.max_x).contains(&point.x) && (self.min_z..=self.max_z).contains(&point.z)
    }

    pub fn random_point(&self, rng: &mut impl Rng) -> Vec3 {
        Vec3::new(
            rng.gen_range(self.min_x..=self.max_x),
            self.spawn_height,
            rng.gen_range(self.min_z..=self.max_z),
        )
    }
}

/// Number of enemies in wave `n`: `ceil(3 * 1.1^n)`, capped at `max`
pub fn enemy_count(wave: u32, max: usize) -> usize {
    let exponent = i32::try_from(wave).unwrap_or(i32::MAX);
    let raw = (BASE_WAVE_ENEMIES * WAVE_GROWTH.powi(exponent)).ceil();
    debug_assert!(raw >= 0.0);
    if !raw.is_finite() || raw >= max as f64 {
        max
    } else {
        raw as usize
    }
}

/// Wave lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WavePhase {
    /// Enemy set is being filled
    Populating,
    /// Enemies alive, waiting for clearance
    Active,
    /// All enemies removed; next wave starts immediately
    Cleared,
}

/// Result of starting a wave
#[derive(Debug, Clone)]
pub struct WaveStart {
    pub wave: u32,
    pub spawned: Vec<Enemy>,
}

/// Spawns enemy batches with a growth curve
#[derive(Debug, Clone)]
pub struct WaveDirector {
    wave: u32,
    phase: WavePhase,
    bounds: ArenaBounds,
    max_enemies: usize,
    rng: ChaCha8Rng,
}

impl WaveDirector {
    pub fn new(seed: u64, bounds: ArenaBounds, max_enemies: usize) -> Self {
        Self {
            wave: 0,
            phase: WavePhase::Cleared,
            bounds,
            max_enemies: max_enemies.max(1),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Current wave number (0 before the first wave starts)
    pub fn wave(&self) -> u32 {
        self.wave
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Replace the enemy set with wave `n`'s batch
    pub fn start_wave(&mut self, n: u32, enemies: &mut EnemySet) -> WaveStart {
        self.phase = WavePhase::Populating;
        self.wave = n;
        enemies.clear();

        let count = enemy_count(n, self.max_enemies);
        if count == self.max_enemies {
            warn!(wave = n, count, "Wave size capped");
        }

        let mut spawned = Vec::with_capacity(count);
        for _ in 0..count {
            let enemy = Enemy::new(self.bounds.random_point(&mut self.rng));
            debug_assert!(self.bounds.contains(enemy.position));
            enemies.insert(enemy.clone());
            spawned.push(enemy);
        }

        self.phase = WavePhase::Active;
        info!(wave = n, enemies = count, "Wave started");

        WaveStart { wave: n, spawned }
    }

    /// Called after anything removes enemies. Starts the next wave exactly
    /// once per clearance of an active wave.
    pub fn report_cleared(&mut self, enemies: &mut EnemySet) -> Option<WaveStart> {
        if self.phase != WavePhase::Active || !enemies.is_empty() {
            return None;
        }
        self.phase = WavePhase::Cleared;
        debug!(wave = self.wave, "Wave cleared");
        let next = self.wave.saturating_add(1);
        Some(self.start_wave(next, enemies))
    }
}
