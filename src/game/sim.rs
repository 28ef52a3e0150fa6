//! Simulation state and the per-tick pipeline

use glam::Vec3;
use tracing::{debug, trace};
use uuid::Uuid;

use super::combat::{CombatSystem, Projectile};
use super::enemy::{Enemy, EnemySet, PursuitSystem};
use super::input::TickInput;
use super::orientation::{look_direction, OrientationController};
use super::physics::{MotionState, PhysicsSystem, DEFAULT_GROUND_HEIGHT};
use super::wave::{WaveDirector, WaveStart};
use super::SimConfig;

/// The local player
#[derive(Debug, Clone)]
pub struct PlayerState {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Radians, unbounded
    pub yaw: f32,
    /// Radians, within `[-π/2, π/2]`
    pub pitch: f32,
    pub motion: MotionState,
    pub sprinting: bool,
}

impl PlayerState {
    pub fn spawn_at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            motion: MotionState::Grounded,
            sprinting: false,
        }
    }

    pub fn grounded(&self) -> bool {
        self.motion == MotionState::Grounded
    }

    pub fn look_direction(&self) -> Vec3 {
        look_direction(self.yaw, self.pitch)
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::spawn_at(Vec3::new(0.0, DEFAULT_GROUND_HEIGHT, 0.0))
    }
}

/// Everything the tick loop owns
#[derive(Debug, Clone)]
pub struct SimState {
    pub tick: u64,
    pub player: PlayerState,
    pub enemies: EnemySet,
    pub projectiles: Vec<Projectile>,
    pub score: u64,
    pub waves: WaveDirector,
}

impl SimState {
    pub fn wave(&self) -> u32 {
        self.waves.wave()
    }
}

/// Things that happened during a tick that other layers care about
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Local player fired
    Fired {
        projectile_id: Uuid,
        origin: Vec3,
        direction: Vec3,
    },
    /// Local projectile killed an enemy
    Killed { enemy_id: Uuid },
    /// A new wave populated the enemy set
    WaveStarted {
        wave: u32,
        spawned: Vec<(Uuid, Vec3)>,
    },
}

impl From<WaveStart> for SimEvent {
    fn from(start: WaveStart) -> Self {
        SimEvent::WaveStarted {
            wave: start.wave,
            spawned: start.spawned.into_iter().map(|e| (e.id, e.position)).collect(),
        }
    }
}

/// Outcome of applying a kill notice from another client
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteKillOutcome {
    /// The identified enemy was present and has been removed
    pub removed: bool,
    /// Removing it cleared the wave
    pub wave: Option<SimEvent>,
}

/// Single-player simulation core
pub struct Simulation {
    config: SimConfig,
    orientation: OrientationController,
    state: SimState,
    pending: Vec<SimEvent>,
}

impl Simulation {
    /// Create a simulation and start wave 1
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let waves = WaveDirector::new(seed, config.arena, config.max_wave_enemies);
        let mut state = SimState {
            tick: 0,
            player: PlayerState::spawn_at(Vec3::new(0.0, config.movement.ground_height, 0.0)),
            enemies: EnemySet::new(),
            projectiles: Vec::new(),
            score: 0,
            waves,
        };
        let first = state.waves.start_wave(1, &mut state.enemies);

        Self {
            orientation: OrientationController::new(config.mouse_sensitivity),
            config,
            state,
            pending: vec![first.into()],
        }
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn state(&self) -> &SimState {
        &self.state
    }

    /// Run one tick: orientation, physics, fire, collisions, waves, pursuit
    pub fn tick(&mut self, input: &TickInput, dt: f32) -> Vec<SimEvent> {
        let mut events = std::mem::take(&mut self.pending);
        let state = &mut self.state;
        state.tick += 1;

        self.orientation
            .apply(&mut state.player, input.look_dx, input.look_dy);

        PhysicsSystem::step(&mut state.player, input, dt, &self.config.movement);

        if input.fire {
            let origin = state.player.position;
            let direction = state.player.look_direction();
            if let Some(projectile) = Projectile::new(origin, direction, &self.config.weapon) {
                events.push(SimEvent::Fired {
                    projectile_id: projectile.id,
                    origin,
                    direction,
                });
                state.projectiles.push(projectile);
            }
        }

        let report = CombatSystem::resolve(
            &mut state.projectiles,
            &mut state.enemies,
            &self.config.weapon,
        );
        for kill in &report.kills {
            state.score += 1;
            debug!(enemy_id = %kill.enemy_id, score = state.score, "Enemy killed");
            events.push(SimEvent::Killed {
                enemy_id: kill.enemy_id,
            });
        }

        if report.wave_cleared {
            if let Some(start) = state.waves.report_cleared(&mut state.enemies) {
                events.push(start.into());
            }
        }

        PursuitSystem::step(
            &mut state.enemies,
            state.player.position,
            self.config.pursuit_step,
        );

        trace!(
            tick = state.tick,
            enemies = state.enemies.len(),
            projectiles = state.projectiles.len(),
            phase = ?state.waves.phase(),
            "Tick complete"
        );
        events
    }

    /// Materialize an enemy announced by another client.
    /// Wave counters are untouched. Returns false for an already-known id.
    pub fn add_remote_enemy(&mut self, id: Uuid, position: Vec3) -> bool {
        self.state.enemies.insert(Enemy::with_id(id, position))
    }

    /// Apply a kill confirmed elsewhere: score +1, and remove the enemy it names
    pub fn apply_remote_kill(&mut self, enemy_id: Option<Uuid>) -> RemoteKillOutcome {
        self.state.score += 1;
        let removed = enemy_id
            .and_then(|id| self.state.enemies.remove(id))
            .is_some();
        let wave = if removed {
            self.state
                .waves
                .report_cleared(&mut self.state.enemies)
                .map(SimEvent::from)
        } else {
            None
        };
        RemoteKillOutcome { removed, wave }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::orientation::{pitch_towards, yaw_towards};

    const DT: f32 = 1.0 / 60.0;

    fn aim_at(sim: &Simulation, target: Vec3) -> TickInput {
        // convert the wanted angles into pointer deltas for the controller
        let s = sim.config().mouse_sensitivity;
        let player = &sim.state().player;
        let yaw = yaw_towards(player.position, target);
        let pitch = pitch_towards(player.position, target);
        TickInput {
            look_dx: (player.yaw - yaw) / s,
            look_dy: (pitch - player.pitch) / s,
            fire: true,
            ..Default::default()
        }
    }

    fn kill_count(events: &[SimEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, SimEvent::Killed { .. }))
            .count()
    }

    #[test]
    fn first_tick_reports_wave_one() {
        let mut sim = Simulation::new(SimConfig::default(), 1);
        assert_eq!(sim.state().wave(), 1);
        assert_eq!(sim.state().enemies.len(), 4);

        let events = sim.tick(&TickInput::default(), DT);
        match &events[0] {
            SimEvent::WaveStarted { wave, spawned } => {
                assert_eq!(*wave, 1);
                assert_eq!(spawned.len(), 4);
            }
            other => panic!("unexpected {other:?}"),
        }
        assert!(sim.tick(&TickInput::default(), DT).is_empty());
    }

    #[test]
    fn clearing_wave_one_scores_and_starts_wave_two() {
        let config = SimConfig {
            pursuit_step: 0.0,
            ..SimConfig::default()
        };
        let mut sim = Simulation::new(config, 3);
        sim.tick(&TickInput::default(), DT);

        let mut kills = 0;
        let mut wave_two = None;
        for round in 0..4 {
            let target = sim.state().enemies.iter().next().unwrap().position;
            let mut events = sim.tick(&aim_at(&sim, target), DT);
            for _ in 0..120 {
                if kill_count(&events) > 0 {
                    break;
                }
                events = sim.tick(&TickInput::default(), DT);
            }
            assert_eq!(kill_count(&events), 1, "round {round}");
            kills += 1;
            assert_eq!(sim.state().score, kills);
            if let Some(e) = events
                .iter()
                .find(|e| matches!(e, SimEvent::WaveStarted { .. }))
            {
                wave_two = Some(e.clone());
            } else {
                assert_eq!(sim.state().enemies.len(), 4 - kills as usize);
            }
        }

        assert_eq!(sim.state().score, 4);
        assert_eq!(sim.state().wave(), 2);
        assert_eq!(sim.state().enemies.len(), 4);
        match wave_two {
            Some(SimEvent::WaveStarted { wave: 2, spawned }) => assert_eq!(spawned.len(), 4),
            other => panic!("expected wave 2 start, got {other:?}"),
        }
    }

    #[test]
    fn remote_enemy_does_not_touch_wave_counter() {
        let mut sim = Simulation::new(SimConfig::default(), 5);
        let id = Uuid::new_v4();
        assert!(sim.add_remote_enemy(id, Vec3::new(5.0, 0.5, 5.0)));
        assert!(!sim.add_remote_enemy(id, Vec3::new(5.0, 0.5, 5.0)));
        assert_eq!(sim.state().enemies.len(), 5);
        assert_eq!(sim.state().wave(), 1);
    }

    #[test]
    fn remote_kill_scores_and_removes_named_enemy() {
        let mut sim = Simulation::new(SimConfig::default(), 5);
        let id = Uuid::new_v4();
        sim.add_remote_enemy(id, Vec3::new(5.0, 0.5, 5.0));

        let outcome = sim.apply_remote_kill(Some(id));
        assert!(outcome.removed);
        assert!(outcome.wave.is_none());
        assert_eq!(sim.state().score, 1);

        let bare = sim.apply_remote_kill(None);
        assert!(!bare.removed);
        assert_eq!(sim.state().score, 2);
        assert_eq!(sim.state().enemies.len(), 4);
    }

    #[test]
    fn remote_kill_of_last_enemy_advances_wave() {
        let mut sim = Simulation::new(SimConfig::default(), 5);
        let wave_ids: Vec<Uuid> = sim.state().enemies.iter().map(|e| e.id).collect();
        let mut last = None;
        for id in wave_ids {
            last = sim.apply_remote_kill(Some(id)).wave;
        }
        assert!(matches!(last, Some(SimEvent::WaveStarted { wave: 2, .. })));
        assert_eq!(sim.state().wave(), 2);
    }

    #[test]
    fn enemies_close_in_on_player() {
        let mut sim = Simulation::new(SimConfig::default(), 8);
        let before: f32 = sim
            .state()
            .enemies
            .iter()
            .map(|e| e.position.distance(sim.state().player.position))
            .sum();
        for _ in 0..60 {
            sim.tick(&TickInput::default(), DT);
        }
        let after: f32 = sim
            .state()
            .enemies
            .iter()
            .map(|e| e.position.distance(sim.state().player.position))
            .sum();
        assert!(after < before);
    }
}
