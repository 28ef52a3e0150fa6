//! Render snapshots handed to the presentation layer

use std::collections::HashSet;

use glam::Vec3;
use uuid::Uuid;

use super::SimState;
use crate::ws::protocol::ConnId;

/// Position of one visible object
#[derive(Debug, Clone, PartialEq)]
pub struct EntityView {
    pub id: Uuid,
    pub position: Vec3,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderFrame {
    pub tick: u64,
    pub player_position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub enemies: Vec<EntityView>,
    pub projectiles: Vec<EntityView>,
    /// Other clients' last known positions
    pub remote_players: Vec<(ConnId, Vec3)>,
    /// Observation-only shots fired by other clients
    pub remote_shots: Vec<EntityView>,
    pub score: u64,
    pub wave: u32,
    /// Enemies and projectiles that became visible this frame
    pub spawned: Vec<Uuid>,
    /// Enemies and projectiles that must be removed from the scene this frame
    pub despawned: Vec<Uuid>,
}

/// Consumer of render frames (scene graph, HUD, logger...)
pub trait Presenter {
    fn present(&mut self, frame: &RenderFrame);
}

/// Builds frames and tracks which objects the presenter currently shows
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    visible: HashSet<Uuid>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the frame for the state at the end of a tick
    pub fn build(
        &mut self,
        state: &SimState,
        remote_players: Vec<(ConnId, Vec3)>,
        remote_shots: Vec<EntityView>,
    ) -> RenderFrame {
        let enemies: Vec<EntityView> = state
            .enemies
            .iter()
            .map(|e| EntityView {
                id: e.id,
                position: e.position,
            })
            .collect();
        let projectiles: Vec<EntityView> = state
            .projectiles
            .iter()
            .map(|p| EntityView {
                id: p.id,
                position: p.position,
            })
            .collect();

        let now: HashSet<Uuid> = enemies
            .iter()
            .chain(projectiles.iter())
            .chain(remote_shots.iter())
            .map(|v| v.id)
            .collect();
        let mut spawned: Vec<Uuid> = now.difference(&self.visible).copied().collect();
        let mut despawned: Vec<Uuid> = self.visible.difference(&now).copied().collect();
        spawned.sort_unstable();
        despawned.sort_unstable();
        self.visible = now;

        RenderFrame {
            tick: state.tick,
            player_position: state.player.position,
            yaw: state.player.yaw,
            pitch: state.player.pitch,
            enemies,
            projectiles,
            remote_players,
            remote_shots,
            score: state.score,
            wave: state.wave(),
            spawned,
            despawned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::TickInput;
    use crate::game::{SimConfig, Simulation};

    #[test]
    fn first_frame_spawns_everything_then_only_deltas() {
        let mut sim = Simulation::new(SimConfig::default(), 2);
        let mut builder = SnapshotBuilder::new();

        let first = builder.build(sim.state(), Vec::new(), Vec::new());
        assert_eq!(first.spawned.len(), first.enemies.len());
        assert!(first.despawned.is_empty());
        assert_eq!(first.wave, 1);

        sim.tick(&TickInput::default(), 1.0 / 60.0);
        let second = builder.build(sim.state(), Vec::new(), Vec::new());
        assert!(second.spawned.is_empty());
        assert!(second.despawned.is_empty());
    }

    #[test]
    fn removed_enemy_is_despawned_in_the_same_frame() {
        let mut sim = Simulation::new(SimConfig::default(), 2);
        let mut builder = SnapshotBuilder::new();
        builder.build(sim.state(), Vec::new(), Vec::new());

        let victim = sim.state().enemies.iter().next().unwrap().id;
        sim.apply_remote_kill(Some(victim));
        let frame = builder.build(sim.state(), Vec::new(), Vec::new());

        assert_eq!(frame.despawned, vec![victim]);
        assert!(frame.enemies.iter().all(|e| e.id != victim));
        assert_eq!(frame.score, 1);
    }
}
