//! Presenter that reports frames through tracing

use tracing::{info, trace};

use crate::game::{Presenter, RenderFrame};

/// Logs score and wave changes; per-frame detail at trace level
#[derive(Debug)]
pub struct TracingPresenter {
    label: String,
    score: u64,
    wave: u32,
    frames: u64,
}

impl TracingPresenter {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            score: 0,
            wave: 0,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Presenter for TracingPresenter {
    fn present(&mut self, frame: &RenderFrame) {
        self.frames += 1;

        if frame.wave != self.wave {
            info!(client = %self.label, wave = frame.wave, enemies = frame.enemies.len(), "Wave");
            self.wave = frame.wave;
        }
        if frame.score != self.score {
            info!(client = %self.label, score = frame.score, "Score");
            self.score = frame.score;
        }

        trace!(
            client = %self.label,
            tick = frame.tick,
            x = frame.player_position.x,
            z = frame.player_position.z,
            yaw = frame.yaw,
            enemies = frame.enemies.len(),
            projectiles = frame.projectiles.len(),
            remote_players = frame.remote_players.len(),
            spawned = frame.spawned.len(),
            despawned = frame.despawned.len(),
            "Frame"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::input::TickInput;
    use crate::game::{SimConfig, Simulation, SnapshotBuilder};

    #[test]
    fn tracks_latest_score_and_wave() {
        let mut sim = Simulation::new(SimConfig::default(), 2);
        let mut builder = SnapshotBuilder::new();
        let mut presenter = TracingPresenter::new("test");

        sim.tick(&TickInput::default(), 1.0 / 60.0);
        presenter.present(&builder.build(sim.state(), Vec::new(), Vec::new()));
        assert_eq!(presenter.wave, 1);
        assert_eq!(presenter.score, 0);

        let victim = sim.state().enemies.iter().next().map(|e| e.id);
        sim.apply_remote_kill(victim);
        presenter.present(&builder.build(sim.state(), Vec::new(), Vec::new()));
        assert_eq!(presenter.score, 1);
        assert_eq!(presenter.frames(), 2);
    }
}
