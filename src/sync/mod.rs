//! Network sync - publishes local changes and applies relay broadcasts
//!
//! Inbound frames are queued by whatever owns the connection and drained
//! only at the start of a tick, so relay traffic never mutates the enemy or
//! projectile sets while a tick is in progress.

pub mod link;
pub mod remote;

pub use link::{HubLink, RelayLink};
pub use remote::{RecentKills, RemotePlayerTable, RemoteShots};

use glam::Vec3;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use crate::game::{EntityView, SimEvent, Simulation};
use crate::ws::protocol::{ClientMsg, ConnId, RelayMsg};

/// Kill ids remembered for duplicate suppression
const RECENT_KILL_CAPACITY: usize = 512;

/// Sync errors
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Relay connection closed")]
    Closed,

    #[error("Failed to encode message: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Counters for diagnostics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncStats {
    pub sent: u64,
    /// Sends skipped because the relay was unavailable
    pub skipped: u64,
    pub applied: u64,
    /// Inbound frames that failed to parse
    pub discarded: u64,
    /// Inbound echoes and duplicates ignored
    pub ignored: u64,
}

/// Client side of the relay protocol
pub struct NetworkSync<L: RelayLink> {
    link: L,
    inbound: mpsc::Receiver<String>,
    inbound_open: bool,
    self_id: Option<ConnId>,
    remote_players: RemotePlayerTable,
    remote_shots: RemoteShots,
    recent_kills: RecentKills,
    last_sent_position: Option<Vec3>,
    share_wave_spawns: bool,
    stats: SyncStats,
}

impl<L: RelayLink> NetworkSync<L> {
    pub fn new(link: L, inbound: mpsc::Receiver<String>, share_wave_spawns: bool) -> Self {
        Self {
            link,
            inbound,
            inbound_open: true,
            self_id: None,
            remote_players: RemotePlayerTable::new(),
            remote_shots: RemoteShots::default(),
            recent_kills: RecentKills::new(RECENT_KILL_CAPACITY),
            last_sent_position: None,
            share_wave_spawns,
            stats: SyncStats::default(),
        }
    }

    pub fn self_id(&self) -> Option<&ConnId> {
        self.self_id.as_ref()
    }

    pub fn remote_players(&self) -> &RemotePlayerTable {
        &self.remote_players
    }

    pub fn stats(&self) -> SyncStats {
        self.stats
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    /// Apply every queued relay frame. Call once, at tick start.
    /// Returns wave events caused by remote kills.
    pub fn drain_inbound(&mut self, sim: &mut Simulation) -> Vec<SimEvent> {
        let mut events = Vec::new();
        loop {
            match self.inbound.try_recv() {
                Ok(text) => {
                    if let Some(event) = self.apply_text(&text, sim) {
                        events.push(event);
                    }
                }
                Err(mpsc::error::TryRecvError::Empty) => break,
                Err(mpsc::error::TryRecvError::Disconnected) => {
                    if self.inbound_open {
                        info!("Relay inbound closed, continuing locally");
                        self.inbound_open = false;
                    }
                    break;
                }
            }
        }
        events
    }

    /// Parse and apply one relay frame
    pub fn apply_text(&mut self, text: &str, sim: &mut Simulation) -> Option<SimEvent> {
        match serde_json::from_str::<RelayMsg>(text) {
            Ok(msg) => self.apply(msg, sim),
            Err(e) => {
                warn!(error = %e, "Discarding malformed relay message");
                self.stats.discarded += 1;
                None
            }
        }
    }

    /// Apply one relay message
    pub fn apply(&mut self, msg: RelayMsg, sim: &mut Simulation) -> Option<SimEvent> {
        match msg {
            RelayMsg::Welcome { id } => {
                info!(conn_id = %id, "Joined relay");
                self.remote_players.remove(&id);
                self.self_id = Some(id);
                self.stats.applied += 1;
                None
            }
            RelayMsg::UpdatePlayers { players } => {
                if self
                    .remote_players
                    .apply_snapshot(&players, self.self_id.as_ref())
                {
                    trace!(remote_players = self.remote_players.len(), "Remote players updated");
                }
                self.stats.applied += 1;
                None
            }
            RelayMsg::SpawnZombie {
                from,
                position,
                zombie_id,
            } => {
                if self.is_echo(from.as_ref()) || !position.is_finite() {
                    self.stats.ignored += 1;
                    return None;
                }
                if let Some(id) = zombie_id {
                    if self.recent_kills.contains(&id) {
                        debug!(zombie_id = %id, "Spawn notice for an enemy already killed");
                        self.stats.ignored += 1;
                        return None;
                    }
                }
                let id = zombie_id.unwrap_or_else(Uuid::new_v4);
                if sim.add_remote_enemy(id, position.into()) {
                    debug!(zombie_id = %id, "Remote enemy spawned");
                    self.stats.applied += 1;
                } else {
                    self.stats.ignored += 1;
                }
                None
            }
            RelayMsg::Shoot {
                from,
                position,
                direction,
            } => {
                if self.is_echo(from.as_ref()) {
                    self.stats.ignored += 1;
                    return None;
                }
                let weapon = &sim.config().weapon;
                if self.remote_shots.spawn(
                    position.into(),
                    direction.into(),
                    weapon.projectile_speed,
                    weapon.projectile_ttl,
                ) {
                    self.stats.applied += 1;
                } else {
                    self.stats.ignored += 1;
                }
                None
            }
            RelayMsg::ZombieKilled { from, zombie_id } => {
                if self.is_echo(from.as_ref()) {
                    self.stats.ignored += 1;
                    return None;
                }
                if let Some(id) = zombie_id {
                    if !self.recent_kills.insert(id) {
                        debug!(zombie_id = %id, "Duplicate kill notice");
                        self.stats.ignored += 1;
                        return None;
                    }
                }
                let outcome = sim.apply_remote_kill(zombie_id);
                debug!(
                    removed = outcome.removed,
                    score = sim.state().score,
                    "Remote kill applied"
                );
                self.stats.applied += 1;
                outcome.wave
            }
        }
    }

    fn is_echo(&self, from: Option<&ConnId>) -> bool {
        from.is_some() && from == self.self_id.as_ref()
    }

    /// Send this tick's local changes to the relay
    pub fn publish(&mut self, sim: &Simulation, events: &[SimEvent]) {
        let position = sim.state().player.position;
        if self.last_sent_position != Some(position) {
            let msg = ClientMsg::UpdatePosition {
                position: position.into(),
            };
            if self.send(&msg) {
                self.last_sent_position = Some(position);
            }
        }

        for event in events {
            match event {
                SimEvent::Fired {
                    origin, direction, ..
                } => {
                    self.send(&ClientMsg::Shoot {
                        position: (*origin).into(),
                        direction: (*direction).into(),
                    });
                }
                SimEvent::Killed { enemy_id } => {
                    self.recent_kills.insert(*enemy_id);
                    self.send(&ClientMsg::ZombieKilled {
                        zombie_id: Some(*enemy_id),
                    });
                }
                SimEvent::WaveStarted { spawned, .. } if self.share_wave_spawns => {
                    for (id, pos) in spawned {
                        self.send(&ClientMsg::SpawnZombie {
                            position: (*pos).into(),
                            zombie_id: Some(*id),
                        });
                    }
                }
                SimEvent::WaveStarted { .. } => {}
            }
        }
    }

    /// Advance observation-only remote shots by one tick
    pub fn advance_remote(&mut self) {
        self.remote_shots.advance();
    }

    pub fn remote_player_views(&self) -> Vec<(ConnId, Vec3)> {
        self.remote_players.views()
    }

    pub fn remote_shot_views(&self) -> Vec<EntityView> {
        self.remote_shots.views()
    }

    /// Send if the link is open. Failures are not retried.
    fn send(&mut self, msg: &ClientMsg) -> bool {
        if !self.link.is_open() {
            trace!("Relay unavailable, skipping send");
            self.stats.skipped += 1;
            return false;
        }
        match self.link.send(msg) {
            Ok(()) => {
                self.stats.sent += 1;
                true
            }
            Err(e) => {
                debug!(error = %e, "Relay send failed");
                self.stats.skipped += 1;
                false
            }
        }
    }
}
