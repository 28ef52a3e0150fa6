//! State mirrored from other clients

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use glam::Vec3;
use uuid::Uuid;

use crate::game::EntityView;
use crate::ws::protocol::{ConnId, PlayerEntry};

/// Last known position of every other connected client
#[derive(Debug, Clone, Default)]
pub struct RemotePlayerTable {
    players: HashMap<ConnId, Vec3>,
}

impl RemotePlayerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the table with a relay snapshot, skipping our own entry and
    /// non-finite positions. Entries missing from the snapshot have
    /// disconnected. Returns true if anything changed.
    pub fn apply_snapshot(
        &mut self,
        snapshot: &BTreeMap<ConnId, PlayerEntry>,
        self_id: Option<&ConnId>,
    ) -> bool {
        let next: HashMap<ConnId, Vec3> = snapshot
            .iter()
            .filter(|(id, _)| Some(*id) != self_id)
            .filter(|(_, entry)| entry.position.is_finite())
            .map(|(id, entry)| (id.clone(), Vec3::from(entry.position)))
            .collect();
        if next == self.players {
            return false;
        }
        self.players = next;
        true
    }

    pub fn remove(&mut self, id: &ConnId) -> Option<Vec3> {
        self.players.remove(id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// Entries sorted by id
    pub fn views(&self) -> Vec<(ConnId, Vec3)> {
        let mut out: Vec<(ConnId, Vec3)> = self
            .players
            .iter()
            .map(|(id, pos)| (id.clone(), *pos))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}

/// A shot fired by another client, drawn but never collided
#[derive(Debug, Clone)]
pub struct RemoteShot {
    pub id: Uuid,
    pub position: Vec3,
    pub velocity: Vec3,
    pub ttl: u32,
}

/// Observation-only projectiles
#[derive(Debug, Clone, Default)]
pub struct RemoteShots {
    shots: Vec<RemoteShot>,
}

impl RemoteShots {
    /// Add a shot; rejects zero or non-finite directions
    pub fn spawn(&mut self, origin: Vec3, direction: Vec3, speed: f32, ttl: u32) -> bool {
        if !origin.is_finite() {
            return false;
        }
        let Some(dir) = direction.try_normalize() else {
            return false;
        };
        self.shots.push(RemoteShot {
            id: Uuid::new_v4(),
            position: origin,
            velocity: dir * speed,
            ttl,
        });
        true
    }

    /// Move every shot one tick and drop expired ones
    pub fn advance(&mut self) {
        self.shots.retain_mut(|shot| {
            shot.position += shot.velocity;
            shot.ttl = shot.ttl.saturating_sub(1);
            shot.ttl > 0
        });
    }

    pub fn views(&self) -> Vec<EntityView> {
        self.shots
            .iter()
            .map(|s| EntityView {
                id: s.id,
                position: s.position,
            })
            .collect()
    }
}

/// Bounded memory of enemy ids already reported killed
#[derive(Debug, Clone)]
pub struct RecentKills {
    order: VecDeque<Uuid>,
    seen: HashSet<Uuid>,
    capacity: usize,
}

impl RecentKills {
    pub fn new(capacity: usize) -> Self {
        Self {
            order: VecDeque::with_capacity(capacity),
            seen: HashSet::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Record a kill; returns false if it was already recorded
    pub fn insert(&mut self, id: Uuid) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.order.push_back(id);
        if self.order.len() > self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }

    pub fn contains(&self, id: &Uuid) -> bool {
        self.seen.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::protocol::Position;

    fn entry(x: f32) -> PlayerEntry {
        PlayerEntry {
            position: Position { x, y: 0.5, z: 0.0 },
        }
    }

    fn id(s: &str) -> ConnId {
        ConnId(s.to_string())
    }

    #[test]
    fn snapshot_application_is_idempotent() {
        let mut table = RemotePlayerTable::new();
        let snapshot = BTreeMap::from([(id("a"), entry(1.0)), (id("b"), entry(2.0))]);

        assert!(table.apply_snapshot(&snapshot, None));
        let first = table.views();
        assert!(!table.apply_snapshot(&snapshot, None));
        assert_eq!(table.views(), first);
    }

    #[test]
    fn own_entry_and_departed_players_are_dropped() {
        let mut table = RemotePlayerTable::new();
        let me = id("me");
        let snapshot = BTreeMap::from([(me.clone(), entry(0.0)), (id("a"), entry(1.0))]);
        table.apply_snapshot(&snapshot, Some(&me));
        assert_eq!(table.len(), 1);
        assert!(table.views().iter().all(|(id, _)| *id != me));

        let after_leave = BTreeMap::from([(me.clone(), entry(0.0))]);
        assert!(table.apply_snapshot(&after_leave, Some(&me)));
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn non_finite_positions_are_ignored() {
        let mut table = RemotePlayerTable::new();
        let snapshot = BTreeMap::from([(id("a"), entry(f32::NAN))]);
        table.apply_snapshot(&snapshot, None);
        assert_eq!(table.len(), 0);
    }

    #[test]
    fn remote_shots_fly_and_expire() {
        let mut shots = RemoteShots::default();
        assert!(!shots.spawn(Vec3::ZERO, Vec3::ZERO, 1.0, 5));
        assert!(shots.spawn(Vec3::ZERO, Vec3::new(0.0, 0.0, -2.0), 1.0, 2));
        shots.advance();
        assert_eq!(shots.views()[0].position, Vec3::NEG_Z);
        shots.advance();
        assert!(shots.views().is_empty());
    }

    #[test]
    fn recent_kills_forget_oldest() {
        let mut kills = RecentKills::new(2);
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        assert!(kills.insert(a));
        assert!(!kills.insert(a));
        kills.insert(b);
        kills.insert(c);
        assert!(!kills.contains(&a));
        assert!(kills.contains(&b) && kills.contains(&c));
    }
}
