//! Enemies and greedy pursuit

use glam::Vec3;
use uuid::Uuid;

/// Distance moved toward the player every tick
pub const DEFAULT_PURSUIT_STEP: f32 = 0.02;

/// A live enemy
#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub id: Uuid,
    pub position: Vec3,
}

impl Enemy {
    pub fn new(position: Vec3) -> Self {
        Self::with_id(Uuid::new_v4(), position)
    }

    pub fn with_id(id: Uuid, position: Vec3) -> Self {
        Self { id, position }
    }
}

/// The active enemy set.
///
/// Iteration order is insertion order; collision tie-breaking relies on it.
#[derive(Debug, Clone, Default)]
pub struct EnemySet {
    enemies: Vec<Enemy>,
}

impl EnemySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an enemy. Returns false (and does nothing) if the id is already present.
    pub fn insert(&mut self, enemy: Enemy) -> bool {
        if self.contains(enemy.id) {
            return false;
        }
        self.enemies.push(enemy);
        true
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Enemy> {
        let idx = self.enemies.iter().position(|e| e.id == id)?;
        Some(self.enemies.remove(idx))
    }

    /// Remove and return the first enemy (in insertion order) strictly within `radius` of `point`
    pub fn take_first_within(&mut self, point: Vec3, radius: f32) -> Option<Enemy> {
        let radius_sq = radius * radius;
        let idx = self
            .enemies
            .iter()
            .position(|e| e.position.distance_squared(point) < radius_sq)?;
        Some(self.enemies.remove(idx))
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: Uuid) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn clear(&mut self) {
        self.enemies.clear();
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Enemy> {
        self.enemies.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Enemy> {
        self.enemies.iter_mut()
    }
}

/// Steers every enemy straight at the player
pub struct PursuitSystem;

impl PursuitSystem {
    /// Move each enemy `step` units toward `target`, never past it
    pub fn step(enemies: &mut EnemySet, target: Vec3, step: f32) {
        for enemy in enemies.iter_mut() {
            enemy.position = Self::advance(enemy.position, target, step);
        }
    }

    fn advance(from: Vec3, target: Vec3, step: f32) -> Vec3 {
        let offset = target - from;
        let distance = offset.length();
        if distance <= step {
            return target;
        }
        from + offset / distance * step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_rejects_duplicate_ids() {
        let mut set = EnemySet::new();
        let enemy = Enemy::new(Vec3::ZERO);
        assert!(set.insert(enemy.clone()));
        assert!(!set.insert(enemy));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn take_first_within_respects_insertion_order() {
        let mut set = EnemySet::new();
        let far = Enemy::new(Vec3::new(0.9, 0.0, 0.0));
        let near = Enemy::new(Vec3::new(0.1, 0.0, 0.0));
        set.insert(far.clone());
        set.insert(near.clone());

        let hit = set.take_first_within(Vec3::ZERO, 1.0).unwrap();
        assert_eq!(hit.id, far.id);
        assert!(set.contains(near.id));
    }

    #[test]
    fn radius_is_exclusive() {
        let mut set = EnemySet::new();
        set.insert(Enemy::new(Vec3::new(1.0, 0.0, 0.0)));
        assert!(set.take_first_within(Vec3::ZERO, 1.0).is_none());
    }

    #[test]
    fn pursuit_closes_distance_by_one_step() {
        let mut set = EnemySet::new();
        let enemy = Enemy::new(Vec3::new(10.0, 0.5, 0.0));
        set.insert(enemy.clone());
        let target = Vec3::new(0.0, 0.5, 0.0);

        PursuitSystem::step(&mut set, target, 0.5);
        let moved = set.get(enemy.id).unwrap().position;
        assert!((moved.distance(target) - 9.5).abs() < 1e-5);
    }

    #[test]
    fn pursuit_converges_monotonically_without_overshoot() {
        let mut set = EnemySet::new();
        set.insert(Enemy::new(Vec3::new(3.0, 0.5, -4.0)));
        set.insert(Enemy::new(Vec3::new(-1.0, 2.0, 1.0)));
        let target = Vec3::new(0.0, 0.5, 0.0);

        let mut last: Vec<f32> = set.iter().map(|e| e.position.distance(target)).collect();
        for _ in 0..400 {
            PursuitSystem::step(&mut set, target, DEFAULT_PURSUIT_STEP);
            let now: Vec<f32> = set.iter().map(|e| e.position.distance(target)).collect();
            for (a, b) in last.iter().zip(&now) {
                assert!(b <= a);
            }
            last = now;
        }
        PursuitSystem::step(&mut set, target, 10.0);
        assert!(set.iter().all(|e| e.position == target));
    }
}
