//! Combat system - projectiles and hit detection

use glam::Vec3;
use uuid::Uuid;

use super::enemy::EnemySet;

/// Weapon constants
#[derive(Debug, Clone, Copy)]
pub struct WeaponStats {
    /// Distance travelled per tick
    pub projectile_speed: f32,
    /// Ticks before an unmatched projectile is discarded
    pub projectile_ttl: u32,
    /// Projectile-to-enemy distance that counts as a hit (exclusive)
    pub hit_radius: f32,
}

impl Default for WeaponStats {
    fn default() -> Self {
        Self {
            projectile_speed: 1.0,
            projectile_ttl: 180,
            hit_radius: 1.0,
        }
    }
}

/// Active projectile fired by the local player
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: Uuid,
    pub position: Vec3,
    /// Unit direction times speed, per tick
    pub velocity: Vec3,
    pub ttl: u32,
}

impl Projectile {
    /// Create a projectile; `None` if the direction has no length
    pub fn new(origin: Vec3, direction: Vec3, stats: &WeaponStats) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self {
            id: Uuid::new_v4(),
            position: origin,
            velocity: direction * stats.projectile_speed,
            ttl: stats.projectile_ttl,
        })
    }

    /// Advance one tick and burn one tick of lifetime
    pub fn advance(&mut self) {
        self.position += self.velocity;
        self.ttl = self.ttl.saturating_sub(1);
    }

    pub fn expired(&self) -> bool {
        self.ttl == 0
    }
}

/// A projectile that reached an enemy
#[derive(Debug, Clone, PartialEq)]
pub struct Kill {
    pub projectile_id: Uuid,
    pub enemy_id: Uuid,
    pub position: Vec3,
}

/// Outcome of one collision pass
#[derive(Debug, Clone, Default)]
pub struct CollisionReport {
    /// Kills in resolution order
    pub kills: Vec<Kill>,
    /// Projectiles dropped for running out of lifetime
    pub expired: usize,
    /// The enemy set went from non-empty to empty during this pass
    pub wave_cleared: bool,
}

/// Combat system for projectile movement and hit resolution
pub struct CombatSystem;

impl CombatSystem {
    /// Advance all projectiles and remove every projectile/enemy pair that met.
    ///
    /// Projectiles are resolved in insertion order. Each one removes at most the
    /// first enemy (in enemy insertion order) within the hit radius, and an
    /// enemy removed by an earlier projectile cannot be hit again this tick.
    pub fn resolve(
        projectiles: &mut Vec<Projectile>,
        enemies: &mut EnemySet,
        stats: &WeaponStats,
    ) -> CollisionReport {
        let had_enemies = !enemies.is_empty();
        let mut report = CollisionReport::default();

        projectiles.retain_mut(|projectile| {
            projectile.advance();

            if let Some(enemy) = enemies.take_first_within(projectile.position, stats.hit_radius) {
                report.kills.push(Kill {
                    projectile_id: projectile.id,
                    enemy_id: enemy.id,
                    position: enemy.position,
                });
                return false;
            }

            if projectile.expired() {
                report.expired += 1;
                return false;
            }
            true
        });

        report.wave_cleared = had_enemies && enemies.is_empty();
        report
    }
}
