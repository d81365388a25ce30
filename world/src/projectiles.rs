//! Projectile flight, impact detection, and damage application.
//!
//! Impacts land one tick after detection: a projectile that finds its victim
//! marks the hit, and the following tick applies damage and any side effect.
//! A victim that dies in the meantime voids the shot.

use tower_defence_core::{MonsterId, PixelPoint, ProjectileKind, ProjectileSnapshot, TowerId};

use crate::monsters::MonsterState;

/// Flight behaviour of a projectile in the air.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Flight {
    /// Straight flight along a fixed velocity, limited by a flight range.
    Angled {
        velocity: (f32, f32),
        flight_range: f32,
        travelled: f32,
    },
    /// Homing flight re-aimed at the victim every tick.
    Tracking,
    /// Homing flight whose impact also slows the victim.
    Power { slow: f32 },
}

/// A projectile in flight, owned by the tower that fired it.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Projectile {
    pub(crate) tower: TowerId,
    pub(crate) position: PixelPoint,
    damage: i32,
    speed: f32,
    flight: Flight,
    hit: bool,
    target: Option<MonsterId>,
}

impl Projectile {
    /// Creates a straight-flying arrow along the given angle.
    pub(crate) fn angled(
        tower: TowerId,
        position: PixelPoint,
        damage: i32,
        speed: f32,
        angle: f32,
        flight_range: f32,
    ) -> Self {
        Self {
            tower,
            position,
            damage,
            speed,
            flight: Flight::Angled {
                velocity: (speed * angle.cos(), speed * (-angle).sin()),
                flight_range,
                travelled: 0.0,
            },
            hit: false,
            target: None,
        }
    }

    /// Creates a homing bullet locked on the given monster.
    pub(crate) fn tracking(
        tower: TowerId,
        position: PixelPoint,
        damage: i32,
        speed: f32,
        target: MonsterId,
    ) -> Self {
        Self {
            tower,
            position,
            damage,
            speed,
            flight: Flight::Tracking,
            hit: false,
            target: Some(target),
        }
    }

    /// Creates a homing shot that slows the given monster on impact.
    pub(crate) fn power(
        tower: TowerId,
        position: PixelPoint,
        damage: i32,
        speed: f32,
        target: MonsterId,
        slow: f32,
    ) -> Self {
        Self {
            tower,
            position,
            damage,
            speed,
            flight: Flight::Power { slow },
            hit: false,
            target: Some(target),
        }
    }

    /// Family of the projectile for query snapshots.
    pub(crate) fn kind(&self) -> ProjectileKind {
        match self.flight {
            Flight::Angled { .. } => ProjectileKind::Arrow,
            Flight::Tracking => ProjectileKind::Bullet,
            Flight::Power { .. } => ProjectileKind::PowerShot,
        }
    }

    /// Captures the projectile's state for query views.
    pub(crate) fn snapshot(&self) -> ProjectileSnapshot {
        ProjectileSnapshot {
            tower: self.tower,
            kind: self.kind(),
            position: self.position,
        }
    }

    /// Resolves one tick of flight. Returns `false` once the projectile
    /// should be discarded.
    pub(crate) fn step(&mut self, monsters: &mut [MonsterState], block_size: f32) -> bool {
        if let Some(target) = self.target {
            let alive = monsters
                .iter()
                .any(|monster| monster.id == target && monster.health > 0);
            if !alive {
                return false;
            }
        }

        if self.hit {
            if let Some(target) = self.target {
                if let Some(monster) = monsters.iter_mut().find(|monster| monster.id == target) {
                    monster.health -= self.damage;
                    match self.flight {
                        Flight::Angled { .. } => monster.stun(),
                        Flight::Power { slow } => monster.slow(slow),
                        Flight::Tracking => {}
                    }
                }
            }
            return false;
        }

        match &mut self.flight {
            Flight::Angled {
                velocity,
                flight_range,
                travelled,
            } => {
                self.position = PixelPoint::new(
                    self.position.x() + velocity.0,
                    self.position.y() + velocity.1,
                );
                *travelled += self.speed;
                if *travelled >= *flight_range {
                    return false;
                }
                let radius_squared = block_size * block_size;
                for monster in monsters.iter() {
                    if monster.position.distance_squared(self.position) <= radius_squared {
                        self.hit = true;
                        self.target = Some(monster.id);
                        break;
                    }
                }
            }
            Flight::Tracking | Flight::Power { .. } => {
                let Some(target) = self.target else {
                    return false;
                };
                let Some(monster) = monsters.iter().find(|monster| monster.id == target) else {
                    return false;
                };
                let dx = monster.position.x() - self.position.x();
                let dy = monster.position.y() - self.position.y();
                let length = (dx * dx + dy * dy).sqrt();
                if length > 0.0 {
                    self.position = PixelPoint::new(
                        self.position.x() + dx / length * self.speed,
                        self.position.y() + dy / length * self.speed,
                    );
                }
                if self.speed * self.speed > monster.position.distance_squared(self.position) {
                    self.hit = true;
                }
            }
        }
        true
    }
}
