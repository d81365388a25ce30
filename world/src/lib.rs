#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the tower defence simulation.
//!
//! The world owns the block grid, the monster path, every monster and tower,
//! and the player's stats. All mutation flows through [`apply`]; gameplay
//! failures such as an unaffordable tower are reported as rejection events
//! rather than errors, so a full command batch always applies cleanly.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_defence_core::{
    Command, Event, GridPoint, MonsterId, MonsterKind, PlacementError, SaleError, Stats, TowerId,
    TowerKind, UpgradeError,
};

mod grid;
mod monsters;
mod path;
mod projectiles;
mod towers;

pub use grid::{BlockGrid, MapError};
pub use path::{PathLattice, PathProgress};

use monsters::{MonsterState, StepOutcome};
use projectiles::Projectile;
use towers::TowerState;

const DEFAULT_BLOCK_SIZE: f32 = 20.0;
const DEFAULT_STARTING_MONEY: i64 = 1000;
const DEFAULT_STARTING_HEALTH: i32 = 100;
const DEFAULT_RNG_SEED: u64 = 0x9e37_79b9_7f4a_7c15;

/// Tunable parameters fixed at world construction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WorldConfig {
    /// Edge length of a grid block in pixels.
    pub block_size: f32,
    /// Money the player starts with.
    pub starting_money: i64,
    /// Health the player starts with.
    pub starting_health: i32,
    /// Seed for the deterministic split-jitter stream.
    pub rng_seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            starting_money: DEFAULT_STARTING_MONEY,
            starting_health: DEFAULT_STARTING_HEALTH,
            rng_seed: DEFAULT_RNG_SEED,
        }
    }
}

/// Represents the authoritative tower defence world state.
#[derive(Debug)]
pub struct World {
    grid: BlockGrid,
    path: PathLattice,
    monsters: Vec<MonsterState>,
    towers: BTreeMap<GridPoint, TowerState>,
    displayed: Option<GridPoint>,
    stats: Stats,
    next_monster_id: u32,
    next_tower_id: u32,
    rng: ChaCha8Rng,
}

impl World {
    /// Builds a world from a map template and configuration.
    pub fn from_template(template: &str, config: &WorldConfig) -> Result<Self, MapError> {
        let grid = BlockGrid::from_template(template, config.block_size)?;
        let path = PathLattice::resolve(&grid)?;
        Ok(Self {
            grid,
            path,
            monsters: Vec::new(),
            towers: BTreeMap::new(),
            displayed: None,
            stats: Stats {
                money: config.starting_money,
                health: config.starting_health,
            },
            next_monster_id: 0,
            next_tower_id: 0,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        })
    }

    fn spawn_monster(&mut self, kind: MonsterKind, distance: f32, out_events: &mut Vec<Event>) {
        let id = MonsterId::new(self.next_monster_id);
        self.next_monster_id += 1;
        let monster = MonsterState::spawn(id, kind, self.grid.block_size(), distance, &self.path);
        self.monsters.push(monster);
        out_events.push(Event::MonsterSpawned { monster: id, kind });
    }

    fn place_tower(&mut self, kind: TowerKind, at: GridPoint, out_events: &mut Vec<Event>) {
        let rejection = if !self.grid.contains(at) {
            Some(PlacementError::OutOfBounds)
        } else if !self.grid.kind_at(at).is_some_and(|block| block.is_buildable()) {
            Some(PlacementError::NotBuildable)
        } else if self.towers.contains_key(&at) {
            Some(PlacementError::Occupied)
        } else if self.stats.money < kind.build_cost() {
            Some(PlacementError::InsufficientFunds)
        } else {
            None
        };
        if let Some(reason) = rejection {
            out_events.push(Event::TowerPlacementRejected { kind, at, reason });
            return;
        }

        self.stats.money -= kind.build_cost();
        let id = TowerId::new(self.next_tower_id);
        self.next_tower_id += 1;
        let tower = TowerState::build(id, kind, at, self.grid.center_of(at), self.grid.block_size());
        let _ = self.towers.insert(at, tower);
        out_events.push(Event::TowerPlaced { tower: id, kind, at });
    }

    fn sell_tower(&mut self, at: GridPoint, out_events: &mut Vec<Event>) {
        let Some(tower) = self.towers.remove(&at) else {
            out_events.push(Event::TowerSaleRejected {
                at,
                reason: SaleError::NoTower,
            });
            return;
        };
        let refund = tower.last_spend / 2;
        self.stats.money += refund;
        if self.displayed == Some(at) {
            self.displayed = None;
        }
        out_events.push(Event::TowerSold {
            tower: tower.id,
            at,
            refund,
        });
    }

    fn upgrade_tower(&mut self, at: GridPoint, out_events: &mut Vec<Event>) {
        let block_size = self.grid.block_size();
        let money = self.stats.money;
        let Some(tower) = self.towers.get_mut(&at) else {
            out_events.push(Event::TowerUpgradeRejected {
                at,
                reason: UpgradeError::NoTower,
            });
            return;
        };
        let Some(cost) = tower.upgrade_cost else {
            out_events.push(Event::TowerUpgradeRejected {
                at,
                reason: UpgradeError::MaxLevel,
            });
            return;
        };
        if money < cost {
            out_events.push(Event::TowerUpgradeRejected {
                at,
                reason: UpgradeError::InsufficientFunds,
            });
            return;
        }
        let level = tower.upgrade(cost, block_size);
        let id = tower.id;
        self.stats.money -= cost;
        out_events.push(Event::TowerUpgraded {
            tower: id,
            level,
            cost,
        });
    }

    fn fire_projectile(&mut self, id: TowerId, out_events: &mut Vec<Event>) {
        let block_size = self.grid.block_size();
        let Some(tower) = self.towers.values_mut().find(|tower| tower.id == id) else {
            return;
        };
        if !tower.ready_to_fire() {
            return;
        }
        let Some(target_id) = tower.target else {
            return;
        };
        let Some(monster) = self
            .monsters
            .iter()
            .find(|monster| monster.id == target_id && monster.health > 0)
        else {
            return;
        };

        let origin = tower.pixel_loc;
        let damage = tower.stats.damage;
        let speed = tower.stats.projectile_speed;
        match tower.kind {
            TowerKind::ArrowShooter => {
                let angle = (origin.y() - monster.position.y())
                    .atan2(monster.position.x() - origin.x());
                tower.projectiles.push(Projectile::angled(
                    id,
                    origin,
                    damage,
                    speed,
                    angle,
                    tower.stats.range + block_size / 2.0,
                ));
            }
            TowerKind::BulletShooter => {
                tower
                    .projectiles
                    .push(Projectile::tracking(id, origin, damage, speed, target_id));
            }
            TowerKind::Power => {
                let slow = tower.stats.slow_factor.unwrap_or(1.0);
                tower
                    .projectiles
                    .push(Projectile::power(id, origin, damage, speed, target_id, slow));
            }
            TowerKind::Tack => {
                for spoke in 0..8 {
                    let angle = spoke as f32 * std::f32::consts::FRAC_PI_4;
                    tower.projectiles.push(Projectile::angled(
                        id,
                        origin,
                        damage,
                        speed,
                        angle,
                        tower.stats.range,
                    ));
                }
            }
        }
        tower.reset_counter();
        out_events.push(Event::ProjectileFired { tower: id });
    }

    fn step(&mut self, out_events: &mut Vec<Event>) {
        let block_size = self.grid.block_size();

        // Towers first: cooldowns advance and projectiles resolve against
        // the monsters as they stood at the end of the previous tick.
        {
            let Self {
                towers, monsters, ..
            } = self;
            for tower in towers.values_mut() {
                tower.advance_counter();
                tower
                    .projectiles
                    .retain_mut(|projectile| projectile.step(monsters, block_size));
            }
        }

        // Then every monster either dies, walks, or breaches.
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Fate {
            Alive,
            Killed,
            Breached,
        }
        let mut fates = vec![Fate::Alive; self.monsters.len()];
        {
            let Self {
                monsters, path, ..
            } = self;
            for (monster, fate) in monsters.iter_mut().zip(fates.iter_mut()) {
                if monster.health <= 0 {
                    *fate = Fate::Killed;
                    continue;
                }
                if monster.advance(path) == StepOutcome::Breached {
                    *fate = Fate::Breached;
                }
            }
        }

        // Sweep: settle the economy and queue split children. Children join
        // the roster after the scan, so they first act next tick.
        let mut pending: Vec<(MonsterKind, f32)> = Vec::new();
        let swept = std::mem::take(&mut self.monsters);
        for (monster, fate) in swept.into_iter().zip(fates) {
            match fate {
                Fate::Alive => self.monsters.push(monster),
                Fate::Killed => {
                    self.stats.money += monster.value;
                    let mut children = 0;
                    if let Some((kind, count)) = monster.kind.split() {
                        for _ in 0..count {
                            let jitter = block_size * (0.5 - self.rng.gen::<f32>());
                            let distance = (monster.distance + jitter).max(0.0);
                            pending.push((kind, distance));
                            children += 1;
                        }
                    }
                    out_events.push(Event::MonsterKilled {
                        monster: monster.id,
                        reward: monster.value,
                        children,
                    });
                }
                Fate::Breached => {
                    self.stats.health -= monster.breach_damage;
                    out_events.push(Event::MonsterBreached {
                        monster: monster.id,
                        damage: monster.breach_damage,
                    });
                }
            }
        }
        for (kind, distance) in pending {
            self.spawn_monster(kind, distance, out_events);
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick => world.step(out_events),
        Command::SpawnMonster { kind } => world.spawn_monster(kind, 0.0, out_events),
        Command::PlaceTower { kind, at } => world.place_tower(kind, at, out_events),
        Command::SellTower { at } => world.sell_tower(at, out_events),
        Command::UpgradeTower { at } => world.upgrade_tower(at, out_events),
        Command::SetTargetStrategy { at, strategy } => {
            if let Some(tower) = world.towers.get_mut(&at) {
                tower.strategy = strategy;
            }
        }
        Command::ToggleStickyTarget { at } => {
            if let Some(tower) = world.towers.get_mut(&at) {
                tower.sticky_target = !tower.sticky_target;
            }
        }
        Command::SelectTower { at } => match at {
            Some(at) if world.towers.contains_key(&at) => world.displayed = Some(at),
            Some(_) => {}
            None => world.displayed = None,
        },
        Command::SetTowerTarget { tower, target } => {
            if let Some(tower) = world.towers.values_mut().find(|state| state.id == tower) {
                tower.target = target;
            }
        }
        Command::FireProjectile { tower } => world.fire_projectile(tower, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use tower_defence_core::{
        GridPoint, MonsterView, ProjectileSnapshot, Stats, TowerSnapshot, TowerView,
    };

    /// Edge length of a grid block in pixels.
    #[must_use]
    pub fn block_size(world: &World) -> f32 {
        world.grid.block_size()
    }

    /// Number of cells along each edge of the square grid.
    #[must_use]
    pub fn grid_dimension(world: &World) -> u32 {
        world.grid.dimension()
    }

    /// Current money and health counters.
    #[must_use]
    pub fn stats(world: &World) -> Stats {
        world.stats
    }

    /// Captures a read-only view of all live monsters.
    #[must_use]
    pub fn monster_view(world: &World) -> MonsterView {
        MonsterView::from_snapshots(
            world
                .monsters
                .iter()
                .map(|monster| monster.snapshot())
                .collect(),
        )
    }

    /// Captures a read-only view of all constructed towers.
    #[must_use]
    pub fn tower_view(world: &World) -> TowerView {
        TowerView::from_snapshots(world.towers.values().map(|tower| tower.snapshot()).collect())
    }

    /// Captures the projectiles currently in flight, grouped by owner order.
    #[must_use]
    pub fn projectile_view(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .towers
            .values()
            .flat_map(|tower| tower.projectiles.iter().map(|projectile| projectile.snapshot()))
            .collect()
    }

    /// Snapshot of the tower marked for the info panel, if any.
    #[must_use]
    pub fn displayed_tower(world: &World) -> Option<TowerSnapshot> {
        let at: GridPoint = world.displayed?;
        world.towers.get(&at).map(|tower| tower.snapshot())
    }
}
