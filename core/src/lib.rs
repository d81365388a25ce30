#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Tower Defence engine.
//!
//! This crate defines the message surface that connects the presentation
//! layer, the authoritative world, and the pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point and broadcasts [`Event`] values, and
//! systems consume immutable snapshot views to respond exclusively with new
//! command batches. The stat catalogs for every monster and tower variant
//! also live here so that no crate re-invents the numbers.

use serde::{Deserialize, Serialize};

/// Number of ticks that make up one simulated second of fire-rate budget.
///
/// A tower becomes ready to fire every `TICKS_PER_SECOND / rate` ticks.
pub const TICKS_PER_SECOND: u32 = 20;

/// Location of a single grid cell expressed as column and row indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPoint {
    column: u32,
    row: u32,
}

impl GridPoint {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }
}

/// Continuous pixel-space position derived from grid geometry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelPoint {
    x: f32,
    y: f32,
}

impl PixelPoint {
    /// Creates a new pixel-space position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal pixel coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical pixel coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Squared Euclidean distance to another position.
    #[must_use]
    pub fn distance_squared(self, other: PixelPoint) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// True Euclidean distance to another position.
    #[must_use]
    pub fn distance(self, other: PixelPoint) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

/// Movement direction recorded for one whole block-width of path travel.
///
/// The [`Direction::End`] marker terminates every direction sequence: a
/// monster whose whole-block progress lands on it has walked off the map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing row indices.
    Up,
    /// Terminal marker appended once no further path cell is reachable.
    End,
}

impl Direction {
    /// The direction that undoes this one. `End` reverses to itself.
    #[must_use]
    pub const fn opposite(self) -> Direction {
        match self {
            Direction::Right => Direction::Left,
            Direction::Left => Direction::Right,
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::End => Direction::End,
        }
    }

    /// Unit displacement in whole grid cells. `End` does not displace.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::Right => (1, 0),
            Direction::Left => (-1, 0),
            Direction::Down => (0, 1),
            Direction::Up => (0, -1),
            Direction::End => (0, 0),
        }
    }
}

/// Terrain classification of a single grid block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockKind {
    /// Buildable ground.
    Empty,
    /// Part of the monster walkway.
    Path,
    /// Scenery that blocks building.
    Water,
}

impl BlockKind {
    /// Decodes the numeric block value used by map templates.
    #[must_use]
    pub const fn from_index(value: u32) -> Option<Self> {
        match value {
            0 => Some(BlockKind::Empty),
            1 => Some(BlockKind::Path),
            2 => Some(BlockKind::Water),
            _ => None,
        }
    }

    /// Reports whether a tower may be constructed on this terrain.
    #[must_use]
    pub const fn is_buildable(self) -> bool {
        matches!(self, BlockKind::Empty)
    }
}

/// Unique identifier assigned to a monster by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MonsterId(u32);

impl MonsterId {
    /// Creates a new monster identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a tower by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TowerId(u32);

impl TowerId {
    /// Creates a new tower identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Candidate ordering a tower scans when (re)acquiring a target.
///
/// The scan never early-exits, so the effective pick is the *last* in-range
/// candidate of the chosen ordering. That quirk is part of the simulation
/// contract and pinned by tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetStrategy {
    /// Candidates sorted by remaining health, highest first.
    HealthDescending,
    /// Candidates sorted by remaining health, lowest first.
    HealthAscending,
    /// Candidates sorted by distance travelled, shortest first.
    DistanceAscending,
    /// Candidates sorted by distance travelled, longest first.
    DistanceDescending,
}

/// Phase of the wave spawn state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WavePhase {
    /// No wave in flight; the next wave may be requested.
    Idle,
    /// A wave was requested and its schedule line will be consumed next tick.
    WaitForSpawn,
    /// Monsters from the current wave line are being released.
    Spawning,
}

/// Player-facing economy and survival counters.
///
/// Both fields are plain signed integers on purpose: money may exceed any
/// displayed cap and health has no floor. Game-over presentation is the
/// responsibility of the outer layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Spendable currency, credited by kills and debited by construction.
    pub money: i64,
    /// Remaining player health, debited by breaches.
    pub health: i32,
}

/// Concrete monster variants, indexable by wave-file position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MonsterKind {
    /// Fast, fragile runner.
    Firefly,
    /// Mid-tier walker that releases a [`MonsterKind::Firefly`] on death.
    Scarab,
    /// Heavy carrier that splits into five scarabs.
    Alex,
    /// Carrier that splits into two [`MonsterKind::Leo`] runners.
    Ben,
    /// Small swarm runner with a token bounty.
    Leo,
    /// Slow siege monster with a deliberately tiny bounty.
    Colossus,
}

/// Stat record describing one monster variant at a given block width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterStats {
    /// Health the monster spawns with.
    pub max_health: i32,
    /// Money credited when the monster dies in combat.
    pub value: i64,
    /// Pixels advanced per natural move.
    pub speed: f32,
    /// Step size of the very first move.
    pub first_step: f32,
    /// Player health debited when the monster walks off the path.
    pub breach_damage: i32,
}

impl MonsterKind {
    /// Decodes the wave-file index of a monster variant.
    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(MonsterKind::Firefly),
            1 => Some(MonsterKind::Scarab),
            2 => Some(MonsterKind::Alex),
            3 => Some(MonsterKind::Ben),
            4 => Some(MonsterKind::Leo),
            5 => Some(MonsterKind::Colossus),
            _ => None,
        }
    }

    /// Stat table for the variant, scaled to the provided block width.
    #[must_use]
    pub fn stats(self, block_size: f32) -> MonsterStats {
        let (max_health, value, speed_divisor) = match self {
            MonsterKind::Firefly => (30, 5, 2.0),
            MonsterKind::Scarab => (50, 10, 4.0),
            MonsterKind::Alex => (500, 100, 5.0),
            MonsterKind::Ben => (200, 30, 4.0),
            MonsterKind::Leo => (20, 2, 2.0),
            MonsterKind::Colossus => (1000, 10, 6.0),
        };
        let speed = block_size / speed_divisor;
        let first_step = match self {
            MonsterKind::Firefly => block_size / 3.0,
            _ => speed,
        };
        MonsterStats {
            max_health,
            value,
            speed,
            first_step,
            breach_damage: 1,
        }
    }

    /// Children released by a combat death, as `(kind, count)`.
    ///
    /// Breaches never split; leaf variants return `None`.
    #[must_use]
    pub const fn split(self) -> Option<(MonsterKind, u32)> {
        match self {
            MonsterKind::Scarab => Some((MonsterKind::Firefly, 1)),
            MonsterKind::Alex => Some((MonsterKind::Scarab, 5)),
            MonsterKind::Ben => Some((MonsterKind::Leo, 2)),
            MonsterKind::Firefly | MonsterKind::Leo | MonsterKind::Colossus => None,
        }
    }
}

/// Concrete tower variants available in the build catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Long-range arrow tower; the only variant with level upgrades.
    ArrowShooter,
    /// Mid-range tower firing homing bullets.
    BulletShooter,
    /// Short-range tower that fires an eight-way arrow volley.
    Tack,
    /// High-rate tower whose shots slow their victim.
    Power,
}

/// Stat record describing one tower variant at a given block width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerStats {
    /// Targeting radius in pixels, before the half-block grace margin.
    pub range: f32,
    /// Bullets per second of fire-rate budget.
    pub rate: u32,
    /// Health subtracted from a monster per projectile hit.
    pub damage: i32,
    /// Pixels a projectile advances per tick.
    pub projectile_speed: f32,
    /// Slow divisor applied on hit; `None` for towers that do not slow.
    pub slow_factor: Option<f32>,
}

impl TowerKind {
    /// Money required to place the tower.
    #[must_use]
    pub const fn build_cost(self) -> i64 {
        match self {
            TowerKind::ArrowShooter | TowerKind::BulletShooter | TowerKind::Tack => 150,
            TowerKind::Power => 200,
        }
    }

    /// Base stat table for a freshly built level-1 tower.
    #[must_use]
    pub fn base_stats(self, block_size: f32) -> TowerStats {
        match self {
            TowerKind::ArrowShooter => TowerStats {
                range: block_size * 10.0,
                rate: 1,
                damage: 10,
                projectile_speed: block_size,
                slow_factor: None,
            },
            TowerKind::BulletShooter => TowerStats {
                range: block_size * 6.0,
                rate: 4,
                damage: 5,
                projectile_speed: block_size / 2.0,
                slow_factor: None,
            },
            TowerKind::Tack => TowerStats {
                range: block_size * 5.0,
                rate: 1,
                damage: 10,
                projectile_speed: block_size,
                slow_factor: None,
            },
            TowerKind::Power => TowerStats {
                range: block_size * 8.0,
                rate: 10,
                damage: 1,
                projectile_speed: block_size,
                slow_factor: Some(3.0),
            },
        }
    }

    /// Cost of the first upgrade, or `None` when the variant never upgrades.
    #[must_use]
    pub const fn initial_upgrade_cost(self) -> Option<i64> {
        match self {
            TowerKind::ArrowShooter => Some(50),
            TowerKind::BulletShooter | TowerKind::Tack | TowerKind::Power => None,
        }
    }

    /// Applies the stat deltas for reaching `level` and returns the cost of
    /// the following upgrade, or `None` once the tower is at max level.
    #[must_use]
    pub fn apply_level(self, level: u32, block_size: f32, stats: &mut TowerStats) -> Option<i64> {
        match (self, level) {
            (TowerKind::ArrowShooter, 2) => {
                stats.range = block_size * 11.0;
                stats.damage = 12;
                Some(100)
            }
            (TowerKind::ArrowShooter, 3) => {
                stats.rate = 2;
                None
            }
            _ => None,
        }
    }
}

/// Projectile families tracked by snapshots.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProjectileKind {
    /// Straight-flying arrow with a finite flight range.
    Arrow,
    /// Homing bullet locked on a single monster.
    Bullet,
    /// Homing shot that also slows its victim.
    PowerShot,
}

/// Reasons a tower placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell lies beyond the grid bounds.
    OutOfBounds,
    /// The requested cell is path or water terrain.
    NotBuildable,
    /// The requested cell already holds a tower.
    Occupied,
    /// The player cannot afford the tower's build cost.
    InsufficientFunds,
}

/// Reasons a tower sale request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SaleError {
    /// No tower stands on the provided cell.
    NoTower,
}

/// Reasons a tower upgrade request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpgradeError {
    /// No tower stands on the provided cell.
    NoTower,
    /// The tower has exhausted its level table.
    MaxLevel,
    /// The player cannot afford the upgrade cost.
    InsufficientFunds,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation by exactly one fixed timestep.
    Tick,
    /// Releases a new monster at the path entry point.
    SpawnMonster {
        /// Variant of monster to create.
        kind: MonsterKind,
    },
    /// Requests construction of a tower on the provided cell.
    PlaceTower {
        /// Variant of tower to construct.
        kind: TowerKind,
        /// Grid cell that should hold the tower.
        at: GridPoint,
    },
    /// Requests removal and partial refund of the tower on a cell.
    SellTower {
        /// Grid cell whose tower should be sold.
        at: GridPoint,
    },
    /// Requests a level upgrade for the tower on a cell.
    UpgradeTower {
        /// Grid cell whose tower should be upgraded.
        at: GridPoint,
    },
    /// Changes the candidate ordering a tower scans for targets.
    SetTargetStrategy {
        /// Grid cell whose tower is reconfigured.
        at: GridPoint,
        /// Ordering the tower should scan from now on.
        strategy: TargetStrategy,
    },
    /// Flips whether a tower holds its target until it becomes invalid.
    ToggleStickyTarget {
        /// Grid cell whose tower is reconfigured.
        at: GridPoint,
    },
    /// Marks a tower as displayed for the info panel, or clears the mark.
    SelectTower {
        /// Grid cell to display, or `None` to clear the selection.
        at: Option<GridPoint>,
    },
    /// Records the target a tower resolved during this tick.
    SetTowerTarget {
        /// Tower whose held target changes.
        tower: TowerId,
        /// Newly resolved target, or `None` when the tower lost its target.
        target: Option<MonsterId>,
    },
    /// Discharges a ready tower at its held target.
    FireProjectile {
        /// Tower that should fire.
        tower: TowerId,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a monster entered the maze at the path entry point.
    MonsterSpawned {
        /// Identifier assigned to the new monster.
        monster: MonsterId,
        /// Variant that was created.
        kind: MonsterKind,
    },
    /// Reports a combat death together with its economy effects.
    MonsterKilled {
        /// Identifier of the monster that died.
        monster: MonsterId,
        /// Money credited for the kill.
        reward: i64,
        /// Number of child monsters released by the death.
        children: u32,
    },
    /// Reports a monster walking off the end of the path.
    MonsterBreached {
        /// Identifier of the monster that got through.
        monster: MonsterId,
        /// Player health debited by the breach.
        damage: i32,
    },
    /// Confirms that a tower was constructed.
    TowerPlaced {
        /// Identifier assigned to the tower by the world.
        tower: TowerId,
        /// Variant that was constructed.
        kind: TowerKind,
        /// Cell the tower occupies.
        at: GridPoint,
    },
    /// Reports that a tower placement request was rejected.
    TowerPlacementRejected {
        /// Variant requested for placement.
        kind: TowerKind,
        /// Cell provided in the placement request.
        at: GridPoint,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a tower was sold and removed.
    TowerSold {
        /// Identifier of the tower that was removed.
        tower: TowerId,
        /// Cell the tower previously occupied.
        at: GridPoint,
        /// Money credited back to the player.
        refund: i64,
    },
    /// Reports that a tower sale request was rejected.
    TowerSaleRejected {
        /// Cell provided in the sale request.
        at: GridPoint,
        /// Specific reason the sale failed.
        reason: SaleError,
    },
    /// Confirms that a tower reached a new level.
    TowerUpgraded {
        /// Identifier of the upgraded tower.
        tower: TowerId,
        /// Level the tower now holds.
        level: u32,
        /// Money debited for the upgrade.
        cost: i64,
    },
    /// Reports that a tower upgrade request was rejected.
    TowerUpgradeRejected {
        /// Cell provided in the upgrade request.
        at: GridPoint,
        /// Specific reason the upgrade failed.
        reason: UpgradeError,
    },
    /// Confirms that a tower discharged at its held target.
    ProjectileFired {
        /// Tower that fired.
        tower: TowerId,
    },
}

/// Immutable representation of a single monster's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MonsterSnapshot {
    /// Unique identifier assigned to the monster.
    pub id: MonsterId,
    /// Variant of the monster.
    pub kind: MonsterKind,
    /// Remaining health; zero or below means the monster dies this tick.
    pub health: i32,
    /// Health the monster spawned with.
    pub max_health: i32,
    /// Pixel-space position derived from the distance travelled.
    pub position: PixelPoint,
    /// Cumulative path distance, the canonical position encoding.
    pub distance_travelled: f32,
    /// Natural step size in pixels.
    pub speed: f32,
    /// Step size of the next move, possibly reduced by a slow effect.
    pub movement: f32,
}

/// Read-only view describing all live monsters, ordered by identifier.
#[derive(Clone, Debug, Default)]
pub struct MonsterView {
    snapshots: Vec<MonsterSnapshot>,
}

impl MonsterView {
    /// Creates a new monster view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<MonsterSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &MonsterSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for a specific monster, if it is alive.
    #[must_use]
    pub fn get(&self, id: MonsterId) -> Option<&MonsterSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Number of live monsters captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no monsters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<MonsterSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single tower's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerSnapshot {
    /// Identifier allocated to the tower by the world.
    pub id: TowerId,
    /// Variant of the tower.
    pub kind: TowerKind,
    /// Cell the tower occupies.
    pub grid_loc: GridPoint,
    /// Pixel-space center of the tower.
    pub pixel_loc: PixelPoint,
    /// Current level, starting at 1.
    pub level: u32,
    /// Targeting radius in pixels, before the half-block grace margin.
    pub range: f32,
    /// Health subtracted from a monster per projectile hit.
    pub damage: i32,
    /// Bullets per second of fire-rate budget.
    pub rate: u32,
    /// Cost of the next upgrade, or `None` at max level.
    pub upgrade_cost: Option<i64>,
    /// Candidate ordering scanned when acquiring targets.
    pub strategy: TargetStrategy,
    /// Whether the tower holds its target until it becomes invalid.
    pub sticky_target: bool,
    /// Monster the tower currently tracks, if any.
    pub target: Option<MonsterId>,
    /// Whether the fire-rate counter has reached its threshold.
    pub ready_to_fire: bool,
}

/// Read-only view describing all towers, ordered by identifier.
#[derive(Clone, Debug, Default)]
pub struct TowerView {
    snapshots: Vec<TowerSnapshot>,
}

impl TowerView {
    /// Creates a new tower view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<TowerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &TowerSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up the snapshot for a specific tower.
    #[must_use]
    pub fn get(&self, id: TowerId) -> Option<&TowerSnapshot> {
        self.snapshots
            .binary_search_by_key(&id, |snapshot| snapshot.id)
            .ok()
            .map(|index| &self.snapshots[index])
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<TowerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a projectile in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProjectileSnapshot {
    /// Tower that owns the projectile.
    pub tower: TowerId,
    /// Family of the projectile.
    pub kind: ProjectileKind,
    /// Current pixel-space position.
    pub position: PixelPoint,
}

/// Target assignment resolved by the targeting system for one tick.
///
/// An assignment means the tower holds a live target within true firing
/// range this tick; the combat system decides whether the tower actually
/// discharges based on its fire-rate readiness.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TowerTarget {
    /// Tower holding the target.
    pub tower: TowerId,
    /// Monster the tower may fire at this tick.
    pub monster: MonsterId,
}
