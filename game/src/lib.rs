#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session orchestrator that wires the world and the pure systems together.
//!
//! A [`Session`] owns the authoritative world plus the wave, targeting, and
//! combat systems, and drives them in a fixed order every tick. Player
//! actions apply immediately between ticks and come back as typed results,
//! while the per-tick event stream is retained for observers until the next
//! [`Session::update`].

use std::fs;
use std::path::Path;

use anyhow::Context;
use thiserror::Error;
use tower_defence_core::{
    Command, Event, GridPoint, MonsterView, PlacementError, ProjectileSnapshot, SaleError, Stats,
    TargetStrategy, TowerId, TowerKind, TowerSnapshot, TowerTarget, TowerView, UpgradeError,
    WavePhase,
};
use tower_defence_system_combat::Combat;
use tower_defence_system_targeting::Targeting;
use tower_defence_system_waves::{WaveFileError, Waves};
use tower_defence_world::{apply, query, MapError, World, WorldConfig};

/// Failures raised while assembling a session from its source texts.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum SetupError {
    /// The map template could not be parsed into a world.
    #[error(transparent)]
    Map(#[from] MapError),
    /// The wave file could not be parsed into a schedule.
    #[error(transparent)]
    Waves(#[from] WaveFileError),
}

/// A running game: the world, its systems, and their scratch buffers.
#[derive(Debug)]
pub struct Session {
    world: World,
    waves: Waves,
    targeting: Targeting,
    combat: Combat,
    commands: Vec<Command>,
    targets: Vec<TowerTarget>,
    events: Vec<Event>,
}

impl Session {
    /// Assembles a session from a map template and a wave file text.
    pub fn from_text(map: &str, waves: &str, config: &WorldConfig) -> Result<Self, SetupError> {
        Ok(Self {
            world: World::from_template(map, config)?,
            waves: Waves::from_text(waves)?,
            targeting: Targeting::new(),
            combat: Combat::new(),
            commands: Vec::new(),
            targets: Vec::new(),
            events: Vec::new(),
        })
    }

    /// Assembles a session by reading the map and wave files from disk.
    pub fn load(
        map_path: &Path,
        waves_path: &Path,
        config: &WorldConfig,
    ) -> anyhow::Result<Self> {
        let map = fs::read_to_string(map_path)
            .with_context(|| format!("reading map file {}", map_path.display()))?;
        let waves = fs::read_to_string(waves_path)
            .with_context(|| format!("reading wave file {}", waves_path.display()))?;
        let session = Self::from_text(&map, &waves, config)
            .with_context(|| format!("assembling session from {}", map_path.display()))?;
        Ok(session)
    }

    /// Advances the game by one fixed timestep.
    ///
    /// Order within a tick: wave spawns enter first, then targeting resolves
    /// against the fresh roster, combat queues shots for ready towers, and
    /// finally the world steps projectiles and monsters.
    pub fn update(&mut self) -> &[Event] {
        self.events.clear();

        self.commands.clear();
        self.waves.handle(&mut self.commands);
        for command in self.commands.drain(..) {
            apply(&mut self.world, command, &mut self.events);
        }

        let towers = query::tower_view(&self.world);
        let monsters = query::monster_view(&self.world);
        self.targeting.handle(
            &towers,
            &monsters,
            query::block_size(&self.world),
            &mut self.targets,
            &mut self.commands,
        );
        for command in self.commands.drain(..) {
            apply(&mut self.world, command, &mut self.events);
        }

        self.combat.handle(&towers, &self.targets, &mut self.commands);
        for command in self.commands.drain(..) {
            apply(&mut self.world, command, &mut self.events);
        }

        apply(&mut self.world, Command::Tick, &mut self.events);
        &self.events
    }

    /// Requests the next wave; accepted only between waves with an empty
    /// maze. Returns whether the wave was started.
    pub fn start_next_wave(&mut self) -> bool {
        let live = query::monster_view(&self.world).len();
        self.waves.request_next_wave(live)
    }

    /// Attempts to build a tower, returning its identifier on success.
    pub fn place_tower(&mut self, kind: TowerKind, at: GridPoint) -> Result<TowerId, PlacementError> {
        let start = self.events.len();
        apply(
            &mut self.world,
            Command::PlaceTower { kind, at },
            &mut self.events,
        );
        for event in &self.events[start..] {
            match *event {
                Event::TowerPlaced { tower, .. } => return Ok(tower),
                Event::TowerPlacementRejected { reason, .. } => return Err(reason),
                _ => {}
            }
        }
        Err(PlacementError::OutOfBounds)
    }

    /// Attempts to sell the tower on a cell, returning the refund.
    pub fn sell_tower(&mut self, at: GridPoint) -> Result<i64, SaleError> {
        let start = self.events.len();
        apply(&mut self.world, Command::SellTower { at }, &mut self.events);
        for event in &self.events[start..] {
            match *event {
                Event::TowerSold { refund, .. } => return Ok(refund),
                Event::TowerSaleRejected { reason, .. } => return Err(reason),
                _ => {}
            }
        }
        Err(SaleError::NoTower)
    }

    /// Attempts to upgrade the tower on a cell, returning its new level.
    pub fn upgrade_tower(&mut self, at: GridPoint) -> Result<u32, UpgradeError> {
        let start = self.events.len();
        apply(
            &mut self.world,
            Command::UpgradeTower { at },
            &mut self.events,
        );
        for event in &self.events[start..] {
            match *event {
                Event::TowerUpgraded { level, .. } => return Ok(level),
                Event::TowerUpgradeRejected { reason, .. } => return Err(reason),
                _ => {}
            }
        }
        Err(UpgradeError::NoTower)
    }

    /// Changes the candidate ordering scanned by the tower on a cell.
    pub fn set_target_strategy(&mut self, at: GridPoint, strategy: TargetStrategy) {
        apply(
            &mut self.world,
            Command::SetTargetStrategy { at, strategy },
            &mut self.events,
        );
    }

    /// Flips the sticky-target flag of the tower on a cell.
    pub fn toggle_sticky_target(&mut self, at: GridPoint) {
        apply(
            &mut self.world,
            Command::ToggleStickyTarget { at },
            &mut self.events,
        );
    }

    /// Marks a tower for the info panel, or clears the mark with `None`.
    pub fn select_tower(&mut self, at: Option<GridPoint>) {
        apply(&mut self.world, Command::SelectTower { at }, &mut self.events);
    }

    /// Events produced by the latest [`Session::update`] plus any player
    /// actions applied since.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Current money and health counters.
    #[must_use]
    pub fn stats(&self) -> Stats {
        query::stats(&self.world)
    }

    /// Phase of the wave machine.
    #[must_use]
    pub fn wave_phase(&self) -> WavePhase {
        self.waves.phase()
    }

    /// Number of waves not yet started.
    #[must_use]
    pub fn remaining_waves(&self) -> usize {
        self.waves.remaining_waves()
    }

    /// Read-only view of all live monsters.
    #[must_use]
    pub fn monsters(&self) -> MonsterView {
        query::monster_view(&self.world)
    }

    /// Read-only view of all constructed towers.
    #[must_use]
    pub fn towers(&self) -> TowerView {
        query::tower_view(&self.world)
    }

    /// Projectiles currently in flight.
    #[must_use]
    pub fn projectiles(&self) -> Vec<ProjectileSnapshot> {
        query::projectile_view(&self.world)
    }

    /// Snapshot of the tower marked for the info panel, if any.
    #[must_use]
    pub fn displayed_tower(&self) -> Option<TowerSnapshot> {
        query::displayed_tower(&self.world)
    }
}
