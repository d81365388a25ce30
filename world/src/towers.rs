//! Authoritative tower state and the fire-rate cadence.

use tower_defence_core::{
    GridPoint, MonsterId, PixelPoint, TargetStrategy, TowerId, TowerKind, TowerSnapshot,
    TowerStats, TICKS_PER_SECOND,
};

use crate::projectiles::Projectile;

/// Mutable state of a single constructed tower.
#[derive(Clone, Debug)]
pub(crate) struct TowerState {
    pub(crate) id: TowerId,
    pub(crate) kind: TowerKind,
    pub(crate) grid_loc: GridPoint,
    pub(crate) pixel_loc: PixelPoint,
    pub(crate) level: u32,
    pub(crate) stats: TowerStats,
    pub(crate) upgrade_cost: Option<i64>,
    pub(crate) last_spend: i64,
    pub(crate) strategy: TargetStrategy,
    pub(crate) sticky_target: bool,
    pub(crate) target: Option<MonsterId>,
    pub(crate) projectiles: Vec<Projectile>,
    counter: u32,
}

impl TowerState {
    /// Creates a freshly built level-1 tower.
    pub(crate) fn build(
        id: TowerId,
        kind: TowerKind,
        grid_loc: GridPoint,
        pixel_loc: PixelPoint,
        block_size: f32,
    ) -> Self {
        Self {
            id,
            kind,
            grid_loc,
            pixel_loc,
            level: 1,
            stats: kind.base_stats(block_size),
            upgrade_cost: kind.initial_upgrade_cost(),
            last_spend: kind.build_cost(),
            strategy: TargetStrategy::HealthDescending,
            sticky_target: false,
            target: None,
            projectiles: Vec::new(),
            counter: 0,
        }
    }

    /// Ticks the tower must accumulate between shots.
    fn counter_threshold(&self) -> Option<u32> {
        if self.stats.rate == 0 {
            return None;
        }
        Some(TICKS_PER_SECOND / self.stats.rate)
    }

    /// Advances the fire-rate counter by one tick, capped at its threshold.
    pub(crate) fn advance_counter(&mut self) {
        if let Some(threshold) = self.counter_threshold() {
            if self.counter < threshold {
                self.counter += 1;
            }
        }
    }

    /// Reports whether the counter has accumulated a full shot budget.
    pub(crate) fn ready_to_fire(&self) -> bool {
        match self.counter_threshold() {
            Some(threshold) => self.counter >= threshold,
            None => false,
        }
    }

    /// Spends the accumulated shot budget after firing.
    pub(crate) fn reset_counter(&mut self) {
        self.counter = 0;
    }

    /// Advances the tower to its next level, returning the level reached.
    pub(crate) fn upgrade(&mut self, cost: i64, block_size: f32) -> u32 {
        self.level += 1;
        self.upgrade_cost = self.kind.apply_level(self.level, block_size, &mut self.stats);
        self.last_spend = cost;
        self.level
    }

    /// Captures the tower's state for query views.
    pub(crate) fn snapshot(&self) -> TowerSnapshot {
        TowerSnapshot {
            id: self.id,
            kind: self.kind,
            grid_loc: self.grid_loc,
            pixel_loc: self.pixel_loc,
            level: self.level,
            range: self.stats.range,
            damage: self.stats.damage,
            rate: self.stats.rate,
            upgrade_cost: self.upgrade_cost,
            strategy: self.strategy,
            sticky_target: self.sticky_target,
            target: self.target,
            ready_to_fire: self.ready_to_fire(),
        }
    }
}
