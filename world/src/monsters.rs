//! Monster state and the per-tick walking cadence.

use tower_defence_core::{MonsterId, MonsterKind, MonsterSnapshot, PixelPoint};

use crate::path::{PathLattice, PathProgress};

/// Ticks a stunned monster stands still after an arrow hit.
const STUN_TICKS: u32 = 5;

/// Outcome of one walking step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StepOutcome {
    /// The monster remains on the path.
    Walking,
    /// The monster walked off the end of the path.
    Breached,
}

/// Mutable state of a single live monster.
#[derive(Clone, Debug)]
pub(crate) struct MonsterState {
    pub(crate) id: MonsterId,
    pub(crate) kind: MonsterKind,
    pub(crate) health: i32,
    pub(crate) max_health: i32,
    pub(crate) value: i64,
    pub(crate) breach_damage: i32,
    pub(crate) speed: f32,
    pub(crate) movement: f32,
    pub(crate) distance: f32,
    pub(crate) position: PixelPoint,
    tick: u32,
    max_tick: u32,
}

impl MonsterState {
    /// Creates a monster at the given cumulative path distance.
    pub(crate) fn spawn(
        id: MonsterId,
        kind: MonsterKind,
        block_size: f32,
        distance: f32,
        path: &PathLattice,
    ) -> Self {
        let stats = kind.stats(block_size);
        let position = match path.position_at(distance) {
            PathProgress::Walking(position) => position,
            PathProgress::Breached => path.spawn(),
        };
        Self {
            id,
            kind,
            health: stats.max_health,
            max_health: stats.max_health,
            value: stats.value,
            breach_damage: stats.breach_damage,
            speed: stats.speed,
            movement: stats.first_step,
            distance,
            position,
            tick: 0,
            max_tick: 1,
        }
    }

    /// Advances the walking cadence by one tick, moving when it elapses.
    ///
    /// A natural move resets any stun or slow: the next step reverts to the
    /// monster's own speed.
    pub(crate) fn advance(&mut self, path: &PathLattice) -> StepOutcome {
        if self.tick >= self.max_tick {
            self.distance += self.movement;
            match path.position_at(self.distance) {
                PathProgress::Walking(position) => self.position = position,
                PathProgress::Breached => return StepOutcome::Breached,
            }
            self.movement = self.speed;
            self.tick = 0;
            self.max_tick = 1;
        }
        self.tick += 1;
        StepOutcome::Walking
    }

    /// Freezes the monster in place for a few ticks.
    pub(crate) fn stun(&mut self) {
        self.tick = 0;
        self.max_tick = STUN_TICKS;
    }

    /// Shrinks the next step, never below an already stronger slow.
    pub(crate) fn slow(&mut self, divisor: f32) {
        self.movement = self.movement.min(self.speed / divisor);
    }

    /// Captures the monster's state for query views.
    pub(crate) fn snapshot(&self) -> MonsterSnapshot {
        MonsterSnapshot {
            id: self.id,
            kind: self.kind,
            health: self.health,
            max_health: self.max_health,
            position: self.position,
            distance_travelled: self.distance,
            speed: self.speed,
            movement: self.movement,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::BlockGrid;

    fn straight_path() -> PathLattice {
        let grid = BlockGrid::from_template(
            "1 1 1 1\n0 0 0 0\n0 0 0 0\n0 0 0 0",
            20.0,
        )
        .expect("grid");
        PathLattice::resolve(&grid).expect("path")
    }

    #[test]
    fn first_move_lands_on_the_second_tick() {
        let path = straight_path();
        let mut firefly =
            MonsterState::spawn(MonsterId::new(0), MonsterKind::Firefly, 20.0, 0.0, &path);
        assert_eq!(firefly.advance(&path), StepOutcome::Walking);
        assert!((firefly.distance - 0.0).abs() < f32::EPSILON);
        assert_eq!(firefly.advance(&path), StepOutcome::Walking);
        assert!((firefly.distance - 20.0 / 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn natural_moves_revert_to_own_speed() {
        let path = straight_path();
        let mut firefly =
            MonsterState::spawn(MonsterId::new(0), MonsterKind::Firefly, 20.0, 0.0, &path);
        let _ = firefly.advance(&path);
        let _ = firefly.advance(&path);
        firefly.slow(4.0);
        let _ = firefly.advance(&path);
        let slowed = 20.0 / 3.0 + 10.0 / 4.0;
        assert!((firefly.distance - slowed).abs() < f32::EPSILON);
        let _ = firefly.advance(&path);
        assert!((firefly.distance - (slowed + 10.0)).abs() < f32::EPSILON);
    }

    #[test]
    fn stun_delays_the_next_move() {
        let path = straight_path();
        let mut firefly =
            MonsterState::spawn(MonsterId::new(0), MonsterKind::Firefly, 20.0, 0.0, &path);
        let _ = firefly.advance(&path);
        let _ = firefly.advance(&path);
        firefly.stun();
        let before = firefly.distance;
        for _ in 0..STUN_TICKS {
            assert_eq!(firefly.advance(&path), StepOutcome::Walking);
        }
        assert!((firefly.distance - before).abs() < f32::EPSILON);
        let _ = firefly.advance(&path);
        assert!(firefly.distance > before);
    }

    #[test]
    fn walking_off_the_path_reports_a_breach() {
        let path = straight_path();
        let mut leo =
            MonsterState::spawn(MonsterId::new(0), MonsterKind::Leo, 20.0, 70.0, &path);
        let _ = leo.advance(&path);
        assert_eq!(leo.advance(&path), StepOutcome::Breached);
    }
}
