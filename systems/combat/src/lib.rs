#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits projectile firing commands from targeting data.

use tower_defence_core::{Command, TowerTarget, TowerView};

/// Tower combat system that queues firing commands for ready towers.
#[derive(Debug, Default)]
pub struct Combat {
    scratch: Vec<Command>,
}

impl Combat {
    /// Creates a new combat system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits [`Command::FireProjectile`] entries for towers that hold a
    /// fire-eligible target and have a full shot budget.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        tower_targets: &[TowerTarget],
        out: &mut Vec<Command>,
    ) {
        if tower_targets.is_empty() {
            return;
        }

        self.scratch.clear();
        for target in tower_targets {
            if let Some(snapshot) = towers.get(target.tower) {
                if snapshot.ready_to_fire {
                    self.scratch.push(Command::FireProjectile {
                        tower: target.tower,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }
        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defence_core::{
        GridPoint, MonsterId, PixelPoint, TargetStrategy, TowerId, TowerKind, TowerSnapshot,
    };

    fn tower_snapshot(id: u32, ready: bool) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(id),
            kind: TowerKind::BulletShooter,
            grid_loc: GridPoint::new(0, 0),
            pixel_loc: PixelPoint::new(10.0, 10.0),
            level: 1,
            range: 120.0,
            damage: 5,
            rate: 4,
            upgrade_cost: None,
            strategy: TargetStrategy::HealthDescending,
            sticky_target: false,
            target: Some(MonsterId::new(0)),
            ready_to_fire: ready,
        }
    }

    fn assignment(tower: u32) -> TowerTarget {
        TowerTarget {
            tower: TowerId::new(tower),
            monster: MonsterId::new(0),
        }
    }

    #[test]
    fn only_ready_towers_fire() {
        let mut system = Combat::new();
        let towers =
            TowerView::from_snapshots(vec![tower_snapshot(0, true), tower_snapshot(1, false)]);
        let mut out = Vec::new();
        system.handle(&towers, &[assignment(0), assignment(1)], &mut out);
        assert_eq!(
            out,
            vec![Command::FireProjectile {
                tower: TowerId::new(0),
            }]
        );
    }

    #[test]
    fn unknown_towers_are_skipped() {
        let mut system = Combat::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(0, true)]);
        let mut out = Vec::new();
        system.handle(&towers, &[assignment(7)], &mut out);
        assert!(out.is_empty());
    }

    #[test]
    fn no_assignments_produce_no_commands() {
        let mut system = Combat::new();
        let towers = TowerView::from_snapshots(vec![tower_snapshot(0, true)]);
        let mut out = Vec::new();
        system.handle(&towers, &[], &mut out);
        assert!(out.is_empty());
    }
}
