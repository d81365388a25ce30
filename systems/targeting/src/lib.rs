#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves deterministic tower targets from world snapshots.
//!
//! Each tick the system rebuilds four stably-sorted candidate lists, one per
//! [`TargetStrategy`], and walks them per tower. A scan keeps the *last*
//! in-range candidate it sees rather than the first; with equal sort keys the
//! stable ordering makes that pick deterministic, and the behaviour is pinned
//! by tests. Sticky towers hold their target until it dies or leaves range,
//! and only reacquire on the tick after losing it.

use std::cmp::{Ordering, Reverse};

use tower_defence_core::{
    Command, MonsterId, MonsterSnapshot, MonsterView, PixelPoint, TargetStrategy, TowerTarget,
    TowerView,
};

/// Tower targeting system that reuses scratch buffers to avoid repeated
/// allocations.
#[derive(Debug, Default)]
pub struct Targeting {
    by_health_desc: Vec<Candidate>,
    by_health_asc: Vec<Candidate>,
    by_distance_asc: Vec<Candidate>,
    by_distance_desc: Vec<Candidate>,
}

impl Targeting {
    /// Creates a new targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves targets for every tower against the current monster roster.
    ///
    /// Fire-eligible assignments land in `out_targets`; target changes are
    /// reported as [`Command::SetTowerTarget`] entries in `out_commands`.
    /// Both buffers are cleared first.
    pub fn handle(
        &mut self,
        towers: &TowerView,
        monsters: &MonsterView,
        block_size: f32,
        out_targets: &mut Vec<TowerTarget>,
        out_commands: &mut Vec<Command>,
    ) {
        out_targets.clear();
        out_commands.clear();

        self.prepare_candidates(monsters);

        for tower in towers.iter() {
            let reach = tower.range + block_size / 2.0;
            let mut resolved = tower.target;

            if !tower.sticky_target {
                resolved = self.last_in_range(tower.strategy, tower.pixel_loc, reach);
            }

            if let Some(target) = resolved {
                let valid = monsters.get(target).is_some_and(|monster| {
                    monster.health > 0 && monster.position.distance(tower.pixel_loc) <= reach
                });
                if valid {
                    out_targets.push(TowerTarget {
                        tower: tower.id,
                        monster: target,
                    });
                } else {
                    resolved = None;
                }
            } else if tower.sticky_target {
                // A sticky tower with nothing held acquires now but waits a
                // tick before the assignment becomes fire-eligible.
                resolved = self.last_in_range(tower.strategy, tower.pixel_loc, reach);
            }

            if resolved != tower.target {
                out_commands.push(Command::SetTowerTarget {
                    tower: tower.id,
                    target: resolved,
                });
            }
        }
    }

    fn prepare_candidates(&mut self, monsters: &MonsterView) {
        self.by_health_desc.clear();
        for snapshot in monsters.iter() {
            self.by_health_desc.push(Candidate::from_snapshot(snapshot));
        }
        self.by_health_asc.clear();
        self.by_health_asc.extend_from_slice(&self.by_health_desc);
        self.by_distance_asc.clear();
        self.by_distance_asc.extend_from_slice(&self.by_health_desc);
        self.by_distance_desc.clear();
        self.by_distance_desc.extend_from_slice(&self.by_health_desc);

        self.by_health_desc
            .sort_by_key(|candidate| Reverse(candidate.health));
        self.by_health_asc.sort_by_key(|candidate| candidate.health);
        self.by_distance_asc.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
        });
        self.by_distance_desc.sort_by(|a, b| {
            b.distance
                .partial_cmp(&a.distance)
                .unwrap_or(Ordering::Equal)
        });
    }

    fn last_in_range(
        &self,
        strategy: TargetStrategy,
        origin: PixelPoint,
        reach: f32,
    ) -> Option<MonsterId> {
        let candidates = match strategy {
            TargetStrategy::HealthDescending => &self.by_health_desc,
            TargetStrategy::HealthAscending => &self.by_health_asc,
            TargetStrategy::DistanceAscending => &self.by_distance_asc,
            TargetStrategy::DistanceDescending => &self.by_distance_desc,
        };
        let reach_squared = reach * reach;
        let mut pick = None;
        for candidate in candidates {
            if candidate.position.distance_squared(origin) <= reach_squared {
                pick = Some(candidate.id);
            }
        }
        pick
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Candidate {
    id: MonsterId,
    health: i32,
    distance: f32,
    position: PixelPoint,
}

impl Candidate {
    fn from_snapshot(snapshot: &MonsterSnapshot) -> Self {
        Self {
            id: snapshot.id,
            health: snapshot.health,
            distance: snapshot.distance_travelled,
            position: snapshot.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defence_core::{
        GridPoint, MonsterKind, TowerId, TowerKind, TowerSnapshot,
    };

    const BLOCK: f32 = 20.0;

    fn tower_snapshot(strategy: TargetStrategy, sticky: bool) -> TowerSnapshot {
        TowerSnapshot {
            id: TowerId::new(0),
            kind: TowerKind::ArrowShooter,
            grid_loc: GridPoint::new(0, 0),
            pixel_loc: PixelPoint::new(0.0, 0.0),
            level: 1,
            range: 100.0,
            damage: 10,
            rate: 1,
            upgrade_cost: Some(50),
            strategy,
            sticky_target: sticky,
            target: None,
            ready_to_fire: false,
        }
    }

    fn monster_snapshot(id: u32, health: i32, distance: f32, x: f32) -> MonsterSnapshot {
        MonsterSnapshot {
            id: MonsterId::new(id),
            kind: MonsterKind::Firefly,
            health,
            max_health: 30,
            position: PixelPoint::new(x, 0.0),
            distance_travelled: distance,
            speed: 10.0,
            movement: 10.0,
        }
    }

    fn run(
        tower: TowerSnapshot,
        monsters: Vec<MonsterSnapshot>,
    ) -> (Vec<TowerTarget>, Vec<Command>) {
        let mut system = Targeting::new();
        let towers = TowerView::from_snapshots(vec![tower]);
        let view = MonsterView::from_snapshots(monsters);
        let mut targets = Vec::new();
        let mut commands = Vec::new();
        system.handle(&towers, &view, BLOCK, &mut targets, &mut commands);
        (targets, commands)
    }

    #[test]
    fn equal_keys_resolve_to_the_last_candidate() {
        // Three monsters with identical health: the stable sort keeps view
        // order, so the scan's last in-range pick is the highest id.
        let (targets, commands) = run(
            tower_snapshot(TargetStrategy::HealthDescending, false),
            vec![
                monster_snapshot(0, 30, 5.0, 10.0),
                monster_snapshot(1, 30, 6.0, 20.0),
                monster_snapshot(2, 30, 7.0, 30.0),
            ],
        );
        assert_eq!(
            targets,
            vec![TowerTarget {
                tower: TowerId::new(0),
                monster: MonsterId::new(2),
            }]
        );
        assert_eq!(
            commands,
            vec![Command::SetTowerTarget {
                tower: TowerId::new(0),
                target: Some(MonsterId::new(2)),
            }]
        );
    }

    #[test]
    fn health_descending_picks_the_weakest_in_range() {
        // Sorted strongest first, so the last in-range candidate is the one
        // with the least health.
        let (targets, _) = run(
            tower_snapshot(TargetStrategy::HealthDescending, false),
            vec![
                monster_snapshot(0, 30, 5.0, 10.0),
                monster_snapshot(1, 10, 6.0, 20.0),
                monster_snapshot(2, 20, 7.0, 30.0),
            ],
        );
        assert_eq!(targets[0].monster, MonsterId::new(1));
    }

    #[test]
    fn health_ascending_picks_the_strongest_in_range() {
        let (targets, _) = run(
            tower_snapshot(TargetStrategy::HealthAscending, false),
            vec![
                monster_snapshot(0, 30, 5.0, 10.0),
                monster_snapshot(1, 10, 6.0, 20.0),
                monster_snapshot(2, 20, 7.0, 30.0),
            ],
        );
        assert_eq!(targets[0].monster, MonsterId::new(0));
    }

    #[test]
    fn distance_orderings_mirror_each_other() {
        let monsters = vec![
            monster_snapshot(0, 30, 50.0, 10.0),
            monster_snapshot(1, 30, 20.0, 20.0),
            monster_snapshot(2, 30, 80.0, 30.0),
        ];
        let (targets, _) = run(
            tower_snapshot(TargetStrategy::DistanceAscending, false),
            monsters.clone(),
        );
        assert_eq!(targets[0].monster, MonsterId::new(2));

        let (targets, _) = run(
            tower_snapshot(TargetStrategy::DistanceDescending, false),
            monsters,
        );
        assert_eq!(targets[0].monster, MonsterId::new(1));
    }

    #[test]
    fn out_of_range_monsters_are_never_picked() {
        let (targets, commands) = run(
            tower_snapshot(TargetStrategy::HealthDescending, false),
            vec![monster_snapshot(0, 30, 5.0, 500.0)],
        );
        assert!(targets.is_empty());
        assert!(commands.is_empty());
    }

    #[test]
    fn reach_includes_the_half_block_margin() {
        // Range 100 plus half a block reaches exactly 110.
        let (targets, _) = run(
            tower_snapshot(TargetStrategy::HealthDescending, false),
            vec![monster_snapshot(0, 30, 5.0, 110.0)],
        );
        assert_eq!(targets.len(), 1);

        let (targets, _) = run(
            tower_snapshot(TargetStrategy::HealthDescending, false),
            vec![monster_snapshot(0, 30, 5.0, 110.5)],
        );
        assert!(targets.is_empty());
    }

    #[test]
    fn sticky_towers_hold_their_target() {
        let mut tower = tower_snapshot(TargetStrategy::HealthDescending, true);
        tower.target = Some(MonsterId::new(0));
        // A weaker monster appears, which a rescan would prefer.
        let (targets, commands) = run(
            tower,
            vec![
                monster_snapshot(0, 30, 5.0, 10.0),
                monster_snapshot(1, 5, 6.0, 20.0),
            ],
        );
        assert_eq!(targets[0].monster, MonsterId::new(0));
        assert!(commands.is_empty());
    }

    #[test]
    fn sticky_acquisition_is_not_fire_eligible() {
        let (targets, commands) = run(
            tower_snapshot(TargetStrategy::HealthDescending, true),
            vec![monster_snapshot(0, 30, 5.0, 10.0)],
        );
        assert!(targets.is_empty());
        assert_eq!(
            commands,
            vec![Command::SetTowerTarget {
                tower: TowerId::new(0),
                target: Some(MonsterId::new(0)),
            }]
        );
    }

    #[test]
    fn sticky_towers_drop_dead_targets_without_reacquiring() {
        let mut tower = tower_snapshot(TargetStrategy::HealthDescending, true);
        tower.target = Some(MonsterId::new(0));
        // The held target is gone; another monster waits in range, but the
        // reacquisition is deferred to the next tick.
        let (targets, commands) = run(tower, vec![monster_snapshot(1, 30, 5.0, 10.0)]);
        assert!(targets.is_empty());
        assert_eq!(
            commands,
            vec![Command::SetTowerTarget {
                tower: TowerId::new(0),
                target: None,
            }]
        );
    }

    #[test]
    fn unchanged_targets_emit_no_commands() {
        let mut tower = tower_snapshot(TargetStrategy::HealthDescending, false);
        tower.target = Some(MonsterId::new(0));
        let (targets, commands) = run(tower, vec![monster_snapshot(0, 30, 5.0, 10.0)]);
        assert_eq!(targets.len(), 1);
        assert!(commands.is_empty());
    }
}
