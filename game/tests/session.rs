//! End-to-end scenarios driving a full session tick by tick.

use tower_defence_core::{Event, GridPoint, MonsterKind, PlacementError, TowerKind, WavePhase};
use tower_defence_game::Session;
use tower_defence_world::WorldConfig;

const MAP: &str = "\
0 1 0 0 0 0
0 1 0 0 0 0
0 1 1 1 1 1
0 0 0 0 0 0
0 0 0 0 0 0
0 0 0 0 0 0";

fn session(waves: &str, config: &WorldConfig) -> Session {
    Session::from_text(MAP, waves, config).expect("session")
}

#[test]
fn construction_spends_money_until_it_runs_out() {
    let config = WorldConfig {
        starting_money: 200,
        ..WorldConfig::default()
    };
    let mut session = session("2 0", &config);

    let tower = session
        .place_tower(TowerKind::ArrowShooter, GridPoint::new(3, 1))
        .expect("placement");
    assert_eq!(tower.get(), 0);
    assert_eq!(session.stats().money, 50);

    let rejected = session.place_tower(TowerKind::Tack, GridPoint::new(4, 1));
    assert_eq!(rejected, Err(PlacementError::InsufficientFunds));
    assert_eq!(session.stats().money, 50);
}

#[test]
fn an_undefended_wave_walks_through() {
    let mut session = session("2 0 0", &WorldConfig::default());
    assert!(session.start_next_wave());
    assert!(!session.start_next_wave());

    let mut breaches = 0;
    for _ in 0..100 {
        breaches += session
            .update()
            .iter()
            .filter(|event| matches!(event, Event::MonsterBreached { .. }))
            .count();
        if breaches == 2 && session.monsters().is_empty() {
            break;
        }
    }
    assert_eq!(breaches, 2);
    assert_eq!(session.stats().health, 98);
    assert_eq!(session.stats().money, 1000);
    assert_eq!(session.wave_phase(), WavePhase::Idle);
}

#[test]
fn bullet_towers_fire_on_a_five_tick_cadence() {
    let mut session = session("2 5", &WorldConfig::default());
    let _ = session
        .place_tower(TowerKind::BulletShooter, GridPoint::new(2, 1))
        .expect("placement");
    assert!(session.start_next_wave());

    let mut fired_at = Vec::new();
    for tick in 1..=26 {
        let fired = session
            .update()
            .iter()
            .any(|event| matches!(event, Event::ProjectileFired { .. }));
        if fired {
            fired_at.push(tick);
        }
    }
    assert_eq!(fired_at, vec![6, 11, 16, 21, 26]);

    // The colossus soaks the damage without dying.
    let view = session.monsters();
    let monster = view.iter().next().expect("monster");
    assert_eq!(monster.kind, MonsterKind::Colossus);
    assert!(monster.health < monster.max_health);
    assert!(monster.health > 0);
}

#[test]
fn a_gauntlet_of_bullet_towers_stops_a_scarab() {
    let mut session = session("2 1", &WorldConfig::default());
    for at in [
        GridPoint::new(0, 0),
        GridPoint::new(2, 0),
        GridPoint::new(0, 1),
        GridPoint::new(2, 1),
    ] {
        let _ = session
            .place_tower(TowerKind::BulletShooter, at)
            .expect("placement");
    }
    assert!(session.start_next_wave());

    let mut killed = false;
    for _ in 0..40 {
        let events = session.update();
        assert!(
            !events
                .iter()
                .any(|event| matches!(event, Event::MonsterBreached { .. })),
            "the scarab should never reach the end"
        );
        if events.iter().any(|event| {
            matches!(
                event,
                Event::MonsterKilled {
                    reward: 10,
                    children: 1,
                    ..
                }
            )
        }) {
            killed = true;
            break;
        }
    }
    assert!(killed);
    assert_eq!(session.stats().health, 100);
    assert_eq!(session.stats().money, 1000 - 4 * 150 + 10);
    // The split released a firefly to chase down next.
    assert_eq!(session.monsters().len(), 1);
    assert_eq!(
        session.monsters().iter().next().map(|monster| monster.kind),
        Some(MonsterKind::Firefly)
    );
}

#[test]
fn power_shots_visibly_slow_their_victim() {
    let mut session = session("2 5", &WorldConfig::default());
    let _ = session
        .place_tower(TowerKind::Power, GridPoint::new(2, 1))
        .expect("placement");
    assert!(session.start_next_wave());

    let mut last_distance = 0.0_f32;
    let mut deltas = Vec::new();
    for _ in 0..35 {
        let _ = session.update();
        if let Some(monster) = session.monsters().iter().next() {
            deltas.push(monster.distance_travelled - last_distance);
            last_distance = monster.distance_travelled;
        }
    }

    let full_step = MonsterKind::Colossus.stats(20.0).speed;
    assert!(deltas.iter().any(|delta| *delta > full_step - 0.01));
    // Slowed steps cover a third of the usual ground.
    assert!(deltas
        .iter()
        .any(|delta| *delta > 0.1 && *delta < full_step / 2.0));
}

#[test]
fn identical_seeds_replay_identically() {
    let config = WorldConfig::default();
    let mut first = session("2 3 3", &config);
    let mut second = session("2 3 3", &config);
    for at in [GridPoint::new(2, 1), GridPoint::new(3, 1)] {
        let _ = first.place_tower(TowerKind::Tack, at).expect("placement");
        let _ = second.place_tower(TowerKind::Tack, at).expect("placement");
    }
    assert!(first.start_next_wave());
    assert!(second.start_next_wave());

    for _ in 0..60 {
        let first_events: Vec<Event> = first.update().to_vec();
        let second_events: Vec<Event> = second.update().to_vec();
        assert_eq!(first_events, second_events);
    }
    assert_eq!(first.stats(), second.stats());
}

#[test]
fn broken_source_texts_fail_setup() {
    let config = WorldConfig::default();
    assert!(Session::from_text("0 1 0", "2 0", &config).is_err());
    assert!(Session::from_text(MAP, "2 9", &config).is_err());
}
