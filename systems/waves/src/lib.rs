#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that schedules monster spawns from a parsed wave file.
//!
//! A wave file holds one wave per line: the first value is the spawn cadence
//! in ticks, every following value is a monster index. The machine releases
//! one monster each time the cadence elapses, and falls back to idle once a
//! requested wave does not exist.

use thiserror::Error;
use tower_defence_core::{Command, MonsterKind, WavePhase};

/// Failures raised while parsing a wave file.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum WaveFileError {
    /// A non-empty line carried no cadence value.
    #[error("wave line {line} has no cadence")]
    MissingCadence {
        /// One-based line number of the offending line.
        line: usize,
    },
    /// A value could not be parsed as an unsigned integer.
    #[error("wave line {line} holds {token:?}, which is not an unsigned integer")]
    BadInteger {
        /// One-based line number of the offending line.
        line: usize,
        /// Offending token from the line.
        token: String,
    },
    /// A monster index did not name a catalog entry.
    #[error("wave line {line} names monster index {index}, which does not exist")]
    UnknownMonster {
        /// One-based line number of the offending line.
        line: usize,
        /// Offending monster index.
        index: usize,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Wave {
    cadence: u32,
    spawns: Vec<MonsterKind>,
}

/// Wave spawn state machine.
///
/// The tick counter deliberately carries over between waves, so the first
/// monster of a fresh wave lands one full cadence after the wave starts.
#[derive(Debug)]
pub struct Waves {
    schedule: Vec<Wave>,
    next_wave: usize,
    phase: WavePhase,
    ticks: u32,
    cadence: u32,
    spawns: Vec<MonsterKind>,
    spawned: usize,
}

impl Waves {
    /// Parses a wave file into a fresh state machine.
    pub fn from_text(text: &str) -> Result<Self, WaveFileError> {
        let mut schedule = Vec::new();
        for (index, raw) in text.lines().enumerate() {
            if raw.is_empty() {
                continue;
            }
            let line = index + 1;
            let mut tokens = raw.split_whitespace();
            let Some(first) = tokens.next() else {
                return Err(WaveFileError::MissingCadence { line });
            };
            let cadence: u32 = first.parse().map_err(|_| WaveFileError::BadInteger {
                line,
                token: first.to_owned(),
            })?;
            let mut spawns = Vec::new();
            for token in tokens {
                let index: usize = token.parse().map_err(|_| WaveFileError::BadInteger {
                    line,
                    token: token.to_owned(),
                })?;
                let kind = MonsterKind::from_index(index)
                    .ok_or(WaveFileError::UnknownMonster { line, index })?;
                spawns.push(kind);
            }
            schedule.push(Wave { cadence, spawns });
        }
        Ok(Self {
            schedule,
            next_wave: 0,
            phase: WavePhase::Idle,
            ticks: 1,
            cadence: 2,
            spawns: Vec::new(),
            spawned: 0,
        })
    }

    /// Current phase of the machine.
    #[must_use]
    pub const fn phase(&self) -> WavePhase {
        self.phase
    }

    /// Number of waves not yet started.
    #[must_use]
    pub fn remaining_waves(&self) -> usize {
        self.schedule.len() - self.next_wave
    }

    /// Requests the next wave. Accepted only while idle with an empty maze;
    /// returns whether the request was taken.
    pub fn request_next_wave(&mut self, live_monsters: usize) -> bool {
        if self.phase != WavePhase::Idle || live_monsters > 0 {
            return false;
        }
        self.phase = WavePhase::WaitForSpawn;
        true
    }

    /// Advances the machine by one tick, queueing spawn commands.
    pub fn handle(&mut self, out: &mut Vec<Command>) {
        match self.phase {
            WavePhase::Idle => {}
            WavePhase::WaitForSpawn => {
                let Some(wave) = self.schedule.get(self.next_wave) else {
                    self.phase = WavePhase::Idle;
                    return;
                };
                self.cadence = wave.cadence;
                self.spawns.clear();
                self.spawns.extend_from_slice(&wave.spawns);
                self.spawned = 0;
                self.next_wave += 1;
                self.phase = WavePhase::Spawning;
            }
            WavePhase::Spawning => {
                if self.spawned == self.spawns.len() {
                    self.phase = WavePhase::Idle;
                    return;
                }
                self.ticks += 1;
                if self.ticks >= self.cadence {
                    self.ticks = 0;
                    out.push(Command::SpawnMonster {
                        kind: self.spawns[self.spawned],
                    });
                    self.spawned += 1;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn_commands(out: &[Command]) -> Vec<MonsterKind> {
        out.iter()
            .map(|command| match command {
                Command::SpawnMonster { kind } => *kind,
                other => panic!("unexpected command {other:?}"),
            })
            .collect()
    }

    #[test]
    fn parses_cadence_and_monster_indices() {
        let waves = Waves::from_text("2 0 0\n\n4 1 5\n").expect("waves");
        assert_eq!(waves.remaining_waves(), 2);
        assert_eq!(waves.schedule[0].cadence, 2);
        assert_eq!(
            waves.schedule[0].spawns,
            vec![MonsterKind::Firefly, MonsterKind::Firefly]
        );
        assert_eq!(
            waves.schedule[1].spawns,
            vec![MonsterKind::Scarab, MonsterKind::Colossus]
        );
    }

    #[test]
    fn rejects_malformed_wave_files() {
        assert_eq!(
            Waves::from_text("   ").unwrap_err(),
            WaveFileError::MissingCadence { line: 1 }
        );
        assert_eq!(
            Waves::from_text("2 0\nx 0").unwrap_err(),
            WaveFileError::BadInteger {
                line: 2,
                token: "x".to_owned(),
            }
        );
        assert_eq!(
            Waves::from_text("2 9").unwrap_err(),
            WaveFileError::UnknownMonster { line: 1, index: 9 }
        );
    }

    #[test]
    fn spawns_follow_the_cadence() {
        let mut waves = Waves::from_text("2 0 0").expect("waves");
        assert!(waves.request_next_wave(0));

        let mut spawn_ticks = Vec::new();
        for tick in 0..6 {
            let mut out = Vec::new();
            waves.handle(&mut out);
            if !out.is_empty() {
                assert_eq!(spawn_commands(&out), vec![MonsterKind::Firefly]);
                spawn_ticks.push(tick);
            }
        }
        assert_eq!(spawn_ticks, vec![1, 3]);
        assert_eq!(waves.phase(), WavePhase::Idle);
    }

    #[test]
    fn requests_are_ignored_while_monsters_live() {
        let mut waves = Waves::from_text("2 0").expect("waves");
        assert!(!waves.request_next_wave(3));
        assert_eq!(waves.phase(), WavePhase::Idle);
        assert!(waves.request_next_wave(0));
        assert!(!waves.request_next_wave(0));
    }

    #[test]
    fn exhausted_schedules_fall_back_to_idle() {
        let mut waves = Waves::from_text("2 0").expect("waves");
        assert!(waves.request_next_wave(0));
        let mut out = Vec::new();
        for _ in 0..10 {
            waves.handle(&mut out);
        }
        assert_eq!(spawn_commands(&out), vec![MonsterKind::Firefly]);
        assert_eq!(waves.remaining_waves(), 0);

        assert!(waves.request_next_wave(0));
        let mut out = Vec::new();
        waves.handle(&mut out);
        assert!(out.is_empty());
        assert_eq!(waves.phase(), WavePhase::Idle);
    }

    #[test]
    fn tight_cadences_cannot_stall_the_machine() {
        // A cadence of zero releases one monster per tick instead of hanging.
        let mut waves = Waves::from_text("0 4 4 4").expect("waves");
        assert!(waves.request_next_wave(0));
        let mut out = Vec::new();
        for _ in 0..5 {
            waves.handle(&mut out);
        }
        assert_eq!(
            spawn_commands(&out),
            vec![MonsterKind::Leo, MonsterKind::Leo, MonsterKind::Leo]
        );
        assert_eq!(waves.phase(), WavePhase::Idle);
    }
}
