//! Period loop: dead-ball windows, possessions, and the transcript.
use serde::{Deserialize, Serialize};

use crate::box_score::BoxScore;
use crate::constants::{OVERTIME_SECONDS, QUARTER_SECONDS, REGULATION_PERIODS, SHOT_CLOCK_FULL};
use crate::endgame::{EndGameSituation, evaluate};
use crate::fouls::FoulTracker;
use crate::player::Player;
use crate::possession::state::{BallEvent, DeadBallReason, DeadBallWindow, PossessionStateMachine};
use crate::possession::{PossessionContext, PossessionInput, PossessionResult, TeamView, resolve_possession};
use crate::rng::GameRng;
use crate::stamina::StaminaManager;
use crate::substitutions::{
    RosterView, Substitution, SubstitutionManager, SubstitutionOutcome, WindowKind,
};
use crate::tactics::TacticalSettings;
use crate::team::{Team, TeamSide};
use crate::timeouts::{TimeoutEvent, TimeoutManager, TimeoutSituation};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub home: u16,
    pub away: u16,
}

impl Scoreboard {
    #[must_use]
    pub const fn get(&self, side: TeamSide) -> u16 {
        match side {
            TeamSide::Home => self.home,
            TeamSide::Away => self.away,
        }
    }

    pub fn add(&mut self, side: TeamSide, points: u8) {
        let slot = match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        };
        *slot = slot.saturating_add(u16::from(points));
    }

    /// `side`'s score minus the opponent's.
    #[must_use]
    pub fn margin(&self, side: TeamSide) -> i32 {
        i32::from(self.get(side)) - i32::from(self.get(side.other()))
    }
}

/// Points scored by each team in one period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodScore {
    pub period: u8,
    pub home: u16,
    pub away: u16,
}

/// A foul-out replacement made at a whistle inside a possession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoulOutSubstitution {
    /// Index into the possession's ball events of the foul that opened the window.
    pub after_ball_event: usize,
    pub substitution: Substitution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossessionEntry {
    pub period: u8,
    /// Game clock when the possession started.
    pub clock: f64,
    /// Score after the possession.
    pub score: Scoreboard,
    pub result: PossessionResult,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foul_outs: Vec<FoulOutSubstitution>,
}

/// One transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "entry", rename_all = "snake_case")]
pub enum PlayByPlay {
    JumpBall {
        period: u8,
        winner: TeamSide,
    },
    PeriodStart {
        period: u8,
        possession: TeamSide,
    },
    Substitution {
        period: u8,
        clock: f64,
        window: DeadBallReason,
        substitution: Substitution,
    },
    /// A fouled-out player stayed on the floor for lack of a replacement.
    Stranded {
        period: u8,
        clock: f64,
        side: TeamSide,
        player: String,
    },
    Timeout {
        period: u8,
        clock: f64,
        window: DeadBallReason,
        timeout: TimeoutEvent,
    },
    Possession(Box<PossessionEntry>),
    PeriodEnd {
        period: u8,
        score: Scoreboard,
    },
}

/// Seconds on the clock at the start of `period`.
#[must_use]
pub const fn period_length(period: u8) -> f64 {
    if period <= REGULATION_PERIODS {
        QUARTER_SECONDS
    } else {
        OVERTIME_SECONDS
    }
}

/// Everything that persists across periods.
#[derive(Debug)]
pub(crate) struct GameState<'a> {
    pub teams: [&'a Team; 2],
    pub tactics: [&'a TacticalSettings; 2],
    pub score: Scoreboard,
    pub fouls: FoulTracker,
    pub stamina: StaminaManager,
    pub subs: SubstitutionManager,
    pub timeouts: TimeoutManager,
    pub box_score: BoxScore,
    pub transcript: Vec<PlayByPlay>,
    pub rng: GameRng,
}

impl<'a> GameState<'a> {
    pub fn new(
        home: &'a Team,
        away: &'a Team,
        home_tactics: &'a TacticalSettings,
        away_tactics: &'a TacticalSettings,
        rng: GameRng,
    ) -> Self {
        Self {
            teams: [home, away],
            tactics: [home_tactics, away_tactics],
            score: Scoreboard::default(),
            fouls: FoulTracker::new(),
            stamina: StaminaManager::new(home, away),
            subs: SubstitutionManager::new(home, home_tactics, away, away_tactics),
            timeouts: TimeoutManager::new(),
            box_score: BoxScore::new(home, away),
            transcript: Vec::new(),
            rng,
        }
    }

    fn substitute(
        &mut self,
        window: &DeadBallWindow<'_>,
        side: TeamSide,
        kind: WindowKind,
    ) -> SubstitutionOutcome {
        let roster = RosterView {
            side,
            team: self.teams[side.index()],
            tactics: self.tactics[side.index()],
            stamina: &self.stamina,
            fouls: &self.fouls,
        };
        self.subs.substitute(window, &roster, kind)
    }

    fn on_court_names(&self, side: TeamSide) -> Vec<&'a str> {
        self.subs.on_court_names(side, self.teams[side.index()])
    }

    /// Substitutions for both teams, then at most one timeout.
    fn dead_ball(&mut self, window: &DeadBallWindow<'_>, period: u8, clock: f64, kind: WindowKind) {
        for side in TeamSide::BOTH {
            let outcome = self.substitute(window, side, kind);
            for substitution in outcome.substitutions {
                self.transcript.push(PlayByPlay::Substitution {
                    period,
                    clock,
                    window: window.reason(),
                    substitution,
                });
            }
            for player in outcome.stranded {
                self.transcript.push(PlayByPlay::Stranded {
                    period,
                    clock,
                    side,
                    player,
                });
            }
        }
        if kind == WindowKind::PeriodStart {
            return;
        }
        for side in [window.possession(), window.possession().other()] {
            let situation = TimeoutSituation {
                period,
                time_remaining: clock,
                score_diff: self.score.margin(side),
            };
            let strategy = self.tactics[side.index()].timeout_strategy;
            let Some(reason) = self.timeouts.evaluate(side, strategy, &situation) else {
                continue;
            };
            if let Some(timeout) = self.timeouts.call_timeout(window, side, reason, period) {
                for team in TeamSide::BOTH {
                    let names = self.on_court_names(team);
                    self.stamina.timeout_recovery(team, &names);
                }
                self.transcript.push(PlayByPlay::Timeout {
                    period,
                    clock,
                    window: window.reason(),
                    timeout,
                });
                break;
            }
        }
    }

    fn snapshots(&self, side: TeamSide) -> Vec<Player> {
        let team = self.teams[side.index()];
        self.subs
            .on_court(side)
            .iter()
            .filter_map(|idx| team.roster.get(*idx))
            .map(|player| self.stamina.snapshot(side, player))
            .collect()
    }

    fn resolve(&mut self, context: PossessionContext) -> PossessionResult {
        let offense = context.offense;
        let defense = offense.other();
        let offense_tactics = self.tactics[offense.index()];
        let defense_tactics = self.tactics[defense.index()];
        let overlay = evaluate(
            &EndGameSituation {
                period: context.period,
                time_remaining: context.time_remaining,
                shot_clock: context.shot_clock,
                score_diff: context.score_diff,
            },
            offense_tactics,
            defense_tactics,
        );
        let offense_lineup = self.snapshots(offense);
        let defense_lineup = self.snapshots(defense);
        let input = PossessionInput {
            context,
            offense: TeamView {
                side: offense,
                lineup: &offense_lineup,
                tactics: offense_tactics,
            },
            defense: TeamView {
                side: defense,
                lineup: &defense_lineup,
                tactics: defense_tactics,
            },
            overlay: &overlay,
        };
        resolve_possession(&input, &mut self.fouls, &mut self.rng)
    }

    /// Play one period from the opening possession to the final horn.
    pub fn play_period(&mut self, period: u8, first: TeamSide) -> PeriodScore {
        let start = self.score;
        self.fouls.start_period(period);
        let mut machine = PossessionStateMachine::new(first);
        self.transcript.push(PlayByPlay::PeriodStart {
            period,
            possession: first,
        });
        log::info!("period {period} start, {first} ball");

        let mut clock = period_length(period);
        let mut transition = false;
        let mut shot_clock = SHOT_CLOCK_FULL;
        let mut window_kind = WindowKind::PeriodStart;
        while clock > 0.0 {
            if let Some(window) = machine.dead_ball_window() {
                self.dead_ball(&window, period, clock, window_kind);
            }
            window_kind = WindowKind::Regular;
            if !machine.is_live() {
                machine.apply(BallEvent::Inbound);
            }

            let offense = machine.possession();
            let context = PossessionContext {
                period,
                offense,
                transition,
                shot_clock,
                time_remaining: clock,
                score_diff: self.score.margin(offense),
            };
            let floor = TeamSide::BOTH.map(|side| self.on_court_names(side));
            let result = self.resolve(context);

            let mut foul_outs = Vec::new();
            for (idx, event) in result.ball_events.iter().enumerate() {
                machine.apply(*event);
                if matches!(event, BallEvent::Foul { .. })
                    && let Some(window) = machine.dead_ball_window()
                {
                    for side in TeamSide::BOTH {
                        let outcome = self.substitute(&window, side, WindowKind::FoulOutOnly);
                        for player in outcome.stranded {
                            self.transcript.push(PlayByPlay::Stranded {
                                period,
                                clock,
                                side,
                                player,
                            });
                        }
                        foul_outs.extend(outcome.substitutions.into_iter().map(|substitution| {
                            FoulOutSubstitution {
                                after_ball_event: idx,
                                substitution,
                            }
                        }));
                    }
                }
            }

            self.score.add(offense, result.points);
            self.timeouts.record_score(offense, result.points);
            self.box_score.record(&result);
            for side in TeamSide::BOTH {
                self.stamina.apply_possession(
                    side,
                    &floor[side.index()],
                    self.tactics[side.index()],
                    result.elapsed,
                );
            }

            if result.elapsed > 0.0 {
                clock = (clock - result.elapsed).max(0.0);
            } else {
                log::warn!("fallback: possession consumed no time, ending period {period}");
                clock = 0.0;
            }
            transition = result.next_transition;
            shot_clock = result.next_shot_clock;
            self.transcript.push(PlayByPlay::Possession(Box::new(PossessionEntry {
                period,
                clock: context.time_remaining,
                score: self.score,
                result,
                foul_outs,
            })));
        }

        self.transcript.push(PlayByPlay::PeriodEnd {
            period,
            score: self.score,
        });
        log::info!(
            "period {period} end: {}-{}",
            self.score.home,
            self.score.away
        );
        PeriodScore {
            period,
            home: self.score.home - start.home,
            away: self.score.away - start.away,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::team::sample_teams;

    #[test]
    fn a_period_runs_the_clock_down() {
        let (home, away) = sample_teams().expect("sample teams");
        let home_tactics = TacticalSettings::with_default_rotation(&home);
        let away_tactics = TacticalSettings::with_default_rotation(&away);
        let mut state = GameState::new(&home, &away, &home_tactics, &away_tactics, GameRng::from_user_seed(9));
        let score = state.play_period(1, TeamSide::Home);
        assert!(score.home + score.away > 20, "{score:?}");

        let entries: Vec<&PossessionEntry> = state
            .transcript
            .iter()
            .filter_map(|entry| match entry {
                PlayByPlay::Possession(entry) => Some(entry.as_ref()),
                _ => None,
            })
            .collect();
        assert!(entries.len() > 30);
        let total: f64 = entries.iter().map(|entry| entry.result.elapsed).sum();
        assert!((total - QUARTER_SECONDS).abs() < 1e-6, "{total}");
        assert!(matches!(state.transcript.last(), Some(PlayByPlay::PeriodEnd { period: 1, .. })));
    }

    #[test]
    fn team_fouls_reset_each_period() {
        let (home, away) = sample_teams().expect("sample teams");
        let home_tactics = TacticalSettings::with_default_rotation(&home);
        let away_tactics = TacticalSettings::with_default_rotation(&away);
        let mut state = GameState::new(&home, &away, &home_tactics, &away_tactics, GameRng::from_user_seed(4));
        state.play_period(1, TeamSide::Away);
        state.play_period(2, TeamSide::Home);
        for entry in &state.transcript {
            if let PlayByPlay::Possession(entry) = entry {
                for foul in entry.result.fouls() {
                    assert!(foul.team_fouls >= 1);
                }
            }
        }
        let second_period_first_foul = state
            .transcript
            .iter()
            .filter_map(|entry| match entry {
                PlayByPlay::Possession(entry) if entry.period == 2 => entry.result.fouls().next(),
                _ => None,
            })
            .find(|foul| foul.side == TeamSide::Home);
        if let Some(foul) = second_period_first_foul {
            assert_eq!(foul.team_fouls, 1);
        }
    }

    #[test]
    fn margin_is_signed_by_side() {
        let mut score = Scoreboard::default();
        score.add(TeamSide::Home, 3);
        score.add(TeamSide::Away, 2);
        assert_eq!(score.margin(TeamSide::Home), 1);
        assert_eq!(score.margin(TeamSide::Away), -1);
    }
}
