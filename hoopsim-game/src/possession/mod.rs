//! Single-possession resolution.
//!
//! A possession is a short chain of steps: half-court sequences, rebounds,
//! putbacks, and trips to the line. Each step returns the next one until the
//! ball changes hands, play stops with the offense retaining it, or the period
//! clock runs out. Fouls are written to the [`FoulTracker`] as they happen.
pub mod state;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    INTENTIONAL_FOUL_MAX_ELAPSED, INTENTIONAL_FOUL_MIN_ELAPSED, KICKOUT_SECONDS, LOOSE_BALL_FOUL_RATE,
    MAX_POSSESSION_SECONDS, MAX_POSSESSION_SEQUENCES, MAX_PUTBACK_CHAIN, MIN_POSSESSION_SECONDS,
    POSSESSION_SECONDS_SPREAD, PUTBACK_SECONDS, SCRAMBLE_DEFENSE_FACTOR, SHOT_CLOCK_FULL,
    SHOT_CLOCK_RESET, TRANSITION_SECONDS, TRANSITION_SECONDS_SPREAD,
};
use crate::defense::{
    ContestInput, ContestTier, apply_help_defense, assign_defender, contest_distance,
    matchup_defender, roll_scheme,
};
use crate::endgame::{EndGameOverlay, HoldTarget};
use crate::fouls::{FoulEvent, FoulKind, FoulTracker, FouledShot, non_shooting_foul_check};
use crate::free_throws::{FreeThrowSituation, shoot_free_throws};
use crate::player::Player;
use crate::probability::{composite, roll, select, weights};
use crate::rebounds::{ReboundInput, attempts_putback, resolve_rebound, transition_check};
use crate::shooting::{
    RimFinish, ShotInput, ShotSelectionInput, ShotType, assist_check, block_check,
    choose_rim_finish, resolve_shot, select_shot_type, shooting_foul_check,
};
use crate::tactics::{DefenseScheme, TacticalSettings};
use crate::team::TeamSide;
use crate::trace::{PossessionTrace, TraceEntry, WeightedCandidate};
use crate::turnovers::{TurnoverInput, TurnoverKind, resolve_steal, turnover_check, turnover_kind};
use state::{BallEvent, PossessionStateMachine};

/// Situation at the start of a possession.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PossessionContext {
    pub period: u8,
    pub offense: TeamSide,
    /// Carried over from the previous possession's outcome.
    pub transition: bool,
    pub shot_clock: f64,
    /// Seconds left in the period.
    pub time_remaining: f64,
    /// Offense's score minus the defense's.
    pub score_diff: i32,
}

/// One team as the possession sees it: degraded on-court snapshots and tactics.
#[derive(Debug, Clone, Copy)]
pub struct TeamView<'a> {
    pub side: TeamSide,
    pub lineup: &'a [Player],
    pub tactics: &'a TacticalSettings,
}

/// Everything needed to resolve one possession.
#[derive(Debug, Clone, Copy)]
pub struct PossessionInput<'a> {
    pub context: PossessionContext,
    pub offense: TeamView<'a>,
    pub defense: TeamView<'a>,
    pub overlay: &'a EndGameOverlay,
}

/// How the possession ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PossessionKind {
    FieldGoal { shot: ShotType },
    FreeThrows { made: u8, attempted: u8 },
    DefensiveRebound,
    Turnover { turnover: TurnoverKind },
    /// Non-shooting foul outside the bonus; the offense inbounds again.
    FoulRetained,
    /// Missed final free throw with nobody eligible to rebound.
    NoRebounder,
    /// Offense kept the ball through the sequence limit.
    Continued,
    PeriodExpired,
}

/// Ordered play-by-play events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PlayEvent {
    Shot {
        side: TeamSide,
        shooter: String,
        defender: String,
        shot: ShotType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        finish: Option<RimFinish>,
        contest_feet: f64,
        tier: ContestTier,
        helped: bool,
        putback: bool,
        fouled: bool,
        made: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        blocked_by: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        assisted_by: Option<String>,
    },
    Rebound {
        side: TeamSide,
        player: String,
        offensive: bool,
    },
    Kickout {
        side: TeamSide,
        player: String,
    },
    Turnover {
        side: TeamSide,
        player: String,
        turnover: TurnoverKind,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        stolen_by: Option<String>,
    },
    Foul(FoulEvent),
    FreeThrow {
        side: TeamSide,
        shooter: String,
        made: bool,
        attempt: u8,
        of: u8,
    },
}

/// Immutable record of one resolved possession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PossessionResult {
    pub offense: TeamSide,
    pub kind: PossessionKind,
    pub scheme: DefenseScheme,
    pub points: u8,
    pub elapsed: f64,
    pub events: Vec<PlayEvent>,
    pub ball_events: Vec<BallEvent>,
    pub next_offense: TeamSide,
    pub next_transition: bool,
    pub next_shot_clock: f64,
    #[serde(default, skip_serializing_if = "EndGameOverlay::is_neutral")]
    pub end_game: EndGameOverlay,
    pub trace: PossessionTrace,
}

impl PossessionResult {
    /// Fouls charged during the possession.
    pub fn fouls(&self) -> impl Iterator<Item = &FoulEvent> {
        self.events.iter().filter_map(|event| match event {
            PlayEvent::Foul(foul) => Some(foul),
            _ => None,
        })
    }
}

enum Step {
    Sequence {
        shot_clock: f64,
        transition: bool,
        kickout: bool,
    },
    Putback {
        shooter: usize,
    },
    Rebound {
        shot: Option<ShotType>,
        blocked: bool,
    },
    FreeThrows {
        shooter: usize,
        count: u8,
        situation: FreeThrowSituation,
    },
    Done(PossessionKind),
}

struct ShotOutcome {
    shot: ShotType,
    made: bool,
    blocked: bool,
    free_throws: u8,
}

struct PossessionOrchestrator<'a, 'f, R: Rng + ?Sized> {
    input: &'a PossessionInput<'a>,
    fouls: &'f mut FoulTracker,
    rng: &'f mut R,
    scheme: DefenseScheme,
    zone_share: f64,
    ball: PossessionStateMachine,
    events: Vec<PlayEvent>,
    ball_events: Vec<BallEvent>,
    trace: PossessionTrace,
    elapsed: f64,
    points: u8,
    putbacks: u8,
    shot_clock_left: f64,
    next_transition: bool,
}

/// Resolve one possession, recording fouls as they are committed.
pub fn resolve_possession<R: Rng + ?Sized>(
    input: &PossessionInput<'_>,
    fouls: &mut FoulTracker,
    rng: &mut R,
) -> PossessionResult {
    let mut trace = PossessionTrace::new();
    let zone_share = input.defense.tactics.zone_share();
    let (scheme, entry) = roll_scheme(zone_share, rng);
    trace.push(entry);
    let mut ball = PossessionStateMachine::new(input.context.offense);
    ball.apply(BallEvent::Inbound);
    let orchestrator = PossessionOrchestrator {
        input,
        fouls,
        rng,
        scheme,
        zone_share,
        ball,
        events: Vec::new(),
        ball_events: Vec::new(),
        trace,
        elapsed: 0.0,
        points: 0,
        putbacks: 0,
        shot_clock_left: input.context.shot_clock,
        next_transition: false,
    };
    orchestrator.run()
}

impl<'a, R: Rng + ?Sized> PossessionOrchestrator<'a, '_, R> {
    fn ctx(&self) -> &'a PossessionContext {
        &self.input.context
    }

    fn offense(&self) -> TeamView<'a> {
        self.input.offense
    }

    fn defense(&self) -> TeamView<'a> {
        self.input.defense
    }

    fn remaining(&self) -> f64 {
        (self.ctx().time_remaining - self.elapsed).max(0.0)
    }

    fn push_ball(&mut self, event: BallEvent) {
        self.ball.apply(event);
        self.ball_events.push(event);
    }

    fn extend_trace(&mut self, fragment: impl IntoIterator<Item = TraceEntry>) {
        self.trace.extend(fragment);
    }

    /// Ends the possession when a lineup slot it needs is empty.
    fn missing(&mut self, what: &str) -> Step {
        self.trace.fallback(format!("possession: no {what} on the floor"));
        Step::Done(PossessionKind::PeriodExpired)
    }

    /// Defenders still allowed to play this possession.
    ///
    /// A player who fouls out mid-possession sits until the next dead-ball
    /// window swaps them out. If nobody is left the whole lineup stays on.
    fn active_defenders(&mut self) -> Vec<Player> {
        let defense = self.defense();
        let (_, active) = self.eligible(defense);
        if active.is_empty() && !defense.lineup.is_empty() {
            self.trace
                .fallback("possession: every defender has fouled out, lineup stays on");
            return defense.lineup.to_vec();
        }
        active
    }

    fn run(mut self) -> PossessionResult {
        let mut step = if self.input.overlay.intentional_foul {
            self.intentional_foul()
        } else {
            Step::Sequence {
                shot_clock: self.ctx().shot_clock,
                transition: self.ctx().transition,
                kickout: false,
            }
        };
        let mut sequences: u8 = 0;
        let kind = loop {
            step = match step {
                Step::Sequence {
                    shot_clock,
                    transition,
                    kickout,
                } => {
                    sequences += 1;
                    if self.remaining() <= 0.0 {
                        Step::Done(PossessionKind::PeriodExpired)
                    } else if sequences > MAX_POSSESSION_SEQUENCES {
                        Step::Done(PossessionKind::Continued)
                    } else {
                        self.sequence(shot_clock, transition, kickout)
                    }
                }
                Step::Putback { shooter } => self.putback(shooter),
                Step::Rebound { shot, blocked } => self.rebound(shot, blocked),
                Step::FreeThrows {
                    shooter,
                    count,
                    situation,
                } => self.free_throws(shooter, count, situation),
                Step::Done(kind) => break kind,
            };
        };
        self.finish(kind)
    }

    fn finish(self, kind: PossessionKind) -> PossessionResult {
        let offense = self.ctx().offense;
        let retains = matches!(
            kind,
            PossessionKind::FoulRetained | PossessionKind::Continued | PossessionKind::PeriodExpired
        );
        let next_offense = if retains { offense } else { offense.other() };
        let next_shot_clock = match kind {
            PossessionKind::FoulRetained => self.shot_clock_left.max(SHOT_CLOCK_RESET),
            PossessionKind::Continued => SHOT_CLOCK_RESET,
            _ => SHOT_CLOCK_FULL,
        };
        let elapsed = self.elapsed.min(self.ctx().time_remaining);
        log::debug!(
            "P{} {offense} {:?}: {} pts in {elapsed:.1}s",
            self.ctx().period,
            kind,
            self.points
        );
        PossessionResult {
            offense,
            kind,
            scheme: self.scheme,
            points: self.points,
            elapsed,
            events: self.events,
            ball_events: self.ball_events,
            next_offense,
            next_transition: self.next_transition && !retains,
            next_shot_clock,
            end_game: self.input.overlay.clone(),
            trace: self.trace,
        }
    }

    /// Seconds burned by one half-court or transition sequence.
    fn sequence_seconds(&mut self, shot_clock: f64, transition: bool, kickout: bool) -> f64 {
        let remaining = self.remaining();
        let seconds = if let Some(hold) = self.input.overlay.hold {
            let held = match hold {
                HoldTarget::ShotClock(target) => shot_clock - target,
                HoldTarget::GameClock(target) => remaining - target,
            };
            self.trace.note(format!("clock.hold {held:.1}s"));
            held.min(shot_clock).max(1.0)
        } else {
            let (nominal, spread) = if transition {
                (TRANSITION_SECONDS, TRANSITION_SECONDS_SPREAD)
            } else if kickout {
                (KICKOUT_SECONDS, TRANSITION_SECONDS_SPREAD)
            } else {
                let pace = self.offense().tactics.pace.possession_seconds();
                (pace * (1.0 + self.input.overlay.pace_fraction), POSSESSION_SECONDS_SPREAD)
            };
            let jitter = self.rng.r#gen::<f64>() * 2.0 - 1.0;
            (nominal + jitter * spread)
                .clamp(MIN_POSSESSION_SECONDS, MAX_POSSESSION_SECONDS)
                .min(shot_clock)
        };
        seconds.min(remaining)
    }

    fn choose_actor(&mut self) -> usize {
        let lineup = self.offense().lineup;
        let shares = self.offense().tactics.usage_shares(lineup);
        let candidates = lineup
            .iter()
            .zip(shares)
            .map(|(player, share)| WeightedCandidate::plain(player.name.clone(), share))
            .collect();
        let selection = select("possession.actor", candidates, self.rng);
        self.extend_trace(selection.trace);
        selection.index
    }

    fn sequence(&mut self, shot_clock: f64, transition: bool, kickout: bool) -> Step {
        if !self.ball.is_live() {
            self.push_ball(BallEvent::Inbound);
        }
        let seconds = self.sequence_seconds(shot_clock, transition, kickout);
        let shot_clock_after = (shot_clock - seconds).max(0.0);
        let offense = self.offense();
        let defense = self.defense();
        let actor = self.choose_actor();
        let defenders = self.active_defenders();
        let Some(handler) = offense.lineup.get(actor) else {
            self.elapsed += seconds;
            return self.missing("ball handler");
        };
        let matchup = matchup_defender(handler, &defenders);
        let Some(defender) = defenders.get(matchup) else {
            self.elapsed += seconds;
            return self.missing("defender");
        };
        let score_diff = self.ctx().score_diff + i32::from(self.points);

        let turnover_input = TurnoverInput {
            handler,
            defender,
            pace: offense.tactics.pace,
            transition,
            zone_share: self.zone_share,
            shot_clock: shot_clock_after,
            score_diff,
        };
        let (turned_over, entry) = turnover_check(&turnover_input, self.rng);
        self.trace.push(entry);
        if turned_over {
            let (turnover, kind_trace) = turnover_kind(&turnover_input, self.rng);
            self.extend_trace(kind_trace);
            self.elapsed += if turnover == TurnoverKind::ShotClock {
                shot_clock.min(self.remaining())
            } else {
                seconds
            };
            return self.turnover(actor, &defenders, matchup, turnover);
        }

        let (fouled, entry) = non_shooting_foul_check(handler, defender, self.rng);
        self.trace.push(entry);
        self.elapsed += seconds;
        self.shot_clock_left = shot_clock_after;
        if fouled {
            let event = self.fouls.record_foul(
                defense.side,
                &defender.name,
                FoulKind::NonShooting,
                Some(&handler.name),
                None,
            );
            let free_throws = event.free_throws;
            self.events.push(PlayEvent::Foul(event));
            self.push_ball(BallEvent::Foul {
                ball_to: offense.side,
            });
            if free_throws > 0 {
                return Step::FreeThrows {
                    shooter: actor,
                    count: free_throws,
                    situation: self.situation(true, false),
                };
            }
            return Step::Done(PossessionKind::FoulRetained);
        }

        let Some(outcome) = self.shot(actor, false, transition) else {
            return self.missing("shot participant");
        };
        self.after_shot(actor, &outcome)
    }

    fn after_shot(&mut self, shooter: usize, outcome: &ShotOutcome) -> Step {
        let offense_side = self.offense().side;
        if outcome.free_throws > 0 {
            self.push_ball(BallEvent::Foul {
                ball_to: offense_side,
            });
            return Step::FreeThrows {
                shooter,
                count: outcome.free_throws,
                situation: self.situation(false, outcome.made),
            };
        }
        if outcome.made {
            self.push_ball(BallEvent::MadeBasket {
                scorer: offense_side,
            });
            return Step::Done(PossessionKind::FieldGoal { shot: outcome.shot });
        }
        self.push_ball(BallEvent::MissedShot);
        Step::Rebound {
            shot: Some(outcome.shot),
            blocked: outcome.blocked,
        }
    }

    fn situation(&self, bonus: bool, and_one: bool) -> FreeThrowSituation {
        let ctx = self.ctx();
        FreeThrowSituation {
            bonus,
            and_one,
            clutch: FreeThrowSituation::is_clutch(
                ctx.period,
                self.remaining(),
                ctx.score_diff + i32::from(self.points),
            ),
        }
    }

    fn turnover(
        &mut self,
        actor: usize,
        defenders: &[Player],
        matchup: usize,
        turnover: TurnoverKind,
    ) -> Step {
        let offense = self.offense();
        let defense = self.defense();
        let Some(handler) = offense.lineup.get(actor) else {
            return self.missing("ball handler");
        };
        let mut stolen_by = None;
        if turnover.is_live_ball() {
            let (stealer, steal_trace) = resolve_steal(handler, defenders, matchup, self.rng);
            self.extend_trace(steal_trace);
            stolen_by = stealer.and_then(|idx| defenders.get(idx)).map(|p| p.name.clone());
        }
        self.events.push(PlayEvent::Turnover {
            side: offense.side,
            player: handler.name.clone(),
            turnover,
            stolen_by,
        });
        match turnover {
            TurnoverKind::OffensiveFoul => {
                let event = self.fouls.record_foul(
                    offense.side,
                    &handler.name,
                    FoulKind::Offensive,
                    defenders.get(matchup).map(|p| p.name.as_str()),
                    None,
                );
                self.events.push(PlayEvent::Foul(event));
                self.push_ball(BallEvent::Foul {
                    ball_to: defense.side,
                });
            }
            kind if kind.is_live_ball() => {
                self.next_transition = true;
                self.push_ball(BallEvent::LiveBallTurnover { to: defense.side });
            }
            TurnoverKind::OtherViolation => self.push_ball(BallEvent::Violation { to: defense.side }),
            _ => self.push_ball(BallEvent::DeadBallTurnover { to: defense.side }),
        }
        Step::Done(PossessionKind::Turnover { turnover })
    }

    fn shot(&mut self, shooter_idx: usize, putback: bool, transition: bool) -> Option<ShotOutcome> {
        let offense = self.offense();
        let defense = self.defense();
        let shooter = offense.lineup.get(shooter_idx)?;
        let defenders = self.active_defenders();
        let overlay = self.input.overlay;

        let shot = if putback {
            ShotType::Rim
        } else {
            let (shot, shot_trace) = select_shot_type(
                &ShotSelectionInput {
                    shooter,
                    pace: offense.tactics.pace,
                    zone_share: self.zone_share,
                    transition,
                    three_point_boost: overlay.three_point_boost,
                    forced: overlay.forced_shot,
                },
                self.rng,
            );
            self.extend_trace(shot_trace);
            shot
        };
        let finish = if shot == ShotType::Rim {
            let (finish, entry) = choose_rim_finish(shooter, self.rng);
            self.extend_trace(entry);
            Some(finish)
        } else {
            None
        };

        let assignment = assign_defender(self.scheme, shooter, shot, &defenders, self.rng);
        self.extend_trace(assignment.trace);
        let primary = defenders.get(assignment.defender)?;
        let distance = contest_distance(
            &ContestInput {
                defender: primary,
                shooter,
                shot,
                zone_share: self.zone_share,
                help_closing: false,
            },
            self.rng,
        );
        let contest = apply_help_defense(
            assignment.defender,
            distance,
            shooter,
            shot,
            self.zone_share,
            &defenders,
            self.rng,
        );
        self.extend_trace(contest.trace.iter().cloned());
        let contester = defenders.get(contest.defender)?;
        let scramble;
        let effective_defender = if putback {
            scramble = contester.degraded(1.0 - SCRAMBLE_DEFENSE_FACTOR);
            &scramble
        } else {
            contester
        };

        let (fouled, entry) = shooting_foul_check(shooter, effective_defender, shot, contest.tier, self.rng);
        self.trace.push(entry);
        let (made, entry) = resolve_shot(
            &ShotInput {
                shooter,
                defender: effective_defender,
                shot,
                finish,
                tier: contest.tier,
                transition,
                putback,
                score_diff: self.ctx().score_diff + i32::from(self.points),
            },
            self.rng,
        );
        self.trace.push(entry);

        let mut blocked_by = None;
        if !made
            && !fouled
            && let Some((blocked, entry)) = block_check(shooter, contester, shot, contest.tier, self.rng)
        {
            self.trace.push(entry);
            if blocked {
                blocked_by = Some(contester.name.clone());
            }
        }
        let mut assisted_by = None;
        if made && !putback {
            let (passer, assist_trace) = assist_check(offense.lineup, shooter_idx, shot, transition, self.rng);
            self.extend_trace(assist_trace);
            assisted_by = passer.and_then(|idx| offense.lineup.get(idx)).map(|p| p.name.clone());
        }
        if made {
            self.points = self.points.saturating_add(shot.value());
        }
        let blocked = blocked_by.is_some();
        self.events.push(PlayEvent::Shot {
            side: offense.side,
            shooter: shooter.name.clone(),
            defender: contester.name.clone(),
            shot,
            finish,
            contest_feet: contest.distance,
            tier: contest.tier,
            helped: contest.helped,
            putback,
            fouled,
            made,
            blocked_by,
            assisted_by,
        });

        let mut free_throws = 0;
        if fouled {
            let event = self.fouls.record_foul(
                defense.side,
                &contester.name,
                FoulKind::Shooting,
                Some(&shooter.name),
                Some(FouledShot {
                    value: shot.value(),
                    made,
                }),
            );
            free_throws = event.free_throws;
            self.events.push(PlayEvent::Foul(event));
        }
        Some(ShotOutcome {
            shot,
            made,
            blocked,
            free_throws,
        })
    }

    fn putback(&mut self, shooter: usize) -> Step {
        self.elapsed += PUTBACK_SECONDS.min(self.remaining());
        let Some(outcome) = self.shot(shooter, true, false) else {
            return self.missing("putback participant");
        };
        self.after_shot(shooter, &outcome)
    }

    fn eligible(&self, view: TeamView<'a>) -> (Vec<usize>, Vec<Player>) {
        view.lineup
            .iter()
            .enumerate()
            .filter(|(_, player)| !self.fouls.is_fouled_out(view.side, &player.name))
            .map(|(idx, player)| (idx, player.clone()))
            .unzip()
    }

    fn rebound(&mut self, shot: Option<ShotType>, blocked: bool) -> Step {
        let offense = self.offense();
        let defense = self.defense();
        let (offense_idx, offense_pool) = self.eligible(offense);
        let (defense_idx, defense_pool) = self.eligible(defense);
        let outcome = resolve_rebound(
            &ReboundInput {
                offense: &offense_pool,
                defense: &defense_pool,
                offense_strategy: offense.tactics.rebounding_strategy,
                defense_strategy: defense.tactics.rebounding_strategy,
                shot,
                blocked,
            },
            self.rng,
        );
        let Some(outcome) = outcome else {
            self.trace.note("rebound: no eligible rebounders, ball to the defense");
            self.push_ball(BallEvent::MissedFinalFreeThrowNoRebounder { to: defense.side });
            return Step::Done(PossessionKind::NoRebounder);
        };
        self.extend_trace(outcome.trace);

        if !outcome.offensive {
            let Some(rebounder) = defense_pool.get(outcome.rebounder) else {
                return self.missing("defensive rebounder");
            };
            self.events.push(PlayEvent::Rebound {
                side: defense.side,
                player: rebounder.name.clone(),
                offensive: false,
            });
            self.push_ball(BallEvent::Rebound { side: defense.side });
            let (running, entry) = transition_check(offense.tactics.rebounding_strategy, self.rng);
            self.trace.push(entry);
            self.next_transition = running;
            return Step::Done(PossessionKind::DefensiveRebound);
        }

        let (Some(&shooter), Some(rebounder)) = (
            offense_idx.get(outcome.rebounder),
            offense_pool.get(outcome.rebounder),
        ) else {
            return self.missing("offensive rebounder");
        };
        self.events.push(PlayEvent::Rebound {
            side: offense.side,
            player: rebounder.name.clone(),
            offensive: true,
        });
        self.push_ball(BallEvent::Rebound { side: offense.side });

        if !defense_idx.is_empty() {
            let (loose_ball, entry) = roll("foul.loose_ball", LOOSE_BALL_FOUL_RATE, self.rng);
            self.trace.push(entry);
            if loose_ball {
                let Some(fouler) = defense_pool.get(matchup_defender(rebounder, &defense_pool)) else {
                    return self.missing("loose-ball defender");
                };
                let event = self.fouls.record_foul(
                    defense.side,
                    &fouler.name,
                    FoulKind::LooseBall,
                    Some(&rebounder.name),
                    None,
                );
                let free_throws = event.free_throws;
                self.events.push(PlayEvent::Foul(event));
                self.push_ball(BallEvent::Foul {
                    ball_to: offense.side,
                });
                if free_throws > 0 {
                    return Step::FreeThrows {
                        shooter,
                        count: free_throws,
                        situation: self.situation(true, false),
                    };
                }
                return Step::Sequence {
                    shot_clock: SHOT_CLOCK_RESET,
                    transition: false,
                    kickout: true,
                };
            }
        }

        if attempts_putback(rebounder) && self.putbacks < MAX_PUTBACK_CHAIN {
            self.putbacks += 1;
            return Step::Putback { shooter };
        }
        self.events.push(PlayEvent::Kickout {
            side: offense.side,
            player: rebounder.name.clone(),
        });
        Step::Sequence {
            shot_clock: SHOT_CLOCK_RESET,
            transition: false,
            kickout: true,
        }
    }

    fn free_throws(&mut self, shooter: usize, count: u8, situation: FreeThrowSituation) -> Step {
        let offense = self.offense();
        let Some(player) = offense.lineup.get(shooter) else {
            return self.missing("free-throw shooter");
        };
        let outcome = shoot_free_throws(player, count, situation, self.rng);
        for (attempt, made) in (1..=count).zip(outcome.results.iter().copied()) {
            self.events.push(PlayEvent::FreeThrow {
                side: offense.side,
                shooter: player.name.clone(),
                made,
                attempt,
                of: count,
            });
        }
        self.points = self.points.saturating_add(outcome.made());
        let final_missed = outcome.final_missed();
        let made = outcome.made();
        self.extend_trace(outcome.trace);
        if final_missed {
            self.push_ball(BallEvent::MissedShot);
            return Step::Rebound {
                shot: None,
                blocked: false,
            };
        }
        self.push_ball(BallEvent::MadeFinalFreeThrow {
            shooter: offense.side,
        });
        Step::Done(PossessionKind::FreeThrows {
            made,
            attempted: count,
        })
    }

    /// Defense sends the offense's worst free-throw shooter to the line.
    fn intentional_foul(&mut self) -> Step {
        let offense = self.offense();
        let defense = self.defense();
        let seconds = INTENTIONAL_FOUL_MIN_ELAPSED
            + self.rng.r#gen::<f64>() * (INTENTIONAL_FOUL_MAX_ELAPSED - INTENTIONAL_FOUL_MIN_ELAPSED);
        self.elapsed += seconds.min(self.remaining());
        self.shot_clock_left = (self.ctx().shot_clock - seconds).max(0.0);

        let target = offense
            .lineup
            .iter()
            .enumerate()
            .fold(None, |worst: Option<(usize, f64)>, (idx, player)| {
                let ft = composite(player, weights::FREE_THROW);
                match worst {
                    Some((_, low)) if low <= ft => worst,
                    _ => Some((idx, ft)),
                }
            })
            .map_or(0, |(idx, _)| idx);
        let Some(fouled) = offense.lineup.get(target) else {
            return self.missing("intentional-foul target");
        };
        let defenders = self.active_defenders();
        let Some(fouler) = defenders.get(matchup_defender(fouled, &defenders)) else {
            return self.missing("intentional-foul defender");
        };
        self.trace.note(format!("end_game.intentional_foul on {}", fouled.name));
        let event = self.fouls.record_foul(
            defense.side,
            &fouler.name,
            FoulKind::Intentional,
            Some(&fouled.name),
            None,
        );
        let free_throws = event.free_throws;
        self.events.push(PlayEvent::Foul(event));
        self.push_ball(BallEvent::Foul {
            ball_to: offense.side,
        });
        if free_throws > 0 {
            Step::FreeThrows {
                shooter: target,
                count: free_throws,
                situation: self.situation(true, false),
            }
        } else {
            Step::Done(PossessionKind::FoulRetained)
        }
    }
}
