//! Timeout budget, scoring runs, and when a coach stops play.
use serde::{Deserialize, Serialize};

use crate::constants::{
    LATE_TIMEOUT_MAX_DEFICIT, LATE_TIMEOUT_SECONDS, REGULATION_PERIODS, RUN_TRIGGER_AGGRESSIVE,
    RUN_TRIGGER_CONSERVATIVE, RUN_TRIGGER_STANDARD, TIMEOUTS_PER_GAME,
};
use crate::possession::state::DeadBallWindow;
use crate::tactics::TimeoutStrategy;
use crate::team::TeamSide;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "trigger", rename_all = "snake_case")]
pub enum TimeoutReason {
    /// Opponent's unanswered run reached the strategy's trigger.
    Momentum { run: u16 },
    /// Trailing by a possession in the final minute.
    LateGame,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutEvent {
    pub side: TeamSide,
    pub reason: TimeoutReason,
    /// Timeouts left after this one.
    pub remaining: u8,
}

/// Clock and score as seen by the team considering a timeout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeoutSituation {
    pub period: u8,
    pub time_remaining: f64,
    /// This team's score minus the opponent's.
    pub score_diff: i32,
}

/// Unanswered points needed before a momentum timeout.
#[must_use]
pub const fn run_trigger(strategy: TimeoutStrategy) -> u16 {
    match strategy {
        TimeoutStrategy::Aggressive => RUN_TRIGGER_AGGRESSIVE,
        TimeoutStrategy::Standard => RUN_TRIGGER_STANDARD,
        TimeoutStrategy::Conservative => RUN_TRIGGER_CONSERVATIVE,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutManager {
    remaining: [u8; 2],
    /// Team on the current run and its unanswered points.
    run: Option<(TeamSide, u16)>,
    /// Period in which each team last used its late-game timeout.
    late_called: [Option<u8>; 2],
}

impl Default for TimeoutManager {
    fn default() -> Self {
        Self {
            remaining: [TIMEOUTS_PER_GAME; 2],
            run: None,
            late_called: [None; 2],
        }
    }
}

impl TimeoutManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn remaining(&self, side: TeamSide) -> u8 {
        self.remaining[side.index()]
    }

    #[must_use]
    pub const fn run(&self) -> Option<(TeamSide, u16)> {
        self.run
    }

    /// Points scored by `side` extend its run or start a new one.
    pub fn record_score(&mut self, side: TeamSide, points: u8) {
        if points == 0 {
            return;
        }
        let points = u16::from(points);
        self.run = match self.run {
            Some((runner, total)) if runner == side => Some((side, total.saturating_add(points))),
            _ => Some((side, points)),
        };
    }

    /// Whether `side` wants a timeout right now.
    #[must_use]
    pub fn evaluate(
        &self,
        side: TeamSide,
        strategy: TimeoutStrategy,
        situation: &TimeoutSituation,
    ) -> Option<TimeoutReason> {
        if self.remaining(side) == 0 {
            return None;
        }
        if let Some((runner, run)) = self.run
            && runner == side.other()
            && run >= run_trigger(strategy)
        {
            return Some(TimeoutReason::Momentum { run });
        }
        let late = situation.period >= REGULATION_PERIODS
            && situation.time_remaining <= LATE_TIMEOUT_SECONDS
            && (-LATE_TIMEOUT_MAX_DEFICIT..=-1).contains(&situation.score_diff)
            && strategy != TimeoutStrategy::Conservative
            && self.late_called[side.index()] != Some(situation.period);
        late.then_some(TimeoutReason::LateGame)
    }

    /// Charge a timeout to `side`. Returns `None` when none are left.
    pub fn call_timeout(
        &mut self,
        _window: &DeadBallWindow<'_>,
        side: TeamSide,
        reason: TimeoutReason,
        period: u8,
    ) -> Option<TimeoutEvent> {
        let remaining = self.remaining[side.index()].checked_sub(1)?;
        self.remaining[side.index()] = remaining;
        self.run = None;
        if reason == TimeoutReason::LateGame {
            self.late_called[side.index()] = Some(period);
        }
        log::info!("{side} timeout ({reason:?}), {remaining} left");
        Some(TimeoutEvent {
            side,
            reason,
            remaining,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::possession::state::{BallEvent, PossessionStateMachine};

    fn early() -> TimeoutSituation {
        TimeoutSituation {
            period: 2,
            time_remaining: 400.0,
            score_diff: -10,
        }
    }

    #[test]
    fn runs_accumulate_until_answered() {
        let mut timeouts = TimeoutManager::new();
        timeouts.record_score(TeamSide::Home, 3);
        timeouts.record_score(TeamSide::Home, 2);
        assert_eq!(timeouts.run(), Some((TeamSide::Home, 5)));
        timeouts.record_score(TeamSide::Away, 0);
        assert_eq!(timeouts.run(), Some((TeamSide::Home, 5)));
        timeouts.record_score(TeamSide::Away, 1);
        assert_eq!(timeouts.run(), Some((TeamSide::Away, 1)));
    }

    #[test]
    fn momentum_trigger_depends_on_strategy() {
        let mut timeouts = TimeoutManager::new();
        for _ in 0..4 {
            timeouts.record_score(TeamSide::Home, 2);
        }
        let away = TeamSide::Away;
        assert_eq!(
            timeouts.evaluate(away, TimeoutStrategy::Aggressive, &early()),
            Some(TimeoutReason::Momentum { run: 8 })
        );
        assert_eq!(timeouts.evaluate(away, TimeoutStrategy::Standard, &early()), None);
        assert_eq!(timeouts.evaluate(TeamSide::Home, TimeoutStrategy::Aggressive, &early()), None);
        timeouts.record_score(TeamSide::Home, 2);
        assert!(timeouts.evaluate(away, TimeoutStrategy::Standard, &early()).is_some());
        assert_eq!(timeouts.evaluate(away, TimeoutStrategy::Conservative, &early()), None);
    }

    #[test]
    fn late_game_timeouts_skip_conservative_coaches() {
        let timeouts = TimeoutManager::new();
        let late = TimeoutSituation {
            period: 4,
            time_remaining: 45.0,
            score_diff: -2,
        };
        assert_eq!(
            timeouts.evaluate(TeamSide::Home, TimeoutStrategy::Standard, &late),
            Some(TimeoutReason::LateGame)
        );
        assert_eq!(timeouts.evaluate(TeamSide::Home, TimeoutStrategy::Conservative, &late), None);
        let down_four = TimeoutSituation {
            score_diff: -4,
            ..late
        };
        assert_eq!(timeouts.evaluate(TeamSide::Home, TimeoutStrategy::Aggressive, &down_four), None);
    }

    #[test]
    fn calling_spends_budget_and_resets_the_run() {
        let mut timeouts = TimeoutManager::new();
        let mut machine = PossessionStateMachine::new(TeamSide::Home);
        machine.apply(BallEvent::Inbound);
        machine.apply(BallEvent::MadeBasket {
            scorer: TeamSide::Home,
        });
        timeouts.record_score(TeamSide::Home, 12);
        let window = machine.dead_ball_window().expect("dead after a score");
        let event = timeouts
            .call_timeout(&window, TeamSide::Away, TimeoutReason::LateGame, 4)
            .expect("has timeouts");
        assert_eq!(event.remaining, TIMEOUTS_PER_GAME - 1);
        assert_eq!(timeouts.run(), None);
        let late = TimeoutSituation {
            period: 4,
            time_remaining: 30.0,
            score_diff: -1,
        };
        assert_eq!(timeouts.evaluate(TeamSide::Away, TimeoutStrategy::Aggressive, &late), None);

        for _ in 1..TIMEOUTS_PER_GAME {
            timeouts.call_timeout(&window, TeamSide::Away, TimeoutReason::Momentum { run: 10 }, 4);
        }
        assert_eq!(timeouts.remaining(TeamSide::Away), 0);
        assert!(
            timeouts
                .call_timeout(&window, TeamSide::Away, TimeoutReason::LateGame, 4)
                .is_none()
        );
    }
}
