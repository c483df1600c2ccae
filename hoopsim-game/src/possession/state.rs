//! Ball-state machine: the single authority on when the game can stop.
//!
//! Substitutions and timeouts need a [`DeadBallWindow`], which only
//! [`PossessionStateMachine::dead_ball_window`] can mint and only while the ball
//! is dead. The window borrows the machine, so no event can be applied while
//! one is held.
use serde::{Deserialize, Serialize};

use crate::team::TeamSide;

/// Why play is stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadBallReason {
    PendingTimeoutAfterScore,
    MissedFinalFreeThrow,
    Foul,
    Violation,
    QuarterStart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum BallState {
    Live,
    Dead(DeadBallReason),
}

/// Ball-state transitions emitted by possession resolution, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum BallEvent {
    /// Field goal made; the other team inbounds.
    MadeBasket { scorer: TeamSide },
    /// Last free throw of a trip made.
    MadeFinalFreeThrow { shooter: TeamSide },
    /// Shot or final free throw missed with the rebound still to come.
    MissedShot,
    Rebound { side: TeamSide },
    LiveBallTurnover { to: TeamSide },
    /// Shot-clock expiry.
    DeadBallTurnover { to: TeamSide },
    /// Whistle; `ball_to` inbounds or shoots.
    Foul { ball_to: TeamSide },
    /// Travel, lane or backcourt call; the other side inbounds.
    Violation { to: TeamSide },
    /// Missed final free throw with nobody eligible to rebound.
    MissedFinalFreeThrowNoRebounder { to: TeamSide },
    PeriodStart { possession: TeamSide },
    Inbound,
}

/// Live/dead ball state plus the team in possession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PossessionStateMachine {
    state: BallState,
    possession: TeamSide,
}

impl PossessionStateMachine {
    /// New machine at a period start.
    #[must_use]
    pub const fn new(possession: TeamSide) -> Self {
        Self {
            state: BallState::Dead(DeadBallReason::QuarterStart),
            possession,
        }
    }

    #[must_use]
    pub const fn state(&self) -> BallState {
        self.state
    }

    #[must_use]
    pub const fn possession(&self) -> TeamSide {
        self.possession
    }

    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self.state, BallState::Live)
    }

    /// Apply one transition.
    pub fn apply(&mut self, event: BallEvent) {
        let (state, possession) = match event {
            BallEvent::MadeBasket { scorer } | BallEvent::MadeFinalFreeThrow { shooter: scorer } => (
                BallState::Dead(DeadBallReason::PendingTimeoutAfterScore),
                scorer.other(),
            ),
            BallEvent::MissedShot => (BallState::Live, self.possession),
            BallEvent::Rebound { side } => (BallState::Live, side),
            BallEvent::LiveBallTurnover { to } => (BallState::Live, to),
            BallEvent::DeadBallTurnover { to } | BallEvent::Violation { to } => {
                (BallState::Dead(DeadBallReason::Violation), to)
            }
            BallEvent::Foul { ball_to } => (BallState::Dead(DeadBallReason::Foul), ball_to),
            BallEvent::MissedFinalFreeThrowNoRebounder { to } => {
                (BallState::Dead(DeadBallReason::MissedFinalFreeThrow), to)
            }
            BallEvent::PeriodStart { possession } => {
                (BallState::Dead(DeadBallReason::QuarterStart), possession)
            }
            BallEvent::Inbound => (BallState::Live, self.possession),
        };
        self.state = state;
        self.possession = possession;
    }

    /// Mint a window when the ball is dead.
    #[must_use]
    pub fn dead_ball_window(&self) -> Option<DeadBallWindow<'_>> {
        match self.state {
            BallState::Dead(reason) => Some(DeadBallWindow {
                reason,
                possession: self.possession,
                _machine: self,
            }),
            BallState::Live => None,
        }
    }
}

/// Proof that the ball is dead. Borrowing the machine keeps it frozen.
#[derive(Debug)]
pub struct DeadBallWindow<'a> {
    reason: DeadBallReason,
    possession: TeamSide,
    _machine: &'a PossessionStateMachine,
}

impl DeadBallWindow<'_> {
    #[must_use]
    pub const fn reason(&self) -> DeadBallReason {
        self.reason
    }

    /// Team that will inbound when play resumes.
    #[must_use]
    pub const fn possession(&self) -> TeamSide {
        self.possession
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn made_basket_opens_window_for_the_other_team() {
        let mut machine = PossessionStateMachine::new(TeamSide::Home);
        machine.apply(BallEvent::Inbound);
        assert!(machine.dead_ball_window().is_none());
        machine.apply(BallEvent::MadeBasket {
            scorer: TeamSide::Home,
        });
        let window = machine.dead_ball_window().expect("dead after a score");
        assert_eq!(window.reason(), DeadBallReason::PendingTimeoutAfterScore);
        assert_eq!(window.possession(), TeamSide::Away);
    }

    #[test]
    fn live_ball_sequences_never_open_windows() {
        let mut machine = PossessionStateMachine::new(TeamSide::Away);
        machine.apply(BallEvent::Inbound);
        for event in [
            BallEvent::MissedShot,
            BallEvent::Rebound {
                side: TeamSide::Home,
            },
            BallEvent::LiveBallTurnover { to: TeamSide::Away },
        ] {
            machine.apply(event);
            assert!(machine.is_live());
            assert!(machine.dead_ball_window().is_none());
        }
        assert_eq!(machine.possession(), TeamSide::Away);
    }

    #[test]
    fn whistles_map_to_reasons() {
        let mut machine = PossessionStateMachine::new(TeamSide::Home);
        machine.apply(BallEvent::Foul {
            ball_to: TeamSide::Home,
        });
        assert_eq!(machine.state(), BallState::Dead(DeadBallReason::Foul));
        machine.apply(BallEvent::DeadBallTurnover { to: TeamSide::Away });
        assert_eq!(machine.state(), BallState::Dead(DeadBallReason::Violation));
        assert_eq!(machine.possession(), TeamSide::Away);
        machine.apply(BallEvent::Violation { to: TeamSide::Home });
        assert_eq!(machine.state(), BallState::Dead(DeadBallReason::Violation));
        assert_eq!(machine.possession(), TeamSide::Home);
        machine.apply(BallEvent::MissedFinalFreeThrowNoRebounder { to: TeamSide::Home });
        assert_eq!(
            machine.state(),
            BallState::Dead(DeadBallReason::MissedFinalFreeThrow)
        );
        machine.apply(BallEvent::PeriodStart {
            possession: TeamSide::Away,
        });
        assert_eq!(machine.state(), BallState::Dead(DeadBallReason::QuarterStart));
        machine.apply(BallEvent::MadeFinalFreeThrow {
            shooter: TeamSide::Away,
        });
        assert_eq!(machine.possession(), TeamSide::Home);
    }
}
