//! Late-game strategic modes and their per-possession overlay.
//!
//! Modes are only considered in the fourth period and overtime. Additive
//! effects (three-point boost, extra clock burn) stack across every eligible
//! mode; exclusive decisions (hold target, forced shot, intentional foul) go
//! to the first eligible mode in precedence order.
use serde::{Deserialize, Serialize};

use crate::constants::{
    CLOCK_KILL_SECONDS, CLOCK_KILL_SHOT_CLOCK_TARGET, CONSERVE_LEAD_MARGIN,
    CONSERVE_LEAD_PACE_FRACTION, CONSERVE_LEAD_SECONDS, DESPERATION_DEFICIT, DESPERATION_SECONDS,
    DESPERATION_THREE_BOOST, INTENTIONAL_FOUL_MAX_DEFICIT, INTENTIONAL_FOUL_SECONDS,
    LAST_SHOT_MAX_DEFICIT, LAST_SHOT_TARGET_SECONDS, REGULATION_PERIODS,
};
use crate::shooting::ShotType;
use crate::tactics::TacticalSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndGameMode {
    IntentionalFoul,
    LastSecondShot,
    ClockKill,
    Desperation,
    ConserveLead,
}

impl EndGameMode {
    pub const ALL: [Self; 5] = [
        Self::IntentionalFoul,
        Self::LastSecondShot,
        Self::ClockKill,
        Self::Desperation,
        Self::ConserveLead,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::IntentionalFoul => "intentional_foul",
            Self::LastSecondShot => "last_second_shot",
            Self::ClockKill => "clock_kill",
            Self::Desperation => "desperation",
            Self::ConserveLead => "conserve_lead",
        }
    }

    /// Default precedence, also used by serde when the field is absent.
    #[must_use]
    pub fn default_priority() -> Vec<Self> {
        Self::ALL.to_vec()
    }

    /// Whether the defense (rather than the offense) controls this mode.
    #[must_use]
    pub const fn is_defensive(self) -> bool {
        matches!(self, Self::IntentionalFoul)
    }
}

/// How long the offense holds before acting.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "clock", content = "seconds", rename_all = "snake_case")]
pub enum HoldTarget {
    /// Hold until this much remains on the shot clock.
    ShotClock(f64),
    /// Hold until this much remains on the game clock.
    GameClock(f64),
}

/// Situation used to evaluate modes, from the offense's point of view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EndGameSituation {
    pub period: u8,
    pub time_remaining: f64,
    pub shot_clock: f64,
    /// Offense's score minus the defense's.
    pub score_diff: i32,
}

impl EndGameSituation {
    #[must_use]
    pub fn is_eligible(&self, mode: EndGameMode) -> bool {
        if self.period < REGULATION_PERIODS {
            return false;
        }
        let diff = self.score_diff;
        let clock = self.time_remaining;
        match mode {
            EndGameMode::ClockKill => diff > 0 && clock <= CLOCK_KILL_SECONDS,
            EndGameMode::LastSecondShot => {
                (-LAST_SHOT_MAX_DEFICIT..=0).contains(&diff) && clock <= self.shot_clock
            }
            EndGameMode::Desperation => diff <= -DESPERATION_DEFICIT && clock <= DESPERATION_SECONDS,
            EndGameMode::ConserveLead => {
                diff >= CONSERVE_LEAD_MARGIN && clock <= CONSERVE_LEAD_SECONDS
            }
            EndGameMode::IntentionalFoul => {
                (1..=INTENTIONAL_FOUL_MAX_DEFICIT).contains(&diff) && clock <= INTENTIONAL_FOUL_SECONDS
            }
        }
    }
}

/// Composed per-possession adjustments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndGameOverlay {
    /// Eligible modes in precedence order.
    pub active: Vec<EndGameMode>,
    /// Mode that owns the exclusive decisions, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub governing: Option<EndGameMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold: Option<HoldTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_shot: Option<ShotType>,
    pub intentional_foul: bool,
    pub three_point_boost: f64,
    /// Extra fraction of nominal possession time burned.
    pub pace_fraction: f64,
}

impl EndGameOverlay {
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        self.active.is_empty()
    }
}

const fn has_exclusive_decision(mode: EndGameMode) -> bool {
    matches!(
        mode,
        EndGameMode::IntentionalFoul | EndGameMode::LastSecondShot | EndGameMode::ClockKill
    )
}

/// Evaluate every enabled mode and compose the overlay.
///
/// Offensive modes are enabled and ranked by the offense's priority list, the
/// intentional foul by the defense's. Equal ranks go to the defense.
#[must_use]
pub fn evaluate(
    situation: &EndGameSituation,
    offense: &TacticalSettings,
    defense: &TacticalSettings,
) -> EndGameOverlay {
    let mut ranked: Vec<(usize, bool, EndGameMode)> = EndGameMode::ALL
        .iter()
        .filter_map(|mode| {
            let controller = if mode.is_defensive() { defense } else { offense };
            controller
                .end_game_priority
                .iter()
                .position(|enabled| enabled == mode)
                .map(|rank| (rank, !mode.is_defensive(), *mode))
        })
        .filter(|(_, _, mode)| situation.is_eligible(*mode))
        .collect();
    ranked.sort_by_key(|(rank, offensive, _)| (*rank, *offensive));

    let mut overlay = EndGameOverlay {
        active: ranked.iter().map(|(_, _, mode)| *mode).collect(),
        ..EndGameOverlay::default()
    };
    for mode in &overlay.active {
        match mode {
            EndGameMode::Desperation => overlay.three_point_boost += DESPERATION_THREE_BOOST,
            EndGameMode::ConserveLead => overlay.pace_fraction += CONSERVE_LEAD_PACE_FRACTION,
            _ => {}
        }
    }
    overlay.governing = overlay
        .active
        .iter()
        .copied()
        .find(|mode| has_exclusive_decision(*mode));
    match overlay.governing {
        Some(EndGameMode::IntentionalFoul) => overlay.intentional_foul = true,
        Some(EndGameMode::ClockKill) => {
            overlay.hold = Some(HoldTarget::ShotClock(CLOCK_KILL_SHOT_CLOCK_TARGET));
        }
        Some(EndGameMode::LastSecondShot) => {
            overlay.hold = Some(HoldTarget::GameClock(LAST_SHOT_TARGET_SECONDS));
            if situation.score_diff == -LAST_SHOT_MAX_DEFICIT {
                overlay.forced_shot = Some(ShotType::ThreePoint);
            }
        }
        _ => {}
    }
    overlay
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::{Attributes, Player, Position};
    use crate::team::Team;

    fn tactics(priority: Vec<EndGameMode>) -> TacticalSettings {
        let team = Team {
            name: String::from("T"),
            roster: Position::ALL
                .iter()
                .map(|pos| Player::new(pos.as_str(), *pos, Attributes::uniform(50.0)))
                .collect(),
        };
        let mut settings = TacticalSettings::with_default_rotation(&team);
        settings.end_game_priority = priority;
        settings
    }

    fn late(time_remaining: f64, score_diff: i32) -> EndGameSituation {
        EndGameSituation {
            period: 4,
            time_remaining,
            shot_clock: 24.0,
            score_diff,
        }
    }

    #[test]
    fn modes_only_apply_late() {
        let all = tactics(EndGameMode::default_priority());
        let early = EndGameSituation {
            period: 3,
            ..late(10.0, 2)
        };
        assert!(evaluate(&early, &all, &all).is_neutral());
        let overtime = EndGameSituation {
            period: 5,
            ..late(10.0, -2)
        };
        assert!(!evaluate(&overtime, &all, &all).is_neutral());
    }

    #[test]
    fn eligibility_windows() {
        assert!(late(60.0, 1).is_eligible(EndGameMode::ClockKill));
        assert!(!late(61.0, 1).is_eligible(EndGameMode::ClockKill));
        assert!(late(20.0, -3).is_eligible(EndGameMode::LastSecondShot));
        assert!(late(20.0, 0).is_eligible(EndGameMode::LastSecondShot));
        assert!(!late(25.0, 0).is_eligible(EndGameMode::LastSecondShot));
        assert!(!late(20.0, -4).is_eligible(EndGameMode::LastSecondShot));
        assert!(late(180.0, -9).is_eligible(EndGameMode::Desperation));
        assert!(!late(180.0, -8).is_eligible(EndGameMode::Desperation));
        assert!(late(360.0, 15).is_eligible(EndGameMode::ConserveLead));
        assert!(late(50.0, 6).is_eligible(EndGameMode::IntentionalFoul));
        assert!(!late(50.0, 7).is_eligible(EndGameMode::IntentionalFoul));
    }

    #[test]
    fn trailing_by_three_forces_a_three() {
        let all = tactics(EndGameMode::default_priority());
        let overlay = evaluate(&late(15.0, -3), &all, &all);
        assert_eq!(overlay.governing, Some(EndGameMode::LastSecondShot));
        assert_eq!(overlay.forced_shot, Some(ShotType::ThreePoint));
        assert_eq!(overlay.hold, Some(HoldTarget::GameClock(2.0)));
        let tied = evaluate(&late(15.0, 0), &all, &all);
        assert_eq!(tied.forced_shot, None);
    }

    #[test]
    fn priority_list_resolves_conflicts() {
        let all = tactics(EndGameMode::default_priority());
        // Up 3 with 40s left: clock kill and intentional foul both apply.
        let overlay = evaluate(&late(40.0, 3), &all, &all);
        assert_eq!(
            overlay.active,
            vec![EndGameMode::IntentionalFoul, EndGameMode::ClockKill]
        );
        assert!(overlay.intentional_foul);
        assert_eq!(overlay.hold, None);

        let passive_defense = tactics(vec![EndGameMode::ClockKill]);
        let overlay = evaluate(&late(40.0, 3), &all, &passive_defense);
        assert_eq!(overlay.governing, Some(EndGameMode::ClockKill));
        assert!(!overlay.intentional_foul);
        assert_eq!(overlay.hold, Some(HoldTarget::ShotClock(4.0)));
    }

    #[test]
    fn additive_modes_stack() {
        let all = tactics(EndGameMode::default_priority());
        let overlay = evaluate(&late(170.0, -12), &all, &all);
        assert_eq!(overlay.active, vec![EndGameMode::Desperation]);
        assert!((overlay.three_point_boost - 0.25).abs() < f64::EPSILON);
        assert!(overlay.governing.is_none());

        let cruising = evaluate(&late(50.0, 20), &all, &all);
        assert_eq!(
            cruising.active,
            vec![EndGameMode::ClockKill, EndGameMode::ConserveLead]
        );
        assert!((cruising.pace_fraction - 0.30).abs() < f64::EPSILON);
        assert_eq!(cruising.hold, Some(HoldTarget::ShotClock(4.0)));
    }

    #[test]
    fn disabled_modes_never_fire() {
        let none = tactics(Vec::new());
        assert!(evaluate(&late(15.0, -3), &none, &none).is_neutral());
    }
}
