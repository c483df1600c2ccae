//! Turnover checks, turnover types, and steals.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    STEAL_BASE_RATE, STEAL_K, TURNOVER_BASE_RATE, TURNOVER_CAP, TURNOVER_FAST_LOST_BALL,
    TURNOVER_MATCHUP_K, TURNOVER_MATCHUP_SPAN, TURNOVER_SHOT_CLOCK_PRESSURE,
    TURNOVER_SHOT_CLOCK_WINDOW, TURNOVER_TRANSITION_ADJ, TURNOVER_WEIGHT_BAD_PASS,
    TURNOVER_WEIGHT_LOST_BALL, TURNOVER_WEIGHT_OFFENSIVE_FOUL, TURNOVER_WEIGHT_OTHER_VIOLATION,
    TURNOVER_WEIGHT_SHOT_CLOCK, TURNOVER_ZONE_BAD_PASS,
};
use crate::player::{Attribute, Player};
use crate::probability::{
    composite, consistency_variance, roll, rubber_band_points, select, sigmoid,
    weighted_sigmoid_probability, weights,
};
use crate::tactics::Pace;
use crate::trace::{TraceEntry, WeightFactor, WeightedCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnoverKind {
    BadPass,
    LostBall,
    OffensiveFoul,
    ShotClock,
    OtherViolation,
}

impl TurnoverKind {
    pub const ALL: [Self; 5] = [
        Self::BadPass,
        Self::LostBall,
        Self::OffensiveFoul,
        Self::ShotClock,
        Self::OtherViolation,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BadPass => "bad_pass",
            Self::LostBall => "lost_ball",
            Self::OffensiveFoul => "offensive_foul",
            Self::ShotClock => "shot_clock",
            Self::OtherViolation => "other_violation",
        }
    }

    /// Live-ball turnovers can be stolen and start the break the other way.
    #[must_use]
    pub const fn is_live_ball(self) -> bool {
        matches!(self, Self::BadPass | Self::LostBall)
    }

    const fn base_weight(self) -> f64 {
        match self {
            Self::BadPass => TURNOVER_WEIGHT_BAD_PASS,
            Self::LostBall => TURNOVER_WEIGHT_LOST_BALL,
            Self::OffensiveFoul => TURNOVER_WEIGHT_OFFENSIVE_FOUL,
            Self::ShotClock => TURNOVER_WEIGHT_SHOT_CLOCK,
            Self::OtherViolation => TURNOVER_WEIGHT_OTHER_VIOLATION,
        }
    }
}

/// Inputs to the turnover check and type draw.
#[derive(Debug, Clone, Copy)]
pub struct TurnoverInput<'a> {
    pub handler: &'a Player,
    pub defender: &'a Player,
    pub pace: Pace,
    pub transition: bool,
    /// Defense's zone share.
    pub zone_share: f64,
    pub shot_clock: f64,
    /// Offense's score minus the defense's.
    pub score_diff: i32,
}

/// Turnover probability before consistency variance, capped at 12%.
#[must_use]
pub fn turnover_probability(input: &TurnoverInput<'_>) -> f64 {
    let defender_comp = composite(input.defender, weights::STEAL);
    let handler_comp = composite(input.handler, weights::BALL_SECURITY);
    let pressure = 2.0 * (sigmoid(TURNOVER_MATCHUP_K * (defender_comp - handler_comp)) - 0.5);
    let mut probability = TURNOVER_BASE_RATE + input.pace.turnover_adjustment();
    if input.transition {
        probability += TURNOVER_TRANSITION_ADJ;
    }
    probability += TURNOVER_MATCHUP_SPAN * pressure;
    probability -= rubber_band_points(input.score_diff);
    probability.clamp(0.0, TURNOVER_CAP)
}

/// Roll for a turnover. Two draws (variance, outcome).
pub fn turnover_check<R: Rng + ?Sized>(input: &TurnoverInput<'_>, rng: &mut R) -> (bool, TraceEntry) {
    let probability = consistency_variance(
        turnover_probability(input),
        input.handler.attr(Attribute::Consistency),
        rng,
    );
    roll("turnover.check", probability, rng)
}

/// Draw the turnover type.
pub fn turnover_kind<R: Rng + ?Sized>(
    input: &TurnoverInput<'_>,
    rng: &mut R,
) -> (TurnoverKind, Vec<TraceEntry>) {
    let candidates = TurnoverKind::ALL
        .iter()
        .map(|kind| {
            let mut candidate = WeightedCandidate::plain(kind.as_str(), kind.base_weight());
            let adjustment = match kind {
                TurnoverKind::BadPass => Some(("zone", TURNOVER_ZONE_BAD_PASS * input.zone_share)),
                TurnoverKind::LostBall if input.pace == Pace::Fast => {
                    Some(("pace", TURNOVER_FAST_LOST_BALL))
                }
                TurnoverKind::ShotClock if input.shot_clock <= TURNOVER_SHOT_CLOCK_WINDOW => {
                    Some(("shot_clock", TURNOVER_SHOT_CLOCK_PRESSURE))
                }
                _ => None,
            };
            if let Some((label, value)) = adjustment
                && value > 0.0
            {
                candidate.adjustments.push(WeightFactor::new(label, value));
                candidate.final_weight += value;
            }
            candidate
        })
        .collect();
    let selection = select("turnover.kind", candidates, rng);
    let kind = TurnoverKind::ALL
        .get(selection.index)
        .copied()
        .unwrap_or(TurnoverKind::BadPass);
    (kind, selection.trace)
}

/// Steal resolution for a live-ball turnover.
///
/// Rolls whether the defense came away with it, then picks the thief by
/// steal composite. Returns an index into `defenders`.
pub fn resolve_steal<R: Rng + ?Sized>(
    handler: &Player,
    defenders: &[Player],
    primary: usize,
    rng: &mut R,
) -> (Option<usize>, Vec<TraceEntry>) {
    let Some(defender) = defenders.get(primary) else {
        return (None, Vec::new());
    };
    let diff = composite(defender, weights::STEAL) - composite(handler, weights::BALL_SECURITY);
    let probability = weighted_sigmoid_probability(STEAL_BASE_RATE, diff, STEAL_K);
    let (stolen, entry) = roll("turnover.steal", probability, rng);
    let mut trace = vec![entry];
    if !stolen {
        return (None, trace);
    }
    let candidates = defenders
        .iter()
        .map(|player| WeightedCandidate::plain(player.name.clone(), composite(player, weights::STEAL)))
        .collect();
    let selection = select("turnover.stealer", candidates, rng);
    trace.extend(selection.trace);
    (Some(selection.index), trace)
}
