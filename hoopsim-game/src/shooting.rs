//! Shot selection, shot success, blocks, shooting fouls, and assists.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    ASSIST_RATE_MIDRANGE, ASSIST_RATE_RIM, ASSIST_RATE_THREE, ASSIST_TRANSITION_FACTOR,
    BASE_RATE_DUNK, BASE_RATE_LAYUP, BASE_RATE_MIDRANGE, BASE_RATE_THREE, BASELINE_MIDRANGE_WEIGHT,
    BASELINE_RIM_WEIGHT, BASELINE_THREE_WEIGHT, BLOCK_BASE_MIDRANGE, BLOCK_BASE_RIM,
    BLOCK_BASE_THREE, BLOCK_CONTESTED_SCALE, BLOCK_K, CONTEST_DEFENDER_SCALE,
    CONTEST_PENALTY_CONTESTED, CONTEST_PENALTY_HEAVY, DUNK_BASE_SHARE, DUNK_HEIGHT_FLOOR, DUNK_K,
    FAST_PACE_RIM_BONUS, PUTBACK_BONUS, SHOOTING_FOUL_K, SHOOTING_FOUL_MIDRANGE, SHOOTING_FOUL_RIM,
    SHOOTING_FOUL_THREE, SHOT_K, SHOT_TENDENCY_SCALE, SLOW_PACE_MIDRANGE_BONUS,
    TRANSITION_BONUS_MIDRANGE, TRANSITION_BONUS_RIM, TRANSITION_BONUS_THREE, TRANSITION_RIM_BONUS,
    ZONE_RIM_PENALTY, ZONE_THREE_BONUS,
};
use crate::defense::ContestTier;
use crate::player::{Attribute, Player};
use crate::probability::{
    composite, consistency_variance, roll, rubber_band_points, select, weighted_sigmoid_probability,
    weights,
};
use crate::tactics::Pace;
use crate::trace::{TraceEntry, WeightFactor, WeightedCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShotType {
    ThreePoint,
    Midrange,
    Rim,
}

impl ShotType {
    pub const ALL: [Self; 3] = [Self::ThreePoint, Self::Midrange, Self::Rim];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ThreePoint => "three_point",
            Self::Midrange => "midrange",
            Self::Rim => "rim",
        }
    }

    /// Points for a make.
    #[must_use]
    pub const fn value(self) -> u8 {
        match self {
            Self::ThreePoint => 3,
            Self::Midrange | Self::Rim => 2,
        }
    }

    #[must_use]
    pub const fn block_base(self) -> f64 {
        match self {
            Self::ThreePoint => BLOCK_BASE_THREE,
            Self::Midrange => BLOCK_BASE_MIDRANGE,
            Self::Rim => BLOCK_BASE_RIM,
        }
    }

    const fn assist_rate(self) -> f64 {
        match self {
            Self::ThreePoint => ASSIST_RATE_THREE,
            Self::Midrange => ASSIST_RATE_MIDRANGE,
            Self::Rim => ASSIST_RATE_RIM,
        }
    }

    const fn shooting_foul_base(self) -> f64 {
        match self {
            Self::ThreePoint => SHOOTING_FOUL_THREE,
            Self::Midrange => SHOOTING_FOUL_MIDRANGE,
            Self::Rim => SHOOTING_FOUL_RIM,
        }
    }

    const fn transition_bonus(self) -> f64 {
        match self {
            Self::ThreePoint => TRANSITION_BONUS_THREE,
            Self::Midrange => TRANSITION_BONUS_MIDRANGE,
            Self::Rim => TRANSITION_BONUS_RIM,
        }
    }
}

/// How a rim attempt is finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RimFinish {
    Dunk,
    Layup,
}

/// Inputs to the shot-type draw.
#[derive(Debug, Clone, Copy)]
pub struct ShotSelectionInput<'a> {
    pub shooter: &'a Player,
    pub pace: Pace,
    pub zone_share: f64,
    pub transition: bool,
    pub three_point_boost: f64,
    pub forced: Option<ShotType>,
}

/// Draw the shot type. A forced type skips the draw.
pub fn select_shot_type<R: Rng + ?Sized>(
    input: &ShotSelectionInput<'_>,
    rng: &mut R,
) -> (ShotType, Vec<TraceEntry>) {
    if let Some(forced) = input.forced {
        return (
            forced,
            vec![TraceEntry::Note {
                text: format!("shot.type forced to {}", forced.as_str()),
            }],
        );
    }
    let tendency = (composite(input.shooter, weights::THREE_POINT)
        - composite(input.shooter, weights::LAYUP))
        * SHOT_TENDENCY_SCALE;

    let mut three = WeightedCandidate::plain(ShotType::ThreePoint.as_str(), BASELINE_THREE_WEIGHT);
    let mut midrange = WeightedCandidate::plain(ShotType::Midrange.as_str(), BASELINE_MIDRANGE_WEIGHT);
    let mut rim = WeightedCandidate::plain(ShotType::Rim.as_str(), BASELINE_RIM_WEIGHT);
    let adjust = |candidate: &mut WeightedCandidate, label: &str, value: f64| {
        if value != 0.0 {
            candidate.adjustments.push(WeightFactor::new(label, value));
            candidate.final_weight += value;
        }
    };
    adjust(&mut three, "tendency", tendency);
    adjust(&mut rim, "tendency", -tendency);
    match input.pace {
        Pace::Fast => adjust(&mut rim, "pace", FAST_PACE_RIM_BONUS),
        Pace::Slow => adjust(&mut midrange, "pace", SLOW_PACE_MIDRANGE_BONUS),
        Pace::Standard => {}
    }
    adjust(&mut three, "zone", ZONE_THREE_BONUS * input.zone_share);
    adjust(&mut rim, "zone", -ZONE_RIM_PENALTY * input.zone_share);
    if input.transition {
        adjust(&mut rim, "transition", TRANSITION_RIM_BONUS);
    }
    adjust(&mut three, "end_game", input.three_point_boost);

    let selection = select("shot.type", vec![three, midrange, rim], rng);
    (ShotType::ALL[selection.index.min(2)], selection.trace)
}

/// Whether a shooter has the size and bounce to dunk at all.
#[must_use]
pub fn can_dunk(shooter: &Player) -> bool {
    (shooter.attr(Attribute::Height) + shooter.attr(Attribute::Jumping)) / 2.0 >= DUNK_HEIGHT_FLOOR
}

/// Dunk or layup for a rim attempt. Ineligible shooters lay it up without a draw.
pub fn choose_rim_finish<R: Rng + ?Sized>(shooter: &Player, rng: &mut R) -> (RimFinish, Option<TraceEntry>) {
    if !can_dunk(shooter) {
        return (RimFinish::Layup, None);
    }
    let share = (DUNK_BASE_SHARE * composite(shooter, weights::DUNK) / 50.0).clamp(0.0, 0.9);
    let (dunk, entry) = roll("shot.rim_finish.dunk", share, rng);
    let finish = if dunk { RimFinish::Dunk } else { RimFinish::Layup };
    (finish, Some(entry))
}

/// Everything that feeds one make/miss roll.
#[derive(Debug, Clone, Copy)]
pub struct ShotInput<'a> {
    pub shooter: &'a Player,
    pub defender: &'a Player,
    pub shot: ShotType,
    pub finish: Option<RimFinish>,
    pub tier: ContestTier,
    pub transition: bool,
    pub putback: bool,
    /// Shooting team's score minus the opponent's.
    pub score_diff: i32,
}

fn shot_profile(shot: ShotType, finish: Option<RimFinish>) -> (f64, weights::WeightTable, f64) {
    match (shot, finish) {
        (ShotType::ThreePoint, _) => (BASE_RATE_THREE, weights::THREE_POINT, SHOT_K),
        (ShotType::Midrange, _) => (BASE_RATE_MIDRANGE, weights::MIDRANGE, SHOT_K),
        (ShotType::Rim, Some(RimFinish::Dunk)) => (BASE_RATE_DUNK, weights::DUNK, DUNK_K),
        (ShotType::Rim, _) => (BASE_RATE_LAYUP, weights::LAYUP, SHOT_K),
    }
}

/// Contest penalty in probability points; tighter defenders make it worse.
#[must_use]
pub fn contest_penalty(tier: ContestTier, defender_comp: f64) -> f64 {
    let scaled = (defender_comp - 50.0) * CONTEST_DEFENDER_SCALE;
    match tier {
        ContestTier::Open => 0.0,
        ContestTier::Contested => CONTEST_PENALTY_CONTESTED - scaled,
        ContestTier::Heavy => CONTEST_PENALTY_HEAVY - scaled,
    }
}

/// Make probability before consistency variance.
#[must_use]
pub fn shot_probability(input: &ShotInput<'_>) -> f64 {
    let (base, table, k) = shot_profile(input.shot, input.finish);
    let shooter_comp = composite(input.shooter, table);
    let defender_comp = composite(input.defender, weights::CONTEST);
    let mut probability = weighted_sigmoid_probability(base, shooter_comp - defender_comp, k);
    probability += contest_penalty(input.tier, defender_comp);
    if input.transition {
        probability += input.shot.transition_bonus();
    }
    if input.putback {
        probability += PUTBACK_BONUS;
    }
    probability += rubber_band_points(input.score_diff);
    probability.clamp(0.0, 1.0)
}

/// Roll make or miss. Two draws (variance, outcome).
pub fn resolve_shot<R: Rng + ?Sized>(input: &ShotInput<'_>, rng: &mut R) -> (bool, TraceEntry) {
    let probability = consistency_variance(
        shot_probability(input),
        input.shooter.attr(Attribute::Consistency),
        rng,
    );
    let label = match input.finish {
        Some(RimFinish::Dunk) => "shot.make.dunk",
        Some(RimFinish::Layup) => "shot.make.layup",
        None => match input.shot {
            ShotType::ThreePoint => "shot.make.three_point",
            ShotType::Midrange => "shot.make.midrange",
            ShotType::Rim => "shot.make.rim",
        },
    };
    roll(label, probability, rng)
}

/// Shooting-foul roll for an attempt. Open looks draw half the contact.
pub fn shooting_foul_check<R: Rng + ?Sized>(
    shooter: &Player,
    defender: &Player,
    shot: ShotType,
    tier: ContestTier,
    rng: &mut R,
) -> (bool, TraceEntry) {
    let diff = composite(shooter, weights::DRIVE) - composite(defender, weights::DISCIPLINE);
    let tier_factor = match tier {
        ContestTier::Open => 0.5,
        ContestTier::Contested => 1.0,
        ContestTier::Heavy => 1.5,
    };
    let probability =
        (weighted_sigmoid_probability(shot.shooting_foul_base(), diff, SHOOTING_FOUL_K) * tier_factor)
            .min(1.0);
    roll("foul.shooting", probability, rng)
}

/// Block probability for a missed shot; zero on open looks.
#[must_use]
pub fn block_probability(shooter: &Player, defender: &Player, shot: ShotType, tier: ContestTier) -> f64 {
    let scale = match tier {
        ContestTier::Heavy => 1.0,
        ContestTier::Contested => BLOCK_CONTESTED_SCALE,
        ContestTier::Open => return 0.0,
    };
    let (_, table, _) = shot_profile(shot, None);
    let diff = composite(defender, weights::BLOCK) - composite(shooter, table);
    weighted_sigmoid_probability(shot.block_base(), diff, BLOCK_K) * scale
}

/// Roll for a block on a miss. Open looks skip the draw.
pub fn block_check<R: Rng + ?Sized>(
    shooter: &Player,
    defender: &Player,
    shot: ShotType,
    tier: ContestTier,
    rng: &mut R,
) -> Option<(bool, TraceEntry)> {
    if tier == ContestTier::Open {
        return None;
    }
    Some(roll(
        "shot.block",
        block_probability(shooter, defender, shot, tier),
        rng,
    ))
}

/// Assist on a make: roll, then pick the passer among the shooter's teammates.
///
/// Returns the index into `lineup` of the passer.
pub fn assist_check<R: Rng + ?Sized>(
    lineup: &[Player],
    shooter: usize,
    shot: ShotType,
    transition: bool,
    rng: &mut R,
) -> (Option<usize>, Vec<TraceEntry>) {
    if lineup.len() < 2 {
        return (None, Vec::new());
    }
    let rate = if transition {
        shot.assist_rate() * ASSIST_TRANSITION_FACTOR
    } else {
        shot.assist_rate()
    };
    let (assisted, entry) = roll("shot.assist", rate, rng);
    let mut trace = vec![entry];
    if !assisted {
        return (None, trace);
    }
    let passers: Vec<usize> = (0..lineup.len()).filter(|idx| *idx != shooter).collect();
    let candidates = passers
        .iter()
        .map(|idx| {
            WeightedCandidate::plain(
                lineup[*idx].name.clone(),
                composite(&lineup[*idx], weights::PLAYMAKING),
            )
        })
        .collect();
    let selection = select("shot.assist_passer", candidates, rng);
    trace.extend(selection.trace);
    (passers.get(selection.index).copied(), trace)
}
