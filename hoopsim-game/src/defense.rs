//! Defender assignment, contest distance, and help rotations.
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONTEST_ACCELERATION_SCALE, CONTEST_MAX_FEET, CONTEST_MIN_FEET, CONTEST_NOISE_SIGMA_MIN,
    CONTEST_NOISE_SIGMA_RANGE, CONTEST_OPEN_FEET, CONTEST_PATIENCE_SCALE, CONTEST_TIGHT_FEET,
    HELP_DEFENSE_PENALTY_FEET, HELP_QUALITY_THRESHOLD, HELP_ROTATION_K, ZONE_PAINT_FEET,
    ZONE_PERIMETER_FEET,
};
use crate::player::{Attribute, Player, Position};
use crate::probability::{composite, roll, select, sigmoid, weights};
use crate::shooting::ShotType;
use crate::tactics::DefenseScheme;
use crate::trace::{DecisionTrace, TraceEntry, WeightFactor, WeightedCandidate};

/// How tightly a shot was contested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContestTier {
    Open,
    Contested,
    Heavy,
}

impl ContestTier {
    #[must_use]
    pub fn from_distance(feet: f64) -> Self {
        if feet >= CONTEST_OPEN_FEET {
            Self::Open
        } else if feet >= CONTEST_TIGHT_FEET {
            Self::Contested
        } else {
            Self::Heavy
        }
    }
}

/// Pick a defensive scheme for this possession. One draw.
pub fn roll_scheme<R: Rng + ?Sized>(zone_share: f64, rng: &mut R) -> (DefenseScheme, TraceEntry) {
    let (zone, entry) = roll("defense.zone", zone_share, rng);
    let scheme = if zone {
        DefenseScheme::Zone
    } else {
        DefenseScheme::Man
    };
    (scheme, entry)
}

/// How well a position covers the area a shot comes from.
#[must_use]
pub const fn zone_proximity(position: Position, shot: ShotType) -> f64 {
    match (shot, position) {
        (ShotType::ThreePoint, Position::PG | Position::SG) => 1.0,
        (ShotType::ThreePoint, Position::SF) => 0.8,
        (ShotType::ThreePoint, Position::PF) => 0.5,
        (ShotType::ThreePoint, Position::C) => 0.3,
        (ShotType::Midrange, Position::SF | Position::PF) => 1.0,
        (ShotType::Midrange, Position::SG) => 0.8,
        (ShotType::Midrange, Position::PG | Position::C) => 0.6,
        (ShotType::Rim, Position::C) => 1.0,
        (ShotType::Rim, Position::PF) => 0.9,
        (ShotType::Rim, Position::SF) => 0.6,
        (ShotType::Rim, Position::SG) => 0.4,
        (ShotType::Rim, Position::PG) => 0.3,
    }
}

/// Defender index chosen for a shooter plus the trace of the choice.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub defender: usize,
    pub trace: Vec<TraceEntry>,
}

/// Choose the primary defender for a shot.
///
/// Man: weighted draw by compatibility squared times contest composite, so
/// mismatches happen. Zone: whoever covers the shot's area best, no draw.
pub fn assign_defender<R: Rng + ?Sized>(
    scheme: DefenseScheme,
    shooter: &Player,
    shot: ShotType,
    defenders: &[Player],
    rng: &mut R,
) -> Assignment {
    match scheme {
        DefenseScheme::Man => {
            let candidates = defenders
                .iter()
                .map(|defender| {
                    let contest = composite(defender, weights::CONTEST);
                    let compat = defender.position.compatibility(shooter.position);
                    WeightedCandidate {
                        id: defender.name.clone(),
                        base_weight: contest,
                        adjustments: vec![WeightFactor::new("compatibility_sq", compat * compat)],
                        final_weight: compat * compat * contest,
                    }
                })
                .collect();
            let selection = select("defense.man_assignment", candidates, rng);
            Assignment {
                defender: selection.index,
                trace: selection.trace,
            }
        }
        DefenseScheme::Zone => {
            let candidates: Vec<WeightedCandidate> = defenders
                .iter()
                .map(|defender| {
                    let contest = composite(defender, weights::CONTEST);
                    let proximity = zone_proximity(defender.position, shot);
                    WeightedCandidate {
                        id: defender.name.clone(),
                        base_weight: contest,
                        adjustments: vec![WeightFactor::new("zone_proximity", proximity)],
                        final_weight: proximity * contest,
                    }
                })
                .collect();
            let defender = candidates
                .iter()
                .enumerate()
                .fold(None, |best: Option<(usize, f64)>, (idx, c)| match best {
                    Some((_, weight)) if weight >= c.final_weight => best,
                    _ => Some((idx, c.final_weight)),
                })
                .map_or(0, |(idx, _)| idx);
            let chosen_id = candidates
                .get(defender)
                .map(|c| c.id.clone())
                .unwrap_or_default();
            Assignment {
                defender,
                trace: vec![TraceEntry::Decision(DecisionTrace {
                    pool_id: String::from("defense.zone_assignment"),
                    roll: 0.0,
                    candidates,
                    chosen_id,
                })],
            }
        }
    }
}

/// Inputs for one contest-distance sample.
#[derive(Debug, Clone, Copy)]
pub struct ContestInput<'a> {
    pub defender: &'a Player,
    pub shooter: &'a Player,
    pub shot: ShotType,
    pub zone_share: f64,
    pub help_closing: bool,
}

/// Deterministic part of the contest distance, clamped to `[0.5, 10]` feet.
#[must_use]
pub fn expected_contest_distance(input: &ContestInput<'_>) -> f64 {
    let defender_comp = composite(input.defender, weights::CONTEST);
    let mut distance = CONTEST_MAX_FEET - defender_comp / 10.0;
    distance -= (input.defender.attr(Attribute::Acceleration) - 50.0) * CONTEST_ACCELERATION_SCALE;
    if input.help_closing {
        distance += HELP_DEFENSE_PENALTY_FEET;
    }
    distance += match input.shot {
        ShotType::ThreePoint | ShotType::Midrange => input.zone_share * ZONE_PERIMETER_FEET,
        ShotType::Rim => input.zone_share * ZONE_PAINT_FEET,
    };
    distance += (input.shooter.attr(Attribute::Patience) - 50.0) * CONTEST_PATIENCE_SCALE;
    distance.clamp(CONTEST_MIN_FEET, CONTEST_MAX_FEET)
}

/// Noise standard deviation: 1.2 ft for a fully aware defender up to 1.8 ft.
#[must_use]
pub fn contest_noise_sigma(defender: &Player) -> f64 {
    let awareness = defender.attr(Attribute::Awareness) / 100.0;
    CONTEST_NOISE_SIGMA_MIN + CONTEST_NOISE_SIGMA_RANGE * (1.0 - awareness).clamp(0.0, 1.0)
}

fn reflect_into_bounds(value: f64) -> f64 {
    let mut reflected = value;
    if reflected < CONTEST_MIN_FEET {
        reflected = 2.0 * CONTEST_MIN_FEET - reflected;
    }
    if reflected > CONTEST_MAX_FEET {
        reflected = 2.0 * CONTEST_MAX_FEET - reflected;
    }
    reflected.clamp(CONTEST_MIN_FEET, CONTEST_MAX_FEET)
}

/// Sample the closeout distance for a shot.
pub fn contest_distance<R: Rng + ?Sized>(input: &ContestInput<'_>, rng: &mut R) -> f64 {
    let expected = expected_contest_distance(input);
    let noise: f64 = StandardNormal.sample(rng);
    reflect_into_bounds(expected + noise * contest_noise_sigma(input.defender))
}

/// Final contest after an optional help rotation.
#[derive(Debug, Clone, PartialEq)]
pub struct Contest {
    pub defender: usize,
    pub distance: f64,
    pub tier: ContestTier,
    pub helped: bool,
    pub trace: Vec<TraceEntry>,
}

/// Give a help defender the chance to improve a poor primary contest.
///
/// A contest quality under 0.30 lets the most aware off-ball defender rotate;
/// the help closeout replaces the primary only when it is tighter.
pub fn apply_help_defense<R: Rng + ?Sized>(
    primary: usize,
    primary_distance: f64,
    shooter: &Player,
    shot: ShotType,
    zone_share: f64,
    defenders: &[Player],
    rng: &mut R,
) -> Contest {
    let mut contest = Contest {
        defender: primary,
        distance: primary_distance,
        tier: ContestTier::from_distance(primary_distance),
        helped: false,
        trace: Vec::new(),
    };
    let quality = (CONTEST_MAX_FEET - primary_distance) / CONTEST_MAX_FEET;
    if quality >= HELP_QUALITY_THRESHOLD {
        return contest;
    }
    let helper = defenders
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != primary)
        .fold(None, |best: Option<(usize, f64)>, (idx, defender)| {
            let awareness = defender.attr(Attribute::Awareness);
            match best {
                Some((_, top)) if top >= awareness => best,
                _ => Some((idx, awareness)),
            }
        });
    let Some((helper, awareness)) = helper else {
        return contest;
    };
    let probability = sigmoid(HELP_ROTATION_K * (awareness - 50.0));
    let (rotates, entry) = roll("defense.help_rotation", probability, rng);
    contest.trace.push(entry);
    if !rotates {
        return contest;
    }
    let help_distance = contest_distance(
        &ContestInput {
            defender: &defenders[helper],
            shooter,
            shot,
            zone_share,
            help_closing: true,
        },
        rng,
    );
    if help_distance < contest.distance {
        contest.defender = helper;
        contest.distance = help_distance;
        contest.tier = ContestTier::from_distance(help_distance);
        contest.helped = true;
    }
    contest
}

/// Primary on-ball matchup without a draw: best position fit, then steal composite.
#[must_use]
pub fn matchup_defender(handler: &Player, defenders: &[Player]) -> usize {
    defenders
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f64)>, (idx, defender)| {
            let score = defender.position.compatibility(handler.position) * 1000.0
                + composite(defender, weights::STEAL);
            match best {
                Some((_, top)) if top >= score => best,
                _ => Some((idx, score)),
            }
        })
        .map_or(0, |(idx, _)| idx)
}
