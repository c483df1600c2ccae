//! Attribute composites, the weighted sigmoid, and weighted draws.
//!
//! Every stochastic decision in a possession goes through this module so the
//! math is defined once: composites turn 25 ratings into one number, the
//! weighted sigmoid turns a composite gap into a probability anchored on a
//! league base rate, and `select` draws from a weighted pool while recording
//! the decision.
use rand::Rng;

use crate::constants::{
    CONSISTENCY_PIVOT, CONSISTENCY_SCALE_HIGH, CONSISTENCY_SCALE_LOW, PROBABILITY_CEILING,
    PROBABILITY_FLOOR, RUBBER_BAND_BONUS_HIGH, RUBBER_BAND_BONUS_LOW, RUBBER_BAND_BONUS_MID,
    RUBBER_BAND_PROBABILITY_SCALE, RUBBER_BAND_THRESHOLD, RUBBER_BAND_TIER_THREE,
    RUBBER_BAND_TIER_TWO, SIGMOID_DIFF_CAP, WEIGHT_SUM_TOLERANCE,
};
use crate::error::ConfigError;
use crate::numbers::usize_to_f64;
use crate::player::{Attribute, Player};
use crate::trace::{DecisionTrace, TraceEntry, WeightedCandidate};

/// Built-in attribute weight tables. Each sums to 1.0.
pub mod weights {
    use crate::player::Attribute::{
        Acceleration, Agility, ArmStrength, Awareness, Balance, Bravery, Composure,
        Consistency, CoreStrength, Creativity, Deception, Determination, Finesse,
        FormTechnique, GripStrength, HandEyeCoordination, Height, Jumping, Patience, Reactions,
        Teamwork, ThrowAccuracy,
    };
    use crate::player::Attribute;

    pub type WeightTable = &'static [(Attribute, f64)];

    pub const THREE_POINT: WeightTable = &[
        (FormTechnique, 0.25),
        (ThrowAccuracy, 0.20),
        (HandEyeCoordination, 0.15),
        (Composure, 0.10),
        (Balance, 0.10),
        (Consistency, 0.10),
        (Finesse, 0.05),
        (Reactions, 0.05),
    ];

    pub const MIDRANGE: WeightTable = &[
        (FormTechnique, 0.20),
        (ThrowAccuracy, 0.20),
        (HandEyeCoordination, 0.15),
        (Balance, 0.15),
        (Finesse, 0.10),
        (Composure, 0.10),
        (Consistency, 0.05),
        (Deception, 0.05),
    ];

    pub const LAYUP: WeightTable = &[
        (Finesse, 0.20),
        (HandEyeCoordination, 0.15),
        (Agility, 0.15),
        (Balance, 0.10),
        (Jumping, 0.10),
        (Height, 0.10),
        (Bravery, 0.10),
        (CoreStrength, 0.10),
    ];

    pub const DUNK: WeightTable = &[
        (Jumping, 0.30),
        (Height, 0.25),
        (CoreStrength, 0.15),
        (ArmStrength, 0.10),
        (Bravery, 0.10),
        (Acceleration, 0.10),
    ];

    /// On-ball shot contest.
    pub const CONTEST: WeightTable = &[
        (Reactions, 0.20),
        (Agility, 0.15),
        (Height, 0.15),
        (Awareness, 0.15),
        (Jumping, 0.10),
        (Acceleration, 0.10),
        (Determination, 0.10),
        (Balance, 0.05),
    ];

    pub const BLOCK: WeightTable = &[
        (Height, 0.30),
        (Jumping, 0.25),
        (Reactions, 0.20),
        (Awareness, 0.10),
        (ArmStrength, 0.10),
        (Determination, 0.05),
    ];

    pub const STEAL: WeightTable = &[
        (Reactions, 0.30),
        (HandEyeCoordination, 0.20),
        (Agility, 0.15),
        (Awareness, 0.15),
        (Deception, 0.10),
        (Acceleration, 0.10),
    ];

    pub const BALL_SECURITY: WeightTable = &[
        (HandEyeCoordination, 0.25),
        (Composure, 0.20),
        (Awareness, 0.15),
        (GripStrength, 0.15),
        (Balance, 0.10),
        (Patience, 0.10),
        (Creativity, 0.05),
    ];

    pub const REBOUND: WeightTable = &[
        (Height, 0.30),
        (Jumping, 0.20),
        (CoreStrength, 0.15),
        (Reactions, 0.10),
        (Determination, 0.10),
        (Bravery, 0.05),
        (GripStrength, 0.05),
        (Balance, 0.05),
    ];

    pub const FREE_THROW: WeightTable = &[
        (FormTechnique, 0.35),
        (Composure, 0.20),
        (ThrowAccuracy, 0.20),
        (Consistency, 0.15),
        (HandEyeCoordination, 0.10),
    ];

    pub const PLAYMAKING: WeightTable = &[
        (Creativity, 0.25),
        (Awareness, 0.20),
        (ThrowAccuracy, 0.20),
        (Teamwork, 0.20),
        (Patience, 0.10),
        (HandEyeCoordination, 0.05),
    ];

    /// Defender foul avoidance.
    pub const DISCIPLINE: WeightTable = &[
        (Awareness, 0.25),
        (Composure, 0.25),
        (Reactions, 0.20),
        (Balance, 0.15),
        (Patience, 0.15),
    ];

    /// Attacking the basket and drawing contact.
    pub const DRIVE: WeightTable = &[
        (Acceleration, 0.20),
        (Agility, 0.15),
        (Bravery, 0.20),
        (Deception, 0.15),
        (CoreStrength, 0.15),
        (Balance, 0.15),
    ];

    pub const ALL: [(&str, WeightTable); 13] = [
        ("three_point", THREE_POINT),
        ("midrange", MIDRANGE),
        ("layup", LAYUP),
        ("dunk", DUNK),
        ("contest", CONTEST),
        ("block", BLOCK),
        ("steal", STEAL),
        ("ball_security", BALL_SECURITY),
        ("rebound", REBOUND),
        ("free_throw", FREE_THROW),
        ("playmaking", PLAYMAKING),
        ("discipline", DISCIPLINE),
        ("drive", DRIVE),
    ];
}

/// Owned, validated weight table built at configuration time.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeWeights {
    entries: Vec<(Attribute, f64)>,
}

impl AttributeWeights {
    /// Build a table from attribute names.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownAttribute` for a name outside the 25-attribute
    /// model, `ConfigError::NegativeWeight` for negative entries, and
    /// `ConfigError::WeightSum` when the weights do not sum to 1.0 within 1e-6.
    pub fn from_named(context: &str, named: &[(&str, f64)]) -> Result<Self, ConfigError> {
        let entries = named
            .iter()
            .map(|(name, weight)| name.parse::<Attribute>().map(|attr| (attr, *weight)))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_table(context, &entries)
    }

    /// Validate a typed table.
    ///
    /// # Errors
    ///
    /// Same sum and sign checks as [`AttributeWeights::from_named`].
    pub fn from_table(context: &str, table: &[(Attribute, f64)]) -> Result<Self, ConfigError> {
        for (attribute, weight) in table {
            if *weight < 0.0 || !weight.is_finite() {
                return Err(ConfigError::NegativeWeight {
                    context: context.to_string(),
                    attribute: attribute.as_str(),
                    value: *weight,
                });
            }
        }
        let sum: f64 = table.iter().map(|(_, weight)| weight).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ConfigError::WeightSum {
                context: context.to_string(),
                sum,
            });
        }
        Ok(Self {
            entries: table.to_vec(),
        })
    }

    #[must_use]
    pub fn as_slice(&self) -> &[(Attribute, f64)] {
        &self.entries
    }

    #[must_use]
    pub fn composite(&self, player: &Player) -> f64 {
        composite(player, &self.entries)
    }
}

/// Weighted sum of a player's attributes.
#[must_use]
pub fn composite(player: &Player, table: &[(Attribute, f64)]) -> f64 {
    table
        .iter()
        .map(|(attribute, weight)| player.attr(*attribute) * weight)
        .sum()
}

#[must_use]
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

/// Map a composite difference onto a probability anchored at `base`.
///
/// The difference is capped at ±40. A zero difference returns `base`; positive
/// differences move toward 1, negative toward 0. The result is clamped to
/// `[0.05, 0.95]`.
#[must_use]
pub fn weighted_sigmoid_probability(base: f64, diff: f64, k: f64) -> f64 {
    let capped = diff.clamp(-SIGMOID_DIFF_CAP, SIGMOID_DIFF_CAP);
    let centered = 2.0 * (sigmoid(k * capped) - 0.5);
    let probability = if centered >= 0.0 {
        base + (1.0 - base) * centered
    } else {
        base * (1.0 + centered)
    };
    probability.clamp(PROBABILITY_FLOOR, PROBABILITY_CEILING)
}

/// Half-width of the consistency noise band for a rating.
#[must_use]
pub fn consistency_amplitude(consistency: f64) -> f64 {
    let scale = if consistency < CONSISTENCY_PIVOT {
        CONSISTENCY_SCALE_LOW
    } else {
        CONSISTENCY_SCALE_HIGH
    };
    (consistency - CONSISTENCY_PIVOT).abs() * scale
}

/// Jitter `probability` by the actor's consistency. Always consumes one draw.
pub fn consistency_variance<R: Rng + ?Sized>(probability: f64, consistency: f64, rng: &mut R) -> f64 {
    let amplitude = consistency_amplitude(consistency);
    let unit = rng.r#gen::<f64>();
    let noise = (unit * 2.0 - 1.0) * amplitude;
    (probability + noise).clamp(0.0, 1.0)
}

/// Comeback modifier for the trailing team. `score_diff` is from that team's
/// perspective (negative when behind).
#[must_use]
pub const fn rubber_band_modifier(score_diff: i32, is_trailing: bool) -> f64 {
    if !is_trailing {
        return 0.0;
    }
    let deficit = score_diff.saturating_abs();
    if deficit >= RUBBER_BAND_TIER_THREE {
        RUBBER_BAND_BONUS_HIGH
    } else if deficit >= RUBBER_BAND_TIER_TWO {
        RUBBER_BAND_BONUS_MID
    } else if deficit >= RUBBER_BAND_THRESHOLD {
        RUBBER_BAND_BONUS_LOW
    } else {
        0.0
    }
}

/// Rubber-band modifier expressed in probability points for the team whose
/// score differential is `score_diff`.
#[must_use]
pub fn rubber_band_points(score_diff: i32) -> f64 {
    rubber_band_modifier(score_diff, score_diff < 0) * RUBBER_BAND_PROBABILITY_SCALE
}

/// Floor negatives at zero and renormalize. Returns `None` when nothing is left
/// to normalize.
#[must_use]
pub fn normalize_weights(weights: &[f64]) -> Option<Vec<f64>> {
    let floored: Vec<f64> = weights
        .iter()
        .map(|w| if w.is_finite() { w.max(0.0) } else { 0.0 })
        .collect();
    let total: f64 = floored.iter().sum();
    if total <= 0.0 {
        return None;
    }
    Some(floored.into_iter().map(|w| w / total).collect())
}

/// Index chosen by a weighted draw plus the roll that chose it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedPick {
    pub index: usize,
    pub roll: f64,
    /// True when the weights were degenerate and an even split was used.
    pub fallback: bool,
}

/// Weighted draw over `weights`. Always consumes one draw.
///
/// An empty slice yields index 0 with `fallback` set.
pub fn weighted_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> WeightedPick {
    let roll = rng.r#gen::<f64>();
    if weights.is_empty() {
        return WeightedPick {
            index: 0,
            roll,
            fallback: true,
        };
    }
    let (normalized, fallback) = normalize_weights(weights).map_or_else(
        || (vec![1.0 / usize_to_f64(weights.len()); weights.len()], true),
        |normalized| (normalized, false),
    );
    let mut cumulative = 0.0;
    for (index, weight) in normalized.iter().enumerate() {
        cumulative += weight;
        if roll < cumulative {
            return WeightedPick {
                index,
                roll,
                fallback,
            };
        }
    }
    let last = normalized
        .iter()
        .rposition(|w| *w > 0.0)
        .unwrap_or(weights.len() - 1);
    WeightedPick {
        index: last,
        roll,
        fallback,
    }
}

/// Weighted selection with its decision trace.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub index: usize,
    pub trace: Vec<TraceEntry>,
}

/// Draw one candidate from `pool_id` and trace the decision.
pub fn select<R: Rng + ?Sized>(
    pool_id: &str,
    candidates: Vec<WeightedCandidate>,
    rng: &mut R,
) -> Selection {
    let finals: Vec<f64> = candidates.iter().map(|c| c.final_weight).collect();
    let pick = weighted_index(&finals, rng);
    let mut trace = Vec::with_capacity(2);
    if pick.fallback {
        let reason = format!("{pool_id}: degenerate weights, even split");
        log::warn!("fallback: {reason}");
        trace.push(TraceEntry::Fallback { reason });
    }
    let chosen_id = candidates
        .get(pick.index)
        .map(|c| c.id.clone())
        .unwrap_or_default();
    trace.push(TraceEntry::Decision(DecisionTrace {
        pool_id: pool_id.to_string(),
        roll: pick.roll,
        candidates,
        chosen_id,
    }));
    Selection {
        index: pick.index,
        trace,
    }
}

/// Roll a binary outcome. Always consumes one draw.
pub fn roll<R: Rng + ?Sized>(label: &str, probability: f64, rng: &mut R) -> (bool, TraceEntry) {
    let value = rng.r#gen::<f64>();
    let success = value < probability;
    (
        success,
        TraceEntry::Probability {
            label: label.to_string(),
            probability,
            roll: value,
            success,
        },
    )
}
