//! Free-throw resolution.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CLUTCH_MARGIN, CLUTCH_SECONDS, FREE_THROW_AND_ONE_ADJ, FREE_THROW_BASE_RATE,
    FREE_THROW_BONUS_ADJ, FREE_THROW_CLUTCH_PENALTY, FREE_THROW_K, REGULATION_PERIODS,
};
use crate::player::{Attribute, Player};
use crate::probability::{composite, consistency_variance, roll, weighted_sigmoid_probability, weights};
use crate::trace::TraceEntry;

/// Game situation surrounding a trip to the line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeThrowSituation {
    pub bonus: bool,
    pub and_one: bool,
    pub clutch: bool,
}

impl FreeThrowSituation {
    /// Final two minutes of the fourth period or overtime with a close score.
    #[must_use]
    pub fn is_clutch(period: u8, time_remaining: f64, score_diff: i32) -> bool {
        period >= REGULATION_PERIODS
            && time_remaining <= CLUTCH_SECONDS
            && score_diff.abs() <= CLUTCH_MARGIN
    }
}

/// Make probability for one attempt before consistency variance.
#[must_use]
pub fn free_throw_probability(shooter: &Player, situation: FreeThrowSituation) -> f64 {
    let ft_comp = composite(shooter, weights::FREE_THROW);
    let mut probability = weighted_sigmoid_probability(FREE_THROW_BASE_RATE, ft_comp - 50.0, FREE_THROW_K);
    if situation.bonus {
        probability += FREE_THROW_BONUS_ADJ;
    }
    if situation.and_one {
        probability += FREE_THROW_AND_ONE_ADJ;
    }
    if situation.clutch {
        probability += FREE_THROW_CLUTCH_PENALTY * (1.0 - shooter.attr(Attribute::Composure) / 100.0);
    }
    probability.clamp(0.0, 1.0)
}

/// Results of a trip to the line, in shooting order.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeThrowOutcome {
    pub results: Vec<bool>,
    pub trace: Vec<TraceEntry>,
}

impl FreeThrowOutcome {
    #[must_use]
    pub fn made(&self) -> u8 {
        u8::try_from(self.results.iter().filter(|made| **made).count()).unwrap_or(u8::MAX)
    }

    /// Whether the final attempt missed (a live rebound follows).
    #[must_use]
    pub fn final_missed(&self) -> bool {
        self.results.last().is_some_and(|made| !made)
    }
}

/// Shoot `count` free throws. Each attempt consumes two draws.
pub fn shoot_free_throws<R: Rng + ?Sized>(
    shooter: &Player,
    count: u8,
    situation: FreeThrowSituation,
    rng: &mut R,
) -> FreeThrowOutcome {
    let base = free_throw_probability(shooter, situation);
    let consistency = shooter.attr(Attribute::Consistency);
    let mut results = Vec::with_capacity(usize::from(count));
    let mut trace = Vec::with_capacity(usize::from(count));
    for attempt in 1..=count {
        let probability = consistency_variance(base, consistency, rng);
        let (made, entry) = roll(&format!("free_throw.{attempt}_of_{count}"), probability, rng);
        results.push(made);
        trace.push(entry);
    }
    FreeThrowOutcome { results, trace }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Position;
    use crate::player::fixtures::uniform_player;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn average_shooter_hits_the_base_rate() {
        let shooter = uniform_player("Avg", Position::SG, 50.0);
        let p = free_throw_probability(&shooter, FreeThrowSituation::default());
        assert!((p - FREE_THROW_BASE_RATE).abs() < 1e-12);
    }

    #[test]
    fn situation_adjustments_apply() {
        let shooter = uniform_player("Avg", Position::SG, 50.0);
        let neutral = free_throw_probability(&shooter, FreeThrowSituation::default());
        let bonus = free_throw_probability(
            &shooter,
            FreeThrowSituation {
                bonus: true,
                ..FreeThrowSituation::default()
            },
        );
        let and_one = free_throw_probability(
            &shooter,
            FreeThrowSituation {
                and_one: true,
                ..FreeThrowSituation::default()
            },
        );
        let clutch = free_throw_probability(
            &shooter,
            FreeThrowSituation {
                clutch: true,
                ..FreeThrowSituation::default()
            },
        );
        assert!((neutral - bonus - 0.01).abs() < 1e-12);
        assert!((and_one - neutral - 0.03).abs() < 1e-12);
        assert!((neutral - clutch - 0.025).abs() < 1e-12);
    }

    #[test]
    fn clutch_window_requires_late_close_game() {
        assert!(FreeThrowSituation::is_clutch(4, 90.0, -3));
        assert!(FreeThrowSituation::is_clutch(5, 120.0, 5));
        assert!(!FreeThrowSituation::is_clutch(3, 30.0, 0));
        assert!(!FreeThrowSituation::is_clutch(4, 121.0, 0));
        assert!(!FreeThrowSituation::is_clutch(4, 30.0, 6));
    }

    #[test]
    fn trip_records_each_attempt() {
        let shooter = uniform_player("Avg", Position::SG, 70.0);
        let mut rng = ChaCha20Rng::seed_from_u64(11);
        let outcome = shoot_free_throws(&shooter, 3, FreeThrowSituation::default(), &mut rng);
        assert_eq!(outcome.results.len(), 3);
        assert_eq!(outcome.trace.len(), 3);
        assert!(outcome.made() <= 3);
    }
}
