//! Rebound battles, putbacks, and defensive-rebound transition chances.
use rand::Rng;

use crate::constants::{
    DEFENSIVE_REBOUND_ADVANTAGE, DREB_TRANSITION_BASE, DREB_TRANSITION_CRASH,
    DREB_TRANSITION_PREVENT, OREB_BASE_RATE, OREB_BASE_WEIGHT, OREB_CRASH_ADJ, OREB_PREVENT_ADJ,
    OREB_RIM_ADJ, OREB_STRENGTH_WEIGHT, OREB_THREE_ADJ, PUTBACK_HEIGHT_THRESHOLD,
};
use crate::player::{Attribute, Player};
use crate::probability::{composite, roll, select, weights};
use crate::shooting::ShotType;
use crate::tactics::ReboundStrategy;
use crate::trace::{TraceEntry, WeightedCandidate};

/// Indices of the `count` best rebounders in `players` (ties keep lineup order).
#[must_use]
pub fn choose_crashers(players: &[Player], count: usize) -> Vec<usize> {
    let mut ranked: Vec<(usize, f64)> = players
        .iter()
        .enumerate()
        .map(|(idx, player)| (idx, composite(player, weights::REBOUND)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.into_iter().take(count).map(|(idx, _)| idx).collect()
}

/// Inputs to one rebound battle. Pools contain only eligible players.
#[derive(Debug, Clone, Copy)]
pub struct ReboundInput<'a> {
    pub offense: &'a [Player],
    pub defense: &'a [Player],
    pub offense_strategy: ReboundStrategy,
    pub defense_strategy: ReboundStrategy,
    /// `None` for a missed free throw.
    pub shot: Option<ShotType>,
    /// Blocked shots are scrambles without the defensive box-out edge.
    pub blocked: bool,
}

/// Who came down with it; `rebounder` indexes the winning side's pool.
#[derive(Debug, Clone, PartialEq)]
pub struct ReboundOutcome {
    pub offensive: bool,
    pub rebounder: usize,
    pub trace: Vec<TraceEntry>,
}

/// Baseline offensive-rebound rate for the shot and the offense's strategy.
#[must_use]
pub fn offensive_base_rate(shot: Option<ShotType>, offense_strategy: ReboundStrategy) -> f64 {
    let mut base = OREB_BASE_RATE;
    base += match shot {
        Some(ShotType::ThreePoint) => OREB_THREE_ADJ,
        Some(ShotType::Rim) => OREB_RIM_ADJ,
        Some(ShotType::Midrange) | None => 0.0,
    };
    base += match offense_strategy {
        ReboundStrategy::CrashGlass => OREB_CRASH_ADJ,
        ReboundStrategy::Standard => 0.0,
        ReboundStrategy::PreventTransition => OREB_PREVENT_ADJ,
    };
    base
}

/// Offensive-rebound probability for crasher pools already chosen.
///
/// The flag is set when both pools carry no strength and the ratio fell back
/// to an even 0.5.
#[must_use]
pub fn offensive_rebound_probability(
    offense: &[Player],
    defense: &[Player],
    base: f64,
    blocked: bool,
) -> (f64, bool) {
    let offense_strength: f64 = offense.iter().map(|p| composite(p, weights::REBOUND)).sum();
    let mut defense_strength: f64 = defense.iter().map(|p| composite(p, weights::REBOUND)).sum();
    if !blocked {
        defense_strength *= DEFENSIVE_REBOUND_ADVANTAGE;
    }
    let total = offense_strength + defense_strength;
    let (ratio, fallback) = if total > 0.0 && total.is_finite() {
        (offense_strength / total, false)
    } else {
        (0.5, true)
    };
    (
        (OREB_STRENGTH_WEIGHT * ratio + OREB_BASE_WEIGHT * base).clamp(0.0, 1.0),
        fallback,
    )
}

fn pick_rebounder<R: Rng + ?Sized>(
    pool_id: &str,
    players: &[Player],
    crashers: &[usize],
    rng: &mut R,
) -> (usize, Vec<TraceEntry>) {
    let candidates = crashers
        .iter()
        .map(|idx| {
            let player = &players[*idx];
            WeightedCandidate::plain(player.name.clone(), composite(player, weights::REBOUND))
        })
        .collect();
    let selection = select(pool_id, candidates, rng);
    (
        crashers.get(selection.index).copied().unwrap_or(0),
        selection.trace,
    )
}

/// Resolve a rebound. Returns `None` when nobody is eligible to rebound.
pub fn resolve_rebound<R: Rng + ?Sized>(input: &ReboundInput<'_>, rng: &mut R) -> Option<ReboundOutcome> {
    if input.offense.is_empty() && input.defense.is_empty() {
        return None;
    }
    let offense_crashers = choose_crashers(input.offense, input.offense_strategy.offensive_rebounders());
    let defense_crashers = choose_crashers(input.defense, input.defense_strategy.defensive_rebounders());
    let offense_pool: Vec<Player> = offense_crashers.iter().map(|i| input.offense[*i].clone()).collect();
    let defense_pool: Vec<Player> = defense_crashers.iter().map(|i| input.defense[*i].clone()).collect();

    let base = offensive_base_rate(input.shot, input.offense_strategy);
    let (probability, fallback) =
        offensive_rebound_probability(&offense_pool, &defense_pool, base, input.blocked);
    let mut trace = Vec::new();
    if fallback {
        let reason = String::from("rebound: empty strength pools, ratio 0.5");
        log::warn!("fallback: {reason}");
        trace.push(TraceEntry::Fallback { reason });
    }
    let (mut offensive, entry) = roll("rebound.offensive", probability, rng);
    trace.push(entry);
    if offensive && offense_crashers.is_empty() {
        offensive = false;
    } else if !offensive && defense_crashers.is_empty() {
        offensive = true;
    }
    let (rebounder, pick_trace) = if offensive {
        pick_rebounder("rebound.offense", input.offense, &offense_crashers, rng)
    } else {
        pick_rebounder("rebound.defense", input.defense, &defense_crashers, rng)
    };
    trace.extend(pick_trace);
    Some(ReboundOutcome {
        offensive,
        rebounder,
        trace,
    })
}

/// Tall offensive rebounders go straight back up; everyone else kicks it out.
#[must_use]
pub fn attempts_putback(rebounder: &Player) -> bool {
    rebounder.attr(Attribute::Height) > PUTBACK_HEIGHT_THRESHOLD
}

/// Chance a defensive rebound starts a fast break, by the shooting team's strategy.
#[must_use]
pub const fn transition_chance(shooting_team_strategy: ReboundStrategy) -> f64 {
    match shooting_team_strategy {
        ReboundStrategy::CrashGlass => DREB_TRANSITION_CRASH,
        ReboundStrategy::Standard => DREB_TRANSITION_BASE,
        ReboundStrategy::PreventTransition => DREB_TRANSITION_PREVENT,
    }
}

/// Roll for a fast break off a defensive rebound.
pub fn transition_check<R: Rng + ?Sized>(
    shooting_team_strategy: ReboundStrategy,
    rng: &mut R,
) -> (bool, TraceEntry) {
    roll("rebound.transition", transition_chance(shooting_team_strategy), rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::Position;
    use crate::player::fixtures::uniform_player;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn lineup(prefix: &str, rating: f64) -> Vec<Player> {
        Position::ALL
            .iter()
            .map(|pos| uniform_player(&format!("{prefix}{pos}"), *pos, rating))
            .collect()
    }

    #[test]
    fn strategies_set_crasher_counts() {
        assert_eq!(ReboundStrategy::CrashGlass.offensive_rebounders(), 5);
        assert_eq!(ReboundStrategy::CrashGlass.defensive_rebounders(), 2);
        assert_eq!(ReboundStrategy::Standard.offensive_rebounders(), 2);
        assert_eq!(ReboundStrategy::Standard.defensive_rebounders(), 3);
        assert_eq!(ReboundStrategy::PreventTransition.offensive_rebounders(), 1);
        assert_eq!(ReboundStrategy::PreventTransition.defensive_rebounders(), 4);
    }

    #[test]
    fn crashers_are_the_best_rebounders() {
        let mut players = lineup("O", 50.0);
        players[4].attributes.set(Attribute::Height, 95.0);
        players[3].attributes.set(Attribute::Height, 85.0);
        assert_eq!(choose_crashers(&players, 2), vec![4, 3]);
        assert_eq!(choose_crashers(&players[..1], 3), vec![0]);
    }

    #[test]
    fn equal_standard_battle_matches_formula() {
        let offense = lineup("O", 50.0);
        let defense = lineup("D", 50.0);
        let base = offensive_base_rate(Some(ShotType::Midrange), ReboundStrategy::Standard);
        let (p, fallback) = offensive_rebound_probability(&offense[..2], &defense[..3], base, false);
        let ratio = 100.0 / (100.0 + 150.0 * 1.15);
        assert!(!fallback);
        assert!((p - (0.4 * ratio + 0.6 * 0.27)).abs() < 1e-12);
        let (scramble, _) = offensive_rebound_probability(&offense[..2], &defense[..3], base, true);
        assert!(scramble > p);
    }

    #[test]
    fn base_rate_adjusts_for_shot_and_strategy() {
        assert!((offensive_base_rate(Some(ShotType::ThreePoint), ReboundStrategy::Standard) - 0.24).abs() < 1e-12);
        assert!((offensive_base_rate(Some(ShotType::Rim), ReboundStrategy::CrashGlass) - 0.37).abs() < 1e-12);
        assert!((offensive_base_rate(None, ReboundStrategy::PreventTransition) - 0.22).abs() < 1e-12);
    }

    #[test]
    fn empty_pools_fall_back_and_trace() {
        let (p, fallback) = offensive_rebound_probability(&[], &[], 0.27, false);
        assert!(fallback);
        assert!((p - (0.2 + 0.6 * 0.27)).abs() < 1e-12);
        let mut rng = ChaCha20Rng::seed_from_u64(1);
        let none = resolve_rebound(
            &ReboundInput {
                offense: &[],
                defense: &[],
                offense_strategy: ReboundStrategy::Standard,
                defense_strategy: ReboundStrategy::Standard,
                shot: None,
                blocked: false,
            },
            &mut rng,
        );
        assert!(none.is_none());
    }

    #[test]
    fn one_sided_pool_always_wins() {
        let defense = lineup("D", 50.0);
        let mut rng = ChaCha20Rng::seed_from_u64(2);
        for _ in 0..50 {
            let outcome = resolve_rebound(
                &ReboundInput {
                    offense: &[],
                    defense: &defense,
                    offense_strategy: ReboundStrategy::CrashGlass,
                    defense_strategy: ReboundStrategy::Standard,
                    shot: Some(ShotType::Rim),
                    blocked: false,
                },
                &mut rng,
            )
            .expect("defense can rebound");
            assert!(!outcome.offensive);
            assert!(outcome.rebounder < defense.len());
        }
    }

    #[test]
    fn putback_threshold_is_strictly_above_75() {
        let mut big = uniform_player("Big", Position::C, 50.0);
        big.attributes.set(Attribute::Height, 76.0);
        assert!(attempts_putback(&big));
        big.attributes.set(Attribute::Height, 75.0);
        assert!(!attempts_putback(&big));
    }

    #[test]
    fn transition_chance_by_strategy() {
        assert!((transition_chance(ReboundStrategy::Standard) - 0.25).abs() < f64::EPSILON);
        assert!((transition_chance(ReboundStrategy::PreventTransition) - 0.10).abs() < f64::EPSILON);
        assert!((transition_chance(ReboundStrategy::CrashGlass) - 0.35).abs() < f64::EPSILON);
    }
}
