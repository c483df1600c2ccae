use hoopsim_game::defense::ContestTier;
use hoopsim_game::free_throws::{FreeThrowSituation, free_throw_probability, shoot_free_throws};
use hoopsim_game::probability::weighted_index;
use hoopsim_game::rebounds::{
    ReboundInput, choose_crashers, offensive_base_rate, offensive_rebound_probability,
    resolve_rebound,
};
use hoopsim_game::shooting::{ShotInput, resolve_shot, shot_probability};
use hoopsim_game::turnovers::{TurnoverInput, turnover_check, turnover_probability};
use hoopsim_game::{Attribute, Attributes, GameRng, Pace, Player, Position, ReboundStrategy, ShotType};
use std::convert::TryFrom;

const SAMPLE_SIZE: usize = 5000;
const TOLERANCE: f64 = 0.025;

/// Rated player whose consistency sits at the neutral pivot, so rolls carry no jitter.
fn steady_player(name: &str, position: Position, rating: f64) -> Player {
    let mut attributes = Attributes::uniform(rating);
    attributes.set(Attribute::Consistency, 50.0);
    Player::new(name, position, attributes)
}

fn rate(hits: usize) -> f64 {
    let sample_size = u32::try_from(SAMPLE_SIZE).expect("sample size fits u32");
    f64::from(u32::try_from(hits).expect("count fits")) / f64::from(sample_size)
}

#[test]
fn shot_make_rate_tracks_probability() {
    let shooter = steady_player("Shooter", Position::SG, 70.0);
    let defender = steady_player("Defender", Position::SF, 55.0);
    let mut rng = GameRng::from_user_seed(4242);
    for (shot, tier) in [
        (ShotType::ThreePoint, ContestTier::Contested),
        (ShotType::Midrange, ContestTier::Open),
        (ShotType::Rim, ContestTier::Heavy),
    ] {
        let input = ShotInput {
            shooter: &shooter,
            defender: &defender,
            shot,
            finish: None,
            tier,
            transition: false,
            putback: false,
            score_diff: 0,
        };
        let expected = shot_probability(&input);
        let made = (0..SAMPLE_SIZE)
            .filter(|_| resolve_shot(&input, &mut rng).0)
            .count();
        let observed = rate(made);
        assert!(
            (observed - expected).abs() <= TOLERANCE,
            "{shot:?} make rate drifted: observed {observed:.4}, expected {expected:.4}"
        );
    }
}

#[test]
fn free_throw_rate_tracks_probability() {
    let shooter = steady_player("Shooter", Position::PG, 80.0);
    let situation = FreeThrowSituation::default();
    let expected = free_throw_probability(&shooter, situation);
    let mut rng = GameRng::from_user_seed(77);
    let made: usize = (0..SAMPLE_SIZE / 2)
        .map(|_| usize::from(shoot_free_throws(&shooter, 2, situation, &mut rng).made()))
        .sum();
    let observed = rate(made);
    assert!(
        (observed - expected).abs() <= TOLERANCE,
        "free throw rate drifted: observed {observed:.4}, expected {expected:.4}"
    );
}

#[test]
fn turnover_rate_tracks_probability() {
    let handler = steady_player("Handler", Position::PG, 45.0);
    let defender = steady_player("Pest", Position::SG, 75.0);
    let input = TurnoverInput {
        handler: &handler,
        defender: &defender,
        pace: Pace::Fast,
        transition: true,
        zone_share: 0.0,
        shot_clock: 24.0,
        score_diff: 0,
    };
    let expected = turnover_probability(&input);
    let mut rng = GameRng::from_user_seed(9001);
    let turnovers = (0..SAMPLE_SIZE)
        .filter(|_| turnover_check(&input, &mut rng).0)
        .count();
    let observed = rate(turnovers);
    assert!(
        (observed - expected).abs() <= TOLERANCE,
        "turnover rate drifted: observed {observed:.4}, expected {expected:.4}"
    );
}

#[test]
fn weighted_index_matches_weights() {
    let weights = [0.5, 0.3, 0.2];
    let mut counts = [0usize; 3];
    let mut rng = GameRng::from_user_seed(31);
    for _ in 0..SAMPLE_SIZE {
        let pick = weighted_index(&weights, &mut rng);
        assert!(!pick.fallback);
        counts[pick.index] += 1;
    }
    for (count, weight) in counts.iter().zip(weights) {
        let observed = rate(*count);
        assert!(
            (observed - weight).abs() <= TOLERANCE,
            "weight {weight} drifted: observed {observed:.4}"
        );
    }
}

#[test]
fn offensive_rebound_rate_tracks_strength_share() {
    let offense: Vec<Player> = Position::ALL
        .iter()
        .map(|pos| steady_player(&format!("O {pos}"), *pos, 65.0))
        .collect();
    let defense: Vec<Player> = Position::ALL
        .iter()
        .map(|pos| steady_player(&format!("D {pos}"), *pos, 55.0))
        .collect();
    let strategy = ReboundStrategy::CrashGlass;
    let input = ReboundInput {
        offense: &offense,
        defense: &defense,
        offense_strategy: strategy,
        defense_strategy: ReboundStrategy::Standard,
        shot: Some(ShotType::Midrange),
        blocked: false,
    };

    let offense_pool: Vec<Player> = choose_crashers(&offense, strategy.offensive_rebounders())
        .into_iter()
        .map(|idx| offense[idx].clone())
        .collect();
    let defense_pool: Vec<Player> =
        choose_crashers(&defense, ReboundStrategy::Standard.defensive_rebounders())
            .into_iter()
            .map(|idx| defense[idx].clone())
            .collect();
    let base = offensive_base_rate(input.shot, strategy);
    let (expected, fallback) = offensive_rebound_probability(&offense_pool, &defense_pool, base, false);
    assert!(!fallback);

    let mut rng = GameRng::from_user_seed(512);
    let offensive = (0..SAMPLE_SIZE)
        .filter(|_| {
            resolve_rebound(&input, &mut rng)
                .expect("both pools populated")
                .offensive
        })
        .count();
    let observed = rate(offensive);
    assert!(
        (observed - expected).abs() <= TOLERANCE,
        "offensive rebound rate drifted: observed {observed:.4}, expected {expected:.4}"
    );
}
