//! Whole-game orchestration: validation, jump balls, periods, overtime.
use serde::{Deserialize, Serialize};
use std::hash::Hasher;
use twox_hash::XxHash64;

use crate::box_score::BoxScore;
use crate::constants::{
    HALFTIME_BREAK_MINUTES, MAX_OVERTIME_PERIODS, QUARTER_BREAK_MINUTES, REGULATION_PERIODS,
};
use crate::error::ConfigError;
use crate::probability::roll;
use crate::quarter::{GameState, PeriodScore, PlayByPlay, Scoreboard};
use crate::rng::GameRng;
use crate::tactics::TacticalSettings;
use crate::team::{Team, TeamSide};

/// Everything a finished game reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub home: String,
    pub away: String,
    pub final_score: Scoreboard,
    pub period_scores: Vec<PeriodScore>,
    pub box_score: BoxScore,
    pub play_by_play: Vec<PlayByPlay>,
    pub seed: u64,
    pub rng_draws: u64,
    /// xxHash64 of the serialized play-by-play, hex encoded.
    pub digest: String,
}

impl GameResult {
    /// `None` when the game ended level after the overtime limit.
    #[must_use]
    pub fn winner(&self) -> Option<TeamSide> {
        match self.final_score.margin(TeamSide::Home) {
            0 => None,
            margin if margin > 0 => Some(TeamSide::Home),
            _ => Some(TeamSide::Away),
        }
    }

    #[must_use]
    pub fn periods_played(&self) -> usize {
        self.period_scores.len()
    }

    #[must_use]
    pub fn team_name(&self, side: TeamSide) -> &str {
        match side {
            TeamSide::Home => self.home.as_str(),
            TeamSide::Away => self.away.as_str(),
        }
    }
}

/// Stable digest of a transcript.
#[must_use]
pub fn transcript_digest(play_by_play: &[PlayByPlay]) -> String {
    let bytes = match serde_json::to_vec(play_by_play) {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("fallback: transcript did not serialize for hashing: {err}");
            Vec::new()
        }
    };
    let mut hasher = XxHash64::with_seed(0);
    hasher.write(&bytes);
    format!("{:016x}", hasher.finish())
}

/// Team that opens `period`, given who won the opening tip.
#[must_use]
pub const fn period_possession(period: u8, tip_winner: TeamSide) -> TeamSide {
    match period {
        2 | 3 => tip_winner.other(),
        _ => tip_winner,
    }
}

/// Drives one game from the opening tip to the final horn.
pub struct GameOrchestrator<'a> {
    state: GameState<'a>,
    seed: u64,
}

impl<'a> GameOrchestrator<'a> {
    /// Validate both teams and their tactics and set up the game.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` found in either roster or tactics.
    pub fn new(
        home: &'a Team,
        away: &'a Team,
        home_tactics: &'a TacticalSettings,
        away_tactics: &'a TacticalSettings,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        home.validate()?;
        away.validate()?;
        home_tactics.validate(home)?;
        away_tactics.validate(away)?;
        Ok(Self {
            state: GameState::new(home, away, home_tactics, away_tactics, GameRng::from_user_seed(seed)),
            seed,
        })
    }

    fn jump_ball(&mut self, period: u8) -> TeamSide {
        let (home_wins, _) = roll("jump_ball.home", 0.5, &mut self.state.rng);
        let winner = if home_wins { TeamSide::Home } else { TeamSide::Away };
        self.state.transcript.push(PlayByPlay::JumpBall { period, winner });
        log::debug!("period {period} jump ball won by {winner}");
        winner
    }

    fn rest_before(&mut self, period: u8) {
        let minutes = if period == 3 {
            HALFTIME_BREAK_MINUTES
        } else {
            QUARTER_BREAK_MINUTES
        };
        self.state.stamina.rest_all(minutes);
    }

    #[must_use]
    pub fn run(mut self) -> GameResult {
        let mut period_scores = Vec::new();
        let tip_winner = self.jump_ball(1);
        for period in 1..=REGULATION_PERIODS {
            if period > 1 {
                self.rest_before(period);
            }
            period_scores.push(
                self.state
                    .play_period(period, period_possession(period, tip_winner)),
            );
        }
        let mut period = REGULATION_PERIODS;
        while self.state.score.home == self.state.score.away
            && period < REGULATION_PERIODS + MAX_OVERTIME_PERIODS
        {
            period += 1;
            self.rest_before(period);
            let first = self.jump_ball(period);
            period_scores.push(self.state.play_period(period, first));
        }
        if self.state.score.home == self.state.score.away {
            log::warn!("game still tied after {MAX_OVERTIME_PERIODS} overtime periods");
        }

        let mut box_score = self.state.box_score;
        for side in TeamSide::BOTH {
            let team = self.state.teams[side.index()];
            let starters = self.state.subs.starters(side);
            let lines = &mut box_score.team_mut(side).players;
            for (idx, line) in lines.iter_mut().enumerate() {
                line.minutes = self.state.stamina.minutes(side, &line.name);
                line.starter = starters.contains(&idx);
            }
            log::debug!("{} box score finalized", team.name);
        }

        let digest = transcript_digest(&self.state.transcript);
        let final_score = self.state.score;
        log::info!(
            "final: {} {} - {} {} ({} draws)",
            self.state.teams[0].name,
            final_score.home,
            final_score.away,
            self.state.teams[1].name,
            self.state.rng.draws()
        );
        GameResult {
            home: self.state.teams[0].name.clone(),
            away: self.state.teams[1].name.clone(),
            final_score,
            period_scores,
            box_score,
            play_by_play: self.state.transcript,
            seed: self.seed,
            rng_draws: self.state.rng.draws(),
            digest,
        }
    }
}

/// Validate inputs and simulate one full game.
///
/// # Errors
///
/// Returns `ConfigError` when a roster or tactical setting is invalid; the
/// simulation itself does not fail.
pub fn simulate_game(
    home: &Team,
    away: &Team,
    home_tactics: &TacticalSettings,
    away_tactics: &TacticalSettings,
    seed: u64,
) -> Result<GameResult, ConfigError> {
    Ok(GameOrchestrator::new(home, away, home_tactics, away_tactics, seed)?.run())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::numbers::usize_to_f64;
    use crate::team::sample_teams;

    #[test]
    fn possession_arrow_alternates() {
        assert_eq!(period_possession(1, TeamSide::Away), TeamSide::Away);
        assert_eq!(period_possession(2, TeamSide::Away), TeamSide::Home);
        assert_eq!(period_possession(3, TeamSide::Away), TeamSide::Home);
        assert_eq!(period_possession(4, TeamSide::Away), TeamSide::Away);
    }

    #[test]
    fn invalid_tactics_are_rejected_up_front() {
        let (home, away) = sample_teams().expect("sample teams");
        let home_tactics = TacticalSettings::with_default_rotation(&home);
        let mut away_tactics = TacticalSettings::with_default_rotation(&away);
        away_tactics.man_defense_pct = 120;
        let err = simulate_game(&home, &away, &home_tactics, &away_tactics, 1)
            .expect_err("man defense above 100");
        assert!(matches!(err, ConfigError::ManDefenseRange { value: 120 }));
    }

    #[test]
    fn finished_game_has_a_consistent_box() {
        let (home, away) = sample_teams().expect("sample teams");
        let home_tactics = TacticalSettings::with_default_rotation(&home);
        let away_tactics = TacticalSettings::with_default_rotation(&away);
        let result = simulate_game(&home, &away, &home_tactics, &away_tactics, 2024).expect("valid game");
        assert!(result.periods_played() >= 4);
        let period_total: u16 = result.period_scores.iter().map(|p| p.home).sum();
        assert_eq!(period_total, result.final_score.home);
        assert_eq!(result.box_score.home.totals.pts, result.final_score.home);
        assert_eq!(result.box_score.away.totals.pts, result.final_score.away);
        let player_points: u16 = result.box_score.away.players.iter().map(|p| p.stats.pts).sum();
        assert_eq!(player_points, result.final_score.away);
        let minutes: f64 = result.box_score.home.players.iter().map(|p| p.minutes).sum();
        let expected = 5.0 * 12.0 * 4.0 + 5.0 * 5.0 * (usize_to_f64(result.periods_played()) - 4.0);
        assert!((minutes - expected).abs() < 1e-6, "{minutes} vs {expected}");
        assert_eq!(result.box_score.home.players.iter().filter(|p| p.starter).count(), 5);
        assert!(result.rng_draws > 1000);
        assert_eq!(result.digest.len(), 16);
    }
}
