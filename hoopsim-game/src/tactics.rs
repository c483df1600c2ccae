//! Team tactical configuration, validated once per game and read-only afterwards.
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    MAX_SCORING_OPTIONS, PACE_FAST_SECONDS, PACE_SLOW_SECONDS, PACE_STANDARD_SECONDS,
    PLAYERS_ON_COURT, SCORING_OPTION_SHARES, STAMINA_COST_FAST, STAMINA_COST_SLOW,
    STAMINA_COST_STANDARD, TOTAL_TEAM_MINUTES, TURNOVER_PACE_FAST, TURNOVER_PACE_SLOW,
};
use crate::endgame::EndGameMode;
use crate::error::ConfigError;
use crate::numbers::usize_to_f64;
use crate::player::Player;
use crate::team::Team;

const MAX_PLAYER_MINUTES: u16 = 48;
const DEFAULT_ROTATION_MINUTES: [u16; 10] = [34, 34, 32, 32, 30, 20, 18, 16, 14, 10];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Pace {
    Slow,
    #[default]
    Standard,
    Fast,
}

impl Pace {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Slow => "slow",
            Self::Standard => "standard",
            Self::Fast => "fast",
        }
    }

    /// Typical half-court possession length in seconds.
    #[must_use]
    pub const fn possession_seconds(self) -> f64 {
        match self {
            Self::Slow => PACE_SLOW_SECONDS,
            Self::Standard => PACE_STANDARD_SECONDS,
            Self::Fast => PACE_FAST_SECONDS,
        }
    }

    /// Per-possession stamina cost before the scoring-option surcharge.
    #[must_use]
    pub const fn stamina_cost(self) -> f64 {
        match self {
            Self::Slow => STAMINA_COST_SLOW,
            Self::Standard => STAMINA_COST_STANDARD,
            Self::Fast => STAMINA_COST_FAST,
        }
    }

    #[must_use]
    pub const fn turnover_adjustment(self) -> f64 {
        match self {
            Self::Slow => TURNOVER_PACE_SLOW,
            Self::Standard => 0.0,
            Self::Fast => TURNOVER_PACE_FAST,
        }
    }
}

impl fmt::Display for Pace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Pace {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slow" => Ok(Self::Slow),
            "standard" => Ok(Self::Standard),
            "fast" => Ok(Self::Fast),
            _ => Err(ConfigError::UnknownVariant {
                field: "pace",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReboundStrategy {
    CrashGlass,
    #[default]
    Standard,
    PreventTransition,
}

impl ReboundStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CrashGlass => "crash_glass",
            Self::Standard => "standard",
            Self::PreventTransition => "prevent_transition",
        }
    }

    /// Players sent to the glass when this team is on offense.
    #[must_use]
    pub const fn offensive_rebounders(self) -> usize {
        match self {
            Self::CrashGlass => 5,
            Self::Standard => 2,
            Self::PreventTransition => 1,
        }
    }

    /// Players boxing out when this team is on defense.
    #[must_use]
    pub const fn defensive_rebounders(self) -> usize {
        match self {
            Self::CrashGlass => 2,
            Self::Standard => 3,
            Self::PreventTransition => 4,
        }
    }
}

impl fmt::Display for ReboundStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReboundStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "crash_glass" => Ok(Self::CrashGlass),
            "standard" => Ok(Self::Standard),
            "prevent_transition" => Ok(Self::PreventTransition),
            _ => Err(ConfigError::UnknownVariant {
                field: "rebounding_strategy",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TimeoutStrategy {
    Aggressive,
    #[default]
    Standard,
    Conservative,
}

impl TimeoutStrategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Aggressive => "aggressive",
            Self::Standard => "standard",
            Self::Conservative => "conservative",
        }
    }
}

impl FromStr for TimeoutStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "aggressive" => Ok(Self::Aggressive),
            "standard" => Ok(Self::Standard),
            "conservative" => Ok(Self::Conservative),
            _ => Err(ConfigError::UnknownVariant {
                field: "timeout_strategy",
                value: s.to_string(),
            }),
        }
    }
}

/// Defensive scheme rolled per possession from the man-defense percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefenseScheme {
    Man,
    Zone,
}

/// Coaching configuration for one team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TacticalSettings {
    #[serde(default)]
    pub pace: Pace,
    #[serde(default = "TacticalSettings::default_man_defense_pct")]
    pub man_defense_pct: u8,
    /// Up to three names, primary option first.
    #[serde(default)]
    pub scoring_options: Vec<String>,
    /// Minutes per player; must total 240.
    #[serde(default)]
    pub minutes_allotment: BTreeMap<String, u16>,
    #[serde(default)]
    pub rebounding_strategy: ReboundStrategy,
    #[serde(default)]
    pub timeout_strategy: TimeoutStrategy,
    /// Enabled end-game modes in precedence order.
    #[serde(default = "EndGameMode::default_priority")]
    pub end_game_priority: Vec<EndGameMode>,
}

impl TacticalSettings {
    const fn default_man_defense_pct() -> u8 {
        100
    }

    /// Standard tactics with a ten-deep rotation following roster order.
    ///
    /// The first five players start; extra minutes from short rosters are
    /// spread across the starters.
    #[must_use]
    pub fn with_default_rotation(team: &Team) -> Self {
        let mut minutes: Vec<u16> = team
            .roster
            .iter()
            .enumerate()
            .map(|(idx, _)| DEFAULT_ROTATION_MINUTES.get(idx).copied().unwrap_or(0))
            .collect();
        let starters = minutes.len().min(PLAYERS_ON_COURT);
        let mut total: u32 = minutes.iter().map(|m| u32::from(*m)).sum();
        let mut slot = 0;
        while total < TOTAL_TEAM_MINUTES && starters > 0 {
            if minutes[slot] < MAX_PLAYER_MINUTES {
                minutes[slot] += 1;
                total += 1;
            }
            slot = (slot + 1) % starters;
        }
        let minutes_allotment = team
            .roster
            .iter()
            .zip(minutes)
            .map(|(player, mins)| (player.name.clone(), mins))
            .collect();
        Self {
            pace: Pace::Standard,
            man_defense_pct: Self::default_man_defense_pct(),
            scoring_options: Vec::new(),
            minutes_allotment,
            rebounding_strategy: ReboundStrategy::Standard,
            timeout_strategy: TimeoutStrategy::Standard,
            end_game_priority: EndGameMode::default_priority(),
        }
    }

    /// Validate the settings against the roster they will coach.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when any field violates its documented bounds.
    pub fn validate(&self, team: &Team) -> Result<(), ConfigError> {
        if self.man_defense_pct > 100 {
            return Err(ConfigError::ManDefenseRange {
                value: self.man_defense_pct,
            });
        }
        self.validate_scoring_options(team)?;
        self.validate_minutes(team)?;
        let mut seen = HashSet::new();
        for mode in &self.end_game_priority {
            if !seen.insert(*mode) {
                return Err(ConfigError::DuplicateEndGameMode {
                    mode: mode.as_str(),
                });
            }
        }
        Ok(())
    }

    fn validate_scoring_options(&self, team: &Team) -> Result<(), ConfigError> {
        if self.scoring_options.len() > MAX_SCORING_OPTIONS {
            return Err(ConfigError::TooManyScoringOptions {
                max: MAX_SCORING_OPTIONS,
                found: self.scoring_options.len(),
            });
        }
        for name in &self.scoring_options {
            if team.player(name).is_none() {
                return Err(ConfigError::UnknownPlayer {
                    team: team.name.clone(),
                    player: name.clone(),
                    field: "scoring_options",
                });
            }
        }
        Ok(())
    }

    fn validate_minutes(&self, team: &Team) -> Result<(), ConfigError> {
        let mut total: u32 = 0;
        for (name, minutes) in &self.minutes_allotment {
            if team.player(name).is_none() {
                return Err(ConfigError::UnknownPlayer {
                    team: team.name.clone(),
                    player: name.clone(),
                    field: "minutes_allotment",
                });
            }
            if *minutes > MAX_PLAYER_MINUTES {
                return Err(ConfigError::MinutesPerPlayer {
                    team: team.name.clone(),
                    player: name.clone(),
                    minutes: *minutes,
                });
            }
            total += u32::from(*minutes);
        }
        if total != TOTAL_TEAM_MINUTES {
            return Err(ConfigError::MinutesTotal {
                team: team.name.clone(),
                total,
                expected: TOTAL_TEAM_MINUTES,
            });
        }
        let rotation = self.minutes_allotment.values().filter(|m| **m > 0).count();
        if rotation < PLAYERS_ON_COURT {
            return Err(ConfigError::RotationTooShort {
                team: team.name.clone(),
                found: rotation,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn minutes_for(&self, name: &str) -> u16 {
        self.minutes_allotment.get(name).copied().unwrap_or(0)
    }

    /// Fraction of possessions played in zone.
    #[must_use]
    pub fn zone_share(&self) -> f64 {
        f64::from(100 - self.man_defense_pct.min(100)) / 100.0
    }

    /// Zero-based scoring-option rank, if the player is one.
    #[must_use]
    pub fn scoring_option_rank(&self, name: &str) -> Option<usize> {
        self.scoring_options.iter().position(|option| option == name)
    }

    #[must_use]
    pub fn is_scoring_option(&self, name: &str) -> bool {
        self.scoring_option_rank(name).is_some()
    }

    /// Usage share for each player in `lineup`, summing to 1.
    ///
    /// Options on the floor take 30/20/15%; everyone else splits the rest
    /// evenly. An option sitting on the bench leaves his share to the others.
    #[must_use]
    pub fn usage_shares(&self, lineup: &[Player]) -> Vec<f64> {
        let option_share = |player: &Player| {
            self.scoring_option_rank(&player.name)
                .map(|rank| SCORING_OPTION_SHARES[rank])
        };
        let claimed: f64 = lineup.iter().filter_map(option_share).sum();
        let others = lineup
            .iter()
            .filter(|player| option_share(player).is_none())
            .count();
        if others == 0 {
            let count = usize_to_f64(lineup.len()).max(1.0);
            return lineup
                .iter()
                .map(|player| option_share(player).map_or(1.0 / count, |share| share / claimed))
                .collect();
        }
        let remainder = (1.0 - claimed).max(0.0) / usize_to_f64(others);
        lineup
            .iter()
            .map(|player| option_share(player).unwrap_or(remainder))
            .collect()
    }
}
