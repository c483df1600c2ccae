//! Team rosters and court sides.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

use crate::constants::{MAX_ROSTER_SIZE, MIN_ROSTER_SIZE};
use crate::error::ConfigError;
use crate::player::Player;

const SAMPLE_TEAMS_DATA: &str = include_str!("../data/sample_teams.json");

/// Which bench a team sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub const BOTH: [Self; 2] = [Self::Home, Self::Away];

    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Self::Home => Self::Away,
            Self::Away => Self::Home,
        }
    }

    /// Stable array slot for per-side bookkeeping.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Home => 0,
            Self::Away => 1,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Away => "away",
        }
    }
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Team file record: a name and its roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    pub roster: Vec<Player>,
}

impl Team {
    /// Parse and validate a team file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed JSON (including missing or
    /// unknown attribute fields) and any validation error from [`Team::validate`].
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let team: Self =
            serde_json::from_str(json).map_err(|err| ConfigError::parse("team file", &err))?;
        team.validate()?;
        Ok(team)
    }

    /// Validate roster size, unique non-empty names, and attribute ranges.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError` encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let found = self.roster.len();
        if !(MIN_ROSTER_SIZE..=MAX_ROSTER_SIZE).contains(&found) {
            return Err(ConfigError::RosterSize {
                team: self.name.clone(),
                found,
                min: MIN_ROSTER_SIZE,
                max: MAX_ROSTER_SIZE,
            });
        }
        let mut seen = HashSet::new();
        for player in &self.roster {
            if player.name.trim().is_empty() {
                return Err(ConfigError::EmptyPlayerName {
                    team: self.name.clone(),
                });
            }
            if !seen.insert(player.name.as_str()) {
                return Err(ConfigError::DuplicatePlayer {
                    team: self.name.clone(),
                    player: player.name.clone(),
                });
            }
            player.validate()?;
        }
        Ok(())
    }

    #[must_use]
    pub fn player(&self, name: &str) -> Option<&Player> {
        self.roster.iter().find(|player| player.name == name)
    }

    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.roster.iter().position(|player| player.name == name)
    }
}

#[derive(Debug, Deserialize)]
struct SampleTeams {
    home: Team,
    away: Team,
}

/// Bundled home and away rosters used by the runner and the test suites.
///
/// # Errors
///
/// Returns an error only if the bundled data fails validation.
pub fn sample_teams() -> Result<(Team, Team), ConfigError> {
    let sample: SampleTeams = serde_json::from_str(SAMPLE_TEAMS_DATA)
        .map_err(|err| ConfigError::parse("sample teams", &err))?;
    sample.home.validate()?;
    sample.away.validate()?;
    Ok((sample.home, sample.away))
}
