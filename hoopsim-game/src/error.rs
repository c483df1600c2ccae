//! Validation errors raised before a simulation starts.
use thiserror::Error;

/// Errors raised when roster, tactics, or weight-table invariants are violated.
///
/// Every variant is an input-contract violation: a game never starts when
/// one of these is returned.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("unknown {field} value `{value}`")]
    UnknownVariant { field: &'static str, value: String },
    #[error("unknown attribute `{name}`")]
    UnknownAttribute { name: String },
    #[error("{player}: attribute {attribute} must be between 1 and 100 (got {value:.2})")]
    AttributeOutOfRange {
        player: String,
        attribute: &'static str,
        value: f64,
    },
    #[error("{context}: weights must sum to 1.0 (got {sum:.6})")]
    WeightSum { context: String, sum: f64 },
    #[error("{context}: weight for {attribute} must be non-negative (got {value:.4})")]
    NegativeWeight {
        context: String,
        attribute: &'static str,
        value: f64,
    },
    #[error("team `{team}` roster size {found} outside {min}..={max}")]
    RosterSize {
        team: String,
        found: usize,
        min: usize,
        max: usize,
    },
    #[error("team `{team}` lists player `{player}` more than once")]
    DuplicatePlayer { team: String, player: String },
    #[error("player name must not be empty (team `{team}`)")]
    EmptyPlayerName { team: String },
    #[error("team `{team}` has no player named `{player}` ({field})")]
    UnknownPlayer {
        team: String,
        player: String,
        field: &'static str,
    },
    #[error("at most {max} scoring options allowed (got {found})")]
    TooManyScoringOptions { max: usize, found: usize },
    #[error("man defense percentage must be between 0 and 100 (got {value})")]
    ManDefenseRange { value: u8 },
    #[error("team `{team}` minutes allotment sums to {total}, expected {expected}")]
    MinutesTotal {
        team: String,
        total: u32,
        expected: u32,
    },
    #[error("team `{team}` player `{player}` allotted {minutes} minutes (max 48)")]
    MinutesPerPlayer {
        team: String,
        player: String,
        minutes: u16,
    },
    #[error("team `{team}` has only {found} players with allotted minutes (need 5)")]
    RotationTooShort { team: String, found: usize },
    #[error("end-game priority lists {mode} more than once")]
    DuplicateEndGameMode { mode: &'static str },
    #[error("failed to parse {what}: {message}")]
    Parse { what: &'static str, message: String },
}

impl ConfigError {
    pub(crate) fn parse(what: &'static str, err: &serde_json::Error) -> Self {
        Self::Parse {
            what,
            message: err.to_string(),
        }
    }
}
