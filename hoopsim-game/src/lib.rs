//! HoopSim Game Engine
//!
//! Deterministic per-possession basketball simulation. Rosters carry 25 rated
//! attributes; every outcome is a weighted draw against composites of those
//! attributes, driven by one seeded random stream so that a seed reproduces a
//! game exactly.

pub mod box_score;
pub mod constants;
pub mod defense;
pub mod endgame;
pub mod error;
pub mod fouls;
pub mod free_throws;
pub mod game;
pub mod numbers;
pub mod player;
pub mod possession;
pub mod probability;
pub mod quarter;
pub mod rebounds;
pub mod rng;
pub mod shooting;
pub mod stamina;
pub mod substitutions;
pub mod tactics;
pub mod team;
pub mod timeouts;
pub mod trace;
pub mod turnovers;

// Re-export commonly used types
pub use box_score::{BoxScore, PlayerLine, StatLine, TeamBox};
pub use endgame::{EndGameMode, EndGameOverlay};
pub use error::ConfigError;
pub use fouls::{FoulEvent, FoulKind, FoulTracker};
pub use game::{GameOrchestrator, GameResult, simulate_game, transcript_digest};
pub use player::{Attribute, Attributes, Player, Position};
pub use possession::state::{BallEvent, BallState, DeadBallReason, PossessionStateMachine};
pub use possession::{PlayEvent, PossessionKind, PossessionResult, resolve_possession};
pub use quarter::{PeriodScore, PlayByPlay, PossessionEntry, Scoreboard};
pub use rng::GameRng;
pub use shooting::ShotType;
pub use substitutions::{SubReason, Substitution};
pub use tactics::{DefenseScheme, Pace, ReboundStrategy, TacticalSettings, TimeoutStrategy};
pub use team::{Team, TeamSide, sample_teams};
pub use timeouts::{TimeoutEvent, TimeoutReason};
pub use trace::{DecisionTrace, PossessionTrace, TraceEntry};
pub use turnovers::TurnoverKind;
