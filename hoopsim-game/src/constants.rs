//! Centralized balance and tuning constants for the possession engine.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that game balance can only be adjusted via
//! code changes reviewed in version control.

// Game structure -----------------------------------------------------------
pub const REGULATION_PERIODS: u8 = 4;
pub const QUARTER_SECONDS: f64 = 720.0;
pub const OVERTIME_SECONDS: f64 = 300.0;
pub const MAX_OVERTIME_PERIODS: u8 = 10;
pub const PLAYERS_ON_COURT: usize = 5;
pub const MIN_ROSTER_SIZE: usize = 5;
pub const MAX_ROSTER_SIZE: usize = 15;
pub const TOTAL_TEAM_MINUTES: u32 = 240;
pub const MAX_SCORING_OPTIONS: usize = 3;
pub const SCORING_OPTION_SHARES: [f64; MAX_SCORING_OPTIONS] = [0.30, 0.20, 0.15];
pub const ATTRIBUTE_MIN: f64 = 1.0;
pub const ATTRIBUTE_MAX: f64 = 100.0;

// Clocks -------------------------------------------------------------------
pub const SHOT_CLOCK_FULL: f64 = 24.0;
pub const SHOT_CLOCK_RESET: f64 = 14.0;
pub const MIN_POSSESSION_SECONDS: f64 = 4.0;
pub const MAX_POSSESSION_SECONDS: f64 = 24.0;
pub const PACE_SLOW_SECONDS: f64 = 18.0;
pub const PACE_STANDARD_SECONDS: f64 = 15.0;
pub const PACE_FAST_SECONDS: f64 = 12.0;
pub const POSSESSION_SECONDS_SPREAD: f64 = 4.0;
pub const TRANSITION_SECONDS: f64 = 6.0;
pub const TRANSITION_SECONDS_SPREAD: f64 = 2.0;
pub const KICKOUT_SECONDS: f64 = 6.0;
pub const PUTBACK_SECONDS: f64 = 2.0;
pub const MAX_POSSESSION_SEQUENCES: u8 = 4;
pub const MAX_PUTBACK_CHAIN: u8 = 2;

// Probability engine -------------------------------------------------------
pub const SIGMOID_DIFF_CAP: f64 = 40.0;
pub const PROBABILITY_FLOOR: f64 = 0.05;
pub const PROBABILITY_CEILING: f64 = 0.95;
pub const CONSISTENCY_PIVOT: f64 = 50.0;
pub const CONSISTENCY_SCALE_LOW: f64 = 0.002;
pub const CONSISTENCY_SCALE_HIGH: f64 = 0.0002;
pub const RUBBER_BAND_THRESHOLD: i32 = 8;
pub const RUBBER_BAND_TIER_TWO: i32 = 13;
pub const RUBBER_BAND_TIER_THREE: i32 = 18;
pub const RUBBER_BAND_BONUS_LOW: f64 = 0.25;
pub const RUBBER_BAND_BONUS_MID: f64 = 0.35;
pub const RUBBER_BAND_BONUS_HIGH: f64 = 0.50;
pub const RUBBER_BAND_PROBABILITY_SCALE: f64 = 0.10;
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

// Shot selection -----------------------------------------------------------
pub const BASELINE_THREE_WEIGHT: f64 = 0.40;
pub const BASELINE_MIDRANGE_WEIGHT: f64 = 0.20;
pub const BASELINE_RIM_WEIGHT: f64 = 0.40;
pub const SHOT_TENDENCY_SCALE: f64 = 0.004;
pub const FAST_PACE_RIM_BONUS: f64 = 0.05;
pub const SLOW_PACE_MIDRANGE_BONUS: f64 = 0.04;
pub const ZONE_THREE_BONUS: f64 = 0.10;
pub const ZONE_RIM_PENALTY: f64 = 0.08;
pub const TRANSITION_RIM_BONUS: f64 = 0.20;
pub const DESPERATION_THREE_BOOST: f64 = 0.25;

// Shot success -------------------------------------------------------------
pub const BASE_RATE_THREE: f64 = 0.33;
pub const BASE_RATE_MIDRANGE: f64 = 0.39;
pub const BASE_RATE_LAYUP: f64 = 0.58;
pub const BASE_RATE_DUNK: f64 = 0.82;
pub const SHOT_K: f64 = 0.02;
pub const DUNK_K: f64 = 0.015;
pub const DUNK_HEIGHT_FLOOR: f64 = 55.0;
pub const DUNK_BASE_SHARE: f64 = 0.30;
pub const CONTEST_OPEN_FEET: f64 = 6.0;
pub const CONTEST_TIGHT_FEET: f64 = 2.0;
pub const CONTEST_PENALTY_CONTESTED: f64 = -0.08;
pub const CONTEST_PENALTY_HEAVY: f64 = -0.15;
pub const CONTEST_DEFENDER_SCALE: f64 = 0.001;
pub const TRANSITION_BONUS_RIM: f64 = 0.08;
pub const TRANSITION_BONUS_MIDRANGE: f64 = 0.04;
pub const TRANSITION_BONUS_THREE: f64 = 0.03;
pub const PUTBACK_BONUS: f64 = 0.05;
pub const SCRAMBLE_DEFENSE_FACTOR: f64 = 0.8;

// Contest distance ---------------------------------------------------------
pub const CONTEST_MIN_FEET: f64 = 0.5;
pub const CONTEST_MAX_FEET: f64 = 10.0;
pub const CONTEST_ACCELERATION_SCALE: f64 = 0.02;
pub const CONTEST_PATIENCE_SCALE: f64 = 0.02;
pub const HELP_DEFENSE_PENALTY_FEET: f64 = 3.0;
pub const ZONE_PERIMETER_FEET: f64 = 1.0;
pub const ZONE_PAINT_FEET: f64 = -0.5;
pub const CONTEST_NOISE_SIGMA_MIN: f64 = 1.2;
pub const CONTEST_NOISE_SIGMA_RANGE: f64 = 0.6;
pub const HELP_QUALITY_THRESHOLD: f64 = 0.30;
pub const HELP_ROTATION_K: f64 = 0.05;

// Blocks -------------------------------------------------------------------
pub const BLOCK_BASE_RIM: f64 = 0.12;
pub const BLOCK_BASE_MIDRANGE: f64 = 0.05;
pub const BLOCK_BASE_THREE: f64 = 0.02;
pub const BLOCK_K: f64 = 0.02;
pub const BLOCK_CONTESTED_SCALE: f64 = 0.5;

// Assists ------------------------------------------------------------------
pub const ASSIST_RATE_THREE: f64 = 0.85;
pub const ASSIST_RATE_MIDRANGE: f64 = 0.65;
pub const ASSIST_RATE_RIM: f64 = 0.55;
pub const ASSIST_TRANSITION_FACTOR: f64 = 0.8;

// Turnovers ----------------------------------------------------------------
pub const TURNOVER_BASE_RATE: f64 = 0.08;
pub const TURNOVER_CAP: f64 = 0.12;
pub const TURNOVER_PACE_SLOW: f64 = -0.01;
pub const TURNOVER_PACE_FAST: f64 = 0.015;
pub const TURNOVER_TRANSITION_ADJ: f64 = -0.02;
pub const TURNOVER_MATCHUP_SPAN: f64 = 0.03;
pub const TURNOVER_MATCHUP_K: f64 = 0.03;
pub const TURNOVER_WEIGHT_BAD_PASS: f64 = 0.40;
pub const TURNOVER_WEIGHT_LOST_BALL: f64 = 0.30;
pub const TURNOVER_WEIGHT_OFFENSIVE_FOUL: f64 = 0.15;
pub const TURNOVER_WEIGHT_SHOT_CLOCK: f64 = 0.05;
pub const TURNOVER_WEIGHT_OTHER_VIOLATION: f64 = 0.10;
pub const TURNOVER_ZONE_BAD_PASS: f64 = 0.10;
pub const TURNOVER_FAST_LOST_BALL: f64 = 0.05;
pub const TURNOVER_SHOT_CLOCK_PRESSURE: f64 = 0.25;
pub const TURNOVER_SHOT_CLOCK_WINDOW: f64 = 5.0;
pub const STEAL_BASE_RATE: f64 = 0.55;
pub const STEAL_K: f64 = 0.02;

// Rebounds -----------------------------------------------------------------
pub const DEFENSIVE_REBOUND_ADVANTAGE: f64 = 1.15;
pub const OREB_BASE_RATE: f64 = 0.27;
pub const OREB_THREE_ADJ: f64 = -0.03;
pub const OREB_RIM_ADJ: f64 = 0.05;
pub const OREB_CRASH_ADJ: f64 = 0.05;
pub const OREB_PREVENT_ADJ: f64 = -0.05;
pub const OREB_STRENGTH_WEIGHT: f64 = 0.4;
pub const OREB_BASE_WEIGHT: f64 = 0.6;
pub const PUTBACK_HEIGHT_THRESHOLD: f64 = 75.0;
pub const DREB_TRANSITION_BASE: f64 = 0.25;
pub const DREB_TRANSITION_PREVENT: f64 = 0.10;
pub const DREB_TRANSITION_CRASH: f64 = 0.35;

// Fouls and free throws ----------------------------------------------------
pub const BONUS_THRESHOLD: u8 = 5;
pub const BONUS_FREE_THROWS: u8 = 2;
pub const FOUL_OUT_LIMIT: u8 = 6;
pub const SHOOTING_FOUL_RIM: f64 = 0.12;
pub const SHOOTING_FOUL_MIDRANGE: f64 = 0.04;
pub const SHOOTING_FOUL_THREE: f64 = 0.015;
pub const SHOOTING_FOUL_K: f64 = 0.02;
pub const NON_SHOOTING_FOUL_RATE: f64 = 0.05;
pub const NON_SHOOTING_FOUL_K: f64 = 0.02;
pub const LOOSE_BALL_FOUL_RATE: f64 = 0.02;
pub const FREE_THROW_BASE_RATE: f64 = 0.75;
pub const FREE_THROW_K: f64 = 0.04;
pub const FREE_THROW_BONUS_ADJ: f64 = -0.01;
pub const FREE_THROW_AND_ONE_ADJ: f64 = 0.03;
pub const FREE_THROW_CLUTCH_PENALTY: f64 = -0.05;
pub const CLUTCH_SECONDS: f64 = 120.0;
pub const CLUTCH_MARGIN: i32 = 5;

// Stamina ------------------------------------------------------------------
pub const STAMINA_MAX: f64 = 100.0;
pub const STAMINA_COST_SLOW: f64 = 0.5;
pub const STAMINA_COST_STANDARD: f64 = 0.8;
pub const STAMINA_COST_FAST: f64 = 1.1;
pub const STAMINA_SCORING_OPTION_SURCHARGE: f64 = 0.2;
pub const STAMINA_RECOVERY_RATE: f64 = 8.0;
pub const STAMINA_DEGRADATION_THRESHOLD: f64 = 80.0;
pub const STAMINA_DEGRADATION_SCALE: f64 = 0.2;
pub const STAMINA_DEGRADATION_EXPONENT: f64 = 1.3;
pub const STAMINA_TIMEOUT_RECOVERY: f64 = 5.0;
pub const QUARTER_BREAK_MINUTES: f64 = 2.0;
pub const HALFTIME_BREAK_MINUTES: f64 = 15.0;

// Substitutions ------------------------------------------------------------
pub const FATIGUE_SUB_THRESHOLD: f64 = 60.0;
pub const FRESH_SUB_THRESHOLD: f64 = 80.0;
pub const STARTER_RETURN_THRESHOLD: f64 = 90.0;
pub const MINUTES_OVERAGE_TOLERANCE: f64 = 1.0;

// Timeouts -----------------------------------------------------------------
pub const TIMEOUTS_PER_GAME: u8 = 7;
pub const RUN_TRIGGER_AGGRESSIVE: u16 = 8;
pub const RUN_TRIGGER_STANDARD: u16 = 10;
pub const RUN_TRIGGER_CONSERVATIVE: u16 = 12;
pub const LATE_TIMEOUT_SECONDS: f64 = 60.0;
pub const LATE_TIMEOUT_MAX_DEFICIT: i32 = 3;

// End-game windows ---------------------------------------------------------
pub const CLOCK_KILL_SECONDS: f64 = 60.0;
pub const CLOCK_KILL_SHOT_CLOCK_TARGET: f64 = 4.0;
pub const LAST_SHOT_TARGET_SECONDS: f64 = 2.0;
pub const LAST_SHOT_MAX_DEFICIT: i32 = 3;
pub const DESPERATION_SECONDS: f64 = 180.0;
pub const DESPERATION_DEFICIT: i32 = 9;
pub const CONSERVE_LEAD_SECONDS: f64 = 360.0;
pub const CONSERVE_LEAD_MARGIN: i32 = 15;
pub const CONSERVE_LEAD_PACE_FRACTION: f64 = 0.30;
pub const INTENTIONAL_FOUL_SECONDS: f64 = 60.0;
pub const INTENTIONAL_FOUL_MAX_DEFICIT: i32 = 6;
pub const INTENTIONAL_FOUL_MIN_ELAPSED: f64 = 2.0;
pub const INTENTIONAL_FOUL_MAX_ELAPSED: f64 = 4.0;
