//! Stamina drain, bench recovery, and fatigue-degraded snapshots.
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{
    STAMINA_DEGRADATION_EXPONENT, STAMINA_DEGRADATION_SCALE, STAMINA_DEGRADATION_THRESHOLD,
    STAMINA_MAX, STAMINA_RECOVERY_RATE, STAMINA_SCORING_OPTION_SURCHARGE, STAMINA_TIMEOUT_RECOVERY,
};
use crate::player::Player;
use crate::tactics::{Pace, TacticalSettings};
use crate::team::{Team, TeamSide};

/// Per-player condition tracked across the game.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerCondition {
    pub stamina: f64,
    /// Cumulative minutes on the floor.
    pub minutes: f64,
}

impl Default for PlayerCondition {
    fn default() -> Self {
        Self {
            stamina: STAMINA_MAX,
            minutes: 0.0,
        }
    }
}

/// Stamina cost of one possession for an on-court player.
#[must_use]
pub fn possession_cost(pace: Pace, scoring_option: bool) -> f64 {
    let surcharge = if scoring_option {
        STAMINA_SCORING_OPTION_SURCHARGE
    } else {
        0.0
    };
    pace.stamina_cost() + surcharge
}

/// Exact bench recovery over `minutes`: `s(t) = 100 - (100 - s0) * e^(-0.08 t)`.
#[must_use]
pub fn recovered(stamina: f64, minutes: f64) -> f64 {
    if minutes <= 0.0 {
        return stamina;
    }
    let rate = STAMINA_RECOVERY_RATE / STAMINA_MAX;
    (STAMINA_MAX - (STAMINA_MAX - stamina) * (-rate * minutes).exp()).clamp(0.0, STAMINA_MAX)
}

/// Attribute penalty fraction for a stamina level: `0.2 * (80 - s)^1.3` percent.
#[must_use]
pub fn degradation_penalty(stamina: f64) -> f64 {
    if stamina >= STAMINA_DEGRADATION_THRESHOLD {
        return 0.0;
    }
    let deficit = STAMINA_DEGRADATION_THRESHOLD - stamina.max(0.0);
    let percent = STAMINA_DEGRADATION_SCALE * deficit.powf(STAMINA_DEGRADATION_EXPONENT);
    (percent / 100.0).min(1.0)
}

/// Game-long stamina and minutes for both rosters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaminaManager {
    conditions: [BTreeMap<String, PlayerCondition>; 2],
}

impl StaminaManager {
    #[must_use]
    pub fn new(home: &Team, away: &Team) -> Self {
        let fresh = |team: &Team| {
            team.roster
                .iter()
                .map(|player| (player.name.clone(), PlayerCondition::default()))
                .collect()
        };
        Self {
            conditions: [fresh(home), fresh(away)],
        }
    }

    #[must_use]
    pub fn condition(&self, side: TeamSide, name: &str) -> PlayerCondition {
        self.conditions[side.index()]
            .get(name)
            .copied()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn stamina(&self, side: TeamSide, name: &str) -> f64 {
        self.condition(side, name).stamina
    }

    #[must_use]
    pub fn minutes(&self, side: TeamSide, name: &str) -> f64 {
        self.condition(side, name).minutes
    }

    /// Fatigue-degraded copy of `player` for this possession.
    #[must_use]
    pub fn snapshot(&self, side: TeamSide, player: &Player) -> Player {
        player.degraded(degradation_penalty(self.stamina(side, &player.name)))
    }

    /// Drain the floor, rest the bench, and add minutes after a possession.
    pub fn apply_possession(
        &mut self,
        side: TeamSide,
        on_court: &[&str],
        tactics: &TacticalSettings,
        elapsed_seconds: f64,
    ) {
        let minutes = elapsed_seconds.max(0.0) / 60.0;
        for (name, condition) in &mut self.conditions[side.index()] {
            if on_court.contains(&name.as_str()) {
                let cost = possession_cost(tactics.pace, tactics.is_scoring_option(name));
                condition.stamina = (condition.stamina - cost).max(0.0);
                condition.minutes += minutes;
            } else {
                condition.stamina = recovered(condition.stamina, minutes);
            }
        }
    }

    /// Timeout huddle: everyone listed gets a flat boost.
    pub fn timeout_recovery(&mut self, side: TeamSide, on_court: &[&str]) {
        for name in on_court {
            if let Some(condition) = self.conditions[side.index()].get_mut(*name) {
                condition.stamina = (condition.stamina + STAMINA_TIMEOUT_RECOVERY).min(STAMINA_MAX);
            }
        }
    }

    /// Period break: every player recovers as if resting for `minutes`.
    pub fn rest_all(&mut self, minutes: f64) {
        for side in &mut self.conditions {
            for condition in side.values_mut() {
                condition.stamina = recovered(condition.stamina, minutes);
            }
        }
    }
}
