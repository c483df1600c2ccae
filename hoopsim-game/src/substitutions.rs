//! On-court lineups and the substitution rules applied at dead balls.
//!
//! Lineups hold roster indices. Every change goes through
//! [`SubstitutionManager::substitute`], which needs a [`DeadBallWindow`].
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::constants::{
    FATIGUE_SUB_THRESHOLD, FRESH_SUB_THRESHOLD, MINUTES_OVERAGE_TOLERANCE, PLAYERS_ON_COURT,
    STARTER_RETURN_THRESHOLD,
};
use crate::fouls::FoulTracker;
use crate::possession::state::DeadBallWindow;
use crate::stamina::StaminaManager;
use crate::tactics::TacticalSettings;
use crate::team::{Team, TeamSide};

pub type LineupSlots = SmallVec<[usize; PLAYERS_ON_COURT]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubReason {
    FoulOut,
    Fatigue,
    Minutes,
    StarterReturn,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub side: TeamSide,
    pub out: String,
    pub into: String,
    pub reason: SubReason,
}

/// Which rules a window runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// Whistle inside a possession: only foul-outs are handled.
    FoulOutOnly,
    /// Dead ball between possessions: foul-outs, fatigue, minutes.
    Regular,
    /// Start of a period: everything, plus rested starters return.
    PeriodStart,
}

/// What one team's bench looks like at a window.
#[derive(Debug, Clone, Copy)]
pub struct RosterView<'a> {
    pub side: TeamSide,
    pub team: &'a Team,
    pub tactics: &'a TacticalSettings,
    pub stamina: &'a StaminaManager,
    pub fouls: &'a FoulTracker,
}

impl RosterView<'_> {
    fn name(&self, idx: usize) -> &str {
        self.team.roster.get(idx).map_or("", |p| p.name.as_str())
    }

    fn stamina(&self, idx: usize) -> f64 {
        self.stamina.stamina(self.side, self.name(idx))
    }

    fn fouled_out(&self, idx: usize) -> bool {
        self.fouls.is_fouled_out(self.side, self.name(idx))
    }

    /// Allotted minutes not yet played.
    fn minutes_left(&self, idx: usize) -> f64 {
        let name = self.name(idx);
        f64::from(self.tactics.minutes_for(name)) - self.stamina.minutes(self.side, name)
    }

    fn over_allotment(&self, idx: usize) -> bool {
        -self.minutes_left(idx) > MINUTES_OVERAGE_TOLERANCE
    }

    fn compatibility(&self, bench: usize, replacing: usize) -> f64 {
        match (self.team.roster.get(bench), self.team.roster.get(replacing)) {
            (Some(b), Some(r)) => b.position.compatibility(r.position),
            _ => 0.0,
        }
    }
}

/// Result of one window for one team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionOutcome {
    pub substitutions: Vec<Substitution>,
    /// Fouled-out players left on the floor because nobody could replace them.
    pub stranded: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Lineup {
    on_court: LineupSlots,
    starters: LineupSlots,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstitutionManager {
    lineups: [Lineup; 2],
}

/// The five largest minute allotments, ties in roster order.
#[must_use]
pub fn starters(team: &Team, tactics: &TacticalSettings) -> LineupSlots {
    let mut ranked: Vec<(usize, u16)> = team
        .roster
        .iter()
        .enumerate()
        .map(|(idx, player)| (idx, tactics.minutes_for(&player.name)))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(PLAYERS_ON_COURT)
        .map(|(idx, _)| idx)
        .collect()
}

impl SubstitutionManager {
    #[must_use]
    pub fn new(
        home: &Team,
        home_tactics: &TacticalSettings,
        away: &Team,
        away_tactics: &TacticalSettings,
    ) -> Self {
        let lineup = |team: &Team, tactics: &TacticalSettings| {
            let starters = starters(team, tactics);
            Lineup {
                on_court: starters.clone(),
                starters,
            }
        };
        Self {
            lineups: [lineup(home, home_tactics), lineup(away, away_tactics)],
        }
    }

    #[must_use]
    pub fn on_court(&self, side: TeamSide) -> &[usize] {
        &self.lineups[side.index()].on_court
    }

    #[must_use]
    pub fn starters(&self, side: TeamSide) -> &[usize] {
        &self.lineups[side.index()].starters
    }

    #[must_use]
    pub fn is_on_court(&self, side: TeamSide, idx: usize) -> bool {
        self.on_court(side).contains(&idx)
    }

    /// Names of the players on the floor, in lineup order.
    #[must_use]
    pub fn on_court_names<'t>(&self, side: TeamSide, team: &'t Team) -> Vec<&'t str> {
        self.on_court(side)
            .iter()
            .filter_map(|idx| team.roster.get(*idx))
            .map(|player| player.name.as_str())
            .collect()
    }

    /// Apply the window's rules for one team, in priority order.
    pub fn substitute(
        &mut self,
        _window: &DeadBallWindow<'_>,
        roster: &RosterView<'_>,
        kind: WindowKind,
    ) -> SubstitutionOutcome {
        let mut outcome = SubstitutionOutcome::default();
        self.replace_fouled_out(roster, &mut outcome);
        if kind == WindowKind::FoulOutOnly {
            return outcome;
        }
        self.rest_fatigued(roster, &mut outcome);
        self.enforce_minutes(roster, &mut outcome);
        if kind == WindowKind::PeriodStart {
            self.return_starters(roster, &mut outcome);
        }
        outcome
    }

    fn bench(&self, roster: &RosterView<'_>) -> Vec<usize> {
        (0..roster.team.roster.len())
            .filter(|idx| !self.is_on_court(roster.side, *idx) && !roster.fouled_out(*idx))
            .collect()
    }

    fn swap(
        &mut self,
        roster: &RosterView<'_>,
        slot: usize,
        into: usize,
        reason: SubReason,
        outcome: &mut SubstitutionOutcome,
    ) {
        let lineup = &mut self.lineups[roster.side.index()].on_court;
        let Some(current) = lineup.get_mut(slot) else {
            return;
        };
        let out = *current;
        *current = into;
        let substitution = Substitution {
            side: roster.side,
            out: roster.name(out).to_string(),
            into: roster.name(into).to_string(),
            reason,
        };
        log::debug!(
            "{} sub ({:?}): {} for {}",
            roster.side,
            reason,
            substitution.into,
            substitution.out
        );
        outcome.substitutions.push(substitution);
    }

    /// Best bench player for `replacing` among `candidates`: position fit,
    /// then remaining allotment, then stamina. Ties keep roster order.
    fn best_replacement(
        roster: &RosterView<'_>,
        candidates: &[usize],
        replacing: usize,
    ) -> Option<usize> {
        candidates
            .iter()
            .copied()
            .fold(None, |best: Option<(usize, (f64, bool, f64))>, idx| {
                let key = (
                    roster.compatibility(idx, replacing),
                    roster.minutes_left(idx) > 0.0,
                    roster.stamina(idx),
                );
                match best {
                    Some((_, best_key)) if !ranks_above(key, best_key) => best,
                    _ => Some((idx, key)),
                }
            })
            .map(|(idx, _)| idx)
    }

    fn replace_fouled_out(&mut self, roster: &RosterView<'_>, outcome: &mut SubstitutionOutcome) {
        for slot in 0..self.on_court(roster.side).len() {
            let current = self.on_court(roster.side)[slot];
            if !roster.fouled_out(current) {
                continue;
            }
            let bench = self.bench(roster);
            match Self::best_replacement(roster, &bench, current) {
                Some(into) => self.swap(roster, slot, into, SubReason::FoulOut, outcome),
                None => {
                    let name = roster.name(current).to_string();
                    log::warn!("{} has no eligible bench player to replace {name}", roster.side);
                    outcome.stranded.push(name);
                }
            }
        }
    }

    fn rest_fatigued(&mut self, roster: &RosterView<'_>, outcome: &mut SubstitutionOutcome) {
        for slot in 0..self.on_court(roster.side).len() {
            let current = self.on_court(roster.side)[slot];
            if roster.fouled_out(current) || roster.stamina(current) >= FATIGUE_SUB_THRESHOLD {
                continue;
            }
            let fresh: Vec<usize> = self
                .bench(roster)
                .into_iter()
                .filter(|idx| roster.stamina(*idx) >= FRESH_SUB_THRESHOLD && roster.minutes_left(*idx) > 0.0)
                .collect();
            if let Some(into) = Self::best_replacement(roster, &fresh, current) {
                self.swap(roster, slot, into, SubReason::Fatigue, outcome);
            }
        }
    }

    fn enforce_minutes(&mut self, roster: &RosterView<'_>, outcome: &mut SubstitutionOutcome) {
        for slot in 0..self.on_court(roster.side).len() {
            let current = self.on_court(roster.side)[slot];
            if roster.fouled_out(current) || !roster.over_allotment(current) {
                continue;
            }
            let available: Vec<usize> = self
                .bench(roster)
                .into_iter()
                .filter(|idx| roster.minutes_left(*idx) > 0.0)
                .collect();
            if let Some(into) = Self::best_replacement(roster, &available, current) {
                self.swap(roster, slot, into, SubReason::Minutes, outcome);
            }
        }
    }

    fn return_starters(&mut self, roster: &RosterView<'_>, outcome: &mut SubstitutionOutcome) {
        let starters = self.starters(roster.side).to_vec();
        for starter in starters {
            if self.is_on_court(roster.side, starter)
                || roster.fouled_out(starter)
                || roster.stamina(starter) < STARTER_RETURN_THRESHOLD
                || roster.minutes_left(starter) <= 0.0
            {
                continue;
            }
            let lineup = self.on_court(roster.side);
            let slot = lineup
                .iter()
                .enumerate()
                .filter(|(_, idx)| !self.starters(roster.side).contains(*idx))
                .fold(None, |best: Option<(usize, f64)>, (slot, idx)| {
                    let fit = roster.compatibility(starter, *idx);
                    match best {
                        Some((_, best_fit)) if best_fit >= fit => best,
                        _ => Some((slot, fit)),
                    }
                })
                .map(|(slot, _)| slot);
            if let Some(slot) = slot {
                self.swap(roster, slot, starter, SubReason::StarterReturn, outcome);
            }
        }
    }
}

fn ranks_above(key: (f64, bool, f64), other: (f64, bool, f64)) -> bool {
    key.0
        .total_cmp(&other.0)
        .then(key.1.cmp(&other.1))
        .then(key.2.total_cmp(&other.2))
        .is_gt()
}
