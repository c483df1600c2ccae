//! Personal and team foul bookkeeping with bonus and foul-out rules.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{
    BONUS_FREE_THROWS, BONUS_THRESHOLD, FOUL_OUT_LIMIT, NON_SHOOTING_FOUL_K, NON_SHOOTING_FOUL_RATE,
};
use crate::player::Player;
use crate::probability::{composite, roll, weighted_sigmoid_probability, weights};
use crate::team::TeamSide;
use crate::trace::TraceEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoulKind {
    Shooting,
    NonShooting,
    Offensive,
    LooseBall,
    Intentional,
}

impl FoulKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Shooting => "shooting",
            Self::NonShooting => "non_shooting",
            Self::Offensive => "offensive",
            Self::LooseBall => "loose_ball",
            Self::Intentional => "intentional",
        }
    }
}

/// Attempt context for a shooting foul.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FouledShot {
    pub value: u8,
    pub made: bool,
}

/// A recorded foul with the counts as they stood right after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoulEvent {
    /// Team that committed the foul.
    pub side: TeamSide,
    pub player: String,
    pub kind: FoulKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fouled_player: Option<String>,
    pub personal_fouls: u8,
    pub team_fouls: u8,
    pub free_throws: u8,
    pub fouled_out: bool,
}

/// Game-long foul state. Team counts reset each period; personal counts persist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoulTracker {
    personal: BTreeMap<TeamSide, BTreeMap<String, u8>>,
    team: [u8; 2],
    period: u8,
}

impl FoulTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset team fouls for a new period.
    pub fn start_period(&mut self, period: u8) {
        self.period = period;
        self.team = [0; 2];
    }

    #[must_use]
    pub const fn period(&self) -> u8 {
        self.period
    }

    #[must_use]
    pub fn personal_fouls(&self, side: TeamSide, player: &str) -> u8 {
        self.personal
            .get(&side)
            .and_then(|fouls| fouls.get(player))
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub const fn team_fouls(&self, side: TeamSide) -> u8 {
        self.team[side.index()]
    }

    /// Whether the next non-shooting foul by `side` sends the opponent to the line.
    #[must_use]
    pub const fn bonus_on_next_foul(&self, side: TeamSide) -> bool {
        self.team[side.index()].saturating_add(1) >= BONUS_THRESHOLD
    }

    #[must_use]
    pub fn is_fouled_out(&self, side: TeamSide, player: &str) -> bool {
        self.personal_fouls(side, player) >= FOUL_OUT_LIMIT
    }

    /// Record a foul and compute the free throws it awards.
    ///
    /// Counts are incremented before the bonus is evaluated, so the fifth team
    /// foul of a period is the first to award bonus free throws. Offensive
    /// fouls count against the team total but never award free throws.
    pub fn record_foul(
        &mut self,
        side: TeamSide,
        player: &str,
        kind: FoulKind,
        fouled_player: Option<&str>,
        shot: Option<FouledShot>,
    ) -> FoulEvent {
        let personal = self
            .personal
            .entry(side)
            .or_default()
            .entry(player.to_string())
            .or_insert(0);
        *personal = personal.saturating_add(1);
        let personal_fouls = *personal;
        let team = &mut self.team[side.index()];
        *team = team.saturating_add(1);
        let team_fouls = *team;

        let free_throws = match (kind, shot) {
            (FoulKind::Offensive, _) => 0,
            (FoulKind::Shooting, Some(FouledShot { made: true, .. })) => 1,
            (FoulKind::Shooting, Some(FouledShot { value, made: false })) => value,
            _ if team_fouls >= BONUS_THRESHOLD => BONUS_FREE_THROWS,
            _ => 0,
        };
        let fouled_out = personal_fouls >= FOUL_OUT_LIMIT;
        if fouled_out {
            log::info!("{player} ({side}) fouled out with {personal_fouls} fouls");
        }
        FoulEvent {
            side,
            player: player.to_string(),
            kind,
            fouled_player: fouled_player.map(str::to_string),
            personal_fouls,
            team_fouls,
            free_throws,
            fouled_out,
        }
    }
}

/// Roll for a reach-in or holding foul on the ball handler.
pub fn non_shooting_foul_check<R: Rng + ?Sized>(
    handler: &Player,
    defender: &Player,
    rng: &mut R,
) -> (bool, TraceEntry) {
    let diff = composite(handler, weights::DRIVE) - composite(defender, weights::DISCIPLINE);
    let probability = weighted_sigmoid_probability(NON_SHOOTING_FOUL_RATE, diff, NON_SHOOTING_FOUL_K);
    roll("foul.non_shooting", probability, rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSED_TWO: Option<FouledShot> = Some(FouledShot {
        value: 2,
        made: false,
    });

    #[test]
    fn bonus_awards_free_throws_from_the_fifth_foul() {
        let mut fouls = FoulTracker::new();
        fouls.start_period(1);
        for n in 1..=4 {
            let event = fouls.record_foul(TeamSide::Home, "Guard", FoulKind::NonShooting, None, None);
            assert_eq!(event.team_fouls, n);
            assert_eq!(event.free_throws, 0, "foul {n} is before the bonus");
        }
        assert!(fouls.bonus_on_next_foul(TeamSide::Home));
        let fifth = fouls.record_foul(TeamSide::Home, "Wing", FoulKind::NonShooting, None, None);
        assert_eq!(fifth.free_throws, 2);
        assert!(!fouls.bonus_on_next_foul(TeamSide::Away));
    }

    #[test]
    fn shooting_fouls_count_toward_the_bonus() {
        let mut fouls = FoulTracker::new();
        fouls.start_period(2);
        for _ in 0..5 {
            let event = fouls.record_foul(
                TeamSide::Away,
                "Big",
                FoulKind::Shooting,
                Some("Shooter"),
                MISSED_TWO,
            );
            assert_eq!(event.free_throws, 2);
        }
        assert_eq!(fouls.team_fouls(TeamSide::Away), 5);
        let reach = fouls.record_foul(TeamSide::Away, "Guard", FoulKind::NonShooting, None, None);
        assert_eq!(reach.free_throws, 2);
    }

    #[test]
    fn shooting_foul_awards_depend_on_the_shot() {
        let mut fouls = FoulTracker::new();
        let and_one = fouls.record_foul(
            TeamSide::Home,
            "A",
            FoulKind::Shooting,
            None,
            Some(FouledShot {
                value: 3,
                made: true,
            }),
        );
        assert_eq!(and_one.free_throws, 1);
        let three = fouls.record_foul(
            TeamSide::Home,
            "A",
            FoulKind::Shooting,
            None,
            Some(FouledShot {
                value: 3,
                made: false,
            }),
        );
        assert_eq!(three.free_throws, 3);
    }

    #[test]
    fn offensive_fouls_never_award_free_throws() {
        let mut fouls = FoulTracker::new();
        for _ in 0..7 {
            let event = fouls.record_foul(TeamSide::Home, "Post", FoulKind::Offensive, None, None);
            assert_eq!(event.free_throws, 0);
        }
    }

    #[test]
    fn team_fouls_reset_but_personal_fouls_persist() {
        let mut fouls = FoulTracker::new();
        fouls.start_period(1);
        for _ in 0..3 {
            fouls.record_foul(TeamSide::Home, "Center", FoulKind::NonShooting, None, None);
        }
        fouls.start_period(2);
        assert_eq!(fouls.team_fouls(TeamSide::Home), 0);
        assert_eq!(fouls.personal_fouls(TeamSide::Home, "Center"), 3);
        for _ in 0..2 {
            fouls.record_foul(TeamSide::Home, "Center", FoulKind::LooseBall, None, None);
        }
        assert!(!fouls.is_fouled_out(TeamSide::Home, "Center"));
        let sixth = fouls.record_foul(TeamSide::Home, "Center", FoulKind::NonShooting, None, None);
        assert!(sixth.fouled_out);
        assert!(fouls.is_fouled_out(TeamSide::Home, "Center"));
        assert!(!fouls.is_fouled_out(TeamSide::Away, "Center"));
    }
}
