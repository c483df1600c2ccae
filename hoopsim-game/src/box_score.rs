//! Player and team box scores built from possession events.
use serde::{Deserialize, Serialize};

use crate::player::Position;
use crate::possession::{PlayEvent, PossessionResult};
use crate::shooting::ShotType;
use crate::team::{Team, TeamSide};

/// Counting stats shared by player lines and team totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatLine {
    pub pts: u16,
    pub fgm: u16,
    pub fga: u16,
    pub fg3m: u16,
    pub fg3a: u16,
    pub ftm: u16,
    pub fta: u16,
    pub oreb: u16,
    pub dreb: u16,
    pub ast: u16,
    pub stl: u16,
    pub blk: u16,
    pub tov: u16,
    pub pf: u16,
}

impl StatLine {
    #[must_use]
    pub const fn rebounds(&self) -> u16 {
        self.oreb + self.dreb
    }

    #[must_use]
    pub fn field_goal_pct(&self) -> Option<f64> {
        (self.fga > 0).then(|| f64::from(self.fgm) / f64::from(self.fga))
    }

    #[must_use]
    pub fn three_point_pct(&self) -> Option<f64> {
        (self.fg3a > 0).then(|| f64::from(self.fg3m) / f64::from(self.fg3a))
    }

    #[must_use]
    pub fn free_throw_pct(&self) -> Option<f64> {
        (self.fta > 0).then(|| f64::from(self.ftm) / f64::from(self.fta))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerLine {
    pub name: String,
    pub position: Position,
    pub starter: bool,
    pub minutes: f64,
    pub stats: StatLine,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamBox {
    pub name: String,
    pub totals: StatLine,
    pub players: Vec<PlayerLine>,
}

impl TeamBox {
    fn new(team: &Team) -> Self {
        Self {
            name: team.name.clone(),
            totals: StatLine::default(),
            players: team
                .roster
                .iter()
                .map(|player| PlayerLine {
                    name: player.name.clone(),
                    position: player.position,
                    starter: false,
                    minutes: 0.0,
                    stats: StatLine::default(),
                })
                .collect(),
        }
    }

    #[must_use]
    pub fn player(&self, name: &str) -> Option<&PlayerLine> {
        self.players.iter().find(|line| line.name == name)
    }

    /// Apply `update` to the named player's line and the team totals.
    fn credit(&mut self, name: &str, update: impl Fn(&mut StatLine)) {
        update(&mut self.totals);
        match self.players.iter_mut().find(|line| line.name == name) {
            Some(line) => update(&mut line.stats),
            None => log::warn!("box score: no line for {name} on {}", self.name),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxScore {
    pub home: TeamBox,
    pub away: TeamBox,
}

impl BoxScore {
    #[must_use]
    pub fn new(home: &Team, away: &Team) -> Self {
        Self {
            home: TeamBox::new(home),
            away: TeamBox::new(away),
        }
    }

    #[must_use]
    pub const fn team(&self, side: TeamSide) -> &TeamBox {
        match side {
            TeamSide::Home => &self.home,
            TeamSide::Away => &self.away,
        }
    }

    pub fn team_mut(&mut self, side: TeamSide) -> &mut TeamBox {
        match side {
            TeamSide::Home => &mut self.home,
            TeamSide::Away => &mut self.away,
        }
    }

    /// Credit every event of a possession.
    pub fn record(&mut self, result: &PossessionResult) {
        for event in &result.events {
            self.record_event(event);
        }
    }

    fn record_event(&mut self, event: &PlayEvent) {
        match event {
            PlayEvent::Shot {
                side,
                shooter,
                shot,
                made,
                fouled,
                blocked_by,
                assisted_by,
                ..
            } => {
                // Fouled misses are not field-goal attempts.
                if *fouled && !*made {
                    return;
                }
                let three = *shot == ShotType::ThreePoint;
                let (made, value) = (*made, u16::from(shot.value()));
                self.team_mut(*side).credit(shooter, |line| {
                    line.fga += 1;
                    if three {
                        line.fg3a += 1;
                    }
                    if made {
                        line.fgm += 1;
                        line.pts += value;
                        if three {
                            line.fg3m += 1;
                        }
                    }
                });
                if let Some(passer) = assisted_by {
                    self.team_mut(*side).credit(passer, |line| line.ast += 1);
                }
                if let Some(blocker) = blocked_by {
                    self.team_mut(side.other()).credit(blocker, |line| line.blk += 1);
                }
            }
            PlayEvent::Rebound {
                side,
                player,
                offensive,
            } => {
                let offensive = *offensive;
                self.team_mut(*side).credit(player, |line| {
                    if offensive {
                        line.oreb += 1;
                    } else {
                        line.dreb += 1;
                    }
                });
            }
            PlayEvent::Turnover {
                side,
                player,
                stolen_by,
                ..
            } => {
                self.team_mut(*side).credit(player, |line| line.tov += 1);
                if let Some(thief) = stolen_by {
                    self.team_mut(side.other()).credit(thief, |line| line.stl += 1);
                }
            }
            PlayEvent::Foul(foul) => {
                self.team_mut(foul.side).credit(&foul.player, |line| line.pf += 1);
            }
            PlayEvent::FreeThrow {
                side, shooter, made, ..
            } => {
                let made = *made;
                self.team_mut(*side).credit(shooter, |line| {
                    line.fta += 1;
                    if made {
                        line.ftm += 1;
                        line.pts += 1;
                    }
                });
            }
            PlayEvent::Kickout { .. } => {}
        }
    }
}
