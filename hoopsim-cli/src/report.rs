//! Console and JSON renderings of a finished game.
use anyhow::Result;
use colored::Colorize;
use std::io::Write;

use hoopsim_game::numbers::{ceil_seconds, round_f64_to_u16};
use hoopsim_game::{
    GameResult, PlayByPlay, PlayEvent, PlayerLine, PossessionEntry, StatLine, TeamBox, TeamSide,
};

pub fn write_json(out: &mut dyn Write, result: &GameResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    writeln!(out, "{json}")?;
    Ok(())
}

pub fn write_console(out: &mut dyn Write, result: &GameResult, verbose: bool) -> Result<()> {
    writeln!(
        out,
        "{} {} @ {} {}",
        result.away.bold(),
        result.final_score.away,
        result.home.bold(),
        result.final_score.home
    )?;
    match result.winner() {
        Some(side) => writeln!(out, "Winner: {}", result.team_name(side).green())?,
        None => writeln!(out, "{}", "Tied after the overtime limit".yellow())?,
    }
    writeln!(out)?;
    write_period_line(out, result)?;
    for side in [TeamSide::Away, TeamSide::Home] {
        writeln!(out)?;
        write_team_box(out, result.box_score.team(side))?;
    }
    if verbose {
        writeln!(out)?;
        write_play_by_play(out, &result.play_by_play)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "seed {}  draws {}  digest {}",
        result.seed,
        result.rng_draws,
        result.digest.dimmed()
    )?;
    Ok(())
}

fn period_label(period: u8) -> String {
    if period <= 4 {
        format!("Q{period}")
    } else {
        format!("OT{}", period - 4)
    }
}

fn write_period_line(out: &mut dyn Write, result: &GameResult) -> Result<()> {
    let header: String = result
        .period_scores
        .iter()
        .map(|p| format!("{:>5}", period_label(p.period)))
        .collect();
    writeln!(out, "{:<24}{header}{:>6}", "", "T")?;
    for side in [TeamSide::Away, TeamSide::Home] {
        let cells: String = result
            .period_scores
            .iter()
            .map(|p| {
                let points = match side {
                    TeamSide::Home => p.home,
                    TeamSide::Away => p.away,
                };
                format!("{points:>5}")
            })
            .collect();
        writeln!(
            out,
            "{:<24}{cells}{:>6}",
            result.team_name(side),
            result.final_score.get(side)
        )?;
    }
    Ok(())
}

fn made_attempted(made: u16, attempted: u16) -> String {
    format!("{made}-{attempted}")
}

fn stat_cells(stats: &StatLine) -> String {
    format!(
        "{:>4} {:>6} {:>6} {:>6} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}",
        stats.pts,
        made_attempted(stats.fgm, stats.fga),
        made_attempted(stats.fg3m, stats.fg3a),
        made_attempted(stats.ftm, stats.fta),
        stats.rebounds(),
        stats.ast,
        stats.stl,
        stats.blk,
        stats.tov,
        stats.pf
    )
}

fn player_row(line: &PlayerLine) -> String {
    let marker = if line.starter { "*" } else { " " };
    format!(
        "{marker}{:<22} {:>3} {:>4} {}",
        line.name,
        line.position.as_str(),
        round_f64_to_u16(line.minutes),
        stat_cells(&line.stats)
    )
}

fn write_team_box(out: &mut dyn Write, team: &TeamBox) -> Result<()> {
    writeln!(out, "{}", team.name.bright_cyan().bold())?;
    writeln!(
        out,
        "{:<23} {:>3} {:>4} {:>4} {:>6} {:>6} {:>6} {:>4} {:>4} {:>4} {:>4} {:>4} {:>4}",
        "PLAYER", "POS", "MIN", "PTS", "FG", "3P", "FT", "REB", "AST", "STL", "BLK", "TOV", "PF"
    )?;
    for line in team.players.iter().filter(|line| line.minutes > 0.0) {
        writeln!(out, "{}", player_row(line))?;
    }
    writeln!(
        out,
        "{:<23} {:>3} {:>4} {}",
        "TOTAL".bold(),
        "",
        "",
        stat_cells(&team.totals)
    )?;
    let pct = |value: Option<f64>| value.map_or_else(|| String::from("-"), |v| format!("{:.1}%", v * 100.0));
    writeln!(
        out,
        "FG {}  3P {}  FT {}",
        pct(team.totals.field_goal_pct()),
        pct(team.totals.three_point_pct()),
        pct(team.totals.free_throw_pct())
    )?;
    Ok(())
}

/// `m:ss`, rounding partial seconds up.
fn clock(seconds: f64) -> String {
    let whole = ceil_seconds(seconds);
    format!("{}:{:02}", whole / 60, whole % 60)
}

fn possession_line(entry: &PossessionEntry) -> String {
    let result = &entry.result;
    let summary = result
        .events
        .iter()
        .filter_map(|event| match event {
            PlayEvent::Shot {
                shooter, shot, made, ..
            } => Some(format!(
                "{shooter} {} {}",
                shot.as_str(),
                if *made { "good" } else { "miss" }
            )),
            PlayEvent::Turnover {
                player, turnover, ..
            } => Some(format!("{player} {}", turnover.as_str())),
            PlayEvent::Foul(foul) => Some(format!("{} {} foul", foul.player, foul.kind.as_str())),
            PlayEvent::FreeThrow {
                shooter,
                made,
                attempt,
                of,
                ..
            } => Some(format!(
                "{shooter} FT {attempt}/{of} {}",
                if *made { "good" } else { "miss" }
            )),
            PlayEvent::Rebound { player, .. } => Some(format!("{player} rebound")),
            PlayEvent::Kickout { .. } => None,
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{:>4} {:>5} {:<4} {summary} [{}-{}]",
        period_label(entry.period),
        clock(entry.clock),
        result.offense.as_str(),
        entry.score.away,
        entry.score.home
    )
}

fn write_play_by_play(out: &mut dyn Write, transcript: &[PlayByPlay]) -> Result<()> {
    writeln!(out, "{}", "Play-by-play".bright_yellow().bold())?;
    for entry in transcript {
        match entry {
            PlayByPlay::JumpBall { period, winner } => {
                writeln!(out, "{:>4} jump ball to {winner}", period_label(*period))?;
            }
            PlayByPlay::PeriodStart { .. } => {}
            PlayByPlay::Substitution {
                period,
                clock: at,
                substitution,
                ..
            } => writeln!(
                out,
                "{:>4} {:>5} {} in for {} ({:?})",
                period_label(*period),
                clock(*at),
                substitution.into,
                substitution.out,
                substitution.reason
            )?,
            PlayByPlay::Stranded {
                period,
                clock: at,
                player,
                ..
            } => writeln!(
                out,
                "{:>4} {:>5} {} stays in, no eligible replacement",
                period_label(*period),
                clock(*at),
                player.red()
            )?,
            PlayByPlay::Timeout {
                period,
                clock: at,
                timeout,
                ..
            } => writeln!(
                out,
                "{:>4} {:>5} timeout {}",
                period_label(*period),
                clock(*at),
                timeout.side
            )?,
            PlayByPlay::Possession(possession) => writeln!(out, "{}", possession_line(possession))?,
            PlayByPlay::PeriodEnd { period, score } => writeln!(
                out,
                "{:>4} end {}-{}",
                period_label(*period),
                score.away,
                score.home
            )?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoopsim_game::{TacticalSettings, sample_teams, simulate_game};

    fn game() -> GameResult {
        let (home, away) = sample_teams().expect("sample teams");
        let home_tactics = TacticalSettings::with_default_rotation(&home);
        let away_tactics = TacticalSettings::with_default_rotation(&away);
        simulate_game(&home, &away, &home_tactics, &away_tactics, 5).expect("valid game")
    }

    #[test]
    fn clock_rounds_up() {
        assert_eq!(clock(720.0), "12:00");
        assert_eq!(clock(59.2), "1:00");
        assert_eq!(clock(0.4), "0:01");
        assert_eq!(clock(0.0), "0:00");
    }

    #[test]
    fn period_labels() {
        assert_eq!(period_label(4), "Q4");
        assert_eq!(period_label(6), "OT2");
    }

    #[test]
    fn console_report_lists_both_teams() {
        colored::control::set_override(false);
        let result = game();
        let mut buffer = Vec::new();
        write_console(&mut buffer, &result, true).expect("render");
        let text = String::from_utf8(buffer).expect("utf8");
        assert!(text.contains(&result.home));
        assert!(text.contains(&result.away));
        assert!(text.contains("Play-by-play"));
        assert!(text.contains(&result.digest));
    }

    #[test]
    fn json_report_parses_back() {
        let result = game();
        let mut buffer = Vec::new();
        write_json(&mut buffer, &result).expect("render");
        let value: serde_json::Value = serde_json::from_slice(&buffer).expect("json");
        assert_eq!(value["digest"], serde_json::Value::String(result.digest.clone()));
    }
}
