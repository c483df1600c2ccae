//! Team and tactics files for the runner.
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use hoopsim_game::{TacticalSettings, Team, sample_teams};

/// Load both teams, falling back to the bundled pair for any side not given.
pub fn load_teams(home: Option<&Path>, away: Option<&Path>) -> Result<(Team, Team)> {
    let (sample_home, sample_away) = sample_teams().context("bundled sample teams are invalid")?;
    let home = home.map_or(Ok(sample_home), load_team)?;
    let away = away.map_or(Ok(sample_away), load_team)?;
    Ok((home, away))
}

pub fn load_team(path: &Path) -> Result<Team> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read team file {}", path.display()))?;
    Team::from_json(&json).with_context(|| format!("invalid team file {}", path.display()))
}

/// Tactics for `team`. A file without a minutes allotment gets the default rotation's.
pub fn load_tactics(path: Option<&Path>, team: &Team) -> Result<TacticalSettings> {
    let Some(path) = path else {
        return Ok(TacticalSettings::with_default_rotation(team));
    };
    let json = fs::read_to_string(path)
        .with_context(|| format!("failed to read tactics file {}", path.display()))?;
    let mut tactics: TacticalSettings = serde_json::from_str(&json)
        .with_context(|| format!("invalid tactics file {}", path.display()))?;
    if tactics.minutes_allotment.is_empty() {
        tactics.minutes_allotment = TacticalSettings::with_default_rotation(team).minutes_allotment;
    }
    tactics
        .validate(team)
        .with_context(|| format!("tactics in {} do not fit {}", path.display(), team.name))?;
    Ok(tactics)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(label: &str, content: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("hoopsim-roster-{label}.json"));
        fs::write(&path, content).expect("write temp file");
        path
    }

    #[test]
    fn missing_paths_use_sample_teams() {
        let (home, away) = load_teams(None, None).expect("sample teams");
        assert_ne!(home.name, away.name);
        let tactics = load_tactics(None, &home).expect("default tactics");
        assert_eq!(tactics.minutes_allotment.values().sum::<u16>(), 240);
    }

    #[test]
    fn team_file_round_trips() {
        let (home, _) = sample_teams().expect("sample teams");
        let path = temp_file("team", &serde_json::to_string(&home).expect("serialize"));
        let loaded = load_team(&path).expect("load team");
        assert_eq!(loaded, home);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn partial_tactics_get_a_rotation() {
        let (home, _) = sample_teams().expect("sample teams");
        let path = temp_file("tactics", r#"{ "pace": "fast", "man_defense_pct": 30 }"#);
        let tactics = load_tactics(Some(&path), &home).expect("load tactics");
        assert_eq!(tactics.man_defense_pct, 30);
        assert_eq!(tactics.minutes_allotment.values().sum::<u16>(), 240);
        let _ = fs::remove_file(path);
    }

    #[test]
    fn unreadable_team_file_reports_the_path() {
        let err = load_team(Path::new("/nonexistent/hoopsim-team.json")).expect_err("missing");
        assert!(format!("{err:#}").contains("hoopsim-team.json"));
    }
}
