use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "hoopsim-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_writes_json_report() {
    let exe = env!("CARGO_BIN_EXE_hoopsim");
    let output_path = temp_path("json");
    let status = Command::new(exe)
        .args(["--seed", "42", "--report", "json", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(&output_path).expect("read output");
    let value: serde_json::Value = serde_json::from_str(&content).expect("json report");
    assert_eq!(value["seed"], 42);
    assert!(value["play_by_play"].as_array().is_some_and(|entries| !entries.is_empty()));
    let _ = std::fs::remove_file(output_path);
}

#[test]
fn cli_same_seed_same_report() {
    let exe = env!("CARGO_BIN_EXE_hoopsim");
    let run = || {
        Command::new(exe)
            .args(["--seed", "9", "--report", "json"])
            .output()
            .expect("run cli")
    };
    let first = run();
    let second = run();
    assert!(first.status.success());
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn cli_console_report_shows_box_score() {
    let exe = env!("CARGO_BIN_EXE_hoopsim");
    let output = Command::new(exe)
        .args(["--seed", "3", "--verbose"])
        .env("NO_COLOR", "1")
        .output()
        .expect("run cli");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("HoopSim"));
    assert!(stdout.contains("PLAYER"));
    assert!(stdout.contains("Play-by-play"));
}

#[test]
fn cli_rejects_bad_team_file() {
    let exe = env!("CARGO_BIN_EXE_hoopsim");
    let team_path = temp_path("bad-team");
    std::fs::write(&team_path, r#"{ "name": "Empty", "roster": [] }"#).expect("write team");
    let output = Command::new(exe)
        .arg("--home")
        .arg(&team_path)
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid team file"), "{stderr}");
    let _ = std::fs::remove_file(team_path);
}
