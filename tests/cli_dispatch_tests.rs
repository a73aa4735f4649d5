use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin() -> &'static str {
    env!("CARGO_BIN_EXE_pokebracket")
}

fn unique_temp_path(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("pokebracket-{name}-{stamp}.json"))
}

fn write_snapshot(name: &str) -> PathBuf {
    let path = unique_temp_path(name);
    let snapshot = serde_json::json!({
        "fetched_at": "2024-05-01T12:00:00+00:00",
        "source": "fixture",
        "contestants": [
            {"id": 1, "name": "bulbasaur", "types": ["grass", "poison"], "stats": [{"name": "total", "value": 318}]},
            {"id": 4, "name": "charmander", "types": ["fire"], "stats": [{"name": "total", "value": 309}]},
            {"id": 7, "name": "squirtle", "types": ["water"], "stats": [{"name": "total", "value": 314}]},
            {"id": 10, "name": "caterpie", "types": ["bug"], "stats": [{"name": "total", "value": 195}]}
        ],
        "categories": [
            {"name": "fire", "double_damage_to": ["grass", "bug"]},
            {"name": "water", "double_damage_to": ["fire"]},
            {"name": "grass", "double_damage_to": ["water"]}
        ]
    });
    fs::write(&path, snapshot.to_string()).expect("fixture should be written");
    path
}

#[test]
fn missing_or_unknown_command_prints_usage() {
    for args in [vec![], vec!["battle"]] {
        let output = Command::new(bin()).args(&args).output().expect("binary should run");
        assert_eq!(output.status.code(), Some(2));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("usage: pokebracket"));
    }
}

#[test]
fn run_from_snapshot_emits_json_bracket() {
    let path = write_snapshot("run-json");
    let output = Command::new(bin())
        .args(["run", "--snapshot"])
        .arg(&path)
        .args(["--seed", "3", "--format", "json"])
        .output()
        .expect("run should start");
    let _ = fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("run should emit json");
    assert_eq!(payload["rounds"].as_array().map(Vec::len), Some(2));
    assert_eq!(payload["champion"]["name"], "squirtle");
}

#[test]
fn run_from_snapshot_prints_text_by_default() {
    let path = write_snapshot("run-text");
    let output = Command::new(bin())
        .args(["run", "--snapshot"])
        .arg(&path)
        .output()
        .expect("run should start");
    let _ = fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--- Round 1 ---"));
    assert!(stdout.trim_end().ends_with("squirtle"));
}

#[test]
fn run_rejects_unknown_format() {
    let output = Command::new(bin())
        .args(["run", "--format", "xml"])
        .output()
        .expect("run should start");
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn run_with_missing_snapshot_fails() {
    let output = Command::new(bin())
        .args(["run", "--snapshot"])
        .arg(unique_temp_path("absent"))
        .output()
        .expect("run should start");
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("error:"));
}

#[test]
fn odds_over_snapshot_counts_every_run() {
    let path = write_snapshot("odds");
    let output = Command::new(bin())
        .arg("odds")
        .arg(&path)
        .args(["50", "11"])
        .env("POKEBRACKET_POOL_SIZE", "4")
        .env_remove("POKEBRACKET_CONFIG")
        .output()
        .expect("odds should start");
    let _ = fs::remove_file(&path);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    let payload: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("odds should emit json");
    assert_eq!(payload["config"]["runs"], 50);
    let titles: u64 = payload["champions"]
        .as_array()
        .expect("champions array")
        .iter()
        .map(|c| c["titles"].as_u64().expect("titles"))
        .sum();
    assert_eq!(titles, 50);
}

#[test]
fn fetch_without_path_prints_usage() {
    let output = Command::new(bin()).arg("fetch").output().expect("fetch should start");
    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("usage: pokebracket fetch"));
}
