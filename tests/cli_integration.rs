// Drives the compiled binary end to end against a throwaway database.

use assert_cmd::Command;
use serde_json::Value;
use std::collections::HashSet;
use tempfile::{tempdir, TempDir};

fn checotype(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("checotype").unwrap();
    cmd.arg("--config")
        .arg(dir.path().join("config.json"))
        .arg("--db")
        .arg(dir.path().join("results.db"))
        .env_remove("RUST_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> Value {
    let output = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&output).unwrap()
}

#[test]
fn words_default_count_has_no_repeats() {
    let dir = tempdir().unwrap();
    let json = stdout_json(checotype(&dir).args(["words", "--count", "0"]));

    let words = json["words"].as_array().unwrap();
    assert_eq!(words.len(), 200);
    let unique: HashSet<&str> = words.iter().map(|w| w.as_str().unwrap()).collect();
    assert_eq!(unique.len(), 200);
}

#[test]
fn words_negative_count_and_unknown_language() {
    let dir = tempdir().unwrap();
    let json = stdout_json(checotype(&dir).args(["words", "--lang", "xx", "--count", "-5"]));
    assert_eq!(json["words"].as_array().unwrap().len(), 200);
}

#[test]
fn words_from_directory_missing_asset_is_empty() {
    let dir = tempdir().unwrap();
    let words_dir = dir.path().join("words");
    std::fs::create_dir_all(&words_dir).unwrap();
    std::fs::write(words_dir.join("es.txt"), "casa\nperro\nel\n").unwrap();

    let mut cmd = checotype(&dir);
    cmd.arg("--words-dir").arg(&words_dir);
    let json = stdout_json(cmd.args(["words", "--lang", "es", "--count", "6"]));
    let words: Vec<&str> = json["words"]
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w.as_str().unwrap())
        .collect();
    assert_eq!(words.len(), 6);
    assert!(words.iter().all(|w| *w == "casa" || *w == "perro"));

    let mut cmd = checotype(&dir);
    cmd.arg("--words-dir").arg(&words_dir);
    let json = stdout_json(cmd.args(["words", "--lang", "fr", "--count", "6"]));
    assert!(json["words"].as_array().unwrap().is_empty());
}

#[test]
fn submit_then_summarize() {
    let dir = tempdir().unwrap();

    for (wpm, accuracy) in [(40, 90), (60, 150), (80, 97)] {
        let payload = format!(
            r#"{{"wpm": {wpm}, "rawWpm": {raw}, "accuracy": {accuracy}, "duration": 30,
                "chars": 100, "correctChars": 95, "incorrectChars": 5, "extraChars": 1,
                "missedChars": 2, "language": "en", "capsEnabled": true}}"#,
            raw = wpm + 4
        );
        let json = stdout_json(checotype(&dir).args(["submit", "--user", "7", "--payload", &payload]));
        assert_eq!(json["ok"], true);
    }

    let summary = stdout_json(checotype(&dir).args(["summary", "--user", "7"]));
    assert_eq!(summary["avg_wpm"], 60);
    assert_eq!(summary["fastest_wpm"], 80);
    assert_eq!(summary["fastest_raw_wpm"], 84);
    assert_eq!(summary["best_accuracy"], 100);
    assert_eq!(summary["avg_accuracy"], 96);
    assert_eq!(summary["total_tests"], 3);
    assert_eq!(summary["current_streak"], 1);
    assert_eq!(summary["longest_streak"], 1);
    assert_eq!(summary["correct_chars"], 285);
    assert_eq!(summary["missed_chars"], 6);
}

#[test]
fn submit_from_stdin() {
    let dir = tempdir().unwrap();
    let json = stdout_json(
        checotype(&dir)
            .args(["submit", "--user", "1"])
            .write_stdin(r#"{"wpm": 55, "duration": 15}"#),
    );
    assert_eq!(json["ok"], true);
    assert_eq!(json["id"], 1);
}

#[test]
fn submit_zero_duration_is_rejected_and_not_stored() {
    let dir = tempdir().unwrap();
    let output = checotype(&dir)
        .args(["submit", "--user", "3", "--payload", r#"{"wpm": 70, "duration": 0}"#])
        .assert()
        .failure()
        .code(2)
        .get_output()
        .stderr
        .clone();
    let stderr = String::from_utf8(output).unwrap();
    assert!(stderr.contains("invalid duration"), "stderr was: {stderr}");

    let summary = stdout_json(checotype(&dir).args(["summary", "--user", "3"]));
    assert_eq!(summary["total_tests"], 0);
}

#[test]
fn submit_non_numeric_field_is_rejected() {
    let dir = tempdir().unwrap();
    checotype(&dir)
        .args(["submit", "--user", "3", "--payload", r#"{"wpm": "fast", "duration": 10}"#])
        .assert()
        .code(2);
}

#[test]
fn summary_for_new_user_is_all_zero() {
    let dir = tempdir().unwrap();
    let summary = stdout_json(checotype(&dir).args(["summary", "--user", "99"]));
    for (key, value) in summary.as_object().unwrap() {
        assert_eq!(value, 0, "{key} should be zero");
    }
}

#[test]
fn history_csv_lists_newest_first() {
    let dir = tempdir().unwrap();
    for wpm in [30, 31, 32] {
        let payload = format!(r#"{{"wpm": {wpm}, "duration": 20}}"#);
        checotype(&dir)
            .args(["submit", "--user", "5", "--payload", &payload])
            .assert()
            .success();
    }

    let output = checotype(&dir)
        .args(["history", "--user", "5", "--limit", "2", "--format", "csv"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let csv = String::from_utf8(output).unwrap();
    let rows: Vec<&str> = csv.lines().collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[1].contains(",32,"));
    assert!(rows[2].contains(",31,"));
}

#[test]
fn config_save_persists_overrides() {
    let dir = tempdir().unwrap();
    let json = stdout_json(checotype(&dir).args(["config", "--save"]));
    assert_eq!(json["default_language"], "en");

    let saved = std::fs::read_to_string(dir.path().join("config.json")).unwrap();
    let saved: Value = serde_json::from_str(&saved).unwrap();
    assert!(saved["database_path"]
        .as_str()
        .unwrap()
        .ends_with("results.db"));
}
