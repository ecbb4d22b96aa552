#![forbid(unsafe_code)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

const CONFIG: &str = r#"
oncall_generator:
  schedule_duration: 1w
  public_holiday_calendar_file: holidays.yaml
  members:
    - name: Alice
      email: alice@example.com
      constraints:
        timezone: America/New_York
        earliest_oncall_hour: 18
        latest_oncall_hour: 30
        public_holidays:
          country_name: US
    - name: Kenji
      email: kenji@example.com
      constraints:
        timezone: Asia/Tokyo
        earliest_oncall_hour: 9
        latest_oncall_hour: 17
  shifts:
    - name: weekend_noram
      days: [Saturday, Sunday]
      start_time: "22:00 UTC"
      end_time: "06:00 UTC"
"#;

const HOLIDAYS: &str = "years:\n  2025:\n    US:\n      - Jul 4\n      - Jul 5\n";

fn workspace(config: &str) -> tempfile::TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("oncall.yaml"), config).unwrap();
    fs::write(dir.path().join("holidays.yaml"), HOLIDAYS).unwrap();
    dir
}

fn cli() -> Command {
    Command::cargo_bin("oncall-gen").unwrap()
}

#[test]
fn generate_prints_availability_and_exports() {
    let dir = workspace(CONFIG);
    let json = dir.path().join("report.json");
    cli()
        .current_dir(dir.path())
        .args(["generate", "--now", "2025-07-02T12:00:00Z", "--assign", "--out-json"])
        .arg(&json)
        .assert()
        .success()
        .stdout(predicate::str::contains("Shift availability for shift weekend_noram:"))
        .stdout(predicate::str::contains("(public holiday: 2025-07-05)"))
        .stdout(predicate::str::contains("-> Alice <alice@example.com>"))
        .stdout(predicate::str::contains("Kenji").not());

    let report: serde_json::Value = serde_json::from_slice(&fs::read(&json).unwrap()).unwrap();
    assert_eq!(report["uncovered"], 0);
    assert_eq!(report["assignments"]["rows"].as_array().unwrap().len(), 2);
}

#[test]
fn uncovered_shifts_exit_with_code_two() {
    let dir = workspace(CONFIG);
    cli()
        .current_dir(dir.path())
        .args(["gen", "--now", "2025-01-08T12:00:00Z"])
        .assert()
        .code(2)
        .stdout(predicate::str::contains(
            "WARNING: found 2 shift(s) without available oncalls",
        ));
}

#[test]
fn invalid_weekday_is_fatal() {
    let dir = workspace(&CONFIG.replace("[Saturday, Sunday]", "[Saturday, Sundae]"));
    cli()
        .current_dir(dir.path())
        .args(["generate", "--now", "2025-07-02T12:00:00Z"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid weekday \"Sundae\""))
        .stdout(predicate::str::contains("Shift availability").not());
}

#[test]
fn holidays_command_renders_json_calendar() {
    let dir = workspace(CONFIG);
    cli()
        .current_dir(dir.path())
        .args(["holidays", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"Jul 4\""));
}

#[test]
fn holidays_command_renders_yaml_calendar() {
    let dir = workspace(CONFIG);
    cli()
        .current_dir(dir.path())
        .args(["holidays", "--format", "yaml"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("years:"))
        .stdout(predicate::str::contains("- Jul 4"))
        .stdout(predicate::str::contains("- Jul 5"));
}

#[test]
fn show_config_lists_members() {
    let dir = workspace(CONFIG);
    cli()
        .arg("--config")
        .arg(dir.path().join("oncall.yaml"))
        .arg("show-config")
        .assert()
        .success()
        .stdout(predicate::str::contains("1) Alice <alice@example.com>"))
        .stdout(predicate::str::contains("- latest hour     : 30"))
        .stdout(predicate::str::contains("- weekend_noram: Saturday, Sunday from 22:00 UTC to 06:00 UTC"));
}

#[test]
fn config_example_needs_no_config_file() {
    let dir = tempdir().unwrap();
    cli()
        .current_dir(dir.path())
        .arg("config-example")
        .assert()
        .success()
        .stdout(predicate::str::contains("oncall_generator:"));
}
