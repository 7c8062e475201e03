#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;
use tempfile::TempDir;

fn cc(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("command-center").unwrap();
    cmd.env("OPENCLAW_HOME", home.path())
        .env_remove("OPENCLAW_AGENT_ID")
        .env_remove("OPENCLAW_THINKING")
        .env_remove("OPENCLAW_AGENT_TIMEOUT");
    cmd
}

fn write_config(home: &Path, yaml: &str) {
    let dir = home.join("dashboard");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("config.yaml"), yaml).unwrap();
}

fn project_json(home: &TempDir, name: &str, path: &str) -> serde_json::Value {
    let out = cc(home)
        .args(["--json", "project", "create", name, path])
        .output()
        .unwrap();
    assert!(out.status.success());
    serde_json::from_slice(&out.stdout).unwrap()
}

// ---------------------------------------------------------------------------
// project
// ---------------------------------------------------------------------------

#[test]
fn project_list_is_empty_on_fresh_home() {
    let home = TempDir::new().unwrap();
    cc(&home)
        .args(["project", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No projects."));
    assert!(home.path().join("workspace").is_dir());
    assert!(home.path().join("dashboard").is_dir());
}

#[test]
fn project_create_then_list() {
    let home = TempDir::new().unwrap();
    cc(&home)
        .args(["project", "create", "Alpha", "clients/alpha"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created project 'Alpha'"));
    assert!(home.path().join("workspace/clients/alpha").is_dir());

    cc(&home)
        .args(["project", "create", "Beta", "beta"])
        .assert()
        .success();

    let out = cc(&home).args(["project", "list", "--json"]).output().unwrap();
    assert!(out.status.success());
    let list: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Beta", "Alpha"]);
    assert_eq!(list[1]["pathRelative"], "clients/alpha");
}

#[test]
fn project_create_rejects_escaping_path() {
    let home = TempDir::new().unwrap();
    cc(&home)
        .args(["project", "create", "Evil", "../outside"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:"));
    assert!(!home.path().join("outside").exists());
}

// ---------------------------------------------------------------------------
// vault
// ---------------------------------------------------------------------------

#[test]
fn vault_set_then_keys_never_prints_values() {
    let home = TempDir::new().unwrap();
    cc(&home)
        .args(["vault", "set", "API_KEY=s3cret", "DSN=pg://h/db?x=1"])
        .assert()
        .success();

    cc(&home)
        .args(["vault", "keys"])
        .assert()
        .success()
        .stdout(predicate::str::contains("API_KEY"))
        .stdout(predicate::str::contains("DSN"))
        .stdout(predicate::str::contains("s3cret").not());

    let content = std::fs::read_to_string(home.path().join(".env")).unwrap();
    assert!(content.contains("DSN=pg://h/db?x=1"));
}

#[test]
fn vault_rejects_invalid_key_and_keeps_file() {
    let home = TempDir::new().unwrap();
    cc(&home).args(["vault", "set", "GOOD=1"]).assert().success();
    cc(&home)
        .args(["vault", "set", "OK=2", "bad key=3"])
        .assert()
        .failure();

    cc(&home)
        .args(["vault", "keys"])
        .assert()
        .success()
        .stdout(predicate::str::contains("GOOD"))
        .stdout(predicate::str::contains("OK").not());
}

#[test]
fn vault_set_requires_equals() {
    let home = TempDir::new().unwrap();
    cc(&home)
        .args(["vault", "set", "NOVALUE"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("KEY=VALUE"));
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

#[test]
fn run_unknown_project_fails() {
    let home = TempDir::new().unwrap();
    cc(&home)
        .args(["run", "does-not-exist"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Project not found"));
}

#[test]
fn run_rejects_unknown_mode() {
    let home = TempDir::new().unwrap();
    let project = project_json(&home, "Alpha", "alpha");
    cc(&home)
        .args(["run", project["id"].as_str().unwrap(), "--mode", "deploy"])
        .assert()
        .failure();
}

#[cfg(unix)]
#[test]
fn run_succeeds_with_configured_commands() {
    let home = TempDir::new().unwrap();
    write_config(
        home.path(),
        "commands:\n  install: [\"true\"]\n  build: [\"sh\", \"-c\", \"echo built\"]\n",
    );
    let project = project_json(&home, "Alpha", "alpha");

    let out = cc(&home)
        .args(["--json", "run", project["id"].as_str().unwrap()])
        .output()
        .unwrap();
    assert!(out.status.success());
    let outcome: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(outcome["status"], "success");
    assert_eq!(outcome["healed"], false);
    assert!(outcome["output"].as_str().unwrap().contains("built"));

    let log = home.path().join("workspace/alpha/.command-center/run-build.log");
    let log = std::fs::read_to_string(log).unwrap();
    assert!(log.contains("built"));
}

#[cfg(unix)]
#[test]
fn run_failing_build_exits_nonzero_after_repair_attempt() {
    let home = TempDir::new().unwrap();
    write_config(
        home.path(),
        "commands:\n  install: [\"true\"]\n  build: [\"sh\", \"-c\", \"echo broken >&2; exit 2\"]\nagent:\n  executable: /nonexistent/openclaw\n",
    );
    let project = project_json(&home, "Alpha", "alpha");

    cc(&home)
        .args(["run", project["id"].as_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken"));
}

// ---------------------------------------------------------------------------
// prompt
// ---------------------------------------------------------------------------

#[test]
fn prompt_without_text_fails() {
    let home = TempDir::new().unwrap();
    cc(&home)
        .arg("prompt")
        .assert()
        .failure()
        .stderr(predicate::str::contains("prompt required"));
}

#[test]
fn prompt_with_missing_agent_fails() {
    let home = TempDir::new().unwrap();
    write_config(home.path(), "agent:\n  executable: /nonexistent/openclaw\n");
    cc(&home)
        .args(["prompt", "hello"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error:"));
}
