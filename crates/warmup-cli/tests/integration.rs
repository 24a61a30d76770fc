#![allow(deprecated)]
use assert_cmd::Command;
use chrono::{Duration, SecondsFormat, Utc};
use predicates::prelude::*;
use tempfile::TempDir;

fn warmup(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("warmup").unwrap();
    cmd.current_dir(dir.path()).env("WARMUP_ROOT", dir.path());
    cmd
}

fn init_project(dir: &TempDir) {
    warmup(dir).arg("init").assert().success();
}

fn days_ago(days: i64) -> String {
    (Utc::now() - Duration::days(days)).to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn register(dir: &TempDir, name: &str, age_days: i64, karma: i64) {
    warmup(dir)
        .args(["account", "register", name, "--created-at"])
        .arg(days_ago(age_days))
        .args(["--karma", &karma.to_string()])
        .assert()
        .success();
}

fn json_of(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.arg("--json").assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).unwrap()
}

// ---------------------------------------------------------------------------
// warmup init
// ---------------------------------------------------------------------------

#[test]
fn init_creates_store_and_config() {
    let dir = TempDir::new().unwrap();
    warmup(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("created: .warmup/config.yaml"));

    assert!(dir.path().join(".warmup").is_dir());
    assert!(dir.path().join(".warmup/config.yaml").exists());
    assert!(dir.path().join(".warmup/accounts.db").exists());
}

#[test]
fn init_is_idempotent() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    warmup(&dir)
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("exists:  .warmup/config.yaml"));
}

#[test]
fn commands_before_init_fail() {
    let dir = TempDir::new().unwrap();
    warmup(&dir)
        .args(["account", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("warmup init"));
}

// ---------------------------------------------------------------------------
// warmup account
// ---------------------------------------------------------------------------

#[test]
fn register_and_list() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "first_acct", 0, 0);
    register(&dir, "second_acct", 3, 12);

    warmup(&dir)
        .args(["account", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("first_acct"))
        .stdout(predicate::str::contains("second_acct"));

    let accounts = json_of(warmup(&dir).args(["account", "list"]));
    let names: Vec<&str> = accounts
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["first_acct", "second_acct"]);
    assert_eq!(accounts[0]["stage"], "new");
    assert_eq!(accounts[0]["status"], "warming_up");
}

#[test]
fn register_rejects_duplicate_and_bad_names() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "only_one", 0, 0);

    warmup(&dir)
        .args(["account", "register", "ONLY_ONE", "--created-at"])
        .arg(days_ago(0))
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    warmup(&dir)
        .args(["account", "register", "x", "--created-at"])
        .arg(days_ago(0))
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid username"));
}

#[test]
fn show_unknown_account_fails() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    warmup(&dir)
        .args(["account", "show", "nobody_here"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("account not found"));
}

// ---------------------------------------------------------------------------
// warmup action
// ---------------------------------------------------------------------------

#[test]
fn new_account_may_not_upvote() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "fresh_one", 0, 0);

    warmup(&dir)
        .args(["action", "check", "fresh_one", "upvote"])
        .assert()
        .success()
        .stdout(predicate::str::contains("denied"))
        .stdout(predicate::str::contains("stage-insufficient"));
}

#[test]
fn record_then_check_is_cooling_down() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "busy_one", 6, 20);

    let before = json_of(warmup(&dir).args(["action", "check", "busy_one", "comment"]));
    assert_eq!(before["permission"]["verdict"], "permitted");

    warmup(&dir)
        .args(["action", "record", "busy_one", "--kind", "comment"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 today"));

    let after = json_of(warmup(&dir).args(["action", "check", "busy_one", "upvote"]));
    assert_eq!(after["permission"]["verdict"], "denied");
    assert_eq!(after["permission"]["reason"], "cooling-down");
}

#[test]
fn failed_record_does_not_start_cooldown() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "unlucky", 6, 20);

    warmup(&dir)
        .args(["action", "record", "unlucky", "--failed"])
        .assert()
        .success();

    let check = json_of(warmup(&dir).args(["action", "check", "unlucky", "upvote"]));
    assert_eq!(check["permission"]["verdict"], "permitted");
}

#[test]
fn suspended_account_is_blocked() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "troubled", 30, 500);

    warmup(&dir)
        .args(["account", "set-status", "troubled", "suspended", "--reason", "manual review"])
        .assert()
        .success();

    let check = json_of(warmup(&dir).args(["action", "check", "troubled", "upvote"]));
    assert_eq!(check["permission"]["reason"], "status-blocked");
}

// ---------------------------------------------------------------------------
// warmup sweep / status / activity
// ---------------------------------------------------------------------------

#[test]
fn sweep_advances_and_activates() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "old_hand", 40, 900);
    register(&dir, "newcomer", 0, 0);

    let report = json_of(warmup(&dir).arg("sweep"));
    assert_eq!(report["processed"], 2);
    assert_eq!(report["advanced"], 1);
    assert_eq!(report["fully_warmed"], 1);
    assert_eq!(report["stages"]["ready"], 1);
    assert_eq!(report["stages"]["new"], 1);

    let shown = json_of(warmup(&dir).args(["account", "show", "old_hand"]));
    assert_eq!(shown["stage"], "ready");
    assert_eq!(shown["status"], "active");
}

fn register_for(dir: &TempDir, name: &str, client: &str, org: &str) {
    warmup(dir)
        .args(["account", "register", name, "--created-at"])
        .arg(days_ago(40))
        .args(["--karma", "900", "--client", client, "--org", org])
        .assert()
        .success();
}

#[test]
fn list_filters_by_client_and_org() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register_for(&dir, "acme_east", "acme", "north");
    register_for(&dir, "acme_west", "acme", "south");
    register_for(&dir, "globex_one", "globex", "north");

    let acme = json_of(warmup(&dir).args(["account", "list", "--client", "acme"]));
    let names: Vec<_> = acme
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, ["acme_east", "acme_west"]);

    let north = json_of(warmup(&dir).args(["account", "list", "--client", "acme", "--org", "north"]));
    assert_eq!(north.as_array().unwrap().len(), 1);
    assert_eq!(north[0]["username"], "acme_east");

    warmup(&dir)
        .args(["account", "list", "--client", "initech"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No matching accounts."));
}

#[test]
fn available_picks_a_ready_account_of_the_client() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register_for(&dir, "acme_poster", "acme", "north");
    register_for(&dir, "globex_poster", "globex", "north");

    // not yet warmed
    let none = json_of(warmup(&dir).args(["account", "available", "--client", "acme", "--kind", "post"]));
    assert!(none.is_null());

    warmup(&dir).arg("sweep").assert().success();

    let picked = json_of(warmup(&dir).args(["account", "available", "--client", "acme", "--kind", "post"]));
    assert_eq!(picked["username"], "acme_poster");
    assert_eq!(picked["client_id"], "acme");

    warmup(&dir)
        .args(["action", "record", "acme_poster", "--kind", "post"])
        .assert()
        .success();

    warmup(&dir)
        .args(["account", "available", "--client", "acme", "--kind", "post"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No account available for acme"));

    // the other client's account is unaffected
    warmup(&dir)
        .args(["account", "available", "--client", "globex", "--kind", "post"])
        .assert()
        .success()
        .stdout(predicate::str::contains("globex_poster"));
}

#[test]
fn status_shows_next_stage() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "climber", 0, 0);

    warmup(&dir)
        .args(["status", "climber"])
        .assert()
        .success()
        .stdout(predicate::str::contains("next: browsing"));

    let status = json_of(warmup(&dir).args(["status", "climber"]));
    assert_eq!(status["progress"]["current_stage"], "new");
    assert_eq!(status["progress"]["next_stage"]["stage"], "browsing");
    assert_eq!(status["progress"]["daily_cap"], 0);
}

#[test]
fn reset_stage_then_activity_log() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "logged", 0, 0);

    warmup(&dir)
        .args(["account", "reset-stage", "logged", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("commenting"));

    let entries = json_of(warmup(&dir).args(["activity", "--account", "logged"]));
    let types: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["activity_type"].as_str().unwrap())
        .collect();
    assert!(types.contains(&"account_registered"));
    assert!(types.contains(&"account_warmup"));
}

#[test]
fn deactivate_blocks_actions() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    register(&dir, "retired", 20, 300);

    warmup(&dir)
        .args(["account", "deactivate", "retired"])
        .assert()
        .success();
    let check = json_of(warmup(&dir).args(["action", "check", "retired", "post"]));
    assert_eq!(check["permission"]["reason"], "status-blocked");
}

// ---------------------------------------------------------------------------
// warmup config
// ---------------------------------------------------------------------------

#[test]
fn default_config_validates() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    warmup(&dir)
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config is valid"));
}

#[test]
fn broken_config_fails_validation() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    std::fs::write(
        dir.path().join(".warmup/config.yaml"),
        "version: 1\nlimits:\n  daily_caps: [0, 5]\n  requests_per_minute: 0\n",
    )
    .unwrap();

    warmup(&dir)
        .args(["config", "validate"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("[error]"))
        .stderr(predicate::str::contains("config validation found errors"));
}

#[test]
fn stage_table_lists_caps() {
    let dir = TempDir::new().unwrap();
    init_project(&dir);
    let stages = json_of(warmup(&dir).args(["config", "stages"]));
    assert_eq!(stages.as_array().unwrap().len(), 6);
    assert_eq!(stages[5]["stage"], "ready");
    assert_eq!(stages[5]["daily_cap"], 25);
}
