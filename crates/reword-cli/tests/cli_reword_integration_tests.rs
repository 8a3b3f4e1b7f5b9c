//! CLI integration tests
//!
//! These tests drive the built `reword` binary against a repository in a
//! temporary directory.

use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn reword_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_reword"));
    cmd.current_dir(dir)
        .env_remove("REWORD_DIR")
        .env_remove("VISUAL")
        .env_remove("EDITOR")
        .env("REWORD_AUTHOR_NAME", "Cli Test")
        .env("REWORD_AUTHOR_EMAIL", "cli@example.com")
        .env("RUST_LOG", "off");
    cmd
}

fn run(dir: &Path, args: &[&str]) -> Output {
    reword_cmd(dir).args(args).output().expect("Failed to execute CLI")
}

fn run_ok(dir: &Path, args: &[&str]) -> String {
    let output = run(dir, args);
    assert!(
        output.status.success(),
        "`reword {}` should succeed. Stderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn commit(dir: &Path, message: &str) -> String {
    let stdout = run_ok(dir, &["commit", "-m", message]);
    stdout
        .lines()
        .find_map(|line| line.trim().strip_prefix("snapshot_id: "))
        .expect("commit output should name the snapshot")
        .to_string()
}

fn setup_history() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    run_ok(temp_dir.path(), &["init"]);
    commit(temp_dir.path(), "first");
    commit(temp_dir.path(), "second");
    commit(temp_dir.path(), "third");
    temp_dir
}

fn log_subjects(dir: &Path) -> Vec<String> {
    run_ok(dir, &["log"])
        .lines()
        .map(|line| line.split_once(' ').map(|(_, s)| s).unwrap_or("").to_string())
        .collect()
}

#[test]
fn test_cli_init_creates_repository() {
    let temp_dir = TempDir::new().unwrap();
    let stdout = run_ok(temp_dir.path(), &["init"]);

    assert!(stdout.contains("Initialized empty repository"));
    assert!(temp_dir.path().join(".reword").is_dir());
}

#[test]
fn test_cli_reword_with_message() {
    let temp_dir = setup_history();

    let stdout = run_ok(temp_dir.path(), &["reword", "HEAD~1", "-m", "second, reworded"]);
    assert!(stdout.contains("Rewrote 2 snapshot(s)"));
    assert!(stdout.contains("refs/heads/main"));

    assert_eq!(
        log_subjects(temp_dir.path()),
        vec!["third", "second, reworded", "first"]
    );

    let reflog = run_ok(temp_dir.path(), &["reflog", "main"]);
    let newest = reflog.lines().next().unwrap();
    assert!(newest.contains("main@{0}: reword: message for HEAD~1"));
}

#[test]
fn test_cli_reword_same_message_is_noop() {
    let temp_dir = setup_history();

    let stdout = run_ok(temp_dir.path(), &["reword", "HEAD", "-m", "third"]);
    assert!(stdout.contains("nothing rewritten"));
    assert_eq!(run_ok(temp_dir.path(), &["reflog", "main"]).lines().count(), 3);
}

#[test]
fn test_cli_reword_through_editor() {
    let temp_dir = setup_history();

    let output = reword_cmd(temp_dir.path())
        .env("REWORD_EDITOR", "printf 'first, edited\\n# dropped\\n' >")
        .args(["reword", "HEAD~2"])
        .output()
        .expect("Failed to execute CLI");
    assert!(
        output.status.success(),
        "Stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    assert_eq!(
        log_subjects(temp_dir.path()),
        vec!["third", "second", "first, edited"]
    );
}

#[test]
fn test_cli_reword_empty_editor_message_aborts() {
    let temp_dir = setup_history();
    let before = run_ok(temp_dir.path(), &["log"]);

    let output = reword_cmd(temp_dir.path())
        .env("REWORD_EDITOR", ": >")
        .args(["reword", "HEAD"])
        .output()
        .expect("Failed to execute CLI");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("empty message"));
    assert_eq!(run_ok(temp_dir.path(), &["log"]), before);
}

#[test]
fn test_cli_reword_unknown_revision_fails() {
    let temp_dir = setup_history();

    let output = run(temp_dir.path(), &["reword", "HEAD~9", "-m", "x"]);

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERR_AMBIGUOUS_OR_UNKNOWN_REVISION"), "{}", stderr);
}

#[test]
fn test_cli_reword_expected_tip_mismatch() {
    let temp_dir = TempDir::new().unwrap();
    run_ok(temp_dir.path(), &["init"]);
    let first = commit(temp_dir.path(), "first");
    commit(temp_dir.path(), "second");

    let output = run(
        temp_dir.path(),
        &["reword", "HEAD", "-m", "x", "--expected-tip", &first],
    );

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ERR_CONCURRENCY"));
}

#[test]
fn test_cli_repo_flag_and_discovery() {
    let temp_dir = setup_history();
    let nested = temp_dir.path().join("nested").join("dir");
    std::fs::create_dir_all(&nested).unwrap();

    // discovered from a subdirectory
    assert_eq!(log_subjects(&nested).len(), 3);

    // explicit --repo from an unrelated directory
    let elsewhere = TempDir::new().unwrap();
    let repo = temp_dir.path().to_str().unwrap();
    let stdout = run_ok(elsewhere.path(), &["--repo", repo, "log", "-n", "1"]);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("third"));
}

#[test]
fn test_cli_outside_repository_fails() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(temp_dir.path(), &["log"]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Error:"));
}
