use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn rolegraph() -> Command {
    let mut cmd = Command::cargo_bin("rolegraph").unwrap();
    cmd.env_remove("GITLAB_TOKEN").env_remove("GITLAB_URL").env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_help_lists_flags() {
    rolegraph()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--filter"))
        .stdout(predicate::str::contains("--show-unknown"))
        .stdout(predicate::str::contains("--gitlab-url"));
}

#[test]
fn test_unknown_flag_exits_with_usage_error() {
    rolegraph()
        .arg("--no-such-flag")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn test_conflicting_verbosity_exits_with_usage_error() {
    rolegraph().args(["--verbose", "--quiet"]).assert().code(2);
}

#[test]
fn test_missing_token_fails_authentication() {
    let temp = TempDir::new().unwrap();

    rolegraph()
        .current_dir(temp.path())
        .args(["--gitlab-url", "http://127.0.0.1:9", "--filter", "ansible/"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("authentication failure"))
        .stderr(predicate::str::contains("--token"));

    assert!(!temp.path().join("ansible_roles.html").exists());
}

#[test]
fn test_invalid_filter_is_reported() {
    rolegraph()
        .args(["--token", "x", "--filter", "(unclosed"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid path filter"));
}
