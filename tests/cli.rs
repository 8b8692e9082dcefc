//! Integration tests for CLI commands

#![allow(deprecated)]

mod common;

use assert_cmd::{assert::OutputAssertExt, cargo::CommandCargoExt};
use predicates::prelude::*;
use std::process::{Command, Output};
use tempfile::TempDir;

use common::{MockBackend, GOOD_CREDENTIAL};

/// A `studywat` invocation with its data and config dirs inside `home`
fn studywat(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("studywat").unwrap();
    cmd.env("HOME", home.path())
        .env("XDG_DATA_HOME", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env_remove("STUDYWAT_API_URL")
        .env_remove("STUDYWAT_GOOGLE_CREDENTIAL")
        .env_remove("RUST_LOG");
    cmd
}

/// Run off the async runtime so the mock backend keeps serving
async fn output(mut cmd: Command) -> Output {
    tokio::task::spawn_blocking(move || cmd.output())
        .await
        .unwrap()
        .unwrap()
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    let mut cmd = studywat(&home);
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("programs"))
        .stdout(predicate::str::contains("lists"))
        .stdout(predicate::str::contains("ask"));
}

#[test]
fn test_whoami_without_session() {
    let home = TempDir::new().unwrap();
    let mut cmd = studywat(&home);
    cmd.arg("whoami").arg("--api-url").arg("http://127.0.0.1:9");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Not signed in."));
}

#[test]
fn test_lists_require_sign_in() {
    let home = TempDir::new().unwrap();
    let mut cmd = studywat(&home);
    cmd.arg("lists").arg("--api-url").arg("http://127.0.0.1:9");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Not signed in"));
}

#[test]
fn test_programs_rejects_unknown_sort() {
    let home = TempDir::new().unwrap();
    let mut cmd = studywat(&home);
    cmd.args(["programs", "--sort", "newest", "--api-url", "http://127.0.0.1:9"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Unknown sort 'newest'"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_programs_prints_table_and_link() {
    let mock = MockBackend::start().await;
    let home = TempDir::new().unwrap();
    let mut cmd = studywat(&home);
    cmd.args(["programs", "--country", "Japan", "--api-url", &mock.url()]);

    output(cmd)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Programs ==="))
        .stdout(predicate::str::contains("Alpha College"))
        .stdout(predicate::str::contains("Zeta University").not())
        .stdout(predicate::str::contains("country=Japan"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_login_then_whoami() {
    let mock = MockBackend::start().await;
    let home = TempDir::new().unwrap();

    let mut login = studywat(&home);
    login.args(["login", "--api-url", &mock.url()]);
    login.env("STUDYWAT_GOOGLE_CREDENTIAL", GOOD_CREDENTIAL);
    output(login).await.assert().success();

    let mut whoami = studywat(&home);
    whoami.args(["whoami", "--api-url", &mock.url()]);
    output(whoami)
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("aisha@example.com"));

    let mut logout = studywat(&home);
    logout.args(["logout", "--api-url", &mock.url()]);
    output(logout).await.assert().success();
    assert_eq!(mock.state().logout_calls, 1);
}
