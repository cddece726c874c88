//! CLI integration tests for the OpenX command-line interface.
//!
//! These tests cover argument parsing, help output and configuration
//! errors. None of them reach the network.

use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

fn openx() -> Command {
    let mut cmd = Command::cargo_bin("openx").unwrap();
    cmd.env_remove("OPENX_CONFIG")
        .env_remove("OPENX_PASSWORD")
        .env_remove("OPENX_API_SECRET")
        .env_remove("RUST_LOG");
    cmd
}

fn config_file(path: &str, with_password: bool) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
api_key = "key"
api_secret = "secret"
login_url = "http://127.0.0.1:9/login/process"
username = "user@example.com"
{}
domain = "http://127.0.0.1:9"
path = "{}"
request_token_url = "http://127.0.0.1:9/api/index/initiate"
access_token_url = "http://127.0.0.1:9/api/index/token"
"#,
        if with_password { r#"password = "pw""# } else { "" },
        path
    )
    .unwrap();
    file
}

#[test]
fn test_help_lists_subcommands() {
    openx()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("accounts"))
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("--config"));
}

#[test]
fn test_version_displays() {
    openx()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("openx"));
}

#[test]
fn test_get_requires_entity() {
    openx()
        .arg("get")
        .assert()
        .failure()
        .stderr(predicate::str::contains("<ENTITY>"));
}

#[test]
fn test_unknown_subcommand_fails() {
    openx().arg("frobnicate").assert().failure();
}

#[test]
fn test_missing_config_file() {
    openx()
        .args(["--config", "/nonexistent/openx.toml", "login"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not load"));
}

#[test]
fn test_config_from_env_var() {
    openx()
        .env("OPENX_CONFIG", "/nonexistent/from-env.toml")
        .arg("accounts")
        .assert()
        .failure()
        .stderr(predicate::str::contains("from-env.toml"));
}

#[test]
fn test_unsupported_api_path_rejected() {
    let file = config_file("/ox/5.0/", true);
    openx()
        .arg("--config")
        .arg(file.path())
        .arg("login")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unsupported API path"));
}

#[test]
fn test_missing_password_names_env_var() {
    let file = config_file("/ox/4.0/", false);
    openx()
        .arg("--config")
        .arg(file.path())
        .arg("login")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENX_PASSWORD"));
}

#[test]
fn test_report_rejects_invalid_payload() {
    let mut payload = NamedTempFile::new().unwrap();
    write!(payload, "not json").unwrap();
    openx()
        .args(["--config", "/nonexistent/openx.toml", "report", "--payload"])
        .arg(payload.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("is not valid JSON"));
}
