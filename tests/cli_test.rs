use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const STRATUS_ENV_VARS: &[&str] = &[
    "STRATUS_TENANT_ID",
    "STRATUS_SUBSCRIPTION_ID",
    "STRATUS_RESOURCE_GROUP",
    "STRATUS_APP_NAME",
    "STRATUS_CLIENT_ID",
    "STRATUS_CLIENT_SECRET",
    "STRATUS_USE_KEYCHAIN",
];

fn stratus_cmd(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("stratus").unwrap();
    cmd.env("HOME", home.path());
    for var in STRATUS_ENV_VARS {
        cmd.env_remove(var);
    }
    // Keep tests off the network
    cmd.env("STRATUS_CAPTURE_TELEMETRY", "false");
    cmd
}

#[test]
fn test_help_lists_commands() {
    let home = TempDir::new().unwrap();
    stratus_cmd(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("login"))
        .stdout(predicate::str::contains("logout"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_login_help_shows_examples() {
    let home = TempDir::new().unwrap();
    stratus_cmd(&home)
        .args(["login", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--use-keychain"))
        .stdout(predicate::str::contains("Login using service principal"));
}

#[test]
fn test_service_principal_without_tenant_is_rejected() {
    let home = TempDir::new().unwrap();
    stratus_cmd(&home)
        .args([
            "login",
            "--client-id",
            "00000000-0000-0000-0000-000000000000",
            "--client-secret",
            "s3cret",
        ])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Service principal login requires"));
}

#[test]
fn test_service_principal_env_vars_are_honored() {
    let home = TempDir::new().unwrap();
    stratus_cmd(&home)
        .arg("login")
        .env("STRATUS_CLIENT_ID", "00000000-0000-0000-0000-000000000000")
        .env("STRATUS_CLIENT_SECRET", "s3cret")
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("tenant"));
}

#[test]
fn test_logout_without_cached_credentials() {
    let home = TempDir::new().unwrap();
    stratus_cmd(&home)
        .arg("logout")
        .assert()
        .success()
        .stderr(predicate::str::contains("No cached credentials"));
}

#[test]
fn test_config_show_prints_defaults() {
    let home = TempDir::new().unwrap();
    stratus_cmd(&home)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("identity_url"))
        .stdout(predicate::str::contains("login.stratus.cloud"));
}
