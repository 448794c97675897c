use assert_cmd::Command;
use predicates::prelude::*;
use serial_test::serial;
use std::fs::write;
use tempfile::NamedTempFile;

/// The binary with a scrubbed environment: no Jira secrets, no config, and an
/// `sf` binary that does not exist.
fn sf_cli() -> Command {
    let mut cmd = Command::cargo_bin("sf-cli").expect("Binary exists");
    cmd.env_remove("JIRA_SERVER")
        .env_remove("JIRA_EMAIL")
        .env_remove("JIRA_TOKEN")
        .env_remove("SF_CLI_CONFIG")
        .env_remove("RUST_LOG")
        .env("SF_CLI_BINARY", "sf-cli-test-missing-sf-binary");
    cmd
}

#[test]
#[serial]
fn help_lists_all_command_groups() {
    sf_cli()
        .arg("--help")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("users")
                .and(predicate::str::contains("accounts"))
                .and(predicate::str::contains("salesforce"))
                .and(predicate::str::contains("qa")),
        );
}

#[test]
#[serial]
fn users_create_requires_email_and_last_name() {
    sf_cli()
        .args(["users", "create", "--last-name", "Doe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--email"));
}

#[test]
#[serial]
fn users_create_rejects_unknown_role() {
    sf_cli()
        .args([
            "users",
            "create",
            "--email",
            "jdoe@example.com",
            "--last-name",
            "Doe",
            "--role",
            "superuser",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("superuser"));
}

#[test]
#[serial]
fn missing_sf_binary_is_reported() {
    sf_cli()
        .args(["users", "list-users"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("was not found"));
}

#[test]
#[serial]
fn login_to_unknown_environment_fails() {
    sf_cli()
        .args(["salesforce", "login", "--env", "prod"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid environment 'prod'"));
}

#[test]
#[serial]
fn qa_without_credentials_prints_hint_and_succeeds() {
    sf_cli()
        .args(["qa", "get-project-keys"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "JIRA_SERVER, JIRA_EMAIL, and JIRA_TOKEN environment variables must be set.",
        ));
}

#[test]
#[serial]
fn invalid_config_file_fails() {
    let config = NamedTempFile::new().expect("temp file");
    write(config.path(), b"environments: [:::").unwrap();
    sf_cli()
        .arg("--config")
        .arg(config.path())
        .args(["salesforce", "org"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parse"));
}

#[cfg(unix)]
mod fake_sf {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use tempfile::TempDir;

    /// Writes an executable shell script standing in for `sf`.
    fn fake_sf(script_body: &str) -> (TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("sf");
        write(&path, format!("#!/bin/sh\n{script_body}\n")).expect("write fake sf");
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_mode(0o755);
        std::fs::set_permissions(&path, perms).unwrap();
        (dir, path)
    }

    const USERS_JSON: &str = r#"{"status":0,"result":{"records":[{"Id":"005A","Username":"ann@x.io","Email":"ann@x.io","FirstName":"Ann","LastName":"Able","Profile":{"Name":"System Administrator"},"IsActive":true}]}}"#;

    #[test]
    #[serial]
    fn list_users_json_from_fake_sf() {
        let (_dir, sf) = fake_sf(&format!("echo '{USERS_JSON}'"));
        sf_cli()
            .env("SF_CLI_BINARY", &sf)
            .args(["users", "list-users", "--format", "json"])
            .assert()
            .success()
            .stdout(
                predicate::str::contains("\"username\": \"ann@x.io\"")
                    .and(predicate::str::contains("\"role\": \"admin\"")),
            );
    }

    #[test]
    #[serial]
    fn sf_json_error_message_is_surfaced() {
        let (_dir, sf) = fake_sf(
            r#"echo '{"status":1,"name":"NoDefaultEnvError","message":"No default environment found."}'
exit 1"#,
        );
        sf_cli()
            .env("SF_CLI_BINARY", &sf)
            .args(["salesforce", "org"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("No default environment found."));
    }

    #[test]
    #[serial]
    fn org_flag_is_forwarded_as_target_org() {
        // Echo the arguments back inside the JSON so the test can see them.
        let (_dir, sf) = fake_sf(
            r#"echo "{\"status\":0,\"result\":{\"records\":[{\"Id\":\"001X\",\"Name\":\"$*\"}]}}""#,
        );
        sf_cli()
            .env("SF_CLI_BINARY", &sf)
            .args(["--org", "qa", "accounts", "list-accounts", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--target-org qa --json"));
    }

    #[test]
    #[serial]
    fn config_default_org_applies_when_flag_is_absent() {
        let (_dir, sf) = fake_sf(
            r#"echo "{\"status\":0,\"result\":{\"records\":[{\"Id\":\"001X\",\"Name\":\"$*\"}]}}""#,
        );
        let config = NamedTempFile::new().expect("temp file");
        write(config.path(), "default_org: uat-sandbox\n").unwrap();
        sf_cli()
            .env("SF_CLI_BINARY", &sf)
            .arg("--config")
            .arg(config.path())
            .args(["accounts", "list-accounts", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("--target-org uat-sandbox"));
    }
}
