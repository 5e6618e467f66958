use assert_cmd::Command;
use predicates::str::{contains, starts_with};
use tempfile::TempDir;

/// Command isolated from the user's data and config directories.
fn spacenote(home: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("spacenote"));
    cmd.env("SPACENOTE_DIR", home.path().join("data"))
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("HOME", home.path())
        .env_remove("SPACENOTE_API_URL")
        .env_remove("SPACENOTE_PASSWORD");
    cmd
}

#[test]
fn test_cli_help() {
    let home = TempDir::new().unwrap();
    spacenote(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("SpaceNote"));
}

#[test]
fn test_cli_version() {
    let home = TempDir::new().unwrap();
    spacenote(&home).arg("--version").assert().success();
}

#[test]
fn test_cli_completions() {
    let home = TempDir::new().unwrap();
    spacenote(&home)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(starts_with("_spacenote"));
}

#[test]
fn test_open_protected_route_redirects_to_login() {
    let home = TempDir::new().unwrap();
    spacenote(&home)
        .args(["open", "/notes/tasks?page=2"])
        .assert()
        .success()
        .stdout(contains("Redirected from /notes/tasks?page=2 to /login"));
}

#[test]
fn test_open_unknown_route_fails() {
    let home = TempDir::new().unwrap();
    spacenote(&home)
        .args(["open", "/nowhere/at/all/really"])
        .assert()
        .failure()
        .stderr(contains("Unknown route"));
}

#[test]
fn test_protected_command_requires_login() {
    let home = TempDir::new().unwrap();
    spacenote(&home)
        .args(["note", "list", "tasks"])
        .assert()
        .failure()
        .stderr(contains("Not logged in"))
        .stderr(contains("spacenote login"));
}

#[test]
fn test_logout_without_session() {
    let home = TempDir::new().unwrap();
    spacenote(&home)
        .arg("logout")
        .assert()
        .success()
        .stdout(contains("Not logged in."));
}

#[test]
fn test_template_validate() {
    let home = TempDir::new().unwrap();
    let good = home.path().join("good.liquid");
    let bad = home.path().join("bad.liquid");
    std::fs::write(&good, "<h1>{{ note.fields.title | default: \"Untitled\" }}</h1>").unwrap();
    std::fs::write(&bad, "{{ note.fields.title | shout }}").unwrap();

    spacenote(&home)
        .args(["template", "validate"])
        .arg(&good)
        .assert()
        .success()
        .stdout(contains("Template is valid"));

    spacenote(&home)
        .args(["template", "validate"])
        .arg(&bad)
        .assert()
        .failure()
        .stderr(contains("Invalid template"));
}

#[test]
fn test_config_show_uses_api_url_flag() {
    let home = TempDir::new().unwrap();
    spacenote(&home)
        .args(["config", "show", "--format", "json", "--api-url", "http://example.test/api"])
        .assert()
        .success()
        .stdout(contains("\"api_url\": \"http://example.test/api\""));
}
