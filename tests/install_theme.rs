use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Runs with HOME pointed at a scratch dir so no real config is read.
fn theme_cmd(home: &TempDir) -> Command {
    let mut cmd: Command = cargo_bin_cmd!("install-theme").into();
    cmd.env("HOME", home.path()).env_remove("RUST_LOG");
    cmd
}

#[test]
fn unknown_flag_fails() {
    let home = TempDir::new().unwrap();

    theme_cmd(&home)
        .arg("--bogus")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--bogus"));
}

#[test]
fn format_without_value_fails() {
    let home = TempDir::new().unwrap();

    theme_cmd(&home).arg("-f").assert().failure();
    theme_cmd(&home).args(["-f", "--print"]).assert().failure();
}

#[test]
fn exclude_without_value_is_empty_set() {
    let home = TempDir::new().unwrap();

    theme_cmd(&home)
        .args(["-f", "u@h d", "--print", "-ex"])
        .assert()
        .success()
        .stdout(predicate::str::contains("PS1='"))
        .stderr(predicate::str::contains("Active elements: uhd"));
}

#[test]
fn writes_theme_file_with_exclusions() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("themes").join("prompt.bash");

    theme_cmd(&home)
        .args(["-f", "u@h [i:p] d", "-ex", "i", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Active elements: uhpd"))
        .stdout(predicate::str::contains("~/.bashrc"));

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.contains("# Elements: uhpd"));
    assert!(written.contains("__shellkit_ip() {"));
    assert!(!written.contains("__shellkit_iface() {"));
}

#[test]
fn default_output_goes_under_home_config() {
    let home = TempDir::new().unwrap();

    theme_cmd(&home)
        .args(["--shell", "zsh"])
        .assert()
        .success();

    let written =
        fs::read_to_string(home.path().join(".config/shellkit/prompt.zsh")).unwrap();
    assert!(written.contains("# Elements: uhipdcvg"));
    assert!(written.contains("setopt PROMPT_SUBST"));
}

#[test]
fn empty_layout_warns() {
    let home = TempDir::new().unwrap();
    let out = home.path().join("prompt.bash");

    theme_cmd(&home)
        .args(["-f", "", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("no prompt elements enabled"));

    assert!(fs::read_to_string(&out).unwrap().contains("# No prompt elements enabled."));
}

#[test]
fn empty_layout_warning_is_printed_once_when_verbose() {
    let home = TempDir::new().unwrap();

    theme_cmd(&home)
        .args(["-f", "", "--print", "-v"])
        .assert()
        .success()
        .stderr(predicate::function(|err: &str| {
            err.matches("no prompt elements enabled").count() == 1
        }));
}

#[test]
fn config_file_supplies_defaults() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(
        config_dir.join("shellkit.toml"),
        "[theme]\nformat = \"d (g)\"\nshell = \"zsh\"\n",
    )
    .unwrap();

    theme_cmd(&home)
        .arg("--print")
        .assert()
        .success()
        .stdout(predicate::str::contains("PROMPT='"))
        .stderr(predicate::str::contains("Active elements: dg"));
}

#[test]
fn malformed_config_file_fails() {
    let home = TempDir::new().unwrap();
    let config_dir = home.path().join(".config");
    fs::create_dir_all(&config_dir).unwrap();
    fs::write(config_dir.join("shellkit.toml"), "[theme\n").unwrap();

    theme_cmd(&home)
        .arg("--print")
        .assert()
        .failure()
        .stderr(predicate::str::contains("shellkit.toml"));
}
