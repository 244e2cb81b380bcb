use assert_cmd::Command;
use predicates::prelude::*;
use std::path::PathBuf;

#[allow(deprecated)]
fn get_harlens_bin() -> PathBuf {
    assert_cmd::cargo::cargo_bin("harlens")
}

#[test]
fn test_completion_command_help() {
    let mut cmd = Command::new(get_harlens_bin());
    cmd.arg("completion").arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Generate shell completion scripts"))
        .stdout(predicate::str::contains("SUPPORTED SHELLS"))
        .stdout(predicate::str::contains("~/.bashrc"));
}

#[test]
fn test_completion_bash_generates_script() {
    let mut cmd = Command::new(get_harlens_bin());
    cmd.arg("completion").arg("--shell").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_harlens()"))
        .stdout(predicate::str::contains("complete -F _harlens"));
}

#[test]
fn test_completion_zsh_generates_script() {
    let mut cmd = Command::new(get_harlens_bin());
    cmd.arg("completion").arg("--shell").arg("zsh");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("#compdef harlens"));
}

#[test]
fn test_completion_requires_shell() {
    let mut cmd = Command::new(get_harlens_bin());
    cmd.arg("completion");

    cmd.assert().failure();
}
