/*!
 * Tests for the submacro binary as invoked from a shell
 */

use anyhow::Result;
use assert_cmd::Command;
use predicates::prelude::*;
use std::path::Path;

use crate::common;

/// The binary with its user directory pointed at `user_dir`
fn submacro_cmd(user_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("submacro").unwrap();
    cmd.env("SUBMACRO_USER_DIR", user_dir)
        .env_remove("SUBMACRO_CONFIG")
        .current_dir(user_dir);
    cmd
}

#[test]
fn test_cli_withHelp_shouldPrintUsageAndSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    submacro_cmd(temp_dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("IN_FILE").and(predicate::str::contains("--selected-lines")));
    Ok(())
}

#[test]
fn test_cli_withoutMacro_shouldPrintTooFewArguments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    submacro_cmd(temp_dir.path())
        .args(["--cli", "in.srt", "out.srt"])
        .assert()
        .code(0)
        .stdout(predicate::str::starts_with("Too few arguments."));
    Ok(())
}

#[test]
fn test_cli_withoutCliFlag_shouldRefuseGuiMode() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    submacro_cmd(temp_dir.path())
        .args(["in.srt", "out.srt", "grid/sort/start"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("graphical interface is not available"));
    Ok(())
}

#[test]
fn test_cli_withUnknownCommand_shouldExitWithFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "in.srt")?;

    submacro_cmd(temp_dir.path())
        .args(["--cli", "in.srt", "out.srt", "nope"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Command not found: nope"));

    assert!(!temp_dir.path().join("out.srt").exists());
    Ok(())
}

#[test]
fn test_cli_withBuiltinCommand_shouldWriteOutput() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "in.srt")?;

    submacro_cmd(temp_dir.path())
        .args([
            "--cli", "in.srt", "out.srt", "edit/line/delete",
            "--active-line", "-1",
            "--selected-lines", "1-2",
        ])
        .assert()
        .success();

    let saved = submacro::SubtitleDocument::load(temp_dir.path().join("out.srt"))?;
    assert_eq!(common::texts(&saved), vec!["First line", "Fourth line"]);
    Ok(())
}

#[test]
fn test_cli_withMalformedRange_shouldFailBeforeLoading() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    submacro_cmd(temp_dir.path())
        .args(["--cli", "missing.srt", "out.srt", "grid/sort/start", "--selected-lines", "3-1"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid line range").and(predicate::str::contains("missing.srt").not()));
    Ok(())
}

#[test]
fn test_cli_withUnknownFlag_shouldExitWithFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    submacro_cmd(temp_dir.path())
        .args(["--cli", "--bogus"])
        .assert()
        .code(1);
    Ok(())
}

#[test]
fn test_cli_withCompletionsFlag_shouldPrintScript() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    submacro_cmd(temp_dir.path())
        .args(["--generate-completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("submacro"));
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_cli_withUnusableConfigLocation_shouldReportInitFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "in.srt")?;
    let blocker = common::create_test_file(temp_dir.path(), "blocker", "")?;

    submacro_cmd(temp_dir.path())
        .env("SUBMACRO_CONFIG", blocker.join("config.json"))
        .args(["--cli", "in.srt", "out.srt", "grid/sort/start"])
        .assert()
        // exit(-1) is reported as 255 by the OS
        .code(255)
        .stderr(predicate::str::contains("Fatal error while initializing (config)"));
    Ok(())
}
