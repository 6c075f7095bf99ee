/*!
 * Tests for error messages and exit codes
 */

use std::path::PathBuf;

use submacro::errors::{ArgumentError, ExitStatus, InitError, RunError};

#[test]
fn test_exitStatus_codes_shouldMatchProcessConvention() {
    assert_eq!(ExitStatus::Success.code(), 0);
    assert_eq!(ExitStatus::Failure.code(), 1);
    assert_eq!(ExitStatus::InitFailure.code(), -1);
}

#[test]
fn test_exitStatus_fromErrors_shouldSeparateInitFailures() {
    let run = RunError::CommandNotFound { name: "x".to_string() };
    let argument = ArgumentError::Syntax("bad".to_string());
    let init = InitError::Step { step: "config", reason: "denied".to_string() };

    assert_eq!(ExitStatus::from(&run), ExitStatus::Failure);
    assert_eq!(ExitStatus::from(&argument), ExitStatus::Failure);
    assert_eq!(ExitStatus::from(&init), ExitStatus::InitFailure);
}

#[test]
fn test_runError_messages_shouldNameTheCulprit() {
    let not_found = RunError::CommandNotFound { name: "nope".to_string() };
    assert_eq!(not_found.to_string(), "Command not found: nope");

    let missing = RunError::ScriptNotFound { reference: "tools.json".to_string() };
    assert_eq!(missing.to_string(), "Could not find script file: tools.json");

    let skipped = RunError::ValidationFailed { name: "Strip".to_string() };
    assert!(skipped
        .to_string()
        .starts_with("Skipping automation because validation function returned false"));
}

#[test]
fn test_runError_execution_shouldIncludeCauseChain() {
    let source = anyhow::anyhow!("inner").context("outer");
    let error = RunError::Execution { name: "Macro".to_string(), source };
    assert_eq!(error.to_string(), "Macro \"Macro\" failed: outer: inner");
}

#[test]
fn test_initError_step_shouldNameStep() {
    let error = InitError::Step { step: "paths", reason: "read-only".to_string() };
    assert_eq!(error.to_string(), "Fatal error while initializing (paths): read-only");
}

#[test]
fn test_argumentError_convertsIntoRunError() {
    let error: RunError = ArgumentError::InvalidRange {
        input: "x".to_string(),
        reason: "\"x\" is not a line index".to_string(),
    }
    .into();
    assert!(matches!(error, RunError::Argument(_)));
    assert_eq!(error.to_string(), "Invalid line range \"x\": \"x\" is not a line index");

    let persistence = RunError::Persistence {
        path: PathBuf::from("/out.srt"),
        source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    };
    assert!(persistence.to_string().contains("/out.srt"));
}
