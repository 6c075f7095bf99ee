/*!
 * Tests for non-interactive prompt answers
 */

use log::Level;
use std::path::PathBuf;

use submacro::dialogs::{
    DialogResponder, DialogResponses, FallbackReason, FileResponses, MessageIcon, DialogResult,
};
use submacro::errors::ArgumentError;

use crate::common;

fn choices(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn responder(dialogs: &[&str], files: &[&str]) -> DialogResponder {
    let dialogs: Vec<String> = dialogs.iter().map(|s| s.to_string()).collect();
    let files: Vec<String> = files.iter().map(|s| s.to_string()).collect();
    DialogResponder::new(
        DialogResponses::parse(&dialogs).unwrap(),
        FileResponses::parse(&files).unwrap(),
    )
}

#[test]
fn test_choose_withSeveralAnswers_shouldConsumeLastFirst() {
    let mut dialogs = responder(&[r#"{"fmt": ["A", "B"]}"#, r#"{"fmt": "C"}"#], &[]);
    let options = choices(&["A", "B", "C"]);

    assert_eq!(dialogs.choose("fmt", "Pick", "Format", &options), 2);
    assert_eq!(dialogs.choose("fmt", "Pick", "Format", &options), 1);
    assert_eq!(dialogs.choose("fmt", "Pick", "Format", &options), 0);
    assert!(dialogs.fallbacks().is_empty());
}

#[test]
fn test_choose_withNoAnswer_shouldUseFirstChoiceAndWarn() {
    let logs = common::capture_logs();
    let mut dialogs = responder(&[], &[]);

    let index = dialogs.choose("missing", "Pick", "Unanswered prompt 7f3a", &choices(&["Yes", "No"]));

    assert_eq!(index, 0);
    assert_eq!(dialogs.fallbacks()[0].reason, FallbackReason::NoAnswer);
    assert_eq!(dialogs.fallbacks()[0].key.as_deref(), Some("missing"));
    assert!(logs.contains(
        Level::Warn,
        "No answer given for choice \"Unanswered prompt 7f3a\". Using first choice \"Yes\"."
    ));
}

#[test]
fn test_choose_withOutOfRangeIndex_shouldFallBack() {
    let logs = common::capture_logs();
    let mut dialogs = responder(&[r#"{"k": "5"}"#], &[]);

    let index = dialogs.choose("k", "", "Range prompt 91cc", &choices(&["x", "y"]));

    assert_eq!(index, 0);
    assert_eq!(
        dialogs.fallbacks()[0].reason,
        FallbackReason::InvalidAnswer("5".to_string())
    );
    assert!(logs.contains(
        Level::Warn,
        "Invalid answer \"5\" given for choice \"Range prompt 91cc\". Using first choice \"x\"."
    ));
}

#[test]
fn test_choose_withAnswerForOtherKey_shouldNotConsumeIt() {
    let mut dialogs = responder(&[r#"{"other": "y"}"#], &[]);
    assert_eq!(dialogs.choose("k", "", "Caption", &choices(&["x", "y"])), 0);
    assert_eq!(dialogs.choose("other", "", "Caption", &choices(&["x", "y"])), 1);
}

#[test]
fn test_pickFile_shouldPopLastAnswerThenCancel() {
    let mut dialogs = responder(&[], &["/tmp/a.srt", r#"["/tmp/b.srt", "/tmp/c.srt"]"#]);

    assert_eq!(
        dialogs.pick_file("Open"),
        Some(vec![PathBuf::from("/tmp/b.srt"), PathBuf::from("/tmp/c.srt")])
    );
    assert_eq!(dialogs.pick_file("Open"), Some(vec![PathBuf::from("/tmp/a.srt")]));
    assert_eq!(dialogs.pick_file("Open"), None);
    assert_eq!(dialogs.fallbacks()[0].reason, FallbackReason::NoFile);
    assert_eq!(dialogs.fallbacks()[0].key, None);
    assert_eq!(dialogs.fallbacks()[0].caption, "Open");
}

#[test]
fn test_fileResponses_withRelativePath_shouldBeAbsolute() {
    let mut files = FileResponses::parse(&["relative/out.srt".to_string()]).unwrap();
    let paths = files.pop().unwrap();
    assert!(paths[0].is_absolute());
    assert!(paths[0].ends_with("relative/out.srt"));
}

#[test]
fn test_dialogResponses_withInvalidValues_shouldFail() {
    for raw in ["not json", "[\"a\"]", r#"{"k": 1}"#, r#"{"k": [1]}"#] {
        let result = DialogResponses::parse(&[raw.to_string()]);
        assert!(
            matches!(result, Err(ArgumentError::InvalidDialogResponse { .. })),
            "{} should be rejected",
            raw
        );
    }
}

#[test]
fn test_fileResponses_withBrokenJsonList_shouldFail() {
    let result = FileResponses::parse(&["[\"a.srt\"".to_string()]);
    assert!(matches!(result, Err(ArgumentError::InvalidFileResponse { .. })));
}

#[test]
fn test_messageBox_shouldLogAtIconSeverity() {
    let logs = common::capture_logs();
    let dialogs = DialogResponder::default();

    assert_eq!(dialogs.message_box(MessageIcon::Error, "Oops", "broken b2d1"), DialogResult::Ok);
    dialogs.message_box(MessageIcon::Warning, "Careful", "warning b2d1");
    dialogs.message_box(MessageIcon::Information, "Note", "info b2d1");

    assert!(logs.contains(Level::Error, "Oops: broken b2d1"));
    assert!(logs.contains(Level::Warn, "Careful: warning b2d1"));
    assert!(logs.contains(Level::Info, "Note: info b2d1"));
}
