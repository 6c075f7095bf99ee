/*!
 * Tests for SubRip document loading and saving
 */

use anyhow::Result;
use std::collections::BTreeSet;
use std::fs;

use submacro::document::{DocumentError, SubtitleDocument, SubtitleLine};

use crate::common;

#[test]
fn test_load_withSampleFile_shouldKeepOrderAndAssignIds() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_subtitle(temp_dir.path(), "sample.srt")?;

    let document = SubtitleDocument::load(&path)?;

    assert_eq!(document.len(), 4);
    assert_eq!(document.source_file, path);
    assert_eq!(common::texts(&document)[2], "<i>Third</i> line");

    let ids: BTreeSet<_> = document.lines().iter().map(|l| l.id).collect();
    assert_eq!(ids.len(), 4, "ids should be distinct");
    Ok(())
}

#[test]
fn test_load_withEmptyFile_shouldReject() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "empty.srt", "\n\n")?;

    let result = SubtitleDocument::load(&path);
    assert!(matches!(result, Err(DocumentError::Empty)));
    Ok(())
}

#[test]
fn test_load_withMissingFile_shouldReturnIoError() {
    let result = SubtitleDocument::load("/definitely/not/here.srt");
    assert!(matches!(result, Err(DocumentError::Io(_))));
}

#[test]
fn test_save_shouldRenumberAndRoundTrip() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut document = common::sample_document();
    let second = document.lines()[1].id;
    document.remove_where(|id| id == second);

    let out = temp_dir.path().join("nested").join("out.srt");
    document.save(&out)?;

    let content = fs::read_to_string(&out)?;
    assert!(content.starts_with("1\n00:00:01,000 --> 00:00:02,000\nFirst line\n\n2\n00:00:05,000"));

    let reloaded = SubtitleDocument::load(&out)?;
    assert_eq!(common::texts(&reloaded), common::texts(&document));
    Ok(())
}

#[test]
fn test_insert_shouldKeepIdsStableWhenPositionsShift() {
    let mut document = common::sample_document();
    let third = document.lines()[2].id;

    let inserted = document.insert(0, 0, 500, "new".to_string());

    assert_eq!(document.position(third), Some(3));
    assert_eq!(document.position(inserted), Some(0));
    assert_ne!(inserted, third);
}

#[test]
fn test_shift_withNegativeOffset_shouldClampAtZero() {
    let mut document = common::sample_document();
    let id = document.lines()[0].id;
    let line = document.get_mut(id).unwrap();
    line.shift(-1500);
    assert_eq!((line.start_ms, line.end_ms), (0, 500));
}

#[test]
fn test_formatTimestamp_shouldUseSrtLayout() {
    assert_eq!(SubtitleLine::format_timestamp(3_723_004), "01:02:03,004");
}

#[test]
fn test_sortByStart_shouldBeStable() {
    let mut document = SubtitleDocument::new("x.srt".into());
    document.push(2000, 3000, "b".to_string());
    document.push(1000, 1500, "a1".to_string());
    document.push(1000, 1200, "a2".to_string());

    document.sort_by_start();

    assert_eq!(common::texts(&document), vec!["a1", "a2", "b"]);
}
