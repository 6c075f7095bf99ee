/*!
 * Tests for the log sink and its emitters
 */

use anyhow::Result;
use log::{warn, Level, LevelFilter};
use std::fs;

use submacro::file_utils::FileManager;
use submacro::logging::{self, Emitter, FileEmitter, LogEntry, MemoryEmitter};

use crate::common;

#[test]
fn test_init_calledTwice_shouldSucceed() {
    assert!(logging::init(LevelFilter::Info).is_ok());
    assert!(logging::init(LevelFilter::Info).is_ok());
}

#[test]
fn test_memoryEmitter_shouldCaptureRecordsThroughFacade() {
    let logs = common::capture_logs();

    warn!("sink check 4e02");

    assert!(logs.contains(Level::Warn, "sink check 4e02"));
    assert!(!logs.contains(Level::Error, "sink check 4e02"));
}

#[test]
fn test_subscribeScoped_afterDrop_shouldStopReceiving() {
    logging::init(LevelFilter::Info).unwrap();
    let emitter = MemoryEmitter::new();
    let subscription = logging::subscribe_scoped(Box::new(emitter.clone()));

    warn!("scoped check 71c9 kept");
    drop(subscription);
    warn!("scoped check 71c9 dropped");

    assert!(emitter.contains(Level::Warn, "scoped check 71c9 kept"));
    assert!(!emitter.contains(Level::Warn, "scoped check 71c9 dropped"));
}

#[test]
fn test_memoryEmitter_clones_shouldShareEntries() {
    let emitter = MemoryEmitter::new();
    let handle = emitter.clone();
    emitter.emit(&LogEntry {
        level: Level::Info,
        target: "test".to_string(),
        message: "shared".to_string(),
        time: chrono::Local::now(),
    });
    assert_eq!(handle.entries().len(), 1);
}

#[test]
fn test_fileEmitter_shouldAppendTimestampedLines() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("logs").join("run.log");
    let emitter = FileEmitter::new(path.clone());

    for message in ["one", "two"] {
        emitter.emit(&LogEntry {
            level: Level::Warn,
            target: "submacro".to_string(),
            message: message.to_string(),
            time: chrono::Local::now(),
        });
    }

    assert!(FileManager::file_exists(&path));
    let content = fs::read_to_string(&path)?;
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with('['));
    assert!(lines[0].ends_with("WARN submacro: one"));
    assert!(lines[1].ends_with("WARN submacro: two"));
    Ok(())
}
