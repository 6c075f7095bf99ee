/*!
 * Process-wide log sink.
 *
 * The `log` facade is routed into a single [`LogSink`] which fans every record
 * out to the emitters subscribed to it. The console emitter is subscribed by
 * the binary at startup; the environment adds a file emitter when a log file
 * is configured, and tests subscribe a [`MemoryEmitter`] to inspect output.
 */

use chrono::{DateTime, Local};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use std::io::Write;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::file_utils::FileManager;

static SINK: Lazy<LogSink> = Lazy::new(LogSink::new);
static NEXT_SUBSCRIPTION: AtomicU64 = AtomicU64::new(0);

/// One formatted log record
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: Level,
    pub target: String,
    pub message: String,
    pub time: DateTime<Local>,
}

/// Destination for log entries
pub trait Emitter: Send + Sync {
    fn emit(&self, entry: &LogEntry);

    fn flush(&self) {}
}

/// Fans records out to every subscribed emitter
pub struct LogSink {
    emitters: RwLock<Vec<(u64, Box<dyn Emitter>)>>,
}

impl LogSink {
    fn new() -> Self {
        Self { emitters: RwLock::new(Vec::new()) }
    }
}

impl Log for LogSink {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let entry = LogEntry {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
            time: Local::now(),
        };
        for (_, emitter) in self.emitters.read().iter() {
            emitter.emit(&entry);
        }
    }

    fn flush(&self) {
        for (_, emitter) in self.emitters.read().iter() {
            emitter.flush();
        }
    }
}

/// Install the sink as the global logger. Calling it again only adjusts the level.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    let result = log::set_logger(&*SINK);
    log::set_max_level(level);
    match result {
        Ok(()) => Ok(()),
        // Already installed by an earlier call in this process
        Err(_) if is_installed() => Ok(()),
        Err(e) => Err(e),
    }
}

fn is_installed() -> bool {
    std::ptr::addr_eq(log::logger() as *const dyn Log, &*SINK as *const LogSink)
}

fn attach(emitter: Box<dyn Emitter>) -> u64 {
    let id = NEXT_SUBSCRIPTION.fetch_add(1, Ordering::Relaxed);
    SINK.emitters.write().push((id, emitter));
    id
}

/// Subscribe an emitter for the rest of the process
pub fn subscribe(emitter: Box<dyn Emitter>) {
    attach(emitter);
}

/// Subscribe an emitter until the returned handle is dropped
#[must_use = "dropping the subscription detaches the emitter"]
pub fn subscribe_scoped(emitter: Box<dyn Emitter>) -> Subscription {
    Subscription { id: attach(emitter) }
}

/// Detaches its emitter from the sink on drop
#[derive(Debug)]
pub struct Subscription {
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let id = self.id;
        SINK.emitters.write().retain(|(other, _)| *other != id);
    }
}

// @struct: Coloured stderr output
pub struct ConsoleEmitter;

impl ConsoleEmitter {
    // @returns: Emoji for log level
    fn emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌",
            Level::Warn => "🚧",
            Level::Info => " ",
            Level::Debug => "🔍",
            Level::Trace => "📋",
        }
    }

    // @returns: ANSI colour code for log level
    fn colour_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Emitter for ConsoleEmitter {
    fn emit(&self, entry: &LogEntry) {
        let now = entry.time.format("%H:%M:%S%.3f");
        let mut stderr = std::io::stderr();
        let _ = writeln!(
            stderr,
            "\x1B[{}m{} {} {}\x1B[0m",
            Self::colour_for_level(entry.level),
            now,
            Self::emoji_for_level(entry.level),
            entry.message
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

// @struct: Plain-text log file output
pub struct FileEmitter {
    path: PathBuf,
}

impl FileEmitter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Emitter for FileEmitter {
    fn emit(&self, entry: &LogEntry) {
        let line = format!("{} {}: {}", entry.level, entry.target, entry.message);
        // Write failures are dropped
        let _ = FileManager::append_to_log_file(&self.path, &line);
    }
}

/// Keeps entries in memory; cloned handles share the same buffer
#[derive(Clone, Default)]
pub struct MemoryEmitter {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }

    /// True if any entry at `level` contains `needle`
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.entries
            .lock()
            .iter()
            .any(|e| e.level == level && e.message.contains(needle))
    }
}

impl Emitter for MemoryEmitter {
    fn emit(&self, entry: &LogEntry) {
        self.entries.lock().push(entry.clone());
    }
}
