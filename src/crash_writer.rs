/*!
 * Crash reporting.
 *
 * Once installed, a panic anywhere in the process appends the panic message,
 * its location and a backtrace to the crash log before the default hook runs.
 */

use std::backtrace::Backtrace;
use std::panic;
use std::path::{Path, PathBuf};

use crate::file_utils::FileManager;

/// Crash log file name inside the user directory
const CRASH_LOG_FILENAME: &str = "crashlog.txt";

/// Writes crash reports under the user directory
#[derive(Debug)]
pub struct CrashWriter {
    path: PathBuf,
    installed: bool,
}

impl CrashWriter {
    pub fn new(user_dir: &Path) -> Self {
        Self {
            path: user_dir.join(CRASH_LOG_FILENAME),
            installed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Chain a panic hook that records the crash before the previous hook runs
    pub fn install(&mut self) {
        if self.installed {
            return;
        }
        let path = self.path.clone();
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::force_capture();
            let report = format!("{}\n{}", info, backtrace);
            let _ = FileManager::append_to_log_file(&path, &report);
            previous(info);
        }));
        self.installed = true;
    }

    /// Append an explicit error report
    pub fn write(&self, message: &str) -> std::io::Result<()> {
        FileManager::append_to_log_file(&self.path, message)
    }
}

impl Drop for CrashWriter {
    fn drop(&mut self) {
        if self.installed && !std::thread::panicking() {
            // Restores the default hook
            let _ = panic::take_hook();
        }
    }
}
