/*!
 * Command-line options.
 *
 * The raw options are parsed with clap and then resolved into a [`RunMode`].
 * Resolution validates every value (line ranges, dialog answers, file
 * answers) so malformed input is reported before any file is opened.
 */

use clap::{Parser, ValueEnum};
use clap_complete::Shell;
use std::path::{Path, PathBuf};

use crate::app_config::LogLevel;
use crate::dialogs::{DialogResponses, FileResponses};
use crate::errors::ArgumentError;
use crate::selection::{self, LineIndexSet};

/// CLI wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LogLevel::Error,
            CliLogLevel::Warn => LogLevel::Warn,
            CliLogLevel::Info => LogLevel::Info,
            CliLogLevel::Debug => LogLevel::Debug,
            CliLogLevel::Trace => LogLevel::Trace,
        }
    }
}

/// submacro - run subtitle editing macros without a user interface
///
/// Loads a subtitle file, runs one automation macro or built-in command
/// against a selection of its lines, and saves the result.
#[derive(Parser, Debug)]
#[command(name = "submacro")]
#[command(version)]
#[command(about = "Run subtitle editing macros from the command line")]
#[command(long_about = "submacro loads a subtitle file, runs an automation macro or built-in command on it and saves the result.

EXAMPLES:
    submacro --cli in.srt out.srt edit/line/delete --selected-lines 0-2
    submacro --cli in.srt out.srt \"Strip tags\" --automation cleanup.json
    submacro --cli in.srt out.srt Export --dialog '{\"format\": \"SRT\"}' --file out/part.srt

DIALOGS:
    Prompts raised by a macro are answered from --dialog and --file values.
    Answers are used last first; a prompt with no usable answer takes its first choice.")]
pub struct CommandLineOptions {
    /// Subtitle file to load
    #[arg(value_name = "IN_FILE")]
    pub in_file: Option<PathBuf>,

    /// Where to save the result
    #[arg(value_name = "OUT_FILE")]
    pub out_file: Option<PathBuf>,

    /// Macro display name or command identifier to run
    #[arg(value_name = "MACRO")]
    pub macro_name: Option<String>,

    /// Run headless
    #[arg(long)]
    pub cli: bool,

    /// Video file to attach
    #[arg(long, value_name = "FILE")]
    pub video: Option<PathBuf>,

    /// Timecode file (format v2)
    #[arg(long, value_name = "FILE")]
    pub timecodes: Option<PathBuf>,

    /// Keyframe file (format v1)
    #[arg(long, value_name = "FILE")]
    pub keyframes: Option<PathBuf>,

    /// Automation script to load; may be repeated
    #[arg(long, value_name = "SCRIPT")]
    pub automation: Vec<String>,

    /// Zero-based index of the active line, -1 for none
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub active_line: i64,

    /// Lines to select, e.g. "0,2-4"; empty selects every line
    #[arg(long, default_value = "")]
    pub selected_lines: String,

    /// Dialog answers as a JSON object, e.g. '{"key": ["A", "B"]}'; may be repeated
    #[arg(long, value_name = "JSON")]
    pub dialog: Vec<String>,

    /// File picker answer, a path or a JSON array of paths; may be repeated
    #[arg(long, value_name = "PATH")]
    pub file: Vec<String>,

    /// Configuration file path
    #[arg(long, env = "SUBMACRO_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory used in place of the per-user directory
    #[arg(long, env = "SUBMACRO_USER_DIR", value_name = "DIR")]
    pub user_dir: Option<PathBuf>,

    /// Set logging level
    #[arg(long, value_enum)]
    pub log_level: Option<CliLogLevel>,

    /// Print shell completions and exit
    #[arg(long, value_enum, hide = true, value_name = "SHELL")]
    pub generate_completions: Option<Shell>,
}

/// Validated inputs of a headless run
#[derive(Debug, Clone)]
pub struct HeadlessArgs {
    pub in_file: PathBuf,
    pub out_file: PathBuf,
    pub macro_name: String,
    pub video: Option<PathBuf>,
    pub timecodes: Option<PathBuf>,
    pub keyframes: Option<PathBuf>,
    pub automation: Vec<String>,
    pub active_line: i64,
    pub selected_lines: LineIndexSet,
    pub dialogs: DialogResponses,
    pub files: FileResponses,
}

impl HeadlessArgs {
    /// Arguments for running `macro_name` over every line
    pub fn new(in_file: PathBuf, out_file: PathBuf, macro_name: impl Into<String>) -> Self {
        Self {
            in_file,
            out_file,
            macro_name: macro_name.into(),
            video: None,
            timecodes: None,
            keyframes: None,
            automation: Vec::new(),
            active_line: -1,
            selected_lines: LineIndexSet::new(),
            dialogs: DialogResponses::new(),
            files: FileResponses::new(),
        }
    }
}

/// What the process should do
#[derive(Debug, Clone)]
pub enum RunMode {
    /// No `--cli` flag; the graphical front-end was requested
    Gui,
    /// `--cli` without a macro; print usage
    Usage,
    /// Print shell completions
    Completions(Shell),
    /// Run a macro
    Headless(HeadlessArgs),
}

impl CommandLineOptions {
    /// Decide the run mode and validate every value it needs
    pub fn resolve(&self) -> Result<RunMode, ArgumentError> {
        if let Some(shell) = self.generate_completions {
            return Ok(RunMode::Completions(shell));
        }
        if !self.cli {
            return Ok(RunMode::Gui);
        }

        let (Some(in_file), Some(out_file), Some(macro_name)) =
            (&self.in_file, &self.out_file, &self.macro_name)
        else {
            return Ok(RunMode::Usage);
        };

        let selected_lines = selection::parse_range(&self.selected_lines)?;
        let dialogs = DialogResponses::parse(&self.dialog)?;
        let files = FileResponses::parse(&self.file)?;

        Ok(RunMode::Headless(HeadlessArgs {
            in_file: absolute(in_file)?,
            out_file: absolute(out_file)?,
            macro_name: macro_name.clone(),
            video: self.video.as_deref().map(absolute).transpose()?,
            timecodes: self.timecodes.as_deref().map(absolute).transpose()?,
            keyframes: self.keyframes.as_deref().map(absolute).transpose()?,
            automation: self.automation.clone(),
            active_line: self.active_line,
            selected_lines,
            dialogs,
            files,
        }))
    }
}

fn absolute(path: &Path) -> Result<PathBuf, ArgumentError> {
    std::path::absolute(path)
        .map_err(|e| ArgumentError::Syntax(format!("Invalid path {:?}: {}", path, e)))
}
