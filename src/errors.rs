/*!
 * Error types for the submacro application.
 *
 * This module contains the error taxonomy of a headless run, using the
 * thiserror crate for ergonomic error definitions. Every fatal category maps
 * to a process exit code through [`ExitStatus`].
 */

use std::path::PathBuf;
use thiserror::Error;

use crate::document::DocumentError;
use crate::project::ResourceError;
use crate::selection::SelectionError;

/// Errors raised while turning command-line input into typed options.
///
/// These are always reported before any document I/O happens.
#[derive(Error, Debug)]
pub enum ArgumentError {
    /// The command line could not be parsed at all
    #[error("{0}")]
    Syntax(String),

    /// The `--selected-lines` expression is malformed
    #[error("Invalid line range \"{input}\": {reason}")]
    InvalidRange {
        /// Raw range expression
        input: String,
        /// What was wrong with it
        reason: String,
    },

    /// A `--dialog` value is not a valid response object
    #[error("Invalid dialog response \"{input}\": {reason}")]
    InvalidDialogResponse {
        /// Raw argument value
        input: String,
        /// What was wrong with it
        reason: String,
    },

    /// A `--file` value is not a path or a JSON list of paths
    #[error("Invalid file response \"{input}\": {reason}")]
    InvalidFileResponse {
        /// Raw argument value
        input: String,
        /// What was wrong with it
        reason: String,
    },
}

/// Errors raised while bootstrapping the environment.
#[derive(Error, Debug)]
pub enum InitError {
    /// No usable per-user directory could be determined
    #[error("Could not determine the user configuration directory")]
    NoUserDirectory,

    /// A bootstrap step failed
    #[error("Fatal error while initializing ({step}): {reason}")]
    Step {
        /// Name of the startup step that failed
        step: &'static str,
        /// Underlying cause
        reason: String,
    },
}

/// Errors that abort a headless run.
#[derive(Error, Debug)]
pub enum RunError {
    /// Malformed command-line input
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// The primary document could not be loaded
    #[error("Failed to load subtitles from {path:?}: {source}")]
    DocumentLoad {
        /// Document path
        path: PathBuf,
        /// Underlying cause
        source: DocumentError,
    },

    /// A video, timecode or keyframe resource could not be loaded
    #[error(transparent)]
    Resource(#[from] ResourceError),

    /// Active line / selection could not be established
    #[error(transparent)]
    Selection(#[from] SelectionError),

    /// An automation script reference resolved to no file
    #[error("Could not find script file: {reference}")]
    ScriptNotFound {
        /// The reference exactly as given on the command line
        reference: String,
    },

    /// A script file exists but could not be turned into a script
    #[error("Failed to load script {path:?}: {reason}")]
    ScriptLoad {
        /// Resolved script path
        path: PathBuf,
        /// Underlying cause
        reason: String,
    },

    /// The macro name matched neither a script macro nor a registered command
    #[error("Command not found: {name}")]
    CommandNotFound {
        /// The macro token as given on the command line
        name: String,
    },

    /// The macro's validation predicate returned false
    #[error("Skipping automation because validation function returned false ({name})")]
    ValidationFailed {
        /// Display name of the macro
        name: String,
    },

    /// The macro raised an error while running
    #[error("Macro \"{name}\" failed: {source:#}")]
    Execution {
        /// Display name of the macro
        name: String,
        /// Underlying cause
        source: anyhow::Error,
    },

    /// The working directory captured before script loading could not be restored
    #[error("Failed to restore working directory {path:?}: {source}")]
    WorkingDirectory {
        /// Directory that should have been restored
        path: PathBuf,
        /// Underlying cause
        source: std::io::Error,
    },

    /// Writing the output document failed
    #[error("Failed to save subtitles to {path:?}: {source}")]
    Persistence {
        /// Output path
        path: PathBuf,
        /// Underlying cause
        source: std::io::Error,
    },
}

/// Process exit status of the binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    /// Run completed, or help/usage was printed
    Success,
    /// Any resolution, validation or not-found failure
    Failure,
    /// The environment could not be initialized
    InitFailure,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
            Self::InitFailure => -1,
        }
    }
}

impl From<&RunError> for ExitStatus {
    fn from(_: &RunError) -> Self {
        ExitStatus::Failure
    }
}

impl From<&ArgumentError> for ExitStatus {
    fn from(_: &ArgumentError) -> Self {
        ExitStatus::Failure
    }
}

impl From<&InitError> for ExitStatus {
    fn from(_: &InitError) -> Self {
        ExitStatus::InitFailure
    }
}
