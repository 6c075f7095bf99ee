/*!
 * # submacro - headless subtitle macro runner
 *
 * A Rust library for running subtitle editing macros without a user
 * interface: load a subtitle file, pick the lines to work on, run an
 * automation macro or a built-in command, save the result.
 *
 * ## Features
 *
 * - SubRip documents with stable line ids
 * - Optional video, timecode (v2) and keyframe (v1) resources
 * - Line selection from an active line and a range expression
 * - JSON automation scripts found directly, relative to the working
 *   directory, or in configured autoload directories
 * - Prompts answered from pre-supplied responses instead of blocking
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `cli_options`: Command-line parsing and validation
 * - `environment`: Startup of shared collaborators
 * - `driver`: The headless run and its macro stages
 * - `document`: Subtitle document model and SRT codec
 * - `project`: Video, timecode and keyframe resources
 * - `selection`: Active line and selected lines
 * - `automation`: Script location and the JSON script engine
 * - `commands`: Command trait, registry and built-in commands
 * - `dialogs`: Non-interactive prompt answers
 * - `session`: State a macro works on
 * - `app_config`: Configuration management
 * - `path_tokens`: `?user`-style path expansion
 * - `logging`: Log sink and emitters
 * - `crash_writer`: Panic reports
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod automation;
pub mod cli_options;
pub mod commands;
pub mod crash_writer;
pub mod dialogs;
pub mod document;
pub mod driver;
pub mod environment;
pub mod errors;
pub mod file_utils;
pub mod logging;
pub mod path_tokens;
pub mod project;
pub mod selection;
pub mod session;

// Re-export main types for easier usage
pub use app_config::Config;
pub use cli_options::{CommandLineOptions, HeadlessArgs, RunMode};
pub use document::{LineId, SubtitleDocument, SubtitleLine};
pub use driver::{HeadlessDriver, MacroStage, RunReport};
pub use environment::{Environment, EnvironmentOptions};
pub use errors::{ExitStatus, RunError};
pub use selection::Selection;
pub use session::Session;
