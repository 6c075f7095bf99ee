/*!
 * Headless macro execution.
 *
 * A run loads the document and its resources, resolves the selection, loads
 * the requested scripts, finds the macro, validates it, invokes it and saves
 * the document. The macro moves through [`MacroStage`]s; any failure aborts the
 * run without saving.
 */

use log::{debug, info, warn};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::automation::{self, Script, ScriptMacro};
use crate::cli_options::HeadlessArgs;
use crate::commands::{Command, CommandRegistry};
use crate::dialogs::{DialogFallback, DialogResponder};
use crate::document::SubtitleDocument;
use crate::environment::Environment;
use crate::errors::RunError;
use crate::project::Project;
use crate::selection;
use crate::session::Session;

/// Lifecycle of the macro being run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroStage {
    Unresolved,
    Resolved,
    Validated,
    Executed,
    Saved,
    Aborted,
}

impl fmt::Display for MacroStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MacroStage::Unresolved => "unresolved",
            MacroStage::Resolved => "resolved",
            MacroStage::Validated => "validated",
            MacroStage::Executed => "executed",
            MacroStage::Saved => "saved",
            MacroStage::Aborted => "aborted",
        };
        write!(f, "{}", name)
    }
}

/// Where a resolved macro came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacroOrigin {
    /// A macro exposed by a loaded script
    Script { script: String, path: PathBuf },
    /// A command from the global registry
    Registered,
}

/// A resolved macro
pub enum MacroHandle<'a> {
    Script {
        script: &'a Script,
        command: &'a ScriptMacro,
    },
    Registered(&'a dyn Command),
}

impl<'a> MacroHandle<'a> {
    pub fn command(&self) -> &'a dyn Command {
        match self {
            MacroHandle::Script { command, .. } => *command,
            MacroHandle::Registered(command) => *command,
        }
    }

    pub fn origin(&self) -> MacroOrigin {
        match self {
            MacroHandle::Script { script, .. } => MacroOrigin::Script {
                script: script.name.clone(),
                path: script.path.clone(),
            },
            MacroHandle::Registered(_) => MacroOrigin::Registered,
        }
    }
}

/// Find the macro a run should invoke.
///
/// Script macros are matched on their display name; when several match, the
/// last one in load order wins. Without a script match the name is looked up
/// as a command identifier in the registry.
pub fn resolve_macro<'a>(
    scripts: &'a [Script],
    registry: &'a CommandRegistry,
    name: &str,
    session: &Session,
) -> Result<MacroHandle<'a>, RunError> {
    let mut found = None;
    for script in scripts {
        for command in script.macros() {
            if command.display_name(session) == name {
                found = Some(MacroHandle::Script { script, command });
            }
        }
    }
    if let Some(handle) = found {
        return Ok(handle);
    }

    registry
        .get(name)
        .map(MacroHandle::Registered)
        .map_err(|_| RunError::CommandNotFound {
            name: name.to_string(),
        })
}

/// Outcome of a completed run
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub macro_name: String,
    pub origin: MacroOrigin,
    pub stage: MacroStage,
    pub lines_saved: usize,
    pub output: PathBuf,
    pub fallbacks: Vec<DialogFallback>,
}

/// Restores the working directory captured at creation
struct WorkingDirectoryGuard {
    original: PathBuf,
    restored: bool,
}

impl WorkingDirectoryGuard {
    fn capture() -> Result<Self, RunError> {
        let original = std::env::current_dir().map_err(|source| RunError::WorkingDirectory {
            path: PathBuf::from("."),
            source,
        })?;
        Ok(Self {
            original,
            restored: false,
        })
    }

    fn path(&self) -> &Path {
        &self.original
    }

    fn restore(&mut self) -> Result<(), RunError> {
        self.restored = true;
        std::env::set_current_dir(&self.original).map_err(|source| RunError::WorkingDirectory {
            path: self.original.clone(),
            source,
        })
    }
}

impl Drop for WorkingDirectoryGuard {
    fn drop(&mut self) {
        if !self.restored && std::env::set_current_dir(&self.original).is_err() {
            warn!("Could not restore working directory {:?}", self.original);
        }
    }
}

/// Runs one macro against one document
pub struct HeadlessDriver<'env> {
    env: &'env Environment,
    stage: MacroStage,
}

impl<'env> HeadlessDriver<'env> {
    pub fn new(env: &'env Environment) -> Self {
        Self {
            env,
            stage: MacroStage::Unresolved,
        }
    }

    /// Stage reached by the last run
    pub fn stage(&self) -> MacroStage {
        self.stage
    }

    fn advance(&mut self, stage: MacroStage) {
        debug!("Macro {} -> {}", self.stage, stage);
        self.stage = stage;
    }

    /// Run the macro named in `args` and save the result
    pub fn run(&mut self, args: &HeadlessArgs) -> Result<RunReport, RunError> {
        self.stage = MacroStage::Unresolved;
        let result = self.run_stages(args);
        if result.is_err() {
            self.advance(MacroStage::Aborted);
        }
        result
    }

    fn run_stages(&mut self, args: &HeadlessArgs) -> Result<RunReport, RunError> {
        let env = self.env;

        let document = SubtitleDocument::load(&args.in_file).map_err(|source| {
            RunError::DocumentLoad {
                path: args.in_file.clone(),
                source,
            }
        })?;
        info!("Loaded {} lines from {:?}", document.len(), args.in_file);

        let project = load_project(args)?;
        let selection = selection::resolve(&document, args.active_line, &args.selected_lines)?;
        debug!(
            "Active line {}, {} lines selected",
            selection.active(),
            selection.len()
        );

        let mut cwd = WorkingDirectoryGuard::capture()?;
        let scripts = load_scripts(env, &args.automation, cwd.path())?;

        let dialogs = DialogResponder::new(args.dialogs.clone(), args.files.clone());
        let mut session = Session::new(env, document, project, selection, dialogs);

        let handle = resolve_macro(&scripts, env.commands(), &args.macro_name, &session)?;
        let command = handle.command();
        let origin = handle.origin();
        self.advance(MacroStage::Resolved);

        let display_name = command.display_name(&session);
        if !command.validate(&session) {
            warn!("Skipping automation because validation function returned false");
            return Err(RunError::ValidationFailed { name: display_name });
        }
        self.advance(MacroStage::Validated);

        info!("Running {}", display_name);
        command
            .invoke(&mut session)
            .map_err(|source| RunError::Execution {
                name: display_name.clone(),
                source,
            })?;
        self.advance(MacroStage::Executed);

        // Macros may change directory; the output path was made absolute up front
        cwd.restore()?;

        let (document, fallbacks) = session.finish();
        document
            .save(&args.out_file)
            .map_err(|source| RunError::Persistence {
                path: args.out_file.clone(),
                source,
            })?;
        self.advance(MacroStage::Saved);
        info!("Saved {} lines to {:?}", document.len(), args.out_file);

        Ok(RunReport {
            macro_name: display_name,
            origin,
            stage: self.stage,
            lines_saved: document.len(),
            output: args.out_file.clone(),
            fallbacks,
        })
    }
}

fn load_project(args: &HeadlessArgs) -> Result<Project, RunError> {
    let mut project = Project::new();
    if let Some(video) = &args.video {
        project.load_video(video)?;
    }
    if let Some(timecodes) = &args.timecodes {
        project.load_timecodes(timecodes)?;
    }
    if let Some(keyframes) = &args.keyframes {
        project.load_keyframes(keyframes)?;
    }
    Ok(project)
}

fn load_scripts(env: &Environment, references: &[String], cwd: &Path) -> Result<Vec<Script>, RunError> {
    references
        .iter()
        .map(|reference| {
            let path = automation::find_script(reference, cwd, env.autoload_dirs(), env.paths())?;
            env.script_factories()
                .create_from_file(&path)
                .map_err(|e| RunError::ScriptLoad {
                    path: path.clone(),
                    reason: e.to_string(),
                })
        })
        .collect()
}
