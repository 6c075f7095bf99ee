/*!
 * JSON macro scripts.
 *
 * A script file names itself and lists macros. Each macro carries the
 * requirements that decide whether it can run and a list of steps:
 *
 * ```json
 * { "name": "Cleanup", "macros": [
 *     { "name": "Strip tags", "requires": { "min_selected": 1 },
 *       "steps": [ { "action": "replace_text", "pattern": "<[^>]+>", "replacement": "" } ] } ] }
 * ```
 *
 * Patterns and line ranges are compiled when the script is loaded, so a bad
 * script fails before any macro runs.
 */

use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::commands::Command;
use crate::dialogs::MessageIcon;
use crate::selection::{self, LineIndexSet};
use crate::session::Session;

use super::{Script, ScriptFactory, ScriptLoadError};

#[derive(Debug, Deserialize)]
struct ScriptManifest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    version: String,
    #[serde(default)]
    macros: Vec<MacroManifest>,
}

#[derive(Debug, Deserialize)]
struct MacroManifest {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    requires: Requirements,
    #[serde(default)]
    steps: Vec<StepManifest>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum StepManifest {
    RunCommand {
        command: String,
    },
    ReplaceText {
        pattern: String,
        #[serde(default)]
        replacement: String,
    },
    ShiftTimes {
        offset_ms: i64,
    },
    Select {
        lines: String,
    },
    Notify {
        #[serde(default)]
        caption: String,
        message: String,
        #[serde(default)]
        icon: MessageIcon,
    },
    Choose {
        key: String,
        #[serde(default)]
        caption: String,
        #[serde(default)]
        message: String,
        options: Vec<OptionManifest>,
    },
    ChangeDirectory {
        path: PathBuf,
    },
}

#[derive(Debug, Deserialize)]
struct OptionManifest {
    label: String,
    #[serde(default)]
    steps: Vec<StepManifest>,
}

/// What a macro needs before it can run
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Requirements {
    pub min_selected: usize,
    pub video: bool,
    pub timecodes: bool,
    pub keyframes: bool,
}

impl Requirements {
    fn satisfied_by(&self, session: &Session) -> bool {
        let project = session.project();
        session.selection().len() >= self.min_selected
            && (!self.video || project.video().is_some())
            && (!self.timecodes || project.timecodes().is_some())
            && (!self.keyframes || project.keyframes().is_some())
    }
}

/// A compiled macro step
#[derive(Debug)]
enum Step {
    RunCommand(String),
    ReplaceText { pattern: Regex, replacement: String },
    ShiftTimes(i64),
    Select(LineIndexSet),
    Notify { caption: String, message: String, icon: MessageIcon },
    Choose {
        key: String,
        caption: String,
        message: String,
        options: Vec<(String, Vec<Step>)>,
    },
    ChangeDirectory(PathBuf),
}

impl Step {
    fn compile(manifest: StepManifest) -> Result<Self, ScriptLoadError> {
        let step = match manifest {
            StepManifest::RunCommand { command } => Step::RunCommand(command),
            StepManifest::ReplaceText { pattern, replacement } => {
                let regex = Regex::new(&pattern).map_err(|e| {
                    ScriptLoadError::Invalid(format!("bad pattern \"{}\": {}", pattern, e))
                })?;
                Step::ReplaceText { pattern: regex, replacement }
            }
            StepManifest::ShiftTimes { offset_ms } => Step::ShiftTimes(offset_ms),
            StepManifest::Select { lines } => {
                let set = selection::parse_range(&lines)
                    .map_err(|e| ScriptLoadError::Invalid(e.to_string()))?;
                Step::Select(set)
            }
            StepManifest::Notify { caption, message, icon } => Step::Notify { caption, message, icon },
            StepManifest::Choose { key, caption, message, options } => {
                if options.is_empty() {
                    return Err(ScriptLoadError::Invalid(format!(
                        "choice \"{}\" has no options",
                        key
                    )));
                }
                let options = options
                    .into_iter()
                    .map(|o| Ok((o.label, compile_steps(o.steps)?)))
                    .collect::<Result<Vec<_>, ScriptLoadError>>()?;
                Step::Choose { key, caption, message, options }
            }
            StepManifest::ChangeDirectory { path } => Step::ChangeDirectory(path),
        };
        Ok(step)
    }

    fn run(&self, session: &mut Session) -> Result<()> {
        match self {
            Step::RunCommand(name) => {
                let command = session.env().commands().get(name)?;
                if !command.validate(session) {
                    return Err(anyhow!("command {} cannot run on the current selection", name));
                }
                debug!("Running command {}", name);
                command.invoke(session)
            }
            Step::ReplaceText { pattern, replacement } => {
                let ids = selected_ids(session);
                let document = session.document_mut();
                let mut changed = 0;
                for id in ids {
                    if let Some(line) = document.get_mut(id) {
                        let replaced = pattern.replace_all(&line.text, replacement.as_str());
                        if replaced != line.text {
                            line.text = replaced.into_owned();
                            changed += 1;
                        }
                    }
                }
                debug!("Replaced text in {} lines", changed);
                Ok(())
            }
            Step::ShiftTimes(offset_ms) => {
                let ids = selected_ids(session);
                let document = session.document_mut();
                for id in ids {
                    if let Some(line) = document.get_mut(id) {
                        line.shift(*offset_ms);
                    }
                }
                Ok(())
            }
            Step::Select(indices) => {
                let selection = selection::resolve(session.document(), -1, indices)?;
                session.set_selection(selection);
                Ok(())
            }
            Step::Notify { caption, message, icon } => {
                session.dialogs().message_box(*icon, caption, message);
                Ok(())
            }
            Step::Choose { key, caption, message, options } => {
                let labels: Vec<String> = options.iter().map(|(label, _)| label.clone()).collect();
                let index = session.dialogs_mut().choose(key, message, caption, &labels);
                let (label, steps) = options
                    .get(index)
                    .ok_or_else(|| anyhow!("choice \"{}\" has no option {}", key, index))?;
                debug!("Choice \"{}\" answered with \"{}\"", key, label);
                run_steps(steps, session)
            }
            Step::ChangeDirectory(path) => std::env::set_current_dir(path)
                .with_context(|| format!("Failed to change directory to {:?}", path)),
        }
    }
}

fn compile_steps(steps: Vec<StepManifest>) -> Result<Vec<Step>, ScriptLoadError> {
    steps.into_iter().map(Step::compile).collect()
}

fn run_steps(steps: &[Step], session: &mut Session) -> Result<()> {
    for step in steps {
        step.run(session)?;
    }
    Ok(())
}

fn selected_ids(session: &Session) -> Vec<crate::document::LineId> {
    session.selection().selected().iter().copied().collect()
}

/// A macro exposed by a JSON script
#[derive(Debug)]
pub struct ScriptMacro {
    name: String,
    description: String,
    requires: Requirements,
    steps: Vec<Step>,
}

impl ScriptMacro {
    pub fn requirements(&self) -> &Requirements {
        &self.requires
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

impl Command for ScriptMacro {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self, _session: &Session) -> String {
        self.name.clone()
    }

    fn help(&self) -> &str {
        &self.description
    }

    fn validate(&self, session: &Session) -> bool {
        self.requires.satisfied_by(session)
    }

    fn invoke(&self, session: &mut Session) -> Result<()> {
        run_steps(&self.steps, session)
    }
}

/// Script engine for `*.json` macro files
#[derive(Debug, Default)]
pub struct JsonScriptFactory;

impl JsonScriptFactory {
    /// Parse a script from its JSON text
    pub fn parse(content: &str, path: &Path) -> Result<Script, ScriptLoadError> {
        let manifest: ScriptManifest = serde_json::from_str(content)
            .map_err(|e| ScriptLoadError::Invalid(e.to_string()))?;

        let macros = manifest
            .macros
            .into_iter()
            .map(|m| {
                Ok(ScriptMacro {
                    name: m.name,
                    description: m.description,
                    requires: m.requires,
                    steps: compile_steps(m.steps)?,
                })
            })
            .collect::<Result<Vec<_>, ScriptLoadError>>()?;

        let name = if manifest.name.is_empty() {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        } else {
            manifest.name
        };

        let mut script = Script::new(path.to_path_buf(), name, macros);
        script.description = manifest.description;
        script.author = manifest.author;
        script.version = manifest.version;
        Ok(script)
    }
}

impl ScriptFactory for JsonScriptFactory {
    fn engine_name(&self) -> &str {
        "JSON"
    }

    fn filter(&self) -> &str {
        "*.json"
    }

    fn recognises(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    }

    fn produce(&self, path: &Path) -> Result<Script, ScriptLoadError> {
        let content = fs::read_to_string(path)?;
        let script = Self::parse(&content, path)?;
        info!(
            "Loaded script \"{}\" with {} macros",
            script.name,
            script.macros().len()
        );
        Ok(script)
    }
}
