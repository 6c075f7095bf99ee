/*!
 * Automation scripts.
 *
 * This module contains:
 * - `locator`: resolving a script reference to a file
 * - `json_script`: the JSON macro script engine
 * - the [`ScriptFactory`] seam that turns a file into a [`Script`]
 */

use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod json_script;
pub mod locator;

pub use json_script::{JsonScriptFactory, ScriptMacro};
pub use locator::find_script;

/// Errors raised while loading a script file
#[derive(Error, Debug)]
pub enum ScriptLoadError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("invalid script: {0}")]
    Invalid(String),

    #[error("no script engine recognises this file")]
    Unrecognised,
}

/// One loaded automation script and the macros it exposes
#[derive(Debug)]
pub struct Script {
    pub path: PathBuf,
    pub name: String,
    pub description: String,
    pub author: String,
    pub version: String,
    macros: Vec<ScriptMacro>,
}

impl Script {
    pub fn new(path: PathBuf, name: String, macros: Vec<ScriptMacro>) -> Self {
        Self {
            path,
            name,
            description: String::new(),
            author: String::new(),
            version: String::new(),
            macros,
        }
    }

    /// Macros in the order the script exposes them
    pub fn macros(&self) -> &[ScriptMacro] {
        &self.macros
    }
}

/// A script engine
///
/// Each engine decides which files it understands and builds scripts from
/// them ready to run.
pub trait ScriptFactory: Send + Sync {
    /// Name of the engine, for logs
    fn engine_name(&self) -> &str;

    /// File pattern the engine handles, e.g. `*.json`
    fn filter(&self) -> &str;

    /// Whether this engine handles the file
    fn recognises(&self, path: &Path) -> bool;

    /// Load the script for execution
    fn produce(&self, path: &Path) -> Result<Script, ScriptLoadError>;
}

/// Registered script engines, asked in registration order
#[derive(Default)]
pub struct ScriptFactoryRegistry {
    factories: Vec<Box<dyn ScriptFactory>>,
}

impl ScriptFactoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, factory: Box<dyn ScriptFactory>) {
        self.factories.push(factory);
    }

    /// Load a script with the first engine that recognises the file.
    ///
    /// Files no engine recognises are an error rather than a placeholder.
    pub fn create_from_file(&self, path: &Path) -> Result<Script, ScriptLoadError> {
        let factory = self
            .factories
            .iter()
            .find(|f| f.recognises(path))
            .ok_or(ScriptLoadError::Unrecognised)?;
        log::debug!("Loading {:?} with the {} engine", path, factory.engine_name());
        factory.produce(path)
    }

    /// Patterns of every registered engine, `;` separated
    pub fn wildcards(&self) -> String {
        self.factories
            .iter()
            .map(|f| f.filter())
            .collect::<Vec<_>>()
            .join(";")
    }
}
