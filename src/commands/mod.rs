/*!
 * Commands and the global command registry.
 *
 * A command is a named operation over a [`Session`]: it can report whether it
 * applies to the current state and then run. Built-in commands live in the
 * registry under identifiers such as `edit/line/delete`; automation script
 * macros implement the same trait.
 */

use anyhow::Result;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::session::Session;

pub mod builtin;

/// Common trait for everything a run can invoke
///
/// Registered commands and script macros share this interface so the driver
/// can validate and invoke either without knowing where it came from.
pub trait Command {
    /// Identifier, e.g. `edit/line/delete`
    fn name(&self) -> &str;

    /// Text shown for the command in menus
    fn display_name(&self, session: &Session) -> String;

    /// One-line description
    fn help(&self) -> &str;

    /// Whether the command can run against the current state
    fn validate(&self, _session: &Session) -> bool {
        true
    }

    /// Run the command
    fn invoke(&self, session: &mut Session) -> Result<()>;
}

/// No command is registered under the requested identifier
#[derive(Error, Debug, PartialEq, Eq)]
#[error("Command not found: {0}")]
pub struct CommandNotFound(pub String);

/// Enumerable registry of commands keyed by identifier
#[derive(Default)]
pub struct CommandRegistry {
    commands: BTreeMap<String, Box<dyn Command>>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in command
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtin::register_all(&mut registry);
        registry
    }

    /// Register a command, replacing any command with the same identifier
    pub fn register(&mut self, command: Box<dyn Command>) {
        self.commands.insert(command.name().to_string(), command);
    }

    pub fn get(&self, name: &str) -> Result<&dyn Command, CommandNotFound> {
        self.commands
            .get(name)
            .map(|c| -> &dyn Command { &**c })
            .ok_or_else(|| CommandNotFound(name.to_string()))
    }

    /// Commands in identifier order
    pub fn iter(&self) -> impl Iterator<Item = &dyn Command> {
        self.commands.values().map(|c| -> &dyn Command { &**c })
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
