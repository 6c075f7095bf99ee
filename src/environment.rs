/*!
 * Process-wide collaborators of a run.
 *
 * The environment is built once at startup, in a fixed order, and then passed
 * by reference to everything that needs it. Each bootstrap step is named so a
 * failure reports the step that was running.
 */

use log::{debug, warn};
use std::path::{Path, PathBuf};

use crate::app_config::{Config, ConfigSource, LogLevel};
use crate::automation::{JsonScriptFactory, ScriptFactoryRegistry};
use crate::commands::CommandRegistry;
use crate::crash_writer::CrashWriter;
use crate::errors::InitError;
use crate::file_utils::FileManager;
use crate::logging::{self, FileEmitter, Subscription};
use crate::path_tokens::PathResolver;

/// Default config file, relative to the user directory
const CONFIG_FILENAME: &str = "config.json";

/// How to bootstrap the environment
#[derive(Debug, Clone, Default)]
pub struct EnvironmentOptions {
    /// Replaces the `?user` directory
    pub user_dir: Option<PathBuf>,

    /// Config file; `?user/config.json` when unset
    pub config_path: Option<PathBuf>,

    /// Overrides the configured log level
    pub log_level: Option<LogLevel>,

    /// Chain the crash-report panic hook
    pub install_crash_handler: bool,
}

/// Shared state of the process
pub struct Environment {
    // @field: Token expansion for configured paths
    paths: PathResolver,

    // @field: Loaded configuration
    config: Config,

    // @field: Where the configuration lives
    config_path: PathBuf,

    // @field: Built-in commands
    commands: CommandRegistry,

    // @field: Script engines
    script_factories: ScriptFactoryRegistry,

    // @field: Startup steps that completed, in order
    completed_steps: Vec<&'static str>,

    // @field: Configured log file, detached when the environment is dropped
    _log_file: Option<Subscription>,

    // @field: Declared last so it is dropped last
    crash_writer: CrashWriter,
}

impl Environment {
    /// Build every collaborator in startup order
    pub fn initialize(options: EnvironmentOptions) -> Result<Self, InitError> {
        let mut completed_steps = Vec::new();

        let paths = PathResolver::new(options.user_dir.as_deref())?;
        let user_dir = paths
            .token("?user")
            .map(Path::to_path_buf)
            .ok_or(InitError::NoUserDirectory)?;
        FileManager::ensure_dir(&user_dir).map_err(|e| step_error("paths", e))?;
        completed_steps.push("paths");

        let mut crash_writer = CrashWriter::new(&user_dir);
        if options.install_crash_handler {
            crash_writer.install();
        }
        completed_steps.push("crash writer");

        let config_path = options
            .config_path
            .clone()
            .unwrap_or_else(|| user_dir.join(CONFIG_FILENAME));
        let (mut config, source) =
            Config::load_or_create(&config_path).map_err(|e| step_error("config", e))?;

        // The file emitter needs the configured path, so it follows the config load
        let log_file = config
            .log_file
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(|log_file| {
                let log_path = paths.decode(log_file);
                debug!("Logging to {:?}", log_path);
                logging::subscribe_scoped(Box::new(FileEmitter::new(log_path)))
            });
        completed_steps.push("log file");

        let level = options.log_level.unwrap_or(config.log_level);
        log::set_max_level(level.to_level_filter());

        // An invalid file is left for the user to fix
        if source != ConfigSource::InvalidFallback && config.remember_version(env!("CARGO_PKG_VERSION")) {
            if let Err(e) = config.save(&config_path) {
                warn!("Failed to store the running version: {:#}", e);
            }
        }
        completed_steps.push("config");

        let commands = CommandRegistry::with_builtins();
        debug!("Registered {} commands", commands.len());
        completed_steps.push("commands");

        let mut script_factories = ScriptFactoryRegistry::new();
        script_factories.register(Box::new(JsonScriptFactory));
        debug!("Script engines handle {}", script_factories.wildcards());
        completed_steps.push("script factories");

        Ok(Self {
            paths,
            config,
            config_path,
            commands,
            script_factories,
            completed_steps,
            _log_file: log_file,
            crash_writer,
        })
    }

    pub fn paths(&self) -> &PathResolver {
        &self.paths
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn commands(&self) -> &CommandRegistry {
        &self.commands
    }

    pub fn script_factories(&self) -> &ScriptFactoryRegistry {
        &self.script_factories
    }

    pub fn crash_writer(&self) -> &CrashWriter {
        &self.crash_writer
    }

    /// Startup steps in the order they completed
    pub fn completed_steps(&self) -> &[&'static str] {
        &self.completed_steps
    }

    /// Autoload directories from the configuration, still tokenised
    pub fn autoload_dirs(&self) -> impl Iterator<Item = &str> {
        self.config.automation.autoload_dirs()
    }
}

fn step_error(step: &'static str, reason: impl std::fmt::Display) -> InitError {
    InitError::Step {
        step,
        reason: format!("{:#}", reason),
    }
}
