// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use clap::{CommandFactory, Parser};
use clap::error::ErrorKind;
use clap_complete::generate;
use log::{error, info, LevelFilter};

use submacro::cli_options::{CommandLineOptions, RunMode};
use submacro::environment::{Environment, EnvironmentOptions};
use submacro::errors::ExitStatus;
use submacro::logging::{self, ConsoleEmitter};
use submacro::HeadlessDriver;

fn main() {
    let status = run();
    log::logger().flush();
    std::process::exit(status.code());
}

fn run() -> ExitStatus {
    // Info until the configuration says otherwise
    if let Err(e) = logging::init(LevelFilter::Info) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitStatus::InitFailure;
    }
    logging::subscribe(Box::new(ConsoleEmitter));

    let options = match CommandLineOptions::try_parse() {
        Ok(options) => options,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitStatus::Success,
                _ => ExitStatus::Failure,
            };
        }
    };

    let args = match options.resolve() {
        Ok(RunMode::Headless(args)) => args,
        Ok(RunMode::Usage) => {
            println!("Too few arguments.");
            let _ = CommandLineOptions::command().print_help();
            return ExitStatus::Success;
        }
        Ok(RunMode::Completions(shell)) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "submacro", &mut std::io::stdout());
            return ExitStatus::Success;
        }
        Ok(RunMode::Gui) => {
            error!("The graphical interface is not available in this build. Use --cli to run a macro.");
            return ExitStatus::Failure;
        }
        Err(e) => {
            error!("{}", e);
            return ExitStatus::from(&e);
        }
    };

    let env = match Environment::initialize(EnvironmentOptions {
        user_dir: options.user_dir.clone(),
        config_path: options.config.clone(),
        log_level: options.log_level.map(Into::into),
        install_crash_handler: true,
    }) {
        Ok(env) => env,
        Err(e) => {
            error!("{}", e);
            return ExitStatus::from(&e);
        }
    };

    let mut driver = HeadlessDriver::new(&env);
    match driver.run(&args) {
        Ok(report) => {
            for fallback in &report.fallbacks {
                info!("Prompt \"{}\" used its default answer", fallback.caption);
            }
            ExitStatus::Success
        }
        Err(e) => {
            error!("{}", e);
            ExitStatus::from(&e)
        }
    }
}
