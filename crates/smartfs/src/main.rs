use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;
use log::debug;
use smartfs_lib::cli::commands::{Cli, Commands};
use smartfs_lib::commands::{resolve_target, EXIT_FAILURE};
use smartfs_lib::{AttributeStore, CommandError, Config, VersionCommands};
use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger with specified or default log level
    let env = match cli.log_level {
        Some(ref log_level) => Env::default().filter_or("RUST_LOG", log_level),
        None => Env::default().filter_or("RUST_LOG", "warn"),
    };
    env_logger::init_from_env(env);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => match err.downcast_ref::<CommandError>() {
            Some(command_err) if command_err.is_broken_pipe() => {
                debug!("Output closed early: {}", command_err);
                ExitCode::SUCCESS
            }
            Some(command_err) => {
                eprintln!("{}", command_err);
                ExitCode::from(command_err.exit_code())
            }
            None => {
                eprintln!("Error: {:#}", err);
                ExitCode::from(EXIT_FAILURE)
            }
        },
    }
}

fn run(command: Commands) -> Result<()> {
    let config = Config::load().with_context(|| "Failed to load configuration")?;
    debug!("Using configuration {:?}", config);

    let attrs = config
        .attributes
        .backend
        .open()
        .with_context(|| "Failed to open extended attribute backend")?;
    let commands = VersionCommands::from_config(attrs, &config);

    dispatch(&commands, &config, command)?;
    Ok(())
}

fn dispatch<A: AttributeStore>(
    commands: &VersionCommands<A>,
    config: &Config,
    command: Commands,
) -> Result<(), CommandError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match command {
        Commands::List { file, format } => {
            commands.list(&file, format, &mut out)?;
        }
        Commands::Snapshot { file, message } => {
            let message = message.unwrap_or_else(|| config.snapshot.default_message.clone());
            commands.snapshot(&file, &message, &mut out)?;
        }
        Commands::Pin { file, version } => {
            commands.pin(&file, &version, &mut out)?;
        }
        Commands::Cat { file, version } => {
            let target = resolve_target(&file, version.as_deref())?;
            commands.cat(&target, &mut out)?;
        }
        Commands::Recover { file, version } => {
            let target = resolve_target(&file, version.as_deref())?;
            let stdin = io::stdin();
            commands.recover(&target, &mut stdin.lock(), &mut out)?;
        }
    }

    out.flush()?;
    Ok(())
}
