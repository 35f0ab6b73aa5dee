use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::FmtSubscriber;

use belt_cli::cli::{Cli, Commands, ConfigCommands};

mod commands;

fn run(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Solve(args) => commands::solve::handle(args),
        Commands::Model(args) => commands::model::handle(args),
        Commands::Config { command } => match command {
            ConfigCommands::Init { path, force } => commands::config::init(path, *force),
            ConfigCommands::Show(args) => commands::config::show(args),
        },
        Commands::Completions { shell, out } => {
            commands::completions::handle(*shell, out.as_deref())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(std::io::stderr)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")
    {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
