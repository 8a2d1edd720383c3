//! x402-router CLI - pay-per-call API routing from the command line

mod balance_command;
mod call_command;
mod cli;
mod colors;
mod config_commands;
mod config_utils;
mod errors;
mod exit_codes;
mod init_command;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, ColorMode, Commands, ConfigCommands};
use colored::control;
use exit_codes::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    init_color_support(&cli);
    init_tracing(&cli);

    if let Err(e) = run(cli).await {
        eprintln!("{}", errors::format_error_with_suggestion(&e));
        ExitCode::from(&e).exit();
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_ref();

    match &cli.command {
        Commands::Init {
            keypair,
            chain,
            registry,
        } => init_command::init_command(config, keypair, *chain, registry.as_deref()),

        Commands::Call(args) => call_command::call_command(config, args).await,

        Commands::Balance { chain } => balance_command::balance_command(config, *chain).await,

        Commands::Config { command } => match command {
            None => config_commands::show_command(config),
            Some(ConfigCommands::Get { key }) => config_commands::get_command(config, key),
            Some(ConfigCommands::Set { key, value }) => {
                config_commands::set_command(config, key, value)
            }
        },
    }
}

/// Log to stderr. `RUST_LOG` wins over `-v` / `-q`.
fn init_tracing(cli: &Cli) {
    let filter = match std::env::var("RUST_LOG") {
        Ok(directives) if !cli.quiet => EnvFilter::new(directives),
        _ => EnvFilter::new(cli.log_directive()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Initialize color support based on user preference and NO_COLOR env var
fn init_color_support(cli: &Cli) {
    use std::io::IsTerminal;
    let no_color_env = std::env::var("NO_COLOR").is_ok();

    match cli.color {
        ColorMode::Always => control::set_override(true),
        ColorMode::Never => control::set_override(false),
        ColorMode::Auto => {
            if no_color_env || !std::io::stdout().is_terminal() {
                control::set_override(false);
            }
        }
    }
}
