//! Larder CLI - pantry tracking with an AI chef.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pantry { command } => commands::pantry::run(&cli.store, cli.user, command),

        Commands::Chef { command } => commands::chef::run(&cli.store, cli.user, command),

        Commands::Bill { image, mime, save } => {
            commands::bill::run(&cli.store, cli.user, &image, &mime, save)
        }

        Commands::Analyze { image, mime } => commands::analyze::run(&image, &mime),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}
