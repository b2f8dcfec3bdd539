mod cli;
mod commands;
mod model;
mod presentation;
mod util;
mod webdriver;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::model::CommandStatus;

fn main() {
    init_tracing();

    match run() {
        Ok(status) => std::process::exit(status.exit_code()),
        Err(err) => {
            error!(error = %err, "command failed");
            for cause in err.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            std::process::exit(1);
        }
    }
}

fn run() -> Result<CommandStatus> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => commands::build::run(args),
        Commands::Check(args) => commands::sweep::run_check(args),
        Commands::Review(args) => commands::sweep::run_review(args),
        Commands::Capture(args) => commands::capture::run(args),
        Commands::CaptureSlide(args) => commands::capture::run_single(args),
        Commands::Measure(args) => commands::measure::run(args),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
