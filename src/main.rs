//! `comix`: inspect, tag and convert comic book archives.

mod cli;
mod commands;
mod error;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};
use clap::Parser;
use comix_config::Config;
use exn::ResultExt;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    tracing::debug!(?config, "Loaded configuration");
    match cli.command {
        Command::Info { file } => commands::info(config.tools(), &file),
        Command::Get { file, field } => commands::get(config.tools(), &file, field),
        Command::Set { file, assignments } => commands::set(config.tools(), &file, &assignments),
        Command::Convert { file, to } => commands::convert(&config, &file, to.as_deref()),
        Command::List { directory } => commands::list(&directory),
    }
}
