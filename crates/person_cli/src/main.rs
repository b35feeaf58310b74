//! `person` command-line entry point.
//!
//! # Responsibility
//! - Load `.env`, parse arguments, initialize logging.
//! - Open the store once and run a single person operation.
//!
//! # Invariants
//! - A failed connection does not abort startup; the command reports the
//!   store as unavailable instead.

mod args;
mod commands;

use args::Cli;
use clap::Parser;
use log::warn;
use person_core::{init_logging, LogConfig};
use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match LogConfig::from_lookup(|key| cli.setting(key)) {
        Ok(config) => {
            if let Err(err) = init_logging(&config) {
                eprintln!("logging disabled: {err}");
            }
        }
        Err(err) => eprintln!("logging disabled: {err}"),
    }

    let handle = commands::connect(|key| cli.setting(key));
    if !handle.is_connected() {
        warn!("event=cli_start module=cli status=degraded");
    }

    let mut exit_code = ExitCode::SUCCESS;
    commands::run(&handle, cli.command, |result| match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(text) => println!("{text}"),
            Err(err) => {
                eprintln!("error: {err}");
                exit_code = ExitCode::FAILURE;
            }
        },
        Err(err) => {
            eprintln!("error: {err}");
            exit_code = ExitCode::FAILURE;
        }
    });
    exit_code
}
