//! mgmtctl command-line entry point.

#![forbid(unsafe_code)]

mod cli_config;
mod commands;
mod output;

use std::process::ExitCode;

use clap::Parser;
use mgmtctl_application::CancellationFlag;
use mgmtctl_core::AppError;
use tracing::{debug, warn};

use crate::cli_config::{CliConfig, init_tracing};
use crate::commands::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let config = match CliConfig::load() {
        Ok(config) => config,
        Err(error) => return report(&error),
    };

    let cancellation = CancellationFlag::new();
    let interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, result of any in-flight request will not be reported");
            interrupt.cancel();
        }
    });

    match commands::run(cli.command, &config, &cancellation).await {
        Ok(record) => {
            println!("{}", output::render(&record, cli.output));
            ExitCode::SUCCESS
        }
        Err(error) => report(&error),
    }
}

fn report(error: &AppError) -> ExitCode {
    debug!(kind = error.kind(), error = ?error, "command failed");
    eprintln!("mgmtctl: {error}");
    ExitCode::from(exit_code(error))
}

fn exit_code(error: &AppError) -> u8 {
    match error {
        AppError::Internal(_) => 1,
        AppError::Validation(_) => 2,
        AppError::NotFound(_) => 3,
        AppError::Service { .. } => 4,
        AppError::Transport(_) => 5,
        AppError::Cancelled(_) => 130,
    }
}
