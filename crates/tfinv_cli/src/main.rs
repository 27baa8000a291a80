//! tfinv CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: Terraform outputs unreadable or other fatal error
//! - 2: Invalid arguments or configuration

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use tfinv_inventory::{InventoryError, InventoryGenerator};
use tfinv_runner::{ProcessRunner, RunOptions};

mod args;

use args::Cli;

/// Process exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Stdout carries the inventory, so logs go to stderr.
    let default_filter = if cli.verbose { "tfinv=debug,warn" } else { "tfinv=info,warn" };
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .try_init();

    match run(cli).await {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(categorize_error(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.inventory_config()?;

    let mut options = RunOptions::default();
    if let Some(seconds) = config.command_timeout_secs {
        options = options.timeout(seconds);
    }

    let generator = InventoryGenerator::new(config, Arc::new(ProcessRunner::new(options)));
    let inventory = generator
        .generate()
        .await
        .context("Failed to generate inventory")?;

    let rendered = match &cli.host {
        Some(host) => match inventory.host_vars(host) {
            Some(vars) => serde_json::to_string_pretty(vars)?,
            None => {
                warn!("Host {} is not in the inventory", host);
                "{}".to_string()
            }
        },
        None => inventory.to_json_pretty()?,
    };

    println!("{}", rendered);
    Ok(())
}

/// Map an error to its exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    match e.downcast_ref::<InventoryError>() {
        Some(InventoryError::Config { .. }) => ExitCodes::INVALID_ARGS,
        _ => ExitCodes::GENERAL_ERROR,
    }
}
