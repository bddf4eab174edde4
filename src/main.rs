use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod config;
mod error;
mod nutrition;
mod order;
mod output;
mod pipeline;
mod selection;
mod store;
mod templates;
#[cfg(test)]
mod test_support;
mod workflow;

use cli::{Command, RootArgs};

const LOG_ENV: &str = "SMOOTHIE_LOG";

fn main() -> Result<ExitCode> {
    let args = RootArgs::parse();
    init_tracing(args.global.verbose);
    let config = config::resolve_config(&args.global.overrides())?;

    match args.command {
        Command::Init(init) => workflow::run_init(&config, init),
        Command::Catalog(catalog) => workflow::run_catalog(&config, catalog),
        Command::Order(order) => workflow::run_order(&config, order),
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // Only fails when a global subscriber is already installed.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
