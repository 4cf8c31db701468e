// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! uj - launch phylogenetic tree builds on Kubernetes and track them.

mod color;
mod commands;
mod env;
mod exit_error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::commands::status::StatusArgs;
use crate::commands::submit::{JobSpecArgs, SubmitArgs};
use crate::exit_error::ExitError;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "uj", version, about = "Launch and track tree build jobs", styles = color::styles())]
struct Cli {
    /// Kubernetes namespace [env: UJ_NAMESPACE]
    #[arg(short, long, global = true)]
    namespace: Option<String>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit a build job for an uploaded config
    Submit(SubmitArgs),
    /// Show the state, uploaded files and logs of a job
    Status(StatusArgs),
    /// Print the Job manifest without submitting it
    Manifest(JobSpecArgs),
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env(env::LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let namespace = cli.namespace.unwrap_or_else(env::namespace);
    match cli.command {
        Command::Submit(args) => commands::submit::handle(args, &namespace, cli.output).await,
        Command::Status(args) => commands::status::handle(args, &namespace, cli.output).await,
        Command::Manifest(spec) => commands::manifest::handle(spec, &namespace),
    }
}

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        if let Some(exit) = err.downcast_ref::<ExitError>() {
            if !exit.message.is_empty() {
                eprintln!("{}", exit.message);
            }
            std::process::exit(exit.code);
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;
