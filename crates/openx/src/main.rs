//! OpenX - command-line client for the OpenX API.
//!
//! Logs in through the OpenX SSO server and issues API calls with the
//! resulting session cookie.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod commands;
mod config;
mod types;

use commands::{accounts, get, login, report};

/// OpenX - API client with SSO login
#[derive(Parser)]
#[command(name = "openx")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Config file
    #[arg(
        short,
        long,
        global = true,
        env = "OPENX_CONFIG",
        default_value = config::DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in through SSO and report the session
    Login(login::LoginArgs),

    /// Fetch entities from the API
    Get(get::GetArgs),

    /// List accounts
    Accounts(accounts::AccountsArgs),

    /// Request a report
    Report(report::ReportArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "openx=debug,openx_oauth=debug,info"
    } else {
        "openx=info,openx_oauth=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    // Logs go to stderr so stdout stays parseable.
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);
    if cli.log_json {
        tracing_subscriber::registry()
            .with(fmt_layer.json().with_filter(filter))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt_layer.with_filter(filter))
            .init();
    }

    let ctx = commands::Context {
        config_path: cli.config,
        json_output: cli.json,
    };

    match cli.command {
        Commands::Login(args) => login::run(args, &ctx),
        Commands::Get(args) => get::run(args, &ctx),
        Commands::Accounts(args) => accounts::run(args, &ctx),
        Commands::Report(args) => report::run(args, &ctx),
    }
}
