//! Thorkit CLI - wallet overview, balances and transfers from the terminal.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use thorkit::config::{IssueLevel, KitConfig};
use thorkit_cli::{AssetArgs, SessionArgs};
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Thorkit CLI - wallet transfers on VeChainThor
#[derive(Parser, Debug)]
#[command(name = "thorkit")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// JSON configuration file (THORKIT_* environment variables otherwise)
    #[arg(short, long, env = "THORKIT_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the connected account and its token balance
    Overview {
        #[command(flatten)]
        session: SessionArgs,
    },
    /// Show the balance of an address
    Balance {
        /// Account to query
        address: String,

        #[command(flatten)]
        asset: AssetArgs,
    },
    /// Build a transfer and submit it
    Transfer {
        #[command(flatten)]
        session: SessionArgs,

        /// Recipient address
        #[arg(long)]
        to: String,

        /// Decimal amount, e.g. 1.5
        #[arg(long)]
        amount: String,

        #[command(flatten)]
        asset: AssetArgs,

        /// Print the clauses without submitting
        #[arg(long)]
        dry_run: bool,
    },
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("thorkit=debug,thorkit_cli=debug")
    } else {
        EnvFilter::new("thorkit=warn,thorkit_cli=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Arc<KitConfig>> {
    let config = match path {
        Some(path) => KitConfig::from_file(path)?,
        None => KitConfig::from_env()?,
    };
    for issue in config.validate() {
        if issue.level == IssueLevel::Warning {
            warn!(field = issue.field, "{}", issue.message);
        }
    }
    Ok(Arc::new(config))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_ref())?;

    match &args.command {
        Command::Overview { session } => thorkit_cli::overview(&config, session).await?,
        Command::Balance { address, asset } => thorkit_cli::balance(&config, address, asset).await?,
        Command::Transfer {
            session,
            to,
            amount,
            asset,
            dry_run,
        } => thorkit_cli::transfer(&config, session, to, amount, asset, *dry_run).await?,
    }

    Ok(())
}
