mod commands;
mod config;

use clap::{Parser, Subcommand};
use colored::Colorize;
use commands::{catalog, replay, CatalogArgs, ReplayArgs};
use config::Config;
use pageforge_common::RealFileSystem;
use tracing_subscriber::EnvFilter;

/// Pageforge CLI - replay page editor sessions from the terminal
#[derive(Parser, Debug)]
#[command(name = "pageforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Tracing filter, overrides the config file and RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a JSON intent script against an edit session
    Replay(ReplayArgs),

    /// Show the condition catalogs in effect
    Catalog(CatalogArgs),
}

fn init_tracing(flag: Option<&str>, config: Option<&str>) {
    let filter = match flag.or(config) {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter.unwrap_or_else(|| EnvFilter::new("warn")))
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let fs = RealFileSystem;
    let config = Config::load(&fs, &cwd)?;

    init_tracing(cli.log_level.as_deref(), config.log_level.as_deref());

    match cli.command {
        Command::Replay(args) => replay(args, &config.editor, &fs).await,
        Command::Catalog(args) => catalog(args, &config.editor),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        eprintln!();
        eprintln!("{} {:#}", "Error:".red().bold(), err);
        eprintln!();
        std::process::exit(1);
    }
}
