//! UatBot CLI - Main Entry Point
//!
//! Generate test scenarios from project documents, execute them against a
//! running application with a headless browser, and render reports.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{generate, list, report, run};

/// UatBot - LLM-assisted UAT scenario runner
#[derive(Parser)]
#[command(name = "uatbot")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Database path (defaults to ~/.uatbot/state.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze project documents and generate test scenarios
    Generate(generate::GenerateArgs),

    /// Execute scenarios against a running application
    Run(run::RunArgs),

    /// Re-render the report for a stored batch
    Report(report::ReportArgs),

    /// List stored scenarios
    List,

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let db_path = cli.db.unwrap_or_else(uatbot_common::default_db_path);

    match cli.command {
        Commands::Generate(args) => generate::execute(args, &db_path, cli.format).await?,
        Commands::Run(args) => run::execute(args, &db_path, cli.format).await?,
        Commands::Report(args) => report::execute(args, &db_path)?,
        Commands::List => list::execute(&db_path, cli.format)?,
        Commands::Version => {
            println!("uatbot {}", uatbot_common::VERSION);
        }
    }

    Ok(())
}
