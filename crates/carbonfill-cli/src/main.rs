mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "carbonfill",
    version,
    about = "Batch emission-factor enrichment for tabular data"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an enrichment job
    Run {
        /// Path to job YAML file
        job: PathBuf,
        /// Build requests and print them without contacting the service
        #[arg(long)]
        dry_run: bool,
        /// Maximum input rows to process (search pages for extract jobs)
        #[arg(long)]
        limit: Option<u64>,
    },
    /// Validate a job file and its input columns
    Check {
        /// Path to job YAML file
        job: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    logging::init(&cli.log_level);

    match cli.command {
        Commands::Run {
            job,
            dry_run,
            limit,
        } => commands::run::execute(&job, dry_run, limit).await,
        Commands::Check { job } => commands::check::execute(&job),
    }
}
