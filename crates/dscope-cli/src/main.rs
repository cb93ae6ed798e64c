mod analyze;
mod subjects;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::subjects::SubjectsCommands;

#[derive(Debug, Parser)]
#[command(name = "dscope-cli")]
#[command(about = "Discourse profile analysis command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Analyze one X handle, serving a fresh cached profile when available
    Analyze {
        /// Handle, `@handle` or profile URL
        handle: String,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Inspect or manage stored subject records
    Subjects {
        #[command(subcommand)]
        command: SubjectsCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = dscope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Analyze { handle, json }) => {
            analyze::run_analyze(&config, &handle, json).await?;
        }
        Some(Commands::Subjects { command }) => {
            let store = dscope_pipeline::open_store(&config);
            subjects::run_subjects(store.as_ref(), command).await?;
        }
        None => println!("dscope-cli ready; run with --help for commands"),
    }

    Ok(())
}
