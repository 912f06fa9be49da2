use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod format;
mod json;
mod mapper;
mod output;
mod utils;

use commands::Commands;
use error::Result;

#[derive(Parser)]
#[command(name = "bsonkit")]
#[command(about = "Binary document encoder, decoder and inspector", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

fn main() -> Result<()> {
    // RUST_LOG=bson=debug shows per-call sizes, =trace every skipped element
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode { config } => {
            commands::decode::execute(config)?;
        }
        Commands::Encode { config } => {
            commands::encode::execute(config)?;
        }
        Commands::Dump { config } => {
            commands::dump::execute(config)?;
        }
    }

    Ok(())
}
