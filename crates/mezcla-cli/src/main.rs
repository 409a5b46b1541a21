//! Mezcla CLI - render and inspect audio graph sessions from the terminal.

mod commands;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mezcla")]
#[command(author, version, about = "Mezcla audio graph CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a session file to a WAV file
    Render(commands::render::RenderArgs),

    /// Display a session file's nodes and edges
    Info(commands::info::InfoArgs),

    /// List available node kinds and their parameters
    Nodes(commands::nodes::NodesArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render(args) => commands::render::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Nodes(args) => commands::nodes::run(args),
    }
}
