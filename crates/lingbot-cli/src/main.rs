//! lingbot CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "lingbot", version, about = "Vocabulary drill session bot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Complete today's drill session
    Run {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Fetch and display the grade report
    Report {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate the configuration, mistake schedule included
    Validate {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter lingbot.toml
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("lingbot=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config } => commands::run::execute(config).await,
        Commands::Report { config } => commands::report::execute(config).await,
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
