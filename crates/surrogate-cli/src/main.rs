//! Surrogate CLI
//!
//! Generates proxy classes from JSON class descriptors:
//! source text or the generated class description as JSON.

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "surrogate")]
#[command(about = "Null-object and access-interceptor proxy generator", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a proxy class from a class descriptor
    Generate {
        /// Class descriptor (JSON)
        descriptor: PathBuf,
        /// Proxy strategy
        #[arg(short, long, default_value = "null-object")]
        strategy: String,
        /// Generator configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Source)]
        format: OutputFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate a class descriptor and show which strategies apply
    Check {
        /// Class descriptor (JSON)
        descriptor: PathBuf,
    },

    /// List available proxy strategies
    Strategies,
}

/// What `generate` prints
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Source text
    Source,
    /// Generated class description as JSON
    Json,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "surrogate_engine=debug,surrogate=debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Generate {
            descriptor,
            strategy,
            config,
            format,
            output,
        } => commands::generate::execute(&descriptor, &strategy, config.as_deref(), format, output.as_deref()),

        Commands::Check { descriptor } => commands::check::execute(&descriptor),

        Commands::Strategies => commands::strategies::execute(),
    }
}
