//! Voxkit CLI - A command line interface for voice composition.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{AvatarsCommand, ComposeCommand, SpeechCommand};

/// Voxkit CLI - Multi-segment voice composition over the WellSaid API.
///
/// This tool allows you to:
///   - Compose a multi-speaker script into a single audio file
///   - Synthesize one block of tagged text
///   - Browse and filter the voice avatar catalog
///
/// The API key is taken from --api-key or the WELLSAID_API_KEY
/// environment variable.
#[derive(Parser)]
#[command(name = "voxkit")]
#[command(about = "Voice composition CLI tool")]
#[command(version)]
pub struct Cli {
    /// WellSaid API key (default: WELLSAID_API_KEY env var)
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// API base URL override
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Output file (default: stdout for results, required for audio)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Input request file (YAML or JSON)
    #[arg(short = 'f', long = "file", global = true)]
    pub input: Option<String>,

    /// Output as JSON (for piping)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compose a multi-segment script into one audio file
    Compose(ComposeCommand),
    /// Speech synthesis for a single block of text
    Speech(SpeechCommand),
    /// Voice avatar catalog
    Avatars(AvatarsCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Compose(cmd) => cmd.run(&cli).await,
        Commands::Speech(cmd) => cmd.run(&cli).await,
        Commands::Avatars(cmd) => cmd.run(&cli).await,
    }
}
