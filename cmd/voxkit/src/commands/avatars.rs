//! Avatar catalog commands.

use clap::{Args, Subcommand};

use voxkit_wellsaid::AvatarFilter;

use super::{create_client, load_request, output_result, print_verbose};
use crate::Cli;

/// Voice avatar catalog.
#[derive(Args)]
pub struct AvatarsCommand {
    #[command(subcommand)]
    command: AvatarsSubcommand,
}

#[derive(Subcommand)]
enum AvatarsSubcommand {
    /// List avatars, optionally filtered by -f filter file or flags
    List {
        /// Filter by gender
        #[arg(long)]
        gender: Option<String>,
        /// Filter by characteristic (repeatable, any match)
        #[arg(long)]
        characteristic: Vec<String>,
        /// Filter by language
        #[arg(long)]
        language: Option<String>,
        /// Filter by style
        #[arg(long)]
        style: Option<String>,
    },
    /// Show filter criteria with their available options
    Criteria,
}

impl AvatarsCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            AvatarsSubcommand::List {
                gender,
                characteristic,
                language,
                style,
            } => {
                let client = create_client(cli)?;

                let filter = match cli.input.as_deref() {
                    Some(path) => load_request(path)?,
                    None => AvatarFilter {
                        gender: gender.clone(),
                        characteristics: characteristic.clone(),
                        language: language.clone(),
                        style: style.clone(),
                        ..Default::default()
                    },
                };

                let avatars = client.avatars().list_filtered(&filter).await?;
                print_verbose(cli, &format!("Matched {} avatars", avatars.len()));
                output_result(&avatars, cli.output.as_deref(), cli.json)
            }
            AvatarsSubcommand::Criteria => {
                let client = create_client(cli)?;
                let criteria = client.avatars().criteria().await?;
                output_result(&criteria, cli.output.as_deref(), cli.json)
            }
        }
    }
}
