//! Multi-segment composition command.

use std::sync::Arc;

use clap::Args;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use voxkit_compose::{ComposeConfig, Composer, Error as ComposeError, Script, Segment};

use super::{
    create_client, format_bytes, format_duration, load_request, output_bytes, output_result,
    print_success, print_verbose, require_input_file,
};
use crate::Cli;

/// Composes a multi-speaker script into one audio file.
///
/// The input file holds the segment list and an optional dispatch
/// configuration; the manifest is printed (or written with --json) and
/// the combined PCM audio is written to the -o path.
#[derive(Args)]
pub struct ComposeCommand {
    /// Write the manifest to this path instead of stdout
    #[arg(long)]
    manifest: Option<String>,
}

/// Composition request file.
#[derive(Deserialize)]
struct ComposeRequest {
    segments: Vec<Segment>,
    #[serde(default)]
    config: ComposeConfig,
}

impl ComposeCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        let input_file = require_input_file(cli)?;
        let request: ComposeRequest = load_request(input_file)?;
        let script = Script::new(request.segments);

        print_verbose(cli, &format!("Segments: {}", script.len()));
        print_verbose(
            cli,
            &format!(
                "Dispatch: {} in flight, {} attempts per segment",
                request.config.max_in_flight, request.config.max_retries
            ),
        );

        let client = Arc::new(create_client(cli)?);
        let composer = Composer::with_config(client, request.config);

        let cancel = CancellationToken::new();
        let ctrl_c_cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                ctrl_c_cancel.cancel();
            }
        });

        let composition = match composer.compose(&script, cancel).await {
            Ok(composition) => composition,
            Err(ComposeError::Validation(errors)) => {
                output_result(&errors, None, cli.json)?;
                anyhow::bail!("script validation failed");
            }
            Err(e) => return Err(e.into()),
        };

        if let Some(audio) = &composition.audio {
            let output_path = cli
                .output
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("output file is required for audio, use -o flag"))?;
            output_bytes(&audio.data, output_path)?;
            print_success(&format!(
                "Audio saved to: {} ({}, {})",
                output_path,
                format_bytes(audio.data.len()),
                format_duration(audio.duration.as_millis() as u64)
            ));
        }

        output_result(&composition.manifest, self.manifest.as_deref(), cli.json)
    }
}
