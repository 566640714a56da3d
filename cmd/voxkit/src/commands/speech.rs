//! Single-block speech synthesis commands.

use clap::{Args, Subcommand};

use voxkit_wellsaid::{ClipRequest, SpeechRequest};

use super::{
    create_client, format_bytes, load_request, output_bytes, output_result, print_success,
    print_verbose, require_input_file,
};
use crate::Cli;

/// Speech synthesis service.
///
/// Supports streaming synthesis and asynchronous clip rendering.
#[derive(Args)]
pub struct SpeechCommand {
    #[command(subcommand)]
    command: SpeechSubcommand,
}

#[derive(Subcommand)]
enum SpeechSubcommand {
    /// Synthesize speech from tagged text
    Synthesize,
    /// Render a clip asynchronously and wait for it
    Clip,
}

impl SpeechCommand {
    pub async fn run(&self, cli: &Cli) -> anyhow::Result<()> {
        match &self.command {
            SpeechSubcommand::Synthesize => self.synthesize(cli).await,
            SpeechSubcommand::Clip => self.clip(cli).await,
        }
    }

    async fn synthesize(&self, cli: &Cli) -> anyhow::Result<()> {
        let input_file = require_input_file(cli)?;
        let client = create_client(cli)?;

        let mut req: SpeechRequest = load_request(input_file)?;
        if req.model.is_empty() {
            req.model = client.default_model().to_string();
        }

        print_verbose(cli, &format!("Model: {}", req.model));
        print_verbose(cli, &format!("Text length: {} characters", req.text.len()));

        let resp = client.tts().synthesize(&req).await?;

        let output_path = cli.output.as_deref();
        if let Some(path) = output_path {
            output_bytes(&resp.audio, path)?;
            print_success(&format!(
                "Audio saved to: {} ({})",
                path,
                format_bytes(resp.audio.len())
            ));
        }

        let result = serde_json::json!({
            "audio_size": resp.audio.len(),
            "duration_ms": resp.duration.as_millis() as u64,
            "content_type": resp.content_type,
            "output_file": output_path,
        });

        output_result(&result, None, cli.json)
    }

    async fn clip(&self, cli: &Cli) -> anyhow::Result<()> {
        let input_file = require_input_file(cli)?;
        let client = create_client(cli)?;

        let mut req: ClipRequest = load_request(input_file)?;
        if req.model.is_empty() {
            req.model = client.default_model().to_string();
        }

        let task = client.clips().create(&req).await?;
        print_verbose(cli, &format!("Clip submitted: {}", task.id()));

        let status = task.wait().await?;
        let audio = task.download(&status).await?;

        let output_path = cli.output.as_deref();
        if let Some(path) = output_path {
            output_bytes(&audio, path)?;
            print_success(&format!(
                "Audio saved to: {} ({})",
                path,
                format_bytes(audio.len())
            ));
        }

        let result = serde_json::json!({
            "clip_id": task.id(),
            "audio_size": audio.len(),
            "output_file": output_path,
        });

        output_result(&result, None, cli.json)
    }
}
