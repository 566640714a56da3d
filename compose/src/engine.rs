//! The composition engine facade.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::compose::{compose_audio, ComposedAudio, Manifest};
use crate::config::ComposeConfig;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::request::build_requests;
use crate::script::Script;
use crate::synth::Synthesizer;
use crate::validate::validate_script;

/// The terminal artifact of a composition request.
#[derive(Debug)]
pub struct Composition {
    /// Combined audio; present whenever at least one segment succeeded.
    pub audio: Option<ComposedAudio>,
    /// Per-segment outcome report.
    pub manifest: Manifest,
}

/// Composes multi-speaker scripts against a synthesis backend.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tokio_util::sync::CancellationToken;
/// use voxkit_compose::{Composer, Script};
///
/// # async fn run(synthesizer: Arc<dyn voxkit_compose::Synthesizer>, script: Script) {
/// let composer = Composer::new(synthesizer);
/// let composition = composer.compose(&script, CancellationToken::new()).await;
/// # }
/// ```
pub struct Composer {
    synthesizer: Arc<dyn Synthesizer>,
    config: ComposeConfig,
}

impl Composer {
    /// Creates a composer with the default configuration.
    pub fn new(synthesizer: Arc<dyn Synthesizer>) -> Self {
        Self::with_config(synthesizer, ComposeConfig::default())
    }

    /// Creates a composer with a custom configuration.
    pub fn with_config(synthesizer: Arc<dyn Synthesizer>, config: ComposeConfig) -> Self {
        Self {
            synthesizer,
            config,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &ComposeConfig {
        &self.config
    }

    /// Runs one composition: validate, build requests, dispatch,
    /// assemble.
    ///
    /// Validation failures short-circuit before any synthesis call is
    /// made and carry the full per-segment error list. Cancellation via
    /// `cancel` aborts all in-flight work and yields
    /// [`Error::Cancelled`] with no partial artifact. Per-segment
    /// synthesis failures do not abort the composition; they are
    /// reported in the manifest.
    pub async fn compose(
        &self,
        script: &Script,
        cancel: CancellationToken,
    ) -> Result<Composition> {
        validate_script(script).map_err(Error::Validation)?;
        let requests = build_requests(script)?;

        info!(segments = requests.len(), "dispatching composition");
        let outcomes = Dispatcher::new(self.config.clone())
            .run(requests, self.synthesizer.clone(), cancel)
            .await?;

        let (audio, manifest) = compose_audio(script, outcomes);
        info!(status = ?manifest.status, "composition finished");

        Ok(Composition { audio, manifest })
    }
}
