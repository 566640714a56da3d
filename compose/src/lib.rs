//! Multi-segment voice composition engine.
//!
//! This crate turns a declarative multi-speaker [`Script`] into one
//! composed audio artifact:
//! - [`validate_script`]: checks voice parameter ranges, delivery
//!   markup, and respellings before any network cost is incurred
//! - [`build_requests`]: maps the script to ordered synthesis requests
//! - [`Dispatcher`]: fans the requests out concurrently against a
//!   [`Synthesizer`], retrying transient failures per segment
//! - [`compose_audio`]: concatenates the results in script order with
//!   configured silence gaps and reports a per-segment [`Manifest`]
//!
//! The synthesis backend is a trait object; see `voxkit-wellsaid` for
//! the WellSaid Labs implementation.

mod compose;
mod config;
mod dispatch;
mod engine;
mod error;
mod pcm;
mod request;
mod script;
mod synth;
mod validate;

pub use compose::{
    compose_audio, ComposedAudio, CompositionStatus, EntryStatus, Manifest, ManifestEntry,
};
pub use config::{ComposeConfig, DEFAULT_MAX_IN_FLIGHT, DEFAULT_MAX_RETRIES};
pub use dispatch::{Dispatcher, FailureKind, SegmentOutcome};
pub use engine::{Composer, Composition};
pub use error::{Error, Result};
pub use pcm::PcmFormat;
pub use request::{build_requests, SynthesisRequest};
pub use script::{
    Respelling, Script, Segment, VoiceParameters, LOUDNESS_MAX, LOUDNESS_MIN, PITCH_MAX,
    PITCH_MIN, TEMPO_MAX, TEMPO_MIN,
};
pub use synth::{SynthesisError, SynthesizedClip, Synthesizer};
pub use validate::{validate_script, validate_segment, SegmentErrors, ValidationError};

#[cfg(test)]
mod tests;
