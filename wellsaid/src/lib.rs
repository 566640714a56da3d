//! WellSaid API SDK for Rust.
//!
//! This crate provides a client for the WellSaid text-to-speech API:
//! streaming synthesis, asynchronous clip rendering, and the avatar
//! catalog. The [`Client`] implements [`voxkit_compose::Synthesizer`],
//! so it can back the multi-segment composition engine directly.

mod avatars;
mod client;
mod clips;
pub mod director;
mod error;
pub mod http;
mod tts;

pub use avatars::{Avatar, AvatarCriterion, AvatarFilter, AvatarService};
pub use client::{
    Client, ClientBuilder, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, MODEL_CARUSO, MODEL_LEGACY,
};
pub use clips::{ClipRequest, ClipService, ClipState, ClipStatus, ClipTask};
pub use error::{Error, Result};
pub use tts::{render_segment_text, SpeechRequest, SpeechResponse, TtsService};
