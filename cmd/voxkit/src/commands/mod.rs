//! CLI commands module.

mod avatars;
mod compose;
mod speech;
mod util;

pub use avatars::AvatarsCommand;
pub use compose::ComposeCommand;
pub use speech::SpeechCommand;

// Re-export utils for use in commands
pub(crate) use util::*;
