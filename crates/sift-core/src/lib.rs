//! sift-core: Conversation state and streaming search session
//!
//! This crate owns the ordered transcript of a search conversation and
//! the session loop that drives one grounded streaming call into it.

pub mod classify;
pub mod conversation;
pub mod session;

pub use classify::ErrorClass;
pub use conversation::{Conversation, Phase, Role, Turn};
pub use session::{GeminiTransport, SearchSession, SearchTransport};
