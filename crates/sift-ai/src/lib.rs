//! sift-ai: Streaming Gemini client with Google Search grounding
//!
//! This crate wraps a single call to the Gemini generate-content API with
//! the search-grounding tool enabled, exposing the response as a stream of
//! text deltas and web-source batches.

pub mod error;
pub mod gemini;
pub mod prompt;
pub mod stream;
pub mod types;

pub use error::{Error, Result};
pub use gemini::GeminiClient;
pub use stream::{SearchEvent, SearchEventStream};
pub use types::WebSource;
