//! Streaming event types

use crate::types::WebSource;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// Events emitted while streaming a grounded answer
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SearchEvent {
    /// A text fragment arrived (not cumulative; consumers accumulate)
    TextDelta { delta: String },
    /// A batch of web sources arrived. Each batch is already deduplicated
    /// by uri and fully replaces any previously delivered batch.
    Sources { sources: Vec<WebSource> },
    /// Stream finished; carries the final cumulative text
    Done { text: String },
    /// Stream failed; the raw failure text, unclassified
    Error { message: String },
}

impl SearchEvent {
    /// Check if this is a terminal event (Done or Error)
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchEvent::Done { .. } | SearchEvent::Error { .. })
    }
}

/// A stream of search events
pub type SearchEventStream = Pin<Box<dyn Stream<Item = SearchEvent> + Send>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_events() {
        assert!(SearchEvent::Done { text: "x".into() }.is_terminal());
        assert!(SearchEvent::Error { message: "boom".into() }.is_terminal());
        assert!(!SearchEvent::TextDelta { delta: "x".into() }.is_terminal());
        assert!(!SearchEvent::Sources { sources: vec![] }.is_terminal());
    }
}
