//! Core types for grounded search responses

use serde::{Deserialize, Serialize};

/// A web source cited by a grounded answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebSource {
    /// Page title as reported by the grounding metadata
    pub title: String,
    /// Source URL; identity key for deduplication
    pub uri: String,
}

impl WebSource {
    /// Create a new web source
    pub fn new(title: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            uri: uri.into(),
        }
    }
}

/// Deduplicate sources by uri, keeping the first-seen title and
/// preserving first-occurrence order.
pub fn dedup_sources(sources: Vec<WebSource>) -> Vec<WebSource> {
    let mut seen: Vec<WebSource> = Vec::with_capacity(sources.len());
    for source in sources {
        if !seen.iter().any(|s| s.uri == source.uri) {
            seen.push(source);
        }
    }
    seen
}
