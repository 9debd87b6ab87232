//! Conversation state: an ordered transcript with one streaming turn.
//!
//! All mutations are replace-in-place on the turn list and check for the
//! target id explicitly; a mutation aimed at a turn that no longer exists
//! (reset raced a still-in-flight stream) is a silent no-op.

use serde::{Deserialize, Serialize};
use sift_ai::WebSource;
use uuid::Uuid;

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Current phase of the interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Searching,
    Results,
    Error,
}

/// One conversation entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Stable identifier, assigned at creation
    pub id: Uuid,
    pub role: Role,
    /// Full text; assistant placeholders start empty and are replaced
    /// wholesale by each cumulative delta
    pub content: String,
    /// Web sources backing an assistant answer; each batch replaces the last
    pub sources: Vec<WebSource>,
    /// True from creation until the owning request terminates
    pub is_streaming: bool,
    /// True only if the request terminated in failure
    pub is_error: bool,
    /// Creation order key, strictly increasing across turns
    pub timestamp: i64,
}

/// Ordered transcript plus interaction phase
#[derive(Debug)]
pub struct Conversation {
    turns: Vec<Turn>,
    phase: Phase,
    last_query: String,
    last_timestamp: i64,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self {
            turns: Vec::new(),
            phase: Phase::Idle,
            last_query: String::new(),
            last_timestamp: 0,
        }
    }

    /// The transcript in display order
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// Current interaction phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Text of the most recent submitted query
    pub fn last_query(&self) -> &str {
        &self.last_query
    }

    /// Whether any turn is currently streaming
    pub fn is_streaming(&self) -> bool {
        self.turns.iter().any(|t| t.is_streaming)
    }

    /// Look up a turn by id
    pub fn turn(&self, id: Uuid) -> Option<&Turn> {
        self.turns.iter().find(|t| t.id == id)
    }

    /// Submit a query: appends a user turn and a streaming assistant
    /// placeholder, returns the placeholder's id. No-op for blank input.
    pub fn submit_query(&mut self, text: &str) -> Option<Uuid> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        self.phase = Phase::Searching;
        self.last_query = text.to_string();

        let user_timestamp = self.next_timestamp();
        self.turns.push(Turn {
            id: Uuid::new_v4(),
            role: Role::User,
            content: text.to_string(),
            sources: Vec::new(),
            is_streaming: false,
            is_error: false,
            timestamp: user_timestamp,
        });

        let assistant_id = Uuid::new_v4();
        let assistant_timestamp = self.next_timestamp();
        self.turns.push(Turn {
            id: assistant_id,
            role: Role::Assistant,
            content: String::new(),
            sources: Vec::new(),
            is_streaming: true,
            is_error: false,
            timestamp: assistant_timestamp,
        });

        self.phase = Phase::Results;
        Some(assistant_id)
    }

    /// Replace a turn's content with the full cumulative text
    pub fn apply_text_delta(&mut self, id: Uuid, cumulative: &str) {
        if let Some(turn) = self.turn_mut(id) {
            turn.content = cumulative.to_string();
        }
    }

    /// Replace a turn's sources with the uri-deduplicated list
    pub fn apply_sources(&mut self, id: Uuid, sources: Vec<WebSource>) {
        if let Some(turn) = self.turn_mut(id) {
            turn.sources = sift_ai::types::dedup_sources(sources);
        }
    }

    /// Mark a turn as finished streaming, content and sources untouched
    pub fn complete_turn(&mut self, id: Uuid) {
        if let Some(turn) = self.turn_mut(id) {
            turn.is_streaming = false;
        }
    }

    /// Mark a turn as failed with a user-facing message
    pub fn fail_turn(&mut self, id: Uuid, message: &str) {
        if let Some(turn) = self.turn_mut(id) {
            turn.content = message.to_string();
            turn.is_streaming = false;
            turn.is_error = true;
            self.phase = Phase::Error;
        }
    }

    /// Discard all turns and return to idle
    pub fn reset(&mut self) {
        self.turns.clear();
        self.phase = Phase::Idle;
        self.last_query.clear();
    }

    fn turn_mut(&mut self, id: Uuid) -> Option<&mut Turn> {
        self.turns.iter_mut().find(|t| t.id == id)
    }

    /// Strictly increasing, even when two turns are created in the same
    /// millisecond.
    fn next_timestamp(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_timestamp = now.max(self.last_timestamp + 1);
        self.last_timestamp
    }
}
