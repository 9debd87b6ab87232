//! Search session: drives one grounded streaming call into the
//! conversation store.
//!
//! The transport seam exists so the generation service can be swapped for
//! a scripted stream in tests without touching the store.

use crate::classify::ErrorClass;
use crate::conversation::{Conversation, Turn};
use async_trait::async_trait;
use futures::StreamExt;
use sift_ai::{GeminiClient, SearchEvent, SearchEventStream};
use std::sync::Arc;
use uuid::Uuid;

/// Transport for one grounded streaming request
#[async_trait]
pub trait SearchTransport: Send + Sync {
    /// Start streaming an answer for a single query
    async fn stream(&self, query: &str) -> sift_ai::Result<SearchEventStream>;
}

/// Direct Gemini transport
pub struct GeminiTransport {
    client: GeminiClient,
}

impl GeminiTransport {
    /// Create from an existing client
    pub fn new(client: GeminiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SearchTransport for GeminiTransport {
    async fn stream(&self, query: &str) -> sift_ai::Result<SearchEventStream> {
        self.client.stream(query).await
    }
}

/// One conversation plus the transport that fills its streaming turns
pub struct SearchSession {
    conversation: Conversation,
    transport: Arc<dyn SearchTransport>,
}

impl SearchSession {
    /// Create a session with an empty conversation
    pub fn new(transport: Arc<dyn SearchTransport>) -> Self {
        Self {
            conversation: Conversation::new(),
            transport,
        }
    }

    /// The current conversation state
    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Discard the conversation. A stream still in flight keeps running;
    /// its late mutations target a vanished turn id and no-op.
    pub fn reset(&mut self) {
        self.conversation.reset();
    }

    /// Run one query to completion. Returns the assistant turn's id, or
    /// `None` for blank input. Failures are local to the turn: they land
    /// in the transcript as a classified message, never as an `Err`.
    pub async fn search(&mut self, query: &str) -> Option<Uuid> {
        self.search_with(query, |_| {}).await
    }

    /// Like [`search`](Self::search), invoking `observe` with the updated
    /// assistant turn after every applied delta or source batch.
    pub async fn search_with<F>(&mut self, query: &str, mut observe: F) -> Option<Uuid>
    where
        F: FnMut(&Turn),
    {
        let turn_id = self.conversation.submit_query(query)?;

        let mut stream = match self.transport.stream(self.conversation.last_query()).await {
            Ok(stream) => stream,
            Err(e) => {
                self.fail(turn_id, &e.to_string(), &mut observe);
                return Some(turn_id);
            }
        };

        let mut cumulative = String::new();
        while let Some(event) = stream.next().await {
            match event {
                SearchEvent::TextDelta { delta } => {
                    cumulative.push_str(&delta);
                    self.conversation.apply_text_delta(turn_id, &cumulative);
                    self.observe_turn(turn_id, &mut observe);
                }
                SearchEvent::Sources { sources } => {
                    self.conversation.apply_sources(turn_id, sources);
                    self.observe_turn(turn_id, &mut observe);
                }
                SearchEvent::Done { .. } => {
                    self.conversation.complete_turn(turn_id);
                    self.observe_turn(turn_id, &mut observe);
                }
                SearchEvent::Error { message } => {
                    self.fail(turn_id, &message, &mut observe);
                    return Some(turn_id);
                }
            }
        }

        // A conforming stream ends with Done or Error; if it dropped
        // without one, the placeholder must still stop streaming.
        self.conversation.complete_turn(turn_id);
        Some(turn_id)
    }

    fn fail<F: FnMut(&Turn)>(&mut self, turn_id: Uuid, raw: &str, observe: &mut F) {
        let class = ErrorClass::from_error_text(raw);
        tracing::debug!(?class, error = raw, "search failed");
        self.conversation.fail_turn(turn_id, class.user_message());
        self.observe_turn(turn_id, observe);
    }

    fn observe_turn<F: FnMut(&Turn)>(&self, turn_id: Uuid, observe: &mut F) {
        if let Some(turn) = self.conversation.turn(turn_id) {
            observe(turn);
        }
    }
}
