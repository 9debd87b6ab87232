//! Gemini streaming client with the Google Search grounding tool enabled

use crate::{
    error::{Error, Result},
    prompt::SYSTEM_INSTRUCTION,
    stream::{SearchEvent, SearchEventStream},
    types::{WebSource, dedup_sources},
};
use async_stream::stream;
use futures::StreamExt;
use reqwest_eventsource::{Event, EventSource};
use serde::{Deserialize, Serialize};

/// Base URL for the Gemini API
pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for grounded search
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Sampling temperature; low, favoring factual consistency
const TEMPERATURE: f32 = 0.3;

/// Gemini client
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    /// Create a new client with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Create from environment variable
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("GOOGLE_API_KEY"))
            .map_err(|_| Error::InvalidApiKey)?;
        Ok(Self::new(api_key))
    }

    /// Use a different model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// The configured model id
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Stream a grounded answer for a single query
    pub async fn stream(&self, query: &str) -> Result<SearchEventStream> {
        let request = build_request(query);
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse&key={}",
            BASE_URL, self.model, self.api_key
        );

        tracing::debug!(model = %self.model, "starting grounded search request");

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("content-type", "application/json".parse().unwrap());

        let request_builder = self.client.post(&url).headers(headers).json(&request);

        let event_source = EventSource::new(request_builder)
            .map_err(|e| Error::Sse(format!("Failed to create event source: {}", e)))?;

        Ok(Box::pin(create_stream(event_source)))
    }
}

fn build_request(query: &str) -> GeminiRequest {
    GeminiRequest {
        contents: vec![GeminiContent {
            role: Some("user".to_string()),
            parts: vec![GeminiPart {
                text: query.to_string(),
            }],
        }],
        system_instruction: Some(GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: SYSTEM_INSTRUCTION.to_string(),
            }],
        }),
        tools: vec![GeminiTool {
            google_search: GoogleSearch {},
        }],
        generation_config: GeminiGenerationConfig {
            temperature: Some(TEMPERATURE),
        },
    }
}

/// Map grounding chunks to web sources, dropping entries without a uri
/// and deduplicating by uri (first occurrence wins).
fn extract_sources(chunks: &[GroundingChunk]) -> Vec<WebSource> {
    let sources: Vec<WebSource> = chunks
        .iter()
        .filter_map(|c| c.web.as_ref())
        .filter_map(|w| {
            let uri = w.uri.clone()?;
            Some(WebSource {
                title: w.title.clone().unwrap_or_default(),
                uri,
            })
        })
        .collect();
    dedup_sources(sources)
}

/// Compose an error message from a rejected request, preferring the
/// API error body's message over the raw body text.
fn http_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<GeminiErrorResponse>(body)
        .map(|e| e.error.message)
        .unwrap_or_else(|_| body.to_string());
    format!("HTTP {}: {}", status, message)
}

fn create_stream(mut event_source: EventSource) -> impl futures::Stream<Item = SearchEvent> {
    stream! {
        let mut accumulated_text = String::new();

        while let Some(event) = event_source.next().await {
            match event {
                Ok(Event::Open) => {}
                Ok(Event::Message(msg)) => {
                    if msg.data.is_empty() || msg.data == "[DONE]" {
                        continue;
                    }

                    let chunk: std::result::Result<GeminiStreamResponse, _> = serde_json::from_str(&msg.data);
                    match chunk {
                        Ok(response) => {
                            for candidate in &response.candidates {
                                if let Some(ref content) = candidate.content {
                                    for part in &content.parts {
                                        if let Some(ref text) = part.text {
                                            accumulated_text.push_str(text);
                                            yield SearchEvent::TextDelta { delta: text.clone() };
                                        }
                                    }
                                }

                                if let Some(ref grounding) = candidate.grounding_metadata {
                                    let sources = extract_sources(&grounding.grounding_chunks);
                                    if !sources.is_empty() {
                                        yield SearchEvent::Sources { sources };
                                    }
                                }
                            }
                        }
                        Err(e) => {
                            // Try to parse as error response
                            if let Ok(error_response) = serde_json::from_str::<GeminiErrorResponse>(&msg.data) {
                                tracing::debug!(message = %error_response.error.message, "stream failed");
                                yield SearchEvent::Error {
                                    message: error_response.error.message,
                                };
                                return;
                            }
                            yield SearchEvent::Error {
                                message: format!("Failed to parse chunk: {}", e),
                            };
                            return;
                        }
                    }
                }
                // Normal end of stream: the server closed the connection
                Err(reqwest_eventsource::Error::StreamEnded) => break,
                // HTTP-level rejection: the decisive text ("API key not
                // valid", quota details) is in the response body, not the
                // status line
                Err(reqwest_eventsource::Error::InvalidStatusCode(status, response)) => {
                    let body = response.text().await.unwrap_or_default();
                    tracing::debug!(%status, "request rejected");
                    yield SearchEvent::Error {
                        message: http_error_message(status, &body),
                    };
                    return;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "SSE transport failed");
                    yield SearchEvent::Error {
                        message: format!("SSE error: {}", e),
                    };
                    return;
                }
            }
        }

        tracing::debug!(chars = accumulated_text.len(), "stream complete");
        yield SearchEvent::Done { text: accumulated_text };
    }
}

// Request types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    tools: Vec<GeminiTool>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

// Response types

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiStreamResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    web: Option<GroundingWeb>,
}

#[derive(Debug, Deserialize)]
struct GroundingWeb {
    uri: Option<String>,
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn web(uri: Option<&str>, title: Option<&str>) -> GroundingChunk {
        GroundingChunk {
            web: Some(GroundingWeb {
                uri: uri.map(String::from),
                title: title.map(String::from),
            }),
        }
    }

    #[test]
    fn test_extract_sources_drops_malformed() {
        let chunks = vec![
            web(Some("https://a.example"), Some("A")),
            web(None, Some("no uri")),
            GroundingChunk { web: None },
            web(Some("https://b.example"), None),
        ];
        let sources = extract_sources(&chunks);
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].uri, "https://a.example");
        assert_eq!(sources[0].title, "A");
        assert_eq!(sources[1].uri, "https://b.example");
        assert_eq!(sources[1].title, "");
    }

    #[test]
    fn test_extract_sources_dedups_by_uri() {
        let chunks = vec![
            web(Some("https://a.example"), Some("first")),
            web(Some("https://a.example"), Some("second")),
        ];
        let sources = extract_sources(&chunks);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].title, "first");
    }

    #[test]
    fn test_build_request_shape() {
        let request = build_request("what is photosynthesis?");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "what is photosynthesis?");
        assert!(json["systemInstruction"]["parts"][0]["text"]
            .as_str()
            .unwrap()
            .contains("Sift"));
        assert!(json["tools"][0]["googleSearch"].is_object());
        let temperature = json["generationConfig"]["temperature"].as_f64().unwrap();
        assert!((temperature - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_parse_stream_chunk_with_grounding() {
        let data = r#"{
            "candidates": [{
                "content": { "parts": [{ "text": "Plants" }] },
                "groundingMetadata": {
                    "groundingChunks": [
                        { "web": { "uri": "https://example.com/a", "title": "Photosynthesis" } }
                    ]
                }
            }]
        }"#;
        let response: GeminiStreamResponse = serde_json::from_str(data).unwrap();
        assert_eq!(response.candidates.len(), 1);
        let candidate = &response.candidates[0];
        assert_eq!(
            candidate.content.as_ref().unwrap().parts[0].text.as_deref(),
            Some("Plants")
        );
        let grounding = candidate.grounding_metadata.as_ref().unwrap();
        let sources = extract_sources(&grounding.grounding_chunks);
        assert_eq!(sources, vec![WebSource::new("Photosynthesis", "https://example.com/a")]);
    }

    #[test]
    fn test_http_error_message_extracts_body_message() {
        let body = r#"{ "error": { "message": "API key not valid. Please pass a valid API key.", "code": 400 } }"#;
        let message = http_error_message(reqwest::StatusCode::BAD_REQUEST, body);
        assert_eq!(
            message,
            "HTTP 400 Bad Request: API key not valid. Please pass a valid API key."
        );
    }

    #[test]
    fn test_http_error_message_falls_back_to_raw_body() {
        let message = http_error_message(reqwest::StatusCode::SERVICE_UNAVAILABLE, "overloaded");
        assert_eq!(message, "HTTP 503 Service Unavailable: overloaded");
    }

    #[test]
    fn test_parse_error_response() {
        let data = r#"{ "error": { "message": "API key not valid", "code": 403 } }"#;
        let response: GeminiErrorResponse = serde_json::from_str(data).unwrap();
        assert_eq!(response.error.message, "API key not valid");
    }
}
