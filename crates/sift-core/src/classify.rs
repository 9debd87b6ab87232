//! Failure classification: raw error text to a user-facing message.
//!
//! The streaming client propagates failures unchanged; classification
//! happens here, once per failed request, by case-insensitive substring
//! match. Table order matters: the first matching class wins.

use serde::{Deserialize, Serialize};

/// User-facing failure classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// Credential missing, permission denied, forbidden
    Auth,
    /// Rate or quota exceeded
    Quota,
    /// Upstream server error or overloaded
    Unavailable,
    /// Transport or connection failure
    Network,
    /// Content-safety block
    Blocked,
    /// Anything else
    Generic,
}

impl ErrorClass {
    /// Classify raw failure text. First match in table order wins.
    pub fn from_error_text(error: &str) -> Self {
        let msg = error.to_lowercase();

        if msg.contains("api key")
            || msg.contains("403")
            || msg.contains("permission denied")
            || msg.contains("forbidden")
        {
            ErrorClass::Auth
        } else if msg.contains("429") || msg.contains("quota") || msg.contains("limit") {
            ErrorClass::Quota
        } else if msg.contains("503") || msg.contains("500") || msg.contains("overloaded") {
            ErrorClass::Unavailable
        } else if msg.contains("failed to fetch")
            || msg.contains("network")
            || msg.contains("connect")
            || msg.contains("timed out")
            || msg.contains("dns")
        {
            ErrorClass::Network
        } else if msg.contains("safety") || msg.contains("blocked") {
            ErrorClass::Blocked
        } else {
            ErrorClass::Generic
        }
    }

    /// Non-technical message shown in place of the failed answer
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorClass::Auth => {
                "Unable to authenticate. Please ensure a valid API key is configured."
            }
            ErrorClass::Quota => {
                "You've hit the usage limit. Please wait a moment before asking another question."
            }
            ErrorClass::Unavailable => {
                "The AI service is temporarily unavailable. Please try again shortly."
            }
            ErrorClass::Network => {
                "Connection failed. Please check your internet connection and try again."
            }
            ErrorClass::Blocked => {
                "I cannot generate a response for this query due to safety guidelines."
            }
            ErrorClass::Generic => {
                "I encountered an issue while processing your request. Please try again."
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_patterns() {
        assert_eq!(ErrorClass::from_error_text("API key not valid"), ErrorClass::Auth);
        assert_eq!(ErrorClass::from_error_text("HTTP 403"), ErrorClass::Auth);
        assert_eq!(ErrorClass::from_error_text("Permission denied"), ErrorClass::Auth);
        assert_eq!(ErrorClass::from_error_text("FORBIDDEN"), ErrorClass::Auth);
        assert_eq!(
            ErrorClass::from_error_text("Invalid or missing API key"),
            ErrorClass::Auth
        );
    }

    #[test]
    fn test_quota_patterns() {
        assert_eq!(ErrorClass::from_error_text("status 429"), ErrorClass::Quota);
        assert_eq!(ErrorClass::from_error_text("Quota exceeded"), ErrorClass::Quota);
        assert_eq!(ErrorClass::from_error_text("rate limit hit"), ErrorClass::Quota);
    }

    #[test]
    fn test_unavailable_patterns() {
        assert_eq!(ErrorClass::from_error_text("503 Service Unavailable"), ErrorClass::Unavailable);
        assert_eq!(ErrorClass::from_error_text("internal error 500"), ErrorClass::Unavailable);
        assert_eq!(ErrorClass::from_error_text("model is overloaded"), ErrorClass::Unavailable);
    }

    #[test]
    fn test_network_patterns() {
        assert_eq!(ErrorClass::from_error_text("failed to fetch"), ErrorClass::Network);
        assert_eq!(ErrorClass::from_error_text("network unreachable"), ErrorClass::Network);
        assert_eq!(ErrorClass::from_error_text("Connection reset by peer"), ErrorClass::Network);
    }

    #[test]
    fn test_network_reqwest_phrasing() {
        assert_eq!(
            ErrorClass::from_error_text(
                "error sending request for url (https://example.com): error trying to connect"
            ),
            ErrorClass::Network
        );
        assert_eq!(ErrorClass::from_error_text("operation timed out"), ErrorClass::Network);
        assert_eq!(ErrorClass::from_error_text("dns error: failed to lookup"), ErrorClass::Network);
    }

    #[test]
    fn test_auth_http_rejection_body() {
        assert_eq!(
            ErrorClass::from_error_text(
                "HTTP 400 Bad Request: API key not valid. Please pass a valid API key."
            ),
            ErrorClass::Auth
        );
    }

    #[test]
    fn test_blocked_patterns() {
        assert_eq!(ErrorClass::from_error_text("blocked by safety filter"), ErrorClass::Blocked);
        assert_eq!(ErrorClass::from_error_text("response was BLOCKED"), ErrorClass::Blocked);
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(ErrorClass::from_error_text("something odd happened"), ErrorClass::Generic);
        assert_eq!(ErrorClass::from_error_text(""), ErrorClass::Generic);
    }

    #[test]
    fn test_table_order_first_match_wins() {
        // "403" (auth) appears before "quota" in the table
        assert_eq!(
            ErrorClass::from_error_text("403: quota check forbidden"),
            ErrorClass::Auth
        );
        // "limit" alone is quota even when a connection is mentioned later
        assert_eq!(
            ErrorClass::from_error_text("limit reached on this connection"),
            ErrorClass::Quota
        );
    }

    #[test]
    fn test_case_insensitive() {
        assert_eq!(ErrorClass::from_error_text("QUOTA EXCEEDED"), ErrorClass::Quota);
        assert_eq!(ErrorClass::from_error_text("Overloaded"), ErrorClass::Unavailable);
    }

    #[test]
    fn test_messages_are_nonempty_and_distinct() {
        let classes = [
            ErrorClass::Auth,
            ErrorClass::Quota,
            ErrorClass::Unavailable,
            ErrorClass::Network,
            ErrorClass::Blocked,
            ErrorClass::Generic,
        ];
        for (i, a) in classes.iter().enumerate() {
            assert!(!a.user_message().is_empty());
            for b in &classes[i + 1..] {
                assert_ne!(a.user_message(), b.user_message());
            }
        }
    }
}
