//! # Error Types
//!
//! Failures the smoke tester can surface. `Network` and `Decode` are terminal
//! for the request that produced them; nothing is retried.

use thiserror::Error;

/// Maximum number of body bytes kept in a [`SmokeError::Decode`] excerpt.
const BODY_EXCERPT_LIMIT: usize = 512;

#[derive(Debug, Error)]
pub enum SmokeError {
    /// Connection refused, DNS failure, timeout, or a broken body read.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered, but the body is not valid JSON.
    #[error("Decode error: {message} (body: {body:?})")]
    Decode { message: String, body: String },

    /// The request could not be built (empty messages, bad URL).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Configuration was rejected or the HTTP client could not be created.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SmokeError {
    /// Build a decode error from a serde failure and the offending body.
    pub fn decode(err: serde_json::Error, body: &str) -> Self {
        SmokeError::Decode {
            message: err.to_string(),
            body: excerpt(body),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, SmokeError::Network(_))
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, SmokeError::Decode { .. })
    }
}

fn excerpt(body: &str) -> String {
    if body.len() <= BODY_EXCERPT_LIMIT {
        return body.to_string();
    }
    let mut end = BODY_EXCERPT_LIMIT;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &body[..end])
}

impl From<reqwest::Error> for SmokeError {
    /// Classify reqwest failures. Everything reqwest reports while talking to
    /// the server counts as a network failure for the request.
    fn from(err: reqwest::Error) -> Self {
        // The URL may carry credentials
        let err = err.without_url();
        if err.is_timeout() {
            SmokeError::Network(format!("Request timeout - server did not respond in time: {}", err))
        } else if err.is_connect() {
            SmokeError::Network(format!("Connection failed - unable to reach server: {}", err))
        } else if err.is_builder() {
            SmokeError::InvalidRequest(format!("Could not build request: {}", err))
        } else {
            SmokeError::Network(format!("HTTP client error: {}", err))
        }
    }
}

impl From<serde_json::Error> for SmokeError {
    fn from(err: serde_json::Error) -> Self {
        SmokeError::Decode {
            message: err.to_string(),
            body: String::new(),
        }
    }
}

impl From<url::ParseError> for SmokeError {
    fn from(err: url::ParseError) -> Self {
        SmokeError::InvalidRequest(format!("Invalid URL: {}", err))
    }
}
