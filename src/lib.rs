//! # ollama_smoke - Chat-Completion Smoke Tester
//!
//! Sends chat-completion requests to an OpenAI-compatible endpoint (a local
//! Ollama server by default), then reports the status code, the decoded
//! response and a set of computed checks on the assistant's reply.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ollama_smoke::{send_chat_request, looks_like_json, Message};
//!
//! #[tokio::main]
//! async fn main() -> ollama_smoke::Result<()> {
//!     let response = send_chat_request(
//!         "http://localhost:11434",
//!         "llama2:7b-chat-q4_0",
//!         vec![Message::user("Reply with a JSON object")],
//!         false,
//!     )
//!     .await?;
//!
//!     println!("status {}", response.status);
//!     if let Some(content) = response.message_content() {
//!         println!("json-like: {}", looks_like_json(&content));
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`config`] - Configuration from CLI flags, environment and `.env`
//! - [`client`] - Request building and sending
//! - [`schemas`] - Request/response data structures
//! - [`probe`] - Response inspection helpers
//! - [`scenario`] - Built-in scenarios and their checks
//! - [`error`] - Error taxonomy

// Core infrastructure
pub mod core;
pub mod client;
pub mod config;
pub mod error;
pub mod schemas;

// Domain modules
pub mod probe;
pub mod scenario;

// Re-export commonly used types for convenience
pub use client::{send_chat_request, PreparedRequest, SmokeClient};
pub use config::Config;
pub use error::SmokeError;
pub use probe::{extract_message_content, looks_like_json};
pub use scenario::{builtin_scenarios, run_scenarios, Scenario, ScenarioReport, SuiteSummary};
pub use schemas::{ChatCompletionRequest, ChatResponse, Message, Role};
pub use core::http_client::{HttpClientBuilder, HttpClientConfig};

/// The result type used throughout the library
pub type Result<T> = std::result::Result<T, SmokeError>;
