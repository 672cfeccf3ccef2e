//! # Chat-Completion Client
//!
//! Builds and sends chat-completion requests. One call, one response: there
//! are no retries, and the configured timeout bounds every request.

use std::collections::BTreeMap;

use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, Instrument};
use url::Url;
use uuid::Uuid;

use crate::config::Config;
use crate::core::http_client::HttpClientBuilder;
use crate::error::SmokeError;
use crate::schemas::{ChatCompletionRequest, ChatResponse, Message};
use crate::Result;

/// Endpoint path, relative to the configured base URL.
pub const CHAT_COMPLETIONS_PATH: &str = "v1/chat/completions";

/// A fully built request, ready to go on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRequest {
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub body: ChatCompletionRequest,
}

impl PreparedRequest {
    /// Serialized request body.
    pub fn body_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.body)?)
    }
}

/// Client bound to one server and one model.
#[derive(Debug, Clone)]
pub struct SmokeClient {
    http: Client,
    base_url: String,
    display_base_url: String,
    model: String,
    api_key: Option<String>,
}

impl SmokeClient {
    /// Create a client from validated configuration.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate().map_err(SmokeError::Config)?;
        let http = HttpClientBuilder::from_config(config).build()?;
        Ok(Self::with_client(
            http,
            config.base_url.clone(),
            config.model.clone(),
            config.api_key.clone(),
        ))
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_client(
        http: Client,
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        let base_url = base_url.into();
        let display_base_url = match Url::parse(&base_url) {
            Ok(url) => redact_url(&url).trim_end_matches('/').to_string(),
            Err(_) => "invalid-url".to_string(),
        };
        Self {
            http,
            base_url,
            display_base_url,
            model: model.into(),
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Base URL without user credentials, for reports and logs.
    pub fn display_base_url(&self) -> &str {
        &self.display_base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Build the URL, headers and body for a chat-completion call.
    pub fn prepare(&self, messages: Vec<Message>, stream: bool) -> Result<PreparedRequest> {
        let body = ChatCompletionRequest::new(self.model.clone(), messages, stream);
        body.validate().map_err(SmokeError::InvalidRequest)?;

        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        if let Some(key) = &self.api_key {
            headers.insert("Authorization".to_string(), format!("Bearer {}", key));
        }

        Ok(PreparedRequest {
            url: endpoint_url(&self.base_url)?,
            headers,
            body,
        })
    }

    /// POST a prepared request and decode the JSON body.
    ///
    /// Non-2xx statuses are returned, not raised; their body must still be JSON.
    pub async fn send(&self, request: &PreparedRequest) -> Result<ChatResponse> {
        let request_id = Uuid::new_v4();
        let span = tracing::info_span!(
            "chat_request",
            %request_id,
            model = %request.body.model,
            url = %redact_url(&request.url)
        );

        async {
            let payload = request.body_bytes()?;
            debug!(bytes = payload.len(), messages = request.body.messages.len(), "sending chat request");

            let mut builder = self.http.post(request.url.clone());
            for (name, value) in &request.headers {
                builder = builder.header(name.as_str(), value.as_str());
            }

            let response = builder.body(payload).send().await?;
            let status = response.status().as_u16();
            let text = response.text().await?;

            let body: Value = serde_json::from_str(&text).map_err(|err| SmokeError::decode(err, &text))?;
            info!(status, "chat request completed");

            Ok::<_, SmokeError>(ChatResponse::new(status, body))
        }
        .instrument(span)
        .await
    }

    /// Prepare and send in one step, using the client's model.
    pub async fn send_chat_request(&self, messages: Vec<Message>, stream: bool) -> Result<ChatResponse> {
        let request = self.prepare(messages, stream)?;
        self.send(&request).await
    }
}

/// Send one chat-completion request with a default HTTP client.
///
/// Fails with [`SmokeError::Network`] when the server cannot be reached or
/// times out, and with [`SmokeError::Decode`] when the body is not JSON.
pub async fn send_chat_request(
    base_url: &str,
    model: &str,
    messages: Vec<Message>,
    stream: bool,
) -> Result<ChatResponse> {
    let http = HttpClientBuilder::new().build()?;
    SmokeClient::with_client(http, base_url, model, None)
        .send_chat_request(messages, stream)
        .await
}

/// Copy of `url` with any username and password removed.
pub fn redact_url(url: &Url) -> String {
    let mut redacted = url.clone();
    // Only fails for URLs that cannot carry credentials in the first place
    let _ = redacted.set_username("");
    let _ = redacted.set_password(None);
    redacted.to_string()
}

/// Join the endpoint path onto `base_url`, keeping any path prefix the base
/// already has.
pub fn endpoint_url(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base.join(CHAT_COMPLETIONS_PATH)?)
}
