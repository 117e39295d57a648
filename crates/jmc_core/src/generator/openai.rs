//! OpenAI-compatible chat-completion client

use super::QueryGenerator;
use crate::Error;
use crate::prompt::{ChatMessage, QueryRequest};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
}

impl Default for OpenAiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenAiClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    /// Point the client at another OpenAI-compatible endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Message for a non-success response: the service's own `error.message`
/// when the body carries one, the status line otherwise.
fn service_error_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => envelope.error.message,
        Err(_) => format!("HTTP {status}"),
    }
}

/// Content of the first choice of a completion body.
fn first_choice_content(body: &str) -> Result<String, Error> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| Error::GenerationFailed(format!("malformed completion response: {e}")))?;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::GenerationFailed("no choices returned".to_string()))?;
    choice
        .message
        .content
        .ok_or_else(|| Error::GenerationFailed("empty completion message".to_string()))
}

#[async_trait]
impl QueryGenerator for OpenAiClient {
    async fn verify_credential(&self, credential: &str) -> Result<(), Error> {
        let url = self.url("models");
        tracing::debug!(%url, "checking credential");
        let response = self
            .http
            .get(url)
            .bearer_auth(credential)
            .send()
            .await
            .map_err(|e| Error::InvalidCredential(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(Error::InvalidCredential(service_error_message(status, &body)))
    }

    async fn generate(&self, credential: &str, request: &QueryRequest) -> Result<String, Error> {
        let url = self.url("chat/completions");
        let payload = CompletionRequest {
            model: &self.model,
            messages: request.messages(),
        };
        tracing::debug!(%url, model = %self.model, "requesting completion");

        let response = self
            .http
            .post(url)
            .bearer_auth(credential)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::GenerationFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::GenerationFailed(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::GenerationFailed(service_error_message(status, &body)));
        }
        first_choice_content(&body)
    }
}
