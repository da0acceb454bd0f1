//! Chat-completion client for OpenAI-compatible endpoints.
//!
//! One POST per call, typed request/response structs local to the call
//! site. Retry classification mirrors the engine's taxonomy: network
//! trouble and 429/5xx are transient, everything else is terminal.

use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::config::ModelEndpoint;

#[derive(Debug, Error)]
pub enum ChatError {
    /// Endpoint unreachable, rate-limited, or serving 5xx.
    #[error("model unavailable: {0}")]
    Unavailable(String),

    /// The endpoint rejected the request (auth, bad model, oversized prompt).
    #[error("model rejected request: {0}")]
    Rejected(String),

    /// A 2xx response without usable message content.
    #[error("model returned no content")]
    Empty,
}

impl ChatError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Thin client over one chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: ModelEndpoint,
}

impl ChatClient {
    pub fn new(endpoint: ModelEndpoint) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to build chat HTTP client")?;
        Ok(Self { http, endpoint })
    }

    /// Run one system+user completion and return the assistant text.
    pub async fn complete(&self, system_prompt: &str, user_prompt: &str) -> Result<String, ChatError> {
        #[derive(Serialize)]
        struct ChatMessage<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage<'a>>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            content: Option<String>,
        }

        let request = ChatRequest {
            model: &self.endpoint.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            temperature: self.endpoint.temperature,
        };

        debug!(model = %self.endpoint.model, "chat completion request");

        let mut builder = self.http.post(&self.endpoint.url).json(&request);
        if let Some(key) = &self.endpoint.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ChatError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let detail = format!("HTTP {status}: {body}");
            return if status.as_u16() == 429 || status.is_server_error() {
                Err(ChatError::Unavailable(detail))
            } else {
                Err(ChatError::Rejected(detail))
            };
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Rejected(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ChatError::Empty)
    }
}
