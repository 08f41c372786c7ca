//! HTTP bridge to the chat endpoint.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use shared::{
    error::{ApiErrorBody, ProtocolError},
    protocol::{ChatRequest, ChatResponse, CHAT_PATH},
};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("chat request returned {status} (detail: {detail:?})")]
    Status {
        status: StatusCode,
        detail: Option<String>,
    },
    #[error(transparent)]
    Decode(#[from] ProtocolError),
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError>;
}

/// Posts the whole thread to `{api_base}/api/chat` and decodes the reply.
///
/// No timeout or retry is applied here; whatever the underlying client does
/// is what the caller gets.
pub struct HttpChatTransport {
    http: Client,
    endpoint: String,
}

impl HttpChatTransport {
    pub fn new(api_base: impl AsRef<str>) -> Self {
        Self::with_client(Client::new(), api_base)
    }

    pub fn with_client(http: Client, api_base: impl AsRef<str>) -> Self {
        Self {
            http,
            endpoint: chat_endpoint(api_base.as_ref()),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub fn chat_endpoint(api_base: &str) -> String {
    format!("{}{CHAT_PATH}", api_base.trim().trim_end_matches('/'))
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, TransportError> {
        debug!(
            endpoint = %self.endpoint,
            thread_id = %request.thread_id,
            messages = request.messages.len(),
            "posting chat request"
        );
        let res = self.http.post(&self.endpoint).json(request).send().await?;

        let status = res.status();
        if !status.is_success() {
            let detail = res
                .bytes()
                .await
                .ok()
                .and_then(|body| serde_json::from_slice::<ApiErrorBody>(&body).ok())
                .and_then(|body| body.summary());
            return Err(TransportError::Status { status, detail });
        }

        let body = res.bytes().await?;
        debug!(bytes = body.len(), "chat response received");
        Ok(ChatResponse::from_slice(&body)?)
    }
}
