//! Typed HTTP client for the assistant registry.
//!
//! Transport failures surface as [`ClientError::Unreachable`] so callers can
//! tell "the service is down" apart from a request the service rejected.

use crate::dtos::{
    DeleteAssistantResponse, ErrorResponse, HealthResponse, MessageRequest, MessageResponse,
    UpsertAssistantRequest, UpsertAssistantResponse,
};
use crate::models::Assistant;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    #[error("HTTP client could not be built: {0}")]
    Setup(#[source] reqwest::Error),

    #[error("cannot reach the assistant service at {base_url}: {source}")]
    Unreachable {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{}", describe(.0))]
    Validation(ErrorResponse),

    #[error("{}", describe(.0))]
    NotFound(ErrorResponse),

    #[error("Assistant service returned {status}: {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response body: {0}")]
    Decode(#[source] reqwest::Error),
}

fn describe(err: &ErrorResponse) -> &str {
    err.details.as_deref().unwrap_or(&err.error)
}

#[derive(Debug, Clone)]
pub struct AssistantClient {
    http: Client,
    base_url: Url,
}

impl AssistantClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ClientError::InvalidBaseUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidBaseUrl(base_url.to_string()));
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::Setup)?;

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub async fn upsert(
        &self,
        name: &str,
        response_text: &str,
    ) -> Result<UpsertAssistantResponse, ClientError> {
        let body = UpsertAssistantRequest {
            name: name.to_string(),
            response_text: response_text.to_string(),
        };
        let url = self.url(&["api", "assistants"])?;
        self.send(self.http.post(url).json(&body)).await
    }

    pub async fn send_message(
        &self,
        name: &str,
        message: &str,
    ) -> Result<MessageResponse, ClientError> {
        let body = MessageRequest {
            message: message.to_string(),
        };
        let url = self.url(&["api", "assistants", name, "message"])?;
        self.send(self.http.post(url).json(&body)).await
    }

    pub async fn list(&self) -> Result<Vec<Assistant>, ClientError> {
        let url = self.url(&["api", "assistants"])?;
        self.send(self.http.get(url)).await
    }

    pub async fn get(&self, name: &str) -> Result<Assistant, ClientError> {
        let url = self.url(&["api", "assistants", name])?;
        self.send(self.http.get(url)).await
    }

    pub async fn delete(&self, name: &str) -> Result<DeleteAssistantResponse, ClientError> {
        let url = self.url(&["api", "assistants", name])?;
        self.send(self.http.delete(url)).await
    }

    /// A `DOWN` service answers 503, reported as [`ClientError::Server`].
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = self.url(&["api", "assistants", "health"])?;
        self.send(self.http.get(url)).await
    }

    /// Each segment is percent-encoded, so names may contain spaces or `/`.
    fn url(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = request.send().await.map_err(|source| {
            tracing::warn!(
                base_url = %self.base_url,
                error = %source,
                "Assistant service request failed"
            );
            ClientError::Unreachable {
                base_url: self.base_url.to_string(),
                source,
            }
        })?;

        let status = response.status();
        if status.is_success() {
            return response.json::<T>().await.map_err(ClientError::Decode);
        }

        let body = response.text().await.map_err(ClientError::Decode)?;
        let parsed = serde_json::from_str::<ErrorResponse>(&body).ok();

        Err(match (status, parsed) {
            (StatusCode::BAD_REQUEST, Some(err)) => ClientError::Validation(err),
            (StatusCode::NOT_FOUND, Some(err)) => ClientError::NotFound(err),
            (status, parsed) => ClientError::Server {
                status: status.as_u16(),
                message: parsed.map(|err| err.error).unwrap_or(body),
            },
        })
    }
}
