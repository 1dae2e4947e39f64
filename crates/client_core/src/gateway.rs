//! Typed access to the sequence backend.
//!
//! One request per logical operation. Every failure, whether transport,
//! status or body shape, comes back as a [`GatewayError`].

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    error::ErrorBody,
    protocol::{
        BatchSequenceOutput, BatchSequenceStats, FastaInput, HealthResponse, SequenceInput,
        SequenceOutput, SequenceStats, ServiceInfo,
    },
};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::ClientSettings;

/// Shown when a failure carries no usable text at all.
pub const FALLBACK_ERROR_MESSAGE: &str = "processing failed";

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("{0}")]
    Transport(String),
    #[error("request failed with status code {status}")]
    Status { status: u16, detail: Option<String> },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl GatewayError {
    /// Structured backend detail first, then the transport message, then the
    /// fixed fallback.
    pub fn user_message(&self) -> String {
        if let Self::Status {
            detail: Some(detail),
            ..
        } = self
        {
            if !detail.trim().is_empty() {
                return detail.clone();
            }
        }

        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Status { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformOperation {
    ReverseComplement,
    Transcribe,
    ReverseTranscribe,
    Translate,
    Uppercase,
    Lowercase,
}

impl TransformOperation {
    pub fn path(self) -> &'static str {
        match self {
            Self::ReverseComplement => "/sequence/reverse-complement",
            Self::Transcribe => "/sequence/transcribe",
            Self::ReverseTranscribe => "/sequence/reverse-transcribe",
            Self::Translate => "/sequence/translate",
            Self::Uppercase => "/sequence/case/upper",
            Self::Lowercase => "/sequence/case/lower",
        }
    }

    /// Batch endpoint for this operation, when the backend offers one.
    pub fn batch_path(self) -> Option<&'static str> {
        match self {
            Self::ReverseComplement => Some("/fasta/reverse-complement"),
            Self::Transcribe => Some("/fasta/transcribe"),
            Self::Translate => Some("/fasta/translate"),
            Self::ReverseTranscribe | Self::Uppercase | Self::Lowercase => None,
        }
    }
}

#[async_trait]
pub trait SequenceGateway: Send + Sync {
    async fn health_check(&self) -> Result<HealthResponse, GatewayError>;

    async fn transform(
        &self,
        operation: TransformOperation,
        input: &SequenceInput,
    ) -> Result<SequenceOutput, GatewayError>;

    async fn get_stats(&self, input: &SequenceInput) -> Result<SequenceStats, GatewayError>;

    async fn reverse_complement(&self, input: &SequenceInput) -> Result<SequenceOutput, GatewayError> {
        self.transform(TransformOperation::ReverseComplement, input)
            .await
    }

    async fn transcribe(&self, input: &SequenceInput) -> Result<SequenceOutput, GatewayError> {
        self.transform(TransformOperation::Transcribe, input).await
    }

    async fn reverse_transcribe(&self, input: &SequenceInput) -> Result<SequenceOutput, GatewayError> {
        self.transform(TransformOperation::ReverseTranscribe, input)
            .await
    }

    async fn translate(&self, input: &SequenceInput) -> Result<SequenceOutput, GatewayError> {
        self.transform(TransformOperation::Translate, input).await
    }

    async fn to_uppercase(&self, input: &SequenceInput) -> Result<SequenceOutput, GatewayError> {
        self.transform(TransformOperation::Uppercase, input).await
    }

    async fn to_lowercase(&self, input: &SequenceInput) -> Result<SequenceOutput, GatewayError> {
        self.transform(TransformOperation::Lowercase, input).await
    }
}

pub struct HttpGateway {
    http: Client,
    base_url: String,
}

impl HttpGateway {
    pub fn from_settings(settings: &ClientSettings) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(settings.request_timeout)
            .build()?;
        Ok(Self::with_client(http, settings.api_base_url.clone()))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn service_info(&self) -> Result<ServiceInfo, GatewayError> {
        self.send::<(), _>(Method::GET, "/", None).await
    }

    pub async fn batch_transform(
        &self,
        operation: TransformOperation,
        input: &FastaInput,
    ) -> Result<BatchSequenceOutput, GatewayError> {
        let Some(path) = operation.batch_path() else {
            return Err(GatewayError::Status {
                status: 404,
                detail: Some(format!("no batch endpoint for {operation:?}")),
            });
        };
        self.send(Method::POST, path, Some(input)).await
    }

    pub async fn batch_stats(&self, input: &FastaInput) -> Result<BatchSequenceStats, GatewayError> {
        self.send(Method::POST, "/fasta/stats", Some(input)).await
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, GatewayError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        debug!(method = %method, path, "api request");
        let mut request = self
            .http
            .request(method.clone(), format!("{}{path}", self.base_url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|err| self.transport_error(path, err))?;
        self.read_response(&method, path, response).await
    }

    async fn read_response<T: DeserializeOwned>(
        &self,
        method: &Method,
        path: &str,
        response: Response,
    ) -> Result<T, GatewayError> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| self.transport_error(path, err))?;

        if !status.is_success() {
            let detail = serde_json::from_slice::<ErrorBody>(&bytes)
                .ok()
                .and_then(|body| body.message());
            warn!(
                method = %method,
                path,
                status = status.as_u16(),
                detail = detail.as_deref().unwrap_or(""),
                "api error"
            );
            return Err(GatewayError::Status {
                status: status.as_u16(),
                detail,
            });
        }

        debug!(method = %method, path, status = status.as_u16(), "api response");
        serde_json::from_slice(&bytes).map_err(|err| GatewayError::Decode(err.to_string()))
    }

    fn transport_error(&self, path: &str, err: reqwest::Error) -> GatewayError {
        let message = if err.is_timeout() {
            format!("request to {path} timed out")
        } else if err.is_connect() {
            format!("failed to connect to {}: {err}", self.base_url)
        } else {
            err.to_string()
        };
        warn!(path, error = %message, "api transport failure");
        GatewayError::Transport(message)
    }
}

#[async_trait]
impl SequenceGateway for HttpGateway {
    async fn health_check(&self) -> Result<HealthResponse, GatewayError> {
        self.send::<(), _>(Method::GET, "/health", None).await
    }

    async fn transform(
        &self,
        operation: TransformOperation,
        input: &SequenceInput,
    ) -> Result<SequenceOutput, GatewayError> {
        self.send(Method::POST, operation.path(), Some(input)).await
    }

    async fn get_stats(&self, input: &SequenceInput) -> Result<SequenceStats, GatewayError> {
        self.send(Method::POST, "/sequence/stats", Some(input)).await
    }
}

#[cfg(test)]
#[path = "tests/gateway_tests.rs"]
mod tests;
