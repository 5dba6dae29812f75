//! Submission: package the selected PDF and send it to the generation server.
//!
//! One user trigger produces exactly one request. There is no retry loop,
//! no timeout and no cancellation: the server may take as long as its
//! model needs, and a new trigger simply overwrites the result area when its
//! own response arrives.
//!
//! The network sits behind the [`Transport`] trait so the controller can be
//! driven by a stub in tests and by [`HttpTransport`] everywhere else.

use crate::error::Pdf2MapError;
use crate::selection::SelectedFile;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

/// One outbound submission: the target URL and the multipart contents.
#[derive(Debug, Clone)]
pub struct Upload {
    pub url: String,
    pub field_name: String,
    pub file: SelectedFile,
}

impl Upload {
    /// Build the multipart form: a single part named `field_name` carrying
    /// the file bytes, its name and its declared media type.
    pub fn form(&self) -> Result<Form, Pdf2MapError> {
        let part = Part::bytes(self.file.bytes().to_vec())
            .file_name(self.file.name().to_string())
            .mime_str(self.file.media_type())
            .map_err(|e| Pdf2MapError::Internal(format!("invalid media type: {e}")))?;
        Ok(Form::new().part(self.field_name.clone(), part))
    }
}

/// Status, content type and body of a completed exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, content_type: Option<&str>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: content_type.map(str::to_string),
            body: body.into(),
        }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Content type without parameters, lower-cased (`application/json`).
    pub fn mime_essence(&self) -> Option<String> {
        self.content_type.as_deref().map(|ct| {
            ct.split(';')
                .next()
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
        })
    }
}

/// Sends an [`Upload`] and waits for the server's answer.
///
/// Implementations return `Err(Pdf2MapError::ConnectionFailed)` only when the
/// exchange never completed; any HTTP status, success or not, is an `Ok`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, upload: &Upload) -> Result<RawResponse, Pdf2MapError>;
}

/// [`Transport`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// A client without any request timeout.
    pub fn new() -> Result<Self, Pdf2MapError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| Pdf2MapError::Internal(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, upload: &Upload) -> Result<RawResponse, Pdf2MapError> {
        info!(
            "Uploading '{}' ({} bytes) to {}",
            upload.file.name(),
            upload.file.len(),
            upload.url
        );

        let connection_failed = |e: reqwest::Error| Pdf2MapError::ConnectionFailed {
            url: upload.url.clone(),
            reason: e.to_string(),
        };

        let response = self
            .client
            .post(&upload.url)
            .multipart(upload.form()?)
            .send()
            .await
            .map_err(connection_failed)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(connection_failed)?;

        debug!(
            "Server answered HTTP {} ({}, {} bytes)",
            status,
            content_type.as_deref().unwrap_or("no content type"),
            body.len()
        );

        Ok(RawResponse {
            status,
            content_type,
            body: body.to_vec(),
        })
    }
}
