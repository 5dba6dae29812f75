//! Configuration types for the upload-and-render client.
//!
//! Everything the controller needs to know about the outside world lives in
//! [`ClientConfig`]: where the generation endpoint is, how the multipart body
//! is shaped, how a success response should be interpreted and which diagram
//! renderer turns Mermaid text into SVG. Built via [`ClientConfigBuilder`],
//! which validates on [`ClientConfigBuilder::build`].

use crate::error::Pdf2MapError;
use crate::observer::ObserverHandle;
use crate::render::DiagramRenderer;
use crate::submit::Transport;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Path of the generation endpoint on the server.
pub const DEFAULT_ENDPOINT: &str = "/api/generate";

/// Multipart field name carrying the PDF bytes.
pub const DEFAULT_FIELD_NAME: &str = "file";

/// Element id the rendered SVG is attached to.
pub const DEFAULT_RENDER_TARGET: &str = "graphDiv";

/// Base URL of the public Kroki instance.
pub const DEFAULT_RENDERER_URL: &str = "https://kroki.io";

/// Configuration for an upload-and-render cycle.
///
/// # Example
/// ```rust
/// use edgequake_pdf2map::{ClientConfig, ResponseMode};
///
/// let config = ClientConfig::builder()
///     .server_url("http://localhost:5000")
///     .response_mode(ResponseMode::Diagram)
///     .diagram_theme("forest")
///     .build()
///     .unwrap();
/// assert_eq!(config.endpoint_url(), "http://localhost:5000/api/generate");
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// Base URL of the generation server. Default: `http://localhost:3000`.
    pub server_url: String,

    /// Path of the generation endpoint. Default: `/api/generate`.
    pub endpoint: String,

    /// Multipart field name for the uploaded PDF. Default: `file`.
    pub field_name: String,

    /// How a success response is interpreted. Default: [`ResponseMode::Auto`].
    pub response_mode: ResponseMode,

    /// Target id handed to the diagram renderer. Default: `graphDiv`.
    pub render_target: String,

    /// Base URL of the Kroki-compatible renderer. Default: `https://kroki.io`.
    pub renderer_url: String,

    /// Mermaid theme forwarded to the renderer (e.g. `forest`).
    pub diagram_theme: Option<String>,

    /// Timeout for a single render call in seconds. Default: 30.
    ///
    /// Applies to the renderer only; the upload itself has no timeout.
    pub renderer_timeout_secs: u64,

    /// Pre-constructed diagram renderer. Takes precedence over `renderer_url`.
    pub renderer: Option<Arc<dyn DiagramRenderer>>,

    /// Pre-constructed transport. Default: a fresh [`crate::submit::HttpTransport`].
    pub transport: Option<Arc<dyn Transport>>,

    /// Observer notified of notices, selection and result changes.
    pub observer: Option<ObserverHandle>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:3000".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            field_name: DEFAULT_FIELD_NAME.to_string(),
            response_mode: ResponseMode::default(),
            render_target: DEFAULT_RENDER_TARGET.to_string(),
            renderer_url: DEFAULT_RENDERER_URL.to_string(),
            diagram_theme: None,
            renderer_timeout_secs: 30,
            renderer: None,
            transport: None,
            observer: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_url", &self.server_url)
            .field("endpoint", &self.endpoint)
            .field("field_name", &self.field_name)
            .field("response_mode", &self.response_mode)
            .field("render_target", &self.render_target)
            .field("renderer_url", &self.renderer_url)
            .field("diagram_theme", &self.diagram_theme)
            .field("renderer_timeout_secs", &self.renderer_timeout_secs)
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn DiagramRenderer>"))
            .field("transport", &self.transport.as_ref().map(|_| "<dyn Transport>"))
            .field("observer", &self.observer.as_ref().map(|_| "<dyn ControllerObserver>"))
            .finish()
    }
}

impl ClientConfig {
    /// Create a new builder for `ClientConfig`.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full URL of the generation endpoint.
    pub fn endpoint_url(&self) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), self.endpoint)
    }
}

/// Builder for [`ClientConfig`].
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl fmt::Debug for ClientConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfigBuilder")
            .field("config", &self.config)
            .finish()
    }
}

impl ClientConfigBuilder {
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into();
        self
    }

    pub fn endpoint(mut self, path: impl Into<String>) -> Self {
        self.config.endpoint = path.into();
        self
    }

    pub fn field_name(mut self, name: impl Into<String>) -> Self {
        self.config.field_name = name.into();
        self
    }

    pub fn response_mode(mut self, mode: ResponseMode) -> Self {
        self.config.response_mode = mode;
        self
    }

    pub fn render_target(mut self, id: impl Into<String>) -> Self {
        self.config.render_target = id.into();
        self
    }

    pub fn renderer_url(mut self, url: impl Into<String>) -> Self {
        self.config.renderer_url = url.into();
        self
    }

    pub fn diagram_theme(mut self, theme: impl Into<String>) -> Self {
        self.config.diagram_theme = Some(theme.into());
        self
    }

    pub fn renderer_timeout_secs(mut self, secs: u64) -> Self {
        self.config.renderer_timeout_secs = secs.max(1);
        self
    }

    pub fn renderer(mut self, renderer: Arc<dyn DiagramRenderer>) -> Self {
        self.config.renderer = Some(renderer);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.config.transport = Some(transport);
        self
    }

    pub fn observer(mut self, observer: ObserverHandle) -> Self {
        self.config.observer = Some(observer);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ClientConfig, Pdf2MapError> {
        let c = &self.config;
        if !is_http_url(&c.server_url) {
            return Err(Pdf2MapError::InvalidConfig(format!(
                "server URL must start with http:// or https://, got '{}'",
                c.server_url
            )));
        }
        if !c.endpoint.starts_with('/') {
            return Err(Pdf2MapError::InvalidConfig(format!(
                "endpoint must start with '/', got '{}'",
                c.endpoint
            )));
        }
        if c.field_name.trim().is_empty() {
            return Err(Pdf2MapError::InvalidConfig(
                "multipart field name must not be empty".into(),
            ));
        }
        if c.render_target.trim().is_empty() {
            return Err(Pdf2MapError::InvalidConfig(
                "render target id must not be empty".into(),
            ));
        }
        if c.renderer.is_none() && !is_http_url(&c.renderer_url) {
            return Err(Pdf2MapError::InvalidConfig(format!(
                "renderer URL must start with http:// or https://, got '{}'",
                c.renderer_url
            )));
        }
        Ok(self.config)
    }
}

/// Check if the input string looks like an HTTP(S) URL.
pub fn is_http_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

// ── Enums ────────────────────────────────────────────────────────────────

/// How a success response from the generation server is interpreted.
///
/// | Mode | Body expected |
/// |------|---------------|
/// | `Auto` | chosen from `Content-Type`, then by sniffing the body (default) |
/// | `Diagram` | JSON with a `mermaid_code` string |
/// | `Image` | raw image bytes |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    #[default]
    Auto,
    Diagram,
    Image,
}
