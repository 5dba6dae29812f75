//! Diagram rendering: Mermaid source → SVG markup.
//!
//! The actual layout engine is an external collaborator behind
//! [`DiagramRenderer`]. [`KrokiRenderer`] talks to any Kroki-compatible HTTP
//! service; callers can plug in their own implementation through
//! [`crate::config::ClientConfigBuilder::renderer`].
//!
//! Before rendering, [`normalize_source`] strips the outer code fence that
//! language models like to wrap their output in.

use crate::error::DiagramError;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

/// Turns diagram source into SVG markup.
///
/// `target_id` names the element the markup will be attached to;
/// implementations use it as the id of the root `<svg>` element.
#[async_trait]
pub trait DiagramRenderer: Send + Sync {
    async fn render_svg(&self, target_id: &str, source: &str) -> Result<String, DiagramError>;
}

// ── Source normalisation ─────────────────────────────────────────────────────

static RE_OUTER_FENCES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[ \t]*(?:mermaid)?[ \t]*\n(.*?)\n?```\s*$").unwrap());

/// Strip an outer ```` ```mermaid ```` fence, normalise line endings and trim.
///
/// Returns [`DiagramError::Empty`] when nothing is left.
pub fn normalize_source(source: &str) -> Result<String, DiagramError> {
    let s = source.replace("\r\n", "\n").replace('\r', "\n");
    let s = s.trim();
    let s = match RE_OUTER_FENCES.captures(s) {
        Some(caps) => caps[1].trim().to_string(),
        None => s.to_string(),
    };
    if s.is_empty() {
        return Err(DiagramError::Empty);
    }
    Ok(s)
}

static RE_SVG_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<svg\b[^>]*>").unwrap());
static RE_ID_ATTR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\sid\s*=\s*["']"#).unwrap());

/// Give the root `<svg>` element `id="<target_id>"` unless it already has one.
///
/// Returns [`DiagramError::InvalidOutput`] when `markup` has no `<svg` tag.
pub fn attach_target_id(markup: &str, target_id: &str) -> Result<String, DiagramError> {
    let open = RE_SVG_OPEN.find(markup).ok_or(DiagramError::InvalidOutput)?;
    if RE_ID_ATTR.is_match(open.as_str()) {
        return Ok(markup.to_string());
    }
    let insert_at = open.start() + "<svg".len();
    let mut out = String::with_capacity(markup.len() + target_id.len() + 6);
    out.push_str(&markup[..insert_at]);
    out.push_str(&format!(
        " id=\"{}\"",
        htmlize::escape_attribute(target_id)
    ));
    out.push_str(&markup[insert_at..]);
    Ok(out)
}

// ── Kroki ────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct KrokiRequest<'a> {
    diagram_source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    diagram_options: Option<KrokiOptions<'a>>,
}

#[derive(Debug, Serialize)]
struct KrokiOptions<'a> {
    theme: &'a str,
}

/// [`DiagramRenderer`] backed by a Kroki-compatible HTTP service.
///
/// Sends `POST {base_url}/mermaid/svg` with a JSON body. A 4xx answer means
/// the source was rejected and maps to [`DiagramError::Syntax`] carrying the
/// service's explanation.
#[derive(Debug, Clone)]
pub struct KrokiRenderer {
    client: reqwest::Client,
    base_url: String,
    theme: Option<String>,
}

impl KrokiRenderer {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, DiagramError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| DiagramError::Unavailable {
                reason: e.to_string(),
            })?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            theme: None,
        })
    }

    pub fn with_theme(mut self, theme: impl Into<String>) -> Self {
        self.theme = Some(theme.into());
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/mermaid/svg", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl DiagramRenderer for KrokiRenderer {
    async fn render_svg(&self, target_id: &str, source: &str) -> Result<String, DiagramError> {
        let url = self.endpoint();
        info!("Rendering diagram via {}", url);

        let body = KrokiRequest {
            diagram_source: source,
            diagram_options: self.theme.as_deref().map(|theme| KrokiOptions { theme }),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| DiagramError::Unavailable {
                reason: e.to_string(),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| DiagramError::Unavailable {
            reason: e.to_string(),
        })?;

        if status.is_client_error() {
            return Err(DiagramError::Syntax {
                detail: text.trim().to_string(),
            });
        }
        if !status.is_success() {
            return Err(DiagramError::Unavailable {
                reason: format!("HTTP {status}"),
            });
        }

        debug!("Renderer returned {} bytes of SVG", text.len());
        attach_target_id(&text, target_id)
    }
}
