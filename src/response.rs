//! Response classification: turn a [`RawResponse`] into a [`ServerResponse`].
//!
//! The server has two ways of answering a successful upload: a JSON body
//! with Mermaid source under `mermaid_code`, or the rendered image itself.
//! Failures are a non-2xx status with an optional JSON `error` string.
//!
//! [`classify`] picks the variant from the status first, then from the
//! configured [`ResponseMode`]. In `Auto` mode the `Content-Type` header
//! decides; when it is missing or unhelpful the body is sniffed.

use crate::config::ResponseMode;
use crate::submit::RawResponse;
use serde::Deserialize;
use tracing::debug;

/// JSON field carrying the diagram source in a success body.
pub const DIAGRAM_FIELD: &str = "mermaid_code";

/// JSON field carrying the message in an error body.
pub const ERROR_FIELD: &str = "error";

/// What the server said, after interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerResponse {
    /// Mermaid source to be rendered client-side.
    Diagram(String),
    /// An already-rendered image.
    Image { bytes: Vec<u8>, media_type: String },
    /// Non-2xx status; `message` is the server's `error` field if present.
    Error { message: Option<String> },
    /// A body that fits none of the expected shapes: a 2xx body that is
    /// neither JSON nor an image, or an error status with a non-JSON body.
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct DiagramBody {
    #[serde(default)]
    mermaid_code: Option<String>,
}

/// Interpret `raw` according to `mode`.
pub fn classify(raw: &RawResponse, mode: ResponseMode) -> ServerResponse {
    if !raw.is_success() {
        return error_response(raw);
    }

    let essence = raw.mime_essence();
    debug!(
        "Classifying HTTP {} response ({:?}, mode {:?})",
        raw.status, essence, mode
    );

    match mode {
        ResponseMode::Diagram => parse_diagram(&raw.body),
        ResponseMode::Image => image_response(raw, essence.as_deref()),
        ResponseMode::Auto => match essence.as_deref() {
            Some(ct) if ct.starts_with("image/") => image_response(raw, Some(ct)),
            Some(ct) if ct == "application/json" || ct.ends_with("+json") => {
                parse_diagram(&raw.body)
            }
            _ => sniff(raw),
        },
    }
}

/// Non-2xx answer. The body still has to be JSON; anything else is
/// treated like a body that could not be read at all.
///
/// A JSON body without a non-blank `error` string yields `message: None`.
fn error_response(raw: &RawResponse) -> ServerResponse {
    let parsed: serde_json::Value = match serde_json::from_slice(&raw.body) {
        Ok(v) => v,
        Err(e) => {
            return ServerResponse::Malformed(format!(
                "HTTP {} with a non-JSON body: {e}",
                raw.status
            ))
        }
    };
    let message = parsed
        .get(ERROR_FIELD)
        .and_then(serde_json::Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .map(str::to_string);
    ServerResponse::Error { message }
}

fn parse_diagram(body: &[u8]) -> ServerResponse {
    match serde_json::from_slice::<DiagramBody>(body) {
        Ok(parsed) => ServerResponse::Diagram(parsed.mermaid_code.unwrap_or_default()),
        Err(e) => ServerResponse::Malformed(format!("expected a JSON diagram body: {e}")),
    }
}

fn image_response(raw: &RawResponse, essence: Option<&str>) -> ServerResponse {
    let media_type = match essence {
        Some(ct) if ct.starts_with("image/") => ct.to_string(),
        _ => image::guess_format(&raw.body)
            .map(|f| f.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string()),
    };
    ServerResponse::Image {
        bytes: raw.body.clone(),
        media_type,
    }
}

fn sniff(raw: &RawResponse) -> ServerResponse {
    if image::guess_format(&raw.body).is_ok() {
        return image_response(raw, None);
    }
    parse_diagram(&raw.body)
}
