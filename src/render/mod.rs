//! Result rendering: the result area and the transitions into its states.
//!
//! The result area is a single slot. Every submission moves it to
//! [`ResultArea::Loading`] and then to exactly one terminal state; nothing
//! partial is ever shown and each transition replaces whatever was there.
//!
//! ```text
//! Empty ──▶ Loading ──▶ Diagram { svg }
//!             ▲    ├──▶ Image(ImageRef)
//!             │    └──▶ Error { message }
//!             └──── (next submission)
//! ```

pub mod diagram;
pub mod raster;

pub use diagram::{normalize_source, DiagramRenderer, KrokiRenderer};
pub use raster::ImageRef;

use crate::error::Pdf2MapError;
use crate::response::ServerResponse;
use std::sync::Arc;
use tracing::{error, info};

/// Shown when the exchange never completed or the body was unusable.
pub const CONNECTION_ERROR_MESSAGE: &str = "Could not connect to the server.";

/// Shown when the server reported a failure without a message.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Shown when the diagram source from the server could not be rendered.
pub const INVALID_DIAGRAM_MESSAGE: &str =
    "The generated diagram has invalid syntax. The AI model may have returned invalid code. Please try again.";

/// State of the result area.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResultArea {
    /// Nothing submitted yet.
    #[default]
    Empty,
    /// A submission is in flight.
    Loading,
    /// Rendered SVG markup.
    Diagram { svg: String },
    /// An image element pointing at the referenced bytes.
    Image(ImageRef),
    /// A styled error block.
    Error { message: String },
}

impl ResultArea {
    /// Short state name, used in logs and errors.
    pub fn state_name(&self) -> &'static str {
        match self {
            ResultArea::Empty => "empty",
            ResultArea::Loading => "loading",
            ResultArea::Diagram { .. } => "diagram",
            ResultArea::Image(_) => "image",
            ResultArea::Error { .. } => "error",
        }
    }

    /// True for the states a submission can end in.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ResultArea::Empty | ResultArea::Loading)
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            ResultArea::Error { message } => Some(message),
            _ => None,
        }
    }
}

/// Owns the result area and drives it from server responses.
pub struct ResultRenderer {
    area: ResultArea,
    diagram: Arc<dyn DiagramRenderer>,
    target_id: String,
}

impl ResultRenderer {
    pub fn new(diagram: Arc<dyn DiagramRenderer>, target_id: impl Into<String>) -> Self {
        Self {
            area: ResultArea::Empty,
            diagram,
            target_id: target_id.into(),
        }
    }

    pub fn area(&self) -> &ResultArea {
        &self.area
    }

    pub fn show_loading(&mut self) {
        self.area = ResultArea::Loading;
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.area = ResultArea::Error {
            message: message.into(),
        };
    }

    /// The request never completed; `cause` is logged, not shown.
    pub fn show_connection_error(&mut self, cause: &Pdf2MapError) {
        error!("Connection error: {cause}");
        self.show_error(CONNECTION_ERROR_MESSAGE);
    }

    /// Move to the terminal state matching `response`.
    pub async fn render(&mut self, response: ServerResponse) -> &ResultArea {
        match response {
            ServerResponse::Diagram(source) => {
                self.area = match self.render_diagram(&source).await {
                    Ok(svg) => {
                        info!("Diagram rendered ({} bytes of SVG)", svg.len());
                        ResultArea::Diagram { svg }
                    }
                    Err(e) => {
                        error!("Diagram rendering failed: {e}");
                        ResultArea::Error {
                            message: INVALID_DIAGRAM_MESSAGE.to_string(),
                        }
                    }
                };
            }
            ServerResponse::Image { bytes, media_type } => {
                let image = ImageRef::new(bytes, media_type);
                info!(
                    "Image received ({}, {} bytes)",
                    image.media_type(),
                    image.len()
                );
                self.area = ResultArea::Image(image);
            }
            ServerResponse::Error { message } => {
                let message = message.unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string());
                info!("Server reported an error: {message}");
                self.show_error(message);
            }
            ServerResponse::Malformed(detail) => {
                error!("Unusable response body: {detail}");
                self.show_error(CONNECTION_ERROR_MESSAGE);
            }
        }
        &self.area
    }

    async fn render_diagram(&self, source: &str) -> Result<String, crate::error::DiagramError> {
        let source = normalize_source(source)?;
        self.diagram.render_svg(&self.target_id, &source).await
    }
}
