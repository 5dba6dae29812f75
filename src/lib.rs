//! # edgequake-pdf2map
//!
//! Upload a PDF to a concept-map generation service and render what comes
//! back: Mermaid source turned into SVG, or a finished image.
//!
//! The service itself (text extraction, prompting a model, drawing) is an
//! opaque HTTP endpoint. This crate is the client side of that exchange,
//! modelled as a small event-driven controller so it can sit behind a
//! terminal, a desktop UI or a web front end alike.
//!
//! ## Flow
//!
//! ```text
//! FileChosen / Drop ─▶ selection   accept only application/pdf
//! GenerateClicked   ─▶ submit      POST /api/generate (multipart "file")
//!                   ─▶ response    classify: diagram | image | error
//!                   ─▶ render      Mermaid → SVG (Kroki), or data: URI image
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf2map::{generate, output, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::builder()
//!         .server_url("http://localhost:5000")
//!         .diagram_theme("forest")
//!         .build()?;
//!     let area = generate("lecture.pdf", &config).await?;
//!     println!("{}", output::to_html(&area));
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf2map` binary (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod controller;
pub mod error;
pub mod generate;
pub mod observer;
pub mod output;
pub mod render;
pub mod response;
pub mod selection;
pub mod submit;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ClientConfig, ClientConfigBuilder, ResponseMode};
pub use controller::{Controller, UiEvent};
pub use error::{DiagramError, Pdf2MapError};
pub use generate::{generate, generate_from_bytes, generate_sync, generate_to_file};
pub use observer::{ControllerObserver, NoopObserver, ObserverHandle};
pub use render::{DiagramRenderer, ImageRef, KrokiRenderer, ResultArea, ResultRenderer};
pub use response::{classify, ServerResponse};
pub use selection::{FileSelector, SelectedFile, PDF_MEDIA_TYPE};
pub use submit::{HttpTransport, RawResponse, Transport, Upload};
