//! Error types for the edgequake-pdf2map library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Pdf2MapError`]: the upload cycle cannot proceed (no file selected,
//!   wrong file type, server unreachable, local I/O failure). The first two
//!   variants are *notices*: user-correctable conditions that block the
//!   next state transition without touching the result area.
//!
//! * [`DiagramError`]: the server answered, but the diagram text it sent
//!   could not be turned into SVG. It never propagates out of the renderer;
//!   it is logged and the result area switches to the "invalid generated
//!   diagram" message instead.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the edgequake-pdf2map library.
#[derive(Debug, Error)]
pub enum Pdf2MapError {
    // ── Notices ───────────────────────────────────────────────────────────
    /// The chosen file does not declare the PDF media type.
    #[error("Please select a file in PDF format.")]
    InvalidFileType { name: String, media_type: String },

    /// Generate was triggered while no file was selected.
    #[error("No PDF file selected.")]
    NoFileSelected,

    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    // ── Network errors ────────────────────────────────────────────────────
    /// The request never completed (connect error, aborted body, …).
    #[error("Request to '{url}' failed: {reason}")]
    ConnectionFailed { url: String, reason: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// The result area holds no diagram or image to write.
    #[error("Nothing to write: the result area is in the '{state}' state")]
    NothingToWrite { state: &'static str },

    /// Could not create or write the output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Pdf2MapError {
    /// True for the user-correctable conditions surfaced as blocking notices.
    pub fn is_notice(&self) -> bool {
        matches!(
            self,
            Pdf2MapError::InvalidFileType { .. } | Pdf2MapError::NoFileSelected
        )
    }
}

/// Failure of the external diagram renderer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiagramError {
    /// The server sent no diagram text (or only whitespace / fences).
    #[error("Diagram source is empty")]
    Empty,

    /// The renderer rejected the diagram source.
    #[error("Diagram syntax error: {detail}")]
    Syntax { detail: String },

    /// The renderer could not be reached.
    #[error("Diagram renderer unavailable: {reason}")]
    Unavailable { reason: String },

    /// The renderer answered, but not with SVG markup.
    #[error("Diagram renderer returned no SVG markup")]
    InvalidOutput,
}
