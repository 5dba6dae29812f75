//! Image results: bytes from the server plus a locally-addressable reference.
//!
//! A browser would mint an object URL for the response blob. Here the
//! reference is a `data:` URI, which any HTML consumer can point an `<img>`
//! at without the bytes ever touching disk.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::fmt;
use std::io::Cursor;
use tracing::debug;

/// An image received from the server.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageRef {
    bytes: Vec<u8>,
    media_type: String,
    dimensions: Option<(u32, u32)>,
}

impl ImageRef {
    /// Wrap `bytes`, reading pixel dimensions when the format is decodable.
    pub fn new(bytes: Vec<u8>, media_type: impl Into<String>) -> Self {
        let dimensions = probe_dimensions(&bytes);
        Self {
            bytes,
            media_type: media_type.into(),
            dimensions,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// `(width, height)` in pixels, when known.
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.dimensions
    }

    /// `data:<media type>;base64,<payload>` reference to the bytes.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.media_type, STANDARD.encode(&self.bytes))
    }

    /// File extension for the image format, falling back to `bin`.
    pub fn extension(&self) -> &'static str {
        // Vector images are not an `ImageFormat`.
        if self.media_type.eq_ignore_ascii_case("image/svg+xml") {
            return "svg";
        }
        image::ImageFormat::from_mime_type(&self.media_type)
            .and_then(|f| f.extensions_str().first().copied())
            .unwrap_or("bin")
    }
}

impl fmt::Debug for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageRef")
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .field("dimensions", &self.dimensions)
            .finish()
    }
}

fn probe_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    match reader.into_dimensions() {
        Ok(dims) => Some(dims),
        Err(e) => {
            debug!("Could not read image dimensions: {e}");
            None
        }
    }
}
