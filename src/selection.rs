//! File selection: the "current selection" slot and its two input channels.
//!
//! A file arrives either through an explicit dialog choice or through a
//! drag-and-drop gesture over the upload region. Both channels end in
//! [`FileSelector::select`], which accepts only files declaring the PDF
//! media type. A rejected file leaves the previous selection untouched.
//!
//! Files read from disk get their media type declared the way a browser
//! would: sniff the leading bytes first (`%PDF`, known image signatures),
//! then fall back to the extension.

use crate::error::Pdf2MapError;
use std::fmt;
use std::path::Path;
use tracing::{debug, warn};

/// Media type a file must declare to be accepted.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A user-chosen file, held by the selector for one upload cycle.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    name: String,
    media_type: String,
    bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Load a local file, declaring its media type from content and extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, Pdf2MapError> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Pdf2MapError::FileNotFound {
                path: path.to_path_buf(),
            },
            std::io::ErrorKind::PermissionDenied => Pdf2MapError::PermissionDenied {
                path: path.to_path_buf(),
            },
            _ => Pdf2MapError::Internal(format!("Failed to read '{}': {e}", path.display())),
        })?;

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let media_type = declared_media_type(&name, &bytes);

        debug!("Loaded {} ({} bytes, {})", path.display(), bytes.len(), media_type);
        Ok(Self::new(name, media_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether the declared media type is `application/pdf`.
    pub fn is_pdf(&self) -> bool {
        self.media_type.eq_ignore_ascii_case(PDF_MEDIA_TYPE)
    }
}

impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Declare a media type for a file the way a browser would.
pub fn declared_media_type(name: &str, bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"%PDF") {
        return PDF_MEDIA_TYPE;
    }
    if let Ok(format) = image::guess_format(bytes) {
        return format.to_mime_type();
    }

    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => PDF_MEDIA_TYPE,
        "txt" | "md" => "text/plain",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        _ => "application/octet-stream",
    }
}

/// Holds the current selection and the drop-target affordance.
#[derive(Debug, Default)]
pub struct FileSelector {
    current: Option<SelectedFile>,
    drop_target_active: bool,
}

impl FileSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store `file`.
    ///
    /// Non-PDF files return [`Pdf2MapError::InvalidFileType`] and leave the
    /// prior selection as it was.
    pub fn select(&mut self, file: SelectedFile) -> Result<&SelectedFile, Pdf2MapError> {
        if !file.is_pdf() {
            warn!(
                "Rejected '{}': declared type {} is not {}",
                file.name, file.media_type, PDF_MEDIA_TYPE
            );
            return Err(Pdf2MapError::InvalidFileType {
                name: file.name,
                media_type: file.media_type,
            });
        }

        debug!("Selected '{}' ({} bytes)", file.name, file.len());
        Ok(self.current.insert(file))
    }

    /// Dialog channel. An empty choice (dialog cancelled) is a no-op.
    pub fn choose(
        &mut self,
        files: Vec<SelectedFile>,
    ) -> Option<Result<&SelectedFile, Pdf2MapError>> {
        let first = files.into_iter().next()?;
        Some(self.select(first))
    }

    /// A drag gesture entered (or moved over) the upload region.
    pub fn drag_enter(&mut self) {
        self.drop_target_active = true;
    }

    /// The drag gesture left the upload region.
    pub fn drag_leave(&mut self) {
        self.drop_target_active = false;
    }

    /// Files were dropped on the upload region; only the first one is used.
    pub fn drop_files(
        &mut self,
        files: Vec<SelectedFile>,
    ) -> Option<Result<&SelectedFile, Pdf2MapError>> {
        self.drop_target_active = false;
        self.choose(files)
    }

    pub fn current(&self) -> Option<&SelectedFile> {
        self.current.as_ref()
    }

    /// Text of the filename label, if a file is selected.
    pub fn label(&self) -> Option<String> {
        self.current
            .as_ref()
            .map(|f| format!("Selected file: {}", f.name))
    }

    /// The generate action is enabled exactly when a valid PDF is held.
    pub fn can_generate(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_drop_target_active(&self) -> bool {
        self.drop_target_active
    }
}
