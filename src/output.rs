//! Getting a result out of the result area: HTML fragments and files.

use crate::error::Pdf2MapError;
use crate::render::ResultArea;
use std::path::{Path, PathBuf};
use tracing::info;

/// Markup shown while a submission is in flight.
pub const LOADER_HTML: &str = r#"<div class="loader"></div>"#;

/// The result area as an HTML fragment, ready to replace a container's
/// contents. Error messages are escaped; SVG is inserted as-is.
pub fn to_html(area: &ResultArea) -> String {
    match area {
        ResultArea::Empty => String::new(),
        ResultArea::Loading => LOADER_HTML.to_string(),
        ResultArea::Diagram { svg } => svg.clone(),
        ResultArea::Image(img) => format!(
            r#"<img src="{}" alt="Generated concept map">"#,
            htmlize::escape_attribute(img.data_uri())
        ),
        ResultArea::Error { message } => format!(
            r#"<div class="error-message">{}</div>"#,
            htmlize::escape_text(message.as_str())
        ),
    }
}

/// File extension matching the result content, if there is any content.
pub fn suggested_extension(area: &ResultArea) -> Option<&'static str> {
    match area {
        ResultArea::Diagram { .. } => Some("svg"),
        ResultArea::Image(img) => Some(img.extension()),
        _ => None,
    }
}

/// Write the SVG or image bytes held by `area` to `path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files. States
/// without content return [`Pdf2MapError::NothingToWrite`].
pub async fn write_result(
    area: &ResultArea,
    path: impl AsRef<Path>,
) -> Result<PathBuf, Pdf2MapError> {
    let bytes: &[u8] = match area {
        ResultArea::Diagram { svg } => svg.as_bytes(),
        ResultArea::Image(img) => img.bytes(),
        other => {
            return Err(Pdf2MapError::NothingToWrite {
                state: other.state_name(),
            })
        }
    };
    write_atomic(path.as_ref(), bytes).await
}

/// Write the result area's HTML fragment to `path`.
pub async fn write_html(area: &ResultArea, path: impl AsRef<Path>) -> Result<PathBuf, Pdf2MapError> {
    let html = to_html(area);
    write_atomic(path.as_ref(), html.as_bytes()).await
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<PathBuf, Pdf2MapError> {
    let write_failed = |source: std::io::Error| Pdf2MapError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_failed)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    tokio::fs::write(&tmp_path, bytes).await.map_err(write_failed)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_failed)?;

    info!("Wrote {} bytes to {}", bytes.len(), path.display());
    Ok(path.to_path_buf())
}
