//! One-shot entry points: select a file, run one cycle, return the result.
//!
//! These wrap a fresh [`Controller`] for callers that have a file in hand
//! and no event loop of their own (scripts, the CLI, batch jobs). Hosts
//! with a real UI should drive [`Controller`] directly.
//!
//! Every function returns `Ok(ResultArea)` once a request was issued, even
//! when the area ends in an error state: a server-side failure is a result
//! to show, not an error to propagate. `Err` is reserved for notices and
//! local I/O problems.

use crate::config::ClientConfig;
use crate::controller::Controller;
use crate::error::Pdf2MapError;
use crate::output;
use crate::render::ResultArea;
use crate::selection::SelectedFile;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Upload the PDF at `input` and return the terminal result area.
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdf2map::{generate, ClientConfig, ResultArea};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ClientConfig::builder()
///     .server_url("http://localhost:5000")
///     .build()?;
/// match generate("lecture.pdf", &config).await? {
///     ResultArea::Diagram { svg } => println!("{svg}"),
///     other => eprintln!("{other:?}"),
/// }
/// # Ok(())
/// # }
/// ```
pub async fn generate(
    input: impl AsRef<Path>,
    config: &ClientConfig,
) -> Result<ResultArea, Pdf2MapError> {
    let file = SelectedFile::from_path(input).await?;
    run_cycle(file, config).await
}

/// Upload in-memory PDF bytes under `name`.
pub async fn generate_from_bytes(
    name: impl Into<String>,
    bytes: Vec<u8>,
    config: &ClientConfig,
) -> Result<ResultArea, Pdf2MapError> {
    let name = name.into();
    let media_type = crate::selection::declared_media_type(&name, &bytes);
    run_cycle(SelectedFile::new(name, media_type, bytes), config).await
}

/// Upload the PDF at `input` and write the diagram or image to `output_path`.
///
/// Returns [`Pdf2MapError::NothingToWrite`] when the cycle ends in an error
/// state; the message shown in the area is logged by the renderer.
pub async fn generate_to_file(
    input: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ClientConfig,
) -> Result<PathBuf, Pdf2MapError> {
    let area = generate(input, config).await?;
    output::write_result(&area, output_path).await
}

/// Synchronous wrapper around [`generate`].
///
/// Creates a temporary tokio runtime internally.
pub fn generate_sync(
    input: impl AsRef<Path>,
    config: &ClientConfig,
) -> Result<ResultArea, Pdf2MapError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Pdf2MapError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(generate(input, config))
}

async fn run_cycle(file: SelectedFile, config: &ClientConfig) -> Result<ResultArea, Pdf2MapError> {
    let start = Instant::now();
    let mut controller = Controller::new(config.clone())?;
    controller.choose_files(vec![file])?;
    let area = controller.generate().await?.clone();
    info!(
        "Cycle finished in {}ms: {}",
        start.elapsed().as_millis(),
        area.state_name()
    );
    Ok(area)
}
