//! CLI binary for edgequake-pdf2map.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ClientConfig`, runs one upload cycle through the `Controller` and
//! writes or prints the result.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2map::{
    output, ClientConfig, Controller, ControllerObserver, ResponseMode, ResultArea, SelectedFile,
    UiEvent,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── Terminal observer using indicatif ────────────────────────────────────────

/// Mirrors controller events on stderr: notices in red, the filename label,
/// and a spinner for as long as the result area is loading.
struct CliObserver {
    quiet: bool,
    show_spinner: bool,
    spinner: Mutex<Option<(ProgressBar, Instant)>>,
}

impl CliObserver {
    fn new(quiet: bool, show_spinner: bool) -> Arc<Self> {
        Arc::new(Self {
            quiet,
            show_spinner,
            spinner: Mutex::new(None),
        })
    }

    fn start_spinner(&self) {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.set_prefix("Generating");
        bar.set_message("waiting for the server…");
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut slot) = self.spinner.lock() {
            *slot = Some((bar, Instant::now()));
        }
    }

    fn stop_spinner(&self) -> Option<Duration> {
        let (bar, started) = self.spinner.lock().ok()?.take()?;
        bar.finish_and_clear();
        Some(started.elapsed())
    }
}

impl ControllerObserver for CliObserver {
    fn on_notice(&self, message: &str) {
        eprintln!("{} {}", red("✘"), red(message));
    }

    fn on_selection_changed(&self, label: &str) {
        if !self.quiet {
            eprintln!("{} {}", cyan("◆"), bold(label));
        }
    }

    fn on_result(&self, area: &ResultArea) {
        if matches!(area, ResultArea::Loading) {
            if self.show_spinner {
                self.start_spinner();
            }
            return;
        }

        let elapsed = self
            .stop_spinner()
            .map(|d| dim(&format!("{:.1}s", d.as_secs_f64())))
            .unwrap_or_default();
        if let Some(line) = self.status_line(area, &elapsed) {
            eprintln!("{line}");
        }
    }
}

impl CliObserver {
    /// Line reported for a terminal state. Errors are shown even in quiet
    /// mode; they are the only place the message reaches the terminal.
    fn status_line(&self, area: &ResultArea, elapsed: &str) -> Option<String> {
        match area {
            ResultArea::Error { message } => {
                Some(format!("{} {}  {}", red("✘"), red(message), elapsed))
            }
            _ if self.quiet => None,
            ResultArea::Diagram { svg } => Some(format!(
                "{} Diagram rendered  {}  {}",
                green("✔"),
                dim(&format!("{} bytes SVG", svg.len())),
                elapsed
            )),
            ResultArea::Image(img) => {
                let dims = img
                    .dimensions()
                    .map(|(w, h)| format!("{w}×{h} "))
                    .unwrap_or_default();
                Some(format!(
                    "{} Image received  {}  {}",
                    green("✔"),
                    dim(&format!("{dims}{} {} bytes", img.media_type(), img.len())),
                    elapsed
                ))
            }
            ResultArea::Empty | ResultArea::Loading => None,
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Upload to a local server, print the SVG to stdout
  pdf2map lecture.pdf

  # Write the result next to the input (map.svg or map.png)
  pdf2map lecture.pdf -o map

  # Use a remote server that answers with a PNG
  pdf2map --server https://maps.example.com --mode image lecture.pdf -o map.png

  # Self-hosted Kroki with the forest theme
  pdf2map --renderer-url http://localhost:8000 --theme forest lecture.pdf -o map.svg

  # HTML fragment (error block, <svg>, or <img src="data:…">)
  pdf2map --html lecture.pdf > result.html

ENVIRONMENT VARIABLES:
  PDF2MAP_SERVER          Generation server base URL
  PDF2MAP_ENDPOINT        Endpoint path (default /api/generate)
  PDF2MAP_FIELD           Multipart field name (default file)
  PDF2MAP_MODE            auto, diagram, image
  PDF2MAP_RENDERER_URL    Kroki-compatible renderer base URL
  PDF2MAP_THEME           Mermaid theme passed to the renderer
  RUST_LOG                Overrides the log filter (e.g. edgequake_pdf2map=debug)
"#;

/// Upload a PDF to a concept-map server and render the returned diagram.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2map",
    version,
    about = "Upload a PDF to a concept-map server and render the returned diagram",
    long_about = "Upload a PDF document to a concept-map generation server and render its answer: \
Mermaid source is turned into SVG through a Kroki-compatible renderer, images are saved as-is.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Write the SVG or image to this file instead of stdout.
    ///
    /// Without an extension, `.svg` or the image format's extension is added.
    #[arg(short, long, env = "PDF2MAP_OUTPUT")]
    output: Option<PathBuf>,

    /// Generation server base URL.
    #[arg(long, env = "PDF2MAP_SERVER", default_value = "http://localhost:3000")]
    server: String,

    /// Endpoint path on the server.
    #[arg(long, env = "PDF2MAP_ENDPOINT", default_value = "/api/generate")]
    endpoint: String,

    /// Multipart field name carrying the PDF.
    #[arg(long, env = "PDF2MAP_FIELD", default_value = "file")]
    field: String,

    /// How to interpret a success response: auto, diagram, image.
    #[arg(long, env = "PDF2MAP_MODE", value_enum, default_value = "auto")]
    mode: ModeArg,

    /// Kroki-compatible renderer base URL.
    #[arg(long, env = "PDF2MAP_RENDERER_URL", default_value = "https://kroki.io")]
    renderer_url: String,

    /// Mermaid theme passed to the renderer (default, forest, dark, neutral).
    #[arg(long, env = "PDF2MAP_THEME")]
    theme: Option<String>,

    /// Renderer call timeout in seconds.
    #[arg(long, env = "PDF2MAP_RENDERER_TIMEOUT", default_value_t = 30)]
    renderer_timeout: u64,

    /// Emit the result area as an HTML fragment instead of raw content.
    #[arg(long, env = "PDF2MAP_HTML")]
    html: bool,

    /// Disable the spinner.
    #[arg(long, env = "PDF2MAP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2MAP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2MAP_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ModeArg {
    Auto,
    Diagram,
    Image,
}

impl From<ModeArg> for ResponseMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Auto => ResponseMode::Auto,
            ModeArg::Diagram => ResponseMode::Diagram,
            ModeArg::Image => ResponseMode::Image,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the spinner is active; the
    // observer provides all the feedback that matters to the user.
    let show_spinner = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_spinner {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let observer = CliObserver::new(cli.quiet, show_spinner && !cli.verbose);
    let config = build_config(&cli, observer)?;

    // ── Run one cycle ────────────────────────────────────────────────────
    let file = SelectedFile::from_path(&cli.input)
        .await
        .with_context(|| format!("Failed to read {}", cli.input.display()))?;

    let mut controller = Controller::new(config).context("Failed to initialise client")?;
    // Notices were already printed by the observer.
    controller
        .dispatch(UiEvent::FileChosen(vec![file]))
        .await
        .context("File rejected")?;
    controller
        .dispatch(UiEvent::GenerateClicked)
        .await
        .context("Generation not started")?;

    let area = controller.result();

    // ── Emit result ──────────────────────────────────────────────────────
    if cli.html {
        match cli.output {
            Some(ref path) => {
                output::write_html(area, path)
                    .await
                    .context("Failed to write HTML")?;
            }
            None => println!("{}", output::to_html(area)),
        }
    } else if area.error_message().is_some() {
        // Reported by the observer; only the exit status is left.
    } else if let Some(ref path) = cli.output {
        let path = with_default_extension(path, area);
        let written = output::write_result(area, &path)
            .await
            .context("Failed to write result")?;
        if !cli.quiet {
            eprintln!("   {}  →  {}", dim("saved"), bold(&written.display().to_string()));
        }
    } else {
        write_stdout(area)?;
    }

    if area.error_message().is_some() {
        std::process::exit(1);
    }
    Ok(())
}

/// Map CLI args to `ClientConfig`.
fn build_config(cli: &Cli, observer: Arc<CliObserver>) -> Result<ClientConfig> {
    let mut builder = ClientConfig::builder()
        .server_url(&cli.server)
        .endpoint(&cli.endpoint)
        .field_name(&cli.field)
        .response_mode(cli.mode.clone().into())
        .renderer_url(&cli.renderer_url)
        .renderer_timeout_secs(cli.renderer_timeout)
        .observer(observer);

    if let Some(ref theme) = cli.theme {
        builder = builder.diagram_theme(theme);
    }

    builder.build().context("Invalid configuration")
}

/// Append `.svg` / `.png` / … when `path` has no extension.
fn with_default_extension(path: &std::path::Path, area: &ResultArea) -> PathBuf {
    match (path.extension(), output::suggested_extension(area)) {
        (None, Some(ext)) => path.with_extension(ext),
        _ => path.to_path_buf(),
    }
}

fn write_stdout(area: &ResultArea) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    match area {
        ResultArea::Diagram { svg } => {
            handle
                .write_all(svg.as_bytes())
                .context("Failed to write to stdout")?;
            if !svg.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
        ResultArea::Image(img) => handle
            .write_all(img.bytes())
            .context("Failed to write to stdout")?,
        _ => {}
    }
    Ok(())
}
