//! The upload-and-render controller.
//!
//! Owns the [`FileSelector`], the [`ResultRenderer`] and the [`Transport`],
//! and moves between them in response to [`UiEvent`]s. All state sits behind
//! `&mut self`; the only suspension points are the upload exchange and the
//! diagram render that may follow it.
//!
//! Hosts that run their own event loop can split a submission in two:
//! [`Controller::begin_generate`] hands back the [`Upload`] to send, and the
//! outcome comes back later as [`UiEvent::ResponseReceived`] or
//! [`UiEvent::ResponseFailed`]. Everyone else calls [`Controller::generate`].

use crate::config::ClientConfig;
use crate::error::Pdf2MapError;
use crate::observer::{NoopObserver, ObserverHandle};
use crate::render::{DiagramRenderer, KrokiRenderer, ResultArea, ResultRenderer};
use crate::response::classify;
use crate::selection::{FileSelector, SelectedFile};
use crate::submit::{HttpTransport, RawResponse, Transport, Upload};
use std::sync::Arc;
use tracing::{debug, info};

/// Inbound events.
#[derive(Debug)]
pub enum UiEvent {
    /// The file dialog closed; empty when it was cancelled.
    FileChosen(Vec<SelectedFile>),
    /// A drag gesture entered or moved over the upload region.
    DragEnter,
    /// The drag gesture left the upload region.
    DragLeave,
    /// Files were dropped on the upload region.
    Drop(Vec<SelectedFile>),
    /// The user pressed "generate".
    GenerateClicked,
    /// The server answered a previously begun submission.
    ResponseReceived(RawResponse),
    /// A previously begun submission never completed.
    ResponseFailed(Pdf2MapError),
}

/// Drives one upload cycle at a time.
pub struct Controller {
    config: ClientConfig,
    selector: FileSelector,
    renderer: ResultRenderer,
    transport: Arc<dyn Transport>,
    observer: ObserverHandle,
}

impl Controller {
    /// Build a controller, creating the default transport and renderer when
    /// the config does not supply them.
    pub fn new(config: ClientConfig) -> Result<Self, Pdf2MapError> {
        let transport: Arc<dyn Transport> = match config.transport {
            Some(ref t) => Arc::clone(t),
            None => Arc::new(HttpTransport::new()?),
        };
        let diagram: Arc<dyn DiagramRenderer> = match config.renderer {
            Some(ref r) => Arc::clone(r),
            None => {
                let mut kroki =
                    KrokiRenderer::new(&config.renderer_url, config.renderer_timeout_secs)
                        .map_err(|e| Pdf2MapError::Internal(e.to_string()))?;
                if let Some(ref theme) = config.diagram_theme {
                    kroki = kroki.with_theme(theme);
                }
                Arc::new(kroki)
            }
        };
        let observer = config
            .observer
            .clone()
            .unwrap_or_else(|| Arc::new(NoopObserver));

        Ok(Self {
            renderer: ResultRenderer::new(diagram, config.render_target.clone()),
            selector: FileSelector::new(),
            transport,
            observer,
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn selection(&self) -> Option<&SelectedFile> {
        self.selector.current()
    }

    pub fn selection_label(&self) -> Option<String> {
        self.selector.label()
    }

    pub fn can_generate(&self) -> bool {
        self.selector.can_generate()
    }

    pub fn is_drop_target_active(&self) -> bool {
        self.selector.is_drop_target_active()
    }

    pub fn result(&self) -> &ResultArea {
        self.renderer.area()
    }

    /// Route one event. Blocking notices come back as `Err` after being
    /// reported to the observer.
    pub async fn dispatch(&mut self, event: UiEvent) -> Result<(), Pdf2MapError> {
        debug!("Dispatching {}", event_name(&event));
        match event {
            UiEvent::FileChosen(files) => self.choose_files(files),
            UiEvent::DragEnter => {
                self.drag_enter();
                Ok(())
            }
            UiEvent::DragLeave => {
                self.drag_leave();
                Ok(())
            }
            UiEvent::Drop(files) => self.drop_files(files),
            UiEvent::GenerateClicked => self.generate().await.map(|_| ()),
            UiEvent::ResponseReceived(raw) => {
                self.finish(Ok(raw)).await;
                Ok(())
            }
            UiEvent::ResponseFailed(e) => {
                self.finish(Err(e)).await;
                Ok(())
            }
        }
    }

    // ── File selection ───────────────────────────────────────────────────

    /// Dialog channel.
    pub fn choose_files(&mut self, files: Vec<SelectedFile>) -> Result<(), Pdf2MapError> {
        let outcome = self
            .selector
            .choose(files)
            .map(|r| r.map(|f| f.name().to_string()));
        self.after_selection(outcome)
    }

    pub fn drag_enter(&mut self) {
        if !self.selector.is_drop_target_active() {
            self.selector.drag_enter();
            self.observer.on_drop_target(true);
        }
    }

    pub fn drag_leave(&mut self) {
        if self.selector.is_drop_target_active() {
            self.selector.drag_leave();
            self.observer.on_drop_target(false);
        }
    }

    /// Drag-and-drop channel.
    pub fn drop_files(&mut self, files: Vec<SelectedFile>) -> Result<(), Pdf2MapError> {
        let was_active = self.selector.is_drop_target_active();
        let outcome = self
            .selector
            .drop_files(files)
            .map(|r| r.map(|f| f.name().to_string()));
        if was_active {
            self.observer.on_drop_target(false);
        }
        self.after_selection(outcome)
    }

    fn after_selection(
        &mut self,
        outcome: Option<Result<String, Pdf2MapError>>,
    ) -> Result<(), Pdf2MapError> {
        match outcome {
            None => Ok(()),
            Some(Ok(name)) => {
                info!("Selected '{}'", name);
                if let Some(label) = self.selector.label() {
                    self.observer.on_selection_changed(&label);
                }
                Ok(())
            }
            Some(Err(e)) => Err(self.notice(e)),
        }
    }

    // ── Submission ───────────────────────────────────────────────────────

    /// Validate the trigger, show the loading state and return the upload
    /// to send. Fails with [`Pdf2MapError::NoFileSelected`] before touching
    /// the result area when nothing is selected.
    pub fn begin_generate(&mut self) -> Result<Upload, Pdf2MapError> {
        let file = match self.selector.current() {
            Some(f) => f.clone(),
            None => return Err(self.notice(Pdf2MapError::NoFileSelected)),
        };

        self.renderer.show_loading();
        self.observer.on_result(self.renderer.area());

        Ok(Upload {
            url: self.config.endpoint_url(),
            field_name: self.config.field_name.clone(),
            file,
        })
    }

    /// Render the terminal state for a finished exchange.
    pub async fn finish(&mut self, outcome: Result<RawResponse, Pdf2MapError>) -> &ResultArea {
        match outcome {
            Ok(raw) => {
                let response = classify(&raw, self.config.response_mode);
                self.renderer.render(response).await;
            }
            Err(e) => self.renderer.show_connection_error(&e),
        }
        self.observer.on_result(self.renderer.area());
        self.renderer.area()
    }

    /// One full cycle: loading state, a single request, terminal state.
    pub async fn generate(&mut self) -> Result<&ResultArea, Pdf2MapError> {
        let upload = self.begin_generate()?;
        let outcome = self.transport.send(&upload).await;
        Ok(self.finish(outcome).await)
    }

    fn notice(&self, e: Pdf2MapError) -> Pdf2MapError {
        self.observer.on_notice(&e.to_string());
        e
    }
}

fn event_name(event: &UiEvent) -> &'static str {
    match event {
        UiEvent::FileChosen(_) => "file-chosen",
        UiEvent::DragEnter => "drag-enter",
        UiEvent::DragLeave => "drag-leave",
        UiEvent::Drop(_) => "drop",
        UiEvent::GenerateClicked => "generate-clicked",
        UiEvent::ResponseReceived(_) => "response-received",
        UiEvent::ResponseFailed(_) => "response-failed",
    }
}
