//! Observer trait for controller events.
//!
//! Inject an [`ObserverHandle`] via
//! [`crate::config::ClientConfigBuilder::observer`] to mirror controller state
//! into whatever surface the host application has: a terminal spinner, a GUI
//! widget tree, a WebSocket pushing HTML fragments to a browser.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf2map::{ClientConfig, ControllerObserver, ResultArea};
//! use std::sync::{Arc, Mutex};
//!
//! #[derive(Default)]
//! struct StateLog {
//!     states: Mutex<Vec<&'static str>>,
//! }
//!
//! impl ControllerObserver for StateLog {
//!     fn on_result(&self, area: &ResultArea) {
//!         self.states.lock().unwrap().push(area.state_name());
//!     }
//! }
//!
//! let config = ClientConfig::builder()
//!     .observer(Arc::new(StateLog::default()))
//!     .build()
//!     .unwrap();
//! ```

use crate::render::ResultArea;
use std::sync::Arc;

/// Receives the controller's visible side effects.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. Implementations must be `Send + Sync`.
pub trait ControllerObserver: Send + Sync {
    /// A blocking, user-facing notice (wrong file type, nothing selected).
    fn on_notice(&self, message: &str) {
        let _ = message;
    }

    /// A file was accepted; `label` is the new filename label text.
    /// The generate action is enabled from here on.
    fn on_selection_changed(&self, label: &str) {
        let _ = label;
    }

    /// The drop-target affordance was switched on or off.
    fn on_drop_target(&self, active: bool) {
        let _ = active;
    }

    /// The result area changed state.
    fn on_result(&self, area: &ResultArea) {
        let _ = area;
    }
}

/// A no-op implementation for callers that don't need events.
///
/// This is the default when no observer is configured.
pub struct NoopObserver;

impl ControllerObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::ClientConfig`].
pub type ObserverHandle = Arc<dyn ControllerObserver>;
