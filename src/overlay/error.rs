//! Error types for overlay operations

use thiserror::Error;

use crate::window::HostError;

#[derive(Debug, Error)]
pub enum OverlayError {
    /// Missing or malformed input; nothing was touched
    #[error("{0}")]
    Validation(String),

    #[error("no foreground window is available")]
    NoForegroundWindow,

    /// The host rejected a view-tree mutation
    #[error(transparent)]
    View(#[from] HostError),

    #[error("no overlay registered for '{identifier}'")]
    UnknownTarget { identifier: String },

    #[error("overlay UI context is not running")]
    ContextClosed,

    #[error("failed to start overlay UI thread")]
    Spawn(#[source] std::io::Error),
}
