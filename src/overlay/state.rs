//! Commands sent to the UI execution context
//!
//! Every command that expects an answer carries a oneshot sender; the UI
//! thread replies once the work has been fully applied.

use std::thread::JoinHandle;

use tokio::sync::{mpsc::Sender, oneshot};

use crate::rect::Rect;
use crate::window::{WindowId, WindowRef};

use super::controller::{ContentTarget, MigrationReport};
use super::error::OverlayError;
use super::types::{OverlayKey, OverlaySnapshot};

pub type Reply<T> = oneshot::Sender<T>;

/// Commands processed, in order, by the UI thread
pub enum OverlayCommand {
    /// Create (or replace) the element for a key
    Register {
        key: OverlayKey,
        rect: Rect,
        reply: Reply<Result<OverlaySnapshot, OverlayError>>,
    },
    /// Remove the element for a key; `Ok(false)` when none existed
    Unregister {
        key: OverlayKey,
        reply: Reply<Result<bool, OverlayError>>,
    },
    /// Move an existing element
    Reposition {
        key: OverlayKey,
        rect: Rect,
        reply: Reply<Result<OverlaySnapshot, OverlayError>>,
    },
    /// Host foreground changed (None: no foreground context)
    SetForeground {
        window: Option<WindowRef>,
        reply: Reply<MigrationReport>,
    },
    /// Host tore a window down
    WindowDestroyed {
        window_id: WindowId,
        reply: Reply<usize>,
    },
    /// Remove every overlay
    Clear { reply: Reply<usize> },
    /// Route HTML content to a placeholder or tooltip target
    DispatchContent {
        identifier: String,
        html: String,
        reply: Reply<Result<ContentTarget, OverlayError>>,
    },
    /// Look up a tooltip target's rectangle
    TooltipTarget {
        identifier: String,
        reply: Reply<Option<Rect>>,
    },
    /// Copy of every registry entry
    Snapshot { reply: Reply<Vec<OverlaySnapshot>> },
    /// Currently bound foreground window
    Foreground { reply: Reply<Option<WindowId>> },
    /// Remove every overlay and stop the UI thread
    Shutdown,
}

impl std::fmt::Debug for OverlayCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverlayCommand::Register { key, rect, .. } => write!(f, "Register({key}, {rect})"),
            OverlayCommand::Unregister { key, .. } => write!(f, "Unregister({key})"),
            OverlayCommand::Reposition { key, rect, .. } => write!(f, "Reposition({key}, {rect})"),
            OverlayCommand::SetForeground { window, .. } => {
                write!(f, "SetForeground({:?})", window.as_ref().map(|w| w.id()))
            }
            OverlayCommand::WindowDestroyed { window_id, .. } => {
                write!(f, "WindowDestroyed({window_id})")
            }
            OverlayCommand::Clear { .. } => f.write_str("Clear"),
            OverlayCommand::DispatchContent { identifier, .. } => {
                write!(f, "DispatchContent({identifier})")
            }
            OverlayCommand::TooltipTarget { identifier, .. } => {
                write!(f, "TooltipTarget({identifier})")
            }
            OverlayCommand::Snapshot { .. } => f.write_str("Snapshot"),
            OverlayCommand::Foreground { .. } => f.write_str("Foreground"),
            OverlayCommand::Shutdown => f.write_str("Shutdown"),
        }
    }
}

/// Handle to the running UI thread
pub struct OverlayHandle {
    pub tx: Sender<OverlayCommand>,
    pub handle: JoinHandle<()>,
}
