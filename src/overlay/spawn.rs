//! UI execution context
//!
//! # Threading Model
//!
//! All view-tree mutations happen on one dedicated thread. Callers never touch
//! the registry or a window directly: they enqueue an [`OverlayCommand`] and
//! wait for its reply. Commands run strictly one at a time, in the order they
//! were enqueued, and each runs to completion before the next is dequeued.
//!
//! The controller is created INSIDE the spawned thread, so nothing it owns is
//! ever touched from another thread.

use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::OverlaySettings;

use super::controller::LifecycleController;
use super::error::OverlayError;
use super::state::{OverlayCommand, OverlayHandle};

const THREAD_NAME: &str = "overlay-ui";

/// Start the UI thread. Returns once the thread is running and ready to
/// accept commands.
pub fn spawn_ui_context(settings: OverlaySettings) -> Result<OverlayHandle, OverlayError> {
    let (tx, mut rx) = mpsc::channel::<OverlayCommand>(settings.queue_capacity.max(1));

    // Confirms the controller exists before any caller can enqueue
    let (confirm_tx, confirm_rx) = std::sync::mpsc::channel::<()>();

    let handle = thread::Builder::new()
        .name(THREAD_NAME.to_string())
        .spawn(move || {
            let mut controller = LifecycleController::new(settings);
            let _ = confirm_tx.send(());
            info!("overlay UI context started");

            while let Some(cmd) = rx.blocking_recv() {
                debug!(?cmd, "ui command");
                if !process_command(&mut controller, cmd) {
                    break;
                }
            }

            // Nothing may outlive the context on screen
            controller.clear();
            info!("overlay UI context stopped");
        })
        .map_err(OverlayError::Spawn)?;

    match confirm_rx.recv() {
        Ok(()) => Ok(OverlayHandle { tx, handle }),
        Err(_) => Err(OverlayError::ContextClosed),
    }
}

/// Apply one command. Returns false when the loop should stop.
fn process_command(controller: &mut LifecycleController, cmd: OverlayCommand) -> bool {
    match cmd {
        OverlayCommand::Register { key, rect, reply } => {
            let _ = reply.send(controller.register(key, rect));
        }
        OverlayCommand::Unregister { key, reply } => {
            let _ = reply.send(controller.unregister(&key));
        }
        OverlayCommand::Reposition { key, rect, reply } => {
            let _ = reply.send(controller.reposition(&key, rect));
        }
        OverlayCommand::SetForeground { window, reply } => {
            let _ = reply.send(controller.set_foreground(window));
        }
        OverlayCommand::WindowDestroyed { window_id, reply } => {
            let _ = reply.send(controller.window_destroyed(window_id));
        }
        OverlayCommand::Clear { reply } => {
            let _ = reply.send(controller.clear());
        }
        OverlayCommand::DispatchContent {
            identifier,
            html,
            reply,
        } => {
            let _ = reply.send(controller.dispatch_content(&identifier, &html));
        }
        OverlayCommand::TooltipTarget { identifier, reply } => {
            let _ = reply.send(controller.tooltip_target(&identifier));
        }
        OverlayCommand::Snapshot { reply } => {
            let _ = reply.send(controller.snapshot());
        }
        OverlayCommand::Foreground { reply } => {
            let _ = reply.send(controller.foreground());
        }
        OverlayCommand::Shutdown => return false,
    }
    true
}
