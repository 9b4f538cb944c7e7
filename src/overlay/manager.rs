//! Overlay manager
//!
//! Cloneable front door to the UI execution context. Every method enqueues a
//! command and resolves only after the UI thread has applied it, so callers
//! never observe a request that is submitted but not yet applied.

use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tokio::sync::{mpsc::Sender, oneshot};
use tracing::{debug, warn};

use crate::config::OverlaySettings;
use crate::rect::Rect;
use crate::window::{WindowId, WindowRef};

use super::controller::{ContentTarget, MigrationReport};
use super::error::OverlayError;
use super::spawn::spawn_ui_context;
use super::state::{OverlayCommand, Reply};
use super::types::{OverlayKey, OverlayKind, OverlaySnapshot};

#[derive(Clone)]
pub struct OverlayManager {
    tx: Sender<OverlayCommand>,
    thread: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl OverlayManager {
    /// Start the UI execution context and return a handle to it
    pub fn start(settings: OverlaySettings) -> Result<Self, OverlayError> {
        let handle = spawn_ui_context(settings)?;
        Ok(Self {
            tx: handle.tx,
            thread: Arc::new(Mutex::new(Some(handle.handle))),
        })
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Placeholder / Tooltip Target Operations
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn register_placeholder(&self, placeholder_id: &str, rect: Rect) -> Result<OverlaySnapshot, OverlayError> {
        self.register(OverlayKind::Placeholder, placeholder_id, rect).await
    }

    pub async fn unregister_placeholder(&self, placeholder_id: &str) -> Result<bool, OverlayError> {
        self.unregister(OverlayKind::Placeholder, placeholder_id).await
    }

    pub async fn register_tooltip_target(&self, target_id: &str, rect: Rect) -> Result<OverlaySnapshot, OverlayError> {
        self.register(OverlayKind::TooltipTarget, target_id, rect).await
    }

    pub async fn unregister_tooltip_target(&self, target_id: &str) -> Result<bool, OverlayError> {
        self.unregister(OverlayKind::TooltipTarget, target_id).await
    }

    /// Create or replace the overlay for `(kind, identifier)`
    pub async fn register(&self, kind: OverlayKind, identifier: &str, rect: Rect) -> Result<OverlaySnapshot, OverlayError> {
        let key = validated_key(kind, identifier)?;
        self.request(|reply| OverlayCommand::Register { key, rect, reply })
            .await?
    }

    /// Remove the overlay for `(kind, identifier)`. Resolves `Ok(false)` when
    /// there was nothing to remove.
    pub async fn unregister(&self, kind: OverlayKind, identifier: &str) -> Result<bool, OverlayError> {
        let key = validated_key(kind, identifier)?;
        self.request(|reply| OverlayCommand::Unregister { key, reply })
            .await?
    }

    pub async fn reposition(&self, kind: OverlayKind, identifier: &str, rect: Rect) -> Result<OverlaySnapshot, OverlayError> {
        let key = validated_key(kind, identifier)?;
        self.request(|reply| OverlayCommand::Reposition { key, rect, reply })
            .await?
    }

    pub async fn clear(&self) -> Result<usize, OverlayError> {
        self.request(|reply| OverlayCommand::Clear { reply }).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Host Window Notifications
    // ─────────────────────────────────────────────────────────────────────────

    /// The host's foreground window changed
    pub async fn set_foreground(&self, window: Option<WindowRef>) -> Result<MigrationReport, OverlayError> {
        self.request(|reply| OverlayCommand::SetForeground { window, reply })
            .await
    }

    /// The host permanently tore a window down
    pub async fn window_destroyed(&self, window_id: WindowId) -> Result<usize, OverlayError> {
        self.request(|reply| OverlayCommand::WindowDestroyed { window_id, reply })
            .await
    }

    pub async fn foreground(&self) -> Result<Option<WindowId>, OverlayError> {
        self.request(|reply| OverlayCommand::Foreground { reply }).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content & Lookups
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn dispatch_content(&self, identifier: &str, html: &str) -> Result<ContentTarget, OverlayError> {
        let identifier = identifier.to_string();
        let html = html.to_string();
        self.request(|reply| OverlayCommand::DispatchContent {
            identifier,
            html,
            reply,
        })
        .await?
    }

    pub async fn tooltip_target(&self, target_id: &str) -> Result<Option<Rect>, OverlayError> {
        let identifier = target_id.to_string();
        self.request(|reply| OverlayCommand::TooltipTarget { identifier, reply })
            .await
    }

    /// Registry contents, taken on the UI thread
    pub async fn entries(&self) -> Result<Vec<OverlaySnapshot>, OverlayError> {
        self.request(|reply| OverlayCommand::Snapshot { reply }).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Remove all overlays and stop the UI thread. Commands already queued
    /// run first; later requests fail with `ContextClosed`.
    pub async fn shutdown(&self) {
        if self.tx.send(OverlayCommand::Shutdown).await.is_err() {
            debug!("overlay UI context already stopped");
        }

        let handle = match self.thread.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(handle) = handle {
            match tokio::task::spawn_blocking(move || handle.join()).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => warn!("overlay UI thread panicked"),
                Err(e) => warn!(error = %e, "failed to join overlay UI thread"),
            }
        }
    }

    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> OverlayCommand) -> Result<T, OverlayError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(build(reply_tx))
            .await
            .map_err(|_| OverlayError::ContextClosed)?;
        reply_rx.await.map_err(|_| OverlayError::ContextClosed)
    }
}

fn validated_key(kind: OverlayKind, identifier: &str) -> Result<OverlayKey, OverlayError> {
    if identifier.is_empty() {
        return Err(OverlayError::Validation(format!("{} is required", kind.id_param())));
    }
    Ok(OverlayKey::new(kind, identifier))
}
