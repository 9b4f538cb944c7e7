//! Overlay lifecycle controller
//!
//! Creates, attaches, repositions and detaches overlay elements. Owns the
//! registry and the window binding. Every method here mutates the view tree
//! or the registry, so the controller lives on the UI execution context and
//! is only reached through the command queue (see `spawn`).

use tracing::{debug, info, warn};

use crate::config::OverlaySettings;
use crate::rect::Rect;
use crate::window::{ElementSpec, HostError, WindowId, WindowRef};

use super::binding::WindowBinding;
use super::error::OverlayError;
use super::registry::OverlayRegistry;
use super::types::{Attachment, OverlayEntry, OverlayKey, OverlayKind, OverlaySnapshot};

/// Outcome of a foreground window change
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Entries moved onto the new window
    pub migrated: Vec<OverlayKey>,
    /// Entries that could not be moved. One whose old element would not
    /// detach stays where it was; one the new window refused is dropped.
    pub failed: Vec<(OverlayKey, HostError)>,
}

/// Where dispatched content ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentTarget {
    /// Loaded into the placeholder element on this window
    Placeholder { window_id: WindowId },
    /// No placeholder, but a tooltip target exists; show a tooltip here
    Tooltip { rect: Rect },
}

#[derive(Debug)]
pub struct LifecycleController {
    registry: OverlayRegistry,
    binding: WindowBinding,
    settings: OverlaySettings,
}

impl LifecycleController {
    pub fn new(settings: OverlaySettings) -> Self {
        Self {
            registry: OverlayRegistry::new(),
            binding: WindowBinding::new(),
            settings,
        }
    }

    pub fn registry(&self) -> &OverlayRegistry {
        &self.registry
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Register / Unregister
    // ─────────────────────────────────────────────────────────────────────────

    /// Create an element for `key` at `rect` on the foreground window,
    /// replacing any element already registered under `key`.
    pub fn register(&mut self, key: OverlayKey, rect: Rect) -> Result<OverlaySnapshot, OverlayError> {
        let window = self
            .binding
            .current()
            .cloned()
            .ok_or(OverlayError::NoForegroundWindow)?;

        // Old element goes first so two never coexist
        if let Some(previous) = self.registry.get(&key) {
            debug!(%key, old = %previous.rect, new = %rect, "replacing overlay");
            self.release(previous)?;
            self.registry.remove(&key);
        }

        let attachment = self.attach(&window, &key, rect).inspect_err(|e| {
            warn!(%key, window = %window.id(), error = %e, "host rejected overlay element");
        })?;

        let entry = OverlayEntry {
            key,
            rect,
            attachment,
        };
        let snapshot = entry.snapshot();
        self.registry.put(entry);

        info!(
            kind = %snapshot.kind,
            id = %snapshot.identifier,
            rect = %snapshot.rect,
            window = %snapshot.window_id,
            "overlay registered"
        );
        Ok(snapshot)
    }

    /// Detach and drop the entry for `key`. Returns `false` when nothing was
    /// registered, which is not an error.
    pub fn unregister(&mut self, key: &OverlayKey) -> Result<bool, OverlayError> {
        let Some(entry) = self.registry.get(key) else {
            debug!(%key, "unregister of unknown overlay ignored");
            return Ok(false);
        };
        if key.kind.removal_needs_foreground() && self.binding.current().is_none() {
            return Err(OverlayError::NoForegroundWindow);
        }

        self.release(entry)?;
        self.registry.remove(key);
        info!(%key, "overlay unregistered");
        Ok(true)
    }

    /// Move an existing element in place
    pub fn reposition(&mut self, key: &OverlayKey, rect: Rect) -> Result<OverlaySnapshot, OverlayError> {
        let entry = self
            .registry
            .get(key)
            .ok_or_else(|| OverlayError::UnknownTarget {
                identifier: key.identifier.clone(),
            })?;
        let window = entry
            .attachment
            .live_window()
            .ok_or(OverlayError::NoForegroundWindow)?;

        window.reposition(entry.attachment.element, rect)?;

        let moved = OverlayEntry {
            rect,
            ..entry.clone()
        };
        let snapshot = moved.snapshot();
        self.registry.put(moved);
        debug!(%key, %rect, "overlay repositioned");
        Ok(snapshot)
    }

    /// Detach and drop every entry. Returns how many were dropped; entries
    /// whose element would not detach are kept.
    pub fn clear(&mut self) -> usize {
        let mut removed = 0;
        for key in self.registry.keys() {
            let released = self
                .registry
                .get(&key)
                .is_some_and(|entry| self.release(entry).is_ok());
            if released {
                self.registry.remove(&key);
                removed += 1;
            }
        }
        if removed > 0 || !self.registry.is_empty() {
            info!(removed, kept = self.registry.len(), "overlays cleared");
        }
        removed
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Window Binding
    // ─────────────────────────────────────────────────────────────────────────

    pub fn foreground(&self) -> Option<WindowId> {
        self.binding.current_id()
    }

    /// Bind a new foreground window and move every entry that lives on a
    /// different window onto it, at the same rectangle.
    pub fn set_foreground(&mut self, window: Option<WindowRef>) -> MigrationReport {
        self.binding.set_current(window);
        let mut report = MigrationReport::default();

        let Some(target) = self.binding.current().cloned() else {
            return report;
        };
        let target_id = target.id();

        let stale: Vec<OverlayKey> = self
            .registry
            .all()
            .filter(|e| e.window_id() != target_id)
            .map(|e| e.key.clone())
            .collect();

        for key in stale {
            let Some(entry) = self.registry.get(&key) else {
                continue;
            };
            let rect = entry.rect;
            let from = entry.window_id();
            if let Err(e) = self.release(entry) {
                report.failed.push((key, e));
                continue;
            }
            self.registry.remove(&key);

            match self.attach(&target, &key, rect) {
                Ok(attachment) => {
                    debug!(%key, %from, to = %target_id, "overlay migrated");
                    self.registry.put(OverlayEntry {
                        key: key.clone(),
                        rect,
                        attachment,
                    });
                    report.migrated.push(key);
                }
                Err(e) => {
                    warn!(%key, %from, to = %target_id, error = %e, "overlay dropped during migration");
                    report.failed.push((key, e));
                }
            }
        }

        if !report.migrated.is_empty() || !report.failed.is_empty() {
            info!(
                window = %target_id,
                migrated = report.migrated.len(),
                failed = report.failed.len(),
                "overlays moved to new foreground window"
            );
        }
        report
    }

    /// The host tore `window_id` down. Its elements are gone with it; drop
    /// their entries and the binding if it pointed there.
    pub fn window_destroyed(&mut self, window_id: WindowId) -> usize {
        let unbound = self.binding.unbind(window_id);

        let owned: Vec<OverlayKey> = self
            .registry
            .all()
            .filter(|e| e.window_id() == window_id)
            .map(|e| e.key.clone())
            .collect();
        for key in &owned {
            // The window owned the element; the entry goes either way
            if let Some(entry) = self.registry.remove(key) {
                let _ = self.release(&entry);
            }
        }

        info!(window = %window_id, unbound, dropped = owned.len(), "window destroyed");
        owned.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Content & Lookups
    // ─────────────────────────────────────────────────────────────────────────

    /// Route HTML to the placeholder for `identifier`, falling back to a
    /// tooltip target with the same identifier.
    pub fn dispatch_content(&mut self, identifier: &str, html: &str) -> Result<ContentTarget, OverlayError> {
        if let Some(entry) = self.registry.get(&OverlayKey::placeholder(identifier)) {
            let window = entry
                .attachment
                .live_window()
                .ok_or(OverlayError::NoForegroundWindow)?;
            window.load_content(entry.attachment.element, html)?;
            debug!(id = identifier, bytes = html.len(), "content loaded into placeholder");
            return Ok(ContentTarget::Placeholder {
                window_id: window.id(),
            });
        }

        if let Some(rect) = self.tooltip_target(identifier) {
            debug!(id = identifier, %rect, "content routed to tooltip target");
            return Ok(ContentTarget::Tooltip { rect });
        }

        Err(OverlayError::UnknownTarget {
            identifier: identifier.to_string(),
        })
    }

    pub fn tooltip_target(&self, identifier: &str) -> Option<Rect> {
        self.registry
            .get(&OverlayKey::tooltip_target(identifier))
            .map(|e| e.rect)
    }

    /// Plain-data copy of every entry, sorted by key
    pub fn snapshot(&self) -> Vec<OverlaySnapshot> {
        let mut entries: Vec<_> = self.registry.all().map(OverlayEntry::snapshot).collect();
        entries.sort_by(|a, b| (a.kind, &a.identifier).cmp(&(b.kind, &b.identifier)));
        entries
    }

    // ─────────────────────────────────────────────────────────────────────────
    // View Tree
    // ─────────────────────────────────────────────────────────────────────────

    fn attach(&self, window: &WindowRef, key: &OverlayKey, rect: Rect) -> Result<Attachment, HostError> {
        let spec = ElementSpec {
            kind: key.kind,
            identifier: key.identifier.clone(),
            frame: rect,
            z_index: self.settings.z_index,
            click_through: match key.kind {
                OverlayKind::Placeholder => self.settings.click_through,
                OverlayKind::TooltipTarget => true,
            },
        };
        let element = window.attach(&spec)?;
        Ok(Attachment::new(window, element))
    }

    /// Detach an entry's element before the entry is dropped. A window that
    /// is already gone took the element with it, and an element the window no
    /// longer knows about is already detached.
    fn release(&self, entry: &OverlayEntry) -> Result<(), HostError> {
        let Some(window) = entry.attachment.live_window() else {
            debug!(key = %entry.key, window = %entry.window_id(), "window gone, nothing to detach");
            return Ok(());
        };
        match window.detach(entry.attachment.element) {
            Ok(()) | Err(HostError::UnknownElement { .. }) => Ok(()),
            Err(e) => {
                warn!(key = %entry.key, error = %e, "failed to detach overlay element");
                Err(e)
            }
        }
    }
}
