//! Overlay type definitions
//!
//! Core types that identify overlays and describe what is attached where.

use std::sync::Weak;

use serde::{Deserialize, Serialize};

use crate::rect::Rect;
use crate::window::{ElementId, HostWindow, WindowId, WindowRef};

// ─────────────────────────────────────────────────────────────────────────────
// Overlay Kind
// ─────────────────────────────────────────────────────────────────────────────

/// What an overlay element is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayKind {
    /// Visible content slot (receives dispatched HTML)
    Placeholder,
    /// Invisible anchor a tooltip is positioned against
    TooltipTarget,
}

impl OverlayKind {
    /// Name of the identifier parameter on the bridge
    pub fn id_param(&self) -> &'static str {
        match self {
            OverlayKind::Placeholder => "placeholderId",
            OverlayKind::TooltipTarget => "targetId",
        }
    }

    /// Human-readable label for logs and error messages
    pub fn label(&self) -> &'static str {
        match self {
            OverlayKind::Placeholder => "placeholder",
            OverlayKind::TooltipTarget => "tooltip target",
        }
    }

    /// Whether removing an existing entry of this kind needs a bound
    /// foreground window.
    ///
    /// Placeholders are visible content and are detached through the
    /// foreground window; tooltip targets are markers and can be dropped at
    /// any time.
    pub fn removal_needs_foreground(&self) -> bool {
        match self {
            OverlayKind::Placeholder => true,
            OverlayKind::TooltipTarget => false,
        }
    }
}

impl std::fmt::Display for OverlayKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay Key
// ─────────────────────────────────────────────────────────────────────────────

/// Registry key. Each kind has its own identifier space, so a placeholder and
/// a tooltip target registered under the same identifier never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OverlayKey {
    pub kind: OverlayKind,
    pub identifier: String,
}

impl OverlayKey {
    pub fn new(kind: OverlayKind, identifier: impl Into<String>) -> Self {
        Self {
            kind,
            identifier: identifier.into(),
        }
    }

    pub fn placeholder(identifier: impl Into<String>) -> Self {
        Self::new(OverlayKind::Placeholder, identifier)
    }

    pub fn tooltip_target(identifier: impl Into<String>) -> Self {
        Self::new(OverlayKind::TooltipTarget, identifier)
    }
}

impl std::fmt::Display for OverlayKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.kind, self.identifier)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Attachment
// ─────────────────────────────────────────────────────────────────────────────

/// Lookup reference from a registry entry to its element.
///
/// The element is owned by the window's view tree. The window is held weakly
/// and its liveness flag is checked before the element is touched again.
#[derive(Clone)]
pub struct Attachment {
    window: Weak<dyn HostWindow>,
    pub window_id: WindowId,
    pub element: ElementId,
}

impl Attachment {
    pub fn new(window: &WindowRef, element: ElementId) -> Self {
        Self {
            window: std::sync::Arc::downgrade(window),
            window_id: window.id(),
            element,
        }
    }

    /// The window, if it still exists and has not been torn down
    pub fn live_window(&self) -> Option<WindowRef> {
        self.window.upgrade().filter(|w| w.is_alive())
    }

    pub fn is_live(&self) -> bool {
        self.live_window().is_some()
    }
}

impl std::fmt::Debug for Attachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Attachment")
            .field("window_id", &self.window_id)
            .field("element", &self.element)
            .field("live", &self.is_live())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Overlay Entry
// ─────────────────────────────────────────────────────────────────────────────

/// One live overlay, as recorded by the registry
#[derive(Debug, Clone)]
pub struct OverlayEntry {
    pub key: OverlayKey,
    pub rect: Rect,
    pub attachment: Attachment,
}

impl OverlayEntry {
    pub fn kind(&self) -> OverlayKind {
        self.key.kind
    }

    pub fn identifier(&self) -> &str {
        &self.key.identifier
    }

    pub fn window_id(&self) -> WindowId {
        self.attachment.window_id
    }

    /// Plain-data view of this entry, safe to hand to other threads
    pub fn snapshot(&self) -> OverlaySnapshot {
        OverlaySnapshot {
            kind: self.key.kind,
            identifier: self.key.identifier.clone(),
            rect: self.rect,
            window_id: self.attachment.window_id,
            element: self.attachment.element,
        }
    }
}

/// Detached copy of an [`OverlayEntry`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySnapshot {
    pub kind: OverlayKind,
    pub identifier: String,
    pub rect: Rect,
    pub window_id: WindowId,
    pub element: ElementId,
}
