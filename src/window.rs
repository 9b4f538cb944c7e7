//! Host window abstraction
//!
//! This module defines the trait the host window system must implement so the
//! overlay manager can attach elements to whatever surface is in the
//! foreground, without knowing anything about the platform behind it.

use std::sync::Arc;

use thiserror::Error;

use crate::overlay::OverlayKind;
use crate::rect::Rect;

/// Identifies a top-level window (one activity / screen)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

impl std::fmt::Display for WindowId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

/// Identifies an element inside one window's view tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "element#{}", self.0)
    }
}

/// Everything a window needs to build an overlay element
#[derive(Debug, Clone, PartialEq)]
pub struct ElementSpec {
    pub kind: OverlayKind,
    /// Caller-chosen identifier, for the host's own bookkeeping/debugging
    pub identifier: String,
    /// Frame in the window's content coordinate space
    pub frame: Rect,
    /// Stacking order; elements are added as the topmost sibling at this layer
    pub z_index: f32,
    /// Whether touches pass through to the content underneath
    pub click_through: bool,
}

/// Errors reported by the host window system
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    #[error("{window} has been destroyed")]
    WindowDestroyed { window: WindowId },

    #[error("{element} is not attached to {window}")]
    UnknownElement { window: WindowId, element: ElementId },

    #[error("{0}")]
    Rejected(String),
}

/// Trait that the host window system implements for each top-level window.
///
/// Methods take `&self` because windows are shared between the host and the
/// overlay manager; implementations use interior mutability. The overlay
/// manager only ever calls the mutating methods from its UI execution
/// context, one call at a time.
pub trait HostWindow: Send + Sync {
    fn id(&self) -> WindowId;

    /// Liveness flag. Cleared by the host once the window is torn down; a
    /// window that is not alive must not receive new elements.
    fn is_alive(&self) -> bool;

    /// Create an element from `spec` and add it to the view tree
    fn attach(&self, spec: &ElementSpec) -> Result<ElementId, HostError>;

    /// Move/resize an attached element
    fn reposition(&self, element: ElementId, frame: Rect) -> Result<(), HostError>;

    /// Remove an element from the view tree and destroy it
    fn detach(&self, element: ElementId) -> Result<(), HostError>;

    /// Load HTML content into a placeholder element
    fn load_content(&self, element: ElementId, html: &str) -> Result<(), HostError>;
}

/// Shared handle to a host window
pub type WindowRef = Arc<dyn HostWindow>;
