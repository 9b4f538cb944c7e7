//! Foreground window binding
//!
//! Tracks which window overlays attach to. The host reports foreground
//! changes; the lifecycle controller asks for the current target.

use tracing::debug;

use crate::window::{WindowId, WindowRef};

#[derive(Default)]
pub struct WindowBinding {
    current: Option<WindowRef>,
}

impl WindowBinding {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the bound window. Returns the previously bound one.
    pub fn set_current(&mut self, window: Option<WindowRef>) -> Option<WindowRef> {
        debug!(
            from = ?self.current.as_ref().map(|w| w.id()),
            to = ?window.as_ref().map(|w| w.id()),
            "foreground window changed"
        );
        std::mem::replace(&mut self.current, window)
    }

    /// The bound window, unless it has been torn down
    pub fn current(&self) -> Option<&WindowRef> {
        self.current.as_ref().filter(|w| w.is_alive())
    }

    pub fn current_id(&self) -> Option<WindowId> {
        self.current().map(|w| w.id())
    }

    /// Drop the binding if it points at `window_id`. Returns whether it did.
    pub fn unbind(&mut self, window_id: WindowId) -> bool {
        if self.current.as_ref().is_some_and(|w| w.id() == window_id) {
            self.current = None;
            true
        } else {
            false
        }
    }
}

impl std::fmt::Debug for WindowBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WindowBinding")
            .field("current", &self.current.as_ref().map(|w| w.id()))
            .finish()
    }
}
