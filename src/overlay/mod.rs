//! Overlay management module
//!
//! Places transient overlay elements (placeholders and tooltip targets) on the
//! host's foreground window at caller-supplied pixel rectangles, and keeps
//! them there as the foreground window changes.
//!
//! # Module Structure
//!
//! - `types` - Core type definitions (`OverlayKind`, `OverlayKey`, `OverlayEntry`)
//! - `registry` - Key to live entry mapping (`OverlayRegistry`)
//! - `binding` - Foreground window tracking (`WindowBinding`)
//! - `controller` - View-tree mutations and policy (`LifecycleController`)
//! - `state` - UI-context commands (`OverlayCommand`, `OverlayHandle`)
//! - `spawn` - The UI execution context thread
//! - `manager` - Async, cloneable front door (`OverlayManager`)
//!
//! ```text
//!  caller tasks ──► OverlayManager ──► mpsc queue ──► overlay-ui thread
//!       ▲                                                   │
//!       └──────────────── oneshot reply ◄── LifecycleController
//!                                          (registry + binding + windows)
//! ```

mod binding;
mod controller;
mod error;
mod manager;
mod registry;
mod spawn;
mod state;
mod types;

#[cfg(test)]
mod controller_tests;

// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use binding::WindowBinding;
pub use controller::{ContentTarget, LifecycleController, MigrationReport};
pub use error::OverlayError;
pub use manager::OverlayManager;
pub use registry::OverlayRegistry;
pub use state::{OverlayCommand, OverlayHandle};
pub use types::{Attachment, OverlayEntry, OverlayKey, OverlayKind, OverlaySnapshot};
