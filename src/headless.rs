//! In-memory host window system
//!
//! Keeps each window's view tree as a plain map of elements. Used by the
//! `pushapp` shell and by the test suites in place of a real platform.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use hashbrown::HashMap;

use crate::overlay::OverlayKind;
use crate::rect::Rect;
use crate::window::{ElementId, ElementSpec, HostError, HostWindow, WindowId, WindowRef};

/// An element as the in-memory view tree sees it
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessElement {
    pub id: ElementId,
    pub kind: OverlayKind,
    pub identifier: String,
    pub frame: Rect,
    pub z_index: f32,
    pub click_through: bool,
    /// Insertion order; higher is closer to the top among equal z indices
    pub order: u64,
    pub content: Option<String>,
}

#[derive(Default)]
struct ViewTree {
    elements: HashMap<ElementId, HeadlessElement>,
    next_id: u64,
    fail_next_attach: Option<String>,
    fail_next_detach: Option<String>,
}

/// A window whose view tree lives in memory
pub struct HeadlessWindow {
    id: WindowId,
    alive: AtomicBool,
    /// Set while a mutation is running; used to detect overlapping mutations
    mutating: AtomicBool,
    overlapping_mutations: AtomicU64,
    tree: Mutex<ViewTree>,
}

impl HeadlessWindow {
    pub fn new(id: WindowId) -> Arc<Self> {
        Arc::new(Self {
            id,
            alive: AtomicBool::new(true),
            mutating: AtomicBool::new(false),
            overlapping_mutations: AtomicU64::new(0),
            tree: Mutex::new(ViewTree::default()),
        })
    }

    /// Upcast for the overlay manager
    pub fn as_window_ref(self: &Arc<Self>) -> WindowRef {
        self.clone()
    }

    /// Tear the window down. Its elements go with it.
    pub fn destroy(&self) {
        self.alive.store(false, Ordering::SeqCst);
        self.lock_tree().elements.clear();
    }

    /// Make the next `attach` call fail with the given message
    pub fn fail_next_attach(&self, message: impl Into<String>) {
        self.lock_tree().fail_next_attach = Some(message.into());
    }

    /// Make the next `detach` call fail with the given message, leaving the
    /// element in place
    pub fn fail_next_detach(&self, message: impl Into<String>) {
        self.lock_tree().fail_next_detach = Some(message.into());
    }

    /// Snapshot of all elements, bottom to top
    pub fn elements(&self) -> Vec<HeadlessElement> {
        let mut elements: Vec<_> = self.lock_tree().elements.values().cloned().collect();
        elements.sort_by(|a, b| {
            a.z_index
                .total_cmp(&b.z_index)
                .then_with(|| a.order.cmp(&b.order))
        });
        elements
    }

    /// Elements created for the given identifier and kind
    pub fn elements_for(&self, kind: OverlayKind, identifier: &str) -> Vec<HeadlessElement> {
        self.elements()
            .into_iter()
            .filter(|e| e.kind == kind && e.identifier == identifier)
            .collect()
    }

    pub fn element_count(&self) -> usize {
        self.lock_tree().elements.len()
    }

    /// Number of times a mutation started while another was still running
    pub fn overlapping_mutations(&self) -> u64 {
        self.overlapping_mutations.load(Ordering::SeqCst)
    }

    fn lock_tree(&self) -> MutexGuard<'_, ViewTree> {
        // A poisoned tree is still structurally valid; keep going.
        self.tree.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn mutation(&self) -> Result<MutationGuard<'_>, HostError> {
        if !self.is_alive() {
            return Err(HostError::WindowDestroyed { window: self.id });
        }
        if self.mutating.swap(true, Ordering::SeqCst) {
            self.overlapping_mutations.fetch_add(1, Ordering::SeqCst);
        }
        Ok(MutationGuard { window: self })
    }
}

struct MutationGuard<'a> {
    window: &'a HeadlessWindow,
}

impl Drop for MutationGuard<'_> {
    fn drop(&mut self) {
        self.window.mutating.store(false, Ordering::SeqCst);
    }
}

impl HostWindow for HeadlessWindow {
    fn id(&self) -> WindowId {
        self.id
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::SeqCst)
    }

    fn attach(&self, spec: &ElementSpec) -> Result<ElementId, HostError> {
        let _guard = self.mutation()?;
        let mut tree = self.lock_tree();
        if let Some(message) = tree.fail_next_attach.take() {
            return Err(HostError::Rejected(message));
        }

        tree.next_id += 1;
        let id = ElementId(tree.next_id);
        tree.elements.insert(
            id,
            HeadlessElement {
                id,
                kind: spec.kind,
                identifier: spec.identifier.clone(),
                frame: spec.frame,
                z_index: spec.z_index,
                click_through: spec.click_through,
                order: id.0,
                content: None,
            },
        );
        Ok(id)
    }

    fn reposition(&self, element: ElementId, frame: Rect) -> Result<(), HostError> {
        let _guard = self.mutation()?;
        let mut tree = self.lock_tree();
        let entry = tree
            .elements
            .get_mut(&element)
            .ok_or(HostError::UnknownElement {
                window: self.id,
                element,
            })?;
        entry.frame = frame;
        Ok(())
    }

    fn detach(&self, element: ElementId) -> Result<(), HostError> {
        let _guard = self.mutation()?;
        let mut tree = self.lock_tree();
        if let Some(message) = tree.fail_next_detach.take() {
            return Err(HostError::Rejected(message));
        }
        tree.elements
            .remove(&element)
            .map(|_| ())
            .ok_or(HostError::UnknownElement {
                window: self.id,
                element,
            })
    }

    fn load_content(&self, element: ElementId, html: &str) -> Result<(), HostError> {
        let _guard = self.mutation()?;
        let mut tree = self.lock_tree();
        let entry = tree
            .elements
            .get_mut(&element)
            .ok_or(HostError::UnknownElement {
                window: self.id,
                element,
            })?;
        entry.content = Some(html.to_string());
        Ok(())
    }
}

/// Hands out headless windows with unique ids
#[derive(Default)]
pub struct HeadlessHost {
    next_id: AtomicU64,
    windows: Mutex<Vec<Arc<HeadlessWindow>>>,
}

impl HeadlessHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new window (not yet bound as foreground)
    pub fn open_window(&self) -> Arc<HeadlessWindow> {
        let id = WindowId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
        let window = HeadlessWindow::new(id);
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(window.clone());
        window
    }

    pub fn window(&self, id: WindowId) -> Option<Arc<HeadlessWindow>> {
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .find(|w| w.id == id)
            .cloned()
    }

    pub fn windows(&self) -> Vec<Arc<HeadlessWindow>> {
        self.windows
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}
