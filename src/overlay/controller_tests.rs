//! Tests for LifecycleController
//!
//! Verifies that:
//! - Registration replaces rather than duplicates
//! - Removal is idempotent
//! - Foreground changes migrate entries verbatim
//! - Host failures never leave a registered-but-unattached entry

use std::sync::Arc;

use crate::config::OverlaySettings;
use crate::headless::HeadlessWindow;
use crate::rect::Rect;
use crate::window::{HostError, WindowId};

use super::controller::{ContentTarget, LifecycleController};
use super::error::OverlayError;
use super::types::{OverlayKey, OverlayKind};

// ═══════════════════════════════════════════════════════════════════════════
// Test Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn controller_with_window(id: u64) -> (LifecycleController, Arc<HeadlessWindow>) {
    let mut controller = LifecycleController::new(OverlaySettings::default());
    let window = HeadlessWindow::new(WindowId(id));
    controller.set_foreground(Some(window.as_window_ref()));
    (controller, window)
}

// ═══════════════════════════════════════════════════════════════════════════
// Register / Unregister
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_register_attaches_element_at_rect() {
    let (mut controller, window) = controller_with_window(1);

    let snapshot = controller
        .register(OverlayKey::placeholder("ph1"), Rect::new(10, 20, 100, 50))
        .unwrap();

    assert_eq!(snapshot.window_id, WindowId(1));
    let elements = window.elements_for(OverlayKind::Placeholder, "ph1");
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].frame, Rect::new(10, 20, 100, 50));
    assert_eq!(elements[0].z_index, 1000.0);
    assert!(elements[0].click_through);
}

#[test]
fn test_register_same_id_replaces() {
    let (mut controller, window) = controller_with_window(1);
    let key = OverlayKey::placeholder("ph1");

    controller.register(key.clone(), Rect::new(10, 20, 100, 50)).unwrap();
    controller.register(key.clone(), Rect::new(10, 20, 200, 80)).unwrap();

    assert_eq!(controller.registry().len(), 1);
    assert_eq!(controller.registry().get(&key).unwrap().rect, Rect::new(10, 20, 200, 80));

    let elements = window.elements_for(OverlayKind::Placeholder, "ph1");
    assert_eq!(elements.len(), 1, "exactly one element after replace");
    assert_eq!(elements[0].frame.width, 200);
    assert_eq!(elements[0].frame.height, 80);
}

#[test]
fn test_register_then_unregister_round_trip() {
    let (mut controller, window) = controller_with_window(1);
    let key = OverlayKey::tooltip_target("tt1");

    controller.register(key.clone(), Rect::new(0, 0, 30, 30)).unwrap();
    assert!(controller.unregister(&key).unwrap());

    assert!(controller.registry().is_empty());
    assert_eq!(window.element_count(), 0);
}

#[test]
fn test_unregister_unknown_is_noop() {
    let (mut controller, window) = controller_with_window(1);
    controller
        .register(OverlayKey::placeholder("other"), Rect::new(0, 0, 5, 5))
        .unwrap();

    let removed = controller.unregister(&OverlayKey::placeholder("never")).unwrap();

    assert!(!removed);
    assert_eq!(controller.registry().len(), 1);
    assert_eq!(window.element_count(), 1);
}

#[test]
fn test_register_without_foreground_fails() {
    let mut controller = LifecycleController::new(OverlaySettings::default());

    let result = controller.register(OverlayKey::placeholder("ph1"), Rect::new(0, 0, 10, 10));

    assert!(matches!(result, Err(OverlayError::NoForegroundWindow)));
    assert!(controller.registry().is_empty());
}

#[test]
fn test_register_on_destroyed_foreground_fails() {
    let (mut controller, window) = controller_with_window(1);
    window.destroy();

    let result = controller.register(OverlayKey::placeholder("ph1"), Rect::new(0, 0, 10, 10));

    assert!(matches!(result, Err(OverlayError::NoForegroundWindow)));
    assert!(controller.registry().is_empty());
}

#[test]
fn test_failed_attach_leaves_no_entry() {
    let (mut controller, window) = controller_with_window(1);
    let key = OverlayKey::placeholder("ph1");
    controller.register(key.clone(), Rect::new(0, 0, 10, 10)).unwrap();

    window.fail_next_attach("view tree locked");
    let result = controller.register(key.clone(), Rect::new(0, 0, 20, 20));

    match result {
        Err(OverlayError::View(HostError::Rejected(msg))) => assert_eq!(msg, "view tree locked"),
        other => panic!("expected view failure, got {other:?}"),
    }
    assert!(controller.registry().get(&key).is_none());
    assert_eq!(window.element_count(), 0, "old element detached, new never attached");
}

#[test]
fn test_failed_detach_on_replace_keeps_one_element() {
    let (mut controller, window) = controller_with_window(1);
    let key = OverlayKey::placeholder("ph1");
    controller.register(key.clone(), Rect::new(0, 0, 10, 10)).unwrap();

    window.fail_next_detach("view busy");
    let result = controller.register(key.clone(), Rect::new(0, 0, 20, 20));

    assert!(matches!(result, Err(OverlayError::View(HostError::Rejected(_)))));
    assert_eq!(controller.registry().get(&key).unwrap().rect, Rect::new(0, 0, 10, 10));
    assert_eq!(window.elements_for(OverlayKind::Placeholder, "ph1").len(), 1);

    controller.register(key.clone(), Rect::new(0, 0, 20, 20)).unwrap();
    let elements = window.elements_for(OverlayKind::Placeholder, "ph1");
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].frame, Rect::new(0, 0, 20, 20));
}

#[test]
fn test_failed_detach_on_unregister_keeps_entry() {
    let (mut controller, window) = controller_with_window(1);
    let key = OverlayKey::tooltip_target("tt1");
    controller.register(key.clone(), Rect::new(0, 0, 10, 10)).unwrap();

    window.fail_next_detach("view busy");
    assert!(matches!(controller.unregister(&key), Err(OverlayError::View(_))));
    assert!(controller.registry().contains(&key));
    assert_eq!(window.element_count(), 1);

    assert!(controller.unregister(&key).unwrap());
    assert_eq!(window.element_count(), 0);
}

#[test]
fn test_placeholder_unregister_needs_foreground() {
    let (mut controller, window) = controller_with_window(1);
    let key = OverlayKey::placeholder("ph1");
    controller.register(key.clone(), Rect::new(0, 0, 10, 10)).unwrap();

    controller.set_foreground(None);
    let result = controller.unregister(&key);

    assert!(matches!(result, Err(OverlayError::NoForegroundWindow)));
    assert!(controller.registry().contains(&key));
    assert_eq!(window.element_count(), 1);
}

#[test]
fn test_tooltip_unregister_without_foreground() {
    let (mut controller, window) = controller_with_window(1);
    let key = OverlayKey::tooltip_target("tt1");
    controller.register(key.clone(), Rect::new(0, 0, 30, 30)).unwrap();

    controller.set_foreground(None);

    assert!(controller.unregister(&key).unwrap());
    assert_eq!(window.element_count(), 0);
}

#[test]
fn test_same_identifier_across_kinds_coexists() {
    let (mut controller, window) = controller_with_window(1);

    controller.register(OverlayKey::placeholder("promo"), Rect::new(0, 0, 100, 40)).unwrap();
    controller.register(OverlayKey::tooltip_target("promo"), Rect::new(0, 50, 20, 20)).unwrap();
    controller.unregister(&OverlayKey::tooltip_target("promo")).unwrap();

    assert_eq!(window.elements_for(OverlayKind::Placeholder, "promo").len(), 1);
    assert!(window.elements_for(OverlayKind::TooltipTarget, "promo").is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// Foreground Changes
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_window_change_migrates_entries() {
    let (mut controller, window_a) = controller_with_window(1);
    controller
        .register(OverlayKey::tooltip_target("tt1"), Rect::new(0, 0, 30, 30))
        .unwrap();

    let window_b = HeadlessWindow::new(WindowId(2));
    let report = controller.set_foreground(Some(window_b.as_window_ref()));

    assert_eq!(report.migrated, vec![OverlayKey::tooltip_target("tt1")]);
    assert!(report.failed.is_empty());
    assert_eq!(window_a.element_count(), 0);

    let moved = window_b.elements_for(OverlayKind::TooltipTarget, "tt1");
    assert_eq!(moved.len(), 1);
    assert_eq!(moved[0].frame, Rect::new(0, 0, 30, 30));

    let entry = controller.registry().get(&OverlayKey::tooltip_target("tt1")).unwrap();
    assert_eq!(entry.window_id(), WindowId(2));
}

#[test]
fn test_rebinding_same_window_keeps_elements() {
    let (mut controller, window) = controller_with_window(1);
    controller.register(OverlayKey::placeholder("ph1"), Rect::new(1, 2, 3, 4)).unwrap();
    let before = window.elements();

    let report = controller.set_foreground(Some(window.as_window_ref()));

    assert!(report.migrated.is_empty());
    assert_eq!(window.elements(), before);
}

#[test]
fn test_failed_migration_is_reported() {
    let (mut controller, _window_a) = controller_with_window(1);
    controller.register(OverlayKey::placeholder("ph1"), Rect::new(0, 0, 10, 10)).unwrap();

    let window_b = HeadlessWindow::new(WindowId(2));
    window_b.fail_next_attach("not laid out");
    let report = controller.set_foreground(Some(window_b.as_window_ref()));

    assert!(report.migrated.is_empty());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, OverlayKey::placeholder("ph1"));
    assert!(controller.registry().is_empty());
}

#[test]
fn test_failed_detach_during_migration_stays_put() {
    let (mut controller, window_a) = controller_with_window(1);
    let key = OverlayKey::tooltip_target("tt1");
    controller.register(key.clone(), Rect::new(0, 0, 10, 10)).unwrap();

    window_a.fail_next_detach("view busy");
    let window_b = HeadlessWindow::new(WindowId(2));
    let report = controller.set_foreground(Some(window_b.as_window_ref()));

    assert!(report.migrated.is_empty());
    assert_eq!(report.failed[0].0, key);
    assert_eq!(controller.registry().get(&key).unwrap().window_id(), WindowId(1));
    assert_eq!(window_a.element_count(), 1);
    assert_eq!(window_b.element_count(), 0);
}

#[test]
fn test_destroyed_window_drops_its_entries() {
    let (mut controller, window) = controller_with_window(1);
    controller.register(OverlayKey::placeholder("ph1"), Rect::new(0, 0, 10, 10)).unwrap();
    controller.register(OverlayKey::tooltip_target("tt1"), Rect::new(0, 0, 10, 10)).unwrap();

    window.destroy();
    let dropped = controller.window_destroyed(WindowId(1));

    assert_eq!(dropped, 2);
    assert!(controller.registry().is_empty());
    assert!(controller.foreground().is_none());
}

// ═══════════════════════════════════════════════════════════════════════════
// Reposition, Content, Clear
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_reposition_moves_in_place() {
    let (mut controller, window) = controller_with_window(1);
    let key = OverlayKey::placeholder("ph1");
    let original = controller.register(key.clone(), Rect::new(0, 0, 10, 10)).unwrap();

    let moved = controller.reposition(&key, Rect::new(40, 40, 10, 10)).unwrap();

    assert_eq!(moved.element, original.element);
    assert_eq!(window.elements()[0].frame, Rect::new(40, 40, 10, 10));
    assert_eq!(controller.registry().get(&key).unwrap().rect, Rect::new(40, 40, 10, 10));
}

#[test]
fn test_reposition_unknown_fails() {
    let (mut controller, _window) = controller_with_window(1);
    let result = controller.reposition(&OverlayKey::placeholder("nope"), Rect::new(0, 0, 1, 1));
    assert!(matches!(result, Err(OverlayError::UnknownTarget { .. })));
}

#[test]
fn test_dispatch_content_routing() {
    let (mut controller, window) = controller_with_window(1);
    controller.register(OverlayKey::placeholder("banner"), Rect::new(0, 0, 300, 80)).unwrap();
    controller.register(OverlayKey::tooltip_target("cta"), Rect::new(10, 400, 60, 20)).unwrap();

    let target = controller.dispatch_content("banner", "<p>hi</p>").unwrap();
    assert_eq!(target, ContentTarget::Placeholder { window_id: WindowId(1) });
    let banner = &window.elements_for(OverlayKind::Placeholder, "banner")[0];
    assert_eq!(banner.content.as_deref(), Some("<p>hi</p>"));

    let target = controller.dispatch_content("cta", "<p>tip</p>").unwrap();
    assert_eq!(target, ContentTarget::Tooltip { rect: Rect::new(10, 400, 60, 20) });

    assert!(matches!(
        controller.dispatch_content("missing", "<p/>"),
        Err(OverlayError::UnknownTarget { .. })
    ));
}

#[test]
fn test_clear_detaches_everything() {
    let (mut controller, window) = controller_with_window(1);
    controller.register(OverlayKey::placeholder("a"), Rect::new(0, 0, 1, 1)).unwrap();
    controller.register(OverlayKey::placeholder("b"), Rect::new(0, 0, 1, 1)).unwrap();
    controller.register(OverlayKey::tooltip_target("c"), Rect::new(0, 0, 1, 1)).unwrap();

    assert_eq!(controller.clear(), 3);
    assert!(controller.registry().is_empty());
    assert_eq!(window.element_count(), 0);
    assert_eq!(controller.clear(), 0);
}
