//! Integration tests: container resizes while annotations are on screen.

use mk_core::{Annotation, AnnotationId, Geometry, Point, Viewport};
use mk_editor::{DragMode, InputEvent, MemoryStore, NoListeners, Overlay, OverlayMessage, dispatch};
use pretty_assertions::assert_eq;
use std::rc::Rc;

const VIEWPORT: Viewport = Viewport::new(800.0, 600.0);

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn overlay_with(annotations: impl IntoIterator<Item = Annotation>) -> Overlay {
    init_logging();
    let mut overlay = Overlay::new(VIEWPORT, Rc::new(NoListeners));
    for a in annotations {
        overlay.insert(a);
    }
    overlay
}

#[test]
fn resize_reprojects_from_relative() {
    let id = AnnotationId::intern("rs_note");
    let mut overlay = overlay_with([Annotation::new(
        id,
        Geometry::sticky_note(Point::new(400.0, 300.0), "centre", VIEWPORT),
    )]);

    let messages = overlay.set_viewport(Viewport::new(400.0, 300.0));
    assert_eq!(messages.len(), 1);
    let note = overlay.get(id).unwrap();
    assert_eq!(note.geometry.anchor_points().to_vec(), vec![Point::new(200.0, 150.0)]);
    assert!(note.is_consistent(Viewport::new(400.0, 300.0)));

    // Back to the original size, back to the original pixels
    overlay.set_viewport(VIEWPORT);
    assert_eq!(
        overlay.get(id).unwrap().geometry.anchor_points().to_vec(),
        vec![Point::new(400.0, 300.0)]
    );
}

#[test]
fn resize_updates_reach_the_store() {
    let a = Annotation::new(
        AnnotationId::intern("rs_arrow"),
        Geometry::arrow(Point::new(80.0, 60.0), Point::new(720.0, 540.0), VIEWPORT),
    );
    let b = Annotation::new(
        AnnotationId::intern("rs_stamp"),
        Geometry::stamp(Point::new(200.0, 120.0), Point::new(400.0, 240.0), "OK", VIEWPORT),
    );
    let mut store = MemoryStore::new();
    dispatch(
        [OverlayMessage::update(&a), OverlayMessage::update(&b)],
        &mut store,
    );
    let mut overlay = overlay_with([a, b]);

    // Same size again: nothing moved, nothing to report
    assert!(overlay.set_viewport(VIEWPORT).is_empty());

    dispatch(overlay.set_viewport(Viewport::new(1600.0, 1200.0)), &mut store);
    let stored: Vec<_> = store
        .iter()
        .map(|a| a.geometry.anchor_points().to_vec())
        .collect();
    assert_eq!(
        stored,
        vec![
            vec![Point::new(160.0, 120.0), Point::new(1440.0, 1080.0)],
            vec![Point::new(400.0, 240.0), Point::new(800.0, 480.0)],
        ]
    );
}

#[test]
fn resize_mid_drag_ends_the_session() {
    let id = AnnotationId::intern("rs_drag");
    let mut overlay = overlay_with([Annotation::new(
        id,
        Geometry::highlighter(Point::new(100.0, 100.0), Point::new(200.0, 150.0), VIEWPORT),
    )]);

    overlay.handle(&InputEvent::pointer_down(150.0, 125.0));
    assert_eq!(overlay.active_session(), Some((id, DragMode::DraggingWhole)));

    overlay.set_viewport(Viewport::new(400.0, 300.0));
    assert_eq!(overlay.active_session(), None);
    // The stale gesture no longer moves anything
    assert!(overlay.handle(&InputEvent::pointer_move(180.0, 125.0)).is_empty());
    assert_eq!(
        overlay.get(id).unwrap().geometry.anchor_points().to_vec(),
        vec![Point::new(50.0, 50.0), Point::new(100.0, 75.0)]
    );
}

#[test]
fn unmeasured_container_keeps_geometry() {
    let id = AnnotationId::intern("rs_unmeasured");
    let original = Annotation::new(
        id,
        Geometry::arrow(Point::new(100.0, 100.0), Point::new(300.0, 100.0), VIEWPORT),
    );
    let mut overlay = overlay_with([original.clone()]);

    assert!(overlay.set_viewport(Viewport::new(0.0, 0.0)).is_empty());
    assert_eq!(overlay.get(id), Some(&original));

    // Moves are skipped until the host measures again
    overlay.handle(&InputEvent::pointer_down(150.0, 100.0));
    assert!(overlay.handle(&InputEvent::pointer_move(160.0, 100.0)).is_empty());
    assert_eq!(overlay.get(id), Some(&original));

    // Measuring the same size again resumes the gesture where it stands
    assert!(overlay.set_viewport(VIEWPORT).is_empty());
    assert_eq!(overlay.active_session(), Some((id, DragMode::DraggingWhole)));
    let messages = overlay.handle(&InputEvent::pointer_move(160.0, 100.0));
    assert_eq!(messages.len(), 1);
    assert_eq!(
        overlay.get(id).unwrap().geometry.anchor_points().to_vec(),
        vec![Point::new(110.0, 100.0), Point::new(310.0, 100.0)]
    );
}

#[test]
fn repeated_size_report_is_ignored() {
    let id = AnnotationId::intern("rs_repeat");
    let mut overlay = overlay_with([Annotation::new(
        id,
        Geometry::arrow(Point::new(100.0, 100.0), Point::new(300.0, 100.0), VIEWPORT),
    )]);

    overlay.handle(&InputEvent::pointer_down(300.0, 100.0));
    overlay.handle(&InputEvent::pointer_move(320.0, 120.0));
    for _ in 0..3 {
        assert!(overlay.set_viewport(VIEWPORT).is_empty());
    }
    assert_eq!(overlay.active_session(), Some((id, DragMode::DraggingEndpointB)));
    overlay.handle(&InputEvent::pointer_move(340.0, 140.0));
    assert_eq!(
        overlay.get(id).unwrap().geometry.anchor_points().to_vec(),
        vec![Point::new(100.0, 100.0), Point::new(340.0, 140.0)]
    );
}
