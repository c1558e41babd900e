use kasuri_core::calibration::CalibrationEditor;
use kasuri_core::geometry::{CalibrationQuad, Corner, Point2};
use kasuri_core::viewport::{PointerEvent, ViewSize};

/// 100x200 photo in a 400x400 container: fit scale 2, 100px bars left and right.
fn editor() -> CalibrationEditor {
    CalibrationEditor::new(ViewSize::new(400.0, 400.0), ViewSize::new(100.0, 200.0))
}

#[test]
fn test_screen_image_mapping() {
    let ed = editor();
    assert_eq!(
        ed.screen_to_image(Point2::new(300.0, 400.0)),
        Point2::new(1.0, 1.0)
    );
    assert_eq!(
        ed.image_to_screen(Point2::new(0.2, 0.2)),
        Point2::new(140.0, 80.0)
    );
}

#[test]
fn test_drag_locks_the_grabbed_corner() {
    let mut ed = editor();
    let mut quad = CalibrationQuad::default();

    // Grab near the top-left handle.
    assert!(ed.handle_pointer(&mut quad, PointerEvent::start(150.0, 100.0)));
    assert_eq!(ed.active_corner(), Some(Corner::TopLeft));
    assert_eq!(quad.corner(Corner::TopLeft), Point2::new(0.25, 0.25));

    // Dragging past the top-right handle still moves the top-left slot.
    assert!(ed.handle_pointer(&mut quad, PointerEvent::moved(250.0, 40.0)));
    assert_eq!(quad.corner(Corner::TopLeft), Point2::new(0.75, 0.1));
    assert_eq!(quad.corner(Corner::TopRight), Point2::new(0.8, 0.2));

    assert!(!ed.handle_pointer(&mut quad, PointerEvent::end(250.0, 40.0)));
    assert!(ed.active_corner().is_none());
}

#[test]
fn test_move_without_grab_changes_nothing() {
    let mut ed = editor();
    let mut quad = CalibrationQuad::default();
    assert!(!ed.handle_pointer(&mut quad, PointerEvent::moved(150.0, 100.0)));
    assert_eq!(quad, CalibrationQuad::default());
}

#[test]
fn test_drag_outside_photo_is_clamped() {
    let mut ed = editor();
    let mut quad = CalibrationQuad::default();
    ed.handle_pointer(&mut quad, PointerEvent::start(300.0, 400.0));
    assert_eq!(ed.active_corner(), Some(Corner::BottomRight));
    ed.handle_pointer(&mut quad, PointerEvent::moved(390.0, 399.0));
    assert_eq!(quad.corner(Corner::BottomRight).x, 1.0);
}
