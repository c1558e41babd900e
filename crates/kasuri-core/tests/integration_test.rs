#[allow(dead_code)]
mod common;

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use kasuri_core::config::EngineConfig;
use kasuri_core::error::KasuriError;
use kasuri_core::geometry::{CalibrationQuad, Corner, Point2};
use kasuri_core::grid::{GridField, GridSpec};
use kasuri_core::io::image_io::{decode_image, load_image, save_marked_png};
use kasuri_core::io::session_file::{load_session, save_session};
use kasuri_core::rectify::CacheStatus;
use kasuri_core::viewport::{InteractionMode, PointerEvent, ViewSize};
use kasuri_core::workspace::Workspace;

/// Tall 100x200 photo, default quad, 10x5 grid, 400x400 viewport.
fn measuring_workspace() -> Workspace {
    let mut ws = Workspace::default();
    ws.load_image(common::coordinate_source(100, 200));
    ws.set_grid(GridSpec::new(10, 5).unwrap());
    ws.set_container(ViewSize::new(400.0, 400.0));
    ws.refresh_raster().unwrap();
    ws
}

#[test]
fn test_end_to_end_center_tap() {
    let mut ws = measuring_workspace();

    // Default quad has equal edges in normalized units.
    let raster = ws.raster().unwrap();
    assert_eq!((raster.width(), raster.height()), (800, 800));

    assert!(ws.handle_pointer(PointerEvent::start(200.0, 200.0)).is_none());
    let marker = ws
        .handle_pointer(PointerEvent::end(200.0, 200.0))
        .expect("tap commits a marker");

    assert_eq!((marker.normalized_x, marker.normalized_y), (0.5, 0.5));
    assert_eq!((marker.row_index, marker.col_index), (5, 3));
    assert_eq!(ws.markers().len(), 1);
}

#[test]
fn test_drags_and_view_changes_rebuild_once() {
    let mut ws = Workspace::default();
    ws.load_image(common::solid_source(120, 80));
    ws.set_container(ViewSize::new(300.0, 300.0));

    let p = Point2::new(0.1, 0.12);
    for _ in 0..10 {
        ws.drag_corner(p);
        ws.refresh_raster().unwrap();
    }

    ws.viewport_mut().zoom_by(2.0);
    ws.viewport_mut().pan_by(15.0, -4.0);
    ws.viewport_mut().zoom_by(0.75);
    ws.viewport_mut().set_mode(InteractionMode::Pan);
    ws.handle_pointer(PointerEvent::start(10.0, 10.0));
    ws.handle_pointer(PointerEvent::moved(40.0, 30.0));
    assert_eq!(ws.refresh_raster().unwrap(), CacheStatus::Fresh);

    assert_eq!(ws.cache().rebuild_count(), 1);
}

#[test]
fn test_degenerate_drag_keeps_measuring_on_old_raster() {
    let mut ws = measuring_workspace();
    let before = ws.raster().unwrap();

    // Collapse the bottom-right corner onto the top edge.
    ws.quad_mut().set_corner(Corner::BottomRight, Point2::new(0.5, 0.2));
    let err = ws.refresh_raster().unwrap_err();
    assert!(matches!(err, KasuriError::DegenerateGeometry(_)));

    assert!(std::sync::Arc::ptr_eq(&before, &ws.raster().unwrap()));
    ws.handle_pointer(PointerEvent::start(200.0, 200.0));
    assert!(ws.handle_pointer(PointerEvent::end(200.0, 200.0)).is_some());
}

#[test]
fn test_tap_before_first_rebuild_is_ignored() {
    let mut ws = Workspace::default();
    ws.set_container(ViewSize::new(400.0, 400.0));
    assert!(ws.handle_pointer(PointerEvent::start(300.0, 300.0)).is_none());
    assert!(ws.handle_pointer(PointerEvent::end(300.0, 300.0)).is_none());

    ws.load_image(common::solid_source(100, 100));
    assert!(ws.handle_pointer(PointerEvent::start(300.0, 300.0)).is_none());
    assert!(ws.handle_pointer(PointerEvent::end(300.0, 300.0)).is_none());
    assert!(ws.markers().is_empty());
}

#[test]
fn test_tap_after_new_image_waits_for_refresh() {
    let mut ws = measuring_workspace();
    ws.load_image(common::solid_source(60, 60));

    assert!(ws.handle_pointer(PointerEvent::start(200.0, 200.0)).is_none());
    assert!(ws.handle_pointer(PointerEvent::end(200.0, 200.0)).is_none());
    assert!(ws.markers().is_empty());

    ws.refresh_raster().unwrap();
    ws.handle_pointer(PointerEvent::start(200.0, 200.0));
    assert!(ws.handle_pointer(PointerEvent::end(200.0, 200.0)).is_some());
    assert_eq!(ws.markers().len(), 1);
}

#[test]
fn test_refresh_without_image_fails() {
    let mut ws = Workspace::default();
    assert!(matches!(
        ws.refresh_raster(),
        Err(KasuriError::NoSourceImage)
    ));
}

#[test]
fn test_grid_change_does_not_touch_existing_markers() {
    let mut ws = measuring_workspace();
    ws.add_marker_at(Point2::new(0.5, 0.5));
    ws.set_grid_text(GridField::Rows, "100").unwrap();
    assert!(ws.set_grid_text(GridField::Cols, "zero").is_err());

    let second = ws.add_marker_at(Point2::new(0.5, 0.5));
    assert_eq!((second.row_index, second.col_index), (50, 3));
    assert_eq!(ws.markers().get(0).map(|m| m.row_index), Some(5));
}

#[test]
fn test_marker_from_source_point_uses_forward_homography() {
    let mut ws = Workspace::default();
    ws.load_image(common::solid_source(100, 100));

    // Default quad spans 0.2..0.8, so (0.35, 0.65) sits at (0.25, 0.75).
    let marker = ws
        .add_marker_from_source_point(Point2::new(0.35, 0.65))
        .unwrap();
    assert_abs_diff_eq!(marker.normalized_x, 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(marker.normalized_y, 0.75, epsilon = 1e-9);
    assert_eq!((marker.row_index, marker.col_index), (24, 20));
    assert_eq!(ws.markers().len(), 1);
}

#[test]
fn test_older_decode_finishing_last_is_discarded() {
    let mut ws = Workspace::default();
    let first = common::png_bytes(&common::solid_bitmap(10, 10, [1, 1, 1, 255]));
    let second = common::png_bytes(&common::solid_bitmap(20, 20, [2, 2, 2, 255]));

    let older = ws.begin_decode("mem://first.png", first);
    let newer = ws.begin_decode("mem://second.png", second);

    assert!(ws.finish_decode(newer.wait()).unwrap());
    assert!(!ws.finish_decode(older.wait()).unwrap());
    assert_eq!(ws.image_reference(), "mem://second.png");
    assert_eq!(ws.source().map(|s| s.width()), Some(20));
}

#[test]
fn test_stale_decode_error_is_dropped() {
    let mut ws = Workspace::default();
    let older = ws.begin_decode("mem://broken", b"not an image".to_vec());
    let newer = ws.begin_decode(
        "mem://good.png",
        common::png_bytes(&common::solid_bitmap(8, 8, [0, 0, 0, 255])),
    );

    assert!(!ws.finish_decode(older.wait()).unwrap());
    assert!(ws.source().is_none());
    assert!(ws.finish_decode(newer.wait()).unwrap());
    assert_eq!(ws.image_reference(), "mem://good.png");
}

#[test]
fn test_direct_load_supersedes_pending_decode() {
    let mut ws = Workspace::default();
    let pending = ws.begin_decode(
        "mem://late.png",
        common::png_bytes(&common::solid_bitmap(8, 8, [0, 0, 0, 255])),
    );
    ws.load_image(common::solid_source(30, 30));

    assert!(!ws.finish_decode(pending.wait()).unwrap());
    assert_eq!(ws.source().map(|s| s.width()), Some(30));
}

#[test]
fn test_current_decode_error_is_reported() {
    let mut ws = Workspace::default();
    let ticket = ws.begin_decode("mem://broken", b"not an image".to_vec());
    let err = ws.finish_decode(ticket.wait()).unwrap_err();
    assert!(matches!(err, KasuriError::ImageError(_)));
}

#[test]
fn test_new_image_resets_quad_and_markers() {
    let mut ws = measuring_workspace();
    ws.drag_corner(Point2::new(0.05, 0.05));
    ws.add_marker_at(Point2::new(0.2, 0.2));

    ws.load_image(common::solid_source(50, 50));
    assert_eq!(*ws.quad(), CalibrationQuad::default());
    assert!(ws.markers().is_empty());
    assert_eq!(ws.refresh_raster().unwrap(), CacheStatus::Rebuilt);
}

#[test]
fn test_session_save_restore_cycle() {
    let tmp = TempDir::new().unwrap();
    let photo = tmp.path().join("sheet.png");
    common::coordinate_bitmap(100, 200).save(&photo).unwrap();
    let session_path = tmp.path().join("sheet.json");

    let mut ws = Workspace::default();
    ws.load_image(load_image(&photo).unwrap());
    ws.set_grid(GridSpec::new(10, 5).unwrap());
    ws.drag_corner(Point2::new(0.15, 0.1));
    ws.add_marker_at(Point2::new(0.3, 0.6));
    ws.add_marker_at(Point2::new(0.9, 0.1));
    save_session(&ws.to_session(), &session_path).unwrap();

    let session = load_session(&session_path).unwrap();
    let mut restored = Workspace::restore(EngineConfig::default(), session).unwrap();
    let photo_again = load_image(std::path::Path::new(restored.image_reference())).unwrap();
    restored.attach_image(photo_again);

    assert_eq!(restored.quad(), ws.quad());
    assert_eq!(restored.grid(), ws.grid());
    assert_eq!(restored.markers().to_vec(), ws.markers().to_vec());
    assert_eq!(restored.refresh_raster().unwrap(), CacheStatus::Rebuilt);

    let out = tmp.path().join("marked.png");
    save_marked_png(&restored.raster().unwrap(), &restored.marker_snapshot(), &out).unwrap();
    let bytes = std::fs::read(&out).unwrap();
    let decoded = decode_image("marked", &bytes).unwrap();
    assert_eq!(decoded.width(), 800);
}
