#[allow(dead_code)]
mod common;

use std::sync::Arc;

use tempfile::TempDir;

use kasuri_core::config::RasterConfig;
use kasuri_core::error::KasuriError;
use kasuri_core::geometry::Point2;
use kasuri_core::grid::GridSpec;
use kasuri_core::io::image_io::{
    decode_image, decode_in_background, draw_markers, load_image, save_raster_png,
};
use kasuri_core::markers::Marker;
use kasuri_core::raster::SourceImage;
use kasuri_core::rectify::RectificationCache;

#[test]
fn test_decode_png_bytes() {
    let bitmap = common::coordinate_bitmap(30, 20);
    let img = decode_image("mem://a.png", &common::png_bytes(&bitmap)).unwrap();
    assert_eq!((img.width(), img.height()), (30, 20));
    assert_eq!(img.reference(), "mem://a.png");
    assert_eq!(img.bitmap().get_pixel(7, 3).0, bitmap.get_pixel(7, 3).0);
}

#[test]
fn test_decode_garbage_is_image_error() {
    let err = decode_image("mem://bad", b"definitely not an image").unwrap_err();
    assert!(matches!(err, KasuriError::ImageError(_)));
}

#[test]
fn test_decode_in_background_delivers_one_result() {
    let bytes = common::png_bytes(&common::solid_bitmap(8, 8, [1, 2, 3, 255]));
    let rx = decode_in_background("mem://bg.png", bytes);
    let img = rx.recv().unwrap().unwrap();
    assert_eq!(img.width(), 8);
    assert!(rx.recv().is_err());
}

#[test]
fn test_each_decode_gets_a_new_id() {
    let bytes = common::png_bytes(&common::solid_bitmap(4, 4, [0, 0, 0, 255]));
    let a = decode_image("same", &bytes).unwrap();
    let b = decode_image("same", &bytes).unwrap();
    assert_ne!(a.id(), b.id());
}

#[test]
fn test_empty_bitmap_rejected() {
    let err = SourceImage::new("empty", image::RgbaImage::new(0, 10)).unwrap_err();
    assert!(matches!(
        err,
        KasuriError::InvalidDimensions { width: 0, height: 10 }
    ));
}

#[test]
fn test_load_image_records_path() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("photo.png");
    common::solid_bitmap(12, 6, [9, 9, 9, 255]).save(&path).unwrap();

    let img = load_image(&path).unwrap();
    assert_eq!(img.reference(), path.display().to_string());
    assert_eq!((img.width(), img.height()), (12, 6));
}

#[test]
fn test_save_raster_png_writes_rgba() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("rectified.png");

    let source = Arc::new(common::solid_source(40, 40));
    let mut cache = RectificationCache::new(RasterConfig {
        target_width: 64,
        max_height: 512,
    });
    cache
        .update(&source, &common::rect_quad(0.0, 0.0, 1.0, 0.5))
        .unwrap();
    let raster = cache.raster().unwrap();
    save_raster_png(&raster, &path).unwrap();

    let reloaded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(reloaded.dimensions(), (64, 32));
    assert_eq!(reloaded.get_pixel(10, 10).0, [200, 100, 50, 255]);
}

#[test]
fn test_draw_markers_paints_dot_with_outline() {
    let base = common::solid_bitmap(100, 100, [255, 255, 255, 255]);
    let marker = Marker::at(Point2::new(0.5, 0.5), &GridSpec::default());

    let out = draw_markers(&base, &[marker]);
    assert_eq!(out.get_pixel(50, 50).0, [255, 255, 0, 255]);
    assert_eq!(out.get_pixel(52, 50).0, [0, 0, 0, 255]);
    assert_eq!(out.get_pixel(0, 0).0, [255, 255, 255, 255]);
    // The input is left untouched.
    assert_eq!(base.get_pixel(50, 50).0, [255, 255, 255, 255]);
}

#[test]
fn test_draw_markers_at_edge_does_not_panic() {
    let base = common::solid_bitmap(10, 10, [0, 0, 0, 255]);
    let grid = GridSpec::default();
    let markers = [
        Marker::at(Point2::new(0.0, 0.0), &grid),
        Marker::at(Point2::new(1.0, 1.0), &grid),
    ];
    let out = draw_markers(&base, &markers);
    assert_eq!(out.get_pixel(0, 0).0, [255, 255, 0, 255]);
}
