use std::path::Path;
use std::sync::mpsc;
use std::thread;

use image::{ImageFormat, Rgba, RgbaImage};
use tracing::{debug, info};

use crate::consts::MARKER_RADIUS_FRACTION;
use crate::error::{KasuriError, Result};
use crate::markers::Marker;
use crate::raster::{RectifiedRaster, SourceImage};

/// Decode an encoded photo (any format the `image` crate reads) into a
/// source image recorded under `reference`.
pub fn decode_image(reference: impl Into<String>, bytes: &[u8]) -> Result<SourceImage> {
    let img = image::load_from_memory(bytes)?;
    let rgba = img.to_rgba8();
    debug!(width = rgba.width(), height = rgba.height(), "Decoded source image");
    SourceImage::new(reference, rgba)
}

/// Load a photo from disk. The path becomes the image reference.
pub fn load_image(path: &Path) -> Result<SourceImage> {
    let img = image::open(path)?;
    let rgba = img.to_rgba8();
    info!(
        path = %path.display(),
        width = rgba.width(),
        height = rgba.height(),
        "Loaded source image"
    );
    SourceImage::new(path.display().to_string(), rgba)
}

/// Decode on a worker thread. The receiver yields exactly one result.
pub fn decode_in_background(
    reference: impl Into<String>,
    bytes: Vec<u8>,
) -> mpsc::Receiver<Result<SourceImage>> {
    let (tx, rx) = mpsc::channel();
    let reference = reference.into();
    thread::spawn(move || {
        let _ = tx.send(decode_image(reference, &bytes));
    });
    rx
}

/// A pending background decode, tagged with the generation of the request
/// that started it. See `Workspace::begin_decode`.
#[derive(Debug)]
pub struct DecodeTicket {
    generation: u64,
    receiver: mpsc::Receiver<Result<SourceImage>>,
}

impl DecodeTicket {
    pub(crate) fn spawn(generation: u64, reference: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            generation,
            receiver: decode_in_background(reference, bytes),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Block until the decode finishes.
    pub fn wait(self) -> DecodeOutput {
        let result = self
            .receiver
            .recv()
            .unwrap_or(Err(KasuriError::DecodeAbandoned));
        DecodeOutput {
            generation: self.generation,
            result,
        }
    }

    /// Non-blocking poll. `None` while the decode is still running.
    pub fn try_wait(&self) -> Option<DecodeOutput> {
        let result = match self.receiver.try_recv() {
            Ok(result) => result,
            Err(mpsc::TryRecvError::Empty) => return None,
            Err(mpsc::TryRecvError::Disconnected) => Err(KasuriError::DecodeAbandoned),
        };
        Some(DecodeOutput {
            generation: self.generation,
            result,
        })
    }
}

/// A finished decode, still carrying its request generation.
#[derive(Debug)]
pub struct DecodeOutput {
    generation: u64,
    result: Result<SourceImage>,
}

impl DecodeOutput {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn into_result(self) -> Result<SourceImage> {
        self.result
    }
}

/// Save the rectified raster as 8-bit RGBA PNG.
pub fn save_raster_png(raster: &RectifiedRaster, path: &Path) -> Result<()> {
    raster.image().save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save a copy of the raster with every marker drawn as a yellow dot with a
/// dark outline.
pub fn save_marked_png(raster: &RectifiedRaster, markers: &[Marker], path: &Path) -> Result<()> {
    let img = draw_markers(raster.image(), markers);
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Burn marker dots into a copy of `image`.
pub fn draw_markers(image: &RgbaImage, markers: &[Marker]) -> RgbaImage {
    let mut out = image.clone();
    let (w, h) = out.dimensions();
    let radius = (w as f64 * MARKER_RADIUS_FRACTION).max(2.0);
    let outline = (radius / 4.0).max(1.0);
    let fill = Rgba([255, 255, 0, 255]);
    let edge = Rgba([0, 0, 0, 255]);

    for m in markers {
        let cx = m.normalized_x * w as f64;
        let cy = m.normalized_y * h as f64;
        let reach = (radius + outline).ceil() as i64;
        for dy in -reach..=reach {
            for dx in -reach..=reach {
                let px = cx.floor() as i64 + dx;
                let py = cy.floor() as i64 + dy;
                if px < 0 || py < 0 || px >= w as i64 || py >= h as i64 {
                    continue;
                }
                let d = ((px as f64 + 0.5 - cx).powi(2) + (py as f64 + 0.5 - cy).powi(2)).sqrt();
                if d <= radius {
                    out.put_pixel(px as u32, py as u32, fill);
                } else if d <= radius + outline {
                    out.put_pixel(px as u32, py as u32, edge);
                }
            }
        }
    }
    out
}
