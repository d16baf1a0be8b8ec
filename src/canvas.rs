//! The raster captured from the browser drawing surface.

use image::{Rgba, RgbaImage};
use thiserror::Error;

/// Side length of the drawing surface in pixels.
pub const CANVAS_SIZE: u32 = 280;

/// Channels per canvas position (RGBA as delivered by `getImageData`).
pub const CANVAS_CHANNELS: usize = 4;

/// Width of the browser brush, in canvas pixels.
pub const STROKE_WIDTH: f32 = 15.0;

/// A raster that does not have the shape the drawing surface promises.
#[derive(Error, Debug, PartialEq)]
pub enum CanvasError {
    #[error("canvas must be {expected}x{expected}, got {width}x{height}")]
    Dimensions { expected: u32, width: u32, height: u32 },

    #[error("raster has {got} bytes, expected {expected} ({size}x{size}x4)")]
    Length { expected: usize, got: usize, size: u32 },
}

/// A 280×280×4 u8 snapshot of the drawing surface.
///
/// Construction validates the shape, so every `RawCanvasImage` in the
/// program is a well-formed raster.
#[derive(Debug, Clone, PartialEq)]
pub struct RawCanvasImage {
    pixels: RgbaImage,
}

impl RawCanvasImage {
    /// An empty (all black, opaque) canvas, identical to a fresh page load.
    pub fn blank() -> RawCanvasImage {
        RawCanvasImage::filled([0, 0, 0, 255])
    }

    /// A canvas with every position set to `pixel`.
    pub fn filled(pixel: [u8; 4]) -> RawCanvasImage {
        RawCanvasImage {
            pixels: RgbaImage::from_pixel(CANVAS_SIZE, CANVAS_SIZE, Rgba(pixel)),
        }
    }

    /// Wraps raw interleaved bytes (row-major, 4 channels per position) as
    /// posted by the page.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<RawCanvasImage, CanvasError> {
        let expected = (CANVAS_SIZE * CANVAS_SIZE) as usize * CANVAS_CHANNELS;
        if bytes.len() != expected {
            return Err(CanvasError::Length { expected, got: bytes.len(), size: CANVAS_SIZE });
        }
        let pixels = RgbaImage::from_raw(CANVAS_SIZE, CANVAS_SIZE, bytes)
            .ok_or(CanvasError::Length { expected, got: 0, size: CANVAS_SIZE })?;
        Ok(RawCanvasImage { pixels })
    }

    /// Wraps an existing image, rejecting anything that is not 280×280.
    pub fn from_image(pixels: RgbaImage) -> Result<RawCanvasImage, CanvasError> {
        let (width, height) = pixels.dimensions();
        if width != CANVAS_SIZE || height != CANVAS_SIZE {
            return Err(CanvasError::Dimensions { expected: CANVAS_SIZE, width, height });
        }
        Ok(RawCanvasImage { pixels })
    }

    pub fn image(&self) -> &RgbaImage {
        &self.pixels
    }

    /// True if any position carries colour, i.e. the user drew something.
    /// Alpha is ignored because the background is opaque black.
    pub fn has_strokes(&self) -> bool {
        self.pixels.pixels().any(|p| p.0[..3].iter().any(|&c| c != 0))
    }

    /// Paints a white polyline with round caps and joins, the way the
    /// browser brush does for a freehand drag through `points`.
    pub fn paint_stroke(&mut self, points: &[(f32, f32)], width: f32) {
        let radius = width / 2.0;
        let segments: Vec<((f32, f32), (f32, f32))> = match points {
            [] => return,
            [p] => vec![(*p, *p)],
            _ => points.windows(2).map(|w| (w[0], w[1])).collect(),
        };

        for (a, b) in segments {
            let min_x = (a.0.min(b.0) - radius).floor().max(0.0) as u32;
            let max_x = (a.0.max(b.0) + radius).ceil().min((CANVAS_SIZE - 1) as f32) as u32;
            let min_y = (a.1.min(b.1) - radius).floor().max(0.0) as u32;
            let max_y = (a.1.max(b.1) + radius).ceil().min((CANVAS_SIZE - 1) as f32) as u32;

            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    let centre = (x as f32 + 0.5, y as f32 + 0.5);
                    if distance_to_segment(centre, a, b) <= radius {
                        self.pixels.put_pixel(x, y, Rgba([255, 255, 255, 255]));
                    }
                }
            }
        }
    }
}

fn distance_to_segment(p: (f32, f32), a: (f32, f32), b: (f32, f32)) -> f32 {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len_sq = dx * dx + dy * dy;
    let t = if len_sq == 0.0 {
        0.0
    } else {
        (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len_sq).clamp(0.0, 1.0)
    };
    let (cx, cy) = (a.0 + t * dx, a.1 + t * dy);
    ((p.0 - cx).powi(2) + (p.1 - cy).powi(2)).sqrt()
}
