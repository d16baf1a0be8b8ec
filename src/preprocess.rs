//! Canvas → classifier input.
//!
//! The pipeline is: resize the 280×280 RGBA raster to 28×28 (per channel,
//! rounded back to u8), collapse to one luminance channel, lay the result out
//! as a (1, 28, 28, 1) tensor and divide by 255.  Every step works on u8
//! intermediates so the output matches the classic resize-then-cvtColor
//! pipeline bit for bit.

use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::canvas::RawCanvasImage;

/// Side length of the classifier's input grid.
pub const INPUT_SIZE: u32 = 28;

/// Fixed-point luminance weights (14 fractional bits, summing to 1 << 14).
const GRAY_SHIFT: u32 = 14;
const GRAY_R: u32 = 4899;
const GRAY_G: u32 = 9617;
const GRAY_B: u32 = 1868;

/// How the first three raster channels are interpreted before the
/// luminance conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    /// Channel 0 is blue, channel 2 is red.
    #[default]
    Bgr,
    /// Channel 0 is red, channel 2 is blue.
    Rgb,
}

/// Downsampling filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    /// Bilinear with half-pixel centres.
    #[default]
    Linear,
    /// Box average over the covered source area.
    Area,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreprocessOptions {
    #[serde(default)]
    pub interpolation: Interpolation,
    #[serde(default)]
    pub channel_order: ChannelOrder,
}

/// A (1, 28, 28, 1) tensor of values in [0, 1], stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTensor {
    data: Vec<f64>,
}

impl NormalizedTensor {
    /// Batch, rows, columns, channels.
    pub const SHAPE: [usize; 4] = [1, INPUT_SIZE as usize, INPUT_SIZE as usize, 1];

    pub fn shape(&self) -> [usize; 4] {
        Self::SHAPE
    }

    /// The flat view fed to the first dense layer.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Element at `[0, row, col, 0]`.
    pub fn at(&self, row: usize, col: usize) -> f64 {
        self.data[row * INPUT_SIZE as usize + col]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Runs the pipeline when there is something to run it on.  `None` means
/// "no drawing" and is passed straight through.
pub fn prepare(canvas: Option<&RawCanvasImage>, options: &PreprocessOptions) -> Option<NormalizedTensor> {
    canvas.map(|c| preprocess(c, options))
}

/// Converts a canvas raster into the classifier's input tensor.
pub fn preprocess(canvas: &RawCanvasImage, options: &PreprocessOptions) -> NormalizedTensor {
    let small = match options.interpolation {
        Interpolation::Linear => resize_linear(canvas.image(), INPUT_SIZE, INPUT_SIZE),
        Interpolation::Area   => resize_area(canvas.image(), INPUT_SIZE, INPUT_SIZE),
    };

    let data = small
        .pixels()
        .map(|p| luminance(p, options.channel_order) as f64 / 255.0)
        .collect();

    NormalizedTensor { data }
}

fn luminance(p: &Rgba<u8>, order: ChannelOrder) -> u8 {
    let [c0, c1, c2, _] = p.0;
    let (r, g, b) = match order {
        ChannelOrder::Bgr => (c2, c1, c0),
        ChannelOrder::Rgb => (c0, c1, c2),
    };
    let acc = r as u32 * GRAY_R + g as u32 * GRAY_G + b as u32 * GRAY_B + (1 << (GRAY_SHIFT - 1));
    (acc >> GRAY_SHIFT) as u8
}

/// Source sample position and weight of the upper neighbour for one
/// destination coordinate, clamped at the borders.
fn linear_tap(dst: u32, scale: f64, src_len: u32) -> (u32, u32, f64) {
    let pos = (dst as f64 + 0.5) * scale - 0.5;
    if pos <= 0.0 {
        return (0, 0, 0.0);
    }
    let lo = pos.floor() as u32;
    if lo >= src_len - 1 {
        return (src_len - 1, src_len - 1, 0.0);
    }
    (lo, lo + 1, pos - lo as f64)
}

fn resize_linear(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    let sx = sw as f64 / width as f64;
    let sy = sh as f64 / height as f64;

    RgbaImage::from_fn(width, height, |x, y| {
        let (x0, x1, fx) = linear_tap(x, sx, sw);
        let (y0, y1, fy) = linear_tap(y, sy, sh);
        let (p00, p10) = (src.get_pixel(x0, y0).0, src.get_pixel(x1, y0).0);
        let (p01, p11) = (src.get_pixel(x0, y1).0, src.get_pixel(x1, y1).0);

        let mut out = [0u8; 4];
        for c in 0..4 {
            let top = p00[c] as f64 * (1.0 - fx) + p10[c] as f64 * fx;
            let bottom = p01[c] as f64 * (1.0 - fx) + p11[c] as f64 * fx;
            out[c] = to_u8(top * (1.0 - fy) + bottom * fy);
        }
        Rgba(out)
    })
}

/// Overlap of source cell `i` with the interval `[start, end)`.
fn coverage(i: u32, start: f64, end: f64) -> f64 {
    let lo = (i as f64).max(start);
    let hi = ((i + 1) as f64).min(end);
    (hi - lo).max(0.0)
}

fn resize_area(src: &RgbaImage, width: u32, height: u32) -> RgbaImage {
    let (sw, sh) = src.dimensions();
    let sx = sw as f64 / width as f64;
    let sy = sh as f64 / height as f64;

    RgbaImage::from_fn(width, height, |x, y| {
        let (x_start, x_end) = (x as f64 * sx, (x + 1) as f64 * sx);
        let (y_start, y_end) = (y as f64 * sy, (y + 1) as f64 * sy);

        let mut acc = [0.0f64; 4];
        let mut total = 0.0;
        for j in (y_start.floor() as u32)..(y_end.ceil() as u32).min(sh) {
            let wy = coverage(j, y_start, y_end);
            for i in (x_start.floor() as u32)..(x_end.ceil() as u32).min(sw) {
                let w = wy * coverage(i, x_start, x_end);
                let p = src.get_pixel(i, j).0;
                for c in 0..4 {
                    acc[c] += p[c] as f64 * w;
                }
                total += w;
            }
        }

        let mut out = [0u8; 4];
        for c in 0..4 {
            out[c] = to_u8(acc[c] / total);
        }
        Rgba(out)
    })
}

fn to_u8(v: f64) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::STROKE_WIDTH;

    #[test]
    fn absent_canvas_yields_no_tensor() {
        assert!(prepare(None, &PreprocessOptions::default()).is_none());
    }

    #[test]
    fn output_has_batch_row_col_channel_shape() {
        let tensor = preprocess(&RawCanvasImage::blank(), &PreprocessOptions::default());
        assert_eq!(tensor.shape(), [1, 28, 28, 1]);
        assert_eq!(tensor.len(), 784);
    }

    #[test]
    fn black_and_white_extremes() {
        for interpolation in [Interpolation::Linear, Interpolation::Area] {
            let opts = PreprocessOptions { interpolation, ..Default::default() };
            let black = preprocess(&RawCanvasImage::filled([0, 0, 0, 0]), &opts);
            assert!(black.as_slice().iter().all(|&v| v == 0.0));
            let white = preprocess(&RawCanvasImage::filled([255, 255, 255, 255]), &opts);
            assert!(white.as_slice().iter().all(|&v| v == 1.0));
        }
    }

    #[test]
    fn luminance_respects_channel_order() {
        let px = Rgba([255, 0, 0, 255]);
        // Channel 0 read as blue: round(255 * 0.114) = 29.
        assert_eq!(luminance(&px, ChannelOrder::Bgr), 29);
        // Channel 0 read as red: round(255 * 0.299) = 76.
        assert_eq!(luminance(&px, ChannelOrder::Rgb), 76);
        assert_eq!(luminance(&Rgba([0, 255, 0, 0]), ChannelOrder::Bgr), 150);
    }

    #[test]
    fn alpha_is_ignored() {
        let opaque = preprocess(&RawCanvasImage::filled([40, 80, 120, 255]), &PreprocessOptions::default());
        let clear = preprocess(&RawCanvasImage::filled([40, 80, 120, 0]), &PreprocessOptions::default());
        assert_eq!(opaque, clear);
    }

    #[test]
    fn linear_samples_the_two_central_source_pixels() {
        // Destination pixel 0 maps to source position 4.5, halfway between
        // columns 4 and 5.  Only column 4 of each row is lit.
        let mut img = RgbaImage::from_pixel(280, 280, Rgba([0, 0, 0, 255]));
        for y in 0..280 {
            img.put_pixel(4, y, Rgba([255, 255, 255, 255]));
        }
        let canvas = RawCanvasImage::from_image(img).unwrap();
        let tensor = preprocess(&canvas, &PreprocessOptions::default());
        // (255 + 0) / 2 = 127.5 rounds to 128.
        assert_eq!(tensor.at(0, 0), 128.0 / 255.0);
        assert_eq!(tensor.at(0, 1), 0.0);
    }

    #[test]
    fn area_averages_the_whole_block() {
        let mut img = RgbaImage::from_pixel(280, 280, Rgba([0, 0, 0, 255]));
        for y in 0..10 {
            img.put_pixel(9, y, Rgba([255, 255, 255, 255]));
        }
        let canvas = RawCanvasImage::from_image(img).unwrap();
        let opts = PreprocessOptions { interpolation: Interpolation::Area, ..Default::default() };
        let tensor = preprocess(&canvas, &opts);
        // 10 of 100 source pixels lit: 25.5 rounds to 26.
        assert_eq!(tensor.at(0, 0), 26.0 / 255.0);
        assert_eq!(tensor.at(1, 0), 0.0);
    }

    #[test]
    fn strokes_survive_downsampling_without_gaps() {
        let mut canvas = RawCanvasImage::blank();
        canvas.paint_stroke(&[(40.0, 140.0), (240.0, 140.0)], STROKE_WIDTH);
        let tensor = preprocess(&canvas, &PreprocessOptions::default());
        for col in 5..23 {
            assert!(tensor.at(13, col) > 0.9 || tensor.at(14, col) > 0.9, "gap at column {col}");
        }
    }
}
