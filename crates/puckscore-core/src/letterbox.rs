//! Aspect-preserving frame sampling.
//!
//! The camera frame is fitted into the working buffer the same way the
//! display fits it on screen (centered, uniform scale), so a buffer pixel
//! and a display pixel always refer to the same spot on the board. A
//! stretch-to-fill copy would warp positions differently along x and y.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::{sample_bilinear_rgba, RgbaImage, RgbaImageView};

/// Fill color for buffer pixels outside the letterbox rectangle.
pub const BACKGROUND: [u8; 4] = [0, 0, 0, 255];

/// Placement of the source frame inside the working buffer.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LetterboxRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Buffer pixels per source pixel.
    pub scale: f32,
}

impl LetterboxRect {
    /// Largest centered rectangle with the source aspect ratio.
    ///
    /// Any zero dimension yields an empty rectangle with `scale == 0`.
    pub fn fit(src_w: usize, src_h: usize, dst_w: usize, dst_h: usize) -> Self {
        if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
            return Self {
                x: 0.0,
                y: 0.0,
                width: 0.0,
                height: 0.0,
                scale: 0.0,
            };
        }
        let scale = (dst_w as f32 / src_w as f32).min(dst_h as f32 / src_h as f32);
        let width = src_w as f32 * scale;
        let height = src_h as f32 * scale;
        Self {
            x: 0.5 * (dst_w as f32 - width),
            y: 0.5 * (dst_h as f32 - height),
            width,
            height,
            scale,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.scale <= 0.0
    }

    /// Source pixel coordinates -> buffer pixel coordinates.
    ///
    /// Both frames put the origin at the center of pixel `(0, 0)`, matching
    /// the sampling in [`letterbox_into_buffer`] and blob centroids.
    pub fn to_buffer(&self, p: Point2<f32>) -> Point2<f32> {
        Point2::new(
            self.x + (p.x + 0.5) * self.scale - 0.5,
            self.y + (p.y + 0.5) * self.scale - 0.5,
        )
    }

    /// Buffer pixel coordinates -> source pixel coordinates.
    pub fn to_source(&self, p: Point2<f32>) -> Option<Point2<f32>> {
        if self.is_empty() {
            return None;
        }
        Some(Point2::new(
            (p.x + 0.5 - self.x) / self.scale - 0.5,
            (p.y + 0.5 - self.y) / self.scale - 0.5,
        ))
    }

    /// Integer pixel span `[x0, x1) x [y0, y1)` covered by the rectangle.
    pub fn pixel_span(&self) -> (usize, usize, usize, usize) {
        let x0 = self.x.round().max(0.0) as usize;
        let y0 = self.y.round().max(0.0) as usize;
        let x1 = (self.x + self.width).round().max(0.0) as usize;
        let y1 = (self.y + self.height).round().max(0.0) as usize;
        (x0, y0, x1, y1)
    }
}

/// Sample `src` into a new `dst_w x dst_h` buffer.
pub fn letterbox_into(
    src: &RgbaImageView<'_>,
    dst_w: usize,
    dst_h: usize,
) -> (RgbaImage, LetterboxRect) {
    let mut dst = RgbaImage::filled(dst_w, dst_h, BACKGROUND);
    let rect = letterbox_into_buffer(src, &mut dst);
    (dst, rect)
}

/// Sample `src` into an existing buffer, recomputing the rectangle for the
/// current source and buffer sizes.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(src, dst),
        fields(
            src_w = src.width,
            src_h = src.height,
            dst_w = dst.width,
            dst_h = dst.height
        )
    )
)]
pub fn letterbox_into_buffer(src: &RgbaImageView<'_>, dst: &mut RgbaImage) -> LetterboxRect {
    let rect = LetterboxRect::fit(src.width, src.height, dst.width, dst.height);
    for px in dst.data.chunks_exact_mut(4) {
        px.copy_from_slice(&BACKGROUND);
    }
    if rect.is_empty() {
        return rect;
    }

    let (x0, y0, x1, y1) = rect.pixel_span();
    let x1 = x1.min(dst.width);
    let y1 = y1.min(dst.height);
    let inv = 1.0 / rect.scale;

    for y in y0..y1 {
        // sample at buffer pixel center
        let sy = (y as f32 + 0.5 - rect.y) * inv - 0.5;
        for x in x0..x1 {
            let sx = (x as f32 + 0.5 - rect.x) * inv - 0.5;
            dst.put_pixel(x, y, sample_bilinear_rgba(src, sx, sy));
        }
    }
    rect
}
