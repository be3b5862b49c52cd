//! Connected-component extraction and puck-shape filtering.
//!
//! Components are found with an iterative 4-connected flood fill: an explicit
//! index stack instead of recursion keeps memory bounded by the blob size
//! even for full-frame components.

use log::debug;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::mask::BinaryMask;
use crate::params::DetectionConfig;

/// Inclusive pixel bounding box.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl BoundingBox {
    #[inline]
    pub fn width(&self) -> usize {
        self.x1 - self.x0 + 1
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.y1 - self.y0 + 1
    }

    /// Width / height.
    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width() as f32 / self.height() as f32
    }
}

/// One connected component of a team mask.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Blob {
    pub centroid: Point2<f32>,
    pub area: usize,
    pub bbox: BoundingBox,
    /// Area / bounding-box area.
    pub circularity: f32,
    /// Radius of a disk with the same area. Sanity signal only; scoring
    /// uses the configured puck radius.
    pub radius: f32,
}

/// Reusable flood-fill working memory.
#[derive(Clone, Debug, Default)]
pub struct FloodScratch {
    visited: Vec<bool>,
    stack: Vec<usize>,
}

impl FloodScratch {
    fn reset(&mut self, len: usize) {
        self.visited.clear();
        self.visited.resize(len, false);
        self.stack.clear();
    }
}

struct Accumulator {
    area: usize,
    sum_x: f64,
    sum_y: f64,
    bbox: BoundingBox,
}

impl Accumulator {
    fn new(x: usize, y: usize) -> Self {
        Self {
            area: 0,
            sum_x: 0.0,
            sum_y: 0.0,
            bbox: BoundingBox {
                x0: x,
                y0: y,
                x1: x,
                y1: y,
            },
        }
    }

    #[inline]
    fn add(&mut self, x: usize, y: usize) {
        self.area += 1;
        self.sum_x += x as f64;
        self.sum_y += y as f64;
        self.bbox.x0 = self.bbox.x0.min(x);
        self.bbox.y0 = self.bbox.y0.min(y);
        self.bbox.x1 = self.bbox.x1.max(x);
        self.bbox.y1 = self.bbox.y1.max(y);
    }

    fn finish(self) -> Blob {
        let n = self.area as f64;
        let bbox_area = (self.bbox.width() * self.bbox.height()) as f32;
        Blob {
            centroid: Point2::new((self.sum_x / n) as f32, (self.sum_y / n) as f32),
            area: self.area,
            bbox: self.bbox,
            circularity: self.area as f32 / bbox_area,
            radius: (self.area as f32 / std::f32::consts::PI).sqrt(),
        }
    }
}

/// All 4-connected components of `mask`, in raster order of their first pixel.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip_all,
        fields(width = mask.width, height = mask.height)
    )
)]
pub fn extract_blobs(mask: &BinaryMask, scratch: &mut FloodScratch) -> Vec<Blob> {
    let (w, h) = (mask.width, mask.height);
    scratch.reset(w * h);
    let mut blobs = Vec::new();

    for start in 0..w * h {
        if mask.data[start] == 0 || scratch.visited[start] {
            continue;
        }
        scratch.visited[start] = true;
        scratch.stack.push(start);
        let mut acc = Accumulator::new(start % w, start / w);

        while let Some(idx) = scratch.stack.pop() {
            let x = idx % w;
            let y = idx / w;
            acc.add(x, y);

            let mut visit = |n: usize| {
                if mask.data[n] != 0 && !scratch.visited[n] {
                    scratch.visited[n] = true;
                    scratch.stack.push(n);
                }
            };
            if x > 0 {
                visit(idx - 1);
            }
            if x + 1 < w {
                visit(idx + 1);
            }
            if y > 0 {
                visit(idx - w);
            }
            if y + 1 < h {
                visit(idx + w);
            }
        }

        blobs.push(acc.finish());
    }

    blobs
}

/// Keep puck-shaped blobs, largest first, capped per `cfg`.
///
/// `expected_radius` is only consulted when `cfg.radius_tolerance` is set.
pub fn filter_blobs(blobs: Vec<Blob>, cfg: &DetectionConfig, expected_radius: f32) -> Vec<Blob> {
    let total = blobs.len();
    let mut kept: Vec<Blob> = blobs
        .into_iter()
        .filter(|b| {
            let area = cfg.min_blob_area..=cfg.max_blob_area;
            area.contains(&b.area)
        })
        .filter(|b| b.circularity >= cfg.min_circularity)
        .filter(|b| {
            let aspect = b.bbox.aspect();
            (cfg.min_aspect..=cfg.max_aspect).contains(&aspect)
        })
        .filter(|b| match cfg.radius_tolerance {
            Some(tol) => {
                let band = expected_radius * (1.0 - tol)..=expected_radius * (1.0 + tol);
                band.contains(&b.radius)
            }
            None => true,
        })
        .collect();

    // stable: equal areas keep raster order
    kept.sort_by(|a, b| b.area.cmp(&a.area));
    kept.truncate(cfg.max_blobs_per_team);

    debug!("blob filter kept {} of {}", kept.len(), total);
    kept
}
