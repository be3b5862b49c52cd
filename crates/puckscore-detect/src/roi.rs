use nalgebra::Point2;
use puckscore_core::{CourtGeometry, DriftOffset, Triangle};

/// Per-pixel "inside the scoring triangle" predicate plus the clipped pixel
/// window the classifier has to scan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegionMask {
    triangle: Option<Triangle>,
    x0: usize,
    y0: usize,
    x1: usize,
    y1: usize,
}

impl RegionMask {
    /// Whole-buffer region, used when no geometry has been calibrated.
    pub fn full(width: usize, height: usize) -> Self {
        Self {
            triangle: None,
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    /// Region for the drift-shifted, tip-normalized court triangle.
    pub fn build(
        geometry: Option<&CourtGeometry>,
        drift: DriftOffset,
        width: usize,
        height: usize,
    ) -> Self {
        let Some(geometry) = geometry else {
            return Self::full(width, height);
        };
        let triangle = geometry.shifted(drift).normalized().triangle();
        let (min, max) = triangle.bounds();

        let clip = |v: f32, hi: usize| -> usize {
            if v.is_nan() {
                0
            } else {
                v.clamp(0.0, hi as f32) as usize
            }
        };
        let x0 = clip(min.x.floor(), width);
        let y0 = clip(min.y.floor(), height);
        let x1 = clip(max.x.floor() + 1.0, width);
        let y1 = clip(max.y.floor() + 1.0, height);

        Self {
            triangle: Some(triangle),
            x0,
            y0,
            x1: x1.max(x0),
            y1: y1.max(y0),
        }
    }

    /// Pixel window `[x0, x1) x [y0, y1)` to scan.
    #[inline]
    pub fn bounds(&self) -> (usize, usize, usize, usize) {
        (self.x0, self.y0, self.x1, self.y1)
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        if x < self.x0 || x >= self.x1 || y < self.y0 || y >= self.y1 {
            return false;
        }
        match &self.triangle {
            Some(t) => t.contains(Point2::new(x as f32, y as f32)),
            None => true,
        }
    }
}
