//! Radial lens correction for blob centroids and puck radii.
//!
//! The model has two coefficients on the normalized radial distance `r`:
//! positions are pulled toward the optical center by `1 - p r^2` and radii
//! shrink by `1 - k r^2`. Both are identities at `r = 0`.

use nalgebra::Point2;

use crate::params::DistortionProfile;

/// A [`DistortionProfile`] bound to concrete buffer dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DistortionCorrector {
    center: Point2<f32>,
    /// Distance from `center` to the closest buffer corner.
    corner_dist: f32,
    k: f32,
    p: f32,
    min_radius: f32,
}

impl DistortionCorrector {
    pub fn new(profile: &DistortionProfile, width: usize, height: usize) -> Self {
        let (w, h) = (width as f32, height as f32);
        let center = profile
            .optical_center
            .unwrap_or_else(|| Point2::new(w * 0.5, h * 0.5));
        let corner_dist = [
            Point2::new(0.0, 0.0),
            Point2::new(w, 0.0),
            Point2::new(0.0, h),
            Point2::new(w, h),
        ]
        .iter()
        .map(|c| (c - center).norm())
        .fold(f32::INFINITY, f32::min);

        Self {
            center,
            corner_dist,
            k: profile.k,
            p: profile.p,
            min_radius: profile.min_radius,
        }
    }

    #[inline]
    pub fn optical_center(&self) -> Point2<f32> {
        self.center
    }

    /// Normalized radial distance in `[0, 1]`.
    #[inline]
    pub fn radial(&self, pt: Point2<f32>) -> f32 {
        if self.corner_dist <= 0.0 || !self.corner_dist.is_finite() {
            return 0.0;
        }
        ((pt - self.center).norm() / self.corner_dist).clamp(0.0, 1.0)
    }

    pub fn correct_point(&self, raw: Point2<f32>) -> Point2<f32> {
        let r = self.radial(raw);
        self.center + (raw - self.center) * (1.0 - self.p * r * r)
    }

    pub fn effective_radius(&self, raw: Point2<f32>, base_radius: f32) -> f32 {
        let r = self.radial(raw);
        let shrunk = base_radius * (1.0 - self.k * r * r);
        if r == 0.0 {
            // the floor must not raise a base radius at the center
            return base_radius;
        }
        shrunk.max(self.min_radius)
    }

    /// Corrected position and effective radius.
    pub fn correct(&self, raw: Point2<f32>, base_radius: f32) -> (Point2<f32>, f32) {
        let position = self.correct_point(raw);
        (position, self.effective_radius(raw, base_radius))
    }
}
