use puckscore_core::{rgb_to_hsv, RgbaImageView, Team};

use crate::params::TeamColorProfile;

/// RGB at buffer pixel `(x, y)`, with coordinates clamped into the buffer.
///
/// Returns `None` for an empty or inconsistent view.
pub fn sample_pixel(view: &RgbaImageView<'_>, x: f32, y: f32) -> Option<[u8; 3]> {
    if view.width == 0 || view.height == 0 || !view.is_consistent() {
        return None;
    }
    let clamp = |v: f32, n: usize| -> usize {
        if v.is_nan() {
            0
        } else {
            (v.round().max(0.0) as usize).min(n - 1)
        }
    };
    let px = view.pixel(clamp(x, view.width), clamp(y, view.height));
    Some([px[0], px[1], px[2]])
}

/// Seed a team profile from one calibration pixel.
///
/// The window is centered on the sampled hue; saturation and value floors
/// sit below the sample so the darker rim of a puck still classifies.
pub fn profile_from_sample(rgb: [u8; 3], team: Team) -> TeamColorProfile {
    let hsv = rgb_to_hsv(rgb[0], rgb[1], rgb[2]);
    let hue_tolerance = match team {
        Team::Red => 26.0,
        Team::Blue => 28.0,
    };
    TeamColorProfile {
        hue: hsv.h,
        hue_tolerance,
        min_saturation: (hsv.s * 0.75).clamp(0.35, 0.75),
        min_value: (hsv.v * 0.70).clamp(0.20, 0.65),
        dominance: Some(TeamColorProfile::default_dominance(team)),
    }
}
