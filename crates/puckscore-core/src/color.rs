use serde::{Deserialize, Serialize};

/// HSV triple: hue in degrees `[0, 360)`, saturation and value in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hsv {
    pub h: f32,
    pub s: f32,
    pub v: f32,
}

/// Convert 8-bit RGB to HSV.
pub fn rgb_to_hsv(r: u8, g: u8, b: u8) -> Hsv {
    let r = r as f32 / 255.0;
    let g = g as f32 / 255.0;
    let b = b as f32 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let d = max - min;

    let mut h = 0.0;
    if d > 0.0 {
        h = if max == r {
            ((g - b) / d) % 6.0
        } else if max == g {
            (b - r) / d + 2.0
        } else {
            (r - g) / d + 4.0
        };
        h *= 60.0;
        if h < 0.0 {
            h += 360.0;
        }
    }
    let s = if max == 0.0 { 0.0 } else { d / max };
    Hsv { h, s, v: max }
}

/// Circular distance between two hues in degrees, in `[0, 180]`.
#[inline]
pub fn hue_distance(a: f32, b: f32) -> f32 {
    let d = (a - b).abs() % 360.0;
    d.min(360.0 - d)
}

/// Mean of the three channels, `0..=255`.
#[inline]
pub fn brightness(r: u8, g: u8, b: u8) -> f32 {
    (r as f32 + g as f32 + b as f32) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn primary_colors_map_to_expected_hues() {
        assert_relative_eq!(rgb_to_hsv(255, 0, 0).h, 0.0);
        assert_relative_eq!(rgb_to_hsv(0, 255, 0).h, 120.0);
        assert_relative_eq!(rgb_to_hsv(0, 0, 255).h, 240.0);
        let magenta_ish = rgb_to_hsv(255, 0, 64);
        assert!(magenta_ish.h > 340.0 && magenta_ish.h < 360.0);
    }

    #[test]
    fn gray_has_zero_saturation() {
        let hsv = rgb_to_hsv(128, 128, 128);
        assert_relative_eq!(hsv.s, 0.0);
        assert_relative_eq!(hsv.h, 0.0);
        assert_relative_eq!(hsv.v, 128.0 / 255.0);
    }

    #[test]
    fn hue_distance_wraps_around() {
        assert_relative_eq!(hue_distance(350.0, 10.0), 20.0);
        assert_relative_eq!(hue_distance(10.0, 350.0), 20.0);
        assert_relative_eq!(hue_distance(0.0, 180.0), 180.0);
        assert_relative_eq!(hue_distance(720.0, 0.0), 0.0);
    }
}
