//! Per-pixel team color classification.
//!
//! A pixel is tested against both teams independently, so a pixel that
//! fits both HSV windows lands in both masks. Overlapping profiles are a
//! calibration problem and are left visible rather than resolved here.

use log::{debug, warn};
use puckscore_core::{brightness, hue_distance, rgb_to_hsv, Hsv, RgbaImageView, Team};

use crate::mask::BinaryMask;
use crate::params::{ClassifierParams, TeamColorProfile, TeamProfiles};
use crate::roi::RegionMask;

/// One binary mask per team, buffer-sized.
#[derive(Clone, Debug, Default)]
pub struct TeamMasks {
    pub red: BinaryMask,
    pub blue: BinaryMask,
}

impl TeamMasks {
    pub fn get(&self, team: Team) -> &BinaryMask {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }
}

#[inline]
fn passes_global_gates(rgb: [u8; 3], hsv: &Hsv, params: &ClassifierParams) -> bool {
    let luma = brightness(rgb[0], rgb[1], rgb[2]);
    if luma < params.dark_floor || luma > params.bright_ceiling {
        return false;
    }
    hsv.s >= params.min_saturation && hsv.v >= params.min_value
}

#[inline]
fn matches_profile(rgb: [u8; 3], hsv: &Hsv, profile: &TeamColorProfile) -> bool {
    if hsv.s < profile.min_saturation || hsv.v < profile.min_value {
        return false;
    }
    if hue_distance(hsv.h, profile.hue) > profile.hue_tolerance {
        return false;
    }
    profile.dominance.is_none_or(|check| check.accepts(rgb))
}

/// Whether an RGB pixel belongs to `profile`, including the shared gates.
pub fn classify_pixel(rgb: [u8; 3], profile: &TeamColorProfile, params: &ClassifierParams) -> bool {
    let hsv = rgb_to_hsv(rgb[0], rgb[1], rgb[2]);
    passes_global_gates(rgb, &hsv, params) && matches_profile(rgb, &hsv, profile)
}

/// Classify every in-ROI pixel of `img` into fresh team masks.
pub fn build_team_masks(
    img: &RgbaImageView<'_>,
    roi: &RegionMask,
    profiles: &TeamProfiles,
    params: &ClassifierParams,
) -> TeamMasks {
    let mut masks = TeamMasks::default();
    build_team_masks_into(img, roi, profiles, params, &mut masks);
    masks
}

/// Classify into caller-owned masks, resizing and clearing them first.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip_all,
        fields(width = img.width, height = img.height)
    )
)]
pub fn build_team_masks_into(
    img: &RgbaImageView<'_>,
    roi: &RegionMask,
    profiles: &TeamProfiles,
    params: &ClassifierParams,
    masks: &mut TeamMasks,
) {
    masks.red.reset(img.width, img.height);
    masks.blue.reset(img.width, img.height);
    if roi.is_empty() {
        warn!("region of interest is empty, nothing to classify");
        return;
    }

    let (x0, y0, x1, y1) = roi.bounds();
    let x1 = x1.min(img.width);
    let y1 = y1.min(img.height);
    let mut scanned = 0usize;

    for y in y0..y1 {
        for x in x0..x1 {
            if !roi.contains(x, y) {
                continue;
            }
            scanned += 1;
            let px = img.pixel(x, y);
            let rgb = [px[0], px[1], px[2]];
            let hsv = rgb_to_hsv(rgb[0], rgb[1], rgb[2]);
            if !passes_global_gates(rgb, &hsv, params) {
                continue;
            }
            if matches_profile(rgb, &hsv, &profiles.red) {
                masks.red.set(x, y);
            }
            if matches_profile(rgb, &hsv, &profiles.blue) {
                masks.blue.set(x, y);
            }
        }
    }

    debug!(
        "classified {} roi pixels: red={} blue={}",
        scanned,
        masks.red.count(),
        masks.blue.count()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{Channel, DominanceCheck};
    use puckscore_core::RgbaImage;

    #[test]
    fn saturated_red_and_blue_are_separated() {
        let params = ClassifierParams::default();
        let profiles = TeamProfiles::default();
        assert!(classify_pixel([210, 30, 35], &profiles.red, &params));
        assert!(!classify_pixel([210, 30, 35], &profiles.blue, &params));
        assert!(classify_pixel([25, 100, 200], &profiles.blue, &params));
        assert!(!classify_pixel([25, 100, 200], &profiles.red, &params));
    }

    #[test]
    fn shadow_and_glare_are_rejected() {
        let params = ClassifierParams::default();
        let profiles = TeamProfiles::default();
        // hue and saturation are red, but the pixel is almost black
        assert!(!classify_pixel([40, 5, 5], &profiles.red, &params));
        // blown-out highlight on a metal puck center
        assert!(!classify_pixel([255, 245, 240], &profiles.red, &params));
    }

    #[test]
    fn washed_out_pixel_fails_dominance_check() {
        let params = ClassifierParams {
            min_saturation: 0.0,
            ..ClassifierParams::default()
        };
        let mut profile = TeamProfiles::default().red;
        profile.min_saturation = 0.05;
        profile.min_value = 0.0;
        // hue ~0, but red leads green/blue by less than the margin
        let rgb = [150, 140, 138];
        assert!(!classify_pixel(rgb, &profile, &params));
        profile.dominance = None;
        assert!(classify_pixel(rgb, &profile, &params));
    }

    #[test]
    fn pixel_matching_both_profiles_lands_in_both_masks() {
        let mut profiles = TeamProfiles::default();
        // two overlapping windows around magenta-red
        profiles.red.hue = 340.0;
        profiles.red.hue_tolerance = 30.0;
        profiles.blue.hue = 320.0;
        profiles.blue.hue_tolerance = 30.0;
        profiles.blue.min_saturation = 0.5;
        profiles.blue.min_value = 0.3;
        profiles.blue.dominance = Some(DominanceCheck {
            channel: Channel::Red,
            margin: 0,
        });

        let mut img = RgbaImage::filled(3, 1, [0, 0, 0, 255]);
        img.put_pixel(1, 0, [220, 30, 120, 255]);
        let roi = RegionMask::full(3, 1);
        let masks = build_team_masks(&img.view(), &roi, &profiles, &ClassifierParams::default());

        assert!(masks.red.get(1, 0));
        assert!(masks.blue.get(1, 0));
        assert_eq!(masks.red.count(), 1);
        assert_eq!(masks.blue.count(), 1);
    }

    #[test]
    fn pixels_outside_roi_are_not_classified() {
        let img = RgbaImage::filled(10, 10, [210, 30, 35, 255]);
        let p = nalgebra::Point2::new;
        let geometry = puckscore_core::CourtGeometry::new(
            puckscore_core::Triangle::new(p(0.0, 0.0), p(0.0, 9.0), p(9.0, 4.5)),
            [puckscore_core::Segment::new(p(6.0, 0.0), p(6.0, 9.0)); 3],
        );
        let roi = RegionMask::build(Some(&geometry), puckscore_core::DriftOffset::ZERO, 10, 10);
        let masks = build_team_masks(
            &img.view(),
            &roi,
            &TeamProfiles::default(),
            &ClassifierParams::default(),
        );
        assert!(masks.red.get(2, 4));
        assert!(!masks.red.get(8, 0));
        assert!(masks.red.count() < 100);
    }
}
