use log::{debug, warn};
use puckscore_core::{CourtGeometry, DriftOffset, Puck, RgbaImageView, Team};
use serde::{Deserialize, Serialize};

use crate::blobs::{extract_blobs, filter_blobs, FloodScratch};
use crate::classify::{build_team_masks_into, TeamMasks};
use crate::distortion::DistortionCorrector;
use crate::params::PuckDetectorParams;
use crate::roi::RegionMask;

/// Per-team blob counts before and after shape filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamBlobCounts {
    pub red_raw: usize,
    pub red_kept: usize,
    pub blue_raw: usize,
    pub blue_kept: usize,
}

/// Output of one detection pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Red pucks first, then blue; each team largest blob first.
    pub pucks: Vec<Puck>,
    pub counts: TeamBlobCounts,
    /// Scanned pixel window `[x0, y0, x1, y1)`.
    pub roi: [usize; 4],
}

impl DetectionResult {
    pub fn team(&self, team: Team) -> impl Iterator<Item = &Puck> + '_ {
        self.pucks.iter().filter(move |p| p.team == team)
    }
}

/// Working buffers reused across frames.
#[derive(Clone, Debug, Default)]
pub struct DetectScratch {
    pub masks: TeamMasks,
    flood: FloodScratch,
}

/// Full per-frame puck detector.
#[derive(Clone, Debug, Default)]
pub struct PuckDetector {
    params: PuckDetectorParams,
}

impl PuckDetector {
    pub fn new(params: PuckDetectorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &PuckDetectorParams {
        &self.params
    }

    #[inline]
    pub fn params_mut(&mut self) -> &mut PuckDetectorParams {
        &mut self.params
    }

    /// Detect pucks in one frame with freshly allocated buffers.
    ///
    /// With `geometry == None` the whole buffer is searched.
    pub fn detect(
        &self,
        image: &RgbaImageView<'_>,
        geometry: Option<&CourtGeometry>,
        drift: DriftOffset,
    ) -> DetectionResult {
        let mut scratch = DetectScratch::default();
        self.detect_with_scratch(image, geometry, drift, &mut scratch)
    }

    /// Detect pucks reusing caller-owned buffers.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(
            level = "info",
            skip(self, image, geometry, scratch),
            fields(
                width = image.width,
                height = image.height,
                calibrated = geometry.is_some()
            )
        )
    )]
    pub fn detect_with_scratch(
        &self,
        image: &RgbaImageView<'_>,
        geometry: Option<&CourtGeometry>,
        drift: DriftOffset,
        scratch: &mut DetectScratch,
    ) -> DetectionResult {
        if !image.is_consistent() {
            warn!(
                "rgba buffer of {} bytes does not match {}x{}, skipping frame",
                image.data.len(),
                image.width,
                image.height
            );
            return DetectionResult::default();
        }

        let roi = RegionMask::build(geometry, drift, image.width, image.height);
        let (x0, y0, x1, y1) = roi.bounds();
        debug!("roi window [{x0}, {x1}) x [{y0}, {y1})");

        build_team_masks_into(
            image,
            &roi,
            &self.params.colors,
            &self.params.classifier,
            &mut scratch.masks,
        );

        let corrector =
            DistortionCorrector::new(&self.params.distortion, image.width, image.height);
        let mut counts = TeamBlobCounts::default();
        let mut pucks = Vec::new();

        for team in Team::ALL {
            let raw = extract_blobs(scratch.masks.get(team), &mut scratch.flood);
            let raw_count = raw.len();
            let kept = filter_blobs(raw, &self.params.detection, self.params.puck_radius);
            match team {
                Team::Red => {
                    counts.red_raw = raw_count;
                    counts.red_kept = kept.len();
                }
                Team::Blue => {
                    counts.blue_raw = raw_count;
                    counts.blue_kept = kept.len();
                }
            }

            pucks.extend(kept.iter().map(|blob| {
                let (position, radius) = corrector.correct(blob.centroid, self.params.puck_radius);
                Puck {
                    team,
                    position,
                    raw_position: blob.centroid,
                    radius,
                    area: blob.area,
                    circularity: blob.circularity,
                }
            }));
        }

        debug!(
            "blobs red {}/{} blue {}/{} (kept/raw)",
            counts.red_kept, counts.red_raw, counts.blue_kept, counts.blue_raw
        );

        DetectionResult {
            pucks,
            counts,
            roi: [x0, y0, x1, y1],
        }
    }
}
