//! Puck detector for shuffleboard camera frames.
//!
//! Pipeline, per frame:
//! - restrict work to the scoring triangle ([`RegionMask`]),
//! - classify every in-ROI pixel against both team HSV profiles,
//! - flood-fill each team mask into blobs and keep the round-ish ones,
//! - correct blob centroids and puck radii for radial lens distortion.
//!
//! Every stage is a plain function over borrowed inputs; [`PuckDetector`]
//! only wires them together.

pub mod blobs;
pub mod classify;
mod detector;
pub mod distortion;
mod mask;
mod params;
mod roi;
mod sample;

pub use blobs::{extract_blobs, filter_blobs, Blob, BoundingBox, FloodScratch};
pub use classify::{build_team_masks, build_team_masks_into, classify_pixel, TeamMasks};
pub use detector::{DetectScratch, DetectionResult, PuckDetector, TeamBlobCounts};
pub use distortion::DistortionCorrector;
pub use mask::BinaryMask;
pub use params::{
    Channel, ClassifierParams, DetectionConfig, DistortionProfile, DominanceCheck,
    PuckDetectorParams, TeamColorProfile, TeamProfiles,
};
pub use roi::RegionMask;
pub use sample::{profile_from_sample, sample_pixel};
