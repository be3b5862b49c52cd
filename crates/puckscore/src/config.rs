//! Persistent board configuration.
//!
//! The on-disk format is JSON with a top-level `version`. Files without a
//! `version` are treated as the legacy flat layout (`lineThickness`, `tri`,
//! `colors.red.hTol`, ...) and migrated on load. Missing sections fall back
//! to their defaults field by field, then the whole config is validated.

use std::{fs, path::Path};

use log::{debug, info};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::core::{CourtGeometry, Segment, Team, Triangle};
use crate::detect::{
    ClassifierParams, DetectionConfig, DistortionProfile, PuckDetectorParams, TeamColorProfile,
    TeamProfiles,
};
use crate::score::ScoringParams;

/// Current config schema version.
pub const CONFIG_VERSION: u32 = 2;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("unsupported config version {found} (max {max})", max = CONFIG_VERSION)]
    UnsupportedVersion { found: u64 },
    #[error("invalid config field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },
}

impl ConfigError {
    /// Name of the offending field for validation failures.
    pub fn field(&self) -> Option<&str> {
        match self {
            ConfigError::InvalidField { field, .. } => Some(field.as_str()),
            _ => None,
        }
    }
}

/// Scoring tolerances plus the configured puck radius.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Puck radius in buffer pixels before lens correction.
    pub puck_radius: f32,
    pub line_thickness: f32,
    pub touch_epsilon: f32,
    pub borderline_margin: f32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        let params = ScoringParams::default();
        Self {
            puck_radius: 18.0,
            line_thickness: params.line_thickness,
            touch_epsilon: params.touch_epsilon,
            borderline_margin: params.borderline_margin,
        }
    }
}

impl ScoringConfig {
    pub fn params(&self) -> ScoringParams {
        ScoringParams {
            line_thickness: self.line_thickness,
            touch_epsilon: self.touch_epsilon,
            borderline_margin: self.borderline_margin,
        }
    }
}

fn current_version() -> u32 {
    CONFIG_VERSION
}

/// Everything calibrated for one board and camera.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "current_version")]
    pub version: u32,
    /// `None` until the court has been calibrated.
    #[serde(default)]
    pub geometry: Option<CourtGeometry>,
    #[serde(default)]
    pub colors: TeamProfiles,
    #[serde(default)]
    pub classifier: ClassifierParams,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub distortion: DistortionProfile,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            geometry: Some(default_geometry()),
            colors: TeamProfiles::default(),
            classifier: ClassifierParams::default(),
            detection: DetectionConfig::default(),
            distortion: DistortionProfile::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

/// Court placement used before calibration, in a 640x480-ish buffer.
pub fn default_geometry() -> CourtGeometry {
    let p = Point2::new;
    CourtGeometry::new(
        Triangle::new(p(120.0, 120.0), p(120.0, 480.0), p(520.0, 300.0)),
        [
            Segment::new(p(430.0, 260.0), p(430.0, 340.0)),
            Segment::new(p(340.0, 230.0), p(360.0, 380.0)),
            Segment::new(p(220.0, 200.0), p(260.0, 420.0)),
        ],
    )
}

impl BoardConfig {
    /// Load, migrate and validate a JSON config from disk.
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let cfg = Self::from_json_str(&raw)?;
        debug!("loaded config v{} from {}", cfg.version, path.display());
        Ok(cfg)
    }

    /// Parse, migrate and validate a JSON config.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(raw)?;
        let mut cfg = match value.get("version") {
            None => {
                let legacy: LegacyConfig = serde_json::from_value(value)?;
                info!("migrating legacy config to v{CONFIG_VERSION}");
                legacy.migrate()?
            }
            Some(v) => {
                let found = v.as_u64().ok_or_else(|| ConfigError::InvalidField {
                    field: "version".into(),
                    reason: "must be a positive integer".into(),
                })?;
                if found == 0 || found > CONFIG_VERSION as u64 {
                    return Err(ConfigError::UnsupportedVersion { found });
                }
                serde_json::from_value::<BoardConfig>(value)?
            }
        };
        cfg.version = CONFIG_VERSION;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Write this config to disk as pretty JSON.
    pub fn write_json(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn detector_params(&self) -> PuckDetectorParams {
        PuckDetectorParams {
            colors: self.colors,
            classifier: self.classifier,
            detection: self.detection,
            distortion: self.distortion,
            puck_radius: self.scoring.puck_radius,
        }
    }

    pub fn scoring_params(&self) -> ScoringParams {
        self.scoring.params()
    }

    pub fn set_profile(&mut self, team: Team, profile: TeamColorProfile) {
        *self.colors.get_mut(team) = profile;
    }

    /// Check every field against its legal range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for team in Team::ALL {
            validate_profile(team, self.colors.get(team))?;
        }

        let c = &self.classifier;
        finite_in("classifier.dark_floor", c.dark_floor, 0.0, 255.0)?;
        finite_in("classifier.bright_ceiling", c.bright_ceiling, 0.0, 255.0)?;
        ensure(
            c.dark_floor < c.bright_ceiling,
            "classifier.dark_floor",
            "must be below bright_ceiling",
        )?;
        finite_in("classifier.min_saturation", c.min_saturation, 0.0, 1.0)?;
        finite_in("classifier.min_value", c.min_value, 0.0, 1.0)?;

        let d = &self.detection;
        ensure(
            d.min_blob_area > 0,
            "detection.min_blob_area",
            "must be > 0",
        )?;
        ensure(
            d.min_blob_area <= d.max_blob_area,
            "detection.max_blob_area",
            "must be >= min_blob_area",
        )?;
        finite_in("detection.min_circularity", d.min_circularity, 0.0, 1.0)?;
        ensure(
            d.min_aspect.is_finite() && d.min_aspect > 0.0,
            "detection.min_aspect",
            "must be finite and > 0",
        )?;
        ensure(
            d.max_aspect.is_finite() && d.max_aspect >= d.min_aspect,
            "detection.max_aspect",
            "must be finite and >= min_aspect",
        )?;
        ensure(
            d.max_blobs_per_team >= 1,
            "detection.max_blobs_per_team",
            "must be >= 1",
        )?;
        if let Some(tol) = d.radius_tolerance {
            finite_in("detection.radius_tolerance", tol, 0.0, 1.0)?;
        }

        let dist = &self.distortion;
        ensure(dist.k.is_finite(), "distortion.k", "must be finite")?;
        ensure(dist.p.is_finite(), "distortion.p", "must be finite")?;
        ensure(
            dist.min_radius.is_finite() && dist.min_radius >= 0.0,
            "distortion.min_radius",
            "must be finite and >= 0",
        )?;
        if let Some(center) = dist.optical_center {
            ensure(
                center.x.is_finite() && center.y.is_finite(),
                "distortion.optical_center",
                "must be finite",
            )?;
        }

        let s = &self.scoring;
        non_negative("scoring.puck_radius", s.puck_radius)?;
        non_negative("scoring.line_thickness", s.line_thickness)?;
        non_negative("scoring.touch_epsilon", s.touch_epsilon)?;
        non_negative("scoring.borderline_margin", s.borderline_margin)?;

        if let Some(g) = &self.geometry {
            ensure(g.is_finite(), "geometry", "coordinates must be finite")?;
        }
        Ok(())
    }
}

fn ensure(ok: bool, field: &str, reason: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::InvalidField {
            field: field.to_string(),
            reason: reason.to_string(),
        })
    }
}

fn finite_in(field: &str, v: f32, lo: f32, hi: f32) -> Result<(), ConfigError> {
    ensure(
        v.is_finite() && v >= lo && v <= hi,
        field,
        &format!("must be within [{lo}, {hi}], got {v}"),
    )
}

fn non_negative(field: &str, v: f32) -> Result<(), ConfigError> {
    ensure(
        v.is_finite() && v >= 0.0,
        field,
        &format!("must be finite and >= 0, got {v}"),
    )
}

fn validate_profile(team: Team, p: &TeamColorProfile) -> Result<(), ConfigError> {
    let field = |name: &str| format!("colors.{team}.{name}");
    ensure(
        p.hue.is_finite() && (0.0..360.0).contains(&p.hue),
        &field("hue"),
        &format!("must be within [0, 360), got {}", p.hue),
    )?;
    finite_in(&field("hue_tolerance"), p.hue_tolerance, 0.0, 180.0)?;
    finite_in(&field("min_saturation"), p.min_saturation, 0.0, 1.0)?;
    finite_in(&field("min_value"), p.min_value, 0.0, 1.0)?;
    Ok(())
}

// Legacy flat layout. Missing top-level keys take the factory defaults,
// matching the old shallow merge.

#[derive(Deserialize)]
struct LegacyPoint {
    x: f32,
    y: f32,
}

impl LegacyPoint {
    fn point(&self) -> Point2<f32> {
        Point2::new(self.x, self.y)
    }
}

#[derive(Deserialize)]
struct LegacyTriangle {
    #[serde(rename = "A")]
    a: LegacyPoint,
    #[serde(rename = "B")]
    b: LegacyPoint,
    #[serde(rename = "C")]
    c: LegacyPoint,
}

#[derive(Deserialize)]
struct LegacySegment {
    p1: LegacyPoint,
    p2: LegacyPoint,
}

#[derive(Deserialize)]
struct LegacyColor {
    h: f32,
    s: f32,
    v: f32,
    #[serde(rename = "hTol")]
    h_tol: f32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyColors {
    red: LegacyColor,
    blue: LegacyColor,
    #[serde(default)]
    s_min: Option<f32>,
    #[serde(default)]
    v_min: Option<f32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyConfig {
    #[serde(default)]
    line_thickness: Option<f32>,
    #[serde(default)]
    puck_radius: Option<f32>,
    #[serde(default)]
    puck_radius_tolerance: Option<f32>,
    #[serde(default)]
    touch_epsilon: Option<f32>,
    #[serde(default)]
    tri: Option<LegacyTriangle>,
    #[serde(default)]
    lines: Option<Vec<LegacySegment>>,
    #[serde(default)]
    colors: Option<LegacyColors>,
}

impl LegacyConfig {
    fn migrate(self) -> Result<BoardConfig, ConfigError> {
        let mut cfg = BoardConfig::default();
        let defaults = default_geometry();

        if let Some(v) = self.line_thickness {
            cfg.scoring.line_thickness = v;
        }
        if let Some(v) = self.puck_radius {
            cfg.scoring.puck_radius = v;
        }
        if let Some(v) = self.touch_epsilon {
            cfg.scoring.touch_epsilon = v;
        }
        // the old default tolerance was always on
        cfg.detection.radius_tolerance = Some(self.puck_radius_tolerance.unwrap_or(0.35));

        let triangle = match &self.tri {
            Some(t) => Triangle::new(t.a.point(), t.b.point(), t.c.point()),
            None => defaults.triangle(),
        };
        let lines = match &self.lines {
            Some(lines) => {
                let segs: Vec<Segment> = lines
                    .iter()
                    .map(|l| Segment::new(l.p1.point(), l.p2.point()))
                    .collect();
                <[Segment; 3]>::try_from(segs).map_err(|segs| ConfigError::InvalidField {
                    field: "lines".into(),
                    reason: format!("expected 3 boundary lines, got {}", segs.len()),
                })?
            }
            None => defaults.lines,
        };
        cfg.geometry = Some(CourtGeometry::new(triangle, lines));

        if let Some(colors) = self.colors {
            for (team, c) in [(Team::Red, colors.red), (Team::Blue, colors.blue)] {
                let profile = cfg.colors.get_mut(team);
                profile.hue = c.h;
                profile.hue_tolerance = c.h_tol;
                profile.min_saturation = c.s;
                profile.min_value = c.v;
            }
            if let Some(s) = colors.s_min {
                cfg.classifier.min_saturation = s;
            }
            if let Some(v) = colors.v_min {
                cfg.classifier.min_value = v;
            }
        }
        Ok(cfg)
    }
}
