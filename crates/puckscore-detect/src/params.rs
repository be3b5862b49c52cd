use nalgebra::Point2;
use puckscore_core::Team;
use serde::{Deserialize, Serialize};

/// RGB channel selector for the dominant-channel check.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    #[inline]
    pub fn index(&self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }
}

/// Require one channel to exceed both others by `margin` (0..255 scale).
///
/// Rejects washed-out pixels whose hue happens to fall inside a team window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DominanceCheck {
    pub channel: Channel,
    pub margin: u8,
}

impl DominanceCheck {
    #[inline]
    pub fn accepts(&self, rgb: [u8; 3]) -> bool {
        let i = self.channel.index();
        let lead = rgb[i] as i16;
        let m = self.margin as i16;
        (0..3)
            .filter(|&j| j != i)
            .all(|j| lead > rgb[j] as i16 + m)
    }
}

/// HSV acceptance window for one team's pucks.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamColorProfile {
    /// Hue center in degrees, `[0, 360)`.
    pub hue: f32,
    /// Maximum circular hue distance in degrees.
    pub hue_tolerance: f32,
    /// Minimum saturation, `[0, 1]`.
    pub min_saturation: f32,
    /// Minimum value, `[0, 1]`.
    pub min_value: f32,
    #[serde(default)]
    pub dominance: Option<DominanceCheck>,
}

impl TeamColorProfile {
    /// Seed profile used before any sampling.
    pub fn default_for(team: Team) -> Self {
        match team {
            Team::Red => Self {
                hue: 0.0,
                hue_tolerance: 22.0,
                min_saturation: 0.55,
                min_value: 0.35,
                dominance: Some(Self::default_dominance(team)),
            },
            Team::Blue => Self {
                hue: 210.0,
                hue_tolerance: 25.0,
                min_saturation: 0.50,
                min_value: 0.30,
                dominance: Some(Self::default_dominance(team)),
            },
        }
    }

    pub fn default_dominance(team: Team) -> DominanceCheck {
        match team {
            Team::Red => DominanceCheck {
                channel: Channel::Red,
                margin: 20,
            },
            Team::Blue => DominanceCheck {
                channel: Channel::Blue,
                margin: 0,
            },
        }
    }
}

/// One color profile per team.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeamProfiles {
    pub red: TeamColorProfile,
    pub blue: TeamColorProfile,
}

impl TeamProfiles {
    pub fn get(&self, team: Team) -> &TeamColorProfile {
        match team {
            Team::Red => &self.red,
            Team::Blue => &self.blue,
        }
    }

    pub fn get_mut(&mut self, team: Team) -> &mut TeamColorProfile {
        match team {
            Team::Red => &mut self.red,
            Team::Blue => &mut self.blue,
        }
    }
}

impl Default for TeamProfiles {
    fn default() -> Self {
        Self {
            red: TeamColorProfile::default_for(Team::Red),
            blue: TeamColorProfile::default_for(Team::Blue),
        }
    }
}

/// Team-independent pixel gates applied before the per-team profiles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    /// Pixels with mean RGB below this are shadow (0..255).
    pub dark_floor: f32,
    /// Pixels with mean RGB above this are glare (0..255).
    pub bright_ceiling: f32,
    /// Saturation floor shared by both teams.
    pub min_saturation: f32,
    /// Value floor shared by both teams.
    pub min_value: f32,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            dark_floor: 25.0,
            bright_ceiling: 240.0,
            min_saturation: 0.35,
            min_value: 0.20,
        }
    }
}

/// Blob shape and size filters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    pub min_blob_area: usize,
    pub max_blob_area: usize,
    /// Minimum area / bounding-box area. A filled disk scores about 0.785.
    pub min_circularity: f32,
    /// Bounding-box width / height bounds.
    pub min_aspect: f32,
    pub max_aspect: f32,
    /// Keep at most this many blobs per team, largest first.
    pub max_blobs_per_team: usize,
    /// Optional relative tolerance of the blob radius estimate around the
    /// configured puck radius, e.g. `0.35` for +/-35 %.
    pub radius_tolerance: Option<f32>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            min_blob_area: 80,
            max_blob_area: 20_000,
            min_circularity: 0.5,
            min_aspect: 0.5,
            max_aspect: 2.0,
            max_blobs_per_team: 8,
            radius_tolerance: None,
        }
    }
}

/// Simple radial lens model.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistortionProfile {
    /// Radius shrink coefficient.
    pub k: f32,
    /// Position pull-in coefficient.
    pub p: f32,
    /// Optical center in buffer pixels; `None` uses the buffer center.
    pub optical_center: Option<Point2<f32>>,
    /// Lower bound on the effective radius.
    pub min_radius: f32,
}

impl Default for DistortionProfile {
    fn default() -> Self {
        Self {
            k: 0.0,
            p: 0.0,
            optical_center: None,
            min_radius: 4.0,
        }
    }
}

/// Everything the detector reads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PuckDetectorParams {
    #[serde(default)]
    pub colors: TeamProfiles,
    #[serde(default)]
    pub classifier: ClassifierParams,
    #[serde(default)]
    pub detection: DetectionConfig,
    #[serde(default)]
    pub distortion: DistortionProfile,
    /// Configured puck radius in buffer pixels, before lens correction.
    #[serde(default = "default_puck_radius")]
    pub puck_radius: f32,
}

impl Default for PuckDetectorParams {
    fn default() -> Self {
        Self {
            colors: TeamProfiles::default(),
            classifier: ClassifierParams::default(),
            detection: DetectionConfig::default(),
            distortion: DistortionProfile::default(),
            puck_radius: default_puck_radius(),
        }
    }
}

fn default_puck_radius() -> f32 {
    18.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn red_dominance_requires_margin() {
        let check = TeamColorProfile::default_dominance(Team::Red);
        assert!(check.accepts([200, 60, 60]));
        assert!(!check.accepts([200, 185, 60]));
    }

    #[test]
    fn blue_dominance_is_strict() {
        let check = TeamColorProfile::default_dominance(Team::Blue);
        assert!(check.accepts([20, 90, 200]));
        assert!(!check.accepts([20, 200, 200]));
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let p: PuckDetectorParams = serde_json::from_str("{}").expect("parse");
        assert_eq!(p.detection.max_blobs_per_team, 8);
        assert_eq!(p.puck_radius, 18.0);
        assert_eq!(p.colors.blue.hue, 210.0);
    }
}
