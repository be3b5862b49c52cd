use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::Team;

/// One detected puck, ready for scoring.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Puck {
    pub team: Team,
    /// Lens-corrected center in buffer coordinates.
    pub position: Point2<f32>,
    /// Blob centroid before correction.
    pub raw_position: Point2<f32>,
    /// Effective collision radius used by every geometric test.
    pub radius: f32,
    /// Source blob pixel area.
    pub area: usize,
    /// Source blob area / bounding-box area.
    pub circularity: f32,
}

impl Puck {
    /// Puck at a known position with no lens correction, mainly for scoring
    /// tests and manual placement.
    pub fn at(team: Team, x: f32, y: f32, radius: f32) -> Self {
        let p = Point2::new(x, y);
        Self {
            team,
            position: p,
            raw_position: p,
            radius,
            area: 0,
            circularity: 0.0,
        }
    }
}
