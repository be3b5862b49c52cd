use nalgebra::Point2;
use puckscore_core::Team;
use serde::{Deserialize, Serialize};

/// Where a puck came to rest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "10pt")]
    Ten,
    #[serde(rename = "8pt")]
    Eight,
    #[serde(rename = "7pt")]
    Seven,
    #[serde(rename = "-10pt")]
    MinusTen,
    /// Outside the triangle or touching its outer edge.
    #[serde(rename = "out")]
    Out,
    /// Touching one of the three boundary lines.
    #[serde(rename = "line")]
    Line,
}

impl Zone {
    /// Scoring zones from the tip toward the base.
    pub const SCORING: [Zone; 4] = [Zone::Ten, Zone::Eight, Zone::Seven, Zone::MinusTen];

    /// Zone reached after crossing `n` boundary lines from the tip side.
    #[inline]
    pub fn from_crossings(n: usize) -> Zone {
        Self::SCORING[n.min(3)]
    }

    pub fn points(&self) -> i32 {
        match self {
            Zone::Ten => 10,
            Zone::Eight => 8,
            Zone::Seven => 7,
            Zone::MinusTen => -10,
            Zone::Out | Zone::Line => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Zone::Ten => "10pt",
            Zone::Eight => "8pt",
            Zone::Seven => "7pt",
            Zone::MinusTen => "-10pt",
            Zone::Out => "out",
            Zone::Line => "line",
        }
    }

    pub fn is_scoring(&self) -> bool {
        !matches!(self, Zone::Out | Zone::Line)
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Verdict for a single puck.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PuckScoreResult {
    pub team: Team,
    pub points: i32,
    pub valid: bool,
    pub zone: Zone,
    /// Distance from the puck edge to the nearest relevant segment minus the
    /// tolerance. Negative means touching.
    pub clearance_margin: f32,
    /// Points the puck would get if a borderline touch were overruled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alternate_points: Option<i32>,
    pub position: Point2<f32>,
    pub radius: f32,
}

impl PuckScoreResult {
    pub fn is_borderline(&self) -> bool {
        !self.valid && self.alternate_points.is_some()
    }
}

/// All verdicts of one scoring pass plus per-team sums over valid entries.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundScore {
    pub results: Vec<PuckScoreResult>,
    pub red: i32,
    pub blue: i32,
}

impl RoundScore {
    pub fn from_results(results: Vec<PuckScoreResult>) -> Self {
        let mut out = Self {
            results,
            red: 0,
            blue: 0,
        };
        out.recompute_totals();
        out
    }

    pub fn team_total(&self, team: Team) -> i32 {
        match team {
            Team::Red => self.red,
            Team::Blue => self.blue,
        }
    }

    pub fn recompute_totals(&mut self) {
        let sum = |team: Team| -> i32 {
            self.results
                .iter()
                .filter(|r| r.valid && r.team == team)
                .map(|r| r.points)
                .sum()
        };
        let (red, blue) = (sum(Team::Red), sum(Team::Blue));
        self.red = red;
        self.blue = blue;
    }

    pub fn borderline(&self) -> impl Iterator<Item = (usize, &PuckScoreResult)> + '_ {
        self.results
            .iter()
            .enumerate()
            .filter(|(_, r)| r.is_borderline())
    }

    /// Overrule a borderline call: the entry at `index` becomes valid with
    /// its alternate value and the sums are recomputed.
    ///
    /// Returns `false` and changes nothing when the index is out of range or
    /// the entry carries no alternate.
    pub fn accept_alternate(&mut self, index: usize) -> bool {
        let Some(entry) = self.results.get_mut(index) else {
            return false;
        };
        let Some(points) = entry.alternate_points.take() else {
            return false;
        };
        entry.points = points;
        entry.valid = true;
        entry.zone = Zone::SCORING
            .into_iter()
            .find(|z| z.points() == points)
            .unwrap_or(entry.zone);
        self.recompute_totals();
        true
    }
}
