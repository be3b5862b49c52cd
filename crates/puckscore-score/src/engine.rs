//! Geometric zone assignment.
//!
//! A puck scores only if its whole footprint, grown by half the painted
//! line thickness and a touch epsilon, stays clear of every outer edge and
//! every boundary line. Clear pucks are placed by comparing their side of
//! each boundary line with the tip's side of it: each disagreement moves
//! the puck one zone further from the tip.

use log::debug;
use nalgebra::Point2;
use puckscore_core::{side_sign, CourtGeometry, Puck, Segment, Triangle};
use serde::{Deserialize, Serialize};

use crate::result::{PuckScoreResult, RoundScore, Zone};

/// Tolerances of one scoring pass. The radius comes from each puck.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringParams {
    /// Painted line width in buffer pixels; half of it is added to the radius.
    pub line_thickness: f32,
    /// Extra clearance so a puck that merely grazes a line is called touching.
    pub touch_epsilon: f32,
    /// Overlap up to which a touching puck still gets an alternate value.
    pub borderline_margin: f32,
}

impl Default for ScoringParams {
    fn default() -> Self {
        Self {
            line_thickness: 10.0,
            touch_epsilon: 1.0,
            borderline_margin: 3.0,
        }
    }
}

impl ScoringParams {
    /// Minimum center-to-segment distance for a puck of `radius`.
    #[inline]
    pub fn min_clearance(&self, radius: f32) -> f32 {
        radius + self.line_thickness * 0.5 + self.touch_epsilon
    }
}

/// Court geometry prepared for scoring: tip-normalized, with the tip's side
/// of every boundary line cached.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoringCourt {
    triangle: Triangle,
    edges: [Segment; 3],
    lines: [Segment; 3],
    tip_side: [i8; 3],
}

impl ScoringCourt {
    pub fn new(geometry: &CourtGeometry) -> Self {
        let tip = geometry.tip();
        let geometry = geometry.normalized();
        let triangle = geometry.triangle();
        let lines = geometry.lines;
        Self {
            triangle,
            edges: triangle.edges(),
            lines,
            tip_side: lines.map(|l| side_sign(l.side_of(tip))),
        }
    }

    pub fn triangle(&self) -> &Triangle {
        &self.triangle
    }

    /// Zone for a point known to be clear of every segment.
    pub fn zone_of(&self, p: Point2<f32>) -> Zone {
        let crossings = self
            .lines
            .iter()
            .zip(self.tip_side)
            .filter(|(line, tip)| side_sign(line.side_of(p)) != *tip)
            .count();
        Zone::from_crossings(crossings)
    }

    fn nearest_edge(&self, p: Point2<f32>) -> f32 {
        self.edges
            .iter()
            .map(|e| e.distance_to(p))
            .fold(f32::INFINITY, f32::min)
    }

    /// Score a single puck.
    pub fn score_puck(&self, puck: &Puck, params: &ScoringParams) -> PuckScoreResult {
        let p = puck.position;
        let min_clear = params.min_clearance(puck.radius);
        let verdict = |zone: Zone, margin: f32, alternate: Option<i32>| PuckScoreResult {
            team: puck.team,
            points: zone.points(),
            valid: zone.is_scoring(),
            zone,
            clearance_margin: margin,
            alternate_points: alternate,
            position: p,
            radius: puck.radius,
        };
        let alternate_for = |dist: f32| -> Option<i32> {
            (min_clear - dist <= params.borderline_margin).then(|| self.zone_of(p).points())
        };

        let inside = self.triangle.contains(p);
        let edge_dist = self.nearest_edge(p);
        if !inside {
            return verdict(Zone::Out, -edge_dist - min_clear, None);
        }
        if edge_dist <= min_clear {
            return verdict(Zone::Out, edge_dist - min_clear, alternate_for(edge_dist));
        }

        let mut nearest = edge_dist;
        for line in &self.lines {
            let d = line.distance_to(p);
            if d <= min_clear {
                return verdict(Zone::Line, d - min_clear, alternate_for(d));
            }
            nearest = nearest.min(d);
        }

        verdict(self.zone_of(p), nearest - min_clear, None)
    }
}

/// Score every puck against `geometry`.
///
/// Invalid pucks stay in the result with 0 points; team sums cover valid
/// entries only.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "debug", skip_all, fields(pucks = pucks.len()))
)]
pub fn score(pucks: &[Puck], geometry: &CourtGeometry, params: &ScoringParams) -> RoundScore {
    let court = ScoringCourt::new(geometry);
    let results: Vec<PuckScoreResult> = pucks
        .iter()
        .map(|puck| court.score_puck(puck, params))
        .collect();
    let round = RoundScore::from_results(results);
    debug!(
        "scored {} pucks: red={} blue={} borderline={}",
        round.results.len(),
        round.red,
        round.blue,
        round.borderline().count()
    );
    round
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use puckscore_core::Team;

    fn court() -> CourtGeometry {
        let p = Point2::new;
        CourtGeometry::new(
            Triangle::new(p(0.0, 0.0), p(0.0, 300.0), p(400.0, 150.0)),
            [
                Segment::new(p(300.0, 0.0), p(300.0, 300.0)),
                Segment::new(p(200.0, 0.0), p(200.0, 300.0)),
                Segment::new(p(100.0, 0.0), p(100.0, 300.0)),
            ],
        )
    }

    fn tight() -> ScoringParams {
        ScoringParams {
            line_thickness: 2.0,
            touch_epsilon: 0.0,
            borderline_margin: 3.0,
        }
    }

    fn score_one(puck: Puck) -> PuckScoreResult {
        score(&[puck], &court(), &tight()).results[0]
    }

    #[test]
    fn puck_near_tip_scores_ten() {
        let pucks = [Puck::at(Team::Red, 350.0, 150.0, 10.0)];
        let round = score(&pucks, &court(), &tight());
        let r = round.results[0];
        assert_eq!(r.zone, Zone::Ten);
        assert_eq!(r.points, 10);
        assert!(r.valid);
        assert!(r.clearance_margin > 0.0);
        assert_eq!(round.red, 10);
    }

    #[test]
    fn puck_on_line_is_invalid() {
        let pucks = [Puck::at(Team::Blue, 300.0, 150.0, 10.0)];
        let round = score(&pucks, &court(), &tight());
        let r = round.results[0];
        assert_eq!(r.zone, Zone::Line);
        assert_eq!(r.points, 0);
        assert!(!r.valid);
        assert_relative_eq!(r.clearance_margin, -11.0);
        assert_eq!(round.blue, 0);
    }

    #[test]
    fn every_zone_is_reachable() {
        let pucks = [
            Puck::at(Team::Red, 250.0, 150.0, 10.0),
            Puck::at(Team::Red, 150.0, 150.0, 10.0),
            Puck::at(Team::Blue, 50.0, 150.0, 10.0),
        ];
        let round = score(&pucks, &court(), &tight());
        let zones: Vec<Zone> = round.results.iter().map(|r| r.zone).collect();
        assert_eq!(zones, vec![Zone::Eight, Zone::Seven, Zone::MinusTen]);
        assert_eq!(round.red, 15);
        assert_eq!(round.blue, -10);
    }

    #[test]
    fn vertex_order_does_not_change_result() {
        let g = court();
        let rotated = CourtGeometry {
            a: g.c,
            b: g.a,
            c: g.b,
            ..g
        };
        let puck = [Puck::at(Team::Red, 250.0, 150.0, 10.0)];
        assert_eq!(score(&puck, &g, &tight()), score(&puck, &rotated, &tight()));
    }

    #[test]
    fn outside_triangle_is_out_with_negative_margin() {
        let r = score_one(Puck::at(Team::Red, 420.0, 150.0, 10.0));
        assert_eq!(r.zone, Zone::Out);
        assert!(!r.valid);
        assert!(r.clearance_margin < -11.0);
        assert_eq!(r.alternate_points, None);
    }

    #[test]
    fn grazing_the_edge_gets_an_alternate() {
        // AB is x = 0; min clearance 11, overlap 2
        let r = score_one(Puck::at(Team::Blue, 9.0, 150.0, 10.0));
        assert_eq!(r.zone, Zone::Out);
        assert_eq!(r.alternate_points, Some(-10));
        assert_relative_eq!(r.clearance_margin, -2.0);

        // overlap 5 is past the borderline margin
        let r = score_one(Puck::at(Team::Blue, 6.0, 150.0, 10.0));
        assert_eq!(r.alternate_points, None);
    }

    #[test]
    fn grazing_a_line_offers_the_zone_of_the_center() {
        let pucks = [Puck::at(Team::Red, 290.0, 150.0, 10.0)];
        let mut round = score(&pucks, &court(), &tight());
        let r = round.results[0];
        assert_eq!(r.zone, Zone::Line);
        assert_eq!(r.alternate_points, Some(8));

        assert!(round.accept_alternate(0));
        assert_eq!(round.red, 8);
    }

    #[test]
    fn larger_epsilon_never_validates_more() {
        let pucks: Vec<Puck> = (0..40)
            .map(|i| Puck::at(Team::Red, 20.0 + i as f32 * 9.5, 150.0, 10.0))
            .collect();
        let mut last = usize::MAX;
        for eps in [0.0, 1.0, 2.5, 5.0, 10.0, 25.0] {
            let params = ScoringParams {
                touch_epsilon: eps,
                ..tight()
            };
            let valid = score(&pucks, &court(), &params)
                .results
                .iter()
                .filter(|r| r.valid)
                .count();
            assert!(valid <= last);
            last = valid;
        }
    }

    #[test]
    fn center_on_line_is_invalid_for_any_epsilon() {
        for eps in [0.0, 0.5, 3.0, 40.0] {
            let params = ScoringParams {
                touch_epsilon: eps,
                line_thickness: 0.0,
                ..tight()
            };
            let pucks = [Puck::at(Team::Red, 200.0, 150.0, 0.0)];
            let r = score(&pucks, &court(), &params).results[0];
            assert!(!r.valid);
            assert_eq!(r.points, 0);
        }
    }

    #[test]
    fn sums_match_valid_entries() {
        let pucks: Vec<Puck> = (0..12)
            .map(|i| {
                let team = if i % 2 == 0 { Team::Red } else { Team::Blue };
                Puck::at(team, 15.0 + i as f32 * 33.0, 140.0 + i as f32, 8.0)
            })
            .collect();
        let round = score(&pucks, &court(), &ScoringParams::default());
        for team in Team::ALL {
            let expected: i32 = round
                .results
                .iter()
                .filter(|r| r.valid && r.team == team)
                .map(|r| r.points)
                .sum();
            assert_eq!(round.team_total(team), expected);
        }
    }
}
