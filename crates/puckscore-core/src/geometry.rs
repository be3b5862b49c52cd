//! Court geometry: the scoring triangle, its boundary lines, and the
//! segment/half-plane primitives the scoring engine is built on.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Sign of a half-plane test value. Zero counts as the positive side so that a
/// point exactly on a line still gets a definite side.
#[inline]
pub fn side_sign(v: f32) -> i8 {
    if v < 0.0 {
        -1
    } else {
        1
    }
}

/// A line segment in buffer coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub p1: Point2<f32>,
    pub p2: Point2<f32>,
}

impl Segment {
    pub fn new(p1: Point2<f32>, p2: Point2<f32>) -> Self {
        Self { p1, p2 }
    }

    pub fn length(&self) -> f32 {
        (self.p2 - self.p1).norm()
    }

    /// Euclidean distance from `p` to the closest point of the segment.
    ///
    /// A zero-length segment degrades to the distance to its endpoint.
    pub fn distance_to(&self, p: Point2<f32>) -> f32 {
        let v = self.p2 - self.p1;
        let w = p - self.p1;
        let c1 = v.dot(&w);
        if c1 <= 0.0 {
            return w.norm();
        }
        let c2 = v.dot(&v);
        if c2 <= c1 {
            return (p - self.p2).norm();
        }
        let t = c1 / c2;
        (p - (self.p1 + v * t)).norm()
    }

    /// Signed cross product `(p2 - p1) x (p - p1)`.
    #[inline]
    pub fn side_of(&self, p: Point2<f32>) -> f32 {
        let v = self.p2 - self.p1;
        let w = p - self.p1;
        v.x * w.y - v.y * w.x
    }

    pub fn translated(&self, offset: Vector2<f32>) -> Self {
        Self {
            p1: self.p1 + offset,
            p2: self.p2 + offset,
        }
    }
}

/// Scoring triangle. After [`Triangle::with_tip_last`] the vertex `c` is the tip.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Triangle {
    pub a: Point2<f32>,
    pub b: Point2<f32>,
    pub c: Point2<f32>,
}

impl Triangle {
    pub fn new(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> Self {
        Self { a, b, c }
    }

    /// Reorder vertices so that `c` has the greatest x-coordinate.
    ///
    /// Ties keep the current `c`, which makes the operation idempotent.
    pub fn with_tip_last(&self) -> Self {
        if self.c.x >= self.a.x && self.c.x >= self.b.x {
            return *self;
        }
        if self.a.x >= self.b.x {
            Self::new(self.b, self.c, self.a)
        } else {
            Self::new(self.a, self.c, self.b)
        }
    }

    /// Outer edges AB, BC, CA.
    pub fn edges(&self) -> [Segment; 3] {
        [
            Segment::new(self.a, self.b),
            Segment::new(self.b, self.c),
            Segment::new(self.c, self.a),
        ]
    }

    /// Point-in-triangle test that is independent of vertex order and winding.
    ///
    /// Points on an edge count as inside.
    pub fn contains(&self, p: Point2<f32>) -> bool {
        let d1 = Segment::new(self.a, self.b).side_of(p);
        let d2 = Segment::new(self.b, self.c).side_of(p);
        let d3 = Segment::new(self.c, self.a).side_of(p);
        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        !(has_neg && has_pos)
    }

    /// Axis-aligned bounds as `(min, max)`.
    pub fn bounds(&self) -> (Point2<f32>, Point2<f32>) {
        let min = Point2::new(
            self.a.x.min(self.b.x).min(self.c.x),
            self.a.y.min(self.b.y).min(self.c.y),
        );
        let max = Point2::new(
            self.a.x.max(self.b.x).max(self.c.x),
            self.a.y.max(self.b.y).max(self.c.y),
        );
        (min, max)
    }

    pub fn translated(&self, offset: Vector2<f32>) -> Self {
        Self::new(self.a + offset, self.b + offset, self.c + offset)
    }
}

/// Additive geometry offset supplied by an external drift tracker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftOffset {
    pub dx: f32,
    pub dy: f32,
}

impl DriftOffset {
    pub const ZERO: DriftOffset = DriftOffset { dx: 0.0, dy: 0.0 };

    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }

    #[inline]
    pub fn as_vector(&self) -> Vector2<f32> {
        Vector2::new(self.dx, self.dy)
    }
}

/// Calibrated court: triangle vertices plus the three boundary lines
/// separating zones 10 | 8 | 7 | -10, ordered from the tip toward the base.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CourtGeometry {
    pub a: Point2<f32>,
    pub b: Point2<f32>,
    pub c: Point2<f32>,
    pub lines: [Segment; 3],
}

impl CourtGeometry {
    pub fn new(triangle: Triangle, lines: [Segment; 3]) -> Self {
        Self {
            a: triangle.a,
            b: triangle.b,
            c: triangle.c,
            lines,
        }
    }

    #[inline]
    pub fn triangle(&self) -> Triangle {
        Triangle::new(self.a, self.b, self.c)
    }

    /// The tip vertex after normalization.
    pub fn tip(&self) -> Point2<f32> {
        self.triangle().with_tip_last().c
    }

    /// Re-sort the vertices in place so `c` is the rightmost one.
    pub fn normalize_tip(&mut self) {
        let t = self.triangle().with_tip_last();
        self.a = t.a;
        self.b = t.b;
        self.c = t.c;
    }

    /// Copy with the tip invariant applied.
    pub fn normalized(&self) -> Self {
        let mut out = *self;
        out.normalize_tip();
        out
    }

    /// Copy with every point translated by the drift offset.
    pub fn shifted(&self, offset: DriftOffset) -> Self {
        if offset.is_zero() {
            return *self;
        }
        let v = offset.as_vector();
        Self {
            a: self.a + v,
            b: self.b + v,
            c: self.c + v,
            lines: self.lines.map(|l| l.translated(v)),
        }
    }

    /// Whether all coordinates are finite.
    pub fn is_finite(&self) -> bool {
        let pts = [
            self.a,
            self.b,
            self.c,
            self.lines[0].p1,
            self.lines[0].p2,
            self.lines[1].p1,
            self.lines[1].p2,
            self.lines[2].p1,
            self.lines[2].p2,
        ];
        pts.iter().all(|p| p.x.is_finite() && p.y.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f32, y: f32) -> Point2<f32> {
        Point2::new(x, y)
    }

    fn permutations(a: Point2<f32>, b: Point2<f32>, c: Point2<f32>) -> [Triangle; 6] {
        [
            Triangle::new(a, b, c),
            Triangle::new(a, c, b),
            Triangle::new(b, a, c),
            Triangle::new(b, c, a),
            Triangle::new(c, a, b),
            Triangle::new(c, b, a),
        ]
    }

    #[test]
    fn tip_normalization_moves_rightmost_vertex_to_c() {
        for t in permutations(p(0.0, 0.0), p(0.0, 300.0), p(400.0, 150.0)) {
            let n = t.with_tip_last();
            assert_eq!(n.c, p(400.0, 150.0));
        }
    }

    #[test]
    fn tip_normalization_is_idempotent() {
        let sets = [
            (p(0.0, 0.0), p(0.0, 300.0), p(400.0, 150.0)),
            (p(10.0, 5.0), p(10.0, 90.0), p(10.0, 40.0)),
            (p(50.0, 0.0), p(50.0, 100.0), p(-20.0, 50.0)),
        ];
        for (a, b, c) in sets {
            for t in permutations(a, b, c) {
                let once = t.with_tip_last();
                assert_eq!(once.with_tip_last(), once);
            }
        }
    }

    #[test]
    fn contains_is_invariant_to_vertex_order() {
        let samples = [
            p(100.0, 150.0),
            p(399.0, 150.0),
            p(0.0, 150.0),
            p(200.0, 100.0),
            p(-1.0, 150.0),
            p(350.0, 20.0),
            p(200.0, 50.0),
        ];
        let reference = Triangle::new(p(0.0, 0.0), p(0.0, 300.0), p(400.0, 150.0));
        for t in permutations(reference.a, reference.b, reference.c) {
            for q in samples {
                assert_eq!(t.contains(q), reference.contains(q), "point {q:?}");
            }
        }
        assert!(reference.contains(p(100.0, 150.0)));
        assert!(!reference.contains(p(-1.0, 150.0)));
        assert!(!reference.contains(p(350.0, 20.0)));
    }

    #[test]
    fn segment_distance_handles_projection_cases() {
        let s = Segment::new(p(0.0, 0.0), p(10.0, 0.0));
        assert_relative_eq!(s.distance_to(p(5.0, 3.0)), 3.0);
        assert_relative_eq!(s.distance_to(p(-3.0, 4.0)), 5.0);
        assert_relative_eq!(s.distance_to(p(13.0, 4.0)), 5.0);
    }

    #[test]
    fn zero_length_segment_collapses_to_point_distance() {
        let s = Segment::new(p(2.0, 2.0), p(2.0, 2.0));
        assert_relative_eq!(s.length(), 0.0);
        assert_relative_eq!(s.distance_to(p(5.0, 6.0)), 5.0);
    }

    #[test]
    fn side_sign_treats_zero_as_positive() {
        let s = Segment::new(p(0.0, 0.0), p(0.0, 10.0));
        assert_eq!(side_sign(s.side_of(p(0.0, 5.0))), 1);
        assert_eq!(
            side_sign(s.side_of(p(1.0, 5.0))),
            -side_sign(s.side_of(p(-1.0, 5.0)))
        );
    }

    #[test]
    fn geometry_and_drift_survive_json() {
        let g = CourtGeometry::new(
            Triangle::new(p(12.5, 8.0), p(12.5, 410.0), p(600.25, 209.0)),
            [
                Segment::new(p(480.0, 150.0), p(480.0, 270.0)),
                Segment::new(p(330.0, 90.0), p(340.0, 330.0)),
                Segment::new(p(170.0, 40.0), p(180.0, 380.0)),
            ],
        );
        let json = serde_json::to_string(&g).expect("serialize geometry");
        let back: CourtGeometry = serde_json::from_str(&json).expect("parse geometry");
        assert_eq!(back, g);
        assert_eq!(back.tip(), p(600.25, 209.0));

        let drift = DriftOffset::new(-3.5, 7.25);
        let json = serde_json::to_string(&drift).expect("serialize drift");
        assert_eq!(json, r#"{"dx":-3.5,"dy":7.25}"#);
        let back: DriftOffset = serde_json::from_str(&json).expect("parse drift");
        assert_eq!(back, drift);
    }

    #[test]
    fn zero_drift_is_identity() {
        let g = CourtGeometry::new(
            Triangle::new(p(0.0, 0.0), p(0.0, 300.0), p(400.0, 150.0)),
            [
                Segment::new(p(300.0, 0.0), p(300.0, 300.0)),
                Segment::new(p(200.0, 0.0), p(200.0, 300.0)),
                Segment::new(p(100.0, 0.0), p(100.0, 300.0)),
            ],
        );
        assert_eq!(g.shifted(DriftOffset::ZERO), g);
        let moved = g.shifted(DriftOffset::new(5.0, -2.0));
        assert_eq!(moved.c, p(405.0, 148.0));
        assert_eq!(moved.lines[1].p2, p(205.0, 298.0));
    }
}
