//! Paths a tunnel can follow.
//!
//! [`Path`] is the read-only view the tunnel builder needs: a total length and
//! an evaluation at a normalized parameter `t ∈ [0, 1]` returning position,
//! tangent and an up reference. Implementors only have to provide
//! [`Path::point_at`]; tangents and length fall back to numerical estimates.

use super::core::{Point3, Tolerance, Vec3};

/// Number of chords used by the default [`Path::length`].
pub const DEFAULT_LENGTH_SAMPLES: usize = 256;

/// Chords per spline segment when measuring a [`SplinePath`].
const SPLINE_LENGTH_SAMPLES_PER_SEGMENT: usize = 24;

/// Result of evaluating a path at one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub position: Point3,
    /// Unit tangent, or zero when the path has no direction at this parameter.
    pub tangent: Vec3,
    /// Up reference; not necessarily orthogonal to `tangent`.
    pub up: Vec3,
}

pub trait Path {
    fn point_at(&self, t: f64) -> Point3;

    #[must_use]
    fn derivative_at(&self, t: f64) -> Vec3 {
        let h = Tolerance::DERIVATIVE.eps;
        let t0 = (t - h).max(0.0);
        let t1 = (t + h).min(1.0);
        if t1 <= t0 {
            return Vec3::ZERO;
        }

        let p0 = self.point_at(t0);
        let p1 = self.point_at(t1);
        p1.sub_point(p0).mul_scalar(1.0 / (t1 - t0))
    }

    #[must_use]
    fn up_at(&self, _t: f64) -> Vec3 {
        Vec3::Y
    }

    /// Total arc length.
    #[must_use]
    fn length(&self) -> f64 {
        path_arc_length(self, DEFAULT_LENGTH_SAMPLES)
    }

    #[must_use]
    fn evaluate(&self, t: f64) -> PathSample {
        let t = t.clamp(0.0, 1.0);
        PathSample {
            position: self.point_at(t),
            tangent: self.derivative_at(t).normalized().unwrap_or(Vec3::ZERO),
            up: self.up_at(t),
        }
    }
}

impl<P: Path + ?Sized> Path for &P {
    fn point_at(&self, t: f64) -> Point3 {
        (**self).point_at(t)
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        (**self).derivative_at(t)
    }

    fn up_at(&self, t: f64) -> Vec3 {
        (**self).up_at(t)
    }

    fn length(&self) -> f64 {
        (**self).length()
    }

    fn evaluate(&self, t: f64) -> PathSample {
        (**self).evaluate(t)
    }
}

/// Chord-length approximation of a path's arc length.
#[must_use]
pub fn path_arc_length<P: Path + ?Sized>(path: &P, samples: usize) -> f64 {
    let samples = samples.max(1);
    let mut length = 0.0;
    let mut prev = path.point_at(0.0);
    for i in 1..=samples {
        let curr = path.point_at(i as f64 / samples as f64);
        let chord = curr.sub_point(prev).length();
        if chord.is_finite() {
            length += chord;
        }
        prev = curr;
    }
    length
}

// ─────────────────────────────────────────────────────────────────────────────
// Line3
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    pub start: Point3,
    pub end: Point3,
    pub up: Vec3,
}

impl Line3 {
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end, up: Vec3::Y }
    }

    #[must_use]
    pub const fn with_up(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    #[must_use]
    pub const fn direction(self) -> Vec3 {
        self.end.sub_point(self.start)
    }
}

impl Path for Line3 {
    fn point_at(&self, t: f64) -> Point3 {
        self.start.lerp(self.end, t.clamp(0.0, 1.0))
    }

    fn derivative_at(&self, _t: f64) -> Vec3 {
        self.direction()
    }

    fn up_at(&self, _t: f64) -> Vec3 {
        self.up
    }

    fn length(&self) -> f64 {
        self.direction().length()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// SplinePath
// ─────────────────────────────────────────────────────────────────────────────

/// Open spline through a list of knots, one cubic Bézier segment per knot pair.
///
/// Inner control points are chosen automatically from the neighbouring knots
/// (Catmull-Rom style), so the curve is C1 through every knot. The parameter
/// is spread uniformly over segments, not over arc length.
#[derive(Debug, Clone, PartialEq)]
pub struct SplinePath {
    knots: Vec<Point3>,
    up: Vec3,
}

impl SplinePath {
    #[must_use]
    pub fn new() -> Self {
        Self::from_knots(Vec::new())
    }

    #[must_use]
    pub fn from_knots(knots: Vec<Point3>) -> Self {
        Self { knots, up: Vec3::Y }
    }

    #[must_use]
    pub fn with_up(mut self, up: Vec3) -> Self {
        self.up = up;
        self
    }

    #[must_use]
    pub fn knots(&self) -> &[Point3] {
        &self.knots
    }

    #[must_use]
    pub fn knot_count(&self) -> usize {
        self.knots.len()
    }

    pub fn push_knot(&mut self, knot: Point3) {
        self.knots.push(knot);
    }

    /// Removes the oldest knot, if any.
    pub fn remove_first_knot(&mut self) -> Option<Point3> {
        if self.knots.is_empty() {
            None
        } else {
            Some(self.knots.remove(0))
        }
    }

    pub fn clear(&mut self) {
        self.knots.clear();
    }

    fn segment_count(&self) -> usize {
        self.knots.len().saturating_sub(1)
    }

    /// Maps a global parameter to `(segment index, local parameter)`.
    fn locate(&self, t: f64) -> (usize, f64) {
        let segments = self.segment_count();
        let scaled = t.clamp(0.0, 1.0) * segments as f64;
        let index = (scaled.floor() as usize).min(segments - 1);
        (index, scaled - index as f64)
    }

    /// Bézier control points of segment `i` (requires `i + 1 < knots.len()`).
    fn segment(&self, i: usize) -> [Point3; 4] {
        let last = self.knots.len() - 1;
        let p0 = self.knots[i];
        let p3 = self.knots[i + 1];
        let before = self.knots[i.saturating_sub(1)];
        let after = self.knots[(i + 2).min(last)];

        let p1 = p0.add_vec(p3.sub_point(before).mul_scalar(1.0 / 6.0));
        let p2 = p3.add_vec(after.sub_point(p0).mul_scalar(-1.0 / 6.0));
        [p0, p1, p2, p3]
    }
}

impl Default for SplinePath {
    fn default() -> Self {
        Self::new()
    }
}

impl Path for SplinePath {
    fn point_at(&self, t: f64) -> Point3 {
        match self.knots.len() {
            0 => Point3::ORIGIN,
            1 => self.knots[0],
            _ => {
                let (i, u) = self.locate(t);
                bezier_point(self.segment(i), u)
            }
        }
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        if self.knots.len() < 2 {
            return Vec3::ZERO;
        }
        let (i, u) = self.locate(t);
        // d/dt = d/du * segments
        bezier_derivative(self.segment(i), u).mul_scalar(self.segment_count() as f64)
    }

    fn up_at(&self, _t: f64) -> Vec3 {
        self.up
    }

    fn length(&self) -> f64 {
        (0..self.segment_count())
            .map(|i| {
                let segment = self.segment(i);
                let mut length = 0.0;
                let mut prev = segment[0];
                for s in 1..=SPLINE_LENGTH_SAMPLES_PER_SEGMENT {
                    let curr = bezier_point(segment, s as f64 / SPLINE_LENGTH_SAMPLES_PER_SEGMENT as f64);
                    length += curr.sub_point(prev).length();
                    prev = curr;
                }
                length
            })
            .sum()
    }
}

fn bezier_point([p0, p1, p2, p3]: [Point3; 4], t: f64) -> Point3 {
    let u = 1.0 - t;
    let w0 = u * u * u;
    let w1 = 3.0 * u * u * t;
    let w2 = 3.0 * u * t * t;
    let w3 = t * t * t;
    Point3::new(
        p0.x * w0 + p1.x * w1 + p2.x * w2 + p3.x * w3,
        p0.y * w0 + p1.y * w1 + p2.y * w2 + p3.y * w3,
        p0.z * w0 + p1.z * w1 + p2.z * w2 + p3.z * w3,
    )
}

fn bezier_derivative([p0, p1, p2, p3]: [Point3; 4], t: f64) -> Vec3 {
    let u = 1.0 - t;
    let a = p1.sub_point(p0);
    let b = p2.sub_point(p1);
    let c = p3.sub_point(p2);
    a.mul_scalar(3.0 * u * u)
        .add(b.mul_scalar(6.0 * u * t))
        .add(c.mul_scalar(3.0 * t * t))
}
