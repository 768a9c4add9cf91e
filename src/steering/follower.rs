use crate::geom::{Point3, SplinePath};

pub const DEFAULT_MAX_KNOTS: usize = 50;
pub const DEFAULT_SEGMENT_LENGTH: f64 = 2.0;

/// Lays a spline trail behind a moving point.
///
/// A knot is dropped whenever the followed position is at least
/// `segment_length` away from the last knot; once the trail holds more than
/// `max_knots` knots, the oldest one is removed.
#[derive(Debug, Clone, PartialEq)]
pub struct PathFollower {
    path: SplinePath,
    max_knots: usize,
    segment_length: f64,
    last_knot: Point3,
}

impl PathFollower {
    /// Starts a trail with a single knot at `start`.
    #[must_use]
    pub fn new(start: Point3, max_knots: usize, segment_length: f64) -> Self {
        Self {
            path: SplinePath::from_knots(vec![start]),
            max_knots: max_knots.max(1),
            segment_length,
            last_knot: start,
        }
    }

    #[must_use]
    pub fn path(&self) -> &SplinePath {
        &self.path
    }

    #[must_use]
    pub fn max_knots(&self) -> usize {
        self.max_knots
    }

    #[must_use]
    pub fn segment_length(&self) -> f64 {
        self.segment_length
    }

    /// Feeds the followed position; returns `true` if the trail changed.
    pub fn update(&mut self, position: Point3) -> bool {
        if position.distance_to(self.last_knot) < self.segment_length {
            return false;
        }

        self.path.push_knot(position);
        self.last_knot = position;
        if self.path.knot_count() > self.max_knots {
            self.path.remove_first_knot();
        }
        true
    }

    /// Drops the trail and restarts it at `start`.
    pub fn reset(&mut self, start: Point3) {
        self.path.clear();
        self.path.push_knot(start);
        self.last_knot = start;
    }
}

impl Default for PathFollower {
    fn default() -> Self {
        Self::new(Point3::ORIGIN, DEFAULT_MAX_KNOTS, DEFAULT_SEGMENT_LENGTH)
    }
}
