//! Ring sampling along a path.
//!
//! The ring count comes from `round(length * segments_per_unit_length)` with
//! ties rounded to even; the rings are then spread uniformly in parameter
//! space, always including both ends of the path.

use super::path::{Path, PathSample};
use super::tunnel::TunnelError;

/// Fewest segments a tunnel can be built from.
pub const MIN_SEGMENTS: usize = 2;

/// One path evaluation destined to become a ring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingSample {
    pub parameter: f64,
    pub sample: PathSample,
}

/// Number of segments for a path of `length` at the given density.
#[must_use]
pub fn segment_count(length: f64, segments_per_unit_length: f64) -> usize {
    let raw = (length * segments_per_unit_length).round_ties_even();
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    // Saturating float-to-int cast.
    raw as usize
}

/// Ring parameters `i / total_segments` for `i` in `0..=total_segments`.
///
/// Empty when `total_segments` is below [`MIN_SEGMENTS`].
#[must_use]
pub fn ring_parameters(total_segments: usize) -> Vec<f64> {
    if total_segments < MIN_SEGMENTS {
        return Vec::new();
    }
    let denom = total_segments as f64;
    (0..=total_segments).map(|i| i as f64 / denom).collect()
}

/// Ring parameters for `path` at the given density (empty if the path is too short).
#[must_use]
pub fn sample_ring_parameters<P: Path + ?Sized>(path: &P, segments_per_unit_length: f64) -> Vec<f64> {
    ring_parameters(segment_count(path.length(), segments_per_unit_length))
}

/// Evaluates `path` once per ring parameter.
pub fn sample_path<P: Path + ?Sized>(
    path: &P,
    segments_per_unit_length: f64,
) -> Result<Vec<RingSample>, TunnelError> {
    let length = path.length();
    sample_segments(path, length, segment_count(length, segments_per_unit_length))
}

/// Evaluates `path` at `segments + 1` evenly spaced parameters.
///
/// `length` is only used to report [`TunnelError::InsufficientPath`].
pub fn sample_segments<P: Path + ?Sized>(
    path: &P,
    length: f64,
    segments: usize,
) -> Result<Vec<RingSample>, TunnelError> {
    if segments < MIN_SEGMENTS {
        return Err(TunnelError::InsufficientPath { length, segments });
    }

    Ok(ring_parameters(segments)
        .into_iter()
        .map(|parameter| RingSample {
            parameter,
            sample: path.evaluate(parameter),
        })
        .collect())
}
