//! Ring frames: the local basis each tunnel ring is laid out in.

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3};
use super::path::PathSample;
use super::sampler::RingSample;
use super::tunnel::TunnelError;

/// What to do when a path sample has its tangent parallel to its up vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DegenerateFramePolicy {
    /// Reuse the right vector of the nearest good ring.
    #[default]
    ReusePrevious,
    /// Fail the build with [`TunnelError::DegenerateFrame`].
    Abort,
}

/// Orthonormal-ish basis of one ring: `right ⟂ up`, `right ⟂ tangent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingFrame {
    pub center: Point3,
    pub tangent: Vec3,
    pub up: Vec3,
    pub right: Vec3,
    /// Normalized path parameter this ring was sampled at.
    pub parameter: f64,
}

impl RingFrame {
    /// Builds a frame with `right = normalize(tangent x up)`.
    ///
    /// Returns `None` when the sample cannot produce a right vector.
    #[must_use]
    pub fn from_sample(sample: PathSample, parameter: f64, tol: Tolerance) -> Option<Self> {
        let tangent = sample.tangent.normalized()?;
        let up = sample.up.normalized()?;
        let cross = tangent.cross(up);
        if cross.length() <= tol.eps {
            return None;
        }
        let right = cross.normalized()?;

        Some(Self {
            center: sample.position,
            tangent,
            up,
            right,
            parameter,
        })
    }

    /// Builds a frame around `sample` using a borrowed right vector.
    ///
    /// The borrowed vector is made perpendicular to the sample tangent and up
    /// is rebuilt from it, so the ring plane stays across the path.
    fn with_borrowed_right(sample: PathSample, parameter: f64, donor: &RingFrame) -> Self {
        let tangent = sample.tangent.normalized().unwrap_or(donor.tangent);
        let right = donor
            .right
            .reject_from(tangent)
            .normalized()
            .unwrap_or(donor.right);
        let up = right.cross(tangent).normalized().unwrap_or(donor.up);

        Self {
            center: sample.position,
            tangent,
            up,
            right,
            parameter,
        }
    }
}

/// Frames for a whole build plus how many of them were substituted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedFrames {
    pub frames: Vec<RingFrame>,
    pub substituted: usize,
}

/// Turns path samples into ring frames, applying `policy` to degenerate samples.
///
/// A sample with a non-finite position always fails, whatever the policy.
pub fn resolve_frames(
    samples: &[RingSample],
    policy: DegenerateFramePolicy,
    tol: Tolerance,
) -> Result<ResolvedFrames, TunnelError> {
    let mut raw: Vec<Option<RingFrame>> = Vec::with_capacity(samples.len());
    for (ring, sample) in samples.iter().enumerate() {
        if !sample.sample.position.is_finite() {
            return Err(TunnelError::DegenerateFrame { ring });
        }
        let frame = RingFrame::from_sample(sample.sample, sample.parameter, tol);
        if frame.is_none() && policy == DegenerateFramePolicy::Abort {
            return Err(TunnelError::DegenerateFrame { ring });
        }
        raw.push(frame);
    }

    let Some(first_good) = raw.iter().flatten().next().copied() else {
        return Err(TunnelError::DegenerateFrame { ring: 0 });
    };

    let mut frames = Vec::with_capacity(raw.len());
    let mut substituted = 0usize;
    let mut donor = first_good;

    for (frame, sample) in raw.into_iter().zip(samples) {
        match frame {
            Some(frame) => {
                donor = frame;
                frames.push(frame);
            }
            None => {
                substituted += 1;
                frames.push(RingFrame::with_borrowed_right(sample.sample, sample.parameter, &donor));
            }
        }
    }

    if substituted > 0 {
        log::warn!("substituted {substituted} degenerate ring frame(s) (tangent parallel to up)");
    }

    Ok(ResolvedFrames { frames, substituted })
}
