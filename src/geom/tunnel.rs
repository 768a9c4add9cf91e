//! Tunnel (open tube) mesh generation along a [`Path`].
//!
//! This module provides:
//! - [`TunnelMeshBuilder`]: incremental ring emission and stitching
//! - [`build_tunnel_mesh`]: tube from already resolved [`RingFrame`]s
//! - [`tunnel_mesh_from_path`]: sampling, frame resolution and building in one call
//!
//! Each ring is a regular `sides`-gon in the plane spanned by the frame's
//! `right` and `up` vectors. Consecutive rings are joined by two triangles per
//! side, wound so that face normals point away from the path.

use std::f64::consts::TAU;

use crate::config::{ConfigError, TunnelConfig};

use super::core::{BBox, Point3, Tolerance, Vec3};
use super::diagnostics::{TunnelDiagnostics, count_edge_topology};
use super::frame::{ResolvedFrames, RingFrame, resolve_frames};
use super::metrics::{TimingBucket, TunnelMetrics};
use super::path::Path;
use super::sampler::{MIN_SEGMENTS, sample_segments, segment_count};

/// Largest vertex count addressable with `u32` indices.
const MAX_VERTEX_COUNT: usize = u32::MAX as usize;

#[derive(Debug, thiserror::Error)]
pub enum TunnelError {
    #[error("path of length {length} yields {segments} segment(s); at least 2 are required")]
    InsufficientPath { length: f64, segments: usize },
    #[error("ring {ring} has no usable frame (tangent parallel to up or non-finite position)")]
    DegenerateFrame { ring: usize },
    #[error("invalid tunnel configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),
    #[error("tunnel would need {vertex_count} vertices, more than u32 indices can address")]
    MeshTooLarge { vertex_count: usize },
}

impl TunnelError {
    /// Returns `true` for failures caused by the path being too short to build from.
    #[must_use]
    pub fn is_insufficient_path(&self) -> bool {
        matches!(self, Self::InsufficientPath { .. })
    }
}

/// Cross-section options for building a tunnel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TunnelOptions {
    /// Vertices per ring.
    pub sides: usize,
    /// Distance from the path to every ring vertex.
    pub radius: f64,
}

impl Default for TunnelOptions {
    fn default() -> Self {
        Self { sides: 8, radius: 5.0 }
    }
}

/// Render-ready tube buffers.
///
/// `positions`, `normals` and `uvs` all hold `ring_count * sides` entries;
/// ring `i` occupies the index range `i * sides .. (i + 1) * sides`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TunnelMesh {
    pub positions: Vec<[f64; 3]>,
    pub normals: Vec<[f64; 3]>,
    pub uvs: Vec<[f64; 2]>,
    pub indices: Vec<u32>,
    /// Axis-aligned bounds of all positions; `None` for an empty mesh.
    pub bounds: Option<BBox>,
    pub ring_count: usize,
    pub sides: usize,
}

impl TunnelMesh {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Checks the buffer invariants a renderer relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            return Err("mesh indices are not a triangle list (len % 3 != 0)".to_string());
        }
        if self.positions.iter().flatten().any(|c| !c.is_finite()) {
            return Err("mesh has invalid vertex coordinates (NaN/Inf)".to_string());
        }
        if self.normals.iter().flatten().any(|c| !c.is_finite()) {
            return Err("mesh has invalid normals (NaN/Inf)".to_string());
        }
        let vertex_count = self.positions.len();
        if self.indices.iter().any(|&i| i as usize >= vertex_count) {
            return Err("mesh has out-of-bounds vertex indices".to_string());
        }
        if self.normals.len() != vertex_count || self.uvs.len() != vertex_count {
            return Err("mesh attribute buffers do not match vertex count".to_string());
        }
        if vertex_count != self.ring_count * self.sides {
            return Err(format!(
                "mesh has {vertex_count} vertices, expected {} rings x {} sides",
                self.ring_count, self.sides
            ));
        }
        Ok(())
    }

    /// Vertex positions of ring `ring`, or `None` if out of range.
    #[must_use]
    pub fn ring(&self, ring: usize) -> Option<&[[f64; 3]]> {
        if ring >= self.ring_count {
            return None;
        }
        let start = ring * self.sides;
        self.positions.get(start..start + self.sides)
    }

    /// Returns the position buffer as a flat slice: `[x0, y0, z0, x1, y1, z1, ...]`.
    ///
    /// Zero-copy, meant for wasm/JS adapters that expect packed numeric buffers.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        flatten_f64_array_slice::<3>(&self.positions)
    }

    /// Returns the normal buffer as a flat slice: `[nx0, ny0, nz0, ...]`.
    #[must_use]
    pub fn normals_flat(&self) -> &[f64] {
        flatten_f64_array_slice::<3>(&self.normals)
    }

    /// Returns the UV buffer as a flat slice: `[u0, v0, u1, v1, ...]`.
    #[must_use]
    pub fn uvs_flat(&self) -> &[f64] {
        flatten_f64_array_slice::<2>(&self.uvs)
    }
}

fn flatten_f64_array_slice<const N: usize>(data: &[[f64; N]]) -> &[f64] {
    let count = data.len().checked_mul(N).unwrap_or(0);
    let ptr = data.as_ptr().cast::<f64>();
    // SAFETY: `[[f64; N]]` is stored contiguously, and we compute the element count as `len * N`.
    unsafe { std::slice::from_raw_parts(ptr, count) }
}

// ─────────────────────────────────────────────────────────────────────────────
// Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Accumulates rings into tube buffers.
///
/// Every call to [`emit_ring`](Self::emit_ring) after the first also stitches
/// the new ring to the previous one.
#[derive(Debug)]
pub struct TunnelMeshBuilder {
    sides: usize,
    radius: f64,
    mesh: TunnelMesh,
}

impl TunnelMeshBuilder {
    pub fn new(sides: usize, radius: f64) -> Result<Self, TunnelError> {
        if sides < 3 {
            return Err(ConfigError::SidesOutOfRange { sides }.into());
        }
        if !radius.is_finite() || radius <= 0.0 {
            return Err(ConfigError::InvalidRadius { radius }.into());
        }
        Ok(Self {
            sides,
            radius,
            mesh: TunnelMesh {
                sides,
                ..TunnelMesh::default()
            },
        })
    }

    pub fn from_options(options: TunnelOptions) -> Result<Self, TunnelError> {
        Self::new(options.sides, options.radius)
    }

    /// Reserves buffer space for `rings` rings.
    pub fn reserve_rings(&mut self, rings: usize) {
        let vertices = rings.saturating_mul(self.sides);
        self.mesh.positions.reserve(vertices);
        self.mesh.normals.reserve(vertices);
        self.mesh.uvs.reserve(vertices);
        self.mesh
            .indices
            .reserve(rings.saturating_sub(1).saturating_mul(self.sides * 6));
    }

    #[must_use]
    pub fn ring_count(&self) -> usize {
        self.mesh.ring_count
    }

    /// Emits the ring for `frame` and stitches it to the previous ring.
    pub fn emit_ring(&mut self, frame: &RingFrame) -> Result<(), TunnelError> {
        let vertex_count = self.mesh.positions.len() + self.sides;
        if vertex_count > MAX_VERTEX_COUNT {
            return Err(TunnelError::MeshTooLarge { vertex_count });
        }

        let center = frame.center;
        let sides_f = self.sides as f64;
        for j in 0..self.sides {
            let angle = TAU * j as f64 / sides_f;
            let offset = frame.right * (self.radius * angle.cos()) + frame.up * (self.radius * angle.sin());
            let vertex = center.add_vec(offset);
            let normal = offset.normalized().unwrap_or(frame.right);

            self.mesh.bounds = Some(match self.mesh.bounds {
                Some(bounds) => bounds.expand_point(vertex),
                None => BBox::from_point(vertex),
            });
            self.mesh.positions.push(vertex.to_array());
            self.mesh.normals.push(normal.to_array());
            self.mesh.uvs.push([j as f64 / sides_f, frame.parameter]);
        }

        self.mesh.ring_count += 1;
        if self.mesh.ring_count > 1 {
            self.stitch(self.mesh.ring_count - 1);
        }
        Ok(())
    }

    /// Two triangles per side between ring `ring - 1` and ring `ring`.
    fn stitch(&mut self, ring: usize) {
        let sides = self.sides;
        let base = (ring - 1) * sides;
        for j in 0..sides {
            let next = (j + 1) % sides;
            // Indices fit: emit_ring caps the vertex count at u32::MAX.
            let p1 = (base + j) as u32;
            let p2 = (base + next) as u32;
            let c1 = (base + sides + j) as u32;
            let c2 = (base + sides + next) as u32;
            self.mesh.indices.extend_from_slice(&[p1, c1, c2, p1, c2, p2]);
        }
    }

    #[must_use]
    pub fn finish(self) -> TunnelMesh {
        self.mesh
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot builds
// ─────────────────────────────────────────────────────────────────────────────

/// Builds a tube through `frames`.
///
/// At least three frames (two segments) are needed; fewer is reported as
/// [`TunnelError::InsufficientPath`].
pub fn build_tunnel_mesh(
    frames: &[RingFrame],
    options: TunnelOptions,
) -> Result<(TunnelMesh, TunnelDiagnostics), TunnelError> {
    let mut metrics = TunnelMetrics::default();
    metrics.begin();
    let resolved = ResolvedFrames {
        frames: frames.to_vec(),
        substituted: 0,
    };
    build_from_resolved(&resolved, options, &mut metrics)
}

/// Samples `path`, resolves its frames and builds the tube described by `config`.
pub fn tunnel_mesh_from_path<P: Path + ?Sized>(
    path: &P,
    config: &TunnelConfig,
) -> Result<(TunnelMesh, TunnelDiagnostics), TunnelError> {
    config.validate()?;

    let mut metrics = TunnelMetrics::default();
    metrics.begin();

    let length = path.length();
    let segments = segment_count(length, config.segments_per_unit_length);
    check_vertex_budget(length * config.segments_per_unit_length, segments, config.sides)?;

    let samples = metrics.time(TimingBucket::Sampling, || sample_segments(path, length, segments))?;
    let resolved = metrics.time(TimingBucket::Frames, || {
        resolve_frames(&samples, config.degenerate_frames, Tolerance::FRAME)
    })?;

    log::debug!(
        "tunnel: {} rings from path of length {length:.3}",
        resolved.frames.len()
    );

    build_from_resolved(&resolved, config.options(), &mut metrics)
}

/// Rejects builds whose rings would not fit in `u32` indices, before any
/// per-ring buffer is allocated.
///
/// `raw_segments` is the unrounded `length * density`; an infinite value means
/// the path is too long to count.
fn check_vertex_budget(raw_segments: f64, segments: usize, sides: usize) -> Result<(), TunnelError> {
    if raw_segments.is_infinite() && raw_segments > 0.0 {
        return Err(TunnelError::MeshTooLarge {
            vertex_count: usize::MAX,
        });
    }
    let vertex_count = segments.saturating_add(1).saturating_mul(sides);
    if vertex_count > MAX_VERTEX_COUNT {
        return Err(TunnelError::MeshTooLarge { vertex_count });
    }
    Ok(())
}

fn build_from_resolved(
    resolved: &ResolvedFrames,
    options: TunnelOptions,
    metrics: &mut TunnelMetrics,
) -> Result<(TunnelMesh, TunnelDiagnostics), TunnelError> {
    let frames = &resolved.frames;
    if frames.len() < MIN_SEGMENTS + 1 {
        return Err(TunnelError::InsufficientPath {
            length: polyline_length(frames.iter().map(|f| f.center)),
            segments: frames.len().saturating_sub(1),
        });
    }

    let vertex_count = frames.len().saturating_mul(options.sides);
    if vertex_count > MAX_VERTEX_COUNT {
        return Err(TunnelError::MeshTooLarge { vertex_count });
    }

    let mesh = metrics.time(TimingBucket::Rings, || -> Result<TunnelMesh, TunnelError> {
        let mut builder = TunnelMeshBuilder::from_options(options)?;
        builder.reserve_rings(frames.len());
        for frame in frames {
            if !frame.center.is_finite() || !frame.right.is_finite() || !frame.up.is_finite() {
                return Err(TunnelError::DegenerateFrame {
                    ring: builder.ring_count(),
                });
            }
            builder.emit_ring(frame)?;
        }
        Ok(builder.finish())
    })?;

    let (open_edge_count, non_manifold_edge_count) =
        metrics.time(TimingBucket::Diagnostics, || count_edge_topology(&mesh.indices));

    let mut diagnostics = TunnelDiagnostics {
        ring_count: mesh.ring_count,
        sides: mesh.sides,
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        open_edge_count,
        non_manifold_edge_count,
        substituted_frame_count: resolved.substituted,
        timing: metrics.end(),
        warnings: Vec::new(),
    };
    if resolved.substituted > 0 {
        diagnostics.add_warning(format!(
            "{} ring frame(s) rebuilt from a neighbouring ring",
            resolved.substituted
        ));
    }
    if !diagnostics.is_manifold() {
        diagnostics.add_warning("tube has non-manifold edges");
    }

    Ok((mesh, diagnostics))
}

fn polyline_length(points: impl Iterator<Item = Point3>) -> f64 {
    let mut prev: Option<Point3> = None;
    let mut length = 0.0;
    for p in points {
        if let Some(q) = prev {
            length += p.distance_to(q);
        }
        prev = Some(p);
    }
    length
}

/// Outward face normal of triangle `tri` (indices into `positions`).
#[must_use]
pub fn face_normal(positions: &[[f64; 3]], tri: [u32; 3]) -> Option<Vec3> {
    let a = Point3::from(*positions.get(tri[0] as usize)?);
    let b = Point3::from(*positions.get(tri[1] as usize)?);
    let c = Point3::from(*positions.get(tri[2] as usize)?);
    b.sub_point(a).cross(c.sub_point(a)).normalized()
}
