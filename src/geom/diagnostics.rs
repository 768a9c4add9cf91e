//! Diagnostics for tunnel mesh builds.
//!
//! Diagnostics are collected while a tunnel is built and returned next to the
//! mesh. They are meant for:
//!
//! - Checking the tube topology (an open tube has exactly `2 * sides` open edges)
//! - Spotting paths that needed frame fallbacks
//! - Performance profiling (timing buckets)
//!
//! # Example
//!
//! ```ignore
//! use tunnel_engine::geom::{Line3, Point3, tunnel_mesh_from_path};
//! use tunnel_engine::config::TunnelConfig;
//!
//! let path = Line3::new(Point3::ORIGIN, Point3::new(0.0, 0.0, 10.0));
//! let (mesh, diagnostics) = tunnel_mesh_from_path(&path, &TunnelConfig::default())?;
//! log::info!("{diagnostics}");
//! ```

use std::collections::HashMap;
use std::fmt;

/// Counts and warnings for one tunnel build.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TunnelDiagnostics {
    /// Number of rings emitted.
    pub ring_count: usize,

    /// Vertices per ring.
    pub sides: usize,

    /// Total number of vertices in the final mesh.
    pub vertex_count: usize,

    /// Total number of triangles in the final mesh.
    pub triangle_count: usize,

    /// Edges with a single adjacent triangle.
    ///
    /// The tube is open at both ends, so a healthy build reports `2 * sides`.
    pub open_edge_count: usize,

    /// Edges shared by more than two triangles. Zero for a healthy build.
    pub non_manifold_edge_count: usize,

    /// Rings whose frame was rebuilt from a neighbour because the path's
    /// tangent was parallel to its up vector.
    pub substituted_frame_count: usize,

    /// Optional timing breakdown; only populated with the `tunnel_metrics`
    /// feature on non-wasm targets.
    pub timing: Option<super::metrics::TunnelTimingReport>,

    /// Human-readable warnings about the build.
    pub warnings: Vec<String>,
}

impl TunnelDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no edge is shared by more than two triangles.
    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Returns `true` if the only open edges are the two end loops of the tube.
    #[must_use]
    pub fn is_open_tube(&self) -> bool {
        self.ring_count >= 2 && self.open_edge_count == 2 * self.sides && self.is_manifold()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Short summary for logging: `"R:{rings} V:{vertices} T:{triangles} [issues...]"`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "R:{} V:{} T:{}",
            self.ring_count, self.vertex_count, self.triangle_count
        )];

        if self.open_edge_count > 0 {
            parts.push(format!("open:{}", self.open_edge_count));
        }
        if self.non_manifold_edge_count > 0 {
            parts.push(format!("non-manifold:{}", self.non_manifold_edge_count));
        }
        if self.substituted_frame_count > 0 {
            parts.push(format!("substituted-frames:{}", self.substituted_frame_count));
        }
        if let Some(timing) = self.timing.as_ref() {
            parts.push(format!("{:.3}ms", timing.total_ms()));
        }

        parts.join(" ")
    }
}

impl fmt::Display for TunnelDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())?;
        for warning in &self.warnings {
            write!(f, "\n  warning: {warning}")?;
        }
        Ok(())
    }
}

/// Counts `(open, non_manifold)` edges of a triangle list.
#[must_use]
pub fn count_edge_topology(indices: &[u32]) -> (usize, usize) {
    let mut edge_counts: HashMap<(u32, u32), u32> = HashMap::new();

    for tri in indices.chunks_exact(3) {
        let (i0, i1, i2) = (tri[0], tri[1], tri[2]);
        if i0 == i1 || i1 == i2 || i0 == i2 {
            continue;
        }

        for (a, b) in [(i0, i1), (i1, i2), (i2, i0)] {
            let key = if a <= b { (a, b) } else { (b, a) };
            *edge_counts.entry(key).or_insert(0) += 1;
        }
    }

    edge_counts
        .values()
        .fold((0, 0), |(open, non_manifold), &count| match count {
            1 => (open + 1, non_manifold),
            c if c > 2 => (open, non_manifold + 1),
            _ => (open, non_manifold),
        })
}
