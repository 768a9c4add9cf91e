mod core;
mod diagnostics;
mod frame;
mod metrics;
mod path;
mod sampler;
mod tunnel;

pub use core::{BBox, Point3, Tolerance, Transform, Vec3};
pub use diagnostics::{TunnelDiagnostics, count_edge_topology};
pub use frame::{DegenerateFramePolicy, ResolvedFrames, RingFrame, resolve_frames};
pub use metrics::{TimingBucket, TunnelMetrics, TunnelTimingReport};
pub use path::{DEFAULT_LENGTH_SAMPLES, Line3, Path, PathSample, SplinePath, path_arc_length};
pub use sampler::{
    MIN_SEGMENTS, RingSample, ring_parameters, sample_path, sample_ring_parameters, sample_segments,
    segment_count,
};
pub use tunnel::{
    TunnelError, TunnelMesh, TunnelMeshBuilder, TunnelOptions, build_tunnel_mesh, face_normal,
    tunnel_mesh_from_path,
};

#[cfg(test)]
mod tests;
