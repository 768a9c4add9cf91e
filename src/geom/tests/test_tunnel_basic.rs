use std::f64::consts::PI;

use crate::config::TunnelConfig;
use crate::geom::{
    DegenerateFramePolicy, Line3, Path, Point3, RingFrame, SplinePath, Tolerance, TunnelError,
    TunnelMesh, TunnelMeshBuilder, TunnelOptions, Vec3, build_tunnel_mesh, face_normal,
    tunnel_mesh_from_path,
};

fn straight_config() -> TunnelConfig {
    TunnelConfig::default().with_sides(4).with_radius(1.0)
}

fn straight(length: f64) -> Line3 {
    Line3::new(Point3::ORIGIN, Point3::new(0.0, 0.0, length))
}

fn s_curve() -> SplinePath {
    SplinePath::from_knots(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(4.0, 0.0, 5.0),
        Point3::new(0.0, 2.0, 10.0),
        Point3::new(-4.0, 0.0, 15.0),
        Point3::new(0.0, 0.0, 20.0),
    ])
}

/// Forward, then straight up along the up vector.
fn climbing_spline() -> SplinePath {
    SplinePath::from_knots(vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.0, 0.0, 4.0),
        Point3::new(0.0, 6.0, 4.0),
        Point3::new(0.0, 12.0, 4.0),
    ])
}

fn ring_center(mesh: &TunnelMesh, ring: usize) -> Point3 {
    let verts = mesh.ring(ring).expect("ring in range");
    let n = verts.len() as f64;
    let sum = verts.iter().fold([0.0; 3], |acc, v| [acc[0] + v[0], acc[1] + v[1], acc[2] + v[2]]);
    Point3::new(sum[0] / n, sum[1] / n, sum[2] / n)
}

fn assert_well_formed(mesh: &TunnelMesh) {
    mesh.validate().expect("mesh invariants hold");
    for (i, n) in mesh.normals.iter().enumerate() {
        let len = Vec3::from(*n).length();
        assert!((len - 1.0).abs() < 1e-9, "normal {i} has length {len}");
    }
    for uv in &mesh.uvs {
        assert!((0.0..1.0).contains(&uv[0]), "u out of range: {}", uv[0]);
        assert!((0.0..=1.0).contains(&uv[1]), "v out of range: {}", uv[1]);
    }
}

#[test]
fn straight_segment_scenario() {
    let (mesh, diag) = tunnel_mesh_from_path(&straight(10.0), &straight_config()).expect("builds");

    assert_eq!(mesh.ring_count, 11);
    assert_eq!(mesh.vertex_count(), 44);
    // 10 segments x 4 sides x 2 triangles
    assert_eq!(mesh.triangle_count(), 80);
    assert_eq!(mesh.indices.len(), 240);
    assert_well_formed(&mesh);

    // Centres are colinear on the Z axis; normals are perpendicular to it.
    for ring in 0..mesh.ring_count {
        let c = ring_center(&mesh, ring);
        assert!(c.x.abs() < 1e-12 && c.y.abs() < 1e-12);
        assert!((c.z - ring as f64).abs() < 1e-9);
    }
    for n in &mesh.normals {
        assert!(n[2].abs() < 1e-12);
    }

    assert!(diag.is_open_tube());
    assert_eq!(diag.open_edge_count, 8);
    assert_eq!(diag.substituted_frame_count, 0);
    assert!(!diag.has_warnings());
}

#[test]
fn vertex_and_triangle_counts_follow_rounded_length() {
    for (length, density, sides) in [(7.0, 1.0, 3), (5.3, 2.0, 8), (12.25, 0.4, 32), (2.5, 1.0, 5)] {
        let config = TunnelConfig::default()
            .with_sides(sides)
            .with_segments_per_unit_length(density);
        let (mesh, _) = tunnel_mesh_from_path(&straight(length), &config).unwrap();
        let segments = (length * density).round_ties_even() as usize;
        assert_eq!(mesh.vertex_count(), (segments + 1) * sides, "L={length} d={density}");
        assert_eq!(mesh.triangle_count(), segments * sides * 2, "L={length} d={density}");
    }
}

#[test]
fn too_short_paths_produce_no_geometry() {
    for length in [0.0, 0.5, 1.0, 1.49] {
        let err = tunnel_mesh_from_path(&straight(length), &TunnelConfig::default()).unwrap_err();
        assert!(err.is_insufficient_path(), "length {length}: {err}");
    }
}

#[test]
fn ring_vertices_form_regular_polygon() {
    let radius = 2.5;
    let sides = 7;
    let config = TunnelConfig::default().with_sides(sides).with_radius(radius);
    let (mesh, _) = tunnel_mesh_from_path(&s_curve(), &config).unwrap();
    let expected_chord = 2.0 * radius * (PI / sides as f64).sin();

    for ring in 0..mesh.ring_count {
        let center = ring_center(&mesh, ring);
        let verts = mesh.ring(ring).unwrap();
        for j in 0..sides {
            let a = Point3::from(verts[j]);
            let b = Point3::from(verts[(j + 1) % sides]);
            assert!((a.distance_to(center) - radius).abs() < 1e-9);
            assert!((a.distance_to(b) - expected_chord).abs() < 1e-9);
        }
    }
}

#[test]
fn normals_point_away_from_ring_center() {
    let (mesh, _) = tunnel_mesh_from_path(&s_curve(), &TunnelConfig::default()).unwrap();
    assert_well_formed(&mesh);

    for ring in 0..mesh.ring_count {
        let center = ring_center(&mesh, ring);
        let start = ring * mesh.sides;
        for k in start..start + mesh.sides {
            let outward = Point3::from(mesh.positions[k]).sub_point(center);
            let n = Vec3::from(mesh.normals[k]);
            assert!(n.dot(outward) > 0.0);
            assert!(n.cross(outward).length() < 1e-9 * outward.length().max(1.0));
        }
    }
}

#[test]
fn winding_faces_outward() {
    // Radius well below the bend radius so the inner side does not fold over.
    let config = TunnelConfig::default().with_radius(1.0);
    for path in [&straight(6.0) as &dyn Path, &s_curve()] {
        let (mesh, _) = tunnel_mesh_from_path(path, &config).unwrap();
        for tri in mesh.indices.chunks_exact(3) {
            let face = face_normal(&mesh.positions, [tri[0], tri[1], tri[2]]).expect("non-degenerate face");
            let vertex_normals = tri
                .iter()
                .fold(Vec3::ZERO, |acc, &i| acc + Vec3::from(mesh.normals[i as usize]));
            assert!(face.dot(vertex_normals) > 0.0, "inward face {tri:?}");
        }
    }
}

#[test]
fn straight_winding_matches_hand_computed_face() {
    let (mesh, _) = tunnel_mesh_from_path(&straight(2.0), &straight_config()).unwrap();
    // Ring 0 starts at center + right * r with right = Z x Y = -X.
    assert_eq!(mesh.positions[0], [-1.0, 0.0, 0.0]);
    assert_eq!(&mesh.indices[..6], &[0, 4, 5, 0, 5, 1]);

    let face = face_normal(&mesh.positions, [0, 4, 5]).unwrap();
    let expected = Vec3::new(-1.0, 1.0, 0.0).normalized().unwrap();
    assert!(face.sub(expected).length() < 1e-9);
}

#[test]
fn uvs_track_ring_parameter() {
    let (mesh, _) = tunnel_mesh_from_path(&straight(1.5), &straight_config()).unwrap();
    assert_eq!(mesh.ring_count, 3);

    let vs: Vec<f64> = mesh.uvs.iter().step_by(mesh.sides).map(|uv| uv[1]).collect();
    assert_eq!(vs, vec![0.0, 0.5, 1.0]);

    let us: Vec<f64> = mesh.uvs[..4].iter().map(|uv| uv[0]).collect();
    assert_eq!(us, vec![0.0, 0.25, 0.5, 0.75]);

    let (curved, _) = tunnel_mesh_from_path(&s_curve(), &TunnelConfig::default()).unwrap();
    let vs: Vec<f64> = curved.uvs.iter().step_by(curved.sides).map(|uv| uv[1]).collect();
    assert!(vs.windows(2).all(|w| w[1] >= w[0]));
}

#[test]
fn indices_stay_in_range_and_stitch_adjacent_rings() {
    let (mesh, _) = tunnel_mesh_from_path(&s_curve(), &TunnelConfig::default().with_sides(5)).unwrap();
    let vertex_count = mesh.vertex_count() as u32;
    let sides = mesh.sides as u32;
    assert_eq!(mesh.indices.len() % 3, 0);
    for tri in mesh.indices.chunks_exact(3) {
        assert!(tri.iter().all(|&i| i < vertex_count));
        let rings: Vec<u32> = tri.iter().map(|&i| i / sides).collect();
        let lo = *rings.iter().min().unwrap();
        let hi = *rings.iter().max().unwrap();
        assert_eq!(hi - lo, 1, "triangle {tri:?} must span two adjacent rings");
    }
}

#[test]
fn bounds_cover_all_positions() {
    let (mesh, _) = tunnel_mesh_from_path(&straight(10.0), &straight_config()).unwrap();
    let bounds = mesh.bounds.expect("non-empty mesh has bounds");
    let tol = Tolerance::default_geom();
    assert!(tol.approx_eq_point3(bounds.min, Point3::new(-1.0, -1.0, 0.0)));
    assert!(tol.approx_eq_point3(bounds.max, Point3::new(1.0, 1.0, 10.0)));
    assert!(mesh.positions.iter().all(|p| bounds.contains_point(Point3::from(*p))));

    assert!(TunnelMesh::empty().bounds.is_none());
}

#[test]
fn flat_views_match_buffers() {
    let (mesh, _) = tunnel_mesh_from_path(&straight(3.0), &straight_config()).unwrap();
    let positions = mesh.positions_flat();
    assert_eq!(positions.len(), mesh.vertex_count() * 3);
    assert_eq!(&positions[3..6], &mesh.positions[1]);
    assert_eq!(mesh.normals_flat().len(), mesh.vertex_count() * 3);
    assert_eq!(&mesh.uvs_flat()[2..4], &mesh.uvs[1]);
    assert!(TunnelMesh::empty().positions_flat().is_empty());
}

#[test]
fn vertical_climb_reuses_previous_frames() {
    let (mesh, diag) = tunnel_mesh_from_path(&climbing_spline(), &TunnelConfig::default()).expect("fallback");
    assert!(diag.substituted_frame_count > 0);
    assert!(diag.has_warnings());
    assert!(diag.is_open_tube());
    assert_well_formed(&mesh);
}

#[test]
fn vertical_climb_aborts_when_configured() {
    let config = TunnelConfig::default().with_degenerate_frames(DegenerateFramePolicy::Abort);
    let err = tunnel_mesh_from_path(&climbing_spline(), &config).unwrap_err();
    match err {
        TunnelError::DegenerateFrame { ring } => assert!(ring > 0),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn fully_vertical_line_has_no_usable_frame() {
    let vertical = Line3::new(Point3::ORIGIN, Point3::new(0.0, 10.0, 0.0));
    let err = tunnel_mesh_from_path(&vertical, &TunnelConfig::default()).unwrap_err();
    assert!(matches!(err, TunnelError::DegenerateFrame { ring: 0 }));

    // A different up vector makes the same line buildable.
    let (mesh, _) = tunnel_mesh_from_path(&vertical.with_up(Vec3::Z), &TunnelConfig::default()).unwrap();
    assert_eq!(mesh.ring_count, 11);
}

#[test]
fn invalid_config_is_rejected_before_sampling() {
    let err = tunnel_mesh_from_path(&straight(10.0), &TunnelConfig::default().with_sides(2)).unwrap_err();
    assert!(matches!(err, TunnelError::InvalidConfiguration(_)));
}

#[test]
fn builder_validates_cross_section() {
    assert!(matches!(
        TunnelMeshBuilder::new(2, 1.0),
        Err(TunnelError::InvalidConfiguration(_))
    ));
    assert!(matches!(
        TunnelMeshBuilder::new(4, -1.0),
        Err(TunnelError::InvalidConfiguration(_))
    ));
    assert!(TunnelMeshBuilder::from_options(TunnelOptions::default()).is_ok());
}

#[test]
fn builder_stitches_incrementally() {
    let frame = |z: f64, t: f64| RingFrame {
        center: Point3::new(0.0, 0.0, z),
        tangent: Vec3::Z,
        up: Vec3::Y,
        right: Vec3::new(-1.0, 0.0, 0.0),
        parameter: t,
    };

    let mut builder = TunnelMeshBuilder::new(3, 1.0).unwrap();
    builder.emit_ring(&frame(0.0, 0.0)).unwrap();
    assert_eq!(builder.ring_count(), 1);
    builder.emit_ring(&frame(1.0, 1.0)).unwrap();
    let mesh = builder.finish();
    assert_eq!(mesh.vertex_count(), 6);
    assert_eq!(mesh.triangle_count(), 6);
    assert!(mesh.validate().is_ok());
}

#[test]
fn build_from_frames_needs_two_segments() {
    let frames: Vec<RingFrame> = (0..3)
        .map(|i| RingFrame {
            center: Point3::new(0.0, 0.0, f64::from(i)),
            tangent: Vec3::Z,
            up: Vec3::Y,
            right: Vec3::new(-1.0, 0.0, 0.0),
            parameter: f64::from(i) / 2.0,
        })
        .collect();

    let (mesh, diag) = build_tunnel_mesh(&frames, TunnelOptions { sides: 4, radius: 1.0 }).unwrap();
    assert_eq!(mesh.ring_count, 3);
    assert_eq!(diag.triangle_count, 16);

    let err = build_tunnel_mesh(&frames[..2], TunnelOptions::default()).unwrap_err();
    assert!(matches!(err, TunnelError::InsufficientPath { segments: 1, .. }));
}

#[test]
fn rebuild_is_deterministic() {
    let config = TunnelConfig::default().with_segments_per_unit_length(3.0);
    let (a, _) = tunnel_mesh_from_path(&s_curve(), &config).unwrap();
    let (b, _) = tunnel_mesh_from_path(&s_curve(), &config).unwrap();
    assert_eq!(a, b);
}

#[test]
fn oversized_path_is_rejected_before_sampling() {
    // 3e9 segments at 8 sides is far past what u32 indices can address.
    let err = tunnel_mesh_from_path(&straight(3.0e9), &TunnelConfig::default()).unwrap_err();
    assert!(matches!(err, TunnelError::MeshTooLarge { vertex_count } if vertex_count == 24_000_000_008));

    // One ring past the cap: 3 * 1_431_655_766 = u32::MAX + 3.
    let config = TunnelConfig::default().with_sides(3);
    let err = tunnel_mesh_from_path(&straight(1_431_655_765.0), &config).unwrap_err();
    assert!(matches!(err, TunnelError::MeshTooLarge { .. }));
}

#[test]
fn unbounded_path_length_is_too_large_not_too_short() {
    let huge = straight(1.0e300);
    let err = tunnel_mesh_from_path(&huge, &TunnelConfig::default()).unwrap_err();
    assert!(matches!(err, TunnelError::MeshTooLarge { .. }));

    let infinite = Line3::new(Point3::new(0.0, 0.0, -f64::MAX), Point3::new(0.0, 0.0, f64::MAX));
    assert!(infinite.length().is_infinite());
    let err = tunnel_mesh_from_path(&infinite, &TunnelConfig::default()).unwrap_err();
    assert!(matches!(err, TunnelError::MeshTooLarge { vertex_count: usize::MAX }));
}
