use crate::geom::{
    Line3, MIN_SEGMENTS, Path, Point3, TunnelError, ring_parameters, sample_path,
    sample_ring_parameters, segment_count,
};

fn straight(length: f64) -> Line3 {
    Line3::new(Point3::ORIGIN, Point3::new(0.0, 0.0, length))
}

#[test]
fn segment_count_rounds_half_to_even() {
    assert_eq!(segment_count(0.5, 1.0), 0);
    assert_eq!(segment_count(1.5, 1.0), 2);
    assert_eq!(segment_count(2.5, 1.0), 2);
    assert_eq!(segment_count(3.5, 1.0), 4);
    assert_eq!(segment_count(2.6, 1.0), 3);
    assert_eq!(segment_count(10.0, 2.5), 25);
}

#[test]
fn segment_count_rejects_bad_input() {
    assert_eq!(segment_count(0.0, 1.0), 0);
    assert_eq!(segment_count(-4.0, 1.0), 0);
    assert_eq!(segment_count(f64::NAN, 1.0), 0);
    assert_eq!(segment_count(f64::INFINITY, 1.0), 0);
}

#[test]
fn ring_parameters_cover_both_ends() {
    assert!(ring_parameters(0).is_empty());
    assert!(ring_parameters(MIN_SEGMENTS - 1).is_empty());

    assert_eq!(ring_parameters(2), vec![0.0, 0.5, 1.0]);

    let params = ring_parameters(7);
    assert_eq!(params.len(), 8);
    assert_eq!(params[0], 0.0);
    assert_eq!(params[7], 1.0);
    assert!(params.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn sample_ring_parameters_for_short_and_tied_paths() {
    assert_eq!(sample_ring_parameters(&straight(1.5), 1.0), vec![0.0, 0.5, 1.0]);
    assert!(sample_ring_parameters(&straight(0.5), 1.0).is_empty());
    assert_eq!(sample_ring_parameters(&straight(2.5), 1.0).len(), 3);
    assert_eq!(sample_ring_parameters(&straight(3.5), 1.0).len(), 5);
}

#[test]
fn sample_path_queries_once_per_ring() {
    let line = straight(10.0);
    let samples = sample_path(&line, 1.0).expect("long enough");
    assert_eq!(samples.len(), 11);

    for (i, ring) in samples.iter().enumerate() {
        let expected_t = i as f64 / 10.0;
        assert!((ring.parameter - expected_t).abs() < 1e-12);
        assert!((ring.sample.position.z - line.length() * expected_t).abs() < 1e-9);
    }
}

#[test]
fn sample_path_reports_insufficient_path() {
    let err = sample_path(&straight(1.4), 1.0).unwrap_err();
    match err {
        TunnelError::InsufficientPath { length, segments } => {
            assert!((length - 1.4).abs() < 1e-12);
            assert_eq!(segments, 1);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn density_scales_ring_count() {
    let line = straight(4.0);
    assert_eq!(sample_path(&line, 0.5).unwrap().len(), 3);
    assert_eq!(sample_path(&line, 3.0).unwrap().len(), 13);
    assert!(sample_path(&line, 0.25).is_err());
}
