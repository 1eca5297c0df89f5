#![allow(dead_code)]

use approx::assert_relative_eq;
use colocation::{
    ColocatedData, HyperPoint, HyperPointList, LazyData, Metadata, SourceData, UngriddedData,
};

/// Source points of the reference scenarios: one at the origin, one ~1570 km away.
pub fn origin_and_far_source() -> SourceData {
    SourceData::Points {
        points: vec![
            HyperPoint::new(0.0, 0.0).with_value(5.0),
            HyperPoint::new(10.0, 10.0).with_value(9.0),
        ]
        .into(),
        metadata: Metadata::new("AOD550")
            .with_long_name("Aerosol optical depth at 550nm")
            .with_units("1"),
    }
}

pub fn sample_at(points: &[(f64, f64)]) -> HyperPointList {
    points
        .iter()
        .map(|&(lat, lon)| HyperPoint::new(lat, lon))
        .collect()
}

/// An ungridded source along the equator, values 1, 2, ... every degree of longitude.
pub fn equator_track(n: usize) -> UngriddedData {
    let lon: Vec<f64> = (0..n).map(|i| i as f64).collect();
    let values: Vec<f64> = (1..=n).map(|i| i as f64).collect();
    let data = LazyData::from_values(values, Metadata::new("track").with_units("K")).unwrap();
    UngriddedData::new(vec![0.0; n], lon, data).unwrap()
}

pub fn assert_values_close(actual: &ColocatedData, expected: &[f64], epsilon: f64) {
    let values = actual.values().expect("colocated values are realized");
    assert_eq!(values.len(), expected.len());
    for (a, e) in values.iter().zip(expected) {
        assert_relative_eq!(*a, *e, epsilon = epsilon);
    }
}
