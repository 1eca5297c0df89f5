use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use colocation::colocator::{DebugColocator, DefaultColocator, UngriddedGriddedColocator};
use colocation::grid::Coord;
use colocation::{
    ColocatedData, ColocationError, Colocator, Constraint, GriddedData, HyperPoint, Kernel,
    LazyData, Metadata, SamplePoints, SepConstraint, SourceData, UngriddedData,
};

mod common;
use common::{assert_values_close, equator_track, sample_at};

fn equator_samples(n: usize) -> SamplePoints {
    let coords: Vec<(f64, f64)> = (0..n).map(|i| (0.0, i as f64)).collect();
    SamplePoints::Points(sample_at(&coords))
}

fn lat_lon_grid(lats: Vec<f64>, lons: Vec<f64>, data: Vec<f64>) -> GriddedData {
    let shape = vec![lats.len(), lons.len()];
    GriddedData::new(
        data,
        shape,
        vec![
            Coord::dim("lat", lats, 0).with_standard_name("latitude"),
            Coord::dim("lon", lons, 1).with_standard_name("longitude"),
        ],
        Metadata::new("grid").with_units("K"),
    )
    .unwrap()
}

#[test]
fn test_debug_output_covers_every_sample() {
    let source = SourceData::Ungridded(equator_track(10));
    let constraint: Constraint = SepConstraint::builder().h_sep(1.0).build().unwrap().into();
    let colocator = Colocator::from(DebugColocator::new(3, 2.0).unwrap());

    let out = colocator
        .colocate(&equator_samples(6), &source, &constraint, &Kernel::Mean)
        .unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(
        out[0].values().unwrap(),
        &[1.0, 2.0, 3.0, -999.0, -999.0, -999.0]
    );
    assert_eq!(out[0].metadata().shape, vec![6]);

    // same numbers as the default colocator on the processed prefix
    let default = Colocator::from(DefaultColocator::default())
        .colocate(&equator_samples(6), &source, &constraint, &Kernel::Mean)
        .unwrap();
    assert_eq!(&default[0].values().unwrap()[..3], &[1.0, 2.0, 3.0]);
}

#[test]
fn test_dummy_returns_the_source() {
    let track = equator_track(4);
    let out = Colocator::Dummy
        .colocate(
            &equator_samples(2),
            &SourceData::Ungridded(track.clone()),
            &Constraint::null(),
            &Kernel::Mean,
        )
        .unwrap();
    assert_eq!(out, vec![ColocatedData::Ungridded(track.data().clone())]);
}

#[test]
fn test_ungridded_source_is_realized_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let data = LazyData::deferred(
        Metadata::new("lazy").with_shape(vec![3]).with_missing_value(-1.0),
        move |values: &mut Vec<f64>| {
            counter.fetch_add(1, Ordering::SeqCst);
            values.extend([10.0, -1.0, 30.0]);
            Ok(())
        },
    );
    let track = UngriddedData::new(vec![0.0; 3], vec![0.0, 1.0, 2.0], data).unwrap();
    assert!(!track.data().is_realized());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let points = track.get_non_masked_points().unwrap();
    assert_eq!(points.vals(), vec![10.0, 30.0]);
    assert!(track.data().is_realized());
    track.data().realize().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_failed_realization_aborts_the_request() {
    let data = LazyData::deferred(Metadata::new("broken").with_shape(vec![2]), |_| {
        Err(ColocationError::DataLoad("file vanished".into()))
    });
    let track = UngriddedData::new(vec![0.0; 2], vec![0.0; 2], data).unwrap();
    let result = Colocator::from(DefaultColocator::default()).colocate(
        &equator_samples(1),
        &SourceData::Ungridded(track),
        &Constraint::null(),
        &Kernel::Mean,
    );
    assert_eq!(
        result,
        Err(ColocationError::DataLoad("file vanished".into()))
    );
}

#[test]
fn test_points_on_a_gridded_source() {
    let grid = lat_lon_grid(vec![0.0, 10.0], vec![0.0, 10.0], vec![0.0, 1.0, 10.0, 11.0]);
    let points = SamplePoints::Points(sample_at(&[(5.0, 5.0), (2.0, 9.0), (50.0, 0.0)]));

    let out = Colocator::from(DefaultColocator::default())
        .colocate(
            &points,
            &SourceData::Gridded(grid.clone()),
            &Constraint::null(),
            &Kernel::GriddedLinear,
        )
        .unwrap();
    assert_values_close(&out[0], &[5.5, 2.9, -999.0], 1e-12);

    let out = Colocator::from(DefaultColocator::default())
        .colocate(
            &points,
            &SourceData::Gridded(grid),
            &Constraint::null(),
            &Kernel::GriddedNearest,
        )
        .unwrap();
    assert_eq!(out[0].values().unwrap()[1], 1.0);
}

#[test]
fn test_ungridded_onto_grid_cells() {
    let source = SourceData::Points {
        points: vec![
            HyperPoint::new(-1.0, 1.0).with_value(1.0),
            HyperPoint::new(1.0, 2.0).with_value(3.0),
            HyperPoint::new(9.0, 11.0).with_value(7.0),
        ]
        .into(),
        metadata: Metadata::new("obs"),
    };
    let sample = lat_lon_grid(vec![0.0, 10.0], vec![0.0, 10.0], vec![0.0; 4]);

    let out = Colocator::from(UngriddedGriddedColocator::default())
        .colocate(
            &SamplePoints::Grid(sample.clone()),
            &source,
            &Constraint::cube_cell(),
            &Kernel::Mean,
        )
        .unwrap();
    let grid = out[0].as_gridded().unwrap();
    assert_eq!(grid.shape(), &[2, 2]);
    assert_eq!(grid.data(), &[2.0, -999.0, -999.0, 7.0]);
    assert_eq!(grid.metadata().name, "obs");
    assert_eq!(grid.coords()[0].bounds().unwrap(), &[(-5.0, 5.0), (5.0, 15.0)]);

    let wrong_kernel = Colocator::from(UngriddedGriddedColocator::default()).colocate(
        &SamplePoints::Grid(sample),
        &source,
        &Constraint::cube_cell(),
        &Kernel::Nearest(colocation::hyperpoint::NearestAxis::Horizontal),
    );
    assert!(matches!(
        wrong_kernel,
        Err(ColocationError::KernelMismatch { .. })
    ));
}
