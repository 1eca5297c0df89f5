//! Default colocator: one value per sample point.
use tracing::info;

use crate::colocation_errors::ColocationError;
use crate::colocator::{fill_slots, output_metadata, prefilled, PointReduction, VariableOverrides};
use crate::constraint::Constraint;
use crate::data::{ColocatedData, LazyData, SourceData};
use crate::grid::interpolate::GridInterpolator;
use crate::hyperpoint::point_list::HyperPointList;
use crate::kernel::Kernel;

/// Produces a single output whose metadata is copied from the source, with optional
/// name / long name / units overrides, shape `[points.len()]` and the constraint fill value
/// as missing value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultColocator {
    pub overrides: VariableOverrides,
}

impl DefaultColocator {
    pub fn new(overrides: VariableOverrides) -> Self {
        DefaultColocator { overrides }
    }

    pub(crate) fn colocate(
        &self,
        points: &HyperPointList,
        data: &SourceData,
        constraint: &Constraint,
        kernel: &Kernel,
        interpolator: &dyn GridInterpolator,
    ) -> Result<Vec<ColocatedData>, ColocationError> {
        let reduction = PointReduction::new("default", data, constraint, kernel, interpolator)?;
        let fill_value = constraint.fill_value();

        info!("--> colocating...");
        let mut values = prefilled(points.len(), fill_value)?;
        fill_slots(points.as_slice(), &mut values, |p| reduction.value(p))?;

        let metadata = output_metadata(data.metadata(), &self.overrides, points.len(), fill_value);
        Ok(vec![ColocatedData::Ungridded(LazyData::from_values(
            values, metadata,
        )?)])
    }
}

#[cfg(test)]
mod default_test {
    use super::*;
    use crate::constraint::SepConstraint;
    use crate::grid::interpolate::RectilinearInterpolator;
    use crate::grid::{Coord, GriddedData};
    use crate::hyperpoint::HyperPoint;
    use crate::metadata::Metadata;

    fn source() -> SourceData {
        SourceData::Points {
            points: vec![
                HyperPoint::new(0.0, 0.0).with_value(5.0),
                HyperPoint::new(10.0, 10.0).with_value(9.0),
            ]
            .into(),
            metadata: Metadata::new("AOD").with_units("1").with_long_name("Optical depth"),
        }
    }

    #[test]
    fn test_metadata_overrides() {
        let colocator = DefaultColocator::new(VariableOverrides {
            var_name: Some("AOD_colocated".into()),
            var_long_name: None,
            var_units: Some("none".into()),
        });
        let points: HyperPointList = vec![HyperPoint::new(0.0, 0.0), HyperPoint::new(60.0, 60.0)].into();
        let constraint: Constraint = SepConstraint::builder()
            .h_sep(500.0)
            .fill_value(-1.0)
            .build()
            .unwrap()
            .into();

        let out = colocator
            .colocate(&points, &source(), &constraint, &Kernel::Mean, &RectilinearInterpolator)
            .unwrap();
        assert_eq!(out.len(), 1);
        let md = out[0].metadata();
        assert_eq!(md.name, "AOD_colocated");
        assert_eq!(md.long_name, "Optical depth");
        assert_eq!(md.units, "none");
        assert_eq!(md.shape, vec![2]);
        assert_eq!(md.missing_value, Some(-1.0));
        assert_eq!(out[0].values().unwrap(), &[5.0, -1.0]);
    }

    #[test]
    fn test_gridded_source_ignores_constraint() {
        let lat = Coord::dim("lat", vec![0.0, 10.0], 0).with_standard_name("latitude");
        let lon = Coord::dim("lon", vec![0.0, 10.0], 1).with_standard_name("longitude");
        let grid = GriddedData::new(
            vec![0.0, 1.0, 10.0, 11.0],
            vec![2, 2],
            vec![lat, lon],
            Metadata::new("T"),
        )
        .unwrap();
        let points: HyperPointList = vec![
            HyperPoint::new(5.0, 5.0),
            HyperPoint::new(9.0, 1.0),
            HyperPoint::new(50.0, 5.0),
        ]
        .into();
        let constraint: Constraint = SepConstraint::builder().h_sep(0.0).build().unwrap().into();

        let linear = DefaultColocator::default()
            .colocate(
                &points,
                &SourceData::Gridded(grid.clone()),
                &constraint,
                &Kernel::GriddedLinear,
                &RectilinearInterpolator,
            )
            .unwrap();
        let values = linear[0].values().unwrap();
        assert!((values[0] - 5.5).abs() < 1e-12);
        assert!((values[1] - 9.1).abs() < 1e-12);
        assert_eq!(values[2], -999.0);

        let nearest = DefaultColocator::default()
            .colocate(
                &points,
                &SourceData::Gridded(grid.clone()),
                &constraint,
                &Kernel::GriddedNearest,
                &RectilinearInterpolator,
            )
            .unwrap();
        assert_eq!(nearest[0].values().unwrap(), &[0.0, 10.0, 10.0]);

        assert!(matches!(
            DefaultColocator::default().colocate(
                &points,
                &SourceData::Gridded(grid),
                &constraint,
                &Kernel::Mean,
                &RectilinearInterpolator,
            ),
            Err(ColocationError::SourceMismatch { .. })
        ));
    }
}
