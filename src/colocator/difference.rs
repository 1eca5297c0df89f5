//! Difference colocator: colocated value and its difference to the sample value.
use tracing::{info, warn};

use crate::colocation_errors::ColocationError;
use crate::colocator::{fill_slots, output_metadata, prefilled, PointReduction, VariableOverrides};
use crate::constraint::Constraint;
use crate::data::{ColocatedData, LazyData, SourceData};
use crate::grid::interpolate::GridInterpolator;
use crate::hyperpoint::point_list::HyperPointList;
use crate::kernel::Kernel;
use crate::metadata::Metadata;

const DEFAULT_DIFF_LONG_NAME: &str = "Difference between given variable and sampling values";

/// Produces two outputs: the colocated value (as [`DefaultColocator`](super::DefaultColocator)
/// does) and `colocated - sample value`, named `diff_name`.
///
/// The difference is the fill value wherever the colocated value is the fill value or the
/// sample point carries no value.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferenceColocator {
    pub overrides: VariableOverrides,
    pub diff_name: String,
    pub diff_long_name: Option<String>,
}

impl Default for DifferenceColocator {
    fn default() -> Self {
        DifferenceColocator {
            overrides: VariableOverrides::default(),
            diff_name: "difference".into(),
            diff_long_name: None,
        }
    }
}

impl DifferenceColocator {
    pub(crate) fn colocate(
        &self,
        points: &HyperPointList,
        data: &SourceData,
        constraint: &Constraint,
        kernel: &Kernel,
        interpolator: &dyn GridInterpolator,
    ) -> Result<Vec<ColocatedData>, ColocationError> {
        let reduction = PointReduction::new("difference", data, constraint, kernel, interpolator)?;
        let fill_value = constraint.fill_value();
        let n = points.len();

        let without_value = points.iter().filter(|p| p.value().is_none()).count();
        if without_value > 0 {
            warn!(
                without_value,
                "sample points carry no value, their difference is the fill value"
            );
        }

        info!("--> colocating...");
        let mut slots = prefilled(n, (fill_value, fill_value))?;
        fill_slots(points.as_slice(), &mut slots, |p| {
            let value = reduction.value(p)?;
            let difference = match p.value() {
                Some(sample) if value != fill_value => value - sample,
                _ => fill_value,
            };
            Ok((value, difference))
        })?;

        let value_md = output_metadata(data.metadata(), &self.overrides, n, fill_value);
        let diff_md = Metadata::new(self.diff_name.clone())
            .with_long_name(
                self.diff_long_name
                    .as_deref()
                    .unwrap_or(DEFAULT_DIFF_LONG_NAME),
            )
            .with_units(value_md.units.clone())
            .with_shape(vec![n])
            .with_missing_value(fill_value);

        let (values, differences): (Vec<f64>, Vec<f64>) = slots.into_iter().unzip();
        Ok(vec![
            ColocatedData::Ungridded(LazyData::from_values(values, value_md)?),
            ColocatedData::Ungridded(LazyData::from_values(differences, diff_md)?),
        ])
    }
}

#[cfg(test)]
mod difference_test {
    use super::*;
    use crate::constraint::SepConstraint;
    use crate::grid::interpolate::RectilinearInterpolator;
    use crate::hyperpoint::HyperPoint;

    #[test]
    fn test_difference_and_fill_propagation() {
        let data = SourceData::Points {
            points: vec![
                HyperPoint::new(0.0, 0.0).with_value(5.0),
                HyperPoint::new(20.0, 20.0).with_value(-999.0),
            ]
            .into(),
            metadata: Metadata::new("AOD").with_units("1"),
        };
        let points: HyperPointList = vec![
            HyperPoint::new(0.0, 0.0).with_value(3.5),
            HyperPoint::new(40.0, 40.0).with_value(1.0),
            HyperPoint::new(20.0, 20.0).with_value(1.0),
            HyperPoint::new(0.0, 0.0),
        ]
        .into();
        let constraint: Constraint = SepConstraint::builder().h_sep(10.0).build().unwrap().into();

        let out = DifferenceColocator::default()
            .colocate(&points, &data, &constraint, &Kernel::Mean, &RectilinearInterpolator)
            .unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].values().unwrap(), &[5.0, -999.0, -999.0, 5.0]);
        assert_eq!(out[1].values().unwrap(), &[1.5, -999.0, -999.0, -999.0]);

        let diff_md = out[1].metadata();
        assert_eq!(diff_md.name, "difference");
        assert_eq!(diff_md.long_name, DEFAULT_DIFF_LONG_NAME);
        assert_eq!(diff_md.units, "1");
        assert_eq!(diff_md.missing_value, Some(-999.0));
    }
}
