//! Averaging colocator: mean, standard deviation and number of points per sample point.
use tracing::info;

use crate::colocation_errors::ColocationError;
use crate::colocator::{candidate_points, fill_slots, output_metadata, prefilled, VariableOverrides};
use crate::constraint::Constraint;
use crate::data::{ColocatedData, LazyData, SourceData};
use crate::hyperpoint::point_list::HyperPointList;
use crate::kernel::Kernel;
use crate::metadata::Metadata;

/// Produces three aligned outputs, in this order:
///
/// 1. the mean, named `<source>_mean` unless `overrides.var_name` is set,
/// 2. the population standard deviation, named `<source>_std_dev` unless `stddev_name` is set,
/// 3. the number of points, named `<source>_no_points` unless `nopoints_name` is set, unit `1`.
///
/// All three share the constraint fill value and the shape `[points.len()]`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AveragingColocator {
    pub overrides: VariableOverrides,
    pub stddev_name: Option<String>,
    pub nopoints_name: Option<String>,
}

impl AveragingColocator {
    pub fn new(
        overrides: VariableOverrides,
        stddev_name: Option<String>,
        nopoints_name: Option<String>,
    ) -> Self {
        AveragingColocator {
            overrides,
            stddev_name,
            nopoints_name,
        }
    }

    pub(crate) fn colocate(
        &self,
        points: &HyperPointList,
        data: &SourceData,
        constraint: &Constraint,
        kernel: &Kernel,
    ) -> Result<Vec<ColocatedData>, ColocationError> {
        let candidates = candidate_points(data, "average")?;
        let fill_value = constraint.fill_value();
        let n = points.len();

        info!("--> colocating...");
        let mut slots = prefilled(n, [fill_value; 3])?;
        fill_slots(points.as_slice(), &mut slots, |p| {
            let stats = kernel.get_statistics(&constraint.constrain_points(p, &candidates))?;
            Ok([stats.mean, stats.std_dev, stats.count as f64])
        })?;

        let source = data.metadata();
        let mut mean_md = output_metadata(source, &self.overrides, n, fill_value);
        if self.overrides.var_name.is_none() {
            mean_md.name = format!("{}_mean", source.name);
        }

        let stddev_md = Metadata::new(
            self.stddev_name
                .clone()
                .unwrap_or_else(|| format!("{}_std_dev", source.name)),
        )
        .with_long_name(format!("Standard deviation from the mean in {}", source.name))
        .with_units(mean_md.units.clone())
        .with_shape(vec![n])
        .with_missing_value(fill_value);

        let nopoints_md = Metadata::new(
            self.nopoints_name
                .clone()
                .unwrap_or_else(|| format!("{}_no_points", source.name)),
        )
        .with_long_name(format!(
            "Number of points used to calculate the mean of {}",
            source.name
        ))
        .with_units("1")
        .with_shape(vec![n])
        .with_missing_value(fill_value);

        let column = |k: usize| slots.iter().map(|s| s[k]).collect::<Vec<f64>>();
        Ok(vec![
            ColocatedData::Ungridded(LazyData::from_values(column(0), mean_md)?),
            ColocatedData::Ungridded(LazyData::from_values(column(1), stddev_md)?),
            ColocatedData::Ungridded(LazyData::from_values(column(2), nopoints_md)?),
        ])
    }
}
