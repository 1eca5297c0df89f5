//! Debug colocator: the default reduction on a bounded prefix of the sample points, timed.
//!
//! Only the first `min(max_vals, n)` sample points are colocated; the output still has one
//! slot per sample point and the unprocessed slots keep the fill value. Every `print_step`-th
//! point emits an `info` record with the time it took, the sample point and the colocated
//! value, and the mean time per point is logged at the end. With the `progress` feature an
//! `indicatif` bar follows the loop as well.
//!
//! The loop is sequential so that the per-point timings are meaningful.
#[cfg(feature = "progress")]
use std::time::Duration;

#[cfg(feature = "progress")]
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::colocation_errors::ColocationError;
use crate::colocator::progress::{fmt_dur, IterTimer};
use crate::colocator::{output_metadata, prefilled, PointReduction, VariableOverrides};
use crate::constraint::Constraint;
use crate::data::{ColocatedData, LazyData, SourceData};
use crate::grid::interpolate::GridInterpolator;
use crate::hyperpoint::point_list::HyperPointList;
use crate::kernel::Kernel;

#[derive(Debug, Clone, PartialEq)]
pub struct DebugColocator {
    max_vals: usize,
    print_step: f64,
}

impl Default for DebugColocator {
    fn default() -> Self {
        DebugColocator {
            max_vals: 1000,
            print_step: 10.0,
        }
    }
}

impl DebugColocator {
    /// Arguments
    /// -----------------
    /// * `max_vals`: number of sample points to colocate.
    /// * `print_step`: a progress record is emitted for every index that is a multiple of it.
    ///
    /// Return
    /// ----------
    /// * The colocator, or [`ColocationError::InvalidColocatorOption`] when `print_step` is
    ///   not a finite positive number.
    pub fn new(max_vals: usize, print_step: f64) -> Result<Self, ColocationError> {
        if !(print_step.is_finite() && print_step > 0.0) {
            return Err(ColocationError::InvalidColocatorOption(format!(
                "print_step must be a positive number (got {print_step})"
            )));
        }
        Ok(DebugColocator {
            max_vals,
            print_step,
        })
    }

    pub fn max_vals(&self) -> usize {
        self.max_vals
    }

    pub fn print_step(&self) -> f64 {
        self.print_step
    }

    fn reports(&self, index: usize) -> bool {
        (index as f64 / self.print_step).fract() == 0.0
    }

    pub(crate) fn colocate(
        &self,
        points: &HyperPointList,
        data: &SourceData,
        constraint: &Constraint,
        kernel: &Kernel,
        interpolator: &dyn GridInterpolator,
    ) -> Result<Vec<ColocatedData>, ColocationError> {
        let reduction = PointReduction::new("debug", data, constraint, kernel, interpolator)?;
        let fill_value = constraint.fill_value();
        let n = points.len();
        let processed = self.max_vals.min(n);

        info!("--> colocating...");
        let mut values = prefilled(n, fill_value)?;
        let mut timer = IterTimer::new(0.2);

        #[cfg(feature = "progress")]
        let pb = {
            let pb = ProgressBar::new(processed.max(1) as u64);
            if let Ok(style) = ProgressStyle::with_template(
                "{bar:40.cyan/blue} {pos}/{len} ({percent:>3}%) | {per_sec} | ETA {eta_precise} | {msg}",
            ) {
                pb.set_style(style);
            }
            pb.enable_steady_tick(Duration::from_millis(200));
            pb
        };

        for (i, point) in points.iter().take(processed).enumerate() {
            timer.start();
            match reduction.value(point) {
                Ok(value) => values[i] = value,
                Err(e) if e.is_recoverable() => {}
                Err(e) => return Err(e),
            }
            let took = timer.tick();

            if self.reports(i) {
                info!(
                    index = i,
                    took = %fmt_dur(took),
                    sample = %point,
                    value = values[i],
                    "colocated point"
                );
            }

            #[cfg(feature = "progress")]
            {
                pb.set_message(format!(
                    "last: {}, avg: {}",
                    fmt_dur(took),
                    fmt_dur(timer.avg())
                ));
                pb.inc(1);
            }
        }

        #[cfg(feature = "progress")]
        pb.finish_and_clear();

        info!(
            points = timer.count(),
            mean = %fmt_dur(timer.mean()),
            "average time per point"
        );

        let metadata = output_metadata(data.metadata(), &VariableOverrides::default(), n, fill_value);
        Ok(vec![ColocatedData::Ungridded(LazyData::from_values(
            values, metadata,
        )?)])
    }
}

#[cfg(test)]
mod debug_test {
    use super::*;
    use crate::grid::interpolate::RectilinearInterpolator;
    use crate::hyperpoint::HyperPoint;
    use crate::metadata::Metadata;

    #[test]
    fn test_bounded_prefix_full_size_output() {
        let data = SourceData::Points {
            points: vec![HyperPoint::new(0.0, 0.0).with_value(7.0)].into(),
            metadata: Metadata::new("v"),
        };
        let points: HyperPointList = (0..5).map(|_| HyperPoint::new(0.0, 0.0)).collect();

        let out = DebugColocator::new(3, 1.0)
            .unwrap()
            .colocate(
                &points,
                &data,
                &Constraint::null(),
                &Kernel::Mean,
                &RectilinearInterpolator,
            )
            .unwrap();
        assert_eq!(out[0].values().unwrap(), &[7.0, 7.0, 7.0, -999.0, -999.0]);
        assert_eq!(out[0].metadata().shape, vec![5]);

        let all = DebugColocator::default()
            .colocate(
                &points,
                &data,
                &Constraint::null(),
                &Kernel::Mean,
                &RectilinearInterpolator,
            )
            .unwrap();
        assert_eq!(all[0].values().unwrap(), &[7.0; 5]);
    }

    #[test]
    fn test_options() {
        assert!(DebugColocator::new(10, 0.0).is_err());
        assert!(DebugColocator::new(10, f64::NAN).is_err());

        let c = DebugColocator::new(10, 2.5).unwrap();
        assert!(c.reports(0));
        assert!(!c.reports(1));
        assert!(c.reports(5));
        assert_eq!(c.max_vals(), 10);
    }
}
