//! # Reductions
//!
//! A [`Kernel`] collapses the candidates left by a constraint into the value(s) stored at one
//! output slot. Every reduction of an empty candidate set fails with
//! [`ColocationError::InsufficientData`]; colocators absorb that error and keep the fill value.
//!
//! Kernels are grouped by what they can produce, see [`KernelCapability`]. Colocators check
//! the capability they need once, before iterating, instead of matching on kernel identity.
//!
//! | name                 | kernel                                  | capability   |
//! |----------------------|-----------------------------------------|--------------|
//! | `mean`               | [`Kernel::Mean`]                        | `Value`      |
//! | `full_average`       | [`Kernel::FullAverage`]                 | `Statistics` |
//! | `nn_horizontal`      | [`Kernel::Nearest`] (horizontal)        | `Value`      |
//! | `nn_altitude`        | [`Kernel::Nearest`] (altitude)          | `Value`      |
//! | `nn_pressure`        | [`Kernel::Nearest`] (pressure)          | `Value`      |
//! | `nn_time`            | [`Kernel::Nearest`] (time)              | `Value`      |
//! | `nn_gridded`         | [`Kernel::GriddedNearest`]              | `GridSample` |
//! | `li`                 | [`Kernel::GriddedLinear`]               | `GridSample` |
//! | `gridded_gridded_nn` | [`Kernel::GridToGrid`] (nearest)        | `Regrid`     |
//! | `gridded_gridded_li` | [`Kernel::GridToGrid`] (bilinear)       | `Regrid`     |
use std::fmt;
use std::str::FromStr;

use crate::colocation_errors::ColocationError;
use crate::grid::interpolate::{GridInterpolator, InterpolationMode};
use crate::grid::GriddedData;
use crate::hyperpoint::point_list::HyperPointList;
use crate::hyperpoint::{HyperPoint, NearestAxis, SamplePoint};

/// What a kernel can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KernelCapability {
    /// One scalar per reference, from a candidate point list.
    Value,
    /// Mean, standard deviation and count per reference, from a candidate point list.
    Statistics,
    /// One scalar per reference, sampled from a gridded source.
    GridSample,
    /// A whole grid resampled onto another grid.
    Regrid,
}

impl KernelCapability {
    pub fn describe(&self) -> &'static str {
        match self {
            KernelCapability::Value => "a point reduction kernel",
            KernelCapability::Statistics => "a kernel producing mean, standard deviation and count",
            KernelCapability::GridSample => "a gridded sampling kernel",
            KernelCapability::Regrid => "a grid-to-grid interpolation kernel",
        }
    }
}

/// Output of a statistics kernel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statistics {
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub count: usize,
}

impl Statistics {
    /// Statistics of `values`, `None` when empty.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        Some(Statistics {
            mean,
            std_dev: variance.sqrt(),
            count: values.len(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    Mean,
    FullAverage,
    Nearest(NearestAxis),
    GriddedNearest,
    GriddedLinear,
    GridToGrid(InterpolationMode),
}

impl Kernel {
    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Mean => "mean",
            Kernel::FullAverage => "full_average",
            Kernel::Nearest(NearestAxis::Horizontal) => "nn_horizontal",
            Kernel::Nearest(NearestAxis::Altitude) => "nn_altitude",
            Kernel::Nearest(NearestAxis::Pressure) => "nn_pressure",
            Kernel::Nearest(NearestAxis::Time) => "nn_time",
            Kernel::GriddedNearest => "nn_gridded",
            Kernel::GriddedLinear => "li",
            Kernel::GridToGrid(InterpolationMode::Nearest) => "gridded_gridded_nn",
            Kernel::GridToGrid(InterpolationMode::Linear) => "gridded_gridded_li",
        }
    }

    pub fn capability(&self) -> KernelCapability {
        match self {
            Kernel::Mean | Kernel::Nearest(_) => KernelCapability::Value,
            Kernel::FullAverage => KernelCapability::Statistics,
            Kernel::GriddedNearest | Kernel::GriddedLinear => KernelCapability::GridSample,
            Kernel::GridToGrid(_) => KernelCapability::Regrid,
        }
    }

    /// Interpolation mode of the grid kernels, `None` for point kernels.
    pub fn interpolation_mode(&self) -> Option<InterpolationMode> {
        match self {
            Kernel::GriddedNearest => Some(InterpolationMode::Nearest),
            Kernel::GriddedLinear => Some(InterpolationMode::Linear),
            Kernel::GridToGrid(mode) => Some(*mode),
            _ => None,
        }
    }

    fn mismatch(&self, expected: KernelCapability) -> ColocationError {
        ColocationError::KernelMismatch {
            colocator: "point-wise",
            expected: expected.describe(),
            found: self.name().to_string(),
        }
    }

    /// Reduce `data` to one value for `reference`.
    ///
    /// Arguments
    /// -----------------
    /// * `reference`: the sample point or cell; nearest-neighbour kernels measure from its centre.
    /// * `data`: constrained candidates.
    ///
    /// Return
    /// ----------
    /// * The value, [`ColocationError::InsufficientData`] when `data` holds no value, or
    ///   [`ColocationError::KernelMismatch`] for kernels without the `Value` capability.
    ///
    /// Nearest-neighbour kernels scan left to right and replace the current best only by a
    /// strictly closer candidate, so ties keep the earliest candidate.
    pub fn get_value<R>(&self, reference: &R, data: &HyperPointList) -> Result<f64, ColocationError>
    where
        R: SamplePoint + ?Sized,
    {
        match self {
            Kernel::Mean => Statistics::from_values(&data.vals())
                .map(|s| s.mean)
                .ok_or(ColocationError::InsufficientData),
            Kernel::Nearest(axis) => {
                let centre = reference.centre();
                let mut candidates = data.iter();
                let first = candidates.next().ok_or(ColocationError::InsufficientData)?;
                candidates
                    .fold(first, |best, candidate| {
                        if centre.is_closer_in_axis(*axis, best, candidate) {
                            candidate
                        } else {
                            best
                        }
                    })
                    .value()
                    .ok_or(ColocationError::InsufficientData)
            }
            _ => Err(self.mismatch(KernelCapability::Value)),
        }
    }

    /// Mean, population standard deviation and count of the values in `data`.
    pub fn get_statistics(&self, data: &HyperPointList) -> Result<Statistics, ColocationError> {
        match self {
            Kernel::FullAverage => {
                Statistics::from_values(&data.vals()).ok_or(ColocationError::InsufficientData)
            }
            _ => Err(self.mismatch(KernelCapability::Statistics)),
        }
    }

    /// Sample `grid` at `point` through `interpolator`.
    ///
    /// Failures of the interpolator (point outside the grid, missing corner) are
    /// [`ColocationError::InterpolationFailed`] and therefore recoverable per point.
    pub fn sample_grid(
        &self,
        point: &HyperPoint,
        grid: &GriddedData,
        interpolator: &dyn GridInterpolator,
    ) -> Result<f64, ColocationError> {
        match (self.capability(), self.interpolation_mode()) {
            (KernelCapability::GridSample, Some(mode)) => {
                interpolator.sample(grid, &point.coord_tuple(), mode)
            }
            _ => Err(self.mismatch(KernelCapability::GridSample)),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = ColocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "mean" => Kernel::Mean,
            "full_average" => Kernel::FullAverage,
            "nn_horizontal" => Kernel::Nearest(NearestAxis::Horizontal),
            "nn_altitude" => Kernel::Nearest(NearestAxis::Altitude),
            "nn_pressure" => Kernel::Nearest(NearestAxis::Pressure),
            "nn_time" => Kernel::Nearest(NearestAxis::Time),
            "nn_gridded" => Kernel::GriddedNearest,
            "li" => Kernel::GriddedLinear,
            "gridded_gridded_nn" => Kernel::GridToGrid(InterpolationMode::Nearest),
            "gridded_gridded_li" => Kernel::GridToGrid(InterpolationMode::Linear),
            other => return Err(ColocationError::InvalidKernel(other.to_string())),
        })
    }
}
