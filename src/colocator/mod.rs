//! # Colocators
//!
//! A [`Colocator`] drives the per-point pipeline
//!
//! ```text
//! for each sample point p (in input order):
//!     neighbours = constraint.constrain_points(p, candidates)
//!     slot[p]    = kernel(p, neighbours)      // slot keeps the fill value on failure
//! ```
//!
//! and assembles the output products with their metadata. Output arrays are allocated once,
//! pre-filled with the constraint fill value, then selectively overwritten. Recoverable
//! per-point failures (see [`ColocationError::is_recoverable`]) leave the fill value in place;
//! any other error aborts the run.
//!
//! Variants
//! -----------------
//! | name                | variant                                | kernel                         |
//! |---------------------|----------------------------------------|--------------------------------|
//! | `default`           | [`DefaultColocator`]                   | point reduction, grid sampling |
//! | `average`           | [`AveragingColocator`]                 | mean + std dev + count         |
//! | `difference`        | [`DifferenceColocator`]                | point reduction, grid sampling |
//! | `debug`             | [`DebugColocator`]                     | point reduction, grid sampling |
//! | `dummy`             | [`Colocator::Dummy`]                   | any (unused)                   |
//! | `gridded`           | [`GriddedColocator`]                   | grid-to-grid interpolation     |
//! | `ungridded_gridded` | [`UngriddedGriddedColocator`]          | `mean` only                    |
//!
//! The kernel requirement is checked by [`Colocator::check_kernel`] before anything is
//! computed.
//!
//! Parallelism
//! -----------------
//! With the `parallel` feature (default) the outer loop runs on the rayon thread pool. Each
//! output slot is written by exactly one task and constraints and kernels are read-only, so
//! results do not depend on scheduling. The debug colocator always runs sequentially.
pub mod averaging;
pub mod debug;
pub mod default;
pub mod difference;
pub mod dummy;
pub mod gridded;
pub mod progress;
pub mod ungridded_gridded;

use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::colocation_errors::ColocationError;
use crate::constraint::Constraint;
use crate::data::{ColocatedData, SamplePoints, SourceData};
use crate::grid::interpolate::{GridInterpolator, InterpolationMode, RectilinearInterpolator};
use crate::grid::GriddedData;
use crate::hyperpoint::point_list::HyperPointList;
use crate::hyperpoint::HyperPoint;
use crate::kernel::{Kernel, KernelCapability};
use crate::metadata::Metadata;

pub use averaging::AveragingColocator;
pub use debug::DebugColocator;
pub use default::DefaultColocator;
pub use difference::DifferenceColocator;
pub use gridded::GriddedColocator;
pub use ungridded_gridded::UngriddedGriddedColocator;

/// Optional renaming of the main colocated variable. Unset fields keep the source metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VariableOverrides {
    #[serde(default)]
    pub var_name: Option<String>,
    #[serde(default)]
    pub var_long_name: Option<String>,
    #[serde(default)]
    pub var_units: Option<String>,
}

impl VariableOverrides {
    pub fn apply(&self, metadata: &mut Metadata) {
        if let Some(name) = &self.var_name {
            metadata.name = name.clone();
        }
        if let Some(long_name) = &self.var_long_name {
            metadata.long_name = long_name.clone();
        }
        if let Some(units) = &self.var_units {
            metadata.units = units.clone();
        }
    }
}

/// Kernels a colocator accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum KernelRequirement {
    Any,
    Capabilities(&'static [KernelCapability]),
    Exactly(Kernel),
}

impl KernelRequirement {
    pub fn accepts(&self, kernel: &Kernel) -> bool {
        match self {
            KernelRequirement::Any => true,
            KernelRequirement::Capabilities(caps) => caps.contains(&kernel.capability()),
            KernelRequirement::Exactly(expected) => expected == kernel,
        }
    }
}

/// Names accepted by [`ColocatorKind::from_str`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColocatorKind {
    #[default]
    Default,
    Average,
    Difference,
    Debug,
    Dummy,
    Gridded,
    UngriddedGridded,
}

impl ColocatorKind {
    pub fn name(&self) -> &'static str {
        match self {
            ColocatorKind::Default => "default",
            ColocatorKind::Average => "average",
            ColocatorKind::Difference => "difference",
            ColocatorKind::Debug => "debug",
            ColocatorKind::Dummy => "dummy",
            ColocatorKind::Gridded => "gridded",
            ColocatorKind::UngriddedGridded => "ungridded_gridded",
        }
    }

    /// Kernel used when a configuration names none.
    pub fn default_kernel(&self) -> Kernel {
        match self {
            ColocatorKind::Average => Kernel::FullAverage,
            ColocatorKind::Gridded => Kernel::GridToGrid(InterpolationMode::Nearest),
            _ => Kernel::Mean,
        }
    }
}

impl fmt::Display for ColocatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColocatorKind {
    type Err = ColocationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "default" => ColocatorKind::Default,
            "average" => ColocatorKind::Average,
            "difference" => ColocatorKind::Difference,
            "debug" => ColocatorKind::Debug,
            "dummy" => ColocatorKind::Dummy,
            "gridded" => ColocatorKind::Gridded,
            "ungridded_gridded" => ColocatorKind::UngriddedGridded,
            other => return Err(ColocationError::InvalidColocator(other.to_string())),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Colocator {
    Default(DefaultColocator),
    Averaging(AveragingColocator),
    Difference(DifferenceColocator),
    Debug(DebugColocator),
    /// Returns the source values and metadata untouched.
    Dummy,
    Gridded(GriddedColocator),
    UngriddedGridded(UngriddedGriddedColocator),
}

impl Colocator {
    pub fn kind(&self) -> ColocatorKind {
        match self {
            Colocator::Default(_) => ColocatorKind::Default,
            Colocator::Averaging(_) => ColocatorKind::Average,
            Colocator::Difference(_) => ColocatorKind::Difference,
            Colocator::Debug(_) => ColocatorKind::Debug,
            Colocator::Dummy => ColocatorKind::Dummy,
            Colocator::Gridded(_) => ColocatorKind::Gridded,
            Colocator::UngriddedGridded(_) => ColocatorKind::UngriddedGridded,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Kernel compatibility table: the accepted kernels and how to describe them.
    fn compatibility(&self) -> (KernelRequirement, &'static str) {
        const POINT_OR_GRID: &[KernelCapability] =
            &[KernelCapability::Value, KernelCapability::GridSample];
        match self {
            Colocator::Default(_) | Colocator::Difference(_) | Colocator::Debug(_) => (
                KernelRequirement::Capabilities(POINT_OR_GRID),
                "a point reduction or gridded sampling kernel",
            ),
            Colocator::Averaging(_) => (
                KernelRequirement::Capabilities(&[KernelCapability::Statistics]),
                KernelCapability::Statistics.describe(),
            ),
            Colocator::Dummy => (KernelRequirement::Any, "any kernel"),
            Colocator::Gridded(_) => (
                KernelRequirement::Capabilities(&[KernelCapability::Regrid]),
                KernelCapability::Regrid.describe(),
            ),
            Colocator::UngriddedGridded(_) => {
                (KernelRequirement::Exactly(Kernel::Mean), "the 'mean' kernel")
            }
        }
    }

    pub fn kernel_requirement(&self) -> KernelRequirement {
        self.compatibility().0
    }

    /// Reject a kernel this colocator cannot drive.
    ///
    /// Return
    /// ----------
    /// * `Ok(())`, or [`ColocationError::KernelMismatch`].
    pub fn check_kernel(&self, kernel: &Kernel) -> Result<(), ColocationError> {
        let (requirement, expected) = self.compatibility();
        debug!(colocator = self.name(), kernel = %kernel, "checking kernel compatibility");
        if requirement.accepts(kernel) {
            Ok(())
        } else {
            Err(ColocationError::KernelMismatch {
                colocator: self.name(),
                expected,
                found: kernel.name().to_string(),
            })
        }
    }

    /// Colocate `data` onto `points` with the built-in [`RectilinearInterpolator`].
    pub fn colocate(
        &self,
        points: &SamplePoints,
        data: &SourceData,
        constraint: &Constraint,
        kernel: &Kernel,
    ) -> Result<Vec<ColocatedData>, ColocationError> {
        self.colocate_with(points, data, constraint, kernel, &RectilinearInterpolator)
    }

    /// Colocate `data` onto `points`.
    ///
    /// Arguments
    /// -----------------
    /// * `points`: sample points, or a sample grid for the grid colocators.
    /// * `data`: the source queried for neighbours.
    /// * `constraint`: neighbour selection; its fill value marks slots without a result.
    /// * `kernel`: reduction, checked against [`Colocator::kernel_requirement`] first.
    /// * `interpolator`: used by gridded sources and the grid-to-grid colocator.
    ///
    /// Return
    /// ----------
    /// * The output products, in the order documented by each variant, or the first
    ///   configuration error found before the loop.
    pub fn colocate_with(
        &self,
        points: &SamplePoints,
        data: &SourceData,
        constraint: &Constraint,
        kernel: &Kernel,
        interpolator: &dyn GridInterpolator,
    ) -> Result<Vec<ColocatedData>, ColocationError> {
        self.check_kernel(kernel)?;
        let name = self.name();
        match self {
            Colocator::Default(c) => c.colocate(
                sample_list(points, name)?,
                data,
                constraint,
                kernel,
                interpolator,
            ),
            Colocator::Averaging(c) => {
                c.colocate(sample_list(points, name)?, data, constraint, kernel)
            }
            Colocator::Difference(c) => c.colocate(
                sample_list(points, name)?,
                data,
                constraint,
                kernel,
                interpolator,
            ),
            Colocator::Debug(c) => c.colocate(
                sample_list(points, name)?,
                data,
                constraint,
                kernel,
                interpolator,
            ),
            Colocator::Dummy => dummy::colocate(data),
            Colocator::Gridded(c) => c.colocate(sample_grid(points, name)?, data, kernel, interpolator),
            Colocator::UngriddedGridded(c) => {
                c.colocate(sample_grid(points, name)?, data, constraint, kernel)
            }
        }
    }
}

impl From<DefaultColocator> for Colocator {
    fn from(c: DefaultColocator) -> Self {
        Colocator::Default(c)
    }
}

impl From<AveragingColocator> for Colocator {
    fn from(c: AveragingColocator) -> Self {
        Colocator::Averaging(c)
    }
}

impl From<DifferenceColocator> for Colocator {
    fn from(c: DifferenceColocator) -> Self {
        Colocator::Difference(c)
    }
}

impl From<DebugColocator> for Colocator {
    fn from(c: DebugColocator) -> Self {
        Colocator::Debug(c)
    }
}

impl From<GriddedColocator> for Colocator {
    fn from(c: GriddedColocator) -> Self {
        Colocator::Gridded(c)
    }
}

impl From<UngriddedGriddedColocator> for Colocator {
    fn from(c: UngriddedGriddedColocator) -> Self {
        Colocator::UngriddedGridded(c)
    }
}

fn sample_list<'a>(
    points: &'a SamplePoints,
    colocator: &'static str,
) -> Result<&'a HyperPointList, ColocationError> {
    match points {
        SamplePoints::Points(list) => Ok(list),
        SamplePoints::Grid(_) => Err(ColocationError::SampleMismatch {
            colocator,
            expected: "point",
        }),
    }
}

fn sample_grid<'a>(
    points: &'a SamplePoints,
    colocator: &'static str,
) -> Result<&'a GriddedData, ColocationError> {
    match points {
        SamplePoints::Grid(grid) => Ok(grid),
        SamplePoints::Points(_) => Err(ColocationError::SampleMismatch {
            colocator,
            expected: "gridded",
        }),
    }
}

/// Candidate points of a point or ungridded source, masked records removed.
pub(crate) fn candidate_points<'a>(
    data: &'a SourceData,
    colocator: &'static str,
) -> Result<Cow<'a, HyperPointList>, ColocationError> {
    match data {
        SourceData::Points { points, .. } => Ok(Cow::Borrowed(points)),
        SourceData::Ungridded(ungridded) => Ok(Cow::Owned(ungridded.get_non_masked_points()?)),
        SourceData::Gridded(_) => Err(ColocationError::SourceMismatch {
            colocator,
            source_kind: data.kind(),
        }),
    }
}

/// Scalar reduction at one sample point, from constrained candidates or from a grid.
pub(crate) enum PointReduction<'a> {
    Candidates {
        constraint: &'a Constraint,
        kernel: &'a Kernel,
        candidates: Cow<'a, HyperPointList>,
    },
    /// The constraint does not apply to gridded sources.
    Grid {
        kernel: &'a Kernel,
        grid: &'a GriddedData,
        interpolator: &'a dyn GridInterpolator,
    },
}

impl<'a> PointReduction<'a> {
    /// Pair the source with the kernel: grid sampling kernels need a gridded source, point
    /// kernels need a point or ungridded source.
    pub(crate) fn new(
        colocator: &'static str,
        data: &'a SourceData,
        constraint: &'a Constraint,
        kernel: &'a Kernel,
        interpolator: &'a dyn GridInterpolator,
    ) -> Result<Self, ColocationError> {
        match (data, kernel.capability()) {
            (SourceData::Gridded(grid), KernelCapability::GridSample) => Ok(PointReduction::Grid {
                kernel,
                grid,
                interpolator,
            }),
            (SourceData::Gridded(_), _) | (_, KernelCapability::GridSample) => {
                Err(ColocationError::SourceMismatch {
                    colocator,
                    source_kind: data.kind(),
                })
            }
            _ => Ok(PointReduction::Candidates {
                constraint,
                kernel,
                candidates: candidate_points(data, colocator)?,
            }),
        }
    }

    pub(crate) fn value(&self, point: &HyperPoint) -> Result<f64, ColocationError> {
        match self {
            PointReduction::Candidates {
                constraint,
                kernel,
                candidates,
            } => kernel.get_value(point, &constraint.constrain_points(point, candidates)),
            PointReduction::Grid {
                kernel,
                grid,
                interpolator,
            } => kernel.sample_grid(point, grid, *interpolator),
        }
    }
}

/// `n` copies of `value`, reporting allocation failure.
pub(crate) fn prefilled<S: Clone>(n: usize, value: S) -> Result<Vec<S>, ColocationError> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(n)?;
    slots.resize(n, value);
    Ok(slots)
}

/// Evaluate every reference and store the result in its slot.
///
/// Slots whose evaluation fails with a recoverable error keep their initial value. The first
/// non-recoverable error is returned.
pub(crate) fn fill_slots<R, S, F>(
    references: &[R],
    slots: &mut [S],
    evaluate: F,
) -> Result<(), ColocationError>
where
    R: Sync,
    S: Send,
    F: Fn(&R) -> Result<S, ColocationError> + Sync,
{
    let write = |(slot, reference): (&mut S, &R)| match evaluate(reference) {
        Ok(value) => {
            *slot = value;
            Ok(())
        }
        Err(e) if e.is_recoverable() => Ok(()),
        Err(e) => Err(e),
    };

    #[cfg(feature = "parallel")]
    {
        slots
            .par_iter_mut()
            .zip(references.par_iter())
            .try_for_each(write)
    }
    #[cfg(not(feature = "parallel"))]
    {
        slots.iter_mut().zip(references.iter()).try_for_each(write)
    }
}

/// Metadata of a point-wise output: the source metadata with overrides, shape `[n]` and the
/// fill value as missing value.
pub(crate) fn output_metadata(
    source: &Metadata,
    overrides: &VariableOverrides,
    n: usize,
    fill_value: f64,
) -> Metadata {
    let mut metadata = source.clone();
    overrides.apply(&mut metadata);
    metadata.shape = vec![n];
    metadata.missing_value = Some(fill_value);
    metadata
}
