//! Grid-to-grid colocation, delegated to the interpolation collaborator.
use tracing::info;

use crate::colocation_errors::ColocationError;
use crate::colocator::VariableOverrides;
use crate::data::{ColocatedData, SourceData};
use crate::grid::interpolate::GridInterpolator;
use crate::grid::GriddedData;
use crate::kernel::Kernel;

/// Regrids a gridded source onto the coordinates of the sample grid.
///
/// The output has the sample grid shape and coordinates and the source metadata, with the
/// optional overrides applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GriddedColocator {
    pub overrides: VariableOverrides,
}

impl GriddedColocator {
    pub fn new(overrides: VariableOverrides) -> Self {
        GriddedColocator { overrides }
    }

    pub(crate) fn colocate(
        &self,
        points: &GriddedData,
        data: &SourceData,
        kernel: &Kernel,
        interpolator: &dyn GridInterpolator,
    ) -> Result<Vec<ColocatedData>, ColocationError> {
        let SourceData::Gridded(source) = data else {
            return Err(ColocationError::SourceMismatch {
                colocator: "gridded",
                source_kind: data.kind(),
            });
        };
        let mode = kernel
            .interpolation_mode()
            .ok_or_else(|| ColocationError::KernelMismatch {
                colocator: "gridded",
                expected: "a grid-to-grid interpolation kernel",
                found: kernel.name().to_string(),
            })?;

        info!(mode = %mode, "--> regridding...");
        let regridded = interpolator.regrid(source, points, mode)?;

        let mut metadata = regridded.metadata().clone();
        self.overrides.apply(&mut metadata);
        Ok(vec![ColocatedData::Gridded(regridded.with_metadata(metadata))])
    }
}
