//! Passthrough colocation: the source values and metadata are returned as they are.
//!
//! Useful when the source is already known to share the sampling of the sample points. No
//! check of the coordinates is made.
use tracing::info;

use crate::colocation_errors::ColocationError;
use crate::data::{ColocatedData, LazyData, SourceData};

/// Point sources yield the first value of every point; a point without value yields the
/// source missing value, or NaN.
pub(crate) fn colocate(data: &SourceData) -> Result<Vec<ColocatedData>, ColocationError> {
    info!("--> colocating...");
    let product = match data {
        SourceData::Points { points, metadata } => {
            let missing = metadata.missing_value.unwrap_or(f64::NAN);
            let values = points
                .iter()
                .map(|p| p.value().unwrap_or(missing))
                .collect();
            ColocatedData::Ungridded(LazyData::from_values(
                values,
                metadata.clone().with_shape(vec![points.len()]),
            )?)
        }
        SourceData::Ungridded(ungridded) => ColocatedData::Ungridded(ungridded.data().clone()),
        SourceData::Gridded(grid) => ColocatedData::Gridded(grid.clone()),
    };
    Ok(vec![product])
}
