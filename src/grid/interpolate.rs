//! # Gridded interpolation
//!
//! Colocation treats interpolation on gridded data as a black box with the contract
//! "given a coordinate tuple, return a scalar or fail". That box is the
//! [`GridInterpolator`] trait; the grid kernels and the grid-to-grid colocator only ever
//! talk to it.
//!
//! [`RectilinearInterpolator`] is the built-in implementation for grids whose data
//! dimensions are each described by a monotonic one-dimensional coordinate carrying a
//! canonical standard name (`latitude`, `longitude`, `altitude`, `air_pressure`, `time`):
//!
//! * **nearest** – picks the closest grid index on every dimension (first index on ties),
//! * **linear** – multilinear interpolation between the bracketing grid points; a coordinate
//!   outside the grid range, or a missing value at a contributing corner, fails with
//!   [`ColocationError::InterpolationFailed`].
//!
//! A dimension of length one accepts any coordinate for nearest sampling and only its own
//! point for linear sampling. A dimension whose axis is unset in the coordinate tuple is only
//! accepted when it has length one.
use std::fmt;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::colocation_errors::ColocationError;
use crate::constants::NUM_STANDARD_COORDS;
use crate::grid::{flat_index, index_iterator, Coord, GriddedData};
use crate::hyperpoint::Axis;

/// Coordinate tuple in point-model order, `None` for unset axes.
pub type CoordTuple = [Option<f64>; NUM_STANDARD_COORDS];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterpolationMode {
    Nearest,
    #[serde(alias = "bilinear")]
    Linear,
}

impl InterpolationMode {
    pub fn name(&self) -> &'static str {
        match self {
            InterpolationMode::Nearest => "nearest",
            InterpolationMode::Linear => "bilinear",
        }
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Interpolation on gridded data.
pub trait GridInterpolator: Send + Sync + fmt::Debug {
    /// Value of the grid cell nearest to `coords`.
    fn nearest_neighbour_value(
        &self,
        grid: &GriddedData,
        coords: &CoordTuple,
    ) -> Result<f64, ColocationError>;

    /// Linearly interpolated value of the grid at `coords`.
    fn linear_interpolate(
        &self,
        grid: &GriddedData,
        coords: &CoordTuple,
    ) -> Result<f64, ColocationError>;

    /// Resample `source` onto the coordinates of `target`.
    ///
    /// The result has the shape and coordinates of `target` and the metadata of `source`.
    fn regrid(
        &self,
        source: &GriddedData,
        target: &GriddedData,
        mode: InterpolationMode,
    ) -> Result<GriddedData, ColocationError>;

    fn sample(
        &self,
        grid: &GriddedData,
        coords: &CoordTuple,
        mode: InterpolationMode,
    ) -> Result<f64, ColocationError> {
        match mode {
            InterpolationMode::Nearest => self.nearest_neighbour_value(grid, coords),
            InterpolationMode::Linear => self.linear_interpolate(grid, coords),
        }
    }
}

/// Interpolator for grids described by monotonic one-dimensional coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct RectilinearInterpolator;

/// Canonical axis and dimension coordinate of every data dimension of `grid`.
fn dimension_axes(grid: &GriddedData) -> Result<Vec<(Axis, &Coord)>, ColocationError> {
    (0..grid.ndim())
        .map(|dim| {
            let coord = grid.dim_coord(dim).ok_or_else(|| {
                ColocationError::CoordinateNotFound(format!(
                    "no dimension coordinate describes dimension {dim} of '{}'",
                    grid.metadata().name
                ))
            })?;
            let axis = coord.axis().ok_or_else(|| {
                ColocationError::CoordinateNotFound(format!(
                    "coordinate '{}' has no canonical standard name",
                    coord.display_name()
                ))
            })?;
            Ok((axis, coord))
        })
        .collect()
}

fn nearest_index(coord: &Coord, value: Option<f64>) -> Result<usize, ColocationError> {
    let points = coord.points();
    match (points.len(), value) {
        (1, _) => Ok(0),
        (_, None) => Err(ColocationError::InterpolationFailed(format!(
            "no value given for coordinate '{}'",
            coord.display_name()
        ))),
        (_, Some(v)) => points
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (i, p)| {
                let d = (p - v).abs();
                match best {
                    Some((_, bd)) if bd <= d => best,
                    _ => Some((i, d)),
                }
            })
            .map(|(i, _)| i)
            .ok_or_else(|| {
                ColocationError::InterpolationFailed(format!(
                    "coordinate '{}' is empty",
                    coord.display_name()
                ))
            }),
    }
}

/// Bracketing indices and weights of `value` along a monotonic coordinate.
fn linear_weights(coord: &Coord, value: Option<f64>) -> Result<Vec<(usize, f64)>, ColocationError> {
    let points = coord.points();
    let out_of_range = |v: f64| {
        ColocationError::InterpolationFailed(format!(
            "{v} is outside the range of coordinate '{}'",
            coord.display_name()
        ))
    };

    if points.len() == 1 {
        return match value {
            None => Ok(vec![(0, 1.0)]),
            Some(v) if v == points[0] => Ok(vec![(0, 1.0)]),
            Some(v) => Err(out_of_range(v)),
        };
    }
    let v = value.ok_or_else(|| {
        ColocationError::InterpolationFailed(format!(
            "no value given for coordinate '{}'",
            coord.display_name()
        ))
    })?;

    for (i, pair) in points.windows(2).enumerate() {
        let (a, b) = (pair[0], pair[1]);
        if a.min(b) <= v && v <= a.max(b) {
            if a == b {
                return Ok(vec![(i, 1.0)]);
            }
            let t = (v - a) / (b - a);
            return Ok(vec![(i, 1.0 - t), (i + 1, t)]);
        }
    }
    Err(out_of_range(v))
}

fn combine_corners(
    grid: &GriddedData,
    weights: &[Vec<(usize, f64)>],
) -> Result<f64, ColocationError> {
    // A scalar grid has a single, empty corner
    let corners: Box<dyn Iterator<Item = Vec<(usize, f64)>>> = if weights.is_empty() {
        Box::new(std::iter::once(Vec::new()))
    } else {
        Box::new(
            weights
                .iter()
                .map(|w| w.iter().copied())
                .multi_cartesian_product(),
        )
    };

    let mut total = 0.0;
    for corner in corners {
        let w: f64 = corner.iter().map(|(_, w)| w).product();
        if w == 0.0 {
            continue;
        }
        let indices: Vec<usize> = corner.iter().map(|(i, _)| *i).collect();
        let value = grid.data()[flat_index(grid.shape(), &indices)];
        if grid.metadata().is_missing(value) {
            return Err(ColocationError::InterpolationFailed(
                "a contributing grid point is missing".into(),
            ));
        }
        total += w * value;
    }
    Ok(total)
}

impl GridInterpolator for RectilinearInterpolator {
    fn nearest_neighbour_value(
        &self,
        grid: &GriddedData,
        coords: &CoordTuple,
    ) -> Result<f64, ColocationError> {
        let indices = dimension_axes(grid)?
            .into_iter()
            .map(|(axis, coord)| nearest_index(coord, coords[axis.index()]))
            .collect::<Result<Vec<_>, _>>()?;
        let value = grid.data()[flat_index(grid.shape(), &indices)];
        if grid.metadata().is_missing(value) {
            return Err(ColocationError::InterpolationFailed(
                "nearest grid point is missing".into(),
            ));
        }
        Ok(value)
    }

    fn linear_interpolate(
        &self,
        grid: &GriddedData,
        coords: &CoordTuple,
    ) -> Result<f64, ColocationError> {
        let weights = dimension_axes(grid)?
            .into_iter()
            .map(|(axis, coord)| linear_weights(coord, coords[axis.index()]))
            .collect::<Result<Vec<_>, _>>()?;
        combine_corners(grid, &weights)
    }

    fn regrid(
        &self,
        source: &GriddedData,
        target: &GriddedData,
        mode: InterpolationMode,
    ) -> Result<GriddedData, ColocationError> {
        let target_axes = dimension_axes(target)?;
        for (axis, coord) in dimension_axes(source)? {
            if coord.len() > 1 && !target_axes.iter().any(|(a, _)| *a == axis) {
                return Err(ColocationError::UnsupportedGeometry(format!(
                    "source coordinate '{}' has no counterpart on the target grid",
                    coord.display_name()
                )));
            }
        }

        let fill = source.metadata().missing_value.unwrap_or(f64::NAN);
        let mut values = Vec::new();
        values.try_reserve_exact(target.data().len())?;
        for indices in index_iterator(target.shape()) {
            let mut tuple: CoordTuple = [None; NUM_STANDARD_COORDS];
            for ((axis, coord), &i) in target_axes.iter().zip(&indices) {
                tuple[axis.index()] = coord.points().get(i).copied();
            }
            let value = match self.sample(source, &tuple, mode) {
                Ok(v) => v,
                Err(e) if e.is_recoverable() => fill,
                Err(e) => return Err(e),
            };
            values.push(value);
        }

        GriddedData::new(
            values,
            target.shape().to_vec(),
            target.coords().to_vec(),
            source.metadata().clone(),
        )
    }
}
