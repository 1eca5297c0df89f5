//! # Gridded data
//!
//! [`GriddedData`](crate::grid::GriddedData) is a dense, row-major (C-order) array with one
//! [`Coord`](crate::grid::Coord) per described axis and a [`Metadata`] record. It plays two
//! roles in colocation:
//!
//! - the **sample grid** of the ungridded-to-grid colocator, whose cells become the
//!   references of the cell-containment constraint;
//! - a **gridded source** sampled through a [`GridInterpolator`](crate::grid::interpolate::GridInterpolator)
//!   by the grid kernels and the grid-to-grid colocator.
//!
//! Coordinates spanning a single data dimension are *dimension coordinates*; coordinates
//! spanning more than one dimension are kept (e.g. 2-D latitude fields) but cannot be used
//! to iterate cells.
//!
//! Bounds
//! -----------------
//! A coordinate without bounds can have them guessed with
//! [`Coord::guess_bounds`](crate::grid::Coord::guess_bounds): each cell extends halfway to
//! its neighbours, and the edge cells extend by half their single neighbour spacing.
pub mod interpolate;

use itertools::Itertools;

use crate::colocation_errors::ColocationError;
use crate::hyperpoint::cell::Cell;
use crate::hyperpoint::Axis;
use crate::metadata::Metadata;

/// A named coordinate of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Coord {
    pub name: String,
    pub standard_name: Option<String>,
    pub units: String,
    points: Vec<f64>,
    bounds: Option<Vec<(f64, f64)>>,
    shape: Vec<usize>,
    dims: Vec<usize>,
}

impl Coord {
    /// A one-dimensional coordinate describing data dimension `dim`.
    pub fn dim(name: impl Into<String>, points: Vec<f64>, dim: usize) -> Self {
        let len = points.len();
        Coord {
            name: name.into(),
            standard_name: None,
            units: String::new(),
            points,
            bounds: None,
            shape: vec![len],
            dims: vec![dim],
        }
    }

    /// A coordinate spanning several data dimensions, stored row-major with `shape`.
    pub fn aux(
        name: impl Into<String>,
        points: Vec<f64>,
        shape: Vec<usize>,
        dims: Vec<usize>,
    ) -> Result<Self, ColocationError> {
        let expected: usize = shape.iter().product();
        if expected != points.len() {
            return Err(ColocationError::ShapeMismatch {
                expected,
                found: points.len(),
            });
        }
        if shape.len() != dims.len() {
            return Err(ColocationError::ShapeMismatch {
                expected: shape.len(),
                found: dims.len(),
            });
        }
        Ok(Coord {
            name: name.into(),
            standard_name: None,
            units: String::new(),
            points,
            bounds: None,
            shape,
            dims,
        })
    }

    pub fn with_standard_name(mut self, standard_name: impl Into<String>) -> Self {
        self.standard_name = Some(standard_name.into());
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    /// Attach explicit cell bounds, one `(lower, upper)` pair per point.
    pub fn with_bounds(mut self, bounds: Vec<(f64, f64)>) -> Result<Self, ColocationError> {
        if bounds.len() != self.points.len() {
            return Err(ColocationError::ShapeMismatch {
                expected: self.points.len(),
                found: bounds.len(),
            });
        }
        self.bounds = Some(bounds);
        Ok(self)
    }

    /// The same one-dimensional coordinate, describing data dimension `dim` instead.
    pub fn on_dimension(mut self, dim: usize) -> Result<Self, ColocationError> {
        if self.ndim() != 1 {
            return Err(ColocationError::UnsupportedGeometry(format!(
                "coordinate '{}' spans {} dimensions",
                self.display_name(),
                self.ndim()
            )));
        }
        self.dims = vec![dim];
        Ok(self)
    }

    /// Name used in messages: the standard name when present, else the variable name.
    pub fn display_name(&self) -> &str {
        self.standard_name.as_deref().unwrap_or(&self.name)
    }

    /// Canonical point-model axis this coordinate describes, if any.
    pub fn axis(&self) -> Option<Axis> {
        self.standard_name
            .as_deref()
            .and_then(Axis::from_standard_name)
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Data dimensions spanned by this coordinate.
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[f64] {
        &self.points
    }

    pub fn bounds(&self) -> Option<&[(f64, f64)]> {
        self.bounds.as_deref()
    }

    pub fn has_bounds(&self) -> bool {
        self.bounds.is_some()
    }

    /// Cell `index` of a one-dimensional coordinate.
    pub fn cell(&self, index: usize) -> Option<Cell> {
        let point = *self.points.get(index)?;
        Some(match &self.bounds {
            Some(bounds) => {
                let (lower, upper) = *bounds.get(index)?;
                Cell::bounded(point, lower, upper)
            }
            None => Cell::point(point),
        })
    }

    /// Guess contiguous bounds for a one-dimensional coordinate that has none.
    ///
    /// Errors
    /// ----------
    /// * [`ColocationError::BoundsGuessing`] if the coordinate is not one-dimensional or has
    ///   fewer than two points.
    pub fn guess_bounds(&mut self) -> Result<(), ColocationError> {
        if self.ndim() != 1 {
            return Err(ColocationError::BoundsGuessing(format!(
                "coordinate '{}' is not one-dimensional",
                self.display_name()
            )));
        }
        if self.points.len() < 2 {
            return Err(ColocationError::BoundsGuessing(format!(
                "coordinate '{}' has fewer than two points",
                self.display_name()
            )));
        }

        let mids: Vec<f64> = self
            .points
            .iter()
            .tuple_windows()
            .map(|(a, b)| 0.5 * (a + b))
            .collect();

        let n = self.points.len();
        let first = self.points[0] - (mids[0] - self.points[0]);
        let last = self.points[n - 1] + (self.points[n - 1] - mids[n - 2]);

        let edges: Vec<f64> = std::iter::once(first)
            .chain(mids)
            .chain(std::iter::once(last))
            .collect();
        self.bounds = Some(edges.into_iter().tuple_windows().collect());
        Ok(())
    }
}

/// C-order iteration over every index tuple of `shape`.
///
/// A scalar shape (`[]`) yields a single empty tuple; a shape containing a zero yields nothing.
pub fn index_iterator(shape: &[usize]) -> Box<dyn Iterator<Item = Vec<usize>> + '_> {
    if shape.is_empty() {
        Box::new(std::iter::once(Vec::new()))
    } else {
        Box::new(shape.iter().map(|&n| 0..n).multi_cartesian_product())
    }
}

/// Row-major offset of `indices` in an array of `shape`.
pub fn flat_index(shape: &[usize], indices: &[usize]) -> usize {
    indices
        .iter()
        .zip(shape)
        .fold(0, |acc, (&i, &n)| acc * n + i)
}

/// A dense gridded variable.
#[derive(Debug, Clone, PartialEq)]
pub struct GriddedData {
    metadata: Metadata,
    shape: Vec<usize>,
    data: Vec<f64>,
    coords: Vec<Coord>,
}

impl GriddedData {
    /// Build a grid, checking that the data and every coordinate agree with `shape`.
    ///
    /// The metadata shape is set to `shape`.
    pub fn new(
        data: Vec<f64>,
        shape: Vec<usize>,
        coords: Vec<Coord>,
        mut metadata: Metadata,
    ) -> Result<Self, ColocationError> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(ColocationError::ShapeMismatch {
                expected,
                found: data.len(),
            });
        }
        for coord in &coords {
            for (&dim, &len) in coord.dims.iter().zip(&coord.shape) {
                match shape.get(dim) {
                    Some(&n) if n == len => {}
                    Some(&n) => {
                        return Err(ColocationError::ShapeMismatch {
                            expected: n,
                            found: len,
                        })
                    }
                    None => {
                        return Err(ColocationError::UnsupportedGeometry(format!(
                            "coordinate '{}' refers to dimension {dim} of a {}-dimensional grid",
                            coord.display_name(),
                            shape.len()
                        )))
                    }
                }
            }
        }
        metadata.shape = shape.clone();
        Ok(GriddedData {
            metadata,
            shape,
            data,
            coords,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Replace the metadata; its shape is set to the grid shape.
    pub fn with_metadata(mut self, mut metadata: Metadata) -> Self {
        metadata.shape = self.shape.clone();
        self.metadata = metadata;
        self
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    pub fn data(&self) -> &[f64] {
        &self.data
    }

    pub fn coords(&self) -> &[Coord] {
        &self.coords
    }

    /// Coordinates carrying `standard_name`, with their position in [`GriddedData::coords`].
    pub fn coords_by_standard_name(&self, standard_name: &str) -> Vec<(usize, &Coord)> {
        self.coords
            .iter()
            .enumerate()
            .filter(|(_, c)| c.standard_name.as_deref() == Some(standard_name))
            .collect()
    }

    /// The one-dimensional coordinate describing data dimension `dim`, if any.
    pub fn dim_coord(&self, dim: usize) -> Option<&Coord> {
        self.coords.iter().find(|c| c.dims == [dim])
    }

    pub fn value_at(&self, indices: &[usize]) -> Option<f64> {
        if indices.len() != self.shape.len() || indices.iter().zip(&self.shape).any(|(i, n)| i >= n)
        {
            return None;
        }
        self.data.get(flat_index(&self.shape, indices)).copied()
    }
}
