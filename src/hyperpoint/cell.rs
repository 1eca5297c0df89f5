//! Grid-cell descriptors used as references when colocating onto a grid.
//!
//! A [`Cell`] is one element of a gridded coordinate: its point value and, when known, its
//! bounding interval. A [`CellPoint`] gathers one optional cell per canonical axis and acts as
//! the reference of the cell-containment constraint.
use std::borrow::Cow;

use crate::constants::NUM_STANDARD_COORDS;
use crate::hyperpoint::{Axis, HyperPoint, SamplePoint};

/// One cell of a coordinate: a point and optional `(lower, upper)` bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub point: f64,
    pub bound: Option<(f64, f64)>,
}

impl Cell {
    /// A cell reduced to a single point, without bounds.
    pub fn point(point: f64) -> Self {
        Cell { point, bound: None }
    }

    pub fn bounded(point: f64, lower: f64, upper: f64) -> Self {
        Cell {
            point,
            bound: Some((lower, upper)),
        }
    }

    /// Whether `value` lies in the cell.
    ///
    /// With bounds, both ends are inclusive and the bound order does not matter. Without
    /// bounds only the cell point itself is contained.
    pub fn contains_point(&self, value: f64) -> bool {
        match self.bound {
            Some((a, b)) => a.min(b) <= value && value <= a.max(b),
            None => value == self.point,
        }
    }
}

/// One optional cell per canonical axis; `None` means the axis is not constrained.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellPoint {
    cells: [Option<Cell>; NUM_STANDARD_COORDS],
}

impl CellPoint {
    pub fn new(cells: [Option<Cell>; NUM_STANDARD_COORDS]) -> Self {
        CellPoint { cells }
    }

    /// Whether every present cell contains the matching coordinate of `point`.
    ///
    /// A point with an unset coordinate on a constrained axis is not contained.
    pub fn contains(&self, point: &HyperPoint) -> bool {
        Axis::ALL.iter().all(|&axis| match &self.cells[axis.index()] {
            Some(cell) => point
                .coord(axis)
                .is_some_and(|value| cell.contains_point(value)),
            None => true,
        })
    }
}

impl SamplePoint for CellPoint {
    fn centre(&self) -> Cow<'_, HyperPoint> {
        Cow::Owned(HyperPoint::from_coords(
            self.cells.map(|cell| cell.map(|c| c.point)),
        ))
    }

    fn cell(&self, axis: Axis) -> Option<Cell> {
        self.cells[axis.index()]
    }
}
