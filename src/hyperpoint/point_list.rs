//! Ordered, appendable collection of [`HyperPoint`]s.
//!
//! A [`HyperPointList`] is the candidate set handed from data readers to constraints and from
//! constraints to kernels. Insertion order is preserved; reductions do not depend on it except
//! for the tie-breaking of the nearest-neighbour kernels.
use std::ops::Index;

use crate::colocation_errors::ColocationError;
use crate::hyperpoint::HyperPoint;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HyperPointList {
    points: Vec<HyperPoint>,
}

impl HyperPointList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate room for `capacity` points up front, reporting allocation failure.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, ColocationError> {
        let mut points = Vec::new();
        points.try_reserve_exact(capacity)?;
        Ok(HyperPointList { points })
    }

    pub fn push(&mut self, point: HyperPoint) {
        self.points.push(point);
    }

    pub fn get(&self, index: usize) -> Option<&HyperPoint> {
        self.points.get(index)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HyperPoint> {
        self.points.iter()
    }

    pub fn as_slice(&self) -> &[HyperPoint] {
        &self.points
    }

    /// First value component of every point that carries one, in order.
    pub fn vals(&self) -> Vec<f64> {
        self.points.iter().filter_map(HyperPoint::value).collect()
    }
}

impl Index<usize> for HyperPointList {
    type Output = HyperPoint;

    fn index(&self, index: usize) -> &HyperPoint {
        &self.points[index]
    }
}

impl From<Vec<HyperPoint>> for HyperPointList {
    fn from(points: Vec<HyperPoint>) -> Self {
        HyperPointList { points }
    }
}

impl FromIterator<HyperPoint> for HyperPointList {
    fn from_iter<I: IntoIterator<Item = HyperPoint>>(iter: I) -> Self {
        HyperPointList {
            points: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for HyperPointList {
    type Item = HyperPoint;
    type IntoIter = std::vec::IntoIter<HyperPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.into_iter()
    }
}

impl<'a> IntoIterator for &'a HyperPointList {
    type Item = &'a HyperPoint;
    type IntoIter = std::slice::Iter<'a, HyperPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

#[cfg(test)]
mod point_list_test {
    use super::*;

    #[test]
    fn test_push_and_lookup() {
        let mut list = HyperPointList::try_with_capacity(2).unwrap();
        assert!(list.is_empty());
        list.push(HyperPoint::new(0.0, 0.0).with_value(1.0));
        list.push(HyperPoint::new(1.0, 1.0));
        list.push(HyperPoint::new(2.0, 2.0).with_value(3.0));

        assert_eq!(list.len(), 3);
        assert_eq!(list[2].latitude(), Some(2.0));
        assert!(list.get(3).is_none());
        assert_eq!(list.vals(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_capacity_overflow_is_reported() {
        assert!(matches!(
            HyperPointList::try_with_capacity(usize::MAX),
            Err(ColocationError::InsufficientMemory(_))
        ));
    }
}
