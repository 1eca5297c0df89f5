//! # Data products
//!
//! Containers exchanged between readers, colocators and output consumers.
//!
//! * [`LazyData`] – a flat array of values paired with its [`Metadata`]. The values are either
//!   *realized* (held in memory) or *deferred* behind a loader that runs at most once, on the
//!   first call to [`LazyData::realize`].
//! * [`UngriddedData`] – per-record coordinates plus a [`LazyData`] payload, as delivered by
//!   readers of satellite swaths or in-situ tracks. [`UngriddedData::get_non_masked_points`]
//!   turns it into the candidate [`HyperPointList`] with missing records removed.
//! * [`SourceData`] – what a colocator is asked to query: a ready point list, ungridded data or
//!   a grid.
//! * [`SamplePoints`] – where output values are wanted: a point list or a grid.
//! * [`ColocatedData`] – one output product of a colocation run.
//!
//! Memory
//! -----------------
//! Realizing deferred data reserves the whole array up front. An allocation failure is
//! reported as [`ColocationError::InsufficientMemory`] instead of aborting the process.
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::colocation_errors::ColocationError;
use crate::grid::GriddedData;
use crate::hyperpoint::point_list::HyperPointList;
use crate::hyperpoint::HyperPoint;
use crate::metadata::Metadata;

/// Fills the provided, pre-reserved buffer with the values of a deferred array.
pub type Loader = Arc<dyn Fn(&mut Vec<f64>) -> Result<(), ColocationError> + Send + Sync>;

/// A flat numeric array with its metadata, realized now or on first access.
#[derive(Clone)]
pub struct LazyData {
    metadata: Metadata,
    values: OnceCell<Vec<f64>>,
    loader: Option<Loader>,
}

impl fmt::Debug for LazyData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyData")
            .field("metadata", &self.metadata)
            .field("values", &self.values.get())
            .field("deferred", &self.loader.is_some())
            .finish()
    }
}

impl PartialEq for LazyData {
    fn eq(&self, other: &Self) -> bool {
        self.metadata == other.metadata && self.values.get() == other.values.get()
    }
}

impl LazyData {
    /// Realized data.
    ///
    /// An empty metadata shape is set to `[values.len()]`; otherwise the shape must describe
    /// exactly `values.len()` elements.
    ///
    /// Return
    /// ----------
    /// * The realized data, or [`ColocationError::ShapeMismatch`].
    pub fn from_values(values: Vec<f64>, mut metadata: Metadata) -> Result<Self, ColocationError> {
        if metadata.shape.is_empty() {
            metadata.shape = vec![values.len()];
        } else if metadata.size() != values.len() {
            return Err(ColocationError::ShapeMismatch {
                expected: metadata.size(),
                found: values.len(),
            });
        }
        Ok(LazyData {
            metadata,
            values: OnceCell::with_value(values),
            loader: None,
        })
    }

    /// Deferred data of `metadata.size()` elements, produced by `loader` on first access.
    pub fn deferred<F>(metadata: Metadata, loader: F) -> Self
    where
        F: Fn(&mut Vec<f64>) -> Result<(), ColocationError> + Send + Sync + 'static,
    {
        LazyData {
            metadata,
            values: OnceCell::new(),
            loader: Some(Arc::new(loader)),
        }
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn is_realized(&self) -> bool {
        self.values.get().is_some()
    }

    /// Values if already realized.
    pub fn values(&self) -> Option<&[f64]> {
        self.values.get().map(Vec::as_slice)
    }

    /// Realize the values, running the loader the first time only.
    ///
    /// Arguments
    /// -----------------
    /// None, the loader and the expected size come from construction.
    ///
    /// Return
    /// ----------
    /// * The values, or:
    ///   - [`ColocationError::InsufficientMemory`] if the array cannot be allocated,
    ///   - [`ColocationError::ShapeMismatch`] if the loader produced the wrong element count,
    ///   - any error returned by the loader itself.
    ///
    /// A failed realization leaves the data unrealized; the next call tries again.
    pub fn realize(&self) -> Result<&[f64], ColocationError> {
        self.values
            .get_or_try_init(|| {
                let loader = self.loader.as_ref().ok_or_else(|| {
                    ColocationError::DataLoad(format!(
                        "'{}' has neither values nor a loader",
                        self.metadata.name
                    ))
                })?;
                let expected = self.metadata.size();
                let mut values = Vec::new();
                values.try_reserve_exact(expected)?;
                loader(&mut values)?;
                if values.len() != expected {
                    return Err(ColocationError::ShapeMismatch {
                        expected,
                        found: values.len(),
                    });
                }
                Ok(values)
            })
            .map(Vec::as_slice)
    }
}

/// Coordinates and values of an ungridded variable, one record per index.
#[derive(Debug, Clone, PartialEq)]
pub struct UngriddedData {
    latitude: Vec<f64>,
    longitude: Vec<f64>,
    altitude: Option<Vec<f64>>,
    air_pressure: Option<Vec<f64>>,
    time: Option<Vec<f64>>,
    data: LazyData,
}

impl UngriddedData {
    pub fn new(
        latitude: Vec<f64>,
        longitude: Vec<f64>,
        data: LazyData,
    ) -> Result<Self, ColocationError> {
        check_len(latitude.len(), longitude.len())?;
        Ok(UngriddedData {
            latitude,
            longitude,
            altitude: None,
            air_pressure: None,
            time: None,
            data,
        })
    }

    pub fn with_altitude(mut self, altitude: Vec<f64>) -> Result<Self, ColocationError> {
        check_len(self.latitude.len(), altitude.len())?;
        self.altitude = Some(altitude);
        Ok(self)
    }

    pub fn with_pressure(mut self, air_pressure: Vec<f64>) -> Result<Self, ColocationError> {
        check_len(self.latitude.len(), air_pressure.len())?;
        self.air_pressure = Some(air_pressure);
        Ok(self)
    }

    pub fn with_time(mut self, time: Vec<f64>) -> Result<Self, ColocationError> {
        check_len(self.latitude.len(), time.len())?;
        self.time = Some(time);
        Ok(self)
    }

    pub fn metadata(&self) -> &Metadata {
        self.data.metadata()
    }

    pub fn data(&self) -> &LazyData {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.latitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latitude.is_empty()
    }

    /// Candidate points of every valid record, in record order.
    ///
    /// Realizes the values if needed. Records whose value is missing (NaN or equal to the
    /// metadata missing value) are dropped, as are records with a NaN latitude or longitude.
    /// A NaN altitude, pressure or time leaves that coordinate unset on the point.
    pub fn get_non_masked_points(&self) -> Result<HyperPointList, ColocationError> {
        let values = self.data.realize()?;
        check_len(self.latitude.len(), values.len())?;

        let metadata = self.data.metadata();
        let optional = |column: &Option<Vec<f64>>, i: usize| {
            column.as_ref().map(|c| c[i]).filter(|v| !v.is_nan())
        };

        let mut points = HyperPointList::try_with_capacity(values.len())?;
        for (i, &value) in values.iter().enumerate() {
            let (lat, lon) = (self.latitude[i], self.longitude[i]);
            if metadata.is_missing(value) || lat.is_nan() || lon.is_nan() {
                continue;
            }
            points.push(
                HyperPoint::from_coords([
                    Some(lat),
                    Some(lon),
                    optional(&self.altitude, i),
                    optional(&self.air_pressure, i),
                    optional(&self.time, i),
                ])
                .with_value(value),
            );
        }
        Ok(points)
    }
}

fn check_len(expected: usize, found: usize) -> Result<(), ColocationError> {
    if expected == found {
        Ok(())
    } else {
        Err(ColocationError::ShapeMismatch { expected, found })
    }
}

/// Data queried for neighbours.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceData {
    /// A ready candidate list; every point is used as given.
    Points {
        points: HyperPointList,
        metadata: Metadata,
    },
    Ungridded(UngriddedData),
    Gridded(GriddedData),
}

impl SourceData {
    pub fn metadata(&self) -> &Metadata {
        match self {
            SourceData::Points { metadata, .. } => metadata,
            SourceData::Ungridded(data) => data.metadata(),
            SourceData::Gridded(grid) => grid.metadata(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            SourceData::Points { .. } => "point",
            SourceData::Ungridded(_) => "ungridded",
            SourceData::Gridded(_) => "gridded",
        }
    }
}

impl From<UngriddedData> for SourceData {
    fn from(data: UngriddedData) -> Self {
        SourceData::Ungridded(data)
    }
}

impl From<GriddedData> for SourceData {
    fn from(grid: GriddedData) -> Self {
        SourceData::Gridded(grid)
    }
}

/// Locations where colocated values are wanted.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplePoints {
    Points(HyperPointList),
    Grid(GriddedData),
}

impl From<HyperPointList> for SamplePoints {
    fn from(points: HyperPointList) -> Self {
        SamplePoints::Points(points)
    }
}

impl From<GriddedData> for SamplePoints {
    fn from(grid: GriddedData) -> Self {
        SamplePoints::Grid(grid)
    }
}

/// One output product of a colocation run.
#[derive(Debug, Clone, PartialEq)]
pub enum ColocatedData {
    Ungridded(LazyData),
    Gridded(GriddedData),
}

impl ColocatedData {
    pub fn metadata(&self) -> &Metadata {
        match self {
            ColocatedData::Ungridded(data) => data.metadata(),
            ColocatedData::Gridded(grid) => grid.metadata(),
        }
    }

    /// Output values; `None` only for ungridded data that was never realized.
    pub fn values(&self) -> Option<&[f64]> {
        match self {
            ColocatedData::Ungridded(data) => data.values(),
            ColocatedData::Gridded(grid) => Some(grid.data()),
        }
    }

    pub fn as_gridded(&self) -> Option<&GriddedData> {
        match self {
            ColocatedData::Gridded(grid) => Some(grid),
            ColocatedData::Ungridded(_) => None,
        }
    }
}

#[cfg(test)]
mod data_test {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn test_from_values_sets_shape() {
        let data = LazyData::from_values(vec![1.0, 2.0], Metadata::new("x")).unwrap();
        assert!(data.is_realized());
        assert_eq!(data.metadata().shape, vec![2]);
        assert_eq!(data.realize().unwrap(), &[1.0, 2.0]);

        let bad = LazyData::from_values(vec![1.0], Metadata::new("x").with_shape(vec![3]));
        assert_eq!(
            bad.unwrap_err(),
            ColocationError::ShapeMismatch {
                expected: 3,
                found: 1
            }
        );
    }

    #[test]
    fn test_deferred_realizes_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let data = LazyData::deferred(Metadata::new("x").with_shape(vec![3]), move |buf| {
            counter.fetch_add(1, Ordering::SeqCst);
            buf.extend([1.0, 2.0, 3.0]);
            Ok(())
        });

        assert!(!data.is_realized());
        assert!(data.values().is_none());
        assert_eq!(data.realize().unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(data.realize().unwrap(), &[1.0, 2.0, 3.0]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_deferred_failures() {
        let huge = LazyData::deferred(Metadata::new("x").with_shape(vec![usize::MAX]), |_| Ok(()));
        assert!(matches!(
            huge.realize(),
            Err(ColocationError::InsufficientMemory(_))
        ));
        assert!(!huge.is_realized());

        let short = LazyData::deferred(Metadata::new("x").with_shape(vec![2]), |buf| {
            buf.push(1.0);
            Ok(())
        });
        assert!(matches!(
            short.realize(),
            Err(ColocationError::ShapeMismatch { .. })
        ));

        let failing = LazyData::deferred(Metadata::new("x").with_shape(vec![1]), |_| {
            Err(ColocationError::DataLoad("file vanished".into()))
        });
        assert_eq!(
            failing.realize().unwrap_err(),
            ColocationError::DataLoad("file vanished".into())
        );
    }

    #[test]
    fn test_get_non_masked_points() {
        let values = LazyData::from_values(
            vec![1.0, -999.0, f64::NAN, 4.0, 5.0],
            Metadata::new("AOD").with_missing_value(-999.0),
        )
        .unwrap();
        let data = UngriddedData::new(
            vec![0.0, 1.0, 2.0, f64::NAN, 4.0],
            vec![0.0; 5],
            values,
        )
        .unwrap()
        .with_altitude(vec![10.0, 20.0, 30.0, 40.0, f64::NAN])
        .unwrap();

        let points = data.get_non_masked_points().unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value(), Some(1.0));
        assert_eq!(points[0].altitude(), Some(10.0));
        assert_eq!(points[1].latitude(), Some(4.0));
        assert_eq!(points[1].altitude(), None);
        assert_eq!(points[1].time(), None);
    }

    #[test]
    fn test_ungridded_shape_checks() {
        let values = LazyData::from_values(vec![1.0, 2.0], Metadata::new("x")).unwrap();
        assert!(UngriddedData::new(vec![0.0], vec![0.0, 1.0], values.clone()).is_err());

        let data = UngriddedData::new(vec![0.0, 1.0], vec![0.0, 1.0], values).unwrap();
        assert!(data.clone().with_time(vec![1.0]).is_err());

        let short = LazyData::from_values(vec![1.0], Metadata::new("x")).unwrap();
        let data = UngriddedData::new(vec![0.0, 1.0], vec![0.0, 1.0], short).unwrap();
        assert_eq!(
            data.get_non_masked_points().unwrap_err(),
            ColocationError::ShapeMismatch {
                expected: 2,
                found: 1
            }
        );
    }
}
