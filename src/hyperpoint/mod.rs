//! # Geometric points and distance primitives
//!
//! A [`HyperPoint`](crate::hyperpoint::HyperPoint) is one sample location or data record:
//! latitude and longitude in degrees, and optionally altitude (m), air pressure (hPa) and
//! time (fractional days), plus the ordered measured value(s) at that location.
//!
//! Every coordinate that was not supplied is `None`. Unset coordinates never take part in a
//! distance computation: a separation involving an unset coordinate is undefined
//! (`None`), never zero.
//!
//! ## Primitives
//!
//! | Axis | Separation | Unit |
//! |------|------------|------|
//! | horizontal | [`HyperPoint::haversine_dist`](crate::hyperpoint::HyperPoint::haversine_dist) | km |
//! | altitude | [`HyperPoint::alt_sep`](crate::hyperpoint::HyperPoint::alt_sep) | m |
//! | pressure | [`HyperPoint::pres_sep`](crate::hyperpoint::HyperPoint::pres_sep) | hPa |
//! | time | [`HyperPoint::time_sep`](crate::hyperpoint::HyperPoint::time_sep) | days |
//!
//! [`HyperPoint::is_closer_in_axis`](crate::hyperpoint::HyperPoint::is_closer_in_axis) is
//! the comparator used by the nearest-neighbour kernels to keep a single best candidate.
//!
//! ## References
//!
//! A reference used by constraints and kernels is anything implementing
//! [`SamplePoint`](crate::hyperpoint::SamplePoint): either a plain point, or a grid cell
//! descriptor ([`CellPoint`](crate::hyperpoint::cell::CellPoint)) when colocating onto a grid.
//!
//! ```rust
//! use colocation::hyperpoint::HyperPoint;
//!
//! let a = HyperPoint::new(0.0, 0.0).with_value(5.0);
//! let b = HyperPoint::new(10.0, 10.0).with_value(9.0);
//! let d = a.haversine_dist(&b).unwrap();
//! assert!((d - 1570.2).abs() < 1.0);
//! ```
pub mod cell;
pub mod point_list;

use std::borrow::Cow;
use std::fmt;

use smallvec::SmallVec;

use crate::constants::{
    Days, Degree, HectoPascal, Kilometer, Meter, EARTH_RADIUS_KM, NUM_STANDARD_COORDS, RADEG,
    STANDARD_NAMES,
};
use cell::Cell;

pub use point_list::HyperPointList;

/// Measured value(s) carried by a point, inline for the common single-value case.
pub type PointValues = SmallVec<[f64; 1]>;

/// Canonical coordinate axes of the point model, in point-model order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Latitude,
    Longitude,
    Altitude,
    AirPressure,
    Time,
}

impl Axis {
    pub const ALL: [Axis; NUM_STANDARD_COORDS] = [
        Axis::Latitude,
        Axis::Longitude,
        Axis::Altitude,
        Axis::AirPressure,
        Axis::Time,
    ];

    /// Position of the axis in [`Axis::ALL`].
    pub fn index(self) -> usize {
        match self {
            Axis::Latitude => 0,
            Axis::Longitude => 1,
            Axis::Altitude => 2,
            Axis::AirPressure => 3,
            Axis::Time => 4,
        }
    }

    /// CF standard name used to find the matching grid coordinate.
    pub fn standard_name(self) -> &'static str {
        STANDARD_NAMES[self.index()]
    }

    pub fn from_standard_name(name: &str) -> Option<Axis> {
        Axis::ALL.into_iter().find(|a| a.standard_name() == name)
    }
}

/// Axes along which a single nearest neighbour can be selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NearestAxis {
    Horizontal,
    Altitude,
    Pressure,
    Time,
}

/// Great-circle distance in kilometers between two (latitude, longitude) pairs in degrees.
pub fn haversine_distance(lat1: Degree, lon1: Degree, lat2: Degree, lon2: Degree) -> Kilometer {
    let phi1 = lat1 * RADEG;
    let phi2 = lat2 * RADEG;
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1) * RADEG;

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().min(1.0).asin()
}

/// A sample location or data record.
///
/// Points are built once with [`HyperPoint::new`] (or [`HyperPoint::unlocated`]) and the
/// `with_*` methods, and are not mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HyperPoint {
    latitude: Option<Degree>,
    longitude: Option<Degree>,
    altitude: Option<Meter>,
    air_pressure: Option<HectoPascal>,
    time: Option<Days>,
    val: PointValues,
}

impl HyperPoint {
    /// Create a point at a horizontal location, with no vertical/time coordinate and no value.
    pub fn new(latitude: Degree, longitude: Degree) -> Self {
        HyperPoint {
            latitude: Some(latitude),
            longitude: Some(longitude),
            ..Default::default()
        }
    }

    /// Create a point with every coordinate unset.
    pub fn unlocated() -> Self {
        Self::default()
    }

    /// Build a point from one optional value per canonical axis (see [`Axis::ALL`]).
    pub fn from_coords(coords: [Option<f64>; NUM_STANDARD_COORDS]) -> Self {
        let [latitude, longitude, altitude, air_pressure, time] = coords;
        HyperPoint {
            latitude,
            longitude,
            altitude,
            air_pressure,
            time,
            val: PointValues::new(),
        }
    }

    pub fn with_altitude(mut self, altitude: Meter) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_pressure(mut self, air_pressure: HectoPascal) -> Self {
        self.air_pressure = Some(air_pressure);
        self
    }

    pub fn with_time(mut self, time: Days) -> Self {
        self.time = Some(time);
        self
    }

    /// Append one measured value.
    pub fn with_value(mut self, value: f64) -> Self {
        self.val.push(value);
        self
    }

    /// Replace the measured values.
    pub fn with_values<I: IntoIterator<Item = f64>>(mut self, values: I) -> Self {
        self.val = values.into_iter().collect();
        self
    }

    pub fn latitude(&self) -> Option<Degree> {
        self.latitude
    }

    pub fn longitude(&self) -> Option<Degree> {
        self.longitude
    }

    pub fn altitude(&self) -> Option<Meter> {
        self.altitude
    }

    pub fn air_pressure(&self) -> Option<HectoPascal> {
        self.air_pressure
    }

    pub fn time(&self) -> Option<Days> {
        self.time
    }

    /// All measured values, possibly empty.
    pub fn values(&self) -> &[f64] {
        &self.val
    }

    /// First value component, the one every reduction operates on.
    pub fn value(&self) -> Option<f64> {
        self.val.first().copied()
    }

    /// Coordinate along a canonical axis, `None` when unset.
    pub fn coord(&self, axis: Axis) -> Option<f64> {
        match axis {
            Axis::Latitude => self.latitude,
            Axis::Longitude => self.longitude,
            Axis::Altitude => self.altitude,
            Axis::AirPressure => self.air_pressure,
            Axis::Time => self.time,
        }
    }

    /// Coordinates in point-model order.
    pub fn coord_tuple(&self) -> [Option<f64>; NUM_STANDARD_COORDS] {
        Axis::ALL.map(|axis| self.coord(axis))
    }

    /// Great-circle distance to `other` in kilometers.
    ///
    /// Return
    /// ----------
    /// * `None` if the latitude or longitude of either point is unset.
    pub fn haversine_dist(&self, other: &HyperPoint) -> Option<Kilometer> {
        Some(haversine_distance(
            self.latitude?,
            self.longitude?,
            other.latitude?,
            other.longitude?,
        ))
    }

    /// Absolute altitude difference in meters, `None` if either altitude is unset.
    pub fn alt_sep(&self, other: &HyperPoint) -> Option<Meter> {
        Some((self.altitude? - other.altitude?).abs())
    }

    /// Absolute pressure difference in hPa, `None` if either pressure is unset.
    pub fn pres_sep(&self, other: &HyperPoint) -> Option<HectoPascal> {
        Some((self.air_pressure? - other.air_pressure?).abs())
    }

    /// Absolute time difference in days, `None` if either time is unset.
    pub fn time_sep(&self, other: &HyperPoint) -> Option<Days> {
        Some((self.time? - other.time?).abs())
    }

    /// Separation to `other` along one nearest-neighbour axis.
    pub fn separation(&self, other: &HyperPoint, axis: NearestAxis) -> Option<f64> {
        match axis {
            NearestAxis::Horizontal => self.haversine_dist(other),
            NearestAxis::Altitude => self.alt_sep(other),
            NearestAxis::Pressure => self.pres_sep(other),
            NearestAxis::Time => self.time_sep(other),
        }
    }

    /// Whether `candidate` is strictly closer to this reference than `current` along `axis`.
    ///
    /// Ties return `false`, so a left-to-right scan keeps the earliest candidate. A candidate
    /// whose separation is undefined (unset coordinate) is never closer; a defined separation
    /// always beats an undefined one.
    pub fn is_closer_in_axis(
        &self,
        axis: NearestAxis,
        current: &HyperPoint,
        candidate: &HyperPoint,
    ) -> bool {
        match (
            self.separation(current, axis),
            self.separation(candidate, axis),
        ) {
            (Some(best), Some(new)) => new < best,
            (None, Some(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for HyperPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v}"));
        write!(
            f,
            "HyperPoint(lat={}, lon={}, alt={}, pres={}, t={}, val={:?})",
            show(self.latitude),
            show(self.longitude),
            show(self.altitude),
            show(self.air_pressure),
            show(self.time),
            self.val.as_slice()
        )
    }
}

/// A reference location for constraints and kernels.
///
/// Plain points and grid-cell descriptors both act as references. A point behaves as a
/// degenerate cell on every set axis; a cell behaves as its centre point.
pub trait SamplePoint: Sync {
    /// Representative point of the reference.
    fn centre(&self) -> Cow<'_, HyperPoint>;

    /// Cell descriptor along `axis`, `None` when the reference does not constrain that axis.
    fn cell(&self, axis: Axis) -> Option<Cell>;
}

impl SamplePoint for HyperPoint {
    fn centre(&self) -> Cow<'_, HyperPoint> {
        Cow::Borrowed(self)
    }

    fn cell(&self, axis: Axis) -> Option<Cell> {
        self.coord(axis).map(Cell::point)
    }
}
