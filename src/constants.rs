//! # Constants and type definitions for colocation
//!
//! This module centralizes the **geophysical constants**, **conversion factors**, and **common type
//! definitions** shared by the point model, the constraints, the kernels and the colocators.
//!
//! ## Overview
//!
//! - Earth radius used by the great-circle distance
//! - Default sentinel written in output slots that received no value
//! - Canonical coordinate axis names (CF standard names) of the point model
//! - Unit type aliases used across the crate

// -------------------------------------------------------------------------------------------------
// Physical constants and unit conversions
// -------------------------------------------------------------------------------------------------

/// Earth radius in kilometers used by the haversine distance
pub const EARTH_RADIUS_KM: f64 = 6378.0;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Number of seconds in a day
pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Mean length of a Gregorian calendar year in days
pub const DAYS_PER_YEAR: f64 = 365.2425;

/// Mean length of a calendar month in days
pub const DAYS_PER_MONTH: f64 = DAYS_PER_YEAR / 12.0;

/// Fill value used when a constraint is built without an explicit one
pub const DEFAULT_FILL_VALUE: f64 = -999.0;

/// Number of canonical coordinate axes carried by a [`HyperPoint`](crate::hyperpoint::HyperPoint)
pub const NUM_STANDARD_COORDS: usize = 5;

/// CF standard names of the canonical axes, in point-model order
pub const STANDARD_NAMES: [&str; NUM_STANDARD_COORDS] =
    ["latitude", "longitude", "altitude", "air_pressure", "time"];

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Distance in kilometers
pub type Kilometer = f64;
/// Distance in meters
pub type Meter = f64;
/// Pressure in hectopascals
pub type HectoPascal = f64;
/// Time expressed as fractional days
pub type Days = f64;
