//! # Variable metadata
//!
//! [`Metadata`] describes a data product independently of its numeric payload: name, CF
//! standard name, long name, units, shape and missing (fill) value. Colocators copy the
//! source metadata and selectively override it to describe derived outputs
//! (`<name>_mean`, `<name>_std_dev`, `<name>_no_points`, `difference`).
//!
//! Readers hand over variable attributes as a string map;
//! [`Metadata::copy_attributes_into`] maps the well-known attributes onto the typed fields
//! and keeps the rest verbatim in [`Metadata::misc`].
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    #[serde(default)]
    pub standard_name: Option<String>,
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub shape: Vec<usize>,
    #[serde(default)]
    pub missing_value: Option<f64>,
    #[serde(default)]
    pub misc: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new(name: impl Into<String>) -> Self {
        Metadata {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_long_name(mut self, long_name: impl Into<String>) -> Self {
        self.long_name = long_name.into();
        self
    }

    pub fn with_standard_name(mut self, standard_name: impl Into<String>) -> Self {
        self.standard_name = Some(standard_name.into());
        self
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = units.into();
        self
    }

    pub fn with_shape(mut self, shape: Vec<usize>) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_missing_value(mut self, missing_value: f64) -> Self {
        self.missing_value = Some(missing_value);
        self
    }

    /// Number of elements described by [`Metadata::shape`] (1 for a scalar shape).
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Whether `value` must be treated as missing: NaN, or equal to the missing value.
    pub fn is_missing(&self, value: f64) -> bool {
        value.is_nan() || self.missing_value == Some(value)
    }

    /// Copy reader attributes into this metadata.
    ///
    /// `name`, `standard_name`, `long_name` and `units` fill the matching fields;
    /// `missing_value` and `_FillValue` set the missing value when they parse as a number.
    /// Every other attribute, and any numeric attribute that does not parse, is kept in
    /// [`Metadata::misc`].
    pub fn copy_attributes_into<'a, I>(&mut self, attributes: I)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in attributes {
            match key {
                "name" => self.name = value.to_string(),
                "standard_name" => self.standard_name = Some(value.to_string()),
                "long_name" => self.long_name = value.to_string(),
                "units" => self.units = value.to_string(),
                "missing_value" | "_FillValue" if value.trim().parse::<f64>().is_ok() => {
                    self.missing_value = value.trim().parse().ok();
                }
                _ => {
                    self.misc.insert(key.to_string(), value.to_string());
                }
            }
        }
    }
}
