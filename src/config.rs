//! # Configuration
//!
//! Colocation requests are described by a [`ColocationConfig`]: which colocator, which kernel
//! and which constraint, with their options. The structures deserialize with `serde` from any
//! format; numeric options may be given either as numbers or as strings, the way they arrive
//! from a command line (`h_sep=500`).
//!
//! Everything is validated eagerly by [`Colocation::new`]: unparsable numbers, unknown names,
//! options that do not belong to the selected colocator and kernel/colocator mismatches are
//! all reported before any point is colocated.
//!
//! Example
//! -----------------
//! ```rust
//! use colocation::config::{Colocation, ColocationConfig, ConstraintConfig};
//!
//! let config = ColocationConfig {
//!     kernel: Some("nn_horizontal".into()),
//!     constraint: Some(
//!         ConstraintConfig::from_options([("h_sep", "500"), ("t_sep", "1dT12H")]).unwrap(),
//!     ),
//!     ..Default::default()
//! };
//! let colocation = Colocation::new(&config).unwrap();
//! assert_eq!(colocation.kernel().name(), "nn_horizontal");
//! ```
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::colocation_errors::ColocationError;
use crate::colocator::{
    AveragingColocator, Colocator, ColocatorKind, DebugColocator, DefaultColocator,
    DifferenceColocator, GriddedColocator, UngriddedGriddedColocator, VariableOverrides,
};
use crate::constants::DEFAULT_FILL_VALUE;
use crate::constraint::{Constraint, SepConstraint};
use crate::data::{ColocatedData, SamplePoints, SourceData};
use crate::grid::interpolate::{GridInterpolator, RectilinearInterpolator};
use crate::kernel::Kernel;

/// A numeric option given as a number or as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Number(f64),
    Text(String),
}

impl OptionValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            OptionValue::Number(v) => Some(*v),
            OptionValue::Text(s) => s.trim().parse().ok(),
        }
    }

    fn as_usize(&self) -> Option<usize> {
        match self {
            OptionValue::Number(v) if v.fract() == 0.0 && *v >= 0.0 => Some(*v as usize),
            OptionValue::Number(_) => None,
            OptionValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Number(v) => write!(f, "{v}"),
            OptionValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for OptionValue {
    fn from(s: &str) -> Self {
        OptionValue::Text(s.to_string())
    }
}

impl From<f64> for OptionValue {
    fn from(v: f64) -> Self {
        OptionValue::Number(v)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintMethod {
    #[default]
    Separation,
    Null,
    CubeCell,
}

/// Constraint options. Unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConstraintConfig {
    #[serde(default)]
    pub method: ConstraintMethod,
    #[serde(default)]
    pub h_sep: Option<OptionValue>,
    #[serde(default)]
    pub a_sep: Option<OptionValue>,
    #[serde(default)]
    pub p_sep: Option<OptionValue>,
    #[serde(default)]
    pub t_sep: Option<OptionValue>,
    #[serde(default)]
    pub fill_value: Option<OptionValue>,
}

impl ConstraintConfig {
    /// Separation-constraint options from `key=value` style pairs.
    ///
    /// Arguments
    /// -----------------
    /// * `options`: pairs with keys among `h_sep`, `a_sep`, `p_sep`, `t_sep`, `fill_value`.
    ///
    /// Return
    /// ----------
    /// * The configuration, or [`ColocationError::InvalidConstraintParameter`] on an unknown key.
    ///   Values are only parsed by [`ConstraintConfig::build`].
    pub fn from_options<'a, I>(options: I) -> Result<Self, ColocationError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut config = ConstraintConfig::default();
        for (key, value) in options {
            let slot = match key.trim() {
                "h_sep" => &mut config.h_sep,
                "a_sep" => &mut config.a_sep,
                "p_sep" => &mut config.p_sep,
                "t_sep" => &mut config.t_sep,
                "fill_value" => &mut config.fill_value,
                other => {
                    return Err(ColocationError::InvalidConstraintParameter(format!(
                        "unknown option '{other}'"
                    )))
                }
            };
            *slot = Some(value.into());
        }
        Ok(config)
    }

    fn float(key: &str, value: &Option<OptionValue>) -> Result<Option<f64>, ColocationError> {
        value
            .as_ref()
            .map(|v| {
                v.as_f64().ok_or_else(|| {
                    ColocationError::InvalidConstraintParameter(format!(
                        "{key} must be a valid float (got '{v}')"
                    ))
                })
            })
            .transpose()
    }

    /// Build the constraint, parsing every option.
    pub fn build(&self) -> Result<Constraint, ColocationError> {
        let fill_value = Self::float("fill_value", &self.fill_value)?.unwrap_or(DEFAULT_FILL_VALUE);
        let h_sep = Self::float("h_sep", &self.h_sep)?;
        let a_sep = Self::float("a_sep", &self.a_sep)?;
        let p_sep = Self::float("p_sep", &self.p_sep)?;

        match self.method {
            ConstraintMethod::Separation => {
                let mut builder = SepConstraint::builder().fill_value(fill_value);
                if let Some(v) = h_sep {
                    builder = builder.h_sep(v);
                }
                if let Some(v) = a_sep {
                    builder = builder.a_sep(v);
                }
                if let Some(v) = p_sep {
                    builder = builder.p_sep(v);
                }
                if let Some(delta) = &self.t_sep {
                    builder = builder.t_sep(delta.to_string());
                }
                Ok(builder.build()?.into())
            }
            ConstraintMethod::Null | ConstraintMethod::CubeCell => {
                if h_sep.is_some() || a_sep.is_some() || p_sep.is_some() || self.t_sep.is_some() {
                    return Err(ColocationError::InvalidConstraintParameter(
                        "separations only apply to the separation constraint".into(),
                    ));
                }
                if fill_value.is_nan() {
                    return Err(ColocationError::InvalidConstraintParameter(
                        "fill_value must be a valid float".into(),
                    ));
                }
                Ok(match self.method {
                    ConstraintMethod::Null => Constraint::Null { fill_value },
                    _ => Constraint::CubeCell { fill_value },
                })
            }
        }
    }
}

/// Colocator options. Options that do not apply to `kind` are rejected by
/// [`ColocatorConfig::build`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColocatorConfig {
    #[serde(default)]
    pub kind: ColocatorKind,
    #[serde(default)]
    pub var_name: Option<String>,
    #[serde(default)]
    pub var_long_name: Option<String>,
    #[serde(default)]
    pub var_units: Option<String>,
    #[serde(default)]
    pub stddev_name: Option<String>,
    #[serde(default)]
    pub nopoints_name: Option<String>,
    #[serde(default)]
    pub diff_name: Option<String>,
    #[serde(default)]
    pub diff_long_name: Option<String>,
    #[serde(default)]
    pub max_vals: Option<OptionValue>,
    #[serde(default)]
    pub print_step: Option<OptionValue>,
}

impl ColocatorConfig {
    pub fn new(kind: ColocatorKind) -> Self {
        ColocatorConfig {
            kind,
            ..Default::default()
        }
    }

    fn overrides(&self) -> VariableOverrides {
        VariableOverrides {
            var_name: self.var_name.clone(),
            var_long_name: self.var_long_name.clone(),
            var_units: self.var_units.clone(),
        }
    }

    /// Options set on this configuration, by name.
    fn present(&self) -> Vec<&'static str> {
        [
            ("var_name", self.var_name.is_some()),
            ("var_long_name", self.var_long_name.is_some()),
            ("var_units", self.var_units.is_some()),
            ("stddev_name", self.stddev_name.is_some()),
            ("nopoints_name", self.nopoints_name.is_some()),
            ("diff_name", self.diff_name.is_some()),
            ("diff_long_name", self.diff_long_name.is_some()),
            ("max_vals", self.max_vals.is_some()),
            ("print_step", self.print_step.is_some()),
        ]
        .into_iter()
        .filter_map(|(name, set)| set.then_some(name))
        .collect()
    }

    fn allowed(&self) -> &'static [&'static str] {
        const NAMING: &[&str] = &["var_name", "var_long_name", "var_units"];
        match self.kind {
            ColocatorKind::Default | ColocatorKind::Gridded | ColocatorKind::UngriddedGridded => {
                NAMING
            }
            ColocatorKind::Average => &[
                "var_name",
                "var_long_name",
                "var_units",
                "stddev_name",
                "nopoints_name",
            ],
            ColocatorKind::Difference => &[
                "var_name",
                "var_long_name",
                "var_units",
                "diff_name",
                "diff_long_name",
            ],
            ColocatorKind::Debug => &["max_vals", "print_step"],
            ColocatorKind::Dummy => &[],
        }
    }

    /// Build the colocator.
    ///
    /// Return
    /// ----------
    /// * The colocator, or [`ColocationError::InvalidColocatorOption`] for an option that does
    ///   not apply to the kind or does not parse.
    pub fn build(&self) -> Result<Colocator, ColocationError> {
        let allowed = self.allowed();
        if let Some(option) = self.present().into_iter().find(|o| !allowed.contains(o)) {
            return Err(ColocationError::InvalidColocatorOption(format!(
                "'{option}' is not an option of the {} colocator",
                self.kind
            )));
        }

        Ok(match self.kind {
            ColocatorKind::Default => DefaultColocator::new(self.overrides()).into(),
            ColocatorKind::Average => AveragingColocator::new(
                self.overrides(),
                self.stddev_name.clone(),
                self.nopoints_name.clone(),
            )
            .into(),
            ColocatorKind::Difference => {
                let mut c = DifferenceColocator {
                    overrides: self.overrides(),
                    diff_long_name: self.diff_long_name.clone(),
                    ..Default::default()
                };
                if let Some(name) = &self.diff_name {
                    c.diff_name = name.clone();
                }
                c.into()
            }
            ColocatorKind::Debug => {
                let defaults = DebugColocator::default();
                let max_vals = match &self.max_vals {
                    Some(v) => v.as_usize().ok_or_else(|| {
                        ColocationError::InvalidColocatorOption(format!(
                            "max_vals must be a non-negative integer (got '{v}')"
                        ))
                    })?,
                    None => defaults.max_vals(),
                };
                let print_step = match &self.print_step {
                    Some(v) => v.as_f64().ok_or_else(|| {
                        ColocationError::InvalidColocatorOption(format!(
                            "print_step must be a valid float (got '{v}')"
                        ))
                    })?,
                    None => defaults.print_step(),
                };
                DebugColocator::new(max_vals, print_step)?.into()
            }
            ColocatorKind::Dummy => Colocator::Dummy,
            ColocatorKind::Gridded => GriddedColocator::new(self.overrides()).into(),
            ColocatorKind::UngriddedGridded => {
                UngriddedGriddedColocator::new(self.overrides()).into()
            }
        })
    }
}

/// A complete colocation request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColocationConfig {
    #[serde(default)]
    pub colocator: ColocatorConfig,
    /// Kernel name; the colocator default when absent.
    #[serde(default)]
    pub kernel: Option<String>,
    /// Constraint options; when absent the ungridded-to-grid colocator uses the cube-cell
    /// constraint and every other colocator the null constraint.
    #[serde(default)]
    pub constraint: Option<ConstraintConfig>,
}

/// A validated colocator, constraint and kernel, ready to run.
#[derive(Debug)]
pub struct Colocation {
    colocator: Colocator,
    constraint: Constraint,
    kernel: Kernel,
    interpolator: Box<dyn GridInterpolator>,
}

impl Colocation {
    /// Build and cross-check every component of `config`.
    ///
    /// Return
    /// ----------
    /// * The request, or the first configuration error.
    pub fn new(config: &ColocationConfig) -> Result<Self, ColocationError> {
        let colocator = config.colocator.build()?;
        let kernel = match &config.kernel {
            Some(name) => name.parse()?,
            None => colocator.kind().default_kernel(),
        };
        let constraint = match &config.constraint {
            Some(c) => c.build()?,
            None if colocator.kind() == ColocatorKind::UngriddedGridded => Constraint::cube_cell(),
            None => Constraint::null(),
        };
        Self::from_parts(colocator, constraint, kernel)
    }

    pub fn from_parts(
        colocator: Colocator,
        constraint: Constraint,
        kernel: Kernel,
    ) -> Result<Self, ColocationError> {
        colocator.check_kernel(&kernel)?;
        Ok(Colocation {
            colocator,
            constraint,
            kernel,
            interpolator: Box::new(RectilinearInterpolator),
        })
    }

    /// Use another interpolation collaborator for gridded sources.
    pub fn with_interpolator(mut self, interpolator: Box<dyn GridInterpolator>) -> Self {
        self.interpolator = interpolator;
        self
    }

    pub fn colocator(&self) -> &Colocator {
        &self.colocator
    }

    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    pub fn kernel(&self) -> &Kernel {
        &self.kernel
    }

    /// Colocate `data` onto `points`.
    pub fn run(
        &self,
        points: &SamplePoints,
        data: &SourceData,
    ) -> Result<Vec<ColocatedData>, ColocationError> {
        self.colocator.colocate_with(
            points,
            data,
            &self.constraint,
            &self.kernel,
            self.interpolator.as_ref(),
        )
    }
}
