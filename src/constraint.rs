//! # Neighbour selection
//!
//! A [`Constraint`] maps a reference and a candidate [`HyperPointList`] to the subset of
//! candidates that may contribute to the reference's output value. Surviving candidates keep
//! their relative order and the input list is never modified.
//!
//! Variants
//! -----------------
//! * [`Constraint::Null`] – identity, every candidate passes.
//! * [`Constraint::Separation`] – a [`SepConstraint`]: up to four threshold rules
//!   (horizontal, altitude, pressure, time) combined with a logical AND. Each rule compares
//!   the separation strictly (`<`). A rule that cannot be evaluated because the reference or
//!   the candidate lacks the coordinate rejects the candidate.
//! * [`Constraint::CubeCell`] – the reference is a grid cell; a candidate passes when every
//!   bounded axis of the cell contains the candidate coordinate.
//!
//! Every constraint also carries the fill value written by colocators in output slots where
//! no value can be computed.
//!
//! Example
//! -----------------
//! ```rust
//! use colocation::constraint::{Constraint, SepConstraint};
//! use colocation::hyperpoint::HyperPoint;
//! use colocation::hyperpoint::point_list::HyperPointList;
//!
//! let constraint: Constraint = SepConstraint::builder().h_sep(500.0).build().unwrap().into();
//! let data: HyperPointList = vec![
//!     HyperPoint::new(0.0, 0.0).with_value(5.0),
//!     HyperPoint::new(10.0, 10.0).with_value(9.0),
//! ]
//! .into();
//!
//! let kept = constraint.constrain_points(&HyperPoint::new(0.0, 0.0), &data);
//! assert_eq!(kept.vals(), vec![5.0]);
//! ```
use std::borrow::Cow;
use std::cmp::Ordering::{Equal, Greater};

use crate::colocation_errors::ColocationError;
use crate::constants::{Days, HectoPascal, Kilometer, Meter, DEFAULT_FILL_VALUE};
use crate::hyperpoint::cell::CellPoint;
use crate::hyperpoint::point_list::HyperPointList;
use crate::hyperpoint::{Axis, HyperPoint, NearestAxis, SamplePoint};
use crate::time::parse_time_delta_to_days;

/// One separation threshold: candidates must be strictly closer than `max` along `axis`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SepRule {
    pub axis: NearestAxis,
    pub max: f64,
}

impl SepRule {
    fn accepts(&self, reference: &HyperPoint, candidate: &HyperPoint) -> bool {
        candidate
            .separation(reference, self.axis)
            .is_some_and(|sep| sep < self.max)
    }
}

/// Separation constraint: the AND of its configured rules.
#[derive(Debug, Clone, PartialEq)]
pub struct SepConstraint {
    rules: Vec<SepRule>,
    fill_value: f64,
}

impl SepConstraint {
    pub fn builder() -> SepConstraintBuilder {
        SepConstraintBuilder::new()
    }

    pub fn rules(&self) -> &[SepRule] {
        &self.rules
    }

    pub fn fill_value(&self) -> f64 {
        self.fill_value
    }

    /// Whether `candidate` satisfies every rule around `reference`.
    ///
    /// With no rules configured every candidate is accepted.
    pub fn accepts(&self, reference: &HyperPoint, candidate: &HyperPoint) -> bool {
        self.rules.iter().all(|rule| rule.accepts(reference, candidate))
    }

    fn rule(&self, axis: NearestAxis) -> Option<f64> {
        self.rules.iter().find(|r| r.axis == axis).map(|r| r.max)
    }

    /// Maximum great-circle distance, if configured.
    pub fn h_sep(&self) -> Option<Kilometer> {
        self.rule(NearestAxis::Horizontal)
    }

    pub fn a_sep(&self) -> Option<Meter> {
        self.rule(NearestAxis::Altitude)
    }

    pub fn p_sep(&self) -> Option<HectoPascal> {
        self.rule(NearestAxis::Pressure)
    }

    /// Maximum time separation in fractional days, if configured.
    pub fn t_sep(&self) -> Option<Days> {
        self.rule(NearestAxis::Time)
    }
}

/// Builder for [`SepConstraint`], with validation.
#[derive(Debug, Clone)]
pub struct SepConstraintBuilder {
    h_sep: Option<Kilometer>,
    a_sep: Option<Meter>,
    p_sep: Option<HectoPascal>,
    t_sep: Option<String>,
    fill_value: f64,
}

impl Default for SepConstraintBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SepConstraintBuilder {
    pub fn new() -> Self {
        SepConstraintBuilder {
            h_sep: None,
            a_sep: None,
            p_sep: None,
            t_sep: None,
            fill_value: DEFAULT_FILL_VALUE,
        }
    }

    /// Maximum horizontal (great-circle) separation in km.
    pub fn h_sep(mut self, v: Kilometer) -> Self {
        self.h_sep = Some(v);
        self
    }

    /// Maximum altitude separation in m.
    pub fn a_sep(mut self, v: Meter) -> Self {
        self.a_sep = Some(v);
        self
    }

    /// Maximum pressure separation, in the unit of the data pressure.
    pub fn p_sep(mut self, v: HectoPascal) -> Self {
        self.p_sep = Some(v);
        self
    }

    /// Maximum time separation as a time-delta string, see
    /// [`parse_time_delta_to_days`].
    pub fn t_sep(mut self, delta: impl Into<String>) -> Self {
        self.t_sep = Some(delta.into());
        self
    }

    pub fn fill_value(mut self, v: f64) -> Self {
        self.fill_value = v;
        self
    }

    /// Return true iff x >= 0.0 and comparable (i.e., not NaN).
    #[inline]
    fn ge0(x: f64) -> bool {
        matches!(x.partial_cmp(&0.0), Some(Greater) | Some(Equal))
    }

    /// Finalize the builder.
    ///
    /// Validation rules
    /// -----------------
    /// * `h_sep`, `a_sep`, `p_sep` must be finite and `>= 0`.
    /// * `t_sep` must parse as a time delta; it is converted to fractional days here, once.
    /// * `fill_value` must not be NaN.
    ///
    /// Return
    /// ----------
    /// * The constraint, or [`ColocationError::InvalidConstraintParameter`] /
    ///   [`ColocationError::InvalidTimeDelta`].
    pub fn build(self) -> Result<SepConstraint, ColocationError> {
        if self.fill_value.is_nan() {
            return Err(ColocationError::InvalidConstraintParameter(
                "fill_value must be a valid float".into(),
            ));
        }

        let mut rules = Vec::with_capacity(4);
        for (name, axis, value) in [
            ("h_sep", NearestAxis::Horizontal, self.h_sep),
            ("a_sep", NearestAxis::Altitude, self.a_sep),
            ("p_sep", NearestAxis::Pressure, self.p_sep),
        ] {
            if let Some(max) = value {
                if !max.is_finite() || !Self::ge0(max) {
                    return Err(ColocationError::InvalidConstraintParameter(format!(
                        "{name} must be a finite, non-negative number (got {max})"
                    )));
                }
                rules.push(SepRule { axis, max });
            }
        }
        if let Some(delta) = &self.t_sep {
            rules.push(SepRule {
                axis: NearestAxis::Time,
                max: parse_time_delta_to_days(delta)?,
            });
        }

        Ok(SepConstraint {
            rules,
            fill_value: self.fill_value,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Null { fill_value: f64 },
    Separation(SepConstraint),
    CubeCell { fill_value: f64 },
}

impl Default for Constraint {
    fn default() -> Self {
        Constraint::null()
    }
}

impl From<SepConstraint> for Constraint {
    fn from(sep: SepConstraint) -> Self {
        Constraint::Separation(sep)
    }
}

impl Constraint {
    pub fn null() -> Self {
        Constraint::Null {
            fill_value: DEFAULT_FILL_VALUE,
        }
    }

    pub fn cube_cell() -> Self {
        Constraint::CubeCell {
            fill_value: DEFAULT_FILL_VALUE,
        }
    }

    pub fn fill_value(&self) -> f64 {
        match self {
            Constraint::Null { fill_value } | Constraint::CubeCell { fill_value } => *fill_value,
            Constraint::Separation(sep) => sep.fill_value(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Constraint::Null { .. } => "null",
            Constraint::Separation(_) => "separation",
            Constraint::CubeCell { .. } => "cube_cell",
        }
    }

    /// Candidates of `data` accepted around `reference`, in input order.
    ///
    /// The null constraint borrows `data` unchanged.
    ///
    /// Arguments
    /// -----------------
    /// * `reference`: a point, or a grid cell for the cube-cell constraint. Separation rules
    ///   use the centre of the reference.
    /// * `data`: the candidate points.
    ///
    /// Return
    /// ----------
    /// * The accepted candidates.
    pub fn constrain_points<'a, R>(&self, reference: &R, data: &'a HyperPointList) -> Cow<'a, HyperPointList>
    where
        R: SamplePoint + ?Sized,
    {
        match self {
            Constraint::Null { .. } => Cow::Borrowed(data),
            Constraint::Separation(sep) if sep.rules.is_empty() => Cow::Borrowed(data),
            Constraint::Separation(sep) => {
                let centre = reference.centre();
                Cow::Owned(
                    data.iter()
                        .filter(|p| sep.accepts(&centre, p))
                        .cloned()
                        .collect(),
                )
            }
            Constraint::CubeCell { .. } => {
                let cell = CellPoint::new(Axis::ALL.map(|axis| reference.cell(axis)));
                Cow::Owned(data.iter().filter(|p| cell.contains(p)).cloned().collect())
            }
        }
    }
}
