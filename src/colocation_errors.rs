use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ColocationError {
    #[error("Invalid constraint parameter: {0}")]
    InvalidConstraintParameter(String),

    #[error("Invalid time delta: {0}")]
    InvalidTimeDelta(String),

    #[error("Unknown kernel: {0}")]
    InvalidKernel(String),

    #[error("Unknown colocator: {0}")]
    InvalidColocator(String),

    #[error("Invalid colocator option: {0}")]
    InvalidColocatorOption(String),

    #[error("Invalid kernel specified for the {colocator} colocator: expected {expected}, found '{found}'")]
    KernelMismatch {
        colocator: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("The {colocator} colocator cannot use {source_kind} source data")]
    SourceMismatch {
        colocator: &'static str,
        source_kind: &'static str,
    },

    #[error("The {colocator} colocator expects {expected} sample points")]
    SampleMismatch {
        colocator: &'static str,
        expected: &'static str,
    },

    #[error("Coordinate not found: {0}")]
    CoordinateNotFound(String),

    #[error("Unsupported geometry: {0}")]
    UnsupportedGeometry(String),

    #[error("Cannot guess bounds: {0}")]
    BoundsGuessing(String),

    #[error("Shape mismatch: expected {expected} elements, found {found}")]
    ShapeMismatch { expected: usize, found: usize },

    #[error("No data points satisfy the constraint")]
    InsufficientData,

    #[error("Interpolation failed: {0}")]
    InterpolationFailed(String),

    #[error(
        "Failed to realize the data as there was not enough memory available ({0}).\n\
         Consider freeing up memory or reducing the amount of data before colocating."
    )]
    InsufficientMemory(#[from] TryReserveError),

    #[error("Unable to load data: {0}")]
    DataLoad(String),
}

impl ColocationError {
    /// Whether a colocator absorbs this error for a single output slot.
    ///
    /// Only per-point reduction failures are recoverable: the slot keeps the
    /// fill value and the loop moves on. Everything else aborts the request.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ColocationError::InsufficientData | ColocationError::InterpolationFailed(_)
        )
    }
}
