//! # colocation
//!
//! Colocation of geophysical data onto sample locations: for every sample point (or every
//! cell of a sample grid), select the source records that satisfy a [`constraint`], reduce
//! them with a [`kernel`] and write the result into an output aligned with the samples.
//!
//! ```text
//!  sample points ──┐
//!                  ├─> colocator ─┬─> constraint (which records?)
//!  source data ────┘              └─> kernel     (one value, or statistics)
//!                                        │
//!                                        └─> colocated products + metadata
//! ```
//!
//! Modules
//! -----------------
//! * [`hyperpoint`]: points, grid cells and the distance primitives.
//! * [`data`]: point, ungridded and gridded sources, lazily realized values, outputs.
//! * [`grid`]: gridded data, coordinates and the interpolation collaborator.
//! * [`constraint`]: null, separation and cube-cell constraints.
//! * [`kernel`]: mean, full statistics, nearest-in-axis and grid sampling kernels.
//! * [`colocator`]: the colocation variants.
//! * [`config`]: serde configuration and the validated [`Colocation`] request.
//!
//! Features
//! -----------------
//! * `parallel` (default): the per-point loop runs on the rayon thread pool.
//! * `progress`: a progress bar for the debug colocator.
pub mod colocation_errors;
pub mod colocator;
pub mod config;
pub mod constants;
pub mod constraint;
pub mod data;
pub mod grid;
pub mod hyperpoint;
pub mod kernel;
pub mod metadata;
pub mod time;

pub use colocation_errors::ColocationError;
pub use colocator::{Colocator, ColocatorKind};
pub use config::{Colocation, ColocationConfig};
pub use constraint::{Constraint, SepConstraint};
pub use data::{ColocatedData, LazyData, SamplePoints, SourceData, UngriddedData};
pub use grid::GriddedData;
pub use hyperpoint::{HyperPoint, HyperPointList};
pub use kernel::Kernel;
pub use metadata::Metadata;
