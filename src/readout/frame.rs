//! Frame-level processing
//!
//! Dense frame types plus the three per-board transforms: marker column
//! stripping, correlated double sampling and sparse pixel remapping.

pub mod types;
mod markers;
mod stripper;
mod cds;
mod sparse;

pub use types::{Frame, PivotMap, SignalPolarity, SparsePixel, ThreeSampleFrames};
pub use markers::MarkerColumns;
pub use stripper::strip_columns;
pub use cds::compute_cds;
pub use sparse::remap_sparse_pixels;
