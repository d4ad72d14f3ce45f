pub mod analysis;
pub mod binning;
pub mod filter;

pub use binning::{BIN_STEPS, BOUNDARY_COUNT, BinSet, compute_bins, round2};
pub use filter::{FilterSpec, Operator, UnknownOperator, filter, filter_indices};
