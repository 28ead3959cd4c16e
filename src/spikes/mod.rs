//! Spike-time collection from `.gdf` files and histogram binning.

pub mod collect;
pub mod histogram;

pub use collect::collect_spikes;
pub use histogram::{DEFAULT_BIN_WIDTH, Histogram, bin_spikes};
