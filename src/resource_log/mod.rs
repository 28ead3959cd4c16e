//! Parsing for the MPI resource-usage log (per-core CPU time + memory).

pub mod parse;
pub mod row;

pub use parse::parse_resource_log;
pub use row::Timeseries;
