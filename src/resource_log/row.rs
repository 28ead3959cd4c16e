use std::collections::BTreeMap;

/// Synthetic distance between consecutive samples, in simulation ms.
pub const TIME_STEP_STRIDE: u64 = 10;

/// One simulation time step from the resource log.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// CPU time per core, in log order.
    pub cores: Vec<f64>,
    /// Memory usage in MB.
    pub memory_mb: f64,
}

impl Sample {
    /// Split a row of values into per-core fields and the trailing memory field.
    ///
    /// Returns `None` for an empty row.
    pub fn from_values(mut values: Vec<f64>) -> Option<Self> {
        let memory_mb = values.pop()?;
        Some(Self {
            cores: values,
            memory_mb,
        })
    }
}

/// Samples keyed by time step, ascending.
pub type Timeseries = BTreeMap<u64, Sample>;
