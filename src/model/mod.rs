//! Aggregation model: turn a resource timeseries into plottable sequences.

use crate::Result;
use crate::resource_log::Timeseries;
use anyhow::bail;

/// How CPU values are reduced per time step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuMode {
    /// Arithmetic mean over all cores.
    Mean,
    /// One sequence per core index.
    PerCore,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CpuSeries {
    Mean(Vec<f64>),
    /// Indexed by core; inner vectors are ordered by time step.
    PerCore(Vec<Vec<f64>>),
}

impl CpuSeries {
    /// Smallest and largest plotted value, if any.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        let values: Box<dyn Iterator<Item = f64> + '_> = match self {
            CpuSeries::Mean(v) => Box::new(v.iter().copied()),
            CpuSeries::PerCore(cores) => Box::new(cores.iter().flatten().copied()),
        };
        values.fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    }
}

/// Parallel sequences ordered by ascending time step.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceData {
    pub cpu: CpuSeries,
    pub memory: Vec<f64>,
    pub time: Vec<u64>,
}

/// Aggregate a timeseries.
///
/// The core count is taken from the first sample. Later samples with another
/// count are logged and folded in as far as they go: extra cores are dropped
/// in per-core mode, missing cores leave that core's sequence shorter.
pub fn aggregate(series: &Timeseries, mode: CpuMode) -> Result<ResourceData> {
    let Some(first) = series.values().next() else {
        bail!("resource log contains no samples");
    };
    let cores = first.cores.len();
    if cores == 0 {
        bail!("first resource sample has no per-core values");
    }

    let mut time = Vec::with_capacity(series.len());
    let mut memory = Vec::with_capacity(series.len());
    for (&step, sample) in series {
        time.push(step);
        memory.push(sample.memory_mb);
        if sample.cores.len() != cores {
            log::warn!(
                "time step {} has {} cores, expected {}",
                step,
                sample.cores.len(),
                cores
            );
        }
    }

    let cpu = match mode {
        CpuMode::Mean => {
            let mut means = Vec::with_capacity(series.len());
            for (step, sample) in series {
                if sample.cores.is_empty() {
                    bail!("time step {} has no per-core values", step);
                }
                means.push(sample.cores.iter().sum::<f64>() / sample.cores.len() as f64);
            }
            CpuSeries::Mean(means)
        }
        CpuMode::PerCore => {
            let mut per_core: Vec<Vec<f64>> = vec![Vec::with_capacity(series.len()); cores];
            for sample in series.values() {
                for (core, value) in per_core.iter_mut().zip(&sample.cores) {
                    core.push(*value);
                }
            }
            CpuSeries::PerCore(per_core)
        }
    };

    Ok(ResourceData { cpu, memory, time })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_log::row::Sample;
    use pretty_assertions::assert_eq;

    fn series(rows: &[(&[f64], f64)]) -> Timeseries {
        rows.iter()
            .enumerate()
            .map(|(i, (cores, mem))| {
                (
                    i as u64 * 10,
                    Sample {
                        cores: cores.to_vec(),
                        memory_mb: *mem,
                    },
                )
            })
            .collect()
    }

    #[test]
    fn mean_of_two_cores() {
        let data = aggregate(&series(&[(&[1.0, 3.0], 100.0)]), CpuMode::Mean).unwrap();
        assert_eq!(data.cpu, CpuSeries::Mean(vec![2.0]));
        assert_eq!(data.memory, vec![100.0]);
        assert_eq!(data.time, vec![0]);
    }

    #[test]
    fn per_core_keeps_order_and_count() {
        let ts = series(&[
            (&[1.0, 2.0, 3.0], 10.0),
            (&[4.0, 5.0, 6.0], 11.0),
            (&[7.0, 8.0, 9.0], 12.0),
        ]);
        let data = aggregate(&ts, CpuMode::PerCore).unwrap();

        assert_eq!(
            data.cpu,
            CpuSeries::PerCore(vec![
                vec![1.0, 4.0, 7.0],
                vec![2.0, 5.0, 8.0],
                vec![3.0, 6.0, 9.0],
            ])
        );
        assert_eq!(data.time, vec![0, 10, 20]);
        assert_eq!(data.memory, vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn per_core_ignores_extra_cores() {
        let ts = series(&[(&[1.0, 2.0], 10.0), (&[3.0, 4.0, 5.0], 11.0), (&[6.0], 12.0)]);
        let data = aggregate(&ts, CpuMode::PerCore).unwrap();
        assert_eq!(
            data.cpu,
            CpuSeries::PerCore(vec![vec![1.0, 3.0, 6.0], vec![2.0, 4.0]])
        );
    }

    #[test]
    fn empty_series_is_an_error() {
        assert!(aggregate(&Timeseries::new(), CpuMode::Mean).is_err());
    }

    #[test]
    fn memory_only_first_sample_is_an_error() {
        let err = aggregate(&series(&[(&[], 10.0)]), CpuMode::PerCore).unwrap_err();
        assert!(err.to_string().contains("no per-core values"));
    }

    #[test]
    fn bounds_cover_all_cores() {
        let cpu = CpuSeries::PerCore(vec![vec![2.0, 9.0], vec![-1.0, 3.0]]);
        assert_eq!(cpu.bounds(), Some((-1.0, 9.0)));
        assert_eq!(CpuSeries::Mean(vec![]).bounds(), None);
    }
}
