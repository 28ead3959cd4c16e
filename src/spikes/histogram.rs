use crate::Result;
use anyhow::bail;

/// Default bin width, in simulation ms.
pub const DEFAULT_BIN_WIDTH: f64 = 5.0;

/// Largest number of bins a histogram may have.
pub const MAX_BINS: usize = 10_000_000;

/// Equal-width spike count histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// Left edge of the first bin.
    pub start: f64,
    pub bin_width: f64,
    pub counts: Vec<u64>,
}

impl Histogram {
    /// `(left, right, count)` for every bin.
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, u64)> + '_ {
        self.counts.iter().enumerate().map(|(i, &count)| {
            let left = self.start + i as f64 * self.bin_width;
            (left, left + self.bin_width, count)
        })
    }

    pub fn min_count(&self) -> u64 {
        self.counts.iter().copied().min().unwrap_or(0)
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Bin spike times into `bin_width` wide bins.
///
/// Bins start at the smallest spike time and edges run up to `max + width`;
/// the last bin is closed on the right so the largest spike is counted.
pub fn bin_spikes(spikes: &[f64], bin_width: f64) -> Result<Histogram> {
    if bin_width.is_nan() || bin_width <= 0.0 {
        bail!("bin width must be positive, got {}", bin_width);
    }
    let Some((min, max)) = spikes.iter().fold(None, |acc: Option<(f64, f64)>, &t| match acc {
        None => Some((t, t)),
        Some((lo, hi)) => Some((lo.min(t), hi.max(t))),
    }) else {
        bail!("no spikes to bin");
    };
    if !min.is_finite() || !max.is_finite() {
        bail!("spike times must be finite");
    }

    let edges = ((max - min) / bin_width + 1.0).ceil();
    if !edges.is_finite() || edges > (MAX_BINS + 1) as f64 {
        bail!(
            "bin width {} gives too many bins for spikes between {} and {} (limit {})",
            bin_width,
            min,
            max,
            MAX_BINS
        );
    }
    let bins = (edges as usize).saturating_sub(1).max(1);

    let mut counts = vec![0u64; bins];
    for &t in spikes {
        let idx = (((t - min) / bin_width).floor() as usize).min(bins - 1);
        counts[idx] += 1;
    }

    Ok(Histogram {
        start: min,
        bin_width,
        counts,
    })
}
