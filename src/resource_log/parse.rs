use crate::resource_log::row::{Sample, TIME_STEP_STRIDE, Timeseries};
use anyhow::{Context, bail};
use regex::Regex;
use std::fs;
use std::path::Path;

/// Prefix of every line that carries resource data.
pub const LINE_MARKER: &str = "MPI";

/// Field separator inside a resource line.
pub const FIELD_DELIMITER: &str = "  ";

/// Parse an MPI resource log into a timeseries.
///
/// Only lines starting with `MPI` are considered. Fields are separated by two
/// spaces; the last value is memory, the rest are per-core CPU times:
///
/// MPI rank 0  12.417  12.398  12.402  12.410  845.2MB
///
/// Time steps are assigned 0, 10, 20, ... in file order. Step labels present
/// in the log itself are not used.
pub fn parse_resource_log(path: &Path) -> anyhow::Result<Timeseries> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read resource log {}", path.display()))?;
    let series = parse_resource_str(&text, &path.display().to_string())?;
    log::debug!(
        "parsed {} samples from resource log {}",
        series.len(),
        path.display()
    );
    Ok(series)
}

/// Parse resource log text. `origin` only labels error messages.
pub fn parse_resource_str(text: &str, origin: &str) -> anyhow::Result<Timeseries> {
    // Memory is written as e.g. "845.2MB" or "845.2 MB".
    let memory_re = Regex::new(r"^(.*?)\s*MB$")?;

    let mut out = Timeseries::new();
    let mut time_step = 0u64;
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;
        if !line.starts_with(LINE_MARKER) {
            continue;
        }

        let mut values = Vec::new();
        for field in line.split(FIELD_DELIMITER) {
            let field = field.trim();
            if field.starts_with(LINE_MARKER) {
                continue;
            }

            let number = match memory_re.captures(field) {
                Some(caps) => caps.get(1).map_or("", |m| m.as_str()),
                None => field,
            };
            let value: f64 = number.parse().with_context(|| {
                format!(
                    "resource log parse error at {}:{}: bad value {:?}",
                    origin, lno, field
                )
            })?;
            values.push(value);
        }

        let Some(sample) = Sample::from_values(values) else {
            bail!(
                "resource log parse error at {}:{}: no values in line {:?}",
                origin,
                lno,
                line
            );
        };

        out.insert(time_step, sample);
        time_step += TIME_STEP_STRIDE;
    }

    Ok(out)
}
