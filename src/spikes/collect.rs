use crate::Result;
use anyhow::{Context, bail};
use std::fs;
use std::path::{Path, PathBuf};

/// Extension of spike detector output files.
pub const SPIKE_EXTENSION: &str = "gdf";

/// Lines this short or shorter carry no spike and count as time 0.
const MIN_SPIKE_LINE_LEN: usize = 5;

/// Spike times from every file in a directory, in no meaningful order.
pub type SpikeSet = Vec<f64>;

/// Gather spike times from all `.gdf` files under `dir`.
///
/// Files are read in lexicographic name order. Each line is
/// `sender<TAB>time[<TAB>...]`. Short lines, including the empty one after a
/// trailing newline, contribute a 0.0 entry.
pub fn collect_spikes(dir: &Path) -> Result<SpikeSet> {
    let files = spike_files(dir)?;
    if files.is_empty() {
        bail!("There are no files with .{}!", SPIKE_EXTENSION);
    }

    let mut out = SpikeSet::new();
    for file in &files {
        let text = fs::read_to_string(file)
            .with_context(|| format!("read spike file {}", file.display()))?;
        parse_spike_lines(&text, &file.display().to_string(), &mut out)?;
    }

    log::debug!(
        "collected {} spike entries from {} files in {}",
        out.len(),
        files.len(),
        dir.display()
    );
    Ok(out)
}

fn spike_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        fs::read_dir(dir).with_context(|| format!("read spike directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.extension().is_some_and(|ext| ext == SPIKE_EXTENSION) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn parse_spike_lines(text: &str, origin: &str, out: &mut SpikeSet) -> Result<()> {
    for (lineno, line) in text.split('\n').enumerate() {
        if line.chars().count() <= MIN_SPIKE_LINE_LEN {
            out.push(0.0);
            continue;
        }

        let Some(field) = line.split('\t').nth(1) else {
            bail!(
                "spike file parse error at {}:{}: no time field in {:?}",
                origin,
                lineno + 1,
                line
            );
        };
        let time: f64 = field.trim().parse().with_context(|| {
            format!(
                "spike file parse error at {}:{}: bad time {:?}",
                origin,
                lineno + 1,
                field
            )
        })?;
        out.push(time);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_directory_warns() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "1\t2.0\n").unwrap();

        let err = collect_spikes(dir.path()).unwrap_err();
        assert_eq!(err.to_string(), "There are no files with .gdf!");
    }

    #[test]
    fn reads_files_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.gdf"), "17\t30.5\t\n").unwrap();
        fs::write(dir.path().join("a.gdf"), "12\t10.25\t\n12\t11.0\t").unwrap();
        fs::write(dir.path().join("c.dat"), "99\t99.0\n").unwrap();

        let spikes = collect_spikes(dir.path()).unwrap();

        // a.gdf has no trailing newline; b.gdf's trailing newline adds a zero.
        assert_eq!(spikes, vec![10.25, 11.0, 30.5, 0.0]);
    }

    #[test]
    fn only_gdf_extension_matches() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("run.gdf"), "1\t2.50").unwrap();
        fs::write(dir.path().join("run.gdf.bak"), "1\t9.50").unwrap();
        fs::write(dir.path().join("notgdf"), "1\t8.50").unwrap();
        fs::write(dir.path().join("run.GDF"), "1\t7.50").unwrap();

        assert_eq!(collect_spikes(dir.path()).unwrap(), vec![2.5]);
    }

    #[test]
    fn short_lines_count_as_zero() {
        let mut out = SpikeSet::new();
        parse_spike_lines("1\t2.50\n\n3\t4\n1\t7.75", "test", &mut out).unwrap();
        // "3\t4" is only 3 characters long.
        assert_eq!(out, vec![2.5, 0.0, 0.0, 7.75]);
    }

    #[test]
    fn long_line_without_tab_is_an_error() {
        let mut out = SpikeSet::new();
        let err = parse_spike_lines("123456789\n", "x.gdf", &mut out).unwrap_err();
        assert!(err.to_string().contains("x.gdf:1"));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(collect_spikes(&dir.path().join("nope")).is_err());
    }
}
