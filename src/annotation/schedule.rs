//! Annotation schedules: which modulators are active at which time step.
//!
//! JSON shape (`--annotations FILE`):
//! {
//!   "blocks": [
//!     { "time": 1250, "modulators": [ { "name": "NA", "level": 1 } ] },
//!     { "time": 3500, "modulators": [ { "name": "5HT", "level": 1 }, { "name": "NA", "level": 1 } ] }
//!   ]
//! }

use crate::Result;
use crate::annotation::Modulator;
use anyhow::{Context, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Time step -> (modulator, level) pairs, stacked bottom-up in list order.
pub type Annotation = BTreeMap<u64, Vec<(Modulator, u32)>>;

const DEFAULT_FIRST_STEP: u64 = 1250;
const DEFAULT_STEP_GAP: u64 = 750;
const DEFAULT_MAX_LEVEL: u32 = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationSpec {
    #[serde(default)]
    pub blocks: Vec<RawBlock>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawBlock {
    pub time: u64,
    #[serde(default)]
    pub modulators: Vec<RawLevel>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawLevel {
    pub name: Modulator,
    pub level: u32,
}

impl AnnotationSpec {
    /// Check levels and time uniqueness, then build the annotation map.
    pub fn validate_and_build(self) -> Result<Annotation> {
        let mut out = Annotation::new();
        for block in self.blocks {
            let mut entries = Vec::with_capacity(block.modulators.len());
            for m in block.modulators {
                if m.level == 0 {
                    bail!("modulator {} at time {} has level 0", m.name, block.time);
                }
                if let Modulator::Other(name) = &m.name {
                    log::debug!("unknown modulator {:?} at time {}", name, block.time);
                }
                entries.push((m.name, m.level));
            }
            if out.insert(block.time, entries).is_some() {
                bail!("duplicate annotation time {}", block.time);
            }
        }
        Ok(out)
    }
}

/// Load and validate an annotation JSON file.
pub fn load_annotation_file(path: &Path) -> Result<Annotation> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read annotation file {}", path.display()))?;
    let spec: AnnotationSpec = serde_json::from_str(&text)
        .with_context(|| format!("parse annotation file {}", path.display()))?;
    spec.validate_and_build()
        .with_context(|| format!("invalid annotation file {}", path.display()))
}

/// Schedule used by the neuromodulation experiments.
///
/// Every combination of DA, 5-HT and NA levels 0..=2 except all-zero, one
/// every 750 ms from 1250 ms, NA varying fastest.
pub fn default_schedule() -> Annotation {
    let mut out = Annotation::new();
    let mut time = DEFAULT_FIRST_STEP;
    for da in 0..=DEFAULT_MAX_LEVEL {
        for ht5 in 0..=DEFAULT_MAX_LEVEL {
            for na in 0..=DEFAULT_MAX_LEVEL {
                let entries: Vec<(Modulator, u32)> = [
                    (Modulator::Dopamine, da),
                    (Modulator::Serotonin, ht5),
                    (Modulator::Noradrenaline, na),
                ]
                .into_iter()
                .filter(|(_, level)| *level > 0)
                .collect();
                if entries.is_empty() {
                    continue;
                }
                out.insert(time, entries);
                time += DEFAULT_STEP_GAP;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn default_schedule_shape() {
        let schedule = default_schedule();
        assert_eq!(schedule.len(), 26);
        assert_eq!(schedule.keys().next(), Some(&1250));
        assert_eq!(schedule.keys().next_back(), Some(&20000));

        assert_eq!(schedule[&1250], vec![(Modulator::Noradrenaline, 1)]);
        assert_eq!(
            schedule[&4250],
            vec![(Modulator::Serotonin, 1), (Modulator::Noradrenaline, 2)]
        );
        assert_eq!(schedule[&7250], vec![(Modulator::Dopamine, 1)]);
        assert_eq!(
            schedule[&20000],
            vec![
                (Modulator::Dopamine, 2),
                (Modulator::Serotonin, 2),
                (Modulator::Noradrenaline, 2),
            ]
        );
    }

    #[test]
    fn loads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"blocks": [
                {{"time": 500, "modulators": [{{"name": "DA", "level": 1}}, {{"name": "5HT", "level": 2}}]}},
                {{"time": 100, "modulators": [{{"name": "ACh", "level": 3}}]}}
            ]}}"#
        )
        .unwrap();

        let annotation = load_annotation_file(file.path()).unwrap();
        assert_eq!(annotation.keys().copied().collect::<Vec<_>>(), vec![100, 500]);
        assert_eq!(
            annotation[&500],
            vec![(Modulator::Dopamine, 1), (Modulator::Serotonin, 2)]
        );
        assert_eq!(annotation[&100], vec![(Modulator::Other("ACh".into()), 3)]);
    }

    #[test]
    fn rejects_zero_level() {
        let spec: AnnotationSpec = serde_json::from_str(
            r#"{"blocks": [{"time": 1, "modulators": [{"name": "NA", "level": 0}]}]}"#,
        )
        .unwrap();
        assert!(spec.validate_and_build().is_err());
    }

    #[test]
    fn rejects_duplicate_time() {
        let spec: AnnotationSpec = serde_json::from_str(
            r#"{"blocks": [{"time": 1, "modulators": []}, {"time": 1, "modulators": []}]}"#,
        )
        .unwrap();
        let err = spec.validate_and_build().unwrap_err();
        assert!(err.to_string().contains("duplicate annotation time 1"));
    }
}
