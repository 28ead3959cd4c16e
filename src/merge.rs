//! Merge per-thread result shards (`name-<thread>.ext`) into `name.ext`.
//!
//! Shards are deleted once copied. There is no rollback: a failure part-way
//! leaves a partially written main file and some shards already removed.

use crate::Result;
use anyhow::Context;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// One main file produced from its shards.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedFile {
    pub main: PathBuf,
    pub shards: Vec<PathBuf>,
    pub bytes: u64,
}

/// Main file name for a shard, or `None` if the name has no thread suffix.
///
/// `spikes-12.gdf` -> `spikes.gdf`, `run-0-3.dat` -> `run.dat`.
pub fn main_file_name(shard: &str) -> Option<String> {
    let (base, _) = shard.split_once('-')?;
    Some(match shard.rsplit_once('.') {
        Some((_, ext)) => format!("{}.{}", base, ext),
        None => base.to_string(),
    })
}

/// Merge every shard group in `dir`.
///
/// Shards of a group are concatenated in file name order.
pub fn merge_directory(dir: &Path) -> Result<Vec<MergedFile>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read directory {}", dir.display()))? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(name) => log::warn!("skipping non UTF-8 file name {:?}", name),
        }
    }
    names.sort();

    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for name in names {
        match main_file_name(&name) {
            Some(main) => groups.entry(main).or_default().push(name),
            None => log::debug!("{} is not a shard, leaving it alone", name),
        }
    }

    let mut merged = Vec::with_capacity(groups.len());
    for (main, shards) in groups {
        let main_path = dir.join(&main);
        let shard_paths: Vec<PathBuf> = shards.iter().map(|s| dir.join(s)).collect();
        let bytes = merge_group(&main_path, &shard_paths)?;
        log::info!(
            "merged {} shards into {} ({} bytes)",
            shard_paths.len(),
            main_path.display(),
            bytes
        );
        merged.push(MergedFile {
            main: main_path,
            shards: shard_paths,
            bytes,
        });
    }

    Ok(merged)
}

fn merge_group(main: &Path, shards: &[PathBuf]) -> Result<u64> {
    if main.exists() {
        log::warn!("overwriting existing {}", main.display());
    }
    let file = File::create(main).with_context(|| format!("create {}", main.display()))?;
    let mut out = BufWriter::new(file);

    let mut total = 0u64;
    for shard in shards {
        let mut input = File::open(shard).with_context(|| format!("open {}", shard.display()))?;
        total += io::copy(&mut input, &mut out)
            .with_context(|| format!("copy {} into {}", shard.display(), main.display()))?;
        drop(input);
        fs::remove_file(shard).with_context(|| format!("remove {}", shard.display()))?;
    }
    out.flush()
        .with_context(|| format!("write {}", main.display()))?;

    Ok(total)
}
