//! Discovery of cross-validated datasets on disk and the JSON cache.
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::data_handling::{DatasetSplit, Datasets};
use crate::io::table_reader::{read_table, TableReaderConfig};

const TRAIN_SUFFIX: &str = "tra";
const TEST_SUFFIX: &str = "tst";

#[derive(Debug, Default)]
struct SplitFiles {
    train: Option<PathBuf>,
    test: Option<PathBuf>,
}

/// Loads every dataset directory below a root.
///
/// Each sub-directory holds the splits of one dataset, named
/// `<name>-<k>-<i>tra.<ext>` and `<name>-<k>-<i>tst.<ext>`.
#[derive(Debug, Clone, Default)]
pub struct DatasetRepository {
    pub reader: TableReaderConfig,
}

impl DatasetRepository {
    pub fn new(reader: TableReaderConfig) -> Self {
        Self { reader }
    }

    /// Load all dataset directories under `root`. A directory that fails to
    /// load is logged and left out.
    pub fn discover<P: AsRef<Path>>(&self, root: P) -> Result<Datasets> {
        let root = root.as_ref();
        let mut dirs: Vec<PathBuf> = fs::read_dir(root)
            .with_context(|| format!("Failed to read data directory {}", root.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_dir())
            .collect();
        dirs.sort();

        let mut datasets = Datasets::new();
        for dir in dirs {
            match self.load_dataset_dir(&dir) {
                Ok(Some((name, splits))) => {
                    if datasets.contains_key(&name) {
                        log::warn!("Duplicate dataset '{}' in {}, ignoring", name, dir.display());
                        continue;
                    }
                    log::info!("Loaded {} ({} splits) from {}", name, splits.len(), dir.display());
                    datasets.insert(name, splits);
                }
                Ok(None) => log::warn!("No train/test pairs in {}", dir.display()),
                Err(e) => log::warn!("Skipping {}: {:#}", dir.display(), e),
            }
        }
        Ok(datasets)
    }

    /// Load the paired splits of one dataset directory, `None` if it holds no
    /// complete pair.
    pub fn load_dataset_dir<P: AsRef<Path>>(&self, dir: P) -> Result<Option<(String, Vec<DatasetSplit>)>> {
        let dir = dir.as_ref();
        let mut pairs: BTreeMap<(String, Option<usize>), SplitFiles> = BTreeMap::new();
        for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
            let path = entry?.path();
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Some(key) = stem.strip_suffix(TRAIN_SUFFIX) {
                pairs.entry(split_key(key)).or_default().train = Some(path.clone());
            } else if let Some(key) = stem.strip_suffix(TEST_SUFFIX) {
                pairs.entry(split_key(key)).or_default().test = Some(path.clone());
            }
        }

        let mut name = None;
        let mut splits = Vec::new();
        for ((prefix, _), files) in pairs {
            let (Some(train_path), Some(test_path)) = (files.train, files.test) else {
                log::warn!("Unpaired split '{}' in {}, ignoring", prefix, dir.display());
                continue;
            };
            let train = read_table(&train_path, &self.reader)?;
            let test = read_table(&test_path, &self.reader)?;
            if name.is_none() {
                name = Some(train.relation.clone().unwrap_or_else(|| dataset_stem(&prefix).to_string()));
            }
            log::trace!("{}: train {} rows, test {} rows", prefix, train.table.nrows(), test.table.nrows());
            splits.push(DatasetSplit {
                train: train.table,
                test: test.table,
            });
        }

        Ok(name.map(|n| (n, splits)))
    }

    /// Datasets from the JSON cache at `cache_path`, or from `root` (writing
    /// the cache) when `reload` is set or no cache exists yet.
    pub fn load_or_cache<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        root: P,
        cache_path: Q,
        reload: bool,
    ) -> Result<Datasets> {
        let cache_path = cache_path.as_ref();
        if !reload && cache_path.exists() {
            log::info!("Reading cached datasets from {}", cache_path.display());
            let file = File::open(cache_path)
                .with_context(|| format!("Failed to open cache {}", cache_path.display()))?;
            return serde_json::from_reader(BufReader::new(file))
                .with_context(|| format!("Failed to parse cache {}", cache_path.display()));
        }

        let datasets = self.discover(root)?;
        if let Some(parent) = cache_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let file = File::create(cache_path)
            .with_context(|| format!("Failed to create cache {}", cache_path.display()))?;
        serde_json::to_writer(BufWriter::new(file), &datasets)
            .with_context(|| format!("Failed to write cache {}", cache_path.display()))?;
        log::info!("Cached {} datasets to {}", datasets.len(), cache_path.display());
        Ok(datasets)
    }
}

/// Sort key of a split stem such as `glass1-5-10`: the stem and its trailing
/// fold number, so fold 10 sorts after fold 2.
fn split_key(stem: &str) -> (String, Option<usize>) {
    let number = stem.rsplit('-').next().and_then(|n| n.parse().ok());
    let prefix = match number {
        Some(_) => stem.rsplit_once('-').map_or(stem, |(p, _)| p),
        None => stem,
    };
    (prefix.to_string(), number)
}

/// `glass1-5` -> `glass1`: the stem without trailing numeric segments.
fn dataset_stem(prefix: &str) -> &str {
    let mut stem = prefix;
    while let Some((head, tail)) = stem.rsplit_once('-') {
        if tail.is_empty() || !tail.chars().all(|c| c.is_ascii_digit()) {
            break;
        }
        stem = head;
    }
    stem
}
