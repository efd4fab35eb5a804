//! Checksum index
//!
//! Joins the manifest (ordinal ↔ checksum) with the entry files
//! (extraction index ↔ path). The join is positional: the asset at manifest
//! ordinal `N` is the file named `entry_<N>_...`. Both halves are kept so
//! either side can be looked up, and the join is checked when the index is
//! built.

use crate::config::OrganizeConfig;
use crate::manifest::Manifest;
use crate::scan::InputScan;
use crate::{Error, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

/// How well the manifest and the entry files line up
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoinStats {
    /// Manifest ordinals backed by an entry file
    pub joined: usize,
    /// Manifest ordinals without an entry file
    pub missing_files: usize,
    /// Entry files whose index is beyond the manifest
    pub extra_files: usize,
    /// Entry files dropped because an earlier file had the same index
    pub duplicate_indexes: usize,
}

impl JoinStats {
    pub fn is_aligned(&self) -> bool {
        self.missing_files == 0 && self.extra_files == 0 && self.duplicate_indexes == 0
    }
}

/// Immutable lookup tables built once per input directory
#[derive(Debug, Clone, Default)]
pub struct ChecksumIndex {
    ordinal_to_checksum: Vec<String>,
    checksum_to_ordinal: HashMap<String, usize>,
    index_to_path: BTreeMap<u64, PathBuf>,
    path_to_index: HashMap<PathBuf, u64>,
    stats: JoinStats,
}

impl ChecksumIndex {
    /// Locate the manifest in `scan` and join it against the entry files
    pub fn build(scan: &InputScan, config: &OrganizeConfig) -> Result<Self> {
        let manifest = Manifest::locate(scan, &config.manifest_name)?;
        tracing::info!(
            "Found {} assets in {}",
            manifest.len(),
            manifest.path.display()
        );
        Self::from_parts(&manifest, scan, config.strict_join)
    }

    /// Join an already parsed manifest against the entry files in `scan`
    pub fn from_parts(manifest: &Manifest, scan: &InputScan, strict: bool) -> Result<Self> {
        let mut index = Self::default();

        for asset in &manifest.assets {
            index.ordinal_to_checksum.push(asset.checksum.clone());
            index
                .checksum_to_ordinal
                .insert(asset.checksum.clone(), asset.ordinal);
        }

        for entry in scan.entries() {
            if let Some(existing) = index.index_to_path.get(&entry.extraction_index) {
                tracing::warn!(
                    "Extraction index {} claimed by both {} and {}, keeping the first",
                    entry.extraction_index,
                    existing.display(),
                    entry.path.display()
                );
                index.stats.duplicate_indexes += 1;
                continue;
            }
            index
                .path_to_index
                .insert(entry.path.clone(), entry.extraction_index);
            index.index_to_path.insert(entry.extraction_index, entry.path);
        }

        let asset_count = index.ordinal_to_checksum.len() as u64;
        index.stats.joined = (0..asset_count)
            .filter(|i| index.index_to_path.contains_key(i))
            .count();
        index.stats.missing_files = index.ordinal_to_checksum.len() - index.stats.joined;
        index.stats.extra_files = index.index_to_path.range(asset_count..).count();

        if !index.stats.is_aligned() {
            if strict {
                return Err(Error::IndexMisaligned {
                    assets: index.ordinal_to_checksum.len(),
                    entries: index.index_to_path.len() + index.stats.duplicate_indexes,
                });
            }
            tracing::warn!(
                "Manifest and entry files are not aligned: {} joined, {} assets without a file, {} files beyond the manifest, {} duplicate indexes",
                index.stats.joined,
                index.stats.missing_files,
                index.stats.extra_files,
                index.stats.duplicate_indexes
            );
        }

        Ok(index)
    }

    /// File holding the asset with this checksum
    pub fn resolve(&self, checksum: &str) -> Option<&Path> {
        let ordinal = self.ordinal(checksum)?;
        self.path(ordinal as u64)
    }

    pub fn checksum(&self, ordinal: usize) -> Option<&str> {
        self.ordinal_to_checksum.get(ordinal).map(String::as_str)
    }

    pub fn ordinal(&self, checksum: &str) -> Option<usize> {
        self.checksum_to_ordinal.get(checksum).copied()
    }

    /// Entry file with this extraction index
    pub fn path(&self, extraction_index: u64) -> Option<&Path> {
        self.index_to_path.get(&extraction_index).map(PathBuf::as_path)
    }

    pub fn extraction_index(&self, path: &Path) -> Option<u64> {
        self.path_to_index.get(path).copied()
    }

    /// Number of assets declared in the manifest
    pub fn asset_count(&self) -> usize {
        self.ordinal_to_checksum.len()
    }

    /// Number of distinct entry files
    pub fn entry_count(&self) -> usize {
        self.index_to_path.len()
    }

    pub fn join_stats(&self) -> JoinStats {
        self.stats
    }
}
