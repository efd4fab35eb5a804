//! Manifest (`header.json`) reader
//!
//! The manifest lists every extracted asset with its content checksum. The
//! position of an asset in the list is its ordinal, which is the join key
//! against the extraction index embedded in entry file names.

use crate::scan::{file_name, InputScan};
use crate::{json, Error, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// One asset declared in the manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    pub checksum: String,
    pub ordinal: usize,
}

/// Parsed manifest, assets in declaration order
#[derive(Debug, Clone)]
pub struct Manifest {
    pub path: PathBuf,
    pub assets: Vec<AssetRecord>,
}

#[derive(Deserialize)]
struct RawManifest {
    assets: Vec<RawAsset>,
}

#[derive(Deserialize)]
struct RawAsset {
    #[serde(rename = "assetChecksum")]
    asset_checksum: String,
}

impl Manifest {
    /// Find and parse the manifest among the scanned files
    ///
    /// Exactly one file may match `name`. Names are compared
    /// case-insensitively so a stray `Header.json` next to `header.json`
    /// is reported instead of silently picking one.
    pub fn locate(scan: &InputScan, name: &str) -> Result<Self> {
        let candidates: Vec<&PathBuf> = scan
            .files()
            .iter()
            .filter(|p| file_name(p).eq_ignore_ascii_case(name))
            .collect();

        match candidates.as_slice() {
            [path] => Self::load(path),
            _ => Err(Error::ManifestNotFound {
                dir: scan.dir().to_path_buf(),
                found: candidates.len(),
            }),
        }
    }

    /// Parse a manifest file
    pub fn load(path: &Path) -> Result<Self> {
        let parse_error = |reason: String| Error::ManifestParse {
            path: path.to_path_buf(),
            reason,
        };

        let raw: RawManifest = json::read(path).map_err(|e| parse_error(e.to_string()))?;

        let mut seen = HashSet::with_capacity(raw.assets.len());
        let mut assets = Vec::with_capacity(raw.assets.len());
        for (ordinal, asset) in raw.assets.into_iter().enumerate() {
            if !seen.insert(asset.asset_checksum.clone()) {
                return Err(parse_error(format!(
                    "duplicate checksum {:?} at ordinal {}",
                    asset.asset_checksum, ordinal
                )));
            }
            assets.push(AssetRecord {
                checksum: asset.asset_checksum,
                ordinal,
            });
        }

        Ok(Self {
            path: path.to_path_buf(),
            assets,
        })
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}
