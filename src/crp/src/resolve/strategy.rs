//! Texture lookup strategies
//!
//! Materials reference textures by checksum, and those references are often
//! stale: the checksum is missing from the manifest or its entry file was
//! never written. Each strategy answers the same query independently; the
//! resolver tries them in order and keeps the first hit. Everything after
//! [`IndexLookup`] is a heuristic and can pick the wrong file.

use crate::config::OrganizeConfig;
use crate::index::ChecksumIndex;
use crate::scan::{self, file_name, has_extension, InputScan};
use std::path::{Path, PathBuf};

/// Extensions treated as decoded texture images
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg"];

/// Name fragment the extractor uses for texture assets
pub const TEXTURE_MARKER: &str = "Texture";

/// Inputs shared by every strategy
#[derive(Debug, Clone, Copy)]
pub struct TextureQuery<'a> {
    pub checksum: &'a str,
    pub material_file: &'a Path,
    pub index: &'a ChecksumIndex,
    pub scan: &'a InputScan,
}

pub trait TextureStrategy {
    /// Short name used in log output
    fn name(&self) -> &'static str;

    fn find(&self, query: &TextureQuery<'_>) -> Option<PathBuf>;
}

/// Direct manifest join
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexLookup;

impl TextureStrategy for IndexLookup {
    fn name(&self) -> &'static str {
        "index"
    }

    fn find(&self, query: &TextureQuery<'_>) -> Option<PathBuf> {
        query.index.resolve(query.checksum).map(Path::to_path_buf)
    }
}

/// First image-like file whose name contains the checksum
#[derive(Debug, Clone, Copy, Default)]
pub struct ChecksumInFileName;

impl TextureStrategy for ChecksumInFileName {
    fn name(&self) -> &'static str {
        "checksum-in-name"
    }

    fn find(&self, query: &TextureQuery<'_>) -> Option<PathBuf> {
        query
            .scan
            .files()
            .iter()
            .find(|path| file_name(path).contains(query.checksum) && looks_like_texture(path))
            .cloned()
    }
}

/// First image file extracted close to the material
///
/// Relies on the extractor writing a material's textures right next to it.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionProximity {
    pub window: u64,
}

impl TextureStrategy for ExtractionProximity {
    fn name(&self) -> &'static str {
        "proximity"
    }

    fn find(&self, query: &TextureQuery<'_>) -> Option<PathBuf> {
        let material_index = query
            .index
            .extraction_index(query.material_file)
            .or_else(|| scan::extraction_index(query.material_file))?;

        query
            .scan
            .files()
            .iter()
            .filter(|path| has_extension(path, IMAGE_EXTENSIONS))
            .find(|path| {
                scan::extraction_index(path)
                    .map(|i| i.abs_diff(material_index) < self.window)
                    .unwrap_or(false)
            })
            .cloned()
    }
}

/// Image extension, or the extractor's texture naming
pub fn looks_like_texture(path: &Path) -> bool {
    has_extension(path, IMAGE_EXTENSIONS) || file_name(path).contains(TEXTURE_MARKER)
}

/// Strategies in the order they are tried
pub fn default_strategies(config: &OrganizeConfig) -> Vec<Box<dyn TextureStrategy>> {
    let mut strategies: Vec<Box<dyn TextureStrategy>> =
        vec![Box::new(IndexLookup), Box::new(ChecksumInFileName)];
    if config.proximity_window > 0 {
        strategies.push(Box::new(ExtractionProximity {
            window: config.proximity_window,
        }));
    }
    strategies
}
