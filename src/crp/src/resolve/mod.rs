//! Instance resolution
//!
//! Each `*GameObject.json` record names a mesh and a material by checksum.
//! Resolution turns those into concrete files, then follows the material's
//! texture references. Failures are per instance: a record that can't be
//! resolved is skipped and reported, never fatal to the run.

pub mod strategy;

use crate::config::OrganizeConfig;
use crate::index::ChecksumIndex;
use crate::json;
use crate::scan::InputScan;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub use strategy::{
    default_strategies, ChecksumInFileName, ExtractionProximity, IndexLookup, TextureQuery,
    TextureStrategy,
};

/// Scene-object record written by the extractor
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SceneObjectRecord {
    #[serde(rename = "1_UnityEngine.MeshFilter", default)]
    pub mesh_filter: Option<String>,

    #[serde(rename = "2_UnityEngine.MeshRenderer", default)]
    pub mesh_renderer: Option<Vec<String>>,
}

impl SceneObjectRecord {
    pub fn mesh_checksum(&self) -> Option<&str> {
        self.mesh_filter.as_deref().filter(|c| !c.is_empty())
    }

    /// The first renderer reference is the material
    pub fn material_checksum(&self) -> Option<&str> {
        self.mesh_renderer
            .as_ref()?
            .first()
            .map(String::as_str)
            .filter(|c| !c.is_empty())
    }
}

/// Material document; slot order follows the file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MaterialRecord {
    #[serde(default)]
    pub textures: Map<String, Value>,
}

impl MaterialRecord {
    /// Slots that reference a texture, skipping empty and null values
    pub fn texture_slots(&self) -> impl Iterator<Item = TextureSlot> + '_ {
        self.textures.iter().filter_map(|(slot, value)| {
            value
                .as_str()
                .filter(|c| !c.is_empty())
                .map(|checksum| TextureSlot {
                    slot: slot.clone(),
                    checksum: checksum.to_string(),
                })
        })
    }
}

/// A material texture reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureSlot {
    pub slot: String,
    pub checksum: String,
}

/// Files making up one resolved scene instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceBundle {
    pub instance_id: usize,
    pub object_file: PathBuf,
    pub mesh_file: PathBuf,
    pub material_file: PathBuf,
    pub texture_files: Vec<PathBuf>,
    /// Texture slots no strategy could resolve
    pub unresolved_textures: Vec<TextureSlot>,
}

impl InstanceBundle {
    /// Every input file this instance claims
    pub fn sources(&self) -> impl Iterator<Item = &Path> {
        [&self.object_file, &self.mesh_file, &self.material_file]
            .into_iter()
            .chain(self.texture_files.iter())
            .map(PathBuf::as_path)
    }
}

/// Why a scene-object record produced no instance
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("unreadable record: {0}")]
    Unreadable(String),

    #[error("missing mesh filter reference")]
    MissingMeshFilter,

    #[error("missing mesh renderer reference")]
    MissingMeshRenderer,

    #[error("mesh checksum {0} does not resolve to a file")]
    UnresolvedMesh(String),

    #[error("material checksum {0} does not resolve to a file")]
    UnresolvedMaterial(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedInstance {
    pub instance_id: usize,
    pub object_file: PathBuf,
    pub reason: SkipReason,
}

/// Result of resolving every record in a directory
#[derive(Debug, Clone, Default)]
pub struct ResolveOutcome {
    pub bundles: Vec<InstanceBundle>,
    pub skipped: Vec<SkippedInstance>,
}

/// Resolves scene-object records against a checksum index
pub struct Resolver<'a> {
    scan: &'a InputScan,
    index: &'a ChecksumIndex,
    strategies: Vec<Box<dyn TextureStrategy>>,
}

impl<'a> Resolver<'a> {
    pub fn new(scan: &'a InputScan, index: &'a ChecksumIndex, config: &OrganizeConfig) -> Self {
        Self::with_strategies(scan, index, default_strategies(config))
    }

    pub fn with_strategies(
        scan: &'a InputScan,
        index: &'a ChecksumIndex,
        strategies: Vec<Box<dyn TextureStrategy>>,
    ) -> Self {
        Self {
            scan,
            index,
            strategies,
        }
    }

    /// Resolve every scene-object record in scan order
    ///
    /// `progress` is called with `(done, total)` after each record.
    pub fn resolve_all(&self, mut progress: impl FnMut(usize, usize)) -> ResolveOutcome {
        let objects: Vec<&Path> = self.scan.game_objects().collect();
        tracing::info!("Found {} GameObject records", objects.len());

        let mut outcome = ResolveOutcome::default();
        for (instance_id, object_file) in objects.iter().enumerate() {
            match self.resolve_instance(instance_id, object_file) {
                Ok(bundle) => outcome.bundles.push(bundle),
                Err(reason) => {
                    tracing::warn!(
                        "Skipping instance {} ({}): {}",
                        instance_id,
                        object_file.display(),
                        reason
                    );
                    outcome.skipped.push(SkippedInstance {
                        instance_id,
                        object_file: object_file.to_path_buf(),
                        reason,
                    });
                }
            }
            progress(instance_id + 1, objects.len());
        }
        outcome
    }

    /// Resolve a single scene-object record
    pub fn resolve_instance(
        &self,
        instance_id: usize,
        object_file: &Path,
    ) -> Result<InstanceBundle, SkipReason> {
        let record: SceneObjectRecord =
            json::read(object_file).map_err(|e| SkipReason::Unreadable(e.to_string()))?;

        let mesh_checksum = record.mesh_checksum().ok_or(SkipReason::MissingMeshFilter)?;
        let material_checksum = record
            .material_checksum()
            .ok_or(SkipReason::MissingMeshRenderer)?;

        let mesh_file = self
            .index
            .resolve(mesh_checksum)
            .ok_or_else(|| SkipReason::UnresolvedMesh(mesh_checksum.to_string()))?;
        tracing::debug!("Mesh {} -> {}", mesh_checksum, mesh_file.display());

        let material_file = self
            .index
            .resolve(material_checksum)
            .ok_or_else(|| SkipReason::UnresolvedMaterial(material_checksum.to_string()))?;
        tracing::debug!("Material {} -> {}", material_checksum, material_file.display());

        let material = load_material(material_file);

        let mut texture_files: Vec<PathBuf> = Vec::new();
        let mut unresolved_textures = Vec::new();
        for slot in material.texture_slots() {
            match self.find_texture(&slot, material_file) {
                Some(path) => {
                    if !texture_files.contains(&path) {
                        texture_files.push(path);
                    }
                }
                None => {
                    tracing::warn!(
                        "No texture found for slot {} ({}) of {}",
                        slot.slot,
                        slot.checksum,
                        material_file.display()
                    );
                    unresolved_textures.push(slot);
                }
            }
        }

        Ok(InstanceBundle {
            instance_id,
            object_file: object_file.to_path_buf(),
            mesh_file: mesh_file.to_path_buf(),
            material_file: material_file.to_path_buf(),
            texture_files,
            unresolved_textures,
        })
    }

    /// Try each strategy in order, first hit wins
    fn find_texture(&self, slot: &TextureSlot, material_file: &Path) -> Option<PathBuf> {
        let query = TextureQuery {
            checksum: &slot.checksum,
            material_file,
            index: self.index,
            scan: self.scan,
        };

        self.strategies.iter().enumerate().find_map(|(i, strategy)| {
            let path = strategy.find(&query)?;
            if i == 0 {
                tracing::debug!("Texture {} -> {}", slot.checksum, path.display());
            } else {
                tracing::info!(
                    "Texture {} for slot {} found by {} fallback: {}",
                    slot.checksum,
                    slot.slot,
                    strategy.name(),
                    path.display()
                );
            }
            Some(path)
        })
    }
}

/// Materials are decoration: an unreadable one just has no textures
fn load_material(path: &Path) -> MaterialRecord {
    match json::read(path) {
        Ok(material) => material,
        Err(e) => {
            tracing::warn!(
                "Could not read material {}, using empty material: {}",
                path.display(),
                e
            );
            MaterialRecord::default()
        }
    }
}
