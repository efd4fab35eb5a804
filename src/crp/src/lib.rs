//! Organizer for extracted CRP asset packages
//!
//! The external extractor writes one file per sub-object into a flat
//! directory. This crate rebuilds the scene graph from that output: which
//! mesh, material and textures belong to which scene instance.
//!
//! # Input Layout
//!
//! - `header.json`: the manifest, `{"assets": [{"assetChecksum": "..."}, ...]}`
//! - `entry_<N>_<name>.<ext>`: one file per extracted asset
//! - `*GameObject.json`: scene-object records referencing mesh and material
//!   checksums
//! - material JSON files with a `textures` map of slot name to checksum
//!
//! # Output Layout
//!
//! - `instances/instance_<id>/`: object, mesh, material and texture copies
//! - `unassigned/{mesh,material,texture,other}/`: everything left over

pub mod config;
pub mod index;
mod json;
pub mod layout;
pub mod manifest;
pub mod organize;
pub mod resolve;
pub mod scan;

use std::path::PathBuf;

pub use config::OrganizeConfig;
pub use index::{ChecksumIndex, JoinStats};
pub use layout::{Bucket, CopyFailure, CopyOutcome, Layout};
pub use manifest::{AssetRecord, Manifest};
pub use organize::{default_output_dir, organize, organize_with_progress, OrganizeReport, Stage};
pub use resolve::{
    InstanceBundle, MaterialRecord, ResolveOutcome, SceneObjectRecord, SkipReason, SkippedInstance,
    TextureSlot,
};
pub use scan::{FileEntry, InputScan};

/// Default manifest file name written by the extractor
pub const MANIFEST_FILE_NAME: &str = "header.json";

/// Suffix identifying scene-object records
pub const GAME_OBJECT_SUFFIX: &str = "GameObject.json";

/// Marker preceding the extraction index in entry file names
pub const ENTRY_MARKER: &str = "entry_";

/// Errors that stop the organization of a directory
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Manifest not found in {dir:?}: expected exactly one candidate, found {found}")]
    ManifestNotFound { dir: PathBuf, found: usize },

    #[error("Failed to parse manifest {path:?}: {reason}")]
    ManifestParse { path: PathBuf, reason: String },

    #[error("Manifest declares {assets} assets but {entries} entry files were found")]
    IndexMisaligned { assets: usize, entries: usize },

    #[error("Failed to copy {from:?} to {to:?}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
