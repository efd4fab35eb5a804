//! Tunables for a single organization run

use serde::{Deserialize, Serialize};

use crate::MANIFEST_FILE_NAME;

/// Default distance (in extraction indexes) for the proximity texture fallback
pub const DEFAULT_PROXIMITY_WINDOW: u64 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizeConfig {
    /// Textures whose extraction index is closer than this to the material's
    /// are accepted by the proximity fallback. Heuristic: assumes the
    /// extractor writes related assets contiguously. Zero disables it.
    pub proximity_window: u64,

    /// Fail when manifest ordinals and entry files don't line up one to one
    pub strict_join: bool,

    /// File name of the manifest inside the input directory
    pub manifest_name: String,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            proximity_window: DEFAULT_PROXIMITY_WINDOW,
            strict_join: false,
            manifest_name: MANIFEST_FILE_NAME.to_string(),
        }
    }
}
