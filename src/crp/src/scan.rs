//! Input directory enumeration
//!
//! The extractor output is flat, so only regular files directly inside the
//! input directory are considered. Listing is sorted by file name so that
//! instance numbering and first-match fallbacks are reproducible.

use crate::{Result, ENTRY_MARKER, GAME_OBJECT_SUFFIX};
use std::path::{Path, PathBuf};

/// A file whose name carries an extraction index (`entry_<N>_...`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub extraction_index: u64,
}

/// Snapshot of an input directory
#[derive(Debug, Clone)]
pub struct InputScan {
    dir: PathBuf,
    files: Vec<PathBuf>,
}

impl InputScan {
    /// List the regular files directly inside `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();

        // Surface an unreadable root instead of an empty listing
        std::fs::read_dir(&dir)?;

        let files = walkdir::WalkDir::new(&dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Skipping unreadable input entry: {}", e);
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .collect();

        Ok(Self { dir, files })
    }

    /// Build a scan from an explicit file list, keeping the given order
    pub fn from_files(dir: PathBuf, files: Vec<PathBuf>) -> Self {
        Self { dir, files }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every input file, in scan order
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Files named `entry_<N>_...`, in scan order
    pub fn entries(&self) -> impl Iterator<Item = FileEntry> + '_ {
        self.files.iter().filter_map(|path| {
            extraction_index(path).map(|extraction_index| FileEntry {
                path: path.clone(),
                extraction_index,
            })
        })
    }

    /// Scene-object record files, in scan order
    pub fn game_objects(&self) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .filter(|p| file_name(p).ends_with(GAME_OBJECT_SUFFIX))
            .map(PathBuf::as_path)
    }
}

/// Parse the integer between `entry_` and the next `_` of a file name
///
/// `"entry_12_Mesh.obj"` → `Some(12)`, `"header.json"` → `None`
pub fn extraction_index(path: &Path) -> Option<u64> {
    let name = file_name(path);
    let start = name.find(ENTRY_MARKER)? + ENTRY_MARKER.len();
    let rest = &name[start..];
    let digits = rest.split('_').next()?;
    digits.parse().ok()
}

/// File name as text, empty when the path has none
pub(crate) fn file_name(path: &Path) -> std::borrow::Cow<'_, str> {
    path.file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default()
}

/// Case-insensitive extension check, `ext` without the dot
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_extraction_index() {
        assert_eq!(extraction_index(Path::new("/in/entry_0_x.obj")), Some(0));
        assert_eq!(extraction_index(Path::new("entry_12_Mesh.obj")), Some(12));
        assert_eq!(extraction_index(Path::new("entry_7")), Some(7));
        assert_eq!(extraction_index(Path::new("header.json")), None);
        assert_eq!(extraction_index(Path::new("entry_x_y.json")), None);
    }

    #[test]
    fn test_extraction_index_uses_file_name_only() {
        assert_eq!(extraction_index(Path::new("/entry_3_dir/header.json")), None);
    }

    #[test]
    fn test_has_extension() {
        assert!(has_extension(Path::new("a.PNG"), &["png", "jpg"]));
        assert!(has_extension(Path::new("a.jpg"), &["png", "jpg"]));
        assert!(!has_extension(Path::new("a.json"), &["png", "jpg"]));
        assert!(!has_extension(Path::new("png"), &["png"]));
    }

    #[test]
    fn test_open_sorted_flat() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("entry_1_b.json"), "{}").unwrap();
        fs::write(dir.join("entry_0_a.obj"), "").unwrap();
        fs::write(dir.join("header.json"), "{}").unwrap();
        fs::write(dir.join("entry_2_GameObject.json"), "{}").unwrap();
        fs::create_dir(dir.join("organized")).unwrap();
        fs::write(dir.join("organized").join("entry_9_c.png"), "").unwrap();

        let scan = InputScan::open(dir).unwrap();
        let names: Vec<_> = scan.files().iter().map(|p| file_name(p).into_owned()).collect();
        assert_eq!(
            names,
            vec!["entry_0_a.obj", "entry_1_b.json", "entry_2_GameObject.json", "header.json"]
        );

        let entries: Vec<_> = scan.entries().map(|e| e.extraction_index).collect();
        assert_eq!(entries, vec![0, 1, 2]);

        let objects: Vec<_> = scan.game_objects().collect();
        assert_eq!(objects, vec![dir.join("entry_2_GameObject.json").as_path()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_open_follows_file_symlinks() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        fs::write(store.path().join("mesh.obj"), "v").unwrap();
        std::os::unix::fs::symlink(store.path().join("mesh.obj"), dir.join("entry_0_x.obj"))
            .unwrap();
        std::os::unix::fs::symlink(dir.join("gone"), dir.join("entry_1_broken.json")).unwrap();

        let scan = InputScan::open(dir).unwrap();
        assert_eq!(scan.files(), &[dir.join("entry_0_x.obj")]);
    }

    #[test]
    fn test_open_missing_dir() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(InputScan::open(temp_dir.path().join("nope")).is_err());
    }
}
