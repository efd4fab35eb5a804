//! Output layout
//!
//! ```text
//! <output>/instances/instance_<id>/      object, mesh, material, textures
//! <output>/unassigned/{mesh,material,texture,other}/
//! ```
//!
//! Every write is a copy that leaves an existing destination alone, so the
//! input directory is never modified and an interrupted run can simply be
//! repeated.

use crate::resolve::strategy::{IMAGE_EXTENSIONS, TEXTURE_MARKER};
use crate::resolve::InstanceBundle;
use crate::scan::{file_name, has_extension};
use crate::{Error, Result};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Typed directory for files no instance claimed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Mesh,
    Material,
    Texture,
    Other,
}

impl Bucket {
    pub const ALL: [Bucket; 4] = [Bucket::Mesh, Bucket::Material, Bucket::Texture, Bucket::Other];

    pub fn dir_name(self) -> &'static str {
        match self {
            Bucket::Mesh => "mesh",
            Bucket::Material => "material",
            Bucket::Texture => "texture",
            Bucket::Other => "other",
        }
    }

    /// Classify by file name, first match wins: mesh, material, texture, other
    pub fn classify(path: &Path) -> Bucket {
        let name = file_name(path);
        if has_extension(path, &["obj"]) || name.contains("Mesh") {
            Bucket::Mesh
        } else if has_extension(path, &["json"]) && name.contains("Material") {
            Bucket::Material
        } else if has_extension(path, IMAGE_EXTENSIONS) || name.contains(TEXTURE_MARKER) {
            Bucket::Texture
        } else {
            Bucket::Other
        }
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    AlreadyPresent,
}

/// Copy `from` to `to` unless `to` already exists
///
/// Permissions and modification time are carried over.
pub fn copy_if_absent(from: &Path, to: &Path) -> Result<CopyOutcome> {
    if to.exists() {
        return Ok(CopyOutcome::AlreadyPresent);
    }

    let copy_error = |source: std::io::Error| Error::Copy {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(from).map_err(copy_error)?;
    let modified = metadata.modified().map_err(copy_error)?;

    let mut src = fs::File::open(from).map_err(copy_error)?;
    let mut dst = match fs::File::create_new(to) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Ok(CopyOutcome::AlreadyPresent)
        }
        Err(e) => return Err(copy_error(e)),
    };

    // Permissions go on last so a read-only source still gets its mtime
    let written = io::copy(&mut src, &mut dst)
        .and_then(|_| dst.set_modified(modified))
        .and_then(|_| {
            drop(dst);
            fs::set_permissions(to, metadata.permissions())
        });
    if let Err(e) = written {
        let _ = fs::remove_file(to);
        return Err(copy_error(e));
    }

    Ok(CopyOutcome::Copied)
}

/// Copy counters for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub copied: usize,
    pub already_present: usize,
}

impl CopyStats {
    pub fn record(&mut self, outcome: CopyOutcome) {
        match outcome {
            CopyOutcome::Copied => self.copied += 1,
            CopyOutcome::AlreadyPresent => self.already_present += 1,
        }
    }

    pub fn merge(&mut self, other: CopyStats) {
        self.copied += other.copied;
        self.already_present += other.already_present;
    }
}

/// Input files claimed by at least one materialized instance
#[derive(Debug, Clone, Default)]
pub struct AssignmentSet {
    paths: HashSet<PathBuf>,
}

impl AssignmentSet {
    pub fn claim(&mut self, bundle: &InstanceBundle) {
        self.paths
            .extend(bundle.sources().map(Path::to_path_buf));
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.paths.contains(path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

/// A sweep copy that failed; the sweep carries on
#[derive(Debug)]
pub struct CopyFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// What the unassigned sweep did
#[derive(Debug, Default)]
pub struct SweepReport {
    pub counts: BTreeMap<Bucket, usize>,
    pub stats: CopyStats,
    pub failures: Vec<CopyFailure>,
}

impl SweepReport {
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

/// Paths of the organized output tree
#[derive(Debug, Clone)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn instances_dir(&self) -> PathBuf {
        self.root.join("instances")
    }

    pub fn instance_dir(&self, instance_id: usize) -> PathBuf {
        self.instances_dir().join(format!("instance_{}", instance_id))
    }

    pub fn unassigned_dir(&self) -> PathBuf {
        self.root.join("unassigned")
    }

    pub fn bucket_dir(&self, bucket: Bucket) -> PathBuf {
        self.unassigned_dir().join(bucket.dir_name())
    }

    /// Create the top-level and bucket directories
    pub fn prepare(&self) -> Result<()> {
        fs::create_dir_all(self.instances_dir())?;
        for bucket in Bucket::ALL {
            fs::create_dir_all(self.bucket_dir(bucket))?;
        }
        Ok(())
    }

    /// Copy a bundle's files into its instance directory
    pub fn materialize(&self, bundle: &InstanceBundle) -> Result<CopyStats> {
        let dir = self.instance_dir(bundle.instance_id);
        fs::create_dir_all(&dir)?;

        let mut stats = CopyStats::default();
        for source in bundle.sources() {
            let dest = dir.join(source.file_name().unwrap_or_default());
            let outcome = copy_if_absent(source, &dest)?;
            match outcome {
                CopyOutcome::Copied => {
                    tracing::debug!("Copied {} to {}", source.display(), dest.display())
                }
                CopyOutcome::AlreadyPresent => {
                    tracing::debug!("{} already exists, skipping copy", dest.display())
                }
            }
            stats.record(outcome);
        }
        Ok(stats)
    }

    /// Copy every file outside `assigned` into its bucket
    pub fn sweep(&self, files: &[PathBuf], assigned: &AssignmentSet) -> SweepReport {
        let mut report = SweepReport::default();

        for path in files.iter().filter(|p| !assigned.contains(p)) {
            let bucket = Bucket::classify(path);
            let dest = self
                .bucket_dir(bucket)
                .join(path.file_name().unwrap_or_default());

            match copy_if_absent(path, &dest) {
                Ok(outcome) => {
                    tracing::debug!("Placed unassigned {}: {}", bucket, file_name(path));
                    report.stats.record(outcome);
                    *report.counts.entry(bucket).or_default() += 1;
                }
                Err(error) => {
                    tracing::warn!("{}", error);
                    report.failures.push(CopyFailure {
                        path: path.clone(),
                        error,
                    });
                }
            }
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_priority() {
        assert_eq!(Bucket::classify(Path::new("entry_0_x.obj")), Bucket::Mesh);
        assert_eq!(Bucket::classify(Path::new("entry_0_Mesh.json")), Bucket::Mesh);
        // Mesh wins over Material
        assert_eq!(Bucket::classify(Path::new("MeshMaterial.json")), Bucket::Mesh);
        assert_eq!(Bucket::classify(Path::new("entry_1_Material.json")), Bucket::Material);
        assert_eq!(Bucket::classify(Path::new("entry_1_Material.bin")), Bucket::Other);
        assert_eq!(Bucket::classify(Path::new("entry_2_a.png")), Bucket::Texture);
        assert_eq!(Bucket::classify(Path::new("entry_2_a.JPG")), Bucket::Texture);
        assert_eq!(Bucket::classify(Path::new("entry_2_Texture2D.bin")), Bucket::Texture);
        assert_eq!(Bucket::classify(Path::new("header.json")), Bucket::Other);
        assert_eq!(Bucket::classify(Path::new("entry_3_GameObject.json")), Bucket::Other);
    }

    #[test]
    fn test_copy_if_absent_never_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let from = temp_dir.path().join("a.obj");
        let to = temp_dir.path().join("b.obj");
        fs::write(&from, "new").unwrap();

        assert_eq!(copy_if_absent(&from, &to).unwrap(), CopyOutcome::Copied);
        assert_eq!(fs::read_to_string(&to).unwrap(), "new");

        fs::write(&from, "changed").unwrap();
        assert_eq!(copy_if_absent(&from, &to).unwrap(), CopyOutcome::AlreadyPresent);
        assert_eq!(fs::read_to_string(&to).unwrap(), "new");
    }

    #[test]
    fn test_copy_preserves_mtime() {
        let temp_dir = tempfile::tempdir().unwrap();
        let from = temp_dir.path().join("a.png");
        let to = temp_dir.path().join("b.png");
        fs::write(&from, "p").unwrap();
        let past = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(1_000_000);
        fs::File::options()
            .write(true)
            .open(&from)
            .unwrap()
            .set_modified(past)
            .unwrap();

        copy_if_absent(&from, &to).unwrap();
        assert_eq!(fs::metadata(&to).unwrap().modified().unwrap(), past);
    }

    #[test]
    fn test_copy_read_only_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let from = temp_dir.path().join("a.obj");
        let to = temp_dir.path().join("b.obj");
        fs::write(&from, "v").unwrap();
        let past = std::time::SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(2_000_000);
        fs::File::options()
            .write(true)
            .open(&from)
            .unwrap()
            .set_modified(past)
            .unwrap();
        let mut perms = fs::metadata(&from).unwrap().permissions();
        perms.set_readonly(true);
        fs::set_permissions(&from, perms).unwrap();

        assert_eq!(copy_if_absent(&from, &to).unwrap(), CopyOutcome::Copied);
        let copied = fs::metadata(&to).unwrap();
        assert_eq!(fs::read_to_string(&to).unwrap(), "v");
        assert_eq!(copied.modified().unwrap(), past);
        assert!(copied.permissions().readonly());

        assert_eq!(copy_if_absent(&from, &to).unwrap(), CopyOutcome::AlreadyPresent);
    }

    #[test]
    fn test_copy_failure_leaves_no_partial_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let to = temp_dir.path().join("dest");
        // A directory opens but cannot be read as a file
        let result = copy_if_absent(temp_dir.path(), &to);
        assert!(matches!(result, Err(Error::Copy { .. })));
        assert!(!to.exists());
    }

    #[test]
    fn test_copy_missing_source_is_copy_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = copy_if_absent(
            &temp_dir.path().join("missing"),
            &temp_dir.path().join("dest"),
        )
        .unwrap_err();
        assert!(matches!(err, Error::Copy { .. }));
    }

    #[test]
    fn test_materialize_and_sweep() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let names = [
            "entry_0_x.obj",
            "entry_1_x.json",
            "entry_2_GameObject.json",
            "entry_3_t.png",
            "header.json",
        ];
        let files: Vec<PathBuf> = names.iter().map(|n| input.path().join(n)).collect();
        for file in &files {
            fs::write(file, "data").unwrap();
        }

        let bundle = InstanceBundle {
            instance_id: 4,
            object_file: files[2].clone(),
            mesh_file: files[0].clone(),
            material_file: files[1].clone(),
            texture_files: vec![],
            unresolved_textures: vec![],
        };

        let layout = Layout::new(output.path());
        layout.prepare().unwrap();
        let stats = layout.materialize(&bundle).unwrap();
        assert_eq!(stats.copied, 3);

        let instance = layout.instance_dir(4);
        assert!(instance.join("entry_0_x.obj").is_file());
        assert!(instance.join("entry_1_x.json").is_file());
        assert!(instance.join("entry_2_GameObject.json").is_file());

        let mut assigned = AssignmentSet::default();
        assigned.claim(&bundle);
        assert_eq!(assigned.len(), 3);

        let report = layout.sweep(&files, &assigned);
        assert_eq!(report.total(), 2);
        assert_eq!(report.counts.get(&Bucket::Texture), Some(&1));
        assert_eq!(report.counts.get(&Bucket::Other), Some(&1));
        assert!(layout.bucket_dir(Bucket::Texture).join("entry_3_t.png").is_file());
        assert!(layout.bucket_dir(Bucket::Other).join("header.json").is_file());
        assert!(report.failures.is_empty());

        // Second pass copies nothing
        assert_eq!(layout.materialize(&bundle).unwrap().copied, 0);
        let again = layout.sweep(&files, &assigned);
        assert_eq!(again.stats.copied, 0);
        assert_eq!(again.stats.already_present, 2);
    }

    #[test]
    fn test_sweep_continues_after_failure() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let present = input.path().join("b.png");
        fs::write(&present, "p").unwrap();
        let files = vec![input.path().join("a_missing.png"), present];

        let layout = Layout::new(output.path());
        layout.prepare().unwrap();
        let report = layout.sweep(&files, &AssignmentSet::default());
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.stats.copied, 1);
    }
}
