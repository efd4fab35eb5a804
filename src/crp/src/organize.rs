//! Per-directory pipeline
//!
//! `Init → IndexBuilt → Resolving → Materializing → Sweeping → Done`
//!
//! Only index construction and instance materialization can fail the run.
//! Unresolvable instances and failed sweep copies are reported in the
//! [`OrganizeReport`] instead.

use crate::config::OrganizeConfig;
use crate::index::{ChecksumIndex, JoinStats};
use crate::layout::{AssignmentSet, CopyStats, Layout, SweepReport};
use crate::resolve::{Resolver, SkippedInstance};
use crate::scan::InputScan;
use crate::Result;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    IndexBuilt,
    Resolving,
    Materializing,
    Sweeping,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::IndexBuilt => "index built",
            Stage::Resolving => "resolving",
            Stage::Materializing => "materializing",
            Stage::Sweeping => "sweeping",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// One materialized instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstanceSummary {
    pub instance_id: usize,
    pub dir: PathBuf,
    pub texture_count: usize,
    pub unresolved_textures: usize,
}

/// Everything a run did to one input directory
#[derive(Debug)]
pub struct OrganizeReport {
    pub input: PathBuf,
    pub output: PathBuf,
    pub join: JoinStats,
    pub instances: Vec<InstanceSummary>,
    pub skipped: Vec<SkippedInstance>,
    pub instance_copies: CopyStats,
    pub sweep: SweepReport,
}

impl OrganizeReport {
    /// Files written by this run, instances and sweep together
    pub fn copied(&self) -> usize {
        self.instance_copies.copied + self.sweep.stats.copied
    }
}

/// `<input>/organized`
pub fn default_output_dir(input: &Path) -> PathBuf {
    input.join("organized")
}

/// Organize one extracted directory into `output`
pub fn organize(input: &Path, output: &Path, config: &OrganizeConfig) -> Result<OrganizeReport> {
    organize_with_progress(input, output, config, |_, _| {})
}

/// Like [`organize`], calling `progress(done, total)` per scene-object record
pub fn organize_with_progress(
    input: &Path,
    output: &Path,
    config: &OrganizeConfig,
    progress: impl FnMut(usize, usize),
) -> Result<OrganizeReport> {
    let enter = |stage: Stage| tracing::debug!("{}: {}", input.display(), stage);

    enter(Stage::Init);
    tracing::info!(
        "Organizing CRP assets from {} to {}",
        input.display(),
        output.display()
    );
    let scan = InputScan::open(input)?;
    let index = ChecksumIndex::build(&scan, config)?;
    enter(Stage::IndexBuilt);

    enter(Stage::Resolving);
    let resolved = Resolver::new(&scan, &index, config).resolve_all(progress);

    enter(Stage::Materializing);
    let layout = Layout::new(output);
    layout.prepare()?;

    let mut assigned = AssignmentSet::default();
    let mut instance_copies = CopyStats::default();
    let mut instances = Vec::with_capacity(resolved.bundles.len());
    for bundle in &resolved.bundles {
        instance_copies.merge(layout.materialize(bundle)?);
        assigned.claim(bundle);
        instances.push(InstanceSummary {
            instance_id: bundle.instance_id,
            dir: layout.instance_dir(bundle.instance_id),
            texture_count: bundle.texture_files.len(),
            unresolved_textures: bundle.unresolved_textures.len(),
        });
    }

    enter(Stage::Sweeping);
    let sweep = layout.sweep(scan.files(), &assigned);

    enter(Stage::Done);
    tracing::info!(
        "Organization complete: {} instances, {} skipped, {} unassigned. Results saved to {}",
        instances.len(),
        resolved.skipped.len(),
        sweep.total(),
        output.display()
    );

    Ok(OrganizeReport {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        join: index.join_stats(),
        instances,
        skipped: resolved.skipped,
        instance_copies,
        sweep,
    })
}
