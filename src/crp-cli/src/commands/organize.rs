//! Organize command handlers
//!
//! Single-directory mode reports a progress bar over scene objects. List
//! mode organizes each directory into `<dir>_organized` and keeps going
//! after failures.

use anyhow::{Context, Result};
use crp::{OrganizeConfig, OrganizeReport};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;

use crate::batch::{self, BatchSummary};

fn progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Organize one directory
pub fn handle_directory(
    input: &Path,
    output: Option<&Path>,
    config: &OrganizeConfig,
    verbose: bool,
) -> Result<()> {
    let output = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| crp::default_output_dir(input));

    let pb = ProgressBar::new(0);
    pb.set_style(progress_style());
    pb.set_message("instances");

    let result = crp::organize_with_progress(input, &output, config, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    });
    pb.finish_and_clear();

    let report = result.with_context(|| format!("Failed to organize {}", input.display()))?;
    print_report(&report, verbose);
    Ok(())
}

/// Organize every directory named in a list file
pub fn handle_list(list: &Path, config: &OrganizeConfig, verbose: bool) -> Result<BatchSummary> {
    println!("Reading CRP folder list from {}", list.display());
    let folders = batch::read_list(list)?;
    println!("Found {} CRP folders to process", folders.len());

    let pb = ProgressBar::new(folders.len() as u64);
    pb.set_style(progress_style());

    let mut summary = BatchSummary::default();
    for folder in &folders {
        pb.set_message(folder.display().to_string());
        let ok = organize_unit(folder, config, verbose, &pb);
        summary.record(ok);
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    summary.print();
    Ok(summary)
}

/// One unit of a batch; errors are reported here and become a failure
fn organize_unit(folder: &Path, config: &OrganizeConfig, verbose: bool, pb: &ProgressBar) -> bool {
    pb.println(format!("\nProcessing folder: {}", folder.display()));

    if !folder.is_dir() {
        pb.println(format!("  Error: {} is not a directory", folder.display()));
        tracing::error!("{} is not a directory", folder.display());
        return false;
    }

    let folder = folder.canonicalize().unwrap_or_else(|_| folder.to_path_buf());
    let output = batch::organized_sibling(&folder);

    match crp::organize(&folder, &output, config) {
        Ok(report) => {
            if verbose {
                pb.suspend(|| print_report(&report, verbose));
            }
            pb.println(format!("  Success: Output saved to {}", output.display()));
            true
        }
        Err(e) => {
            pb.println(format!("  Error processing {}: {}", folder.display(), e));
            tracing::error!("Failed to organize {}: {:?}", folder.display(), e);
            false
        }
    }
}

fn print_report(report: &OrganizeReport, verbose: bool) {
    println!(
        "Organized {} instances from {} ({} skipped)",
        report.instances.len(),
        report.input.display(),
        report.skipped.len()
    );

    if verbose {
        for instance in &report.instances {
            println!(
                "  instance_{}: {} textures{}",
                instance.instance_id,
                instance.texture_count,
                if instance.unresolved_textures > 0 {
                    format!(", {} unresolved", instance.unresolved_textures)
                } else {
                    String::new()
                }
            );
        }
        for skipped in &report.skipped {
            println!(
                "  skipped {} ({}): {}",
                skipped.instance_id,
                skipped.object_file.display(),
                skipped.reason
            );
        }
    }

    let buckets: Vec<String> = report
        .sweep
        .counts
        .iter()
        .map(|(bucket, count)| format!("{} {}", count, bucket))
        .collect();
    if !buckets.is_empty() {
        println!("Unassigned: {}", buckets.join(", "));
    }
    for failure in &report.sweep.failures {
        eprintln!("  Warning: {}", failure.error);
    }

    println!(
        "Copied {} files ({} already present). Results saved to {}",
        report.copied(),
        report.instance_copies.already_present + report.sweep.stats.already_present,
        report.output.display()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_extracted(dir: &Path) {
        fs::create_dir_all(dir).unwrap();
        fs::write(
            dir.join("header.json"),
            r#"{"assets": [{"assetChecksum": "A1"}, {"assetChecksum": "B2"}]}"#,
        )
        .unwrap();
        fs::write(dir.join("entry_0_x.obj"), "v").unwrap();
        fs::write(dir.join("entry_1_x.json"), r#"{"textures": {}}"#).unwrap();
        fs::write(
            dir.join("entry_2_GameObject.json"),
            r#"{"1_UnityEngine.MeshFilter": "A1", "2_UnityEngine.MeshRenderer": ["B2"]}"#,
        )
        .unwrap();
    }

    #[test]
    fn test_list_continues_after_failures() {
        let temp_dir = tempfile::tempdir().unwrap();
        let good = temp_dir.path().join("good");
        let no_manifest = temp_dir.path().join("no_manifest");
        write_extracted(&good);
        fs::create_dir_all(&no_manifest).unwrap();

        let list = temp_dir.path().join("list.txt");
        fs::write(
            &list,
            format!(
                "{}\n\n{}\n{}\n",
                good.display(),
                temp_dir.path().join("missing").display(),
                no_manifest.display()
            ),
        )
        .unwrap();

        let summary = handle_list(&list, &OrganizeConfig::default(), false).unwrap();
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.exit_code(), 1);
        assert!(temp_dir
            .path()
            .join("good_organized/instances/instance_0/entry_0_x.obj")
            .is_file());
    }

    #[test]
    fn test_directory_default_output() {
        let temp_dir = tempfile::tempdir().unwrap();
        let input = temp_dir.path().join("level");
        write_extracted(&input);

        handle_directory(&input, None, &OrganizeConfig::default(), false).unwrap();
        assert!(input
            .join("organized/unassigned/other/header.json")
            .is_file());
    }

    #[test]
    fn test_directory_failure_is_error() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = handle_directory(
            temp_dir.path(),
            Some(temp_dir.path().join("out").as_path()),
            &OrganizeConfig::default(),
            false,
        );
        assert!(result.is_err());
    }
}
