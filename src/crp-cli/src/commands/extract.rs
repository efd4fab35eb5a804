//! External extractor runner
//!
//! Runs `dotnet CrpParser.dll -f <file> -s -v` for each CRP file in a list.
//! The extractor's output for each file is captured in a `.log` next to it.

use anyhow::{bail, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::batch::{self, BatchSummary};
use crate::config::ExtractConfig;

/// Assembly name of the extractor inside the parser directory
pub const PARSER_DLL: &str = "CrpParser.dll";

/// Validated extractor location
#[derive(Debug, Clone)]
pub struct Extractor {
    pub dotnet: PathBuf,
    pub parser_dir: PathBuf,
}

impl Extractor {
    /// Resolve the extractor from CLI values, falling back to config
    ///
    /// Anything missing is a configuration error and nothing is run.
    pub fn locate(
        dotnet: Option<PathBuf>,
        parser_dir: Option<PathBuf>,
        config: &ExtractConfig,
    ) -> Result<Self> {
        let dotnet = dotnet
            .or_else(|| config.dotnet.clone())
            .context("Path to the dotnet executable is required (--dotnet or [extract] dotnet)")?;
        let parser_dir = parser_dir.or_else(|| config.parser_dir.clone()).context(
            "Path to the CRP parser directory is required (--parser-dir or [extract] parser_dir)",
        )?;

        if !dotnet.exists() {
            bail!("Dotnet path '{}' does not exist", dotnet.display());
        }
        if !parser_dir.exists() {
            bail!(
                "CRP parser directory '{}' does not exist",
                parser_dir.display()
            );
        }
        if !parser_dir.join(PARSER_DLL).exists() {
            bail!("{} not found in '{}'", PARSER_DLL, parser_dir.display());
        }

        Ok(Self { dotnet, parser_dir })
    }

    /// Command line for one CRP file
    pub fn command(&self, crp_file: &Path) -> Command {
        let mut cmd = Command::new(&self.dotnet);
        cmd.arg(self.parser_dir.join(PARSER_DLL))
            .arg("-f")
            .arg(crp_file)
            // Silent, verbose
            .args(["-s", "-v"])
            .current_dir(&self.parser_dir);
        cmd
    }

    /// Run the extractor on one file, output captured in `log_file`
    pub fn run(&self, crp_file: &Path, log_file: &Path) -> Result<bool> {
        let log = File::create(log_file)
            .with_context(|| format!("Failed to create log file {}", log_file.display()))?;
        let log_err = log.try_clone().context("Failed to duplicate log handle")?;

        let status = self
            .command(crp_file)
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err))
            .status()
            .with_context(|| format!("Failed to run extractor on {}", crp_file.display()))?;

        Ok(status.success())
    }
}

/// `<file>.crp` → `<file>.log`
pub fn log_path(crp_file: &Path) -> PathBuf {
    let is_crp = crp_file
        .extension()
        .map(|e| e.eq_ignore_ascii_case("crp"))
        .unwrap_or(false);

    if is_crp {
        crp_file.with_extension("log")
    } else {
        let mut name = crp_file.as_os_str().to_owned();
        name.push(".log");
        PathBuf::from(name)
    }
}

/// Handle the extract command
pub fn handle(
    list: &Path,
    dotnet: Option<PathBuf>,
    parser_dir: Option<PathBuf>,
    config: &ExtractConfig,
) -> Result<BatchSummary> {
    if !list.exists() {
        bail!("Input file '{}' does not exist", list.display());
    }
    let extractor = Extractor::locate(dotnet, parser_dir, config)?;

    let crp_files = batch::read_list(list)?;
    if crp_files.is_empty() {
        bail!("No CRP files found in {}", list.display());
    }

    let pb = ProgressBar::new(crp_files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let mut summary = BatchSummary::default();
    for (i, crp_file) in crp_files.iter().enumerate() {
        pb.set_message(crp_file.display().to_string());
        let ok = extract_unit(&extractor, crp_file, i, crp_files.len(), &pb);
        summary.record(ok);
        pb.inc(1);
    }
    pb.finish_with_message("Done");

    summary.print();
    Ok(summary)
}

fn extract_unit(
    extractor: &Extractor,
    crp_file: &Path,
    i: usize,
    total: usize,
    pb: &ProgressBar,
) -> bool {
    if !crp_file.exists() {
        pb.println(format!(
            "Warning: CRP file '{}' does not exist. Skipping.",
            crp_file.display()
        ));
        return false;
    }

    // The extractor runs inside the parser directory
    let crp_file = fs::canonicalize(crp_file).unwrap_or_else(|_| crp_file.to_path_buf());
    let log_file = log_path(&crp_file);
    pb.println(format!(
        "Processing [{}/{}]: {}",
        i + 1,
        total,
        crp_file.display()
    ));

    match extractor.run(&crp_file, &log_file) {
        Ok(true) => {
            pb.println(format!("  Success: Output saved to {}", log_file.display()));
            true
        }
        Ok(false) => {
            pb.println(format!("  Failed: See {} for details", log_file.display()));
            tracing::warn!("Extractor failed on {}", crp_file.display());
            false
        }
        Err(e) => {
            pb.println(format!("  Error processing {}: {:#}", crp_file.display(), e));
            tracing::error!("{:?}", e);
            false
        }
    }
}
