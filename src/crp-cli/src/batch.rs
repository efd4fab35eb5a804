//! Batch list handling
//!
//! Batch commands take a text file with one path per line. Each path is one
//! unit of work; a failed unit is counted and the batch moves on.

use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Read a list file, ignoring blank lines
pub fn read_list(path: &Path) -> Result<Vec<PathBuf>> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read list file {}", path.display()))?;
    Ok(parse_list(&contents))
}

pub fn parse_list(contents: &str) -> Vec<PathBuf> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .collect()
}

/// `<dir>_organized`, next to `dir`
pub fn organized_sibling(dir: &Path) -> PathBuf {
    // Normalizes away a trailing separator
    let dir: PathBuf = dir.components().collect();
    let mut name = OsString::from(dir.as_os_str());
    name.push("_organized");
    PathBuf::from(name)
}

/// Success and failure counts for a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn record(&mut self, ok: bool) {
        if ok {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    /// Process exit code: 0 when every unit succeeded
    pub fn exit_code(&self) -> i32 {
        if self.all_succeeded() {
            0
        } else {
            1
        }
    }

    pub fn print(&self) {
        println!(
            "\nProcessing complete: {} succeeded, {} failed",
            self.succeeded, self.failed
        );
    }
}
