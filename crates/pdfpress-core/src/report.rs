use crate::permissions::Permission;
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of locking a document
#[derive(Debug, Clone, Serialize)]
pub struct LockReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Whether the input file was replaced
    pub overwritten: bool,
    pub permissions_blocked: Vec<Permission>,
    pub permissions_allowed: Vec<Permission>,
    pub input_size_bytes: usize,
    pub output_size_bytes: usize,
    pub page_count: u32,
}

/// An input that was left out of a merge
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of assembling inputs into one A4 document
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeReport {
    /// Set once the document has been written
    pub output: Option<PathBuf>,
    pub page_count: u32,
    /// Inputs that contributed pages, in order
    pub sources: Vec<PathBuf>,
    pub skipped: Vec<SkippedSource>,
    /// Pages whose MediaBox could not be read and were kept as-is
    pub pages_not_normalized: u32,
    pub output_size_bytes: usize,
    pub processing_time_ms: u64,
}

impl MergeReport {
    pub fn has_skipped(&self) -> bool {
        !self.skipped.is_empty()
    }
}
