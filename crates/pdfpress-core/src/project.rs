//! Project files: a saved list of input paths
//!
//! A project is plain UTF-8 text with one path per line. Blank lines and
//! lines starting with `#` are ignored. `~` and environment variables are
//! expanded when the project is loaded.

use crate::error::PdfPressError;
use crate::file_list::FileList;
use serde::Serialize;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tracing::warn;

pub const PROJECT_HEADER: &str = "# pdfpress project - one path per line";

/// How many missing entries a summary lists before abbreviating
const SUMMARY_LIMIT: usize = 10;

/// A project line whose path does not exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingEntry {
    /// 1-based line number
    pub line: usize,
    /// The line as written, before expansion
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoadedProject {
    /// Existing paths, expanded, in file order
    pub entries: FileList,
    pub missing: Vec<MissingEntry>,
}

impl LoadedProject {
    pub fn has_missing(&self) -> bool {
        !self.missing.is_empty()
    }

    /// Human readable list of missing entries
    pub fn missing_summary(&self) -> String {
        summarize_missing(&self.missing)
    }
}

/// Write `list` as a project file
pub fn save_project(path: &Path, list: &FileList) -> Result<(), PdfPressError> {
    if list.is_empty() {
        return Err(PdfPressError::Project(
            "The list is empty. Add files before saving a project.".into(),
        ));
    }
    std::fs::write(path, render_project(list)).map_err(|e| PdfPressError::io(path, e))
}

/// Project file text for `list`
pub fn render_project(list: &FileList) -> String {
    let mut out = String::with_capacity(64 * (list.len() + 1));
    out.push_str(PROJECT_HEADER);
    out.push('\n');
    for entry in list.iter() {
        out.push_str(&entry.to_string_lossy());
        out.push('\n');
    }
    out
}

/// Read a project, checking every entry against the filesystem
pub fn load_project(path: &Path) -> Result<LoadedProject, PdfPressError> {
    let text = std::fs::read_to_string(path).map_err(|e| PdfPressError::io(path, e))?;
    Ok(parse_project(&text, |p| p.exists()))
}

/// Parse project text; `exists` decides which expanded paths are kept
pub fn parse_project<F>(text: &str, exists: F) -> LoadedProject
where
    F: Fn(&Path) -> bool,
{
    let mut loaded = LoadedProject::default();

    for (line, entry) in project_lines(text) {
        let expanded = PathBuf::from(expand_path(entry));
        if exists(&expanded) {
            loaded.entries.add([expanded]);
        } else {
            warn!(line, entry, "project entry does not exist");
            loaded.missing.push(MissingEntry {
                line,
                text: entry.to_string(),
            });
        }
    }

    loaded
}

/// Read the entries as written, without expansion or existence checks.
/// Used when editing so `~` and variables survive a rewrite.
pub fn read_project_entries(path: &Path) -> Result<FileList, PdfPressError> {
    let text = std::fs::read_to_string(path).map_err(|e| PdfPressError::io(path, e))?;
    Ok(project_lines(&text).map(|(_, entry)| entry).collect())
}

/// Non-comment, non-blank lines with their 1-based line numbers
fn project_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines()
        .enumerate()
        .map(|(index, raw)| (index + 1, raw.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

/// Inputs to run for a loaded project.
///
/// At least one entry must exist. Missing entries are an error unless
/// `skip_missing` is set, in which case only the existing ones are used.
pub fn runnable_entries(
    loaded: LoadedProject,
    skip_missing: bool,
) -> Result<FileList, PdfPressError> {
    if loaded.entries.is_empty() {
        return Err(PdfPressError::Project(
            "No valid paths were found in the project".into(),
        ));
    }
    if loaded.has_missing() && !skip_missing {
        return Err(PdfPressError::Project(format!(
            "Some paths do not exist:\n{}",
            loaded.missing_summary()
        )));
    }
    Ok(loaded.entries)
}

/// First entries as `line N: text`, then a count of the rest
pub fn summarize_missing(missing: &[MissingEntry]) -> String {
    let mut out = String::new();
    for entry in missing.iter().take(SUMMARY_LIMIT) {
        let _ = writeln!(out, "line {}: {}", entry.line, entry.text);
    }
    if missing.len() > SUMMARY_LIMIT {
        let _ = writeln!(out, "...and {} more", missing.len() - SUMMARY_LIMIT);
    }
    out
}

/// Expand a leading `~` and `$VAR`, `${VAR}` and `%VAR%` references.
/// Unknown variables are left as written.
pub fn expand_path(input: &str) -> String {
    expand_with(input, |name| std::env::var(name).ok(), home_dir)
}

fn home_dir() -> Option<String> {
    dirs::home_dir().map(|p| p.to_string_lossy().into_owned())
}

fn expand_with<V, H>(input: &str, var: V, home: H) -> String
where
    V: Fn(&str) -> Option<String>,
    H: Fn() -> Option<String>,
{
    let vars_expanded = expand_vars(input, &var);
    expand_tilde(&vars_expanded, home)
}

fn expand_tilde<H: Fn() -> Option<String>>(input: &str, home: H) -> String {
    let rest = match input.strip_prefix('~') {
        Some(rest) => rest,
        None => return input.to_string(),
    };
    // Only "~" or "~/..." ; "~user" is left alone
    if !(rest.is_empty() || rest.starts_with('/') || rest.starts_with('\\')) {
        return input.to_string();
    }
    match home() {
        Some(home) => format!("{}{}", home, rest),
        None => input.to_string(),
    }
}

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

fn expand_vars<V: Fn(&str) -> Option<String>>(input: &str, var: &V) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(pos) = rest.find(['$', '%']) {
        out.push_str(&rest[..pos]);
        let marker = &rest[pos..];

        let (name, consumed) = if let Some(braced) = marker.strip_prefix("${") {
            match braced.find('}') {
                Some(end) => (&braced[..end], end + 3),
                None => ("", 0),
            }
        } else if let Some(body) = marker.strip_prefix('$') {
            let end = body.find(|c: char| !is_var_char(c)).unwrap_or(body.len());
            (&body[..end], end + 1)
        } else {
            let body = &marker[1..];
            match body.find('%') {
                Some(end) if body[..end].chars().all(is_var_char) => (&body[..end], end + 2),
                _ => ("", 0),
            }
        };

        let value = if consumed > 0 && !name.is_empty() && name.chars().all(is_var_char) {
            var(name)
        } else {
            None
        };

        match value {
            Some(value) => {
                out.push_str(&value);
                rest = &marker[consumed..];
            }
            None => {
                // Not a variable reference; keep the marker character
                out.push_str(&marker[..1]);
                rest = &marker[1..];
            }
        }
    }

    out.push_str(rest);
    out
}
