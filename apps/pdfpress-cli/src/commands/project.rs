use super::merge::{write_merged, OutputArgs};
use super::print_json;
use crate::config::Config;
use anyhow::{bail, Context};
use clap::{Subcommand, ValueEnum};
use pdfpress_core::assemble::is_supported;
use pdfpress_core::output::write_atomically;
use pdfpress_core::project::{
    expand_path, load_project, read_project_entries, render_project, runnable_entries,
    save_project,
};
use pdfpress_core::{parse_selection, FileList, PdfPressError};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Subcommand, Debug)]
pub enum ProjectCommand {
    /// Create a project from a list of inputs
    New {
        project: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Replace an existing project file
        #[arg(long)]
        force: bool,
    },
    /// Append inputs to a project
    Add {
        project: PathBuf,
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Remove entries by position
    Remove {
        project: PathBuf,
        /// 1-based positions, e.g. "1-3,5"
        #[arg(short, long)]
        select: String,
    },
    /// Reorder entries
    Move {
        project: PathBuf,
        /// 1-based positions, e.g. "1-3,5"
        #[arg(short, long)]
        select: String,
        #[arg(value_enum)]
        direction: Direction,
    },
    /// Remove every entry
    Clear { project: PathBuf },
    /// List entries and whether they exist
    Show {
        project: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Merge the project's entries into one A4 PDF
    Run {
        project: PathBuf,
        /// Leave out entries that no longer exist instead of failing
        #[arg(long)]
        skip_missing: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Up,
    Down,
    Top,
    Bottom,
}

#[derive(Debug, Serialize)]
struct ShownEntry {
    position: usize,
    path: PathBuf,
    exists: bool,
}

pub fn run(command: ProjectCommand, config: &Config) -> anyhow::Result<()> {
    match command {
        ProjectCommand::New {
            project,
            inputs,
            force,
        } => {
            if project.exists() && !force {
                bail!(
                    "{} already exists, use --force to replace it",
                    project.display()
                );
            }
            warn_unsupported(&inputs);
            let list: FileList = inputs.into_iter().collect();
            save_project(&project, &list)
                .with_context(|| format!("Failed to save {}", project.display()))?;
            info!(project = %project.display(), entries = list.len(), "project created");
            Ok(())
        }
        ProjectCommand::Add { project, inputs } => {
            let mut list = read(&project)?;
            warn_unsupported(&inputs);
            list.add(inputs);
            store(&project, &list)
        }
        ProjectCommand::Remove { project, select } => {
            let mut list = read(&project)?;
            let selection = parse_selection(&select, list.len())?;
            let removed = list.remove(&selection)?;
            for path in &removed {
                println!("removed {}", path.display());
            }
            store(&project, &list)
        }
        ProjectCommand::Move {
            project,
            select,
            direction,
        } => {
            let mut list = read(&project)?;
            let selection = parse_selection(&select, list.len())?;
            let moved = reorder(&mut list, &selection, direction)?;
            let positions: Vec<String> = moved.iter().map(|i| (i + 1).to_string()).collect();
            println!("selection is now {}", positions.join(","));
            store(&project, &list)
        }
        ProjectCommand::Clear { project } => {
            let mut list = read(&project)?;
            list.clear();
            store(&project, &list)
        }
        ProjectCommand::Show { project, json } => {
            let shown = show(&read(&project)?);
            if json {
                return print_json(&shown);
            }
            if shown.is_empty() {
                println!("(empty)");
            }
            for entry in &shown {
                let marker = if entry.exists { "" } else { "  (missing)" };
                println!("{:>3}. {}{}", entry.position, entry.path.display(), marker);
            }
            Ok(())
        }
        ProjectCommand::Run {
            project,
            skip_missing,
            output,
        } => {
            let loaded = load_project(&project)
                .with_context(|| format!("Failed to open {}", project.display()))?;
            let entries = runnable_entries(loaded, skip_missing)?;
            write_merged(entries.entries(), &output, config)
        }
    }
}

fn reorder(
    list: &mut FileList,
    selection: &[usize],
    direction: Direction,
) -> Result<Vec<usize>, PdfPressError> {
    match direction {
        Direction::Up => list.move_up(selection),
        Direction::Down => list.move_down(selection),
        Direction::Top => list.move_top(selection),
        Direction::Bottom => list.move_bottom(selection),
    }
}

fn show(list: &FileList) -> Vec<ShownEntry> {
    list.iter()
        .enumerate()
        .map(|(index, path)| ShownEntry {
            position: index + 1,
            path: path.to_path_buf(),
            exists: Path::new(&expand_path(&path.to_string_lossy())).exists(),
        })
        .collect()
}

fn read(project: &Path) -> anyhow::Result<FileList> {
    read_project_entries(project).with_context(|| format!("Failed to open {}", project.display()))
}

/// Rewrite an edited project; an emptied list keeps just the header
fn store(project: &Path, list: &FileList) -> anyhow::Result<()> {
    write_atomically(project, render_project(list).as_bytes())
        .with_context(|| format!("Failed to save {}", project.display()))?;
    info!(project = %project.display(), entries = list.len(), "project saved");
    Ok(())
}

fn warn_unsupported(inputs: &[PathBuf]) {
    for input in inputs.iter().filter(|p| !is_supported(p)) {
        warn!(path = %input.display(), "unrecognised extension, it will be tried as an image");
    }
}
