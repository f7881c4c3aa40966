//! Subcommand definitions and dispatch

use crate::config::Config;
use clap::Subcommand;
use serde::Serialize;

pub mod lock;
pub mod merge;
pub mod project;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Re-save a PDF with restricted permissions (overwrites it unless --output)
    Lock(lock::LockArgs),
    /// Merge images and PDFs into one A4 PDF, in the order given
    Merge(merge::MergeArgs),
    /// Edit or run a saved list of inputs
    #[command(subcommand)]
    Project(project::ProjectCommand),
    /// List the permissions `lock` can allow or block
    Permissions,
}

pub fn dispatch(command: Command, config: &Config) -> anyhow::Result<()> {
    match command {
        Command::Lock(args) => lock::run(args, config),
        Command::Merge(args) => merge::run(args, config),
        Command::Project(command) => project::run(command, config),
        Command::Permissions => {
            lock::print_permissions();
            Ok(())
        }
    }
}

/// Pretty JSON on stdout
pub(crate) fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
