use super::print_json;
use crate::config::Config;
use anyhow::Context;
use clap::Args;
use pdfpress_core::{lock_file, LockOptions, LockReport, Permission, PermissionSet};
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct LockArgs {
    /// PDF to lock
    pub file: PathBuf,

    /// Write here instead of overwriting the input
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Start from everything allowed instead of everything blocked
    #[arg(long)]
    pub allow_all: bool,

    /// Permissions to leave allowed (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub allow: Vec<Permission>,

    /// Permissions to block (comma separated), applied after --allow
    #[arg(long, value_delimiter = ',')]
    pub block: Vec<Permission>,

    /// Password granting full rights (random if only --user-password is set)
    #[arg(long)]
    pub owner_password: Option<String>,

    /// Password needed to open the file (default: none)
    #[arg(long)]
    pub user_password: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl LockArgs {
    /// Config values with the flags applied on top
    fn options(&self, config: &Config) -> anyhow::Result<LockOptions> {
        let mut options = config.lock.lock_options()?;
        if self.allow_all {
            options.permissions = PermissionSet::allow_all();
        }
        for &permission in &self.allow {
            options.permissions.allow(permission);
        }
        for &permission in &self.block {
            options.permissions.block(permission);
        }
        if let Some(password) = &self.owner_password {
            options.owner_password = password.clone();
        }
        if let Some(password) = &self.user_password {
            options.user_password = password.clone();
        }
        Ok(options)
    }
}

pub fn run(args: LockArgs, config: &Config) -> anyhow::Result<()> {
    let options = args.options(config)?;
    let report = lock_file(&args.file, args.output.as_deref(), &options)
        .with_context(|| format!("Failed to lock {}", args.file.display()))?;

    if args.json {
        print_json(&report)
    } else {
        print_summary(&report);
        Ok(())
    }
}

fn print_summary(report: &LockReport) {
    let verb = if report.overwritten { "Locked" } else { "Wrote" };
    println!(
        "{} {} ({} pages, {} bytes)",
        verb,
        report.output.display(),
        report.page_count,
        report.output_size_bytes
    );
    println!("  blocked: {}", join(&report.permissions_blocked));
    println!("  allowed: {}", join(&report.permissions_allowed));
}

fn join(permissions: &[Permission]) -> String {
    if permissions.is_empty() {
        return "none".to_string();
    }
    permissions
        .iter()
        .map(|p| p.name())
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn print_permissions() {
    for permission in Permission::ALL {
        println!("{:<18} {}", permission.name(), permission.description());
    }
}
