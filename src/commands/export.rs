use anyhow::{Context, Result};
use chrono::Local;
use log::{error, info};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::oplog::OperationLog;
use crate::paths::{default_backup_dir, default_base_name, file_stem, resolve_unique_path};
use crate::runtime::Runtime;
use crate::ui;
use crate::winget::{PackageManager, WingetError};

pub const MANIFEST_EXTENSION: &str = ".json";
pub const UNMANAGED_APPS_SUFFIX: &str = "_non_winget_apps.txt";
pub const LOG_SUFFIX: &str = "_log.txt";

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Directory for the backup files (default: `Documents/WingetBackups`)
    pub dir: Option<PathBuf>,
    /// File stem for the backup files (default: `winget_backup_<date>`)
    pub name: Option<String>,
}

/// Files written by a successful export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOutcome {
    pub manifest: PathBuf,
    pub unmanaged_apps: PathBuf,
    pub operation_log: PathBuf,
}

/// Export the installed packages into a new manifest, never overwriting earlier backups.
#[tracing::instrument(skip(runtime, package_manager))]
pub fn run<R: Runtime, P: PackageManager>(
    runtime: &R,
    package_manager: &P,
    options: &ExportOptions,
) -> Result<ExportOutcome> {
    let dir = match &options.dir {
        Some(dir) => dir.clone(),
        None => default_backup_dir(runtime)?,
    };
    runtime
        .create_dir_all(&dir)
        .with_context(|| format!("Failed to create backup directory {}", dir.display()))?;

    let base_name = options
        .name
        .clone()
        .unwrap_or_else(|| default_base_name(Local::now().date_naive()));

    let manifest = resolve_unique_path(runtime, &dir, &base_name, MANIFEST_EXTENSION);
    // Companion files share the manifest's stem, including any collision counter
    let stem = file_stem(&manifest).unwrap_or(base_name);
    let outcome = ExportOutcome {
        unmanaged_apps: resolve_unique_path(runtime, &dir, &stem, UNMANAGED_APPS_SUFFIX),
        operation_log: resolve_unique_path(runtime, &dir, &stem, LOG_SUFFIX),
        manifest,
    };

    let mut log = OperationLog::open(runtime, &outcome.operation_log)?;
    log.record(format_args!("Start exporting to {}", outcome.manifest.display()))?;
    ui::info(format_args!(
        "Exporting installed packages to {}",
        outcome.manifest.display()
    ));

    match export_to(runtime, package_manager, &outcome, &mut log) {
        Ok(()) => {
            log.record("End exporting")?;
            Ok(outcome)
        }
        Err(e) => {
            error!("Export failed: {:#}", e);
            log.try_record(format_args!("Export failed: {:#}", e));
            log.try_record("End exporting");
            Err(e)
        }
    }
}

fn export_to<R: Runtime, P: PackageManager, W: Write>(
    runtime: &R,
    package_manager: &P,
    outcome: &ExportOutcome,
    log: &mut OperationLog<W>,
) -> Result<()> {
    let stdout = package_manager.export_installed(&outcome.manifest)?;
    if !runtime.exists(&outcome.manifest) {
        return Err(WingetError::MissingOutput(outcome.manifest.clone()).into());
    }
    info!("Manifest written to {:?}", outcome.manifest);
    log.record(format_args!("Export succeeded: {}", outcome.manifest.display()))?;

    save_unmanaged_apps(runtime, &outcome.unmanaged_apps, &stdout)?;
    log.record(format_args!(
        "Applications not managed by winget saved to {}",
        outcome.unmanaged_apps.display()
    ))?;

    ui::success(format_args!("Backup saved to {}", outcome.manifest.display()));
    ui::info(format_args!(
        "Applications winget could not export are listed in {}",
        outcome.unmanaged_apps.display()
    ));
    Ok(())
}

fn save_unmanaged_apps<R: Runtime>(runtime: &R, path: &Path, stdout: &str) -> Result<()> {
    runtime
        .write(path, stdout.as_bytes())
        .with_context(|| format!("Failed to save export output to {}", path.display()))
}
