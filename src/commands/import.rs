use anyhow::Result;
use log::{error, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::manifest::{ExportManifest, PackageRecord, reduce};
use crate::oplog::OperationLog;
use crate::paths::{file_stem, resolve_unique_path};
use crate::runtime::Runtime;
use crate::ui;
use crate::winget::PackageManager;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("manifest file not found: {}", .0.display())]
    ManifestNotFound(PathBuf),
}

#[derive(Debug, Clone, Default)]
pub struct ImportOptions {
    /// Ask before installing anything
    pub confirm: bool,
}

/// Per-package outcome of an import
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub installed: Vec<String>,
    /// (identifier, reason)
    pub failed: Vec<(String, String)>,
}

impl ImportSummary {
    pub fn attempted(&self) -> usize {
        self.installed.len() + self.failed.len()
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Reinstall every package listed in the manifest at `manifest_path`.
///
/// A missing manifest fails before anything is logged or installed. Individual
/// install failures are recorded in the summary and do not stop the loop.
#[tracing::instrument(skip(runtime, package_manager))]
pub fn run<R: Runtime, P: PackageManager>(
    runtime: &R,
    package_manager: &P,
    manifest_path: &Path,
    options: &ImportOptions,
) -> Result<ImportSummary> {
    ensure_manifest(runtime, manifest_path)?;

    let log_path = import_log_path(runtime, manifest_path)?;
    let mut log = OperationLog::open(runtime, &log_path)?;
    log.record(format_args!("Start importing from {}", manifest_path.display()))?;

    match import_from(runtime, package_manager, manifest_path, options, &mut log) {
        Ok(summary) => {
            log.record(format_args!(
                "Import finished: {} installed, {} failed",
                summary.installed.len(),
                summary.failed.len()
            ))?;
            report_summary(&summary);
            log.record("End importing")?;
            info!("Operation log written to {:?}", log_path);
            Ok(summary)
        }
        Err(e) => {
            error!("Import failed: {:#}", e);
            log.try_record(format_args!("Import failed: {:#}", e));
            log.try_record("End importing");
            Err(e)
        }
    }
}

/// Fail with [`ImportError::ManifestNotFound`] unless `manifest_path` exists.
pub fn ensure_manifest<R: Runtime>(runtime: &R, manifest_path: &Path) -> Result<(), ImportError> {
    if runtime.exists(manifest_path) {
        return Ok(());
    }
    let err = ImportError::ManifestNotFound(manifest_path.to_path_buf());
    error!("{}", err);
    Err(err)
}

fn import_from<R: Runtime, P: PackageManager, W: Write>(
    runtime: &R,
    package_manager: &P,
    manifest_path: &Path,
    options: &ImportOptions,
    log: &mut OperationLog<W>,
) -> Result<ImportSummary> {
    let manifest = ExportManifest::load(runtime, manifest_path)?;
    let records = manifest.records()?;
    let listed = records.len();
    let packages = reduce(records);

    log.record(format_args!(
        "Found {} unique package(s), {} duplicate(s) skipped",
        packages.len(),
        listed - packages.len()
    ))?;
    ui::info(format_args!(
        "Found {} package(s) to install from {}",
        packages.len(),
        manifest_path.display()
    ));

    if packages.is_empty() {
        return Ok(ImportSummary::default());
    }

    if options.confirm
        && !runtime.confirm(&format!("Install {} package(s)?", packages.len()))?
    {
        log.record("Import cancelled")?;
        ui::warning("Import cancelled.");
        return Ok(ImportSummary::default());
    }

    install_all(package_manager, &packages, log)
}

/// Install each package in order. No retries; a failure is recorded and the next package is tried.
///
/// Every package is attempted even when the operation log stops accepting
/// writes; the first lost log entry is returned once the loop is done.
pub fn install_all<P: PackageManager, W: Write>(
    package_manager: &P,
    packages: &[PackageRecord],
    log: &mut OperationLog<W>,
) -> Result<ImportSummary> {
    let mut summary = ImportSummary::default();
    let mut log_error = None;
    let total = packages.len();

    for (index, package) in packages.iter().enumerate() {
        let id = &package.identifier;
        ui::info(format_args!("[{}/{}] Installing {}", index + 1, total, id));

        match package_manager.install_package(id) {
            Ok(()) => {
                log_error = log_error.or(log.try_record(format_args!("Installed {}", id)));
                ui::success(format_args!("Installed {}", id));
                summary.installed.push(id.clone());
            }
            Err(e) => {
                warn!("Failed to install {}: {}", id, e);
                log_error = log_error.or(log.try_record(format_args!(
                    "Failed to install {}: {}",
                    id, e
                )));
                ui::failure(format_args!("Failed to install {}: {}", id, e));
                summary.failed.push((id.clone(), e.to_string()));
            }
        }
    }

    match log_error {
        Some(e) => Err(e.context(format!(
            "Operation log is incomplete: {} installed, {} failed",
            summary.installed.len(),
            summary.failed.len()
        ))),
        None => Ok(summary),
    }
}

/// `<manifest stem>_import_log.txt` beside the manifest, or in the current directory.
fn import_log_path<R: Runtime>(runtime: &R, manifest_path: &Path) -> Result<PathBuf> {
    let dir = match manifest_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => runtime.current_dir()?,
    };
    let stem = file_stem(manifest_path).unwrap_or_else(|| "winget_backup".to_string());
    Ok(resolve_unique_path(
        runtime,
        &dir,
        &format!("{}_import_log", stem),
        ".txt",
    ))
}

fn report_summary(summary: &ImportSummary) {
    if summary.attempted() == 0 {
        return;
    }
    if summary.is_success() {
        ui::success(format_args!(
            "All {} package(s) installed.",
            summary.installed.len()
        ));
    } else {
        ui::warning(format_args!(
            "{} of {} package(s) failed to install:",
            summary.failed.len(),
            summary.attempted()
        ));
        for (id, _) in &summary.failed {
            ui::warning(format_args!("  {}", id));
        }
    }
}
