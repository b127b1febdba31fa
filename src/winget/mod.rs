//! Package manager collaborator.
//!
//! - `PackageManager` - what the export and import commands need from a package manager
//! - `WingetCli` - the implementation that runs the `winget` executable

mod cli;

pub use cli::{WINGET, WingetCli};

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WingetError {
    #[error("package manager executable not found: {0}")]
    NotFound(String),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` failed with exit code {}{}", .code.map_or_else(|| "unknown".to_string(), |c| c.to_string()), detail_suffix(.detail))]
    Failed {
        command: String,
        code: Option<i32>,
        detail: String,
    },

    #[error("export finished but did not create {}", .0.display())]
    MissingOutput(PathBuf),
}

fn detail_suffix(detail: &str) -> String {
    if detail.is_empty() {
        String::new()
    } else {
        format!(": {}", detail)
    }
}

#[cfg_attr(test, mockall::automock)]
pub trait PackageManager {
    /// Write the installed-package manifest to `path`.
    /// Returns the command's standard output, which lists installed applications
    /// the package manager could not match to any source.
    fn export_installed(&self, path: &Path) -> Result<String, WingetError>;

    /// Install one package by its exact identifier, accepting agreements non-interactively.
    fn install_package(&self, identifier: &str) -> Result<(), WingetError>;
}
