use log::{debug, info};
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use super::{PackageManager, WingetError};

/// Executable name looked up on `PATH`.
pub const WINGET: &str = "winget";

/// Runs the `winget` executable.
#[derive(Debug, Clone)]
pub struct WingetCli {
    program: PathBuf,
}

impl WingetCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Use `explicit` when given, otherwise find `winget` on `PATH`.
    #[tracing::instrument]
    pub fn locate(explicit: Option<PathBuf>) -> Result<Self, WingetError> {
        if let Some(program) = explicit {
            return Ok(Self::new(program));
        }
        let program = which::which(WINGET).map_err(|_| WingetError::NotFound(WINGET.to_string()))?;
        debug!("Found {} at {:?}", WINGET, program);
        Ok(Self::new(program))
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    fn export_args(path: &Path) -> Vec<OsString> {
        vec![
            "export".into(),
            "-o".into(),
            path.as_os_str().to_owned(),
            "--accept-source-agreements".into(),
        ]
    }

    fn install_args(identifier: &str) -> Vec<OsString> {
        vec![
            "install".into(),
            "--id".into(),
            identifier.into(),
            "--exact".into(),
            "--accept-package-agreements".into(),
            "--accept-source-agreements".into(),
        ]
    }

    fn spawn_error(&self, err: io::Error) -> WingetError {
        let program = self.program.display().to_string();
        if err.kind() == io::ErrorKind::NotFound {
            WingetError::NotFound(program)
        } else {
            WingetError::Spawn {
                program,
                source: err,
            }
        }
    }
}

/// The most useful line of a failed command's output: stderr first, then the last stdout line.
fn failure_detail(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or_default()
        .to_string()
}

impl PackageManager for WingetCli {
    #[tracing::instrument(skip(self))]
    fn export_installed(&self, path: &Path) -> Result<String, WingetError> {
        info!("Running {:?} export to {:?}", self.program, path);
        let output = Command::new(&self.program)
            .args(Self::export_args(path))
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            return Err(WingetError::Failed {
                command: format!("{} export", WINGET),
                code: output.status.code(),
                detail: failure_detail(&output),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    #[tracing::instrument(skip(self))]
    fn install_package(&self, identifier: &str) -> Result<(), WingetError> {
        info!("Running {:?} install {}", self.program, identifier);
        // Progress goes straight to the terminal
        let status = Command::new(&self.program)
            .args(Self::install_args(identifier))
            .status()
            .map_err(|e| self.spawn_error(e))?;

        if !status.success() {
            return Err(WingetError::Failed {
                command: format!("{} install --id {}", WINGET, identifier),
                code: status.code(),
                detail: String::new(),
            });
        }
        Ok(())
    }
}
