//! Package manifests produced by `winget export`.
//!
//! The on-disk document groups packages by source. [`ExportManifest::records`]
//! flattens it into [`PackageRecord`]s in document order, and [`reduce`] turns
//! those into the ordered install list.

mod reduce;

pub use reduce::reduce;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::runtime::Runtime;

/// One installed package as listed in a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRecord {
    pub identifier: String,
    pub source_name: String,
    pub version: Option<String>,
}

impl PackageRecord {
    pub fn new(identifier: impl Into<String>, source_name: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            source_name: source_name.into(),
            version: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to parse manifest {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("package #{position} of source '{source_name}' has no identifier")]
    MissingIdentifier { source_name: String, position: usize },
}

/// Export document written by the package manager
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ExportManifest {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(rename = "CreationDate", default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
    #[serde(rename = "Sources", default)]
    pub sources: Vec<SourceEntry>,
    #[serde(rename = "WinGetVersion", default, skip_serializing_if = "Option::is_none")]
    pub winget_version: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SourceEntry {
    #[serde(default)]
    pub packages: Vec<PackageEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_details: Option<SourceDetails>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SourceDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<String>,
    #[serde(rename = "Type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PackageEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl SourceEntry {
    pub fn name(&self) -> &str {
        self.source_details
            .as_ref()
            .and_then(|details| details.name.as_deref())
            .unwrap_or_default()
    }
}

impl ExportManifest {
    pub fn parse(path: &Path, contents: &str) -> Result<Self, ManifestError> {
        serde_json::from_str(contents).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    #[tracing::instrument(skip(runtime))]
    pub fn load<R: Runtime>(runtime: &R, path: &Path) -> Result<Self> {
        let contents = runtime
            .read_to_string(path)
            .with_context(|| format!("Failed to read manifest {}", path.display()))?;
        Ok(Self::parse(path, &contents)?)
    }

    /// All packages in document order: sources in order, packages in order within each source.
    pub fn records(&self) -> Result<Vec<PackageRecord>, ManifestError> {
        let mut records = Vec::new();
        for source in &self.sources {
            for (index, package) in source.packages.iter().enumerate() {
                let identifier = package
                    .package_identifier
                    .as_deref()
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .ok_or_else(|| ManifestError::MissingIdentifier {
                        source_name: source.name().to_string(),
                        position: index + 1,
                    })?;

                records.push(PackageRecord {
                    identifier: identifier.to_string(),
                    source_name: source.name().to_string(),
                    version: package.version.clone(),
                });
            }
        }
        Ok(records)
    }
}
