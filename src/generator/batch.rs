//! Batch mode: several generation runs described by one manifest.
//!
//! ```toml
//! dir = "internal/geo"
//!
//! [[target]]
//! type = "Point"
//! template = "tmpl/accessors.tmpl"
//! output = "point_gen.go"
//!
//! [[target]]
//! type = "Reader"
//! template = "/usr/share/templates/mock.tmpl"
//! output = "mocks/reader_mock.go"
//! extras = "strict"
//! dir = "internal/io"
//! ```
//!
//! YAML (`.yaml`, `.yml`) and JSON (`.json`) manifests use the same keys.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{error, info, warn};

use super::output::resolve_output_path;
use super::project::{GenerateOutcome, GenerateRequest, Generator};
use crate::error::GenerateError;
use crate::package::PackageLoader;

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("cannot read manifest {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML manifest {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid YAML manifest {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON manifest {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest {} has no targets", path.display())]
    NoTargets { path: PathBuf },
}

/// One `[[target]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Target {
    #[serde(rename = "type")]
    pub type_name: String,
    pub template: String,
    pub output: String,
    #[serde(default)]
    pub extras: String,
    /// Overrides the manifest's `dir`
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Package directory shared by targets without their own
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(rename = "target", alias = "targets", default)]
    pub targets: Vec<Target>,
    /// Directory relative `dir`s are resolved against
    #[serde(skip)]
    pub base: PathBuf,
}

impl Manifest {
    /// Read a manifest, picking the format from the file extension (TOML
    /// unless `.yaml`, `.yml` or `.json`).
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let text = fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        let mut manifest: Manifest = match ext.as_deref() {
            Some("yaml" | "yml") => {
                serde_yaml::from_str(&text).map_err(|source| ManifestError::Yaml {
                    path: path.to_path_buf(),
                    source,
                })?
            }
            Some("json") => serde_json::from_str(&text).map_err(|source| ManifestError::Json {
                path: path.to_path_buf(),
                source,
            })?,
            _ => toml::from_str(&text).map_err(|source| ManifestError::Toml {
                path: path.to_path_buf(),
                source,
            })?,
        };
        if manifest.targets.is_empty() {
            return Err(ManifestError::NoTargets {
                path: path.to_path_buf(),
            });
        }
        manifest.base = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(manifest)
    }

    /// Requests for every target, in manifest order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.targets
            .iter()
            .map(|target| {
                let dir = target
                    .dir
                    .as_ref()
                    .or(self.dir.as_ref())
                    .cloned()
                    .unwrap_or_else(|| PathBuf::from("."));
                let dir = if dir.is_absolute() {
                    dir
                } else {
                    self.base.join(dir)
                };
                GenerateRequest::new(dir, &target.type_name, &target.template, &target.output)
                    .with_extras(&target.extras)
            })
            .collect()
    }
}

/// Outcome of a batch: every run is attempted regardless of earlier failures.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub succeeded: Vec<GenerateOutcome>,
    pub failed: Vec<GenerateError>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }
}

/// Run every target of `manifest` in order.
pub fn run_batch<L: PackageLoader>(generator: &Generator<L>, manifest: &Manifest) -> BatchReport {
    let requests = manifest.requests();

    let mut seen: HashMap<PathBuf, usize> = HashMap::new();
    for (i, request) in requests.iter().enumerate() {
        let dest = resolve_output_path(&request.dir, &request.output);
        if let Some(first) = seen.insert(dest.clone(), i) {
            warn!(
                path = %dest.display(),
                first = first + 1,
                second = i + 1,
                "targets write the same file; the later one wins"
            );
        }
    }

    let mut report = BatchReport::default();
    for request in &requests {
        match generator.run(request) {
            Ok(outcome) => report.succeeded.push(outcome),
            Err(err) => {
                error!(output = err.output(), error = %err, "target failed");
                report.failed.push(err);
            }
        }
    }
    info!(
        total = report.total(),
        failed = report.failed.len(),
        "batch finished"
    );
    report
}
