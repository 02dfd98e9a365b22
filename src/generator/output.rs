use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::{FormatError, GenerateError};

/// What kind of file a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// Go source: gets the generated header and is formatted.
    Go,
    /// Anything else: written as rendered.
    Other,
}

impl OutputKind {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("go") => OutputKind::Go,
            _ => OutputKind::Other,
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputKind::Go => "go",
            OutputKind::Other => "other",
        })
    }
}

/// Post-processing step for rendered text of one [`OutputKind`].
pub trait Formatter: Send + Sync {
    fn name(&self) -> &str;

    fn format(&self, source: &str) -> Result<String, FormatError>;
}

/// Formatters keyed by output kind. Kinds without one are written unchanged.
#[derive(Default)]
pub struct Formatters {
    by_kind: HashMap<OutputKind, Box<dyn Formatter>>,
}

impl Formatters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, kind: OutputKind, formatter: impl Formatter + 'static) -> Self {
        self.register(kind, formatter);
        self
    }

    pub fn register(&mut self, kind: OutputKind, formatter: impl Formatter + 'static) {
        self.by_kind.insert(kind, Box::new(formatter));
    }

    pub fn get(&self, kind: OutputKind) -> Option<&dyn Formatter> {
        self.by_kind.get(&kind).map(|f| f.as_ref())
    }
}

impl fmt::Debug for Formatters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.by_kind.iter().map(|(k, v)| (k, v.name())))
            .finish()
    }
}

/// Destination of `output` inside `dir`. Only the file name is lowercased;
/// parent components keep their case.
pub fn resolve_output_path(dir: &Path, output: &str) -> PathBuf {
    let output = Path::new(output);
    let Some(name) = output.file_name() else {
        return dir.join(output);
    };
    let lowered = name.to_string_lossy().to_lowercase();
    match output.parent() {
        Some(parent) => dir.join(parent).join(lowered),
        None => dir.join(lowered),
    }
}

/// Write `contents` to the resolved destination of `output`, creating missing
/// directories.
///
/// The text goes to a temporary file next to the destination which is then
/// renamed over it, so readers see either the old file or the complete new
/// one.
///
/// # Errors
///
/// Returns [`GenerateError::CreateDir`] or [`GenerateError::Write`] on
/// file-system failures.
pub fn write_output(dir: &Path, output: &str, contents: &str) -> Result<PathBuf, GenerateError> {
    let path = resolve_output_path(dir, output);
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent).map_err(|source| GenerateError::CreateDir {
        output: output.to_string(),
        path: parent.clone(),
        source,
    })?;

    let write_err = |source| GenerateError::Write {
        output: output.to_string(),
        path: path.clone(),
        source,
    };
    let mut tmp = NamedTempFile::new_in(&parent).map_err(write_err)?;
    tmp.write_all(contents.as_bytes()).map_err(write_err)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        tmp.as_file()
            .set_permissions(fs::Permissions::from_mode(0o644))
            .map_err(write_err)?;
    }
    debug!(tmp = %tmp.path().display(), "persisting output");
    tmp.persist(&path).map_err(|e| write_err(e.error))?;

    info!(path = %path.display(), bytes = contents.len(), "wrote output");
    Ok(path)
}
