//! Error types for a generation run.
//!
//! Every fatal failure names the output file it was producing, so a batch of
//! runs can be told apart in the logs.

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::package::LoadError;

#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("[{output}] cannot process directory {}: {source}", dir.display())]
    Load {
        output: String,
        dir: PathBuf,
        #[source]
        source: LoadError,
    },

    #[error("[{output}] cannot read template {}: {source}", path.display())]
    TemplateRead {
        output: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[{output}] rendering template {template}: {source}")]
    Render {
        output: String,
        template: String,
        #[source]
        source: minijinja::Error,
    },

    #[error("[{output}] rendering generated header: {source}")]
    Header {
        output: String,
        #[source]
        source: askama::Error,
    },

    #[error("[{output}] error creating destination directory {}: {source}", path.display())]
    CreateDir {
        output: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("[{output}] error writing output {}: {source}", path.display())]
    Write {
        output: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl GenerateError {
    /// The output path of the run that failed.
    pub fn output(&self) -> &str {
        match self {
            GenerateError::Load { output, .. }
            | GenerateError::TemplateRead { output, .. }
            | GenerateError::Render { output, .. }
            | GenerateError::Header { output, .. }
            | GenerateError::CreateDir { output, .. }
            | GenerateError::Write { output, .. } => output,
        }
    }
}

/// A formatter could not produce formatted text. Never fatal for a run.
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("cannot run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("{program} produced invalid UTF-8")]
    InvalidOutput { program: String },
}
