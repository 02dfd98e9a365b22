use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::syntax::{parse_file, SourceFile, SyntaxError, Visitor};

/// One parsed file of a package.
#[derive(Debug, Clone)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub ast: SourceFile,
}

/// Parsed files of one package, in file name order.
///
/// Built once by a [`PackageLoader`](super::PackageLoader) and only read
/// afterwards.
#[derive(Debug, Clone, Default)]
pub struct SyntaxForest {
    files: Vec<ParsedFile>,
}

impl SyntaxForest {
    pub fn new(files: Vec<ParsedFile>) -> Self {
        Self { files }
    }

    /// Parse in-memory sources given as `(file name, contents)` pairs.
    pub fn from_sources<'a, I>(sources: I) -> Result<Self, SyntaxError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let files = sources
            .into_iter()
            .map(|(name, src)| {
                Ok(ParsedFile {
                    path: PathBuf::from(name),
                    ast: parse_file(name, src)?,
                })
            })
            .collect::<Result<Vec<_>, SyntaxError>>()?;
        Ok(Self { files })
    }

    pub fn files(&self) -> &[ParsedFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Package name declared by the first file.
    pub fn package_name(&self) -> Option<&str> {
        self.files.first().map(|f| f.ast.package.as_str())
    }

    /// Visit every file in order.
    pub fn walk<'ast, V: Visitor<'ast> + ?Sized>(&'ast self, visitor: &mut V) {
        for file in &self.files {
            visitor.visit_source_file(&file.ast);
        }
    }
}

/// A loaded Go package.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub dir: PathBuf,
    /// Source files that belong to the build, in the order they were parsed.
    pub files: Vec<PathBuf>,
    pub forest: SyntaxForest,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read directory {}: {source}", dir.display())]
    ReadDir {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot read {}: {source}", path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: no buildable Go files", dir.display())]
    NoGoFiles { dir: PathBuf },

    #[error("found packages {first} ({first_file}) and {second} ({second_file}) in {}", dir.display())]
    MultiplePackages {
        dir: PathBuf,
        first: String,
        first_file: String,
        second: String,
        second_file: String,
    },

    #[error("{file}: invalid build constraint: {message}")]
    BuildConstraint { file: String, message: String },

    #[error("parsing package: {0}")]
    Syntax(#[from] SyntaxError),
}

pub(crate) fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
