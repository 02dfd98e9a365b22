use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::build::BuildContext;
use super::types::{file_label, LoadError, Package, ParsedFile, SyntaxForest};
use crate::syntax::parse_file;

/// Source of parsed packages.
///
/// The generator only needs the syntax of one directory; implementations
/// decide which files make up the package.
pub trait PackageLoader {
    fn load(&self, dir: &Path) -> Result<Package, LoadError>;
}

/// Loads a package from disk following the `go build` file selection rules
/// for a given [`BuildContext`].
#[derive(Debug, Clone, Default)]
pub struct GoPackageLoader {
    context: BuildContext,
}

impl GoPackageLoader {
    pub fn new(context: BuildContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &BuildContext {
        &self.context
    }

    /// Candidate `.go` files of `dir`, sorted by name.
    fn candidates(&self, dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
        let read_dir = |source| LoadError::ReadDir {
            dir: dir.to_path_buf(),
            source,
        };
        let mut files = Vec::new();
        for entry in fs::read_dir(dir).map_err(read_dir)? {
            let entry = entry.map_err(read_dir)?;
            let is_file = entry.file_type().map(|t| t.is_file()).unwrap_or(false);
            if !is_file {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if self.context.file_name_matches(name) {
                files.push(entry.path());
            } else {
                trace!(file = %name, "excluded by file name");
            }
        }
        files.sort();
        Ok(files)
    }
}

impl PackageLoader for GoPackageLoader {
    fn load(&self, dir: &Path) -> Result<Package, LoadError> {
        let mut parsed: Vec<ParsedFile> = Vec::new();
        for path in self.candidates(dir)? {
            let src = fs::read_to_string(&path).map_err(|source| LoadError::ReadFile {
                path: path.clone(),
                source,
            })?;
            let label = file_label(&path);
            let included = self
                .context
                .header_matches(&src)
                .map_err(|message| LoadError::BuildConstraint {
                    file: label.clone(),
                    message,
                })?;
            if !included {
                trace!(file = %label, "excluded by build constraint");
                continue;
            }

            let ast = parse_file(&label, &src)?;
            if let Some(first) = parsed.first() {
                if first.ast.package != ast.package {
                    return Err(LoadError::MultiplePackages {
                        dir: dir.to_path_buf(),
                        first: first.ast.package.clone(),
                        first_file: file_label(&first.path),
                        second: ast.package,
                        second_file: label,
                    });
                }
            }
            parsed.push(ParsedFile { path, ast });
        }

        let Some(name) = parsed.first().map(|f| f.ast.package.clone()) else {
            return Err(LoadError::NoGoFiles {
                dir: dir.to_path_buf(),
            });
        };
        debug!(
            dir = %dir.display(),
            package = %name,
            files = parsed.len(),
            "loaded package"
        );
        Ok(Package {
            name,
            dir: dir.to_path_buf(),
            files: parsed.iter().map(|f| f.path.clone()).collect(),
            forest: SyntaxForest::new(parsed),
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use std::collections::HashSet;
    use tempfile::tempdir;

    fn loader() -> GoPackageLoader {
        GoPackageLoader::new(BuildContext {
            goos: "linux".into(),
            goarch: "amd64".into(),
            tags: HashSet::new(),
        })
    }

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(name), contents).unwrap();
    }

    #[test]
    fn loads_buildable_files_in_name_order() {
        let dir = tempdir().unwrap();
        write(dir.path(), "b.go", "package geo\n\ntype B struct{}\n");
        write(dir.path(), "a.go", "package geo\n\ntype A struct{}\n");
        write(dir.path(), "a_test.go", "package geo_test\n");
        write(dir.path(), "z_windows.go", "package other\n");
        write(dir.path(), "gen.go", "//go:build ignore\n\npackage main\n");
        write(dir.path(), "README.md", "# geo\n");
        fs::create_dir(dir.path().join("sub.go")).unwrap();

        let pkg = loader().load(dir.path()).unwrap();
        assert_eq!(pkg.name, "geo");
        let names: Vec<_> = pkg.files.iter().map(|p| file_label(p)).collect();
        assert_eq!(names, vec!["a.go", "b.go"]);
        assert_eq!(pkg.forest.len(), 2);
        assert_eq!(pkg.forest.package_name(), Some("geo"));
    }

    #[test]
    fn accepts_byte_order_marks_and_dotted_platform_names() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.go", "\u{feff}package geo\n\ntype A struct{ X int }\n");
        write(dir.path(), "b.go", "\u{feff}//go:build ignore\n\npackage main\n");
        write(dir.path(), "api_windows.pb.go", "package geowin\n");
        write(dir.path(), "api_linux.pb.go", "package geo\n\ntype B struct{}\n");

        let pkg = loader().load(dir.path()).unwrap();
        let names: Vec<_> = pkg.files.iter().map(|p| file_label(p)).collect();
        assert_eq!(names, vec!["a.go", "api_linux.pb.go"]);
        assert_eq!(pkg.name, "geo");
    }

    #[test]
    fn rejects_mixed_package_names() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.go", "package one\n");
        write(dir.path(), "b.go", "package two\n");
        let err = loader().load(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::MultiplePackages { .. }));
        let msg = err.to_string();
        assert!(msg.contains("one (a.go)"), "{msg}");
        assert!(msg.contains("two (b.go)"), "{msg}");
    }

    #[test]
    fn empty_or_missing_directories_fail() {
        let dir = tempdir().unwrap();
        let err = loader().load(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::NoGoFiles { .. }));

        let missing = dir.path().join("missing");
        let err = loader().load(&missing).unwrap_err();
        assert!(matches!(err, LoadError::ReadDir { .. }));
    }

    #[test]
    fn syntax_errors_carry_the_file_name() {
        let dir = tempdir().unwrap();
        write(dir.path(), "bad.go", "package p\n\ntype T struct {\n");
        let err = loader().load(dir.path()).unwrap_err();
        match err {
            LoadError::Syntax(e) => assert_eq!(e.file, "bad.go"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn invalid_constraints_are_reported() {
        let dir = tempdir().unwrap();
        write(dir.path(), "a.go", "//go:build linux &&\n\npackage p\n");
        let err = loader().load(dir.path()).unwrap_err();
        assert!(matches!(err, LoadError::BuildConstraint { .. }));
    }
}
