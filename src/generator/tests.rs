#![allow(clippy::unwrap_used, clippy::expect_used)]

use super::*;
use crate::error::{FormatError, GenerateError};
use crate::package::{LoadError, Package, PackageLoader, SyntaxForest};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Serves a fixed set of in-memory sources for any directory.
struct MemoryLoader {
    sources: Vec<(&'static str, &'static str)>,
}

impl PackageLoader for MemoryLoader {
    fn load(&self, dir: &Path) -> Result<Package, LoadError> {
        let forest = SyntaxForest::from_sources(self.sources.iter().copied())?;
        let name = forest
            .package_name()
            .map(str::to_string)
            .ok_or_else(|| LoadError::NoGoFiles {
                dir: dir.to_path_buf(),
            })?;
        Ok(Package {
            name,
            dir: dir.to_path_buf(),
            files: self.sources.iter().map(|(n, _)| PathBuf::from(n)).collect(),
            forest,
        })
    }
}

/// Trims trailing whitespace on every line and counts its calls.
#[derive(Clone, Default)]
struct TrimFormatter {
    calls: Arc<AtomicUsize>,
}

impl Formatter for TrimFormatter {
    fn name(&self) -> &str {
        "trim"
    }

    fn format(&self, source: &str) -> Result<String, FormatError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(source.lines().map(|l| format!("{}\n", l.trim_end())).collect())
    }
}

struct RejectingFormatter;

impl Formatter for RejectingFormatter {
    fn name(&self) -> &str {
        "reject"
    }

    fn format(&self, _source: &str) -> Result<String, FormatError> {
        Err(FormatError::InvalidOutput {
            program: "reject".into(),
        })
    }
}

const POINT: &str = "package geo\n\ntype Point struct {\n\tX int\n\tY int\n}\n";
const READER: &str =
    "package geo\n\ntype Reader interface {\n\tRead(p []byte) (n int, err error)\n}\n";

const ACCESSORS: &str = "package {{ package_name }}\n\
{% for f in fields %}\n\
func (p {{ type_name }}) Get{{ f.name }}() {{ f.type }} {   \n\
\treturn p.{{ f.name }}\n\
}\n\
{% endfor %}";

const MOCK: &str = "package {{ package_name }}\n\n\
type Mock{{ type_name }} struct{}\n\
{% for m in methods %}\n\
func (m *Mock{{ type_name }}) {{ m.name }}(\
{% for p in m.params %}{{ p.names | join(\", \") }} {{ p.type }}{% if not loop.last %}, {% endif %}{% endfor %}) \
({% for r in m.results %}{{ r.names | join(\", \") }} {{ r.type }}{% if not loop.last %}, {% endif %}{% endfor %}) {\n\
\treturn\n\
}\n\
{% endfor %}";

fn workspace(template: &str) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("gen.tmpl"), template).unwrap();
    dir
}

fn generator(source: &'static str, formatters: Formatters) -> Generator<MemoryLoader> {
    Generator::with_loader(
        MemoryLoader {
            sources: vec![("point.go", source)],
        },
        formatters,
    )
}

#[test]
fn test_point_accessors_end_to_end() {
    let dir = workspace(ACCESSORS);
    let trim = TrimFormatter::default();
    let gen = generator(POINT, Formatters::new().with(OutputKind::Go, trim.clone()));

    let outcome = gen
        .run(&GenerateRequest::new(dir.path(), "Point", "gen.tmpl", "point_gen.go"))
        .unwrap();
    assert_eq!(outcome.path, dir.path().join("point_gen.go"));
    assert_eq!(outcome.kind, OutputKind::Go);
    assert_eq!((outcome.fields, outcome.methods), (2, 0));
    assert!(outcome.format_warning.is_none());
    assert_eq!(trim.calls.load(Ordering::SeqCst), 1);

    let text = fs::read_to_string(&outcome.path).unwrap();
    assert!(text.starts_with(
        "// Code gonerated by \"gonerate\"\n// DO NOT EDIT\n// @generated\n//\n// Args:\n// TypeName: Point\n// Template: gen.tmpl\n// Destination: point_gen.go\n\npackage geo\n"
    ));
    assert!(text.contains("func (p Point) GetX() int {\n\treturn p.X\n}\n"));
    assert!(text.contains("func (p Point) GetY() int {\n\treturn p.Y\n}\n"));
}

#[test]
fn test_reader_mock_end_to_end() {
    let dir = workspace(MOCK);
    let gen = generator(READER, Formatters::new());
    let outcome = gen
        .run(&GenerateRequest::new(dir.path(), "Reader", "gen.tmpl", "reader_mock.go"))
        .unwrap();
    assert_eq!((outcome.fields, outcome.methods), (0, 1));
    let text = fs::read_to_string(&outcome.path).unwrap();
    assert!(
        text.contains("func (m *MockReader) Read(p []byte) (n int, err error) {"),
        "{text}"
    );
}

#[test]
fn test_non_go_output_has_no_header_and_skips_go_formatter() {
    let dir = workspace("{% for f in fields %}{{ f.name }}={{ f.type }}\n{% endfor %}");
    let trim = TrimFormatter::default();
    let gen = generator(POINT, Formatters::new().with(OutputKind::Go, trim.clone()));
    let outcome = gen
        .run(&GenerateRequest::new(dir.path(), "Point", "gen.tmpl", "Fields.TXT"))
        .unwrap();
    assert_eq!(outcome.kind, OutputKind::Other);
    assert_eq!(outcome.path, dir.path().join("fields.txt"));
    assert_eq!(fs::read_to_string(&outcome.path).unwrap(), "X=int\nY=int\n");
    assert_eq!(trim.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_formatter_failure_writes_raw_output() {
    let dir = workspace("this is not go {{ type_name }}\n");
    let gen = generator(POINT, Formatters::new().with(OutputKind::Go, RejectingFormatter));
    let outcome = gen
        .run(&GenerateRequest::new(dir.path(), "Point", "gen.tmpl", "broken.go"))
        .unwrap();
    assert!(outcome.format_warning.is_some());
    let text = fs::read_to_string(&outcome.path).unwrap();
    assert!(text.ends_with("\n\nthis is not go Point\n"));
}

#[test]
fn test_undefined_template_data_leaves_no_output() {
    let dir = workspace("{{ type_name }} {{ no_such_field }}\n");
    let gen = generator(POINT, Formatters::new());
    let err = gen
        .run(&GenerateRequest::new(dir.path(), "Point", "gen.tmpl", "point_gen.go"))
        .unwrap_err();
    assert!(matches!(err, GenerateError::Render { .. }));
    assert!(err.to_string().starts_with("[point_gen.go] rendering template gen.tmpl"));
    assert!(!dir.path().join("point_gen.go").exists());
}

#[test]
fn test_missing_template_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let gen = generator(POINT, Formatters::new());
    let err = gen
        .run(&GenerateRequest::new(dir.path(), "Point", "nope.tmpl", "out.go"))
        .unwrap_err();
    assert!(matches!(err, GenerateError::TemplateRead { .. }));
    assert_eq!(err.output(), "out.go");
}

#[test]
fn test_absolute_template_path_is_used_as_is() {
    let templates = workspace("{{ extras | length }}:{{ extras[0] }}|{{ extras[1] }}\n");
    let pkg = tempfile::tempdir().unwrap();
    let absolute = templates.path().join("gen.tmpl");
    let request = GenerateRequest::new(
        pkg.path(),
        "Point",
        absolute.to_string_lossy(),
        "out/extras.txt",
    )
    .with_extras("json,");
    let outcome = generator(POINT, Formatters::new()).run(&request).unwrap();
    assert_eq!(outcome.path, pkg.path().join("out/extras.txt"));
    assert_eq!(fs::read_to_string(&outcome.path).unwrap(), "2:json|\n");
}

#[test]
fn test_empty_extras_reach_the_template_as_one_token() {
    let dir = workspace("{{ extras | length }}[{{ extras[0] }}]\n");
    let outcome = generator(POINT, Formatters::new())
        .run(&GenerateRequest::new(dir.path(), "Point", "gen.tmpl", "e.txt"))
        .unwrap();
    assert_eq!(fs::read_to_string(&outcome.path).unwrap(), "1[]\n");
}

#[test]
fn test_unknown_type_renders_with_empty_lists() {
    let dir = workspace("{{ fields | length }} {{ methods | length }}\n");
    let outcome = generator(POINT, Formatters::new())
        .run(&GenerateRequest::new(dir.path(), "Missing", "gen.tmpl", "n.txt"))
        .unwrap();
    assert_eq!(fs::read_to_string(&outcome.path).unwrap(), "0 0\n");
}

#[test]
fn test_load_errors_name_the_output() {
    let dir = workspace("x");
    let gen = Generator::with_loader(
        MemoryLoader {
            sources: vec![("bad.go", "package geo\n\ntype T struct {\n")],
        },
        Formatters::new(),
    );
    let err = gen
        .run(&GenerateRequest::new(dir.path(), "T", "gen.tmpl", "t_gen.go"))
        .unwrap_err();
    let msg = err.to_string();
    assert!(msg.starts_with("[t_gen.go] cannot process directory"), "{msg}");
    assert!(matches!(err, GenerateError::Load { source: LoadError::Syntax(_), .. }));
}

#[test]
fn test_inspect_reports_descriptor() {
    let gen = generator(READER, Formatters::new());
    let report = gen.inspect(Path::new("."), "Reader").unwrap();
    assert_eq!(report.package, "geo");
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["type_name"], "Reader");
    assert_eq!(json["methods"][0]["params"][0]["names"][0], "p");
    assert_eq!(json["methods"][0]["params"][0]["type"], "[]byte");
    assert_eq!(json["fields"].as_array().unwrap().len(), 0);
}

#[test]
fn test_batch_reports_every_failure() {
    let dir = workspace("{{ type_name }}\n");
    let manifest_path = dir.path().join("gonerate.toml");
    fs::write(
        &manifest_path,
        r#"
[[target]]
type = "Point"
template = "missing.tmpl"
output = "a.txt"

[[target]]
type = "Point"
template = "gen.tmpl"
output = "b.txt"

[[target]]
type = "Point"
template = "also_missing.tmpl"
output = "c.txt"
"#,
    )
    .unwrap();
    let manifest = Manifest::load(&manifest_path).unwrap();
    let report = run_batch(&generator(POINT, Formatters::new()), &manifest);
    assert!(!report.is_success());
    assert_eq!(report.total(), 3);
    assert_eq!(report.succeeded.len(), 1);
    let failed: Vec<_> = report.failed.iter().map(|e| e.output()).collect();
    assert_eq!(failed, vec!["a.txt", "c.txt"]);
    assert_eq!(fs::read_to_string(dir.path().join("b.txt")).unwrap(), "Point\n");
}

#[test]
fn test_batch_duplicate_outputs_last_write_wins() {
    let dir = workspace("{{ extras[0] }}\n");
    let manifest_path = dir.path().join("gonerate.toml");
    fs::write(
        &manifest_path,
        r#"
[[target]]
type = "Point"
template = "gen.tmpl"
output = "Same.txt"
extras = "first"

[[target]]
type = "Point"
template = "gen.tmpl"
output = "same.txt"
extras = "second"
"#,
    )
    .unwrap();
    let manifest = Manifest::load(&manifest_path).unwrap();
    let report = run_batch(&generator(POINT, Formatters::new()), &manifest);
    assert!(report.is_success());
    assert_eq!(fs::read_to_string(dir.path().join("same.txt")).unwrap(), "second\n");
}
