#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn gonerate(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gonerate"))
        .current_dir(dir)
        .env("GONERATE_NO_FORMAT", "1")
        .env("GONERATE_LOG_LEVEL", "warn")
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("run gonerate")
}

fn geo_package() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let pkg = dir.path().join("geo");
    fs::create_dir_all(&pkg).unwrap();
    fs::write(
        pkg.join("point.go"),
        "package geo\n\ntype Point struct {\n\tX int `json:\"x\"`\n\tY int `json:\"y\"`\n}\n\ntype Shape interface {\n\tArea() float64\n}\n",
    )
    .unwrap();
    fs::write(
        pkg.join("fields.tmpl"),
        "{% for f in fields %}{{ f.name }} {{ f.type }}\n{% endfor %}",
    )
    .unwrap();
    dir
}

#[test]
fn test_cli_generate_writes_lowercased_output() {
    let dir = geo_package();
    let out = gonerate(
        dir.path(),
        &["generate", "-d", "geo", "-t", "Point", "-i", "fields.tmpl", "-o", "Fields.TXT"],
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert_eq!(
        fs::read_to_string(dir.path().join("geo/fields.txt")).unwrap(),
        "X int\nY int\n"
    );
    assert!(String::from_utf8_lossy(&out.stdout).contains("fields.txt"));
}

#[test]
fn test_cli_generate_failure_exits_non_zero() {
    let dir = geo_package();
    let out = gonerate(
        dir.path(),
        &["generate", "-d", "geo", "-t", "Point", "-i", "missing.tmpl", "-o", "p.go"],
    );
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("[p.go] cannot read template"), "{stderr}");
    assert!(!dir.path().join("geo/p.go").exists());
}

#[test]
fn test_cli_batch_reports_all_failures() {
    let dir = geo_package();
    fs::write(
        dir.path().join("gonerate.toml"),
        r#"
dir = "geo"

[[target]]
type = "Point"
template = "nope.tmpl"
output = "one.txt"

[[target]]
type = "Point"
template = "fields.tmpl"
output = "two.txt"

[[target]]
type = "Point"
template = "fields.tmpl"
output = "three.txt"
dir = "missing"
"#,
    )
    .unwrap();
    let out = gonerate(dir.path(), &["batch", "-m", "gonerate.toml"]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("[one.txt]"), "{stderr}");
    assert!(stderr.contains("[three.txt]"), "{stderr}");
    assert!(stderr.contains("2 of 3 targets failed"), "{stderr}");
    assert!(dir.path().join("geo/two.txt").exists());
}

#[test]
fn test_cli_inspect_json() {
    let dir = geo_package();
    let out = gonerate(dir.path(), &["inspect", "-d", "geo", "-t", "Shape", "--format", "json"]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let json: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["package"], "geo");
    assert_eq!(json["methods"][0]["name"], "Area");
    assert_eq!(json["methods"][0]["results"][0]["type"], "float64");
    assert_eq!(json["methods"][0]["results"][0]["names"], serde_json::json!([]));
}

#[test]
fn test_cli_inspect_text() {
    let dir = geo_package();
    let out = gonerate(dir.path(), &["inspect", "-d", "geo", "-t", "Point"]);
    assert!(out.status.success());
    assert_eq!(
        String::from_utf8_lossy(&out.stdout),
        "package geo\ntype Point\nfields:\n  X int `json:\"x\"`\n  Y int `json:\"y\"`\n"
    );
}
