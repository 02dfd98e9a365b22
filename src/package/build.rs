//! Go build rules that decide which files of a directory belong to the build:
//! file name conventions, `_GOOS`/`_GOARCH` suffixes and build constraints.

use std::collections::HashSet;

use crate::syntax::BOM;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

/// Target platform and extra tags used to evaluate build rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub goos: String,
    pub goarch: String,
    /// Additional satisfied tags (`go build -tags`).
    pub tags: HashSet<String>,
}

impl Default for BuildContext {
    fn default() -> Self {
        Self::host()
    }
}

impl BuildContext {
    /// The platform this binary runs on, expressed in Go's names.
    pub fn host() -> Self {
        let goos = match std::env::consts::OS {
            "macos" => "darwin",
            other => other,
        };
        let goarch = match std::env::consts::ARCH {
            "x86_64" => "amd64",
            "x86" => "386",
            "aarch64" => "arm64",
            "powerpc" => "ppc",
            "powerpc64" => "ppc64",
            "loongarch64" => "loong64",
            "wasm32" => "wasm",
            other => other,
        };
        Self {
            goos: goos.to_string(),
            goarch: goarch.to_string(),
            tags: HashSet::new(),
        }
    }

    /// Host defaults overridden by `GOOS` and `GOARCH`, plus the extra tags
    /// listed comma-separated in `GONERATE_BUILD_TAGS`.
    pub fn from_env() -> Self {
        let mut ctx = Self::host();
        if let Ok(goos) = std::env::var("GOOS") {
            if !goos.is_empty() {
                ctx.goos = goos;
            }
        }
        if let Ok(goarch) = std::env::var("GOARCH") {
            if !goarch.is_empty() {
                ctx.goarch = goarch;
            }
        }
        if let Ok(tags) = std::env::var("GONERATE_BUILD_TAGS") {
            ctx.tags = tags
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
        }
        ctx
    }

    fn os_matches(&self, os: &str) -> bool {
        self.goos == os
            || (os == "linux" && self.goos == "android")
            || (os == "solaris" && self.goos == "illumos")
            || (os == "darwin" && self.goos == "ios")
    }

    /// Whether a single build tag is satisfied.
    pub fn tag_matches(&self, tag: &str) -> bool {
        if self.os_matches(tag) || self.goarch == tag || self.tags.contains(tag) {
            return true;
        }
        match tag {
            "gc" => true,
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            _ => tag.starts_with("go1."),
        }
    }

    /// Apply Go's file name rules: `.go` sources only, no tests, no names
    /// starting with `_` or `.`, and `_GOOS`/`_GOARCH` suffixes must match.
    /// Suffixes are read from the name up to its first `.`, so
    /// `api_windows.pb.go` is a windows file.
    pub fn file_name_matches(&self, name: &str) -> bool {
        let Some(stem) = name.strip_suffix(".go") else {
            return false;
        };
        if name.starts_with('_') || name.starts_with('.') || stem.ends_with("_test") {
            return false;
        }
        let stem = stem.split('.').next().unwrap_or(stem);
        // Everything before the first underscore is never a constraint.
        let Some(first) = stem.find('_') else {
            return true;
        };
        let parts: Vec<&str> = stem[first + 1..].split('_').collect();
        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.os_matches(parts[n - 2]) && self.goarch == parts[n - 1];
        }
        let last = parts[n - 1];
        if KNOWN_OS.contains(&last) {
            return self.os_matches(last);
        }
        if KNOWN_ARCH.contains(&last) {
            return self.goarch == last;
        }
        true
    }

    /// Evaluate the build constraints in the file header (the comments before
    /// the package clause). A `//go:build` line takes precedence over legacy
    /// `// +build` lines.
    pub fn header_matches(&self, src: &str) -> Result<bool, String> {
        let mut go_build = None;
        let mut plus_build = Vec::new();
        let mut in_block = false;
        let src = src.strip_prefix(BOM).unwrap_or(src);
        for line in src.lines() {
            let mut line = line.trim();
            // Constraints only count on lines that are a `//` comment alone.
            let mut after_block = false;
            if in_block {
                let Some(end) = line.find("*/") else {
                    continue;
                };
                in_block = false;
                after_block = true;
                line = line[end + 2..].trim_start();
            }
            while let Some(rest) = line.strip_prefix("/*") {
                after_block = true;
                match rest.find("*/") {
                    Some(end) => line = rest[end + 2..].trim_start(),
                    None => {
                        in_block = true;
                        line = "";
                    }
                }
            }
            if line.is_empty() {
                continue;
            }
            let Some(comment) = line.strip_prefix("//") else {
                break;
            };
            if after_block {
                continue;
            }
            if let Some(expr) = comment.strip_prefix("go:build") {
                if go_build.is_some() {
                    return Err("multiple //go:build lines".to_string());
                }
                go_build = Some(expr.trim().to_string());
            } else if let Some(expr) = comment.trim_start().strip_prefix("+build") {
                plus_build.push(expr.trim().to_string());
            }
        }

        if let Some(expr) = go_build {
            return ConstraintParser::new(&expr, self).parse();
        }
        // Each `+build` line is an OR of space-separated options, each option an
        // AND of comma-separated terms; lines are ANDed.
        Ok(plus_build.iter().all(|line| {
            line.split_whitespace().any(|option| {
                option.split(',').all(|term| match term.strip_prefix('!') {
                    Some(tag) => !self.tag_matches(tag),
                    None => self.tag_matches(term),
                })
            })
        }))
    }
}

/// Recursive-descent evaluator for `//go:build` expressions.
struct ConstraintParser<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
    ctx: &'a BuildContext,
}

impl<'a> ConstraintParser<'a> {
    fn new(expr: &'a str, ctx: &'a BuildContext) -> Self {
        let mut tokens = Vec::new();
        let mut rest = expr;
        while let Some(c) = rest.chars().next() {
            if c.is_whitespace() {
                rest = &rest[c.len_utf8()..];
                continue;
            }
            let len = if rest.starts_with("&&") || rest.starts_with("||") {
                2
            } else if matches!(c, '(' | ')' | '!') {
                1
            } else {
                rest.find(|ch: char| {
                    !(ch.is_alphanumeric() || ch == '_' || ch == '.')
                })
                .unwrap_or(rest.len())
                .max(c.len_utf8())
            };
            tokens.push(&rest[..len]);
            rest = &rest[len..];
        }
        Self { tokens, pos: 0, ctx }
    }

    fn parse(mut self) -> Result<bool, String> {
        if self.tokens.is_empty() {
            return Err("empty //go:build expression".to_string());
        }
        let value = self.or()?;
        match self.tokens.get(self.pos) {
            None => Ok(value),
            Some(tok) => Err(format!("unexpected '{tok}'")),
        }
    }

    fn or(&mut self) -> Result<bool, String> {
        let mut value = self.and()?;
        while self.tokens.get(self.pos) == Some(&"||") {
            self.pos += 1;
            // Evaluate both sides so syntax errors on the right are reported.
            let rhs = self.and()?;
            value = value || rhs;
        }
        Ok(value)
    }

    fn and(&mut self) -> Result<bool, String> {
        let mut value = self.not()?;
        while self.tokens.get(self.pos) == Some(&"&&") {
            self.pos += 1;
            let rhs = self.not()?;
            value = value && rhs;
        }
        Ok(value)
    }

    fn not(&mut self) -> Result<bool, String> {
        match self.tokens.get(self.pos).copied() {
            Some("!") => {
                self.pos += 1;
                Ok(!self.not()?)
            }
            Some("(") => {
                self.pos += 1;
                let value = self.or()?;
                if self.tokens.get(self.pos) != Some(&")") {
                    return Err("missing ')'".to_string());
                }
                self.pos += 1;
                Ok(value)
            }
            Some(tag) if tag.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.') => {
                self.pos += 1;
                Ok(self.ctx.tag_matches(tag))
            }
            Some(tok) => Err(format!("unexpected '{tok}'")),
            None => Err("unexpected end of expression".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    fn linux_amd64() -> BuildContext {
        BuildContext {
            goos: "linux".into(),
            goarch: "amd64".into(),
            tags: HashSet::new(),
        }
    }

    #[test]
    fn file_names() {
        let ctx = linux_amd64();
        assert!(ctx.file_name_matches("point.go"));
        assert!(ctx.file_name_matches("linux.go"));
        assert!(ctx.file_name_matches("poll_linux.go"));
        assert!(ctx.file_name_matches("poll_linux_amd64.go"));
        assert!(ctx.file_name_matches("zsys_other_thing.go"));
        assert!(!ctx.file_name_matches("poll_windows.go"));
        assert!(!ctx.file_name_matches("poll_linux_arm64.go"));
        assert!(!ctx.file_name_matches("cpu_arm64.go"));
        assert!(!ctx.file_name_matches("point_test.go"));
        assert!(!ctx.file_name_matches("_scratch.go"));
        assert!(!ctx.file_name_matches(".hidden.go"));
        assert!(!ctx.file_name_matches("notes.txt"));
        // Suffixes end at the first dot.
        assert!(!ctx.file_name_matches("api_windows.pb.go"));
        assert!(!ctx.file_name_matches("zsys_arm64.s.go"));
        assert!(ctx.file_name_matches("api_linux.pb.go"));
        assert!(ctx.file_name_matches("api.windows.go"));
        assert!(ctx.file_name_matches("api_test.pb.go"));
    }

    #[test]
    fn go_build_expressions() {
        let ctx = linux_amd64();
        let eval = |header: &str| ctx.header_matches(header).unwrap();
        assert!(eval("package p\n"));
        assert!(eval("//go:build linux && amd64\n\npackage p\n"));
        assert!(eval("//go:build unix\n\npackage p\n"));
        assert!(eval("//go:build (windows || linux) && !cgo\n\npackage p\n"));
        assert!(eval("//go:build go1.21\n\npackage p\n"));
        assert!(!eval("//go:build ignore\n\npackage p\n"));
        assert!(!eval("// Copyright\n\n//go:build windows\n\npackage p\n"));
        // Constraints after the package clause do not count.
        assert!(eval("package p\n\n//go:build ignore\n"));
        assert!(eval("/* c */ package p\n\n//go:build ignore\n"));
        assert!(eval("/*\n c\n*/ package p\n//go:build ignore\n"));
        assert!(!eval("/* c */\n//go:build ignore\n\npackage p\n"));
        assert!(!eval("\u{feff}//go:build ignore\n\npackage p\n"));
    }

    #[test]
    fn legacy_plus_build_lines() {
        let ctx = linux_amd64();
        assert!(ctx.header_matches("// +build linux darwin\n\npackage p\n").unwrap());
        assert!(!ctx.header_matches("// +build linux,386\n\npackage p\n").unwrap());
        assert!(!ctx.header_matches("// +build ignore\n\npackage p\n").unwrap());
        // go:build wins over +build.
        assert!(ctx
            .header_matches("//go:build linux\n// +build ignore\n\npackage p\n")
            .unwrap());
    }

    #[test]
    fn custom_tags_and_errors() {
        let mut ctx = linux_amd64();
        ctx.tags.insert("integration".into());
        assert!(ctx.header_matches("//go:build integration\npackage p\n").unwrap());
        assert!(ctx.header_matches("//go:build linux &&\npackage p\n").is_err());
        assert!(ctx.header_matches("//go:build (linux\npackage p\n").is_err());
        assert!(ctx
            .header_matches("//go:build linux\n//go:build amd64\npackage p\n")
            .is_err());
    }
}
