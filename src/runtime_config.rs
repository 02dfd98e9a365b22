//! # Runtime Configuration Module
//!
//! Environment-based settings for the generator.
//!
//! ## Environment Variables
//!
//! ### `GONERATE_GOFMT_BIN`
//!
//! Program used to format generated Go files. Default: `gofmt` from `PATH`.
//!
//! ### `GONERATE_NO_FORMAT`
//!
//! Any value other than `0`, `false`, `f`, `no`, `n`, `off` or an empty
//! string writes generated Go files exactly as rendered.
//!
//! ## Usage
//!
//! ```rust
//! use gonerate::runtime_config::GeneratorConfig;
//!
//! let config = GeneratorConfig::from_env();
//! println!("formatting with {}", config.gofmt_bin);
//! ```
//!
//! The CLI reads the same variables through its `--gofmt` and `--no-format`
//! flags, which win over the environment.

use std::env;

pub const DEFAULT_GOFMT: &str = "gofmt";

/// Generator settings loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Formatter program for Go output
    pub gofmt_bin: String,
    /// Whether Go output is formatted at all
    pub format: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            gofmt_bin: DEFAULT_GOFMT.to_string(),
            format: true,
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let gofmt_bin = get("GONERATE_GOFMT_BIN")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GOFMT.to_string());
        let no_format = get("GONERATE_NO_FORMAT").is_some_and(|v| parse_flag(&v));
        GeneratorConfig {
            gofmt_bin,
            format: !no_format,
        }
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "f" | "no" | "n" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> GeneratorConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        GeneratorConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        assert_eq!(config(&[]), GeneratorConfig::default());
    }

    #[test]
    fn overrides() {
        let cfg = config(&[
            ("GONERATE_GOFMT_BIN", "/opt/go/bin/gofmt"),
            ("GONERATE_NO_FORMAT", "TRUE"),
        ]);
        assert_eq!(cfg.gofmt_bin, "/opt/go/bin/gofmt");
        assert!(!cfg.format);

        let cfg = config(&[("GONERATE_GOFMT_BIN", "  "), ("GONERATE_NO_FORMAT", "0")]);
        assert_eq!(cfg.gofmt_bin, "gofmt");
        assert!(cfg.format);
    }
}
