//! # CLI Module
//!
//! Command-line surface of the `gonerate` binary.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Render one template for one type:
//!
//! ```bash
//! gonerate generate --dir internal/geo --type Point \
//!     --template tmpl/accessors.tmpl --output point_gen.go --extras json
//! ```
//!
//! ### `batch`
//!
//! Run every target listed in a manifest; all failures are printed before
//! the command exits non-zero:
//!
//! ```bash
//! gonerate batch --manifest gonerate.toml
//! ```
//!
//! ### `inspect`
//!
//! Show the fields or methods a template would receive:
//!
//! ```bash
//! gonerate inspect --dir internal/io --type Reader --format json
//! ```
//!
//! ## Global Options
//!
//! - `--gofmt <PATH>` - formatter for Go output (env `GONERATE_GOFMT_BIN`)
//! - `--no-format` - skip formatting (env `GONERATE_NO_FORMAT`)

mod commands;


pub use commands::{run_cli, Cli, Commands, InspectFormat};
