//! # Package Module
//!
//! Turns a directory of Go sources into a parsed [`Package`]: picks the files
//! `go build` would compile for the configured platform, parses each one and
//! checks that they agree on the package name.
//!
//! Extraction works on the resulting [`SyntaxForest`] only, so a test or an
//! alternative front end can supply one through its own [`PackageLoader`].

mod build;
mod load;
mod types;

pub use build::BuildContext;
pub use load::{GoPackageLoader, PackageLoader};
pub use types::{LoadError, Package, ParsedFile, SyntaxForest};
