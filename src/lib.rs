//! # gonerate
//!
//! **gonerate** removes hand-written Go boilerplate: it reads the declaration
//! of a named struct or interface from a Go package, describes its fields or
//! method signatures, and renders a user template against that description.
//! Accessors, mocks and serializers are typical outputs.
//!
//! ## Architecture
//!
//! - **[`syntax`]** - Go tokenizer, declaration parser and visitor
//! - **[`package`]** - Picks the buildable files of a directory and parses them
//! - **[`generator`]** - Extraction, template data, rendering, formatting and output
//! - **[`cli`]** - The `gonerate` command line
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`runtime_config`]** - Environment-based settings
//!
//! ### Generation Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant User
//!     participant CLI as CLI<br/>(gonerate)
//!     participant Loader as package::GoPackageLoader
//!     participant Extract as generator::extract
//!     participant Render as generator::render_template
//!     participant Output as generator::write_output
//!     participant FS as File System
//!
//!     User->>CLI: gonerate generate -d geo -t Point -i t.tmpl -o point_gen.go
//!     CLI->>Loader: load("geo")
//!     Loader->>FS: read *.go (build rules applied)
//!     Loader-->>CLI: Package { name, forest }
//!     CLI->>Extract: extract(&forest, "Point")
//!     Extract-->>CLI: TypeDescriptor { fields, methods }
//!     CLI->>Render: render_template(template, &TemplateData)
//!     Render-->>CLI: text
//!     CLI->>Output: header + gofmt + atomic write
//!     Output->>FS: geo/point_gen.go
//! ```
//!
//! ## Example
//!
//! ```rust
//! use gonerate::generator::{extract, type_string};
//! use gonerate::package::SyntaxForest;
//!
//! let forest = SyntaxForest::from_sources([(
//!     "point.go",
//!     "package geo\n\ntype Point struct {\n\tX, Y int\n\tTags map[string][]string\n}\n",
//! )])
//! .unwrap();
//! let point = extract(&forest, "Point");
//! let fields: Vec<_> = point.fields.iter().map(|f| (f.name.as_str(), f.ty.as_str())).collect();
//! assert_eq!(fields, [("X", "int"), ("Y", "int"), ("Tags", "map[string][]string")]);
//! ```
//!
//! ## Limitations
//!
//! Only syntax is examined; no type checking or import resolution happens.
//! Array lengths are dropped when types are rendered for templates
//! (`[4]byte` becomes `[]byte`) and map keys and values are passed through as
//! written.

pub mod cli;
pub mod error;
pub mod generator;
pub mod logging;
pub mod package;
pub mod runtime_config;
pub mod syntax;

pub use error::{FormatError, GenerateError};
pub use generator::{GenerateOutcome, GenerateRequest, Generator};
pub use package::{GoPackageLoader, LoadError, PackageLoader};
