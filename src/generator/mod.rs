//! # Generator Module
//!
//! Describes a named Go type and renders a user template against that
//! description to produce a new file.
//!
//! ## Architecture
//!
//! ```text
//! Package dir → Loader → Extract → TemplateData → Render → Header/Format → Write
//! ```
//!
//! 1. **Load** - [`crate::package`] parses the buildable files of the directory
//! 2. **Extract** - [`extract`] walks every declaration named like the
//!    requested type and collects struct [`Field`]s or interface [`Method`]s,
//!    with types rendered by [`type_string`]
//! 3. **Bind** - [`TemplateData::build`] adds names, paths and extras
//! 4. **Render** - [`render_template`] runs the template through `minijinja`
//! 5. **Write** - Go output gets the [`GeneratedHeader`] and goes through the
//!    [`Formatter`] registered for its [`OutputKind`]; [`write_output`] then
//!    replaces the destination atomically
//!
//! A type that does not exist, or is neither a struct nor an interface,
//! simply produces empty `fields` and `methods`.
//!
//! ## Templates
//!
//! Templates use Jinja syntax and see these values:
//!
//! | name            | contents                                             |
//! |-----------------|------------------------------------------------------|
//! | `type_name`     | requested type                                       |
//! | `package_name`  | package of the loaded sources                        |
//! | `template_file` | template path as given                               |
//! | `output_file`   | output path as given                                 |
//! | `fields`        | `[{name, type, tag, embedded}]`                      |
//! | `methods`       | `[{name, params, results}]`, slots are `{names, type}` |
//! | `extras`        | the comma-separated extras, split                    |
//!
//! Besides the engine's builtins, the `ucfirst` and `lcfirst` filters are
//! available. Referencing anything else fails the run.
//!
//! ## Programmatic Usage
//!
//! ```rust,no_run
//! use gonerate::generator::{GenerateRequest, Generator};
//! use gonerate::runtime_config::GeneratorConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let generator = Generator::new(&GeneratorConfig::from_env());
//! let request = GenerateRequest::new("internal/geo", "Point", "accessors.tmpl", "point_gen.go")
//!     .with_extras("json");
//! let outcome = generator.run(&request)?;
//! println!("wrote {}", outcome.path.display());
//! # Ok(())
//! # }
//! ```

mod batch;
mod extract;
mod output;
mod project;
mod stringify;
mod templates;
#[cfg(test)]
mod tests;

pub use batch::{run_batch, BatchReport, Manifest, ManifestError, Target};
pub use extract::{extract, extract_fields, extract_methods, Field, Method, MethodField, TypeDescriptor};
pub use output::{resolve_output_path, write_output, Formatter, Formatters, OutputKind};
pub use project::{GenerateOutcome, GenerateRequest, Generator, GoFormatter, TypeReport};
pub use stringify::type_string;
pub use templates::{render_template, split_extras, GeneratedHeader, TemplateData};
