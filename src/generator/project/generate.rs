use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::GenerateError;
use crate::generator::extract::{extract, TypeDescriptor};
use crate::generator::output::{write_output, Formatters, OutputKind};
use crate::generator::project::format::GoFormatter;
use crate::generator::templates::{render_template, GeneratedHeader, TemplateData};
use crate::package::{BuildContext, GoPackageLoader, LoadError, PackageLoader};
use crate::runtime_config::GeneratorConfig;

/// Parameters of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    /// Package directory
    pub dir: PathBuf,
    /// Type to describe
    pub type_name: String,
    /// Template path, relative to `dir` unless absolute
    pub template: String,
    /// Output path, relative to `dir`
    pub output: String,
    /// Comma-separated extras
    pub extras: String,
}

impl GenerateRequest {
    pub fn new(
        dir: impl Into<PathBuf>,
        type_name: impl Into<String>,
        template: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.into(),
            type_name: type_name.into(),
            template: template.into(),
            output: output.into(),
            extras: String::new(),
        }
    }

    pub fn with_extras(mut self, extras: impl Into<String>) -> Self {
        self.extras = extras.into();
        self
    }

    pub fn template_path(&self) -> PathBuf {
        let template = Path::new(&self.template);
        if template.is_absolute() {
            template.to_path_buf()
        } else {
            self.dir.join(template)
        }
    }
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOutcome {
    /// File that was written
    pub path: PathBuf,
    pub kind: OutputKind,
    /// Number of struct fields found
    pub fields: usize,
    /// Number of interface methods found
    pub methods: usize,
    /// Set when formatting failed and the text was written as rendered
    pub format_warning: Option<String>,
}

/// Description of a type, as printed by `gonerate inspect`.
#[derive(Debug, Clone, Serialize)]
pub struct TypeReport {
    pub package: String,
    pub type_name: String,
    #[serde(flatten)]
    pub descriptor: TypeDescriptor,
}

/// Runs the Load, Extract, Bind, Render and Write stages for a request.
///
/// A `Generator` holds no per-run state and can be shared across threads
/// when its loader can.
#[derive(Debug)]
pub struct Generator<L = GoPackageLoader> {
    loader: L,
    formatters: Formatters,
}

impl Generator<GoPackageLoader> {
    /// Generator for the host platform with formatting set up from `config`.
    pub fn new(config: &GeneratorConfig) -> Self {
        let mut formatters = Formatters::new();
        if config.format {
            formatters.register(OutputKind::Go, GoFormatter::new(config.gofmt_bin.clone()));
        }
        Self::with_loader(GoPackageLoader::new(BuildContext::from_env()), formatters)
    }
}

impl<L: PackageLoader> Generator<L> {
    pub fn with_loader(loader: L, formatters: Formatters) -> Self {
        Self { loader, formatters }
    }

    pub fn formatters(&self) -> &Formatters {
        &self.formatters
    }

    /// Load `dir` and describe `type_name`.
    pub fn inspect(&self, dir: &Path, type_name: &str) -> Result<TypeReport, LoadError> {
        let package = self.loader.load(dir)?;
        Ok(TypeReport {
            package: package.name,
            type_name: type_name.to_string(),
            descriptor: extract(&package.forest, type_name),
        })
    }

    /// Generate one file.
    ///
    /// # Errors
    ///
    /// Every failure except formatting is returned and leaves no output file
    /// behind. A formatter failure is logged and recorded in
    /// [`GenerateOutcome::format_warning`]; the rendered text is written
    /// unformatted.
    pub fn run(&self, request: &GenerateRequest) -> Result<GenerateOutcome, GenerateError> {
        let output = request.output.as_str();

        let package = self
            .loader
            .load(&request.dir)
            .map_err(|source| GenerateError::Load {
                output: output.to_string(),
                dir: request.dir.clone(),
                source,
            })?;

        let descriptor = extract(&package.forest, &request.type_name);
        let (fields, methods) = (descriptor.fields.len(), descriptor.methods.len());
        debug!(
            output,
            package = %package.name,
            type_name = %request.type_name,
            fields,
            methods,
            "extracted type"
        );
        if descriptor.is_empty() {
            debug!(output, type_name = %request.type_name, "no fields or methods found");
        }
        let data = TemplateData::build(request, &package.name, descriptor);

        let template_path = request.template_path();
        let source =
            fs::read_to_string(&template_path).map_err(|source| GenerateError::TemplateRead {
                output: output.to_string(),
                path: template_path.clone(),
                source,
            })?;
        let rendered = render_template(&request.template, &source, &data).map_err(|source| {
            GenerateError::Render {
                output: output.to_string(),
                template: request.template.clone(),
                source,
            }
        })?;

        let kind = OutputKind::from_path(Path::new(output));
        let mut text = match kind {
            OutputKind::Go => GeneratedHeader::new(&request.type_name, &request.template, output)
                .to_text()
                .map_err(|source| GenerateError::Header {
                    output: output.to_string(),
                    source,
                })?,
            OutputKind::Other => String::new(),
        };
        text.push_str(&rendered);

        let mut format_warning = None;
        if let Some(formatter) = self.formatters.get(kind) {
            match formatter.format(&text) {
                Ok(formatted) => text = formatted,
                Err(err) => {
                    warn!(
                        output,
                        formatter = formatter.name(),
                        error = %err,
                        "invalid {kind} generated, writing unformatted output; compile the package to analyze the error"
                    );
                    format_warning = Some(err.to_string());
                }
            }
        }

        let path = write_output(&request.dir, output, &text)?;
        info!(output, path = %path.display(), %kind, "generated");
        Ok(GenerateOutcome {
            path,
            kind,
            fields,
            methods,
            format_warning,
        })
    }
}
