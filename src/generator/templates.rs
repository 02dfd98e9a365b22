use askama::Template;
use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

use super::extract::{Field, Method, TypeDescriptor};
use super::project::GenerateRequest;

/// Context a user template is rendered against.
///
/// Built once per run and consumed by [`render_template`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateData {
    /// Requested type name
    pub type_name: String,
    /// Template path as given by the caller
    pub template_file: String,
    /// Output path as given by the caller
    pub output_file: String,
    /// Package declared by the loaded sources
    pub package_name: String,
    /// Struct members, empty unless the type is a struct
    pub fields: Vec<Field>,
    /// Interface methods, empty unless the type is an interface
    pub methods: Vec<Method>,
    /// Caller supplied tokens, passed through uninterpreted
    pub extras: Vec<String>,
}

impl TemplateData {
    pub fn build(request: &GenerateRequest, package_name: &str, descriptor: TypeDescriptor) -> Self {
        Self {
            type_name: request.type_name.clone(),
            template_file: request.template.clone(),
            output_file: request.output.clone(),
            package_name: package_name.to_string(),
            fields: descriptor.fields,
            methods: descriptor.methods,
            extras: split_extras(&request.extras),
        }
    }
}

/// Split the comma-separated extras string.
///
/// Tokens are kept as written, including empty ones, so `""` yields a single
/// empty token.
pub fn split_extras(extras: &str) -> Vec<String> {
    extras.split(',').map(str::to_string).collect()
}

fn ucfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn lcfirst(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Render a user template against `data`.
///
/// Referencing data the context does not have is an error rather than an
/// empty string. The template's trailing newline is kept.
///
/// # Errors
///
/// Returns the engine's error for invalid syntax or undefined data.
pub fn render_template(
    name: &str,
    source: &str,
    data: &TemplateData,
) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_keep_trailing_newline(true);
    env.add_filter("ucfirst", ucfirst);
    env.add_filter("lcfirst", lcfirst);
    env.add_template(name, source)?;
    env.get_template(name)?.render(data)
}

/// Header placed at the top of generated Go files.
#[derive(Template)]
#[template(path = "header.go.txt", escape = "none")]
pub struct GeneratedHeader {
    pub tool: String,
    pub type_name: String,
    pub template: String,
    pub destination: String,
}

impl GeneratedHeader {
    pub fn new(type_name: &str, template: &str, destination: &str) -> Self {
        Self {
            tool: env!("CARGO_PKG_NAME").to_string(),
            type_name: type_name.to_string(),
            template: template.to_string(),
            destination: destination.to_string(),
        }
    }

    /// Header text followed by one blank line.
    pub fn to_text(&self) -> askama::Result<String> {
        let mut text = self.render()?;
        text.truncate(text.trim_end().len());
        text.push_str("\n\n");
        Ok(text)
    }
}
