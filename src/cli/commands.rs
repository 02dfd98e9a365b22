use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::builder::FalseyValueParser;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::generator::{run_batch, GenerateOutcome, GenerateRequest, Generator, Manifest, TypeReport};
use crate::runtime_config::{GeneratorConfig, DEFAULT_GOFMT};

/// Command-line interface for gonerate
///
/// Generates Go code from struct and interface declarations through user
/// templates.
#[derive(Debug, Parser)]
#[command(name = "gonerate", version)]
#[command(about = "Generate code from Go type declarations and templates", long_about = None)]
pub struct Cli {
    /// Formatter program for generated Go files
    #[arg(long, global = true, env = "GONERATE_GOFMT_BIN", default_value = DEFAULT_GOFMT)]
    pub gofmt: String,

    /// Write generated Go files without formatting them
    #[arg(
        long,
        global = true,
        env = "GONERATE_NO_FORMAT",
        action = ArgAction::SetTrue,
        value_parser = FalseyValueParser::new()
    )]
    pub no_format: bool,

    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn config(&self) -> GeneratorConfig {
        GeneratorConfig {
            gofmt_bin: self.gofmt.clone(),
            format: !self.no_format,
        }
    }
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render one template for one type
    Generate {
        /// Package directory containing the type
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Name of the struct or interface
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Template file, relative to --dir unless absolute
        #[arg(short = 'i', long)]
        template: String,

        /// Output file, relative to --dir; its file name is lowercased
        #[arg(short, long)]
        output: String,

        /// Comma-separated values passed to the template as `extras`
        #[arg(short, long, default_value = "")]
        extras: String,
    },
    /// Run every target of a manifest, reporting all failures
    Batch {
        /// Manifest file (TOML, or YAML/JSON by extension)
        #[arg(short, long)]
        manifest: PathBuf,
    },
    /// Print what templates would see for a type
    Inspect {
        /// Package directory containing the type
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,

        /// Name of the struct or interface
        #[arg(short = 't', long = "type")]
        type_name: String,

        /// Output format
        #[arg(long, value_enum, default_value_t = InspectFormat::Text)]
        format: InspectFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InspectFormat {
    Text,
    Json,
}

/// Execute a parsed command line.
///
/// # Errors
///
/// Returns the first fatal error of `generate` and `inspect`, or a summary
/// error after a `batch` in which any target failed.
pub fn run_cli(cli: Cli) -> anyhow::Result<()> {
    let generator = Generator::new(&cli.config());
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Commands::Generate {
            dir,
            type_name,
            template,
            output,
            extras,
        } => {
            let request = GenerateRequest::new(dir, type_name, template, output).with_extras(extras);
            let outcome = generator.run(&request)?;
            print_outcome(&mut out, &outcome)?;
            Ok(())
        }
        Commands::Batch { manifest } => {
            let manifest = Manifest::load(&manifest)?;
            let report = run_batch(&generator, &manifest);
            for outcome in &report.succeeded {
                print_outcome(&mut out, outcome)?;
            }
            if report.is_success() {
                return Ok(());
            }
            let mut err = io::stderr().lock();
            for failure in &report.failed {
                writeln!(err, "❌ {failure:#}")?;
            }
            bail!(
                "{} of {} targets failed",
                report.failed.len(),
                report.total()
            );
        }
        Commands::Inspect {
            dir,
            type_name,
            format,
        } => {
            let report = generator
                .inspect(&dir, &type_name)
                .with_context(|| format!("cannot process directory {}", dir.display()))?;
            print_report(&mut out, &report, format)
        }
    }
}

fn print_outcome(out: &mut impl Write, outcome: &GenerateOutcome) -> io::Result<()> {
    writeln!(out, "✅ Generated {}", outcome.path.display())?;
    if let Some(warning) = &outcome.format_warning {
        writeln!(out, "⚠️  Written unformatted: {warning}")?;
    }
    Ok(())
}

pub(crate) fn print_report(
    out: &mut impl Write,
    report: &TypeReport,
    format: InspectFormat,
) -> anyhow::Result<()> {
    if format == InspectFormat::Json {
        serde_json::to_writer_pretty(&mut *out, report)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "package {}", report.package)?;
    writeln!(out, "type {}", report.type_name)?;
    let descriptor = &report.descriptor;
    if descriptor.is_empty() {
        writeln!(out, "(no fields or methods)")?;
        return Ok(());
    }
    if !descriptor.fields.is_empty() {
        writeln!(out, "fields:")?;
        for field in &descriptor.fields {
            write!(out, "  {} {}", field.name, field.ty)?;
            if let Some(tag) = &field.tag {
                write!(out, " `{tag}`")?;
            }
            if field.embedded {
                write!(out, " (embedded)")?;
            }
            writeln!(out)?;
        }
    }
    if !descriptor.methods.is_empty() {
        writeln!(out, "methods:")?;
        for method in &descriptor.methods {
            writeln!(out, "  {method}")?;
        }
    }
    Ok(())
}
