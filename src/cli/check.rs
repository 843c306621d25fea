//! Compile every template of the project and report problems.

use anyhow::{Result, bail};
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::OutputFormat;
use crate::config::Settings;
use crate::resolver::GraphDiagnostics;
use crate::templating::Environment;

/// Compile all templates, reporting syntax errors, missing references and cycles.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Debug, Default, Serialize)]
struct CheckReport {
    valid: bool,
    templates: usize,
    errors: Vec<CheckFailure>,
    warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct CheckFailure {
    template: String,
    message: String,
}

impl CheckCommand {
    /// # Errors
    ///
    /// Returns an error if the templates cannot be listed, any template fails to
    /// compile, or `--strict` is set and there are warnings.
    pub fn execute(self, settings: &Settings, quiet: bool) -> Result<()> {
        let environment = Environment::from_settings(settings);
        let mut names = environment.names()?;
        names.sort();

        let mut report = CheckReport {
            templates: names.len(),
            ..CheckReport::default()
        };
        let mut compiled = Vec::with_capacity(names.len());
        for name in names {
            match environment.compile(&name) {
                Ok(_) => compiled.push(name),
                Err(e) => report.errors.push(CheckFailure {
                    template: name,
                    message: e.to_string(),
                }),
            }
        }

        report.warnings = GraphDiagnostics::build(&environment, &compiled).warnings();
        report.valid = report.errors.is_empty() && !(self.strict && !report.warnings.is_empty());
        tracing::info!(
            "Checked {} template(s): {} error(s), {} warning(s)",
            report.templates,
            report.errors.len(),
            report.warnings.len()
        );

        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
            OutputFormat::Text => print_report(&report, quiet),
        }

        if !report.errors.is_empty() {
            bail!("{} of {} template(s) failed to compile", report.errors.len(), report.templates);
        }
        if !report.valid {
            bail!("{} warning(s) in strict mode", report.warnings.len());
        }
        Ok(())
    }
}

fn print_report(report: &CheckReport, quiet: bool) {
    for failure in &report.errors {
        println!("{} {}", "✗".red(), failure.message);
    }
    for warning in &report.warnings {
        println!("{} {}", "⚠".yellow(), warning);
    }
    if report.valid && !quiet {
        println!("{} {} template(s) OK", "✓".green(), report.templates);
    }
}
