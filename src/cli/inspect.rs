//! Show the compiled query metadata of a template.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;

use super::OutputFormat;
use crate::config::Settings;
use crate::resolver::{GraphDiagnostics, GraphResolver};
use crate::templating::{Environment, HasQueryMetadata};

/// Show what a template's query block compiled to and which templates it references.
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Template id
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl InspectCommand {
    /// # Errors
    ///
    /// Returns an error if the template does not exist or fails to compile.
    pub fn execute(self, settings: &Settings) -> Result<()> {
        let environment = Environment::from_settings(settings);
        let artifact = super::compile_template(&environment, &self.template)?;
        let resolver = GraphResolver::new(&environment);
        let composition = resolver.compose(&self.template);
        let ancestors = resolver.ancestors(&self.template);
        let diagnostics = GraphDiagnostics::build(&environment, &[self.template.clone()]);

        if self.format == OutputFormat::Json {
            let output = json!({
                "template": artifact.id(),
                "origin": artifact.origin.to_string(),
                "signature": artifact.signature,
                "parent": artifact.parent_id(),
                "ancestors": ancestors,
                "includes": artifact.direct_includes(),
                "variables": artifact.declared_variables(),
                "has_operations": artifact.has_operations(),
                "fragment": artifact.own_fragment(),
                "composition": composition.sources().collect::<Vec<_>>(),
                "warnings": diagnostics.warnings(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        let none = || "-".dimmed().to_string();
        println!("{} {}", "Template:".bold(), artifact.id());
        println!("{} {}", "Origin:".bold(), artifact.origin);
        println!("{} {}", "Signature:".bold(), artifact.signature);
        println!(
            "{} {}",
            "Parent:".bold(),
            artifact.parent_id().map_or_else(none, str::to_string)
        );
        println!("{} {}", "Includes:".bold(), list_or(artifact.direct_includes().iter(), none));
        println!(
            "{} {}",
            "Variables:".bold(),
            list_or(artifact.declared_variables().iter().map(|v| format!("${v}")), none)
        );
        println!(
            "{} {}",
            "Operations:".bold(),
            if artifact.has_operations() { "yes" } else { "no" }
        );

        if !artifact.own_fragment().is_empty() {
            println!("{}", "Query:".bold());
            for line in artifact.own_fragment().lines() {
                println!("  {line}");
            }
        }

        println!("{} {}", "Composed from:".bold(), list_or(composition.sources(), none));
        println!("\n{}", diagnostics.to_tree_string(&self.template).trim_end());

        for warning in diagnostics.warnings() {
            println!("{} {}", "⚠".yellow(), warning);
        }
        Ok(())
    }
}

fn list_or<I, S>(items: I, empty: impl FnOnce() -> String) -> String
where
    I: Iterator<Item = S>,
    S: ToString,
{
    let items: Vec<String> = items.map(|item| item.to_string()).collect();
    if items.is_empty() { empty() } else { items.join(", ") }
}
