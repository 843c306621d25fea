//! Print the composed GraphQL document of a template.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde_json::json;

use super::OutputFormat;
use crate::config::Settings;
use crate::resolver::GraphResolver;
use crate::templating::Environment;

/// Print the document a render of TEMPLATE would execute.
#[derive(Args, Debug)]
pub struct ComposeCommand {
    /// Template id, e.g. `article.html.tera` or `#teaser`
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ComposeCommand {
    /// # Errors
    ///
    /// Returns an error if the template does not exist or fails to compile.
    pub fn execute(self, settings: &Settings) -> Result<()> {
        let environment = Environment::from_settings(settings);
        super::compile_template(&environment, &self.template)?;
        let composition = GraphResolver::new(&environment).compose(&self.template);

        match self.format {
            OutputFormat::Json => {
                let output = json!({
                    "template": self.template,
                    "sources": composition.sources().collect::<Vec<_>>(),
                    "variables": composition.variables(),
                    "has_operations": composition.has_operations(),
                    "document": composition.document(),
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Text if composition.is_empty() => {
                eprintln!("{} '{}' has no GraphQL query", "note:".yellow(), self.template);
            }
            OutputFormat::Text => println!("{}", composition.document()),
        }
        Ok(())
    }
}
