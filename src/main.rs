//! `tgql`: compile, inspect and render Tera templates with embedded GraphQL queries.

use anyhow::Result;
use clap::Parser;
use tera_graphql::cli;
use tera_graphql::core::user_friendly_error;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            user_friendly_error(e).display();
            std::process::exit(1);
        }
    }
}
