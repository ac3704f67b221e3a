//! pagebars - render HTML pages as Handlebars templates.

mod cli;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands, project::Project};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    pagebars::logger::set_verbose(cli.verbose);

    let project = Project::discover(&cli.config, &std::env::current_dir()?)?;

    match cli.command {
        Commands::Build => cli::build::build_site(&project),
        Commands::Watch => cli::watch::watch_site(&project),
    }
}
