//! cfbuild - module-oriented policy build tool
//!
//! Assembles a policy set from versioned modules listed in an index,
//! stores module input next to the manifest and records every change to
//! the project in git.

use clap::Parser;
use miette::Diagnostic;

mod build;
mod cli;
mod commands;
mod config;
mod domain;
mod error;
mod history;
mod input;
mod logging;
mod operations;
mod project;
mod resolver;
mod transaction;
mod ui;

use cli::{Cli, Commands};
use error::CfError;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let project = cli.project;
    let result = match cli.command {
        Commands::Init(args) => commands::init::run(project, args),
        Commands::Add(args) => commands::add::run(project, args),
        Commands::Remove(args) => commands::remove::run(project, args),
        Commands::SetInput(args) => commands::input::run_set(project, args),
        Commands::GetInput(args) => commands::input::run_get(project, args),
        Commands::Build(args) => commands::build::run(project, args),
        Commands::List(args) => commands::list::run(project, args),
        Commands::Info(args) => commands::info::run(project, args),
        Commands::Validate(args) => commands::validate::run(project, args),
        Commands::Version => commands::version::run(),
    };

    if let Err(e) = result {
        report_error(&e);
        std::process::exit(1);
    }
}

fn report_error(e: &CfError) {
    eprintln!("Error: {}", e);
    if let Some(help) = e.help() {
        eprintln!("Help: {}", help);
    }
}
