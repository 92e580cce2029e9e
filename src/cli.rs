//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::domain::ModuleRef;

/// cfbuild - module-oriented policy build tool
///
/// Assemble a policy set from reusable modules with every change recorded in git.
#[derive(Parser, Debug)]
#[command(
    name = "cfbuild",
    author,
    version,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Module-oriented build tool for policy sets",
    long_about = "cfbuild assembles a policy set from modules listed in an index. \
                  It pins module versions in cfbuild.json, resolves dependencies, \
                  stores module input next to the manifest and commits every change to git.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  cfbuild init --index ./index.json\n    \
                  cfbuild add delete-files\n    \
                  cfbuild get-input delete-files - > input.json\n    \
                  cfbuild set-input delete-files input.json\n    \
                  cfbuild build"
)]
pub struct Cli {
    /// Project directory (defaults to the nearest directory with cfbuild.json)
    #[arg(long, short = 'p', global = true, env = "CFBUILD_PROJECT")]
    pub project: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project
    Init(InitArgs),

    /// Add modules and their dependencies
    Add(AddArgs),

    /// Remove modules and dependencies nothing else needs
    Remove(RemoveArgs),

    /// Store answers for a module's questions
    SetInput(SetInputArgs),

    /// Print a module's answers (or a document to fill in)
    GetInput(GetInputArgs),

    /// Build the project into out/masterfiles
    Build(BuildArgs),

    /// List the project's modules in build order
    List(ListArgs),

    /// Show a module from the index
    Info(InfoArgs),

    /// Check a manifest or index file
    Validate(ValidateArgs),

    /// Show version information
    Version,
}

/// Arguments for the init command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Create a project using a local index:\n    cfbuild init --index ./index.json\n\n\
                  Create a project in another directory:\n    cfbuild -p ./my-policy init --name my-policy")]
pub struct InitArgs {
    /// Project name (defaults to the directory name)
    #[arg(long)]
    pub name: Option<String>,

    /// Project description
    #[arg(long)]
    pub description: Option<String>,

    /// Module index: a path relative to the project, or a URL
    #[arg(long)]
    pub index: Option<String>,
}

/// Arguments for the add command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Add the latest version of a module:\n    cfbuild add delete-files\n\n\
                  Add an exact version:\n    cfbuild add delete-files@0.0.1\n\n\
                  Add several modules in one commit:\n    cfbuild add autorun delete-files")]
pub struct AddArgs {
    /// Modules as name or name@version
    #[arg(required = true, value_name = "MODULE")]
    pub modules: Vec<ModuleRef>,
}

/// Arguments for the remove command
#[derive(Parser, Debug)]
pub struct RemoveArgs {
    /// Module names
    #[arg(required = true, value_name = "MODULE")]
    pub modules: Vec<String>,
}

/// Arguments for the set-input command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Read answers from a file:\n    cfbuild set-input delete-files input.json\n\n\
                  Round trip through standard streams:\n    cfbuild get-input delete-files - | cfbuild set-input delete-files -")]
pub struct SetInputArgs {
    /// Module name
    pub module: String,

    /// Answer document, or '-' for standard input
    pub file: String,
}

/// Arguments for the get-input command
#[derive(Parser, Debug)]
pub struct GetInputArgs {
    /// Module name
    pub module: String,

    /// Output file, or '-' for standard output (default)
    #[arg(default_value = "-")]
    pub file: String,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Do not show a progress bar
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

/// Arguments for the list command
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Show dependencies and who added each module
    #[arg(long)]
    pub detailed: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Module as name or name@version
    pub module: ModuleRef,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Validate the project manifest:\n    cfbuild validate\n\n\
                  Validate an index file:\n    cfbuild validate index.json")]
pub struct ValidateArgs {
    /// File to check (defaults to the project's cfbuild.json)
    pub file: Option<PathBuf>,

    /// Also require a buildable "build" list
    #[arg(long)]
    pub build: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_add() {
        let cli = Cli::try_parse_from(["cfbuild", "add", "autorun", "delete-files@0.0.1"]).unwrap();
        match cli.command {
            Commands::Add(args) => {
                assert_eq!(
                    args.modules,
                    vec![
                        ModuleRef::new("autorun", None),
                        ModuleRef::pinned("delete-files", "0.0.1"),
                    ]
                );
            }
            _ => panic!("Expected Add command"),
        }
    }

    #[test]
    fn test_cli_parsing_add_requires_module() {
        assert!(Cli::try_parse_from(["cfbuild", "add"]).is_err());
        assert!(Cli::try_parse_from(["cfbuild", "add", "@1.0.0"]).is_err());
    }

    #[test]
    fn test_cli_parsing_get_input_defaults_to_stdout() {
        let cli = Cli::try_parse_from(["cfbuild", "get-input", "delete-files"]).unwrap();
        match cli.command {
            Commands::GetInput(args) => {
                assert_eq!(args.module, "delete-files");
                assert_eq!(args.file, "-");
            }
            _ => panic!("Expected GetInput command"),
        }
    }

    #[test]
    fn test_cli_parsing_global_options() {
        let cli =
            Cli::try_parse_from(["cfbuild", "list", "-p", "/tmp/project", "-v"]).unwrap();
        assert_eq!(cli.project, Some(PathBuf::from("/tmp/project")));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_cli_parsing_set_input() {
        let cli = Cli::try_parse_from(["cfbuild", "set-input", "delete-files", "-"]).unwrap();
        match cli.command {
            Commands::SetInput(args) => {
                assert_eq!(args.module, "delete-files");
                assert_eq!(args.file, "-");
            }
            _ => panic!("Expected SetInput command"),
        }
    }
}
