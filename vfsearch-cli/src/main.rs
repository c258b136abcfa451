//! vfsearch CLI - Command-line interface
//!
//! Builds a resolver from the configuration file and command-line options,
//! then answers lookups against it.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};

use crate::error::CliError;
use crate::runner::{init_logging, parse_patch, CliRunner, SetupArgs};

#[derive(Debug, Parser)]
#[command(name = "vfsearch", version, about = "Look up game resources across directories, archives and patches")]
struct Cli {
    /// Configuration file (defaults to <config dir>/vfsearch/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Root directory for relative names
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Directory discovery depth (0 = immediate files only)
    #[arg(long, global = true)]
    depth: Option<usize>,

    /// Directory to scan (repeatable, lowest priority first)
    #[arg(long = "dir", global = true)]
    dirs: Vec<String>,

    /// Directory to mount as a named archive (repeatable)
    #[arg(long = "archive", global = true)]
    archives: Vec<String>,

    /// Bulk index to load (repeatable)
    #[arg(long = "index", global = true)]
    indexes: Vec<String>,

    /// Patch as SRC=DST (repeatable, applied last)
    #[arg(long = "patch", global = true, value_parser = parse_patch)]
    patches: Vec<(String, PathBuf)>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List registered names and their sources
    List {
        /// Only show names matching this glob (case-insensitive)
        #[arg(long)]
        pattern: Option<String>,

        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show which source a name resolves to
    Which {
        /// Logical resource name
        name: String,
    },

    /// Write the content of a name to stdout
    Cat {
        /// Logical resource name
        name: String,
    },

    /// Exit successfully only if a name resolves to openable content
    Check {
        /// Logical resource name
        name: String,
    },
}

impl Cli {
    fn setup_args(&self) -> SetupArgs {
        SetupArgs {
            config: self.config.clone(),
            root: self.root.clone(),
            depth: self.depth,
            dirs: self.dirs.clone(),
            archives: self.archives.clone(),
            indexes: self.indexes.clone(),
            patches: self.patches.clone(),
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let runner = CliRunner::new(&cli.setup_args())?;
    let resolver = runner.resolver();

    match &cli.command {
        Commands::List { pattern, json } => {
            runner.log_startup("list");
            commands::list::run(resolver, pattern.as_deref(), *json)
        }
        Commands::Which { name } => {
            runner.log_startup("which");
            commands::lookup::run_which(resolver, name)
        }
        Commands::Cat { name } => {
            runner.log_startup("cat");
            commands::lookup::run_cat(resolver, name)
        }
        Commands::Check { name } => {
            runner.log_startup("check");
            commands::lookup::run_check(resolver, name)
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_global_options() {
        let cli = Cli::try_parse_from([
            "vfsearch",
            "--root",
            "/games",
            "--depth",
            "0",
            "--dir",
            "data1",
            "--dir",
            "data2",
            "--patch",
            "a.txt=/fix/a.txt",
            "-vv",
            "which",
            "a.txt",
        ])
        .unwrap();

        let args = cli.setup_args();
        assert_eq!(args.root, Some(PathBuf::from("/games")));
        assert_eq!(args.depth, Some(0));
        assert_eq!(args.dirs, vec!["data1", "data2"]);
        assert_eq!(
            args.patches,
            vec![("a.txt".to_string(), PathBuf::from("/fix/a.txt"))]
        );
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Which { ref name } if name == "a.txt"));
    }

    #[test]
    fn test_invalid_patch_rejected() {
        let result = Cli::try_parse_from(["vfsearch", "--patch", "nope", "list"]);
        assert!(result.is_err());
    }
}
