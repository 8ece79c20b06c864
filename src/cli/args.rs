//! Defines the command-line arguments and subcommands for the thriftstub CLI.
//!
//! Uses `clap` with its "derive" feature. Global flags override the values
//! loaded from `--config`.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "thriftstub",
    version,
    about = "Parse, check and canonically format generated Thrift type stubs."
)]
pub struct StubArgs {
    /// YAML configuration file.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Treat structural inconsistencies as errors.
    #[arg(long, global = true)]
    pub strict: bool,

    /// Disable colored output.
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a stub file and print its document model.
    Parse {
        #[arg(required = true)]
        file: PathBuf,
        /// Serialization format of the printed document.
        #[arg(long, value_enum, default_value_t = DocumentFormat::Json)]
        format: DocumentFormat,
    },
    /// Print canonical text, or check or rewrite files in place.
    Format {
        /// A stub file or a directory to search for stub files.
        #[arg(required = true)]
        path: PathBuf,
        /// Show a diff for every file that is not canonical and exit 1.
        #[arg(long, conflicts_with = "write")]
        check: bool,
        /// Rewrite non-canonical files in place.
        #[arg(long)]
        write: bool,
    },
    /// List structural inconsistencies and exit 1 if there are any.
    Check {
        #[arg(required = true)]
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_well_formed() {
        StubArgs::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let args =
            StubArgs::try_parse_from(["thriftstub", "check", "stubs", "--strict", "-vv"]).unwrap();
        assert!(args.strict);
        assert_eq!(args.verbose, 2);
        assert!(matches!(args.command, Command::Check { .. }));
    }

    #[test]
    fn check_and_write_conflict() {
        let parsed =
            StubArgs::try_parse_from(["thriftstub", "format", "a.pyi", "--check", "--write"]);
        assert!(parsed.is_err());
    }
}
