use clap::{Args, Parser, Subcommand};
use stmtfx_decl::InputSpec;
use stmtfx_kernel::{LineEnding, StructKind};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "stmtfx",
    about = "stmtfx: merge SQL statement declarations into one typed query interface",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where declaration files come from.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Declaration files, read in the order given
    #[arg(value_name = "FILES", conflicts_with = "sql")]
    pub files: Vec<PathBuf>,

    /// Scan a directory recursively for .sql files instead
    #[arg(long, value_name = "DIR")]
    pub sql: Option<PathBuf>,
}

impl InputArgs {
    pub fn into_spec(self) -> InputSpec {
        match self.sql {
            Some(dir) => InputSpec::Directory(dir),
            None => InputSpec::Files(self.files),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Merge declarations and write the generated query interface
    Generate {
        /// Existing directory the generated file is placed under
        out_dir: PathBuf,

        /// Namespaced output name, segments separated by `\` or `.`
        output_name: String,

        #[command(flatten)]
        inputs: InputArgs,

        /// Prefix stripped from generated method names
        #[arg(long, default_value = "")]
        prefix: String,

        /// Line ending: lf or crlf (defaults to the platform's)
        #[arg(long)]
        eol: Option<LineEnding>,

        /// Indent with N spaces instead of a tab
        #[arg(long, value_name = "N")]
        spaces: Option<usize>,

        /// Container kind: interface, class, final-class, abstract-class or trait
        #[arg(long = "struct", value_name = "KIND", default_value = "interface")]
        structure: StructKind,
    },

    /// Parse and merge declarations without writing anything
    Check {
        #[command(flatten)]
        inputs: InputArgs,

        /// Prefix stripped from generated method names
        #[arg(long, default_value = "")]
        prefix: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_parses_formatting_flags() {
        let cli = Cli::try_parse_from([
            "stmtfx", "generate", "out", "App.Queries", "a.sql", "b.sql", "--eol", "crlf",
            "--spaces", "2", "--struct", "final-class",
        ])
        .expect("arguments should parse");
        match cli.command {
            Commands::Generate {
                out_dir,
                output_name,
                inputs,
                eol,
                spaces,
                structure,
                ..
            } => {
                assert_eq!(out_dir, PathBuf::from("out"));
                assert_eq!(output_name, "App.Queries");
                assert_eq!(
                    inputs.into_spec(),
                    InputSpec::Files(vec![PathBuf::from("a.sql"), PathBuf::from("b.sql")])
                );
                assert_eq!(eol, Some(LineEnding::CrLf));
                assert_eq!(spaces, Some(2));
                assert_eq!(structure, StructKind::FinalClass);
            }
            Commands::Check { .. } => panic!("expected generate"),
        }
    }

    #[test]
    fn files_and_sql_directory_are_exclusive() {
        let result = Cli::try_parse_from(["stmtfx", "check", "a.sql", "--sql", "dir"]);
        assert!(result.is_err());

        let cli = Cli::try_parse_from(["stmtfx", "check", "--sql", "dir", "--json"])
            .expect("arguments should parse");
        match cli.command {
            Commands::Check { inputs, json, .. } => {
                assert!(json);
                assert_eq!(inputs.into_spec(), InputSpec::Directory(PathBuf::from("dir")));
            }
            Commands::Generate { .. } => panic!("expected check"),
        }
    }

    #[test]
    fn rejects_unknown_line_ending() {
        let result = Cli::try_parse_from(["stmtfx", "generate", "out", "Q", "a.sql", "--eol", "cr"]);
        assert!(result.is_err());
    }
}
