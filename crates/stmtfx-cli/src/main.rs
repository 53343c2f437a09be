//! stmtfx CLI: the `stmtfx` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    support::init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            out_dir,
            output_name,
            inputs,
            prefix,
            eol,
            spaces,
            structure,
        } => commands::generate::run(commands::generate::Args {
            out_dir,
            output_name,
            inputs: inputs.into_spec(),
            prefix,
            eol,
            spaces,
            structure,
        }),

        Commands::Check {
            inputs,
            prefix,
            json,
        } => commands::check::run(inputs.into_spec(), prefix, json),
    }
}
