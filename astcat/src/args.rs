use std::path::PathBuf;

use simplelog::LevelFilter;

/// A debug tool for mtail-unparse.
///
/// Inputs are syntax trees encoded as JSON.
#[derive(clap::Parser, Debug)]
pub struct Args {
    /// The most verbose log level printed to stderr.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Prints a syntax tree as program text.
    Unparse {
        /// A path to the input JSON tree.
        path: PathBuf,

        /// Annotate every node with its inferred type.
        #[arg(long)]
        types: bool,
    },

    /// Prints the loaded syntax tree as JSON, with locations and types.
    Dump {
        /// A path to the input JSON tree.
        path: PathBuf,
    },

    /// Compares the program text of a syntax tree with an expected text.
    Diff {
        /// A path to the input JSON tree.
        path: PathBuf,

        /// A path to the expected program text.
        expected: PathBuf,

        /// Annotate every node with its inferred type.
        #[arg(long)]
        types: bool,
    },

    /// Unparses a syntax tree twice and checks that the outputs are equal.
    CheckIdempotence {
        /// A path to the input JSON tree.
        path: PathBuf,
    },
}

pub fn parse() -> Args {
    clap::Parser::parse()
}
