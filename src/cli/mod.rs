// CLI module
// Command-line interface and argument parsing

mod args;

pub use args::{CliArgs, Provider};

use clap::Parser;

/// Parse command-line arguments using clap
///
/// Missing required arguments, an unknown provider or the --help flag make
/// clap print a message and exit before the import pipeline runs.
pub fn parse_args() -> CliArgs {
    CliArgs::parse()
}
