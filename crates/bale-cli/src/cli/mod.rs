//! Command-line interface definition.
//!
//! # Command Structure
//!
//! - `bale build` - build every entry into the output directory, optionally
//!   watching for changes

mod commands;
pub mod enums;
mod tests;
mod validation;

use clap::Parser;

pub use commands::{BuildArgs, Command};
pub use enums::*;
pub use validation::parse_entry;

/// bale - an asset-graph bundler
#[derive(Parser, Debug)]
#[command(
    name = "bale",
    version,
    about = "Bundle scripts, styles, data and assets into hashed chunks",
    long_about = "bale walks the import graph of each entry point, runs every module through\n\
                  its loader chain (TypeScript, JSX, Sass, CSS, JSON, CSV, XML, images, fonts),\n\
                  splits shared modules into their own chunks and writes content-hashed files\n\
                  plus a manifest."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows every resolved import and loaded module.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}
