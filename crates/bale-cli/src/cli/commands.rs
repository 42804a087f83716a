use clap::{Args, Subcommand};
use std::path::PathBuf;

use super::enums::ModeArg;
use super::validation::parse_entry;

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build the project
    ///
    /// Reads bale.config.json from the working directory (or --config),
    /// applies BALE_* environment variables and the flags below, then
    /// writes chunks, stylesheets, assets and manifest.json.
    Build(BuildArgs),
}

/// Arguments for `bale build`.
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Build mode
    ///
    /// Production hashes filenames, minifies and skips source maps.
    /// Overrides NODE_ENV and the config file.
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Entry point as NAME=PATH (repeatable)
    ///
    /// A bare PATH uses the file stem as the entry name. Entries given here
    /// replace the ones from the config file.
    #[arg(short, long = "entry", value_name = "NAME=PATH", value_parser = parse_entry)]
    pub entry: Vec<(String, String)>,

    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Path to the config file
    ///
    /// Defaults to bale.config.json in the working directory, if present.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Remove the output directory before writing
    #[arg(long)]
    pub clean: bool,

    /// Rebuild when source files change
    #[arg(short, long)]
    pub watch: bool,

    /// Working directory
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,
}
