//! bale CLI - builds an asset graph into hashed chunks, stylesheets and a
//! manifest.
//!
//! # Architecture
//!
//! - [`cli`] - clap argument definitions
//! - [`config`] - `bale.config.json` loading and layering with figment
//! - [`commands`] - command implementations
//! - [`watch`] - file watcher and the rebuild loop
//! - [`error`] - CLI error types and miette conversion
//! - [`logger`] - tracing subscriber setup
//! - [`ui`] - status lines and the build summary
//!
//! # Example
//!
//! ```rust,no_run
//! use bale_cli::{error::Result, logger};
//!
//! fn main() -> Result<()> {
//!     logger::init_logger(false, false, false);
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;
pub mod watch;

pub use error::{CliError, ConfigError, Result, ResultExt};
