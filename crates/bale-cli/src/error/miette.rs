//! Conversion of CLI errors into miette reports.

use crate::error::CliError;
use miette::Report;

/// Convert a [`CliError`] into a report for `main`.
///
/// Bundler errors keep their diagnostic code and help text.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Bundle(e) => Report::new(e),
        CliError::Config(e) => miette::miette!("Configuration error: {}", e),
        other => miette::miette!("{}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::miette::Diagnostic as _;
    use bale_bundler::{Error, ResolutionError};
    use std::path::PathBuf;

    #[test]
    fn test_bundler_errors_keep_diagnostic_code() {
        let err = CliError::Bundle(Error::Resolution(ResolutionError {
            specifier: "./missing".into(),
            from_dir: PathBuf::from("/project/src"),
            tried: Vec::new(),
        }));
        let report = cli_error_to_miette(err);
        assert_eq!(
            report.code().map(|code| code.to_string()).as_deref(),
            Some("RESOLUTION_ERROR")
        );
        assert!(report.to_string().contains("./missing"));
    }

    #[test]
    fn test_other_errors_keep_message() {
        let report = cli_error_to_miette(CliError::FileNotFound(PathBuf::from("/p/site")));
        assert_eq!(report.to_string(), "File not found: /p/site");
    }
}
