//! Terminal output: status lines and the build summary.
//!
//! Everything goes to stderr. Colors follow `NO_COLOR`/`FORCE_COLOR` and
//! terminal detection.

mod format;
mod messages;

pub use format::{format_duration, format_size, print_build_summary};
pub use messages::{error, info, success, warning};

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"]
        .iter()
        .any(|var| std::env::var_os(var).is_some())
}

/// Check if color output should be enabled for stderr.
pub fn should_use_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if std::env::var_os("FORCE_COLOR").is_some() {
        return true;
    }
    console::user_attended_stderr() && !is_ci()
}

/// Apply the color decision to `console` styling on stderr.
pub fn init_colors() {
    console::set_colors_enabled_stderr(should_use_color());
}
