//! Formatting for sizes, durations and the build summary.

use bale_bundler::{BuildReport, FileKind};
use console::Term;
use owo_colors::OwoColorize;
use std::time::Duration;

/// Format a byte count with the largest fitting unit.
///
/// ```
/// use bale_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(500), "500 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// assert_eq!(format_size(1_048_576), "1.00 MB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    let mut unit_idx = 0;
    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a duration as `ms`, seconds or `Xm Ys`.
///
/// ```
/// use std::time::Duration;
/// use bale_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

fn kind_label(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Script => "js",
        FileKind::Stylesheet => "css",
        FileKind::SourceMap => "map",
        FileKind::Asset => "asset",
        FileKind::Copy => "copy",
        FileKind::Html => "html",
        FileKind::Manifest => "manifest",
    }
}

/// Print the written files, chunk layout and totals to stderr.
pub fn print_build_summary(report: &BuildReport) {
    let width = (Term::stderr().size().1 as usize).min(80);

    eprintln!("\n{}", "Build Summary".bold().underline());
    eprintln!("{}", "─".repeat(width));

    let name_width = report
        .files
        .iter()
        .map(|file| file.name.len())
        .max()
        .unwrap_or(0);
    for file in &report.files {
        eprintln!(
            "  {} {:<name_width$} {:>9} {}",
            "▸".blue(),
            file.name.bright_white().bold(),
            format_size(file.size as u64).dimmed(),
            kind_label(file.kind).dimmed(),
            name_width = name_width,
        );
    }

    eprintln!("{}", "─".repeat(width));

    let chunks: Vec<String> = report
        .chunks
        .iter()
        .map(|chunk| format!("{} ({})", chunk.name, chunk.modules))
        .collect();
    eprintln!("  {} {}", "Chunks:".bold(), chunks.join(", "));
    if !report.externals.is_empty() {
        eprintln!("  {} {}", "External:".bold(), report.externals.join(", "));
    }

    let total: u64 = report.files.iter().map(|file| file.size as u64).sum();
    eprintln!(
        "  {} {} from {} modules in {}",
        "Total:".bold(),
        format_size(total).green(),
        report.module_count,
        format_duration(report.duration).green()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "0 B");
        assert_eq!(format_size(1023), "1023 B");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1_572_864), "1.50 MB");
        assert_eq!(format_size(2_147_483_648), "2.00 GB");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_millis(0)), "0ms");
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1000)), "1.00s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }
}
