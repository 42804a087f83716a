//! `bale build`.

use bale_bundler::{BuildReport, Pipeline};
use bale_graph::runtime::native::NativeRuntime;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::cli::BuildArgs;
use crate::config::ProjectConfig;
use crate::error::{CliError, Result, ResultExt};
use crate::{ui, watch};

/// Execute the build command.
///
/// Loads and validates the configuration, then either builds once or hands
/// the pipeline to watch mode.
pub async fn execute(args: BuildArgs) -> Result<()> {
    let cwd = working_dir(args.cwd.as_deref())?;

    let project = ProjectConfig::load(&args, &cwd)?;
    project.validate()?;

    let pipeline = Pipeline::new(project.to_build_config(), Arc::new(NativeRuntime::new()))?;

    if args.watch {
        ui::info(&format!(
            "Watching {} ({} mode)",
            project.root.display(),
            project.config.mode
        ));
        return watch::run(pipeline, &project.config.watch).await;
    }

    ui::info(&format!(
        "Building {} {} ({} mode)",
        project.config.entry.len(),
        if project.config.entry.len() == 1 { "entry" } else { "entries" },
        project.config.mode
    ));
    let report = pipeline.build().await?;
    print_report(&report, pipeline.out_dir());
    Ok(())
}

/// The process directory, or `--cwd` joined onto it.
fn working_dir(dir: Option<&Path>) -> Result<PathBuf> {
    let cwd = std::env::current_dir().context("Failed to read the current directory")?;
    let Some(dir) = dir else {
        return Ok(cwd);
    };

    let dir = cwd.join(dir);
    let metadata = std::fs::metadata(&dir)
        .with_path(&dir)
        .with_hint("--cwd must name an existing directory")?;
    if !metadata.is_dir() {
        return Err(CliError::Custom(format!(
            "--cwd {} is not a directory",
            dir.display()
        )));
    }
    Ok(dir)
}

fn print_report(report: &BuildReport, out_dir: &Path) {
    ui::print_build_summary(report);
    ui::success(&format!(
        "Wrote {} files to {}",
        report.files.len(),
        out_dir.display()
    ));
}
