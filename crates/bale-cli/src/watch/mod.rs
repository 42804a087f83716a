//! Watch mode.
//!
//! One loop owns the pipeline. Filesystem events are debounced into a set of
//! paths; a batch that arrives while a rebuild is running cancels it, and
//! the next rebuild starts as soon as the cancelled one returns. Failed and
//! cancelled rebuilds write nothing, so the last good output stays in place.

mod watcher;

pub use watcher::{FileChange, FileWatcher};

use bale_bundler::{CancellationToken, Pipeline, RebuildOutcome};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::config::WatchOptions;
use crate::error::Result;
use crate::ui;

/// Build once, then rebuild on every change under the project root until
/// Ctrl-C.
pub async fn run(pipeline: Pipeline, options: &WatchOptions) -> Result<()> {
    let root = pipeline.config().root.clone();
    let mut ignore = options.ignore.clone();
    // Our own writes must not trigger rebuilds.
    match pipeline.out_dir().strip_prefix(&root) {
        Ok(out) if !out.as_os_str().is_empty() => ignore.push(out.to_string_lossy().into_owned()),
        _ => {}
    }

    let (watcher, changes) = FileWatcher::new(root, ignore)?;
    info!(root = %watcher.root().display(), "watching for changes");

    let debounce = Duration::from_millis(options.debounce_ms);
    tokio::select! {
        _ = rebuild_loop(Arc::new(pipeline), changes, debounce, report) => {}
        _ = tokio::signal::ctrl_c() => {
            ui::info("Stopping watch mode");
        }
    }
    Ok(())
}

/// Drive rebuilds from `changes` until the channel closes.
///
/// The first build starts immediately. `on_outcome` sees every finished
/// rebuild, including cancelled ones. A rebuild still running when the
/// channel closes is awaited.
pub async fn rebuild_loop<F>(
    pipeline: Arc<Pipeline>,
    mut changes: mpsc::Receiver<FileChange>,
    debounce: Duration,
    mut on_outcome: F,
) where
    F: FnMut(&RebuildOutcome),
{
    let (done_tx, mut done_rx) = mpsc::channel::<RebuildOutcome>(1);
    let mut running: Option<CancellationToken> = None;
    let mut pending: Option<BTreeSet<PathBuf>> = Some(BTreeSet::new());
    let mut open = true;

    loop {
        if running.is_none() {
            if let Some(batch) = pending.take() {
                running = Some(spawn_rebuild(&pipeline, batch, done_tx.clone()));
            } else if !open {
                break;
            }
        }

        tokio::select! {
            Some(outcome) = done_rx.recv() => {
                running = None;
                on_outcome(&outcome);
            }
            change = changes.recv(), if open => {
                let Some(change) = change else {
                    open = false;
                    continue;
                };
                let batch = pending.get_or_insert_with(BTreeSet::new);
                batch.insert(change.path().to_path_buf());
                collect_batch(&mut changes, batch, debounce).await;

                if let Some(token) = &running {
                    debug!(changed = batch.len(), "newer changes, cancelling running rebuild");
                    token.cancel();
                }
            }
        }
    }
}

/// Keep adding changes until `quiet` passes without one.
async fn collect_batch(
    changes: &mut mpsc::Receiver<FileChange>,
    batch: &mut BTreeSet<PathBuf>,
    quiet: Duration,
) {
    while let Ok(Some(change)) = tokio::time::timeout(quiet, changes.recv()).await {
        batch.insert(change.path().to_path_buf());
    }
}

fn spawn_rebuild(
    pipeline: &Arc<Pipeline>,
    batch: BTreeSet<PathBuf>,
    done: mpsc::Sender<RebuildOutcome>,
) -> CancellationToken {
    let token = CancellationToken::new();
    let pipeline = Arc::clone(pipeline);
    let cancel = token.clone();
    let changed: Vec<PathBuf> = batch.into_iter().collect();

    tokio::spawn(async move {
        if !changed.is_empty() {
            ui::info(&format!("Rebuilding: {}", describe(&changed, pipeline.config().root.as_path())));
        }
        let outcome = pipeline.rebuild(&changed, &cancel).await;
        let _ = done.send(outcome).await;
    });
    token
}

fn describe(changed: &[PathBuf], root: &Path) -> String {
    let mut names: Vec<String> = changed
        .iter()
        .take(3)
        .map(|path| path.strip_prefix(root).unwrap_or(path).display().to_string())
        .collect();
    if changed.len() > 3 {
        names.push(format!("and {} more", changed.len() - 3));
    }
    names.join(", ")
}

fn report(outcome: &RebuildOutcome) {
    match outcome {
        RebuildOutcome::Built(report) => {
            ui::success(&format!(
                "Built {} files from {} modules in {}",
                report.files.len(),
                report.module_count,
                ui::format_duration(report.duration)
            ));
        }
        RebuildOutcome::Failed(errors) => {
            for error in errors {
                ui::error(&error.to_string());
            }
            ui::warning("Rebuild failed, previous output kept");
        }
        RebuildOutcome::Cancelled => debug!("rebuild superseded"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_truncates() {
        let root = Path::new("/p");
        let changed: Vec<PathBuf> = ["a.js", "b.js", "c.js", "d.js", "e.js"]
            .iter()
            .map(|name| root.join(name))
            .collect();
        assert_eq!(describe(&changed, root), "a.js, b.js, c.js, and 2 more");
        assert_eq!(describe(&changed[..1], root), "a.js");
    }
}
