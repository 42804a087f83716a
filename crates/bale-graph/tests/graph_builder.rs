//! Integration tests for graph construction.
//!
//! Uses a line-based loader: every line of the form `import "<spec>"` is an
//! import, and a line reading `!error` fails the `parse` stage.

use bale_graph::test_utils::TestRuntime;
use bale_graph::{
    AssetKind, CancellationToken, EntryPoint, Error, GraphBuilder, LoadOutput, LoaderError,
    ModuleLoader, ResolveConfig, Resolver,
};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

struct LineLoader;

impl ModuleLoader for LineLoader {
    fn load(&self, path: &Path, _kind: AssetKind, source: &[u8]) -> Result<LoadOutput, LoaderError> {
        let text = String::from_utf8_lossy(source);
        let mut imports = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line == "!error" {
                return Err(LoaderError::new("parse", path, "unexpected token"));
            }
            if let Some(rest) = line.strip_prefix("import ") {
                imports.push(rest.trim_matches(|c| c == '"' || c == ';').to_string());
            }
        }
        Ok(LoadOutput {
            code: text.into_owned(),
            imports,
            side_outputs: Vec::new(),
        })
    }
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn builder(root: &Path, runtime: Arc<TestRuntime>) -> GraphBuilder {
    let resolver = Resolver::new(ResolveConfig::default(), runtime.clone());
    GraphBuilder::new(runtime, resolver, Arc::new(LineLoader), root, root.join("src"))
}

#[tokio::test]
async fn test_cycle_builds_with_exactly_three_edges() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/a.js", "import \"./b\"");
    write(root, "src/b.js", "import \"./c\"");
    write(root, "src/c.js", "import \"./a\"");

    let runtime = Arc::new(TestRuntime::new(root));
    let outcome = builder(root, runtime)
        .build(&[EntryPoint::new("main", "./a")], &CancellationToken::new())
        .await
        .unwrap();

    assert!(outcome.is_ok());
    assert_eq!(outcome.graph.len(), 3);
    assert_eq!(outcome.graph.edge_count(), 3);

    let edges: Vec<(String, String)> = outcome
        .graph
        .edges()
        .into_iter()
        .map(|e| (e.from.name().to_string(), e.to.name().to_string()))
        .collect();
    assert!(edges.contains(&("src/a.js".into(), "src/b.js".into())));
    assert!(edges.contains(&("src/b.js".into(), "src/c.js".into())));
    assert!(edges.contains(&("src/c.js".into(), "src/a.js".into())));
}

#[tokio::test]
async fn test_shared_module_is_loaded_once() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/main.js", "import \"./left\"\nimport \"./right\"");
    write(root, "src/left.js", "import \"./shared\"");
    write(root, "src/right.js", "import \"./shared\"\nimport \"./shared\"");
    write(root, "src/shared.js", "");

    let runtime = Arc::new(TestRuntime::new(root));
    let outcome = builder(root, runtime.clone())
        .build(&[EntryPoint::new("main", "./main")], &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.graph.len(), 4);
    // right.js imports shared twice through the same specifier: one edge
    assert_eq!(outcome.graph.edge_count(), 4);
    assert_eq!(runtime.read_count(&root.join("src/shared.js")), 1);

    let order: Vec<String> = outcome
        .graph
        .modules()
        .iter()
        .map(|m| m.id.name().to_string())
        .collect();
    assert_eq!(
        order,
        vec!["src/shared.js", "src/left.js", "src/right.js", "src/main.js"]
    );
}

#[tokio::test]
async fn test_bare_imports_are_recorded_as_externals() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/index.jsx", "import \"react\"\nimport \"jquery\"");

    let runtime = Arc::new(TestRuntime::new(root));
    let outcome = builder(root, runtime)
        .build(&[EntryPoint::new("main", "./index")], &CancellationToken::new())
        .await
        .unwrap();

    let externals: Vec<String> = outcome
        .graph
        .external_dependencies()
        .into_iter()
        .map(|d| d.specifier)
        .collect();
    assert_eq!(externals, vec!["react", "jquery"]);
    assert_eq!(outcome.graph.edge_count(), 0);
}

#[tokio::test]
async fn test_resolution_failure_aborts_only_that_entry() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/good.js", "");
    write(root, "src/bad.js", "import \"./nowhere\"");

    let runtime = Arc::new(TestRuntime::new(root));
    let outcome = builder(root, runtime)
        .build(
            &[EntryPoint::new("bad", "./bad"), EntryPoint::new("good", "./good")],
            &CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].entry, "bad");
    match &outcome.failures[0].error {
        Error::Resolution(err) => {
            assert_eq!(err.specifier, "./nowhere");
            assert_eq!(err.from_dir, root.join("src"));
        }
        other => panic!("expected resolution error, got {other:?}"),
    }

    let entries: Vec<String> = outcome
        .graph
        .entry_points()
        .into_iter()
        .map(|(name, _)| name)
        .collect();
    assert_eq!(entries, vec!["good"]);
    assert_eq!(outcome.graph.len(), 1);

    let err = outcome.into_result().unwrap_err();
    assert!(matches!(err, Error::Resolution(_)));
}

#[tokio::test]
async fn test_loader_error_carries_stage_and_path() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/main.js", "import \"./broken\"");
    write(root, "src/broken.js", "!error");

    let runtime = Arc::new(TestRuntime::new(root));
    let builder = builder(root, runtime);
    let outcome = builder
        .build(&[EntryPoint::new("main", "./main")], &CancellationToken::new())
        .await
        .unwrap();

    match &outcome.failures[0].error {
        Error::Loader(err) => {
            assert_eq!(err.stage, "parse");
            assert_eq!(err.path, root.join("src/broken.js"));
        }
        other => panic!("expected loader error, got {other:?}"),
    }
    // the errored module is never cached
    assert!(builder.cache().get(&root.join("src/broken.js")).is_none());
}

#[tokio::test]
async fn test_rebuild_reloads_only_invalidated_modules() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/main.js", "import \"./dep\"");
    write(root, "src/dep.js", "");

    let runtime = Arc::new(TestRuntime::new(root));
    let builder = builder(root, runtime.clone());
    let entries = [EntryPoint::new("main", "./main")];

    builder.build(&entries, &CancellationToken::new()).await.unwrap();
    write(root, "src/dep.js", "import \"./extra\"");
    write(root, "src/extra.js", "");
    builder.invalidate([root.join("src/dep.js").as_path()]);

    let outcome = builder.build(&entries, &CancellationToken::new()).await.unwrap();

    assert_eq!(outcome.graph.len(), 3);
    assert_eq!(runtime.read_count(&root.join("src/main.js")), 1);
    assert_eq!(runtime.read_count(&root.join("src/dep.js")), 2);
}

#[tokio::test]
async fn test_cancelled_walk_stops_before_loading() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    write(root, "src/main.js", "");

    let runtime = Arc::new(TestRuntime::new(root));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = builder(root, runtime.clone())
        .build(&[EntryPoint::new("main", "./main")], &cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Cancelled));
    assert_eq!(runtime.read_count(&root.join("src/main.js")), 0);
}
