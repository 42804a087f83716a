//! Chunk rendering.
//!
//! A chunk file is the runtime prelude followed by one `register` call per
//! module. Entry chunks end with a `load` of their entry module. The prelude
//! is idempotent, so every chunk carries it and load order between chunks
//! only matters for the final `load`.

use bale_graph::{Module, ModuleGraph};
use rustc_hash::FxHashMap;

use crate::loaders::script::js_string;
use crate::split::{Chunk, ChunkKind};

/// Module registry shared by all chunks on a page.
///
/// `require` looks the specifier up in the module's dependency map; a
/// specifier mapped to `null` is external and read from
/// `globalThis.__bale_externals__`.
pub(crate) const RUNTIME: &str = r#"(function (g) {
  if (g.__bale__) return;
  var defs = {}, cache = {}, has = Object.prototype.hasOwnProperty;
  function load(id) {
    if (has.call(cache, id)) return cache[id].exports;
    var def = defs[id];
    if (!def) throw new Error("bale: module " + id + " is not registered");
    var module = (cache[id] = { exports: {} });
    def.fn.call(module.exports, module, module.exports, function (spec) {
      var target = def.deps[spec];
      if (target) return load(target);
      var externals = g.__bale_externals__ || {};
      if (has.call(externals, spec)) return externals[spec];
      throw new Error("bale: cannot find " + spec + " from " + id);
    });
    return module.exports;
  }
  function define(exports, key, get) {
    Object.defineProperty(exports, key, { enumerable: true, get: get });
  }
  g.__bale__ = {
    register: function (id, deps, fn) { defs[id] = { deps: deps, fn: fn }; },
    load: load,
    r: function (exports) { Object.defineProperty(exports, "__esModule", { value: true }); },
    d: function (exports, getters) {
      for (var key in getters) if (!has.call(exports, key)) define(exports, key, getters[key]);
    },
    s: function (exports, from) {
      Object.keys(from).forEach(function (key) {
        if (key !== "default" && !has.call(exports, key)) define(exports, key, function () { return from[key]; });
      });
    },
    i: function (m) { return m && m.__esModule ? m : { default: m }; }
  };
})(typeof globalThis !== "undefined" ? globalThis : self);
"#;

/// Rendered chunk code plus where each module body starts.
pub(crate) struct RenderedChunk<'a> {
    pub code: String,
    /// First generated line (0-based) of each module body.
    pub bodies: Vec<(u32, &'a Module)>,
}

pub(crate) fn render_chunk<'a>(chunk: &'a Chunk, graph: &ModuleGraph) -> RenderedChunk<'a> {
    let mut out = LineWriter::default();
    out.push(RUNTIME);

    let mut bodies = Vec::with_capacity(chunk.modules.len());
    for module in &chunk.modules {
        out.push(&format!(
            "__bale__.register({}, {}, function (module, exports, require) {{\n",
            js_string(module.id.name()),
            deps_object(module, graph)
        ));
        bodies.push((out.line, module.as_ref()));
        out.push(&module.code);
        if !module.code.is_empty() && !module.code.ends_with('\n') {
            out.push("\n");
        }
        out.push("});\n");
    }

    if let ChunkKind::Entry { entry } = &chunk.kind {
        out.push(&format!("__bale__.load({});\n", js_string(entry.name())));
    }

    RenderedChunk {
        code: out.code,
        bodies,
    }
}

/// `{"./a": "src/a.js", "react": null}` in import order.
fn deps_object(module: &Module, graph: &ModuleGraph) -> String {
    let targets: FxHashMap<String, String> = graph
        .import_targets(&module.id)
        .into_iter()
        .map(|(specifier, id)| (specifier, id.name().to_string()))
        .collect();

    let entries: Vec<String> = module
        .imports
        .iter()
        .map(|specifier| {
            let target = targets
                .get(specifier)
                .map_or_else(|| "null".to_string(), |name| js_string(name));
            format!("{}: {}", js_string(specifier), target)
        })
        .collect();
    format!("{{{}}}", entries.join(", "))
}

#[derive(Default)]
struct LineWriter {
    code: String,
    line: u32,
}

impl LineWriter {
    fn push(&mut self, text: &str) {
        self.line += text.matches('\n').count() as u32;
        self.code.push_str(text);
    }
}
