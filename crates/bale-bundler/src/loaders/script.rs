//! Script stages: parse, transform, module rewrite, minify.
//!
//! The module rewrite works on statement spans of the top-level program and
//! splices replacement text into the original source, so everything that is
//! not import/export syntax is kept byte for byte.

use std::fmt::Display;
use std::path::Path;

use bale_graph::LoadOutput;
use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, CallExpression, Declaration, ExportDefaultDeclarationKind, Expression,
    ImportDeclarationSpecifier, ModuleExportName, Statement,
};
use oxc_ast_visit::{Visit, walk};
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_semantic::SemanticBuilder;
use oxc_span::{GetSpan, SourceType};
use oxc_transformer::{JsxOptions, JsxRuntime, TransformOptions, Transformer};

/// Local holding the value of `export default <expr>`.
const DEFAULT_LOCAL: &str = "__bale_default";

fn source_type(typescript: bool, jsx: bool) -> SourceType {
    SourceType::mjs().with_typescript(typescript).with_jsx(jsx)
}

fn join_errors<E: Display>(errors: &[E], panicked: bool) -> String {
    if errors.is_empty() && panicked {
        return "parser aborted".to_string();
    }
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub(super) fn check_syntax(source: &str, typescript: bool, jsx: bool) -> Result<(), String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type(typescript, jsx)).parse();
    if ret.panicked || !ret.errors.is_empty() {
        return Err(join_errors(&ret.errors, ret.panicked));
    }
    Ok(())
}

pub(super) fn transform(
    path: &Path,
    source: &str,
    typescript: bool,
    jsx: bool,
) -> Result<String, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, source_type(typescript, jsx)).parse();
    if ret.panicked || !ret.errors.is_empty() {
        return Err(join_errors(&ret.errors, ret.panicked));
    }
    let mut program = ret.program;

    let scoping = SemanticBuilder::new()
        .build(&program)
        .semantic
        .into_scoping();

    let options = TransformOptions {
        jsx: JsxOptions {
            runtime: JsxRuntime::Classic,
            ..JsxOptions::default()
        },
        ..TransformOptions::default()
    };
    let ret = Transformer::new(&allocator, path, &options).build_with_scoping(scoping, &mut program);
    if !ret.errors.is_empty() {
        return Err(join_errors(&ret.errors, false));
    }

    Ok(Codegen::new().build(&program).code)
}

pub(super) fn minify(code: &str) -> Result<String, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, code, SourceType::cjs()).parse();
    if ret.panicked || !ret.errors.is_empty() {
        return Err(join_errors(&ret.errors, ret.panicked));
    }
    Ok(Codegen::new()
        .with_options(CodegenOptions::minify())
        .build(&ret.program)
        .code)
}

/// Rewrite ESM syntax into code for `function (module, exports, require)`.
///
/// - `import x, {a as b} from "s"` binds `x` and `b` from `require("s")`
///   (named imports are snapshots taken when the import runs)
/// - `import "s"` becomes `require("s");`
/// - exported declarations lose `export` and get a live getter on `exports`
/// - `export default <expr>` is stored in a local with a getter
/// - `export * from "s"` copies the getters of `s` not already defined
///
/// ES modules run in strict mode. `require("s")` calls with a string literal
/// are left as they are and recorded as imports; computed specifiers are not
/// followed and fail when the call runs.
pub(super) fn to_module(source: &str) -> Result<LoadOutput, String> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, SourceType::mjs()).parse();
    if ret.panicked || !ret.errors.is_empty() {
        return Err(join_errors(&ret.errors, ret.panicked));
    }

    let mut rw = Rewriter::default();
    for stmt in &ret.program.body {
        rw.statement(stmt);
    }
    let mut requires = RequireCalls::default();
    walk::walk_program(&mut requires, &ret.program);
    for specifier in &requires.specifiers {
        rw.require(specifier);
    }

    let mut code = source.to_string();
    rw.edits.sort_by(|a, b| b.0.cmp(&a.0));
    for (start, end, text) in rw.edits {
        code.replace_range(start as usize..end as usize, &text);
    }

    if rw.is_esm {
        let mut header = String::from("\"use strict\"; __bale__.r(exports);");
        if !rw.exports.is_empty() {
            let getters: Vec<String> = rw
                .exports
                .iter()
                .map(|(name, expr)| format!("{}: () => {}", js_string(name), expr))
                .collect();
            header.push_str(&format!(" __bale__.d(exports, {{{}}});", getters.join(", ")));
        }
        header.push(' ');
        code.insert_str(0, &header);
    }

    Ok(LoadOutput {
        code,
        imports: rw.imports,
        side_outputs: Vec::new(),
    })
}

#[derive(Default)]
struct Rewriter {
    edits: Vec<(u32, u32, String)>,
    imports: Vec<String>,
    /// Exported name and the expression the getter returns.
    exports: Vec<(String, String)>,
    next_binding: usize,
    is_esm: bool,
}

impl Rewriter {
    fn statement(&mut self, stmt: &Statement<'_>) {
        match stmt {
            Statement::ImportDeclaration(decl) => {
                self.is_esm = true;
                let specifier = decl.source.value.as_str();
                let text = match decl.specifiers.as_ref().filter(|s| !s.is_empty()) {
                    None => format!("{};", self.require(specifier)),
                    Some(specifiers) => {
                        let binding = self.binding();
                        let mut text = format!("var {} = {};", binding, self.require(specifier));
                        for spec in specifiers {
                            let line = match spec {
                                ImportDeclarationSpecifier::ImportSpecifier(s) => format!(
                                    "const {} = {};",
                                    s.local.name,
                                    member(&binding, &export_name(&s.imported))
                                ),
                                ImportDeclarationSpecifier::ImportDefaultSpecifier(s) => {
                                    format!("const {} = __bale__.i({}).default;", s.local.name, binding)
                                }
                                ImportDeclarationSpecifier::ImportNamespaceSpecifier(s) => {
                                    format!("const {} = {};", s.local.name, binding)
                                }
                            };
                            text.push(' ');
                            text.push_str(&line);
                        }
                        text
                    }
                };
                self.replace(decl.span.start, decl.span.end, text);
            }
            Statement::ExportNamedDeclaration(decl) => {
                self.is_esm = true;
                if let Some(source) = &decl.source {
                    let binding = self.binding();
                    let text = format!("var {} = {};", binding, self.require(source.value.as_str()));
                    for spec in &decl.specifiers {
                        let expr = member(&binding, &export_name(&spec.local));
                        self.exports.push((export_name(&spec.exported), expr));
                    }
                    self.replace(decl.span.start, decl.span.end, text);
                } else if let Some(declaration) = &decl.declaration {
                    self.replace(decl.span.start, declaration.span().start, String::new());
                    for name in declared_names(declaration) {
                        self.exports.push((name.clone(), name));
                    }
                } else {
                    for spec in &decl.specifiers {
                        self.exports
                            .push((export_name(&spec.exported), export_name(&spec.local)));
                    }
                    self.replace(decl.span.start, decl.span.end, String::new());
                }
            }
            Statement::ExportDefaultDeclaration(decl) => {
                self.is_esm = true;
                let named = match &decl.declaration {
                    ExportDefaultDeclarationKind::FunctionDeclaration(func) => {
                        func.id.as_ref().map(|id| id.name.to_string())
                    }
                    ExportDefaultDeclarationKind::ClassDeclaration(class) => {
                        class.id.as_ref().map(|id| id.name.to_string())
                    }
                    _ => None,
                };
                let value_start = decl.declaration.span().start;
                match named {
                    Some(name) => {
                        self.replace(decl.span.start, value_start, String::new());
                        self.exports.push(("default".to_string(), name));
                    }
                    None => {
                        self.replace(decl.span.start, value_start, format!("const {} = ", DEFAULT_LOCAL));
                        self.exports
                            .push(("default".to_string(), DEFAULT_LOCAL.to_string()));
                    }
                }
            }
            Statement::ExportAllDeclaration(decl) => {
                self.is_esm = true;
                let require = self.require(decl.source.value.as_str());
                let text = match &decl.exported {
                    Some(exported) => {
                        let binding = self.binding();
                        self.exports.push((export_name(exported), binding.clone()));
                        format!("var {} = {};", binding, require)
                    }
                    None => format!("__bale__.s(exports, {});", require),
                };
                self.replace(decl.span.start, decl.span.end, text);
            }
            _ => {}
        }
    }

    fn replace(&mut self, start: u32, end: u32, text: String) {
        self.edits.push((start, end, text));
    }

    fn require(&mut self, specifier: &str) -> String {
        if !self.imports.iter().any(|s| s == specifier) {
            self.imports.push(specifier.to_string());
        }
        format!("require({})", js_string(specifier))
    }

    fn binding(&mut self) -> String {
        let name = format!("__bale_m{}", self.next_binding);
        self.next_binding += 1;
        name
    }
}

/// `require("<literal>")` calls anywhere in a program.
#[derive(Default)]
struct RequireCalls {
    specifiers: Vec<String>,
}

impl<'a> Visit<'a> for RequireCalls {
    fn visit_call_expression(&mut self, call: &CallExpression<'a>) {
        if let Expression::Identifier(callee) = &call.callee {
            if callee.name.as_str() == "require" && call.arguments.len() == 1 {
                if let Some(Argument::StringLiteral(literal)) = call.arguments.first() {
                    self.specifiers.push(literal.value.to_string());
                }
            }
        }
        walk::walk_call_expression(self, call);
    }
}

fn declared_names(declaration: &Declaration<'_>) -> Vec<String> {
    match declaration {
        Declaration::VariableDeclaration(var) => var
            .declarations
            .iter()
            .flat_map(|d| d.id.get_binding_identifiers())
            .map(|id| id.name.to_string())
            .collect(),
        Declaration::FunctionDeclaration(func) => {
            func.id.iter().map(|id| id.name.to_string()).collect()
        }
        Declaration::ClassDeclaration(class) => {
            class.id.iter().map(|id| id.name.to_string()).collect()
        }
        // type-only declarations have no runtime binding
        _ => Vec::new(),
    }
}

fn export_name(name: &ModuleExportName<'_>) -> String {
    name.name().to_string()
}

/// `obj.name`, or `obj["name"]` when `name` is not an identifier.
fn member(object: &str, name: &str) -> String {
    if is_identifier(name) {
        format!("{}.{}", object, name)
    } else {
        format!("{}[{}]", object, js_string(name))
    }
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_' || c == '$')
}

pub(crate) fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
