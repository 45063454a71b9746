//! Helpers for binder tests.

use bumpalo::Bump;
use ember_core::{FileId, SemanticError};
use ember_parser::Parser;

use super::bind_assembly;
use crate::assembly::TypedAssembly;
use crate::references::AssemblyReference;
use crate::typed::Printer;

/// Parse and bind `sources` as one assembly with the core library.
pub fn bind_files(is_script: bool, sources: &[&str]) -> TypedAssembly {
    let arena = Bump::new();
    let trees: Vec<_> = sources
        .iter()
        .enumerate()
        .map(|(i, source)| Parser::parse(source, FileId::new(i as u32), &arena))
        .collect();
    bind_assembly(is_script, &trees, None, &[AssemblyReference::core_library()])
        .expect("binding should not hit an internal error")
}

pub fn bind_program(source: &str) -> TypedAssembly {
    bind_files(false, &[source])
}

pub fn bind_script(source: &str) -> TypedAssembly {
    bind_files(true, &[source])
}

/// The semantic errors of an assembly, in report order.
///
/// Panics on syntax errors so that a test source that fails to parse does
/// not pass silently.
pub fn errors(assembly: &TypedAssembly) -> Vec<SemanticError> {
    assembly
        .diagnostics
        .iter()
        .map(|diagnostic| {
            diagnostic
                .as_semantic()
                .cloned()
                .unwrap_or_else(|| panic!("unexpected syntax error: {}", diagnostic.message()))
        })
        .collect()
}

/// The lowered entry body, one statement per line.
pub fn entry_text(assembly: &TypedAssembly) -> String {
    let body = assembly.entry_body().expect("assembly has an entry body");
    Printer::new(&assembly.symbols).body(body)
}

/// The lowered body of the method with the given qualified name.
pub fn method_text(assembly: &TypedAssembly, qualified: &str) -> String {
    let method = assembly
        .find_method(qualified)
        .unwrap_or_else(|| panic!("no bound method named {}", qualified));
    let body = assembly.body(method).expect("method has a body");
    Printer::new(&assembly.symbols).body(body)
}
