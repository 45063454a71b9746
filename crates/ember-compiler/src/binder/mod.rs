//! Semantic binder: syntax trees to a typed, lowered assembly.
//!
//! Binding runs in phases across all files so that declarations are visible
//! regardless of file order:
//!
//! 0. namespaces, one scope chain per file
//! 1. class and object symbols, then `using` imports, class field
//!    parameters and method signatures
//! 2. top-level function signatures
//! 3. field initializers and body statements of classes and objects
//! 4. top-level statements and entry-point selection
//! 5. bodies: constructors, methods, functions and the entry point, each
//!    lowered and checked as soon as it is bound
//!
//! Semantic errors never abort a run. A failing expression becomes an error
//! node and reports exactly one diagnostic; error operands suppress further
//! diagnostics. Only binder defects ([`InternalError`]) end the run early.
//!
//! # Example
//!
//! ```
//! use bumpalo::Bump;
//! use ember_compiler::binder::bind_assembly;
//! use ember_compiler::references::AssemblyReference;
//! use ember_core::FileId;
//! use ember_parser::Parser;
//!
//! let arena = Bump::new();
//! let tree = Parser::parse("def twice(n: int): int = n * 2\ntwice(21)", FileId::new(0), &arena);
//! let references = [AssemblyReference::core_library()];
//! let assembly = bind_assembly(true, &[tree], None, &references).unwrap();
//! assert!(assembly.diagnostics.is_empty());
//! assert!(assembly.entry_body().is_some());
//! ```

mod bodies;
mod calls;
mod declarations;
mod entry_point;
mod expressions;
mod members;
mod statements;
mod types;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use ember_core::{
    DiagnosticBag, FileId, InternalError, Location, SemanticError, Span, SymbolFlags, SymbolId,
    SymbolKind, SymbolTable, Type,
};
use ember_parser::SyntaxTree;

use crate::assembly::{MethodBodiesBuilder, TypedAssembly};
use crate::labels::{LabelGenerator, LoopStack};
use crate::references::{AssemblyReference, import_reference, predef};
use crate::scope::{ScopeId, ScopeTree};

type Result<T> = std::result::Result<T, InternalError>;

/// Knobs for one binding run.
#[derive(Debug, Clone)]
pub struct BindOptions {
    /// Run the all-paths-return analysis on non-Unit bodies.
    pub check_return_paths: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            check_return_paths: true,
        }
    }
}

/// Bind a set of syntax trees with default options.
///
/// `previous` chains a REPL submission onto the assembly it extends; its
/// symbols stay visible and its bodies are not bound again. `references` are
/// only imported by the first run of a chain.
pub fn bind_assembly(
    is_script: bool,
    trees: &[SyntaxTree<'_>],
    previous: Option<Arc<TypedAssembly>>,
    references: &[AssemblyReference],
) -> Result<TypedAssembly> {
    bind_assembly_with(is_script, trees, previous, references, &BindOptions::default())
}

/// Bind a set of syntax trees.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn bind_assembly_with(
    is_script: bool,
    trees: &[SyntaxTree<'_>],
    previous: Option<Arc<TypedAssembly>>,
    references: &[AssemblyReference],
    options: &BindOptions,
) -> Result<TypedAssembly> {
    let span = tracing::debug_span!("bind_assembly", is_script, files = trees.len());
    let _guard = span.enter();

    let mut binder = Binder::new(is_script, previous.as_deref(), references, options.clone())?;
    for tree in trees {
        binder.diagnostics.extend(tree.diagnostics().iter().cloned());
    }

    let files = binder.declare_namespaces(trees)?;
    let mut types = binder.declare_types(&files)?;
    binder.resolve_usings(&files);
    binder.declare_class_parameters(&mut types)?;
    let mut functions = binder.declare_member_signatures(&types)?;
    functions.extend(binder.declare_functions(&files)?);
    tracing::debug!(
        types = types.len(),
        functions = functions.len(),
        "declarations bound"
    );

    binder.bind_field_initializers(&mut types)?;
    let entry = binder.bind_entry_point(&files, &functions)?;

    binder.bind_constructors(types)?;
    binder.bind_functions(&functions)?;
    binder.bind_entry_body(entry.synthesized)?;

    tracing::debug!(
        bodies = binder.bodies.len(),
        diagnostics = binder.diagnostics.len(),
        "binding finished"
    );
    Ok(binder.finish(entry.entry_point, previous))
}

// ============================================================================
// Binder state
// ============================================================================

/// Where the binder currently is.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Context {
    pub file: FileId,
    pub scope: ScopeId,
    /// Method owning locals declared in this context.
    pub owner: SymbolId,
    /// Class whose instance members are reachable through `this`.
    pub this_type: Option<SymbolId>,
}

/// State of one binding run.
pub(crate) struct Binder {
    pub table: SymbolTable,
    pub scopes: ScopeTree,
    pub diagnostics: DiagnosticBag,
    pub labels: LabelGenerator,
    pub loops: LoopStack,
    pub bodies: MethodBodiesBuilder,
    pub options: BindOptions,
    pub is_script: bool,
    pub submission: u32,
    /// Global scope of this run.
    pub global: ScopeId,
    pub context: Context,
}

impl Binder {
    fn new(
        is_script: bool,
        previous: Option<&TypedAssembly>,
        references: &[AssemblyReference],
        options: BindOptions,
    ) -> Result<Self> {
        let (table, mut scopes, parent, submission) = match previous {
            Some(previous) => (
                previous.symbols.clone(),
                previous.scopes.clone(),
                previous.root_scope,
                previous.submission + 1,
            ),
            None => {
                let mut table = SymbolTable::new();
                for reference in references {
                    import_reference(&mut table, reference)?;
                }
                let mut scopes = ScopeTree::new();
                let base = scopes.container(table.root(), None);
                if let Some(predef) = predef(&table) {
                    scopes.import(base, predef);
                }
                (table, scopes, base, 0)
            }
        };

        let root = table.root();
        let global = scopes.container(root, Some(parent));
        let mut binder = Self {
            table,
            scopes,
            diagnostics: DiagnosticBag::new(),
            labels: LabelGenerator::new(),
            loops: LoopStack::new(),
            bodies: MethodBodiesBuilder::new(),
            options,
            is_script,
            submission,
            global,
            context: Context {
                file: FileId::new(0),
                scope: global,
                owner: root,
                this_type: None,
            },
        };

        if is_script {
            let script = binder.script_container(root)?;
            binder.scopes.import(global, script);
        }
        Ok(binder)
    }

    fn finish(
        self,
        entry_point: Option<crate::assembly::EntryPoint>,
        previous: Option<Arc<TypedAssembly>>,
    ) -> TypedAssembly {
        TypedAssembly {
            is_script: self.is_script,
            symbols: self.table,
            scopes: self.scopes,
            root_scope: self.global,
            bodies: self.bodies.finalize(),
            entry_point,
            diagnostics: self.diagnostics.into_vec(),
            previous,
            submission: self.submission,
        }
    }

    /// The static container holding this submission's script members in
    /// `namespace`, created on first use.
    pub fn script_container(&mut self, namespace: SymbolId) -> Result<SymbolId> {
        let name = format!("$Script{}", self.submission);
        if let Some(existing) = self
            .table
            .members(namespace, &name)
            .iter()
            .copied()
            .find(|&id| self.table.get(id).kind == SymbolKind::Type)
        {
            return Ok(existing);
        }

        let container = self.table.create(
            namespace,
            SymbolKind::Type,
            name,
            SymbolFlags::STATIC | SymbolFlags::SINGLETON | SymbolFlags::SYNTHESIZED,
            None,
        );
        self.table.set_type(container, Type::Class(container))?;
        if !self.table.define(container) {
            return Err(InternalError::Invariant {
                message: format!(
                    "script container of {} already exists",
                    self.table.qualified_name(namespace)
                ),
            });
        }
        Ok(container)
    }

    // ==========================================================================
    // Context
    // ==========================================================================

    /// Switch context, returning the previous one for [`leave`](Self::leave).
    pub fn enter(&mut self, context: Context) -> Context {
        std::mem::replace(&mut self.context, context)
    }

    pub fn leave(&mut self, saved: Context) {
        self.context = saved;
    }

    /// Open a block scope for the current owner.
    pub fn push_block(&mut self) -> ScopeId {
        let previous = self.context.scope;
        self.context.scope = self.scopes.block(self.context.owner, previous);
        previous
    }

    pub fn pop_block(&mut self, previous: ScopeId) {
        self.context.scope = previous;
    }

    // ==========================================================================
    // Diagnostics
    // ==========================================================================

    pub fn location(&self, span: Span) -> Location {
        Location::new(self.context.file, span)
    }

    pub fn report(&mut self, error: SemanticError, span: Span) {
        let location = self.location(span);
        tracing::trace!(%location, %error, "semantic error");
        self.diagnostics.report(error, location);
    }

    pub fn display_type(&self, ty: &Type) -> String {
        self.table.display_type(ty)
    }
}
