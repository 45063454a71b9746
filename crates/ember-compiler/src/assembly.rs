//! The bound-and-lowered output of one binding run.
//!
//! A [`TypedAssembly`] owns the symbol table and scope tree of the run, the
//! lowered body of every method bound in it, the entry point and every
//! diagnostic. Assemblies are immutable once built; a REPL submission chains
//! onto its predecessor through [`TypedAssembly::previous`].

use std::sync::Arc;

use ember_core::{Diagnostic, InternalError, SymbolId, SymbolTable};
use rustc_hash::FxHashMap;

use crate::scope::{ScopeId, ScopeTree};
use crate::typed::Body;

// ============================================================================
// Method bodies
// ============================================================================

/// Collects lowered bodies while binding; turned into [`MethodBodies`] once.
#[derive(Debug, Default)]
pub struct MethodBodiesBuilder {
    bodies: FxHashMap<SymbolId, Body>,
    order: Vec<SymbolId>,
}

impl MethodBodiesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the body of a method. Each method gets exactly one body.
    pub fn insert(&mut self, method: SymbolId, body: Body) -> Result<(), InternalError> {
        if self.bodies.contains_key(&method) {
            return Err(InternalError::Invariant {
                message: format!("body of {} inserted twice", method),
            });
        }
        self.bodies.insert(method, body);
        self.order.push(method);
        Ok(())
    }

    /// Number of bodies collected so far.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Freeze the collected bodies.
    pub fn finalize(self) -> MethodBodies {
        MethodBodies {
            bodies: self.bodies,
            order: self.order,
        }
    }
}

/// Lowered bodies by method symbol, in the order they were bound.
#[derive(Debug, Clone, Default)]
pub struct MethodBodies {
    bodies: FxHashMap<SymbolId, Body>,
    order: Vec<SymbolId>,
}

impl MethodBodies {
    /// The body of a method bound in this run.
    pub fn get(&self, method: SymbolId) -> Option<&Body> {
        self.bodies.get(&method)
    }

    pub fn contains(&self, method: SymbolId) -> bool {
        self.bodies.contains_key(&method)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Iterate in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Body)> {
        self.order
            .iter()
            .filter_map(|&id| self.bodies.get(&id).map(|body| (id, body)))
    }
}

// ============================================================================
// Assembly
// ============================================================================

/// Where execution of an assembly starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryPoint {
    /// `true` for a script's `$eval`, `false` for a program's `main`.
    pub is_script: bool,
    /// The entry method.
    pub symbol: SymbolId,
}

/// A fully bound, type-checked and lowered assembly.
#[derive(Debug)]
pub struct TypedAssembly {
    /// Whether the run bound script-mode submissions.
    pub is_script: bool,
    /// Every symbol, including those of previous submissions.
    pub symbols: SymbolTable,
    /// Every scope, including those of previous submissions.
    pub scopes: ScopeTree,
    /// The run's global scope; the next submission chains onto it.
    pub root_scope: ScopeId,
    /// Lowered bodies of the methods bound in this run.
    pub bodies: MethodBodies,
    pub entry_point: Option<EntryPoint>,
    /// Syntax and semantic diagnostics, in report order.
    pub diagnostics: Vec<Diagnostic>,
    /// The submission this one extends.
    pub previous: Option<Arc<TypedAssembly>>,
    /// Zero-based submission number.
    pub submission: u32,
}

impl TypedAssembly {
    /// Whether any diagnostic was reported.
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    /// The body of a method bound in this run or any previous submission.
    pub fn body(&self, method: SymbolId) -> Option<&Body> {
        let mut current = Some(self);
        while let Some(assembly) = current {
            if let Some(body) = assembly.bodies.get(method) {
                return Some(body);
            }
            current = assembly.previous.as_deref();
        }
        None
    }

    /// The lowered body of the entry point.
    pub fn entry_body(&self) -> Option<&Body> {
        self.entry_point.and_then(|entry| self.bodies.get(entry.symbol))
    }

    /// Find a method by its qualified name, e.g. `Point.sum` or `main`.
    ///
    /// Returns the first overload bound in this run or a previous one.
    pub fn find_method(&self, qualified: &str) -> Option<SymbolId> {
        self.symbols.iter().map(|(id, _)| id).find(|&id| {
            self.symbols.qualified_name(id) == qualified && self.body(id).is_some()
        })
    }
}
