//! Lexical scope chain for name resolution.
//!
//! This module provides [`ScopeTree`], an arena of [`Scope`]s layered over the
//! [`SymbolTable`]. It handles:
//! - Container scopes (namespaces, types, methods) whose declared names are
//!   the members of their owner symbol
//! - Block scopes holding locally declared symbols
//! - `using` imports of namespace and type members
//! - Chaining onto the scopes of a previous submission
//!
//! Lookups walk own declarations, then imports, then the parent scope.

use std::fmt;

use ember_core::{SymbolId, SymbolKind, SymbolTable};
use rustc_hash::FxHashMap;

// ============================================================================
// Types
// ============================================================================

/// Identifier of a scope in a [`ScopeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

impl ScopeId {
    /// Index into the owning tree.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scope{}", self.0)
    }
}

/// A single lexical scope.
#[derive(Debug, Clone)]
pub struct Scope {
    /// The symbol whose members this scope exposes, or which owns its locals.
    pub owner: SymbolId,
    /// Enclosing scope; `None` for the outermost scope.
    pub parent: Option<ScopeId>,
    /// Containers whose members are visible without qualification.
    imports: Vec<SymbolId>,
    /// Locals declared directly in this scope; `None` for container scopes.
    locals: Option<FxHashMap<String, SymbolId>>,
}

impl Scope {
    /// Whether this scope holds locals rather than exposing its owner's members.
    pub fn is_block(&self) -> bool {
        self.locals.is_some()
    }

    /// Imported containers, in import order.
    pub fn imports(&self) -> &[SymbolId] {
        &self.imports
    }
}

// ============================================================================
// ScopeTree
// ============================================================================

/// Arena of scopes for one compilation, chained onto previous submissions.
#[derive(Debug, Clone, Default)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scopes.
    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    /// Whether the tree holds no scopes.
    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    /// Get a scope by ID.
    pub fn get(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    fn push(&mut self, scope: Scope) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(scope);
        id
    }

    // ==========================================================================
    // Scope Creation
    // ==========================================================================

    /// Create a scope exposing the members of `owner`.
    pub fn container(&mut self, owner: SymbolId, parent: Option<ScopeId>) -> ScopeId {
        self.push(Scope {
            owner,
            parent,
            imports: Vec::new(),
            locals: None,
        })
    }

    /// Create a block scope whose locals belong to `owner`.
    pub fn block(&mut self, owner: SymbolId, parent: ScopeId) -> ScopeId {
        self.push(Scope {
            owner,
            parent: Some(parent),
            imports: Vec::new(),
            locals: Some(FxHashMap::default()),
        })
    }

    /// Make the members of a namespace or type visible in `scope`.
    ///
    /// Importing the same container twice is a no-op.
    pub fn import(&mut self, scope: ScopeId, container: SymbolId) {
        let imports = &mut self.scopes[scope.index()].imports;
        if !imports.contains(&container) {
            imports.push(container);
        }
    }

    /// Declare a local in a block scope.
    ///
    /// Returns `false` if the name is already declared in this very scope, or
    /// if the scope is not a block scope. Shadowing an outer scope is allowed.
    pub fn declare_local(&mut self, scope: ScopeId, name: &str, symbol: SymbolId) -> bool {
        let Some(locals) = self.scopes[scope.index()].locals.as_mut() else {
            return false;
        };
        if locals.contains_key(name) {
            return false;
        }
        locals.insert(name.to_string(), symbol);
        true
    }

    // ==========================================================================
    // Lookup
    // ==========================================================================

    /// Iterate over a scope and its ancestors, innermost first.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), move |&id| self.get(id).parent)
    }

    /// Symbols declared by the scope itself under `name`.
    fn declared<'t>(
        &'t self,
        table: &'t SymbolTable,
        scope: &'t Scope,
        name: &str,
    ) -> &'t [SymbolId] {
        match &scope.locals {
            Some(locals) => locals.get(name).map(std::slice::from_ref).unwrap_or(&[]),
            None => table.members(scope.owner, name),
        }
    }

    /// Find the first symbol named `name` satisfying `predicate`.
    ///
    /// Each scope is searched in order: own declarations, then imports; the
    /// first match wins before moving on to the parent.
    pub fn lookup_single(
        &self,
        table: &SymbolTable,
        scope: ScopeId,
        name: &str,
        predicate: impl Fn(SymbolId) -> bool,
    ) -> Option<SymbolId> {
        for id in self.ancestors(scope) {
            let scope = self.get(id);
            if let Some(found) = self
                .declared(table, scope, name)
                .iter()
                .copied()
                .find(|&s| predicate(s))
            {
                return Some(found);
            }
            for &import in &scope.imports {
                if let Some(found) = table
                    .members(import, name)
                    .iter()
                    .copied()
                    .find(|&s| predicate(s))
                {
                    return Some(found);
                }
            }
        }
        None
    }

    /// Collect every symbol named `name` satisfying `predicate` from the
    /// innermost scope level that has any.
    ///
    /// A level is either a scope's own declarations or, failing that, all of
    /// its imports together. Used for methods, whose overloads are resolved by
    /// cost afterwards.
    pub fn lookup_members(
        &self,
        table: &SymbolTable,
        scope: ScopeId,
        name: &str,
        predicate: impl Fn(SymbolId) -> bool,
    ) -> Vec<SymbolId> {
        for id in self.ancestors(scope) {
            let scope = self.get(id);
            let own: Vec<SymbolId> = self
                .declared(table, scope, name)
                .iter()
                .copied()
                .filter(|&s| predicate(s))
                .collect();
            if !own.is_empty() {
                return own;
            }
            let imported: Vec<SymbolId> = scope
                .imports
                .iter()
                .flat_map(|&import| table.members(import, name).iter().copied())
                .filter(|&s| predicate(s))
                .collect();
            if !imported.is_empty() {
                return imported;
            }
        }
        Vec::new()
    }

    /// Find a local, parameter or field.
    pub fn lookup_variable(
        &self,
        table: &SymbolTable,
        scope: ScopeId,
        name: &str,
    ) -> Option<SymbolId> {
        self.lookup_single(table, scope, name, |s| table.get(s).kind.is_variable())
    }

    /// Find a field.
    pub fn lookup_field(
        &self,
        table: &SymbolTable,
        scope: ScopeId,
        name: &str,
    ) -> Option<SymbolId> {
        self.lookup_single(table, scope, name, |s| table.get(s).kind == SymbolKind::Field)
    }

    /// Find a class or object type.
    pub fn lookup_type(&self, table: &SymbolTable, scope: ScopeId, name: &str) -> Option<SymbolId> {
        self.lookup_single(table, scope, name, |s| table.get(s).kind == SymbolKind::Type)
    }

    /// Find a namespace.
    pub fn lookup_namespace(
        &self,
        table: &SymbolTable,
        scope: ScopeId,
        name: &str,
    ) -> Option<SymbolId> {
        self.lookup_single(table, scope, name, |s| table.get(s).kind == SymbolKind::Namespace)
    }

    /// Find all overloads of a method.
    pub fn lookup_methods(&self, table: &SymbolTable, scope: ScopeId, name: &str) -> Vec<SymbolId> {
        self.lookup_members(table, scope, name, |s| table.get(s).kind == SymbolKind::Method)
    }

    /// The nearest enclosing scope whose owner is a method, if any.
    pub fn enclosing_method(&self, table: &SymbolTable, scope: ScopeId) -> Option<SymbolId> {
        self.ancestors(scope)
            .map(|id| self.get(id).owner)
            .find(|&owner| table.get(owner).kind == SymbolKind::Method)
    }
}

// ============================================================================
// Tests
// ============================================================================
