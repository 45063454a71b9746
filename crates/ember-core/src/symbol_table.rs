//! Arena of symbols forming the program's ownership tree.
//!
//! Every symbol lives in one [`SymbolTable`] and is addressed by a
//! [`SymbolId`]. Owners and children refer to each other by ID, so the table
//! can be cloned wholesale to chain REPL submissions onto a previous run.
//!
//! Creating a symbol and defining it are separate steps: [`SymbolTable::create`]
//! allocates the symbol, and [`SymbolTable::define`] makes it visible as a
//! member of its owner. Methods receive their parameters in between so that
//! overload collisions can be checked against complete signatures.

use crate::{InternalError, Location, Symbol, SymbolFlags, SymbolId, SymbolKind, Type};

/// Owner of all symbols for one compilation.
#[derive(Debug, Clone)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    root: SymbolId,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    /// Create a table holding only the root namespace.
    pub fn new() -> Self {
        let root = Symbol::new(
            String::new(),
            SymbolKind::Namespace,
            None,
            SymbolFlags::STATIC,
            None,
        );
        Self {
            symbols: vec![root],
            root: SymbolId::new(0),
        }
    }

    /// The root namespace.
    #[inline]
    pub fn root(&self) -> SymbolId {
        self.root
    }

    /// Get a symbol by ID.
    ///
    /// IDs are only handed out by this table (or a table it was cloned from),
    /// so indexing cannot go out of bounds for IDs obtained legitimately.
    #[inline]
    pub fn get(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    /// Get a symbol by ID, if it exists.
    pub fn try_get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// Number of symbols, including the root.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Whether the table holds only the root namespace.
    pub fn is_empty(&self) -> bool {
        self.symbols.len() <= 1
    }

    /// Iterate over all symbols in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId::new(i as u32), s))
    }

    /// Allocate a symbol owned by `owner`.
    ///
    /// The symbol is not visible to member lookups until [`define`](Self::define)
    /// (or [`add_parameter`](Self::add_parameter)) is called.
    pub fn create(
        &mut self,
        owner: SymbolId,
        kind: SymbolKind,
        name: impl Into<String>,
        flags: SymbolFlags,
        location: Option<Location>,
    ) -> SymbolId {
        let id = SymbolId::new(self.symbols.len() as u32);
        self.symbols
            .push(Symbol::new(name.into(), kind, Some(owner), flags, location));
        id
    }

    /// Assign a symbol's type. A second assignment is a binder defect.
    pub fn set_type(&mut self, id: SymbolId, ty: Type) -> Result<(), InternalError> {
        let symbol = &mut self.symbols[id.index()];
        if symbol.ty.is_some() {
            return Err(InternalError::TypeAlreadyAssigned {
                name: symbol.name.clone(),
            });
        }
        symbol.ty = Some(ty);
        Ok(())
    }

    /// A symbol's type, failing if it was never assigned.
    pub fn ty(&self, id: SymbolId) -> Result<&Type, InternalError> {
        let symbol = self.get(id);
        symbol.ty.as_ref().ok_or_else(|| InternalError::MissingType {
            name: symbol.name.clone(),
        })
    }

    /// A symbol's type, or [`Type::Error`] when unassigned.
    pub fn type_or_error(&self, id: SymbolId) -> Type {
        self.get(id).ty.clone().unwrap_or(Type::Error)
    }

    /// Add modifier flags to a symbol.
    pub fn add_flags(&mut self, id: SymbolId, flags: SymbolFlags) {
        self.symbols[id.index()].flags |= flags;
    }

    /// Make a symbol visible as a member of its owner.
    ///
    /// Returns `false` when the name collides with an existing member. Methods
    /// may share a name as long as their parameter type lists differ.
    pub fn define(&mut self, id: SymbolId) -> bool {
        let symbol = self.get(id);
        let Some(owner) = symbol.owner else {
            return false;
        };
        let name = symbol.name.clone();
        let kind = symbol.kind;

        let existing = self.members(owner, &name);
        if !existing.is_empty() {
            if kind != SymbolKind::Method {
                return false;
            }
            let parameters = self.parameter_types(id);
            let collides = existing.iter().any(|&other| {
                self.get(other).kind != SymbolKind::Method
                    || self.parameter_types(other) == parameters
            });
            if collides {
                return false;
            }
        }

        let container = &mut self.symbols[owner.index()];
        container.members.entry(name).or_default().push(id);
        container.children.push(id);
        true
    }

    /// Append a parameter to a method. Returns `false` on a duplicate name.
    pub fn add_parameter(&mut self, method: SymbolId, parameter: SymbolId) -> bool {
        let name = self.get(parameter).name.clone();
        if !self.members(method, &name).is_empty() {
            return false;
        }
        let container = &mut self.symbols[method.index()];
        container.members.entry(name).or_default().push(parameter);
        container.parameters.push(parameter);
        true
    }

    /// Members of a container with the given name, in definition order.
    pub fn members(&self, container: SymbolId, name: &str) -> &[SymbolId] {
        self.get(container)
            .members
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All defined members of a container, in definition order.
    pub fn children(&self, container: SymbolId) -> &[SymbolId] {
        self.get(container).children()
    }

    /// Parameters of a method, in declaration order.
    pub fn parameters(&self, method: SymbolId) -> &[SymbolId] {
        self.get(method).parameters()
    }

    /// Parameter types of a method, in declaration order.
    pub fn parameter_types(&self, method: SymbolId) -> Vec<Type> {
        self.parameters(method)
            .iter()
            .map(|&p| self.type_or_error(p))
            .collect()
    }

    /// The first member of `container` named `name` that is a namespace or type.
    pub fn container_member(&self, container: SymbolId, name: &str) -> Option<SymbolId> {
        self.members(container, name).iter().copied().find(|&id| {
            matches!(
                self.get(id).kind,
                SymbolKind::Namespace | SymbolKind::Type
            )
        })
    }

    /// Find or create a child namespace.
    pub fn get_or_create_namespace(&mut self, parent: SymbolId, name: &str) -> SymbolId {
        if let Some(existing) = self
            .members(parent, name)
            .iter()
            .copied()
            .find(|&id| self.get(id).kind == SymbolKind::Namespace)
        {
            return existing;
        }
        let id = self.create(
            parent,
            SymbolKind::Namespace,
            name,
            SymbolFlags::STATIC,
            None,
        );
        // A non-namespace member with the same name blocks the definition, but the
        // namespace still exists so nested declarations have somewhere to live.
        self.define(id);
        id
    }

    /// Find or create a nested namespace path such as `A.B.C`.
    pub fn get_or_create_namespace_path<'a>(
        &mut self,
        parent: SymbolId,
        path: impl IntoIterator<Item = &'a str>,
    ) -> SymbolId {
        path.into_iter()
            .fold(parent, |current, segment| self.get_or_create_namespace(current, segment))
    }

    /// Resolve a qualified path of namespaces and types starting at `from`.
    pub fn resolve_qualified(&self, from: SymbolId, path: &[&str]) -> Option<SymbolId> {
        path.iter()
            .try_fold(from, |current, segment| self.container_member(current, segment))
    }

    /// The nearest enclosing type of a symbol (including the symbol itself).
    pub fn containing_type(&self, id: SymbolId) -> Option<SymbolId> {
        let mut current = Some(id);
        while let Some(symbol_id) = current {
            let symbol = self.get(symbol_id);
            if symbol.kind == SymbolKind::Type {
                return Some(symbol_id);
            }
            current = symbol.owner;
        }
        None
    }

    /// Dotted name from the root, skipping the root and synthesized containers.
    pub fn qualified_name(&self, id: SymbolId) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(symbol_id) = current {
            let symbol = self.get(symbol_id);
            let synthesized_container = symbol_id != id && symbol.has(SymbolFlags::SYNTHESIZED);
            if symbol_id != self.root && !synthesized_container {
                segments.push(symbol.name.as_str());
            }
            current = symbol.owner;
        }
        segments.reverse();
        segments.join(".")
    }

    /// Render a type for diagnostics, naming classes by their qualified name.
    pub fn display_type(&self, ty: &Type) -> String {
        match ty {
            Type::Class(symbol) => self.qualified_name(*symbol),
            Type::Array(element) => format!("Array[{}]", self.display_type(element)),
            other => other.to_string(),
        }
    }

    /// Render a method signature such as `Point.add(int, string)`.
    pub fn display_signature(&self, method: SymbolId) -> String {
        let parameters: Vec<String> = self
            .parameter_types(method)
            .iter()
            .map(|ty| self.display_type(ty))
            .collect();
        format!("{}({})", self.qualified_name(method), parameters.join(", "))
    }
}
