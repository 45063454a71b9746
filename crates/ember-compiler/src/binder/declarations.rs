//! Declaration phases: namespaces, types, imports and signatures.
//!
//! Symbols are created for every declaration before any body is bound, so
//! bodies may refer to types and functions declared later or in other files.

use ember_core::{FileId, SemanticError, SymbolFlags, SymbolId, SymbolKind, Type};
use ember_parser::SyntaxTree;
use ember_parser::ast::{ClassDecl, FunctionDecl, Item, ObjectDecl};

use super::{Binder, Result};
use crate::scope::ScopeId;
use crate::typed::Stmt;

/// One source file and where its declarations live.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FileUnit<'ast> {
    pub file: FileId,
    /// The namespace from the file's heading, or the root.
    pub namespace: SymbolId,
    /// Container for the file's types, functions and top-level values: the
    /// namespace itself, or the submission's script container.
    pub container: SymbolId,
    pub scope: ScopeId,
    pub items: &'ast [Item<'ast>],
}

#[derive(Debug, Clone, Copy)]
pub(crate) enum TypeDecl<'ast> {
    Class(&'ast ClassDecl<'ast>),
    Object(&'ast ObjectDecl<'ast>),
}

/// A class or object whose members are still to be bound.
#[derive(Debug)]
pub(crate) struct PendingType<'ast> {
    pub symbol: SymbolId,
    pub decl: TypeDecl<'ast>,
    pub file: FileId,
    pub scope: ScopeId,
    /// `.ctor` for classes, `.cctor` for objects.
    pub constructor: SymbolId,
    /// Fields created from class parameters, paired with the constructor
    /// parameter initializing each.
    pub parameter_fields: Vec<(SymbolId, SymbolId)>,
    /// Field initializers and body statements, bound in phase 3.
    pub initializers: Vec<Stmt>,
}

impl PendingType<'_> {
    pub fn is_object(&self) -> bool {
        matches!(self.decl, TypeDecl::Object(_))
    }
}

/// A function or method whose body is still to be bound.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PendingFunction<'ast> {
    pub symbol: SymbolId,
    pub decl: &'ast FunctionDecl<'ast>,
    pub file: FileId,
    /// Scope exposing the parameters.
    pub scope: ScopeId,
    pub this_type: Option<SymbolId>,
    /// Declared at the top level of a file rather than in a type.
    pub top_level: bool,
}

impl Binder {
    // ==========================================================================
    // Phase 0: namespaces
    // ==========================================================================

    /// Create namespaces and the scope chain of every file.
    pub(super) fn declare_namespaces<'ast>(
        &mut self,
        trees: &[SyntaxTree<'ast>],
    ) -> Result<Vec<FileUnit<'ast>>> {
        let root = self.table.root();
        let mut files = Vec::with_capacity(trees.len());

        for tree in trees {
            let mut namespace = root;
            let mut scope = self.global;
            if let Some(heading) = tree.namespace() {
                for segment in heading.name.segments {
                    namespace = self.table.get_or_create_namespace(namespace, segment.name);
                    scope = self.scopes.container(namespace, Some(scope));
                }
            }

            let container = if self.is_script {
                self.script_container(namespace)?
            } else {
                namespace
            };
            let file_scope = self.scopes.container(container, Some(scope));

            files.push(FileUnit {
                file: tree.file(),
                namespace,
                container,
                scope: file_scope,
                items: tree.items(),
            });
        }
        Ok(files)
    }

    // ==========================================================================
    // Phase 1: types, imports, class parameters, method signatures
    // ==========================================================================

    pub(super) fn declare_types<'ast>(
        &mut self,
        files: &[FileUnit<'ast>],
    ) -> Result<Vec<PendingType<'ast>>> {
        let mut types = Vec::new();

        for unit in files {
            self.context.file = unit.file;
            for item in unit.items {
                let (decl, name, flags) = match item {
                    Item::Class(class) => {
                        (TypeDecl::Class(class), class.name, SymbolFlags::empty())
                    }
                    Item::Object(object) => (
                        TypeDecl::Object(object),
                        object.name,
                        SymbolFlags::STATIC | SymbolFlags::SINGLETON,
                    ),
                    _ => continue,
                };

                let location = Some(self.location(name.span));
                let symbol = self
                    .table
                    .create(unit.container, SymbolKind::Type, name.name, flags, location);
                self.table.set_type(symbol, Type::Class(symbol))?;
                if !self.table.define(symbol) {
                    self.report(
                        SemanticError::DuplicateDeclaration {
                            name: name.name.to_string(),
                        },
                        name.span,
                    );
                }

                let scope = self.scopes.container(symbol, Some(unit.scope));
                types.push(PendingType {
                    symbol,
                    decl,
                    file: unit.file,
                    scope,
                    constructor: symbol,
                    parameter_fields: Vec::new(),
                    initializers: Vec::new(),
                });
            }
        }
        Ok(types)
    }

    /// Resolve `using` directives: first from the root, then relative to the
    /// file's namespace.
    pub(super) fn resolve_usings(&mut self, files: &[FileUnit<'_>]) {
        let root = self.table.root();
        for unit in files {
            self.context.file = unit.file;
            for item in unit.items {
                let Item::Using(using) = item else {
                    continue;
                };
                let path = using.name.names();
                let target = self
                    .table
                    .resolve_qualified(root, &path)
                    .or_else(|| self.table.resolve_qualified(unit.namespace, &path));
                match target {
                    Some(target) => self.scopes.import(unit.scope, target),
                    None => self.report(
                        SemanticError::UndefinedImport {
                            name: using.name.to_string(),
                        },
                        using.name.span,
                    ),
                }
            }
        }
    }

    /// Turn class parameters into fields and synthesize constructors.
    pub(super) fn declare_class_parameters(&mut self, types: &mut [PendingType<'_>]) -> Result<()> {
        for pending in types.iter_mut() {
            self.context.file = pending.file;
            self.context.scope = pending.scope;

            match pending.decl {
                TypeDecl::Object(object) => {
                    let location = Some(self.location(object.name.span));
                    let cctor = self.table.create(
                        pending.symbol,
                        SymbolKind::Method,
                        ".cctor",
                        SymbolFlags::STATIC | SymbolFlags::CONSTRUCTOR | SymbolFlags::SYNTHESIZED,
                        location,
                    );
                    self.table.set_type(cctor, Type::Unit)?;
                    self.table.define(cctor);
                    pending.constructor = cctor;
                }
                TypeDecl::Class(class) => {
                    let location = Some(self.location(class.name.span));
                    let ctor = self.table.create(
                        pending.symbol,
                        SymbolKind::Method,
                        ".ctor",
                        SymbolFlags::CONSTRUCTOR | SymbolFlags::SYNTHESIZED,
                        location,
                    );
                    self.table.set_type(ctor, Type::Unit)?;

                    for param in class.params {
                        let ty = self.resolve_type(&param.ty);
                        let location = Some(self.location(param.name.span));
                        let mut flags = SymbolFlags::empty();
                        if !param.mutable {
                            flags |= SymbolFlags::READONLY;
                        }

                        let field = self.table.create(
                            pending.symbol,
                            SymbolKind::Field,
                            param.name.name,
                            flags,
                            location,
                        );
                        self.table.set_type(field, ty.clone())?;
                        if !self.table.define(field) {
                            self.report(
                                SemanticError::DuplicateDeclaration {
                                    name: param.name.name.to_string(),
                                },
                                param.name.span,
                            );
                            continue;
                        }

                        let parameter = self.table.create(
                            ctor,
                            SymbolKind::Parameter,
                            param.name.name,
                            SymbolFlags::READONLY,
                            location,
                        );
                        self.table.set_type(parameter, ty)?;
                        self.table.add_parameter(ctor, parameter);
                        pending.parameter_fields.push((field, parameter));
                    }

                    self.table.define(ctor);
                    pending.constructor = ctor;
                }
            }
        }
        Ok(())
    }

    /// Declare the methods of every class and object.
    pub(super) fn declare_member_signatures<'ast>(
        &mut self,
        types: &[PendingType<'ast>],
    ) -> Result<Vec<PendingFunction<'ast>>> {
        let mut functions = Vec::new();
        for pending in types {
            let members = match pending.decl {
                TypeDecl::Class(class) => class.members,
                TypeDecl::Object(object) => object.members,
            };
            let this_type = (!pending.is_object()).then_some(pending.symbol);

            self.context.file = pending.file;
            self.context.scope = pending.scope;
            for member in members {
                if let ember_parser::ast::Member::Function(decl) = member
                    && let Some(function) = self.declare_function(
                        pending.symbol,
                        decl,
                        pending.is_object(),
                        this_type,
                        false,
                    )?
                {
                    functions.push(function);
                }
            }
        }
        Ok(functions)
    }

    // ==========================================================================
    // Phase 2: top-level functions
    // ==========================================================================

    pub(super) fn declare_functions<'ast>(
        &mut self,
        files: &[FileUnit<'ast>],
    ) -> Result<Vec<PendingFunction<'ast>>> {
        let mut functions = Vec::new();
        for unit in files {
            self.context.file = unit.file;
            self.context.scope = unit.scope;
            for item in unit.items {
                if let Item::Function(decl) = item
                    && let Some(function) =
                        self.declare_function(unit.container, decl, true, None, true)?
                {
                    functions.push(function);
                }
            }
        }
        Ok(functions)
    }

    /// Create a method symbol with its parameters, resolving types in the
    /// current scope.
    ///
    /// Returns `None` when the signature duplicates an existing member; the
    /// body is then never bound.
    fn declare_function<'ast>(
        &mut self,
        owner: SymbolId,
        decl: &'ast FunctionDecl<'ast>,
        is_static: bool,
        this_type: Option<SymbolId>,
        top_level: bool,
    ) -> Result<Option<PendingFunction<'ast>>> {
        let flags = if is_static {
            SymbolFlags::STATIC
        } else {
            SymbolFlags::empty()
        };
        let location = Some(self.location(decl.name.span));
        let method = self
            .table
            .create(owner, SymbolKind::Method, decl.name.name, flags, location);

        for param in decl.params {
            let ty = self.resolve_type(&param.ty);
            let location = Some(self.location(param.name.span));
            let parameter = self.table.create(
                method,
                SymbolKind::Parameter,
                param.name.name,
                SymbolFlags::READONLY,
                location,
            );
            self.table.set_type(parameter, ty)?;
            if !self.table.add_parameter(method, parameter) {
                self.report(
                    SemanticError::DuplicateDeclaration {
                        name: param.name.name.to_string(),
                    },
                    param.name.span,
                );
            }
        }

        let return_type = match &decl.return_type {
            Some(ty) => self.resolve_type(ty),
            None => Type::Unit,
        };
        self.table.set_type(method, return_type)?;

        if !self.table.define(method) {
            self.report(
                SemanticError::DuplicateDeclaration {
                    name: decl.name.name.to_string(),
                },
                decl.name.span,
            );
            return Ok(None);
        }

        let scope = self.scopes.container(method, Some(self.context.scope));
        Ok(Some(PendingFunction {
            symbol: method,
            decl,
            file: self.context.file,
            scope,
            this_type,
            top_level,
        }))
    }
}
