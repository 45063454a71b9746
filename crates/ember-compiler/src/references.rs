//! Referenced libraries.
//!
//! An [`AssemblyReference`] describes the public types of a library the
//! program links against: their namespaces, names and member signatures.
//! Importing a reference creates `IMPORTED` symbols in the root namespace
//! tree; their bodies live outside the compilation.
//!
//! The core library exposes `System.Predef`, whose members are visible
//! unqualified in every file.

use ember_core::{InternalError, SymbolFlags, SymbolId, SymbolKind, SymbolTable, Type};

/// Namespace path of the type whose members are imported unqualified.
pub const PREDEF_PATH: [&str; 2] = ["System", "Predef"];

/// A member of a referenced type.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberReference {
    /// A method; constructors are named `.ctor`.
    Method {
        name: String,
        params: Vec<(String, Type)>,
        return_type: Type,
        is_static: bool,
    },
    /// A field.
    Field {
        name: String,
        ty: Type,
        is_static: bool,
        is_readonly: bool,
    },
}

impl MemberReference {
    /// A static method.
    pub fn function(
        name: impl Into<String>,
        params: Vec<(String, Type)>,
        return_type: Type,
    ) -> Self {
        MemberReference::Method {
            name: name.into(),
            params,
            return_type,
            is_static: true,
        }
    }

    /// An instance method.
    pub fn method(name: impl Into<String>, params: Vec<(String, Type)>, return_type: Type) -> Self {
        MemberReference::Method {
            name: name.into(),
            params,
            return_type,
            is_static: false,
        }
    }

    /// A constructor.
    pub fn constructor(params: Vec<(String, Type)>) -> Self {
        MemberReference::Method {
            name: ".ctor".to_string(),
            params,
            return_type: Type::Unit,
            is_static: false,
        }
    }

    fn name(&self) -> &str {
        match self {
            MemberReference::Method { name, .. } | MemberReference::Field { name, .. } => name,
        }
    }
}

/// A public type of a referenced library.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeReference {
    /// Dotted namespace, empty for the root namespace.
    pub namespace: String,
    pub name: String,
    /// Static types have no instances; their members are all static.
    pub is_static: bool,
    pub members: Vec<MemberReference>,
}

impl TypeReference {
    /// A type with no members yet.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>, is_static: bool) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            is_static,
            members: Vec::new(),
        }
    }

    /// Add a member.
    pub fn with_member(mut self, member: MemberReference) -> Self {
        self.members.push(member);
        self
    }
}

/// A library linked into a compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyReference {
    pub name: String,
    pub types: Vec<TypeReference>,
}

impl AssemblyReference {
    /// An empty reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: Vec::new(),
        }
    }

    /// Add a type.
    pub fn with_type(mut self, ty: TypeReference) -> Self {
        self.types.push(ty);
        self
    }

    /// The core library: `System.Predef` with console I/O.
    pub fn core_library() -> Self {
        let predef = TypeReference::new("System", "Predef", true)
            .with_member(MemberReference::function(
                "println",
                vec![("value".to_string(), Type::Any)],
                Type::Unit,
            ))
            .with_member(MemberReference::function(
                "print",
                vec![("value".to_string(), Type::Any)],
                Type::Unit,
            ))
            .with_member(MemberReference::function("readLine", Vec::new(), Type::String));
        AssemblyReference::new("ember.core").with_type(predef)
    }
}

/// Create symbols for every type and member of a reference.
///
/// Returns the created type symbols. Conflicting declarations inside a
/// reference are defects of the reference and abort the run.
pub fn import_reference(
    table: &mut SymbolTable,
    reference: &AssemblyReference,
) -> Result<Vec<SymbolId>, InternalError> {
    let root = table.root();
    let mut imported = Vec::with_capacity(reference.types.len());

    for type_ref in &reference.types {
        let namespace = if type_ref.namespace.is_empty() {
            root
        } else {
            table.get_or_create_namespace_path(root, type_ref.namespace.split('.'))
        };

        let mut flags = SymbolFlags::IMPORTED;
        if type_ref.is_static {
            flags |= SymbolFlags::STATIC | SymbolFlags::SINGLETON;
        }
        let ty = table.create(namespace, SymbolKind::Type, type_ref.name.as_str(), flags, None);
        table.set_type(ty, Type::Class(ty))?;
        if !table.define(ty) {
            return Err(conflict(reference, &type_ref.name));
        }

        for member in &type_ref.members {
            import_member(table, reference, ty, type_ref.is_static, member)?;
        }
        imported.push(ty);
    }

    tracing::debug!(reference = %reference.name, types = imported.len(), "imported reference");
    Ok(imported)
}

fn import_member(
    table: &mut SymbolTable,
    reference: &AssemblyReference,
    owner: SymbolId,
    static_owner: bool,
    member: &MemberReference,
) -> Result<(), InternalError> {
    let id = match member {
        MemberReference::Method {
            name,
            params,
            return_type,
            is_static,
        } => {
            let mut flags = SymbolFlags::IMPORTED;
            if *is_static || static_owner {
                flags |= SymbolFlags::STATIC;
            }
            if name == ".ctor" {
                flags |= SymbolFlags::CONSTRUCTOR;
            }
            let method = table.create(owner, SymbolKind::Method, name.as_str(), flags, None);
            table.set_type(method, return_type.clone())?;
            for (param_name, param_ty) in params {
                let param = table.create(
                    method,
                    SymbolKind::Parameter,
                    param_name.as_str(),
                    SymbolFlags::READONLY | SymbolFlags::IMPORTED,
                    None,
                );
                table.set_type(param, param_ty.clone())?;
                if !table.add_parameter(method, param) {
                    return Err(conflict(reference, param_name));
                }
            }
            method
        }
        MemberReference::Field {
            name,
            ty,
            is_static,
            is_readonly,
        } => {
            let mut flags = SymbolFlags::IMPORTED;
            if *is_static || static_owner {
                flags |= SymbolFlags::STATIC;
            }
            if *is_readonly {
                flags |= SymbolFlags::READONLY;
            }
            let field = table.create(owner, SymbolKind::Field, name.as_str(), flags, None);
            table.set_type(field, ty.clone())?;
            field
        }
    };

    if !table.define(id) {
        return Err(conflict(reference, member.name()));
    }
    Ok(())
}

fn conflict(reference: &AssemblyReference, name: &str) -> InternalError {
    InternalError::Invariant {
        message: format!("reference '{}' declares '{}' twice", reference.name, name),
    }
}

/// The `System.Predef` type, if the core library was imported.
pub fn predef(table: &SymbolTable) -> Option<SymbolId> {
    table.resolve_qualified(table.root(), &PREDEF_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_library_declares_predef() {
        let mut table = SymbolTable::new();
        let types = import_reference(&mut table, &AssemblyReference::core_library()).unwrap();
        assert_eq!(types.len(), 1);

        let predef = predef(&table).unwrap();
        assert_eq!(predef, types[0]);
        assert!(table.get(predef).is_singleton());
        assert_eq!(table.qualified_name(predef), "System.Predef");

        let println = table.members(predef, "println");
        assert_eq!(println.len(), 1);
        let println = table.get(println[0]);
        assert!(println.is_static());
        assert!(println.has(SymbolFlags::IMPORTED));
        assert_eq!(table.parameter_types(table.members(predef, "println")[0]), vec![Type::Any]);

        let read_line = table.members(predef, "readLine")[0];
        assert_eq!(table.ty(read_line).unwrap(), &Type::String);
    }

    #[test]
    fn instance_types_get_constructors() {
        let reference = AssemblyReference::new("geometry").with_type(
            TypeReference::new("Geo.Shapes", "Circle", false)
                .with_member(MemberReference::constructor(vec![("r".to_string(), Type::Int)]))
                .with_member(MemberReference::method("area", Vec::new(), Type::Int))
                .with_member(MemberReference::Field {
                    name: "radius".to_string(),
                    ty: Type::Int,
                    is_static: false,
                    is_readonly: true,
                }),
        );
        let mut table = SymbolTable::new();
        import_reference(&mut table, &reference).unwrap();

        let root = table.root();
        let circle = table.resolve_qualified(root, &["Geo", "Shapes", "Circle"]).unwrap();
        let ctor = table.members(circle, ".ctor")[0];
        assert!(table.get(ctor).has(SymbolFlags::CONSTRUCTOR));
        assert!(!table.get(table.members(circle, "area")[0]).is_static());
        assert!(table.get(table.members(circle, "radius")[0]).is_readonly());
    }

    #[test]
    fn duplicate_member_is_internal_error() {
        let reference = AssemblyReference::new("broken").with_type(
            TypeReference::new("", "Util", true)
                .with_member(MemberReference::function("f", Vec::new(), Type::Unit))
                .with_member(MemberReference::function("f", Vec::new(), Type::Int)),
        );
        let mut table = SymbolTable::new();
        assert!(matches!(
            import_reference(&mut table, &reference),
            Err(InternalError::Invariant { .. })
        ));
    }
}
