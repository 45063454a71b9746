//! Ember Compiler
//!
//! Turns parsed Ember syntax trees into a name-resolved, type-checked and
//! lowered [`TypedAssembly`].
//!
//! ## Architecture
//!
//! - **Declarations**: namespaces, types, imports and signatures of every
//!   file are declared before any body is bound
//! - **Bodies**: expressions are bound to typed trees, lowered to
//!   label/goto form and checked for a value on every path
//!
//! ## Modules
//!
//! - [`assembly`]: Bound output (`TypedAssembly`, `MethodBodies`)
//! - [`binder`]: Phased binding of syntax trees
//! - [`const_eval`]: Compile-time constant folding
//! - [`conversion`]: Conversion classification between types
//! - [`flow`]: Control-flow graph and the all-paths-return check
//! - [`labels`]: Jump labels and the loop stack
//! - [`lowering`]: Body-to-body rewrite passes
//! - [`operators`]: Built-in operator table
//! - [`overload`]: Cost-based overload resolution
//! - [`references`]: Referenced libraries and the core library
//! - [`scope`]: Lexical scope chain
//! - [`typed`]: Typed tree and its printer

pub mod assembly;
pub mod binder;
pub mod const_eval;
pub mod conversion;
pub mod flow;
pub mod labels;
pub mod lowering;
pub mod operators;
pub mod overload;
pub mod references;
pub mod scope;
pub mod typed;

pub use assembly::{EntryPoint, MethodBodies, TypedAssembly};
pub use binder::{BindOptions, bind_assembly, bind_assembly_with};
pub use conversion::{Conversion, classify};
pub use flow::ControlFlowGraph;
pub use labels::BoundLabel;
pub use lowering::{Pass, Pipeline, lower};
pub use references::{AssemblyReference, MemberReference, TypeReference};
pub use scope::{ScopeId, ScopeTree};
pub use typed::{Body, Expr, ExprKind, Printer, Stmt, Variable};
