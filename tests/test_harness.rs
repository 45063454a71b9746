// tests/test_harness.rs
//! Test harness for Ember integration tests.
//!
//! Loads scripts from `test_scripts/`, compiles them through the public
//! API, and runs lowered bodies with a small tree-walking evaluator so that
//! tests can check what a program prints rather than how it was lowered.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use ember::compiler::const_eval::{fold_binary, fold_conversion};
use ember::compiler::operators::{BinaryOperatorKind, UnaryOperatorKind};
use ember::compiler::typed::{Body, Expr, ExprKind, Stmt, Variable};
use ember::core::{ConstantValue, SymbolFlags, SymbolId, SymbolKind, Type};
use ember::{Compilation, CompilationOptions, SemanticError, TypedAssembly};
use rustc_hash::{FxHashMap, FxHashSet};

const STEP_LIMIT: u64 = 1_000_000;

// =============================================================================
// Loading and compiling
// =============================================================================

/// Load a test script from the test_scripts directory.
pub fn load_script(filename: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_scripts")
        .join(filename);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
}

/// Compile named sources together.
pub fn compile(
    options: CompilationOptions,
    sources: &[(&str, &str)],
) -> (Compilation, Arc<TypedAssembly>) {
    let mut compilation = Compilation::new(options);
    for (name, source) in sources {
        compilation
            .add_source(*name, *source)
            .expect("Failed to add source");
    }
    let assembly = compilation.compile().expect("Failed to compile");
    (compilation, assembly)
}

/// Compile scripts from test_scripts/ as one program.
pub fn compile_files(filenames: &[&str]) -> (Compilation, Arc<TypedAssembly>) {
    let sources: Vec<(String, String)> = filenames
        .iter()
        .map(|name| (name.to_string(), load_script(name)))
        .collect();
    let borrowed: Vec<(&str, &str)> = sources
        .iter()
        .map(|(name, text)| (name.as_str(), text.as_str()))
        .collect();
    compile(CompilationOptions::program(), &borrowed)
}

/// Rendered diagnostics of a compilation.
pub fn rendered(compilation: &Compilation, assembly: &TypedAssembly) -> Vec<String> {
    assembly
        .diagnostics
        .iter()
        .map(|d| compilation.render(d))
        .collect()
}

/// Panic with every rendered diagnostic if there are any.
pub fn assert_clean(compilation: &Compilation, assembly: &TypedAssembly) {
    let messages = rendered(compilation, assembly);
    assert!(messages.is_empty(), "unexpected diagnostics:\n{}", messages.join("\n"));
}

/// The semantic errors of an assembly, in report order.
pub fn semantic_errors(assembly: &TypedAssembly) -> Vec<SemanticError> {
    assembly
        .diagnostics
        .iter()
        .filter_map(|d| d.as_semantic().cloned())
        .collect()
}

/// Compile one program from test_scripts/, run it and return its output.
pub fn run_file(filename: &str) -> String {
    let (compilation, assembly) = compile_files(&[filename]);
    assert_clean(&compilation, &assembly);
    let mut evaluator = Evaluator::new(assembly);
    evaluator.run_entry();
    evaluator.take_output()
}

/// Compile and run a program given as text.
pub fn run_program(source: &str) -> String {
    let (compilation, assembly) = compile(CompilationOptions::program(), &[("main.em", source)]);
    assert_clean(&compilation, &assembly);
    let mut evaluator = Evaluator::new(assembly);
    evaluator.run_entry();
    evaluator.take_output()
}

// =============================================================================
// Values
// =============================================================================

#[derive(Debug)]
pub struct Object {
    pub class: SymbolId,
    pub fields: FxHashMap<SymbolId, Value>,
}

/// A run-time value.
#[derive(Debug, Clone)]
pub enum Value {
    Unit,
    Int(i32),
    Bool(bool),
    Char(char),
    String(Rc<str>),
    Null,
    Object(Rc<RefCell<Object>>),
    Array(Rc<RefCell<Vec<Value>>>),
}

impl Value {
    fn from_constant(constant: &ConstantValue) -> Self {
        match constant {
            ConstantValue::Int(v) => Value::Int(*v),
            ConstantValue::Bool(v) => Value::Bool(*v),
            ConstantValue::Char(v) => Value::Char(*v),
            ConstantValue::String(v) => Value::String(Rc::from(v.as_str())),
            ConstantValue::Unit => Value::Unit,
        }
    }

    fn to_constant(&self) -> Option<ConstantValue> {
        match self {
            Value::Unit => Some(ConstantValue::Unit),
            Value::Int(v) => Some(ConstantValue::Int(*v)),
            Value::Bool(v) => Some(ConstantValue::Bool(*v)),
            Value::Char(v) => Some(ConstantValue::Char(*v)),
            Value::String(v) => Some(ConstantValue::String(v.to_string())),
            Value::Null | Value::Object(_) | Value::Array(_) => None,
        }
    }

    /// The value a field or array element holds before it is assigned.
    fn default_for(ty: &Type) -> Self {
        match ty {
            Type::Int => Value::Int(0),
            Type::Bool => Value::Bool(false),
            Type::Char => Value::Char('\0'),
            Type::Unit => Value::Unit,
            _ => Value::Null,
        }
    }

    fn as_int(&self) -> i32 {
        match self {
            Value::Int(v) => *v,
            other => panic!("expected int, found {:?}", other),
        }
    }

    fn as_bool(&self) -> bool {
        match self {
            Value::Bool(v) => *v,
            other => panic!("expected bool, found {:?}", other),
        }
    }

    /// Reference identity for objects and arrays, value equality otherwise.
    fn same(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Object(a), Value::Object(b)) => Rc::ptr_eq(a, b),
            (Value::Array(a), Value::Array(b)) => Rc::ptr_eq(a, b),
            (Value::Null, Value::Null) => true,
            (a, b) => match (a.to_constant(), b.to_constant()) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            },
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.same(other)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Object(_) => f.write_str("<object>"),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            other => match other.to_constant() {
                Some(constant) => write!(f, "{}", constant),
                None => Ok(()),
            },
        }
    }
}

// =============================================================================
// Evaluator
// =============================================================================

struct Frame {
    this: Option<Value>,
    locals: FxHashMap<SymbolId, Value>,
    temps: Vec<Value>,
}

/// Where an assignment stores its value.
enum Place {
    Local(SymbolId),
    Static(SymbolId),
    Temp(usize),
    Field(Rc<RefCell<Object>>, SymbolId),
    Element(Rc<RefCell<Vec<Value>>>, usize),
}

/// Runs lowered method bodies.
///
/// Static fields survive [`load`](Self::load), so the submissions of a
/// session can be run one after another.
pub struct Evaluator {
    assembly: Arc<TypedAssembly>,
    statics: FxHashMap<SymbolId, Value>,
    initialized: FxHashSet<SymbolId>,
    output: String,
    input: VecDeque<String>,
    steps: u64,
}

impl Evaluator {
    pub fn new(assembly: Arc<TypedAssembly>) -> Self {
        Self {
            assembly,
            statics: FxHashMap::default(),
            initialized: FxHashSet::default(),
            output: String::new(),
            input: VecDeque::new(),
            steps: 0,
        }
    }

    /// Switch to a later submission.
    pub fn load(&mut self, assembly: Arc<TypedAssembly>) {
        self.assembly = assembly;
    }

    /// Queue a line for `readLine()`.
    pub fn push_input(&mut self, line: &str) {
        self.input.push_back(line.to_string());
    }

    pub fn take_output(&mut self) -> String {
        std::mem::take(&mut self.output)
    }

    /// Run the entry point and return its value.
    pub fn run_entry(&mut self) -> Value {
        let entry = self.assembly.entry_point.expect("assembly has no entry point");
        self.call(entry.symbol, None, Vec::new())
    }

    /// Call a method by qualified name.
    pub fn call_named(&mut self, qualified: &str, args: Vec<Value>) -> Value {
        let method = self
            .assembly
            .find_method(qualified)
            .unwrap_or_else(|| panic!("no method named {}", qualified));
        self.call(method, None, args)
    }

    fn call(&mut self, method: SymbolId, this: Option<Value>, args: Vec<Value>) -> Value {
        let assembly = Arc::clone(&self.assembly);
        let symbol = assembly.symbols.get(method);

        if symbol.has(SymbolFlags::IMPORTED) {
            return self.call_builtin(&symbol.name, args);
        }
        if symbol.is_static() {
            self.initialize_container(symbol.owner);
        }

        let body = assembly
            .body(method)
            .unwrap_or_else(|| panic!("{} has no body", assembly.symbols.qualified_name(method)));
        let locals = assembly
            .symbols
            .parameters(method)
            .iter()
            .copied()
            .zip(args)
            .collect();
        let mut frame = Frame {
            this,
            locals,
            temps: vec![Value::Unit; body.temps.len()],
        };
        self.execute(body, &mut frame)
    }

    fn call_builtin(&mut self, name: &str, args: Vec<Value>) -> Value {
        match (name, args.as_slice()) {
            ("println", [value]) => {
                self.output.push_str(&value.to_string());
                self.output.push('\n');
                Value::Unit
            }
            ("print", [value]) => {
                self.output.push_str(&value.to_string());
                Value::Unit
            }
            ("readLine", []) => Value::String(Rc::from(self.input.pop_front().unwrap_or_default())),
            _ => panic!("unknown built-in {}", name),
        }
    }

    /// Run the static initializer of an object the first time one of its
    /// members is used.
    fn initialize_container(&mut self, container: Option<SymbolId>) {
        let Some(container) = container else {
            return;
        };
        if !self.initialized.insert(container) {
            return;
        }
        let assembly = Arc::clone(&self.assembly);
        if let Some(&cctor) = assembly.symbols.members(container, ".cctor").first()
            && assembly.body(cctor).is_some()
        {
            self.call(cctor, None, Vec::new());
        }
    }

    fn execute(&mut self, body: &Body, frame: &mut Frame) -> Value {
        let labels: FxHashMap<_, usize> = body
            .statements
            .iter()
            .enumerate()
            .filter_map(|(i, stmt)| match stmt {
                Stmt::Label(label) => Some((label.clone(), i)),
                _ => None,
            })
            .collect();

        let mut value = Value::Unit;
        let mut pc = 0;
        while let Some(stmt) = body.statements.get(pc) {
            self.steps += 1;
            assert!(self.steps < STEP_LIMIT, "step limit exceeded");
            pc += 1;
            match stmt {
                Stmt::Expression(expr) => value = self.eval(expr, frame),
                Stmt::VariableDeclaration {
                    variable,
                    initializer,
                } => {
                    let place = self.variable_place(*variable);
                    let initial = self.eval(initializer, frame);
                    self.store(place, initial, frame);
                }
                Stmt::Assignment { target, value: source } => {
                    let place = self.place(target, frame);
                    let assigned = self.eval(source, frame);
                    self.store(place, assigned, frame);
                }
                Stmt::Label(_) => {}
                Stmt::Goto(label) => pc = labels[label],
                Stmt::ConditionalGoto {
                    label,
                    condition,
                    jump_if_true,
                } => {
                    if self.eval(condition, frame).as_bool() == *jump_if_true {
                        pc = labels[label];
                    }
                }
            }
        }
        value
    }

    fn variable_place(&self, variable: Variable) -> Place {
        match variable {
            Variable::Temp(temp) => Place::Temp(temp.0 as usize),
            Variable::Symbol(symbol) => match self.assembly.symbols.get(symbol).kind {
                SymbolKind::Field => Place::Static(symbol),
                _ => Place::Local(symbol),
            },
        }
    }

    fn place(&mut self, target: &Expr, frame: &mut Frame) -> Place {
        match &target.kind {
            ExprKind::Variable(variable) => self.variable_place(*variable),
            ExprKind::Field { receiver, field } => match self.eval(receiver, frame) {
                Value::Object(object) => Place::Field(object, *field),
                other => panic!("field store on {:?}", other),
            },
            ExprKind::Index { array, index } => {
                let array = self.eval(array, frame);
                let index = self.eval(index, frame).as_int();
                match array {
                    Value::Array(items) => Place::Element(items, checked_index(index)),
                    other => panic!("index store on {:?}", other),
                }
            }
            other => panic!("invalid assignment target {:?}", other),
        }
    }

    fn store(&mut self, place: Place, value: Value, frame: &mut Frame) {
        match place {
            Place::Local(symbol) => {
                frame.locals.insert(symbol, value);
            }
            Place::Static(symbol) => {
                let owner = self.assembly.symbols.get(symbol).owner;
                self.initialize_container(owner);
                self.statics.insert(symbol, value);
            }
            Place::Temp(index) => frame.temps[index] = value,
            Place::Field(object, field) => {
                object.borrow_mut().fields.insert(field, value);
            }
            Place::Element(items, index) => {
                let mut items = items.borrow_mut();
                assert!(index < items.len(), "index {} out of bounds", index);
                items[index] = value;
            }
        }
    }

    fn read_static(&mut self, symbol: SymbolId) -> Value {
        let owner = self.assembly.symbols.get(symbol).owner;
        self.initialize_container(owner);
        match self.statics.get(&symbol) {
            Some(value) => value.clone(),
            None => Value::default_for(&self.assembly.symbols.type_or_error(symbol)),
        }
    }

    fn eval(&mut self, expr: &Expr, frame: &mut Frame) -> Value {
        if let Some(constant) = &expr.constant {
            return Value::from_constant(constant);
        }

        match &expr.kind {
            ExprKind::Literal => Value::Null,
            ExprKind::Variable(Variable::Temp(temp)) => frame.temps[temp.0 as usize].clone(),
            ExprKind::Variable(Variable::Symbol(symbol)) => {
                match self.variable_place(Variable::Symbol(*symbol)) {
                    Place::Static(symbol) => self.read_static(symbol),
                    _ => frame
                        .locals
                        .get(symbol)
                        .cloned()
                        .unwrap_or_else(|| Value::default_for(&expr.ty)),
                }
            }
            ExprKind::Field { receiver, field } => match self.eval(receiver, frame) {
                Value::Object(object) => object
                    .borrow()
                    .fields
                    .get(field)
                    .cloned()
                    .unwrap_or_else(|| Value::default_for(&expr.ty)),
                other => panic!("field read on {:?}", other),
            },
            ExprKind::Index { array, index } => {
                let array = self.eval(array, frame);
                let index = checked_index(self.eval(index, frame).as_int());
                match array {
                    Value::Array(items) => items
                        .borrow()
                        .get(index)
                        .cloned()
                        .unwrap_or_else(|| panic!("index {} out of bounds", index)),
                    other => panic!("index read on {:?}", other),
                }
            }
            ExprKind::ArrayLength(array) => match self.eval(array, frame) {
                Value::Array(items) => Value::Int(items.borrow().len() as i32),
                other => panic!("length of {:?}", other),
            },
            ExprKind::This => frame.this.clone().expect("this outside an instance method"),
            ExprKind::Unary { op, operand } => {
                let operand = self.eval(operand, frame);
                match op {
                    UnaryOperatorKind::Negate => Value::Int(operand.as_int().wrapping_neg()),
                    UnaryOperatorKind::Identity => operand,
                    UnaryOperatorKind::BitwiseNot => Value::Int(!operand.as_int()),
                    UnaryOperatorKind::LogicalNot => Value::Bool(!operand.as_bool()),
                }
            }
            ExprKind::Binary { op, left, right } => self.binary(*op, left, right, frame),
            ExprKind::Call {
                receiver,
                method,
                args,
            } => {
                let this = receiver.as_ref().map(|r| self.eval(r, frame));
                let args = args.iter().map(|arg| self.eval(arg, frame)).collect();
                self.call(*method, this, args)
            }
            ExprKind::New { constructor, args } => {
                let args = args.iter().map(|arg| self.eval(arg, frame)).collect();
                let Some(class) = self.assembly.symbols.get(*constructor).owner else {
                    panic!("constructor without a class");
                };
                let object = Rc::new(RefCell::new(Object {
                    class,
                    fields: FxHashMap::default(),
                }));
                self.call(*constructor, Some(Value::Object(Rc::clone(&object))), args);
                Value::Object(object)
            }
            ExprKind::NewArray { size } => {
                let size = checked_index(self.eval(size, frame).as_int());
                let element = expr.ty.element_type().cloned().unwrap_or(Type::Error);
                Value::Array(Rc::new(RefCell::new(vec![Value::default_for(&element); size])))
            }
            ExprKind::Conversion { operand, .. } => {
                let value = self.eval(operand, frame);
                convert(value, &expr.ty)
            }
            ExprKind::Error => panic!("error node reached the evaluator"),
            other => panic!("statement-level expression in a lowered body: {:?}", other),
        }
    }

    fn binary(
        &mut self,
        op: BinaryOperatorKind,
        left: &Expr,
        right: &Expr,
        frame: &mut Frame,
    ) -> Value {
        match op {
            BinaryOperatorKind::LogicalAnd => {
                let value = self.eval(left, frame).as_bool() && self.eval(right, frame).as_bool();
                return Value::Bool(value);
            }
            BinaryOperatorKind::LogicalOr => {
                let value = self.eval(left, frame).as_bool() || self.eval(right, frame).as_bool();
                return Value::Bool(value);
            }
            _ => {}
        }

        let left = self.eval(left, frame);
        let right = self.eval(right, frame);
        match op {
            BinaryOperatorKind::ReferenceEqual => Value::Bool(left.same(&right)),
            BinaryOperatorKind::ReferenceNotEqual => Value::Bool(!left.same(&right)),
            _ => {
                let (Some(l), Some(r)) = (left.to_constant(), right.to_constant()) else {
                    panic!("{} on {:?} and {:?}", op.symbol(), left, right);
                };
                let result = fold_binary(op, &l, &r)
                    .unwrap_or_else(|| panic!("{} failed on {} and {}", op.symbol(), l, r));
                Value::from_constant(&result)
            }
        }
    }
}

fn checked_index(index: i32) -> usize {
    usize::try_from(index).unwrap_or_else(|_| panic!("negative index {}", index))
}

fn convert(value: Value, to: &Type) -> Value {
    match (&value, to) {
        (_, Type::Any) | (Value::Null, _) => value,
        (Value::Object(_) | Value::Array(_), _) => value,
        _ => {
            let constant = value.to_constant().expect("primitive value");
            let converted = fold_conversion(&constant, to)
                .unwrap_or_else(|| panic!("cannot convert {} to {:?}", constant, to));
            Value::from_constant(&converted)
        }
    }
}
