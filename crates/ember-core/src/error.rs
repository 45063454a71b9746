//! Error types for every phase of Ember processing.
//!
//! ## Error Hierarchy
//!
//! ```text
//! Diagnostic (error + location, collected per run)
//! ├── LexError       - tokenization errors, passed through unchanged
//! ├── ParseError     - syntax errors, passed through unchanged
//! └── SemanticError  - binder errors, grouped by ErrorCategory
//!
//! InternalError      - binder defects, fatal to the binding run
//! ```
//!
//! User errors never abort binding: they are recorded as diagnostics and the
//! offending node is replaced with an error node. Only [`InternalError`]
//! travels through `Result` and stops a run.

use thiserror::Error;

use crate::Span;

// ============================================================================
// Lexer Errors
// ============================================================================

/// Errors that occur during lexical analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    /// An unexpected character was encountered.
    #[error("unexpected character '{ch}'")]
    UnexpectedChar { ch: char, span: Span },

    /// A string literal was not properly terminated.
    #[error("unterminated string literal")]
    UnterminatedString { span: Span },

    /// A character literal was empty, too long, or not terminated.
    #[error("invalid character literal")]
    InvalidCharLiteral { span: Span },

    /// A block comment was not properly terminated.
    #[error("unterminated comment")]
    UnterminatedComment { span: Span },

    /// A numeric literal could not be parsed.
    #[error("invalid number: {detail}")]
    InvalidNumber { span: Span, detail: String },
}

impl LexError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. } => *span,
            LexError::UnterminatedString { span } => *span,
            LexError::InvalidCharLiteral { span } => *span,
            LexError::UnterminatedComment { span } => *span,
            LexError::InvalidNumber { span, .. } => *span,
        }
    }
}

// ============================================================================
// Parse Errors
// ============================================================================

/// Categories of parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParseErrorKind {
    /// A specific token was expected but not found.
    ExpectedToken,
    /// An unexpected token was encountered.
    UnexpectedToken,
    /// An expression was expected.
    ExpectedExpression,
    /// A type was expected.
    ExpectedType,
    /// An identifier was expected.
    ExpectedIdentifier,
    /// A member of a class or object body was expected.
    ExpectedMember,
    /// A `namespace` heading appeared after other items.
    MisplacedNamespace,
    /// A literal value could not be parsed.
    InvalidLiteral,
}

impl ParseErrorKind {
    /// Returns a human-readable name for this error kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::ExpectedToken => "expected token",
            ParseErrorKind::UnexpectedToken => "unexpected token",
            ParseErrorKind::ExpectedExpression => "expected expression",
            ParseErrorKind::ExpectedType => "expected type",
            ParseErrorKind::ExpectedIdentifier => "expected identifier",
            ParseErrorKind::ExpectedMember => "expected class member",
            ParseErrorKind::MisplacedNamespace => "misplaced namespace",
            ParseErrorKind::InvalidLiteral => "invalid literal",
        }
    }
}

/// A syntax error produced by the parser.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct ParseError {
    /// The category of error.
    pub kind: ParseErrorKind,
    /// Human readable detail.
    pub message: String,
    /// Where the error occurred.
    pub span: Span,
}

impl ParseError {
    /// Create a new parse error.
    pub fn new(kind: ParseErrorKind, span: Span, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            span,
        }
    }
}

// ============================================================================
// Semantic Errors
// ============================================================================

/// The group a [`SemanticError`] belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Lexical or syntax error passed through from the parser.
    Syntax,
    /// Undefined or ambiguous names, duplicate declarations.
    NameResolution,
    /// Mismatches, missing conversions, undefined operators.
    Type,
    /// Loop jumps outside loops, missing return values.
    ControlFlow,
    /// Entry point and file structure rules.
    Structural,
}

/// Errors reported while binding a program.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    // ------------------------------------------------------------------------
    // Name resolution
    // ------------------------------------------------------------------------
    /// A name resolved to nothing in any enclosing scope.
    #[error("undefined name '{name}'")]
    UndefinedName { name: String },

    /// A type annotation named an unknown type.
    #[error("undefined type '{name}'")]
    UndefinedType { name: String },

    /// A call named no function with a compatible arity.
    #[error("undefined function '{name}' taking {arity} argument(s)")]
    UndefinedFunction { name: String, arity: usize },

    /// A member access named nothing on the receiver.
    #[error("'{container}' does not contain a member named '{name}'")]
    UndefinedMember { container: String, name: String },

    /// A `using` directive named no namespace or type.
    #[error("undefined namespace or type '{name}' in using directive")]
    UndefinedImport { name: String },

    /// Two or more overloads tie with the lowest conversion cost.
    #[error("call to '{name}' is ambiguous between {candidates}")]
    AmbiguousCall { name: String, candidates: String },

    /// No overload accepts the argument types.
    #[error("no overload of '{name}' accepts arguments ({arguments})")]
    NoMatchingOverload { name: String, arguments: String },

    /// A name was declared twice in one container.
    #[error("'{name}' is already declared in this scope")]
    DuplicateDeclaration { name: String },

    /// A name that is not callable was called.
    #[error("'{name}' is not a function")]
    NotAFunction { name: String },

    /// A type or namespace was used where a value is required.
    #[error("'{name}' is a {kind}, not a value")]
    NotAValue { name: String, kind: String },

    /// `this` was used outside of a class.
    #[error("'this' is only available inside a class")]
    ThisOutsideClass,

    // ------------------------------------------------------------------------
    // Type
    // ------------------------------------------------------------------------
    /// Two types were required to agree but do not.
    #[error("type mismatch: expected '{expected}', found '{found}'")]
    TypeMismatch { expected: String, found: String },

    /// No conversion exists between two types.
    #[error("cannot convert type '{from}' to '{to}'")]
    NoConversion { from: String, to: String },

    /// Only an explicit conversion exists where an implicit one is required.
    #[error("cannot implicitly convert type '{from}' to '{to}'; an explicit conversion exists")]
    ImplicitConversionRequired { from: String, to: String },

    /// A binary operator is not defined for the operand types.
    #[error("operator '{op}' is not defined for types '{left}' and '{right}'")]
    UndefinedBinaryOperator {
        op: String,
        left: String,
        right: String,
    },

    /// A unary operator is not defined for the operand type.
    #[error("operator '{op}' is not defined for type '{operand}'")]
    UndefinedUnaryOperator { op: String, operand: String },

    /// The initializer type cannot be used to infer a variable's type.
    #[error("cannot infer the type of '{name}' from its initializer")]
    CannotInferType { name: String },

    /// An assignment targeted a readonly variable.
    #[error("cannot reassign '{name}' because it is read-only")]
    ReadOnlyAssignment { name: String },

    /// An assignment targeted something that is not assignable.
    #[error("the left-hand side of an assignment must be a variable, field or indexer")]
    InvalidAssignmentTarget,

    /// An indexer was applied to a non-array value.
    #[error("cannot index into a value of type '{ty}'")]
    NotIndexable { ty: String },

    // ------------------------------------------------------------------------
    // Control flow
    // ------------------------------------------------------------------------
    /// `break` outside of any loop.
    #[error("'break' can only be used inside a loop")]
    BreakOutsideLoop,

    /// `continue` outside of any loop.
    #[error("'continue' can only be used inside a loop")]
    ContinueOutsideLoop,

    /// A non-Unit function falls off its end without a value on some path.
    #[error("not all code paths of '{name}' return a value")]
    NotAllPathsReturn { name: String },

    // ------------------------------------------------------------------------
    // Structural
    // ------------------------------------------------------------------------
    /// `main` has parameters or a non-Unit return type.
    #[error("'main' must take no parameters and return unit")]
    InvalidMainSignature,

    /// `main` is declared alongside top-level statements.
    #[error("cannot declare 'main' when top-level statements are present")]
    MainWithGlobalStatements,

    /// Top-level statements appear in more than one file.
    #[error("global statements exist in multiple files")]
    GlobalStatementsInMultipleFiles,
}

impl SemanticError {
    /// The category this error belongs to.
    pub fn category(&self) -> ErrorCategory {
        use SemanticError::*;
        match self {
            UndefinedName { .. }
            | UndefinedType { .. }
            | UndefinedFunction { .. }
            | UndefinedMember { .. }
            | UndefinedImport { .. }
            | AmbiguousCall { .. }
            | NoMatchingOverload { .. }
            | DuplicateDeclaration { .. }
            | NotAFunction { .. }
            | NotAValue { .. }
            | ThisOutsideClass => ErrorCategory::NameResolution,

            TypeMismatch { .. }
            | NoConversion { .. }
            | ImplicitConversionRequired { .. }
            | UndefinedBinaryOperator { .. }
            | UndefinedUnaryOperator { .. }
            | CannotInferType { .. }
            | ReadOnlyAssignment { .. }
            | InvalidAssignmentTarget
            | NotIndexable { .. } => ErrorCategory::Type,

            BreakOutsideLoop | ContinueOutsideLoop | NotAllPathsReturn { .. } => {
                ErrorCategory::ControlFlow
            }

            InvalidMainSignature | MainWithGlobalStatements | GlobalStatementsInMultipleFiles => {
                ErrorCategory::Structural
            }
        }
    }
}

// ============================================================================
// Internal Errors
// ============================================================================

/// Binder defects. These are distinct from user diagnostics and abort the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InternalError {
    /// A symbol's type was assigned twice.
    #[error("internal error: type of symbol '{name}' assigned twice")]
    TypeAlreadyAssigned { name: String },

    /// A symbol's type was read before being assigned.
    #[error("internal error: symbol '{name}' has no type")]
    MissingType { name: String },

    /// An operator reached the operator table after type checking should have excluded it.
    #[error("internal error: no operator table entry for '{op}'")]
    MissingOperator { op: String },

    /// A generic invariant violation.
    #[error("internal error: {message}")]
    Invariant { message: String },
}
