//! Lowering of typed bodies into label/goto form.
//!
//! Each [`Pass`] maps a [`Body`] to a new body and never edits its input.
//! The default [`Pipeline`] runs:
//!
//! 1. [`ControlFlowLowering`] - rewrites `if`, loops, jumps, blocks and
//!    assignments into the flat statement vocabulary
//! 2. [`ConstantBranchFolding`] - turns conditional gotos with a constant
//!    condition into plain gotos, or drops them
//!
//! Both passes are idempotent: running one on its own output returns an
//! equal body.
//!
//! # Example
//!
//! ```
//! use ember_compiler::lowering::lower;
//! use ember_compiler::typed::{Body, Expr, Stmt};
//! use ember_core::{ConstantValue, Span};
//!
//! let body = Body::new(vec![Stmt::Expression(Expr::literal(
//!     ConstantValue::Int(1),
//!     Span::default(),
//! ))]);
//! let lowered = lower(&body);
//! assert!(lowered.is_lowered());
//! assert_eq!(lower(&lowered), lowered);
//! ```

mod constant_branches;
mod control_flow;

pub use constant_branches::ConstantBranchFolding;
pub use control_flow::ControlFlowLowering;

use crate::typed::Body;

/// A body-to-body rewrite.
pub trait Pass {
    /// Short name used in trace output.
    fn name(&self) -> &'static str;

    /// Produce the rewritten body.
    fn run(&self, body: &Body) -> Body;
}

/// An ordered list of passes.
pub struct Pipeline {
    passes: Vec<Box<dyn Pass>>,
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
            .with_pass(ControlFlowLowering)
            .with_pass(ConstantBranchFolding)
    }
}

impl Pipeline {
    /// A pipeline without passes.
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    /// Append a pass.
    pub fn with_pass(mut self, pass: impl Pass + 'static) -> Self {
        self.passes.push(Box::new(pass));
        self
    }

    /// Names of the passes, in run order.
    pub fn pass_names(&self) -> Vec<&'static str> {
        self.passes.iter().map(|p| p.name()).collect()
    }

    /// Run every pass in order.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run(&self, body: &Body) -> Body {
        let mut current = body.clone();
        for pass in &self.passes {
            current = pass.run(&current);
            tracing::trace!(
                pass = pass.name(),
                statements = current.statements.len(),
                temps = current.temps.len(),
                "lowering pass finished"
            );
        }
        current
    }
}

/// Run the default pipeline.
pub fn lower(body: &Body) -> Body {
    Pipeline::default().run(body)
}
