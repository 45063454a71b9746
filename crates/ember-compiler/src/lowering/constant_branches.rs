//! Folding of conditional gotos whose condition is a compile-time constant.

use ember_core::ConstantValue;

use super::Pass;
use crate::typed::{Body, Stmt};

/// `goto l if true` becomes `goto l`; `goto l if false` disappears.
pub struct ConstantBranchFolding;

impl Pass for ConstantBranchFolding {
    fn name(&self) -> &'static str {
        "constant-branches"
    }

    fn run(&self, body: &Body) -> Body {
        let statements = body
            .statements
            .iter()
            .filter_map(|stmt| match stmt {
                Stmt::ConditionalGoto {
                    label,
                    condition,
                    jump_if_true,
                } => match &condition.constant {
                    Some(ConstantValue::Bool(value)) if value == jump_if_true => {
                        Some(Stmt::Goto(label.clone()))
                    }
                    Some(ConstantValue::Bool(_)) => None,
                    _ => Some(stmt.clone()),
                },
                other => Some(other.clone()),
            })
            .collect();

        Body {
            statements,
            temps: body.temps.clone(),
        }
    }
}
